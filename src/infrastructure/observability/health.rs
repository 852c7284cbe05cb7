//! Health Check Endpoint
//!
//! 提供系统健康状态检查，用于负载均衡器和监控系统
//!
//! ## 健康检查端点
//! - `/health` - 带详细信息的健康检查
//! - `/health/ready` - 就绪检查（是否可以接收订单）
//! - `/health/live` - 存活检查（进程是否仍在运行）
//!
//! ## 响应格式
//! ```json
//! {
//!   "status": "healthy",
//!   "uptime_seconds": 3600,
//!   "version": "0.1.0",
//!   "timestamp": 1234567890
//! }
//! ```

use crate::shared::protocol::{EngineSnapshot, OrderStatus};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// 健康状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// 健康
    Healthy,
    /// 降级（例如没有可用骑手）
    Degraded,
    /// 不健康
    Unhealthy,
}

/// 健康检查响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub uptime_seconds: u64,
    pub version: String,
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

/// 详细健康信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthDetails {
    /// 骑手数量
    pub riders: usize,
    /// 已登记订单总数
    pub total_orders: usize,
    /// 仍处于 created 状态的订单
    pub unassigned_orders: usize,
    /// 已分配（含取餐中、已送达）的订单
    pub assigned_orders: usize,
}

impl HealthDetails {
    /// Derives the counters from an engine snapshot
    pub fn from_snapshot(snapshot: &EngineSnapshot) -> Self {
        let unassigned = snapshot
            .orders
            .iter()
            .filter(|o| o.status == OrderStatus::Created)
            .count();
        Self {
            riders: snapshot.riders.len(),
            total_orders: snapshot.orders.len(),
            unassigned_orders: unassigned,
            assigned_orders: snapshot.orders.len() - unassigned,
        }
    }
}

/// 健康检查器
pub struct HealthChecker {
    start_time: SystemTime,
    status: Arc<RwLock<HealthStatus>>,
    version: String,
}

impl HealthChecker {
    /// 创建新的健康检查器
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            start_time: SystemTime::now(),
            status: Arc::new(RwLock::new(HealthStatus::Healthy)),
            version: version.into(),
        }
    }

    /// 获取运行时间（秒）
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time
            .elapsed()
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    fn current_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    pub fn set_status(&self, status: HealthStatus) {
        *self.status.write() = status;
    }

    pub fn get_status(&self) -> HealthStatus {
        *self.status.read()
    }

    /// 生成健康检查响应
    pub fn check_health(&self) -> HealthResponse {
        HealthResponse {
            status: self.get_status(),
            uptime_seconds: self.uptime_seconds(),
            version: self.version.clone(),
            timestamp: Self::current_timestamp(),
            details: None,
        }
    }

    /// 生成详细健康检查响应
    ///
    /// An empty roster downgrades a healthy service to `Degraded`: orders are
    /// still accepted but nothing can be assigned.
    pub fn check_health_detailed(&self, details: HealthDetails) -> HealthResponse {
        let mut status = self.get_status();
        if status == HealthStatus::Healthy && details.riders == 0 {
            status = HealthStatus::Degraded;
        }
        HealthResponse {
            status,
            uptime_seconds: self.uptime_seconds(),
            version: self.version.clone(),
            timestamp: Self::current_timestamp(),
            details: Some(details),
        }
    }

    /// 存活检查（liveness probe）
    pub fn check_liveness(&self) -> bool {
        true
    }

    /// 就绪检查（readiness probe）
    pub fn check_readiness(&self) -> bool {
        matches!(self.get_status(), HealthStatus::Healthy)
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::geometry::Location;
    use crate::shared::protocol::{OrderView, RiderView};

    fn details(riders: usize) -> HealthDetails {
        HealthDetails {
            riders,
            total_orders: 4,
            unassigned_orders: 2,
            assigned_orders: 2,
        }
    }

    #[test]
    fn test_health_checker_creation() {
        let checker = HealthChecker::new("1.0.0");
        assert_eq!(checker.version, "1.0.0");
        assert_eq!(checker.get_status(), HealthStatus::Healthy);
    }

    #[test]
    fn test_status_change() {
        let checker = HealthChecker::new("1.0.0");
        checker.set_status(HealthStatus::Degraded);
        assert_eq!(checker.get_status(), HealthStatus::Degraded);

        checker.set_status(HealthStatus::Unhealthy);
        assert_eq!(checker.get_status(), HealthStatus::Unhealthy);
    }

    #[test]
    fn test_health_response() {
        let checker = HealthChecker::new("1.0.0");
        let response = checker.check_health();

        assert_eq!(response.status, HealthStatus::Healthy);
        assert_eq!(response.version, "1.0.0");
        assert!(response.timestamp > 0);
        assert!(response.details.is_none());
    }

    #[test]
    fn test_empty_roster_is_degraded() {
        let checker = HealthChecker::new("1.0.0");
        assert_eq!(checker.check_health_detailed(details(3)).status, HealthStatus::Healthy);
        assert_eq!(checker.check_health_detailed(details(0)).status, HealthStatus::Degraded);

        // 不健康状态不会被"升级"为降级
        checker.set_status(HealthStatus::Unhealthy);
        assert_eq!(checker.check_health_detailed(details(0)).status, HealthStatus::Unhealthy);
    }

    #[test]
    fn test_details_from_snapshot() {
        let view = |id, status| OrderView {
            order_id: id,
            kitchen_id: 1,
            customer_id: 1,
            ready_time: 10,
            kitchen_location: Location::default(),
            status,
            assigned_rider: if status == OrderStatus::Created { None } else { Some(1) },
        };
        let snapshot = EngineSnapshot {
            orders: vec![
                view(1, OrderStatus::Assigned),
                view(2, OrderStatus::Created),
                view(3, OrderStatus::Delivered),
            ],
            riders: vec![RiderView {
                rider_id: 1,
                location: Location::default(),
                order_count: 2,
                assigned_orders: vec![1, 3],
            }],
        };

        let details = HealthDetails::from_snapshot(&snapshot);
        assert_eq!(details.riders, 1);
        assert_eq!(details.total_orders, 3);
        assert_eq!(details.unassigned_orders, 1);
        assert_eq!(details.assigned_orders, 2);
    }

    #[test]
    fn test_readiness_probe() {
        let checker = HealthChecker::new("1.0.0");
        assert!(checker.check_readiness());
        assert!(checker.check_liveness());

        checker.set_status(HealthStatus::Degraded);
        assert!(!checker.check_readiness());
        assert!(checker.check_liveness());
    }

    #[test]
    fn test_serialization() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            uptime_seconds: 3600,
            version: "1.0.0".to_string(),
            timestamp: 1234567890,
            details: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("3600"));
        assert!(!json.contains("details"));
    }
}
