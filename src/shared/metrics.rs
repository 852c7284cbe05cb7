//! Prometheus Metrics Module
//!
//! 提供批量派单引擎的核心指标监控
//!
//! ## 指标类型
//! - **Counter**: 提交订单数、派单结果、规则命中次数、错误数
//! - **Histogram**: 规则匹配 + 派单耗时
//! - **Gauge**: 骑手当前负载、订单状态分布
//!
//! ## 使用示例
//! ```rust,ignore
//! use delivery_batcher::shared::metrics::METRICS;
//!
//! METRICS.orders_total.with_label_values(&["accepted"]).inc();
//!
//! let timer = METRICS.batching_duration.with_label_values(&["submit"]).start_timer();
//! // ... 匹配 + 派单 ...
//! timer.observe_duration();
//! ```

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge_vec, register_histogram_vec, CounterVec, Encoder,
    GaugeVec, HistogramVec, TextEncoder,
};

lazy_static! {
    /// 全局Metrics实例
    pub static ref METRICS: Metrics = Metrics::new();
}

/// 派单引擎核心指标
pub struct Metrics {
    /// 提交订单总数 (accepted / rejected)
    pub orders_total: CounterVec,

    /// 派单结果 (assigned / no_match / no_rider_available)
    pub outcomes_total: CounterVec,

    /// 每条规则的命中次数
    pub rule_hits_total: CounterVec,

    /// 匹配 + 派单耗时 (秒)
    pub batching_duration: HistogramVec,

    /// 每个骑手当前已分配订单数
    pub rider_load: GaugeVec,

    /// 订单状态分布
    pub order_status: GaugeVec,

    /// 错误总数 (按类型)
    pub errors_total: CounterVec,
}

impl Metrics {
    /// 创建新的Metrics实例
    ///
    /// Registration only fails on a duplicate metric name, which is a
    /// programming error in this fixed list.
    pub fn new() -> Self {
        Self {
            orders_total: register_counter_vec!(
                "delivery_batcher_orders_total",
                "Total number of orders submitted",
                &["result"]
            )
            .expect("orders_total registration"),

            outcomes_total: register_counter_vec!(
                "delivery_batcher_outcomes_total",
                "Assignment outcomes by kind",
                &["outcome"]
            )
            .expect("outcomes_total registration"),

            rule_hits_total: register_counter_vec!(
                "delivery_batcher_rule_hits_total",
                "Number of matches produced by each batching rule",
                &["rule"]
            )
            .expect("rule_hits_total registration"),

            batching_duration: register_histogram_vec!(
                "delivery_batcher_batching_duration_seconds",
                "Rule matching plus rider assignment duration",
                &["operation"],
                vec![0.000_001, 0.000_005, 0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.01]
            )
            .expect("batching_duration registration"),

            rider_load: register_gauge_vec!(
                "delivery_batcher_rider_load",
                "Orders currently assigned to each rider",
                &["rider_id"]
            )
            .expect("rider_load registration"),

            order_status: register_gauge_vec!(
                "delivery_batcher_order_status",
                "Number of registered orders per lifecycle status",
                &["status"]
            )
            .expect("order_status registration"),

            errors_total: register_counter_vec!(
                "delivery_batcher_errors_total",
                "Total number of errors",
                &["error_type"]
            )
            .expect("errors_total registration"),
        }
    }

    /// 导出Prometheus格式的指标
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = vec![];
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::warn!("metrics encoding failed: {}", e);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_global() {
        // 使用全局METRICS实例而不是创建新的
        METRICS.orders_total.with_label_values(&["accepted"]).inc();

        let output = METRICS.export();
        assert!(output.contains("delivery_batcher_orders_total"));
    }

    #[test]
    fn test_histogram_global() {
        METRICS
            .batching_duration
            .with_label_values(&["test"])
            .observe(0.000_02);

        let output = METRICS.export();
        assert!(output.contains("delivery_batcher_batching_duration_seconds"));
    }

    #[test]
    fn test_gauge_global() {
        METRICS.rider_load.with_label_values(&["999"]).set(3.0);

        // Note: 由于是全局共享，不能假设值精确匹配
        let output = METRICS.export();
        assert!(output.contains("delivery_batcher_rider_load"));
    }
}
