//! Intake parsing
//!
//! Orders arrive as JSON lines, one record per line. A line is either a new
//! order or a lifecycle update:
//!
//! ```text
//! {"order_id":1,"kitchen_id":1,"customer_id":1,"ready_time":10,"kitchen_location":{"x":1.0,"y":1.0}}
//! {"order_id":1,"status":"waiting_pickup"}
//! ```
//!
//! The rider roster is a JSON array of `{"rider_id":..,"location":{..}}`.
//! Blank lines and lines starting with `#` are skipped.

use crate::application::services::EngineCommand;
use crate::shared::geometry::Location;
use crate::shared::protocol::{AdvanceOrderRequest, NewOrderRequest, ReadyTime, RiderSpec};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 接入层错误
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid roster {path}: {source}")]
    Roster {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One intake line
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IntakeRecord {
    Order(NewOrderRequest),
    Advance(AdvanceOrderRequest),
}

impl From<IntakeRecord> for EngineCommand {
    fn from(record: IntakeRecord) -> Self {
        match record {
            IntakeRecord::Order(request) => EngineCommand::SubmitOrder(request),
            IntakeRecord::Advance(request) => EngineCommand::AdvanceOrder(request),
        }
    }
}

/// Parses one intake line; `Ok(None)` for blank and comment lines
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<IntakeRecord>, IntakeError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|source| IntakeError::Parse { line: line_no, source })
}

/// Parses a whole JSON-lines document
pub fn parse_records(text: &str) -> Result<Vec<IntakeRecord>, IntakeError> {
    let mut records = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(record) = parse_line(i + 1, line)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Reads a roster file
pub async fn load_roster(path: &Path) -> Result<Vec<RiderSpec>, IntakeError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|source| IntakeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| IntakeError::Roster {
        path: path.to_path_buf(),
        source,
    })
}

/// Eight riders on the diagonal (0,0) … (7,7)
pub fn demo_roster() -> Vec<RiderSpec> {
    (0..8u64)
        .map(|i| RiderSpec {
            rider_id: i + 1,
            location: Location::new(i as f64, i as f64),
        })
        .collect()
}

/// Reference order sequence; kitchen `k` sits at `(k, k)`
pub fn demo_orders() -> Vec<NewOrderRequest> {
    const ORDERS: [(u64, u64, u64, ReadyTime); 7] = [
        (1, 1, 1, 10),
        (2, 1, 1, 28),
        (3, 2, 2, 10),
        (4, 3, 2, 14),
        (5, 4, 3, 10),
        (6, 4, 4, 14),
        (7, 5, 5, 10),
    ];

    ORDERS
        .iter()
        .map(|&(order_id, kitchen_id, customer_id, ready_time)| NewOrderRequest {
            order_id,
            kitchen_id,
            customer_id,
            ready_time,
            kitchen_location: Location::new(kitchen_id as f64, kitchen_id as f64),
        })
        .collect()
}
