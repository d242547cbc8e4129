use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 一次到馆记录（只追加）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub customer_id: String,
    pub timestamp: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn new(customer_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            customer_id: customer_id.into(),
            timestamp,
        }
    }
}
