use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::customer::Customer;

/// 缺勤提醒记录，由下游消费者处理和清理
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// 为缺勤会员生成一条新提醒，ID 每次随机生成
    pub fn absence(customer: &Customer, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            customer_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            message: absence_message(&customer.name),
            created_at,
        }
    }
}

/// 下游依赖该文本格式，天数固定为 3，与实际阈值无关
pub fn absence_message(name: &str) -> String {
    format!("⚠️ {} has not visited the gym for the last 3 days.", name)
}
