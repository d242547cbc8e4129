use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AttendanceRecord, Customer, Notification};

pub const CUSTOMERS_TABLE: &str = "customers";
pub const ATTENDANCE_TABLE: &str = "attendance";
pub const NOTIFICATIONS_TABLE: &str = "notifications";

/// 缺勤检查所需的存储能力
///
/// 实现方只负责读写，不做任何判定逻辑。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 所有被跟踪的会员
    async fn list_customers(&self) -> Result<Vec<Customer>>;

    /// 会员最近一次到馆记录（按时间倒序取第一条）
    async fn latest_attendance(&self, customer_id: &str) -> Result<Option<AttendanceRecord>>;

    /// 会员最近一条提醒（按创建时间倒序取第一条）
    async fn latest_notification(&self, customer_id: &str) -> Result<Option<Notification>>;

    /// 以提醒ID为键写入新记录，ID 冲突时返回 `AppError::Conflict`
    async fn write_notification(&self, notification: &Notification) -> Result<()>;
}
