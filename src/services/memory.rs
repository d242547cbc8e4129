use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::{AppError, Result};
use crate::models::{AttendanceRecord, Customer, Notification};
use crate::services::store::RecordStore;

/// 进程内存储，用于测试和本地演练
#[derive(Debug, Default)]
pub struct InMemoryStore {
    customers: RwLock<Vec<Customer>>,
    attendance: RwLock<HashMap<String, Vec<AttendanceRecord>>>,
    notifications: RwLock<HashMap<String, Notification>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_customer(&self, customer: Customer) {
        self.customers.write().push(customer);
    }

    pub fn record_attendance(&self, record: AttendanceRecord) {
        self.attendance
            .write()
            .entry(record.customer_id.clone())
            .or_default()
            .push(record);
    }

    /// 所有提醒，按创建时间排序
    pub fn notifications(&self) -> Vec<Notification> {
        let mut all: Vec<Notification> = self.notifications.read().values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        all
    }

    pub fn notifications_for(&self, customer_id: &str) -> Vec<Notification> {
        self.notifications()
            .into_iter()
            .filter(|n| n.customer_id == customer_id)
            .collect()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn list_customers(&self) -> Result<Vec<Customer>> {
        Ok(self.customers.read().clone())
    }

    async fn latest_attendance(&self, customer_id: &str) -> Result<Option<AttendanceRecord>> {
        Ok(self
            .attendance
            .read()
            .get(customer_id)
            .and_then(|records| records.iter().max_by_key(|r| r.timestamp))
            .cloned())
    }

    async fn latest_notification(&self, customer_id: &str) -> Result<Option<Notification>> {
        Ok(self
            .notifications
            .read()
            .values()
            .filter(|n| n.customer_id == customer_id)
            .max_by_key(|n| n.created_at)
            .cloned())
    }

    async fn write_notification(&self, notification: &Notification) -> Result<()> {
        let mut notifications = self.notifications.write();
        if notifications.contains_key(&notification.id) {
            return Err(AppError::Conflict(format!(
                "notification {} already exists",
                notification.id
            )));
        }
        notifications.insert(notification.id.clone(), notification.clone());
        Ok(())
    }
}
