use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{AttendanceRecord, Customer, Notification};
use crate::services::store::{RecordStore, ATTENDANCE_TABLE, CUSTOMERS_TABLE, NOTIFICATIONS_TABLE};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::engine::remote::http::{Client, Http};
use surrealdb::opt::auth::Root;
use surrealdb::{Response, Surreal};
use tracing::{debug, error, info};

/// HTTP 引擎把服务端错误作为 `Api::Query` 文本返回，记录已存在时为
/// "Database record `notifications:<id>` already exists"
const RECORD_EXISTS_SUFFIX: &str = "already exists";

/// 数据库服务
#[derive(Clone)]
pub struct Database {
    pub client: Surreal<Client>,
    pub config: Config,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerRow {
    customer_id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationRow {
    notification_id: String,
    customer_id: String,
    customer_name: String,
    message: String,
    created_at: DateTime<Utc>,
}

/// 写入时的文档内容，记录ID 由 `type::thing` 指定
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NotificationContent<'a> {
    customer_id: &'a str,
    customer_name: &'a str,
    message: &'a str,
    created_at: DateTime<Utc>,
}

impl Database {
    /// 创建新的数据库实例
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Initializing database connection to {}", config.database_url);

        let address = strip_scheme(&config.database_url);
        let client = Surreal::new::<Http>(address).await?;

        client
            .signin(Root {
                username: &config.database_username,
                password: &config.database_password,
            })
            .await?;

        client
            .use_ns(&config.database_namespace)
            .use_db(&config.database_name)
            .await?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// 验证数据库连接
    pub async fn verify_connection(&self) -> Result<()> {
        match self.client.health().await {
            Ok(_) => {
                info!("Database connection verified successfully");
                Ok(())
            }
            Err(e) => {
                error!("Failed to verify database connection: {}", e);
                Err(AppError::from(e))
            }
        }
    }

    /// 执行原始SQL查询
    pub async fn query(&self, sql: &str) -> Result<Response> {
        debug!("Executing query: {}", sql);
        let response = self.client.query(sql).await?;
        Ok(response.check()?)
    }

    /// 执行带参数的查询
    pub async fn query_with_params<P>(&self, sql: &str, params: P) -> Result<Response>
    where
        P: Serialize,
    {
        debug!("Executing query: {}", sql);
        let response = self.client.query(sql).bind(params).await?;
        Ok(response.check()?)
    }
}

#[async_trait]
impl RecordStore for Database {
    async fn list_customers(&self) -> Result<Vec<Customer>> {
        let query = format!("SELECT meta::id(id) AS customerId, name FROM {}", CUSTOMERS_TABLE);
        let mut response = self.query(&query).await?;
        let rows: Vec<CustomerRow> = response.take(0)?;

        Ok(rows
            .into_iter()
            .map(|row| Customer {
                id: row.customer_id,
                name: row.name,
            })
            .collect())
    }

    async fn latest_attendance(&self, customer_id: &str) -> Result<Option<AttendanceRecord>> {
        let query = format!(
            r#"
                SELECT customerId, timestamp FROM {}
                WHERE customerId = $customer_id
                ORDER BY timestamp DESC
                LIMIT 1
            "#,
            ATTENDANCE_TABLE
        );
        let mut response = self
            .query_with_params(&query, serde_json::json!({ "customer_id": customer_id }))
            .await?;
        let records: Vec<AttendanceRecord> = response.take(0)?;
        Ok(records.into_iter().next())
    }

    async fn latest_notification(&self, customer_id: &str) -> Result<Option<Notification>> {
        let query = format!(
            r#"
                SELECT meta::id(id) AS notificationId, customerId, customerName, message, createdAt
                FROM {}
                WHERE customerId = $customer_id
                ORDER BY createdAt DESC
                LIMIT 1
            "#,
            NOTIFICATIONS_TABLE
        );
        let mut response = self
            .query_with_params(&query, serde_json::json!({ "customer_id": customer_id }))
            .await?;
        let rows: Vec<NotificationRow> = response.take(0)?;

        Ok(rows.into_iter().next().map(|row| Notification {
            id: row.notification_id,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            message: row.message,
            created_at: row.created_at,
        }))
    }

    async fn write_notification(&self, notification: &Notification) -> Result<()> {
        let content = NotificationContent {
            customer_id: &notification.customer_id,
            customer_name: &notification.customer_name,
            message: &notification.message,
            created_at: notification.created_at,
        };

        // CREATE 在记录已存在时报错，不会覆盖
        let query = "CREATE type::thing($table, $id) CONTENT $data";
        let result = self
            .query_with_params(
                query,
                serde_json::json!({
                    "table": NOTIFICATIONS_TABLE,
                    "id": notification.id,
                    "data": serde_json::to_value(&content)?,
                }),
            )
            .await;

        match result {
            Ok(_) => {
                debug!("Created notification {}", notification.id);
                Ok(())
            }
            Err(AppError::Database(e)) if is_record_exists(&e) => {
                Err(AppError::Conflict(format!(
                    "notification {} already exists",
                    notification.id
                )))
            }
            Err(e) => Err(e),
        }
    }
}

fn is_record_exists(err: &surrealdb::Error) -> bool {
    match err {
        surrealdb::Error::Api(surrealdb::error::Api::Query(message)) => {
            message.trim_end().ends_with(RECORD_EXISTS_SUFFIX)
        }
        _ => false,
    }
}

/// HTTP 引擎只接受 `host:port`
fn strip_scheme(url: &str) -> &str {
    url.trim_start_matches("http://")
        .trim_start_matches("https://")
        .trim_end_matches('/')
}
