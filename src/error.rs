use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] surrealdb::Error),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Absence check failed for customer {customer_id}: {source}")]
    CustomerCheck {
        customer_id: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// 便利函数，用于创建常见错误
impl AppError {
    pub fn conflict(msg: &str) -> Self {
        Self::Conflict(msg.to_string())
    }

    pub fn internal(msg: &str) -> Self {
        Self::Internal(msg.to_string())
    }

    /// 将单个客户的失败包装为带客户ID的错误
    pub fn customer_check(customer_id: &str, source: AppError) -> Self {
        Self::CustomerCheck {
            customer_id: customer_id.to_string(),
            source: Box::new(source),
        }
    }

    /// 是否为致命错误（无法继续本次检查）
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_) | AppError::Config(_))
    }
}

// 从其他错误类型转换
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
