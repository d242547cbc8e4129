use crate::{
    config::Config,
    error::{AppError, Result},
    models::{Customer, Notification},
    services::store::RecordStore,
    utils::clock::{Clock, SystemClock},
};
use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_THRESHOLD_DAYS: i64 = 3;
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// 缺勤检查参数
#[derive(Debug, Clone)]
pub struct ReconcilerOptions {
    /// 连续未到馆天数阈值（含）
    pub threshold_days: i64,
    pub clock: Arc<dyn Clock>,
    /// 设置后，冷却期内已有提醒的会员不再重复提醒
    pub cooldown: Option<Duration>,
    pub max_concurrency: usize,
    /// 首个会员出错即中止整次检查
    pub fail_fast: bool,
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            threshold_days: DEFAULT_THRESHOLD_DAYS,
            clock: Arc::new(SystemClock),
            cooldown: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            fail_fast: false,
        }
    }
}

impl ReconcilerOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        let cooldown = match config.notification_cooldown_hours {
            Some(hours) => Some(Duration::try_hours(hours).ok_or_else(|| {
                AppError::Config(format!("notification cooldown of {} hours is out of range", hours))
            })?),
            None => None,
        };

        Ok(Self {
            threshold_days: config.inactivity_threshold_days,
            cooldown,
            max_concurrency: config.check_concurrency,
            fail_fast: config.fail_fast,
            ..Self::default()
        })
    }

    /// fail-fast 时逐个检查，出错后剩余会员不会被处理
    fn effective_concurrency(&self) -> usize {
        if self.fail_fast {
            1
        } else {
            self.max_concurrency.max(1)
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_threshold_days(mut self, days: i64) -> Self {
        self.threshold_days = days;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// 单个会员的判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inactivity {
    /// 没有任何到馆记录
    NoHistory,
    /// 距上次到馆已达阈值
    Inactive { days: i64 },
    /// 仍在阈值内
    Active { days: i64 },
}

impl Inactivity {
    pub fn qualifies(&self) -> bool {
        !matches!(self, Inactivity::Active { .. })
    }
}

/// 整天数向下取整：2 天 23 小时记为 2 天
pub fn days_since(last: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let elapsed = now - last;
    let days = elapsed.num_days();
    // num_days 向零取整，未来时间需要向下修正
    if elapsed < Duration::zero() && elapsed != Duration::days(days) {
        days - 1
    } else {
        days
    }
}

pub fn evaluate(last: Option<DateTime<Utc>>, now: DateTime<Utc>, threshold_days: i64) -> Inactivity {
    match last {
        None => Inactivity::NoHistory,
        Some(last) => {
            let days = days_since(last, now);
            if days >= threshold_days {
                Inactivity::Inactive { days }
            } else {
                Inactivity::Active { days }
            }
        }
    }
}

#[derive(Debug, Clone)]
enum CheckOutcome {
    Notified(Notification),
    Active,
    Suppressed,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerFailure {
    pub customer_id: String,
    pub error: String,
}

/// 一次检查的汇总
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub customers_scanned: usize,
    pub notifications: Vec<Notification>,
    pub active: usize,
    pub suppressed: usize,
    pub failures: Vec<CustomerFailure>,
}

impl RunReport {
    fn new(started_at: DateTime<Utc>, customers_scanned: usize) -> Self {
        Self {
            started_at,
            customers_scanned,
            notifications: Vec::new(),
            active: 0,
            suppressed: 0,
            failures: Vec::new(),
        }
    }

    pub fn notified(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 缺勤检查：每次触发扫描全部会员并为缺勤者写入提醒
///
/// 同一会员在多次运行中会收到多条提醒（ID 各不相同），
/// 除非配置了 `cooldown`。
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn RecordStore>,
    options: ReconcilerOptions,
}

impl Reconciler {
    pub fn new(store: Arc<dyn RecordStore>, options: ReconcilerOptions) -> Self {
        Self { store, options }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let now = self.options.clock.now();

        let customers = self.store.list_customers().await.map_err(|e| {
            warn!("Failed to list customers: {}", e);
            AppError::StoreUnavailable(e.to_string())
        })?;

        info!(
            "Starting absence check for {} customers (threshold {} days)",
            customers.len(),
            self.options.threshold_days
        );

        let mut report = RunReport::new(now, customers.len());
        let mut checks = stream::iter(customers)
            .map(|customer| async move {
                let outcome = self.check_customer(&customer, now).await;
                (customer, outcome)
            })
            .buffer_unordered(self.options.effective_concurrency());

        while let Some((customer, outcome)) = checks.next().await {
            match outcome {
                Ok(CheckOutcome::Notified(notification)) => report.notifications.push(notification),
                Ok(CheckOutcome::Active) => report.active += 1,
                Ok(CheckOutcome::Suppressed) => report.suppressed += 1,
                Err(e) if self.options.fail_fast => {
                    return Err(AppError::customer_check(&customer.id, e));
                }
                Err(e) => {
                    warn!("Absence check failed for customer {}: {}", customer.id, e);
                    report.failures.push(CustomerFailure {
                        customer_id: customer.id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Absence check finished: scanned={} notified={} active={} suppressed={} failed={}",
            report.customers_scanned,
            report.notified(),
            report.active,
            report.suppressed,
            report.failures.len()
        );

        Ok(report)
    }

    async fn check_customer(&self, customer: &Customer, now: DateTime<Utc>) -> Result<CheckOutcome> {
        let last = self.store.latest_attendance(&customer.id).await?;
        let inactivity = evaluate(last.map(|r| r.timestamp), now, self.options.threshold_days);

        if !inactivity.qualifies() {
            debug!("Customer {} is active: {:?}", customer.id, inactivity);
            return Ok(CheckOutcome::Active);
        }

        if let Some(cooldown) = self.options.cooldown {
            if let Some(previous) = self.store.latest_notification(&customer.id).await? {
                if now - previous.created_at < cooldown {
                    debug!(
                        "Skipping customer {}: notified at {}",
                        customer.id, previous.created_at
                    );
                    return Ok(CheckOutcome::Suppressed);
                }
            }
        }

        let notification = Notification::absence(customer, now);
        self.store.write_notification(&notification).await?;

        debug!(
            "Notified customer {} ({:?}) with notification {}",
            customer.id, inactivity, notification.id
        );
        Ok(CheckOutcome::Notified(notification))
    }
}
