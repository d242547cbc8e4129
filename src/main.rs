use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use absence_watch::{
    config::Config,
    services::{Database, Reconciler, ReconcilerOptions},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置
    dotenv::dotenv().ok();

    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("LOG_LEVEL").unwrap_or_else(|_| "absence_watch=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting absence-watch...");

    let config = Config::from_env()?;
    info!("Environment: {}", config.environment);

    // 初始化数据库连接
    let db = match Database::new(&config).await {
        Ok(db) => {
            db.verify_connection().await?;
            info!("Database connection established successfully");
            db
        }
        Err(e) => {
            error!("Failed to create database connection: {}", e);
            return Err(anyhow::anyhow!("Database initialization failed"));
        }
    };

    let reconciler = Reconciler::new(Arc::new(db), ReconcilerOptions::from_config(&config)?);

    if config.run_once {
        let report = reconciler.run().await?;
        info!("Single run finished with {} notifications", report.notified());
        return Ok(());
    }

    run_schedule(&reconciler, &config).await;

    info!("absence-watch stopped");
    Ok(())
}

/// 按固定间隔触发检查，上一轮结束后才会等待下一次触发
async fn run_schedule(reconciler: &Reconciler, config: &Config) {
    info!(
        "Scheduling absence check every {} seconds",
        config.check_interval_secs
    );

    let mut ticker = interval(Duration::from_secs(config.check_interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match reconciler.run().await {
                    Ok(report) if !report.is_clean() => {
                        warn!(
                            "Absence check completed with {} failed customers",
                            report.failures.len()
                        );
                    }
                    Ok(_) => {}
                    Err(e) => error!("Absence check failed: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }
}
