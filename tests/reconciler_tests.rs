use absence_watch::{
    models::{AttendanceRecord, Customer},
    services::{InMemoryStore, Reconciler, ReconcilerOptions},
    utils::clock::FixedClock,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::Arc;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap()
}

fn setup() -> (Arc<InMemoryStore>, Arc<FixedClock>) {
    (Arc::new(InMemoryStore::new()), Arc::new(FixedClock::new(now())))
}

fn reconciler(store: &Arc<InMemoryStore>, clock: &Arc<FixedClock>) -> Reconciler {
    Reconciler::new(
        store.clone(),
        ReconcilerOptions::default().with_clock(clock.clone()),
    )
}

#[tokio::test]
async fn test_inactive_customer_notified_active_customer_skipped() {
    let (store, clock) = setup();
    store.add_customer(Customer::new("c1", "Alice"));
    store.add_customer(Customer::new("c2", "Bob"));
    store.record_attendance(AttendanceRecord::new("c1", now() - Duration::days(5)));
    store.record_attendance(AttendanceRecord::new("c2", now() - Duration::days(1)));

    let report = reconciler(&store, &clock).run().await.unwrap();

    let notifications = store.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].customer_id, "c1");
    assert_eq!(notifications[0].customer_name, "Alice");
    assert_eq!(
        notifications[0].message,
        "⚠️ Alice has not visited the gym for the last 3 days."
    );
    assert_eq!(notifications[0].created_at, now());
    assert!(store.notifications_for("c2").is_empty());

    assert_eq!(report.customers_scanned, 2);
    assert_eq!(report.notified(), 1);
    assert_eq!(report.active, 1);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_customer_without_attendance_is_notified() {
    let (store, clock) = setup();
    store.add_customer(Customer::new("c3", "Carol"));

    reconciler(&store, &clock).run().await.unwrap();

    let notifications = store.notifications_for("c3");
    assert_eq!(notifications.len(), 1);
    assert_eq!(
        notifications[0].message,
        "⚠️ Carol has not visited the gym for the last 3 days."
    );
}

#[tokio::test]
async fn test_exactly_three_days_is_notified() {
    let (store, clock) = setup();
    store.add_customer(Customer::new("c1", "Alice"));
    store.record_attendance(AttendanceRecord::new("c1", now() - Duration::days(3)));

    reconciler(&store, &clock).run().await.unwrap();

    assert_eq!(store.notifications_for("c1").len(), 1);
}

#[tokio::test]
async fn test_two_days_twenty_three_hours_is_not_notified() {
    let (store, clock) = setup();
    store.add_customer(Customer::new("c1", "Alice"));
    store.record_attendance(AttendanceRecord::new(
        "c1",
        now() - Duration::days(2) - Duration::hours(23),
    ));

    let report = reconciler(&store, &clock).run().await.unwrap();

    assert!(store.notifications().is_empty());
    assert_eq!(report.active, 1);
}

#[tokio::test]
async fn test_only_latest_attendance_counts() {
    let (store, clock) = setup();
    store.add_customer(Customer::new("c1", "Alice"));
    store.record_attendance(AttendanceRecord::new("c1", now() - Duration::days(20)));
    store.record_attendance(AttendanceRecord::new("c1", now() - Duration::hours(6)));

    reconciler(&store, &clock).run().await.unwrap();

    assert!(store.notifications().is_empty());
}

// 重复运行会产生重复提醒，下游需自行去重
#[tokio::test]
async fn test_rerun_without_cooldown_duplicates_notifications() {
    let (store, clock) = setup();
    store.add_customer(Customer::new("c1", "Alice"));

    let reconciler = reconciler(&store, &clock);
    reconciler.run().await.unwrap();
    reconciler.run().await.unwrap();

    let notifications = store.notifications_for("c1");
    assert_eq!(notifications.len(), 2);
    assert_ne!(notifications[0].id, notifications[1].id);
}

#[tokio::test]
async fn test_cooldown_dedupes_until_window_passes() {
    let (store, clock) = setup();
    store.add_customer(Customer::new("c1", "Alice"));

    let reconciler = Reconciler::new(
        store.clone(),
        ReconcilerOptions::default()
            .with_clock(clock.clone())
            .with_cooldown(Duration::hours(24)),
    );

    reconciler.run().await.unwrap();
    let report = reconciler.run().await.unwrap();
    assert_eq!(report.suppressed, 1);
    assert_eq!(store.notifications_for("c1").len(), 1);

    clock.advance(Duration::hours(24));
    let report = reconciler.run().await.unwrap();
    assert_eq!(report.notified(), 1);
    assert_eq!(store.notifications_for("c1").len(), 2);
}

#[tokio::test]
async fn test_custom_threshold_moves_cutoff_but_message_stays_fixed() {
    let (store, clock) = setup();
    store.add_customer(Customer::new("c1", "Alice"));
    store.add_customer(Customer::new("c2", "Bob"));
    store.record_attendance(AttendanceRecord::new("c1", now() - Duration::days(8)));
    store.record_attendance(AttendanceRecord::new("c2", now() - Duration::days(4)));

    let reconciler = Reconciler::new(
        store.clone(),
        ReconcilerOptions::default()
            .with_clock(clock.clone())
            .with_threshold_days(7),
    );
    let report = reconciler.run().await.unwrap();

    assert_eq!(report.active, 1);
    let notifications = store.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].customer_id, "c1");
    assert_eq!(
        notifications[0].message,
        "⚠️ Alice has not visited the gym for the last 3 days."
    );
}

#[tokio::test]
async fn test_large_population_gets_unique_ids() {
    let (store, clock) = setup();
    for i in 0..200 {
        let id = format!("c{}", i);
        store.add_customer(Customer::new(id.clone(), format!("Member {}", i)));
        if i % 2 == 0 {
            store.record_attendance(AttendanceRecord::new(id, now() - Duration::hours(12)));
        }
    }

    let reconciler = Reconciler::new(
        store.clone(),
        ReconcilerOptions::default()
            .with_clock(clock.clone())
            .with_max_concurrency(16),
    );
    let report = reconciler.run().await.unwrap();

    assert_eq!(report.customers_scanned, 200);
    assert_eq!(report.notified(), 100);
    assert_eq!(report.active, 100);

    let notifications = store.notifications();
    let ids: HashSet<_> = notifications.iter().map(|n| n.id.clone()).collect();
    assert_eq!(ids.len(), 100);
    assert!(notifications.iter().all(|n| !n.id.is_empty()));
    assert!(notifications
        .iter()
        .all(|n| n.message == format!("⚠️ {} has not visited the gym for the last 3 days.", n.customer_name)));
}

#[tokio::test]
async fn test_empty_store_completes() {
    let (store, clock) = setup();

    let report = reconciler(&store, &clock).run().await.unwrap();

    assert_eq!(report.customers_scanned, 0);
    assert!(report.is_clean());
    assert!(store.notifications().is_empty());
}
