mod common;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use common::{approved_tx, link, tx, MemDirectoryStore, MemLedgerStore, MemMarginStore};
use repasse_core::domain::RoleCategory;
use repasse_core::services::analytics::{AnalyticsFilter, AnalyticsService};
use repasse_core::services::CommissionResolver;
use repasse_core::stores::{CustomerRef, Dimension};

fn service(
    directory: Arc<MemDirectoryStore>,
    ledger: Arc<MemLedgerStore>,
    margins: Arc<MemMarginStore>,
) -> AnalyticsService {
    AnalyticsService::new(
        directory.clone(),
        ledger,
        CommissionResolver::new(directory, margins),
    )
}

fn filter(from: (i32, u32, u32), to: (i32, u32, u32)) -> AnalyticsFilter {
    AnalyticsFilter {
        date_from: NaiveDate::from_ymd_opt(from.0, from.1, from.2).unwrap(),
        date_to: NaiveDate::from_ymd_opt(to.0, to.1, to.2).unwrap(),
        customer_id: None,
        brand: None,
        product_type: None,
        dimension: Dimension::Brand,
        compare_previous: false,
    }
}

fn super_admin_directory(admin: Uuid, customer: Uuid) -> Arc<MemDirectoryStore> {
    Arc::new(
        MemDirectoryStore::default()
            .with_user(admin, RoleCategory::SuperAdmin)
            .with_customer(CustomerRef {
                id: customer,
                slug: "iso-a".to_string(),
                name: "ISO A".to_string(),
            }),
    )
}

#[tokio::test]
async fn test_kpis_count_statuses_and_approved_volume() {
    let admin = Uuid::new_v4();
    let customer = Uuid::new_v4();
    let directory = super_admin_directory(admin, customer);
    let margins = Arc::new(MemMarginStore::default());
    let ledger = Arc::new(MemLedgerStore::default().with_transactions(vec![
        approved_tx(customer, (2024, 2, 5), 10_000),
        approved_tx(customer, (2024, 2, 6), 5_000),
        tx(customer, (2024, 2, 7), 2_000, "denied"),
        tx(customer, (2024, 2, 8), 1_000, "pending"),
    ]));

    let overview = service(directory, ledger, margins)
        .overview(admin, &filter((2024, 2, 1), (2024, 2, 29)))
        .await
        .unwrap();

    assert_eq!(overview.kpis.total_count, 4);
    assert_eq!(overview.kpis.authorized_count, 2);
    assert_eq!(overview.kpis.denied_count, 1);
    assert_eq!(overview.kpis.pending_count, 1);
    assert_eq!(overview.kpis.approval_rate_percent, 50.0);
    // Only approved volume counts toward the amount KPI.
    assert_eq!(overview.kpis.authorized_amount, BigDecimal::from(15_000));
}

#[tokio::test]
async fn test_series_is_gap_filled_over_range() {
    let admin = Uuid::new_v4();
    let customer = Uuid::new_v4();
    let directory = super_admin_directory(admin, customer);
    let margins = Arc::new(MemMarginStore::default());
    let ledger = Arc::new(MemLedgerStore::default().with_transactions(vec![
        approved_tx(customer, (2024, 2, 2), 5_000),
    ]));

    let overview = service(directory, ledger, margins)
        .overview(admin, &filter((2024, 2, 1), (2024, 2, 4)))
        .await
        .unwrap();

    assert_eq!(overview.series.len(), 4);
    assert_eq!(overview.series[0].tx_count, 0);
    assert_eq!(overview.series[1].tx_count, 1);
    assert_eq!(overview.series[1].amount, BigDecimal::from(5_000));
    assert_eq!(overview.series[2].tx_count, 0);
    assert_eq!(overview.series[3].tx_count, 0);
}

#[tokio::test]
async fn test_breakdown_by_brand() {
    let admin = Uuid::new_v4();
    let customer = Uuid::new_v4();
    let directory = super_admin_directory(admin, customer);
    let margins = Arc::new(MemMarginStore::default());

    let mut visa = approved_tx(customer, (2024, 2, 5), 10_000);
    visa.brand = "Visa".to_string();
    let mut master = approved_tx(customer, (2024, 2, 6), 4_000);
    master.brand = "Mastercard".to_string();
    let ledger = Arc::new(MemLedgerStore::default().with_transactions(vec![visa, master]));

    let overview = service(directory, ledger, margins)
        .overview(admin, &filter((2024, 2, 1), (2024, 2, 29)))
        .await
        .unwrap();

    assert_eq!(overview.breakdown.len(), 2);
    // Ordered by volume, largest first.
    assert_eq!(overview.breakdown[0].key, "Visa");
    assert_eq!(overview.breakdown[0].amount, BigDecimal::from(10_000));
    assert_eq!(overview.breakdown[1].key, "Mastercard");
}

#[tokio::test]
async fn test_previous_period_mirrors_range_backward() {
    let admin = Uuid::new_v4();
    let customer = Uuid::new_v4();
    let directory = super_admin_directory(admin, customer);
    let margins = Arc::new(MemMarginStore::default());
    // Current period 2024-02-04..06; mirrored previous is 2024-02-01..03.
    let ledger = Arc::new(MemLedgerStore::default().with_transactions(vec![
        approved_tx(customer, (2024, 2, 2), 10_000),
        approved_tx(customer, (2024, 2, 5), 15_000),
        // Before the previous window: must not be counted anywhere.
        approved_tx(customer, (2024, 1, 28), 99_000),
    ]));

    let mut f = filter((2024, 2, 4), (2024, 2, 6));
    f.compare_previous = true;

    let overview = service(directory, ledger, margins)
        .overview(admin, &f)
        .await
        .unwrap();

    assert_eq!(overview.kpis.authorized_amount, BigDecimal::from(15_000));

    let comparison = overview.comparison.unwrap();
    assert_eq!(comparison.previous.authorized_amount, BigDecimal::from(10_000));
    assert_eq!(comparison.previous.total_count, 1);
    // 10k -> 15k is +50%.
    assert_eq!(comparison.volume_change_percent, Some(50.0));
    assert_eq!(comparison.count_change_percent, Some(0.0));
}

#[tokio::test]
async fn test_comparison_with_empty_previous_period_has_no_change_percent() {
    let admin = Uuid::new_v4();
    let customer = Uuid::new_v4();
    let directory = super_admin_directory(admin, customer);
    let margins = Arc::new(MemMarginStore::default());
    let ledger = Arc::new(MemLedgerStore::default().with_transactions(vec![
        approved_tx(customer, (2024, 2, 5), 15_000),
    ]));

    let mut f = filter((2024, 2, 4), (2024, 2, 6));
    f.compare_previous = true;

    let overview = service(directory, ledger, margins)
        .overview(admin, &f)
        .await
        .unwrap();

    let comparison = overview.comparison.unwrap();
    assert_eq!(comparison.previous.total_count, 0);
    assert_eq!(comparison.volume_change_percent, None);
    assert_eq!(comparison.count_change_percent, None);
}

#[tokio::test]
async fn test_scoped_user_sees_only_linked_customers() {
    let user = Uuid::new_v4();
    let linked = Uuid::new_v4();
    let other = Uuid::new_v4();

    let directory = Arc::new(
        MemDirectoryStore::default()
            .with_user(user, RoleCategory::Core)
            .with_links(user, vec![link(linked, "Linked ISO", Some("CORE"))]),
    );
    let margins = Arc::new(MemMarginStore::default());
    let ledger = Arc::new(MemLedgerStore::default().with_transactions(vec![
        approved_tx(linked, (2024, 2, 5), 10_000),
        approved_tx(other, (2024, 2, 5), 50_000),
    ]));

    let overview = service(directory, ledger, margins)
        .overview(user, &filter((2024, 2, 1), (2024, 2, 29)))
        .await
        .unwrap();

    assert_eq!(overview.kpis.total_count, 1);
    assert_eq!(overview.kpis.authorized_amount, BigDecimal::from(10_000));
}

#[tokio::test]
async fn test_user_without_links_gets_zeros_without_ledger_query() {
    let user = Uuid::new_v4();
    let directory = Arc::new(
        MemDirectoryStore::default().with_user(user, RoleCategory::Executivo),
    );
    let margins = Arc::new(MemMarginStore::default());
    let ledger = Arc::new(MemLedgerStore::default().with_transactions(vec![
        approved_tx(Uuid::new_v4(), (2024, 2, 5), 10_000),
    ]));

    let overview = service(directory, ledger.clone(), margins)
        .overview(user, &filter((2024, 2, 1), (2024, 2, 3)))
        .await
        .unwrap();

    assert_eq!(overview.kpis.total_count, 0);
    assert_eq!(overview.series.len(), 3);
    assert!(overview.comparison.is_none());
    assert_eq!(ledger.query_count(), 0);
}
