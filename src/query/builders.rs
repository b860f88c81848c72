//! Named analytical queries.
//!
//! Fixed, parameter-free requests against the local analytics store. They
//! always target [`RoutingTarget::Local`].

use super::{QueryRequest, RoutingTarget};

/// Revenue total and transaction count over the trailing month.
pub const AGGREGATE_KPIS_SQL: &str = r#"
SELECT
    'Total Revenue' AS name,
    SUM(amount) AS value,
    'monthly' AS period
FROM transactions
WHERE timestamp >= date('now', '-1 month')
UNION ALL
SELECT
    'Transaction Count' AS name,
    COUNT(*) AS value,
    'monthly' AS period
FROM transactions
WHERE timestamp >= date('now', '-1 month')
"#;

/// Stores ranked by trailing-month revenue.
pub const STORE_RANKING_SQL: &str = r#"
SELECT
    s.name,
    s.location,
    s.region,
    COUNT(t.id) AS transaction_count,
    SUM(t.amount) AS total_revenue,
    AVG(t.amount) AS avg_transaction
FROM stores s
LEFT JOIN transactions t ON s.id = t.storeId
WHERE t.timestamp >= date('now', '-1 month')
GROUP BY s.id, s.name, s.location, s.region
ORDER BY total_revenue DESC
"#;

/// Daily transaction volume over the trailing 30 days.
pub const TRANSACTION_TRENDS_SQL: &str = r#"
SELECT
    date(timestamp) AS date,
    COUNT(*) AS transaction_count,
    SUM(amount) AS daily_revenue,
    AVG(amount) AS avg_order_value
FROM transactions
WHERE timestamp >= date('now', '-30 days')
GROUP BY date(timestamp)
ORDER BY date
"#;

pub fn aggregate_kpis() -> QueryRequest {
    QueryRequest::new(AGGREGATE_KPIS_SQL).with_target(RoutingTarget::Local)
}

pub fn store_ranking() -> QueryRequest {
    QueryRequest::new(STORE_RANKING_SQL).with_target(RoutingTarget::Local)
}

pub fn transaction_trends() -> QueryRequest {
    QueryRequest::new(TRANSACTION_TRENDS_SQL).with_target(RoutingTarget::Local)
}
