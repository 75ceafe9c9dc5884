//! Capacity bought through the ledger, with and without expiry.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use diskplan_domain::{first_of_month, gb_to_tb, ProductSku, PurchaseRecord, SeriesPoint};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
/// Disks whose expiry date has been reached.
pub struct ExpiredSummary {
    pub disks: u32,
    pub capacity_tb: f64,
}

impl ExpiredSummary {
    pub fn is_empty(&self) -> bool {
        self.disks == 0
    }
}

/// Records whose product resolves to a SKU, paired with that SKU.
pub fn known_records(
    records: &[PurchaseRecord],
) -> impl Iterator<Item = (&PurchaseRecord, ProductSku)> + '_ {
    records
        .iter()
        .filter_map(|record| record.sku().map(|sku| (record, sku)))
}

/// Capacity in TB from purchases still inside their expiry window on `as_of`.
///
/// A purchase whose expiry date equals `as_of` no longer counts.
pub fn active_capacity(records: &[PurchaseRecord], as_of: NaiveDate) -> f64 {
    known_records(records)
        .filter(|(record, _)| record.is_active_on(as_of))
        .map(|(record, sku)| unit_capacity_tb(sku, record.quantity))
        .sum()
}

/// Capacity in TB from every known purchase, ignoring expiry.
pub fn total_purchased_capacity(records: &[PurchaseRecord]) -> f64 {
    known_records(records)
        .map(|(record, sku)| unit_capacity_tb(sku, record.quantity))
        .sum()
}

/// Running total of purchased capacity per order month, ignoring expiry.
pub fn cumulative_capacity(records: &[PurchaseRecord]) -> Vec<SeriesPoint> {
    let mut per_month: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (record, sku) in known_records(records) {
        *per_month.entry(first_of_month(record.order_date)).or_default() +=
            unit_capacity_tb(sku, record.quantity);
    }
    let mut total = 0.0;
    per_month
        .into_iter()
        .map(|(month, tb)| {
            total += tb;
            SeriesPoint::new(month, total)
        })
        .collect()
}

/// Capacity in TB purchased in or before the month of `as_of`, ignoring expiry.
pub fn cumulative_capacity_through(records: &[PurchaseRecord], as_of: NaiveDate) -> f64 {
    let month = first_of_month(as_of);
    cumulative_capacity(records)
        .into_iter()
        .take_while(|point| point.date <= month)
        .last()
        .map(|point| point.value)
        .unwrap_or(0.0)
}

/// Disks that have expired on or before `as_of`.
pub fn expired_summary(records: &[PurchaseRecord], as_of: NaiveDate) -> ExpiredSummary {
    known_records(records)
        .filter(|(record, _)| !record.is_active_on(as_of))
        .fold(ExpiredSummary::default(), |mut acc, (record, sku)| {
            acc.disks += record.quantity;
            acc.capacity_tb += unit_capacity_tb(sku, record.quantity);
            acc
        })
}

fn unit_capacity_tb(sku: ProductSku, quantity: u32) -> f64 {
    gb_to_tb(sku.capacity_gb() as f64 * quantity as f64)
}
