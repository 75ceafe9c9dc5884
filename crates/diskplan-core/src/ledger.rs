//! Purchase ledger contract and the in-memory implementation.

use chrono::NaiveDate;
use diskplan_domain::PurchaseRecord;
use tracing::debug;

use crate::CoreError;

/// Append-only store of purchase records.
///
/// Failures are returned to the caller as-is; implementations never retry.
pub trait PurchaseLedger {
    fn append(
        &mut self,
        product: &str,
        quantity: u32,
        unit_price: f64,
        order_date: NaiveDate,
    ) -> Result<PurchaseRecord, CoreError>;

    /// Every record, ordered by order date ascending.
    fn read_all(&self) -> Result<Vec<PurchaseRecord>, CoreError>;

    fn clear(&mut self) -> Result<(), CoreError>;
}

/// Checks the fields of a purchase before it is written to any ledger.
pub fn validate_purchase(product: &str, quantity: u32, unit_price: f64) -> Result<(), CoreError> {
    if product.trim().is_empty() {
        return Err(CoreError::Validation("product name must not be empty".into()));
    }
    if quantity == 0 {
        return Err(CoreError::Validation(format!(
            "quantity for `{}` must be greater than zero",
            product
        )));
    }
    if !unit_price.is_finite() || unit_price <= 0.0 {
        return Err(CoreError::Validation(format!(
            "unit price for `{}` must be a positive amount, got {}",
            product, unit_price
        )));
    }
    Ok(())
}

/// Sorts records by order date, keeping insertion order for equal dates.
pub fn sort_by_order_date(records: &mut [PurchaseRecord]) {
    records.sort_by_key(|record| record.order_date);
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    records: Vec<PurchaseRecord>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl PurchaseLedger for InMemoryLedger {
    fn append(
        &mut self,
        product: &str,
        quantity: u32,
        unit_price: f64,
        order_date: NaiveDate,
    ) -> Result<PurchaseRecord, CoreError> {
        validate_purchase(product, quantity, unit_price)?;
        let record = PurchaseRecord::new(product, quantity, unit_price, order_date);
        debug!(product, quantity, unit_price, %order_date, "appending purchase");
        self.records.push(record.clone());
        Ok(record)
    }

    fn read_all(&self) -> Result<Vec<PurchaseRecord>, CoreError> {
        let mut records = self.records.clone();
        sort_by_order_date(&mut records);
        Ok(records)
    }

    fn clear(&mut self) -> Result<(), CoreError> {
        self.records.clear();
        Ok(())
    }
}
