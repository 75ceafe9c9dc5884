//! Purchase records kept by the ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::{expiry_date, gb_to_tb},
    product::ProductSku,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseRecord {
    pub id: Uuid,
    pub product: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub order_date: NaiveDate,
}

impl PurchaseRecord {
    pub fn new(
        product: impl Into<String>,
        quantity: u32,
        unit_price: f64,
        order_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product: product.into(),
            quantity,
            unit_price,
            order_date,
        }
    }

    /// SKU the stored product name resolves to, if any.
    pub fn sku(&self) -> Option<ProductSku> {
        ProductSku::from_name(&self.product)
    }

    /// Total purchased capacity in GB, `None` for unknown products.
    pub fn capacity_gb(&self) -> Option<u64> {
        self.sku()
            .map(|sku| sku.capacity_gb() as u64 * self.quantity as u64)
    }

    pub fn capacity_tb(&self) -> Option<f64> {
        self.capacity_gb().map(|gb| gb_to_tb(gb as f64))
    }

    pub fn expires_on(&self) -> NaiveDate {
        expiry_date(self.order_date)
    }

    /// Whether the purchase still counts as capacity on `as_of`.
    pub fn is_active_on(&self, as_of: NaiveDate) -> bool {
        self.expires_on() > as_of
    }

    pub fn total_cost(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}
