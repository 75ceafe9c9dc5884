//! Disk products offered for purchase.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::common::gb_to_tb;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Enumerates the fixed disk SKUs the planner can recommend.
pub enum ProductSku {
    Disk256,
    Disk512,
    Disk1TB,
}

impl ProductSku {
    /// Every SKU, in catalogue order.
    pub const ALL: [ProductSku; 3] = [ProductSku::Disk256, ProductSku::Disk512, ProductSku::Disk1TB];

    /// Capacity of a single unit in gigabytes.
    pub fn capacity_gb(self) -> u32 {
        match self {
            ProductSku::Disk256 => 256,
            ProductSku::Disk512 => 512,
            ProductSku::Disk1TB => 1024,
        }
    }

    pub fn capacity_tb(self) -> f64 {
        gb_to_tb(self.capacity_gb() as f64)
    }

    /// Name under which the product is written to the ledger.
    pub fn display_name(self) -> &'static str {
        match self {
            ProductSku::Disk256 => "Disk 256 GB",
            ProductSku::Disk512 => "Disk 512 GB",
            ProductSku::Disk1TB => "Disk 1 TB",
        }
    }

    /// List price the simulated market fluctuates around.
    pub fn reference_price(self) -> f64 {
        match self {
            ProductSku::Disk256 => 60.0,
            ProductSku::Disk512 => 100.0,
            ProductSku::Disk1TB => 180.0,
        }
    }

    /// Resolves a free-form product name to a SKU.
    ///
    /// Matching ignores case and whitespace and looks for `256`, `512` or
    /// `1tb` in that order. Anything else is unknown.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        if normalized.contains("256") {
            Some(ProductSku::Disk256)
        } else if normalized.contains("512") {
            Some(ProductSku::Disk512)
        } else if normalized.contains("1tb") {
            Some(ProductSku::Disk1TB)
        } else {
            None
        }
    }
}

/// Capacity in GB for a product name, or `None` when the name is unknown.
pub fn capacity_for_name(name: &str) -> Option<u32> {
    ProductSku::from_name(name).map(ProductSku::capacity_gb)
}

impl fmt::Display for ProductSku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Returned when a product name does not map to any SKU.
pub struct UnknownProduct(pub String);

impl fmt::Display for UnknownProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown product `{}`", self.0)
    }
}

impl std::error::Error for UnknownProduct {}

impl FromStr for ProductSku {
    type Err = UnknownProduct;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ProductSku::from_name(value).ok_or_else(|| UnknownProduct(value.to_string()))
    }
}
