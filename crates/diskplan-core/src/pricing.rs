//! Unit price estimation, simulated market quotes and price statistics.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use diskplan_domain::{first_of_month, year_month_key, PriceHistory, ProductSku, PurchaseRecord, SeriesPoint};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::warn;

use crate::{capacity::known_records, forecast::last_prediction, CoreError, Forecaster};

/// Below this many samples a product's price is the plain mean.
pub const MIN_PRICE_SAMPLES_FOR_FORECAST: usize = 5;

const QUOTE_VOLATILITY: f64 = 0.1;

/// Projected unit price from a product's price history.
///
/// Returns `None` for an empty history, the mean for short histories and the
/// last forecast value otherwise. A forecast that is not a positive number
/// falls back to the mean.
pub fn estimate_price(
    history: &[SeriesPoint],
    forecaster: &dyn Forecaster,
    horizon: usize,
) -> Result<Option<f64>, CoreError> {
    if history.is_empty() {
        return Ok(None);
    }
    let mean = mean_value(history);
    if history.len() < MIN_PRICE_SAMPLES_FOR_FORECAST {
        return Ok(Some(mean));
    }
    let forecast = forecaster.forecast(history, horizon)?;
    match last_prediction(&forecast) {
        Some(price) if price.is_finite() && price > 0.0 => Ok(Some(price)),
        other => {
            warn!(
                ?other,
                mean, "price forecast unusable, falling back to mean price"
            );
            Ok(Some(mean))
        }
    }
}

/// Projected unit price per product. Products without history are omitted.
pub fn estimate_prices(
    history_by_product: &BTreeMap<ProductSku, Vec<SeriesPoint>>,
    forecaster: &dyn Forecaster,
    horizon: usize,
) -> Result<BTreeMap<ProductSku, f64>, CoreError> {
    let mut prices = BTreeMap::new();
    for (product, history) in history_by_product {
        if let Some(price) = estimate_price(history, forecaster, horizon)? {
            prices.insert(*product, price);
        }
    }
    Ok(prices)
}

/// Purchase prices per SKU in order-date order.
///
/// SKUs that were never purchased use the recorded market snapshots instead.
pub fn price_history_by_product(
    records: &[PurchaseRecord],
    snapshots: &PriceHistory,
) -> BTreeMap<ProductSku, Vec<SeriesPoint>> {
    let mut history: BTreeMap<ProductSku, Vec<SeriesPoint>> = BTreeMap::new();
    for (record, sku) in known_records(records) {
        history
            .entry(sku)
            .or_default()
            .push(SeriesPoint::new(record.order_date, record.unit_price));
    }
    for sku in ProductSku::ALL {
        if history.contains_key(&sku) {
            continue;
        }
        let points = snapshots.points(sku);
        if !points.is_empty() {
            history.insert(sku, points);
        }
    }
    history
}

/// Simulated market price of `sku` during the month of `date`.
///
/// Reproducible per (month, product): the generator is seeded from the
/// `YYYYMM` key plus the character codes of the product name.
pub fn quote_price(sku: ProductSku, date: NaiveDate) -> f64 {
    let name_key: u64 = sku.display_name().chars().map(|c| c as u64).sum();
    let mut rng = StdRng::seed_from_u64(year_month_key(date) as u64 + name_key);
    let factor = Normal::new(1.0, QUOTE_VOLATILITY)
        .map(|normal| normal.sample(&mut rng))
        .unwrap_or(1.0);
    round_price(sku.reference_price() * factor)
}

/// Rounds an amount to whole cents.
pub fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSummary {
    pub product: ProductSku,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

/// Mean, minimum and maximum purchase price for every purchased SKU.
pub fn price_summary(records: &[PurchaseRecord]) -> Vec<PriceSummary> {
    let mut grouped: BTreeMap<ProductSku, Vec<f64>> = BTreeMap::new();
    for (record, sku) in known_records(records) {
        grouped.entry(sku).or_default().push(record.unit_price);
    }
    grouped
        .into_iter()
        .map(|(product, prices)| PriceSummary {
            product,
            mean: prices.iter().sum::<f64>() / prices.len() as f64,
            min: prices.iter().copied().fold(f64::INFINITY, f64::min),
            max: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            samples: prices.len(),
        })
        .collect()
}

/// Average purchase price of `sku` per order month.
pub fn monthly_average_prices(records: &[PurchaseRecord], sku: ProductSku) -> Vec<SeriesPoint> {
    let mut per_month: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for (record, _) in known_records(records).filter(|(_, record_sku)| *record_sku == sku) {
        let entry = per_month
            .entry(first_of_month(record.order_date))
            .or_insert((0.0, 0));
        entry.0 += record.unit_price;
        entry.1 += 1;
    }
    per_month
        .into_iter()
        .map(|(month, (sum, count))| SeriesPoint::new(month, sum / count as f64))
        .collect()
}

fn mean_value(points: &[SeriesPoint]) -> f64 {
    points.iter().map(|point| point.value).sum::<f64>() / points.len() as f64
}
