//! Dated observation series (usage, active capacity, prices).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::product::ProductSku;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
/// A single dated value, used for history and forecast output alike.
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
/// Date-keyed series holding one value per date.
///
/// Recording a value for a date that already has one replaces it.
pub struct ObservationSeries {
    #[serde(default)]
    values: BTreeMap<NaiveDate, f64>,
}

impl ObservationSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` for `date`, returning the value it replaced.
    pub fn record(&mut self, date: NaiveDate, value: f64) -> Option<f64> {
        self.values.insert(date, value)
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.values.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Points in ascending date order.
    pub fn points(&self) -> Vec<SeriesPoint> {
        self.values
            .iter()
            .map(|(date, value)| SeriesPoint::new(*date, *value))
            .collect()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.values().copied()
    }

    pub fn latest(&self) -> Option<SeriesPoint> {
        self.values
            .iter()
            .next_back()
            .map(|(date, value)| SeriesPoint::new(*date, *value))
    }

    /// Last point dated strictly before `date`.
    pub fn last_before(&self, date: NaiveDate) -> Option<SeriesPoint> {
        self.values
            .range(..date)
            .next_back()
            .map(|(date, value)| SeriesPoint::new(*date, *value))
    }

    /// Running totals in ascending date order.
    pub fn cumulative(&self) -> Vec<SeriesPoint> {
        let mut total = 0.0;
        self.values
            .iter()
            .map(|(date, value)| {
                total += value;
                SeriesPoint::new(*date, total)
            })
            .collect()
    }

    /// Sum of every value dated on or before `date`.
    pub fn cumulative_through(&self, date: NaiveDate) -> f64 {
        self.values.range(..=date).map(|(_, value)| value).sum()
    }

    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
/// Price observations per product, one per (date, product) pair.
pub struct PriceHistory {
    #[serde(default)]
    series: BTreeMap<ProductSku, ObservationSeries>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, date: NaiveDate, product: ProductSku, price: f64) -> Option<f64> {
        self.series.entry(product).or_default().record(date, price)
    }

    pub fn series(&self, product: ProductSku) -> Option<&ObservationSeries> {
        self.series.get(&product)
    }

    pub fn points(&self, product: ProductSku) -> Vec<SeriesPoint> {
        self.series
            .get(&product)
            .map(ObservationSeries::points)
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(ObservationSeries::is_empty)
    }
}
