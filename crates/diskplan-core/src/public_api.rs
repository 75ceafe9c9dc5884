//! Stable, public-facing helpers that wrap the internal modules.
//!
//! Front ends (CLI, dashboards) can rely on these without depending on the
//! entire module surface.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use diskplan_domain::{tb_to_whole_gb, ProductSku, PurchaseRecord, SeriesPoint};

use crate::{
    capacity::active_capacity,
    forecast::{last_prediction, Forecaster, MIN_FORECAST_POINTS},
    planner::{build_plan as plan_purchases, PlanLine, PricedOption},
    pricing::estimate_prices as estimate_product_prices,
    CoreError,
};

/// Active (unexpired) capacity in TB on `as_of`.
pub fn compute_active_capacity(records: &[PurchaseRecord], as_of: NaiveDate) -> f64 {
    active_capacity(records, as_of)
}

/// Projected usage for the next period in TB, `0.0` when history is too short.
pub fn estimate_next_period_usage(
    history: &[SeriesPoint],
    forecaster: &dyn Forecaster,
    horizon: usize,
) -> Result<f64, CoreError> {
    if history.len() < MIN_FORECAST_POINTS {
        return Ok(0.0);
    }
    let forecast = forecaster.forecast(history, horizon)?;
    Ok(last_prediction(&forecast).unwrap_or(0.0))
}

/// Same as [`estimate_next_period_usage`], in whole GB ready for planning.
pub fn estimate_next_period_usage_gb(
    history: &[SeriesPoint],
    forecaster: &dyn Forecaster,
    horizon: usize,
) -> Result<u64, CoreError> {
    estimate_next_period_usage(history, forecaster, horizon).map(tb_to_whole_gb)
}

/// Projected unit price per product.
pub fn estimate_prices(
    history_by_product: &BTreeMap<ProductSku, Vec<SeriesPoint>>,
    forecaster: &dyn Forecaster,
    horizon: usize,
) -> Result<BTreeMap<ProductSku, f64>, CoreError> {
    estimate_product_prices(history_by_product, forecaster, horizon)
}

/// Cheapest-per-GB purchase lines covering `required_gb`.
pub fn build_plan(required_gb: i64, priced_options: &[PricedOption]) -> Vec<PlanLine> {
    plan_purchases(required_gb, priced_options)
}
