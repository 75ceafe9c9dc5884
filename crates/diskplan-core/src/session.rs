//! Caller-owned simulation session.
//!
//! A [`SimulationState`] holds the simulated month and the observation series
//! collected so far. Every evaluation recomputes all aggregates from the full
//! ledger contents; nothing is updated incrementally.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use diskplan_domain::{
    first_of_month, tb_to_gb, tb_to_whole_gb, ObservationSeries, PriceHistory, ProductSku,
    PurchaseRecord, SeriesPoint,
};
use tracing::{debug, info, warn};

use crate::{
    capacity::{active_capacity, expired_summary, known_records, total_purchased_capacity, ExpiredSummary},
    forecast::{last_prediction, Forecaster, DEFAULT_FORECAST_HORIZON, MIN_FORECAST_POINTS},
    ledger::PurchaseLedger,
    planner::{build_plan, plan_cost, plan_coverage_gb, PlanLine, PricedOption},
    pricing::{estimate_prices, price_history_by_product, quote_price, round_price},
    time::advance_one_month,
    usage::{available_capacity, UsageSimulator},
    CoreError,
};

/// Tunables for a planning session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerSettings {
    pub forecast_horizon: usize,
    pub usage: UsageSimulator,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            forecast_horizon: DEFAULT_FORECAST_HORIZON,
            usage: UsageSimulator::default(),
        }
    }
}

/// Result of evaluating the session against the ledger for the current month.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub as_of: NaiveDate,
    /// `false` when the ledger holds no purchase of a known product.
    pub has_data: bool,
    pub active_capacity_tb: f64,
    pub month_usage_tb: f64,
    pub cumulative_usage_tb: f64,
    pub expired: ExpiredSummary,
    pub usage_forecast: Vec<SeriesPoint>,
    pub projected_usage_gb: u64,
    pub prices: BTreeMap<ProductSku, f64>,
    pub options: Vec<PricedOption>,
    pub plan: Vec<PlanLine>,
    pub plan_coverage_gb: u64,
    pub plan_cost: f64,
    pub shortfall_gb: u64,
    pub shortfall_plan: Vec<PlanLine>,
}

impl Evaluation {
    fn empty(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            has_data: false,
            active_capacity_tb: 0.0,
            month_usage_tb: 0.0,
            cumulative_usage_tb: 0.0,
            expired: ExpiredSummary::default(),
            usage_forecast: Vec::new(),
            projected_usage_gb: 0,
            prices: BTreeMap::new(),
            options: Vec::new(),
            plan: Vec::new(),
            plan_coverage_gb: 0,
            plan_cost: 0.0,
            shortfall_gb: 0,
            shortfall_plan: Vec::new(),
        }
    }

    /// Primary plan followed by the shortfall plan, as separate lines.
    pub fn plan_with_shortfall(&self) -> Vec<PlanLine> {
        self.plan
            .iter()
            .chain(self.shortfall_plan.iter())
            .copied()
            .collect()
    }

    /// The primary plan at the month's market quotes.
    pub fn orders(&self) -> Vec<PricedLine> {
        self.plan
            .iter()
            .map(|line| PricedLine::new(*line, quote_price(line.product, self.as_of)))
            .collect()
    }

    /// Estimated unit price of `sku` from the planning options.
    pub fn estimated_price(&self, sku: ProductSku) -> Option<f64> {
        self.options
            .iter()
            .find(|option| option.product == sku)
            .map(|option| option.unit_price)
    }

    /// Orders for plan plus shortfall. Primary lines are booked at the
    /// month's market quote, shortfall lines at the estimated option price
    /// they were planned with.
    pub fn orders_with_shortfall(&self) -> Vec<PricedLine> {
        let primary = self.orders().into_iter();
        let shortfall = self.shortfall_plan.iter().map(|line| {
            let price = self
                .estimated_price(line.product)
                .unwrap_or_else(|| quote_price(line.product, self.as_of));
            PricedLine::new(*line, price)
        });
        primary.chain(shortfall).collect()
    }
}

/// A plan line with the unit price it is booked at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedLine {
    pub line: PlanLine,
    pub unit_price: f64,
}

impl PricedLine {
    pub fn new(line: PlanLine, unit_price: f64) -> Self {
        Self { line, unit_price }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    current_date: NaiveDate,
    usage: ObservationSeries,
    capacity: ObservationSeries,
    price_snapshots: PriceHistory,
}

impl SimulationState {
    /// Starts a session at `start` and records that month's market prices.
    pub fn new(start: NaiveDate) -> Self {
        let mut state = Self {
            current_date: start,
            usage: ObservationSeries::new(),
            capacity: ObservationSeries::new(),
            price_snapshots: PriceHistory::new(),
        };
        state.record_price_snapshot();
        state
    }

    pub fn current_date(&self) -> NaiveDate {
        self.current_date
    }

    pub fn usage_history(&self) -> &ObservationSeries {
        &self.usage
    }

    pub fn capacity_history(&self) -> &ObservationSeries {
        &self.capacity
    }

    pub fn price_snapshots(&self) -> &PriceHistory {
        &self.price_snapshots
    }

    /// Market price of `sku` in the current simulated month.
    pub fn quote(&self, sku: ProductSku) -> f64 {
        quote_price(sku, self.current_date)
    }

    /// Moves to the first day of the next month and snapshots its prices.
    pub fn advance(&mut self) -> NaiveDate {
        self.current_date = advance_one_month(self.current_date);
        self.record_price_snapshot();
        debug!(current_date = %self.current_date, "advanced simulation clock");
        self.current_date
    }

    fn record_price_snapshot(&mut self) {
        let month = first_of_month(self.current_date);
        for sku in ProductSku::ALL {
            self.price_snapshots
                .record(month, sku, quote_price(sku, self.current_date));
        }
    }

    /// Records this month's capacity and usage, then forecasts and plans.
    pub fn evaluate(
        &mut self,
        records: &[PurchaseRecord],
        settings: &PlannerSettings,
        forecaster: &dyn Forecaster,
    ) -> Result<Evaluation, CoreError> {
        let as_of = self.current_date;
        let unknown = records.len() - known_records(records).count();
        if unknown > 0 {
            warn!(unknown, "ignoring purchases of unknown products");
        }
        if known_records(records).next().is_none() {
            return Ok(Evaluation::empty(as_of));
        }

        let active_capacity_tb = active_capacity(records, as_of);
        let available_tb = available_capacity(
            &self.capacity,
            &self.usage,
            total_purchased_capacity(records),
            as_of,
        );
        self.capacity.record(as_of, active_capacity_tb);
        let month_usage_tb = settings.usage.simulate_month_usage(as_of, available_tb);
        self.usage.record(as_of, month_usage_tb);
        let cumulative_usage_tb = self.usage.cumulative_through(as_of);

        let usage_forecast = self.forecast_usage(settings.forecast_horizon, forecaster)?;
        let projected_usage_gb = last_prediction(&usage_forecast)
            .map(tb_to_whole_gb)
            .unwrap_or(0);

        let history = price_history_by_product(records, &self.price_snapshots);
        let prices: BTreeMap<ProductSku, f64> =
            estimate_prices(&history, forecaster, settings.forecast_horizon)?
                .into_iter()
                .map(|(sku, price)| (sku, round_price(price)))
                .collect();
        let options: Vec<PricedOption> = prices
            .iter()
            .map(|(sku, price)| PricedOption::new(*sku, *price))
            .collect();

        let plan = build_plan(clamp_gb(projected_usage_gb), &options);
        let shortfall_gb = shortfall_gb(cumulative_usage_tb, active_capacity_tb);
        let shortfall_plan = build_plan(clamp_gb(shortfall_gb), &options);
        let cost = plan_cost(&plan, |sku| quote_price(sku, as_of));

        debug!(
            %as_of,
            active_capacity_tb,
            month_usage_tb,
            projected_usage_gb,
            shortfall_gb,
            "evaluated planning session"
        );

        Ok(Evaluation {
            as_of,
            has_data: true,
            active_capacity_tb,
            month_usage_tb,
            cumulative_usage_tb,
            expired: expired_summary(records, as_of),
            usage_forecast,
            projected_usage_gb,
            prices,
            options,
            plan_coverage_gb: plan_coverage_gb(&plan),
            plan,
            plan_cost: cost,
            shortfall_gb,
            shortfall_plan,
        })
    }

    /// Next-period usage forecast; empty when there is too little history.
    pub fn forecast_usage(
        &self,
        horizon: usize,
        forecaster: &dyn Forecaster,
    ) -> Result<Vec<SeriesPoint>, CoreError> {
        let history = self.usage.points();
        if history.len() < MIN_FORECAST_POINTS {
            debug!(points = history.len(), "not enough usage history to forecast");
            return Ok(Vec::new());
        }
        forecaster.forecast(&history, horizon)
    }

    /// Appends each line to the ledger at this month's market price, then
    /// advances one month.
    pub fn commit(
        &mut self,
        ledger: &mut dyn PurchaseLedger,
        lines: &[PlanLine],
    ) -> Result<Vec<PurchaseRecord>, CoreError> {
        let priced: Vec<PricedLine> = lines
            .iter()
            .map(|line| PricedLine::new(*line, self.quote(line.product)))
            .collect();
        self.commit_priced(ledger, &priced)
    }

    /// Appends each line at its own unit price, then advances one month.
    ///
    /// Lines are appended independently. When an append fails the error is
    /// returned, earlier lines stay in the ledger and the clock does not move.
    pub fn commit_priced(
        &mut self,
        ledger: &mut dyn PurchaseLedger,
        lines: &[PricedLine],
    ) -> Result<Vec<PurchaseRecord>, CoreError> {
        let mut committed = Vec::with_capacity(lines.len());
        for priced in lines {
            let record = ledger.append(
                priced.line.product.display_name(),
                priced.line.quantity,
                priced.unit_price,
                self.current_date,
            )?;
            committed.push(record);
        }
        info!(
            lines = committed.len(),
            order_date = %self.current_date,
            "committed purchases"
        );
        self.advance();
        Ok(committed)
    }

    /// Clears the ledger and every recorded series, keeping the current month.
    pub fn reset(&mut self, ledger: &mut dyn PurchaseLedger) -> Result<(), CoreError> {
        ledger.clear()?;
        self.usage.clear();
        self.capacity.clear();
        self.price_snapshots.clear();
        self.record_price_snapshot();
        info!(current_date = %self.current_date, "session reset");
        Ok(())
    }
}

/// Capacity missing to hold everything used so far, in whole GB.
pub fn shortfall_gb(cumulative_usage_tb: f64, active_capacity_tb: f64) -> u64 {
    let missing = tb_to_gb(cumulative_usage_tb - active_capacity_tb);
    if missing.is_finite() && missing > 0.0 {
        missing.trunc() as u64
    } else {
        0
    }
}

fn clamp_gb(gb: u64) -> i64 {
    i64::try_from(gb).unwrap_or(i64::MAX)
}
