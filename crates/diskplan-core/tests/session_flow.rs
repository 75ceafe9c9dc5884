use chrono::NaiveDate;
use diskplan_core::{
    build_plan, estimate_next_period_usage, estimate_prices, plan_coverage_gb, price_summary,
    HoltLinearForecaster, InMemoryLedger, PlannerSettings, PricedOption, PurchaseLedger,
    SimulationState,
};
use diskplan_domain::{ProductSku, SeriesPoint};
use std::collections::BTreeMap;

fn month(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

#[test]
fn twelve_month_session_keeps_ledger_and_clock_consistent() {
    let start = month(2024, 1);
    let mut ledger = InMemoryLedger::new();
    ledger
        .append("Disk 1 TB", 1, 180.0, start)
        .expect("seed purchase");
    let mut state = SimulationState::new(start);
    let settings = PlannerSettings::default();
    let forecaster = HoltLinearForecaster::default();

    for _ in 0..12 {
        let records = ledger.read_all().expect("read ledger");
        let evaluation = state
            .evaluate(&records, &settings, &forecaster)
            .expect("evaluate");
        assert!(evaluation.has_data);
        assert!(evaluation.plan_coverage_gb >= evaluation.projected_usage_gb);
        assert!(plan_coverage_gb(&evaluation.shortfall_plan) >= evaluation.shortfall_gb);

        let orders = evaluation.orders_with_shortfall();
        assert_eq!(orders.len(), evaluation.plan_with_shortfall().len());
        if orders.is_empty() {
            state.advance();
        } else {
            let committed = state.commit_priced(&mut ledger, &orders).expect("commit");
            assert_eq!(committed.len(), orders.len());
        }
    }

    assert_eq!(state.current_date(), month(2025, 1));
    assert_eq!(state.usage_history().len(), 12);
    let records = ledger.read_all().expect("read ledger");
    assert!(records.windows(2).all(|pair| pair[0].order_date <= pair[1].order_date));
    assert!(!price_summary(&records).is_empty());
}

#[test]
fn facade_plans_from_price_history() {
    let mut history = BTreeMap::new();
    history.insert(
        ProductSku::Disk256,
        vec![
            SeriesPoint::new(month(2024, 1), 60.0),
            SeriesPoint::new(month(2024, 2), 62.0),
            SeriesPoint::new(month(2024, 3), 58.0),
        ],
    );
    history.insert(ProductSku::Disk512, vec![SeriesPoint::new(month(2024, 3), 100.0)]);
    history.insert(ProductSku::Disk1TB, vec![SeriesPoint::new(month(2024, 3), 180.0)]);

    let forecaster = HoltLinearForecaster::default();
    let prices = estimate_prices(&history, &forecaster, 6).expect("estimate prices");
    assert_eq!(prices[&ProductSku::Disk256], 60.0);

    let options: Vec<PricedOption> = prices
        .iter()
        .map(|(sku, price)| PricedOption::new(*sku, *price))
        .collect();
    let plan = build_plan(600, &options);
    assert_eq!(plan_coverage_gb(&plan), 1536);
}

#[test]
fn usage_projection_needs_two_points() {
    let forecaster = HoltLinearForecaster::default();
    let single = [SeriesPoint::new(month(2024, 1), 0.4)];
    assert_eq!(estimate_next_period_usage(&single, &forecaster, 6).unwrap(), 0.0);

    let rising = [
        SeriesPoint::new(month(2024, 1), 0.2),
        SeriesPoint::new(month(2024, 2), 0.3),
    ];
    let projected = estimate_next_period_usage(&rising, &forecaster, 6).unwrap();
    assert!(projected > 0.3);
}
