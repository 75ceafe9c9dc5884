use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use diskplan_core::{
    active_capacity, build_plan, HoltLinearForecaster, InMemoryLedger, PlannerSettings,
    PricedOption, PurchaseLedger, SimulationState,
};
use diskplan_domain::{add_months, ProductSku, PurchaseRecord};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

fn sample_records(count: usize) -> Vec<PurchaseRecord> {
    (0..count)
        .map(|idx| {
            let sku = ProductSku::ALL[idx % ProductSku::ALL.len()];
            PurchaseRecord::new(
                sku.display_name(),
                (idx % 4 + 1) as u32,
                sku.reference_price(),
                add_months(start(), (idx % 48) as i32),
            )
        })
        .collect()
}

fn bench_planner(c: &mut Criterion) {
    let options: Vec<PricedOption> = ProductSku::ALL
        .iter()
        .map(|sku| PricedOption::new(*sku, sku.reference_price()))
        .collect();
    c.bench_function("build_plan_100tb", |b| {
        b.iter(|| build_plan(black_box(100 * 1024 + 300), black_box(&options)))
    });
}

fn bench_capacity(c: &mut Criterion) {
    let records = sample_records(10_000);
    let as_of = add_months(start(), 30);
    c.bench_function("active_capacity_10k_records", |b| {
        b.iter(|| active_capacity(black_box(&records), black_box(as_of)))
    });
}

fn bench_session(c: &mut Criterion) {
    c.bench_function("evaluate_and_commit_24_months", |b| {
        b.iter(|| {
            let mut ledger = InMemoryLedger::new();
            ledger
                .append("Disk 1 TB", 2, 180.0, start())
                .expect("seed purchase");
            let mut state = SimulationState::new(start());
            let settings = PlannerSettings::default();
            let forecaster = HoltLinearForecaster::default();
            for _ in 0..24 {
                let records = ledger.read_all().expect("read ledger");
                let evaluation = state
                    .evaluate(&records, &settings, &forecaster)
                    .expect("evaluate");
                state
                    .commit_priced(&mut ledger, &evaluation.orders_with_shortfall())
                    .expect("commit");
            }
            state.current_date()
        })
    });
}

criterion_group!(benches, bench_planner, bench_capacity, bench_session);
criterion_main!(benches);
