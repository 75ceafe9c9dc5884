//! Greedy procurement planning.
//!
//! Options are ranked by cost per GB and bought in whole units, cheapest
//! first. Any leftover smaller than the walked options is covered by one more
//! unit of the globally cheapest option. This always covers the requirement
//! but is not an optimal bin-packing solution: two small disks can sometimes
//! beat one large disk plus the leftover unit.

use std::cmp::Ordering;

use diskplan_domain::ProductSku;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
/// A product offered at a projected unit price.
pub struct PricedOption {
    pub product: ProductSku,
    pub unit_price: f64,
    pub capacity_gb: u32,
}

impl PricedOption {
    pub fn new(product: ProductSku, unit_price: f64) -> Self {
        Self {
            product,
            unit_price,
            capacity_gb: product.capacity_gb(),
        }
    }

    /// Price per GB, `None` when the option has no usable capacity or price.
    pub fn cost_per_gb(&self) -> Option<f64> {
        if self.capacity_gb == 0 {
            return None;
        }
        let cost = self.unit_price / self.capacity_gb as f64;
        cost.is_finite().then_some(cost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLine {
    pub product: ProductSku,
    pub quantity: u32,
}

impl PlanLine {
    pub fn new(product: ProductSku, quantity: u32) -> Self {
        Self { product, quantity }
    }

    pub fn capacity_gb(&self) -> u64 {
        self.product.capacity_gb() as u64 * self.quantity as u64
    }
}

/// Whole-unit purchase lines whose combined capacity covers `required_gb`.
///
/// Returns an empty plan when nothing is required or no option is usable.
pub fn build_plan(required_gb: i64, options: &[PricedOption]) -> Vec<PlanLine> {
    if required_gb <= 0 {
        return Vec::new();
    }
    let mut ranked: Vec<(PricedOption, f64)> = options
        .iter()
        .filter_map(|option| option.cost_per_gb().map(|cost| (*option, cost)))
        .collect();
    // Stable: equal cost per GB keeps the caller's order.
    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let Some((cheapest, _)) = ranked.first().copied() else {
        return Vec::new();
    };

    let mut remaining = required_gb;
    let mut plan = Vec::new();
    for (option, _) in &ranked {
        let capacity = i64::from(option.capacity_gb);
        // A line holds at most `u32::MAX` units; larger counts span several lines.
        while remaining >= capacity {
            let units = (remaining / capacity).min(i64::from(u32::MAX));
            plan.push(PlanLine::new(option.product, units as u32));
            remaining -= units * capacity;
        }
        if remaining <= 0 {
            break;
        }
    }
    if remaining > 0 {
        plan.push(PlanLine::new(cheapest.product, 1));
    }
    debug!(required_gb, lines = plan.len(), "built purchase plan");
    plan
}

/// Combined capacity of a plan in GB.
pub fn plan_coverage_gb(lines: &[PlanLine]) -> u64 {
    lines.iter().map(PlanLine::capacity_gb).sum()
}

/// Cost of a plan given a unit price per product.
pub fn plan_cost(lines: &[PlanLine], unit_price: impl Fn(ProductSku) -> f64) -> f64 {
    lines
        .iter()
        .map(|line| unit_price(line.product) * line.quantity as f64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Vec<PricedOption> {
        vec![
            PricedOption::new(ProductSku::Disk256, 60.0),
            PricedOption::new(ProductSku::Disk512, 100.0),
            PricedOption::new(ProductSku::Disk1TB, 180.0),
        ]
    }

    #[test]
    fn leftover_is_covered_by_cheapest_per_gb() {
        let plan = build_plan(600, &catalogue());
        assert_eq!(
            plan,
            vec![
                PlanLine::new(ProductSku::Disk512, 1),
                PlanLine::new(ProductSku::Disk1TB, 1),
            ]
        );
        assert_eq!(plan_coverage_gb(&plan), 1536);
    }

    #[test]
    fn exact_multiples_need_no_fallback() {
        let plan = build_plan(2048 + 512, &catalogue());
        assert_eq!(
            plan,
            vec![
                PlanLine::new(ProductSku::Disk1TB, 2),
                PlanLine::new(ProductSku::Disk512, 1),
            ]
        );
    }

    #[test]
    fn nothing_required_or_nothing_offered_yields_empty_plan() {
        assert!(build_plan(0, &catalogue()).is_empty());
        assert!(build_plan(-40, &catalogue()).is_empty());
        assert!(build_plan(600, &[]).is_empty());
    }

    #[test]
    fn zero_capacity_options_are_discarded() {
        let options = vec![
            PricedOption {
                product: ProductSku::Disk256,
                unit_price: 1.0,
                capacity_gb: 0,
            },
            PricedOption::new(ProductSku::Disk512, 100.0),
        ];
        assert_eq!(build_plan(100, &options), vec![PlanLine::new(ProductSku::Disk512, 1)]);

        let unusable = [PricedOption {
            product: ProductSku::Disk1TB,
            unit_price: 10.0,
            capacity_gb: 0,
        }];
        assert!(build_plan(100, &unusable).is_empty());
    }

    #[test]
    fn ties_keep_input_order() {
        let options = vec![
            PricedOption::new(ProductSku::Disk512, 100.0),
            PricedOption::new(ProductSku::Disk256, 50.0),
        ];
        assert_eq!(build_plan(100, &options), vec![PlanLine::new(ProductSku::Disk512, 1)]);
    }

    #[test]
    fn every_requirement_is_covered() {
        let price_sets = [
            [60.0, 100.0, 180.0],
            [40.0, 100.0, 250.0],
            [70.0, 90.0, 200.0],
            [55.0, 110.0, 220.0],
        ];
        for prices in price_sets {
            let options: Vec<PricedOption> = ProductSku::ALL
                .iter()
                .zip(prices)
                .map(|(sku, price)| PricedOption::new(*sku, price))
                .collect();
            for required in (0..5000).step_by(37) {
                let plan = build_plan(required, &options);
                assert!(
                    plan_coverage_gb(&plan) >= required as u64,
                    "plan {plan:?} does not cover {required} GB"
                );
            }
        }
    }

    #[test]
    fn huge_requirements_split_into_several_lines() {
        let required = 2_000_000_000_000;
        let plan = build_plan(required, &[PricedOption::new(ProductSku::Disk256, 1.0)]);
        assert_eq!(
            plan,
            vec![
                PlanLine::new(ProductSku::Disk256, u32::MAX),
                PlanLine::new(ProductSku::Disk256, 3_517_532_705),
            ]
        );
        assert!(plan_coverage_gb(&plan) >= required as u64);

        let with_leftover = required + 100;
        let plan = build_plan(with_leftover, &catalogue());
        assert!(plan_coverage_gb(&plan) >= with_leftover as u64);
        assert!(plan.iter().all(|line| line.quantity > 0));
    }

    #[test]
    fn plan_cost_multiplies_quantities() {
        let plan = vec![
            PlanLine::new(ProductSku::Disk512, 2),
            PlanLine::new(ProductSku::Disk1TB, 1),
        ];
        let cost = plan_cost(&plan, |sku| sku.reference_price());
        assert_eq!(cost, 380.0);
    }
}
