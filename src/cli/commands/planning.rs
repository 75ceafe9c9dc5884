use std::str::FromStr;

use diskplan_core::{
    compute_active_capacity, cumulative_capacity_through, expired_summary, Evaluation, PlanLine,
    PricedLine,
};
use diskplan_domain::ProductSku;

use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::formatters::{gb, month_label, plan_line, tb};
use crate::cli::output::{info, section, success, warning};
use crate::cli::registry::CommandEntry;

const ORDER_USAGE: &str = "order <sku> <qty> [<sku> <qty> ...]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "status",
            "Show the simulated month and current capacity",
            "status",
            cmd_status,
        ),
        CommandEntry::new(
            "evaluate",
            "Simulate this month's usage, forecast demand and propose a plan",
            "evaluate",
            cmd_evaluate,
        ),
        CommandEntry::new(
            "advance",
            "Move the simulation to the next month",
            "advance",
            cmd_advance,
        ),
        CommandEntry::new(
            "order",
            "Buy disks at this month's market price, then advance",
            ORDER_USAGE,
            cmd_order,
        ),
        CommandEntry::new(
            "commit",
            "Buy the recommended plan, then advance",
            "commit",
            cmd_commit,
        ),
        CommandEntry::new(
            "commit-shortfall",
            "Buy the recommended plan plus the shortfall cover, then advance",
            "commit-shortfall",
            cmd_commit_shortfall,
        ),
        CommandEntry::new(
            "reset",
            "Clear the ledger and every recorded series",
            "reset",
            cmd_reset,
        ),
    ]
}

fn cmd_status(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let records = context.records()?;
    let as_of = context.state.current_date();
    section(format!("Status {}", month_label(as_of)));
    info(format!("  Ledger          : {}", context.ledger_path.display()));
    info(format!("  Purchases       : {}", records.len()));
    info(format!(
        "  Active capacity : {}",
        tb(compute_active_capacity(&records, as_of))
    ));
    info(format!(
        "  Ever purchased  : {}",
        tb(cumulative_capacity_through(&records, as_of))
    ));
    info(format!(
        "  Usage recorded  : {}",
        tb(context.state.usage_history().total())
    ));
    let expired = expired_summary(&records, as_of);
    if !expired.is_empty() {
        warning(format!(
            "{} disk(s) expired, {} no longer available.",
            expired.disks,
            tb(expired.capacity_tb)
        ));
    }
    if context.current_evaluation().is_none() {
        info("Run `evaluate` to plan this month.");
    }
    Ok(())
}

fn cmd_evaluate(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let records = context.records()?;
    let evaluation = context
        .state
        .evaluate(&records, &context.settings, &context.forecaster)?;
    print_evaluation(context, &evaluation);
    context.last_evaluation = Some(evaluation);
    Ok(())
}

fn cmd_advance(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let date = context.state.advance();
    context.last_evaluation = None;
    success(format!("Advanced to {}.", month_label(date)));
    Ok(())
}

fn cmd_order(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let orders: Vec<PricedLine> = parse_order(args)?
        .into_iter()
        .map(|line| PricedLine::new(line, context.state.quote(line.product)))
        .collect();
    commit_orders(context, &orders)
}

fn cmd_commit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let orders = evaluated_orders(context, Evaluation::orders)?;
    commit_orders(context, &orders)
}

fn cmd_commit_shortfall(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let orders = evaluated_orders(context, Evaluation::orders_with_shortfall)?;
    commit_orders(context, &orders)
}

fn cmd_reset(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if !context.confirm("Delete every purchase and recorded series?")? {
        info("Reset cancelled.");
        return Ok(());
    }
    context.state.reset(context.ledger.as_mut())?;
    context.last_evaluation = None;
    success("Ledger and history cleared.");
    Ok(())
}

fn evaluated_orders(
    context: &ShellContext,
    select: impl Fn(&Evaluation) -> Vec<PricedLine>,
) -> Result<Vec<PricedLine>, CommandError> {
    context.current_evaluation().map(select).ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "No plan for {}. Run `evaluate` first.",
            month_label(context.state.current_date())
        ))
    })
}

fn commit_orders(context: &mut ShellContext, orders: &[PricedLine]) -> CommandResult {
    if orders.is_empty() {
        info("Nothing to buy this month.");
        return Ok(());
    }
    let order_date = context.state.current_date();
    let result = context.state.commit_priced(context.ledger.as_mut(), orders);
    context.last_evaluation = None;
    let records = result?;

    let mut total = 0.0;
    for record in &records {
        total += record.total_cost();
        info(format!(
            "  Purchased {} x {} at {}",
            record.quantity,
            record.product,
            context.money(record.unit_price)
        ));
    }
    success(format!(
        "Committed {} line(s) for {} on {}. Now at {}.",
        records.len(),
        context.money(total),
        order_date,
        month_label(context.state.current_date())
    ));
    Ok(())
}

fn parse_order(args: &[&str]) -> Result<Vec<PlanLine>, CommandError> {
    if args.is_empty() || args.len() % 2 != 0 {
        return Err(CommandError::InvalidArguments(format!(
            "usage: {ORDER_USAGE}"
        )));
    }
    args.chunks(2)
        .map(|pair| {
            let product = ProductSku::from_str(pair[0])
                .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
            let quantity = pair[1]
                .parse::<u32>()
                .ok()
                .filter(|quantity| *quantity > 0)
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!(
                        "quantity `{}` must be a positive whole number",
                        pair[1]
                    ))
                })?;
            Ok(PlanLine::new(product, quantity))
        })
        .collect()
}

fn print_evaluation(context: &ShellContext, evaluation: &Evaluation) {
    section(format!("Evaluation {}", month_label(evaluation.as_of)));
    if !evaluation.has_data {
        warning("No purchases of known products yet.");
        info(format!("Record one with `{ORDER_USAGE}`, e.g. `order 1tb 2`."));
        return;
    }

    info(format!(
        "  Active capacity  : {}",
        tb(evaluation.active_capacity_tb)
    ));
    info(format!("  Usage this month : {}", tb(evaluation.month_usage_tb)));
    info(format!(
        "  Cumulative usage : {}",
        tb(evaluation.cumulative_usage_tb)
    ));
    if !evaluation.expired.is_empty() {
        warning(format!(
            "{} disk(s) expired, {} no longer available.",
            evaluation.expired.disks,
            tb(evaluation.expired.capacity_tb)
        ));
    }

    section("Usage forecast");
    if evaluation.usage_forecast.is_empty() {
        info("  Not enough history yet; at least two months are needed.");
    } else {
        for point in &evaluation.usage_forecast {
            info(format!("  {}  {}", month_label(point.date), tb(point.value)));
        }
    }
    info(format!(
        "  Projected need   : {}",
        gb(evaluation.projected_usage_gb)
    ));

    section("Estimated prices");
    for option in &evaluation.options {
        let per_gb = option
            .cost_per_gb()
            .map(|cost| format!("{:.4}/GB", cost))
            .unwrap_or_else(|| "n/a".to_string());
        info(format!(
            "  {:<12} {:>14}  {}",
            option.product.display_name(),
            context.money(option.unit_price),
            per_gb
        ));
    }

    section("Recommended plan");
    if evaluation.plan.is_empty() {
        info("  Nothing to buy.");
    } else {
        for line in &evaluation.plan {
            info(format!("  {}", plan_line(line)));
        }
        info(format!(
            "  Covers {} for {} at current prices.",
            gb(evaluation.plan_coverage_gb),
            context.money(evaluation.plan_cost)
        ));
    }

    if evaluation.shortfall_gb > 0 {
        warning(format!(
            "Usage exceeds active capacity by {}.",
            gb(evaluation.shortfall_gb)
        ));
        for line in &evaluation.shortfall_plan {
            info(format!("  + {}", plan_line(line)));
        }
        info("Use `commit-shortfall` to buy both.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_order_pairs() {
        let lines = parse_order(&["1tb", "2", "Disk 256 GB", "1"]).unwrap();
        assert_eq!(
            lines,
            vec![
                PlanLine::new(ProductSku::Disk1TB, 2),
                PlanLine::new(ProductSku::Disk256, 1),
            ]
        );
    }

    #[test]
    fn rejects_malformed_orders() {
        assert!(parse_order(&[]).is_err());
        assert!(parse_order(&["512"]).is_err());
        assert!(parse_order(&["512", "0"]).is_err());
        assert!(parse_order(&["512", "-1"]).is_err());
        assert!(parse_order(&["tape", "1"]).is_err());
    }
}
