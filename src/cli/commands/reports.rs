use diskplan_core::{cumulative_capacity, monthly_average_prices, price_summary};
use diskplan_domain::ProductSku;

use crate::cli::context::{CommandResult, ShellContext};
use crate::cli::formatters::{month_label, tb};
use crate::cli::output::{info, section};
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "prices",
            "Show market quotes and purchase price statistics",
            "prices",
            cmd_prices,
        ),
        CommandEntry::new(
            "history",
            "List purchases and the recorded capacity and usage series",
            "history",
            cmd_history,
        ),
    ]
}

fn cmd_prices(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let as_of = context.state.current_date();
    section(format!("Market prices {}", month_label(as_of)));
    for sku in ProductSku::ALL {
        info(format!(
            "  {:<12} {:>14}",
            sku.display_name(),
            context.money(context.state.quote(sku))
        ));
    }

    let records = context.records()?;
    let summary = price_summary(&records);
    section("Purchase prices");
    if summary.is_empty() {
        info("  No purchases yet.");
        return Ok(());
    }
    for row in &summary {
        info(format!(
            "  {:<12} mean {}  min {}  max {}  ({} purchase(s))",
            row.product.display_name(),
            context.money(row.mean),
            context.money(row.min),
            context.money(row.max),
            row.samples
        ));
    }

    section("Monthly price trend");
    for row in &summary {
        let trend: Vec<String> = monthly_average_prices(&records, row.product)
            .iter()
            .map(|point| format!("{} {:.2}", month_label(point.date), point.value))
            .collect();
        info(format!(
            "  {:<12} {}",
            row.product.display_name(),
            trend.join(", ")
        ));
    }
    Ok(())
}

fn cmd_history(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let records = context.records()?;
    let as_of = context.state.current_date();

    section("Purchases");
    if records.is_empty() {
        info("  No purchases yet.");
    }
    for record in &records {
        let status = match record.sku() {
            None => "unknown product",
            Some(_) if record.is_active_on(as_of) => "active",
            Some(_) => "expired",
        };
        info(format!(
            "  {}  {:>3} x {:<12} {:>14}  expires {}  {}",
            record.order_date,
            record.quantity,
            record.product,
            context.money(record.unit_price),
            record.expires_on(),
            status
        ));
    }

    let purchased = cumulative_capacity(&records);
    if !purchased.is_empty() {
        section("Capacity purchased (cumulative, ignoring expiry)");
        for point in &purchased {
            info(format!("  {}  {}", month_label(point.date), tb(point.value)));
        }
    }

    let capacity = context.state.capacity_history();
    let usage = context.state.usage_history();
    if !usage.is_empty() {
        section("Capacity and usage by month");
        for point in usage.cumulative() {
            let active = capacity.get(point.date).unwrap_or(0.0);
            let month_usage = usage.get(point.date).unwrap_or(0.0);
            info(format!(
                "  {}  active {}  used {}  cumulative {}",
                month_label(point.date),
                tb(active),
                tb(month_usage),
                tb(point.value)
            ));
        }
    }
    Ok(())
}
