use chrono::NaiveDate;
use diskplan_core::PlanLine;

pub fn month_label(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

pub fn tb(value: f64) -> String {
    format!("{:.2} TB", value)
}

pub fn gb(value: u64) -> String {
    format!("{} GB", value)
}

pub fn plan_line(line: &PlanLine) -> String {
    format!(
        "{} x {} ({})",
        line.quantity,
        line.product.display_name(),
        gb(line.capacity_gb())
    )
}
