//! Display-formatting contract shared by the HTTP layer and any other
//! front-end: currency rounds to its configured increment, rates and
//! durations show one decimal, and a solved value pinned to a rendered
//! bound displays as blank to flag a degenerate solution instead of
//! printing a misleading boundary number.

use super::state::RetirementState;
use super::types::Variable;

const WEALTH_INCREMENT: f64 = 1_000.0;
const MONTHLY_EXPENSE_INCREMENT: f64 = 50.0;

/// Display text for one row of `state`, blank when the solved variable's
/// rendering sits on a bound.
pub fn display_text(state: &RetirementState, variable: Variable) -> String {
    let value = state.display_value(variable);
    if variable == state.solved_variable() {
        let row = state.row(variable);
        let rendered = value.clamp(row.min(), row.max());
        if rendered == row.min() || rendered == row.max() {
            return String::new();
        }
    }
    format_value(variable, value)
}

/// Formats a raw value by the variable's display rule, without the
/// solved-at-bound blanking.
pub fn format_value(variable: Variable, value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    match variable {
        Variable::Wealth => format!("${}", round_to_increment(value, WEALTH_INCREMENT)),
        Variable::InterestRate => format!("{value:.1}%"),
        // Expenses are held annualized but display monthly.
        Variable::Expenses => format!(
            "${}",
            round_to_increment(value / 12.0, MONTHLY_EXPENSE_INCREMENT)
        ),
        Variable::Duration => format!("{value:.1} years"),
    }
}

fn round_to_increment(value: f64, increment: f64) -> i64 {
    ((value / increment).round() * increment) as i64
}
