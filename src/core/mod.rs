mod bounded;
mod display;
mod model;
mod range;
mod state;
mod types;

pub use bounded::{BoundedValue, DEFAULT_RESOLUTION, ListenerKey};
pub use display::{display_text, format_value};
pub use model::{solve_for_duration, solve_for_expenses, solve_for_interest, solve_for_wealth};
pub use range::{Domain, transform_range};
pub use state::{RetirementState, Snapshot};
pub use types::{ConfigError, RowConfig, Scale, StateError, Variable};
