use thiserror::Error;

/// The four quantities linked by the depletion model. Exactly one is solved
/// for at any time; the other three are set directly.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Variable {
    Wealth,
    InterestRate,
    Expenses,
    Duration,
}

impl Variable {
    pub const ALL: [Variable; 4] = [
        Variable::Wealth,
        Variable::InterestRate,
        Variable::Expenses,
        Variable::Duration,
    ];

    /// Stable position of this variable in snapshots and row arrays.
    pub fn index(self) -> usize {
        match self {
            Variable::Wealth => 0,
            Variable::InterestRate => 1,
            Variable::Expenses => 2,
            Variable::Duration => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Variable> {
        Variable::ALL.get(index).copied()
    }
}

/// How a bounded range maps onto its discrete representation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Scale {
    Linear,
    Logarithmic,
}

/// Bounds and starting value for one variable row.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RowConfig {
    pub min: f64,
    pub max: f64,
    pub initial: f64,
    pub scale: Scale,
}

impl RowConfig {
    pub fn linear(min: f64, max: f64, initial: f64) -> Self {
        Self {
            min,
            max,
            initial,
            scale: Scale::Linear,
        }
    }

    /// Reference bounds for the four rows: wealth in dollars, interest in
    /// percent, expenses in dollars per year, duration in years.
    pub fn reference_rows() -> [RowConfig; 4] {
        [
            RowConfig::linear(10_000.0, 5_000_000.0, 100_000.0),
            RowConfig::linear(0.1, 15.0, 5.0),
            RowConfig::linear(1_200.0, 240_000.0, 6_000.0),
            RowConfig::linear(1.0, 80.0, 25.0),
        ]
    }
}

/// Rejected bounds or scale for a bounded value. The container keeps its
/// previous valid state when one of these is returned.
#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("minimum {min} must be strictly less than maximum {max}")]
    InvertedBounds { min: f64, max: f64 },
    #[error("logarithmic scale requires strictly positive bounds, got [{min}, {max}]")]
    NonPositiveLogBounds { min: f64, max: f64 },
}

/// Rejected state mutation.
#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub enum StateError {
    #[error("{0:?} is currently being solved for and cannot be written directly")]
    SolvedVariableWrite(Variable),
    #[error("selection index {0} does not name a variable")]
    InvalidSelection(usize),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
