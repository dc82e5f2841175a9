use serde::{Deserialize, Serialize};

use super::bounded::{BoundedValue, DEFAULT_RESOLUTION, ListenerKey};
use super::model::{solve_for_duration, solve_for_expenses, solve_for_interest, solve_for_wealth};
use super::types::{ConfigError, RowConfig, StateError, Variable};

/// Everything needed to reconstruct a [`RetirementState`]: the four real
/// values in [`Variable`] index order plus the solved-variable index.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub values: [f64; 4],
    pub selected: usize,
}

/// Owns the four bounded variable rows and the solved-variable selection,
/// and keeps the depletion-model invariant: after every free-value change,
/// the solved row holds the model's solution for the other three.
///
/// Single-threaded and synchronous; a change and the recomputation it
/// triggers happen within one call, so callers never observe an
/// inconsistent in-between state.
#[derive(Debug)]
pub struct RetirementState {
    rows: [BoundedValue; 4],
    solved: Variable,
    recomputing: bool,
}

impl RetirementState {
    pub fn new(
        configs: [RowConfig; 4],
        solved: Variable,
        resolution: u32,
    ) -> Result<Self, ConfigError> {
        let [wealth, interest, expenses, duration] = configs;
        let rows = [
            row_from(wealth, resolution)?,
            row_from(interest, resolution)?,
            row_from(expenses, resolution)?,
            row_from(duration, resolution)?,
        ];
        let mut state = Self {
            rows,
            solved,
            recomputing: false,
        };
        // A fresh state already honors the model invariant: the solved row
        // starts at the solution for the three starting values, not at its
        // own configured start.
        state.recompute();
        Ok(state)
    }

    /// State with the reference rows, solving for expenses (the default
    /// selection a fresh session starts with).
    pub fn with_reference_rows() -> Self {
        Self::new(
            RowConfig::reference_rows(),
            Variable::Expenses,
            DEFAULT_RESOLUTION,
        )
        .expect("reference rows are valid")
    }

    pub fn solved_variable(&self) -> Variable {
        self.solved
    }

    /// Marks `variable` as the one being solved for. The previous solved
    /// variable becomes free. No recomputation happens until the next
    /// free-value change.
    pub fn select(&mut self, variable: Variable) {
        self.solved = variable;
    }

    /// Writes a real value into a free row, then recomputes the solved row.
    pub fn set_free(&mut self, variable: Variable, value: f64) -> Result<(), StateError> {
        if variable == self.solved {
            return Err(StateError::SolvedVariableWrite(variable));
        }
        self.rows[variable.index()].set_real(value);
        self.recompute();
        Ok(())
    }

    /// Writes a discrete control index into a free row (the slider-drag
    /// path), then recomputes the solved row.
    pub fn set_free_discrete(&mut self, variable: Variable, index: u32) -> Result<(), StateError> {
        if variable == self.solved {
            return Err(StateError::SolvedVariableWrite(variable));
        }
        self.rows[variable.index()].set_from_discrete(index);
        self.recompute();
        Ok(())
    }

    /// The single recomputation path: reads the three free values, solves
    /// for the fourth, and pushes it into the solved row. A notification
    /// that re-enters the coordinator while this runs finds the guard set
    /// and does not start a nested cycle.
    pub fn recompute(&mut self) {
        if self.recomputing {
            return;
        }
        self.recomputing = true;
        let wealth = self.real(Variable::Wealth);
        let interest = self.real(Variable::InterestRate);
        let expenses = self.real(Variable::Expenses);
        let duration = self.real(Variable::Duration);
        let solution = match self.solved {
            Variable::Wealth => solve_for_wealth(interest, duration, expenses),
            Variable::InterestRate => solve_for_interest(wealth, duration, expenses),
            Variable::Expenses => solve_for_expenses(wealth, interest, duration),
            Variable::Duration => solve_for_duration(wealth, interest, expenses),
        };
        self.rows[self.solved.index()].set_real(solution);
        self.recomputing = false;
    }

    /// Forces every row to re-emit its current value through the full
    /// discretize/notify pipeline. Writing a different value first
    /// guarantees the final notification fires even if a downstream
    /// consumer suppresses equal values; the intermediate is the midpoint,
    /// or the minimum when the value already sits there.
    pub fn refresh_all(&mut self) {
        for variable in Variable::ALL {
            let row = &mut self.rows[variable.index()];
            let original = row.real();
            let midpoint = (row.min() + row.max()) / 2.0;
            let intermediate = if original == midpoint {
                row.min()
            } else {
                midpoint
            };
            row.set_real(intermediate);
            row.set_real(original);
        }
    }

    pub fn real(&self, variable: Variable) -> f64 {
        self.rows[variable.index()].real()
    }

    /// Real value for display purposes; the stored value, which may lie
    /// outside the row's bounds.
    pub fn display_value(&self, variable: Variable) -> f64 {
        self.real(variable)
    }

    pub fn discrete(&self, variable: Variable) -> u32 {
        self.rows[variable.index()].discrete()
    }

    pub fn row(&self, variable: Variable) -> &BoundedValue {
        &self.rows[variable.index()]
    }

    /// Registers (or replaces) a display listener on one row.
    pub fn set_listener(
        &mut self,
        variable: Variable,
        key: ListenerKey,
        listener: impl FnMut(f64) + 'static,
    ) {
        self.rows[variable.index()].set_listener(key, listener);
    }

    pub fn remove_listener(&mut self, variable: Variable, key: ListenerKey) -> bool {
        self.rows[variable.index()].remove_listener(key)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            values: [
                self.real(Variable::Wealth),
                self.real(Variable::InterestRate),
                self.real(Variable::Expenses),
                self.real(Variable::Duration),
            ],
            selected: self.solved.index(),
        }
    }

    /// Reinstates a saved session: writes all four values, restores the
    /// selection, recomputes the solved row against the restored free
    /// values, and gooses every row so displays pick the values up without
    /// a user gesture.
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<(), StateError> {
        let selected = Variable::from_index(snapshot.selected)
            .ok_or(StateError::InvalidSelection(snapshot.selected))?;
        for variable in Variable::ALL {
            self.rows[variable.index()].set_real(snapshot.values[variable.index()]);
        }
        self.solved = selected;
        self.recompute();
        self.refresh_all();
        Ok(())
    }
}

fn row_from(config: RowConfig, resolution: u32) -> Result<BoundedValue, ConfigError> {
    Ok(
        BoundedValue::new(config.min, config.max, config.initial, config.scale)?
            .with_resolution(resolution),
    )
}
