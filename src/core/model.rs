//! Continuous-depletion model: a principal earns continuously compounded
//! interest while being withdrawn at a constant annual rate. Three of the
//! four variables invert in closed form; the interest rate is found by a
//! local search because no closed form exists for it.
//!
//! Interest rates are nominal annual percentages (`5.0` means 5%), wealth
//! and expenses share one currency unit, durations are in years.

/// Search stops once the step magnitude drops below this, in percent.
const INTEREST_SEARCH_EPSILON: f64 = 1e-5;
const INTEREST_INITIAL_GUESS: f64 = 5.0;
const INTEREST_INITIAL_STEP: f64 = 1.0;

/// Wealth required to sustain `expenses` per year for `duration` years at
/// `interest` percent: `E * (1 - e^(-r*D)) / r` with `r = I/100`.
pub fn solve_for_wealth(interest: f64, duration: f64, expenses: f64) -> f64 {
    if interest == 0.0 {
        // Limit as r -> 0: 1 - exp(-D*r) is approximately D*r,
        // so E * (D*r) / r = E * D.
        return expenses * duration;
    }
    let r = interest / 100.0;
    expenses * (1.0 - (-duration * r).exp()) / r
}

/// Annual expenses that deplete `wealth` in exactly `duration` years.
pub fn solve_for_expenses(wealth: f64, interest: f64, duration: f64) -> f64 {
    if interest == 0.0 {
        // Same limit as above, inverted: W / D.
        return wealth / duration;
    }
    let r = interest / 100.0;
    wealth * r / (1.0 - (-duration * r).exp())
}

/// Years until `wealth` is depleted: `-ln(1 - W*r/E) / r`.
///
/// When interest alone covers the expenses (`W*r/E >= 1`) the log argument
/// is non-positive and the result is `+inf`: the wealth never depletes.
/// That is a meaningful outcome of the model, not an error.
pub fn solve_for_duration(wealth: f64, interest: f64, expenses: f64) -> f64 {
    if interest == 0.0 {
        // Limit as r -> 0: ln(1 - W*r/E) is approximately -W*r/E.
        return wealth / expenses;
    }
    let r = interest / 100.0;
    -ln_or_neg_infinity(1.0 - wealth * r / expenses) / r
}

/// Interest rate at which `solve_for_wealth` reproduces `wealth`, found by a
/// hill-climb with a sign-flipping, halving step.
///
/// Convergence relies on `solve_for_wealth` being monotonic in the rate for
/// fixed positive duration and expenses. The loop carries no iteration cap;
/// on pathological non-monotonic inputs it is not guaranteed to terminate.
pub fn solve_for_interest(wealth: f64, duration: f64, expenses: f64) -> f64 {
    let mut interest = INTEREST_INITIAL_GUESS;
    let mut delta = INTEREST_INITIAL_STEP;
    let mut best_wealth = solve_for_wealth(interest, duration, expenses);
    while delta.abs() > INTEREST_SEARCH_EPSILON {
        let test_wealth = solve_for_wealth(interest + delta, duration, expenses);
        if (wealth - test_wealth).abs() < (wealth - best_wealth).abs() {
            // Improvement: accept and keep direction and magnitude.
            interest += delta;
            best_wealth = test_wealth;
        } else {
            // Overshot: search the other direction by smaller increments.
            delta /= -2.0;
        }
    }
    interest
}

// f64::ln returns NaN for non-positive arguments, which is not what the
// duration formula wants there.
fn ln_or_neg_infinity(x: f64) -> f64 {
    if x <= 0.0 { f64::NEG_INFINITY } else { x.ln() }
}
