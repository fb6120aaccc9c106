//! Internal Rate of Return (IRR) calculation

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Newton-Raphson search settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IrrConfig {
    /// Starting rate, as a decimal
    pub initial_guess: f64,

    /// Convergence threshold on the step between successive rates
    pub tolerance: f64,

    /// Hard iteration cap
    pub max_iterations: u32,
}

impl Default for IrrConfig {
    fn default() -> Self {
        Self {
            initial_guess: 0.10,
            tolerance: 1e-5,
            max_iterations: 100,
        }
    }
}

/// Rate bounds for the search, as decimals
const MIN_RATE: f64 = -0.99;
const MAX_RATE: f64 = 10.0;

const BISECTION_MAX_ITERATIONS: u32 = 200;

/// Which search produced the rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrMethod {
    Newton,
    Bisection,
}

/// Outcome of an IRR search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSolution {
    /// Annual IRR in percent. Best effort when `converged` is false.
    pub rate_percent: f64,

    /// Steps taken, Newton and bisection combined
    pub iterations: u32,

    /// Whether the step size fell below the tolerance within the cap
    pub converged: bool,

    pub method: IrrMethod,
}

/// Find the annual rate that zeroes the NPV of yearly cash flows (year 0 first).
///
/// Runs Newton-Raphson from `config.initial_guess`, with every step bounded to
/// [-99%, 1000%]. Running out of iterations is not an error: the last rate is
/// returned with `converged = false`. When a Newton step is unusable (zero or
/// non-finite derivative, or the iterate pinned at a bound) the root is
/// bracketed over the same range and bisected instead. A series whose NPV does
/// not change sign over that range (a single cash flow, or a total loss) has no
/// IRR and is reported as [`AnalysisError::NumericDegeneracy`], including when
/// Newton wanders until the iteration cap on such a series.
pub fn solve_irr(cash_flows: &[f64], config: &IrrConfig) -> Result<IrrSolution> {
    if cash_flows.is_empty() {
        return Err(AnalysisError::degenerate("IRR of an empty cash-flow series"));
    }

    let mut rate = config.initial_guess.clamp(MIN_RATE, MAX_RATE);

    for iteration in 1..=config.max_iterations {
        let (npv, dnpv) = npv_and_derivative(cash_flows, rate);

        if !npv.is_finite() || !dnpv.is_finite() || dnpv == 0.0 {
            log::debug!("IRR: Newton step unusable at rate {:.6}, bisecting", rate);
            return bisect(cash_flows, config.tolerance, iteration);
        }

        let new_rate = (rate - npv / dnpv).clamp(MIN_RATE, MAX_RATE);

        if (new_rate - rate).abs() < config.tolerance {
            if new_rate == MIN_RATE || new_rate == MAX_RATE {
                log::debug!("IRR: Newton pinned at {:.2}, bisecting", new_rate);
                return bisect(cash_flows, config.tolerance, iteration);
            }
            log::debug!("IRR converged to {:.6} after {} iterations", new_rate, iteration);
            return Ok(IrrSolution {
                rate_percent: new_rate * 100.0,
                iterations: iteration,
                converged: true,
                method: IrrMethod::Newton,
            });
        }

        rate = new_rate;
    }

    if !npv_changes_sign(cash_flows) {
        return Err(no_sign_change());
    }

    log::warn!(
        "IRR did not converge within {} iterations, using best estimate {:.6}",
        config.max_iterations,
        rate
    );
    Ok(IrrSolution {
        rate_percent: rate * 100.0,
        iterations: config.max_iterations,
        converged: false,
        method: IrrMethod::Newton,
    })
}

/// Bisection over [MIN_RATE, MAX_RATE]; fails when the NPV keeps one sign
fn bisect(cash_flows: &[f64], tolerance: f64, prior_iterations: u32) -> Result<IrrSolution> {
    if !npv_changes_sign(cash_flows) {
        return Err(no_sign_change());
    }

    let mut low = MIN_RATE;
    let mut high = MAX_RATE;
    let mut npv_low = npv_at(cash_flows, low);

    for step in 1..=BISECTION_MAX_ITERATIONS {
        let mid = 0.5 * (low + high);
        let npv_mid = npv_at(cash_flows, mid);

        if npv_mid == 0.0 || 0.5 * (high - low) < tolerance {
            log::debug!("IRR bisected to {:.6} after {} steps", mid, step);
            return Ok(IrrSolution {
                rate_percent: mid * 100.0,
                iterations: prior_iterations + step,
                converged: true,
                method: IrrMethod::Bisection,
            });
        }

        if same_sign(npv_low, npv_mid) {
            low = mid;
            npv_low = npv_mid;
        } else {
            high = mid;
        }
    }

    let mid = 0.5 * (low + high);
    log::warn!("IRR bisection did not converge, using midpoint {:.6}", mid);
    Ok(IrrSolution {
        rate_percent: mid * 100.0,
        iterations: prior_iterations + BISECTION_MAX_ITERATIONS,
        converged: false,
        method: IrrMethod::Bisection,
    })
}

fn npv_changes_sign(cash_flows: &[f64]) -> bool {
    let low = npv_at(cash_flows, MIN_RATE);
    let high = npv_at(cash_flows, MAX_RATE);
    low.is_finite() && high.is_finite() && !same_sign(low, high)
}

fn no_sign_change() -> AnalysisError {
    AnalysisError::degenerate(format!(
        "IRR: NPV does not change sign between {:.0}% and {:.0}%",
        MIN_RATE * 100.0,
        MAX_RATE * 100.0
    ))
}

fn same_sign(a: f64, b: f64) -> bool {
    (a > 0.0 && b > 0.0) || (a < 0.0 && b < 0.0)
}

fn npv_at(cash_flows: &[f64], rate: f64) -> f64 {
    npv_and_derivative(cash_flows, rate).0
}

/// NPV and its derivative with respect to the rate
fn npv_and_derivative(cash_flows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cash_flows.iter().enumerate() {
        npv += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            dnpv -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (npv, dnpv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_irr() {
        // Invest 1000, receive 1100 a year later
        let solution = solve_irr(&[-1000.0, 1100.0], &IrrConfig::default()).unwrap();
        assert!(solution.converged);
        assert_abs_diff_eq!(solution.rate_percent, 10.0, epsilon = 0.01);
    }

    #[test]
    fn test_level_annuity_irr() {
        // 5 payments of 263.80 repay 1000 at 10%
        let flows = [-1000.0, 263.797, 263.797, 263.797, 263.797, 263.797];
        let solution = solve_irr(&flows, &IrrConfig::default()).unwrap();
        assert!(solution.converged);
        assert_abs_diff_eq!(solution.rate_percent, 10.0, epsilon = 0.01);
    }

    #[test]
    fn test_negative_irr() {
        let solution = solve_irr(&[-1000.0, 900.0], &IrrConfig::default()).unwrap();
        assert_abs_diff_eq!(solution.rate_percent, -10.0, epsilon = 0.01);
    }

    #[test]
    fn test_deep_loss_bounded_step() {
        // The first Newton step from 10% lands below -100%; the bound keeps it in range
        let solution = solve_irr(&[-100_000.0, 47_859.0], &IrrConfig::default()).unwrap();
        assert!(solution.converged);
        assert_abs_diff_eq!(solution.rate_percent, -52.141, epsilon = 0.001);
    }

    #[test]
    fn test_losing_hold_with_small_exit() {
        // Ten years of negative carry, sale recovers part of the equity
        let mut flows = vec![-100_000.0];
        flows.extend(std::iter::repeat(-2_000.0).take(9));
        flows.push(60_000.0);
        let solution = solve_irr(&flows, &IrrConfig::default()).unwrap();

        assert!(solution.converged);
        assert!(solution.rate_percent < 0.0 && solution.rate_percent > -99.0);
        let (npv, _) = npv_and_derivative(&flows, solution.rate_percent / 100.0);
        assert_abs_diff_eq!(npv, 0.0, epsilon = 1.0);
    }

    #[test]
    fn test_total_loss_is_degenerate() {
        let err = solve_irr(&[-100_000.0, -2_000.0, -50_000.0], &IrrConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::NumericDegeneracy { .. }));
    }

    #[test]
    fn test_rootless_series_not_reported_as_best_effort() {
        // Early inflows never outweigh the outlay and the losing sale; Newton wanders
        let flows = [
            -100_000.0, 3_979.0, 3_859.0, 3_743.0, 3_631.0, 3_522.0, 3_416.0, 3_314.0, 3_215.0,
            3_118.0, -28_263.0,
        ];
        let err = solve_irr(&flows, &IrrConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::NumericDegeneracy { .. }));
    }

    #[test]
    fn test_root_below_search_floor_is_degenerate() {
        // 1 + r = 0.005, outside [-99%, 1000%]
        let err = solve_irr(&[-1000.0, 5.0], &IrrConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::NumericDegeneracy { .. }));
    }

    #[test]
    fn test_bisection_brackets_root() {
        let solution = bisect(&[-1000.0, 1100.0], 1e-7, 0).unwrap();
        assert!(solution.converged);
        assert_eq!(solution.method, IrrMethod::Bisection);
        assert_abs_diff_eq!(solution.rate_percent, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_guess_outside_bounds_is_clamped() {
        let config = IrrConfig {
            initial_guess: 50.0,
            ..IrrConfig::default()
        };
        let solution = solve_irr(&[-1000.0, 1100.0], &config).unwrap();
        assert_abs_diff_eq!(solution.rate_percent, 10.0, epsilon = 0.01);
    }

    #[test]
    fn test_single_cash_flow_is_degenerate() {
        let err = solve_irr(&[-1000.0], &IrrConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::NumericDegeneracy { .. }));
    }

    #[test]
    fn test_empty_series_is_degenerate() {
        assert!(solve_irr(&[], &IrrConfig::default()).is_err());
    }

    #[test]
    fn test_iteration_cap_returns_best_effort() {
        let config = IrrConfig {
            initial_guess: 0.9,
            tolerance: 1e-12,
            max_iterations: 1,
        };
        let solution = solve_irr(&[-1000.0, 300.0, 400.0, 500.0], &config).unwrap();
        assert!(!solution.converged);
        assert_eq!(solution.iterations, 1);
        assert!(solution.rate_percent.is_finite());
    }

    #[test]
    fn test_npv_and_derivative_at_zero_rate() {
        let (npv, dnpv) = npv_and_derivative(&[-100.0, 50.0, 60.0], 0.0);
        assert_abs_diff_eq!(npv, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dnpv, -(50.0 + 120.0), epsilon = 1e-12);
    }
}
