//! Payback period with fractional-year interpolation

use serde::{Deserialize, Serialize};

/// Time until cumulative cash flow turns non-negative
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaybackPeriod {
    /// Years to payback. Equals the holding period when never recovered,
    /// so it cannot by itself tell "recovered at exit" from "not recovered".
    pub years: f64,

    /// Whether cumulative cash flow reached zero within the series
    pub recovered: bool,
}

/// Walk yearly cash flows (year 0 = initial outlay) and interpolate the crossing.
///
/// In the first year y where the running total becomes non-negative the payback
/// is `(y - 1) + |cumulative before y| / cash_flow[y]`.
pub fn payback_period(cash_flows: &[f64]) -> PaybackPeriod {
    let Some((&outlay, rest)) = cash_flows.split_first() else {
        return PaybackPeriod {
            years: 0.0,
            recovered: false,
        };
    };

    let mut cumulative = outlay;

    for (index, &cf) in rest.iter().enumerate() {
        let year = index + 1;
        let before = cumulative;
        cumulative += cf;

        if cumulative >= 0.0 {
            let fraction = if before >= 0.0 { 0.0 } else { before.abs() / cf };
            return PaybackPeriod {
                years: (year - 1) as f64 + fraction,
                recovered: true,
            };
        }
    }

    PaybackPeriod {
        years: rest.len() as f64,
        recovered: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_fractional_crossing() {
        // Cumulative goes -1000, -700, -200, +300
        let payback = payback_period(&[-1000.0, 300.0, 500.0, 500.0]);
        assert!(payback.recovered);
        assert_abs_diff_eq!(payback.years, 2.4, epsilon = 1e-12);
    }

    #[test]
    fn test_exact_year_boundary() {
        let payback = payback_period(&[-1000.0, 500.0, 500.0, 500.0]);
        assert_abs_diff_eq!(payback.years, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_never_recovered_reports_holding_period() {
        let payback = payback_period(&[-1000.0, 100.0, 100.0, 100.0, 100.0]);
        assert!(!payback.recovered);
        assert_eq!(payback.years, 4.0);
    }

    #[test]
    fn test_recovery_at_exit_matches_unrecovered_years() {
        // Recovered in the final year with a full-year fraction
        let recovered = payback_period(&[-1000.0, 0.0, 1000.0]);
        let unrecovered = payback_period(&[-1000.0, 0.0, 999.0]);
        assert_eq!(recovered.years, 2.0);
        assert_eq!(unrecovered.years, 2.0);
        assert!(recovered.recovered);
        assert!(!unrecovered.recovered);
    }

    #[test]
    fn test_no_outlay_pays_back_immediately() {
        let payback = payback_period(&[0.0, 100.0]);
        assert!(payback.recovered);
        assert_eq!(payback.years, 0.0);
    }
}
