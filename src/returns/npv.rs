//! Net present value at a fixed reference rate

use crate::error::{AnalysisError, Result};

/// Reference discount rate for deal NPV (8% per year)
pub const REFERENCE_DISCOUNT_RATE: f64 = 0.08;

/// Discount yearly cash flows (year 0 first, undiscounted) at `annual_rate`.
pub fn npv(annual_rate: f64, cash_flows: &[f64]) -> Result<f64> {
    if !annual_rate.is_finite() || annual_rate <= -1.0 {
        return Err(AnalysisError::degenerate(format!(
            "NPV discount rate must be greater than -100%, got {}",
            annual_rate
        )));
    }

    let one_plus_r = 1.0 + annual_rate;
    Ok(cash_flows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / one_plus_r.powi(t as i32))
        .sum())
}

/// NPV at [`REFERENCE_DISCOUNT_RATE`]
pub fn reference_npv(cash_flows: &[f64]) -> Result<f64> {
    npv(REFERENCE_DISCOUNT_RATE, cash_flows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_year_zero_undiscounted() {
        assert_eq!(reference_npv(&[-500.0]).unwrap(), -500.0);
    }

    #[test]
    fn test_reference_rate_discounting() {
        let value = reference_npv(&[-1000.0, 1080.0, 1166.4]).unwrap();
        assert_abs_diff_eq!(value, -1000.0 + 1000.0 + 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_repeat_calls_are_bit_identical() {
        let flows = [-100_000.0, 4_966.27, 5_115.26, 5_268.72, 281_234.51];
        let first = reference_npv(&flows).unwrap();
        let second = reference_npv(&flows).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_rate_at_minus_one_rejected() {
        assert!(npv(-1.0, &[-1.0, 2.0]).is_err());
    }
}
