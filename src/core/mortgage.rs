use crate::core::forecast::round_cents;
use crate::utils::error::{AppError, Result};

/// Fixed-rate monthly payment, rounded to cents.
pub fn monthly_payment(principal: f64, annual_rate_percent: f64, years: f64) -> Result<f64> {
    if !principal.is_finite() || principal <= 0.0 {
        return Err(AppError::validation("principal must be greater than zero"));
    }
    if !years.is_finite() || years <= 0.0 {
        return Err(AppError::validation("years must be greater than zero"));
    }
    if !annual_rate_percent.is_finite() || annual_rate_percent < 0.0 {
        return Err(AppError::validation("interest rate cannot be negative"));
    }

    let months = years * 12.0;
    if annual_rate_percent == 0.0 {
        return Ok(round_cents(principal / months));
    }

    let r = annual_rate_percent / 100.0 / 12.0;
    let growth = (1.0 + r).powf(months);
    Ok(round_cents(principal * r * growth / (growth - 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_thirty_year_loan() {
        // 350k at 3.5% for 30 years
        assert_eq!(monthly_payment(350_000.0, 3.5, 30.0).unwrap(), 1571.66);
    }

    #[test]
    fn test_zero_rate_is_straight_division() {
        assert_eq!(monthly_payment(120_000.0, 0.0, 10.0).unwrap(), 1000.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(monthly_payment(0.0, 3.5, 30.0).is_err());
        assert!(monthly_payment(100.0, -1.0, 30.0).is_err());
        assert!(monthly_payment(100.0, 3.5, 0.0).is_err());
        assert!(monthly_payment(f64::NAN, 3.5, 30.0).is_err());
    }
}
