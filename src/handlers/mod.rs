pub mod admin;
pub mod catalog;
pub mod orders;
pub mod payments;

use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::errors::AppError;

/// Money leaves the API as a decimal string with two fractional digits.
pub(crate) fn money(amount: &BigDecimal) -> String {
    amount.with_scale(2).to_string()
}

/// Parses a decimal amount with at most two fractional digits.
pub(crate) fn parse_money(field: &str, raw: &str) -> Result<BigDecimal, AppError> {
    let amount = BigDecimal::from_str(raw.trim()).map_err(|_| {
        AppError::BadRequest(format!("{field} must be a decimal amount, got '{raw}'"))
    })?;
    if amount.with_scale(2) != amount {
        return Err(AppError::BadRequest(format!(
            "{field} has more than two decimal places, got '{raw}'"
        )));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_has_two_decimals() {
        assert_eq!(money(&BigDecimal::from(1300)), "1300.00");
        assert_eq!(money(&BigDecimal::from_str("19.5").unwrap()), "19.50");
    }

    #[test]
    fn parse_money_rejects_garbage() {
        assert_eq!(parse_money("amount", " 1300.00 ").unwrap(), BigDecimal::from(1300));
        assert!(matches!(parse_money("amount", "12,00"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_money("price", "0.005"), Err(AppError::BadRequest(_))));
        assert_eq!(parse_money("price", "19.50").unwrap(), BigDecimal::from_str("19.5").unwrap());
    }
}
