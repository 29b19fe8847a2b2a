use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Platform fee retained per transaction, in basis points of the total (0.8%).
pub const APPLICATION_FEE_BASIS_POINTS: i64 = 80;

/// Convert a stored decimal amount to minor currency units (cents).
///
/// Stored amounts have two decimal places, so the rounding here only guards
/// against out-of-range values.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED).round().to_i64()
}

/// Convert minor currency units back to a two-decimal amount.
pub fn from_minor_units(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Platform fee for a total in minor units, rounded half-up to the nearest
/// integer cent.
pub fn application_fee(total_minor_units: i64) -> i64 {
    (total_minor_units * APPLICATION_FEE_BASIS_POINTS + 5_000) / 10_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_to_minor_units() {
        let price = Decimal::from_str("20.00").unwrap();
        assert_eq!(to_minor_units(price), Some(2000));

        let price = Decimal::from_str("0.99").unwrap();
        assert_eq!(to_minor_units(price), Some(99));

        assert_eq!(to_minor_units(Decimal::ZERO), Some(0));
    }

    #[test]
    fn test_from_minor_units() {
        assert_eq!(from_minor_units(6000), Decimal::from_str("60.00").unwrap());
        assert_eq!(from_minor_units(48), Decimal::from_str("0.48").unwrap());
    }

    #[test]
    fn test_application_fee_reference_case() {
        // $20.00 x 3 = 6000 cents, 0.8% of which rounds to 48 cents
        assert_eq!(application_fee(6000), 48);
    }

    #[test]
    fn test_application_fee_rounds_half_up() {
        // 6250 * 0.008 = 50.0 exactly
        assert_eq!(application_fee(6250), 50);
        // 5063 * 0.008 = 40.504 -> 41
        assert_eq!(application_fee(5063), 41);
        // 62 * 0.008 = 0.496 -> 0
        assert_eq!(application_fee(62), 0);
        // 63 * 0.008 = 0.504 -> 1
        assert_eq!(application_fee(63), 1);
    }

    #[test]
    fn test_application_fee_zero() {
        assert_eq!(application_fee(0), 0);
    }
}
