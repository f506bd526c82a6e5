//! Fixed-precision decimal helpers shared by the kernel and the order placer.
//!
//! Spec §3/§9 require truncation toward zero to an asset's declared
//! precision, and rendering amounts sent over the wire in plain (non-
//! scientific) notation with trailing zeros stripped.

use rust_decimal::Decimal;

/// Truncates `value` toward zero to `precision` decimal places.
///
/// `Decimal::round_dp_with_strategy` with `ToZero` does exactly this; kept
/// as a named helper so call sites read as "truncate to asset precision"
/// rather than reaching for the rounding-strategy enum inline everywhere.
#[must_use]
pub fn truncate(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, rust_decimal::RoundingStrategy::ToZero)
}

/// Scales a raw integer balance (smallest-unit units, as the exchange
/// reports it) down to a decimal amount by dividing by `10^precision` (spec
/// §4.1/§4.5; `original_source/src/core/bitsharesarbitrage.py:109`'s
/// `new_raw_balance / 10 ** precs_arr[i-1]`).
#[must_use]
pub fn scale_down(raw: Decimal, precision: u32) -> Decimal {
    raw * Decimal::new(1, precision)
}

/// Renders a decimal in plain notation with trailing zeros stripped, the
/// form the wire protocol expects for order amounts (spec §4.5).
///
/// `Decimal` never uses scientific notation in its `Display` impl, so this
/// only needs to normalize away trailing zeros introduced by arithmetic
/// (e.g. `1.50000` -> `1.5`, `2.00000` -> `2`).
#[must_use]
pub fn format_plain(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn truncate_toward_zero_drops_excess_digits() {
        assert_eq!(truncate(dec!(1.23456), 2), dec!(1.23));
        assert_eq!(truncate(dec!(-1.23456), 2), dec!(-1.23));
    }

    #[test]
    fn truncate_never_rounds_up() {
        assert_eq!(truncate(dec!(1.999), 2), dec!(1.99));
    }

    #[test]
    fn truncate_is_a_no_op_within_precision() {
        assert_eq!(truncate(dec!(1.2), 4), dec!(1.2));
    }

    #[test]
    fn scale_down_divides_by_ten_to_the_precision() {
        assert_eq!(scale_down(dec!(123456), 4), dec!(12.3456));
        assert_eq!(scale_down(dec!(500), 0), dec!(500));
    }

    #[test]
    fn format_plain_strips_trailing_zeros() {
        assert_eq!(format_plain(dec!(1.50000)), "1.5");
        assert_eq!(format_plain(dec!(2.00000)), "2");
    }

    #[test]
    fn format_plain_keeps_significant_digits() {
        assert_eq!(format_plain(dec!(0.000123)), "0.000123");
    }
}
