//! The single rounding rule of the system.
//!
//! Every reported average, change and return is rounded to exactly two decimal
//! places, half away from zero, on the decimal value of its inputs. A price is
//! taken at its shortest round-trip decimal form, so a close of `100.005`
//! means `100.005` and a move from `100` to it reports `0.01`.

use rust_decimal::prelude::*;
use std::str::FromStr;

const SCALE: u32 = 2;
const STRATEGY: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    // `Display` for f64 prints the shortest string that round-trips, never in exponent form.
    Decimal::from_str(&value.to_string()).ok()
}

fn to_f64(value: Decimal) -> f64 {
    let value = value.round_dp_with_strategy(SCALE, STRATEGY);
    // Mantissa and power of ten are both exact in f64 at this scale, so the
    // quotient is the float nearest the decimal.
    value.mantissa() as f64 / 10f64.powi(value.scale() as i32)
}

/// Rounds a value to two decimal places.
///
/// Non-finite values, and magnitudes beyond what `Decimal` holds (which carry
/// no fractional digits as `f64`), come back unchanged.
pub fn round_2dp(value: f64) -> f64 {
    match to_decimal(value) {
        Some(d) => to_f64(d),
        None => value,
    }
}

/// `(new - old) / old * 100`, rounded. `None` when `old` is zero.
pub fn pct_change(old: f64, new: f64) -> Option<f64> {
    if old == 0.0 {
        return None;
    }
    let exact = to_decimal(old).zip(to_decimal(new)).and_then(|(old, new)| {
        new.checked_sub(old)?
            .checked_div(old)?
            .checked_mul(Decimal::ONE_HUNDRED)
    });
    Some(match exact {
        Some(change) => to_f64(change),
        None => round_2dp((new - old) / old * 100.0),
    })
}

/// Arithmetic mean of the values, rounded. `None` for an empty input.
pub fn mean_2dp<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut count: u64 = 0;
    let mut float_sum = 0.0;
    let mut decimal_sum = Some(Decimal::ZERO);
    for value in values {
        count += 1;
        float_sum += value;
        decimal_sum = decimal_sum
            .zip(to_decimal(value))
            .and_then(|(sum, v)| sum.checked_add(v));
    }
    if count == 0 {
        return None;
    }
    let exact = decimal_sum.and_then(|sum| sum.checked_div(Decimal::from(count)));
    Some(match exact {
        Some(mean) => to_f64(mean),
        None => round_2dp(float_sum / count as f64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn half_cent_moves_round_away_from_zero() {
        assert_eq!(pct_change(100.0, 100.005), Some(0.01));
        assert_eq!(pct_change(100.0, 99.995), Some(-0.01));
        assert_eq!(round_2dp(0.005), 0.01);
        assert_eq!(round_2dp(-0.005), -0.01);
        assert_eq!(round_2dp(2.675), 2.68);
    }

    #[test]
    fn pct_change_matches_worked_example() {
        assert_eq!(pct_change(100.0, 90.0), Some(-10.0));
        assert_eq!(pct_change(90.0, 99.0), Some(10.0));
        assert_eq!(pct_change(100.0, 99.0), Some(-1.0));
        assert_eq!(pct_change(0.0, 5.0), None);
    }

    #[test]
    fn out_of_range_change_falls_back_to_float_math() {
        let change = pct_change(1e-20, 1e20).unwrap();
        assert_eq!(change, (1e20 - 1e-20) / 1e-20 * 100.0);
        assert!(change.is_finite());
        assert!(round_2dp(f64::NAN).is_nan());
    }

    #[test]
    fn mean_rounds_once_at_the_end() {
        assert_eq!(mean_2dp([100.0, 90.0, 99.0]), Some(96.33));
        assert_eq!(mean_2dp([1.005]), Some(1.01));
        assert_eq!(mean_2dp(std::iter::empty()), None);
    }

    proptest! {
        #[test]
        fn rounded_values_have_at_most_two_decimals(
            cents in -10_000_000i64..10_000_000,
            extra in 0u32..1000,
        ) {
            let value = cents as f64 / 100.0 + extra as f64 / 100_000.0;
            let rounded = round_2dp(value);
            let scaled = rounded * 100.0;
            prop_assert!((scaled - scaled.round()).abs() < 1e-6);
            prop_assert!((rounded - value).abs() <= 0.005 + 1e-9);
        }

        #[test]
        fn round_2dp_is_idempotent(cents in -10_000_000i64..10_000_000) {
            let value = cents as f64 / 100.0;
            prop_assert_eq!(round_2dp(value), value);
        }
    }
}
