//! Statistical math utilities for statistics derivation.

use rust_decimal::Decimal;

use super::constants::{TOLERANCE, TWO};

/// Calculate mean of a slice of decimals.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().sum();
    Some(sum / Decimal::from(values.len() as u64))
}

/// Population standard deviation (divisor n, not n-1) of a slice of
/// decimals. The annualized-volatility contract uses the population form.
pub fn population_std_dev(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }

    let avg = mean(values)?;
    let variance_sum: Decimal = values.iter().map(|v| (*v - avg) * (*v - avg)).sum();
    let variance = variance_sum / Decimal::from(values.len() as u64);

    sqrt_decimal(variance)
}

/// Approximate square root using Newton's method.
pub fn sqrt_decimal(value: Decimal) -> Option<Decimal> {
    if value < Decimal::ZERO {
        return None;
    }
    if value == Decimal::ZERO {
        return Some(Decimal::ZERO);
    }

    let mut guess = value / TWO;

    for _ in 0..50 {
        let next = (guess + value / guess) / TWO;
        if (next - guess).abs() < TOLERANCE {
            return Some(next);
        }
        guess = next;
    }

    Some(guess)
}
