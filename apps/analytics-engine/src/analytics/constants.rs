//! Decimal constants for statistics derivation.

use rust_decimal::Decimal;

pub const TWO: Decimal = Decimal::TWO;
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;
/// Fixed trading-days-per-year annualization factor.
pub const TRADING_DAYS: Decimal = Decimal::from_parts(252, 0, 0, false, 0);
/// A day counts as winning only above this net PnL (0.01), so floating
/// noise never classifies a flat day.
pub const PROFIT_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
/// A day counts as losing only below this net PnL (-0.01).
pub const LOSS_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, true, 2);
/// Newton-iteration convergence bound (0.0000001).
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 7);
