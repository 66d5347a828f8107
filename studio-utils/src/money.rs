use rust_decimal::{Decimal, RoundingStrategy};

/// Places kept for money and hour totals.
pub const DECIMAL_PLACES: u32 = 2;

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_hours(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamps a percentage into `0..=100`.
pub fn clamp_percentage(percentage: Decimal) -> Decimal {
    percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// `value * percentage / 100` with full precision.
pub fn percentage_of(value: Decimal, percentage: Decimal) -> Decimal {
    value * percentage / Decimal::ONE_HUNDRED
}
