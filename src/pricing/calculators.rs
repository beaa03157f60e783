//! Core pricing calculation functions.
//!
//! Pure functions for quote math - no catalog lookup, no storage.
//! All amounts are whole KRW; the only fractional quantity is the
//! duration multiplier, which is kept exact as a `Decimal`.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::catalog::{OptionKind, OptionValue};

/// Count options whose first unit is included in the base price.
pub const FIRST_UNIT_FREE_OPTIONS: [&str; 2] = ["boothCount", "kioskCount"];

/// Share of the daily cost charged for each day after the first.
pub const EXTRA_DAY_RATE: Decimal = dec!(0.3);

/// Units of a numeric option that are actually charged.
///
/// Booth and kiosk counts include one unit in the base price, so only the
/// units above the first are billed. Every other count is billed as given.
pub fn billable_quantity(option_id: &str, quantity: i64) -> i64 {
    if FIRST_UNIT_FREE_OPTIONS.contains(&option_id) {
        quantity.saturating_sub(1).max(0)
    } else {
        quantity
    }
}

/// Price contribution of one option value.
///
/// Values of the wrong shape and select values without a modifier contribute
/// nothing. Numbers are not range-checked here.
pub fn option_contribution(option_id: &str, kind: &OptionKind, value: &OptionValue) -> i64 {
    match (kind, value) {
        (OptionKind::Toggle { price_modifier, .. }, OptionValue::Toggle(on)) => {
            if *on {
                *price_modifier
            } else {
                0
            }
        }
        (OptionKind::Select { price_modifier, .. }, OptionValue::Choice(choice)) => {
            price_modifier.get(choice).copied().unwrap_or(0)
        }
        (OptionKind::Number { price_modifier, .. }, OptionValue::Number(n)) => {
            price_modifier.saturating_mul(billable_quantity(option_id, *n))
        }
        _ => 0,
    }
}

/// Multiplier applied to the daily-recurring cost.
///
/// One day (or less) is exactly 1; each further day adds 30%, uncapped.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use quote_engine_web::pricing::duration_multiplier;
///
/// assert_eq!(duration_multiplier(1), dec!(1));
/// assert_eq!(duration_multiplier(3), dec!(1.6));
/// ```
pub fn duration_multiplier(duration_days: i64) -> Decimal {
    if duration_days <= 1 {
        Decimal::ONE
    } else {
        Decimal::ONE + Decimal::from(duration_days - 1) * EXTRA_DAY_RATE
    }
}

/// Round to whole KRW, halves away from zero.
pub fn round_krw(amount: Decimal) -> i64 {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded.to_i64().unwrap_or(if rounded.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Final quote total.
///
/// Services and daily add-ons scale with duration; fixed add-ons are added
/// after scaling. Rounding happens once, on the combined amount. Amounts
/// beyond `Decimal` range saturate to `i64::MAX` or `i64::MIN`.
pub fn quote_total(
    services_subtotal: i64,
    add_ons_daily: i64,
    add_ons_fixed: i64,
    multiplier: Decimal,
) -> i64 {
    let daily = Decimal::from(services_subtotal) + Decimal::from(add_ons_daily);
    let fixed = Decimal::from(add_ons_fixed);
    match daily
        .checked_mul(multiplier)
        .and_then(|scaled| scaled.checked_add(fixed))
    {
        Some(amount) => round_krw(amount),
        // multiplier is always >= 1, so the overflow takes the sign of `daily`
        None if daily.is_sign_negative() => i64::MIN,
        None => i64::MAX,
    }
}

/// Add-on cost split by whether it scales with duration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOnTotals {
    pub daily: i64,
    pub fixed: i64,
    pub lines: Vec<AddOnLine>,
}

impl AddOnTotals {
    pub fn push(&mut self, line: AddOnLine) {
        if line.per_day {
            self.daily = self.daily.saturating_add(line.price_krw);
        } else {
            self.fixed = self.fixed.saturating_add(line.price_krw);
        }
        self.lines.push(line);
    }

    pub fn total(&self) -> i64 {
        self.daily.saturating_add(self.fixed)
    }
}

/// Priced service in an estimate breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLine {
    pub service_key: String,
    pub subtotal: i64,
}

/// Priced add-on in an estimate breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOnLine {
    pub id: String,
    #[serde(rename = "priceKRW")]
    pub price_krw: i64,
    pub per_day: bool,
}

/// Result of estimate aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    /// Sum of all service prices
    pub subtotal: i64,
    /// Daily plus fixed add-on prices, unscaled
    pub add_ons_total: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub duration_multiplier: Decimal,
    pub total: i64,
    pub services: Vec<ServiceLine>,
    pub add_ons: Vec<AddOnLine>,
}

impl Estimate {
    /// Combine priced lines into a total for the given duration
    pub fn from_lines(services: Vec<ServiceLine>, add_ons: AddOnTotals, duration_days: i64) -> Self {
        let subtotal = services
            .iter()
            .fold(0i64, |acc, line| acc.saturating_add(line.subtotal));
        let multiplier = duration_multiplier(duration_days);
        let total = quote_total(subtotal, add_ons.daily, add_ons.fixed, multiplier);

        Estimate {
            subtotal,
            add_ons_total: add_ons.total(),
            duration_multiplier: multiplier,
            total,
            services,
            add_ons: add_ons.lines,
        }
    }

    /// Estimate of an empty quote
    pub fn empty() -> Self {
        Self::from_lines(Vec::new(), AddOnTotals::default(), 1)
    }
}
