//! Month slice money calculation using rust_decimal
//!
//! One function per derived field, composed by [`prorate`] in a fixed order.
//! Every rounded step is rounded to 2 decimal places (half away from zero)
//! before it feeds the next one; the two subtractions are exact.
//!
//! ```text
//! payout_in_month     = round(payout × nights_in_month ÷ nights_total)
//! tax_in_month        = round(payout_in_month × tax% ÷ 100)
//! net_payout_in_month = payout_in_month − tax_in_month
//! cleaning_fee        = cleaning_fee if checkout month else 0
//! commission_base     = round(net_payout_in_month − cleaning_fee)
//! o2_commission       = round(commission_base × commission% ÷ 100)
//! owner_payout        = commission_base − o2_commission
//! ```

use rust_decimal::prelude::*;
use shared::{Booking, YearMonth};

use crate::error::CalcError;
use crate::month_range::MonthNights;

/// Rounding precision for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Payouts at or below this are treated as zero (0.00001)
pub const PAYOUT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 5);

/// Round to 2 decimal places and pin the scale to 2
///
/// Pinning the scale keeps `300` and `300.00` from ever both appearing, so
/// recomputed rows compare and serialize identically.
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(DECIMAL_PLACES);
    rounded
}

/// Zero with scale 2
#[inline]
pub fn money_zero() -> Decimal {
    Decimal::new(0, DECIMAL_PLACES)
}

/// Booking-level inputs to proration
#[derive(Debug, Clone, PartialEq)]
pub struct ProrationTerms {
    pub payout: Decimal,
    pub tax_percent: Decimal,
    pub commission_percent: Decimal,
    pub cleaning_fee: Decimal,
}

impl From<&Booking> for ProrationTerms {
    fn from(booking: &Booking) -> Self {
        Self {
            payout: booking.payout,
            tax_percent: booking.tax_percent.unwrap_or(Decimal::ZERO),
            commission_percent: booking.commission_percent.unwrap_or(Decimal::ZERO),
            cleaning_fee: booking.cleaning_fee.unwrap_or(Decimal::ZERO),
        }
    }
}

/// Money fields of one month slice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceAmounts {
    pub payout: Decimal,
    pub tax: Decimal,
    pub net_payout: Decimal,
    pub cleaning_fee: Decimal,
    pub commission_base: Decimal,
    pub o2_commission: Decimal,
    pub owner_payout: Decimal,
}

/// Checked arithmetic result, naming the field that overflowed
fn checked(value: Option<Decimal>, field: &'static str) -> Result<Decimal, CalcError> {
    value.ok_or(CalcError::Overflow(field))
}

/// Payout share for the month: `round(payout × nights_in_month ÷ nights_total)`
///
/// The ratio is not rounded on its own. Returns zero when `nights_total` is
/// not positive (no ratio exists; the month resolver never yields such months).
pub fn payout_in_month(payout: Decimal, nights_in_month: i32, nights_total: i32) -> Result<Decimal, CalcError> {
    if nights_total <= 0 {
        return Ok(money_zero());
    }
    let share = payout
        .checked_mul(Decimal::from(nights_in_month))
        .and_then(|v| v.checked_div(Decimal::from(nights_total)));
    checked(share, "payout_in_month").map(round_money)
}

pub fn tax_in_month(payout_in_month: Decimal, tax_percent: Decimal) -> Result<Decimal, CalcError> {
    let tax = payout_in_month
        .checked_mul(tax_percent)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED));
    checked(tax, "tax_in_month").map(round_money)
}

/// Exact: both inputs are already rounded
pub fn net_payout_in_month(payout_in_month: Decimal, tax_in_month: Decimal) -> Result<Decimal, CalcError> {
    checked(payout_in_month.checked_sub(tax_in_month), "net_payout_in_month")
}

/// The whole cleaning fee in the checkout month, nothing elsewhere
pub fn cleaning_fee_in_month(
    cleaning_fee: Decimal,
    month: YearMonth,
    checkout_month: YearMonth,
) -> Decimal {
    if month == checkout_month {
        round_money(cleaning_fee)
    } else {
        money_zero()
    }
}

pub fn commission_base_in_month(
    net_payout_in_month: Decimal,
    cleaning_fee_in_month: Decimal,
) -> Result<Decimal, CalcError> {
    checked(
        net_payout_in_month.checked_sub(cleaning_fee_in_month),
        "commission_base_in_month",
    )
    .map(round_money)
}

pub fn o2_commission_in_month(
    commission_base_in_month: Decimal,
    commission_percent: Decimal,
) -> Result<Decimal, CalcError> {
    let commission = commission_base_in_month
        .checked_mul(commission_percent)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED));
    checked(commission, "o2_commission_in_month").map(round_money)
}

/// Exact: both inputs are already rounded
pub fn owner_payout_in_month(
    commission_base_in_month: Decimal,
    o2_commission_in_month: Decimal,
) -> Result<Decimal, CalcError> {
    checked(
        commission_base_in_month.checked_sub(o2_commission_in_month),
        "owner_payout_in_month",
    )
}

/// Compute all money fields for one month of a stay
///
/// Fails with [`CalcError::Overflow`] when an amount leaves the decimal range.
pub fn prorate(
    terms: &ProrationTerms,
    month: &MonthNights,
    nights_total: i32,
    checkout_month: YearMonth,
) -> Result<SliceAmounts, CalcError> {
    let payout = payout_in_month(terms.payout, month.nights_in_month, nights_total)?;
    let tax = tax_in_month(payout, terms.tax_percent)?;
    let net_payout = net_payout_in_month(payout, tax)?;
    let cleaning_fee = cleaning_fee_in_month(terms.cleaning_fee, month.year_month, checkout_month);
    let commission_base = commission_base_in_month(net_payout, cleaning_fee)?;
    let o2_commission = o2_commission_in_month(commission_base, terms.commission_percent)?;
    let owner_payout = owner_payout_in_month(commission_base, o2_commission)?;

    Ok(SliceAmounts {
        payout,
        tax,
        net_payout,
        cleaning_fee,
        commission_base,
        o2_commission,
        owner_payout,
    })
}

#[cfg(test)]
mod tests;
