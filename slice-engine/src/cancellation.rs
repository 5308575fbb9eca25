//! Cancelled bookings
//!
//! A cancelled booking is never prorated. Without a payout it has no slices;
//! with one, its full stored booking-level amounts land in a single slice in
//! the check-in month, with zero nights and no cleaning fee.

use shared::{Booking, YearMonth};

use crate::error::CalcError;
use crate::month_range;
use crate::slice_money::{PAYOUT_EPSILON, SliceAmounts, money_zero, round_money};

/// The single slice a cancelled booking keeps, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelledSlice {
    pub year_month: YearMonth,
    pub amounts: SliceAmounts,
}

/// Resolve a cancelled booking
///
/// Returns `Ok(None)` when the payout is at or below [`PAYOUT_EPSILON`].
/// Commission fields missing on the booking count as zero; a missing stored
/// tax amount is an error because the net payout depends on it.
pub fn cancelled_slice(booking: &Booking) -> Result<Option<CancelledSlice>, CalcError> {
    if booking.payout <= PAYOUT_EPSILON {
        return Ok(None);
    }

    let payout = round_money(booking.payout);
    let tax = round_money(booking.tax_amount.ok_or(CalcError::MissingTaxAmount)?);
    let stored = |value: Option<rust_decimal::Decimal>| round_money(value.unwrap_or_default());

    Ok(Some(CancelledSlice {
        year_month: month_range::month_of(booking.check_in)?,
        amounts: SliceAmounts {
            payout,
            tax,
            net_payout: payout
                .checked_sub(tax)
                .ok_or(CalcError::Overflow("net_payout_in_month"))?,
            cleaning_fee: money_zero(),
            commission_base: stored(booking.commission_base),
            o2_commission: stored(booking.commission_value),
            owner_payout: stored(booking.client_income),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn cancelled(payout: rust_decimal::Decimal) -> Booking {
        Booking {
            id: 42,
            unit_id: 3,
            city: "Tulum".into(),
            source: "Airbnb".into(),
            payment_method: Some("Platform".into()),
            guest_type: None,
            check_in: NaiveDate::from_ymd_opt(2025, 3, 29).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2025, 4, 4).unwrap(),
            status: "Canceled".into(),
            payout,
            tax_percent: Some(dec!(16)),
            commission_percent: Some(dec!(20)),
            cleaning_fee: Some(dec!(50.00)),
            room_fee: Some(dec!(90.00)),
            tax_amount: Some(dec!(24.00)),
            commission_base: Some(dec!(126.00)),
            commission_value: Some(dec!(25.20)),
            client_income: Some(dec!(100.80)),
        }
    }

    #[test]
    fn test_zero_payout_has_no_slice() {
        assert_eq!(cancelled_slice(&cancelled(dec!(0.00))).unwrap(), None);
        assert_eq!(cancelled_slice(&cancelled(dec!(0.00001))).unwrap(), None);
        assert_eq!(cancelled_slice(&cancelled(dec!(-10.00))).unwrap(), None);
    }

    #[test]
    fn test_payout_lands_in_check_in_month_unprorated() {
        let slice = cancelled_slice(&cancelled(dec!(150.00))).unwrap().unwrap();
        assert_eq!(slice.year_month, "2025-03".parse().unwrap());
        assert_eq!(slice.amounts.payout, dec!(150.00));
        assert_eq!(slice.amounts.tax, dec!(24.00));
        assert_eq!(slice.amounts.net_payout, dec!(126.00));
        assert_eq!(slice.amounts.cleaning_fee, dec!(0.00));
        assert_eq!(slice.amounts.commission_base, dec!(126.00));
        assert_eq!(slice.amounts.o2_commission, dec!(25.20));
        assert_eq!(slice.amounts.owner_payout, dec!(100.80));
    }

    #[test]
    fn test_stored_commission_is_not_recomputed() {
        let mut booking = cancelled(dec!(150.00));
        booking.commission_value = Some(dec!(10.004));
        booking.client_income = None;
        let slice = cancelled_slice(&booking).unwrap().unwrap();
        assert_eq!(slice.amounts.o2_commission, dec!(10.00));
        assert_eq!(slice.amounts.owner_payout, dec!(0.00));
    }

    #[test]
    fn test_net_payout_overflow_is_error() {
        let mut booking = cancelled(rust_decimal::Decimal::MAX);
        booking.tax_amount = Some(rust_decimal::Decimal::MIN);
        assert_eq!(
            cancelled_slice(&booking),
            Err(CalcError::Overflow("net_payout_in_month"))
        );
    }

    #[test]
    fn test_missing_tax_amount_is_error() {
        let mut booking = cancelled(dec!(150.00));
        booking.tax_amount = None;
        assert_eq!(cancelled_slice(&booking), Err(CalcError::MissingTaxAmount));
    }
}
