//! Booking → month slices
//!
//! [`slices_for_booking`] is the single formula every refresh mode evaluates.
//! Modes differ only in which bookings they load and which months they keep,
//! so a targeted refresh and a full rebuild agree row for row.

use shared::{Booking, MonthSlice, YearMonth};

use crate::cancellation;
use crate::error::CalcError;
use crate::month_range::{self, MonthNights};
use crate::slice_money::{self, ProrationTerms, SliceAmounts, money_zero, round_money};

/// Which bookings get sliced at all
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlicePolicy {
    /// Allowed booking sources (case-insensitive); empty allows every source
    pub eligible_sources: Vec<String>,
}

impl SlicePolicy {
    pub fn with_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            eligible_sources: sources
                .into_iter()
                .map(|s| s.into().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

/// Complete slice set for one booking, ordered by month
pub fn slices_for_booking(booking: &Booking, policy: &SlicePolicy) -> Result<Vec<MonthSlice>, CalcError> {
    if !booking.is_source_eligible(&policy.eligible_sources) {
        return Ok(Vec::new());
    }

    if booking.is_cancelled() {
        return Ok(cancellation::cancelled_slice(booking)?
            .map(|c| build_slice(booking, c.year_month, 0, 0, c.amounts))
            .into_iter()
            .collect());
    }

    let stay = month_range::resolve_months(booking.check_in, booking.check_out)?;
    let checkout_month = month_range::checkout_month(booking.check_out);
    let terms = ProrationTerms::from(booking);

    stay.months
        .iter()
        .map(|m: &MonthNights| {
            let amounts = slice_money::prorate(&terms, m, stay.nights_total, checkout_month)?;
            Ok(build_slice(booking, m.year_month, stay.nights_total, m.nights_in_month, amounts))
        })
        .collect()
}

fn build_slice(
    booking: &Booking,
    year_month: YearMonth,
    nights_total: i32,
    nights_in_month: i32,
    amounts: SliceAmounts,
) -> MonthSlice {
    MonthSlice {
        booking_id: booking.id,
        year_month,
        unit_id: booking.unit_id,
        city: booking.city.clone(),
        source: booking.source.clone(),
        payment_method: booking.payment_method.clone(),
        guest_type: booking.guest_type.clone(),
        month_start_date: year_month.first_day(),
        month_end_date: year_month.last_day(),
        nights_total,
        nights_in_month,
        room_fee_in_month: booking.room_fee.map(round_money).unwrap_or_else(money_zero),
        payout_in_month: amounts.payout,
        tax_in_month: amounts.tax,
        net_payout_in_month: amounts.net_payout,
        cleaning_fee_in_month: amounts.cleaning_fee,
        commission_base_in_month: amounts.commission_base,
        o2_commission_in_month: amounts.o2_commission,
        owner_payout_in_month: amounts.owner_payout,
    }
}
