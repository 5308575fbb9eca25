use super::*;
use rust_decimal_macros::dec;

fn ym(s: &str) -> YearMonth {
    s.parse().unwrap()
}

fn month(s: &str, nights: i32) -> MonthNights {
    MonthNights {
        year_month: ym(s),
        nights_in_month: nights,
    }
}

fn terms(payout: Decimal, tax: Decimal, commission: Decimal, cleaning: Decimal) -> ProrationTerms {
    ProrationTerms {
        payout,
        tax_percent: tax,
        commission_percent: commission,
        cleaning_fee: cleaning,
    }
}

#[test]
fn test_round_money_half_away_from_zero() {
    assert_eq!(round_money(dec!(0.125)), dec!(0.13));
    assert_eq!(round_money(dec!(-0.125)), dec!(-0.13));
    assert_eq!(round_money(dec!(2.344)), dec!(2.34));
    assert_eq!(round_money(dec!(2.345)), dec!(2.35));
}

#[test]
fn test_round_money_pins_scale() {
    assert_eq!(round_money(dec!(300)).to_string(), "300.00");
    assert_eq!(round_money(dec!(50.5)).to_string(), "50.50");
    assert_eq!(money_zero().to_string(), "0.00");
}

#[test]
fn test_payout_ratio_is_not_rounded_first() {
    // 1/3 rounded to 0.33 would give 198.00; the exact ratio gives 200.00
    assert_eq!(payout_in_month(dec!(600.00), 1, 3).unwrap(), dec!(200.00));
    assert_eq!(payout_in_month(dec!(100.00), 1, 3).unwrap(), dec!(33.33));
    assert_eq!(payout_in_month(dec!(100.00), 2, 3).unwrap(), dec!(66.67));
}

#[test]
fn test_payout_without_nights_is_zero() {
    assert_eq!(payout_in_month(dec!(500.00), 0, 0).unwrap(), dec!(0.00));
}

#[test]
fn test_worked_example_january() {
    let t = terms(dec!(600.00), dec!(16), dec!(20), dec!(50.00));
    let jan = prorate(&t, &month("2025-01", 3), 6, ym("2025-02")).unwrap();

    assert_eq!(jan.payout, dec!(300.00));
    assert_eq!(jan.tax, dec!(48.00));
    assert_eq!(jan.net_payout, dec!(252.00));
    assert_eq!(jan.cleaning_fee, dec!(0.00));
    assert_eq!(jan.commission_base, dec!(252.00));
    assert_eq!(jan.o2_commission, dec!(50.40));
    assert_eq!(jan.owner_payout, dec!(201.60));
}

#[test]
fn test_worked_example_february() {
    let t = terms(dec!(600.00), dec!(16), dec!(20), dec!(50.00));
    let feb = prorate(&t, &month("2025-02", 3), 6, ym("2025-02")).unwrap();

    assert_eq!(feb.payout, dec!(300.00));
    assert_eq!(feb.tax, dec!(48.00));
    assert_eq!(feb.net_payout, dec!(252.00));
    assert_eq!(feb.cleaning_fee, dec!(50.00));
    assert_eq!(feb.commission_base, dec!(202.00));
    assert_eq!(feb.o2_commission, dec!(40.40));
    assert_eq!(feb.owner_payout, dec!(161.60));
}

#[test]
fn test_tax_uses_rounded_payout() {
    // payout share 33.33 (not 33.333...), 16% of it is 5.3328 -> 5.33
    let t = terms(dec!(100.00), dec!(16), dec!(0), dec!(0));
    let amounts = prorate(&t, &month("2025-03", 1), 3, ym("2025-04")).unwrap();
    assert_eq!(amounts.payout, dec!(33.33));
    assert_eq!(amounts.tax, dec!(5.33));
    assert_eq!(amounts.net_payout, dec!(28.00));
}

#[test]
fn test_commission_uses_rounded_base() {
    // base = 99.99 - 0.00, 15% = 14.9985 -> 15.00
    let t = terms(dec!(99.99), dec!(0), dec!(15), dec!(0));
    let amounts = prorate(&t, &month("2025-03", 2), 2, ym("2025-03")).unwrap();
    assert_eq!(amounts.commission_base, dec!(99.99));
    assert_eq!(amounts.o2_commission, dec!(15.00));
    assert_eq!(amounts.owner_payout, dec!(84.99));
}

#[test]
fn test_cleaning_fee_larger_than_net_gives_negative_base() {
    let t = terms(dec!(80.00), dec!(16), dec!(20), dec!(100.00));
    let amounts = prorate(&t, &month("2025-05", 1), 1, ym("2025-05")).unwrap();
    assert_eq!(amounts.net_payout, dec!(67.20));
    assert_eq!(amounts.commission_base, dec!(-32.80));
    assert_eq!(amounts.o2_commission, dec!(-6.56));
    assert_eq!(amounts.owner_payout, dec!(-26.24));
}

#[test]
fn test_missing_percentages_default_to_zero() {
    let booking = Booking {
        id: 1,
        unit_id: 7,
        city: "Playa".into(),
        source: "Airbnb".into(),
        payment_method: None,
        guest_type: None,
        check_in: chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        check_out: chrono::NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
        status: "Past".into(),
        payout: dec!(250.00),
        tax_percent: None,
        commission_percent: None,
        cleaning_fee: None,
        room_fee: None,
        tax_amount: None,
        commission_base: None,
        commission_value: None,
        client_income: None,
    };
    let t = ProrationTerms::from(&booking);
    assert_eq!(t.tax_percent, Decimal::ZERO);
    assert_eq!(t.commission_percent, Decimal::ZERO);
    assert_eq!(t.cleaning_fee, Decimal::ZERO);

    let amounts = prorate(&t, &month("2025-01", 2), 2, ym("2025-01")).unwrap();
    assert_eq!(amounts.owner_payout, dec!(250.00));
}

#[test]
fn test_month_shares_conserve_payout_within_rounding() {
    // 3 equal months of 1 night each: 33.33 * 3 = 99.99
    let t = terms(dec!(100.00), dec!(0), dec!(0), dec!(0));
    let total: Decimal = ["2025-01", "2025-02", "2025-03"]
        .iter()
        .map(|m| prorate(&t, &month(m, 1), 3, ym("2025-03")).unwrap().payout)
        .sum();
    assert!((total - dec!(100.00)).abs() <= dec!(0.02));
}

#[test]
fn test_overflow_is_an_error() {
    assert_eq!(
        payout_in_month(Decimal::MAX, 2, 3),
        Err(CalcError::Overflow("payout_in_month"))
    );
    assert_eq!(
        tax_in_month(Decimal::MAX, dec!(200)),
        Err(CalcError::Overflow("tax_in_month"))
    );
    assert_eq!(
        owner_payout_in_month(Decimal::MIN, dec!(1)),
        Err(CalcError::Overflow("owner_payout_in_month"))
    );

    // A huge cleaning fee overflows the commission base, not the payout
    let t = terms(Decimal::MIN / dec!(2), dec!(0), dec!(0), Decimal::MAX);
    assert_eq!(
        prorate(&t, &month("2025-01", 1), 1, ym("2025-01")),
        Err(CalcError::Overflow("commission_base_in_month"))
    );
}
