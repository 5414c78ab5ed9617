//! Utility functions for ids, calendar dates and amounts

use bech32::Bech32m;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use uuid7::uuid7;

pub const CURRENCY_SYMBOL: &str = "⃁";

// serial number of 1970-01-01 in the 1900 date system
const EXCEL_UNIX_EPOCH_SERIAL: f64 = 25_569.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d-%b-%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

// construct a unique id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

/// Five uppercase hex characters, used for placeholder serial numbers.
pub fn short_code() -> String {
    let id = uuid7().to_string();
    id[id.len() - 5..].to_uppercase()
}

/// The current local calendar day.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse user or spreadsheet supplied text into a calendar date.
///
/// Accepts ISO dates, RFC 3339 / ISO date-times (the time of day is dropped)
/// and a handful of common written forms. Returns `None` for blank or
/// unrecognised input.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
    {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

/// Reformat a parseable date as `YYYY-MM-DD`.
pub fn normalize_date(value: &str) -> Option<String> {
    parse_date(value).map(|d| d.format("%Y-%m-%d").to_string())
}

/// Whole calendar days from `from` to `to`, negative when `to` is earlier.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Convert an Excel 1900-system serial number into a calendar date (UTC).
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let millis = ((serial - EXCEL_UNIX_EPOCH_SERIAL) * MILLIS_PER_DAY).round();
    DateTime::<Utc>::from_timestamp_millis(millis as i64).map(|dt| dt.date_naive())
}

/// Claim month label, e.g. "September 2025".
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// First day of the month named by a label produced by [`month_label`].
pub fn parse_month_label(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("1 {}", label.trim()), "%d %B %Y").ok()
}

/// Month label for a stored date string, falling back to the month of `today`.
pub fn claim_month_for(date: &str, today: NaiveDate) -> String {
    month_label(parse_date(date).unwrap_or(today))
}

/// Round half away from zero to two decimal places: `12345.505` -> `12345.51`.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

pub fn format_currency(amount: Decimal) -> String {
    format!("{CURRENCY_SYMBOL} {}", format_amount(amount))
}

/// CBOR field codec for [`Decimal`], stored as its exact decimal text.
pub mod cbor_decimal {
    use rust_decimal::Decimal;
    use std::str::FromStr;

    pub fn encode<Ctx, W: minicbor::encode::Write>(
        value: &Decimal,
        e: &mut minicbor::Encoder<W>,
        _: &mut Ctx,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.str(&value.to_string())?.ok()
    }

    pub fn decode<'b, Ctx>(
        d: &mut minicbor::Decoder<'b>,
        _: &mut Ctx,
    ) -> Result<Decimal, minicbor::decode::Error> {
        let text = d.str()?;
        Decimal::from_str(text).map_err(|_| minicbor::decode::Error::message("invalid decimal amount"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_common_forms() {
        assert_eq!(parse_date("2025-09-01"), Some(date(2025, 9, 1)));
        assert_eq!(parse_date(" 2025/09/01 "), Some(date(2025, 9, 1)));
        assert_eq!(parse_date("09/01/2025"), Some(date(2025, 9, 1)));
        assert_eq!(parse_date("1 September 2025"), Some(date(2025, 9, 1)));
        assert_eq!(parse_date("2025-09-01T18:30:00Z"), Some(date(2025, 9, 1)));
        assert_eq!(parse_date("2025-09-01T18:30:00"), Some(date(2025, 9, 1)));
    }

    #[test]
    fn rejects_blank_and_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2025-02-30"), None);
    }

    #[test]
    fn excel_serials() {
        assert_eq!(excel_serial_to_date(25_569.0), Some(date(1970, 1, 1)));
        assert_eq!(excel_serial_to_date(45_901.0), Some(date(2025, 9, 1)));
        assert_eq!(excel_serial_to_date(f64::NAN), None);
    }

    #[test]
    fn amounts_round_to_cents() {
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
        assert_eq!(format_amount(Decimal::new(9995, 1)), "999.50");
        assert_eq!(format_amount(Decimal::new(4500, 0)), "4500.00");
        assert_eq!(format_amount(Decimal::new(1234567891, 3)), "1234567.89");
        assert_eq!(format_amount(Decimal::new(12345505, 3)), "12345.51");
        assert_eq!(format_amount(Decimal::new(-8500, 0)), "-8500.00");
        assert_eq!(format_currency(Decimal::new(450, 0)), "⃁ 450.00");
    }

    #[test]
    fn month_labels_round_trip() {
        let label = month_label(date(2025, 9, 17));
        assert_eq!(label, "September 2025");
        assert_eq!(parse_month_label(&label), Some(date(2025, 9, 1)));
        assert_eq!(claim_month_for("garbage", date(2026, 1, 5)), "January 2026");
    }
}
