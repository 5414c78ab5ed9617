//! Derived rental cost, claim and calibration fields for a single record
use super::record::{EquipmentRecord, RateType};
use super::utils::{days_between, parse_date};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;

/// Days counted as one billing week.
pub const DAYS_PER_WEEK: i64 = 7;
/// Monthly rates use a fixed 30-day month.
pub const DAYS_PER_MONTH: i64 = 30;

pub const URGENT_WITHIN_DAYS: i64 = 7;
pub const DUE_SOON_WITHIN_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ClaimStatus {
    #[default]
    Pending,
    Submitted,
    Paid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CalibrationStatus {
    #[default]
    Ok,
    DueSoon,
    Urgent,
    Expired,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComputedFields {
    pub days_using: i64,
    pub rental_cost: Decimal,
    pub pending_claim_status: ClaimStatus,
    pub pending_amount: Decimal,
    pub calibration_remaining_days: i64, // negative once overdue
    pub reminder_status: CalibrationStatus,
}

impl ComputedFields {
    /// Result for a record whose dates cannot be parsed.
    pub fn safe_default() -> Self {
        Self::default()
    }
}

/// Compute the derived fields of `record` as of the calendar day `as_of`.
///
/// Never fails: a record with an unparseable received or calibration due date,
/// or a returned date that is present but unparseable, yields
/// [`ComputedFields::safe_default`].
pub fn compute_record_fields(record: &EquipmentRecord, as_of: NaiveDate) -> ComputedFields {
    let Some(received) = parse_date(&record.kit_received_date) else {
        return ComputedFields::safe_default();
    };
    let Some(calibration_due) = parse_date(&record.calibration_due_date) else {
        return ComputedFields::safe_default();
    };
    let returned = match record.kit_returned_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => match parse_date(value) {
            Some(date) => Some(date),
            None => return ComputedFields::safe_default(),
        },
    };

    let days_using = days_between(received, returned.unwrap_or(as_of)).max(0);
    let rental_cost = rental_cost(record.rate_type, record.rate_value, days_using);

    let pending_claim_status = if record.is_payment_done {
        ClaimStatus::Paid
    } else if record.is_invoiced() {
        ClaimStatus::Submitted
    } else {
        ClaimStatus::Pending
    };
    let pending_amount = if record.is_payment_done { Decimal::ZERO } else { rental_cost };

    let calibration_remaining_days = days_between(as_of, calibration_due);

    ComputedFields {
        days_using,
        rental_cost,
        pending_claim_status,
        pending_amount,
        calibration_remaining_days,
        reminder_status: CalibrationStatus::from_remaining_days(calibration_remaining_days),
    }
}

/// Partial weeks and months bill as whole periods.
pub fn rental_cost(rate_type: RateType, rate_value: Decimal, days_using: i64) -> Decimal {
    let days = days_using.max(0);
    let periods = match rate_type {
        RateType::Daily => days,
        RateType::Weekly => ceil_div(days, DAYS_PER_WEEK),
        RateType::Monthly => ceil_div(days, DAYS_PER_MONTH),
    };
    Decimal::from(periods) * rate_value
}

fn ceil_div(days: i64, period: i64) -> i64 {
    (days + period - 1) / period
}

impl CalibrationStatus {
    pub const ALL: [CalibrationStatus; 4] = [
        CalibrationStatus::Ok,
        CalibrationStatus::DueSoon,
        CalibrationStatus::Urgent,
        CalibrationStatus::Expired,
    ];

    /// First matching threshold wins.
    pub fn from_remaining_days(remaining: i64) -> Self {
        if remaining <= 0 {
            CalibrationStatus::Expired
        } else if remaining <= URGENT_WITHIN_DAYS {
            CalibrationStatus::Urgent
        } else if remaining <= DUE_SOON_WITHIN_DAYS {
            CalibrationStatus::DueSoon
        } else {
            CalibrationStatus::Ok
        }
    }

    /// Badge shown in the register and exports.
    pub fn badge(&self) -> &'static str {
        match self {
            CalibrationStatus::Ok => "✅ OK",
            CalibrationStatus::DueSoon => "🔔 DUE SOON",
            CalibrationStatus::Urgent => "⚠️ URGENT",
            CalibrationStatus::Expired => "❌ EXPIRED",
        }
    }
}

impl fmt::Display for CalibrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CalibrationStatus::Ok => "OK",
            CalibrationStatus::DueSoon => "DUE_SOON",
            CalibrationStatus::Urgent => "URGENT",
            CalibrationStatus::Expired => "EXPIRED",
        })
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClaimStatus::Pending => "PENDING",
            ClaimStatus::Submitted => "SUBMITTED",
            ClaimStatus::Paid => "PAID",
        })
    }
}
