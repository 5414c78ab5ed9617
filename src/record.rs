//! Equipment records and the values they carry
use super::error::RecordError;
use super::utils;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use uuid7::uuid7;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OwnershipType {
    #[n(0)]
    Own,
    #[n(1)]
    #[default]
    Rental,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RateType {
    #[n(0)]
    #[default]
    Daily,
    #[n(1)]
    Weekly,
    #[n(2)]
    Monthly,
}

/// Approval label set by an administrator. Codes match the paper register.
#[derive(
    minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
pub enum ApprovalStatus {
    #[n(0)]
    #[default]
    NotApplicable,
    #[n(1)]
    Approved,
    #[n(2)]
    ApprovedWithComments,
    #[n(3)]
    Review,
    #[n(4)]
    Cancelled,
    #[n(5)]
    Rejected,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkflowStage {
    #[n(0)]
    #[default]
    Submitted,
    #[n(1)]
    UnderReview,
    #[n(2)]
    Approved,
    #[n(3)]
    Rejected,
    #[n(4)]
    Paid,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttachmentCategory {
    #[n(0)]
    Invoice,
    #[n(1)]
    Receipt,
    #[n(2)]
    Manual,
    #[n(3)]
    Certificate,
    #[n(4)]
    #[default]
    Other,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl PartialOrd for TimeStamp<Utc> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeStamp<Utc> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .map(Self)
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for TimeStamp<Utc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

/// One entry of the admin audit trail. Entries are only ever appended.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct AdminComment {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub text: String,
    #[n(2)]
    pub author: String,
    #[n(3)]
    pub timestamp: TimeStamp<Utc>,
}

impl AdminComment {
    pub fn new(text: &str, author: &str, timestamp: TimeStamp<Utc>) -> Self {
        Self {
            id: uuid7().to_string(),
            text: text.to_string(),
            author: author.to_string(),
            timestamp,
        }
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub name: String,
    #[n(2)]
    pub data: String, // data url, base64 payload
    #[n(3)]
    pub mime_type: String,
    #[n(4)]
    pub uploaded_at: TimeStamp<Utc>,
    #[n(5)]
    pub category: AttachmentCategory,
}

impl Attachment {
    /// Encode raw file contents into a `data:<mime>;base64,` url.
    pub fn from_bytes(
        name: &str,
        mime_type: &str,
        bytes: &[u8],
        category: AttachmentCategory,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            id: utils::new_uuid_to_bech32("doc_")?,
            name: name.to_string(),
            data: format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes)),
            mime_type: mime_type.to_string(),
            uploaded_at: TimeStamp::new(),
            category,
        })
    }

    /// The base64 payload without any data url prefix.
    pub fn payload(&self) -> &str {
        self.data
            .split_once(',')
            .map(|(_, payload)| payload)
            .unwrap_or(&self.data)
    }

    pub fn decode_bytes(&self) -> anyhow::Result<Vec<u8>> {
        Ok(STANDARD.decode(self.payload())?)
    }
}

/// Vendor rate terms. Only used to populate vendor names.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq)]
pub struct RentalContract {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub company_name: String,
    #[n(2)]
    pub equipment_type: String,
    #[n(3)]
    pub rate_type: RateType,
    #[n(4)]
    #[cbor(with = "crate::utils::cbor_decimal")]
    pub rate_value: Decimal,
    #[n(5)]
    pub remarks: String,
}

impl RentalContract {
    pub fn new(company_name: &str, equipment_type: &str, rate_type: RateType, rate_value: Decimal) -> Self {
        Self {
            id: uuid7().to_string(),
            company_name: company_name.trim().to_string(),
            equipment_type: equipment_type.trim().to_string(),
            rate_type,
            rate_value,
            remarks: String::new(),
        }
    }
}

/// Sorted, deduplicated vendor names from the contract master.
pub fn vendor_names(contracts: &[RentalContract]) -> Vec<String> {
    let mut names: Vec<String> = contracts
        .iter()
        .map(|c| c.company_name.clone())
        .filter(|name| !name.is_empty())
        .collect();
    names.sort();
    names.dedup();
    names
}

// Dates are kept as entered. They are parsed when fields are computed so a
// malformed value never prevents a record from loading.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Default, PartialEq)]
pub struct EquipmentRecord {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub sl_no: u32,
    #[n(2)]
    pub description: String,
    #[n(3)]
    pub serial_number: String,
    #[n(4)]
    pub unit: String,
    #[n(5)]
    pub qty: u32,
    #[n(6)]
    pub internal_company: String, // consuming entity
    #[n(7)]
    pub rental_company: String, // vendor
    #[n(8)]
    pub ownership_type: OwnershipType,
    #[n(9)]
    pub rate_type: RateType,
    #[n(10)]
    #[cbor(with = "crate::utils::cbor_decimal")]
    pub rate_value: Decimal,
    #[n(11)]
    pub kit_received_date: String,
    #[n(12)]
    pub kit_returned_date: Option<String>,
    #[n(13)]
    pub calibration_due_date: String,
    #[n(14)]
    pub invoice_number: String,
    #[n(15)]
    pub claim_month: String,
    #[n(16)]
    pub remarks: String,
    #[n(17)]
    pub approval_status: ApprovalStatus,
    #[n(18)]
    pub workflow_stage: WorkflowStage,
    #[n(19)]
    pub is_payment_done: bool,
    #[n(20)]
    pub payment_date: Option<String>,
    #[n(21)]
    pub admin_comments: Vec<AdminComment>,
    #[n(22)]
    pub attachments: Vec<Attachment>,
}

impl EquipmentRecord {
    /// Construct an empty draft with quantity one, ready for the setters below
    pub fn new() -> Self {
        Self {
            qty: 1,
            unit: "set".into(),
            ..Self::default()
        }
    }
    pub fn set_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }
    pub fn set_sl_no(mut self, sl_no: u32) -> Self {
        self.sl_no = sl_no;
        self
    }
    pub fn set_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
    pub fn set_serial_number(mut self, serial_number: &str) -> Self {
        self.serial_number = serial_number.to_string();
        self
    }
    pub fn set_unit(mut self, unit: &str, qty: u32) -> Self {
        self.unit = unit.to_string();
        self.qty = qty;
        self
    }
    pub fn set_internal_company(mut self, company: &str) -> Self {
        self.internal_company = company.to_string();
        self
    }
    pub fn set_rental_company(mut self, vendor: &str) -> Self {
        self.rental_company = vendor.to_string();
        self
    }
    pub fn set_ownership(mut self, ownership: OwnershipType) -> Self {
        self.ownership_type = ownership;
        self
    }
    pub fn set_rate(mut self, rate_type: RateType, rate_value: Decimal) -> Self {
        self.rate_type = rate_type;
        self.rate_value = rate_value;
        self
    }
    /// Sets the received date and derives the claim month from it.
    pub fn set_received(mut self, date: &str) -> Self {
        self.kit_received_date = date.to_string();
        if let Some(d) = utils::parse_date(date) {
            self.claim_month = utils::month_label(d);
        }
        self
    }
    pub fn set_returned(mut self, date: Option<&str>) -> Self {
        self.kit_returned_date = date.map(str::to_string);
        self
    }
    pub fn set_calibration_due(mut self, date: &str) -> Self {
        self.calibration_due_date = date.to_string();
        self
    }
    pub fn set_invoice_number(mut self, invoice: &str) -> Self {
        self.invoice_number = invoice.to_string();
        self
    }
    pub fn set_claim_month(mut self, month: &str) -> Self {
        self.claim_month = month.to_string();
        self
    }
    pub fn set_remarks(mut self, remarks: &str) -> Self {
        self.remarks = remarks.to_string();
        self
    }

    /// A kit is active until a returned date is recorded.
    pub fn is_active(&self) -> bool {
        self.kit_returned_date
            .as_deref()
            .is_none_or(|d| d.trim().is_empty())
    }

    pub fn is_invoiced(&self) -> bool {
        !self.invoice_number.trim().is_empty()
    }

    /// Checks the fields an operator must supply before a record is stored.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.description.trim().is_empty() {
            return Err(RecordError::MissingField("description"));
        }
        if self.serial_number.trim().is_empty() {
            return Err(RecordError::MissingField("serial number"));
        }
        if utils::parse_date(&self.kit_received_date).is_none() {
            return Err(RecordError::InvalidDate {
                field: "kit received date",
                value: self.kit_received_date.clone(),
            });
        }
        if let Some(returned) = self.kit_returned_date.as_deref() {
            if !returned.trim().is_empty() && utils::parse_date(returned).is_none() {
                return Err(RecordError::InvalidDate {
                    field: "kit returned date",
                    value: returned.to_string(),
                });
            }
        }
        if utils::parse_date(&self.calibration_due_date).is_none() {
            return Err(RecordError::InvalidDate {
                field: "calibration due date",
                value: self.calibration_due_date.clone(),
            });
        }
        if self.rate_value < Decimal::ZERO {
            return Err(RecordError::InvalidRate(self.rate_value));
        }
        Ok(())
    }
}

impl RateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateType::Daily => "Daily",
            RateType::Weekly => "Weekly",
            RateType::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RateType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Daily" => Ok(RateType::Daily),
            "Weekly" => Ok(RateType::Weekly),
            "Monthly" => Ok(RateType::Monthly),
            _ => Err(()),
        }
    }
}

impl fmt::Display for OwnershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OwnershipType::Own => "Own",
            OwnershipType::Rental => "Rental",
        })
    }
}

impl ApprovalStatus {
    pub const ALL: [ApprovalStatus; 6] = [
        ApprovalStatus::NotApplicable,
        ApprovalStatus::Approved,
        ApprovalStatus::ApprovedWithComments,
        ApprovalStatus::Review,
        ApprovalStatus::Cancelled,
        ApprovalStatus::Rejected,
    ];

    /// Register code: `N/A`, `A`, `AWC`, `RE`, `C`, `R`.
    pub fn code(&self) -> &'static str {
        match self {
            ApprovalStatus::NotApplicable => "N/A",
            ApprovalStatus::Approved => "A",
            ApprovalStatus::ApprovedWithComments => "AWC",
            ApprovalStatus::Review => "RE",
            ApprovalStatus::Cancelled => "C",
            ApprovalStatus::Rejected => "R",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApprovalStatus::NotApplicable => "Not Submitted",
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::ApprovedWithComments => "Appr. w/ Comments",
            ApprovalStatus::Review => "Review",
            ApprovalStatus::Cancelled => "Cancelled",
            ApprovalStatus::Rejected => "Rejected",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code.trim())
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkflowStage::Submitted => "Submitted",
            WorkflowStage::UnderReview => "Under Review",
            WorkflowStage::Approved => "Approved",
            WorkflowStage::Rejected => "Rejected",
            WorkflowStage::Paid => "Paid",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EquipmentRecord {
        EquipmentRecord::new()
            .set_description("Freja Relay kit")
            .set_serial_number("24121089/1201538")
            .set_rate(RateType::Daily, Decimal::new(450, 0))
            .set_received("2025-09-01")
            .set_calibration_due("2025-12-07")
    }

    #[test]
    fn record_encoding() {
        let original = sample().set_rate(RateType::Weekly, Decimal::new(45025, 2));

        let encoding = minicbor::to_vec(&original).unwrap();
        let decode: EquipmentRecord = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
        assert_eq!(decode.rate_value.to_string(), "450.25");
    }

    #[test]
    fn received_date_sets_claim_month() {
        assert_eq!(sample().claim_month, "September 2025");
    }

    #[test]
    fn validation_catches_bad_dates() {
        assert!(sample().validate().is_ok());
        assert_eq!(
            sample().set_calibration_due("").validate(),
            Err(RecordError::InvalidDate {
                field: "calibration due date",
                value: String::new()
            })
        );
        assert_eq!(
            sample().set_description("  ").validate(),
            Err(RecordError::MissingField("description"))
        );
        assert_eq!(
            sample().set_rate(RateType::Weekly, Decimal::NEGATIVE_ONE).validate(),
            Err(RecordError::InvalidRate(Decimal::NEGATIVE_ONE))
        );
    }

    #[test]
    fn blank_returned_date_is_active() {
        assert!(sample().is_active());
        assert!(sample().set_returned(Some(" ")).is_active());
        assert!(!sample().set_returned(Some("2025-09-20")).is_active());
    }

    #[test]
    fn approval_codes() {
        for status in ApprovalStatus::ALL {
            assert_eq!(ApprovalStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(ApprovalStatus::from_code("X"), None);
    }

    #[test]
    fn attachment_payload_round_trip() {
        let doc = Attachment::from_bytes(
            "cert.pdf",
            "application/pdf",
            b"%PDF-1.4",
            AttachmentCategory::Certificate,
        )
        .unwrap();

        assert!(doc.data.starts_with("data:application/pdf;base64,"));
        assert_eq!(doc.decode_bytes().unwrap(), b"%PDF-1.4");
    }
}
