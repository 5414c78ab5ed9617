//! Read-only spreadsheet projections of the register
use super::compute::compute_record_fields;
use super::record::EquipmentRecord;
use super::utils::format_amount;
use chrono::NaiveDate;

pub const REGISTER_HEADERS: [&str; 25] = [
    "SL NO",
    "DESCRIPTION",
    "SERIAL NUMBER",
    "UNIT",
    "QTY",
    "Internal Company",
    "Rental Company Name",
    "Kit Rate Type",
    "Rate Value",
    "Kit Received Date",
    "Kit Returned Date",
    "No. of Days Using",
    "Rental Cost (SAR)",
    "Invoice Number",
    "Claim Month",
    "Claim Status",
    "Approval Status",
    "Payment Done",
    "Payment Date",
    "Pending Amount",
    "Calibration Due Date",
    "Calibration Remaining Days",
    "Reminder Status",
    "Remarks",
    "Total Files",
];

pub const SHEETS_HEADERS: [&str; 22] = [
    "SL NO",
    "Equipment Type",
    "Company Name",
    "Description",
    "Serial Number",
    "Unit",
    "Qty",
    "Rental Company",
    "Rate Type",
    "Rate Value",
    "Received Date",
    "Returned Date",
    "Days Using",
    "Rental Cost (SAR)",
    "Invoice No",
    "Claim Month",
    "Claim Status",
    "Pending Amount (SAR)",
    "Calibration Due",
    "Calibration Days",
    "Calibration Status",
    "Remarks",
];

fn returned_or_active(record: &EquipmentRecord) -> String {
    match record.kit_returned_date.as_deref().map(str::trim) {
        Some(date) if !date.is_empty() => date.to_string(),
        _ => "ACTIVE".to_string(),
    }
}

fn register_row(record: &EquipmentRecord, as_of: NaiveDate) -> [String; 25] {
    let comp = compute_record_fields(record, as_of);
    [
        record.sl_no.to_string(),
        record.description.clone(),
        record.serial_number.clone(),
        record.unit.clone(),
        record.qty.to_string(),
        record.internal_company.clone(),
        record.rental_company.clone(),
        record.rate_type.to_string(),
        record.rate_value.to_string(),
        record.kit_received_date.clone(),
        returned_or_active(record),
        comp.days_using.to_string(),
        format_amount(comp.rental_cost),
        record.invoice_number.clone(),
        record.claim_month.clone(),
        comp.pending_claim_status.to_string(),
        record.approval_status.code().to_string(),
        if record.is_payment_done { "YES" } else { "NO" }.to_string(),
        record.payment_date.clone().unwrap_or_default(),
        format_amount(comp.pending_amount),
        record.calibration_due_date.clone(),
        comp.calibration_remaining_days.to_string(),
        comp.reminder_status.badge().to_string(),
        record.remarks.clone(),
        record.attachments.len().to_string(),
    ]
}

fn sheets_row(index: usize, record: &EquipmentRecord, as_of: NaiveDate) -> [String; 22] {
    let comp = compute_record_fields(record, as_of);
    let sl_no = if record.sl_no == 0 { index as u32 + 1 } else { record.sl_no };
    let invoice = if record.is_invoiced() {
        record.invoice_number.clone()
    } else {
        "N/A".to_string()
    };
    [
        sl_no.to_string(),
        record.ownership_type.to_string(),
        record.internal_company.clone(),
        record.description.clone(),
        record.serial_number.clone(),
        record.unit.clone(),
        record.qty.to_string(),
        record.rental_company.clone(),
        record.rate_type.to_string(),
        record.rate_value.to_string(),
        record.kit_received_date.clone(),
        returned_or_active(record),
        comp.days_using.to_string(),
        format_amount(comp.rental_cost),
        invoice,
        record.claim_month.clone(),
        comp.pending_claim_status.to_string(),
        format_amount(comp.pending_amount),
        record.calibration_due_date.clone(),
        comp.calibration_remaining_days.to_string(),
        comp.reminder_status.badge().to_string(),
        record.remarks.clone(),
    ]
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Register export: header plus one line per record, every field quoted.
pub fn to_register_csv(records: &[EquipmentRecord], as_of: NaiveDate) -> String {
    let mut lines = vec![REGISTER_HEADERS.join(",")];
    lines.extend(records.iter().map(|record| {
        register_row(record, as_of)
            .iter()
            .map(|v| csv_field(v))
            .collect::<Vec<_>>()
            .join(",")
    }));
    lines.join("\n")
}

/// Tab separated text for pasting straight into Google Sheets.
///
/// Tabs and newlines inside values become spaces so each record stays on one row.
pub fn to_sheets_tsv(records: &[EquipmentRecord], as_of: NaiveDate) -> String {
    let clean = |v: &str| v.replace(['\t', '\n', '\r'], " ");

    let mut lines = vec![SHEETS_HEADERS.join("\t")];
    lines.extend(records.iter().enumerate().map(|(i, record)| {
        sheets_row(i, record, as_of)
            .iter()
            .map(|v| clean(v))
            .collect::<Vec<_>>()
            .join("\t")
    }));
    lines.join("\n")
}
