//! Dashboard and summary aggregates over a record collection
//!
//! Every reducer is pure, independent of input order and returns a zeroed or
//! empty value for an empty collection.
use super::compute::{CalibrationStatus, ComputedFields, compute_record_fields};
use super::record::{ApprovalStatus, Attachment, AttachmentCategory, EquipmentRecord};
use super::utils::parse_month_label;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiTotals {
    pub total_kits: usize,
    pub kits_in_use: usize,
    pub returned_kits: usize,
    pub pending_claims: usize, // no invoice number yet
    pub total_pending_amount: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalibrationBuckets {
    pub ok: usize,
    pub due_soon: usize,
    pub urgent: usize,
    pub expired: usize,
}

impl CalibrationBuckets {
    pub fn count(&self, status: CalibrationStatus) -> usize {
        match status {
            CalibrationStatus::Ok => self.ok,
            CalibrationStatus::DueSoon => self.due_soon,
            CalibrationStatus::Urgent => self.urgent,
            CalibrationStatus::Expired => self.expired,
        }
    }

    fn add(&mut self, status: CalibrationStatus) {
        match status {
            CalibrationStatus::Ok => self.ok += 1,
            CalibrationStatus::DueSoon => self.due_soon += 1,
            CalibrationStatus::Urgent => self.urgent += 1,
            CalibrationStatus::Expired => self.expired += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.ok + self.due_soon + self.urgent + self.expired
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySummary {
    pub month: String,
    pub total_cost: Decimal,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
}

impl MonthlySummary {
    pub fn is_cleared(&self) -> bool {
        self.pending_amount.is_zero()
    }
}

pub fn kpi_totals(records: &[EquipmentRecord], as_of: NaiveDate) -> KpiTotals {
    records.iter().fold(KpiTotals::default(), |mut kpi, record| {
        kpi.total_kits += 1;
        if record.is_active() {
            kpi.kits_in_use += 1;
        } else {
            kpi.returned_kits += 1;
        }
        if !record.is_invoiced() {
            kpi.pending_claims += 1;
        }
        kpi.total_pending_amount += compute_record_fields(record, as_of).pending_amount;
        kpi
    })
}

pub fn calibration_buckets(records: &[EquipmentRecord], as_of: NaiveDate) -> CalibrationBuckets {
    records.iter().fold(CalibrationBuckets::default(), |mut buckets, record| {
        buckets.add(compute_record_fields(record, as_of).reminder_status);
        buckets
    })
}

fn count_by<'a>(
    records: &'a [EquipmentRecord],
    key: impl Fn(&'a EquipmentRecord) -> &'a str,
) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(key(record).to_string()).or_insert(0) += 1;
    }
    counts
}

/// Kits per internal (consuming) company.
pub fn company_distribution(records: &[EquipmentRecord]) -> BTreeMap<String, usize> {
    count_by(records, |r| r.internal_company.as_str())
}

/// Kits per rental vendor.
pub fn vendor_distribution(records: &[EquipmentRecord]) -> BTreeMap<String, usize> {
    count_by(records, |r| r.rental_company.as_str())
}

pub fn approval_distribution(records: &[EquipmentRecord]) -> BTreeMap<ApprovalStatus, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.approval_status).or_insert(0) += 1;
    }
    counts
}

/// Cost, paid and pending totals grouped by claim month.
///
/// Months are ordered chronologically; labels that are not of the form
/// "September 2025" come first, in lexical order.
pub fn monthly_summary(records: &[EquipmentRecord], as_of: NaiveDate) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<(Option<NaiveDate>, &str), MonthlySummary> = BTreeMap::new();

    for record in records {
        let computed = compute_record_fields(record, as_of);
        let key = (parse_month_label(&record.claim_month), record.claim_month.as_str());
        let summary = months.entry(key).or_insert_with(|| MonthlySummary {
            month: record.claim_month.clone(),
            ..MonthlySummary::default()
        });
        summary.total_cost += computed.rental_cost;
        summary.pending_amount += computed.pending_amount;
        summary.paid_amount += computed.rental_cost - computed.pending_amount;
    }

    months.into_values().collect()
}

/// Records needing calibration attention, most overdue first.
pub fn calibration_watchlist(
    records: &[EquipmentRecord],
    as_of: NaiveDate,
) -> Vec<(&EquipmentRecord, ComputedFields)> {
    let mut watch: Vec<_> = records
        .iter()
        .map(|r| (r, compute_record_fields(r, as_of)))
        .filter(|(_, c)| c.reminder_status != CalibrationStatus::Ok)
        .collect();
    watch.sort_by(|a, b| {
        a.1.calibration_remaining_days
            .cmp(&b.1.calibration_remaining_days)
            .then_with(|| a.0.sl_no.cmp(&b.0.sl_no))
    });
    watch
}

/// The first `limit` kits still deployed, in register order.
pub fn active_kits(records: &[EquipmentRecord], limit: usize) -> Vec<&EquipmentRecord> {
    records.iter().filter(|r| r.is_active()).take(limit).collect()
}

/// Case-insensitive match on description, serial number, vendor or company.
pub fn search<'a>(records: &'a [EquipmentRecord], term: &str) -> Vec<&'a EquipmentRecord> {
    let term = term.trim().to_lowercase();
    records
        .iter()
        .filter(|r| {
            [
                &r.description,
                &r.serial_number,
                &r.rental_company,
                &r.internal_company,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
        })
        .collect()
}

/// Every attachment in the register next to the record it belongs to.
///
/// Newest upload first. `category` of `None` keeps all categories; `term`
/// matches the document name, equipment description or serial number,
/// ignoring case.
pub fn document_library<'a>(
    records: &'a [EquipmentRecord],
    category: Option<AttachmentCategory>,
    term: &str,
) -> Vec<(&'a Attachment, &'a EquipmentRecord)> {
    let term = term.trim().to_lowercase();
    let mut docs: Vec<_> = records
        .iter()
        .flat_map(|r| r.attachments.iter().map(move |a| (a, r)))
        .filter(|(a, _)| category.is_none_or(|c| a.category == c))
        .filter(|(a, r)| {
            [&a.name, &r.description, &r.serial_number]
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
        })
        .collect();
    docs.sort_by(|a, b| b.0.uploaded_at.cmp(&a.0.uploaded_at));
    docs
}

/// Everything the dashboard and summary pages show, computed in one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioReport {
    pub as_of: NaiveDate,
    pub kpis: KpiTotals,
    pub calibration: CalibrationBuckets,
    pub companies: BTreeMap<String, usize>,
    pub vendors: BTreeMap<String, usize>,
    pub approvals: BTreeMap<ApprovalStatus, usize>,
    pub monthly: Vec<MonthlySummary>,
}

impl PortfolioReport {
    pub fn build(records: &[EquipmentRecord], as_of: NaiveDate) -> Self {
        Self {
            as_of,
            kpis: kpi_totals(records, as_of),
            calibration: calibration_buckets(records, as_of),
            companies: company_distribution(records),
            vendors: vendor_distribution(records),
            approvals: approval_distribution(records),
            monthly: monthly_summary(records, as_of),
        }
    }
}
