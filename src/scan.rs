//! Calibration certificate scanning boundary
//!
//! A scanner reads a certificate attachment and may suggest a new calibration
//! due date. Suggestions are never written on their own: they become a
//! [`ProposedCalibrationUpdate`] which the operator has to confirm.
use super::record::{Attachment, EquipmentRecord};
use super::utils::normalize_date;
use serde::Deserialize;
use std::future::Future;

/// Fields read from a calibration certificate.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationSuggestion {
    pub certificate_number: String,
    pub calibration_date: String,
    pub next_due_date: String,
    pub lab_name: String,
}

/// Anything able to read a certificate. `None` means no suggestion.
pub trait CertificateScanner {
    fn scan(
        &self,
        payload: &str,
        mime_type: &str,
    ) -> impl Future<Output = Option<CalibrationSuggestion>> + Send;
}

/// Scan an attachment, handing the scanner the bare base64 payload.
pub async fn scan_attachment<S: CertificateScanner>(
    scanner: &S,
    attachment: &Attachment,
) -> Option<CalibrationSuggestion> {
    scanner
        .scan(attachment.payload(), &attachment.mime_type)
        .await
}

/// Parse the JSON text returned by a scanning service.
pub fn parse_scan_response(text: &str) -> Option<CalibrationSuggestion> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str(text) {
        Ok(suggestion) => Some(suggestion),
        Err(err) => {
            tracing::warn!(error = %err, "could not parse certificate scan response");
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedCalibrationUpdate {
    pub record_id: String,
    pub current_due_date: String,
    pub proposed_due_date: String, // YYYY-MM-DD
    pub certificate_number: String,
    pub lab_name: String,
}

impl CalibrationSuggestion {
    /// Propose the suggested due date for `record`, if it is a real date.
    pub fn propose_for(&self, record: &EquipmentRecord) -> Option<ProposedCalibrationUpdate> {
        let proposed_due_date = normalize_date(&self.next_due_date)?;
        Some(ProposedCalibrationUpdate {
            record_id: record.id.clone(),
            current_due_date: record.calibration_due_date.clone(),
            proposed_due_date,
            certificate_number: self.certificate_number.clone(),
            lab_name: self.lab_name.clone(),
        })
    }
}

impl ProposedCalibrationUpdate {
    pub fn changes_due_date(&self) -> bool {
        normalize_date(&self.current_due_date).as_deref() != Some(self.proposed_due_date.as_str())
    }

    /// The operator accepted the proposal; return the updated record.
    pub fn confirm(&self, record: &EquipmentRecord) -> EquipmentRecord {
        EquipmentRecord {
            calibration_due_date: self.proposed_due_date.clone(),
            ..record.clone()
        }
    }
}
