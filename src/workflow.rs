//! Approval and payment workflow applied by administrators
//!
//! The approval status is a label rather than a strict state graph: any status
//! may follow any other. Two guards apply to every decision:
//!
//! * changing the status requires a written justification, and
//! * payment can only be confirmed on a record whose resulting status is
//!   [`ApprovalStatus::Approved`].
//!
//! A record whose status ends up anything other than approved always leaves
//! the workflow unpaid.
use super::error::WorkflowError;
use super::record::{AdminComment, ApprovalStatus, EquipmentRecord, TimeStamp, WorkflowStage};
use chrono::Utc;

pub const DEFAULT_AUTHOR: &str = "Admin";

/// The form an administrator submits against one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowDecision {
    pub new_approval_status: ApprovalStatus,
    pub comment: String,
    pub mark_paid: bool,
    pub payment_date: Option<String>,
    pub author: String,
    pub decided_at: TimeStamp<Utc>,
}

impl WorkflowDecision {
    pub fn new(new_approval_status: ApprovalStatus) -> Self {
        Self {
            new_approval_status,
            comment: String::new(),
            mark_paid: false,
            payment_date: None,
            author: DEFAULT_AUTHOR.to_string(),
            decided_at: TimeStamp::new(),
        }
    }
    /// Start from the record's current status and payment state.
    pub fn from_record(record: &EquipmentRecord) -> Self {
        Self {
            mark_paid: record.is_payment_done,
            payment_date: record.payment_date.clone(),
            ..Self::new(record.approval_status)
        }
    }
    /// Choosing any status other than approved also clears the payment checkbox.
    pub fn set_status(mut self, status: ApprovalStatus) -> Self {
        if status != ApprovalStatus::Approved {
            self.mark_paid = false;
            self.payment_date = None;
        }
        self.new_approval_status = status;
        self
    }
    pub fn set_comment(mut self, comment: &str) -> Self {
        self.comment = comment.to_string();
        self
    }
    pub fn mark_paid(mut self, payment_date: Option<&str>) -> Self {
        self.mark_paid = true;
        self.payment_date = payment_date.map(str::to_string);
        self
    }
    pub fn unmark_paid(mut self) -> Self {
        self.mark_paid = false;
        self.payment_date = None;
        self
    }
    pub fn set_author(mut self, author: &str) -> Self {
        self.author = author.to_string();
        self
    }
    pub fn set_decided_at(mut self, at: TimeStamp<Utc>) -> Self {
        self.decided_at = at;
        self
    }
}

/// Informational stage shown alongside the approval code.
pub fn derive_workflow_stage(status: ApprovalStatus, is_payment_done: bool) -> WorkflowStage {
    match status {
        ApprovalStatus::Review => WorkflowStage::UnderReview,
        ApprovalStatus::Rejected => WorkflowStage::Rejected,
        ApprovalStatus::Approved if is_payment_done => WorkflowStage::Paid,
        ApprovalStatus::Approved => WorkflowStage::Approved,
        _ => WorkflowStage::Submitted,
    }
}

/// Apply `decision` to `record`, returning the updated copy.
///
/// The input record is never modified; on error nothing is applied.
pub fn apply_workflow_decision(
    record: &EquipmentRecord,
    decision: &WorkflowDecision,
) -> Result<EquipmentRecord, WorkflowError> {
    let justified = !decision.comment.trim().is_empty();
    let status_changed = decision.new_approval_status != record.approval_status;

    if status_changed && !justified {
        tracing::warn!(record = %record.id, "status change rejected without justification");
        return Err(WorkflowError::MissingJustification);
    }
    if decision.mark_paid && decision.new_approval_status != ApprovalStatus::Approved {
        tracing::warn!(
            record = %record.id,
            status = %decision.new_approval_status,
            "payment rejected on unapproved record"
        );
        return Err(WorkflowError::PaymentNotApproved(decision.new_approval_status));
    }

    let mut updated = record.clone();
    updated.approval_status = decision.new_approval_status;
    updated.is_payment_done = decision.mark_paid;
    updated.payment_date = if decision.mark_paid {
        Some(decision.payment_date.clone().unwrap_or_else(|| {
            decision
                .decided_at
                .to_datetime_utc()
                .date_naive()
                .format("%Y-%m-%d")
                .to_string()
        }))
    } else {
        None
    };
    updated.workflow_stage = derive_workflow_stage(updated.approval_status, updated.is_payment_done);

    // stored as typed; only the blank check ignores whitespace
    if justified {
        updated.admin_comments.push(AdminComment::new(
            &decision.comment,
            &decision.author,
            decision.decided_at.clone(),
        ));
    }

    tracing::info!(
        record = %updated.id,
        from = %record.approval_status,
        to = %updated.approval_status,
        stage = %updated.workflow_stage,
        paid = updated.is_payment_done,
        "workflow decision applied"
    );

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    // walking one record through review, approval and payment
    #[test]
    fn adhoc_invoice_workflow() {
        let record = EquipmentRecord::new()
            .set_id("rec_1")
            .set_invoice_number("INV-K-442");

        let reviewed = apply_workflow_decision(
            &record,
            &WorkflowDecision::from_record(&record)
                .set_status(ApprovalStatus::Review)
                .set_comment("checking the delivery note"),
        )
        .unwrap();
        assert_eq!(reviewed.workflow_stage, WorkflowStage::UnderReview);

        let approved = apply_workflow_decision(
            &reviewed,
            &WorkflowDecision::from_record(&reviewed)
                .set_status(ApprovalStatus::Approved)
                .set_comment("matches contract"),
        )
        .unwrap();
        assert_eq!(approved.workflow_stage, WorkflowStage::Approved);

        // no status change, so no comment needed
        let paid = apply_workflow_decision(
            &approved,
            &WorkflowDecision::from_record(&approved).mark_paid(Some("2025-10-15")),
        )
        .unwrap();
        assert_eq!(paid.workflow_stage, WorkflowStage::Paid);
        assert_eq!(paid.payment_date.as_deref(), Some("2025-10-15"));
        assert_eq!(paid.admin_comments.len(), 2);

        // reopening review drops the payment
        let reopened = apply_workflow_decision(
            &paid,
            &WorkflowDecision::from_record(&paid)
                .set_status(ApprovalStatus::Review)
                .set_comment("vendor disputed the amount"),
        )
        .unwrap();
        assert!(!reopened.is_payment_done);
        assert_eq!(reopened.payment_date, None);
        assert_eq!(reopened.workflow_stage, WorkflowStage::UnderReview);
    }
}
