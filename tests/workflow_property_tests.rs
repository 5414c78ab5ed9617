//! Property-based tests for the approval and payment workflow
//!
//! Any approval status may follow any other, so the guards are the only thing
//! standing between a decision and the register. These properties check the
//! guards and the audit trail against arbitrary records and decisions.

use equip_track::{
    error::WorkflowError,
    record::{AdminComment, ApprovalStatus, EquipmentRecord, RateType, TimeStamp},
    workflow::{WorkflowDecision, apply_workflow_decision, derive_workflow_stage},
};
use proptest::prelude::*;
use rust_decimal_macros::dec;

// PROPERTY TEST STRATEGIES

fn status_strategy() -> impl Strategy<Value = ApprovalStatus> {
    (0usize..ApprovalStatus::ALL.len()).prop_map(|i| ApprovalStatus::ALL[i])
}

/// Blank, whitespace-only and real justifications
fn comment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("  \t ".to_string()),
        "[a-z][a-z ]{0,30}",
        " [a-z]{1,10}\n",
    ]
}

fn timestamp_strategy() -> impl Strategy<Value = TimeStamp<chrono::Utc>> {
    (2024i32..=2026, 1u32..=12, 1u32..=28, 0u32..24)
        .prop_map(|(y, m, d, h)| TimeStamp::new_with(y, m, d, h, 0, 0).unwrap())
}

/// Strategy to generate a record in any consistent workflow state
fn record_strategy() -> impl Strategy<Value = EquipmentRecord> {
    (
        status_strategy(),
        any::<bool>(),
        prop::collection::vec(("[a-z ]{1,20}", timestamp_strategy()), 0..4),
    )
        .prop_map(|(status, paid, history)| {
            let mut record = EquipmentRecord::new()
                .set_id("rec_prop")
                .set_description("Relay test set")
                .set_serial_number("SN-1")
                .set_rate(RateType::Daily, dec!(450))
                .set_received("2025-09-01")
                .set_calibration_due("2025-12-07");
            record.approval_status = status;
            record.is_payment_done = paid && status == ApprovalStatus::Approved;
            if record.is_payment_done {
                record.payment_date = Some("2025-10-15".into());
            }
            record.workflow_stage = derive_workflow_stage(status, record.is_payment_done);
            record.admin_comments = history
                .into_iter()
                .map(|(text, at)| AdminComment::new(&text, "Admin", at))
                .collect();
            record
        })
}

fn decision_strategy() -> impl Strategy<Value = WorkflowDecision> {
    (
        status_strategy(),
        comment_strategy(),
        any::<bool>(),
        prop::option::of(Just("2025-11-30".to_string())),
        timestamp_strategy(),
    )
        .prop_map(|(status, comment, paid, payment_date, at)| {
            let decision = WorkflowDecision::new(status)
                .set_comment(&comment)
                .set_decided_at(at);
            if paid {
                decision.mark_paid(payment_date.as_deref())
            } else {
                decision
            }
        })
}

// PROPERTY TESTS
proptest! {
    /// Property: a decision succeeds exactly when both guards pass
    #[test]
    fn prop_guards_decide_outcome(
        record in record_strategy(),
        decision in decision_strategy(),
    ) {
        let changed = decision.new_approval_status != record.approval_status;
        let justified = !decision.comment.trim().is_empty();
        let result = apply_workflow_decision(&record, &decision);

        if changed && !justified {
            prop_assert_eq!(result, Err(WorkflowError::MissingJustification));
        } else if decision.mark_paid && decision.new_approval_status != ApprovalStatus::Approved {
            prop_assert_eq!(
                result,
                Err(WorkflowError::PaymentNotApproved(decision.new_approval_status))
            );
        } else {
            prop_assert!(result.is_ok());
        }
    }

    /// Property: no successful decision leaves a paid record that is not approved
    #[test]
    fn prop_paid_implies_approved(
        record in record_strategy(),
        decision in decision_strategy(),
    ) {
        if let Ok(updated) = apply_workflow_decision(&record, &decision) {
            if updated.is_payment_done {
                prop_assert_eq!(updated.approval_status, ApprovalStatus::Approved);
                prop_assert!(updated.payment_date.is_some());
            } else {
                prop_assert_eq!(updated.payment_date, None);
            }
            prop_assert_eq!(
                updated.workflow_stage,
                derive_workflow_stage(updated.approval_status, updated.is_payment_done)
            );
        }
    }

    /// Property: the audit trail only grows, by one entry per justified decision
    #[test]
    fn prop_comments_are_append_only(
        record in record_strategy(),
        decision in decision_strategy(),
    ) {
        if let Ok(updated) = apply_workflow_decision(&record, &decision) {
            let before = record.admin_comments.len();
            prop_assert_eq!(&updated.admin_comments[..before], &record.admin_comments[..]);

            if decision.comment.trim().is_empty() {
                prop_assert_eq!(updated.admin_comments.len(), before);
            } else {
                prop_assert_eq!(updated.admin_comments.len(), before + 1);
                let entry = &updated.admin_comments[before];
                prop_assert_eq!(&entry.text, &decision.comment);
                prop_assert_eq!(&entry.timestamp, &decision.decided_at);
            }
        }
    }

    /// Property: fields outside the workflow are never touched
    #[test]
    fn prop_other_fields_untouched(
        record in record_strategy(),
        decision in decision_strategy(),
    ) {
        let snapshot = record.clone();
        match apply_workflow_decision(&record, &decision) {
            Ok(updated) => {
                let restored = EquipmentRecord {
                    approval_status: snapshot.approval_status,
                    workflow_stage: snapshot.workflow_stage,
                    is_payment_done: snapshot.is_payment_done,
                    payment_date: snapshot.payment_date.clone(),
                    admin_comments: snapshot.admin_comments.clone(),
                    ..updated
                };
                prop_assert_eq!(restored, snapshot);
            }
            Err(_) => prop_assert_eq!(record, snapshot),
        }
    }

    /// Property: a payment without an explicit date is dated on the decision day
    #[test]
    fn prop_payment_date_defaults_to_decision_day(
        record in record_strategy(),
        at in timestamp_strategy(),
    ) {
        let decision = WorkflowDecision::new(ApprovalStatus::Approved)
            .set_comment("approved for payment")
            .set_decided_at(at.clone())
            .mark_paid(None);
        let updated = apply_workflow_decision(&record, &decision).unwrap();

        let expected = at.to_datetime_utc().date_naive().format("%Y-%m-%d").to_string();
        prop_assert_eq!(updated.payment_date, Some(expected));
    }
}
