//! Equipment register with rental cost accrual, calibration reminders and an
//! admin approval/payment workflow.

pub mod compute;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod record;
pub mod report;
pub mod scan;
pub mod service;
pub mod store;
pub mod utils;
pub mod workflow;

pub use compute::{CalibrationStatus, ClaimStatus, ComputedFields, compute_record_fields};
pub use error::{RecordError, StoreError, WorkflowError};
pub use record::{ApprovalStatus, EquipmentRecord, RateType, WorkflowStage};
pub use workflow::{WorkflowDecision, apply_workflow_decision};
