use super::record::ApprovalStatus;
use rust_decimal::Decimal;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RecordError {
    #[error("Record is missing a required field: {0}")]
    MissingField(&'static str),
    #[error("{field} is not a valid calendar date: {value:?}")]
    InvalidDate { field: &'static str, value: String },
    #[error("Rate value must not be negative, got {0}")]
    InvalidRate(Decimal),
    #[error("No record with id {0}")]
    NotFound(String),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("A comment is required to change the approval status")]
    MissingJustification,
    #[error("Payment can only be confirmed for approved records, status is {0}")]
    PaymentNotApproved(ApprovalStatus),
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("failed to encode {0} as cbor")]
    Encode(String),
    #[error("failed to decode stored data: {0}")]
    Decode(#[from] minicbor::decode::Error),
    #[error("store lock was poisoned")]
    Poisoned,
}
