//! Service layer API for register operations
//!
//! The service owns the current snapshot of the register. Every mutation
//! builds a new collection, saves it, and only then swaps it in, so a
//! snapshot handed out by [`RecordService::records`] never changes.
use super::config::TrackerConfig;
use super::error::RecordError;
use super::import::{self, Cell};
use super::record::{
    ApprovalStatus, Attachment, EquipmentRecord, OwnershipType, RentalContract, WorkflowStage,
};
use super::report::PortfolioReport;
use super::scan::ProposedCalibrationUpdate;
use super::store::RecordStore;
use super::utils;
use super::workflow::{WorkflowDecision, apply_workflow_decision};
use chrono::NaiveDate;
use std::sync::Arc;

type Subscriber = Box<dyn Fn(&[EquipmentRecord]) + Send + Sync>;

pub struct RecordService<S: RecordStore> {
    store: S,
    config: TrackerConfig,
    records: Arc<Vec<EquipmentRecord>>,
    contracts: Arc<Vec<RentalContract>>,
    subscribers: Vec<Subscriber>,
}

impl<S: RecordStore> RecordService<S> {
    /// Load the register and contract master from `store`
    pub fn open(store: S, config: TrackerConfig) -> anyhow::Result<Self> {
        let records = store.load()?;
        let contracts = store.load_contracts()?;
        tracing::info!(records = records.len(), contracts = contracts.len(), "register loaded");

        Ok(Self {
            store,
            config,
            records: Arc::new(records),
            contracts: Arc::new(contracts),
            subscribers: vec![],
        })
    }

    pub fn records(&self) -> Arc<Vec<EquipmentRecord>> {
        Arc::clone(&self.records)
    }

    pub fn contracts(&self) -> Arc<Vec<RentalContract>> {
        Arc::clone(&self.contracts)
    }

    pub fn get(&self, id: &str) -> Option<&EquipmentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Called with the new register after every successful save.
    pub fn subscribe(&mut self, subscriber: impl Fn(&[EquipmentRecord]) + Send + Sync + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn report(&self, as_of: NaiveDate) -> PortfolioReport {
        PortfolioReport::build(&self.records, as_of)
    }

    /// Decision pre-filled from the record, signed by the configured author.
    pub fn decision_for(&self, id: &str) -> anyhow::Result<WorkflowDecision> {
        let record = self.find(id)?;
        Ok(WorkflowDecision::from_record(record).set_author(&self.config.workflow.default_author))
    }

    fn find(&self, id: &str) -> anyhow::Result<&EquipmentRecord> {
        self.get(id)
            .ok_or_else(|| RecordError::NotFound(id.to_string()).into())
    }

    fn commit(&mut self, records: Vec<EquipmentRecord>) -> anyhow::Result<()> {
        self.store.save(&records)?;
        self.records = Arc::new(records);
        for subscriber in &self.subscribers {
            subscriber(&self.records);
        }
        Ok(())
    }

    fn replace(&mut self, updated: EquipmentRecord) -> anyhow::Result<EquipmentRecord> {
        let records: Vec<EquipmentRecord> = self
            .records
            .iter()
            .map(|r| if r.id == updated.id { updated.clone() } else { r.clone() })
            .collect();
        self.commit(records)?;
        Ok(updated)
    }

    /// Register a new record. Identity and workflow fields are assigned here.
    pub fn add_record(&mut self, draft: EquipmentRecord) -> anyhow::Result<EquipmentRecord> {
        draft.validate()?;

        let mut record = draft;
        record.id = utils::new_uuid_to_bech32("rec_")?;
        record.sl_no = self.records.len() as u32 + 1;
        record.approval_status = ApprovalStatus::NotApplicable;
        record.workflow_stage = WorkflowStage::Submitted;
        record.is_payment_done = false;
        record.payment_date = None;
        record.admin_comments.clear();
        if record.claim_month.trim().is_empty() {
            record.claim_month = utils::claim_month_for(&record.kit_received_date, utils::today());
        }

        let mut records = self.records.as_ref().clone();
        records.push(record.clone());
        self.commit(records)?;

        tracing::info!(record = %record.id, sl_no = record.sl_no, "record added");
        Ok(record)
    }

    /// Replace the stored record with the same id.
    ///
    /// Workflow fields and the audit trail are kept from the stored copy; they
    /// only change through [`RecordService::apply_decision`].
    pub fn update_record(&mut self, edited: EquipmentRecord) -> anyhow::Result<EquipmentRecord> {
        edited.validate()?;
        let current = self.find(&edited.id)?;

        let updated = EquipmentRecord {
            sl_no: current.sl_no,
            approval_status: current.approval_status,
            workflow_stage: current.workflow_stage,
            is_payment_done: current.is_payment_done,
            payment_date: current.payment_date.clone(),
            admin_comments: current.admin_comments.clone(),
            ..edited
        };
        self.replace(updated)
    }

    pub fn delete_record(&mut self, id: &str) -> anyhow::Result<()> {
        self.find(id)?;
        let records = self.records.iter().filter(|r| r.id != id).cloned().collect();
        self.commit(records)?;
        tracing::info!(record = %id, "record deleted");
        Ok(())
    }

    /// Run an admin decision through the workflow and persist the result.
    pub fn apply_decision(
        &mut self,
        id: &str,
        decision: &WorkflowDecision,
    ) -> anyhow::Result<EquipmentRecord> {
        let updated = apply_workflow_decision(self.find(id)?, decision)?;
        self.replace(updated)
    }

    pub fn attach(&mut self, id: &str, attachment: Attachment) -> anyhow::Result<EquipmentRecord> {
        let mut updated = self.find(id)?.clone();
        updated.attachments.push(attachment);
        self.replace(updated)
    }

    /// Write a confirmed calibration proposal into its record.
    pub fn confirm_calibration(
        &mut self,
        update: &ProposedCalibrationUpdate,
    ) -> anyhow::Result<EquipmentRecord> {
        let updated = update.confirm(self.find(&update.record_id)?);
        tracing::info!(
            record = %update.record_id,
            due = %update.proposed_due_date,
            certificate = %update.certificate_number,
            "calibration due date confirmed"
        );
        self.replace(updated)
    }

    /// Append spreadsheet rows to the register, numbering them after the
    /// existing records.
    pub fn import_rows(
        &mut self,
        rows: &[Vec<Cell>],
        ownership: OwnershipType,
    ) -> anyhow::Result<Vec<EquipmentRecord>> {
        let offset = self.records.len() as u32;
        let imported: Vec<EquipmentRecord> =
            import::parse_rows(rows, ownership, &self.config.import, utils::today())?
                .into_iter()
                .map(|record| EquipmentRecord {
                    sl_no: offset + record.sl_no,
                    ..record
                })
                .collect();

        let mut records = self.records.as_ref().clone();
        records.extend(imported.iter().cloned());
        self.commit(records)?;
        Ok(imported)
    }

    pub fn add_contract(&mut self, contract: RentalContract) -> anyhow::Result<()> {
        let mut contracts = self.contracts.as_ref().clone();
        contracts.push(contract);
        self.store.save_contracts(&contracts)?;
        self.contracts = Arc::new(contracts);
        Ok(())
    }

    pub fn delete_contract(&mut self, id: &str) -> anyhow::Result<()> {
        let contracts: Vec<RentalContract> =
            self.contracts.iter().filter(|c| c.id != id).cloned().collect();
        self.store.save_contracts(&contracts)?;
        self.contracts = Arc::new(contracts);
        Ok(())
    }

    pub fn vendor_names(&self) -> Vec<String> {
        super::record::vendor_names(&self.contracts)
    }
}
