//! Persistence for the record and contract collections
//!
//! Each collection is stored whole under one namespaced key, mirroring a
//! browser key-value store. No schema migration happens here.
use super::config::StoreConfig;
use super::error::StoreError;
use super::record::{EquipmentRecord, RentalContract};
use std::sync::{Arc, RwLock};

pub const DEFAULT_NAMESPACE: &str = "equip";

pub trait RecordStore {
    fn load(&self) -> Result<Vec<EquipmentRecord>, StoreError>;
    fn save(&self, records: &[EquipmentRecord]) -> Result<(), StoreError>;
    fn load_contracts(&self) -> Result<Vec<RentalContract>, StoreError>;
    fn save_contracts(&self, contracts: &[RentalContract]) -> Result<(), StoreError>;
}

/// Volatile store, used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<EquipmentRecord>>,
    contracts: RwLock<Vec<RentalContract>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_records(records: Vec<EquipmentRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            ..Self::default()
        }
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> Result<Vec<EquipmentRecord>, StoreError> {
        Ok(self.records.read().map_err(|_| StoreError::Poisoned)?.clone())
    }

    fn save(&self, records: &[EquipmentRecord]) -> Result<(), StoreError> {
        *self.records.write().map_err(|_| StoreError::Poisoned)? = records.to_vec();
        Ok(())
    }

    fn load_contracts(&self) -> Result<Vec<RentalContract>, StoreError> {
        Ok(self.contracts.read().map_err(|_| StoreError::Poisoned)?.clone())
    }

    fn save_contracts(&self, contracts: &[RentalContract]) -> Result<(), StoreError> {
        *self.contracts.write().map_err(|_| StoreError::Poisoned)? = contracts.to_vec();
        Ok(())
    }
}

/// Sled backed store. Values are CBOR encoded arrays.
pub struct SledStore {
    instance: Arc<sled::Db>,
    records_key: String,
    contracts_key: String,
}

impl SledStore {
    pub fn new(instance: Arc<sled::Db>, namespace: &str) -> Self {
        Self {
            instance,
            records_key: format!("{namespace}_records"),
            contracts_key: format!("{namespace}_contracts"),
        }
    }

    /// Open (or create) the database in the configured data directory.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let db = sled::open(&config.data_dir)?;
        Ok(Self::new(Arc::new(db), &config.namespace))
    }

    fn read<T>(&self, key: &str) -> Result<Vec<T>, StoreError>
    where
        T: for<'b> minicbor::Decode<'b, ()>,
    {
        match self.instance.get(key.as_bytes())? {
            Some(bytes) => Ok(minicbor::decode(&bytes)?),
            None => Ok(vec![]),
        }
    }

    fn write<T>(&self, key: &str, values: &[T]) -> Result<(), StoreError>
    where
        T: minicbor::Encode<()>,
    {
        let cbor = minicbor::to_vec(values).map_err(|_| StoreError::Encode(key.to_string()))?;
        self.instance.insert(key.as_bytes(), cbor)?;
        self.instance.flush()?;
        Ok(())
    }
}

impl RecordStore for SledStore {
    fn load(&self) -> Result<Vec<EquipmentRecord>, StoreError> {
        self.read(&self.records_key)
    }

    fn save(&self, records: &[EquipmentRecord]) -> Result<(), StoreError> {
        self.write(&self.records_key, records)?;
        tracing::info!(key = %self.records_key, count = records.len(), "records saved");
        Ok(())
    }

    fn load_contracts(&self) -> Result<Vec<RentalContract>, StoreError> {
        self.read(&self.contracts_key)
    }

    fn save_contracts(&self, contracts: &[RentalContract]) -> Result<(), StoreError> {
        self.write(&self.contracts_key, contracts)?;
        tracing::info!(key = %self.contracts_key, count = contracts.len(), "contracts saved");
        Ok(())
    }
}
