use async_trait::async_trait;
use chefsign_core::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Progress of the Chef agent bootstrap on an instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutoConfigState {
    /// Nothing reported yet.
    #[default]
    Unknown,
    /// Bootstrap started.
    Started,
    /// The node converged.
    Success,
    /// Bootstrap failed.
    Failed,
}

impl AutoConfigState {
    /// Whether the bootstrap has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AutoConfigState::Success | AutoConfigState::Failed)
    }
}

impl Display for AutoConfigState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AutoConfigState::Unknown => "UNKNOWN",
            AutoConfigState::Started => "STARTED",
            AutoConfigState::Success => "SUCCESS",
            AutoConfigState::Failed => "FAILED",
        })
    }
}

/// A provisioned instance managed by Chef.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceRecord {
    /// Instance identifier.
    pub instance_id: String,
    /// Identifier of the cloud resource backing the instance.
    pub resource_id: String,
    /// Tenant owning the instance.
    pub tenant: String,
    /// Region the instance runs in.
    pub region: String,
    /// Address of the instance.
    pub ip: String,
    /// Roles in the node's run list.
    pub roles: BTreeSet<String>,
    /// Bootstrap progress.
    pub state: AutoConfigState,
    /// Bootstrap scripts by file name.
    pub script_files: BTreeMap<String, String>,
}

/// InstanceStore keeps instance records.
#[async_trait]
pub trait InstanceStore: Debug + Send + Sync + 'static {
    /// Load by instance id.
    async fn get(&self, instance_id: &str) -> Result<Option<InstanceRecord>>;
    /// Load by backing resource id.
    async fn get_by_resource_id(&self, resource_id: &str) -> Result<Option<InstanceRecord>>;
    /// Load by address.
    async fn get_by_ip(&self, ip: &str) -> Result<Option<InstanceRecord>>;
    /// Insert or replace a record.
    async fn save(&self, record: InstanceRecord) -> Result<()>;
    /// Remove a record.
    async fn delete(&self, instance_id: &str) -> Result<()>;
    /// Update the bootstrap state, returns false if the instance is unknown.
    async fn set_state(&self, instance_id: &str, state: AutoConfigState) -> Result<bool>;
    /// List records in the given state.
    async fn list_by_state(&self, state: AutoConfigState) -> Result<Vec<InstanceRecord>>;
}

/// In memory [`InstanceStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryInstanceStore {
    records: Arc<RwLock<HashMap<String, InstanceRecord>>>,
}

impl MemoryInstanceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, f: impl Fn(&InstanceRecord) -> bool) -> Option<InstanceRecord> {
        self.records.read().values().find(|r| f(r)).cloned()
    }
}

#[async_trait]
impl InstanceStore for MemoryInstanceStore {
    async fn get(&self, instance_id: &str) -> Result<Option<InstanceRecord>> {
        Ok(self.records.read().get(instance_id).cloned())
    }

    async fn get_by_resource_id(&self, resource_id: &str) -> Result<Option<InstanceRecord>> {
        Ok(self.find(|r| r.resource_id == resource_id))
    }

    async fn get_by_ip(&self, ip: &str) -> Result<Option<InstanceRecord>> {
        Ok(self.find(|r| r.ip == ip))
    }

    async fn save(&self, record: InstanceRecord) -> Result<()> {
        self.records
            .write()
            .insert(record.instance_id.clone(), record);
        Ok(())
    }

    async fn delete(&self, instance_id: &str) -> Result<()> {
        self.records.write().remove(instance_id);
        Ok(())
    }

    async fn set_state(&self, instance_id: &str, state: AutoConfigState) -> Result<bool> {
        match self.records.write().get_mut(instance_id) {
            Some(r) => {
                r.state = state;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_by_state(&self, state: AutoConfigState) -> Result<Vec<InstanceRecord>> {
        let mut records: Vec<_> = self
            .records
            .read()
            .values()
            .filter(|r| r.state == state)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.instance_id.cmp(&b.instance_id));
        Ok(records)
    }
}
