use async_trait::async_trait;
use chefsign_core::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Stored configuration of one Chef server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfiguration {
    /// Unique identifier of the server.
    pub server_id: String,
    /// Host name, with or without scheme.
    pub host: String,
    /// Organization on the server.
    pub organization: String,
    /// Client name used to sign requests.
    pub username: String,
    /// Name of the secret holding the client's private key.
    pub client_key: String,
    /// Version tag, "11", "12" or "13". Blank means 12.
    pub version: String,
    /// Roles available on the server.
    pub roles: Vec<String>,
    /// Regions the server serves.
    pub regions: Vec<String>,
    /// Logical to actual data bag names.
    pub data_bags: HashMap<String, String>,
}

/// How a tenant's Chef server is managed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChefMode {
    /// The tenant brings its own Chef server.
    External,
    /// The tenant uses the region's shared server.
    #[default]
    Internal,
    /// Anything this crate does not know about.
    #[serde(other)]
    Unknown,
}

/// Maps a tenant in a region to a dedicated Chef server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantConfiguration {
    /// Tenant identifier.
    pub tenant: String,
    /// Region the mapping applies to.
    pub region: String,
    /// Identifier of the tenant's server configuration.
    pub server_id: String,
    /// Management mode, only [`ChefMode::External`] gets a project context.
    pub mode: ChefMode,
    /// Blob service url of the tenant's api key: `.../files/{token}/<name>.pem`.
    pub api_key_url: String,
    /// Client name overriding the server configuration's one.
    pub username: Option<String>,
}

/// ConfigurationStore keeps server configurations and tenant mappings.
#[async_trait]
pub trait ConfigurationStore: Debug + Send + Sync + 'static {
    /// Load one server configuration.
    async fn get_server(&self, server_id: &str) -> Result<Option<ServerConfiguration>>;
    /// Insert or replace a server configuration.
    async fn save_server(&self, config: ServerConfiguration) -> Result<()>;
    /// Remove a server configuration.
    async fn delete_server(&self, server_id: &str) -> Result<()>;
    /// List every server configuration.
    async fn list_servers(&self) -> Result<Vec<ServerConfiguration>>;

    /// Load a tenant mapping.
    async fn get_tenant(&self, tenant: &str, region: &str)
        -> Result<Option<TenantConfiguration>>;
    /// Insert or replace a tenant mapping.
    async fn save_tenant(&self, config: TenantConfiguration) -> Result<()>;
    /// Remove a tenant mapping.
    async fn delete_tenant(&self, tenant: &str, region: &str) -> Result<()>;

    /// Load the shared server configuration of a region.
    async fn get_region_server(&self, region: &str) -> Result<Option<ServerConfiguration>>;
    /// Make `server_id` the shared server of `region`.
    async fn bind_region(&self, region: &str, server_id: &str) -> Result<()>;
    /// Remove the shared server of `region`.
    async fn unbind_region(&self, region: &str) -> Result<()>;
}

#[derive(Debug, Default)]
struct Tables {
    servers: HashMap<String, ServerConfiguration>,
    tenants: HashMap<(String, String), TenantConfiguration>,
    regions: HashMap<String, String>,
}

/// In memory [`ConfigurationStore`].
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigurationStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryConfigurationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigurationStore for MemoryConfigurationStore {
    async fn get_server(&self, server_id: &str) -> Result<Option<ServerConfiguration>> {
        Ok(self.tables.read().servers.get(server_id).cloned())
    }

    async fn save_server(&self, config: ServerConfiguration) -> Result<()> {
        self.tables
            .write()
            .servers
            .insert(config.server_id.clone(), config);
        Ok(())
    }

    async fn delete_server(&self, server_id: &str) -> Result<()> {
        self.tables.write().servers.remove(server_id);
        Ok(())
    }

    async fn list_servers(&self) -> Result<Vec<ServerConfiguration>> {
        let mut servers: Vec<_> = self.tables.read().servers.values().cloned().collect();
        servers.sort_by(|a, b| a.server_id.cmp(&b.server_id));
        Ok(servers)
    }

    async fn get_tenant(
        &self,
        tenant: &str,
        region: &str,
    ) -> Result<Option<TenantConfiguration>> {
        Ok(self
            .tables
            .read()
            .tenants
            .get(&(tenant.to_string(), region.to_string()))
            .cloned())
    }

    async fn save_tenant(&self, config: TenantConfiguration) -> Result<()> {
        self.tables
            .write()
            .tenants
            .insert((config.tenant.clone(), config.region.clone()), config);
        Ok(())
    }

    async fn delete_tenant(&self, tenant: &str, region: &str) -> Result<()> {
        self.tables
            .write()
            .tenants
            .remove(&(tenant.to_string(), region.to_string()));
        Ok(())
    }

    async fn get_region_server(&self, region: &str) -> Result<Option<ServerConfiguration>> {
        let tables = self.tables.read();
        Ok(tables
            .regions
            .get(region)
            .and_then(|id| tables.servers.get(id))
            .cloned())
    }

    async fn bind_region(&self, region: &str, server_id: &str) -> Result<()> {
        self.tables
            .write()
            .regions
            .insert(region.to_string(), server_id.to_string());
        Ok(())
    }

    async fn unbind_region(&self, region: &str) -> Result<()> {
        self.tables.write().regions.remove(region);
        Ok(())
    }
}
