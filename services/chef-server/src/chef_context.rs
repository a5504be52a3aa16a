use crate::ChefVersion;
use chefsign_core::utils::is_blank;
use chefsign_core::{Error, Result};
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// How a context was addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContextType {
    /// Region wide Chef server shared by every tenant in the region.
    Zone,
    /// Chef server dedicated to one tenant.
    Project,
}

/// Resolved connection identity for one logical Chef server.
///
/// A context is only ever built through [`ChefContextBuilder`] and never changes
/// afterwards, share it behind an `Arc`.
#[derive(Clone)]
pub struct ChefContext {
    base_uri: String,
    organization: String,
    organization_prefix: String,
    username: String,
    key: Arc<RsaPrivateKey>,
    version: ChefVersion,
    server_id: String,
    context_type: ContextType,
    roles: Vec<String>,
    regions: Vec<String>,
    data_bag_names: HashMap<String, String>,
}

impl Debug for ChefContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChefContext")
            .field("server_id", &self.server_id)
            .field("base_uri", &self.base_uri)
            .field("organization", &self.organization)
            .field("username", &self.username)
            .field("key", &"<redacted>")
            .field("version", &self.version)
            .field("context_type", &self.context_type)
            .field("roles", &self.roles)
            .field("regions", &self.regions)
            .field("data_bag_names", &self.data_bag_names)
            .finish()
    }
}

impl ChefContext {
    /// Start building a new context.
    pub fn builder() -> ChefContextBuilder {
        ChefContextBuilder::default()
    }

    /// Protocol, host and a trailing `/`.
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Organization name.
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// `organizations/<org>/`, or empty for servers without organizations.
    pub fn organization_prefix(&self) -> &str {
        &self.organization_prefix
    }

    /// Client name used in `X-Ops-Userid`.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Key used to sign requests.
    pub fn key(&self) -> &RsaPrivateKey {
        &self.key
    }

    /// Chef server version tag.
    pub fn version(&self) -> ChefVersion {
        self.version
    }

    /// Identifier of the server, used as cache key.
    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    /// How this context was addressed.
    pub fn context_type(&self) -> ContextType {
        self.context_type
    }

    /// Roles available on this server.
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Whether the role exists on this server.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Regions this server serves.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Map a logical data bag name to the name used on this server.
    ///
    /// Names without a custom mapping are used as-is.
    pub fn data_bag_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.data_bag_names
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }

    /// Prefix a resource path with the organization if the server needs it.
    ///
    /// ```text
    /// v11, "nodes" => "nodes"
    /// v13, "nodes" => "organizations/<org>/nodes"
    /// ```
    pub fn resource_path(&self, resource: &str) -> String {
        let resource = resource.trim_start_matches('/');
        if self.organization_prefix.is_empty() {
            resource.to_string()
        } else {
            format!("{}{}", self.organization_prefix, resource)
        }
    }
}

/// Builder for [`ChefContext`].
///
/// `build` validates the required fields, there is no way to get a half built context.
#[derive(Default)]
pub struct ChefContextBuilder {
    base_uri: Option<String>,
    organization: Option<String>,
    username: Option<String>,
    key: Option<Arc<RsaPrivateKey>>,
    version: ChefVersion,
    server_id: Option<String>,
    context_type: Option<ContextType>,
    roles: Vec<String>,
    regions: Vec<String>,
    data_bag_names: HashMap<String, String>,
}

impl ChefContextBuilder {
    /// Set the base uri, a trailing `/` is added when missing.
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    /// Set the organization.
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Set the client name.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the signing key.
    pub fn with_key(mut self, key: RsaPrivateKey) -> Self {
        self.key = Some(Arc::new(key));
        self
    }

    /// Set the server version.
    pub fn with_version(mut self, version: ChefVersion) -> Self {
        self.version = version;
        self
    }

    /// Set the server identifier.
    pub fn with_server_id(mut self, server_id: impl Into<String>) -> Self {
        self.server_id = Some(server_id.into());
        self
    }

    /// Set the context type.
    pub fn with_context_type(mut self, context_type: ContextType) -> Self {
        self.context_type = Some(context_type);
        self
    }

    /// Set the available roles.
    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    /// Set the regions served.
    pub fn with_regions(mut self, regions: Vec<String>) -> Self {
        self.regions = regions;
        self
    }

    /// Set the custom data bag name mapping.
    pub fn with_data_bag_names(mut self, names: HashMap<String, String>) -> Self {
        self.data_bag_names = names;
        self
    }

    /// Validate and build the context.
    pub fn build(self) -> Result<ChefContext> {
        let server_id = required(self.server_id, "server id")?;
        let base_uri = required(self.base_uri, "base uri")?;
        let username = required(self.username, "username")?;
        let key = self.key.ok_or_else(|| {
            Error::config_invalid(format!(
                "authentication key is required for chef server {server_id}"
            ))
        })?;
        let context_type = self.context_type.unwrap_or(ContextType::Zone);
        let organization = self.organization.unwrap_or_default().trim().to_string();

        let organization_prefix = if self.version.supports_organizations() {
            if organization.is_empty() {
                return Err(Error::config_invalid(format!(
                    "chef server {server_id} runs version {} and requires an organization",
                    self.version
                )));
            }
            format!("organizations/{organization}/")
        } else {
            String::new()
        };

        let base_uri = if base_uri.ends_with('/') {
            base_uri
        } else {
            format!("{base_uri}/")
        };

        Ok(ChefContext {
            base_uri,
            organization,
            organization_prefix,
            username,
            key,
            version: self.version,
            server_id,
            context_type,
            roles: self.roles,
            regions: self.regions,
            data_bag_names: self.data_bag_names,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !is_blank(&v) => Ok(v.trim().to_string()),
        _ => Err(Error::config_invalid(format!("{field} is required"))),
    }
}
