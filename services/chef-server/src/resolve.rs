use crate::constants::{BLOB_KEY_SUFFIX, BLOB_PATH_PREFIX};
use crate::{
    parse_private_key, ChefContext, ChefMode, ChefVersion, ConfigurationStore, ContextType,
    ExpiringCache, ServerConfiguration, Settings,
};
use chefsign_core::utils::is_blank;
use chefsign_core::{Context, Error, Result};
use log::{debug, warn};
use std::sync::Arc;

/// ContextResolver maps tenants, regions and server configurations to [`ChefContext`]s.
///
/// Resolved contexts are cached under the server id and, for tenant lookups,
/// under `<tenant>/<region>` too. A server id entry only serves lookups of the
/// same [`ContextType`], so a server shared by a region and a tenant never
/// hands one side the other's credentials. Entries expire after being idle
/// for [`Settings::context_ttl`].
#[derive(Debug)]
pub struct ContextResolver {
    ctx: Context,
    store: Arc<dyn ConfigurationStore>,
    insecure: bool,
    cache: ExpiringCache<String, Arc<ChefContext>>,
}

impl ContextResolver {
    /// Create a resolver reading configurations from `store`.
    pub fn new(ctx: Context, store: Arc<dyn ConfigurationStore>, settings: &Settings) -> Self {
        Self {
            ctx,
            store,
            insecure: settings.insecure,
            cache: ExpiringCache::new(settings.context_capacity, settings.context_ttl),
        }
    }

    /// The configuration store backing this resolver.
    pub fn store(&self) -> &Arc<dyn ConfigurationStore> {
        &self.store
    }

    /// Resolve a region wide server configuration.
    ///
    /// Returns `None` if host, username or key material is missing. Key material
    /// that is present but can't be parsed is an error.
    pub async fn resolve(&self, config: &ServerConfiguration) -> Result<Option<Arc<ChefContext>>> {
        if let Some(ctx) = self.cached(&config.server_id, ContextType::Zone) {
            return Ok(Some(ctx));
        }

        let material = if is_blank(&config.client_key) {
            None
        } else {
            self.ctx.secret_value(&config.client_key).await?
        };

        self.construct(config, material, &config.username, ContextType::Zone)
    }

    /// Resolve the dedicated server of a tenant.
    ///
    /// Returns `None` when the tenant has no mapping in the region, the mapping
    /// doesn't reference a server or the server isn't externally managed.
    pub async fn resolve_project(
        &self,
        tenant: &str,
        region: &str,
    ) -> Result<Option<Arc<ChefContext>>> {
        let key = tenant_key(tenant, region);
        if let Some(ctx) = self.cache.get(&key) {
            if ctx.context_type() == ContextType::Project {
                return Ok(Some(ctx));
            }
        }

        let Some(tenant_config) = self.store.get_tenant(tenant, region).await? else {
            warn!("no chef configuration found for tenant {tenant} in region {region}");
            return Ok(None);
        };
        if is_blank(&tenant_config.server_id) {
            warn!("chef configuration of tenant {tenant} in region {region} has no server");
            return Ok(None);
        }
        if tenant_config.mode != ChefMode::External {
            warn!(
                "chef configuration of tenant {tenant} in region {region} has unsupported mode {:?}",
                tenant_config.mode
            );
            return Ok(None);
        }
        let Some(server) = self.store.get_server(&tenant_config.server_id).await? else {
            warn!(
                "chef server {} of tenant {tenant} is not configured",
                tenant_config.server_id
            );
            return Ok(None);
        };

        let material = match blob_token(&tenant_config.api_key_url) {
            Some(token) => Some(self.ctx.file_read_as_string(&token).await?),
            None => None,
        };
        let username = match &tenant_config.username {
            Some(v) if !is_blank(v) => v.as_str(),
            _ => server.username.as_str(),
        };

        let resolved = self.construct(&server, material, username, ContextType::Project)?;
        if let Some(ctx) = &resolved {
            self.cache.insert(key, ctx.clone());
        }
        Ok(resolved)
    }

    /// Resolve the context a tenant talks to in a region.
    ///
    /// The tenant's dedicated server wins, otherwise the region's shared server is
    /// used. A region without any usable server is a configuration error.
    pub async fn resolve_for(&self, tenant: &str, region: &str) -> Result<Arc<ChefContext>> {
        let key = tenant_key(tenant, region);
        if let Some(ctx) = self.cache.get(&key) {
            debug!("chef context of {key} found in cache");
            return Ok(ctx);
        }

        if let Some(ctx) = self.resolve_project(tenant, region).await? {
            return Ok(ctx);
        }

        let config = self.store.get_region_server(region).await?.ok_or_else(|| {
            Error::config_invalid(format!("no chef server configured for region {region}"))
        })?;
        let ctx = self.resolve(&config).await?.ok_or_else(|| {
            Error::config_invalid(format!(
                "chef server {} of region {region} is not usable",
                config.server_id
            ))
        })?;

        self.cache.insert(key, ctx.clone());
        Ok(ctx)
    }

    /// Look up an already resolved context, never constructs one.
    pub fn resolve_by_server_id(&self, server_id: &str) -> Option<Arc<ChefContext>> {
        self.cache.get(server_id)
    }

    /// Drop every resolved context so the next lookup reads fresh configuration.
    pub fn invalidate_all(&self) {
        debug!("invalidating {} cached chef contexts", self.cache.len());
        self.cache.invalidate_all();
    }

    fn cached(&self, server_id: &str, context_type: ContextType) -> Option<Arc<ChefContext>> {
        let ctx = self
            .cache
            .get(server_id)
            .filter(|ctx| ctx.context_type() == context_type)?;
        debug!("chef context of server {server_id} found in cache");
        Some(ctx)
    }

    fn construct(
        &self,
        config: &ServerConfiguration,
        material: Option<String>,
        username: &str,
        context_type: ContextType,
    ) -> Result<Option<Arc<ChefContext>>> {
        if let Some(ctx) = self.cached(&config.server_id, context_type) {
            return Ok(Some(ctx));
        }

        let server_id = &config.server_id;
        if is_blank(&config.host) {
            warn!("chef server {server_id} has no host");
            return Ok(None);
        }
        if is_blank(username) {
            warn!("chef server {server_id} has no username");
            return Ok(None);
        }
        let Some(material) = material.filter(|v| !is_blank(v)) else {
            warn!("chef server {server_id} has no key material");
            return Ok(None);
        };

        let key = parse_private_key(&material)
            .map_err(|e| e.with_operation(format!("resolve chef server {server_id}")))?;
        let version = ChefVersion::parse_tag(&config.version)?;

        let ctx = ChefContext::builder()
            .with_server_id(server_id)
            .with_base_uri(normalize_base_uri(&config.host, self.insecure))
            .with_organization(&config.organization)
            .with_username(username)
            .with_key(key)
            .with_version(version)
            .with_context_type(context_type)
            .with_roles(config.roles.clone())
            .with_regions(config.regions.clone())
            .with_data_bag_names(config.data_bags.clone())
            .build()?;
        debug!("resolved chef context: {ctx:?}");

        let ctx = Arc::new(ctx);
        match self.cache.get(server_id) {
            // The other side of a shared server keeps its entry.
            Some(existing) if existing.context_type() != context_type => {}
            _ => self.cache.insert(server_id.clone(), ctx.clone()),
        }
        Ok(Some(ctx))
    }
}

fn tenant_key(tenant: &str, region: &str) -> String {
    format!("{tenant}/{region}")
}

/// Turn a configured host into a base uri.
///
/// ```
/// use chefsign_chef_server::normalize_base_uri;
///
/// assert_eq!(normalize_base_uri("Chef.Example.COM", false), "https://chef.example.com/");
/// assert_eq!(normalize_base_uri("https://chef.example.com//", true), "http://chef.example.com/");
/// ```
pub fn normalize_base_uri(host: &str, insecure: bool) -> String {
    let host = host.trim().to_lowercase();
    let host = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host.as_str())
        .trim_end_matches('/');
    let scheme = if insecure { "http" } else { "https" };
    format!("{scheme}://{host}/")
}

/// Extract the blob token from a `/files/{token}/...pem` reference.
///
/// The reference must start with `/files/` and end with `pem`. Tokens only
/// contain lower case letters, digits and `-`. Anything else yields `None`.
pub fn blob_token(url: &str) -> Option<String> {
    let rest = url.strip_prefix(BLOB_PATH_PREFIX)?;
    let (token, name) = rest.split_once('/')?;
    let valid = !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if !valid || !name.ends_with(BLOB_KEY_SUFFIX) {
        return None;
    }
    Some(token.to_string())
}
