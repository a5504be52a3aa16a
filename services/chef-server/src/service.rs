use crate::{
    AdminAttributes, AutoConfigState, ChefClient, ChefCommand, ChefResponse, ClientRegistry,
    ConfigurationStore, ContextResolver, InstanceStore, Settings,
};
use chefsign_core::{Context, Error, Result, TransportFactory};
use log::{info, warn};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// ChefService is the entry point for running commands against Chef servers.
///
/// It owns one [`ContextResolver`] and one [`ClientRegistry`], create it once at
/// startup and share it.
///
/// ```no_run
/// use chefsign_chef_server::{ChefCommand, ChefService};
/// use serde_json::Value;
///
/// # async fn example(service: ChefService) -> chefsign_core::Result<()> {
/// let cmd: ChefCommand<Value> = ChefCommand::get("nodes/web-1");
/// let resp = service.execute("acme", "eu-1", &cmd).await?;
/// if !resp.is_error() {
///     println!("{:?}", resp.result);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ChefService {
    resolver: ContextResolver,
    registry: ClientRegistry,
    instances: Arc<dyn InstanceStore>,
}

impl ChefService {
    /// Wire a service from its collaborators.
    pub fn new(
        ctx: Context,
        configs: Arc<dyn ConfigurationStore>,
        instances: Arc<dyn InstanceStore>,
        factory: Arc<dyn TransportFactory>,
        settings: &Settings,
    ) -> Result<Self> {
        Ok(Self {
            resolver: ContextResolver::new(ctx, configs, settings),
            registry: ClientRegistry::new(factory, settings)?,
            instances,
        })
    }

    /// The context resolver.
    pub fn resolver(&self) -> &ContextResolver {
        &self.resolver
    }

    /// The client registry.
    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// The instance store.
    pub fn instances(&self) -> &Arc<dyn InstanceStore> {
        &self.instances
    }

    /// Get the client a tenant uses in a region.
    pub async fn client(&self, tenant: &str, region: &str) -> Result<ChefClient> {
        let ctx = self.resolver.resolve_for(tenant, region).await?;
        self.registry.get_instance(&ctx).await
    }

    /// Run a command on the server of a tenant in a region.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        tenant: &str,
        region: &str,
        cmd: &ChefCommand<T>,
    ) -> Result<ChefResponse<T>> {
        let client = self.client(tenant, region).await?;
        run(&client, cmd).await
    }

    /// Run a command on an already resolved server.
    pub async fn execute_on_server<T: DeserializeOwned>(
        &self,
        server_id: &str,
        cmd: &ChefCommand<T>,
    ) -> Result<ChefResponse<T>> {
        let ctx = self.resolver.resolve_by_server_id(server_id).ok_or_else(|| {
            Error::config_invalid(format!("chef server {server_id} has not been resolved"))
                .with_operation(cmd.describe())
        })?;
        let client = self.registry.get_instance(&ctx).await?;
        run(&client, cmd).await
    }

    /// Run a command on the server managing an instance.
    pub async fn execute_for_instance<T: DeserializeOwned>(
        &self,
        instance_id: &str,
        cmd: &ChefCommand<T>,
    ) -> Result<ChefResponse<T>> {
        let record = self.instances.get(instance_id).await?.ok_or_else(|| {
            Error::request_invalid(format!("instance {instance_id} is not known"))
                .with_operation(cmd.describe())
        })?;
        self.execute(&record.tenant, &record.region, cmd).await
    }

    /// Run a command on a fresh, uncached client with custom timeouts.
    pub async fn admin_execute<T: DeserializeOwned>(
        &self,
        tenant: &str,
        region: &str,
        attrs: AdminAttributes,
        cmd: &ChefCommand<T>,
    ) -> Result<ChefResponse<T>> {
        let ctx = self.resolver.resolve_for(tenant, region).await?;
        let client = self.registry.get_admin_instance(&ctx, attrs)?;
        run(&client, cmd).await
    }

    /// Record the bootstrap progress of an instance.
    ///
    /// Returns false if the instance is unknown.
    pub async fn set_instance_state(
        &self,
        instance_id: &str,
        state: AutoConfigState,
    ) -> Result<bool> {
        let updated = self.instances.set_state(instance_id, state).await?;
        if updated {
            info!("instance {instance_id} auto configuration is {state}");
        } else {
            warn!("instance {instance_id} not found while setting state {state}");
        }
        Ok(updated)
    }

    /// Forget every resolved context and client.
    ///
    /// Call after roles or configurations changed out of band.
    pub fn refresh(&self) {
        self.resolver.invalidate_all();
        self.registry.invalidate_all();
    }
}

async fn run<T: DeserializeOwned>(
    client: &ChefClient,
    cmd: &ChefCommand<T>,
) -> Result<ChefResponse<T>> {
    let resp = client.execute(cmd).await?;
    if resp.is_error() {
        warn!(
            "{} on chef server {} failed: {}",
            cmd.describe(),
            client.context().server_id(),
            resp.description
        );
    }
    Ok(resp)
}
