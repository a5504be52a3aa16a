use crate::{ChefClient, ChefContext, ContextType, ExpiringCache, Settings};
use chefsign_core::{HttpSend, Result, TransportFactory, TransportOptions};
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Timeouts for a one-off admin client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminAttributes {
    /// Time allowed to establish the connection.
    pub connect_timeout: Duration,
    /// Time allowed for the whole request.
    pub read_timeout: Duration,
}

impl Default for AdminAttributes {
    fn default() -> Self {
        let opts = TransportOptions::default();
        Self {
            connect_timeout: opts.connect_timeout,
            read_timeout: opts.read_timeout,
        }
    }
}

/// ClientRegistry hands out [`ChefClient`]s bound to shared transports.
///
/// Zone clients share one transport built up front. Project clients share a
/// second transport built on first use, exactly once. Both kinds are cached by
/// server id with their own size and expiry.
#[derive(Debug)]
pub struct ClientRegistry {
    factory: Arc<dyn TransportFactory>,
    options: TransportOptions,
    zone_transport: Arc<dyn HttpSend>,
    project_transport: OnceCell<Arc<dyn HttpSend>>,
    zone_clients: ExpiringCache<String, ChefClient>,
    project_clients: ExpiringCache<String, ChefClient>,
}

impl ClientRegistry {
    /// Create a registry and build the shared zone transport.
    pub fn new(factory: Arc<dyn TransportFactory>, settings: &Settings) -> Result<Self> {
        let options = settings.transport_options();
        debug!("building zone transport with {options:?}");
        let zone_transport = factory.build(&options)?;

        Ok(Self {
            factory,
            options,
            zone_transport,
            project_transport: OnceCell::new(),
            zone_clients: ExpiringCache::new(
                settings.zone_client_capacity,
                settings.zone_client_ttl,
            ),
            project_clients: ExpiringCache::new(
                settings.project_client_capacity,
                settings.project_client_ttl,
            ),
        })
    }

    /// Get the client of a context, creating it on first use.
    pub async fn get_instance(&self, ctx: &Arc<ChefContext>) -> Result<ChefClient> {
        let cache = self.cache(ctx.context_type());
        if let Some(client) = cache.get(ctx.server_id()) {
            // A re-resolved context replaces the client bound to the old one.
            if Arc::ptr_eq(client.context(), ctx) {
                return Ok(client);
            }
        }

        let transport = match ctx.context_type() {
            ContextType::Zone => self.zone_transport.clone(),
            ContextType::Project => self.project_transport().await?,
        };
        debug!(
            "creating {:?} client for chef server {}",
            ctx.context_type(),
            ctx.server_id()
        );
        let client = ChefClient::new(ctx.clone(), transport);
        cache.insert(ctx.server_id().to_string(), client.clone());
        Ok(client)
    }

    /// Build a client on a fresh transport with custom timeouts.
    ///
    /// The client is never cached and its transport is never shared.
    pub fn get_admin_instance(
        &self,
        ctx: &Arc<ChefContext>,
        attrs: AdminAttributes,
    ) -> Result<ChefClient> {
        let options = TransportOptions {
            connect_timeout: attrs.connect_timeout,
            read_timeout: attrs.read_timeout,
        };
        debug!(
            "building admin transport for chef server {} with {options:?}",
            ctx.server_id()
        );
        let transport = self.factory.build(&options)?;
        Ok(ChefClient::new(ctx.clone(), transport))
    }

    /// Drop every cached client, the shared transports are kept.
    pub fn invalidate_all(&self) {
        self.zone_clients.invalidate_all();
        self.project_clients.invalidate_all();
    }

    fn cache(&self, context_type: ContextType) -> &ExpiringCache<String, ChefClient> {
        match context_type {
            ContextType::Zone => &self.zone_clients,
            ContextType::Project => &self.project_clients,
        }
    }

    async fn project_transport(&self) -> Result<Arc<dyn HttpSend>> {
        let transport = self
            .project_transport
            .get_or_try_init(|| async {
                debug!("building project transport with {:?}", self.options);
                self.factory.build(&self.options)
            })
            .await?;
        Ok(transport.clone())
    }
}
