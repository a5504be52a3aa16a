use chefsign_chef_server::{ChefService, ConfigurationStore, InstanceStore, Settings};
use chefsign_core::{Context, OsEnv, Result, SecretStore};
use chefsign_file_read_tokio::TokioFileRead;
use chefsign_http_send_reqwest::ReqwestTransportFactory;
use std::sync::Arc;

/// Directory the blob service serves api key tokens from.
pub const CHEF_BLOB_ROOT: &str = "CHEF_BLOB_ROOT";

/// Create a context with the tokio file reader and the OS environment.
///
/// Blob tokens are resolved below `CHEF_BLOB_ROOT` when it is set. No secret
/// store is configured, add one with [`Context::with_secret_store`].
pub fn default_context() -> Context {
    let ctx = Context::new().with_env(OsEnv);
    let fs = match ctx.env_var(CHEF_BLOB_ROOT) {
        Some(root) if !root.trim().is_empty() => TokioFileRead::with_root(root),
        _ => TokioFileRead::default(),
    };
    ctx.with_file_read(fs)
}

/// Create a [`ChefService`] on the default context and reqwest transports.
///
/// Settings are read from the environment, see [`Settings::from_env`].
pub fn default_service(
    configs: Arc<dyn ConfigurationStore>,
    instances: Arc<dyn InstanceStore>,
    secrets: impl SecretStore,
) -> Result<ChefService> {
    let ctx = default_context().with_secret_store(secrets);
    let settings = Settings::from_env(&ctx)?;
    let factory = ReqwestTransportFactory::new()
        .with_user_agent(concat!("chefsign/", env!("CARGO_PKG_VERSION")));
    ChefService::new(ctx, configs, instances, Arc::new(factory), &settings)
}
