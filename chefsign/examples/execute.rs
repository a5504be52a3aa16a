use anyhow::Result;
use chefsign::chef_server::{
    resource, ChefCommand, ConfigurationStore, MemoryConfigurationStore, MemoryInstanceStore,
    ServerConfiguration,
};
use chefsign::StaticSecretStore;
use serde_json::Value;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // Register the region's shared chef server.
    let configs = MemoryConfigurationStore::new();
    configs
        .save_server(ServerConfiguration {
            server_id: "zone-eu".to_string(),
            host: env::var("CHEF_SERVER_HOST")?,
            organization: env::var("CHEF_SERVER_ORG").unwrap_or_default(),
            username: env::var("CHEF_SERVER_USER")?,
            client_key: "chef/zone-eu.pem".to_string(),
            version: env::var("CHEF_SERVER_VERSION").unwrap_or_default(),
            ..Default::default()
        })
        .await?;
    configs.bind_region("eu-1", "zone-eu").await?;

    // The client key lives in the secret store.
    let secrets = StaticSecretStore::new(HashMap::from([(
        "chef/zone-eu.pem".to_string(),
        std::fs::read_to_string(env::var("CHEF_SERVER_KEY_FILE")?)?,
    )]));

    let service = chefsign::default_service(
        Arc::new(configs),
        Arc::new(MemoryInstanceStore::new()),
        secrets,
    )?;

    let cmd: ChefCommand<Value> = ChefCommand::get(resource::NODES);
    let resp = service.execute("acme", "eu-1", &cmd).await?;
    println!("{} {}", resp.status, resp.description);
    if let Some(nodes) = resp.result {
        println!("{nodes:#}");
    }

    Ok(())
}
