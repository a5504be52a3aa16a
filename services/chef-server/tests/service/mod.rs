use crate::mock::{
    authorization, client_public_key, header, CountingConfigurationStore, CountingFactory,
    RecordingTransport, CLIENT_PEM,
};
use chefsign_chef_server::{
    canonical_string, resource, ChefCommand, ChefMode, ChefService, ConfigurationStore,
    ContextType, InstanceRecord, InstanceStore, MemoryInstanceStore, ServerConfiguration,
    Settings, TenantConfiguration,
};
use chefsign_core::hash::{base64_decode, base64_sha1};
use chefsign_core::{Context, ErrorKind, Result, StaticSecretStore};
use chefsign_file_read_tokio::TokioFileRead;
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use rsa::Pkcs1v15Sign;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Node {
    name: String,
    run_list: Vec<String>,
}

struct Fixture {
    service: Arc<ChefService>,
    configs: CountingConfigurationStore,
    factory: Arc<CountingFactory>,
    transport: RecordingTransport,
    _blobs: TempDir,
}

async fn fixture(transport: RecordingTransport) -> Fixture {
    let _ = env_logger::builder().is_test(true).try_init();

    let blobs = tempfile::tempdir().expect("tempdir must be created");
    std::fs::write(blobs.path().join("tok-acme"), CLIENT_PEM).expect("key must be written");

    let configs = CountingConfigurationStore::default();
    configs
        .save_server(ServerConfiguration {
            server_id: "zone-eu".to_string(),
            host: "chef-eu.example.com".to_string(),
            organization: "platform".to_string(),
            username: "platform-bot".to_string(),
            client_key: "chef/zone-eu.pem".to_string(),
            version: "12".to_string(),
            roles: vec!["base".to_string()],
            regions: vec!["eu-1".to_string()],
            data_bags: HashMap::from([("secrets".to_string(), "eu_secrets".to_string())]),
        })
        .await
        .unwrap();
    configs.bind_region("eu-1", "zone-eu").await.unwrap();

    configs
        .save_server(ServerConfiguration {
            server_id: "acme-chef".to_string(),
            host: "chef.acme.example".to_string(),
            username: "acme-admin".to_string(),
            version: "11".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    configs
        .save_tenant(TenantConfiguration {
            tenant: "acme".to_string(),
            region: "eu-1".to_string(),
            server_id: "acme-chef".to_string(),
            mode: ChefMode::External,
            api_key_url: "/files/tok-acme/acme.pem".to_string(),
            username: None,
        })
        .await
        .unwrap();

    let instances = MemoryInstanceStore::new();
    instances
        .save(InstanceRecord {
            instance_id: "i-1".to_string(),
            tenant: "globex".to_string(),
            region: "eu-1".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    // Escaped the way secret stores usually hand PEM blocks back.
    let ctx = Context::new()
        .with_file_read(TokioFileRead::with_root(blobs.path()))
        .with_secret_store(StaticSecretStore::new(HashMap::from([(
            "chef/zone-eu.pem".to_string(),
            CLIENT_PEM.replace('\n', "\\n"),
        )])));

    let factory = Arc::new(CountingFactory::new(transport.clone()));
    let service = ChefService::new(
        ctx,
        Arc::new(configs.clone()),
        Arc::new(instances),
        factory.clone(),
        &Settings::default(),
    )
    .expect("service must build");

    Fixture {
        service: Arc::new(service),
        configs,
        factory,
        transport,
        _blobs: blobs,
    }
}

#[tokio::test]
async fn test_zone_request_is_signed() -> Result<()> {
    let f = fixture(RecordingTransport::json(
        StatusCode::OK,
        r#"{"name":"web-1","run_list":["role[base]"]}"#,
    ))
    .await;

    let cmd: ChefCommand<Node> = ChefCommand::get(resource::item(resource::NODES, "web-1"));
    let resp = f.service.execute("globex", "eu-1", &cmd).await?;
    assert_eq!(
        resp.result,
        Some(Node {
            name: "web-1".to_string(),
            run_list: vec![resource::run_list_role("base")],
        })
    );

    let sent = &f.transport.requests()[0];
    assert_eq!(sent.method, Method::GET);
    assert_eq!(
        sent.uri,
        "https://chef-eu.example.com/organizations/platform/nodes/web-1"
    );
    assert_eq!(header(&sent.headers, "x-ops-userid"), "platform-bot");

    let expected = canonical_string(
        "GET",
        &base64_sha1(b"/organizations/platform/nodes/web-1"),
        &base64_sha1(b""),
        header(&sent.headers, "x-ops-timestamp"),
        "platform-bot",
    )?;
    let signature = base64_decode(&authorization(&sent.headers))?;
    client_public_key()
        .verify(Pkcs1v15Sign::new_unprefixed(), expected.as_bytes(), &signature)
        .expect("signature must verify");
    Ok(())
}

#[tokio::test]
async fn test_project_request_uses_blob_key() -> Result<()> {
    let f = fixture(RecordingTransport::json(StatusCode::CREATED, "{}")).await;

    let node = Node {
        name: "db-1".to_string(),
        run_list: vec![],
    };
    let cmd: ChefCommand<Value> = ChefCommand::post(resource::NODES, &node)?;
    let resp = f.service.execute("acme", "eu-1", &cmd).await?;
    assert!(!resp.is_error());

    let ctx = f.service.resolver().resolve_by_server_id("acme-chef").unwrap();
    assert_eq!(ctx.context_type(), ContextType::Project);
    assert_eq!(ctx.username(), "acme-admin");

    // Version 11 has no organizations.
    let sent = &f.transport.requests()[0];
    assert_eq!(sent.uri, "https://chef.acme.example/nodes");
    assert_eq!(
        header(&sent.headers, "x-ops-content-hash"),
        base64_sha1(&sent.body)
    );
    let parsed: Node = serde_json::from_slice(&sent.body).unwrap();
    assert_eq!(parsed, node);
    Ok(())
}

#[tokio::test]
async fn test_data_bag_mapping_reaches_the_wire() -> Result<()> {
    let f = fixture(RecordingTransport::json(StatusCode::OK, "{}")).await;

    let client = f.service.client("globex", "eu-1").await?;
    let cmd: ChefCommand<Value> =
        ChefCommand::get(resource::data_bag_item(client.context(), "secrets", "web-1"));
    client.execute(&cmd).await?;

    assert_eq!(
        f.transport.requests()[0].uri,
        "https://chef-eu.example.com/organizations/platform/data/eu_secrets/web-1"
    );
    Ok(())
}

#[tokio::test]
async fn test_refresh_rereads_configuration() -> Result<()> {
    let f = fixture(RecordingTransport::json(StatusCode::OK, "{}")).await;
    let cmd: ChefCommand<Value> = ChefCommand::get(resource::ROLES);

    f.service.execute("globex", "eu-1", &cmd).await?;
    let reads = f.configs.server_reads();
    f.service.execute("globex", "eu-1", &cmd).await?;
    f.service.execute_for_instance("i-1", &cmd).await?;
    assert_eq!(f.configs.server_reads(), reads);

    f.service.refresh();
    f.service.execute("globex", "eu-1", &cmd).await?;
    assert!(f.configs.server_reads() > reads);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_project_callers_share_one_transport() -> Result<()> {
    let f = fixture(RecordingTransport::json(StatusCode::OK, "{}")).await;
    assert_eq!(f.factory.builds(), 1);

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let service = f.service.clone();
            tokio::spawn(async move {
                let cmd: ChefCommand<Value> = ChefCommand::get(resource::NODES);
                service.execute("acme", "eu-1", &cmd).await
            })
        })
        .collect();
    for task in tasks {
        assert!(!task.await.expect("task must not panic")?.is_error());
    }

    assert_eq!(f.factory.builds(), 2);
    assert_eq!(f.transport.requests().len(), 8);
    Ok(())
}

#[tokio::test]
async fn test_protocol_and_transport_failures() -> Result<()> {
    let f = fixture(RecordingTransport::json(StatusCode::CONFLICT, "{}")).await;
    let cmd: ChefCommand<Value> = ChefCommand::post(resource::CLIENTS, &serde_json::json!({}))?;
    let resp = f.service.execute("globex", "eu-1", &cmd).await?;
    assert!(resp.is_error());
    assert_eq!(resp.description, "conflict, object already exists");

    let f = fixture(RecordingTransport::failing()).await;
    let err = f.service.execute("globex", "eu-1", &cmd).await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.operation(), Some("POST clients"));

    let err = f.service.execute("globex", "us-1", &cmd).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    Ok(())
}
