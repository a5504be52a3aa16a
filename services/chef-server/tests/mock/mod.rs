use async_trait::async_trait;
use bytes::Bytes;
use chefsign_chef_server::{
    ConfigurationStore, MemoryConfigurationStore, ServerConfiguration, TenantConfiguration,
};
use chefsign_core::{Error, HttpSend, Result, TransportFactory, TransportOptions};
use http::{HeaderMap, Method, StatusCode};
use parking_lot::Mutex;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const CLIENT_PEM: &str = include_str!("../../testdata/client.pem");
pub const CLIENT_PKCS8_PEM: &str = include_str!("../../testdata/client_pkcs8.pem");
pub const GOLDEN_GET_NODES: &str = include_str!("../../testdata/get_nodes_alice.sig");

pub fn client_key() -> RsaPrivateKey {
    chefsign_chef_server::parse_private_key(CLIENT_PEM).expect("test key must be valid")
}

pub fn client_public_key() -> RsaPublicKey {
    RsaPublicKey::from(&client_key())
}

/// Concatenate `X-Ops-Authorization-N` headers in order.
pub fn authorization(headers: &HeaderMap) -> String {
    (1..)
        .map_while(|idx| headers.get(format!("x-ops-authorization-{idx}")))
        .map(|v| v.to_str().expect("header must be ascii"))
        .collect()
}

pub fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .unwrap_or_else(|| panic!("header {name} must exist"))
        .to_str()
        .expect("header must be ascii")
}

#[derive(Debug, Clone)]
pub struct SentRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Answers every request with a canned json response and records what it got.
#[derive(Debug, Clone)]
pub struct RecordingTransport {
    status: StatusCode,
    body: String,
    fail: bool,
    sent: Arc<Mutex<Vec<SentRequest>>>,
}

impl RecordingTransport {
    pub fn json(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            fail: false,
            sent: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::json(StatusCode::OK, "")
        }
    }

    pub fn requests(&self) -> Vec<SentRequest> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl HttpSend for RecordingTransport {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let (parts, body) = req.into_parts();
        self.sent.lock().push(SentRequest {
            method: parts.method,
            uri: parts.uri.to_string(),
            headers: parts.headers,
            body,
        });

        if self.fail {
            return Err(Error::transport("connection refused"));
        }
        Ok(http::Response::builder()
            .status(self.status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Bytes::from(self.body.clone()))?)
    }
}

/// Hands out the same recording transport and counts how often it was asked to.
#[derive(Debug)]
pub struct CountingFactory {
    pub transport: RecordingTransport,
    pub builds: AtomicUsize,
}

impl CountingFactory {
    pub fn new(transport: RecordingTransport) -> Self {
        Self {
            transport,
            builds: AtomicUsize::new(0),
        }
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl TransportFactory for CountingFactory {
    fn build(&self, _: &TransportOptions) -> Result<Arc<dyn HttpSend>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(10));
        Ok(Arc::new(self.transport.clone()))
    }
}

/// Configuration store that counts server lookups.
#[derive(Debug, Clone, Default)]
pub struct CountingConfigurationStore {
    pub inner: MemoryConfigurationStore,
    pub server_reads: Arc<AtomicUsize>,
}

impl CountingConfigurationStore {
    pub fn server_reads(&self) -> usize {
        self.server_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigurationStore for CountingConfigurationStore {
    async fn get_server(&self, server_id: &str) -> Result<Option<ServerConfiguration>> {
        self.server_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_server(server_id).await
    }

    async fn save_server(&self, config: ServerConfiguration) -> Result<()> {
        self.inner.save_server(config).await
    }

    async fn delete_server(&self, server_id: &str) -> Result<()> {
        self.inner.delete_server(server_id).await
    }

    async fn list_servers(&self) -> Result<Vec<ServerConfiguration>> {
        self.inner.list_servers().await
    }

    async fn get_tenant(
        &self,
        tenant: &str,
        region: &str,
    ) -> Result<Option<TenantConfiguration>> {
        self.inner.get_tenant(tenant, region).await
    }

    async fn save_tenant(&self, config: TenantConfiguration) -> Result<()> {
        self.inner.save_tenant(config).await
    }

    async fn delete_tenant(&self, tenant: &str, region: &str) -> Result<()> {
        self.inner.delete_tenant(tenant, region).await
    }

    async fn get_region_server(&self, region: &str) -> Result<Option<ServerConfiguration>> {
        self.server_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_region_server(region).await
    }

    async fn bind_region(&self, region: &str, server_id: &str) -> Result<()> {
        self.inner.bind_region(region, server_id).await
    }

    async fn unbind_region(&self, region: &str) -> Result<()> {
        self.inner.unbind_region(region).await
    }
}
