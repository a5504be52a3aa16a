use crate::Result;
use bytes::Bytes;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

/// HttpSend is the transport handle used to talk to a Chef Server.
///
/// Implementations are expected to pool connections, a handle is shared by every
/// client bound to the same transport.
#[async_trait::async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send http request and return the response.
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>>;
}

/// Timeouts applied when a transport is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    /// Time allowed to establish the connection.
    pub connect_timeout: Duration,
    /// Time allowed for the whole request including reading the body.
    pub read_timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(60),
        }
    }
}

/// TransportFactory constructs transport handles.
///
/// Building a transport is expensive, callers are expected to cache what they get back.
pub trait TransportFactory: Debug + Send + Sync + 'static {
    /// Build a new transport with the given options.
    fn build(&self, opts: &TransportOptions) -> Result<Arc<dyn HttpSend>>;
}
