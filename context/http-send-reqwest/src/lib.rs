//! Reqwest backed transport for chefsign.
//!
//! [`ReqwestHttpSend`] wraps a pooled `reqwest::Client`, [`ReqwestTransportFactory`]
//! builds them with the connect/read timeouts the client registry asks for.

use async_trait::async_trait;
use bytes::Bytes;
use chefsign_core::{Error, HttpSend, Result, TransportFactory, TransportOptions};
use http_body_util::BodyExt;
use log::debug;
use reqwest::{Client, Request};
use std::sync::Arc;

/// Transport handle backed by a `reqwest::Client`.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::request_invalid("failed to convert request").with_source(e))?;
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::transport("failed to send request").with_source(e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::transport("failed to read response body").with_source(e))?;
        Ok(http::Response::from_parts(parts, bs))
    }
}

/// Builds [`ReqwestHttpSend`] handles.
#[derive(Debug, Default, Clone)]
pub struct ReqwestTransportFactory {
    user_agent: Option<String>,
}

impl ReqwestTransportFactory {
    /// Create a new factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user agent sent with every request.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

impl TransportFactory for ReqwestTransportFactory {
    fn build(&self, opts: &TransportOptions) -> Result<Arc<dyn HttpSend>> {
        debug!(
            "building reqwest transport with connect timeout {:?}, read timeout {:?}",
            opts.connect_timeout, opts.read_timeout
        );

        let mut builder = Client::builder()
            .connect_timeout(opts.connect_timeout)
            .timeout(opts.read_timeout);
        if let Some(ua) = &self.user_agent {
            builder = builder.user_agent(ua);
        }

        let client = builder
            .build()
            .map_err(|e| Error::transport("failed to build http client").with_source(e))?;
        Ok(Arc::new(ReqwestHttpSend::new(client)))
    }
}
