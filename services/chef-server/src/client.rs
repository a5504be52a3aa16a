use crate::classify::classify;
use crate::{ChefCommand, ChefContext, ChefResponse, RequestSigner};
use bytes::Bytes;
use chefsign_core::hash::base64_sha1;
use chefsign_core::{Error, HttpSend, Result};
use http::header::CONTENT_TYPE;
use log::debug;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// ChefClient executes commands against one resolved Chef context.
///
/// Clients are cheap to clone, the transport is shared.
#[derive(Clone, Debug)]
pub struct ChefClient {
    context: Arc<ChefContext>,
    transport: Arc<dyn HttpSend>,
    signer: RequestSigner,
}

impl ChefClient {
    /// Bind a context to a transport.
    pub fn new(context: Arc<ChefContext>, transport: Arc<dyn HttpSend>) -> Self {
        Self {
            context,
            transport,
            signer: RequestSigner::new(),
        }
    }

    /// Replace the request signer.
    pub fn with_signer(mut self, signer: RequestSigner) -> Self {
        self.signer = signer;
        self
    }

    /// The context this client talks to.
    pub fn context(&self) -> &Arc<ChefContext> {
        &self.context
    }

    /// The transport this client sends through.
    pub fn transport(&self) -> &Arc<dyn HttpSend> {
        &self.transport
    }

    /// Target uri of a command:
    /// `<base uri><organization prefix><resource>[?<query>]`
    pub fn uri<T>(&self, cmd: &ChefCommand<T>) -> String {
        let mut uri = format!(
            "{}{}",
            self.context.base_uri(),
            self.context.resource_path(cmd.resource())
        );
        if let Some(query) = cmd.query() {
            uri.push('?');
            uri.push_str(query);
        }
        uri
    }

    /// Execute one command.
    ///
    /// Non success statuses come back as a response with `error` set. Failing to
    /// sign, send or decode the response is an error carrying the command identity.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        cmd: &ChefCommand<T>,
    ) -> Result<ChefResponse<T>> {
        let label = cmd.describe();
        let uri = self.uri(cmd);
        debug!(
            "executing {label} on chef server {}",
            self.context.server_id()
        );

        let body = cmd.body().map_err(|e| e.with_operation(&label))?;
        let headers = self
            .signer
            .sign(&self.context, &cmd.method(), cmd.resource(), &body)
            .map_err(|e| e.with_operation(&label))?;

        let mut req = http::Request::builder()
            .method(cmd.method())
            .uri(&uri)
            .body(Bytes::from(body))
            .map_err(|e| Error::from(e).with_operation(&label))?;
        *req.headers_mut() = headers;

        let resp = self.transport.http_send(req).await.map_err(|e| {
            Error::transport(format!("failed to execute request to {uri}"))
                .with_source(e)
                .with_operation(&label)
        })?;

        let (parts, body) = resp.into_parts();
        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        let verdict = classify(parts.status, content_type);
        if verdict.error {
            debug!("{label} answered {}: {}", parts.status, verdict.description);
        }

        let mut response = ChefResponse {
            status: parts.status,
            description: verdict.description,
            error: verdict.error,
            result: None,
            raw: None,
            content_hash: base64_sha1(&body),
        };

        if cmd.is_raw() {
            response.raw = Some(String::from_utf8_lossy(&body).to_string());
        } else if !response.error {
            let result = serde_json::from_slice(&body).map_err(|e| {
                Error::transport("malformed response body")
                    .with_source(e)
                    .with_operation(&label)
            })?;
            response.result = Some(result);
        }

        Ok(response)
    }
}
