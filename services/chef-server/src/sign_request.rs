use crate::constants::*;
use crate::ChefContext;
use chefsign_core::hash::{base64_encode, base64_sha1};
use chefsign_core::time::{format_chef_timestamp, now, DateTime};
use chefsign_core::{Error, Result};
use http::header::{ACCEPT, ACCEPT_ENCODING, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use rsa::Pkcs1v15Sign;
use std::fmt::Write;

/// RequestSigner implements the Chef Server authentication protocol, version 1.0.
///
/// - [Chef Server API authentication](https://docs.chef.io/server/api_chef_server/#authentication-headers)
///
/// The string to sign is
///
/// ```text
/// Method:<METHOD>
/// Hashed Path:<base64(sha1("/" + resource))>
/// X-Ops-Content-Hash:<base64(sha1(body))>
/// X-Ops-Timestamp:<yyyy-MM-ddTHH:mm:ssZ>
/// X-Ops-UserId:<client name>
/// ```
///
/// signed with PKCS#1 v1.5 padding over the raw bytes, then split into
/// `X-Ops-Authorization-N` headers of 60 characters each.
#[derive(Debug, Default, Clone)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer that stamps requests with the current time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time instead of using now.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Build the authentication headers for one request.
    ///
    /// `resource` is the command's resource path without organization prefix,
    /// `body` the literal serialized request body. The body only takes part in
    /// the content hash for POST and PUT.
    pub fn sign(
        &self,
        ctx: &ChefContext,
        method: &Method,
        resource: &str,
        body: &[u8],
    ) -> Result<HeaderMap> {
        let now = self.time.unwrap_or_else(now);
        let timestamp = format_chef_timestamp(now);

        let resource = ctx.resource_path(resource);
        let hashed_path = base64_sha1(format!("/{resource}").as_bytes());
        let hashed_body = if *method == Method::POST || *method == Method::PUT {
            base64_sha1(body)
        } else {
            base64_sha1(b"")
        };

        let string_to_sign = canonical_string(
            method.as_str(),
            &hashed_path,
            &hashed_body,
            &timestamp,
            ctx.username(),
        )?;

        let signature = ctx
            .key()
            .sign(Pkcs1v15Sign::new_unprefixed(), string_to_sign.as_bytes())
            .map_err(|e| Error::signing_failed("failed to sign request").with_source(e))?;
        let signature = base64_encode(&signature);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        headers.insert(header_name(X_OPS_TIMESTAMP)?, header_value(&timestamp)?);
        headers.insert(header_name(X_OPS_USERID)?, header_value(ctx.username())?);
        headers.insert(
            header_name(X_CHEF_VERSION)?,
            HeaderValue::from_static(ctx.version().client_version()),
        );
        headers.insert(ACCEPT, HeaderValue::from_static(CONTENT_TYPE_JSON));
        headers.insert(header_name(X_OPS_CONTENT_HASH)?, header_value(&hashed_body)?);
        headers.insert(header_name(X_OPS_SIGN)?, HeaderValue::from_static(SIGN_VERSION));
        headers.insert(
            header_name(X_OPS_SERVER_API_VERSION)?,
            HeaderValue::from_static(SERVER_API_VERSION),
        );
        headers.insert(
            ACCEPT_ENCODING,
            HeaderValue::from_static(ACCEPT_ENCODING_PREFERENCE),
        );
        for (idx, chunk) in split_chunks(&signature, AUTHORIZATION_CHUNK_WIDTH)
            .into_iter()
            .enumerate()
        {
            let name = header_name(&format!("{X_OPS_AUTHORIZATION_PREFIX}{}", idx + 1))?;
            headers.insert(name, header_value(chunk)?);
        }

        Ok(headers)
    }
}

/// Build the canonical string to sign.
///
/// Fields are joined with `\n`, there is no trailing newline.
pub fn canonical_string(
    method: &str,
    hashed_path: &str,
    hashed_body: &str,
    timestamp: &str,
    username: &str,
) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "Method:{method}")?;
    writeln!(f, "Hashed Path:{hashed_path}")?;
    writeln!(f, "X-Ops-Content-Hash:{hashed_body}")?;
    writeln!(f, "X-Ops-Timestamp:{timestamp}")?;
    write!(f, "X-Ops-UserId:{username}")?;
    Ok(f)
}

/// Split `s` into chunks of `width` characters, the last one may be shorter.
///
/// Empty input yields no chunks.
pub fn split_chunks(s: &str, width: usize) -> Vec<&str> {
    let width = width.max(1);
    let mut chunks = Vec::with_capacity(s.len().div_ceil(width));

    // The signature is base64, every byte is a char boundary.
    let mut start = 0;
    while start < s.len() {
        let end = (start + width).min(s.len());
        chunks.push(&s[start..end]);
        start = end;
    }

    chunks
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| Error::signing_failed(format!("invalid header name {name}")).with_source(e))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::signing_failed("invalid header value").with_source(e))
}
