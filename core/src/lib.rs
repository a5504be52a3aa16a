//! Core components for talking to a Chef Server.
//!
//! This crate provides the foundational types and traits shared by the chefsign crates.
//!
//! ## Overview
//!
//! - **Context**: A container that holds implementations for the blob/file service,
//!   environment access and the secret store
//! - **Transport**: [`HttpSend`] is a pooled transport handle, [`TransportFactory`] builds them
//! - **Error**: One [`Error`] type with an [`ErrorKind`] for every failure in the stack
//!
//! ## Example
//!
//! ```
//! use chefsign_core::{Context, StaticEnv, StaticSecretStore};
//! use std::collections::HashMap;
//!
//! let ctx = Context::new()
//!     .with_env(StaticEnv {
//!         envs: HashMap::from([("CHEF_INSECURE".to_string(), "false".to_string())]),
//!     })
//!     .with_secret_store(StaticSecretStore::default());
//! assert_eq!(ctx.env_var("CHEF_INSECURE").as_deref(), Some("false"));
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: SHA1 and base64 helpers used by the Chef signing protocol
//! - [`time`]: Chef timestamp formatting
//! - [`utils`]: Redaction, blank checks and Java string unescaping

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{
    Context, Env, FileRead, NoopEnv, NoopFileRead, NoopSecretStore, OsEnv, SecretStore,
    StaticEnv, StaticSecretStore,
};
mod transport;
pub use transport::{HttpSend, TransportFactory, TransportOptions};
mod error;
pub use error::{Error, ErrorKind, Result};
