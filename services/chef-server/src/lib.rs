//! Chef Server request signing, context resolution and command dispatch.
//!
//! The pieces from leaf to root:
//!
//! - [`RequestSigner`] builds the `X-Ops-*` authentication headers.
//! - [`ContextResolver`] turns tenant/region or server configuration into a [`ChefContext`].
//! - [`ClientRegistry`] hands out [`ChefClient`]s bound to shared transports.
//! - [`ChefClient`] executes a [`ChefCommand`] and classifies the response.
//! - [`ChefService`] ties them together behind one entry point.

mod constants;

mod version;
pub use version::ChefVersion;

mod key;
pub use key::parse_private_key;

mod chef_context;
pub use chef_context::{ChefContext, ChefContextBuilder, ContextType};

mod sign_request;
pub use sign_request::{canonical_string, split_chunks, RequestSigner};

mod classify;
pub use classify::{classify, Verdict};

mod command;
pub use command::{ChefCommand, Verb};

mod response;
pub use response::ChefResponse;

pub mod resource;

mod cache;
pub use cache::ExpiringCache;

mod config;
pub use config::Settings;

mod store;
pub use store::{
    ChefMode, ConfigurationStore, MemoryConfigurationStore, ServerConfiguration,
    TenantConfiguration,
};

mod instance;
pub use instance::{AutoConfigState, InstanceRecord, InstanceStore, MemoryInstanceStore};

mod resolve;
pub use resolve::{blob_token, normalize_base_uri, ContextResolver};

mod client;
pub use client::ChefClient;

mod registry;
pub use registry::{AdminAttributes, ClientRegistry};

mod service;
pub use service::ChefService;
