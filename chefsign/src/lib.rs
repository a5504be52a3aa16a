#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use chefsign_core::*;

pub mod chef_server {
    pub use chefsign_chef_server::*;
}

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::{default_context, default_service, CHEF_BLOB_ROOT};
