// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Tokio-based file reading implementation for chefsign.
//!
//! This crate provides `TokioFileRead`, an async file reader that implements
//! the `FileRead` trait from `chefsign_core` using Tokio's file system operations.
//!
//! ## Blob service
//!
//! Project contexts load their API key from urls shaped like `/files/{token}/client.pem`.
//! With a root directory configured, the token is resolved to `<root>/<token>`:
//!
//! ```no_run
//! use chefsign_core::Context;
//! use chefsign_file_read_tokio::TokioFileRead;
//!
//! # async fn example() -> chefsign_core::Result<()> {
//! let ctx = Context::new().with_file_read(TokioFileRead::with_root("/var/lib/chef/files"));
//! let pem = ctx.file_read_as_string("0f3c9a").await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chefsign_core::{Error, FileRead, Result};
use log::debug;
use std::path::{Component, Path, PathBuf};

/// Tokio-based implementation of the `FileRead` trait.
///
/// Without a root, `path` is read as-is. With a root, `path` is a token that
/// must stay inside the root directory.
#[derive(Debug, Clone, Default)]
pub struct TokioFileRead {
    root: Option<PathBuf>,
}

impl TokioFileRead {
    /// Serve tokens out of the given directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let Some(root) = &self.root else {
            return Ok(PathBuf::from(path));
        };

        let token = Path::new(path);
        if !token
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(Error::request_invalid(format!(
                "file token escapes the blob root: {path}"
            )));
        }
        Ok(root.join(token))
    }
}

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        let path = self.resolve(path)?;
        debug!("reading file {}", path.display());

        tokio::fs::read(&path)
            .await
            .map_err(|e| Error::unexpected("failed to read file").with_source(e))
    }
}
