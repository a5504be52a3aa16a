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

use crate::utils::unescape_java;
use crate::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Context holds the external collaborators needed while resolving Chef contexts.
///
/// ## Important
///
/// chefsign provides NO default implementations here. Users MAY configure components they need.
/// Any unconfigured component will use a no-op implementation that returns errors or empty values when called.
///
/// ## Example
///
/// ```
/// use chefsign_core::{Context, OsEnv, StaticSecretStore};
///
/// let ctx = Context::new()
///     .with_env(OsEnv)
///     .with_secret_store(StaticSecretStore::default());
/// ```
#[derive(Clone)]
pub struct Context {
    fs: Arc<dyn FileRead>,
    env: Arc<dyn Env>,
    secrets: Arc<dyn SecretStore>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("fs", &self.fs)
            .field("env", &self.env)
            .field("secrets", &self.secrets)
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a new Context with no-op implementations.
    pub fn new() -> Self {
        Self {
            fs: Arc::new(NoopFileRead),
            env: Arc::new(NoopEnv),
            secrets: Arc::new(NoopSecretStore),
        }
    }

    /// Replace the file reader implementation.
    pub fn with_file_read(mut self, fs: impl FileRead) -> Self {
        self.fs = Arc::new(fs);
        self
    }

    /// Replace the environment implementation.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Replace the secret store implementation.
    pub fn with_secret_store(mut self, secrets: impl SecretStore) -> Self {
        self.secrets = Arc::new(secrets);
        self
    }

    /// Read the file content entirely in `Vec<u8>`.
    ///
    /// For the blob service `path` is the file token taken from a `/files/{token}/...` url.
    #[inline]
    pub async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        self.fs.file_read(path).await
    }

    /// Read the file content entirely in `String`.
    pub async fn file_read_as_string(&self, path: &str) -> Result<String> {
        let bytes = self.file_read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }

    /// Get the environment variable.
    ///
    /// - Returns `Some(v)` if the environment variable is found and is valid utf-8.
    /// - Returns `None` if the environment variable is not found or value is invalid.
    #[inline]
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }

    /// Returns an hashmap of (variable, value) pairs of strings, for all the
    /// environment variables of the current process.
    #[inline]
    pub fn env_vars(&self) -> HashMap<String, String> {
        self.env.vars()
    }

    /// Fetch a secret and undo any Java style escaping on it.
    pub async fn secret_value(&self, key: &str) -> Result<Option<String>> {
        let value = self.secrets.get_secret_value(key).await?;
        Ok(value.map(|v| unescape_java(&v)))
    }

    /// Access the configured secret store directly.
    pub fn secret_store(&self) -> &dyn SecretStore {
        self.secrets.as_ref()
    }
}

/// FileRead is used to read the file content entirely in `Vec<u8>`.
///
/// This backs the blob service that hands out key material by token.
#[async_trait::async_trait]
pub trait FileRead: Debug + Send + Sync + 'static {
    /// Read the file content entirely in `Vec<u8>`.
    async fn file_read(&self, path: &str) -> Result<Vec<u8>>;
}

/// Permits parameterizing environment lookups.
pub trait Env: Debug + Send + Sync + 'static {
    /// Get an environment variable.
    fn var(&self, key: &str) -> Option<String>;

    /// Returns an hashmap of (variable, value) pairs of strings, for all the
    /// environment variables of the current process.
    fn vars(&self) -> HashMap<String, String>;
}

/// SecretStore is the external key/secret store.
///
/// Values may come back Java-escaped, use [`Context::secret_value`] to read them unescaped.
#[async_trait::async_trait]
pub trait SecretStore: Debug + Send + Sync + 'static {
    /// Get the raw secret value, `None` if the key does not exist.
    async fn get_secret_value(&self, key: &str) -> Result<Option<String>>;

    /// Create or overwrite a secret.
    async fn save_secret(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a secret. Deleting a missing key is not an error.
    async fn delete_secret(&self, key: &str) -> Result<()>;

    /// Check whether a secret exists.
    async fn exists(&self, key: &str) -> Result<bool>;
}

/// Implements Env for the OS context.
#[derive(Debug, Copy, Clone)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }

    fn vars(&self) -> HashMap<String, String> {
        std::env::vars().collect()
    }
}

/// StaticEnv provides a static env environment.
///
/// This is useful for testing or for providing a fixed environment.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    /// The environment variables to use.
    pub envs: HashMap<String, String>,
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.envs.get(key).cloned()
    }

    fn vars(&self) -> HashMap<String, String> {
        self.envs.clone()
    }
}

/// StaticSecretStore keeps secrets in memory.
///
/// Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct StaticSecretStore {
    secrets: Arc<RwLock<HashMap<String, String>>>,
}

impl StaticSecretStore {
    /// Create a store pre-filled with the given secrets.
    pub fn new(secrets: HashMap<String, String>) -> Self {
        Self {
            secrets: Arc::new(RwLock::new(secrets)),
        }
    }
}

impl Debug for StaticSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSecretStore")
            .field("keys", &self.secrets.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait::async_trait]
impl SecretStore for StaticSecretStore {
    async fn get_secret_value(&self, key: &str) -> Result<Option<String>> {
        Ok(self.secrets.read().get(key).cloned())
    }

    async fn save_secret(&self, key: &str, value: &str) -> Result<()> {
        self.secrets
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_secret(&self, key: &str) -> Result<()> {
        self.secrets.write().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.secrets.read().contains_key(key))
    }
}

/// NoopFileRead is a no-op implementation that always returns an error.
///
/// This is used when no file reader is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFileRead;

#[async_trait::async_trait]
impl FileRead for NoopFileRead {
    async fn file_read(&self, _path: &str) -> Result<Vec<u8>> {
        Err(Error::unexpected(
            "file reading not supported: no file reader configured",
        ))
    }
}

/// NoopEnv is a no-op implementation that always returns None/empty.
///
/// This is used when no environment is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnv;

impl Env for NoopEnv {
    fn var(&self, _key: &str) -> Option<String> {
        None
    }

    fn vars(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

/// NoopSecretStore is a no-op implementation that always returns an error.
///
/// This is used when no secret store is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSecretStore;

#[async_trait::async_trait]
impl SecretStore for NoopSecretStore {
    async fn get_secret_value(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::unexpected(
            "secret lookup not supported: no secret store configured",
        ))
    }

    async fn save_secret(&self, _key: &str, _value: &str) -> Result<()> {
        Err(Error::unexpected(
            "secret write not supported: no secret store configured",
        ))
    }

    async fn delete_secret(&self, _key: &str) -> Result<()> {
        Err(Error::unexpected(
            "secret delete not supported: no secret store configured",
        ))
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        Err(Error::unexpected(
            "secret lookup not supported: no secret store configured",
        ))
    }
}
