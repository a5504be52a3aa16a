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

use crate::constants::*;
use chefsign_core::utils::is_blank;
use chefsign_core::{Context, Error, Result, TransportOptions};
use std::str::FromStr;
use std::time::Duration;

/// Settings of the resolver and client registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Talk plain `http://` to Chef servers.
    pub insecure: bool,
    /// Idle time after which a resolved context is dropped.
    pub context_ttl: Duration,
    /// Max resolved contexts kept.
    pub context_capacity: usize,
    /// Idle time after which a project client is dropped.
    pub project_client_ttl: Duration,
    /// Max project clients kept.
    pub project_client_capacity: usize,
    /// Idle time after which a zone client is dropped.
    pub zone_client_ttl: Duration,
    /// Max zone clients kept.
    pub zone_client_capacity: usize,
    /// Connect timeout of the shared transports.
    pub connect_timeout: Duration,
    /// Read timeout of the shared transports.
    pub read_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        let transport = TransportOptions::default();
        Self {
            insecure: false,
            context_ttl: Duration::from_secs(2 * 60 * 60),
            context_capacity: 1024,
            project_client_ttl: Duration::from_secs(10 * 60),
            project_client_capacity: 512,
            zone_client_ttl: Duration::from_secs(24 * 60 * 60),
            zone_client_capacity: 64,
            connect_timeout: transport.connect_timeout,
            read_timeout: transport.read_timeout,
        }
    }
}

impl Settings {
    /// Load settings from environment variables, unset values keep their default.
    pub fn from_env(ctx: &Context) -> Result<Self> {
        let mut s = Self::default();

        if let Some(v) = env(ctx, CHEF_INSECURE) {
            s.insecure = parse_bool(CHEF_INSECURE, &v)?;
        }
        if let Some(v) = env(ctx, CHEF_CONTEXT_TTL_SECS) {
            s.context_ttl = parse_secs(CHEF_CONTEXT_TTL_SECS, &v)?;
        }
        if let Some(v) = env(ctx, CHEF_CONTEXT_CAPACITY) {
            s.context_capacity = parse(CHEF_CONTEXT_CAPACITY, &v)?;
        }
        if let Some(v) = env(ctx, CHEF_PROJECT_CLIENT_TTL_SECS) {
            s.project_client_ttl = parse_secs(CHEF_PROJECT_CLIENT_TTL_SECS, &v)?;
        }
        if let Some(v) = env(ctx, CHEF_PROJECT_CLIENT_CAPACITY) {
            s.project_client_capacity = parse(CHEF_PROJECT_CLIENT_CAPACITY, &v)?;
        }
        if let Some(v) = env(ctx, CHEF_ZONE_CLIENT_TTL_SECS) {
            s.zone_client_ttl = parse_secs(CHEF_ZONE_CLIENT_TTL_SECS, &v)?;
        }
        if let Some(v) = env(ctx, CHEF_ZONE_CLIENT_CAPACITY) {
            s.zone_client_capacity = parse(CHEF_ZONE_CLIENT_CAPACITY, &v)?;
        }
        if let Some(v) = env(ctx, CHEF_CONNECT_TIMEOUT_SECS) {
            s.connect_timeout = parse_secs(CHEF_CONNECT_TIMEOUT_SECS, &v)?;
        }
        if let Some(v) = env(ctx, CHEF_READ_TIMEOUT_SECS) {
            s.read_timeout = parse_secs(CHEF_READ_TIMEOUT_SECS, &v)?;
        }

        Ok(s)
    }

    /// Timeouts of the shared transports.
    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
        }
    }
}

fn env(ctx: &Context, key: &str) -> Option<String> {
    ctx.env_var(key).filter(|v| !is_blank(v))
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e| {
        Error::config_invalid(format!("{key} has invalid value: {value}")).with_source(e)
    })
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    parse::<u64>(key, value).map(Duration::from_secs)
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(Error::config_invalid(format!(
            "{key} has invalid value: {value}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chefsign_core::{ErrorKind, StaticEnv};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn ctx(envs: &[(&str, &str)]) -> Context {
        Context::new().with_env(StaticEnv {
            envs: envs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        })
    }

    #[test]
    fn test_defaults() {
        let s = Settings::from_env(&ctx(&[])).unwrap();
        assert_eq!(s, Settings::default());
        assert!(!s.insecure);
        assert_eq!(s.context_ttl, Duration::from_secs(7200));
        assert_eq!(s.transport_options(), TransportOptions::default());
    }

    #[test]
    fn test_from_env() {
        let s = Settings::from_env(&ctx(&[
            (CHEF_INSECURE, "on"),
            (CHEF_CONTEXT_TTL_SECS, "30"),
            (CHEF_CONTEXT_CAPACITY, "8"),
            (CHEF_PROJECT_CLIENT_TTL_SECS, "5"),
            (CHEF_PROJECT_CLIENT_CAPACITY, "4"),
            (CHEF_ZONE_CLIENT_TTL_SECS, "600"),
            (CHEF_ZONE_CLIENT_CAPACITY, "2"),
            (CHEF_CONNECT_TIMEOUT_SECS, "3"),
            (CHEF_READ_TIMEOUT_SECS, " 20 "),
        ]))
        .unwrap();

        assert_eq!(
            s,
            Settings {
                insecure: true,
                context_ttl: Duration::from_secs(30),
                context_capacity: 8,
                project_client_ttl: Duration::from_secs(5),
                project_client_capacity: 4,
                zone_client_ttl: Duration::from_secs(600),
                zone_client_capacity: 2,
                connect_timeout: Duration::from_secs(3),
                read_timeout: Duration::from_secs(20),
            }
        );
    }

    #[test]
    fn test_invalid_values() {
        let err = Settings::from_env(&ctx(&[(CHEF_CONTEXT_CAPACITY, "many")])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        let err = Settings::from_env(&ctx(&[(CHEF_INSECURE, "maybe")])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
}
