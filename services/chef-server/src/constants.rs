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

// Headers used in chef signing.
pub const X_OPS_TIMESTAMP: &str = "X-Ops-Timestamp";
pub const X_OPS_USERID: &str = "X-Ops-Userid";
pub const X_OPS_CONTENT_HASH: &str = "X-Ops-Content-Hash";
pub const X_OPS_SIGN: &str = "X-Ops-Sign";
pub const X_OPS_SERVER_API_VERSION: &str = "X-Ops-Server-API-Version";
pub const X_OPS_AUTHORIZATION_PREFIX: &str = "X-Ops-Authorization-";
pub const X_CHEF_VERSION: &str = "X-Chef-Version";

// Fixed header values.
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const SIGN_VERSION: &str = "version=1.0";
pub const SERVER_API_VERSION: &str = "1";
pub const ACCEPT_ENCODING_PREFERENCE: &str = "gzip;q=1.0,deflate;q=0.6,identity;q=0.3";

/// Chef can't carry the signature in one header, it is split into chunks of this width.
pub const AUTHORIZATION_CHUNK_WIDTH: usize = 60;

/// Blob service references look like `/files/{token}/...pem`.
pub const BLOB_PATH_PREFIX: &str = "/files/";
pub const BLOB_KEY_SUFFIX: &str = "pem";

// Env values used to configure chefsign.
pub const CHEF_INSECURE: &str = "CHEF_INSECURE";
pub const CHEF_CONTEXT_TTL_SECS: &str = "CHEF_CONTEXT_TTL_SECS";
pub const CHEF_CONTEXT_CAPACITY: &str = "CHEF_CONTEXT_CAPACITY";
pub const CHEF_PROJECT_CLIENT_TTL_SECS: &str = "CHEF_PROJECT_CLIENT_TTL_SECS";
pub const CHEF_PROJECT_CLIENT_CAPACITY: &str = "CHEF_PROJECT_CLIENT_CAPACITY";
pub const CHEF_ZONE_CLIENT_TTL_SECS: &str = "CHEF_ZONE_CLIENT_TTL_SECS";
pub const CHEF_ZONE_CLIENT_CAPACITY: &str = "CHEF_ZONE_CLIENT_CAPACITY";
pub const CHEF_CONNECT_TIMEOUT_SECS: &str = "CHEF_CONNECT_TIMEOUT_SECS";
pub const CHEF_READ_TIMEOUT_SECS: &str = "CHEF_READ_TIMEOUT_SECS";
