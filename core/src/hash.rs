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

//! Hash related utils.

use crate::Error;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use sha1::Digest;
use sha1::Sha1;

/// Base64 encode
pub fn base64_encode(content: &[u8]) -> String {
    BASE64_STANDARD.encode(content)
}

/// Base64 decode
pub fn base64_decode(content: &str) -> crate::Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(content)
        .map_err(|e| Error::unexpected("base64 decode failed").with_source(e))
}

/// Base64 encoded SHA1 hash.
///
/// This is the digest Chef uses for both the hashed path and the content hash.
/// An empty input still hashes, it never short-circuits to an empty string.
pub fn base64_sha1(content: &[u8]) -> String {
    base64_encode(Sha1::digest(content).as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_base64_sha1_empty() {
        // SHA1 of the empty byte sequence.
        assert_eq!(base64_sha1(b""), "2jmj7l5rSw0yVb/vlWAYkK/YBwk=");
    }

    #[test]
    fn test_base64_sha1_is_deterministic() {
        let body = br#"{"name":"web-1","run_list":["role[base]"]}"#;
        assert_eq!(base64_sha1(body), base64_sha1(body));
        assert_ne!(base64_sha1(body), base64_sha1(b""));
    }

    #[test]
    fn test_base64_sha1_known_value() {
        assert_eq!(base64_sha1(b"abc"), "qZk+NkcGgWq6PiVxeFDCbJzQ2J0=");
    }

    #[test]
    fn test_base64_roundtrip() {
        let encoded = base64_encode(b"chef");
        assert_eq!(base64_decode(&encoded).unwrap(), b"chef");
        assert!(base64_decode("not base64!").is_err());
    }
}
