use chefsign_core::{utils::unescape_java, Error, Result};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;

/// Parse the private key of a Chef client.
///
/// Chef hands out PKCS#1 keys (`BEGIN RSA PRIVATE KEY`), PKCS#8 is accepted too.
/// Escaped material (literal `\n`) is unescaped first.
pub fn parse_private_key(material: &str) -> Result<RsaPrivateKey> {
    let pem = unescape_java(material.trim());

    if pem.contains("BEGIN RSA PRIVATE KEY") {
        return RsaPrivateKey::from_pkcs1_pem(&pem)
            .map_err(|e| Error::key_invalid("failed to parse PKCS#1 private key").with_source(e));
    }

    RsaPrivateKey::from_pkcs8_pem(&pem)
        .map_err(|e| Error::key_invalid("failed to parse PKCS#8 private key").with_source(e))
}
