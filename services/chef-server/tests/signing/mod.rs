use crate::mock::{
    authorization, client_key, client_public_key, header, CLIENT_PKCS8_PEM, GOLDEN_GET_NODES,
};
use chefsign_chef_server::{
    canonical_string, parse_private_key, ChefContext, ChefVersion, RequestSigner,
};
use chefsign_core::hash::{base64_decode, base64_sha1};
use chefsign_core::time::parse_chef_timestamp;
use chefsign_core::Result;
use chrono::TimeZone;
use http::Method;
use pretty_assertions::assert_eq;
use rand::{Rng, RngCore};
use rsa::Pkcs1v15Sign;

fn context(version: ChefVersion, key: rsa::RsaPrivateKey) -> ChefContext {
    ChefContext::builder()
        .with_server_id("srv-1")
        .with_base_uri("https://chef.example.com")
        .with_organization("default")
        .with_username("alice")
        .with_version(version)
        .with_key(key)
        .build()
        .expect("context must be valid")
}

#[test]
fn test_pkcs8_key_signs_like_pkcs1_key() -> Result<()> {
    let key = parse_private_key(CLIENT_PKCS8_PEM)?;
    let time = chrono::Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid time");

    let headers = RequestSigner::new().with_time(time).sign(
        &context(ChefVersion::V13, key),
        &Method::GET,
        "nodes",
        b"",
    )?;
    assert_eq!(authorization(&headers), GOLDEN_GET_NODES.trim());
    Ok(())
}

#[test]
fn test_signature_verifies_for_every_version_and_verb() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let public = client_public_key();
    let mut rng = rand::thread_rng();

    for version in [ChefVersion::V11, ChefVersion::V12, ChefVersion::V13] {
        let ctx = context(version, client_key());
        for method in [Method::GET, Method::DELETE, Method::POST, Method::PUT] {
            let mut body = vec![0u8; rng.gen_range(0..512)];
            rng.fill_bytes(&mut body);

            let headers = RequestSigner::new().sign(&ctx, &method, "nodes/web-1", &body)?;

            let hashed_body = header(&headers, "x-ops-content-hash");
            if method == Method::POST || method == Method::PUT {
                assert_eq!(hashed_body, base64_sha1(&body));
            } else {
                assert_eq!(hashed_body, base64_sha1(b""));
            }

            let timestamp = header(&headers, "x-ops-timestamp");
            parse_chef_timestamp(timestamp)?;

            let path = if version == ChefVersion::V11 {
                "/nodes/web-1".to_string()
            } else {
                "/organizations/default/nodes/web-1".to_string()
            };
            let expected = canonical_string(
                method.as_str(),
                &base64_sha1(path.as_bytes()),
                hashed_body,
                timestamp,
                "alice",
            )?;

            let signature = base64_decode(&authorization(&headers))?;
            public
                .verify(Pkcs1v15Sign::new_unprefixed(), expected.as_bytes(), &signature)
                .unwrap_or_else(|e| panic!("{version} {method} signature must verify: {e}"));
            assert_eq!(
                header(&headers, "x-chef-version"),
                version.client_version()
            );
        }
    }
    Ok(())
}

#[test]
fn test_concurrent_signing() {
    let ctx = context(ChefVersion::V12, client_key());
    let public = client_public_key();

    std::thread::scope(|s| {
        for i in 0..8 {
            let ctx = &ctx;
            let public = &public;
            s.spawn(move || {
                let resource = format!("nodes/web-{i}");
                let headers = RequestSigner::new()
                    .sign(ctx, &Method::GET, &resource, b"")
                    .expect("sign must succeed");

                let timestamp = header(&headers, "x-ops-timestamp");
                let expected = canonical_string(
                    "GET",
                    &base64_sha1(format!("/organizations/default/{resource}").as_bytes()),
                    &base64_sha1(b""),
                    timestamp,
                    "alice",
                )
                .expect("canonical string must build");
                let signature =
                    base64_decode(&authorization(&headers)).expect("signature must be base64");
                public
                    .verify(Pkcs1v15Sign::new_unprefixed(), expected.as_bytes(), &signature)
                    .expect("signature must verify");
            });
        }
    });
}
