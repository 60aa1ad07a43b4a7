//! Attribution end to end: config layering -> token resolution -> audited save.

use figment::Jail;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use mh_auth::{ActorResolver, AuthError};
use mh_config::MhConfig;
use mh_db::repos::audit::AuditFilter;
use mh_db::service::MhService;

const SECRET: &str = "attribution-test-secret";

fn load_config() -> MhConfig {
    let mut loaded = None;
    Jail::expect_with(|jail| {
        jail.set_env("MH_AUTH__JWT_SECRET", SECRET);
        jail.set_env("MH_AUTH__ISSUER", "mhouse-tests");
        loaded = Some(MhConfig::load().map_err(|e| figment::Error::from(e.to_string()))?);
        Ok(())
    });
    loaded.unwrap()
}

fn bearer(claims: &serde_json::Value) -> String {
    let key = EncodingKey::from_secret(SECRET.as_bytes());
    let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &key).unwrap();
    format!("Bearer {token}")
}

fn exp() -> i64 {
    chrono::Utc::now().timestamp() + 600
}

#[tokio::test]
async fn resolved_user_is_written_to_the_audit_trail() {
    let config = load_config();
    let resolver = ActorResolver::new(&config.auth);
    let svc = MhService::new_local(":memory:").await.unwrap();
    let cancel = CancellationToken::new();

    let user = resolver
        .resolve(Some(&bearer(
            &json!({ "UserId": "site-lead", "iss": "mhouse-tests", "exp": exp() }),
        )))
        .unwrap();
    let system = resolver.resolve(None).unwrap();

    svc.create_post("Crane", 3.0, &user, &cancel).await.unwrap();
    svc.create_post("Mixer", 1.0, &system, &cancel).await.unwrap();

    let audits = svc.query_audit(&AuditFilter::default()).await.unwrap();
    let authors: Vec<Option<&str>> = audits
        .iter()
        .map(|a| a.change_author_id.as_deref())
        .collect();
    assert_eq!(authors, vec![Some("site-lead"), None]);

    let wrong_issuer = resolver.resolve(Some(&bearer(
        &json!({ "UserId": "site-lead", "iss": "elsewhere", "exp": exp() }),
    )));
    assert!(matches!(wrong_issuer, Err(AuthError::TokenInvalid(_))));
}
