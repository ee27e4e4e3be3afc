use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("identity provider rejected the token with status {0}")]
    Rejected(reqwest::StatusCode),

    #[error("identity provider returned no user for the token")]
    UnknownUser,

    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Identity behind a verified token.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedUser {
    pub uid: String,
    pub email: Option<String>,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedUser, VerifyError>;
}

/// The parts of a Firebase service-account bundle the API cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
}

impl ServiceAccount {
    pub fn from_file(path: &Path) -> anyhow::Result<ServiceAccount> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read service account {}", path.display()))?;
        let account = serde_json::from_str(&contents)
            .with_context(|| format!("malformed service account {}", path.display()))?;
        Ok(account)
    }
}

/// Verifies ID tokens by asking the Identity Toolkit which account they belong to. Tokens
/// are never decoded locally.
#[derive(Debug, Clone)]
pub struct FirebaseVerifier {
    http: reqwest::Client,
    lookup_url: String,
    api_key: String,
    project_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: Option<String>,
}

impl FirebaseVerifier {
    pub fn new(service_account: ServiceAccount, api_key: String, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            lookup_url: format!("{base_url}/accounts:lookup"),
            api_key,
            project_id: service_account.project_id,
        }
    }
}

#[async_trait]
impl TokenVerifier for FirebaseVerifier {
    #[tracing::instrument(skip_all, fields(project = %self.project_id))]
    async fn verify(&self, token: &str) -> Result<VerifiedUser, VerifyError> {
        let response = self
            .http
            .post(&self.lookup_url)
            .query(&[("key", &self.api_key)])
            .json(&LookupRequest { id_token: token })
            .send()
            .await?;

        // expired, revoked and malformed tokens all come back as 400
        if !response.status().is_success() {
            return Err(VerifyError::Rejected(response.status()));
        }

        let body = response.json::<LookupResponse>().await?;
        let user = body
            .users
            .into_iter()
            .next()
            .ok_or(VerifyError::UnknownUser)?;

        Ok(VerifiedUser {
            uid: user.local_id,
            email: user.email,
        })
    }
}

/// Token part of an `Authorization` header value, i.e. the second space separated segment.
pub fn bearer_token(header: &str) -> Option<&str> {
    header.split(' ').nth(1).filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;

    const API_KEY: &str = "web-key";

    async fn accounts_lookup(
        Query(params): Query<HashMap<String, String>>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        if params.get("key").map(String::as_str) != Some(API_KEY) {
            let error = json!({ "error": { "code": 403, "message": "API key not valid." } });
            return (StatusCode::FORBIDDEN, Json(error));
        }

        match body["idToken"].as_str() {
            Some("good-token") => (
                StatusCode::OK,
                Json(json!({
                    "kind": "identitytoolkit#GetAccountInfoResponse",
                    "users": [{ "localId": "uid-1", "email": "a@x.com", "emailVerified": true }],
                })),
            ),
            Some("deleted-user-token") => (
                StatusCode::OK,
                Json(json!({ "kind": "identitytoolkit#GetAccountInfoResponse" })),
            ),
            _ => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": { "code": 400, "message": "INVALID_ID_TOKEN" } })),
            ),
        }
    }

    /// Serves `accounts:lookup` on an ephemeral port and returns the API base url.
    async fn spawn_identity_toolkit() -> String {
        let app = Router::new().route("/v1/accounts:lookup", post(accounts_lookup));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}/v1")
    }

    fn verifier(api_key: &str, base_url: &str) -> FirebaseVerifier {
        let account = ServiceAccount {
            project_id: "plate-share".to_string(),
        };
        FirebaseVerifier::new(account, api_key.to_string(), base_url)
    }

    #[tokio::test]
    async fn verify_resolves_the_token_owner() {
        let base_url = spawn_identity_toolkit().await;
        let sut = verifier(API_KEY, &base_url);

        let user = sut.verify("good-token").await.unwrap();

        assert_eq!(
            user,
            VerifiedUser {
                uid: "uid-1".to_string(),
                email: Some("a@x.com".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn verify_maps_provider_failures() {
        let base_url = spawn_identity_toolkit().await;
        let sut = verifier(API_KEY, &base_url);

        let err = sut.verify("expired-token").await.unwrap_err();
        assert!(
            matches!(err, VerifyError::Rejected(status) if status == StatusCode::BAD_REQUEST),
            "{err}"
        );

        let err = sut.verify("deleted-user-token").await.unwrap_err();
        assert!(matches!(err, VerifyError::UnknownUser), "{err}");

        let err = verifier("wrong-key", &base_url)
            .verify("good-token")
            .await
            .unwrap_err();
        assert!(
            matches!(err, VerifyError::Rejected(status) if status == StatusCode::FORBIDDEN),
            "{err}"
        );
    }

    #[test]
    fn extracts_second_segment() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc.def"), None);
    }

    #[test]
    fn reads_project_from_service_account() {
        let account: ServiceAccount = serde_json::from_str(
            r#"{
                "type": "service_account",
                "project_id": "plate-share",
                "private_key_id": "1",
                "client_email": "admin@plate-share.iam.gserviceaccount.com"
            }"#,
        )
        .unwrap();

        let verifier = FirebaseVerifier::new(account, "key".to_string(), "http://localhost/v1");
        assert_eq!(verifier.project_id, "plate-share");
        assert_eq!(verifier.lookup_url, "http://localhost/v1/accounts:lookup");
    }

    #[test]
    fn missing_service_account_is_reported() {
        let err = ServiceAccount::from_file(Path::new("/nonexistent/serviceKey.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read service account"));
    }
}
