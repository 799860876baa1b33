use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::model::{
    Ack, Application, ApplicationDetail, ApplicationList, ApplyReceipt, Profile, ProfileUpdate,
    SkillList, Tender, TenderDetail, TenderList,
};

/// Error-body fields checked for a server-supplied message, in order.
const ERROR_FIELDS: [&str; 2] = ["detail", "message"];
const DEFAULT_ERROR: &str = "Ошибка";

/// HTTP client for the mini-app backend. Every request carries the
/// host-supplied init data as an identity assertion header.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    init_data: String,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// The backend surface the engine consumes. `ApiClient` is the real
/// implementation; tests substitute a recording stub.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn me(&self) -> Result<Profile>;
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<()>;
    async fn tenders(&self) -> Result<Vec<Tender>>;
    async fn tender(&self, id: i64) -> Result<TenderDetail>;
    async fn apply_to_tender(&self, id: i64) -> Result<ApplyReceipt>;
    async fn applications(&self) -> Result<Vec<Application>>;
    async fn application(&self, id: i64) -> Result<ApplicationDetail>;
    async fn skills(&self) -> Result<Vec<String>>;
}

impl ApiClient {
    pub fn new(mut base_url: Url, init_data: String) -> Self {
        // Url::join drops the last path segment unless it ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder()
            .user_agent("tender-miniapp/0.1")
            .no_proxy()
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url,
            init_data,
        }
    }

    /// Assemble a request for `path` (e.g. `/api/me`) under the `/miniapp`
    /// prefix with the identity and content-type headers set.
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Request> {
        let endpoint = self
            .base_url
            .join(&format!("miniapp{}", path))
            .context("invalid backend base URL")?;
        let mut builder = self
            .http
            .request(method, endpoint)
            .header("X-Telegram-Init-Data", &self.init_data)
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder.build().context("failed to build backend request")
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let request = self.build_request(method, path, body)?;
        debug!(method = %request.method(), url = %request.url(), "calling backend");
        let res = self
            .http
            .execute(request)
            .await
            .map_err(|err| anyhow!("request failed: {err}"))?;

        let status = res.status();
        if !status.is_success() {
            let body: Value = res.json().await.unwrap_or(Value::Null);
            return Err(anyhow!("{}", error_message(status, &body)));
        }

        res.json::<T>()
            .await
            .map_err(|err| anyhow!("invalid response from backend: {err}"))
    }

    pub async fn me(&self) -> Result<Profile> {
        self.call(Method::GET, "/api/me", None).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<()> {
        let body = serde_json::to_value(update).context("failed to encode profile update")?;
        let _: Ack = self.call(Method::PATCH, "/api/profile", Some(&body)).await?;
        Ok(())
    }

    pub async fn tenders(&self) -> Result<Vec<Tender>> {
        let list: TenderList = self.call(Method::GET, "/api/tenders", None).await?;
        Ok(list.tenders)
    }

    pub async fn tender(&self, id: i64) -> Result<TenderDetail> {
        self.call(Method::GET, &format!("/api/tenders/{id}"), None)
            .await
    }

    pub async fn apply_to_tender(&self, id: i64) -> Result<ApplyReceipt> {
        self.call(Method::POST, &format!("/api/tenders/{id}/apply"), None)
            .await
    }

    pub async fn applications(&self) -> Result<Vec<Application>> {
        let list: ApplicationList = self.call(Method::GET, "/api/applications", None).await?;
        Ok(list.applications)
    }

    pub async fn application(&self, id: i64) -> Result<ApplicationDetail> {
        self.call(Method::GET, &format!("/api/applications/{id}"), None)
            .await
    }

    pub async fn skills(&self) -> Result<Vec<String>> {
        let list: SkillList = self.call(Method::GET, "/api/skills", None).await?;
        Ok(list.skills)
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn me(&self) -> Result<Profile> {
        ApiClient::me(self).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<()> {
        ApiClient::update_profile(self, update).await
    }

    async fn tenders(&self) -> Result<Vec<Tender>> {
        ApiClient::tenders(self).await
    }

    async fn tender(&self, id: i64) -> Result<TenderDetail> {
        ApiClient::tender(self, id).await
    }

    async fn apply_to_tender(&self, id: i64) -> Result<ApplyReceipt> {
        ApiClient::apply_to_tender(self, id).await
    }

    async fn applications(&self) -> Result<Vec<Application>> {
        ApiClient::applications(self).await
    }

    async fn application(&self, id: i64) -> Result<ApplicationDetail> {
        ApiClient::application(self, id).await
    }

    async fn skills(&self) -> Result<Vec<String>> {
        ApiClient::skills(self).await
    }
}

/// Extract a human-readable message from a failed response. Falls back to
/// the status reason, then to a generic default, so no failure path ever
/// yields an empty message.
fn error_message(status: StatusCode, body: &Value) -> String {
    for field in ERROR_FIELDS {
        if let Some(msg) = body.get(field).and_then(Value::as_str) {
            if !msg.is_empty() {
                return msg.to_string();
            }
        }
    }
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_ERROR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> ApiClient {
        ApiClient::new(
            Url::parse("https://example.com").unwrap(),
            "query_id=abc".into(),
        )
    }

    #[test]
    fn build_request_sets_identity_and_content_type() {
        let request = client()
            .build_request(Method::GET, "/api/me", None)
            .unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.url().path(), "/miniapp/api/me");
        let headers = request.headers();
        assert_eq!(
            headers
                .get("X-Telegram-Init-Data")
                .and_then(|h| h.to_str().ok())
                .unwrap(),
            "query_id=abc"
        );
        assert_eq!(
            headers
                .get("Content-Type")
                .and_then(|h| h.to_str().ok())
                .unwrap(),
            "application/json"
        );
    }

    #[test]
    fn build_request_keeps_base_path_prefix() {
        let client = ApiClient::new(
            Url::parse("https://example.com/bots/tender").unwrap(),
            String::new(),
        );
        let request = client
            .build_request(Method::POST, "/api/tenders/7/apply", None)
            .unwrap();
        assert_eq!(request.url().path(), "/bots/tender/miniapp/api/tenders/7/apply");
    }

    #[test]
    fn build_request_attaches_json_body() {
        let body = json!({"full_name": "Иван"});
        let request = client()
            .build_request(Method::PATCH, "/api/profile", Some(&body))
            .unwrap();
        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap();
        let sent: Value = serde_json::from_slice(bytes).unwrap();
        assert_eq!(sent, body);
    }

    #[test]
    fn error_message_prefers_detail_then_message() {
        let body = json!({"detail": "Already applied", "message": "ignored"});
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, &body),
            "Already applied"
        );

        let body = json!({"message": "User not found"});
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, &body),
            "User not found"
        );
    }

    #[test]
    fn error_message_falls_back_to_status_then_default() {
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, &Value::Null),
            "Not Found"
        );
        assert_eq!(error_message(StatusCode::NOT_FOUND, &json!({})), "Not Found");
        // 599 has no canonical reason phrase.
        let status = StatusCode::from_u16(599).unwrap();
        assert_eq!(error_message(status, &Value::Null), "Ошибка");
    }

    #[test]
    fn error_message_skips_empty_fields() {
        let body = json!({"detail": "", "message": "fallback"});
        assert_eq!(error_message(StatusCode::BAD_REQUEST, &body), "fallback");
    }
}
