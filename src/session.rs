//! Authenticated LMS session and the login, fetch, submit protocol.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER};
use reqwest::{multipart, Client, StatusCode};
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::extract;
use crate::progress::{ProgressForm, ProgressRecord};
use crate::target::TargetReference;
use crate::{LmsError, Result};

/// Browser profile presented to the LMS.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const JSON_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

/// Marker the LMS leaves in a 200 body when the session was silently
/// dropped and the response is the login page again.
const LOGIN_MARKER: &str = "Login";

const LOGIN_PATH: &str = "/Account/Login";
const UPDATE_PATH: &str = "/Learning/UpdateProgressData/";

/// Authenticated HTTP session against the LMS.
///
/// Owns the cookie-carrying client for the whole run. The protocol is a
/// strict request/response chain (login, fetch, submit) with no retries;
/// any failed step ends the run.
pub struct LmsSession {
    client: Client,
    config: Config,
}

impl LmsSession {
    /// Create the session client with the browser profile and cookie jar.
    pub fn new(config: Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));

        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.server.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    /// Run the full protocol against one target page and return the
    /// server's reply to the progress update.
    pub async fn run(
        &self,
        url: &str,
        target: &TargetReference,
        duration_override: Option<u64>,
    ) -> Result<String> {
        let user_id = self.login().await?;

        let html = self.fetch_target_page(url).await?;
        let video_id = extract::extract_video_id(&html).ok_or_else(|| {
            LmsError::Extraction("no video id found on the page, check the URL".to_string())
        })?;
        let duration = match duration_override {
            Some(seconds) => seconds,
            None => extract::extract_duration(&html),
        };
        info!("✅ Video id: {}, duration: {} seconds", video_id, duration);

        let record = ProgressRecord::synthesize(target, &video_id, &user_id, duration)?;
        info!("📤 Sending progress update ({} seconds)...", duration);
        self.submit_progress(url, record.form_fields()?).await
    }

    /// Fetch the login page, round-trip its anti-forgery token together
    /// with the credentials, and resolve the user id from the JSON reply.
    pub async fn login(&self) -> Result<String> {
        let login_url = self.endpoint(LOGIN_PATH);
        info!("🌐 Logging in to {}", self.config.server.base_url);

        let login_page = self.client.get(&login_url).send().await?.text().await?;
        let token = extract_verification_token(&login_page).ok_or_else(|| {
            LmsError::Auth("login page did not contain a verification token".to_string())
        })?;
        debug!("Verification token: {} chars", token.len());

        let form = [
            ("Username", self.config.credentials.username.as_str()),
            ("Password", self.config.credentials.password.as_str()),
            ("RememberMe", "true"),
            ("__RequestVerificationToken", token.as_str()),
        ];
        let body = self
            .client
            .post(&login_url)
            .form(&form)
            .send()
            .await?
            .text()
            .await?;

        let user_id = interpret_login_response(&body, &self.config.credentials.fallback_user_id)?;
        info!("✅ Login success (user id: {})", user_id);
        Ok(user_id)
    }

    async fn fetch_target_page(&self, url: &str) -> Result<String> {
        info!("🔍 Fetching video page: {}", url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, HTML_ACCEPT)
            .send()
            .await?
            .error_for_status()?;
        let html = response.text().await?;
        debug!("📄 Downloaded {} characters of HTML", html.len());
        Ok(html)
    }

    async fn submit_progress(&self, url: &str, fields: ProgressForm) -> Result<String> {
        let update_url = self.endpoint(UPDATE_PATH);

        // The server wants raw multipart framing; nothing is set on the
        // request beyond the boundary reqwest generates.
        let form = multipart::Form::new()
            .text("courseId", fields.course_id)
            .text("courseSectionModuleId", fields.course_section_module_id)
            .text("cb", fields.cb)
            .text("progressData", fields.progress_data);

        let response = self
            .client
            .post(&update_url)
            .header(REFERER, url)
            .header(ACCEPT, JSON_ACCEPT)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        interpret_submission_response(status, &body)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.server.base_url.trim_end_matches('/'), path)
    }
}

/// Login reply shape: `Success` / `Message` / `UserID`. The server sends
/// `UserID` as either a quoted string or a bare number.
#[derive(Debug, Deserialize)]
struct LoginReply {
    #[serde(rename = "Success")]
    success: Option<String>,
    #[serde(rename = "Message")]
    message: Option<String>,
    #[serde(rename = "UserID")]
    user_id: Option<Value>,
}

/// Pull the hidden `__RequestVerificationToken` value out of the login page.
pub fn extract_verification_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"input[name="__RequestVerificationToken"]"#).ok()?;
    document
        .select(&selector)
        .next()?
        .value()
        .attr("value")
        .map(|value| value.to_string())
}

/// Decide whether a login reply means success and resolve the user id,
/// falling back to the configured id when the server omits `UserID`.
pub fn interpret_login_response(body: &str, fallback_user_id: &str) -> Result<String> {
    let reply: LoginReply = serde_json::from_str(body)
        .map_err(|_| LmsError::Auth(format!("unexpected login response: {}", excerpt(body, 100))))?;

    if reply.success.as_deref() != Some("Success") {
        let message = reply
            .message
            .unwrap_or_else(|| "no message from server".to_string());
        return Err(LmsError::Auth(message));
    }

    match reply.user_id {
        Some(Value::String(id)) if !id.is_empty() => Ok(id),
        Some(Value::Number(id)) => Ok(id.to_string()),
        // The server sometimes omits UserID on an otherwise successful
        // login; the configured fallback may submit under the wrong user.
        _ => {
            warn!("⚠️ Login reply had no user id, using the configured fallback");
            Ok(fallback_user_id.to_string())
        }
    }
}

/// A 200 whose body still contains the login marker means the session was
/// dropped and the update did not land.
pub fn interpret_submission_response(status: StatusCode, body: &str) -> Result<String> {
    if status == StatusCode::OK && !body.contains(LOGIN_MARKER) {
        Ok(body.to_string())
    } else {
        Err(LmsError::Submission(format!(
            "{} - {}",
            status.as_u16(),
            excerpt(body, 100)
        )))
    }
}

fn excerpt(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}
