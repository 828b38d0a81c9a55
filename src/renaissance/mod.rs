//! Client for the student-portal JSON API.
//!
//! The portal issues a bearer token plus client/user ids once a student signs
//! in. Obtaining them is outside this crate; [`Session`] carries them in.

pub mod errors;
pub mod json;
pub mod models;

pub use errors::RenaissanceApiError;
pub use models::QuizItem;

use anyhow::Context;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, trace};
use url::Url;

use self::json::parse_json_with_context;
use self::models::{InboxItems, InboxQuery, SchoolYearId, StudentInbox};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const TOPS_REPORT_PATH: &str = "/studentprogress/api/topsreport/gettopsreport";

/// Items requested per inbox page.
const INBOX_PAGE_SIZE: u32 = 100;

/// Credentials of a signed-in student.
#[derive(Clone)]
pub struct Session {
    pub bearer_token: String,
    pub client_id: String,
    pub user_id: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("bearer_token", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("user_id", &self.user_id)
            .finish()
    }
}

fn header_value(value: &str, name: &str) -> anyhow::Result<HeaderValue> {
    HeaderValue::from_str(value).with_context(|| format!("Invalid characters in {name} header"))
}

/// Headers sent with every API call.
fn session_headers(base_url: &Url, session: &Session) -> anyhow::Result<HeaderMap> {
    let origin = base_url.origin().ascii_serialization();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        header_value(&format!("Bearer {}", session.bearer_token), "Authorization")?,
    );
    headers.insert(ORIGIN, header_value(&origin, "Origin")?);
    headers.insert(
        REFERER,
        header_value(&format!("{origin}/studentportal/"), "Referer")?,
    );
    headers.insert(
        HeaderName::from_static("rli-clientid"),
        header_value(&session.client_id, "rli-clientid")?,
    );
    headers.insert(
        HeaderName::from_static("rli-userid"),
        header_value(&session.user_id, "rli-userid")?,
    );
    Ok(headers)
}

pub struct RenaissanceApi {
    http: reqwest::Client,
    base_url: Url,
    user_id: String,
}

impl RenaissanceApi {
    pub fn new(base_url: &str, session: &Session, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url).context("Invalid portal base URL")?;
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(session_headers(&base_url, session)?)
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url,
            user_id: session.user_id.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RenaissanceApiError> {
        Ok(self
            .base_url
            .join(path)
            .with_context(|| format!("Invalid endpoint path {path}"))?)
    }

    /// Report URL with `activity_id` appended as one percent-encoded path segment.
    fn tops_report_url(&self, activity_id: &str) -> Result<Url, RenaissanceApiError> {
        if matches!(activity_id.trim(), "" | "." | "..") {
            return Err(anyhow::anyhow!("Invalid activity id {activity_id:?}").into());
        }

        let mut url = self.endpoint(TOPS_REPORT_PATH)?;
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("Portal base URL cannot carry a path"))?
            .pop_if_empty()
            .push(activity_id);
        Ok(url)
    }

    /// Send a request and decode a 2xx JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<T, RenaissanceApiError> {
        let resp = request
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RenaissanceApiError::InvalidSession(format!(
                "{url} returned {status}"
            )));
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("{url} returned {status}: {text}").into());
        }

        let body = resp
            .text()
            .await
            .with_context(|| format!("Failed to read body from {url}"))?;
        trace!(url = %url, bytes = body.len(), "Received response");

        parse_json_with_context(&body).map_err(|source| RenaissanceApiError::ParseFailed {
            status: status.as_u16(),
            url: url.to_string(),
            source,
        })
    }

    /// Current school year of the student's inbox, if the portal reports one.
    pub async fn student_inbox(&self) -> Result<Option<SchoolYearId>, RenaissanceApiError> {
        let url = self.endpoint("/assignmentplatformservice/StudentInbox")?;
        let request = self
            .http
            .post(url.clone())
            .json(&InboxQuery::inbox(&self.user_id));

        let inbox: StudentInbox = self.send(request, &url).await?;
        Ok(inbox.current_school_year.map(|year| year.id))
    }

    /// Quizzes listed in the inbox for `school_year`, in listing order.
    pub async fn inbox_items(
        &self,
        school_year: &SchoolYearId,
    ) -> Result<Vec<QuizItem>, RenaissanceApiError> {
        let url = self.endpoint("/assignmentplatformservice/StudentInboxItems")?;
        let request = self.http.post(url.clone()).json(&InboxQuery::items(
            &self.user_id,
            school_year,
            INBOX_PAGE_SIZE,
        ));

        let items: InboxItems = self.send(request, &url).await?;
        let quizzes = items.into_quiz_items();
        info!(count = quizzes.len(), "Fetched inbox quiz list");
        Ok(quizzes)
    }

    /// Raw TOPS report payload for one quiz activity.
    pub async fn tops_report(
        &self,
        activity_id: &str,
    ) -> Result<serde_json::Value, RenaissanceApiError> {
        let url = self.tops_report_url(activity_id)?;
        debug!(activity_id, "Fetching TOPS report");
        self.send(self.http.get(url.clone()), &url).await
    }
}
