#[cfg(test)]
#[path = "lectern_api_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::ChatReply;
use crate::domain::models::ChatRequest;
use crate::domain::models::ClientError;
use crate::domain::models::Course;
use crate::domain::models::DeckSession;
use crate::domain::models::Extraction;
use crate::domain::models::NewSummary;
use crate::domain::models::Registration;
use crate::domain::models::SavedSummary;
use crate::domain::models::SessionContext;
use crate::domain::models::Slide;
use crate::domain::models::SlideSummary;
use crate::domain::models::StudyItem;
use crate::domain::models::StudyKind;
use crate::domain::models::UserProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct CourseRequest<'a> {
    name: &'a str,
    subject: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct ExtractedSlide {
    page: u32,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct ExtractResponse {
    session_id: String,
    #[serde(default)]
    slides: Vec<ExtractedSlide>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct SlideSummaryResponse {
    page: u32,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    used_slides: Option<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct GenerateRequest<'a> {
    session_text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: serde_json::Value,
}

/// Detail text of a failed response. FastAPI style bodies carry either a
/// string or a list of validation errors under `detail`.
fn error_detail(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(err) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(detail) = err.detail.as_str() {
            return detail.to_string();
        }
        if let Some(first) = err.detail.as_array().and_then(|items| return items.first()) {
            if let Some(msg) = first.get("msg").and_then(|msg| return msg.as_str()) {
                return msg.to_string();
            }
        }
        if !err.detail.is_null() {
            return err.detail.to_string();
        }
    }

    if !body.trim().is_empty() && body.len() < 200 {
        return body.trim().to_string();
    }

    return status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string();
}

/// Decodes a response body. Non-success statuses and success bodies carrying
/// an `error` field both become a `ClientError`.
async fn parse<T: DeserializeOwned>(res: reqwest::Response) -> Result<T> {
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        let detail = error_detail(status, &body);
        tracing::error!(status = status.as_u16(), detail = %detail, "request failed");
        return Err(ClientError::Server {
            status: status.as_u16(),
            detail,
        }
        .into());
    }

    let value = serde_json::from_str::<serde_json::Value>(&body)?;
    if let Some(error) = value.get("error").and_then(|error| return error.as_str()) {
        if !error.trim().is_empty() {
            tracing::error!(error = %error, "request rejected");
            return Err(ClientError::Rejected(error.to_string()).into());
        }
    }

    return Ok(serde_json::from_value::<T>(value)?);
}

pub struct LecternApi {
    url: String,
    client: reqwest::Client,
}

impl LecternApi {
    pub fn new(url: &str, timeout: Duration) -> Result<LecternApi> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        return Ok(LecternApi {
            url: url.trim_end_matches('/').to_string(),
            client,
        });
    }

    pub fn from_config() -> Result<LecternApi> {
        let timeout = Config::get(ConfigKey::RequestTimeout).parse::<u64>()?;
        return LecternApi::new(
            &Config::get(ConfigKey::ApiURL),
            Duration::from_millis(timeout),
        );
    }

    fn endpoint(&self, path: &str) -> String {
        return format!("{url}{path}", url = self.url);
    }
}

#[async_trait]
impl Backend for LecternApi {
    #[allow(clippy::implicit_return)]
    async fn verify_identity(&self, token: &str) -> Result<UserProfile> {
        let res = self
            .client
            .get(self.endpoint("/api/auth/me"))
            .bearer_auth(token)
            .send()
            .await?;

        return parse::<UserProfile>(res).await;
    }

    #[allow(clippy::implicit_return)]
    async fn login(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.endpoint("/api/auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        return Ok(parse::<TokenResponse>(res).await?.access_token);
    }

    #[allow(clippy::implicit_return)]
    async fn register(&self, registration: &Registration) -> Result<UserProfile> {
        let res = self
            .client
            .post(self.endpoint("/api/auth/register"))
            .json(registration)
            .send()
            .await?;

        return parse::<UserProfile>(res).await;
    }

    #[allow(clippy::implicit_return)]
    async fn list_courses(&self, token: &str) -> Result<Vec<Course>> {
        let res = self
            .client
            .get(self.endpoint("/api/courses"))
            .bearer_auth(token)
            .send()
            .await?;

        return parse::<Vec<Course>>(res).await;
    }

    #[allow(clippy::implicit_return)]
    async fn create_course(&self, token: &str, name: &str, subject: Option<&str>) -> Result<Course> {
        let res = self
            .client
            .post(self.endpoint("/api/courses"))
            .bearer_auth(token)
            .json(&CourseRequest { name, subject })
            .send()
            .await?;

        return parse::<Course>(res).await;
    }

    #[allow(clippy::implicit_return)]
    async fn list_summaries(&self, token: &str, course_id: i64) -> Result<Vec<SavedSummary>> {
        let res = self
            .client
            .get(self.endpoint("/api/summaries"))
            .query(&[("course_id", course_id)])
            .bearer_auth(token)
            .send()
            .await?;

        return parse::<Vec<SavedSummary>>(res).await;
    }

    #[allow(clippy::implicit_return)]
    async fn save_summary(&self, token: &str, summary: &NewSummary) -> Result<SavedSummary> {
        let res = self
            .client
            .post(self.endpoint("/api/summaries"))
            .bearer_auth(token)
            .json(summary)
            .send()
            .await?;

        return parse::<SavedSummary>(res).await;
    }

    #[allow(clippy::implicit_return)]
    async fn extract(&self, file_name: &str, bytes: Vec<u8>) -> Result<Extraction> {
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let res = self
            .client
            .post(self.endpoint("/api/extract"))
            .multipart(form)
            .send()
            .await?;

        let extracted = parse::<ExtractResponse>(res).await?;
        let slides = extracted
            .slides
            .into_iter()
            .map(|slide| {
                return Slide {
                    page: slide.page,
                    title: slide.title.unwrap_or_default(),
                    text: slide.text.unwrap_or_default(),
                    bullets: vec![],
                };
            })
            .collect::<Vec<Slide>>();

        return Ok(Extraction {
            session: DeckSession::new(&extracted.session_id),
            slides,
        });
    }

    #[allow(clippy::implicit_return)]
    async fn summarize_slide(&self, session: &DeckSession, slide: &Slide) -> Result<SlideSummary> {
        let form = multipart::Form::new()
            .text("session_id", session.id.to_string())
            .text("page", slide.page.to_string())
            .text("title", slide.title.to_string())
            .text("text", slide.text.to_string());

        let res = self
            .client
            .post(self.endpoint("/api/summarize/slide"))
            .multipart(form)
            .send()
            .await?;

        let summary = parse::<SlideSummaryResponse>(res).await?;
        return Ok(SlideSummary {
            page: summary.page,
            title: summary.title.unwrap_or_default(),
            bullets: summary.bullets,
        });
    }

    #[allow(clippy::implicit_return)]
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        let mut form = multipart::Form::new().text("message", request.message.to_string());
        if let Some(session_id) = &request.session_id {
            form = form.text("session_id", session_id.to_string());
        }
        if let Some(course_id) = request.course_id {
            form = form.text("course_id", course_id.to_string());
        }

        let mut req = self
            .client
            .post(self.endpoint("/api/chat"))
            .multipart(form);
        if let Some(token) = &request.token {
            req = req.bearer_auth(token);
        }

        let reply = parse::<ChatResponse>(req.send().await?).await?;
        return Ok(ChatReply::from_fields(
            reply.response,
            reply.summary,
            reply.session_id,
            reply.used_slides.unwrap_or_default(),
        ));
    }

    #[allow(clippy::implicit_return)]
    async fn session_context(&self, session: &DeckSession) -> Result<SessionContext> {
        let res = self
            .client
            .get(self.endpoint(&format!("/api/debug/session/{}", session.id)))
            .send()
            .await?;

        return parse::<SessionContext>(res).await;
    }

    #[allow(clippy::implicit_return)]
    async fn generate(
        &self,
        token: &str,
        kind: StudyKind,
        course_id: i64,
        session_text: &str,
    ) -> Result<String> {
        let res = self
            .client
            .post(self.endpoint(&format!("/api/{}/{course_id}", kind.path())))
            .bearer_auth(token)
            .json(&GenerateRequest { session_text })
            .send()
            .await?;

        return Ok(parse::<GenerateResponse>(res).await?.content);
    }

    #[allow(clippy::implicit_return)]
    async fn list_study_items(
        &self,
        token: &str,
        kind: StudyKind,
        course_id: i64,
    ) -> Result<Vec<StudyItem>> {
        let res = self
            .client
            .get(self.endpoint(&format!("/api/courses/{course_id}/{}", kind.path())))
            .bearer_auth(token)
            .send()
            .await?;

        return parse::<Vec<StudyItem>>(res).await;
    }
}
