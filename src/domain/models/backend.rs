#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Course;
use super::DeckSession;
use super::Extraction;
use super::NewSummary;
use super::SavedSummary;
use super::Slide;
use super::SlideSummary;
use super::StudyItem;
use super::StudyKind;
use super::UserProfile;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Registration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
    pub course_id: Option<i64>,
    pub token: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyKind {
    Answer,
    Summary,
}

/// A chat reply, tagged at the client boundary so callers never have to guess
/// which of the backend's fields carried the text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatReply {
    pub kind: ReplyKind,
    pub text: String,
    pub session_id: Option<String>,
    pub used_slides: Vec<u32>,
}

impl ChatReply {
    pub fn from_fields(
        response: Option<String>,
        summary: Option<String>,
        session_id: Option<String>,
        used_slides: Vec<u32>,
    ) -> ChatReply {
        let non_empty = |value: Option<String>| {
            return value.filter(|text| return !text.trim().is_empty());
        };

        let (kind, text) = if let Some(text) = non_empty(response) {
            (ReplyKind::Answer, text)
        } else if let Some(text) = non_empty(summary) {
            (ReplyKind::Summary, text)
        } else {
            (ReplyKind::Answer, "(no response)".to_string())
        };

        return ChatReply {
            kind,
            text,
            session_id,
            used_slides,
        };
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SessionContext {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub pptx_text_preview: Option<String>,
}

impl SessionContext {
    /// Text the backend kept for the deck: its summary when present, otherwise
    /// the raw preview. Empty when neither holds anything.
    pub fn retained_text(&self) -> String {
        for candidate in [&self.summary, &self.pptx_text_preview].into_iter().flatten() {
            if !candidate.trim().is_empty() {
                return candidate.to_string();
            }
        }

        return "".to_string();
    }
}

/// Everything the orchestrator needs from the server. Each method is a single
/// request; nothing here retries.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Resolves the user a bearer token belongs to.
    async fn verify_identity(&self, token: &str) -> Result<UserProfile>;

    /// Exchanges credentials for a bearer token.
    async fn login(&self, email: &str, password: &str) -> Result<String>;

    async fn register(&self, registration: &Registration) -> Result<UserProfile>;

    async fn list_courses(&self, token: &str) -> Result<Vec<Course>>;

    async fn create_course(&self, token: &str, name: &str, subject: Option<&str>) -> Result<Course>;

    async fn list_summaries(&self, token: &str, course_id: i64) -> Result<Vec<SavedSummary>>;

    async fn save_summary(&self, token: &str, summary: &NewSummary) -> Result<SavedSummary>;

    /// Uploads the raw deck. The returned slides are in deck order and may be
    /// empty.
    async fn extract(&self, file_name: &str, bytes: Vec<u8>) -> Result<Extraction>;

    async fn summarize_slide(&self, session: &DeckSession, slide: &Slide) -> Result<SlideSummary>;

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply>;

    async fn session_context(&self, session: &DeckSession) -> Result<SessionContext>;

    /// Generates a quiz or assignment for a course and returns its content.
    async fn generate(
        &self,
        token: &str,
        kind: StudyKind,
        course_id: i64,
        session_text: &str,
    ) -> Result<String>;

    async fn list_study_items(
        &self,
        token: &str,
        kind: StudyKind,
        course_id: i64,
    ) -> Result<Vec<StudyItem>>;
}

pub type BackendBox = Arc<dyn Backend>;
