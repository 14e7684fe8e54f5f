#[cfg(test)]
#[path = "study_materials_test.rs"]
mod tests;

use anyhow::Result;

use super::Orchestrator;
use crate::domain::models::user_facing;
use crate::domain::models::ClientError;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::Sender;
use crate::domain::models::StudyKind;
use crate::domain::models::TranscriptItem;

impl Orchestrator {
    /// Generates a quiz or assignment from the active deck for the selected
    /// course. Returns the generated content.
    pub async fn generate_study_item(&self, kind: StudyKind) -> Result<String> {
        let ticket = self.ticket();
        let (token, course_id, deck) = {
            let state = self.state();
            (
                state.auth.token(),
                state.courses.selected,
                state.session.deck.clone(),
            )
        };

        let (token, course_id) = match (token, course_id) {
            (Some(token), Some(course_id)) => (token, course_id),
            _ => {
                let err = ClientError::Validation(
                    "You must sign in and select a course first.".to_string(),
                );
                self.notify(MessageType::Warning, &err.to_string());
                return Err(err.into());
            }
        };
        let deck = match deck {
            Some(deck) => deck,
            None => {
                let err =
                    ClientError::Validation("Upload and summarize a lecture first.".to_string());
                self.notify(MessageType::Warning, &err.to_string());
                return Err(err.into());
            }
        };

        let label = kind.label();
        let context = self.backend().session_context(&deck).await;
        if !self.is_live(&ticket) {
            return Ok("".to_string());
        }
        let text = match context {
            Ok(context) => context.retained_text(),
            Err(err) => {
                tracing::warn!(session = %deck.id, error = ?err, "failed to load session context");
                "".to_string()
            }
        };
        if text.trim().is_empty() {
            let err = ClientError::Validation(
                "Could not load lecture content for this session.".to_string(),
            );
            self.notify_to(&ticket, MessageType::Warning, &err.to_string());
            return Err(err.into());
        }

        let content = match self.backend().generate(&token, kind, course_id, &text).await {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(course_id, %kind, error = ?err, "generation failed");
                self.notify_to(
                    &ticket,
                    MessageType::Error,
                    &format!("Failed to generate {kind}: {}", user_facing(&err)),
                );
                return Err(err);
            }
        };
        if !self.is_live(&ticket) {
            // The saved list belongs to the course, so it is refreshed even
            // when the chat that asked has moved on.
            let _ = self.load_study_items(kind).await;
            return Ok(content);
        }

        self.append_to(
            &ticket,
            TranscriptItem::Message(Message::new(
                Sender::Ai,
                &format!("{label} generated:\n\n{content}"),
            )),
        );
        let _ = self.load_study_items(kind).await;

        return Ok(content);
    }
}
