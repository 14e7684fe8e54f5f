#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

use anyhow::Result;

use super::Orchestrator;
use crate::domain::models::user_facing;
use crate::domain::models::ChatReply;
use crate::domain::models::ChatRequest;
use crate::domain::models::ClientError;
use crate::domain::models::DeckSession;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::PipelineStage;
use crate::domain::models::ReplyKind;
use crate::domain::models::Sender;
use crate::domain::models::StudyKind;
use crate::domain::models::TranscriptItem;

pub const SUMMARY_CHAT_TITLE: &str = "Deck summary";

/// Free text that asks for generated study material instead of an answer.
pub fn requested_study_item(text: &str) -> Option<StudyKind> {
    let lower = text.to_lowercase();
    if lower.contains("generate quiz") {
        return Some(StudyKind::Quiz);
    }
    if lower.contains("generate assignment") {
        return Some(StudyKind::Assignment);
    }
    return None;
}

impl Orchestrator {
    /// Starts an empty chat and drops the active deck. Any flow still running
    /// against the old deck becomes stale.
    pub fn new_chat(&self) {
        {
            let mut state = self.state();
            state.chats.start_new();
            state.session.reset();
            state.pipeline.stage = PipelineStage::Idle;
        }

        self.emit(Event::TranscriptReplaced(vec![]));
        self.emit(Event::StageChanged(PipelineStage::Idle));
        self.emit_chat_list();
    }

    /// Makes another chat visible. Local only.
    pub fn load_chat(&self, chat_id: &str) -> Result<()> {
        let items = {
            let mut state = self.state();
            state
                .chats
                .switch(chat_id)
                .map(|chat| return chat.items().to_vec())
        };

        let items = match items {
            Some(items) => items,
            None => {
                let err = ClientError::Validation(format!("No chat with id {chat_id}."));
                self.notify(MessageType::Warning, &err.to_string());
                return Err(err.into());
            }
        };

        self.emit(Event::TranscriptReplaced(items));
        self.emit_chat_list();

        return Ok(());
    }

    /// Asks a follow-up question about the active deck. Returns None when the
    /// message was ignored or routed elsewhere.
    pub async fn send_message(&self, text: &str) -> Result<Option<ChatReply>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        if let Some(kind) = requested_study_item(text) {
            self.generate_study_item(kind).await?;
            return Ok(None);
        }

        let ticket = self.ticket();
        let request = {
            let state = self.state();
            state.session.deck.as_ref().map(|deck| {
                return ChatRequest {
                    message: text.to_string(),
                    session_id: Some(deck.id.to_string()),
                    course_id: state.courses.selected,
                    token: state.auth.token(),
                };
            })
        };
        let request = match request {
            Some(request) => request,
            None => {
                let err = ClientError::Validation(
                    "Upload a deck first to ask follow-up questions.".to_string(),
                );
                self.notify(MessageType::Warning, &err.to_string());
                return Err(err.into());
            }
        };

        self.append_to(
            &ticket,
            TranscriptItem::Message(Message::new(Sender::User, text)),
        );

        let reply = self.backend().chat(&request).await;
        if !self.is_live(&ticket) {
            return Ok(None);
        }
        let reply = match reply {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = ?err, "chat request failed");
                self.notify_to(
                    &ticket,
                    MessageType::Error,
                    &format!("Error: {}", user_facing(&err)),
                );
                return Err(err);
            }
        };

        if let Some(session_id) = &reply.session_id {
            self.adopt_session(session_id);
        }
        self.append_to(
            &ticket,
            TranscriptItem::Message(Message::new(Sender::Ai, &reply.text)),
        );
        if !reply.used_slides.is_empty() {
            self.emit(Event::SlidesHighlighted(reply.used_slides.clone()));
        }
        if reply.kind == ReplyKind::Summary {
            let renamed = self
                .state()
                .chats
                .rename_if_default(&ticket.chat_id, SUMMARY_CHAT_TITLE);
            if renamed {
                self.emit_chat_list();
            }
        }

        return Ok(Some(reply));
    }

    /// The backend may hand back a different handle for the same deck. Later
    /// requests use the one it returned last.
    fn adopt_session(&self, session_id: &str) {
        let mut state = self.state();
        let differs = match &state.session.deck {
            Some(deck) => deck.id != session_id && !session_id.trim().is_empty(),
            None => false,
        };
        if differs {
            tracing::debug!(session = session_id, "adopting session id from chat reply");
            state.session.deck = Some(DeckSession::new(session_id));
        }
    }
}
