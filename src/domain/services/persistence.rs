#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;

use anyhow::Result;

use super::AppState;
use super::Orchestrator;
use super::Ticket;
use crate::domain::models::user_facing;
use crate::domain::models::ClientError;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::NewSummary;
use crate::domain::models::SavedSummary;
use crate::domain::models::Sender;
use crate::domain::models::SlideCard;
use crate::domain::models::TranscriptItem;

struct PreparedSummary {
    token: String,
    course_name: String,
    summary: NewSummary,
}

/// Builds the save request from the current deck, or None when saving is not
/// allowed right now.
fn prepare_summary(state: &AppState) -> Result<Option<PreparedSummary>> {
    if !state.can_persist() {
        return Ok(None);
    }

    let (token, course_id, deck) = match (
        state.auth.token(),
        state.courses.selected,
        state.session.deck.as_ref(),
    ) {
        (Some(token), Some(course_id), Some(deck)) => (token, course_id, deck),
        _ => return Ok(None),
    };

    let filename = state.session.source_file.clone().unwrap_or_default();
    let title = match state.session.slides.first() {
        Some(slide) if !slide.title.trim().is_empty() => slide.title.to_string(),
        _ => filename.to_string(),
    };
    let course_name = state
        .courses
        .selected_course()
        .map(|course| return course.name.to_string())
        .unwrap_or_default();

    return Ok(Some(PreparedSummary {
        token,
        course_name,
        summary: NewSummary {
            course_id,
            session_id: deck.id.to_string(),
            source_filename: filename,
            title,
            slides_payload: serde_json::to_value(&state.session.slides)?,
        },
    }));
}

impl Orchestrator {
    /// Uploads the current deck's slides to the selected course, then refetches
    /// that course's summaries. Failures are reported, not raised to the
    /// pipeline.
    pub async fn persist_summary(&self, ticket: &Ticket) -> Result<SavedSummary> {
        let prepared = prepare_summary(&self.state())?;

        let PreparedSummary {
            token,
            course_name,
            summary,
        } = match prepared {
            Some(prepared) => prepared,
            None => {
                let err = ClientError::Validation(
                    "Sign in, select a course and summarize a deck before saving.".to_string(),
                );
                self.notify_to(ticket, MessageType::Warning, &err.to_string());
                return Err(err.into());
            }
        };

        let saved = match self.backend().save_summary(&token, &summary).await {
            Ok(saved) => saved,
            Err(err) => {
                tracing::warn!(course_id = summary.course_id, error = ?err, "saving summary failed");
                self.notify_to(
                    ticket,
                    MessageType::Warning,
                    &format!("Failed to save summary: {}", user_facing(&err)),
                );
                return Err(err);
            }
        };

        self.notify_to(
            ticket,
            MessageType::Normal,
            &format!("Saved summary to course \"{course_name}\"."),
        );
        let _ = self.load_summaries().await;

        return Ok(saved);
    }

    /// Saves the current deck on request, outside of a pipeline run.
    pub async fn save_current_deck(&self) -> Result<SavedSummary> {
        let ticket = self.ticket();
        return self.persist_summary(&ticket).await;
    }

    /// Redraws the visible transcript with a stored summary. Purely local: the
    /// chat log and the active deck are left alone.
    pub fn show_saved_summary(&self, summary_id: i64) -> Result<()> {
        let summary = self
            .state()
            .courses
            .summaries
            .iter()
            .find(|summary| return summary.id == summary_id)
            .cloned();

        let summary = match summary {
            Some(summary) => summary,
            None => {
                let err = ClientError::Validation(format!("No saved summary with id {summary_id}."));
                self.notify(MessageType::Warning, &err.to_string());
                return Err(err.into());
            }
        };

        let mut items = vec![TranscriptItem::Message(Message::new(
            Sender::Ai,
            &format!("Saved summary: {}", summary.display_title()),
        ))];
        items.extend(
            SlideCard::from_payload(&summary.slides_payload)
                .into_iter()
                .map(TranscriptItem::SlideCard),
        );
        self.emit(Event::TranscriptReplaced(items));

        return Ok(());
    }
}
