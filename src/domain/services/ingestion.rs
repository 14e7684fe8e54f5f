#[cfg(test)]
#[path = "ingestion_test.rs"]
mod tests;

use std::path;

use tokio::fs;

use super::Orchestrator;
use super::Ticket;
use crate::domain::models::percent_complete;
use crate::domain::models::user_facing;
use crate::domain::models::Event;
use crate::domain::models::FollowUp;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::PipelineStage;
use crate::domain::models::Progress;
use crate::domain::models::ProgressTracker;
use crate::domain::models::Sender;
use crate::domain::models::SlideCard;
use crate::domain::models::TranscriptItem;
use crate::domain::models::EXTRACTION_PERCENT;

const COMPLETION_HINT: &str = "Presentation summarized!

You can now ask things like:
- Explain slide 3
- What is the main idea of this lecture?
- Compare slide 2 and 5
- Give me a quick recap of the whole lecture";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineOutcome {
    Completed,
    Failed,
    /// A newer upload or a new chat took over while this run was in flight.
    Superseded,
}

fn display_name(file_path: &path::Path) -> String {
    return file_path
        .file_name()
        .map(|name| return name.to_string_lossy().to_string())
        .unwrap_or_else(|| return file_path.display().to_string());
}

fn deck_stem(file_name: &str) -> String {
    return path::Path::new(file_name)
        .file_stem()
        .map(|stem| return stem.to_string_lossy().to_string())
        .unwrap_or_else(|| return file_name.to_string());
}

impl Orchestrator {
    /// Runs a deck through extraction and per-slide summarization, then files
    /// the result under the selected course when possible.
    ///
    /// Slides are summarized one at a time in page order. A slide that fails
    /// gets an error card and the run continues.
    pub async fn ingest_file(&self, file_path: &path::Path) -> PipelineOutcome {
        let file_name = display_name(file_path);

        let guest_with_course = {
            let state = self.state();
            state.auth.identity.is_none() && state.courses.selected.is_some()
        };
        if guest_with_course {
            return self.reject_upload("Sign in before uploading to a course.");
        }

        let bytes = match fs::read(file_path).await {
            Ok(bytes) if bytes.is_empty() => {
                return self.reject_upload(&format!("{file_name} is empty."));
            }
            Ok(bytes) => bytes,
            Err(err) => {
                return self.reject_upload(&format!("Could not read {file_name}: {err}"));
            }
        };

        // Only an accepted upload supersedes the active deck.
        let ticket = {
            let mut state = self.state();
            state.pipeline.selected_file = Some(file_path.to_path_buf());
            state.session.reset();
            state.session.source_file = Some(file_name.to_string());
            state.ticket()
        };
        tracing::debug!(file = %file_name, epoch = ticket.epoch, "ingestion started");

        self.append_to(
            &ticket,
            TranscriptItem::Message(Message::new(
                Sender::User,
                &format!("Uploaded {file_name}"),
            )),
        );

        let needs_course = {
            let state = self.state();
            state.auth.identity.is_some() && state.courses.selected.is_none()
        };
        if needs_course {
            self.auto_resolve_from_filename(&file_name).await;
            if !self.is_live(&ticket) {
                return PipelineOutcome::Superseded;
            }
        }

        let mut tracker = ProgressTracker::default();
        self.set_stage(&ticket, PipelineStage::Extracting);
        self.report_progress(&ticket, tracker.advance(EXTRACTION_PERCENT), "Extracting slides");

        let extraction = self.backend().extract(&file_name, bytes).await;
        if !self.is_live(&ticket) {
            return PipelineOutcome::Superseded;
        }
        let extraction = match extraction {
            Ok(extraction) => extraction,
            Err(err) => {
                tracing::warn!(file = %file_name, error = ?err, "extraction failed");
                return self.fail_pipeline(
                    &ticket,
                    &format!("Extraction failed: {}", user_facing(&err)),
                );
            }
        };

        let session = extraction.session;
        let mut slides = extraction.slides;
        slides.sort_by_key(|slide| return slide.page);
        let total = slides.len();
        {
            let mut state = self.state();
            state.session.deck = Some(session.clone());
            state.session.slides = slides.clone();
        }
        self.set_stage(&ticket, PipelineStage::Summarizing { done: 0, total });

        for (idx, slide) in slides.iter().enumerate() {
            let summary = self.backend().summarize_slide(&session, slide).await;
            if !self.is_live(&ticket) {
                return PipelineOutcome::Superseded;
            }

            let card = match summary {
                Ok(summary) => {
                    let mut state = self.state();
                    if let Some(stored) = state.session.slides.get_mut(idx) {
                        stored.bullets = summary.bullets.clone();
                    }
                    let mut card = SlideCard::from_summary(&summary);
                    card.page = Some(slide.page);
                    if card.title.is_empty() {
                        card.title = slide.title.to_string();
                    }
                    card
                }
                Err(err) => {
                    tracing::warn!(page = slide.page, error = ?err, "slide summary failed");
                    SlideCard::failed(slide, &user_facing(&err))
                }
            };
            self.append_to(&ticket, TranscriptItem::SlideCard(card));

            let done = idx + 1;
            self.set_stage(&ticket, PipelineStage::Summarizing { done, total });
            self.report_progress(
                &ticket,
                tracker.advance(percent_complete(done, total)),
                &format!("Summarizing slide {done}/{total}"),
            );
        }

        self.complete_pipeline(&ticket, &mut tracker, &file_name);

        let can_persist = self.state().can_persist();
        if can_persist {
            // Failures are reported by the bridge and never undo completion.
            let _ = self.persist_summary(&ticket).await;
        }

        return PipelineOutcome::Completed;
    }

    fn complete_pipeline(&self, ticket: &Ticket, tracker: &mut ProgressTracker, file_name: &str) {
        if let Some(percent) = tracker.finish() {
            self.report_progress(ticket, percent, "Done");
        }
        self.set_stage(ticket, PipelineStage::Complete);

        self.notify_to(ticket, MessageType::Normal, COMPLETION_HINT);
        self.append_to(
            ticket,
            TranscriptItem::FollowUps(vec![FollowUp::GenerateQuiz, FollowUp::GenerateAssignment]),
        );

        let renamed = self
            .state()
            .chats
            .rename_if_default(&ticket.chat_id, &format!("Deck: {}", deck_stem(file_name)));
        if renamed {
            self.emit_chat_list();
        }

        self.clear_file_selection();
    }

    /// Refuses an upload before it touches the active deck. A run already in
    /// flight keeps its stage.
    fn reject_upload(&self, reason: &str) -> PipelineOutcome {
        tracing::debug!(reason, "upload rejected");
        let running = {
            let mut state = self.state();
            let running = state.pipeline.stage.is_running();
            if !running {
                state.pipeline.stage = PipelineStage::Error;
                state.pipeline.selected_file = None;
            }
            running
        };

        if !running {
            self.emit(Event::StageChanged(PipelineStage::Error));
            self.emit(Event::FileSelectionCleared());
        }
        self.notify(MessageType::Error, reason);

        return PipelineOutcome::Failed;
    }

    fn fail_pipeline(&self, ticket: &Ticket, reason: &str) -> PipelineOutcome {
        self.set_stage(ticket, PipelineStage::Error);
        self.notify_to(ticket, MessageType::Error, reason);
        self.clear_file_selection();

        return PipelineOutcome::Failed;
    }

    fn set_stage(&self, ticket: &Ticket, stage: PipelineStage) {
        {
            let mut state = self.state();
            if !state.is_live(ticket) {
                return;
            }
            state.pipeline.stage = stage;
        }
        self.emit(Event::StageChanged(stage));
    }

    fn report_progress(&self, ticket: &Ticket, percent: u8, label: &str) {
        if !self.is_live(ticket) {
            return;
        }
        self.emit(Event::PipelineProgress(Progress {
            percent,
            label: label.to_string(),
        }));
    }

    fn clear_file_selection(&self) {
        self.state().pipeline.selected_file = None;
        self.emit(Event::FileSelectionCleared());
    }
}
