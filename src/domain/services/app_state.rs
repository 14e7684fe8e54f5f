#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use std::path;

use crate::domain::models::AuthIdentity;
use crate::domain::models::AuthMode;
use crate::domain::models::ChatId;
use crate::domain::models::ChatLog;
use crate::domain::models::Course;
use crate::domain::models::DeckSession;
use crate::domain::models::PipelineStage;
use crate::domain::models::SavedSummary;
use crate::domain::models::Slide;
use crate::domain::models::StudyItem;
use crate::domain::models::StudyKind;
use crate::domain::models::Theme;

#[derive(Debug, Default)]
pub struct AuthState {
    pub identity: Option<AuthIdentity>,
}

impl AuthState {
    pub fn token(&self) -> Option<String> {
        return self
            .identity
            .as_ref()
            .map(|identity| return identity.token.to_string());
    }

    pub fn mode(&self) -> AuthMode {
        if self.identity.is_some() {
            return AuthMode::Authenticated;
        }
        return AuthMode::Guest;
    }
}

/// Courses of the signed in user, plus everything cached for the selected one.
#[derive(Debug, Default)]
pub struct CourseState {
    pub courses: Vec<Course>,
    pub selected: Option<i64>,
    pub summaries: Vec<SavedSummary>,
    pub quizzes: Vec<StudyItem>,
    pub assignments: Vec<StudyItem>,
}

impl CourseState {
    /// Replaces the course list with a fresh fetch and repairs the selection
    /// against it. Returns true when the selection changed.
    pub fn reconcile(&mut self, fetched: Vec<Course>) -> bool {
        let first = fetched.first().map(|course| return course.id);
        let next = match self.selected {
            Some(id) if fetched.iter().any(|course| return course.id == id) => Some(id),
            _ => first,
        };

        self.courses = fetched;
        return self.select(next);
    }

    /// Returns true when the selection changed. Cached artifacts belong to the
    /// previous course and are dropped on change.
    pub fn select(&mut self, id: Option<i64>) -> bool {
        if self.selected == id {
            return false;
        }

        self.selected = id;
        self.summaries = vec![];
        self.quizzes = vec![];
        self.assignments = vec![];
        return true;
    }

    pub fn clear(&mut self) {
        *self = CourseState::default();
    }

    pub fn selected_course(&self) -> Option<&Course> {
        let id = self.selected?;
        return self.courses.iter().find(|course| return course.id == id);
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Course> {
        let needle = name.to_lowercase();
        return self
            .courses
            .iter()
            .find(|course| return course.name.to_lowercase() == needle);
    }

    pub fn study_items(&self, kind: StudyKind) -> &[StudyItem] {
        match kind {
            StudyKind::Quiz => return &self.quizzes,
            StudyKind::Assignment => return &self.assignments,
        }
    }

    pub fn set_study_items(&mut self, kind: StudyKind, items: Vec<StudyItem>) {
        match kind {
            StudyKind::Quiz => self.quizzes = items,
            StudyKind::Assignment => self.assignments = items,
        }
    }
}

/// The deck currently being worked on. `epoch` moves on every reset so long
/// running flows can tell that their results are stale.
#[derive(Debug, Default)]
pub struct SessionState {
    pub deck: Option<DeckSession>,
    pub slides: Vec<Slide>,
    pub source_file: Option<String>,
    epoch: u64,
}

impl SessionState {
    pub fn reset(&mut self) -> u64 {
        self.deck = None;
        self.slides = vec![];
        self.source_file = None;
        self.epoch += 1;
        return self.epoch;
    }

    pub fn epoch(&self) -> u64 {
        return self.epoch;
    }
}

#[derive(Debug, Default)]
pub struct PipelineState {
    pub stage: PipelineStage,
    pub selected_file: Option<path::PathBuf>,
}

/// Captured by a long running flow before its first request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    pub epoch: u64,
    pub chat_id: ChatId,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub auth: AuthState,
    pub courses: CourseState,
    pub session: SessionState,
    pub chats: ChatLog,
    pub pipeline: PipelineState,
    pub theme: Theme,
}

impl AppState {
    pub fn ticket(&self) -> Ticket {
        return Ticket {
            epoch: self.session.epoch(),
            chat_id: self.chats.current_id(),
        };
    }

    pub fn is_live(&self, ticket: &Ticket) -> bool {
        return self.session.epoch() == ticket.epoch;
    }

    /// Saving needs a signed in user, a selected course and a deck.
    pub fn can_persist(&self) -> bool {
        return self.auth.identity.is_some()
            && self.courses.selected.is_some()
            && self.session.deck.is_some();
    }
}
