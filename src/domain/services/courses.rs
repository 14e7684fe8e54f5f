#[cfg(test)]
#[path = "courses_test.rs"]
mod tests;

use anyhow::Result;

use super::Orchestrator;
use super::StoreKey;
use crate::domain::models::user_facing;
use crate::domain::models::ClientError;
use crate::domain::models::Course;
use crate::domain::models::CourseResolution;
use crate::domain::models::Event;
use crate::domain::models::MessageType;
use crate::domain::models::StudyKind;

const COURSE_KEYWORDS: [&str; 8] = [
    "chapter", "chap", "lec", "lecture", "class", "week", "session", "slide",
];

fn strip_extension(file_name: &str) -> &str {
    if let Some(idx) = file_name.rfind('.') {
        let suffix = &file_name[idx + 1..];
        if !suffix.is_empty() && !suffix.contains('/') {
            return &file_name[..idx];
        }
    }
    return file_name;
}

fn title_case(text: &str) -> String {
    return text
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    return first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase();
                }
                None => return "".to_string(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ");
}

/// Guesses a course name from a deck's file name by keeping whatever comes
/// before the first lecture keyword or digit, e.g. "Physics101_Lecture_4.pptx"
/// becomes "Physics". When nothing precedes the cut the whole base is used.
pub fn derive_course_name(file_name: &str) -> String {
    let base = strip_extension(file_name);
    let normalized = base
        .split(|c: char| return c == '_' || c == '-')
        .filter(|part| return !part.is_empty())
        .collect::<Vec<&str>>()
        .join(" ");
    let normalized = normalized.trim();

    // ASCII lowercasing keeps byte offsets valid for `normalized`.
    let lower = normalized.to_ascii_lowercase();
    let keyword_idx = COURSE_KEYWORDS
        .iter()
        .filter_map(|keyword| return lower.find(keyword))
        .min();
    let digit_idx = lower.find(|c: char| return c.is_ascii_digit());

    let prefix = match [keyword_idx, digit_idx].into_iter().flatten().min() {
        Some(cut) => normalized[..cut].trim(),
        None => normalized,
    };

    if prefix.is_empty() {
        return title_case(normalized);
    }
    return title_case(prefix);
}

impl Orchestrator {
    /// Fetches the course list and reconciles the selection against it. A
    /// response that arrives after the identity changed is dropped.
    pub async fn refresh_courses(&self) -> Result<()> {
        let token = match self.token() {
            Some(token) => token,
            None => return Ok(()),
        };

        let fetched = match self.backend().list_courses(&token).await {
            Ok(fetched) => fetched,
            Err(err) => {
                tracing::warn!(error = ?err, "failed to list courses");
                self.notify(
                    MessageType::Warning,
                    &format!("Could not load courses: {}", user_facing(&err)),
                );
                return Err(err);
            }
        };

        let (courses, selected, changed) = {
            let mut state = self.state();
            if state.auth.token().as_deref() != Some(token.as_str()) {
                tracing::debug!("dropping course list fetched for a previous identity");
                return Ok(());
            }
            let changed = state.courses.reconcile(fetched);
            (
                state.courses.courses.clone(),
                state.courses.selected,
                changed,
            )
        };

        if changed {
            self.remember_selection(selected);
        }
        self.emit(Event::CoursesChanged(courses, selected));
        self.load_course_artifacts().await;

        return Ok(());
    }

    /// Refreshes the saved summaries of the selected course, or clears the
    /// cache when nothing is selected.
    pub async fn load_summaries(&self) -> Result<()> {
        let (token, course_id) = {
            let state = self.state();
            (state.auth.token(), state.courses.selected)
        };

        let (token, course_id) = match (token, course_id) {
            (Some(token), Some(course_id)) => (token, course_id),
            _ => {
                self.state().courses.summaries = vec![];
                self.emit(Event::SummariesChanged(vec![]));
                return Ok(());
            }
        };

        let summaries = match self.backend().list_summaries(&token, course_id).await {
            Ok(summaries) => summaries,
            Err(err) => {
                tracing::warn!(course_id, error = ?err, "failed to list saved summaries");
                self.notify(
                    MessageType::Warning,
                    &format!("Could not load saved summaries: {}", user_facing(&err)),
                );
                return Err(err);
            }
        };

        {
            let mut state = self.state();
            if state.courses.selected != Some(course_id) {
                return Ok(());
            }
            state.courses.summaries = summaries.clone();
        }
        self.emit(Event::SummariesChanged(summaries));

        return Ok(());
    }

    pub async fn load_study_items(&self, kind: StudyKind) -> Result<()> {
        let (token, course_id) = {
            let state = self.state();
            (state.auth.token(), state.courses.selected)
        };

        let (token, course_id) = match (token, course_id) {
            (Some(token), Some(course_id)) => (token, course_id),
            _ => {
                self.state().courses.set_study_items(kind, vec![]);
                self.emit(Event::StudyItemsChanged(kind, vec![]));
                return Ok(());
            }
        };

        let items = match self.backend().list_study_items(&token, kind, course_id).await {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(course_id, %kind, error = ?err, "failed to list study items");
                return Err(err);
            }
        };

        {
            let mut state = self.state();
            if state.courses.selected != Some(course_id) {
                return Ok(());
            }
            state.courses.set_study_items(kind, items.clone());
        }
        self.emit(Event::StudyItemsChanged(kind, items));

        return Ok(());
    }

    /// Summaries, quizzes and assignments for the selected course. Failures
    /// are already reported by each loader.
    pub async fn load_course_artifacts(&self) {
        let _ = self.load_summaries().await;
        for kind in [StudyKind::Quiz, StudyKind::Assignment] {
            let _ = self.load_study_items(kind).await;
        }
    }

    pub async fn select_course(&self, course_id: Option<i64>) -> Result<()> {
        let (courses, selected) = {
            let mut state = self.state();
            if state.auth.identity.is_none() {
                drop(state);
                let err = ClientError::Validation("Sign in to choose a course.".to_string());
                self.notify(MessageType::Warning, &err.to_string());
                return Err(err.into());
            }
            if let Some(id) = course_id {
                if !state.courses.courses.iter().any(|course| return course.id == id) {
                    drop(state);
                    let err = ClientError::Validation(format!("No course with id {id}."));
                    self.notify(MessageType::Warning, &err.to_string());
                    return Err(err.into());
                }
            }
            state.courses.select(course_id);
            (state.courses.courses.clone(), state.courses.selected)
        };

        self.remember_selection(selected);
        self.emit(Event::CoursesChanged(courses, selected));
        self.load_course_artifacts().await;

        return Ok(());
    }

    pub async fn create_course(&self, name: &str, subject: Option<&str>) -> Result<Course> {
        match self.insert_course(name, subject).await {
            Ok(course) => {
                self.notify(
                    MessageType::Normal,
                    &format!("Created course {}.", course.display_name()),
                );
                return Ok(course);
            }
            Err(err) => {
                self.notify(
                    MessageType::Warning,
                    &format!("Could not create course: {}", user_facing(&err)),
                );
                return Err(err);
            }
        }
    }

    /// Picks or creates a course for a deck when a signed in user has none
    /// selected. Never fails; problems are reported as warnings.
    pub async fn auto_resolve_from_filename(&self, file_name: &str) -> Option<Course> {
        let existing = {
            let state = self.state();
            if state.auth.identity.is_none() || state.courses.selected.is_some() {
                return None;
            }
            let name = derive_course_name(file_name);
            if name.is_empty() {
                return None;
            }
            state.courses.find_by_name(&name).cloned().ok_or(name)
        };

        let (course, resolution) = match existing {
            Ok(course) => {
                {
                    let mut state = self.state();
                    state.courses.select(Some(course.id));
                }
                self.remember_selection(Some(course.id));
                self.emit_courses();
                self.load_course_artifacts().await;
                (course, CourseResolution::Reused)
            }
            Err(name) => match self.insert_course(&name, None).await {
                Ok(course) => (course, CourseResolution::Created),
                Err(err) => {
                    tracing::warn!(file_name, error = ?err, "course auto-resolution failed");
                    self.notify(
                        MessageType::Warning,
                        &format!(
                            "Could not create a course for this deck: {}",
                            user_facing(&err)
                        ),
                    );
                    return None;
                }
            },
        };

        let notice = match resolution {
            CourseResolution::Reused => format!("Reusing existing course {}.", course.name),
            CourseResolution::Created => format!("Created course {}.", course.name),
        };
        self.notify(MessageType::Normal, &notice);
        self.emit(Event::CourseAutoResolved(course.clone(), resolution));

        return Some(course);
    }

    async fn insert_course(&self, name: &str, subject: Option<&str>) -> Result<Course> {
        if name.trim().is_empty() {
            return Err(ClientError::Validation("A course name is required.".to_string()).into());
        }
        let token = match self.token() {
            Some(token) => token,
            None => {
                return Err(ClientError::Validation("Sign in to create a course.".to_string()).into());
            }
        };
        let subject = subject.map(str::trim).filter(|subject| return !subject.is_empty());

        let course = self
            .backend()
            .create_course(&token, name.trim(), subject)
            .await?;

        {
            let mut state = self.state();
            if state.auth.token().as_deref() != Some(token.as_str()) {
                return Ok(course);
            }
            state.courses.courses.push(course.clone());
            state.courses.select(Some(course.id));
        }
        self.remember_selection(Some(course.id));
        self.emit_courses();
        self.load_course_artifacts().await;

        return Ok(course);
    }

    fn emit_courses(&self) {
        let (courses, selected) = {
            let state = self.state();
            (state.courses.courses.clone(), state.courses.selected)
        };
        self.emit(Event::CoursesChanged(courses, selected));
    }

    fn remember_selection(&self, course_id: Option<i64>) {
        let value = course_id.map(|id| return id.to_string());
        self.remember(StoreKey::SelectedCourse, value.as_deref());
    }
}
