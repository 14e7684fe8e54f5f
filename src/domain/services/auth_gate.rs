#[cfg(test)]
#[path = "auth_gate_test.rs"]
mod tests;

use anyhow::Result;

use super::Orchestrator;
use super::StoreKey;
use crate::domain::models::user_facing;
use crate::domain::models::AuthIdentity;
use crate::domain::models::AuthMode;
use crate::domain::models::ClientError;
use crate::domain::models::Event;
use crate::domain::models::MessageType;
use crate::domain::models::Registration;
use crate::domain::models::StudyKind;
use crate::domain::models::UserProfile;

fn require_credentials(email: &str, password: &str) -> Result<(), ClientError> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(ClientError::Validation(
            "Email and password are both required.".to_string(),
        ));
    }
    return Ok(());
}

impl Orchestrator {
    /// Resolves the persisted credential to an identity. Any failure demotes to
    /// guest and forgets the credential, so this never errors.
    pub async fn restore_session(&self) -> AuthMode {
        let token = match self.store().get(StoreKey::AuthToken) {
            Some(token) if !token.trim().is_empty() => token,
            _ => {
                self.set_identity(None);
                return AuthMode::Guest;
            }
        };

        match self.backend().verify_identity(&token).await {
            Ok(user) => {
                self.set_identity(Some(AuthIdentity { token, user }));
                return AuthMode::Authenticated;
            }
            Err(err) => {
                tracing::warn!(error = ?err, "stored credential rejected, continuing as guest");
                self.remember(StoreKey::AuthToken, None);
                self.set_identity(None);
                return AuthMode::Guest;
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthMode> {
        if let Err(err) = require_credentials(email, password) {
            self.notify(MessageType::Warning, &err.to_string());
            return Err(err.into());
        }

        let token = match self.backend().login(email.trim(), password).await {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(error = ?err, "login failed");
                self.notify(
                    MessageType::Error,
                    &format!("Login failed: {}", user_facing(&err)),
                );
                return Err(err);
            }
        };

        self.remember(StoreKey::AuthToken, Some(&token));
        let mode = self.restore_session().await;
        if mode == AuthMode::Guest {
            self.notify(
                MessageType::Warning,
                "Signed in, but the session could not be verified. Continuing as guest.",
            );
            return Ok(mode);
        }

        let name = self.signed_in_as().unwrap_or_default();
        self.notify(MessageType::Normal, &format!("Signed in as {name}."));
        if let Err(err) = self.refresh_courses().await {
            tracing::warn!(error = ?err, "course refresh after login failed");
        }

        return Ok(mode);
    }

    /// Creates an account. Does not sign in.
    pub async fn register(&self, registration: &Registration) -> Result<UserProfile> {
        if let Err(err) = require_credentials(&registration.email, &registration.password) {
            self.notify(MessageType::Warning, &err.to_string());
            return Err(err.into());
        }

        match self.backend().register(registration).await {
            Ok(user) => {
                self.notify(
                    MessageType::Normal,
                    &format!(
                        "Account created for {}. Sign in with /login to continue.",
                        user.display_name()
                    ),
                );
                return Ok(user);
            }
            Err(err) => {
                tracing::warn!(error = ?err, "registration failed");
                self.notify(
                    MessageType::Error,
                    &format!("Registration failed: {}", user_facing(&err)),
                );
                return Err(err);
            }
        }
    }

    /// Local only. Forgets the credential and everything cached for the user.
    pub fn logout(&self) {
        self.remember(StoreKey::AuthToken, None);
        self.remember(StoreKey::SelectedCourse, None);
        {
            let mut state = self.state();
            state.auth.identity = None;
            state.courses.clear();
        }

        self.emit(Event::AuthChanged(None));
        self.emit_course_caches();
        self.notify(MessageType::Normal, "Signed out. You are in guest mode.");
    }

    pub fn signed_in_as(&self) -> Option<String> {
        return self
            .state()
            .auth
            .identity
            .as_ref()
            .map(|identity| return identity.user.display_name());
    }

    /// Switching identity drops every course cached for the previous one. The
    /// persisted selection is reloaded for the new identity and reconciled on
    /// the next course fetch.
    fn set_identity(&self, identity: Option<AuthIdentity>) {
        let profile = identity.as_ref().map(|identity| return identity.user.clone());
        let stored_selection = self
            .store()
            .get(StoreKey::SelectedCourse)
            .and_then(|value| return value.parse::<i64>().ok());

        let changed = {
            let mut state = self.state();
            let previous = state.auth.token();
            let next = identity.as_ref().map(|identity| return identity.token.to_string());
            state.auth.identity = identity;

            let changed = previous != next;
            if changed {
                state.courses.clear();
                if next.is_some() {
                    state.courses.selected = stored_selection;
                }
            }
            changed
        };

        self.emit(Event::AuthChanged(profile));
        if changed {
            self.emit_course_caches();
        }
    }

    pub(super) fn emit_course_caches(&self) {
        let (courses, selected, summaries, quizzes, assignments) = {
            let state = self.state();
            (
                state.courses.courses.clone(),
                state.courses.selected,
                state.courses.summaries.clone(),
                state.courses.quizzes.clone(),
                state.courses.assignments.clone(),
            )
        };

        self.emit(Event::CoursesChanged(courses, selected));
        self.emit(Event::SummariesChanged(summaries));
        self.emit(Event::StudyItemsChanged(StudyKind::Quiz, quizzes));
        self.emit(Event::StudyItemsChanged(StudyKind::Assignment, assignments));
    }
}
