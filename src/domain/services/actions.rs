use std::future::Future;

use anyhow::Result;
use tokio::sync::mpsc;

use super::Orchestrator;
use crate::domain::models::Action;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /upload (/u) [PATH] - Uploads a slide deck and summarizes it slide by slide.
- /save - Saves the current deck's summary to the selected course.
- /login (/l) [EMAIL] - Signs in. You will be asked for your password.
- /register [EMAIL] [FULL NAME?] - Creates an account.
- /logout - Signs out and forgets cached courses.
- /whoami - Shows who you are signed in as.
- /courses - Lists your courses.
- /course [INDEX,none] - Selects a course from /courses, or clears the selection.
- /newcourse [NAME] - Creates a course and selects it.
- /summaries - Lists saved summaries for the selected course.
- /summary [INDEX] - Shows a saved summary from /summaries.
- /quiz - Generates a quiz from the current deck.
- /assignment - Generates an assignment from the current deck.
- /new - Starts a new chat.
- /chats - Lists chats.
- /chat [INDEX] - Switches to a chat from /chats.
- /theme - Toggles between the light and dark theme.
- /quit /exit (/q) - Exit Lectern.
- /help (/h) - Provides this help menu.

Anything else is sent as a question about the current deck.
        "#;

    return text.trim().to_string();
}

/// Runs a long flow in the background so quick actions such as starting a new
/// chat are handled while it is in flight. Failures were already reported to
/// the transcript by the flow itself.
fn spawn_flow<F, T>(name: &'static str, flow: F)
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = flow.await {
            tracing::debug!(flow = name, error = ?err, "flow ended with an error");
        }
    });
}

pub struct ActionsService {}

impl ActionsService {
    pub async fn start(
        orchestrator: Orchestrator,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        loop {
            let action = match rx.recv().await {
                Some(action) => action,
                None => return Ok(()),
            };

            let orch = orchestrator.clone();
            match action {
                Action::CreateCourse(name, subject) => {
                    spawn_flow("create_course", async move {
                        return orch.create_course(&name, subject.as_deref()).await;
                    });
                }
                Action::GenerateStudyItem(kind) => {
                    spawn_flow("generate_study_item", async move {
                        return orch.generate_study_item(kind).await;
                    });
                }
                Action::LoadChat(chat_id) => {
                    let _ = orch.load_chat(&chat_id);
                }
                Action::Login(email, password) => {
                    spawn_flow("login", async move {
                        return orch.login(&email, &password).await;
                    });
                }
                Action::Logout() => {
                    orch.logout();
                }
                Action::NewChat() => {
                    orch.new_chat();
                }
                Action::RefreshCourses() => {
                    spawn_flow("refresh_courses", async move {
                        return orch.refresh_courses().await;
                    });
                }
                Action::Register(registration) => {
                    spawn_flow("register", async move {
                        return orch.register(&registration).await;
                    });
                }
                Action::RestoreSession() => {
                    spawn_flow("restore_session", async move {
                        orch.restore_session().await;
                        return orch.refresh_courses().await;
                    });
                }
                Action::SaveSummary() => {
                    spawn_flow("save_summary", async move {
                        return orch.save_current_deck().await;
                    });
                }
                Action::SelectCourse(course_id) => {
                    spawn_flow("select_course", async move {
                        return orch.select_course(course_id).await;
                    });
                }
                Action::SendMessage(text) => {
                    spawn_flow("send_message", async move {
                        return orch.send_message(&text).await;
                    });
                }
                Action::ShowSavedSummary(summary_id) => {
                    let _ = orch.show_saved_summary(summary_id);
                }
                Action::ToggleTheme() => {
                    orch.toggle_theme();
                }
                Action::UploadFile(file_path) => {
                    spawn_flow("ingest_file", async move {
                        orch.ingest_file(&file_path).await;
                        return Ok::<(), anyhow::Error>(());
                    });
                }
            }
        }
    }
}
