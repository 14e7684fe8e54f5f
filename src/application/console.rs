#[cfg(test)]
#[path = "console_test.rs"]
mod tests;

use std::io::IsTerminal;
use std::path;

use anyhow::Result;
use dialoguer::Password;
use owo_colors::OwoColorize;
use owo_colors::Style;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio::task;

use crate::domain::models::Action;
use crate::domain::models::ChatEntry;
use crate::domain::models::ChatId;
use crate::domain::models::Course;
use crate::domain::models::Event;
use crate::domain::models::FollowUp;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::PipelineStage;
use crate::domain::models::Registration;
use crate::domain::models::SavedSummary;
use crate::domain::models::Sender;
use crate::domain::models::SlashCommand;
use crate::domain::models::SlideCard;
use crate::domain::models::StudyKind;
use crate::domain::models::Theme;
use crate::domain::models::TranscriptItem;
use crate::domain::models::UserProfile;
use crate::domain::services::actions::help_text;

const LINE_WIDTH: usize = 100;

struct Palette {
    user: Style,
    ai: Style,
    warning: Style,
    error: Style,
    muted: Style,
    heading: Style,
}

impl Palette {
    fn for_theme(theme: Theme) -> Palette {
        match theme {
            Theme::Light => {
                return Palette {
                    user: Style::new().blue().bold(),
                    ai: Style::new().green().bold(),
                    warning: Style::new().yellow(),
                    error: Style::new().red(),
                    muted: Style::new().dimmed(),
                    heading: Style::new().black().bold(),
                };
            }
            Theme::Dark => {
                return Palette {
                    user: Style::new().bright_cyan().bold(),
                    ai: Style::new().bright_green().bold(),
                    warning: Style::new().bright_yellow(),
                    error: Style::new().bright_red(),
                    muted: Style::new().bright_black(),
                    heading: Style::new().bright_white().bold(),
                };
            }
        }
    }
}

/// What the console should do with one line of input.
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch {
    Send(Action),
    Print(Vec<String>),
    /// Prompt for a password, then send the login or registration.
    Credentials(Registration, bool),
    Quit,
    Nothing,
}

/// Mirror of the state the console needs to resolve list positions and answer
/// local commands without a round trip.
pub struct ConsoleView {
    colored: bool,
    theme: Theme,
    user: Option<UserProfile>,
    courses: Vec<Course>,
    selected_course: Option<i64>,
    summaries: Vec<SavedSummary>,
    chats: Vec<ChatEntry>,
    current_chat: Option<ChatId>,
    last_stage: PipelineStage,
}

impl ConsoleView {
    pub fn new(theme: Theme, colored: bool) -> ConsoleView {
        return ConsoleView {
            colored,
            theme,
            user: None,
            courses: vec![],
            selected_course: None,
            summaries: vec![],
            chats: vec![],
            current_chat: None,
            last_stage: PipelineStage::Idle,
        };
    }

    fn paint(&self, text: &str, style: fn(&Palette) -> Style) -> String {
        if !self.colored {
            return text.to_string();
        }
        let palette = Palette::for_theme(self.theme);
        return text.style(style(&palette)).to_string();
    }

    fn render_message(&self, message: &Message) -> Vec<String> {
        let label = match message.sender {
            Sender::User => self.paint(message.sender.label(), |p| return p.user),
            Sender::Ai => self.paint(message.sender.label(), |p| return p.ai),
        };

        let text_lines = message.as_string_lines(LINE_WIDTH);
        let mut lines = vec![label];
        for line in text_lines {
            let line = format!("  {line}");
            match message.message_type() {
                MessageType::Normal => lines.push(line),
                MessageType::Warning => lines.push(self.paint(&line, |p| return p.warning)),
                MessageType::Error => lines.push(self.paint(&line, |p| return p.error)),
            }
        }

        return lines;
    }

    fn render_card(&self, card: &SlideCard) -> Vec<String> {
        let mut lines = vec![self.paint(&card.heading(), |p| return p.heading)];
        for bullet in &card.bullets {
            lines.push(format!("  • {bullet}"));
        }
        if let Some(reason) = &card.error {
            lines.push(self.paint(
                &format!("  ! Could not summarize this slide: {reason}"),
                |p| return p.error,
            ));
        }

        return lines;
    }

    fn render_follow_ups(&self, follow_ups: &[FollowUp]) -> Vec<String> {
        let options = follow_ups
            .iter()
            .map(|follow_up| {
                let command = match follow_up {
                    FollowUp::GenerateQuiz => "/quiz",
                    FollowUp::GenerateAssignment => "/assignment",
                };
                return format!("{follow_up} ({command})");
            })
            .collect::<Vec<String>>()
            .join(", ");

        return vec![self.paint(&format!("Next: {options}"), |p| return p.muted)];
    }

    pub fn render_item(&self, item: &TranscriptItem) -> Vec<String> {
        match item {
            TranscriptItem::Message(message) => return self.render_message(message),
            TranscriptItem::SlideCard(card) => return self.render_card(card),
            TranscriptItem::FollowUps(follow_ups) => return self.render_follow_ups(follow_ups),
        }
    }

    /// Updates the mirror and returns the lines to print for an event.
    pub fn apply(&mut self, event: Event) -> Vec<String> {
        match event {
            Event::AuthChanged(user) => {
                self.user = user;
            }
            Event::ChatListChanged(chats, current) => {
                self.chats = chats;
                self.current_chat = Some(current);
            }
            Event::CourseAutoResolved(..) | Event::FileSelectionCleared() => {}
            Event::CoursesChanged(courses, selected) => {
                self.courses = courses;
                self.selected_course = selected;
            }
            Event::PipelineProgress(progress) => {
                return vec![self.paint(
                    &format!("[{:>3}%] {}", progress.percent, progress.label),
                    |p| return p.muted,
                )];
            }
            Event::SlidesHighlighted(pages) => {
                if pages.is_empty() {
                    return vec![];
                }
                let pages = pages
                    .iter()
                    .map(|page| return page.to_string())
                    .collect::<Vec<String>>()
                    .join(", ");
                return vec![self.paint(&format!("Referenced slides: {pages}"), |p| return p.muted)];
            }
            Event::StageChanged(stage) => {
                let previous = self.last_stage;
                self.last_stage = stage;
                if stage == PipelineStage::Error && previous != PipelineStage::Error {
                    return vec![self.paint("Pipeline stopped.", |p| return p.error)];
                }
            }
            Event::StudyItemsChanged(..) => {}
            Event::SummariesChanged(summaries) => {
                self.summaries = summaries;
            }
            Event::ThemeChanged(theme) => {
                self.theme = theme;
                return vec![self.paint(&format!("Theme set to {theme}."), |p| return p.muted)];
            }
            Event::TranscriptAppended(item) => return self.render_item(&item),
            Event::TranscriptReplaced(items) => {
                let mut lines = vec![self.paint(&"─".repeat(40), |p| return p.muted)];
                for item in &items {
                    lines.append(&mut self.render_item(item));
                }
                return lines;
            }
        }

        return vec![];
    }

    fn list_courses(&self) -> Vec<String> {
        if self.courses.is_empty() {
            return vec!["No courses yet. Create one with /newcourse NAME.".to_string()];
        }

        return self
            .courses
            .iter()
            .enumerate()
            .map(|(idx, course)| {
                let marker = if Some(course.id) == self.selected_course {
                    "*"
                } else {
                    " "
                };
                return format!("{marker} {}. {}", idx + 1, course.display_name());
            })
            .collect();
    }

    fn list_summaries(&self) -> Vec<String> {
        if self.summaries.is_empty() {
            return vec!["No saved summaries for this course.".to_string()];
        }

        return self
            .summaries
            .iter()
            .enumerate()
            .map(|(idx, summary)| {
                return format!(
                    "{}. {} ({})",
                    idx + 1,
                    summary.display_title(),
                    summary.created_at
                );
            })
            .collect();
    }

    fn list_chats(&self) -> Vec<String> {
        return self
            .chats
            .iter()
            .enumerate()
            .map(|(idx, chat)| {
                let marker = if Some(&chat.id) == self.current_chat.as_ref() {
                    "*"
                } else {
                    " "
                };
                return format!("{marker} {}. {}", idx + 1, chat.title);
            })
            .collect();
    }

    fn course_selection(&self, command: &SlashCommand) -> Dispatch {
        if command.rest().eq_ignore_ascii_case("none") {
            return Dispatch::Send(Action::SelectCourse(None));
        }

        match command.index_arg().and_then(|idx| return self.courses.get(idx)) {
            Some(course) => return Dispatch::Send(Action::SelectCourse(Some(course.id))),
            None => {
                return Dispatch::Print(vec![format!(
                    "No course at position {}. Run /courses to list them.",
                    command.rest()
                )]);
            }
        }
    }

    /// Maps a line of input to what should happen next.
    pub fn dispatch(&self, input: &str) -> Dispatch {
        let input = input.trim();
        if input.is_empty() {
            return Dispatch::Nothing;
        }

        let command = match SlashCommand::parse(input) {
            Some(command) => command,
            None => return Dispatch::Send(Action::SendMessage(input.to_string())),
        };

        if command.is_quit() {
            return Dispatch::Quit;
        }
        if command.is_help() {
            return Dispatch::Print(help_text().split('\n').map(String::from).collect());
        }
        if command.is_upload() {
            return Dispatch::Send(Action::UploadFile(path::PathBuf::from(command.rest())));
        }
        if command.is_save() {
            return Dispatch::Send(Action::SaveSummary());
        }
        if command.is_login() {
            return Dispatch::Credentials(
                Registration {
                    full_name: None,
                    email: command.args[0].to_string(),
                    password: "".to_string(),
                },
                false,
            );
        }
        if command.is_register() {
            let full_name = command.args[1..].join(" ");
            return Dispatch::Credentials(
                Registration {
                    full_name: if full_name.is_empty() {
                        None
                    } else {
                        Some(full_name)
                    },
                    email: command.args[0].to_string(),
                    password: "".to_string(),
                },
                true,
            );
        }
        if command.is_logout() {
            return Dispatch::Send(Action::Logout());
        }
        if command.is_whoami() {
            let line = match &self.user {
                Some(user) => format!("Signed in as {} <{}>.", user.display_name(), user.email),
                None => "You are in guest mode. Sign in with /login EMAIL.".to_string(),
            };
            return Dispatch::Print(vec![line]);
        }
        if command.is_course_list() {
            return Dispatch::Print(self.list_courses());
        }
        if command.is_course_select() {
            return self.course_selection(&command);
        }
        if command.is_course_create() {
            return Dispatch::Send(Action::CreateCourse(command.rest(), None));
        }
        if command.is_summary_list() {
            return Dispatch::Print(self.list_summaries());
        }
        if command.is_summary_show() {
            match command
                .index_arg()
                .and_then(|idx| return self.summaries.get(idx))
            {
                Some(summary) => return Dispatch::Send(Action::ShowSavedSummary(summary.id)),
                None => {
                    return Dispatch::Print(vec![format!(
                        "No summary at position {}. Run /summaries to list them.",
                        command.rest()
                    )]);
                }
            }
        }
        if command.is_quiz() {
            return Dispatch::Send(Action::GenerateStudyItem(StudyKind::Quiz));
        }
        if command.is_assignment() {
            return Dispatch::Send(Action::GenerateStudyItem(StudyKind::Assignment));
        }
        if command.is_new_chat() {
            return Dispatch::Send(Action::NewChat());
        }
        if command.is_chat_list() {
            return Dispatch::Print(self.list_chats());
        }
        if command.is_chat_load() {
            match command.index_arg().and_then(|idx| return self.chats.get(idx)) {
                Some(chat) => return Dispatch::Send(Action::LoadChat(chat.id.to_string())),
                None => {
                    return Dispatch::Print(vec![format!(
                        "No chat at position {}. Run /chats to list them.",
                        command.rest()
                    )]);
                }
            }
        }
        if command.is_theme() {
            return Dispatch::Send(Action::ToggleTheme());
        }

        return Dispatch::Nothing;
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

async fn read_password(confirm: bool) -> Result<String> {
    let password = task::spawn_blocking(move || {
        let mut prompt = Password::new().with_prompt("Password");
        if confirm {
            prompt = prompt.with_confirmation("Confirm password", "Passwords do not match.");
        }
        return prompt.interact();
    })
    .await??;

    return Ok(password);
}

/// Line based presenter. Reads commands from stdin and prints events as they
/// arrive until `/quit` or end of input.
pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    mut rx: mpsc::UnboundedReceiver<Event>,
    theme: Theme,
) -> Result<()> {
    let mut view = ConsoleView::new(theme, std::io::stdout().is_terminal());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_lines(&[
        view.paint("Lectern", |p| return p.heading),
        "Upload a deck with /upload PATH. Type /help for all commands.".to_string(),
    ]);
    tx.send(Action::RestoreSession())?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };

                match view.dispatch(&line) {
                    Dispatch::Send(action) => tx.send(action)?,
                    Dispatch::Print(output) => print_lines(&output),
                    Dispatch::Credentials(mut registration, is_registration) => {
                        match read_password(is_registration).await {
                            Ok(password) => registration.password = password,
                            Err(err) => {
                                tracing::warn!(error = ?err, "password prompt failed");
                                print_lines(&[view.paint("Could not read a password.", |p| return p.error)]);
                                continue;
                            }
                        }
                        if is_registration {
                            tx.send(Action::Register(registration))?;
                        } else {
                            tx.send(Action::Login(registration.email, registration.password))?;
                        }
                    }
                    Dispatch::Quit => break,
                    Dispatch::Nothing => {}
                }
            }
            event = rx.recv() => {
                match event {
                    Some(event) => print_lines(&view.apply(event)),
                    None => break,
                }
            }
        }
    }

    return Ok(());
}

/// Prints every event until the sender side closes. Used by one-shot runs.
pub async fn drain(mut rx: mpsc::UnboundedReceiver<Event>, theme: Theme) {
    let mut view = ConsoleView::new(theme, std::io::stdout().is_terminal());
    while let Some(event) = rx.recv().await {
        print_lines(&view.apply(event));
    }
}
