use std::sync::Arc;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use tempdir::TempDir;
use tokio::sync::mpsc;
use tokio::sync::Notify;

use super::LocalStore;
use super::Orchestrator;
use crate::domain::models::AuthIdentity;
use crate::domain::models::Backend;
use crate::domain::models::ChatReply;
use crate::domain::models::ChatRequest;
use crate::domain::models::ClientError;
use crate::domain::models::Course;
use crate::domain::models::DeckSession;
use crate::domain::models::Event;
use crate::domain::models::Extraction;
use crate::domain::models::NewSummary;
use crate::domain::models::Registration;
use crate::domain::models::SavedSummary;
use crate::domain::models::SessionContext;
use crate::domain::models::Slide;
use crate::domain::models::SlideSummary;
use crate::domain::models::StudyItem;
use crate::domain::models::StudyKind;
use crate::domain::models::TranscriptItem;
use crate::domain::models::UserProfile;

fn server_error(detail: &str) -> anyhow::Error {
    return ClientError::Server {
        status: 500,
        detail: detail.to_string(),
    }
    .into();
}

pub fn profile(email: &str) -> UserProfile {
    return UserProfile {
        full_name: Some("Ada Lovelace".to_string()),
        email: email.to_string(),
    };
}

pub fn course(id: i64, name: &str) -> Course {
    return Course {
        id,
        name: name.to_string(),
        subject: None,
    };
}

pub fn slide(page: u32, title: &str) -> Slide {
    return Slide {
        page,
        title: title.to_string(),
        text: format!("Text of slide {page}"),
        bullets: vec![],
    };
}

/// Canned responses. A `None` makes the matching call fail.
pub struct Script {
    pub identity: Option<UserProfile>,
    pub login_token: Option<String>,
    pub courses: Vec<Course>,
    pub next_course_id: i64,
    pub fail_create_course: bool,
    pub summaries: Vec<SavedSummary>,
    pub fail_save: bool,
    pub extraction: Option<Extraction>,
    pub failing_pages: Vec<u32>,
    pub chat_reply: Option<ChatReply>,
    pub session_context: SessionContext,
    pub generated: Option<String>,
    pub study_items: Vec<StudyItem>,
}

impl Default for Script {
    fn default() -> Script {
        return Script {
            identity: Some(profile("ada@example.com")),
            login_token: Some("abc".to_string()),
            courses: vec![],
            next_course_id: 100,
            fail_create_course: false,
            summaries: vec![],
            fail_save: false,
            extraction: Some(Extraction {
                session: DeckSession::new("sess-42"),
                slides: vec![slide(1, "Kinematics"), slide(2, "Newton's Laws")],
            }),
            failing_pages: vec![],
            chat_reply: None,
            session_context: SessionContext {
                summary: Some("Motion and forces.".to_string()),
                pptx_text_preview: None,
            },
            generated: Some("1. What is inertia?".to_string()),
            study_items: vec![],
        };
    }
}

/// In-process backend that records every call it receives.
pub struct ScriptedBackend {
    pub script: Mutex<Script>,
    calls: Mutex<Vec<String>>,
    gate: Mutex<Option<(&'static str, Arc<Notify>, Arc<Notify>)>>,
}

impl ScriptedBackend {
    pub fn new(script: Script) -> ScriptedBackend {
        return ScriptedBackend {
            script: Mutex::new(script),
            calls: Mutex::new(vec![]),
            gate: Mutex::new(None),
        };
    }

    /// Holds the next call named `call` until `release` is notified. `started`
    /// is notified once the request is in flight.
    pub fn pause_next(&self, call: &'static str) -> (Arc<Notify>, Arc<Notify>) {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some((call, started.clone(), release.clone()));
        return (started, release);
    }

    pub fn pause_next_summary(&self) -> (Arc<Notify>, Arc<Notify>) {
        return self.pause_next("summarize");
    }

    async fn hold(&self, call: &str) {
        let gate = {
            let mut gate = self.gate.lock().unwrap();
            let matched = matches!(gate.as_ref(), Some((name, ..)) if *name == call);
            if matched {
                gate.take()
            } else {
                None
            }
        };

        if let Some((_, started, release)) = gate {
            started.notify_one();
            release.notified().await;
        }
    }

    pub fn calls(&self) -> Vec<String> {
        return self.calls.lock().unwrap().clone();
    }

    pub fn count(&self, prefix: &str) -> usize {
        return self
            .calls()
            .iter()
            .filter(|call| return call.starts_with(prefix))
            .count();
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    #[allow(clippy::implicit_return)]
    async fn verify_identity(&self, token: &str) -> Result<UserProfile> {
        self.record(format!("verify_identity:{token}"));
        return self
            .script
            .lock()
            .unwrap()
            .identity
            .clone()
            .ok_or_else(|| return server_error("Invalid authentication token"));
    }

    #[allow(clippy::implicit_return)]
    async fn login(&self, email: &str, _password: &str) -> Result<String> {
        self.record(format!("login:{email}"));
        return self.script.lock().unwrap().login_token.clone().ok_or_else(|| {
            return ClientError::Server {
                status: 401,
                detail: "Incorrect email or password".to_string(),
            }
            .into();
        });
    }

    #[allow(clippy::implicit_return)]
    async fn register(&self, registration: &Registration) -> Result<UserProfile> {
        self.record(format!("register:{}", registration.email));
        return Ok(UserProfile {
            full_name: registration.full_name.clone(),
            email: registration.email.to_string(),
        });
    }

    #[allow(clippy::implicit_return)]
    async fn list_courses(&self, token: &str) -> Result<Vec<Course>> {
        self.record(format!("list_courses:{token}"));
        let courses = self.script.lock().unwrap().courses.clone();
        self.hold("list_courses").await;
        return Ok(courses);
    }

    #[allow(clippy::implicit_return)]
    async fn create_course(&self, _token: &str, name: &str, subject: Option<&str>) -> Result<Course> {
        self.record(format!("create_course:{name}"));
        let mut script = self.script.lock().unwrap();
        if script.fail_create_course {
            return Err(server_error("Could not create course"));
        }
        let created = Course {
            id: script.next_course_id,
            name: name.to_string(),
            subject: subject.map(str::to_string),
        };
        script.next_course_id += 1;
        script.courses.push(created.clone());
        return Ok(created);
    }

    #[allow(clippy::implicit_return)]
    async fn list_summaries(&self, _token: &str, course_id: i64) -> Result<Vec<SavedSummary>> {
        self.record(format!("list_summaries:{course_id}"));
        return Ok(self.script.lock().unwrap().summaries.clone());
    }

    #[allow(clippy::implicit_return)]
    async fn save_summary(&self, _token: &str, summary: &NewSummary) -> Result<SavedSummary> {
        self.record(format!("save_summary:{}", summary.course_id));
        let mut script = self.script.lock().unwrap();
        if script.fail_save {
            return Err(server_error("Database unavailable"));
        }
        let saved = SavedSummary {
            id: script.summaries.len() as i64 + 1,
            title: Some(summary.title.to_string()),
            created_at: "2024-01-01T00:00:00".to_string(),
            slides_payload: summary.slides_payload.clone(),
        };
        script.summaries.push(saved.clone());
        return Ok(saved);
    }

    #[allow(clippy::implicit_return)]
    async fn extract(&self, file_name: &str, _bytes: Vec<u8>) -> Result<Extraction> {
        self.record(format!("extract:{file_name}"));
        return self
            .script
            .lock()
            .unwrap()
            .extraction
            .clone()
            .ok_or_else(|| return ClientError::Rejected("Please upload a .pptx file".to_string()).into());
    }

    #[allow(clippy::implicit_return)]
    async fn summarize_slide(&self, session: &DeckSession, slide: &Slide) -> Result<SlideSummary> {
        self.record(format!("summarize:{}", slide.page));
        self.hold("summarize").await;

        if self.script.lock().unwrap().failing_pages.contains(&slide.page) {
            return Err(server_error("Summarizer crashed"));
        }
        return Ok(SlideSummary {
            page: slide.page,
            title: slide.title.to_string(),
            bullets: vec![format!("{} point for {}", slide.title, session.id)],
        });
    }

    #[allow(clippy::implicit_return)]
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        self.record(format!("chat:{}", request.message));
        self.hold("chat").await;
        return self
            .script
            .lock()
            .unwrap()
            .chat_reply
            .clone()
            .ok_or_else(|| return server_error("Chat unavailable"));
    }

    #[allow(clippy::implicit_return)]
    async fn session_context(&self, session: &DeckSession) -> Result<SessionContext> {
        self.record(format!("session_context:{}", session.id));
        self.hold("session_context").await;
        return Ok(self.script.lock().unwrap().session_context.clone());
    }

    #[allow(clippy::implicit_return)]
    async fn generate(
        &self,
        _token: &str,
        kind: StudyKind,
        course_id: i64,
        _session_text: &str,
    ) -> Result<String> {
        self.record(format!("generate:{kind}:{course_id}"));
        self.hold("generate").await;
        return self
            .script
            .lock()
            .unwrap()
            .generated
            .clone()
            .ok_or_else(|| return server_error("Generation failed"));
    }

    #[allow(clippy::implicit_return)]
    async fn list_study_items(
        &self,
        _token: &str,
        kind: StudyKind,
        course_id: i64,
    ) -> Result<Vec<StudyItem>> {
        self.record(format!("list_study_items:{kind}:{course_id}"));
        return Ok(self.script.lock().unwrap().study_items.clone());
    }
}

pub struct Harness {
    pub orch: Orchestrator,
    pub backend: Arc<ScriptedBackend>,
    pub rx: mpsc::UnboundedReceiver<Event>,
    pub dir: TempDir,
}

impl Harness {
    /// Drains every event emitted so far.
    pub fn events(&mut self) -> Vec<Event> {
        let mut events = vec![];
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        return events;
    }

    /// Signs in without going through the backend.
    pub fn sign_in(&self) {
        self.orch.state().auth.identity = Some(AuthIdentity {
            token: "abc".to_string(),
            user: profile("ada@example.com"),
        });
    }

    pub fn select(&self, course: Course) {
        let mut state = self.orch.state();
        state.courses.courses.push(course.clone());
        state.courses.select(Some(course.id));
    }

    pub fn transcript(&self) -> Vec<TranscriptItem> {
        return self.orch.state().chats.current().items().to_vec();
    }

    pub fn deck_file(&self, name: &str) -> std::path::PathBuf {
        let file_path = self.dir.path().join(name);
        std::fs::write(&file_path, b"PK\x03\x04 fake deck").unwrap();
        return file_path;
    }
}

pub fn harness(script: Script) -> Harness {
    let dir = TempDir::new("lectern-test").unwrap();
    let store = LocalStore::open(dir.path().join("state.yaml"));
    let backend = Arc::new(ScriptedBackend::new(script));
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    let orch = Orchestrator::new(backend.clone(), store, tx);

    return Harness {
        orch,
        backend,
        rx,
        dir,
    };
}
