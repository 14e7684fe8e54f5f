use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub subject: Option<String>,
}

impl Course {
    pub fn display_name(&self) -> String {
        match &self.subject {
            Some(subject) if !subject.trim().is_empty() => {
                return format!("{} · {}", self.name, subject.trim());
            }
            _ => return self.name.to_string(),
        }
    }
}

/// A summary the backend already stored for a course.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedSummary {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub slides_payload: serde_json::Value,
}

impl SavedSummary {
    pub fn display_title(&self) -> String {
        return match &self.title {
            Some(title) if !title.trim().is_empty() => title.to_string(),
            _ => "Untitled deck".to_string(),
        };
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewSummary {
    pub course_id: i64,
    pub session_id: String,
    pub source_filename: String,
    pub title: String,
    pub slides_payload: serde_json::Value,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum StudyKind {
    #[strum(serialize = "quiz")]
    Quiz,
    #[strum(serialize = "assignment")]
    Assignment,
}

impl StudyKind {
    /// Path segment the backend uses for this kind.
    pub fn path(&self) -> &'static str {
        match self {
            StudyKind::Quiz => return "quizzes",
            StudyKind::Assignment => return "assignments",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StudyKind::Quiz => return "Quiz",
            StudyKind::Assignment => return "Assignment",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyItem {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
}
