use std::path::PathBuf;

use super::ChatId;
use super::Registration;
use super::StudyKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    CreateCourse(String, Option<String>),
    GenerateStudyItem(StudyKind),
    LoadChat(ChatId),
    Login(String, String),
    Logout(),
    NewChat(),
    RefreshCourses(),
    Register(Registration),
    RestoreSession(),
    SaveSummary(),
    SelectCourse(Option<i64>),
    SendMessage(String),
    ShowSavedSummary(i64),
    ToggleTheme(),
    UploadFile(PathBuf),
}
