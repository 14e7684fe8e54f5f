use super::ChatEntry;
use super::ChatId;
use super::Course;
use super::PipelineStage;
use super::Progress;
use super::SavedSummary;
use super::StudyItem;
use super::StudyKind;
use super::Theme;
use super::TranscriptItem;
use super::UserProfile;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CourseResolution {
    Reused,
    Created,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    AuthChanged(Option<UserProfile>),
    ChatListChanged(Vec<ChatEntry>, ChatId),
    CourseAutoResolved(Course, CourseResolution),
    CoursesChanged(Vec<Course>, Option<i64>),
    FileSelectionCleared(),
    PipelineProgress(Progress),
    SlidesHighlighted(Vec<u32>),
    StageChanged(PipelineStage),
    StudyItemsChanged(StudyKind, Vec<StudyItem>),
    SummariesChanged(Vec<SavedSummary>),
    ThemeChanged(Theme),
    /// An item was added to the visible chat.
    TranscriptAppended(TranscriptItem),
    /// The visible transcript should be redrawn from scratch.
    TranscriptReplaced(Vec<TranscriptItem>),
}
