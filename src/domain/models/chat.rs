#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

use chrono::Utc;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use uuid::Uuid;

use super::Message;
use super::SlideCard;

pub type ChatId = String;

pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum FollowUp {
    #[strum(serialize = "Generate Quiz")]
    GenerateQuiz,
    #[strum(serialize = "Generate Assignment")]
    GenerateAssignment,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranscriptItem {
    Message(Message),
    SlideCard(SlideCard),
    FollowUps(Vec<FollowUp>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatEntry {
    pub id: ChatId,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: ChatId,
    pub title: String,
    items: Vec<TranscriptItem>,
}

impl Default for ChatSession {
    fn default() -> ChatSession {
        return ChatSession {
            id: ChatSession::create_id(),
            title: DEFAULT_CHAT_TITLE.to_string(),
            items: vec![],
        };
    }
}

impl ChatSession {
    /// Millisecond timestamp plus a short random suffix, so two chats created in
    /// the same millisecond still get distinct ids.
    pub fn create_id() -> ChatId {
        let suffix = Uuid::new_v4()
            .to_string()
            .split('-')
            .next()
            .unwrap_or_default()
            .to_string();

        return format!("{}-{suffix}", Utc::now().timestamp_millis());
    }

    pub fn items(&self) -> &[TranscriptItem] {
        return &self.items;
    }

    pub fn has_default_title(&self) -> bool {
        return self.title == DEFAULT_CHAT_TITLE;
    }

    fn push(&mut self, item: TranscriptItem) {
        self.items.push(item);
    }
}

/// Every chat of this process, plus which one is visible. Transcripts only grow.
#[derive(Clone, Debug)]
pub struct ChatLog {
    chats: Vec<ChatSession>,
    current: usize,
}

impl Default for ChatLog {
    fn default() -> ChatLog {
        return ChatLog {
            chats: vec![ChatSession::default()],
            current: 0,
        };
    }
}

impl ChatLog {
    pub fn current(&self) -> &ChatSession {
        return &self.chats[self.current];
    }

    pub fn current_id(&self) -> ChatId {
        return self.current().id.to_string();
    }

    pub fn get(&self, id: &str) -> Option<&ChatSession> {
        return self.chats.iter().find(|chat| return chat.id == id);
    }

    pub fn append(&mut self, item: TranscriptItem) {
        self.chats[self.current].push(item);
    }

    /// Appends to a specific chat, which may no longer be the visible one.
    /// Returns false when no chat has that id.
    pub fn append_to(&mut self, id: &str, item: TranscriptItem) -> bool {
        if let Some(chat) = self.chats.iter_mut().find(|chat| return chat.id == id) {
            chat.push(item);
            return true;
        }

        return false;
    }

    pub fn start_new(&mut self) -> &ChatSession {
        self.chats.push(ChatSession::default());
        self.current = self.chats.len() - 1;
        return self.current();
    }

    pub fn switch(&mut self, id: &str) -> Option<&ChatSession> {
        let idx = self.chats.iter().position(|chat| return chat.id == id)?;
        self.current = idx;
        return Some(self.current());
    }

    /// Renames a chat that still carries the default title. A chat is renamed
    /// from its content at most once.
    pub fn rename_if_default(&mut self, id: &str, title: &str) -> bool {
        if let Some(chat) = self.chats.iter_mut().find(|chat| return chat.id == id) {
            if chat.has_default_title() {
                chat.title = title.to_string();
                return true;
            }
        }

        return false;
    }

    /// Chats worth listing: anything with content, and always the current one.
    pub fn entries(&self) -> Vec<ChatEntry> {
        return self
            .chats
            .iter()
            .enumerate()
            .filter(|(idx, chat)| return *idx == self.current || !chat.items.is_empty())
            .map(|(_, chat)| {
                return ChatEntry {
                    id: chat.id.to_string(),
                    title: chat.title.to_string(),
                };
            })
            .collect();
    }
}
