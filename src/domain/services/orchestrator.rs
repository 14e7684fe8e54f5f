use std::str::FromStr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use tokio::sync::mpsc;

use super::AppState;
use super::LocalStore;
use super::StoreKey;
use super::Ticket;
use crate::domain::models::BackendBox;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::Sender;
use crate::domain::models::Theme;
use crate::domain::models::TranscriptItem;

/// Shared handle every flow runs against. Cloning is cheap and all clones see
/// the same state.
///
/// The state lock is only ever taken inside synchronous sections. No guard may
/// be held across an `.await`.
#[derive(Clone)]
pub struct Orchestrator {
    backend: BackendBox,
    state: Arc<Mutex<AppState>>,
    store: Arc<LocalStore>,
    tx: mpsc::UnboundedSender<Event>,
}

impl Orchestrator {
    pub fn new(
        backend: BackendBox,
        store: LocalStore,
        tx: mpsc::UnboundedSender<Event>,
    ) -> Orchestrator {
        let theme = store
            .get(StoreKey::Theme)
            .and_then(|value| return Theme::from_str(&value).ok())
            .unwrap_or_default();

        let app_state = AppState {
            theme,
            ..AppState::default()
        };

        return Orchestrator {
            backend,
            state: Arc::new(Mutex::new(app_state)),
            store: Arc::new(store),
            tx,
        };
    }

    pub fn state(&self) -> MutexGuard<'_, AppState> {
        return self.state.lock().unwrap_or_else(PoisonError::into_inner);
    }

    pub fn backend(&self) -> &BackendBox {
        return &self.backend;
    }

    pub fn store(&self) -> &LocalStore {
        return &self.store;
    }

    pub fn token(&self) -> Option<String> {
        return self.state().auth.token();
    }

    pub fn ticket(&self) -> Ticket {
        return self.state().ticket();
    }

    pub fn is_live(&self, ticket: &Ticket) -> bool {
        return self.state().is_live(ticket);
    }

    pub fn emit(&self, event: Event) {
        if self.tx.send(event).is_err() {
            tracing::debug!("event receiver dropped");
        }
    }

    /// Appends to the visible chat.
    pub fn append(&self, item: TranscriptItem) {
        let first_item = {
            let mut state = self.state();
            state.chats.append(item.clone());
            state.chats.current().items().len() == 1
        };

        self.emit(Event::TranscriptAppended(item));
        if first_item {
            self.emit_chat_list();
        }
    }

    /// Appends to the chat a flow started in. The item is only shown when that
    /// chat is still the visible one.
    pub fn append_to(&self, ticket: &Ticket, item: TranscriptItem) {
        let (visible, first_item) = {
            let mut state = self.state();
            if !state.chats.append_to(&ticket.chat_id, item.clone()) {
                return;
            }
            let first_item = state
                .chats
                .get(&ticket.chat_id)
                .map(|chat| return chat.items().len() == 1)
                .unwrap_or(false);
            (state.chats.current_id() == ticket.chat_id, first_item)
        };

        if visible {
            self.emit(Event::TranscriptAppended(item));
        }
        if first_item {
            self.emit_chat_list();
        }
    }

    pub fn notify(&self, mtype: MessageType, text: &str) {
        self.append(TranscriptItem::Message(Message::new_with_type(
            Sender::Ai,
            mtype,
            text,
        )));
    }

    pub fn notify_to(&self, ticket: &Ticket, mtype: MessageType, text: &str) {
        self.append_to(
            ticket,
            TranscriptItem::Message(Message::new_with_type(Sender::Ai, mtype, text)),
        );
    }

    pub fn emit_chat_list(&self) {
        let (entries, current) = {
            let state = self.state();
            (state.chats.entries(), state.chats.current_id())
        };
        self.emit(Event::ChatListChanged(entries, current));
    }

    /// Writes through to the local store. Failures are logged and otherwise
    /// ignored, the in-memory state stays authoritative for this run.
    pub fn remember(&self, key: StoreKey, value: Option<&str>) {
        let res = match value {
            Some(value) => self.store.set(key, value),
            None => self.store.remove(key),
        };

        if let Err(err) = res {
            tracing::warn!(key = %key, error = ?err, "failed to update local state");
        }
    }

    pub fn toggle_theme(&self) -> Theme {
        let theme = {
            let mut state = self.state();
            state.theme = state.theme.toggled();
            state.theme
        };

        self.remember(StoreKey::Theme, Some(&theme.to_string()));
        self.emit(Event::ThemeChanged(theme));

        return theme;
    }
}
