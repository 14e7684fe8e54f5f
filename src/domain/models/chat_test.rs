use super::ChatLog;
use super::ChatSession;
use super::FollowUp;
use super::TranscriptItem;
use super::DEFAULT_CHAT_TITLE;
use crate::domain::models::Message;
use crate::domain::models::Sender;

fn text_item(text: &str) -> TranscriptItem {
    return TranscriptItem::Message(Message::new(Sender::User, text));
}

#[test]
fn it_creates_unique_ids() {
    let first = ChatSession::create_id();
    let second = ChatSession::create_id();
    assert_ne!(first, second);
}

#[test]
fn it_starts_with_a_default_chat() {
    let log = ChatLog::default();
    assert_eq!(log.current().title, DEFAULT_CHAT_TITLE);
    assert!(log.current().items().is_empty());
    assert_eq!(log.entries().len(), 1);
}

#[test]
fn it_appends_to_the_current_chat() {
    let mut log = ChatLog::default();
    log.append(text_item("Explain slide 3"));
    log.append(TranscriptItem::FollowUps(vec![FollowUp::GenerateQuiz]));

    assert_eq!(log.current().items().len(), 2);
    assert_eq!(log.current().items()[0], text_item("Explain slide 3"));
}

#[test]
fn it_appends_to_a_chat_that_is_not_visible() {
    let mut log = ChatLog::default();
    let first_id = log.current_id();
    log.start_new();

    assert!(log.append_to(&first_id, text_item("late reply")));
    assert!(!log.append_to("missing", text_item("dropped")));
    assert!(log.current().items().is_empty());
    assert_eq!(log.get(&first_id).unwrap().items().len(), 1);
}

#[test]
fn it_switches_between_chats() {
    let mut log = ChatLog::default();
    let first_id = log.current_id();
    log.append(text_item("first"));
    let second_id = log.start_new().id.to_string();

    assert_eq!(log.current_id(), second_id);
    assert_eq!(log.switch(&first_id).unwrap().items().len(), 1);
    assert_eq!(log.current_id(), first_id);
    assert!(log.switch("missing").is_none());
    assert_eq!(log.current_id(), first_id);
}

#[test]
fn it_renames_only_default_titles() {
    let mut log = ChatLog::default();
    let id = log.current_id();

    assert!(log.rename_if_default(&id, "Deck: Lecture3"));
    assert!(!log.rename_if_default(&id, "Deck: Lecture4"));
    assert_eq!(log.current().title, "Deck: Lecture3");
}

#[test]
fn it_lists_chats_with_content_and_the_current_one() {
    let mut log = ChatLog::default();
    log.append(text_item("kept"));
    log.start_new();
    log.start_new();

    let entries = log.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].id, log.current_id());
}

#[test]
fn it_labels_follow_ups() {
    assert_eq!(FollowUp::GenerateQuiz.to_string(), "Generate Quiz");
    assert_eq!(FollowUp::GenerateAssignment.to_string(), "Generate Assignment");
}
