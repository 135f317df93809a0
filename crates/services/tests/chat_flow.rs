use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use services::chat::{ASK_FALLBACK, ChatService};
use services::{ApiError, ChatApi};
use study_core::model::{
    AskAnswer, ChatId, ChatMessage, ChatRecord, ChatSummary, MessageRole, SourceRef, UserId,
};
use study_core::time::fixed_clock;

#[derive(Default)]
struct FakeChatApi {
    fail_ask: Mutex<bool>,
    records: Mutex<HashMap<ChatId, ChatRecord>>,
    save_count: Mutex<u32>,
}

#[async_trait]
impl ChatApi for FakeChatApi {
    async fn ask(
        &self,
        _user: &UserId,
        query: &str,
        _selected_documents: &[String],
        history: &[ChatMessage],
    ) -> Result<AskAnswer, ApiError> {
        if *self.fail_ask.lock().unwrap() {
            return Err(ApiError::from_status(500, None));
        }
        Ok(AskAnswer {
            answer: format!("answer to '{query}' (context: {} messages)", history.len()),
            sources: vec![SourceRef {
                filename: "cells.pdf".to_string(),
                chunk_index: 0,
            }],
        })
    }

    async fn list_chats(&self, _user: &UserId) -> Result<Vec<ChatSummary>, ApiError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .map(|record| ChatSummary {
                id: record.chat_id.clone(),
                title: record.title.clone(),
                updated_at: None,
            })
            .collect())
    }

    async fn save_chat(&self, _user: &UserId, record: &ChatRecord) -> Result<(), ApiError> {
        *self.save_count.lock().unwrap() += 1;
        self.records
            .lock()
            .unwrap()
            .insert(record.chat_id.clone(), record.clone());
        Ok(())
    }

    async fn load_chat(&self, _user: &UserId, id: &ChatId) -> Result<ChatRecord, ApiError> {
        self.records
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::from_status(404, Some("Chat not found".into())))
    }

    async fn delete_chat(&self, _user: &UserId, id: &ChatId) -> Result<(), ApiError> {
        self.records.lock().unwrap().remove(id);
        Ok(())
    }
}

fn service(api: &Arc<FakeChatApi>) -> ChatService {
    ChatService::new(api.clone(), UserId::new("u1"), fixed_clock())
        .with_autosave_delay(Duration::from_millis(50))
}

#[tokio::test]
async fn exchange_appends_user_and_assistant_messages() {
    let api = Arc::new(FakeChatApi::default());
    let mut chat = service(&api);
    chat.set_selected_documents(vec!["cells.pdf".to_string()]);

    let reply = chat.ask("What is a ribosome?").await;
    assert_eq!(reply.role, MessageRole::Assistant);
    assert_eq!(reply.sources.len(), 1);

    let messages = chat.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    // the first exchange goes out with empty history
    assert!(messages[1].content.contains("context: 0 messages"));

    let reply = chat.ask("And the nucleus?").await;
    // the second exchange carries the first as context
    assert!(reply.content.contains("context: 2 messages"));
}

#[tokio::test]
async fn failed_ask_appends_the_fallback_message() {
    let api = Arc::new(FakeChatApi::default());
    *api.fail_ask.lock().unwrap() = true;
    let mut chat = service(&api);

    let reply = chat.ask("Anyone there?").await;
    assert_eq!(reply.content, ASK_FALLBACK);
    assert_eq!(chat.messages().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn autosave_waits_for_the_debounce_delay() {
    let api = Arc::new(FakeChatApi::default());
    let mut chat = service(&api);
    chat.ask("first question").await;

    let save = chat.autosave().expect("transcript should be saved");
    let handle = tokio::spawn(save);

    // nothing persisted before the delay elapses
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(*api.save_count.lock().unwrap(), 0);

    handle.await.unwrap();
    assert_eq!(*api.save_count.lock().unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn chat_id_is_assigned_once_and_reused() {
    let api = Arc::new(FakeChatApi::default());
    let mut chat = service(&api);

    assert!(chat.chat_id().is_none());
    chat.ask("first").await;
    chat.autosave().unwrap().await;
    let first_id = chat.chat_id().cloned().unwrap();

    chat.ask("second").await;
    chat.autosave().unwrap().await;
    assert_eq!(chat.chat_id(), Some(&first_id));

    // both saves upserted the same record
    assert_eq!(api.records.lock().unwrap().len(), 1);
    let records = api.records.lock().unwrap();
    assert_eq!(records[&first_id].messages.len(), 4);
}

#[tokio::test]
async fn empty_transcript_schedules_no_autosave() {
    let api = Arc::new(FakeChatApi::default());
    let mut chat = service(&api);
    assert!(chat.autosave().is_none());
}

#[tokio::test]
async fn title_is_the_first_message_truncated() {
    let api = Arc::new(FakeChatApi::default());
    let mut chat = service(&api);
    let long = "x".repeat(80);
    chat.ask(&long).await;
    chat.save_now().await.unwrap();

    let id = chat.chat_id().cloned().unwrap();
    let records = api.records.lock().unwrap();
    assert_eq!(records[&id].title.chars().count(), 50);
}

#[tokio::test]
async fn load_replaces_the_current_conversation() {
    let api = Arc::new(FakeChatApi::default());
    let mut chat = service(&api);
    chat.set_selected_documents(vec!["cells.pdf".to_string()]);
    chat.ask("saved question").await;
    chat.save_now().await.unwrap();
    let saved_id = chat.chat_id().cloned().unwrap();

    let mut other = service(&api);
    other.ask("scratch question").await;
    other.load(&saved_id).await.unwrap();

    assert_eq!(other.chat_id(), Some(&saved_id));
    assert_eq!(other.messages().len(), 2);
    assert_eq!(other.messages()[0].content, "saved question");
    assert_eq!(other.selected_documents(), ["cells.pdf"]);
}

#[tokio::test]
async fn failed_load_keeps_the_current_conversation() {
    let api = Arc::new(FakeChatApi::default());
    let mut chat = service(&api);
    chat.ask("current question").await;

    let err = chat.load(&ChatId::new("missing")).await.unwrap_err();
    assert_eq!(err.to_string(), "Chat not found");
    assert_eq!(chat.messages().len(), 2);
    assert!(chat.chat_id().is_none());
}

#[tokio::test]
async fn deleting_the_open_chat_resets_it() {
    let api = Arc::new(FakeChatApi::default());
    let mut chat = service(&api);
    chat.ask("question").await;
    chat.save_now().await.unwrap();
    let id = chat.chat_id().cloned().unwrap();

    chat.delete(&id).await.unwrap();
    assert!(chat.chat_id().is_none());
    assert!(chat.messages().is_empty());
    assert!(api.records.lock().unwrap().is_empty());
    assert!(chat.list_saved().await.unwrap().is_empty());
}
