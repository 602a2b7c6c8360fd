use serde::{Deserialize, Serialize};

use crate::web::models::Message;

/// Session identifier used until an upload binds the chat to a document.
pub const DEFAULT_SESSION_ID: &str = "default";
/// Display name shown before any document is uploaded.
pub const DEFAULT_CHATBOT_NAME: &str = "Medical Chatbot";
/// Display name used when the backend suggests none for an upload.
pub const FALLBACK_CHATBOT_NAME: &str = "Custom Chatbot";

/// The two mutually exclusive page modes. The page starts on Upload and,
/// once on Chat, never goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Upload,
    Chat,
}

/// Handle for a user message whose reply is still in flight. Carries the
/// turn id so a rollback removes exactly the message it belongs to, even
/// with several exchanges in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTurn(u64);

#[derive(Debug)]
struct Turn {
    id: u64,
    message: Message,
}

/// In-memory page state: the active view, the backend session the chat is
/// bound to, and the conversation so far.
#[derive(Debug)]
pub struct UiState {
    view: View,
    session_id: String,
    chatbot_name: String,
    turns: Vec<Turn>,
    next_turn_id: u64,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            view: View::Upload,
            session_id: DEFAULT_SESSION_ID.to_string(),
            chatbot_name: DEFAULT_CHATBOT_NAME.to_string(),
            turns: Vec::new(),
            next_turn_id: 0,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn chatbot_name(&self) -> &str {
        &self.chatbot_name
    }

    /// Binds the chat to an uploaded document and switches views.
    /// Returns false once the chat has started; the session is therefore
    /// set at most once.
    pub fn attach_session(&mut self, session_id: String, chatbot_name: String) -> bool {
        if self.view == View::Chat {
            return false;
        }
        self.session_id = session_id;
        self.chatbot_name = chatbot_name;
        self.view = View::Chat;
        true
    }

    /// Switches to the chat view keeping the default session and name.
    pub fn enter_chat(&mut self) -> bool {
        if self.view == View::Chat {
            return false;
        }
        self.view = View::Chat;
        true
    }

    /// Records the user's side of an exchange before the backend round-trip.
    pub fn begin_turn(&mut self, content: impl Into<String>) -> PendingTurn {
        let id = self.push(Message::user(content));
        PendingTurn(id)
    }

    /// Appends the assistant reply of a completed exchange.
    pub fn complete_turn(&mut self, reply: impl Into<String>) {
        self.push(Message::assistant(reply));
    }

    /// Removes the user message of a failed exchange.
    pub fn rollback_turn(&mut self, pending: PendingTurn) {
        self.turns.retain(|turn| turn.id != pending.0);
    }

    /// The conversation in insertion order.
    pub fn messages(&self) -> Vec<Message> {
        self.turns.iter().map(|turn| turn.message.clone()).collect()
    }

    fn push(&mut self, message: Message) -> u64 {
        let id = self.next_turn_id;
        self.next_turn_id += 1;
        self.turns.push(Turn { id, message });
        id
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::models::Role;

    #[test]
    fn starts_on_upload_with_defaults() {
        let state = UiState::new();
        assert_eq!(state.view(), View::Upload);
        assert_eq!(state.session_id(), DEFAULT_SESSION_ID);
        assert_eq!(state.chatbot_name(), DEFAULT_CHATBOT_NAME);
        assert!(state.messages().is_empty());
    }

    #[test]
    fn attach_session_switches_to_chat_once() {
        let mut state = UiState::new();
        assert!(state.attach_session("abc123".into(), "GuideBot".into()));
        assert_eq!(state.view(), View::Chat);
        assert_eq!(state.session_id(), "abc123");
        assert_eq!(state.chatbot_name(), "GuideBot");

        // A second upload cannot rebind the session.
        assert!(!state.attach_session("other".into(), "OtherBot".into()));
        assert_eq!(state.session_id(), "abc123");
        assert_eq!(state.chatbot_name(), "GuideBot");
    }

    #[test]
    fn enter_chat_keeps_the_defaults() {
        let mut state = UiState::new();
        assert!(state.enter_chat());
        assert_eq!(state.view(), View::Chat);
        assert_eq!(state.session_id(), DEFAULT_SESSION_ID);
        assert_eq!(state.chatbot_name(), DEFAULT_CHATBOT_NAME);
        assert!(!state.enter_chat());
    }

    #[test]
    fn completed_exchange_ends_with_user_then_assistant() {
        let mut state = UiState::new();
        state.enter_chat();
        state.begin_turn("hello");
        state.complete_turn("hi there");

        let messages = state.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "hi there");
    }

    #[test]
    fn rollback_removes_only_its_own_turn() {
        let mut state = UiState::new();
        state.enter_chat();
        let first = state.begin_turn("first question");
        let _second = state.begin_turn("second question");

        state.rollback_turn(first);

        let messages = state.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "second question");
    }

    #[test]
    fn rollback_after_interleaved_completion_keeps_the_reply() {
        let mut state = UiState::new();
        state.enter_chat();
        let first = state.begin_turn("first");
        let _second = state.begin_turn("second");
        state.complete_turn("answer to second");
        state.rollback_turn(first);

        let contents: Vec<_> = state
            .messages()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["second", "answer to second"]);
    }
}
