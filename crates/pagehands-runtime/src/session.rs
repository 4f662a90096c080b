//! Per-tab conversation session.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pagehands_protocols::page::PageContext;
use pagehands_protocols::types::Message;

/// Conversation state for one tab.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub tab_id: String,
    pub history: Vec<Message>,
    pub page_context: Option<PageContext>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(tab_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            tab_id: tab_id.into(),
            history: Vec::new(),
            page_context: None,
            created_at: now,
            last_activity: now,
        }
    }

    /// Update last activity time.
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn push(&mut self, message: Message) {
        self.history.push(message);
    }

    /// Keep only the most recent `max` messages.
    pub fn trim_history(&mut self, max: usize) {
        if self.history.len() > max {
            let excess = self.history.len() - max;
            self.history.drain(..excess);
        }
    }

    /// Whether the session has been idle for longer than `ttl`.
    pub fn is_idle(&self, ttl: chrono::Duration, now: DateTime<Utc>) -> bool {
        now - self.last_activity > ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagehands_protocols::types::{MessageRole, ToolCall};

    fn turn(session: &mut Session, text: &str) {
        session.push(Message::user(text));
        session.push(Message::assistant(format!("re: {}", text)));
    }

    #[test]
    fn test_session_creation() {
        let session = Session::new("tab-1");
        assert_eq!(session.tab_id, "tab-1");
        assert!(session.history.is_empty());
        assert!(session.page_context.is_none());
        assert_eq!(session.created_at, session.last_activity);
    }

    #[test]
    fn test_trim_keeps_most_recent() {
        let mut session = Session::new("t");
        for i in 0..15 {
            turn(&mut session, &format!("m{}", i));
        }
        session.trim_history(20);
        assert_eq!(session.history.len(), 20);
        assert_eq!(session.history[0].content, "m5");
        assert_eq!(session.history[19].content, "re: m14");
    }

    #[test]
    fn test_trim_noop_under_limit() {
        let mut session = Session::new("t");
        turn(&mut session, "a");
        session.trim_history(20);
        assert_eq!(session.history.len(), 2);
    }

    #[test]
    fn test_trim_is_plain_window_over_tool_turns() {
        let mut session = Session::new("t");
        for i in 0..3 {
            let id = format!("c{}", i);
            session.push(Message::user(format!("click {}", i)));
            session.push(Message::assistant_with_tools(
                "",
                vec![ToolCall::new(id.as_str(), "click_element", "{}")],
            ));
            session.push(Message::tool(id.as_str(), "{}"));
            session.push(Message::assistant(format!("clicked {}", i)));
        }
        assert_eq!(session.history.len(), 12);

        session.trim_history(7);
        assert_eq!(session.history.len(), 7);
        // Window opens on the tool call of the second turn.
        assert_eq!(session.history[0].role, MessageRole::Assistant);
        assert_eq!(session.history[0].tool_calls[0].id, "c1");
        assert_eq!(session.history[6].content, "clicked 2");
    }

    #[test]
    fn test_trim_without_user_in_window_keeps_raw_window() {
        let mut session = Session::new("t");
        session.push(Message::user("go"));
        session.push(Message::assistant_with_tools(
            "",
            vec![ToolCall::new("c1", "scroll_page", "{}")],
        ));
        session.push(Message::tool("c1", "{}"));
        session.push(Message::assistant("scrolled"));
        session.trim_history(2);
        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history[1].content, "scrolled");
    }

    #[test]
    fn test_is_idle() {
        let mut session = Session::new("t");
        let now = Utc::now();
        session.last_activity = now - chrono::Duration::hours(2);
        assert!(session.is_idle(chrono::Duration::hours(1), now));
        session.last_activity = now;
        assert!(!session.is_idle(chrono::Duration::hours(1), now));
    }
}
