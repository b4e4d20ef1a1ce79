/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Placeholder shown while waiting for the assistant. Rendered as a spinner.
    pub pending: bool,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// Append-only transcript, except for the pending placeholder
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    pub scroll: u16,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn add_message(&mut self, role: ChatRole, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role,
            content: content.into(),
            pending: false,
        });
    }

    pub fn push_pending(&mut self) {
        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: String::new(),
            pending: true,
        });
    }

    /// Remove the last entry if, and only if, it is the pending placeholder.
    pub fn remove_pending(&mut self) -> bool {
        if self.messages.last().is_some_and(|m| m.pending) {
            self.messages.pop();
            true
        } else {
            false
        }
    }

    /// Scroll so the newest entry is visible
    pub fn scroll_to_bottom(&mut self, width: u16, height: u16) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if width > 0 { width as usize } else { 50 };

        let mut total_lines: u16 = 0;
        for msg in &self.messages {
            total_lines = total_lines.saturating_add(1); // Role line
            if msg.pending {
                total_lines = total_lines.saturating_add(1);
            }
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                let wrapped = if char_count == 0 { 1 } else { (char_count / wrap_width) + 1 };
                total_lines = total_lines.saturating_add(wrapped as u16);
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }

        let visible_height = if height > 0 { height } else { 20 };
        self.scroll = total_lines.saturating_sub(visible_height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_pending(log: &ChatLog) -> bool {
        log.messages().iter().any(|m| m.pending)
    }

    #[test]
    fn appends_in_order() {
        let mut log = ChatLog::new();
        log.add_message(ChatRole::User, "best MOFs for CO2?");
        log.add_message(ChatRole::Assistant, "Try UiO-66-NH2.");

        let roles: Vec<ChatRole> = log.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant]);
        assert_eq!(log.messages()[0].content, "best MOFs for CO2?");
    }

    #[test]
    fn remove_pending_only_touches_placeholder() {
        let mut log = ChatLog::new();
        log.add_message(ChatRole::User, "hi");
        assert!(!log.remove_pending());
        assert_eq!(log.messages().len(), 1);

        log.push_pending();
        assert!(has_pending(&log));
        assert!(log.remove_pending());
        assert_eq!(log.messages().len(), 1);
        assert!(!has_pending(&log));
    }

    #[test]
    fn scroll_follows_newest_entry() {
        let mut log = ChatLog::new();
        for i in 0..30 {
            log.add_message(ChatRole::User, format!("message {i}"));
        }
        log.scroll_to_bottom(40, 10);
        // 30 messages * 3 lines each, minus the visible window
        assert_eq!(log.scroll, 80);

        let mut short = ChatLog::new();
        short.add_message(ChatRole::User, "one");
        short.scroll_to_bottom(40, 10);
        assert_eq!(short.scroll, 0);
    }
}
