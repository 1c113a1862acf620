//! Sliding conversation window.

use std::collections::VecDeque;

use crate::types::{Message, Role};

/// Default number of messages kept in the window.
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Keeps the most recent messages of a conversation for the model context.
///
/// Holds at most `size` messages. After trimming, the window never starts
/// with an assistant message, so the model always sees a user turn first.
#[derive(Debug, Clone)]
pub struct ConversationWindow {
    messages: VecDeque<Message>,
    size: usize,
}

impl ConversationWindow {
    /// Create an empty window holding at most `size` messages.
    pub fn new(size: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            size,
        }
    }

    /// Create a window seeded with the tail of `history`.
    pub fn from_history(history: impl IntoIterator<Item = Message>, size: usize) -> Self {
        let mut window = Self::new(size);
        window.messages.extend(history);
        window.trim();
        window
    }

    /// Append a message, dropping the oldest ones to stay within the window.
    pub fn push(&mut self, message: Message) {
        self.messages.push_back(message);
        self.trim();
    }

    fn trim(&mut self) {
        while self.messages.len() > self.size {
            self.messages.pop_front();
        }
        while self
            .messages
            .front()
            .is_some_and(|m| m.role == Role::Assistant)
        {
            self.messages.pop_front();
        }
    }

    /// Messages in the window, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Number of messages in the window.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Maximum number of messages kept.
    pub fn size(&self) -> usize {
        self.size
    }
}
