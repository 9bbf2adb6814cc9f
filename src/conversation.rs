use crate::{error::Error, message::Message};

/// Ordered, append-only log of one session's messages.
#[derive(Debug, Default, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` and returns the stored copy.
    pub fn append(&mut self, message: Message) -> Result<&Message, Error> {
        if message.text().trim().is_empty() {
            return Err(Error::EmptyMessage);
        }
        self.messages.push(message);
        Ok(&self.messages[self.messages.len() - 1])
    }

    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
