use std::cell::Cell;
use std::rc::Rc;
use crate::{
    config::Config,
    conversation::Conversation,
    error::{Error, UpstreamError},
    llm::{self, ModelClient},
    message::Message,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingReply,
}

/// A submitted user message waiting for its reply. Hand it back to
/// [`ChatSession::finish_turn`] to close the turn; dropping it abandons the
/// turn and returns the session to Idle.
#[derive(Debug)]
#[must_use]
pub struct PendingTurn {
    user: Message,
    state: Rc<Cell<TurnState>>,
}

impl PendingTurn {
    pub fn text(&self) -> &str {
        self.user.text()
    }
}

impl Drop for PendingTurn {
    fn drop(&mut self) {
        self.state.set(TurnState::Idle);
    }
}

/// One person's conversation with the model. Dropping it ends the session.
pub struct ChatSession {
    client: Box<dyn ModelClient>,
    system_prompt: String,
    conversation: Conversation,
    context_window: usize,
    state: Rc<Cell<TurnState>>,
    last_turn_failed: bool,
}

impl ChatSession {
    pub fn start(config: &Config, system_prompt: String) -> Result<Self, Error> {
        Self::start_with(config, system_prompt, llm::connect)
    }

    /// Like [`ChatSession::start`] with an explicit client factory. The
    /// credential is checked before `connect` runs, so a missing key never
    /// reaches the network layer.
    pub fn start_with<F>(config: &Config, system_prompt: String, connect: F) -> Result<Self, Error>
    where
        F: FnOnce(&Config, &str) -> Result<Box<dyn ModelClient>, Error>,
    {
        let api_key = config.credential()?;
        if system_prompt.trim().is_empty() {
            return Err(Error::Configuration("system prompt is empty".to_string()));
        }
        let client = connect(config, api_key)?;
        let mut session = Self::with_client(system_prompt, client);
        session.context_window = config.context_window;
        log::info!("Chat session started ({} char system prompt)", session.system_prompt().len());
        Ok(session)
    }

    pub fn with_client(system_prompt: impl Into<String>, client: Box<dyn ModelClient>) -> Self {
        Self {
            client,
            system_prompt: system_prompt.into(),
            conversation: Conversation::new(),
            context_window: 0,
            state: Rc::new(Cell::new(TurnState::Idle)),
            last_turn_failed: false,
        }
    }

    /// Sends `text` with the full prior history and records the exchange.
    /// On failure the history is left exactly as it was.
    pub fn send(&mut self, text: &str) -> Result<&Message, Error> {
        let pending = self.begin_turn(text)?;
        let context = llm::context_window(self.conversation.history(), self.context_window);
        let outcome = self.client.generate(&self.system_prompt, context, pending.text());
        self.finish_turn(pending, outcome)
    }

    /// Idle -> AwaitingReply. A second submission before the first is
    /// finished is rejected, not queued.
    pub fn begin_turn(&mut self, text: &str) -> Result<PendingTurn, Error> {
        if self.state.get() == TurnState::AwaitingReply {
            return Err(Error::Busy);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyMessage);
        }
        self.state.set(TurnState::AwaitingReply);
        Ok(PendingTurn { user: Message::user(text), state: Rc::clone(&self.state) })
    }

    /// AwaitingReply -> Idle. The user message and the reply are recorded
    /// together or not at all.
    pub fn finish_turn(
        &mut self,
        pending: PendingTurn,
        outcome: Result<String, UpstreamError>,
    ) -> Result<&Message, Error> {
        self.state.set(TurnState::Idle);
        let outcome = outcome.and_then(|reply| {
            if reply.trim().is_empty() { Err(UpstreamError::EmptyReply) } else { Ok(reply) }
        });
        match outcome {
            Ok(reply) => {
                self.last_turn_failed = false;
                self.conversation.append(pending.user.clone())?;
                log::debug!("Turn complete, history has {} messages", self.conversation.len() + 1);
                self.conversation.append(Message::assistant(reply))
            }
            Err(e) => {
                self.last_turn_failed = true;
                log::warn!("Model call failed: {}", e);
                Err(Error::UpstreamUnavailable(e))
            }
        }
    }

    /// Throws the conversation away and starts over with the same client and
    /// system prompt.
    pub fn reset(&mut self) -> Result<(), Error> {
        if self.state.get() == TurnState::AwaitingReply {
            return Err(Error::Busy);
        }
        if !self.conversation.is_empty() {
            log::debug!("Discarding {} messages", self.conversation.len());
        }
        self.conversation = Conversation::new();
        self.last_turn_failed = false;
        log::info!("Chat session reset");
        Ok(())
    }

    pub fn history(&self) -> &[Message] {
        self.conversation.history()
    }

    #[cfg(test)]
    pub fn state(&self) -> TurnState {
        self.state.get()
    }

    pub fn last_turn_failed(&self) -> bool {
        self.last_turn_failed
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}
