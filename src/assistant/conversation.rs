//! Conversation normalizer
//!
//! The dashboard keeps the whole chat history in the browser and replays it
//! on every request, so the list arriving here can be unbalanced or start
//! with the canned welcome bubble. This module rebuilds a turn sequence the
//! provider will accept: a fixed instruction pair first, then the history
//! interleaved into strict user/assistant alternation.

use serde::{Deserialize, Serialize};

/// Static system instructions prepended (together with the grounding block)
/// as the first turn of every generation request.
pub const SYSTEM_INSTRUCTIONS: &str = "You are the risk analyst assistant of a public \
procurement monitoring dashboard. You answer questions about tender lots, their risk \
scores and the indicator codes that triggered them (for example SINGLE_BIDDER means a \
lot received exactly one bid). Base every factual claim on the risk data below; if the \
data does not cover a question, say so instead of guessing. Keep answers short and \
concrete.";

/// Fixed acknowledgement emitted as the second turn. Stands in for the UI's
/// welcome bubble, which is never resent to the provider.
pub const ACKNOWLEDGEMENT: &str = "Understood. I will answer using only the provided \
risk data for this workspace.";

/// Truncation policy: after the welcome bubble is dropped, only the most
/// recent turns of each role survive. Bounds request size despite the
/// client-held, unpruned history.
pub const MAX_TURNS_PER_ROLE: usize = 32;

/// Speaker role of one conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message of the normalized conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// One raw message as the chat UI sends it
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientMessage {
    pub role: Role,
    #[serde(default)]
    pub content: String,
}

/// Rebuild the provider-facing turn sequence from the raw client history.
///
/// Output always starts with the instruction turn (system prompt plus
/// grounding text) and the acknowledgement, then interleaves the surviving
/// history index-wise: `user[i]` if present, then `assistant[i]` if present.
/// The first assistant-authored input message (the welcome bubble) is dropped
/// before interleaving. Missing counterpart turns are omitted, never
/// synthesized. Pure and idempotent.
pub fn build_turns(history: &[ClientMessage], grounding: &str) -> Vec<Turn> {
    let mut users: Vec<&str> = Vec::new();
    let mut assistants: Vec<&str> = Vec::new();
    for message in history {
        match message.role {
            Role::User => users.push(&message.content),
            Role::Assistant => assistants.push(&message.content),
        }
    }

    // The welcome bubble is implied by the acknowledgement turn and must not
    // reach the provider.
    if !assistants.is_empty() {
        assistants.remove(0);
    }

    truncate_to_recent(&mut users);
    truncate_to_recent(&mut assistants);

    let mut turns = Vec::with_capacity(2 + users.len() + assistants.len());
    turns.push(Turn::user(format!("{SYSTEM_INSTRUCTIONS}\n\n{grounding}")));
    turns.push(Turn::assistant(ACKNOWLEDGEMENT));

    let rounds = users.len().max(assistants.len());
    for i in 0..rounds {
        if let Some(text) = users.get(i) {
            turns.push(Turn::user(*text));
        }
        if let Some(text) = assistants.get(i) {
            turns.push(Turn::assistant(*text));
        }
    }

    turns
}

fn truncate_to_recent(messages: &mut Vec<&str>) {
    if messages.len() > MAX_TURNS_PER_ROLE {
        let excess = messages.len() - MAX_TURNS_PER_ROLE;
        messages.drain(..excess);
    }
}
