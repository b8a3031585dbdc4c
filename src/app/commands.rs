//! Inbound command model and the short-text interpreter.
//!
//! Every received text is checked against the configured trigger phrase.
//! Matching is ASCII case-insensitive substring containment; a
//! trigger-bearing body that also contains the stop phrase anywhere stops
//! the session. Anything else is not for us and propagates to other
//! consumers untouched.

use log::info;

/// A command interpreted from one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Begin a reporting session toward the originating address.
    Start { recipient: String },
    /// End the active session.
    Stop,
    /// Not addressed to us; deliver onward.
    Ignore,
}

impl Command {
    /// Whether the inbound message must be suppressed from further
    /// delivery. Trigger-bearing texts never reach the user's inbox.
    pub fn consumes_message(&self) -> bool {
        !matches!(self, Self::Ignore)
    }
}

/// Interpret one inbound message body.
///
/// Malformed or empty bodies carry no command; there is no error path.
pub fn interpret(body: &str, origin: &str, trigger_phrase: &str, stop_phrase: &str) -> Command {
    let body = body.to_ascii_lowercase();
    if !body.contains(&trigger_phrase.to_ascii_lowercase()) {
        return Command::Ignore;
    }
    if body.contains(&stop_phrase.to_ascii_lowercase()) {
        info!("interpreted stop command from {origin}");
        Command::Stop
    } else {
        info!("interpreted start command from {origin}");
        Command::Start {
            recipient: origin.to_owned(),
        }
    }
}
