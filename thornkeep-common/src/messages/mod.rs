use serde::{Deserialize, Serialize};

/// The three outbound frame kinds from §6 (`text`/`system`/`prompt`),
/// shared between the telnet and WebSocket listeners so a session's output
/// buffer doesn't need to know which transport it's writing to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputKind {
    Text,
    System,
    Prompt,
}

/// Player-to-player chat channels, formatted identically regardless of
/// transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatChannel {
    Say { speaker: String },
    Tell { from: String },
    Shout { speaker: String },
}

impl ChatChannel {
    pub fn format(&self, body: &str) -> String {
        match self {
            ChatChannel::Say { speaker } => format!("{speaker} says, \"{body}\""),
            ChatChannel::Tell { from } => format!("{from} tells you, \"{body}\""),
            ChatChannel::Shout { speaker } => format!("{speaker} shouts, \"{body}\""),
        }
    }
}
