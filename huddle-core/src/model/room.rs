use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Code naming a call room.
///
/// Codes are compared verbatim after trimming surrounding whitespace. Browser and
/// mobile clients upper-case codes before sending, the server does not.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Returns `None` when the code is empty after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim();
        if code.is_empty() {
            return None;
        }
        Some(Self(code.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RoomCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
