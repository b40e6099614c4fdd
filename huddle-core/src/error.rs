use thiserror::Error;

/// Reasons an inbound text frame is not a usable protocol message.
///
/// None of these close the connection; the frame is logged and dropped.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("message is not a JSON object")]
    NotAnObject,

    #[error("message has no string `type` field")]
    MissingType,

    #[error("unknown message type `{0}`")]
    UnknownType(String),

    #[error("`{kind}` message is missing required field `{field}`")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("`{kind}` message has an invalid `{field}` field")]
    InvalidField {
        kind: &'static str,
        field: &'static str,
    },
}
