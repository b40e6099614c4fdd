use crate::error::ProtocolError;
use crate::model::client::ClientId;
use crate::model::room::RoomCode;
use serde::Serialize;
use serde_json::{Map, Value};

/// Negotiation messages that are forwarded to a single `targetId` without
/// being interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayKind {
    Offer,
    Answer,
    IceCandidate,
    EncryptionKey,
    EncryptionDisabled,
    Reaction,
}

impl RelayKind {
    pub const ALL: [RelayKind; 6] = [
        RelayKind::Offer,
        RelayKind::Answer,
        RelayKind::IceCandidate,
        RelayKind::EncryptionKey,
        RelayKind::EncryptionDisabled,
        RelayKind::Reaction,
    ];

    pub fn from_type(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelayKind::Offer => "offer",
            RelayKind::Answer => "answer",
            RelayKind::IceCandidate => "ice-candidate",
            RelayKind::EncryptionKey => "encryption-key",
            RelayKind::EncryptionDisabled => "encryption-disabled",
            RelayKind::Reaction => "reaction",
        }
    }

    /// Payload fields of which at least one must be present (and non-null).
    /// An empty slice means the message carries no payload.
    fn payload_fields(self) -> &'static [&'static str] {
        match self {
            RelayKind::Offer => &["sdp", "offer"],
            RelayKind::Answer => &["sdp", "answer"],
            RelayKind::IceCandidate => &["candidate"],
            RelayKind::EncryptionKey => &["key"],
            RelayKind::EncryptionDisabled => &[],
            RelayKind::Reaction => &["emoji"],
        }
    }
}

/// A targeted negotiation message, kept as the exact JSON object the sender
/// wrote so it can be forwarded verbatim.
///
/// The workspace builds `serde_json` with `preserve_order` and
/// `arbitrary_precision`, so key order and number text survive the round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayEnvelope {
    kind: RelayKind,
    target: ClientId,
    body: Map<String, Value>,
}

impl RelayEnvelope {
    fn from_body(kind: RelayKind, body: Map<String, Value>) -> Result<Self, ProtocolError> {
        let tag = kind.as_str();

        let target = match body.get("targetId") {
            None | Some(Value::Null) => {
                return Err(ProtocolError::MissingField {
                    kind: tag,
                    field: "targetId",
                });
            }
            Some(value) => value
                .as_str()
                .and_then(|s| s.parse::<ClientId>().ok())
                .ok_or(ProtocolError::InvalidField {
                    kind: tag,
                    field: "targetId",
                })?,
        };

        let fields = kind.payload_fields();
        let has_payload = fields
            .iter()
            .any(|field| body.get(*field).is_some_and(|v| !v.is_null()));
        if !fields.is_empty() && !has_payload {
            return Err(ProtocolError::MissingField {
                kind: tag,
                field: fields[0],
            });
        }

        Ok(Self { kind, target, body })
    }

    pub fn kind(&self) -> RelayKind {
        self.kind
    }

    pub fn target(&self) -> ClientId {
        self.target
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Overwrites `senderId` with the identity the server knows the sender by.
    /// An existing `senderId` keeps its position, otherwise it is appended.
    pub fn stamp(mut self, sender: ClientId) -> Map<String, Value> {
        self.body
            .insert("senderId".to_owned(), Value::String(sender.to_string()));
        self.body
    }

    pub fn into_stamped_text(self, sender: ClientId) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Value::Object(self.stamp(sender)))
    }
}

/// Inbound messages, dispatched on the `type` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Auth { token: String },
    Join { room: RoomCode },
    Relay(RelayEnvelope),
    Leave { room: RoomCode },
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(body) = value else {
            return Err(ProtocolError::NotAnObject);
        };

        let Some(tag) = body.get("type").and_then(Value::as_str).map(str::to_owned) else {
            return Err(ProtocolError::MissingType);
        };

        match tag.as_str() {
            "auth" => {
                let token = required_str(&body, "auth", "token")?;
                Ok(ClientMessage::Auth {
                    token: token.to_owned(),
                })
            }
            "join" => Ok(ClientMessage::Join {
                room: room_field(&body, "join")?,
            }),
            "leave" => Ok(ClientMessage::Leave {
                room: room_field(&body, "leave")?,
            }),
            other => match RelayKind::from_type(other) {
                Some(kind) => RelayEnvelope::from_body(kind, body).map(ClientMessage::Relay),
                None => Err(ProtocolError::UnknownType(tag)),
            },
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ClientMessage::Auth { .. } => "auth",
            ClientMessage::Join { .. } => "join",
            ClientMessage::Relay(envelope) => envelope.kind().as_str(),
            ClientMessage::Leave { .. } => "leave",
        }
    }
}

fn required_str<'a>(
    body: &'a Map<String, Value>,
    kind: &'static str,
    field: &'static str,
) -> Result<&'a str, ProtocolError> {
    match body.get(field) {
        None | Some(Value::Null) => Err(ProtocolError::MissingField { kind, field }),
        Some(value) => value
            .as_str()
            .ok_or(ProtocolError::InvalidField { kind, field }),
    }
}

fn room_field(body: &Map<String, Value>, kind: &'static str) -> Result<RoomCode, ProtocolError> {
    let raw = required_str(body, kind, "roomId")?;
    RoomCode::parse(raw).ok_or(ProtocolError::InvalidField {
        kind,
        field: "roomId",
    })
}

/// Messages generated by the server itself. Relayed negotiation messages are
/// not represented here, they leave as the sender's JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Authenticated {
        client_id: ClientId,
    },
    Joined {
        room_id: RoomCode,
        client_id: ClientId,
        participants: Vec<ClientId>,
    },
    RoomFull {
        room_id: RoomCode,
        capacity: usize,
    },
    PeerJoined {
        client_id: ClientId,
    },
    PeerLeft {
        client_id: ClientId,
    },
}

impl ServerMessage {
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
