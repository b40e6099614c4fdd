use crate::room::Room;
use crate::transport::PeerHandle;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::RefMut;
use huddle_core::{ClientId, RoomCode};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("room {room} is full ({capacity} participants)")]
    RoomFull { room: RoomCode, capacity: usize },
}

/// Room code -> members, shared by every connection task.
///
/// Each room's membership only changes inside its map entry lock, so the
/// ceiling check, insertion and the snapshot handed back to the caller are one
/// atomic step. Rooms that become empty are removed in the same step.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomCode, Room>>,
}

/// Snapshot of a room right after a successful join.
///
/// The room stays locked while this value is alive, so notifications sent
/// through it reach members in the order joins and leaves were applied. Only
/// non-blocking sends may happen while holding it, and the registry must not
/// be re-entered. Logging belongs after it is dropped.
pub struct Admission<'a> {
    room: RefMut<'a, RoomCode, Room>,
    joiner: ClientId,
    rejoined: bool,
    created: bool,
}

impl Admission<'_> {
    pub fn room_code(&self) -> &RoomCode {
        self.room.key()
    }

    /// Identities that were present before the joiner, in join order.
    pub fn participants(&self) -> Vec<ClientId> {
        self.room.others(&self.joiner).map(PeerHandle::id).collect()
    }

    pub fn others(&self) -> impl Iterator<Item = &PeerHandle> {
        self.room.others(&self.joiner)
    }

    /// True when the identity was already a member and only its handle changed.
    pub fn rejoined(&self) -> bool {
        self.rejoined
    }

    /// True when this join created the room.
    pub fn created(&self) -> bool {
        self.created
    }

    pub fn member_count(&self) -> usize {
        self.room.len()
    }
}

/// Result of a leave. Holds the room locked (when it still exists) until dropped.
pub struct Departure<'a> {
    removed: Option<PeerHandle>,
    remaining: Option<RefMut<'a, RoomCode, Room>>,
}

impl Departure<'_> {
    pub fn was_member(&self) -> bool {
        self.removed.is_some()
    }

    pub fn room_deleted(&self) -> bool {
        self.removed.is_some() && self.remaining.is_none()
    }

    pub fn remaining(&self) -> impl Iterator<Item = &PeerHandle> {
        self.remaining.iter().flat_map(|room| room.members())
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `handle` to the room, creating it on first use.
    ///
    /// With a `ceiling`, a join that would exceed it is refused. Re-joining with an
    /// identity that is already present replaces its handle and is always allowed.
    pub fn join(
        &self,
        code: &RoomCode,
        handle: PeerHandle,
        ceiling: Option<usize>,
    ) -> Result<Admission<'_>, RegistryError> {
        let joiner = handle.id();

        let (mut room, created) = match self.rooms.entry(code.clone()) {
            Entry::Occupied(entry) => (entry.into_ref(), false),
            Entry::Vacant(entry) => (entry.insert(Room::new()), true),
        };

        let rejoined = room.contains(&joiner);
        if let Some(capacity) = ceiling {
            if !rejoined && room.len() >= capacity {
                drop(room);
                if created {
                    self.rooms.remove_if(code, |_, room| room.is_empty());
                }
                return Err(RegistryError::RoomFull {
                    room: code.clone(),
                    capacity,
                });
            }
        }

        room.insert(handle);

        Ok(Admission {
            room,
            joiner,
            rejoined,
            created,
        })
    }

    /// Removes `id` from the room. Unknown rooms and identities are a no-op, since
    /// an explicit leave and the connection closing can both trigger this.
    pub fn leave(&self, code: &RoomCode, id: &ClientId) -> Departure<'_> {
        let Entry::Occupied(mut entry) = self.rooms.entry(code.clone()) else {
            return Departure {
                removed: None,
                remaining: None,
            };
        };

        let removed = entry.get_mut().remove(id);

        if entry.get().is_empty() {
            entry.remove();
            return Departure {
                removed,
                remaining: None,
            };
        }

        Departure {
            removed,
            remaining: Some(entry.into_ref()),
        }
    }

    pub fn route(&self, code: &RoomCode, target: &ClientId) -> Option<PeerHandle> {
        self.rooms.get(code)?.value().get(target).cloned()
    }

    pub fn broadcast(&self, code: &RoomCode, exclude: &ClientId) -> Vec<PeerHandle> {
        self.rooms
            .get(code)
            .map(|room| room.others(exclude).cloned().collect())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    pub fn member_count(&self, code: &RoomCode) -> usize {
        self.rooms.get(code).map(|room| room.len()).unwrap_or(0)
    }

    pub fn members(&self, code: &RoomCode) -> Vec<ClientId> {
        self.rooms.get(code).map(|room| room.ids()).unwrap_or_default()
    }
}
