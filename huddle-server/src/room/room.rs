use crate::transport::PeerHandle;
use huddle_core::ClientId;

/// Members of one room, in join order.
///
/// Rooms hold a handful of participants, so a vector with linear lookup is
/// enough and keeps `participants` lists stable for clients.
#[derive(Debug, Default)]
pub struct Room {
    members: Vec<PeerHandle>,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &ClientId) -> bool {
        self.members.iter().any(|m| m.id() == *id)
    }

    pub fn get(&self, id: &ClientId) -> Option<&PeerHandle> {
        self.members.iter().find(|m| m.id() == *id)
    }

    /// Inserts or replaces the handle registered for `handle.id()`.
    /// Returns the replaced handle on re-join.
    pub fn insert(&mut self, handle: PeerHandle) -> Option<PeerHandle> {
        match self.members.iter_mut().find(|m| m.id() == handle.id()) {
            Some(existing) => Some(std::mem::replace(existing, handle)),
            None => {
                self.members.push(handle);
                None
            }
        }
    }

    pub fn remove(&mut self, id: &ClientId) -> Option<PeerHandle> {
        let index = self.members.iter().position(|m| m.id() == *id)?;
        Some(self.members.remove(index))
    }

    pub fn members(&self) -> impl Iterator<Item = &PeerHandle> {
        self.members.iter()
    }

    pub fn others<'a>(&'a self, exclude: &'a ClientId) -> impl Iterator<Item = &'a PeerHandle> {
        self.members.iter().filter(move |m| m.id() != *exclude)
    }

    pub fn ids(&self) -> Vec<ClientId> {
        self.members.iter().map(PeerHandle::id).collect()
    }
}
