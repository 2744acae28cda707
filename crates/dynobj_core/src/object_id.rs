//! Object identifier.

use std::fmt;
use uuid::Uuid;

/// Identifier of a persisted object.
///
/// Object IDs are 128-bit UUIDs. The nil UUID is the empty id and means
/// "not yet assigned". Once a non-empty id has been assigned to an object
/// it is never reassigned.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ObjectId([u8; 16]);

impl ObjectId {
    /// The empty (unassigned) id.
    pub const EMPTY: Self = Self([0; 16]);

    /// Creates an object ID from raw bytes.
    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Creates a new random object ID.
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4().into_bytes())
    }

    /// Creates an object ID from a UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.into_bytes())
    }

    /// Returns the raw bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Converts to a UUID.
    #[must_use]
    pub fn to_uuid(&self) -> Uuid {
        Uuid::from_bytes(self.0)
    }

    /// Returns true for the unassigned id.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == [0; 16]
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_uuid())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uuid())
    }
}

impl From<Uuid> for ObjectId {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl From<ObjectId> for Uuid {
    fn from(id: ObjectId) -> Self {
        id.to_uuid()
    }
}

impl From<[u8; 16]> for ObjectId {
    fn from(bytes: [u8; 16]) -> Self {
        Self::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_unique_and_not_empty() {
        let id1 = ObjectId::new_random();
        let id2 = ObjectId::new_random();
        assert_ne!(id1, id2);
        assert!(!id1.is_empty());
    }

    #[test]
    fn default_is_empty() {
        assert!(ObjectId::default().is_empty());
        assert_eq!(ObjectId::default(), ObjectId::EMPTY);
        assert_eq!(ObjectId::EMPTY.to_uuid(), Uuid::nil());
    }

    #[test]
    fn uuid_conversion() {
        let uuid = Uuid::new_v4();
        let id = ObjectId::from_uuid(uuid);
        assert_eq!(id.to_uuid(), uuid);
        assert_eq!(Uuid::from(id), uuid);
    }

    #[test]
    fn display() {
        let id = ObjectId::from_bytes([0; 16]);
        assert_eq!(format!("{id}"), "00000000-0000-0000-0000-000000000000");
    }
}
