use std::fmt;

/// Unique identifier issued by the noeqd service.
///
/// Opaque to the client: uniqueness is guaranteed by the server, no structure
/// is imposed on the bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u64);

impl Id {
    /// Decodes an identifier from its big-endian wire representation.
    pub const fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Id(u64::from_be_bytes(bytes))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Id(value)
    }
}

impl From<Id> for u64 {
    fn from(id: Id) -> u64 {
        id.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifiers returned by a single request.
///
/// A request for one identifier yields [`Ids::One`], anything larger yields
/// [`Ids::Many`] in the order the server sent them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ids {
    One(Id),
    Many(Vec<Id>),
}

impl Ids {
    pub(crate) fn from_vec(mut ids: Vec<Id>) -> Self {
        if ids.len() == 1 {
            Ids::One(ids.remove(0))
        } else {
            Ids::Many(ids)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Ids::One(_) => 1,
            Ids::Many(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the single identifier, or `None` for a batch.
    pub fn as_one(&self) -> Option<Id> {
        match self {
            Ids::One(id) => Some(*id),
            Ids::Many(_) => None,
        }
    }

    pub fn into_vec(self) -> Vec<Id> {
        match self {
            Ids::One(id) => vec![id],
            Ids::Many(ids) => ids,
        }
    }
}

impl IntoIterator for Ids {
    type Item = Id;
    type IntoIter = std::vec::IntoIter<Id>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_big_endian() {
        let id = Id::from_be_bytes([0x02, 0x02, 0xC7, 0x76, 0x3C, 0x80, 0x00, 0x00]);
        assert_eq!(u64::from(id), 144_897_448_664_367_104);
        assert_eq!(id.to_string(), "144897448664367104");
    }

    #[test]
    fn single_id_is_not_a_batch() {
        let ids = Ids::from_vec(vec![Id::from(7)]);
        assert_eq!(ids, Ids::One(Id::from(7)));
        assert_eq!(ids.as_one(), Some(Id::from(7)));
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn batch_keeps_order() {
        let ids = Ids::from_vec((1..=3).map(Id::from).collect());
        assert_eq!(ids.as_one(), None);
        let values: Vec<u64> = ids.into_iter().map(u64::from).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }
}
