use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use uuid::Uuid;

/// Takes the next value of an id counter. Running out of ids is fatal: a
/// wrapped counter would hand out ids that are still in use.
pub(crate) fn next_raw(counter: &AtomicU32) -> u32 {
    counter
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |raw| raw.checked_add(1))
        .expect("id space exhausted")
}

/// Identity of a node record within one family of module forks.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(u32);

impl TokenId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// The durable identity consumers track across edits. Unlike `NodeId` it
/// survives re-parsing whenever the correspondence engine recognizes a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExternalId(Uuid);

impl ExternalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ExternalId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ExternalId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use super::next_raw;

    #[test]
    fn counter_hands_out_consecutive_ids() {
        let counter = AtomicU32::new(7);
        assert_eq!(next_raw(&counter), 7);
        assert_eq!(next_raw(&counter), 8);
    }

    #[test]
    #[should_panic(expected = "id space exhausted")]
    fn exhausted_counter_does_not_wrap() {
        let counter = AtomicU32::new(u32::MAX - 1);
        assert_eq!(next_raw(&counter), u32::MAX - 1);
        next_raw(&counter);
    }
}
