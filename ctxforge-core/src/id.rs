//! Opaque identifier generation for store entities
//!
//! Ids combine a random fragment with the creation timestamp, so two ids can
//! only collide if a v4 uuid prefix repeats within the same millisecond.
//! Collisions are not detected or retried; the contract only asks for local
//! uniqueness within one process lifetime.

use chrono::Utc;
use uuid::Uuid;

/// Length of the random fragment taken from the uuid's simple encoding.
const RANDOM_LEN: usize = 12;

/// Generator for short opaque entity ids.
///
/// Ids are map keys, nothing more: not sortable, not predictable, not
/// cryptographically secure.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdGenerator;

impl IdGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Produce a fresh id, e.g. `"3f9c2a7d81e4-18f2c9a3b70"`.
    pub fn next(&self) -> String {
        let random = Uuid::new_v4().simple().to_string();
        let millis = Utc::now().timestamp_millis().max(0);
        format!("{}-{:x}", &random[..RANDOM_LEN], millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_pairwise_distinct() {
        let generator = IdGenerator::new();
        let ids: HashSet<String> = (0..10_000).map(|_| generator.next()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_id_shape() {
        let id = IdGenerator::new().next();
        let (random, millis) = id.split_once('-').expect("id has a time suffix");
        assert_eq!(random.len(), RANDOM_LEN);
        assert!(random.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!millis.is_empty());
    }
}
