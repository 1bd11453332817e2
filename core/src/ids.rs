//! Identifier generation for command UUIDs and temp IDs.

use uuid::Uuid;

/// Source of fresh identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> Uuid;
}

/// Random version-4 UUIDs from the OS random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Counts up from a starting value. Gives reproducible request bodies for
/// test vectors and snapshot comparisons; never use it against the live API.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    pub fn starting_at(first: u128) -> Self {
        Self { next: first }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> Uuid {
        let id = Uuid::from_u128(self.next);
        self.next += 1;
        id
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for &mut G {
    fn next_id(&mut self) -> Uuid {
        (**self).next_id()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn random_ids_are_v4() {
        let id = RandomIds.next_id();
        assert_eq!(id.get_version_num(), 4);
    }

    #[test]
    fn random_ids_do_not_collide() {
        let mut ids = RandomIds;
        let seen: HashSet<Uuid> = (0..10_000).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 10_000);
    }

    #[test]
    fn sequential_ids_count_up() {
        let mut ids = SequentialIds::starting_at(7);
        assert_eq!(ids.next_id(), Uuid::from_u128(7));
        assert_eq!(ids.next_id(), Uuid::from_u128(8));
    }
}
