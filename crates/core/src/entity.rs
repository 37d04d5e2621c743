//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Linear lookup by identity over a snapshot slice.
///
/// Snapshots are small (a studio holds tens of items), so no index is kept.
pub fn find_by_id<'a, E: Entity>(items: &'a [E], id: &E::Id) -> Option<&'a E> {
    items.iter().find(|item| item.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Room {
        id: u32,
        name: &'static str,
    }

    impl Entity for Room {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    #[test]
    fn find_by_id_returns_first_match() {
        let rooms = [Room { id: 1, name: "a" }, Room { id: 2, name: "b" }];
        assert_eq!(find_by_id(&rooms, &2).map(|r| r.name), Some("b"));
        assert!(find_by_id(&rooms, &3).is_none());
    }
}
