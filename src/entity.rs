use crate::byte_string::ByteString;

/// A consumer of [ByteString]: it holds exactly one as its name and only ever
/// hands out shared references to it.
pub struct Entity {
    name: ByteString,
}

impl Entity {
    /// Takes ownership of `name`. The by-value parameter means the caller
    /// hands over a value it will not use again, so no duplication happens.
    pub fn new(mut name: ByteString) -> Self {
        tracing::debug!("Entity took ownership of its name ({} bytes)", name.len());
        // Route the buffer through take() so the transfer shows up in the
        // diagnostics and the tally; the leftover shell releases nothing.
        Self { name: name.take() }
    }

    /// Duplicates `name` into the entity. The caller keeps its value; the
    /// entity pays for one extra allocation instead.
    pub fn from_name(name: &ByteString) -> Self {
        tracing::debug!("Entity duplicated its name ({} bytes)", name.len());
        Self { name: name.clone() }
    }

    pub fn name(&self) -> &ByteString {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit;

    #[test]
    fn taking_a_temporary_costs_one_allocation() {
        let before = audit::snapshot();
        let entity = Entity::new(ByteString::from("Foo"));
        let delta = audit::snapshot().since(&before);
        assert_eq!(b"Foo", entity.name().as_bytes());
        assert_eq!(1, delta.allocations);
        assert_eq!(1, delta.transfers);
        assert_eq!(0, delta.duplications);
        assert_eq!(0, delta.releases);
    }

    #[test]
    fn duplicating_a_named_value_costs_two_allocations() {
        let before = audit::snapshot();
        let name = ByteString::from("Bar");
        let entity = Entity::from_name(&name);
        let delta = audit::snapshot().since(&before);
        assert_eq!(b"Bar", name.as_bytes());
        assert_eq!(b"Bar", entity.name().as_bytes());
        assert_eq!(2, delta.allocations);
        assert_eq!(1, delta.duplications);
        assert_eq!(0, delta.transfers);
    }

    #[test]
    fn the_taken_name_is_released_with_the_entity() {
        let entity = Entity::new(ByteString::from("Foo"));
        let before = audit::snapshot();
        drop(entity);
        let delta = audit::snapshot().since(&before);
        assert_eq!(1, delta.releases);
        assert_eq!(3, delta.released_bytes);
    }
}
