//! Room record: a named member set.

use std::collections::HashSet;

/// A room and its current members.
///
/// Members are identity ids, not owned sessions; the session registry
/// owns session lifetime. Rooms are created lazily on the first join
/// naming an unknown id and never destroyed.
pub struct Room {
    /// Room id.
    pub id: String,
    /// Display name (`Room-{id}` for lazily created rooms).
    pub name: String,
    members: HashSet<String>,
}

impl Room {
    /// Create an empty room.
    pub fn new(id: &str, name: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            name: name.into(),
            members: HashSet::new(),
        }
    }

    /// Add a member. Returns false when the identity was already a
    /// member; the set never holds an identity twice.
    pub fn add_member(&mut self, user_id: &str) -> bool {
        self.members.insert(user_id.to_string())
    }

    /// Remove a member. Absent identity is a no-op.
    pub fn remove_member(&mut self, user_id: &str) -> bool {
        self.members.remove(user_id)
    }

    /// Current member identities.
    pub fn members(&self) -> &HashSet<String> {
        &self.members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_set_semantics() {
        let mut room = Room::new("r1", "Room-r1");
        assert!(room.add_member("u1"));
        assert!(!room.add_member("u1"));
        assert_eq!(room.member_count(), 1);

        assert!(room.remove_member("u1"));
        assert!(!room.remove_member("u1"));
        assert_eq!(room.member_count(), 0);
    }
}
