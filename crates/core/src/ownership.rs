// Ownership policy
//
// Only the recorded author of a resource may mutate it. Callers must fetch
// the resource first: a missing resource is their error to report, never a
// pass through this check.

use crate::identity::Identity;

/// A resource with a recorded author.
pub trait Owned {
    /// Username recorded as the resource author.
    fn owner(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OwnershipError {
    #[error("{actor} is not the owner of this resource")]
    Forbidden { actor: String },
}

/// Plain equality check between the acting username and the recorded author.
pub fn assert_owner(actor: &str, owner: &str) -> Result<(), OwnershipError> {
    if actor == owner {
        Ok(())
    } else {
        Err(OwnershipError::Forbidden {
            actor: actor.to_string(),
        })
    }
}

/// Check that `identity` owns `resource`.
pub fn ensure_owner<R: Owned + ?Sized>(
    identity: &Identity,
    resource: &R,
) -> Result<(), OwnershipError> {
    assert_owner(&identity.username, resource.owner()).inspect_err(|_| {
        tracing::debug!(
            actor = %identity.username,
            owner = %resource.owner(),
            "Ownership check failed"
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::{Comment, News};
    use crate::role::Role;
    use chrono::Utc;
    use uuid::Uuid;

    fn news_by(author: &str) -> News {
        let now = Utc::now();
        News {
            id: Uuid::now_v7(),
            title: "Title".to_string(),
            content: "Body".to_string(),
            author: author.to_string(),
            tags: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_assert_owner_equal_usernames() {
        assert!(assert_owner("alice", "alice").is_ok());
    }

    #[test]
    fn test_assert_owner_is_case_sensitive() {
        assert_eq!(
            assert_owner("Alice", "alice"),
            Err(OwnershipError::Forbidden {
                actor: "Alice".to_string()
            })
        );
    }

    #[test]
    fn test_ensure_owner_news() {
        let alice = Identity::new("1", "alice", Role::User);
        assert!(ensure_owner(&alice, &news_by("alice")).is_ok());
        assert!(ensure_owner(&alice, &news_by("bob")).is_err());
    }

    #[test]
    fn test_admin_gets_no_bypass() {
        let admin = Identity::new("2", "root", Role::Admin);
        assert!(ensure_owner(&admin, &news_by("bob")).is_err());
    }

    #[test]
    fn test_ensure_owner_comment_uses_username() {
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::now_v7(),
            news_id: Uuid::now_v7(),
            content: "Nice".to_string(),
            username: "bob".to_string(),
            created_at: now,
            updated_at: now,
        };
        let bob = Identity::new("3", "bob", Role::User);
        let alice = Identity::new("1", "alice", Role::User);
        assert!(ensure_owner(&bob, &comment).is_ok());
        assert!(ensure_owner(&alice, &comment).is_err());
    }
}
