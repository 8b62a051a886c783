//! Purchaser and author matching policy.
//!
//! Orders and reviews do not carry an identity foreign key; they store the
//! purchaser's phone/name and the review author's display name as plain
//! strings, and ownership is decided by exact string equality against the
//! requesting identity's derived fields. That policy is deliberately loose
//! (two people sharing a display name would both pass) and is kept as-is
//! rather than silently tightened into a foreign-key join. These value
//! types are the single place the equality rules live: purchase
//! verification, the review quota, and the edit ownership check all go
//! through them, so the two author predicates can never drift apart.

use serde::{Deserialize, Serialize};

use super::email::Email;

/// Fields used to match the requesting identity against an order's stored
/// purchaser snapshot.
///
/// Either field matching is enough (OR semantics). An identity with neither
/// field derivable cannot have its purchase history verified at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaserMatch {
    /// Phone number from the identity profile, if any.
    pub phone: Option<String>,
    /// Display name: profile name, else the email local part.
    pub name: Option<String>,
}

impl PurchaserMatch {
    /// Whether at least one matchable field is present.
    #[must_use]
    pub const fn is_verifiable(&self) -> bool {
        self.phone.is_some() || self.name.is_some()
    }

    /// Test this identity against an order's stored purchaser fields.
    #[must_use]
    pub fn matches(&self, order_phone: Option<&str>, order_name: &str) -> bool {
        let phone_matches = match (self.phone.as_deref(), order_phone) {
            (Some(mine), Some(theirs)) => mine == theirs,
            _ => false,
        };
        let name_matches = self.name.as_deref() == Some(order_name);
        phone_matches || name_matches
    }
}

/// Fields used to decide whether a review belongs to the requesting
/// identity.
///
/// A review is "theirs" when its stored author name equals either the
/// derived display name or the full email address. Phone-signup identities
/// may have no email, and an identity with no profile name and no email has
/// no derivable display name either; an absent field never matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorMatch {
    /// Derived display name (profile name, else email local part), if any.
    pub name: Option<String>,
    /// Full email address, if any.
    pub email: Option<Email>,
}

impl AuthorMatch {
    /// Test whether a stored review author name belongs to this identity.
    #[must_use]
    pub fn owns(&self, author_name: &str) -> bool {
        self.name.as_deref() == Some(author_name)
            || self.email.as_ref().is_some_and(|e| e.as_str() == author_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchaser(phone: Option<&str>, name: Option<&str>) -> PurchaserMatch {
        PurchaserMatch {
            phone: phone.map(str::to_owned),
            name: name.map(str::to_owned),
        }
    }

    #[test]
    fn test_verifiable_requires_a_field() {
        assert!(!purchaser(None, None).is_verifiable());
        assert!(purchaser(Some("9876543210"), None).is_verifiable());
        assert!(purchaser(None, Some("Asha")).is_verifiable());
    }

    #[test]
    fn test_phone_match_alone_passes() {
        let m = purchaser(Some("9876543210"), Some("Asha"));
        assert!(m.matches(Some("9876543210"), "someone else entirely"));
    }

    #[test]
    fn test_name_match_alone_passes() {
        let m = purchaser(Some("9876543210"), Some("Asha"));
        assert!(m.matches(Some("0000000000"), "Asha"));
    }

    #[test]
    fn test_no_match_fails() {
        let m = purchaser(Some("9876543210"), Some("Asha"));
        assert!(!m.matches(Some("0000000000"), "Ravi"));
        assert!(!m.matches(None, "Ravi"));
    }

    #[test]
    fn test_missing_fields_never_match() {
        // An absent identity phone must not match an order that also has no
        // phone on file.
        let m = purchaser(None, Some("Asha"));
        assert!(!m.matches(None, "Ravi"));
    }

    #[test]
    fn test_author_owns_by_name_or_email() {
        let author = AuthorMatch {
            name: Some("asha.k".to_owned()),
            email: Some(Email::parse("asha.k@crafts.example").expect("valid email")),
        };
        assert!(author.owns("asha.k"));
        assert!(author.owns("asha.k@crafts.example"));
        assert!(!author.owns("Asha K"));
    }

    #[test]
    fn test_author_without_email_matches_by_name_only() {
        let author = AuthorMatch {
            name: Some("Asha K".to_owned()),
            email: None,
        };
        assert!(author.owns("Asha K"));
        assert!(!author.owns("asha.k@crafts.example"));
    }

    #[test]
    fn test_author_with_no_fields_owns_nothing() {
        let author = AuthorMatch {
            name: None,
            email: None,
        };
        assert!(!author.owns(""));
        assert!(!author.owns("Asha K"));
    }
}
