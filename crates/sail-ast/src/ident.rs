//! Identifiers (spec.md §3, "Identifiers").
//!
//! Identifiers are either plain names or "de-infixed" forms of operator
//! names; both compare by their string payload alone, so `Id` is a thin
//! wrapper over a reference-counted string with string equality/hashing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Eq, Serialize, Deserialize)]
pub struct Id {
    name: Rc<str>,
}

impl Id {
    pub fn new(name: impl AsRef<str>) -> Self {
        Id {
            name: Rc::from(name.as_ref()),
        }
    }

    /// The de-infixed form of an operator identifier, e.g. `+` becomes
    /// `operator +`; it still compares equal to another `Id` built the
    /// same way, and never collides with a plain name because plain
    /// names cannot contain a space followed by an operator's punctuation.
    pub fn operator(op: impl AsRef<str>) -> Self {
        Id::new(format!("operator {}", op.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Mint a fresh identifier derived from `base`, carrying a reserved
    /// prefix so it can never clash with a user-written name (spec.md
    /// §3, "Lifecycle").
    pub fn fresh(base: &str, counter: u64) -> Self {
        Id::new(format!("##{base}_{counter}"))
    }

    pub fn is_reserved(&self) -> bool {
        self.name.starts_with("##")
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::hash::Hash for Id {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_operator_ids_compare_by_string_payload() {
        let a = Id::new("operator +");
        let b = Id::operator("+");
        assert_eq!(a, b);
    }

    #[test]
    fn fresh_ids_never_collide_with_user_names() {
        let f = Id::fresh("kid", 7);
        assert!(f.is_reserved());
        assert_ne!(f, Id::new("kid_7"));
    }
}
