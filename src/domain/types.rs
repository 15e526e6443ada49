//! Listing vocabulary shared by the composer and every topic source.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// How strongly a topic is pinned. Persisted as a small integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StickyLevel {
    /// Not pinned anywhere.
    Ordinary,
    /// Pinned to the top of its own forum.
    Forum,
    /// Pinned to the top of its forum and of the site-wide directory.
    Super,
}

impl StickyLevel {
    pub fn as_i16(self) -> i16 {
        match self {
            StickyLevel::Ordinary => 0,
            StickyLevel::Forum => 1,
            StickyLevel::Super => 2,
        }
    }
}

impl TryFrom<i16> for StickyLevel {
    type Error = DomainError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(StickyLevel::Ordinary),
            1 => Ok(StickyLevel::Forum),
            2 => Ok(StickyLevel::Super),
            other => Err(DomainError::UnknownStickyLevel { value: other }),
        }
    }
}

/// Sort order requested for a listing. Only sources interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "tag")]
pub enum OrderingMode {
    /// Most recently active first.
    Newest,
    /// Most posts first.
    Popular,
    /// Topics with no replies, most recently active first.
    Unreplied,
    /// Topics carrying the given tag, most recently active first.
    Tagged(String),
}

impl OrderingMode {
    pub fn tag(&self) -> Option<&str> {
        match self {
            OrderingMode::Tagged(tag) => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderingMode::Newest => "newest",
            OrderingMode::Popular => "popular",
            OrderingMode::Unreplied => "unreplied",
            OrderingMode::Tagged(_) => "tags",
        }
    }
}

/// The collection a listing draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum ScopeTarget {
    /// Site-wide topic directory.
    All,
    /// A single forum.
    Forum(i64),
    /// Topics started by one member.
    StartedBy(i64),
}

impl ScopeTarget {
    /// Lowest sticky level that counts as pinned within this target.
    ///
    /// A forum honours its own stickies; the directory and member listings
    /// only promote super stickies.
    pub fn pinned_threshold(self) -> StickyLevel {
        match self {
            ScopeTarget::Forum(_) => StickyLevel::Forum,
            ScopeTarget::All | ScopeTarget::StartedBy(_) => StickyLevel::Super,
        }
    }

    pub fn pins(self, level: StickyLevel) -> bool {
        level >= self.pinned_threshold()
    }

    /// Sticky promotion is on by default only inside a single forum.
    pub fn pins_by_default(self) -> bool {
        matches!(self, ScopeTarget::Forum(_))
    }
}

impl fmt::Display for ScopeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeTarget::All => f.write_str("all"),
            ScopeTarget::Forum(id) => write!(f, "forum:{id}"),
            ScopeTarget::StartedBy(id) => write!(f, "user:{id}"),
        }
    }
}

/// A paginated collection: what to list and in which order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub target: ScopeTarget,
    pub ordering: OrderingMode,
    pub search: Option<String>,
}

impl Scope {
    pub fn new(target: ScopeTarget, ordering: OrderingMode) -> Self {
        Self {
            target,
            ordering,
            search: None,
        }
    }

    pub fn forum(forum_id: i64) -> Self {
        Self::new(ScopeTarget::Forum(forum_id), OrderingMode::Newest)
    }

    pub fn all() -> Self {
        Self::new(ScopeTarget::All, OrderingMode::Newest)
    }

    /// Attach a title search term; blank terms are dropped.
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search.and_then(|value| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });
        self
    }

    /// Reject scopes that no source could answer.
    pub fn validate(&self) -> Result<(), DomainError> {
        match &self.ordering {
            OrderingMode::Tagged(tag) if tag.trim().is_empty() => Err(DomainError::validation(
                "ordering.tag",
                "tagged listings need a tag",
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sticky_levels_round_trip_through_storage_values() {
        for level in [StickyLevel::Ordinary, StickyLevel::Forum, StickyLevel::Super] {
            assert_eq!(StickyLevel::try_from(level.as_i16()).unwrap(), level);
        }
        assert!(matches!(
            StickyLevel::try_from(7),
            Err(DomainError::UnknownStickyLevel { value: 7 })
        ));
    }

    #[test]
    fn forum_scope_pins_forum_stickies_but_directory_does_not() {
        assert!(ScopeTarget::Forum(3).pins(StickyLevel::Forum));
        assert!(!ScopeTarget::All.pins(StickyLevel::Forum));
        assert!(ScopeTarget::All.pins(StickyLevel::Super));
        assert!(!ScopeTarget::StartedBy(9).pins(StickyLevel::Ordinary));
    }

    #[test]
    fn only_forums_pin_by_default() {
        assert!(ScopeTarget::Forum(1).pins_by_default());
        assert!(!ScopeTarget::All.pins_by_default());
        assert!(!ScopeTarget::StartedBy(1).pins_by_default());
    }

    #[test]
    fn blank_search_terms_are_dropped() {
        let scope = Scope::all().with_search(Some("   ".to_string()));
        assert_eq!(scope.search, None);

        let scope = Scope::all().with_search(Some(" rust ".to_string()));
        assert_eq!(scope.search.as_deref(), Some("rust"));
    }

    #[test]
    fn tagged_scope_requires_a_tag() {
        let scope = Scope::new(ScopeTarget::All, OrderingMode::Tagged(" ".to_string()));
        assert!(scope.validate().is_err());

        let scope = Scope::new(ScopeTarget::All, OrderingMode::Tagged("rust".to_string()));
        assert!(scope.validate().is_ok());
    }
}
