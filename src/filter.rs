//! Label filters restricting which classified labels are emitted

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Predicate over descriptor labels, consulted once per classified descriptor
/// on every decode.
///
/// Filters are immutable after construction and safe to share between
/// concurrent decodes.
///
/// ```rust
/// use paddock::LabelFilter;
///
/// let filter = LabelFilter::allow_list(["speed", "gear"]);
/// assert!(filter.allows("speed"));
/// assert!(!filter.allows("rpm"));
/// assert!(LabelFilter::allow_all().allows("rpm"));
/// assert!(!LabelFilter::deny_all().allows("speed"));
/// ```
///
/// In configuration files the filter is written as
/// `{ mode: allow_list, labels: [speed, gear] }` or `{ mode: allow_all }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "labels", rename_all = "snake_case")]
pub enum LabelFilter {
    /// Accept every label
    #[default]
    AllowAll,
    /// Reject every label
    DenyAll,
    /// Accept exactly the labels in the set
    AllowList(HashSet<String>),
}

impl LabelFilter {
    pub fn allow_all() -> Self {
        LabelFilter::AllowAll
    }

    pub fn deny_all() -> Self {
        LabelFilter::DenyAll
    }

    /// Build an allow-list from a sequence of labels. Duplicates collapse.
    pub fn allow_list<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LabelFilter::AllowList(labels.into_iter().map(Into::into).collect())
    }

    /// Whether `label` may be emitted.
    pub fn allows(&self, label: &str) -> bool {
        match self {
            LabelFilter::AllowAll => true,
            LabelFilter::DenyAll => false,
            LabelFilter::AllowList(labels) => labels.contains(label),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for LabelFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        LabelFilter::allow_list(iter)
    }
}
