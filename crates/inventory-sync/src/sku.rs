//! SKU grouping.
//!
//! Variants of the same physical item share a SKU prefix and differ only in a
//! trailing numeric ordinal:
//!
//! ```text
//! BXAAA-1      -> BXAAA
//! BXAAD-18     -> BXAAD
//! XXXXX-160-1  -> XXXXX-160
//! ```
//!
//! The prefix before the last separator is the [`GroupKey`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between the group prefix and the variant ordinal.
pub const SKU_SEPARATOR: char = '-';

/// Placeholder group reported for SKUs that carry no group.
pub const UNKNOWN_GROUP: &str = "UNKNOWN";

/// Canonical, upper-cased identifier shared by all sibling variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(String);

impl GroupKey {
    /// Derive the group key of a variant SKU.
    ///
    /// Returns `None` when the SKU has no separator, starts with the separator,
    /// or when the part after the last separator is not a non-empty run of
    /// ASCII digits.
    pub fn derive(sku: &str) -> Option<Self> {
        let normalized = sku.trim().to_uppercase();
        let separator = normalized.rfind(SKU_SEPARATOR)?;
        if separator == 0 {
            return None;
        }

        let ordinal = &normalized[separator + SKU_SEPARATOR.len_utf8()..];
        if ordinal.is_empty() || !ordinal.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some(Self(normalized[..separator].to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Backend search query matching every SKU that starts with this group.
    ///
    /// The backend treats this as a prefix match, so results still need to be
    /// re-validated with [`GroupKey::derive`].
    pub fn search_query(&self) -> String {
        format!("sku:{}{}*", self.0, SKU_SEPARATOR)
    }

    /// Whether `sku` belongs to this group.
    pub fn contains(&self, sku: &str) -> bool {
        Self::derive(sku).as_ref() == Some(self)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GroupKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Shorthand for [`GroupKey::derive`].
pub fn derive_group_key(sku: &str) -> Option<GroupKey> {
    GroupKey::derive(sku)
}
