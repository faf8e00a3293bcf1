//! SourceId - Cheap-to-clone producer identifier
//!
//! Uses Arc<str> internally for O(1) clone operations.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Producer identifier with cheap cloning.
///
/// Internally uses `Arc<str>` so cloning only increments a reference count
/// instead of allocating new memory. Source IDs are created once when the
/// rig is configured and then cloned into every frame the source emits.
///
/// # Examples
/// ```
/// use contracts::SourceId;
///
/// let id: SourceId = "head0".into();
/// let id2 = id.clone();  // O(1) - just increments ref count
/// assert_eq!(id, id2);
/// assert_eq!(id.as_str(), "head0");
/// ```
#[derive(Clone, Default)]
pub struct SourceId(Arc<str>);

impl SourceId {
    /// Create a new SourceId from a string slice.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Deref to &str for easy string operations
impl Deref for SourceId {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for SourceId {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SourceId {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Conversions
impl From<&str> for SourceId {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for SourceId {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<Arc<str>> for SourceId {
    #[inline]
    fn from(s: Arc<str>) -> Self {
        Self(s)
    }
}

// Display and Debug
impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({:?})", self.0)
    }
}

impl PartialEq for SourceId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // Fast path: same Arc pointer
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for SourceId {}

impl PartialEq<str> for SourceId {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for SourceId {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl PartialEq<String> for SourceId {
    #[inline]
    fn eq(&self, other: &String) -> bool {
        self.0.as_ref() == other
    }
}

// Hash - same as str hash for HashMap compatibility
impl Hash for SourceId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl Serialize for SourceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SourceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_clone_is_cheap() {
        let id1: SourceId = "head0".into();
        let id2 = id1.clone();

        // Both should point to same underlying data (Arc clone is O(1))
        assert_eq!(id1.as_str().as_ptr(), id2.as_str().as_ptr());
    }

    #[test]
    fn test_equality() {
        let id: SourceId = "head0".into();
        assert_eq!(id, "head0");
        assert_eq!(id, String::from("head0"));
        assert_eq!(id, SourceId::from("head0"));
    }

    #[test]
    fn test_hashmap_key() {
        let mut map: HashMap<SourceId, i32> = HashMap::new();
        map.insert("head0".into(), 0);
        map.insert("head1".into(), 1);

        // Can lookup with &str
        assert_eq!(map.get("head0"), Some(&0));
        assert_eq!(map.get("head1"), Some(&1));
    }

    #[test]
    fn test_serde() {
        let id: SourceId = "head0".into();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"head0\"");

        let parsed: SourceId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
