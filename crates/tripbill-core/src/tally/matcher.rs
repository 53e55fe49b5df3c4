//! Fuzzy product-name matching for tally reconciliation.
//!
//! Remarks are typed by hand, so return/damage entries rarely spell product
//! names exactly as the order items do. [`TieredMatcher`] resolves a raw
//! name against the known product keys in three passes of decreasing
//! strictness; callers needing different behavior supply their own
//! [`ProductMatcher`].

/// Resolves a raw product name to a known product key.
pub trait ProductMatcher {
    /// Return the matching key, or `None` when nothing resolves.
    fn resolve(&self, raw: &str) -> Option<String>;
}

/// Three-tier matcher: exact, then case/whitespace-insensitive, then
/// substring containment in either direction. Within a tier the earliest
/// key wins.
#[derive(Debug, Clone)]
pub struct TieredMatcher {
    keys: Vec<String>,
}

impl TieredMatcher {
    /// Build a matcher over the given product keys, in priority order.
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }
}

impl ProductMatcher for TieredMatcher {
    fn resolve(&self, raw: &str) -> Option<String> {
        if let Some(key) = self.keys.iter().find(|key| key.as_str() == raw) {
            return Some(key.clone());
        }

        let wanted = normalize(raw);
        if let Some(key) = self.keys.iter().find(|key| normalize(key) == wanted) {
            return Some(key.clone());
        }

        self.keys
            .iter()
            .find(|key| {
                let known = normalize(key);
                known.contains(&wanted) || wanted.contains(&known)
            })
            .cloned()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
