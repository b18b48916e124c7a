//! Trusted local credential set.

use std::collections::HashSet;

/// Separator between username and secret in a composite key.
pub const KEY_SEPARATOR: char = '_';

/// Immutable set of `"{username}_{secret}"` keys, loaded once at startup.
#[derive(Clone, Default)]
pub struct CredentialSet {
    keys: HashSet<String>,
}

impl CredentialSet {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Composite lookup key for a username/secret pair.
    pub fn composite_key(username: &str, secret: &str) -> String {
        format!("{}{}{}", username, KEY_SEPARATOR, secret)
    }

    /// Exact-match membership test.
    pub fn contains(&self, username: &str, secret: &str) -> bool {
        self.keys.contains(&Self::composite_key(username, secret))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CredentialSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

// Keys are secrets; only the size is printed.
impl std::fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSet")
            .field("len", &self.keys.len())
            .finish()
    }
}
