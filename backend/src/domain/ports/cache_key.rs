//! Cache key derivation shared by every component that addresses the cache.
use crate::domain::UserId;

/// Prefix applied to every user cache key.
pub const USER_CACHE_KEY_PREFIX: &str = "user:";

/// Cache key for a single user record: stable prefix plus decimal id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserCacheKey(String);

impl UserCacheKey {
    /// Derive the key for the given identifier.
    ///
    /// # Examples
    /// ```
    /// use user_directory::domain::UserId;
    /// use user_directory::domain::ports::UserCacheKey;
    ///
    /// let id = UserId::new(42).expect("valid id");
    /// assert_eq!(UserCacheKey::for_user(id).as_str(), "user:42");
    /// ```
    pub fn for_user(id: UserId) -> Self {
        Self(format!("{USER_CACHE_KEY_PREFIX}{id}"))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for UserCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for UserCacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
