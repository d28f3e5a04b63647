//! Application Configuration

use platform::password::HashCost;

/// Blog application configuration
#[derive(Debug, Clone)]
pub struct BlogConfig {
    /// Argon2id cost for new password hashes
    pub hash_cost: HashCost,
    /// Path the token cookies are scoped to
    pub cookie_path: String,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            hash_cost: HashCost::default(),
            cookie_path: "/api".to_string(),
        }
    }
}

impl BlogConfig {
    /// Cheap hashing for tests
    pub fn for_tests() -> Self {
        Self {
            hash_cost: HashCost::minimal(),
            ..Default::default()
        }
    }
}
