//! Application Configuration

use crate::domain::value_objects::KEY_DEFAULT_LENGTH;

/// Links application configuration
#[derive(Debug, Clone)]
pub struct LinksConfig {
    /// Length of generated keys
    pub key_length: usize,
    /// Collisions tolerated before growing the key by one character
    pub collisions_per_length_step: u32,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            key_length: KEY_DEFAULT_LENGTH,
            collisions_per_length_step: 5,
        }
    }
}
