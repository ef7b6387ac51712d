//! Database layer (Firestore, with an in-memory backend for dev and tests).

pub mod firestore;
pub mod memory;

pub use firestore::{DocumentStore, TripWindow};
pub use memory::MemoryStore;

use ring::rand::{SecureRandom, SystemRandom};

/// Default collection names.
pub mod collections {
    pub const USERS: &str = "users";
    pub const TRIPS: &str = "trips";
}

/// Collection names in use, configured per deployment.
#[derive(Debug, Clone)]
pub struct Collections {
    pub users: String,
    pub trips: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            users: collections::USERS.to_string(),
            trips: collections::TRIPS.to_string(),
        }
    }
}

/// Generate a random 20-character document ID.
pub fn unique_id() -> Result<String, ring::error::Unspecified> {
    let mut bytes = [0u8; 10];
    SystemRandom::new().fill(&mut bytes)?;
    Ok(hex::encode(bytes))
}
