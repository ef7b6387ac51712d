//! Account and profile models.

use serde::{Deserialize, Serialize};

/// Identity-provider account (Google userinfo).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// External account ID (Google `sub`)
    pub id: String,
    pub name: String,
    pub email: String,
}

/// User profile stored in the document store.
///
/// The document ID equals `account_id`, which keeps at most one profile
/// per account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Document ID
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: String,
    /// External account ID (foreign key to the identity provider)
    pub account_id: String,
    pub name: String,
    pub email: String,
    /// Avatar URL from the People API
    #[serde(default)]
    pub image_url: Option<String>,
    /// When the profile was created (RFC 3339)
    pub joined_at: String,
}

impl UserProfile {
    /// Build a new profile for an account.
    pub fn for_account(account: &Account, image_url: Option<String>, joined_at: String) -> Self {
        Self {
            id: account.id.clone(),
            account_id: account.id.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
            image_url,
            joined_at,
        }
    }
}
