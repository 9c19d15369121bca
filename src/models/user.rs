// src/models/user.rs

use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type FacilityId = i64;

/// The authenticated caller, resolved once per request and threaded
/// explicitly into every feed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub facility_id: FacilityId,
}

impl Identity {
    pub fn new(user_id: UserId, facility_id: FacilityId) -> Self {
        Self {
            user_id,
            facility_id,
        }
    }
}

/// Represents the 'users' table. Owned by the intranet directory; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    pub facility_id: FacilityId,
}

/// Author info joined onto posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: UserId,
    pub display_name: String,
}
