use serde::{Deserialize, Serialize};
use strum_macros::Display;
use uuid::Uuid;

use crate::ids::EntityId;

/// Who is calling: the therapist or one of their patients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Fono,
    Paciente,
}

/// JWT claims, handed to handlers as the request-scoped caller identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthContext {
    #[serde(rename = "sub")]
    pub user_id: EntityId,
    pub role: Role,
    pub session_id: Uuid,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}
