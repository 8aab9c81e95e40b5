//! Login DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::identity::Role;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64, message = "credential is required"))]
    pub credential: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub name: String,
    pub role: Role,
    pub expires_in: u64,
}
