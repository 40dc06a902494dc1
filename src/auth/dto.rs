use serde::{Deserialize, Serialize};

use crate::users::repo_types::User;

/// Request body for registration. Every field is optional at the wire level
/// so that absence is reported as a validation error, not a parse failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub date_of_birth: Option<String>,
    pub role: Option<String>,
    #[serde(alias = "image")]
    pub image_url: Option<String>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client at login.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub name: String,
    pub email: String,
    pub role: String,
    pub premium: bool,
    pub image_url: String,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role.clone(),
            premium: u.premium,
            image_url: u.image_url.clone(),
        }
    }
}

/// Acknowledgement body for mutations.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
