use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::users::repo_types::{iso_date, User};

/// Listing projection of a user; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(with = "iso_date")]
    pub date_of_birth: Date,
    pub role: String,
    pub image_url: String,
    pub premium: bool,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            date_of_birth: u.date_of_birth,
            role: u.role,
            image_url: u.image_url,
            premium: u.premium,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub password: Option<String>,
    pub date_of_birth: Option<String>,
    pub role: Option<String>,
    #[serde(alias = "image")]
    pub image_url: Option<String>,
}
