use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

time::serde::format_description!(pub(crate) iso_date, Date, "[year]-[month]-[day]");

pub const DEFAULT_IMAGE_URL: &str = "https://via.placeholder.com/150";

/// User record in the store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String, // unique, login identifier
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed
    #[serde(with = "iso_date")]
    pub date_of_birth: Date,
    pub role: String,
    pub image_url: String,
    pub premium: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields needed to create a record; id, premium and timestamps come from the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub date_of_birth: Date,
    pub role: String,
    pub image_url: String,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub date_of_birth: Option<Date>,
    pub role: Option<String>,
    pub image_url: Option<String>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.date_of_birth.is_none()
            && self.role.is_none()
            && self.image_url.is_none()
            && self.password_hash.is_none()
    }

    pub(crate) fn apply_to(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(dob) = self.date_of_birth {
            user.date_of_birth = dob;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(image_url) = self.image_url {
            user.image_url = image_url;
        }
        if let Some(hash) = self.password_hash {
            user.password_hash = hash;
        }
    }
}
