use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::{
    auth::{
        age::parse_birth_date,
        extractors::Caller,
        password::hash_password,
        services::{normalize_email, present},
    },
    error::ApiError,
    users::{
        dto::{UpdateProfileRequest, UserProfile},
        repo::UserStore,
        repo_types::UserChanges,
    },
};

/// How many profiles a free-tier caller gets to see per listing.
pub const FREE_TIER_SAMPLE_SIZE: usize = 3;

pub async fn list_users(
    store: &dyn UserStore,
    caller_is_premium: bool,
) -> Result<Vec<UserProfile>, ApiError> {
    let profiles: Vec<UserProfile> = store
        .list_all()
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect();

    if caller_is_premium {
        return Ok(profiles);
    }
    Ok(sample_profiles(profiles, FREE_TIER_SAMPLE_SIZE))
}

/// Random selection without replacement; returns everything when there are
/// no more than `n` profiles.
fn sample_profiles(profiles: Vec<UserProfile>, n: usize) -> Vec<UserProfile> {
    if profiles.len() <= n {
        return profiles;
    }
    let mut rng = rand::thread_rng();
    profiles.choose_multiple(&mut rng, n).cloned().collect()
}

pub async fn update_profile(
    store: &dyn UserStore,
    caller: Caller,
    target_email: &str,
    req: UpdateProfileRequest,
) -> Result<(), ApiError> {
    let email = normalize_email(target_email);

    let date_of_birth = match present(req.date_of_birth) {
        Some(raw) => Some(parse_birth_date(&raw)?),
        None => None,
    };

    let Some(target) = store.find_by_email(&email).await? else {
        return Err(ApiError::NotFound("User not found".into()));
    };
    if target.id != caller.id {
        warn!(caller_id = %caller.id, target_id = %target.id, "profile update on foreign account");
        return Err(ApiError::Forbidden("You can only update your own profile".into()));
    }

    let password_hash = match present(req.password) {
        Some(plain) => Some(hash_password(&plain)?),
        None => None,
    };

    let changes = UserChanges {
        name: present(req.name),
        date_of_birth,
        role: present(req.role),
        image_url: present(req.image_url),
        password_hash,
    };
    if changes.is_empty() {
        debug!(user_id = %target.id, "profile update without changes");
        return Ok(());
    }

    let Some(updated) = store.update_by_email(&email, changes).await? else {
        return Err(ApiError::NotFound("User not found".into()));
    };

    info!(user_id = %updated.id, "profile updated");
    Ok(())
}
