use tracing::{info, warn};

use crate::{
    auth::{
        age::{is_adult_today, parse_birth_date},
        dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::ApiError,
    users::{
        repo::UserStore,
        repo_types::{NewUser, User, DEFAULT_IMAGE_URL},
    },
};

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Treats blank strings the same as absent ones.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    present(value).ok_or_else(|| ApiError::validation(format!("Missing required field: {field}")))
}

/// Creates an account. No token is issued here; clients log in separately.
pub async fn register(store: &dyn UserStore, req: RegisterRequest) -> Result<User, ApiError> {
    let name = required(req.name, "name")?;
    let email = normalize_email(&required(req.email, "email")?);
    let password = required(req.password, "password")?;
    let date_of_birth = parse_birth_date(&required(req.date_of_birth, "dateOfBirth")?)?;
    let role = required(req.role, "role")?;

    if !is_adult_today(date_of_birth) {
        warn!(email = %email, "registration rejected: underage");
        return Err(ApiError::validation("You must be 18 or older"));
    }

    if store.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("User already exists".into()));
    }

    let password_hash = hash_password(&password)?;

    // the store's unique constraint covers a concurrent registration that
    // slipped past the lookup above
    let user = store
        .insert(NewUser {
            name,
            email,
            password_hash,
            date_of_birth,
            role,
            image_url: present(req.image_url).unwrap_or_else(|| DEFAULT_IMAGE_URL.into()),
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

pub async fn login(
    store: &dyn UserStore,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let (Some(email), Some(password)) = (present(req.email), present(req.password)) else {
        return Err(ApiError::validation("Email and password are required"));
    };
    let email = normalize_email(&email);

    let Some(user) = store.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&password, &user.password_hash) {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = keys
        .sign(user.id)
        .map_err(|e| ApiError::Internal(e.into()))?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(LoginResponse {
        token,
        user: PublicUser::from(&user),
    })
}
