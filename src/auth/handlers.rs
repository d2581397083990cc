use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{patch, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
            RegisterResponse,
        },
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
    },
    error::ApiError,
    state::AppState,
    users::{dto::PublicUser, repo::User},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/password", patch(change_password))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let first_name = payload.first_name.trim();
    let last_name = payload.last_name.trim();
    let username = payload.username.trim();
    let email = payload.email.trim().to_lowercase();

    if first_name.is_empty()
        || last_name.is_empty()
        || username.is_empty()
        || email.is_empty()
        || payload.password.is_empty()
    {
        return Err(ApiError::validation("All fields are required."));
    }
    if !is_valid_email(&email) {
        warn!(%email, "register: invalid email");
        return Err(ApiError::validation("Invalid email address."));
    }

    if User::find_by_username_or_email(&state.db, username, &email)
        .await?
        .is_some()
    {
        warn!(%username, %email, "register: duplicate user");
        return Err(ApiError::Conflict(
            "User with this email or username already exists.".into(),
        ));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, first_name, last_name, username, &email, &hash).await?;

    info!(user_id = %user.id, %username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully. Please log in.".into(),
            user_id: user.id,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let identifier = payload.identifier.trim();
    if identifier.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Login credentials required."));
    }

    // Unknown identifier and wrong password must be indistinguishable.
    let user = User::find_by_identifier(&state.db, identifier).await?;
    let verified = match &user {
        Some(user) => verify_password(&payload.password, &user.password_hash)?,
        None => false,
    };
    let Some(user) = user.filter(|_| verified) else {
        warn!(%identifier, "login failed");
        return Err(ApiError::unauthorized("Invalid credentials."));
    };

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        message: "Login successful.".into(),
        token,
        user: PublicUser::from(user),
    }))
}

/// Stateless acknowledgement: there is no server-side session, so the token
/// stays usable until it expires. Known limitation of the bearer-token
/// design.
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logout successful.".into(),
    })
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.current_password.is_empty() || payload.new_password.is_empty() {
        return Err(ApiError::validation(
            "Current and new passwords are required to complete the request.",
        ));
    }

    let user = User::find_by_id(&state.db, user_id).await?;
    let verified = match &user {
        Some(user) => verify_password(&payload.current_password, &user.password_hash)?,
        None => false,
    };
    if !verified {
        warn!(user_id = %user_id, "password change: current password mismatch");
        return Err(ApiError::unauthorized("Current password is incorrect."));
    }

    let hash = hash_password(&payload.new_password)?;
    User::set_password(&state.db, user_id, &hash).await?;

    info!(user_id = %user_id, "password updated");
    Ok(Json(MessageResponse {
        message: "Password updated successfully.".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plain_addresses() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("first.last+tag@sub.domain.io"));
    }

    #[test]
    fn email_regex_rejects_garbage() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaced @example.com"));
        assert!(!is_valid_email("missing@tld"));
    }
}
