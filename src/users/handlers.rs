use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    state::AppState,
    storage::avatar_filename,
    users::{
        dto::{ProfileResponse, PublicUser, UpdateProfileRequest},
        repo::User,
    },
};

/// 5 MiB cap on the avatar itself; the body limit adds headroom for the
/// multipart framing.
const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(get_profile).patch(update_profile))
        .route("/users/avatar", post(upload_avatar))
        .layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES + 64 * 1024))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    Ok(Json(ProfileResponse {
        message: None,
        user: PublicUser::from(user),
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    // Empty strings are treated like omitted fields, leaving the stored
    // value untouched.
    let first_name = normalize(payload.first_name);
    let last_name = normalize(payload.last_name);
    let username = normalize(payload.username);
    let email = normalize(payload.email).map(|e| e.to_lowercase());

    let user = User::update_profile(
        &state.db,
        user_id,
        first_name.as_deref(),
        last_name.as_deref(),
        username.as_deref(),
        email.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::not_found("User not found."))?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(ProfileResponse {
        message: Some("Profile updated successfully.".into()),
        user: PublicUser::from(user),
    }))
}

#[instrument(skip(state, multipart))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ProfileResponse>, ApiError> {
    let mut upload = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "avatar upload: bad multipart body");
                return Err(ApiError::validation("Malformed multipart request body."));
            }
        };
        if field.name() != Some("avatar") {
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".into());
        if !content_type.starts_with("image/") {
            warn!(user_id = %user_id, %content_type, "avatar rejected: not an image");
            return Err(ApiError::UnsupportedMedia(
                "Invalid file type. Only images are allowed!".into(),
            ));
        }

        let file_name = field.file_name().map(str::to_string);
        let body = field.bytes().await.map_err(|_| {
            ApiError::PayloadTooLarge("Avatar must be smaller than 5 MiB.".into())
        })?;
        upload = Some((file_name, content_type, body));
        break;
    }

    let Some((file_name, content_type, body)) = upload else {
        return Err(ApiError::validation("No file uploaded."));
    };
    if body.is_empty() {
        return Err(ApiError::validation("No file uploaded."));
    }
    if body.len() > MAX_AVATAR_BYTES {
        return Err(ApiError::PayloadTooLarge(
            "Avatar must be smaller than 5 MiB.".into(),
        ));
    }

    let filename = avatar_filename(user_id, file_name.as_deref(), &content_type);
    state.storage.put(&filename, body).await?;

    let user = User::set_avatar(&state.db, user_id, &filename)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    info!(user_id = %user_id, %filename, "avatar uploaded");
    Ok(Json(ProfileResponse {
        message: Some("Avatar uploaded successfully.".into()),
        user: PublicUser::from(user),
    }))
}

fn normalize(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_blank_fields() {
        assert_eq!(normalize(None), None);
        assert_eq!(normalize(Some("".into())), None);
        assert_eq!(normalize(Some("   ".into())), None);
        assert_eq!(normalize(Some("  ada ".into())), Some("ada".into()));
    }
}
