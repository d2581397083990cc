use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::storage::avatar_url;
use crate::users::repo::User;

/// Public projection of a user: everything except the password hash, with
/// the avatar expanded to its retrievable path.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub date_joined: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_update: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            username: u.username,
            email: u.email,
            avatar: u.avatar.as_deref().map(avatar_url),
            date_joined: u.date_joined,
            last_update: u.last_update,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample_user(avatar: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            avatar: avatar.map(Into::into),
            date_joined: datetime!(2024-01-01 00:00 UTC),
            last_update: datetime!(2024-01-02 00:00 UTC),
        }
    }

    #[test]
    fn projection_never_contains_password_hash() {
        let json =
            serde_json::to_string(&PublicUser::from(sample_user(None))).expect("serialize");
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
        assert!(json.contains("ada@example.com"));
    }

    #[test]
    fn avatar_is_expanded_to_public_path() {
        let public = PublicUser::from(sample_user(Some("abc.png")));
        assert_eq!(public.avatar.as_deref(), Some("/uploads/avatars/abc.png"));

        let bare = PublicUser::from(sample_user(None));
        assert!(bare.avatar.is_none());
    }

    #[test]
    fn projection_uses_camel_case_keys() {
        let json =
            serde_json::to_string(&PublicUser::from(sample_user(None))).expect("serialize");
        assert!(json.contains("firstName"));
        assert!(json.contains("dateJoined"));
        assert!(json.contains("lastUpdate"));
    }
}
