use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

/// Where uploaded avatar bytes end up. Kept behind a trait so handlers can
/// run against a no-op store in tests.
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Writes `body` under `filename`, replacing any existing file.
    async fn put(&self, filename: &str, body: Bytes) -> anyhow::Result<()>;
}

/// Local-disk store rooted at `<upload_dir>/avatars`, served back to clients
/// through the static `/uploads` route.
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(upload_dir: &str) -> Self {
        Self {
            root: PathBuf::from(upload_dir).join("avatars"),
        }
    }
}

#[async_trait]
impl AvatarStore for DiskStore {
    async fn put(&self, filename: &str, body: Bytes) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(filename), &body).await?;
        Ok(())
    }
}

/// Discards everything; used by `AppState::fake`.
#[cfg(test)]
pub struct NullStore;

#[cfg(test)]
#[async_trait]
impl AvatarStore for NullStore {
    async fn put(&self, _filename: &str, _body: Bytes) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Public path a stored avatar is reachable under.
pub fn avatar_url(filename: &str) -> String {
    format!("/uploads/avatars/{filename}")
}

/// Stable on-disk name for a user's avatar: the user id plus an extension
/// taken from the uploaded filename, falling back to the declared mime
/// subtype. One file per user, so a re-upload overwrites the previous one.
pub fn avatar_filename(user_id: Uuid, original_name: Option<&str>, content_type: &str) -> String {
    let ext = original_name
        .and_then(|name| {
            std::path::Path::new(name)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
        })
        .unwrap_or_else(|| match content_type.strip_prefix("image/") {
            Some("jpeg") => "jpg".into(),
            Some("svg+xml") => "svg".into(),
            Some(subtype) => subtype.into(),
            None => "bin".into(),
        });
    format!("{user_id}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_prefers_original_extension() {
        let id = Uuid::new_v4();
        let name = avatar_filename(id, Some("selfie.PNG"), "image/jpeg");
        assert_eq!(name, format!("{id}.png"));
    }

    #[test]
    fn filename_falls_back_to_mime_subtype() {
        let id = Uuid::new_v4();
        assert_eq!(
            avatar_filename(id, None, "image/jpeg"),
            format!("{id}.jpg")
        );
        assert_eq!(
            avatar_filename(id, Some("noext"), "image/webp"),
            format!("{id}.webp")
        );
    }

    #[test]
    fn url_is_under_uploads() {
        assert_eq!(avatar_url("abc.png"), "/uploads/avatars/abc.png");
    }
}
