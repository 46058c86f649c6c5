//! Uploaded media handling. Files land under `MEDIA_ROOT/<subdir>/` with a
//! random prefix so colliding client filenames never overwrite each other;
//! the database only stores the path relative to the media root.

use axum::body::Bytes;
use tokio::fs;
use uuid::Uuid;

use crate::{config::AppConfig, error::AppResult};

fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Write an uploaded file and return its path relative to the media root.
pub async fn save_upload(
    config: &AppConfig,
    subdir: &str,
    filename: &str,
    data: Bytes,
) -> AppResult<String> {
    let name = sanitize_filename(filename);
    let relative = format!("{subdir}/{}-{name}", Uuid::new_v4());
    let dir = format!("{}/{subdir}", config.media_root);
    fs::create_dir_all(&dir)
        .await
        .map_err(|e| anyhow::anyhow!("create media dir: {e}"))?;
    fs::write(format!("{}/{relative}", config.media_root), data)
        .await
        .map_err(|e| anyhow::anyhow!("write media file: {e}"))?;
    Ok(relative)
}

/// Best-effort removal of a stored file; missing files are not an error.
pub async fn remove_upload(config: &AppConfig, relative: &str) {
    let path = format!("{}/{relative}", config.media_root);
    if let Err(err) = fs::remove_file(&path).await {
        tracing::warn!(path = %path, error = %err, "media file removal failed");
    }
}

/// Absolute URL a stored media path is served under.
pub fn media_url(config: &AppConfig, relative: &str) -> String {
    format!(
        "http://{}{}/{relative}",
        config.site_domain, config.media_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename(""), "upload");
    }
}
