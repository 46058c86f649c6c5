use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Domain used when rendering activation and password reset links.
    pub site_domain: String,
    /// Directory uploaded media files are written to.
    pub media_root: String,
    /// Public URL prefix the media directory is served under.
    pub media_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let site_domain = env::var("SITE_DOMAIN").unwrap_or_else(|_| "localhost:3000".to_string());
        let media_root = env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string());
        let media_url = env::var("MEDIA_URL").unwrap_or_else(|_| "/media".to_string());
        Ok(Self {
            port,
            database_url,
            host,
            site_domain,
            media_root,
            media_url,
        })
    }
}
