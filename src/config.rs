use std::net::{IpAddr, SocketAddr};

/// Default access-token lifetime: 31 days.
const DEFAULT_JWT_EXPIRATION_SECS: u64 = 31 * 24 * 60 * 60;

/// Default multipart body limit: 32 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 << 20;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: IpAddr,
    pub server_port: u16,
    pub environment: Environment,
    pub log_level: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub facebook_client_id: String,
    pub facebook_client_secret: String,
    pub facebook_redirect_uri: String,
    pub frontend_url: String,
    pub max_upload_bytes: usize,
    /// Reject upload batches that contain no tilemap.
    pub require_tilemap_in_batch: bool,
}

/// Deployment environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required: `DATABASE_URL`, `JWT_SECRET`
    /// Optional with defaults: `SERVER_HOST`, `SERVER_PORT`, `ENVIRONMENT`, `LOG_LEVEL`,
    /// `JWT_EXPIRATION_SECS`, `GOOGLE_*`, `FACEBOOK_*`, `FRONTEND_URL`, `MAX_UPLOAD_BYTES`,
    /// `INGEST_REQUIRE_TILEMAP`
    ///
    /// `PORT` overrides `SERVER_PORT`, and the host defaults to `0.0.0.0` in production.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let environment = match std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .as_str()
        {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };

        let server_port = std::env::var("PORT")
            .or_else(|_| std::env::var("SERVER_PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("SERVER_PORT / PORT must be a valid u16"))?;

        let default_host = if environment == Environment::Production {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let server_host = std::env::var("SERVER_HOST")
            .unwrap_or_else(|_| default_host.to_string())
            .parse::<IpAddr>()
            .map_err(|_| anyhow::anyhow!("SERVER_HOST must be a valid IP address"))?;

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;

        let jwt_expiration_secs = match std::env::var("JWT_EXPIRATION_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("JWT_EXPIRATION_SECS must be a number of seconds"))?,
            Err(_) => DEFAULT_JWT_EXPIRATION_SECS,
        };

        let max_upload_bytes = match std::env::var("MAX_UPLOAD_BYTES") {
            Ok(v) => v
                .parse::<usize>()
                .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_BYTES must be a byte count"))?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let require_tilemap_in_batch = match std::env::var("INGEST_REQUIRE_TILEMAP") {
            Ok(v) => parse_flag(&v)
                .ok_or_else(|| anyhow::anyhow!("INGEST_REQUIRE_TILEMAP must be true or false"))?,
            Err(_) => false,
        };

        Ok(Self {
            database_url,
            server_host,
            server_port,
            environment,
            log_level,
            jwt_secret,
            jwt_expiration_secs,
            google_client_id: std::env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            google_client_secret: std::env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            google_redirect_uri: std::env::var("GOOGLE_REDIRECT_URI").unwrap_or_default(),
            facebook_client_id: std::env::var("FACEBOOK_CLIENT_ID").unwrap_or_default(),
            facebook_client_secret: std::env::var("FACEBOOK_CLIENT_SECRET").unwrap_or_default(),
            facebook_redirect_uri: std::env::var("FACEBOOK_REDIRECT_URI").unwrap_or_default(),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            max_upload_bytes,
            require_tilemap_in_batch,
        })
    }

    /// Build the socket address for the server to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
