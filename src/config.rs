use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub media: MediaConfig,
    pub probe: ProbeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_env")]
    pub env: String,

    #[serde(default = "default_app_host")]
    pub host: String,

    #[serde(default = "default_app_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
}

/// Token issuance settings. Constructed once at startup and threaded into the
/// JWT signer; nothing reads these from ambient globals.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,

    #[serde(default = "default_jwt_audience")]
    pub jwt_audience: String,

    #[serde(default = "default_jwt_issuer")]
    pub jwt_issuer: String,

    #[serde(default = "default_jwt_ttl_secs")]
    pub jwt_ttl_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_binary")]
    pub binary: String,

    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_app_env() -> String {
    "development".to_string()
}

fn default_app_host() -> String {
    "0.0.0.0".to_string()
}

fn default_app_port() -> u16 {
    8080
}

fn default_db_max_connections() -> u32 {
    20
}

fn default_jwt_audience() -> String {
    "feed-clients".to_string()
}

fn default_jwt_issuer() -> String {
    "feed-service".to_string()
}

fn default_jwt_ttl_secs() -> i64 {
    3600 // 1 hour
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_probe_binary() -> String {
    "yt-dlp".to_string()
}

fn default_probe_timeout_secs() -> u64 {
    60
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let app = AppConfig {
            env: env::var("APP_ENV").unwrap_or_else(|_| default_app_env()),
            host: env::var("APP_HOST").unwrap_or_else(|_| default_app_host()),
            port: env::var("APP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(default_app_port),
        };

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or_else(default_db_max_connections),
        };

        let auth = AuthConfig {
            jwt_secret: env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set".to_string())?,
            jwt_audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| default_jwt_audience()),
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| default_jwt_issuer()),
            jwt_ttl_secs: env::var("JWT_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_jwt_ttl_secs),
        };

        let media = MediaConfig {
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| default_upload_dir()),
        };

        let probe = ProbeConfig {
            binary: env::var("PROBE_BINARY").unwrap_or_else(|_| default_probe_binary()),
            timeout_secs: env::var("PROBE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_probe_timeout_secs),
        };

        Ok(Config {
            app,
            database,
            auth,
            media,
            probe,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}
