/// Configuration management for Persona Service
///
/// Loaded from environment variables (after `.env` via dotenvy in `main`).
/// Production (`APP_ENV=production`) refuses insecure defaults.
use std::fmt;

pub const DEV_JWT_SECRET: &str = "persona-development-secret-change-me";
pub const DEFAULT_AVATAR_URL: &str = "https://res.cloudinary.com/demo/image/upload/v1/sample/profile";

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub media: MediaConfig,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
    /// Emit JSON log lines instead of the human-readable format
    pub log_json: bool,
    /// Avatar assigned to new accounts and profiles
    pub default_avatar_url: String,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

impl CorsConfig {
    pub fn origins(&self) -> Vec<&str> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: String,
    pub max_connections: u32,
}

/// Session token configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expire_days: i64,
    pub cookie_expire_days: i64,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expire_days", &self.jwt_expire_days)
            .field("cookie_expire_days", &self.cookie_expire_days)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

/// Media host (Cloudinary) configuration
#[derive(Clone)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub root_folder: String,
}

impl fmt::Debug for MediaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("root_folder", &self.root_folder)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::load(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn load<F>(var: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string_or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let app_env = string_or("APP_ENV", "development");
        let production = app_env.eq_ignore_ascii_case("production");

        let app = AppConfig {
            env: app_env.clone(),
            host: string_or("PERSONA_SERVICE_HOST", "0.0.0.0"),
            port: parse_var(&var, "PERSONA_SERVICE_PORT", 5000)?,
            log_json: var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            default_avatar_url: string_or("DEFAULT_AVATAR_URL", DEFAULT_AVATAR_URL),
        };

        let cors = {
            let allowed_origins = string_or("CLIENT_URL", "http://localhost:5173");
            if production && allowed_origins.split(',').any(|o| o.trim() == "*") {
                return Err("CLIENT_URL cannot be '*' in production".to_string());
            }
            CorsConfig { allowed_origins }
        };

        let storage = {
            let backend = match string_or("STORAGE_BACKEND", "postgres")
                .to_ascii_lowercase()
                .as_str()
            {
                "postgres" | "postgresql" => StorageBackend::Postgres,
                "memory" => StorageBackend::Memory,
                other => return Err(format!("Unknown STORAGE_BACKEND '{}'", other)),
            };
            if production && backend == StorageBackend::Memory {
                return Err("STORAGE_BACKEND=memory is not allowed in production".to_string());
            }
            StorageConfig {
                backend,
                database_url: string_or("DATABASE_URL", "postgres://localhost/persona"),
                max_connections: parse_var(&var, "DATABASE_MAX_CONNECTIONS", 10)?,
            }
        };

        let auth = {
            let jwt_secret = match var("JWT_SECRET") {
                Some(secret) if !secret.trim().is_empty() => secret,
                _ if production => return Err("JWT_SECRET must be set in production".to_string()),
                _ => DEV_JWT_SECRET.to_string(),
            };
            if production && (jwt_secret == DEV_JWT_SECRET || jwt_secret.len() < 32) {
                return Err(
                    "JWT_SECRET must be a non-default value of at least 32 characters in production"
                        .to_string(),
                );
            }

            let jwt_expire_days = parse_var(&var, "JWT_EXPIRE_DAYS", 30)?;
            let cookie_expire_days = parse_var(&var, "JWT_COOKIE_EXPIRE_DAYS", 30)?;
            if jwt_expire_days <= 0 || cookie_expire_days <= 0 {
                return Err("JWT_EXPIRE_DAYS and JWT_COOKIE_EXPIRE_DAYS must be positive".to_string());
            }

            AuthConfig {
                jwt_secret,
                jwt_expire_days,
                cookie_expire_days,
                secure_cookies: production,
            }
        };

        let media = MediaConfig {
            cloud_name: string_or("CLOUDINARY_CLOUD_NAME", ""),
            api_key: string_or("CLOUDINARY_API_KEY", ""),
            api_secret: string_or("CLOUDINARY_API_SECRET", ""),
            root_folder: string_or("MEDIA_ROOT_FOLDER", "persona"),
        };
        if production
            && (media.cloud_name.is_empty() || media.api_key.is_empty() || media.api_secret.is_empty())
        {
            return Err(
                "CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must be set in production"
                    .to_string(),
            );
        }

        Ok(Config {
            app,
            cors,
            storage,
            auth,
            media,
        })
    }
}

fn parse_var<F, T>(var: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match var(key) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        None => Ok(default),
    }
}
