use ppewatch_storage::StorageConfig;

use crate::auth::jwt::JwtConfig;

/// Default upper bound for an uploaded image (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default request timeout. Must stay above the vision call timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 90;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT` (`pretty` or `json`, default `pretty`).
    ///
    /// Loaded separately from [`ServerConfig`] because tracing is initialised
    /// before the rest of the configuration.
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("pretty") | Err(_) => LogFormat::Pretty,
            Ok(other) => panic!("LOG_FORMAT must be 'pretty' or 'json', got '{other}'"),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `90`).
    pub request_timeout_secs: u64,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
    /// JWT validation settings.
    pub jwt: JwtConfig,
    /// Object storage for uploaded images.
    pub storage: StorageConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default     |
    /// |------------------------|-------------|
    /// | `HOST`                 | `0.0.0.0`   |
    /// | `PORT`                 | `3000`      |
    /// | `REQUEST_TIMEOUT_SECS` | `90`        |
    /// | `MAX_UPLOAD_BYTES`     | `10485760`  |
    ///
    /// JWT and storage settings are read by [`JwtConfig::from_env`] and
    /// [`StorageConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_REQUEST_TIMEOUT_SECS.to_string())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        Self {
            host,
            port,
            request_timeout_secs,
            max_upload_bytes,
            jwt: JwtConfig::from_env(),
            storage: StorageConfig::from_env(),
        }
    }

    /// Check that a request outlives the outbound vision call it waits on.
    ///
    /// Otherwise a slow model answer would be cut off by the server timeout
    /// instead of surfacing as an upstream error.
    pub fn check_request_timeout(&self, vision_timeout_secs: u64) -> Result<(), String> {
        if self.request_timeout_secs > vision_timeout_secs {
            Ok(())
        } else {
            Err(format!(
                "REQUEST_TIMEOUT_SECS ({}) must be greater than VISION_TIMEOUT_SECS ({vision_timeout_secs})",
                self.request_timeout_secs
            ))
        }
    }
}
