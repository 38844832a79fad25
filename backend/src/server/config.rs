//! Process settings and the resolved server configuration.
//!
//! [`ServerSettings`] is loaded by OrthoConfig from `TAPLIST_*` environment
//! variables, command-line flags and configuration files. [`ServerConfig`]
//! holds the resolved values the server is built from.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use actix_web::cookie::Key;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;
use zeroize::Zeroize;

use taplist::inbound::http::health::StoreBackend;
use taplist::outbound::images::LocalImageStore;
use taplist::outbound::persistence::DbPool;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_IMAGE_DIR: &str = "public/images";
const DEFAULT_IMAGE_BASE_URL: &str = "/images";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
/// `Key::derive_from` needs at least this much key material.
pub const SESSION_KEY_MIN_LEN: usize = 32;

/// Settings read at startup.
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "TAPLIST")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL. Without one, documents live in process memory.
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    /// Directory the front end stages uploads in.
    pub upload_dir: Option<PathBuf>,
    /// Directory stored images are written to. A front proxy serves it
    /// under `image_base_url`.
    pub image_dir: Option<PathBuf>,
    /// URL prefix stored images are served under.
    pub image_base_url: Option<String>,
    pub session_key_file: Option<PathBuf>,
    /// Fall back to a random session key when the key file is unreadable.
    #[ortho_config(default = false, cli_default_as_absent)]
    pub session_allow_ephemeral: bool,
    /// Mark the session cookie `Secure`.
    #[ortho_config(default = true, cli_default_as_absent)]
    pub cookie_secure: bool,
    /// Let anonymous callers register admin accounts.
    #[ortho_config(default = false, cli_default_as_absent)]
    pub allow_admin_signup: bool,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .max(1)
    }

    pub fn upload_dir(&self) -> &Path {
        self.upload_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_UPLOAD_DIR))
    }

    pub fn image_dir(&self) -> &Path {
        self.image_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_IMAGE_DIR))
    }

    pub fn image_base_url(&self) -> &str {
        self.image_base_url
            .as_deref()
            .unwrap_or(DEFAULT_IMAGE_BASE_URL)
    }

    pub fn session_key_file(&self) -> &Path {
        self.session_key_file
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_SESSION_KEY_FILE))
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    pub fn store_backend(&self) -> StoreBackend {
        if self.database_url.is_some() {
            StoreBackend::Postgres
        } else {
            StoreBackend::Memory
        }
    }
}

/// Errors raised while resolving settings into a [`ServerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Load the cookie signing key.
///
/// An unreadable key file is tolerated only in debug builds or when
/// ephemeral keys are allowed; sessions then end with the process.
pub fn load_session_key(settings: &ServerSettings) -> Result<Key, ConfigError> {
    let path = settings.session_key_file();
    match std::fs::read(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(ConfigError::KeyTooShort {
                    path: path.to_path_buf(),
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(source) if cfg!(debug_assertions) || settings.session_allow_ephemeral => {
            warn!(path = %path.display(), error = %source, "using temporary session key");
            Ok(Key::generate())
        }
        Err(source) => Err(ConfigError::KeyRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Resolved configuration for [`super::create_server`].
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) images: LocalImageStore,
    pub(crate) allow_admin_signup: bool,
}

impl ServerConfig {
    #[must_use]
    pub fn new(key: Key, bind_addr: SocketAddr, images: LocalImageStore) -> Self {
        Self {
            key,
            cookie_secure: true,
            bind_addr,
            db_pool: None,
            images,
            allow_admin_signup: false,
        }
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    /// Use PostgreSQL stores instead of in-memory ones.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_admin_signup(mut self, allow: bool) -> Self {
        self.allow_admin_signup = allow;
        self
    }

    pub fn store_backend(&self) -> StoreBackend {
        if self.db_pool.is_some() {
            StoreBackend::Postgres
        } else {
            StoreBackend::Memory
        }
    }
}
