// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Which `SocialStore` implementation the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub rust_log: String,
    pub store_backend: StoreBackend,
    pub bind_addr: String,
    pub media_dir: String,
    pub media_base_url: String,
    pub max_upload_bytes: usize,
    pub default_page_size: i64,
    /// `id:name:facility` entries separated by `;`, loaded into the memory store.
    pub memory_users: String,
}

/// 10 MiB, the image cap the intranet enforces on uploads.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            _ => StoreBackend::Postgres,
        };

        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            panic!("DATABASE_URL must be set when STORE_BACKEND is postgres");
        }

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let media_dir = env::var("MEDIA_DIR")
            .unwrap_or_else(|_| "uploads".to_string());

        let media_base_url = env::var("MEDIA_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/media".to_string());

        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let default_page_size = env::var("DEFAULT_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        let memory_users = env::var("MEMORY_USERS").unwrap_or_default();

        Self {
            database_url,
            jwt_secret,
            rust_log,
            store_backend,
            bind_addr,
            media_dir,
            media_base_url,
            max_upload_bytes,
            default_page_size,
            memory_users,
        }
    }

    /// Configuration for in-process use (tests, embedding) backed by the memory store.
    pub fn for_memory(jwt_secret: &str, media_dir: &str, media_base_url: &str) -> Self {
        Self {
            database_url: None,
            jwt_secret: jwt_secret.to_string(),
            rust_log: "error".to_string(),
            store_backend: StoreBackend::Memory,
            bind_addr: "127.0.0.1:0".to_string(),
            media_dir: media_dir.to_string(),
            media_base_url: media_base_url.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            default_page_size: 20,
            memory_users: String::new(),
        }
    }
}
