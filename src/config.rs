use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
const DEFAULT_UPLOAD_TYPES: &str = "application/pdf,image/jpeg,image/png,image/jpg";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub max_upload_bytes: u64,
    pub allowed_upload_types: Vec<String>,
    pub session_file: PathBuf,
}

impl Config {
    /// Environment defaults; `connect` params may override per connection.
    pub fn from_env() -> Self {
        let api_base_url =
            std::env::var("ROLLCALL_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let max_upload_bytes = std::env::var("ROLLCALL_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        let allowed_upload_types = std::env::var("ROLLCALL_UPLOAD_TYPES")
            .unwrap_or_else(|_| DEFAULT_UPLOAD_TYPES.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let session_file = std::env::var("ROLLCALL_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_session_file());

        Self {
            api_base_url,
            max_upload_bytes,
            allowed_upload_types,
            session_file,
        }
    }
}

fn default_session_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("rollcalld")
        .join("session.json")
}
