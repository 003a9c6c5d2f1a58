use serde::Deserialize;

use crate::api::ApiClient;
use crate::config::Config;
use crate::session::{Session, SessionStore};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Mutable daemon state threaded through every handler. `api` and `store`
/// exist once `connect` has run; `session` only while someone is logged in.
pub struct AppState {
    pub config: Config,
    pub api: Option<ApiClient>,
    pub store: Option<SessionStore>,
    pub session: Option<Session>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            api: None,
            store: None,
            session: None,
        }
    }
}
