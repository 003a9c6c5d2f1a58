use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Faculty,
    Student,
}

#[derive(Debug, Clone, Copy)]
pub struct NavLink {
    pub route: &'static str,
    pub label: &'static str,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Faculty => "faculty",
            Role::Student => "student",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "faculty" => Some(Role::Faculty),
            "student" => Some(Role::Student),
            _ => None,
        }
    }

    /// Route the UI lands on right after login.
    pub fn landing_route(self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Faculty => "/faculty",
            Role::Student => "/student",
        }
    }

    /// Nav set shown for the role. The match is exhaustive so a new role
    /// cannot ship without one.
    pub fn nav_links(self) -> &'static [NavLink] {
        match self {
            Role::Admin => &[
                NavLink { route: "/admin", label: "Dashboard" },
                NavLink { route: "/admin/faculty", label: "Faculty" },
                NavLink { route: "/admin/students", label: "Students" },
                NavLink { route: "/admin/courses", label: "Courses" },
            ],
            Role::Faculty => &[
                NavLink { route: "/faculty", label: "Dashboard" },
                NavLink { route: "/faculty/certificates", label: "Medical Certificates" },
            ],
            Role::Student => &[
                NavLink { route: "/student", label: "Dashboard" },
                NavLink { route: "/student/attendance", label: "My Attendance" },
                NavLink { route: "/student/certificates", label: "Certificates" },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub user: UserProfile,
}

impl Session {
    /// Payload the UI gets back from `auth.session` and `auth.login`.
    pub fn describe(&self) -> serde_json::Value {
        let nav: Vec<serde_json::Value> = self
            .user
            .role
            .nav_links()
            .iter()
            .map(|l| json!({ "route": l.route, "label": l.label }))
            .collect();
        json!({
            "user": &self.user,
            "landingRoute": self.user.role.landing_route(),
            "navLinks": nav,
        })
    }
}

/// On-disk session persistence. The daemon hydrates from here on `connect`
/// and wipes the file on logout; nothing else touches it.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Option<Session> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding unreadable session file");
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create session directory {}", parent.display())
            })?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write session file {}", self.path.display()))
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("failed to remove session file {}", self.path.display())
            }),
        }
    }
}
