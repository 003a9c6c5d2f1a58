#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;

pub fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

pub fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    spawn_sidecar_with_env(&[])
}

pub fn spawn_sidecar_with_env(env: &[(&str, &str)]) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_rollcalld");
    let mut cmd = Command::new(exe);
    for (k, v) in env {
        cmd.env(k, v);
    }
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn rollcalld");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

pub fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value.get("error").cloned().unwrap_or_else(|| json!({}))
}

/// One canned backend response, matched on method and exact path.
#[derive(Debug, Clone)]
pub struct Route {
    pub method: &'static str,
    pub path: String,
    pub status: u16,
    pub body: serde_json::Value,
}

impl Route {
    pub fn get(path: &str, body: serde_json::Value) -> Self {
        Self { method: "GET", path: path.to_string(), status: 200, body }
    }

    pub fn post(path: &str, body: serde_json::Value) -> Self {
        Self { method: "POST", path: path.to_string(), status: 200, body }
    }

    pub fn put(path: &str, body: serde_json::Value) -> Self {
        Self { method: "PUT", path: path.to_string(), status: 200, body }
    }

    pub fn delete(path: &str, body: serde_json::Value) -> Self {
        Self { method: "DELETE", path: path.to_string(), status: 200, body }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Minimal single-threaded HTTP backend the daemon talks to during tests.
/// Unmatched paths answer 404 with a message body, like the real API.
pub struct MockApi {
    pub base_url: String,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl MockApi {
    pub fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock api");
        let addr = listener.local_addr().expect("mock api addr");
        let captured: Arc<Mutex<Vec<Captured>>> = Arc::new(Mutex::new(Vec::new()));
        let captured_in_thread = Arc::clone(&captured);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let _ = serve_connection(stream, &routes, &captured_in_thread);
            }
        });

        Self {
            base_url: format!("http://{}/api", addr),
            captured,
        }
    }

    pub fn captured(&self) -> Vec<Captured> {
        self.captured.lock().expect("captured lock").clone()
    }
}

fn serve_connection(
    stream: TcpStream,
    routes: &[Route],
    captured: &Arc<Mutex<Vec<Captured>>>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();
    let path = target.split('?').next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header)?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some(v) = header
            .to_ascii_lowercase()
            .strip_prefix("content-length:")
            .map(|v| v.trim().to_string())
        {
            content_length = v.parse().unwrap_or(0);
        }
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body)?;
    }

    captured.lock().expect("captured lock").push(Captured {
        method: method.clone(),
        path: path.clone(),
        body: String::from_utf8_lossy(&body).to_string(),
    });

    // Routes are declared without the /api prefix the daemon adds.
    let route_path = path.strip_prefix("/api").unwrap_or(&path);
    let (status, payload) = match routes
        .iter()
        .find(|r| r.method == method && r.path == route_path)
    {
        Some(r) => (r.status, r.body.to_string()),
        None => (404, json!({ "message": "not found" }).to_string()),
    };

    let mut stream = reader.into_inner();
    write!(
        stream,
        "HTTP/1.1 {} OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        payload.len(),
        payload
    )?;
    stream.flush()
}

pub fn student_login_route(roll_no: &str) -> Route {
    Route::post(
        "/auth/login",
        json!({
            "token": "tok-student",
            "refreshToken": "refresh-student",
            "user": {
                "id": 1,
                "name": "Student User",
                "email": "student@nith.ac.in",
                "role": "student",
                "rollNo": roll_no,
                "batchYear": 2021,
                "department": "Computer Science"
            }
        }),
    )
}

pub fn faculty_login_route(faculty_id: &str) -> Route {
    Route::post(
        "/auth/login",
        json!({
            "token": "tok-faculty",
            "user": {
                "id": 2,
                "name": "Faculty User",
                "email": "faculty@nith.ac.in",
                "role": "faculty",
                "facultyId": faculty_id,
                "department": "Computer Science"
            }
        }),
    )
}

pub fn admin_login_route() -> Route {
    Route::post(
        "/auth/login",
        json!({
            "token": "tok-admin",
            "user": {
                "id": 3,
                "name": "Admin User",
                "email": "admin@nith.ac.in",
                "role": "admin"
            }
        }),
    )
}

pub fn login(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    email: &str,
) -> serde_json::Value {
    request_ok(
        stdin,
        reader,
        "login",
        "auth.login",
        json!({ "email": email, "password": "Password1" }),
    )
}

pub fn connect(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    base_url: &str,
    session_file: &std::path::Path,
) -> serde_json::Value {
    request_ok(
        stdin,
        reader,
        "connect",
        "connect",
        json!({
            "baseUrl": base_url,
            "sessionFile": session_file.to_string_lossy(),
        }),
    )
}
