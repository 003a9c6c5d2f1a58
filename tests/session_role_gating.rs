mod utils;

use serde_json::json;
use utils::*;

#[test]
fn login_maps_role_to_landing_and_nav() {
    let api = MockApi::start(vec![student_login_route("21001")]);
    let dir = temp_dir("rollcall-login");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    connect(&mut stdin, &mut reader, &api.base_url, &dir.join("session.json"));

    let result = login(&mut stdin, &mut reader, "student@nith.ac.in");
    assert_eq!(result["landingRoute"], "/student");
    assert_eq!(result["user"]["role"], "student");
    let nav = result["navLinks"].as_array().expect("nav links");
    assert_eq!(nav.len(), 3);
    assert!(nav.iter().any(|l| l["route"] == "/student/attendance"));
}

#[test]
fn wrong_role_is_forbidden_not_unauthenticated() {
    let api = MockApi::start(vec![student_login_route("21001")]);
    let dir = temp_dir("rollcall-gate");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    connect(&mut stdin, &mut reader, &api.base_url, &dir.join("session.json"));

    // Before login every resource method refuses with not_authenticated.
    let error = request_err(&mut stdin, &mut reader, "1", "students.list", json!({}));
    assert_eq!(error["code"], "not_authenticated");

    login(&mut stdin, &mut reader, "student@nith.ac.in");

    // Students cannot reach admin management methods.
    let error = request_err(&mut stdin, &mut reader, "2", "students.list", json!({}));
    assert_eq!(error["code"], "forbidden");
    let error = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "faculty.create",
        json!({ "faculty": { "name": "X" } }),
    );
    assert_eq!(error["code"], "forbidden");

    // But course listings are open to every role.
    let error = request_err(&mut stdin, &mut reader, "4", "courses.list", json!({}));
    // 404 from the mock (route not declared) proves the gate let it through.
    assert_eq!(error["code"], "api_error");
}

#[test]
fn login_requires_connect_first() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let error = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "auth.login",
        json!({ "email": "a@b.co", "password": "Password1" }),
    );
    assert_eq!(error["code"], "not_connected");
}

#[test]
fn unknown_method_is_not_implemented() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let error = request_err(&mut stdin, &mut reader, "1", "students.archive", json!({}));
    assert_eq!(error["code"], "not_implemented");
}

#[test]
fn session_survives_restart_until_logout() {
    let api = MockApi::start(vec![student_login_route("21001")]);
    let dir = temp_dir("rollcall-persist");
    let session_file = dir.join("session.json");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    connect(&mut stdin, &mut reader, &api.base_url, &session_file);
    login(&mut stdin, &mut reader, "student@nith.ac.in");
    drop(stdin);
    child.wait().expect("first daemon exit");

    // A fresh daemon hydrates the persisted session on connect.
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let result = connect(&mut stdin, &mut reader, &api.base_url, &session_file);
    assert_eq!(result["restoredSession"]["landingRoute"], "/student");
    let session = request_ok(&mut stdin, &mut reader, "s", "auth.session", json!({}));
    assert_eq!(session["user"]["rollNo"], "21001");

    request_ok(&mut stdin, &mut reader, "out", "auth.logout", json!({}));
    drop(stdin);
    child.wait().expect("second daemon exit");

    // Logout wiped the file; nothing to restore now.
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let result = connect(&mut stdin, &mut reader, &api.base_url, &session_file);
    assert!(result["restoredSession"].is_null());
    let error = request_err(&mut stdin, &mut reader, "s2", "auth.session", json!({}));
    assert_eq!(error["code"], "not_authenticated");
}

#[test]
fn admin_nav_and_crud_access() {
    let api = MockApi::start(vec![
        admin_login_route(),
        Route::get("/students", json!([{ "roll_no": "21001", "name": "Asha Verma" }])),
    ]);
    let dir = temp_dir("rollcall-admin");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    connect(&mut stdin, &mut reader, &api.base_url, &dir.join("session.json"));

    let result = login(&mut stdin, &mut reader, "admin@nith.ac.in");
    assert_eq!(result["landingRoute"], "/admin");
    assert_eq!(result["navLinks"].as_array().unwrap().len(), 4);

    let listing = request_ok(&mut stdin, &mut reader, "1", "students.list", json!({}));
    assert_eq!(listing["students"][0]["roll_no"], "21001");
}
