use ballotbox::models::Role;
use ballotbox::test_utils::{api_helpers::spawn_test_app, test_helpers};
use serde_json::json;

async fn admin_cookie(app: &ballotbox::test_utils::api_helpers::TestApp) -> String {
    test_helpers::insert_test_user(&app.pool, "Root", "admin@x.com", "password123", Role::Admin)
        .await
        .unwrap();
    app.login("admin@x.com", "password123").await
}

#[tokio::test]
async fn users_export_has_fixed_header_and_one_row_per_user() {
    let app = spawn_test_app().await;
    let admin = admin_cookie(&app).await;
    app.login_as("Alice", "a@x.com", "voter").await;
    app.login_as("Bob", "b@x.com", "party").await;

    let (status, _, body) = app
        .request("GET", "/api/admin/export/users", Some(&admin), None)
        .await;
    assert_eq!(status, 200);

    let csv = body.as_str().expect("CSV body");
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "ID,Name,Email,Role,Has Voted,Created At"
    );

    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 3);
    // Ordered by id: admin was inserted first.
    assert!(rows[0].contains("admin@x.com"));
    assert!(rows[1].contains("a@x.com"));
    assert!(rows[2].contains("b@x.com"));
    assert!(rows[1].contains(",voter,No,"));
}

#[tokio::test]
async fn votes_and_parties_exports_join_names() {
    let app = spawn_test_app().await;
    let admin = admin_cookie(&app).await;

    let voter = app.login_as("Alice", "a@x.com", "voter").await;
    let party = app.login_as("Bob", "b@x.com", "party").await;
    let (_, _, body) = app
        .request(
            "POST",
            "/api/party/create",
            Some(&party),
            Some(json!({ "name": "Green" })),
        )
        .await;
    let party_id = body["party_id"].as_i64().unwrap();
    app.request(
        "POST",
        "/api/voter/vote",
        Some(&voter),
        Some(json!({ "party_id": party_id })),
    )
    .await;

    let (status, _, body) = app
        .request("GET", "/api/admin/export/votes", Some(&admin), None)
        .await;
    assert_eq!(status, 200);
    let csv = body.as_str().unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "ID,Voter ID,Voter Name,Voter Email,Party ID,Party Name,Voted At"
    );
    let row = lines.next().unwrap();
    assert!(row.contains("Alice"));
    assert!(row.contains("a@x.com"));
    assert!(row.contains("Green"));

    let (status, _, body) = app
        .request("GET", "/api/admin/export/parties", Some(&admin), None)
        .await;
    assert_eq!(status, 200);
    let csv = body.as_str().unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "ID,Party Name,Description,Creator,Vote Count,Created At"
    );
    let row = lines.next().unwrap();
    assert!(row.contains("Green"));
    assert!(row.contains("Bob"));
    assert!(row.contains(",1,"));
}

#[tokio::test]
async fn logs_export_marks_missing_users_and_audits_itself() {
    let app = spawn_test_app().await;
    let admin = admin_cookie(&app).await;

    // An entry with no user reference at all.
    sqlx::query("INSERT INTO logs (action, user_id) VALUES ('System started', NULL)")
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, _, body) = app
        .request("GET", "/api/admin/export/logs", Some(&admin), None)
        .await;
    assert_eq!(status, 200);
    let csv = body.as_str().unwrap();
    assert_eq!(
        csv.lines().next().unwrap(),
        "ID,Action,User Name,User Email,Details,Created At"
    );
    assert!(csv.contains("System started,N/A,N/A"));

    // Each export writes its own audit entry.
    let audited = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM logs WHERE action = 'Logs data exported'",
    )
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(audited, 1);
}

#[tokio::test]
async fn exports_are_served_as_csv_attachments() {
    let app = spawn_test_app().await;
    let admin = admin_cookie(&app).await;

    // Raw response check needs the headers, so go through the router by hand.
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/admin/export/users")
                .header("cookie", &admin)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=users.csv"
    );
}
