pub mod test_helpers {
    use sqlx::{
        sqlite::{SqliteConnectOptions, SqlitePoolOptions},
        SqlitePool,
    };
    use std::str::FromStr;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Insert a test user with a hashed password; returns the new id.
    pub async fn insert_test_user(
        pool: &SqlitePool,
        name: &str,
        email: &str,
        password: &str,
        role: crate::models::Role,
    ) -> Result<i64, sqlx::Error> {
        let password_hash = crate::services::auth_service::hash_password(password)
            .map_err(|e| sqlx::Error::Configuration(format!("{}", e).into()))?;

        let result = sqlx::query(
            "INSERT INTO users (name, email, password_hash, role) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Insert a party owned by the given user; returns the new id.
    pub async fn insert_test_party(
        pool: &SqlitePool,
        created_by: i64,
        name: &str,
        logo_url: &str,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO parties (name, description, logo_url, created_by) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind("Test party description")
        .bind(logo_url)
        .bind(created_by)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Insert a campaign for a party; returns the new id.
    pub async fn insert_test_campaign(
        pool: &SqlitePool,
        party_id: i64,
        title: &str,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO campaigns (party_id, title, description, image_url) VALUES (?, ?, ?, ?)",
        )
        .bind(party_id)
        .bind(title)
        .bind("Test campaign description")
        .bind("📢")
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Count rows in a table. Only for test assertions.
    pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await
            .expect("count query failed")
    }
}

pub mod api_helpers {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::Request,
        Router,
    };
    use serde_json::Value;
    use tempfile::TempDir;
    use time::Duration;
    use tower::ServiceExt;
    use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

    use crate::storage::FileStorage;
    use crate::AppState;

    /// A full application wired over an isolated database and a
    /// temporary upload directory, with an in-memory session store.
    pub struct TestApp {
        pub router: Router,
        pub pool: sqlx::SqlitePool,
        pub upload_dir: TempDir,
    }

    pub async fn spawn_test_app() -> TestApp {
        let pool = super::test_helpers::create_test_db()
            .await
            .expect("test database");

        let upload_dir = tempfile::tempdir().expect("temp upload dir");
        let storage = Arc::new(FileStorage::new(
            upload_dir.path().to_path_buf(),
            "http://localhost:5000",
        ));

        let state = AppState::new(pool.clone(), storage);

        let session_layer = SessionManagerLayer::new(MemoryStore::default())
            .with_secure(false)
            .with_expiry(Expiry::OnInactivity(Duration::hours(24)));

        let router = crate::build_router(state).layer(session_layer);

        TestApp {
            router,
            pool,
            upload_dir,
        }
    }

    impl TestApp {
        /// One request through the router; returns status, the session
        /// cookie (if set) and the parsed JSON body.
        pub async fn request(
            &self,
            method: &str,
            uri: &str,
            cookie: Option<&str>,
            body: Option<Value>,
        ) -> (u16, Option<String>, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(cookie) = cookie {
                builder = builder.header("cookie", cookie);
            }

            let request = match body {
                Some(json) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            self.send(request).await
        }

        /// POST a single file as a multipart form with one `image` field.
        pub async fn upload(
            &self,
            uri: &str,
            cookie: &str,
            filename: &str,
            bytes: &[u8],
        ) -> (u16, Value) {
            let boundary = "test-upload-boundary";
            let mut body = format!(
                "--{boundary}\r\n\
                 Content-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .into_bytes();
            body.extend_from_slice(bytes);
            body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

            let request = Request::builder()
                .method("POST")
                .uri(uri)
                .header("cookie", cookie)
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap();

            let (status, _, json) = self.send(request).await;
            (status, json)
        }

        async fn send(&self, request: Request<Body>) -> (u16, Option<String>, Value) {
            let response = self
                .router
                .clone()
                .oneshot(request)
                .await
                .expect("request failed");

            let status = response.status().as_u16();
            let set_cookie = response
                .headers()
                .get("set-cookie")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.split(';').next().unwrap_or(v).to_string());

            let bytes = to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("body read failed");
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::String(
                    String::from_utf8_lossy(&bytes).into_owned(),
                ))
            };

            (status, set_cookie, json)
        }

        /// Register and log in a user, returning the session cookie.
        pub async fn login_as(&self, name: &str, email: &str, role: &str) -> String {
            let (status, _, _) = self
                .request(
                    "POST",
                    "/api/auth/register",
                    None,
                    Some(serde_json::json!({
                        "name": name,
                        "email": email,
                        "password": "password123",
                        "role": role,
                    })),
                )
                .await;
            assert_eq!(status, 201, "registration failed for {}", email);

            self.login(email, "password123").await
        }

        pub async fn login(&self, email: &str, password: &str) -> String {
            let (status, cookie, _) = self
                .request(
                    "POST",
                    "/api/auth/login",
                    None,
                    Some(serde_json::json!({ "email": email, "password": password })),
                )
                .await;
            assert_eq!(status, 200, "login failed for {}", email);
            cookie.expect("login did not set a session cookie")
        }
    }
}
