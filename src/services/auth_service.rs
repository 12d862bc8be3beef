use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::models::{Role, User};
use crate::repositories::{RepositoryError, UserRepository};

use super::audit_service::AuditLogger;

pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    audit: Arc<AuditLogger>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, audit: Arc<AuditLogger>) -> Self {
        Self { users, audit }
    }

    /// Creates a voter or party account. Admin accounts only come from
    /// the operator CLI, never from self-registration.
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<User> {
        if request.name.trim().is_empty()
            || request.email.trim().is_empty()
            || request.password.is_empty()
        {
            return Err(ApiError::Validation("All fields are required".to_string()));
        }

        let role = request
            .role
            .parse::<Role>()
            .map_err(|_| ApiError::Validation("Invalid role".to_string()))?;
        if role == Role::Admin {
            return Err(ApiError::Validation("Invalid role".to_string()));
        }

        // Friendly pre-check; the UNIQUE index on email is the real gate.
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&request.password)?;

        let user = match self
            .users
            .create_user(&request.name, &request.email, &password_hash, role)
            .await
        {
            Ok(user) => user,
            Err(RepositoryError::AlreadyExists) => {
                return Err(ApiError::Conflict("Email already registered".to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        self.audit
            .record_with(
                &format!("{} registered", role.label()),
                Some(user.id),
                Some(&user.email),
            )
            .await;

        Ok(user)
    }

    /// Verifies credentials. Unknown email and wrong password answer
    /// with the same message so accounts cannot be enumerated.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "Email and password required".to_string(),
            ));
        }

        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| ApiError::Auth("Invalid credentials".to_string()))?;

        if !verify_password(password, &user.password_hash) {
            return Err(ApiError::Auth("Invalid credentials".to_string()));
        }

        self.audit.record("User logged in", Some(user.id)).await;

        Ok(user)
    }

    pub async fn log_logout(&self, user_id: i64) {
        self.audit.record("User logged out", Some(user_id)).await;
    }
}

pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::audit_repository::MockAuditRepository;
    use crate::repositories::user_repository::MockUserRepository;
    use mockall::predicate::*;

    fn quiet_audit() -> Arc<AuditLogger> {
        let mut mock = MockAuditRepository::new();
        mock.expect_append()
            .returning(|_, _, _| Box::pin(async { Ok(1) }));
        Arc::new(AuditLogger::new(Arc::new(mock)))
    }

    fn service(users: MockUserRepository) -> AuthService {
        AuthService::new(Arc::new(users), quiet_audit())
    }

    fn stored_user(id: i64, email: &str, password_hash: &str) -> User {
        User {
            id,
            name: "Someone".to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role: Role::Voter,
            has_voted: false,
            created_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn register_rejects_missing_fields() {
        let result = service(MockUserRepository::new())
            .register(RegisterRequest {
                name: "".to_string(),
                email: "a@x.com".to_string(),
                password: "secret123".to_string(),
                role: "voter".to_string(),
            })
            .await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn register_rejects_admin_role() {
        let result = service(MockUserRepository::new())
            .register(RegisterRequest {
                name: "Eve".to_string(),
                email: "eve@x.com".to_string(),
                password: "secret123".to_string(),
                role: "admin".to_string(),
            })
            .await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .with(eq("taken@x.com"))
            .times(1)
            .returning(|_| Box::pin(async { Ok(Some(stored_user(1, "taken@x.com", "hash"))) }));

        let result = service(users)
            .register(RegisterRequest {
                name: "Second".to_string(),
                email: "taken@x.com".to_string(),
                password: "different".to_string(),
                role: "party".to_string(),
            })
            .await;

        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn login_answers_identically_for_unknown_email_and_bad_password() {
        let hash = hash_password("right-password").unwrap();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .with(eq("ghost@x.com"))
            .returning(|_| Box::pin(async { Ok(None) }));
        users
            .expect_find_by_email()
            .with(eq("real@x.com"))
            .returning(move |_| {
                let hash = hash.clone();
                Box::pin(async move { Ok(Some(stored_user(2, "real@x.com", &hash))) })
            });

        let service = service(users);

        let unknown = service.login("ghost@x.com", "whatever").await.unwrap_err();
        let mismatch = service
            .login("real@x.com", "wrong-password")
            .await
            .unwrap_err();

        match (unknown, mismatch) {
            (ApiError::Auth(a), ApiError::Auth(b)) => assert_eq!(a, b),
            other => panic!("expected Auth errors, got {:?}", other),
        }
    }

    #[test]
    fn password_hashes_verify_and_reject() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2hunter2", &hash));
        assert!(!verify_password("hunter3hunter3", &hash));
        assert!(!verify_password("hunter2hunter2", "not-a-hash"));
    }
}
