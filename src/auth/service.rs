// Authentication service - business logic layer

use std::sync::Arc;
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{AuthSession, LoginRequest, NewUser, RegisterRequest},
    password,
    repository::UserRepository,
    token::TokenService,
};
use crate::db::StoreError;

/// Authentication service coordinating register and login
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Register a new user
    ///
    /// 1. Validates username (alphanumeric, 3-20) and password (non-empty)
    /// 2. Rejects a taken username with `UsernameTaken`
    /// 3. Hashes the password and stores the user
    /// 4. Issues a session token for the new user
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession, AuthError> {
        request.validate()?;

        if self.users.find_by_username(&request.username).await?.is_some() {
            tracing::warn!("Registration attempt for existing username: {}", request.username);
            return Err(AuthError::UsernameTaken);
        }

        let hashed_password = password::hash_password_off_thread(request.password).await?;

        // a concurrent registration can still win between lookup and insert
        let user = self
            .users
            .create(NewUser {
                username: request.username,
                hashed_password,
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => AuthError::UsernameTaken,
                other => AuthError::Store(other),
            })?;

        let token = self.tokens.issue(&user.identity())?;
        tracing::info!("Registered user {} ({}) at {}", user.username, user.id, user.created_at);

        Ok(AuthSession {
            user: user.into(),
            token,
        })
    }

    /// Log a user in
    ///
    /// Missing fields, unknown usernames and wrong passwords all fail with
    /// `InvalidCredentials`.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession, AuthError> {
        let (username, password) = match (request.username, request.password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
            _ => {
                tracing::debug!("Login attempt with missing credentials");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let user = match self.users.find_by_username(&username).await? {
            Some(user) => user,
            None => {
                tracing::debug!("Login attempt for unknown username");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !password::verify_password_off_thread(password, user.hashed_password.clone()).await {
            tracing::debug!("Login attempt with wrong password for {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user.identity())?;
        tracing::info!("User {} logged in", user.id);

        Ok(AuthSession {
            user: user.into(),
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::MemoryUserRepository;

    fn create_service() -> (AuthService, Arc<MemoryUserRepository>, Arc<TokenService>) {
        let users = Arc::new(MemoryUserRepository::new());
        let tokens = Arc::new(TokenService::new("test_secret_key_for_testing_purposes"));
        let service = AuthService::new(users.clone(), tokens.clone());
        (service, users, tokens)
    }

    fn register_request(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn login_request(username: Option<&str>, password: Option<&str>) -> LoginRequest {
        LoginRequest {
            username: username.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (service, _, tokens) = create_service();

        let registered = service
            .register(register_request("juhee", "mypass1234"))
            .await
            .unwrap();
        let logged_in = service
            .login(login_request(Some("juhee"), Some("mypass1234")))
            .await
            .unwrap();

        assert_eq!(registered.user.username, "juhee");
        assert_eq!(logged_in.user, registered.user);

        let claims = tokens.verify(&logged_in.token).unwrap();
        assert_eq!(claims.sub, registered.user.id);
        assert_eq!(claims.username, "juhee");
    }

    #[tokio::test]
    async fn test_register_duplicate_username_conflicts() {
        let (service, users, _) = create_service();
        service
            .register(register_request("juhee", "mypass1234"))
            .await
            .unwrap();

        let result = service.register(register_request("juhee", "another")).await;

        assert!(matches!(result, Err(AuthError::UsernameTaken)));
        assert_eq!(users.len().await, 1);
    }

    #[tokio::test]
    async fn test_register_validates_before_touching_store() {
        let (service, users, _) = create_service();

        let bad_name = service.register(register_request("j!", "mypass1234")).await;
        let no_password = service.register(register_request("juhee", "")).await;

        assert!(matches!(bad_name, Err(AuthError::ValidationError(_))));
        assert!(matches!(no_password, Err(AuthError::ValidationError(_))));
        assert_eq!(users.len().await, 0);
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let (service, users, _) = create_service();
        service
            .register(register_request("juhee", "mypass1234"))
            .await
            .unwrap();

        let stored = users.find_by_username("juhee").await.unwrap().unwrap();

        assert_ne!(stored.hashed_password, "mypass1234");
        assert!(password::verify_password("mypass1234", &stored.hashed_password));
    }

    #[tokio::test]
    async fn test_login_failures_are_identical() {
        let (service, _, _) = create_service();
        service
            .register(register_request("juhee", "mypass1234"))
            .await
            .unwrap();

        let attempts = vec![
            login_request(Some("juhee"), Some("wrongpass")),
            login_request(Some("nobody"), Some("mypass1234")),
            login_request(Some("juhee"), None),
            login_request(None, Some("mypass1234")),
            login_request(Some(""), Some("")),
        ];

        for attempt in attempts {
            let result = service.login(attempt).await;
            assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        }
    }
}
