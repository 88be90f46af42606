//! Test server harness for E2E testing
//!
//! Provides TestAuthServer for spawning real auth server instances in tests.

use crate::fixtures::test_config;
use auth_service::config::Config;
use auth_service::handlers::auth_handler::AppState;
use auth_service::repositories::users::{memory::InMemoryUserStore, UserStore};
use auth_service::routes;
use auth_service::services::token_service::{JwtTokenService, TokenAuthority};
use auth_service::services::user_service::UserService;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Test harness for spawning the auth server in E2E tests
///
/// Each instance owns a fresh in-memory user store, so tests never see
/// each other's accounts.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_signup_e2e() -> Result<()> {
///     let server = TestAuthServer::spawn().await?;
///
///     let response = server
///         .signup("Ann", "ann@x.com", "secret")
///         .await?;
///
///     assert_eq!(response.status(), 201);
///     Ok(())
/// }
/// ```
pub struct TestAuthServer {
    addr: SocketAddr,
    config: Config,
    users: Arc<InMemoryUserStore>,
    client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl TestAuthServer {
    /// Spawn a new test server with the default test configuration
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_config(test_config()).await
    }

    /// Spawn a new test server instance
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Use an empty in-memory user store
    /// - Start the HTTP server in the background
    pub async fn spawn_with_config(config: Config) -> Result<Self, anyhow::Error> {
        let users = Arc::new(InMemoryUserStore::new());
        let store: Arc<dyn UserStore> = users.clone();

        let tokens: Arc<dyn TokenAuthority> = Arc::new(
            JwtTokenService::new(&config, Arc::clone(&store))
                .map_err(|e| anyhow::anyhow!("Failed to build token service: {}", e))?,
        );

        let user_service = UserService::new(store, Arc::clone(&tokens), config.bcrypt_cost)
            .map_err(|e| anyhow::anyhow!("Failed to build user service: {}", e))?;

        let state = Arc::new(AppState {
            users: user_service,
            tokens,
        });

        // Initialize metrics recorder for test server
        // Note: This may fail if already installed in the test process.
        // In that case, we create a new recorder without installing it globally.
        let metrics_handle = match routes::init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                let recorder = PrometheusBuilder::new().build_recorder();
                recorder.handle()
            }
        };

        let app = routes::build_routes(
            state,
            metrics_handle,
            Duration::from_secs(config.request_timeout_seconds),
        );

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        // Spawn server in background
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            users,
            client: reqwest::Client::new(),
            handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get reference to the server configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the store backing this server, for inspecting persisted state
    pub fn users(&self) -> &InMemoryUserStore {
        &self.users
    }

    /// Shared HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// POST /api/v1/auth/signup
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<reqwest::Response, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/api/v1/auth/signup", self.url()))
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await?;
        Ok(response)
    }

    /// POST /api/v1/auth/signin
    pub async fn signin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<reqwest::Response, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/api/v1/auth/signin", self.url()))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Ok(response)
    }

    /// Register an account, sign in, and return the issued token
    ///
    /// # Example
    /// ```rust,ignore
    /// let token = server.signup_and_signin("Ann", "ann@x.com", "secret").await?;
    /// ```
    pub async fn signup_and_signin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<String, anyhow::Error> {
        let signup = self.signup(name, email, password).await?;
        anyhow::ensure!(
            signup.status() == reqwest::StatusCode::CREATED,
            "signup failed with status {}",
            signup.status()
        );

        let signin = self.signin(email, password).await?;
        anyhow::ensure!(
            signin.status() == reqwest::StatusCode::OK,
            "signin failed with status {}",
            signin.status()
        );

        let body: Value = signin.json().await?;
        body["jwtToken"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("signin response missing jwtToken: {}", body))
    }

    /// GET a protected path with an optional raw Authorization header value
    pub async fn get_with_auth(
        &self,
        path: &str,
        authorization: Option<&str>,
    ) -> Result<reqwest::Response, anyhow::Error> {
        let mut request = self.client.get(format!("{}{}", self.url(), path));
        if let Some(value) = authorization {
            request = request.header(reqwest::header::AUTHORIZATION, value);
        }
        Ok(request.send().await?)
    }
}

impl Drop for TestAuthServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
