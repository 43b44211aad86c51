//! Client for the `ABAP_REPOSITORY_SRV` OData service.
//!
//! The service takes a whole application at once as a zipped archive, so
//! there is no per-file sync on this path.

use reqwest::{Client, Method, RequestBuilder, header};
use std::sync::RwLock;
use tracing::info;

use crate::config::{AbapRepositoryConfig, Credentials, DeployerConfig};
use crate::error::{DeployerError, Result};
use crate::transport::adt::encode_component;
use crate::transport::http::{CSRF_HEADER, build_client, check_response, join_url, send_error};

/// Service root, relative to the connection URL.
pub const ODATA_PATH: &str = "sap/opu/odata/UI5/ABAP_REPOSITORY_SRV";

const ATOM_XML: &str = "application/atom+xml";

/// Whether the repository already holds the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryState {
    /// The application exists and will be replaced.
    Exists,
    /// The application does not exist and will be created.
    Missing,
}

/// Client for the repository service.
#[derive(Debug)]
pub struct ODataClient {
    /// HTTP client.
    client: Client,
    /// Base URL of the system.
    base_url: String,
    /// Login credentials.
    credentials: Credentials,
    /// Target repository.
    repository: AbapRepositoryConfig,
    /// Query parameters sent with every request.
    default_query: Vec<(&'static str, String)>,
    /// Token returned by the metadata call.
    csrf_token: RwLock<String>,
}

impl ODataClient {
    /// Creates a client for the deployer settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(deployer: &DeployerConfig) -> Result<Self> {
        let repository = deployer.abap_repository();

        let mut default_query = Vec::new();
        if let Some(client) = repository.client.as_deref().filter(|c| !c.is_empty()) {
            default_query.push(("sap-client", client.to_string()));
        }
        if let Some(language) = repository.language.as_deref().filter(|l| !l.is_empty()) {
            default_query.push(("sap-language", language.to_uppercase()));
        }

        Ok(Self {
            client: build_client(&deployer.connection)?,
            base_url: deployer.connection.url.clone(),
            credentials: deployer.credentials.clone(),
            repository,
            default_query,
            csrf_token: RwLock::new(String::new()),
        })
    }

    /// Returns the connection URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the target repository settings.
    #[must_use]
    pub const fn repository(&self) -> &AbapRepositoryConfig {
        &self.repository
    }

    /// Authenticates and fetches the CSRF token.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata request fails.
    pub async fn connect(&self) -> Result<()> {
        info!("Connecting to {}", self.base_url);
        info!("OData API: {}", join_url(&self.base_url, ODATA_PATH));

        let path = format!("{ODATA_PATH}/$metadata");
        let request = self
            .client
            .get(join_url(&self.base_url, &path))
            .basic_auth(self.credentials.username(), Some(self.credentials.password()))
            .header(header::ACCEPT, "*/*")
            .header(CSRF_HEADER, "Fetch")
            .query(&self.default_query);
        let response = self.send(Method::GET, &path, request).await?;

        let token = response
            .headers()
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if let Ok(mut guard) = self.csrf_token.write() {
            *guard = token;
        }
        Ok(())
    }

    /// Looks the application up in the repository.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than 404.
    pub async fn repository_state(&self) -> Result<RepositoryState> {
        let app = &self.repository.bsp_application;
        info!("Getting BSP application {app}");

        let path = self.entity_path();
        match self.send(Method::GET, &path, self.request(Method::GET, &path)).await {
            Ok(_) => Ok(RepositoryState::Exists),
            Err(DeployerError::Transport(ref e)) if e.status() == Some(404) => {
                Ok(RepositoryState::Missing)
            }
            Err(e) => Err(e),
        }
    }

    /// Creates or replaces the application with `payload`.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails.
    pub async fn upload(&self, state: RepositoryState, payload: String) -> Result<()> {
        let (method, path) = match state {
            RepositoryState::Exists => {
                info!("Updating BSP application {}", self.repository.bsp_application);
                (Method::PUT, self.entity_path())
            }
            RepositoryState::Missing => {
                info!("Creating BSP application {}", self.repository.bsp_application);
                (Method::POST, format!("{ODATA_PATH}/Repositories"))
            }
        };

        let request = self
            .request(method.clone(), &path)
            .header(header::CONTENT_TYPE, ATOM_XML)
            .header("type", "entry")
            .header("charset", "UTF8")
            .query(&[
                ("CodePage", "UTF8"),
                ("CondenseMessagesInHttpResponseHeader", "X"),
                ("format", "json"),
                ("TransportRequest", self.repository.effective_transport_request()),
            ])
            .body(payload);
        self.send(method, &path, request).await?;
        Ok(())
    }

    fn entity_path(&self) -> String {
        format!(
            "{ODATA_PATH}/Repositories('{}')",
            encode_component(&self.repository.bsp_application)
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let token = self
            .csrf_token
            .read()
            .map(|token| token.clone())
            .unwrap_or_default();
        self.client
            .request(method, join_url(&self.base_url, path))
            .basic_auth(self.credentials.username(), Some(self.credentials.password()))
            .header(header::ACCEPT, "*/*")
            .header(CSRF_HEADER, token)
            .query(&self.default_query)
    }

    async fn send(&self, method: Method, path: &str, request: RequestBuilder) -> Result<reqwest::Response> {
        let url = join_url(&self.base_url, path);
        let response = request.send().await.map_err(|e| send_error(&url, &e))?;
        check_response(&method, &url, response).await
    }
}
