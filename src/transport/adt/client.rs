//! ADT file-store client.
//!
//! Talks to the `ui5-bsp` file store of an ABAP system. Every mutating call
//! carries the CSRF token fetched during [`RemoteStore::connect`] and the
//! package and transport request of the target repository.

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, Method, RequestBuilder, header};
use std::sync::RwLock;
use tracing::{error, info, warn};

use crate::config::{AbapRepositoryConfig, Credentials, DeployerConfig};
use crate::error::{DeployerError, Result, TransportError};
use crate::planner::{RemoteRoot, normalize_remote_path};
use crate::transport::http::{CSRF_HEADER, OCTET_STREAM, build_client, check_response, join_url, send_error};
use crate::transport::{RemoteListing, RemoteStore};

use super::feed::parse_listing;

const BSP_PATH: &str = "sap/bc/adt/filestore/ui5-bsp/objects";
const CTS_PATH: &str = "sap/bc/adt/cts/transportrequests";
const CTS_CHECKS_PATH: &str = "/consistencychecks";
const PACKAGE_PATH: &str = "sap/bc/adt/packages";
const CONTENT_PATH: &str = "/content";
const DISCOVERY_PATH: &str = "sap/bc/adt/discovery";
const APP_INDEX_PATH: &str = "sap/bc/adt/filestore/ui5-bsp/appindex";
const FILE_CHARSET: &str = "UTF-8";

/// Characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes one URL component, `/` included.
#[must_use]
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Client for the ADT file-store services.
#[derive(Debug)]
pub struct AdtClient {
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
    /// Token returned by the discovery call.
    csrf_token: RwLock<String>,
}

impl AdtClient {
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

    /// Returns where remote discovery starts for this application.
    #[must_use]
    pub fn root(&self) -> RemoteRoot {
        RemoteRoot::new(
            encode_component(&self.repository.bsp_application),
            self.repository.bsp_application.clone(),
        )
    }

    /// Triggers the application index calculation, if configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn calculate_app_index(&self) -> Result<()> {
        if !self.repository.app_index_calculate {
            return Ok(());
        }

        info!("Calculating app index");
        let path = format!(
            "{APP_INDEX_PATH}/{}",
            encode_component(&self.repository.bsp_application)
        );
        let request = self
            .request(Method::POST, &path)
            .header(header::CONTENT_TYPE, OCTET_STREAM);
        self.send(Method::POST, &path, request).await?;
        Ok(())
    }

    fn csrf_token(&self) -> String {
        self.csrf_token
            .read()
            .map(|token| token.clone())
            .unwrap_or_default()
    }

    fn transport_request(&self) -> &str {
        self.repository.effective_transport_request()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, join_url(&self.base_url, path))
            .basic_auth(self.credentials.username(), Some(self.credentials.password()))
            .header(header::ACCEPT, "*/*")
            .header(CSRF_HEADER, self.csrf_token())
            .query(&self.default_query)
    }

    async fn send(&self, method: Method, path: &str, request: RequestBuilder) -> Result<reqwest::Response> {
        let url = join_url(&self.base_url, path);
        let response = request.send().await.map_err(|e| send_error(&url, &e))?;
        check_response(&method, &url, response).await
    }

    /// File-store path of the content below a resource path.
    fn content_path(&self, path: &str) -> String {
        format!(
            "{BSP_PATH}/{}{}{CONTENT_PATH}",
            encode_component(&self.repository.bsp_application),
            encode_component(path)
        )
    }

    async fn authenticate(&self) -> Result<String> {
        info!("Connecting to {}", self.base_url);

        let request = self
            .client
            .get(join_url(&self.base_url, DISCOVERY_PATH))
            .basic_auth(self.credentials.username(), Some(self.credentials.password()))
            .header(header::ACCEPT, "*/*")
            .header(CSRF_HEADER, "Fetch")
            .query(&self.default_query);
        let response = self.send(Method::GET, DISCOVERY_PATH, request).await?;

        let token = response
            .headers()
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if let Ok(mut guard) = self.csrf_token.write() {
            *guard = token;
        }

        let url = join_url(&self.base_url, DISCOVERY_PATH);
        response.text().await.map_err(|e| send_error(&url, &e))
    }

    fn validate_discovery(&self, discovery: &str) -> Result<()> {
        if self.repository.skip_adt_validations {
            warn!("All ADT validations will be skipped!");
            return Ok(());
        }

        let missing: Vec<String> = [BSP_PATH, CTS_PATH, PACKAGE_PATH]
            .into_iter()
            .filter(|path| !discovery.contains(&format!("<app:collection href=\"{path}\">")))
            .map(String::from)
            .collect();

        if missing.is_empty() {
            return Ok(());
        }
        for path in &missing {
            error!("{path} not found in discovery!");
        }
        error!("For more information, check {DISCOVERY_PATH}");
        Err(DeployerError::Transport(TransportError::MissingServices { missing }))
    }

    async fn check_package(&self) -> Result<()> {
        let package = &self.repository.package;
        info!("Getting ABAP package {PACKAGE_PATH}/{package}");
        if self.repository.skip_adt_validations {
            return Ok(());
        }

        let path = format!("{PACKAGE_PATH}/{}", encode_component(package));
        self.send(Method::GET, &path, self.request(Method::GET, &path)).await?;
        Ok(())
    }

    async fn check_transport_request(&self) -> Result<()> {
        if self.repository.is_local_package() {
            info!("Package {} is local, no transport request needed", self.repository.package);
            return Ok(());
        }

        let transport = self.transport_request();
        info!("Getting ABAP transport request {CTS_PATH}/{transport}");
        if self.repository.skip_adt_validations {
            return Ok(());
        }

        let path = format!("{CTS_PATH}/{}{CTS_CHECKS_PATH}", encode_component(transport));
        self.send(Method::POST, &path, self.request(Method::POST, &path)).await?;
        Ok(())
    }

    async fn ensure_bsp_application(&self) -> Result<()> {
        let app = &self.repository.bsp_application;
        info!("Getting BSP application {BSP_PATH}/{app}");

        let path = format!("{BSP_PATH}/{}", encode_component(app));
        match self.send(Method::GET, &path, self.request(Method::GET, &path)).await {
            Ok(_) => Ok(()),
            Err(DeployerError::Transport(ref e)) if e.status() == Some(404) => {
                self.create_bsp_application().await
            }
            Err(e) => Err(e),
        }
    }

    async fn create_bsp_application(&self) -> Result<()> {
        let app = &self.repository.bsp_application;
        info!("Creating BSP application {BSP_PATH}/{app}");

        let path = format!("{BSP_PATH}/%20{CONTENT_PATH}");
        let request = self
            .request(Method::POST, &path)
            .header(header::CONTENT_TYPE, OCTET_STREAM)
            .query(&[
                ("type", "folder"),
                ("isBinary", "false"),
                ("name", app.as_str()),
                ("description", self.repository.bsp_application_text.as_str()),
                ("devclass", self.repository.package.as_str()),
                ("corrNr", self.transport_request()),
            ]);
        self.send(Method::POST, &path, request).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for AdtClient {
    async fn connect(&self) -> Result<()> {
        let discovery = self.authenticate().await?;
        self.validate_discovery(&discovery)?;
        self.check_package().await?;
        self.check_transport_request().await?;
        self.ensure_bsp_application().await
    }

    async fn list_entries(&self, folder_id: &str) -> Result<RemoteListing> {
        info!("Getting files from {}", normalize_remote_path(folder_id, ""));

        let path = format!("{BSP_PATH}/{folder_id}{CONTENT_PATH}");
        let response = self.send(Method::GET, &path, self.request(Method::GET, &path)).await?;
        let url = join_url(&self.base_url, &path);
        let body = response.text().await.map_err(|e| send_error(&url, &e))?;

        parse_listing(&body, folder_id)
    }

    async fn create_folder(&self, path: &str) -> Result<()> {
        info!("Creating folder {}{path}", self.repository.bsp_application);

        let (parent, name) = split_parent(path);
        let target = self.content_path(parent);
        let request = self
            .request(Method::POST, &target)
            .header(header::CONTENT_TYPE, OCTET_STREAM)
            .header(header::IF_MATCH, "*")
            .query(&[
                ("type", "folder"),
                ("isBinary", "false"),
                ("name", name),
                ("devclass", self.repository.package.as_str()),
                ("corrNr", self.transport_request()),
            ]);
        self.send(Method::POST, &target, request).await?;
        Ok(())
    }

    async fn delete_folder(&self, path: &str) -> Result<()> {
        info!("Deleting folder {}{path}", self.repository.bsp_application);

        let target = self.content_path(path);
        let request = self
            .request(Method::DELETE, &target)
            .header(header::CONTENT_TYPE, OCTET_STREAM)
            .header(header::IF_MATCH, "*")
            .query(&[("deleteChildren", "true"), ("corrNr", self.transport_request())]);
        self.send(Method::DELETE, &target, request).await?;
        Ok(())
    }

    async fn create_file(&self, path: &str, content: &[u8]) -> Result<()> {
        info!("Creating file {}{path}", self.repository.bsp_application);

        let (parent, name) = split_parent(path);
        let target = self.content_path(parent);
        let binary = if is_binary(content) { "true" } else { "false" };
        let request = self
            .request(Method::POST, &target)
            .header(header::CONTENT_TYPE, OCTET_STREAM)
            .header(header::IF_MATCH, "*")
            .query(&[
                ("type", "file"),
                ("isBinary", binary),
                ("name", name),
                ("charset", FILE_CHARSET),
                ("devclass", self.repository.package.as_str()),
                ("corrNr", self.transport_request()),
            ])
            .body(upload_body(content));
        self.send(Method::POST, &target, request).await?;
        Ok(())
    }

    async fn update_file(&self, path: &str, content: &[u8]) -> Result<()> {
        info!("Updating file {}{path}", self.repository.bsp_application);

        let target = self.content_path(path);
        let binary = if is_binary(content) { "true" } else { "false" };
        let request = self
            .request(Method::PUT, &target)
            .header(header::CONTENT_TYPE, OCTET_STREAM)
            .header(header::IF_MATCH, "*")
            .query(&[
                ("charset", FILE_CHARSET),
                ("isBinary", binary),
                ("corrNr", self.transport_request()),
            ])
            .body(upload_body(content));
        self.send(Method::PUT, &target, request).await?;
        Ok(())
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        info!("Deleting file {}{path}", self.repository.bsp_application);

        let target = self.content_path(path);
        let request = self
            .request(Method::DELETE, &target)
            .header(header::CONTENT_TYPE, OCTET_STREAM)
            .header(header::IF_MATCH, "*")
            .query(&[("corrNr", self.transport_request())]);
        self.send(Method::DELETE, &target, request).await?;
        Ok(())
    }
}

/// Splits `/a/b/c` into `/a/b` and `c`.
fn split_parent(path: &str) -> (&str, &str) {
    path.rfind('/')
        .map_or(("", path), |i| (&path[..i], &path[i + 1..]))
}

/// The file store rejects empty bodies, so empty files are sent as a space.
fn upload_body(content: &[u8]) -> Vec<u8> {
    if content.is_empty() {
        b" ".to_vec()
    } else {
        content.to_vec()
    }
}

/// Guesses whether content is binary from its first kilobyte.
fn is_binary(content: &[u8]) -> bool {
    let sample = &content[..content.len().min(1024)];
    if sample.contains(&0) {
        return true;
    }
    if std::str::from_utf8(sample).is_ok() {
        return false;
    }

    let suspicious = sample
        .iter()
        .filter(|b| (**b < 0x20 && !matches!(**b, b'\t' | b'\n' | b'\r' | 0x0c | 0x1b)) || **b == 0x7f)
        .count();
    suspicious * 10 > sample.len()
}
