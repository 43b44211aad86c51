//! SAP NetWeaver deployers.
//!
//! `sap-netweaver` syncs the build output file by file through the ADT
//! file store. `sap-netweaver-odata` uploads it as one archive through the
//! ABAP repository service.

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::config::{TYPE_NETWEAVER, TYPE_NETWEAVER_ODATA};
use crate::error::Result;
use crate::planner::CrudPlan;
use crate::reconciler::Reconciler;
use crate::transport::adt::AdtClient;
use crate::transport::build_archive;
use crate::transport::odata::{ODataClient, RepositoryState, build_payload};

use super::{DeployContext, DeployOutcome, Deployer};

/// Deploys through the ADT file store.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetWeaverAdtDeployer;

#[async_trait]
impl Deployer for NetWeaverAdtDeployer {
    fn name(&self) -> &'static str {
        TYPE_NETWEAVER
    }

    async fn deploy(&self, context: &DeployContext<'_>) -> Result<DeployOutcome> {
        let resources = context.workspace.list()?;
        let client = AdtClient::new(context.deployer())?;

        let mut reconciler = Reconciler::new(&client, client.root());
        let result = reconciler.reconcile(&resources).await?;

        client.calculate_app_index().await?;
        Ok(DeployOutcome::Synced(result))
    }
}

/// Computes what an ADT deploy would change, without changing anything.
///
/// # Errors
///
/// Returns an error if the workspace cannot be listed or the connection
/// or discovery fails.
pub async fn preview_adt(context: &DeployContext<'_>) -> Result<CrudPlan> {
    let resources = context.workspace.list()?;
    let client = AdtClient::new(context.deployer())?;

    Reconciler::new(&client, client.root()).preview(&resources).await
}

/// Deploys through the ABAP repository OData service.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetWeaverODataDeployer;

#[async_trait]
impl Deployer for NetWeaverODataDeployer {
    fn name(&self) -> &'static str {
        TYPE_NETWEAVER_ODATA
    }

    async fn deploy(&self, context: &DeployContext<'_>) -> Result<DeployOutcome> {
        let client = ODataClient::new(context.deployer())?;
        client.connect().await?;

        let resources = context.workspace.list()?;
        let archive = build_archive(&resources).await?;
        info!("Archive of {} files: {} bytes", resources.len(), archive.len());

        let payload = build_payload(client.base_url(), client.repository(), &archive, Utc::now());
        let state = client.repository_state().await?;
        client.upload(state, payload).await?;

        Ok(DeployOutcome::Uploaded {
            created: state == RepositoryState::Missing,
            files: resources.len(),
            archive_bytes: archive.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigParser, DeployConfig};
    use crate::planner::OperationKind;
    use crate::reconciler::SyncPhase;
    use crate::workspace::LocalWorkspace;
    use tempfile::TempDir;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED: &str = r#"<atom:feed xmlns:atom="http://www.w3.org/2005/Atom">
  <atom:entry>
    <atom:category term="file"/>
    <atom:id>ZAPP%2fold.js</atom:id>
  </atom:entry>
</atom:feed>"#;

    fn config(target_type: &str, url: &str) -> DeployConfig {
        let yaml = format!(
            r"
metadata:
  name: app
deployer:
  type: {target_type}
  connection:
    url: {url}
  credentials:
    username: DEV
    password: secret
  abapRepository:
    transportRequest: DEVK900001
    package: ZUI5
    bspApplication: ZAPP
    appIndexCalculate: true
    skipAdtValidations: true
"
        );
        ConfigParser::new().parse_yaml(&yaml, None).unwrap()
    }

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("dist")).unwrap();
        std::fs::write(temp.path().join("dist/index.html"), "<html/>").unwrap();
        temp
    }

    async fn mount_adt(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/sap/bc/adt/discovery"))
            .respond_with(ResponseTemplate::new(200).insert_header("x-csrf-token", "T"))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sap/bc/adt/filestore/ui5-bsp/objects/ZAPP"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sap/bc/adt/filestore/ui5-bsp/objects/ZAPP/content"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_adt_deploy_syncs_and_calculates_index() {
        let server = MockServer::start().await;
        mount_adt(&server).await;
        Mock::given(method("DELETE"))
            .and(path("/sap/bc/adt/filestore/ui5-bsp/objects/ZAPP%2Fold.js/content"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/sap/bc/adt/filestore/ui5-bsp/objects/ZAPP/content"))
            .and(query_param("type", "file"))
            .and(query_param("name", "index.html"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/sap/bc/adt/filestore/ui5-bsp/appindex/ZAPP"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let temp = project();
        let config = config("sap-netweaver", &server.uri());
        let workspace = LocalWorkspace::from_config(temp.path(), &config.deployer).unwrap();
        let context = DeployContext::new(&config, temp.path(), &workspace);

        let outcome = NetWeaverAdtDeployer.deploy(&context).await.unwrap();
        let DeployOutcome::Synced(result) = outcome else {
            panic!("expected a sync outcome");
        };
        assert_eq!(result.report.count(OperationKind::DeleteFile), 1);
        assert_eq!(result.report.count(OperationKind::CreateFile), 1);
    }

    #[tokio::test]
    async fn test_preview_does_not_write() {
        let server = MockServer::start().await;
        mount_adt(&server).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let temp = project();
        let config = config("sap-netweaver", &server.uri());
        let workspace = LocalWorkspace::from_config(temp.path(), &config.deployer).unwrap();
        let context = DeployContext::new(&config, temp.path(), &workspace);

        let plan = preview_adt(&context).await.unwrap();
        assert_eq!(plan.files.create, vec!["/index.html"]);
        assert_eq!(plan.files.delete, vec!["/old.js"]);
    }

    #[tokio::test]
    async fn test_adt_deploy_fails_before_sync_on_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sap/bc/adt/discovery"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let temp = project();
        let config = config("sap-netweaver", &server.uri());
        let workspace = LocalWorkspace::from_config(temp.path(), &config.deployer).unwrap();
        let context = DeployContext::new(&config, temp.path(), &workspace);

        let err = NetWeaverAdtDeployer.deploy(&context).await.unwrap_err();
        assert!(err.is_pre_sync());

        let client = AdtClient::new(&config.deployer).unwrap();
        let mut reconciler = Reconciler::new(&client, client.root());
        let resources = workspace.list().unwrap();
        assert!(reconciler.reconcile(&resources).await.is_err());
        assert_eq!(reconciler.phase(), SyncPhase::Failed);
    }

    #[tokio::test]
    async fn test_odata_deploy_creates_repository() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sap/opu/odata/UI5/ABAP_REPOSITORY_SRV/$metadata"))
            .respond_with(ResponseTemplate::new(200).insert_header("x-csrf-token", "T"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sap/opu/odata/UI5/ABAP_REPOSITORY_SRV/Repositories('ZAPP')"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/sap/opu/odata/UI5/ABAP_REPOSITORY_SRV/Repositories"))
            .and(query_param("TransportRequest", "DEVK900001"))
            .and(body_string_contains("<d:Package>ZUI5</d:Package>"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let temp = project();
        let config = config("sap-netweaver-odata", &server.uri());
        let workspace = LocalWorkspace::from_config(temp.path(), &config.deployer).unwrap();
        let context = DeployContext::new(&config, temp.path(), &workspace);

        let outcome = NetWeaverODataDeployer.deploy(&context).await.unwrap();
        match outcome {
            DeployOutcome::Uploaded {
                created,
                files,
                archive_bytes,
            } => {
                assert!(created);
                assert_eq!(files, 1);
                assert!(archive_bytes > 0);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
