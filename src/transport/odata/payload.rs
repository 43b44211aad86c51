//! Atom entry payload for the repository service.

use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;

use crate::config::AbapRepositoryConfig;

use super::client::ODATA_PATH;

/// Builds the `Repository` entry carrying a zipped application.
///
/// `base_url` is the connection URL of the system. Text fields are XML
/// escaped; the archive is embedded as base64.
#[must_use]
pub fn build_payload(
    base_url: &str,
    repository: &AbapRepositoryConfig,
    archive: &[u8],
    updated: DateTime<Utc>,
) -> String {
    let service = format!("{}/{ODATA_PATH}", base_url.trim_end_matches('/'));
    let name = escape(repository.bsp_application.as_str());
    let package = repository.package.to_uppercase();
    let package = escape(package.as_str());
    let description = escape(repository.bsp_application_text.as_str());
    let service = escape(service.as_str());
    let zip = base64::engine::general_purpose::STANDARD.encode(archive);

    [
        String::from("<entry xmlns=\"http://www.w3.org/2005/Atom\""),
        String::from("xmlns:m=\"http://schemas.microsoft.com/ado/2007/08/dataservices/metadata\""),
        String::from("xmlns:d=\"http://schemas.microsoft.com/ado/2007/08/dataservices\""),
        format!("xml:base=\"{service}\">"),
        format!("<id>{service}/Repositories('{name}')</id>"),
        format!("<title type=\"text\">Repositories('{name}')</title>"),
        format!(
            "<updated>{}</updated>",
            updated.to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
        String::from(
            "<category term=\"/UI5/ABAP_REPOSITORY_SRV.Repository\" scheme=\"http://schemas.microsoft.com/ado/2007/08/dataservices/scheme\"/>",
        ),
        format!("<link href=\"Repositories('{name}')\" rel=\"edit\" title=\"Repository\"/>"),
        String::from("<content type=\"application/xml\">"),
        String::from("<m:properties>"),
        format!("<d:Name>{name}</d:Name>"),
        format!("<d:Package>{package}</d:Package>"),
        format!("<d:Description>{description}</d:Description>"),
        format!("<d:ZipArchive>{zip}</d:ZipArchive>"),
        String::from("<d:Info/>"),
        String::from("</m:properties>"),
        String::from("</content>"),
        String::from("</entry>"),
    ]
    .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_payload_fields() {
        let repository = AbapRepositoryConfig {
            package: String::from("zui5"),
            bsp_application: String::from("ZAPP"),
            bsp_application_text: String::from("Sales & <Returns>"),
            ..AbapRepositoryConfig::default()
        };
        let updated = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let payload = build_payload("https://abap.example.com/", &repository, b"PK", updated);

        assert!(payload.starts_with("<entry xmlns=\"http://www.w3.org/2005/Atom\""));
        assert!(payload.contains(
            "xml:base=\"https://abap.example.com/sap/opu/odata/UI5/ABAP_REPOSITORY_SRV\">"
        ));
        assert!(payload.contains("<id>https://abap.example.com/sap/opu/odata/UI5/ABAP_REPOSITORY_SRV/Repositories('ZAPP')</id>"));
        assert!(payload.contains("<updated>2024-05-01T12:00:00.000Z</updated>"));
        assert!(payload.contains("<d:Package>ZUI5</d:Package>"));
        assert!(payload.contains("<d:Description>Sales &amp; &lt;Returns&gt;</d:Description>"));
        assert!(payload.contains("<d:ZipArchive>UEs=</d:ZipArchive>"));
        assert!(payload.ends_with("</entry>"));
    }
}
