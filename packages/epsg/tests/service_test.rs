//! Registry service tests against a mock CSW endpoint.

use std::io::{Cursor, Write};
use std::path::Path;

use epsg_registry::service::RegistryService;
use epsg_registry::{EpsgError, Registry, ServiceConfig, Source, StoreConfig};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VERSION: &str = "urn:x-ogp:def:version-history:EPSG::8.5";

fn minimal_gml() -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("minimal.xml");
    std::fs::read_to_string(path).unwrap()
}

fn zip_with(name: &str, content: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(name, zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(content.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

fn version_response() -> String {
    format!(
        r#"<csw:GetRecordsResponse
            xmlns:csw="http://www.opengis.net/cat/csw/2.0.2"
            xmlns:wrs="http://www.opengis.net/cat/wrs/1.0">
          <csw:SearchResults>
            <wrs:ExtrinsicObject id="{VERSION}"/>
          </csw:SearchResults>
        </csw:GetRecordsResponse>"#
    )
}

fn release_response(href: &str) -> String {
    format!(
        r#"<csw:GetRecordsResponse
            xmlns:csw="http://www.opengis.net/cat/csw/2.0.2"
            xmlns:wrs="http://www.opengis.net/cat/wrs/1.0"
            xmlns:xlink="http://www.w3.org/1999/xlink">
          <csw:SearchResults>
            <wrs:ExtrinsicObject id="urn:x-ogp:def:release:EPSG::8.5-gml">
              <wrs:repositoryItemRef xlink:href="{href}"/>
            </wrs:ExtrinsicObject>
          </csw:SearchResults>
        </csw:GetRecordsResponse>"#
    )
}

/// Mount the two CSW queries; the export archive is mounted per test.
///
/// The release query names the version URN, which itself contains
/// "version-history", so the version query is matched on its object type.
async fn mount_queries(server: &MockServer, href: &str) {
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("ObjectType:EPSG:version-history"))
        .respond_with(ResponseTemplate::new(200).set_body_string(version_response()))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("ReleaseFor"))
        .and(body_string_contains(VERSION))
        .respond_with(ResponseTemplate::new(200).set_body_string(release_response(href)))
        .mount(server)
        .await;
}

async fn mount_archive(server: &MockServer, archive: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path("/export/gml.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .mount(server)
        .await;
}

fn service_config(server: &MockServer) -> ServiceConfig {
    ServiceConfig::new(format!("{}/query", server.uri()))
}

/// Run a blocking registry call off the async runtime.
async fn blocking<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    tokio::task::spawn_blocking(f).await.unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_export_downloads_dictionary() {
    let server = MockServer::start().await;
    let gml = minimal_gml();
    mount_queries(&server, &format!("{}/export/gml.zip", server.uri())).await;
    mount_archive(&server, zip_with("GmlDictionary.xml", &gml)).await;

    let config = service_config(&server);
    let exported = blocking(move || RegistryService::new(config)?.export())
        .await
        .unwrap();
    assert_eq!(exported, gml);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_relative_export_location() {
    let server = MockServer::start().await;
    mount_queries(&server, "export/gml.zip").await;

    let config = service_config(&server);
    let expected = format!("{}/export/gml.zip", server.uri());
    let url = blocking(move || {
        let service = RegistryService::new(config)?;
        let version = service.latest_version()?;
        service.export_url(&version)
    })
    .await
    .unwrap();
    assert_eq!(url, expected);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bulk_load_from_remote_source() {
    let server = MockServer::start().await;
    mount_queries(&server, &format!("{}/export/gml.zip", server.uri())).await;
    mount_archive(&server, zip_with("GmlDictionary.xml", &minimal_gml())).await;

    let source = Source::Remote(service_config(&server));
    let registry = blocking(move || {
        let mut registry = Registry::open(&StoreConfig::InMemory)?;
        registry.bulk_load(&source)?;
        Ok::<_, EpsgError>(registry)
    })
    .await
    .unwrap();

    assert_eq!(registry.count().unwrap(), 2);
    assert_eq!(
        registry
            .get("urn:ogc:def:meridian:EPSG::8901")
            .unwrap()
            .name(),
        Some("Greenwich")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_archive_without_dictionary() {
    let server = MockServer::start().await;
    mount_queries(&server, &format!("{}/export/gml.zip", server.uri())).await;
    mount_archive(&server, zip_with("README.txt", "moved")).await;

    let config = service_config(&server);
    let err = blocking(move || RegistryService::new(config)?.export())
        .await
        .unwrap_err();
    assert!(matches!(err, EpsgError::MissingExportFile(name) if name == "GmlDictionary.xml"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_archive_is_http_error() {
    let server = MockServer::start().await;
    mount_queries(&server, &format!("{}/export/gml.zip", server.uri())).await;
    Mock::given(method("GET"))
        .and(path("/export/gml.zip"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = service_config(&server);
    let err = blocking(move || RegistryService::new(config)?.export())
        .await
        .unwrap_err();
    assert!(matches!(err, EpsgError::Http(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_oversized_response_is_refused() {
    let server = MockServer::start().await;
    mount_queries(&server, &format!("{}/export/gml.zip", server.uri())).await;

    let mut config = service_config(&server);
    config.max_response_size = 16;
    let err = blocking(move || RegistryService::new(config)?.latest_version())
        .await
        .unwrap_err();
    assert!(matches!(err, EpsgError::ResponseTooLarge { max_bytes: 16, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let config = service_config(&server);
    let err = blocking(move || RegistryService::new(config)?.latest_version())
        .await
        .unwrap_err();
    assert!(matches!(err, EpsgError::RetriesExhausted { attempts: 3, .. }));
}
