//! Export of the GML dictionary from the online EPSG registry.
//!
//! The registry speaks CSW-ebRIM. Getting the dictionary takes three
//! requests:
//! 1. `GetRecords` for the newest approved version-history record, whose
//!    `ExtrinsicObject/@id` names the current dataset version;
//! 2. `GetRecords` for the GML release associated with that version, whose
//!    `repositoryItemRef/@xlink:href` points at the export archive;
//! 3. a plain GET of that archive, a ZIP holding `GmlDictionary.xml`.
//!
//! Request bodies and response parsing are pure functions so they can be
//! tested without a network.

use std::fs;
use std::io::{Cursor, Read};

use reqwest::blocking::Client;
use reqwest::Url;
use roxmltree::Document;

use crate::config::{ServiceConfig, Source};
use crate::error::{EpsgError, Result};
use crate::http::{bytes_to_string, create_client, download_bytes, post_xml};
use crate::xml::{get_attribute, has_tag};

const GET_RECORDS_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GetRecords
    xmlns="http://www.opengis.net/cat/csw/2.0.2"
    xmlns:ogc="http://www.opengis.net/ogc"
    xmlns:rim="urn:oasis:names:tc:ebxml-regrep:xsd:rim:3.0"
    xmlns:wrs="http://www.opengis.net/cat/wrs/1.0"
    startPosition="1"
    maxRecords="{max_records}"
    outputFormat="application/xml; charset=UTF-8"
    resultType="results"
    service="CSW-ebRIM"
    version="2.0.2">
"#;

const VERSION_QUERY: &str = r#"  <Query typeNames="wrs:ExtrinsicObject_eo rim:Slot_versionDate">
    <ElementSetName typeNames="eo">full</ElementSetName>
    <Constraint version="1.1.0">
      <ogc:Filter>
        <ogc:And>
          <ogc:PropertyIsLike wildCard="*" escapeChar="/" singleChar="?">
            <ogc:PropertyName>$eo/@id</ogc:PropertyName>
            <ogc:Literal>*:EPSG::*</ogc:Literal>
          </ogc:PropertyIsLike>
          <ogc:PropertyIsEqualTo>
            <ogc:PropertyName>$eo/@objectType</ogc:PropertyName>
            <ogc:Literal>urn:x-ogp:def:ObjectType:EPSG:version-history</ogc:Literal>
          </ogc:PropertyIsEqualTo>
          <ogc:PropertyIsEqualTo>
            <ogc:PropertyName>$eo/@status</ogc:PropertyName>
            <ogc:Literal>urn:oasis:names:tc:ebxml-regrep:StatusType:Approved</ogc:Literal>
          </ogc:PropertyIsEqualTo>
          <ogc:PropertyIsEqualTo>
            <ogc:PropertyName>$eo/$versionDate/@name</ogc:PropertyName>
            <ogc:Literal>VersionDate</ogc:Literal>
          </ogc:PropertyIsEqualTo>
        </ogc:And>
      </ogc:Filter>
    </Constraint>
    <ogc:SortBy>
      <ogc:SortProperty>
        <ogc:PropertyName>$eo/$versionDate/ValueList/Value</ogc:PropertyName>
        <ogc:SortOrder>DESC</ogc:SortOrder>
      </ogc:SortProperty>
    </ogc:SortBy>
  </Query>
</GetRecords>
"#;

const EXPORT_QUERY: &str = r#"  <Query typeNames="rim:Association_a rim:RegistryObject_release rim:Slot_format">
    <ElementSetName typeNames="release">full</ElementSetName>
    <Constraint version="1.1.0">
      <ogc:Filter>
        <ogc:And>
          <ogc:PropertyIsEqualTo>
            <ogc:PropertyName>$a/targetObject</ogc:PropertyName>
            <ogc:Literal>{version}</ogc:Literal>
          </ogc:PropertyIsEqualTo>
          <ogc:PropertyIsEqualTo>
            <ogc:PropertyName>$a/associationType</ogc:PropertyName>
            <ogc:Literal>urn:x-ogp:def:AssociationType:EPSG:ReleaseFor</ogc:Literal>
          </ogc:PropertyIsEqualTo>
          <ogc:PropertyIsEqualTo>
            <ogc:PropertyName>$release/$format/@name</ogc:PropertyName>
            <ogc:Literal>Format</ogc:Literal>
          </ogc:PropertyIsEqualTo>
          <ogc:PropertyIsEqualTo>
            <ogc:PropertyName>$release/$format/ValueList/Value</ogc:PropertyName>
            <ogc:Literal>GML</ogc:Literal>
          </ogc:PropertyIsEqualTo>
          <ogc:PropertyIsEqualTo>
            <ogc:PropertyName>$a/sourceObject</ogc:PropertyName>
            <ogc:PropertyName>$release/id</ogc:PropertyName>
          </ogc:PropertyIsEqualTo>
        </ogc:And>
      </ogc:Filter>
    </Constraint>
  </Query>
</GetRecords>
"#;

/// `GetRecords` body asking for the newest version-history record.
#[must_use]
pub fn version_query() -> String {
    let mut body = GET_RECORDS_OPEN.replace("{max_records}", "1");
    body.push_str(VERSION_QUERY);
    body
}

/// `GetRecords` body asking for the GML release of `version`.
#[must_use]
pub fn export_query(version: &str) -> String {
    let mut body = GET_RECORDS_OPEN.replace("{max_records}", "100");
    body.push_str(&EXPORT_QUERY.replace("{version}", &escape_xml(version)));
    body
}

/// Read the dataset version id from a version-history response.
///
/// # Errors
/// `XmlParse` for malformed XML, `ServiceResponse` if the response holds
/// no `ExtrinsicObject` with an `id`.
pub fn parse_latest_version(response: &str) -> Result<String> {
    first_attribute(response, "ExtrinsicObject", "id")
}

/// Read the export archive location from a release response.
///
/// # Errors
/// `XmlParse` for malformed XML, `ServiceResponse` if the response holds
/// no `repositoryItemRef` with an `xlink:href`.
pub fn parse_export_url(response: &str) -> Result<String> {
    first_attribute(response, "repositoryItemRef", "xlink:href")
}

fn first_attribute(response: &str, tag: &str, attribute: &str) -> Result<String> {
    let doc = Document::parse(response)?;
    doc.descendants()
        .filter(|node| has_tag(*node, tag))
        .find_map(|node| get_attribute(node, attribute))
        .map(str::to_string)
        .ok_or_else(|| EpsgError::ServiceResponse(format!("no {tag} with attribute {attribute}")))
}

/// Pull the GML dictionary named `name` out of a ZIP export.
///
/// At most `max_bytes` of uncompressed data are read.
///
/// # Errors
/// `Archive` if `archive` is not a readable ZIP, `MissingExportFile` if it
/// has no entry called `name`, `ExportTooLarge` if the entry unpacks to more
/// than `max_bytes`.
pub fn extract_gml(archive: &[u8], name: &str, max_bytes: u64) -> Result<String> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;
    let mut file = match zip.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(EpsgError::MissingExportFile(name.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let too_large = || EpsgError::ExportTooLarge {
        name: name.to_string(),
        max_bytes,
    };
    if file.size() > max_bytes {
        return Err(too_large());
    }

    // the declared size comes from the archive itself
    let mut bytes = Vec::new();
    file.by_ref().take(max_bytes.saturating_add(1)).read_to_end(&mut bytes)?;
    if bytes.len() as u64 > max_bytes {
        return Err(too_large());
    }
    Ok(bytes_to_string(&bytes))
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Client for the online EPSG registry.
pub struct RegistryService {
    client: Client,
    config: ServiceConfig,
}

impl RegistryService {
    /// Create a service client.
    ///
    /// # Errors
    /// `Http` if the HTTP client cannot be built.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let client = create_client(config.timeout_secs)?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Id of the current dataset version.
    pub fn latest_version(&self) -> Result<String> {
        let response = self.query(&version_query())?;
        let version = parse_latest_version(&response)?;
        tracing::debug!(version = %version, "Latest registry version");
        Ok(version)
    }

    /// Absolute URL of the GML export archive for `version`.
    ///
    /// Relative locations are resolved against the query endpoint.
    pub fn export_url(&self, version: &str) -> Result<String> {
        let response = self.query(&export_query(version))?;
        let location = parse_export_url(&response)?;

        let base = Url::parse(&self.config.endpoint).map_err(|e| {
            EpsgError::ServiceResponse(format!("invalid endpoint {}: {e}", self.config.endpoint))
        })?;
        let url = base.join(&location).map_err(|e| {
            EpsgError::ServiceResponse(format!("invalid export location {location}: {e}"))
        })?;
        Ok(url.to_string())
    }

    /// Download the current export and return the GML dictionary text.
    pub fn export(&self) -> Result<String> {
        let version = self.latest_version()?;
        let url = self.export_url(&version)?;

        tracing::info!(version = %version, url = %url, "Downloading registry export");
        let archive = download_bytes(&self.client, &url, self.config.max_response_size)?;
        extract_gml(
            &archive,
            &self.config.export_name,
            self.config.max_response_size,
        )
    }

    fn query(&self, body: &str) -> Result<String> {
        let bytes = post_xml(
            &self.client,
            &self.config.endpoint,
            body,
            self.config.max_response_size,
        )?;
        Ok(bytes_to_string(&bytes))
    }
}

/// Obtain the GML dictionary text from `source`.
pub fn fetch_gml(source: &Source) -> Result<String> {
    match source {
        Source::File(path) => Ok(fs::read_to_string(path)?),
        Source::Gml(text) => Ok(text.clone()),
        Source::Remote(config) => RegistryService::new(config.clone())?.export(),
    }
}
