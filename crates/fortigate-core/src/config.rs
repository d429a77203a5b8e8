//! Configuration structures for Fortigate provisioning.
//!
//! An [`ApplianceConfig`] says which appliance to talk to and how; a
//! [`ProvisioningRequest`] says what to provision on it. Both are validated
//! when constructed and never change afterwards.

use crate::types::{Location, PoolInput, DEFAULT_VDOM};
use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;
use validator::{Validate, ValidationError};

/// Connection parameters for one Fortigate appliance.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_token"))]
pub struct ApplianceConfig {
    /// Site the appliance belongs to
    location: Location,

    /// Management IP or hostname, without scheme
    #[validate(custom(function = "validate_host"))]
    host: String,

    /// REST API access token
    access_token: SecretString,

    /// Whether to verify the appliance TLS certificate
    #[serde(default = "default_tls_verify")]
    tls_verify: bool,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,

    /// Virtual domain for CMDB requests
    #[validate(length(min = 1))]
    #[serde(default = "default_vdom")]
    vdom: String,
}

const fn default_tls_verify() -> bool {
    true
}

const fn default_request_timeout_secs() -> u64 {
    30
}

fn default_vdom() -> String {
    DEFAULT_VDOM.to_string()
}

fn validate_host(host: &str) -> Result<(), ValidationError> {
    if host.trim().is_empty() || host.contains("://") || host.contains('/') {
        return Err(ValidationError::new("host"));
    }
    Ok(())
}

fn validate_token(config: &ApplianceConfig) -> Result<(), ValidationError> {
    if config.access_token.expose_secret().trim().is_empty() {
        return Err(ValidationError::new("access_token"));
    }
    Ok(())
}

impl ApplianceConfig {
    /// Create a new appliance configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the host or token is empty or malformed.
    pub fn new(
        location: Location,
        host: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, Error> {
        let config = Self {
            location,
            host: host.into(),
            access_token: SecretString::from(access_token.into()),
            tls_verify: default_tls_verify(),
            request_timeout_secs: default_request_timeout_secs(),
            vdom: default_vdom(),
        };

        config.validated()
    }

    fn validated(self) -> Result<Self, Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid appliance configuration: {e}")))?;
        Ok(self)
    }

    /// Set whether to verify TLS certificates.
    ///
    /// Appliances commonly ship self-signed certificates; turning this off
    /// must be an explicit choice.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set request timeout in seconds.
    ///
    /// # Errors
    ///
    /// Returns an error unless `seconds` is between 1 and 300.
    pub fn with_timeout(mut self, seconds: u64) -> Result<Self, Error> {
        self.request_timeout_secs = seconds;
        self.validated()
    }

    /// Set the virtual domain.
    ///
    /// # Errors
    ///
    /// Returns an error if `vdom` is empty.
    pub fn with_vdom(mut self, vdom: impl Into<String>) -> Result<Self, Error> {
        self.vdom = vdom.into();
        self.validated()
    }

    /// Site tag.
    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    /// Management host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// API access token.
    #[must_use]
    pub const fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    /// Whether TLS certificates are verified.
    #[must_use]
    pub const fn tls_verify(&self) -> bool {
        self.tls_verify
    }

    /// Request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Virtual domain.
    #[must_use]
    pub fn vdom(&self) -> &str {
        &self.vdom
    }

    /// HTTPS base URL of the management API.
    ///
    /// # Errors
    ///
    /// Returns an error if the host does not form a valid URL.
    pub fn base_url(&self) -> Result<Url, Error> {
        Url::parse(&format!("https://{}/", self.host))
            .map_err(|e| Error::ConfigError(format!("Invalid appliance host: {e}")))
    }
}

/// What to provision on the appliance for one service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct ProvisioningRequest {
    /// IP pools owned by the service
    #[validate(custom(function = "validate_pools"))]
    pools: PoolInput,

    /// Service identifier
    #[validate(length(min = 1))]
    service_id: String,

    /// Source interface for the SG policy
    #[serde(default)]
    src_interface: String,

    /// Destination interface for the SG policy
    #[serde(default)]
    dst_interface: String,

    /// VLAN of the service interface
    #[validate(range(min = 1, max = 4094))]
    #[serde(default)]
    vlan_id: Option<u16>,

    /// Free text stored with every object, usually the site address
    #[serde(default)]
    comment: String,
}

fn validate_pools(pools: &PoolInput) -> Result<(), ValidationError> {
    if pools.is_empty() {
        return Err(ValidationError::new("pools_empty"));
    }
    if pools
        .iter()
        .any(|entry| entry.name.trim().is_empty() || entry.subnet.trim().is_empty())
    {
        return Err(ValidationError::new("pool_entry"));
    }
    Ok(())
}

impl ProvisioningRequest {
    /// Create a provisioning request.
    ///
    /// # Errors
    ///
    /// Returns an error if no pool is given, a pool entry is blank, the
    /// service id is empty or the VLAN is out of range.
    pub fn new(
        pools: impl Into<PoolInput>,
        service_id: impl Into<String>,
        src_interface: impl Into<String>,
        dst_interface: impl Into<String>,
        vlan_id: Option<u16>,
        comment: impl Into<String>,
    ) -> Result<Self, Error> {
        let request = Self {
            pools: pools.into(),
            service_id: service_id.into(),
            src_interface: src_interface.into(),
            dst_interface: dst_interface.into(),
            vlan_id,
            comment: comment.into(),
        };

        request
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid provisioning request: {e}")))?;

        Ok(request)
    }

    /// IP pools.
    #[must_use]
    pub const fn pools(&self) -> &PoolInput {
        &self.pools
    }

    /// Service identifier.
    #[must_use]
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Source interface.
    #[must_use]
    pub fn src_interface(&self) -> &str {
        &self.src_interface
    }

    /// Destination interface.
    #[must_use]
    pub fn dst_interface(&self) -> &str {
        &self.dst_interface
    }

    /// VLAN id, if any.
    #[must_use]
    pub const fn vlan_id(&self) -> Option<u16> {
        self.vlan_id
    }

    /// Comment.
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }
}

/// A full provisioning job as loaded from disk.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProvisioningConfig {
    /// Target appliance
    #[validate(nested)]
    pub appliance: ApplianceConfig,

    /// Service to provision
    #[validate(nested)]
    pub request: ProvisioningRequest,
}

impl ProvisioningConfig {
    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::ConfigError(format!("Invalid provisioning file: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is invalid.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PoolEntry;

    fn appliance() -> ApplianceConfig {
        ApplianceConfig::new(Location::Colombia, "10.1.1.1", "token-123").unwrap()
    }

    fn request() -> ProvisioningRequest {
        ProvisioningRequest::new(
            PoolEntry::new("Service", "10.0.0.0/24"),
            "CL-0001",
            "port1",
            "port2",
            Some(120),
            "Calle 1 # 2-3",
        )
        .unwrap()
    }

    #[test]
    fn test_appliance_config_new() {
        let config = appliance();
        assert_eq!(config.location(), Location::Colombia);
        assert_eq!(config.host(), "10.1.1.1");
        assert_eq!(config.access_token().expose_secret(), "token-123");
        assert!(config.tls_verify());
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.vdom(), "root");
    }

    #[test]
    fn test_appliance_config_rejects_bad_host() {
        assert!(ApplianceConfig::new(Location::Ecuador, "", "t").is_err());
        assert!(ApplianceConfig::new(Location::Ecuador, "https://fw", "t").is_err());
        assert!(ApplianceConfig::new(Location::Ecuador, "fw/api", "t").is_err());
    }

    #[test]
    fn test_appliance_config_rejects_empty_token() {
        let result = ApplianceConfig::new(Location::Ecuador, "fw.example.com", "  ");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_appliance_config_builder() {
        let config = appliance()
            .with_tls_verify(false)
            .with_timeout(5)
            .unwrap()
            .with_vdom("customers")
            .unwrap();

        assert!(!config.tls_verify());
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.vdom(), "customers");
    }

    #[test]
    fn test_appliance_config_builder_keeps_ranges() {
        assert!(matches!(appliance().with_timeout(0), Err(Error::ConfigError(_))));
        assert!(appliance().with_timeout(301).is_err());
        assert!(appliance().with_timeout(300).is_ok());
        assert!(matches!(appliance().with_vdom(""), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_provisioning_config_rejects_empty_token() {
        let json = r#"{
            "appliance": {"location": "ecuador", "host": "fw", "access_token": " "},
            "request": {"pools": ["Service", "10.0.0.0/24"], "service_id": "EC-1"}
        }"#;
        assert!(matches!(
            ProvisioningConfig::from_json_str(json),
            Err(Error::ValidationError(_))
        ));
    }

    #[test]
    fn test_appliance_base_url() {
        let url = appliance().base_url().unwrap();
        assert_eq!(url.as_str(), "https://10.1.1.1/");

        let config = ApplianceConfig::new(Location::Panama, "fw.example.com:8443", "t").unwrap();
        let url = config.base_url().unwrap();
        assert_eq!(url.port(), Some(8443));
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", appliance());
        assert!(!rendered.contains("token-123"));
    }

    #[test]
    fn test_provisioning_request_accessors() {
        let request = request();
        assert_eq!(request.pools().len(), 1);
        assert_eq!(request.service_id(), "CL-0001");
        assert_eq!(request.src_interface(), "port1");
        assert_eq!(request.dst_interface(), "port2");
        assert_eq!(request.vlan_id(), Some(120));
        assert_eq!(request.comment(), "Calle 1 # 2-3");
    }

    #[test]
    fn test_provisioning_request_validation() {
        let empty_pools = ProvisioningRequest::new(Vec::new(), "CL-1", "a", "b", None, "");
        assert!(empty_pools.is_err());

        let blank_subnet =
            ProvisioningRequest::new(PoolEntry::new("Service", " "), "CL-1", "a", "b", None, "");
        assert!(blank_subnet.is_err());

        let no_service =
            ProvisioningRequest::new(PoolEntry::new("S", "10.0.0.0/24"), "", "a", "b", None, "");
        assert!(no_service.is_err());

        let bad_vlan = ProvisioningRequest::new(
            PoolEntry::new("S", "10.0.0.0/24"),
            "CL-1",
            "a",
            "b",
            Some(4095),
            "",
        );
        assert!(bad_vlan.is_err());
    }

    #[test]
    fn test_provisioning_config_from_json() {
        let json = r#"{
            "appliance": {
                "location": "guatemala",
                "host": "192.0.2.10",
                "access_token": "abc",
                "tls_verify": false
            },
            "request": {
                "pools": [["Service", "10.0.0.0/24"], ["Service", "10.0.1.0/24"]],
                "service_id": "GT-42",
                "src_interface": "port1",
                "dst_interface": "port2",
                "vlan_id": 42,
                "comment": "Zona 10"
            }
        }"#;

        let config = ProvisioningConfig::from_json_str(json).unwrap();
        assert_eq!(config.appliance.location(), Location::Guatemala);
        assert!(!config.appliance.tls_verify());
        assert_eq!(config.appliance.vdom(), "root");
        assert_eq!(config.request.pools().len(), 2);
        assert_eq!(config.request.vlan_id(), Some(42));
    }

    #[test]
    fn test_provisioning_config_validates_nested() {
        let json = r#"{
            "appliance": {"location": "ecuador", "host": "fw", "access_token": "abc",
                          "request_timeout_secs": 0},
            "request": {"pools": ["Service", "10.0.0.0/24"], "service_id": "EC-1"}
        }"#;
        assert!(matches!(
            ProvisioningConfig::from_json_str(json),
            Err(Error::ValidationError(_))
        ));
    }

    #[test]
    fn test_provisioning_config_from_file() {
        let path = std::env::temp_dir().join(format!(
            "fortigate-core-config-{}.json",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"{"appliance": {"location": "panama", "host": "fw", "access_token": "abc"},
                "request": {"pools": ["Service", "10.0.0.0/24"], "service_id": "PA-1"}}"#,
        )
        .unwrap();

        let config = ProvisioningConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.request.service_id(), "PA-1");
        assert!(config.request.vlan_id().is_none());

        let missing = ProvisioningConfig::from_json_file(path);
        assert!(matches!(missing, Err(Error::ConfigError(_))));
    }
}
