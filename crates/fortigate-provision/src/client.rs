//! Asynchronous Fortigate provisioning client.
//!
//! Every public operation issues its requests one after another and never
//! returns an error: transport and parse failures are logged and folded into
//! the returned outcome, so an operator can decide whether to run a step
//! again.

use crate::format::{PolicyFormat, PoolValidation};
use crate::models::{
    first_sg_policy, CmdbResponse, ConfigBackup, InterfaceField, InterfaceReport, NetworkObjects,
    PolicyEntry, PolicyReport, Provisioned, SgPlacement, SgPolicyOutcome,
};
use crate::objects::network_objects;
use crate::Result;
use chrono::Utc;
use fortigate_core::client::ClientConfig;
use fortigate_core::query::QueryParams;
use fortigate_core::types::SG_POLICY_PREFIX;
use fortigate_core::{check_status, ApplianceConfig, Error, ProvisioningRequest};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("fortigate-provision/", env!("CARGO_PKG_VERSION"));

const ADDRESS_PATH: &str = "api/v2/cmdb/firewall/address";
const INTERFACE_PATH: &str = "api/v2/cmdb/system/interface/";
const POLICY_PATH: &str = "api/v2/cmdb/firewall/policy/";
const BACKUP_PATH: &str = "api/v2/monitor/system/config/backup";

const POLICY_FIELDS: [&str; 3] = ["policyid", "name", "action"];
const INTERFACE_FIELDS: [&str; 4] = ["name", "vlanid", "ip", "alias"];

/// Interface names are capped at 15 characters by the appliance.
const INTERFACE_NAME_MAX: usize = 15;

/// Builder for [`FortigateClient`].
pub struct FortigateClientBuilder {
    appliance: ApplianceConfig,
    request: ProvisioningRequest,
    formatter: Arc<dyn PolicyFormat>,
    validation: Arc<dyn PoolValidation>,
    http_config: ClientConfig,
    base_url: Option<Url>,
}

impl FortigateClientBuilder {
    /// Create a builder for one appliance and one provisioning request.
    #[must_use]
    pub fn new(
        appliance: ApplianceConfig,
        request: ProvisioningRequest,
        formatter: Arc<dyn PolicyFormat>,
        validation: Arc<dyn PoolValidation>,
    ) -> Self {
        let http_config = ClientConfig::new().with_timeout(appliance.timeout());
        Self {
            appliance,
            request,
            formatter,
            validation,
            http_config,
            base_url: None,
        }
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Send requests to `base_url` instead of `https://{host}/`.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self> {
        let url = Url::parse(base_url.as_ref()).map_err(|err| {
            Error::ConfigError(format!(
                "Invalid Fortigate base URL `{}`: {err}",
                base_url.as_ref()
            ))
        })?;
        self.base_url = Some(url);
        Ok(self)
    }

    /// Build the client instance.
    pub fn build(self) -> Result<FortigateClient> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => self.appliance.base_url()?,
        };

        let mut builder = ClientBuilder::new()
            .timeout(self.http_config.timeout)
            .user_agent(USER_AGENT)
            .pool_idle_timeout(self.http_config.pool_idle_timeout)
            .pool_max_idle_per_host(self.http_config.pool_max_idle_per_host)
            .connect_timeout(self.http_config.connect_timeout);

        if !self.http_config.enable_compression {
            builder = builder.no_gzip();
        }

        if !self.appliance.tls_verify() {
            warn!(
                host = self.appliance.host(),
                "TLS verification disabled for Fortigate client"
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder.build().map_err(|err| {
            Error::ConfigError(format!("Failed to build Fortigate HTTP client: {err}"))
        })?;

        Ok(FortigateClient {
            http,
            base_url,
            appliance: self.appliance,
            request: self.request,
            formatter: self.formatter,
            validation: self.validation,
            log_requests: self.http_config.enable_logging,
        })
    }
}

/// Provisioning client bound to one appliance and one service request.
#[derive(Clone)]
pub struct FortigateClient {
    http: Client,
    base_url: Url,
    appliance: ApplianceConfig,
    request: ProvisioningRequest,
    formatter: Arc<dyn PolicyFormat>,
    validation: Arc<dyn PoolValidation>,
    log_requests: bool,
}

struct RawResponse {
    status: StatusCode,
    body: String,
}

impl FortigateClient {
    /// Construct a client with default HTTP settings.
    pub fn new(
        appliance: ApplianceConfig,
        request: ProvisioningRequest,
        formatter: Arc<dyn PolicyFormat>,
        validation: Arc<dyn PoolValidation>,
    ) -> Result<Self> {
        FortigateClientBuilder::new(appliance, request, formatter, validation).build()
    }

    /// Connection parameters.
    #[must_use]
    pub const fn appliance(&self) -> &ApplianceConfig {
        &self.appliance
    }

    /// What this client provisions.
    #[must_use]
    pub const fn request(&self) -> &ProvisioningRequest {
        &self.request
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Name of the SG policy for this request.
    #[must_use]
    pub fn sg_policy_name(&self) -> String {
        format!("{SG_POLICY_PREFIX}{}", self.request.service_id())
    }

    /// Create one address object per IP pool.
    ///
    /// The objects are returned whatever the appliance answered.
    pub async fn create_network_object(&self) -> NetworkObjects {
        let payload = match network_objects(self.request.pools()) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "could not format address objects");
                return NetworkObjects {
                    objects: Vec::new(),
                    outcome: Err(err),
                };
            }
        };

        let outcome = self
            .send(Method::POST, ADDRESS_PATH, QueryParams::new(), Some(payload.json))
            .await
            .map(|response| check_status(response.status.as_u16()));
        if let Err(err) = &outcome {
            warn!(error = %err, "address object request failed");
        }

        NetworkObjects {
            objects: payload.objects,
            outcome,
        }
    }

    /// Create the service interface; on refusal, report what clashes.
    pub async fn create_network_interface(&self) -> Provisioned<InterfaceReport> {
        let payload = self.formatter.interface_payload(
            self.request.service_id(),
            self.request.pools(),
            self.request.vlan_id(),
            self.request.comment(),
        );

        match self
            .send(
                Method::POST,
                INTERFACE_PATH,
                QueryParams::new(),
                Some(payload.to_string()),
            )
            .await
        {
            Ok(response) => {
                let status = check_status(response.status.as_u16());
                if status.is_success() {
                    Provisioned::Created
                } else {
                    Provisioned::Rejected {
                        status,
                        existing: self.find_existing_interface_info().await,
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "interface request failed");
                Provisioned::Unreachable(err)
            }
        }
    }

    /// Create the address objects and the SG policy, then move the policy
    /// after the first existing SG policy.
    pub async fn create_sg_policy(&self) -> SgPolicyOutcome {
        let objects = self.create_network_object().await;
        let payload = self.formatter.sg_policy_payload(
            self.request.service_id(),
            &objects.objects,
            self.request.src_interface(),
            self.request.dst_interface(),
        );

        let params = QueryParams::new().vdom(self.appliance.vdom());
        let placement = match self
            .send(Method::POST, POLICY_PATH, params, Some(payload.to_string()))
            .await
        {
            Ok(response) => {
                let status = check_status(response.status.as_u16());
                if status.is_success() {
                    self.place_sg_policy().await
                } else {
                    warn!(policy = %self.sg_policy_name(), "policy could not be configured, check the appliance");
                    SgPlacement::Rejected(status)
                }
            }
            Err(err) => {
                warn!(error = %err, "policy could not be configured, check the appliance");
                SgPlacement::Unreachable(err)
            }
        };

        SgPolicyOutcome { objects, placement }
    }

    async fn place_sg_policy(&self) -> SgPlacement {
        let policy_id = self.get_specific_id(&self.sg_policy_name()).await;
        let reference = self.move_policy().await;

        match (policy_id, reference) {
            (Some(policy_id), Some(after)) if policy_id != after => {
                let params = QueryParams::new()
                    .vdom(self.appliance.vdom())
                    .push("action", "move")
                    .push("after", after);
                match self
                    .send(Method::PUT, &policy_record_path(policy_id), params, None)
                    .await
                {
                    Ok(response) => SgPlacement::Moved {
                        policy_id,
                        after,
                        status: check_status(response.status.as_u16()),
                    },
                    Err(error) => {
                        warn!(policy_id, after, %error, "policy move failed");
                        SgPlacement::MoveUnreachable {
                            policy_id,
                            after,
                            error,
                        }
                    }
                }
            }
            (policy_id, reference) => {
                warn!(?policy_id, ?reference, "policy left in its current position");
                SgPlacement::Unplaced {
                    policy_id,
                    reference,
                }
            }
        }
    }

    /// Create the RNI policy; on refusal, report the existing one.
    pub async fn create_rni_policy(&self) -> Provisioned<PolicyReport> {
        let payload = self
            .formatter
            .rni_policy_payload(self.request.service_id());
        let params = QueryParams::new().vdom(self.appliance.vdom());

        match self
            .send(Method::POST, POLICY_PATH, params, Some(payload.to_string()))
            .await
        {
            Ok(response) => {
                let status = check_status(response.status.as_u16());
                if status.is_success() {
                    Provisioned::Created
                } else {
                    Provisioned::Rejected {
                        status,
                        existing: self.find_existing_policy_info().await,
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "RNI policy request failed");
                Provisioned::Unreachable(err)
            }
        }
    }

    /// Download the global configuration backup.
    pub async fn get_file_config(&self) -> Option<ConfigBackup> {
        let params = QueryParams::new().push("scope", "global");
        match self.send(Method::GET, BACKUP_PATH, params, None).await {
            Ok(response) if response.status == StatusCode::OK => Some(ConfigBackup {
                location: self.appliance.location(),
                host: self.appliance.host().to_string(),
                fetched_at: Utc::now(),
                body: response.body,
            }),
            Ok(response) => {
                warn!(
                    status = response.status.as_u16(),
                    "configuration backup not returned"
                );
                None
            }
            Err(err) => {
                warn!(error = %err, "configuration backup request failed");
                None
            }
        }
    }

    /// Id of the first SG policy among the policies named `name`.
    pub async fn get_specific_id(&self, name: &str) -> Option<u64> {
        let params = QueryParams::new()
            .filter("name", name)
            .vdom(self.appliance.vdom())
            .format(&POLICY_FIELDS);
        let policies = self.list_policies(params).await?;
        self.search_first_sg_policy(&policies).await
    }

    /// Id of the first SG policy on the appliance, the anchor new SG
    /// policies are moved after.
    pub async fn move_policy(&self) -> Option<u64> {
        let params = QueryParams::new()
            .vdom(self.appliance.vdom())
            .format(&POLICY_FIELDS);
        let policies = self.list_policies(params).await?;
        self.search_first_sg_policy(&policies).await
    }

    /// Id of the first policy in `policies` whose name starts with
    /// `sg-demo-`. The matching policy's record is fetched once before
    /// returning.
    pub async fn search_first_sg_policy(&self, policies: &[PolicyEntry]) -> Option<u64> {
        let policy = first_sg_policy(policies)?;
        let params = QueryParams::new().vdom(self.appliance.vdom());
        if let Err(err) = self
            .send(Method::GET, &policy_record_path(policy.policyid), params, None)
            .await
        {
            debug!(policy_id = policy.policyid, error = %err, "policy record fetch failed");
        }
        Some(policy.policyid)
    }

    /// Probe which attributes of the requested interface already exist.
    ///
    /// A lookup with exactly one match records the appliance's value; a
    /// lookup for an attribute we have no value for records the pools under
    /// `wrong`. Other outcomes record nothing.
    pub async fn find_existing_interface_info(&self) -> InterfaceReport {
        let mut report = InterfaceReport::default();

        for field in InterfaceField::ALL {
            let value = self.interface_lookup_value(field);
            let params = QueryParams::new()
                .filter(field.key(), &value)
                .vdom(self.appliance.vdom())
                .format(&INTERFACE_FIELDS);

            match self
                .get_json::<CmdbResponse<Map<String, Value>>>(INTERFACE_PATH, params)
                .await
            {
                Ok(response) if response.results.len() == 1 => {
                    let found = response
                        .results
                        .first()
                        .and_then(|entry| entry.get(field.key()))
                        .map(render_value)
                        .unwrap_or_default();
                    report.existing.insert(field, found);
                }
                Ok(_) if value.trim().is_empty() => {
                    report.wrong.insert(field, self.request.pools().clone());
                }
                Ok(response) => {
                    debug!(
                        %field,
                        matches = response.results.len(),
                        "interface lookup inconclusive"
                    );
                }
                Err(err) => {
                    warn!(%field, error = %err, "interface lookup failed");
                }
            }
        }

        report
    }

    fn interface_lookup_value(&self, field: InterfaceField) -> String {
        let service_id = self.request.service_id();
        match field {
            InterfaceField::Name => service_id.chars().take(INTERFACE_NAME_MAX).collect(),
            InterfaceField::VlanId => self
                .request
                .vlan_id()
                .map(|vlan| vlan.to_string())
                .unwrap_or_default(),
            InterfaceField::Ip => self
                .validation
                .pool_netmask(self.request.pools())
                .unwrap_or_default(),
            InterfaceField::Alias => service_id.to_string(),
        }
    }

    /// Raw listing of every interface with its name, VLAN, address and alias.
    pub async fn find_existing_interface(&self) -> Option<String> {
        let params = QueryParams::new()
            .vdom(self.appliance.vdom())
            .format(&INTERFACE_FIELDS);
        match self.send(Method::GET, INTERFACE_PATH, params, None).await {
            Ok(response) => {
                if response.status != StatusCode::OK {
                    warn!(status = response.status.as_u16(), "interface listing failed");
                }
                Some(response.body)
            }
            Err(err) => {
                warn!(error = %err, "interface listing request failed");
                None
            }
        }
    }

    /// Look up the policy named after the service id.
    pub async fn find_existing_policy_info(&self) -> PolicyReport {
        let params = QueryParams::new()
            .filter("name", self.request.service_id())
            .vdom(self.appliance.vdom())
            .format(&POLICY_FIELDS);

        let response = match self.send(Method::GET, POLICY_PATH, params, None).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "policy lookup failed");
                return PolicyReport::default();
            }
        };

        match serde_json::from_str::<CmdbResponse<PolicyEntry>>(&response.body) {
            Ok(parsed) if parsed.results.len() == 1 => PolicyReport {
                name: parsed.results.into_iter().next().map(|policy| policy.name),
            },
            Ok(_) => PolicyReport::default(),
            Err(_) => {
                check_status(response.status.as_u16());
                PolicyReport::default()
            }
        }
    }

    /// Connectivity probe: fetch the policy list and log the raw body.
    pub async fn test_api(&self) -> Option<String> {
        let params = QueryParams::new().vdom(self.appliance.vdom());
        match self.send(Method::GET, POLICY_PATH, params, None).await {
            Ok(response) => {
                info!(status = response.status.as_u16(), body = %response.body, "API probe");
                Some(response.body)
            }
            Err(err) => {
                warn!(error = %err, "API probe failed");
                None
            }
        }
    }

    async fn list_policies(&self, params: QueryParams) -> Option<Vec<PolicyEntry>> {
        match self
            .get_json::<CmdbResponse<PolicyEntry>>(POLICY_PATH, params)
            .await
        {
            Ok(response) => Some(response.results),
            Err(err) => {
                warn!(error = %err, "policy listing failed");
                None
            }
        }
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        let normalized = path.strip_prefix('/').unwrap_or(path);
        self.base_url.join(normalized).map_err(|err| {
            Error::InvalidEndpoint(format!("Invalid Fortigate path `{path}`: {err}"))
        })
    }

    async fn get_json<T>(&self, path: &str, params: QueryParams) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(Method::GET, path, params, None).await?;
        serde_json::from_str(&response.body).map_err(|err| {
            Error::ParseError(format!(
                "Failed to parse Fortigate response for `{path}` ({}): {err}",
                response.status
            ))
        })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        params: QueryParams,
        body: Option<String>,
    ) -> Result<RawResponse> {
        let url = self.build_url(path)?;
        let token = self.appliance.access_token().expose_secret().to_string();
        let query = params.push("access_token", token).into_pairs();

        let mut request = self
            .http
            .request(method.clone(), url)
            .query(&query)
            .header(ACCEPT, "application/json");
        if let Some(payload) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(payload);
        }

        if self.log_requests {
            info!(%method, path, "Fortigate request");
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await.map_err(|err| {
            Error::HttpError(format!(
                "Failed to read Fortigate response body: {}",
                err.without_url()
            ))
        })?;

        Ok(RawResponse { status, body })
    }
}

fn policy_record_path(policy_id: u64) -> String {
    format!("{POLICY_PATH}{policy_id}")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
