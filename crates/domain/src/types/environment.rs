//! Ephemeral environment types
//!
//! Covers the request side (`CreateEnvironmentParams`), the remote row
//! projection (`EnvironmentRecord`) and what callers get back once an
//! environment is usable (`ProvisionedEnvironment`).

use std::net::Ipv4Addr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DURATION_DAYS, MAX_DURATION_DAYS};
use crate::errors::ForceError;
use crate::impl_remote_enum_conversions;
use crate::types::query::Record;

/// Lifecycle status of an environment as reported by the remote side.
///
/// Transitions are monotonic: `Provisioning` ends in `Active` or `Error`,
/// and only `Active` moves on to `Deleted`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvironmentStatus {
    #[default]
    Provisioning,
    Active,
    Error,
    Deleted,
}

impl EnvironmentStatus {
    /// Map a remote status value. Anything not yet terminal (`New`, `Creating`,
    /// unknown values) counts as still provisioning.
    pub fn from_remote(value: &str) -> Self {
        match value {
            "Active" => Self::Active,
            "Error" => Self::Error,
            "Deleted" | "Deleting" => Self::Deleted,
            _ => Self::Provisioning,
        }
    }

    /// Whether the remote side may move an environment from `self` to `next`.
    /// Observing the same status twice is always allowed.
    pub fn can_transition_to(&self, next: EnvironmentStatus) -> bool {
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Self::Provisioning, Self::Active)
                | (Self::Provisioning, Self::Error)
                | (Self::Active, Self::Deleted)
        )
    }
}

/// Edition of the environment to create
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edition {
    #[default]
    Developer,
    Enterprise,
    Group,
    Professional,
    PartnerDeveloper,
    PartnerEnterprise,
}

impl_remote_enum_conversions!(Edition {
    Developer => "Developer",
    Enterprise => "Enterprise",
    Group => "Group",
    Professional => "Professional",
    PartnerDeveloper => "Partner Developer",
    PartnerEnterprise => "Partner Enterprise",
});

/// Release channel relative to the current platform release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Release {
    Preview,
    Previous,
}

impl_remote_enum_conversions!(Release {
    Preview => "Preview",
    Previous => "Previous",
});

/// Trusted IP range written into the network access settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRange {
    pub description: String,
    pub start: Ipv4Addr,
    pub end: Ipv4Addr,
}

impl IpRange {
    pub fn new(description: impl Into<String>, start: Ipv4Addr, end: Ipv4Addr) -> Self {
        Self { description: description.into(), start, end }
    }

    /// Ranges covering the whole IPv4 space so logins never hit a
    /// verification challenge. Ordered from `allips254` down to `allips0`.
    pub fn full_sweep() -> Vec<IpRange> {
        (0..=254u8)
            .rev()
            .map(|i| {
                IpRange::new(
                    format!("allips{i}"),
                    Ipv4Addr::new(i, 0, 0, 0),
                    Ipv4Addr::new(i + 1, 255, 255, 255),
                )
            })
            .collect()
    }
}

/// Settings applied to a freshly provisioned environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSettings {
    pub enable_audit_fields_inactive_owner: bool,
    pub ip_ranges: Vec<IpRange>,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self { enable_audit_fields_inactive_owner: false, ip_ranges: IpRange::full_sweep() }
    }
}

/// Parameters for creating an environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnvironmentParams {
    pub namespace: Option<String>,
    pub name: String,
    pub username: String,
    pub admin_email: String,
    pub features: Vec<String>,
    pub phone: String,
    pub country_name: String,
    pub country_code: String,
    pub description: String,
    pub edition: Edition,
    pub release: Option<Release>,
    pub duration_days: u8,
    pub settings: EnvironmentSettings,
}

impl Default for CreateEnvironmentParams {
    fn default() -> Self {
        Self {
            namespace: None,
            name: String::new(),
            username: String::new(),
            admin_email: String::new(),
            features: Vec::new(),
            phone: String::new(),
            country_name: String::new(),
            country_code: String::new(),
            description: String::new(),
            edition: Edition::Developer,
            release: None,
            duration_days: DEFAULT_DURATION_DAYS,
            settings: EnvironmentSettings::default(),
        }
    }
}

impl CreateEnvironmentParams {
    pub fn new(name: impl Into<String>, username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            name: name.into(),
            admin_email: username.clone(),
            username,
            ..Self::default()
        }
    }

    /// Reject requests the remote side would refuse or misread.
    pub fn validate(&self) -> Result<(), ForceError> {
        if self.name.trim().is_empty() {
            return Err(ForceError::InvalidInput("environment name is required".into()));
        }
        if self.username.trim().is_empty() {
            return Err(ForceError::InvalidInput("signup username is required".into()));
        }
        if self.admin_email.trim().is_empty() {
            return Err(ForceError::InvalidInput("admin email is required".into()));
        }
        if self.duration_days == 0 || self.duration_days > MAX_DURATION_DAYS {
            return Err(ForceError::InvalidInput(format!(
                "duration must be between 1 and {MAX_DURATION_DAYS} days, got {}",
                self.duration_days
            )));
        }
        if let Some(feature) = self.features.iter().find(|f| f.trim().is_empty() || f.contains(';')) {
            return Err(ForceError::InvalidInput(format!("invalid feature name '{feature}'")));
        }
        if matches!(&self.namespace, Some(ns) if ns.trim().is_empty()) {
            return Err(ForceError::InvalidInput("namespace must not be blank".into()));
        }
        Ok(())
    }

    /// Feature list in the remote `A;B;C` form.
    pub fn features_joined(&self) -> String {
        self.features.join(";")
    }
}

/// Remote environment row as returned by a lookup query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentRecord {
    pub id: Option<String>,
    pub name: String,
    pub status: EnvironmentStatus,
    pub namespace: Option<String>,
    pub login_url: Option<String>,
    pub username: Option<String>,
    pub auth_code: Option<String>,
    pub features: Option<String>,
    pub expires_at: Option<String>,
    pub error_code: Option<String>,
}

impl EnvironmentRecord {
    pub fn from_record(record: &Record) -> Self {
        let owned = |field: &str| record.string_field(field).map(str::to_string);
        Self {
            id: owned("Id"),
            name: owned("OrgName").unwrap_or_default(),
            status: record
                .string_field("Status")
                .map(EnvironmentStatus::from_remote)
                .unwrap_or_default(),
            namespace: owned("Namespace"),
            login_url: owned("LoginUrl"),
            username: owned("SignupUsername"),
            auth_code: owned("AuthCode"),
            features: owned("Features"),
            expires_at: owned("ExpirationDate"),
            error_code: owned("ErrorCode"),
        }
    }
}

/// Environment handed back to callers once provisioning reached `Active`
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedEnvironment {
    pub name: String,
    pub namespace: Option<String>,
    pub login_url: String,
    pub username: String,
    pub auth_code: String,
    /// Generated password, present once it was set on the environment.
    pub password: Option<String>,
    pub features: Vec<String>,
    pub expires_at: Option<String>,
    pub status: EnvironmentStatus,
}

impl ProvisionedEnvironment {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn from_record(record: EnvironmentRecord) -> Self {
        Self {
            name: record.name,
            namespace: record.namespace.filter(|ns| !ns.is_empty()),
            login_url: record.login_url.unwrap_or_default(),
            username: record.username.unwrap_or_default(),
            auth_code: record.auth_code.unwrap_or_default(),
            password: None,
            features: record
                .features
                .map(|f| f.split(';').filter(|s| !s.is_empty()).map(str::to_string).collect())
                .unwrap_or_default(),
            expires_at: record.expires_at,
            status: record.status,
        }
    }

    /// Expiry as a calendar date, when the remote value parses.
    pub fn expiry_date(&self) -> Option<NaiveDate> {
        self.expires_at
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
    }
}

impl std::fmt::Debug for ProvisionedEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionedEnvironment")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("login_url", &self.login_url)
            .field("username", &self.username)
            .field("auth_code", &"[REDACTED]")
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("features", &self.features)
            .field("expires_at", &self.expires_at)
            .field("status", &self.status)
            .finish()
    }
}

/// Outcome of a create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEnvironmentResult {
    pub success: bool,
    pub environment: ProvisionedEnvironment,
}

/// Steps chained after the environment became `Active`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisioningStep {
    Authenticate,
    ApplySettings,
    SetPassword,
    UpdateUserDetails,
}

impl std::fmt::Display for ProvisioningStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Authenticate => "authentication",
            Self::ApplySettings => "settings deployment",
            Self::SetPassword => "password update",
            Self::UpdateUserDetails => "user details update",
        };
        f.write_str(label)
    }
}

/// Result of an existence lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistenceCheck {
    pub exists: bool,
    pub expires_at: Option<String>,
}

/// Result of a teardown request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalResult {
    pub success: bool,
    /// Number of environments the bulk delete was issued for.
    pub removed: usize,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_status_from_remote() {
        assert_eq!(EnvironmentStatus::from_remote("Active"), EnvironmentStatus::Active);
        assert_eq!(EnvironmentStatus::from_remote("Error"), EnvironmentStatus::Error);
        assert_eq!(EnvironmentStatus::from_remote("Deleted"), EnvironmentStatus::Deleted);
        assert_eq!(EnvironmentStatus::from_remote("New"), EnvironmentStatus::Provisioning);
        assert_eq!(EnvironmentStatus::from_remote("Creating"), EnvironmentStatus::Provisioning);
    }

    #[test]
    fn test_status_transitions_are_monotonic() {
        use EnvironmentStatus::*;

        assert!(Provisioning.can_transition_to(Active));
        assert!(Provisioning.can_transition_to(Error));
        assert!(Active.can_transition_to(Deleted));
        assert!(Active.can_transition_to(Active));

        assert!(!Active.can_transition_to(Provisioning));
        assert!(!Error.can_transition_to(Active));
        assert!(!Deleted.can_transition_to(Active));
        assert!(!Provisioning.can_transition_to(Deleted));
        assert!(!Error.can_transition_to(Deleted));
    }

    #[test]
    fn test_edition_wire_names() {
        assert_eq!(Edition::default().to_string(), "Developer");
        assert_eq!(Edition::PartnerDeveloper.to_string(), "Partner Developer");
        assert_eq!(Edition::from_str("partner enterprise").unwrap(), Edition::PartnerEnterprise);
        assert_eq!(Release::from_str("preview").unwrap(), Release::Preview);
    }

    #[test]
    fn test_full_sweep_covers_ipv4_space() {
        let ranges = IpRange::full_sweep();
        assert_eq!(ranges.len(), 255);

        let first = &ranges[0];
        assert_eq!(first.description, "allips254");
        assert_eq!(first.start, Ipv4Addr::new(254, 0, 0, 0));
        assert_eq!(first.end, Ipv4Addr::new(255, 255, 255, 255));

        let last = ranges.last().unwrap();
        assert_eq!(last.description, "allips0");
        assert_eq!(last.start, Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(last.end, Ipv4Addr::new(1, 255, 255, 255));
    }

    #[test]
    fn test_params_defaults_and_validation() {
        let params = CreateEnvironmentParams::new("demo", "admin@example.com.demo");
        assert_eq!(params.edition, Edition::Developer);
        assert_eq!(params.duration_days, 30);
        assert_eq!(params.admin_email, "admin@example.com.demo");
        assert!(params.validate().is_ok());

        let blank = CreateEnvironmentParams { name: "  ".into(), ..params.clone() };
        assert!(matches!(blank.validate(), Err(ForceError::InvalidInput(_))));

        let too_long = CreateEnvironmentParams { duration_days: 31, ..params.clone() };
        assert!(matches!(too_long.validate(), Err(ForceError::InvalidInput(_))));

        let bad_feature =
            CreateEnvironmentParams { features: vec!["A;B".into()], ..params.clone() };
        assert!(matches!(bad_feature.validate(), Err(ForceError::InvalidInput(_))));
    }

    #[test]
    fn test_features_joined() {
        let params = CreateEnvironmentParams {
            features: vec!["MultiCurrency".into(), "StateAndCountryPicklist".into()],
            ..CreateEnvironmentParams::new("demo", "admin@example.com")
        };
        assert_eq!(params.features_joined(), "MultiCurrency;StateAndCountryPicklist");
    }

    #[test]
    fn test_provisioned_environment_from_record() {
        let record = Record::from(json!({
            "Id": "2SR000000000001",
            "OrgName": "demo",
            "Status": "Active",
            "Namespace": null,
            "LoginUrl": "https://demo.my.example.com",
            "SignupUsername": "admin@example.com.demo",
            "AuthCode": "aPrx.code",
            "Features": "MultiCurrency;Communities",
            "ExpirationDate": "2026-11-18"
        }));

        let env = ProvisionedEnvironment::from_record(EnvironmentRecord::from_record(&record));
        assert_eq!(env.name, "demo");
        assert_eq!(env.status, EnvironmentStatus::Active);
        assert_eq!(env.namespace, None);
        assert_eq!(env.features, vec!["MultiCurrency", "Communities"]);
        assert_eq!(env.expiry_date(), NaiveDate::from_ymd_opt(2026, 11, 18));
        assert!(env.password.is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let env = ProvisionedEnvironment {
            auth_code: "aPrx.code".into(),
            password: Some("s3cret!A".into()),
            ..ProvisionedEnvironment::named("demo")
        };
        let rendered = format!("{:?}", env);
        assert!(rendered.contains("demo"));
        assert!(!rendered.contains("aPrx.code"));
        assert!(!rendered.contains("s3cret!A"));
    }
}
