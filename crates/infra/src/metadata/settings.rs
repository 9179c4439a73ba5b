//! Settings archive applied to every new environment
//!
//! The archive carries `Security.settings` (network access, password policy,
//! session and single sign-on settings) and `Quote.settings`.

use scratchforce_core::SettingsPackager;
use scratchforce_domain::{EnvironmentSettings, IpRange, Result};
use serde::Serialize;
use tracing::debug;

use super::archive::{render_xml, ArchiveBuilder, PackageManifest, METADATA_NAMESPACE};

pub const PACKAGE_PATH: &str = "package.xml";
pub const QUOTE_SETTINGS_PATH: &str = "settings/Quote.settings";
pub const SECURITY_SETTINGS_PATH: &str = "settings/Security.settings";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSettings {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    enable_quote: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SecuritySettings {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    can_users_grant_login_access: bool,
    enable_admin_login_as_any_user: bool,
    enable_audit_fields_inactive_owner: bool,
    enable_aura_secure_eval_pref: bool,
    enable_require_https_connection: bool,
    network_access: NetworkAccess,
    password_policies: PasswordPolicies,
    session_settings: SessionSettings,
    single_sign_on_settings: SingleSignOnSettings,
}

impl SecuritySettings {
    fn from_settings(settings: &EnvironmentSettings) -> Self {
        Self {
            xmlns: METADATA_NAMESPACE,
            can_users_grant_login_access: true,
            enable_admin_login_as_any_user: false,
            enable_audit_fields_inactive_owner: settings.enable_audit_fields_inactive_owner,
            enable_aura_secure_eval_pref: true,
            enable_require_https_connection: true,
            network_access: NetworkAccess {
                ip_ranges: settings.ip_ranges.iter().map(IpRangeEntry::from).collect(),
            },
            password_policies: PasswordPolicies::default(),
            session_settings: SessionSettings::default(),
            single_sign_on_settings: SingleSignOnSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct NetworkAccess {
    ip_ranges: Vec<IpRangeEntry>,
}

#[derive(Debug, Clone, Serialize)]
struct IpRangeEntry {
    description: String,
    end: String,
    start: String,
}

impl From<&IpRange> for IpRangeEntry {
    fn from(range: &IpRange) -> Self {
        Self {
            description: range.description.clone(),
            end: range.end.to_string(),
            start: range.start.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordPolicies {
    complexity: &'static str,
    expiration: &'static str,
    history_restriction: u8,
    lockout_interval: &'static str,
    max_login_attempts: &'static str,
    minimum_password_length: u8,
    minimum_password_lifetime: bool,
    obscure_secret_answer: bool,
    question_restriction: &'static str,
}

impl Default for PasswordPolicies {
    fn default() -> Self {
        Self {
            complexity: "AlphaNumeric",
            expiration: "Never",
            history_restriction: 3,
            lockout_interval: "FifteenMinutes",
            max_login_attempts: "TenAttempts",
            minimum_password_length: 8,
            minimum_password_lifetime: false,
            obscure_secret_answer: false,
            question_restriction: "DoesNotContainPassword",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionSettings {
    allow_user_authentication_by_certificate: bool,
    can_confirm_email_change_in_lightning_communities: bool,
    can_confirm_identity_by_sms_only: bool,
    disable_timeout_warning: bool,
    enable_built_in_authenticator: bool,
    #[serde(rename = "enableCSPOnEmail")]
    enable_csp_on_email: bool,
    #[serde(rename = "enableCSRFOnGet")]
    enable_csrf_on_get: bool,
    #[serde(rename = "enableCSRFOnPost")]
    enable_csrf_on_post: bool,
    enable_cache_and_autocomplete: bool,
    #[serde(rename = "enableClickjackNonsetupSFDC")]
    enable_clickjack_nonsetup_sfdc: bool,
    enable_clickjack_nonsetup_user: bool,
    enable_clickjack_nonsetup_user_headerless: bool,
    enable_clickjack_setup: bool,
    enable_content_sniffing_protection: bool,
    enable_lightning_login: bool,
    enable_lightning_login_only_with_user_perm: bool,
    enable_oauth_cors_policy: bool,
    enable_post_for_sessions: bool,
    #[serde(rename = "enableSMSIdentity")]
    enable_sms_identity: bool,
    #[serde(rename = "enableU2F")]
    enable_u2f: bool,
    enable_xss_protection: bool,
    enforce_ip_ranges_every_request: bool,
    enforce_user_device_revoked: bool,
    force_logout_on_session_timeout: bool,
    force_relogin: bool,
    has_retained_login_hints: bool,
    has_user_switching: bool,
    identity_confirmation_on_email_change: bool,
    identity_confirmation_on_two_factor_registration_enabled: bool,
    lock_sessions_to_domain: bool,
    lock_sessions_to_ip: bool,
    session_timeout: &'static str,
    #[serde(rename = "lockerServiceCSP")]
    locker_service_csp: bool,
    locker_service_next: bool,
    locker_service_next_control: bool,
    redirection_warning: bool,
    referrer_policy: bool,
    require_http_only: bool,
    use_local_storage_for_logout_url: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            allow_user_authentication_by_certificate: false,
            can_confirm_email_change_in_lightning_communities: true,
            can_confirm_identity_by_sms_only: true,
            disable_timeout_warning: false,
            enable_built_in_authenticator: false,
            enable_csp_on_email: true,
            enable_csrf_on_get: true,
            enable_csrf_on_post: true,
            enable_cache_and_autocomplete: true,
            enable_clickjack_nonsetup_sfdc: true,
            enable_clickjack_nonsetup_user: false,
            enable_clickjack_nonsetup_user_headerless: false,
            enable_clickjack_setup: true,
            enable_content_sniffing_protection: true,
            enable_lightning_login: true,
            enable_lightning_login_only_with_user_perm: false,
            enable_oauth_cors_policy: false,
            enable_post_for_sessions: false,
            enable_sms_identity: true,
            enable_u2f: false,
            enable_xss_protection: true,
            enforce_ip_ranges_every_request: false,
            enforce_user_device_revoked: false,
            force_logout_on_session_timeout: true,
            force_relogin: true,
            has_retained_login_hints: false,
            has_user_switching: true,
            identity_confirmation_on_email_change: false,
            identity_confirmation_on_two_factor_registration_enabled: true,
            lock_sessions_to_domain: true,
            lock_sessions_to_ip: false,
            session_timeout: "TwelveHours",
            locker_service_csp: true,
            locker_service_next: false,
            locker_service_next_control: false,
            redirection_warning: true,
            referrer_policy: true,
            require_http_only: false,
            use_local_storage_for_logout_url: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SingleSignOnSettings {
    #[serde(rename = "enableCaseInsensitiveFederationID")]
    enable_case_insensitive_federation_id: bool,
    enable_multiple_saml_configs: bool,
    enable_saml_jit_provisioning: bool,
    enable_saml_login: bool,
    is_login_with_salesforce_credentials_disabled: bool,
}

impl Default for SingleSignOnSettings {
    fn default() -> Self {
        Self {
            enable_case_insensitive_federation_id: false,
            enable_multiple_saml_configs: true,
            enable_saml_jit_provisioning: false,
            enable_saml_login: false,
            is_login_with_salesforce_credentials_disabled: false,
        }
    }
}

/// Render the `Security.settings` document.
pub fn render_security_settings(settings: &EnvironmentSettings) -> Result<String> {
    render_xml("SecuritySettings", &SecuritySettings::from_settings(settings))
}

/// Render the `Quote.settings` document.
pub fn render_quote_settings() -> Result<String> {
    render_xml("QuoteSettings", &QuoteSettings { xmlns: METADATA_NAMESPACE, enable_quote: true })
}

/// Packs environment settings into a deployable archive
#[derive(Debug, Clone)]
pub struct SettingsArchivePackager {
    api_version: String,
}

impl SettingsArchivePackager {
    pub fn new(api_version: impl Into<String>) -> Self {
        Self { api_version: api_version.into() }
    }
}

impl SettingsPackager for SettingsArchivePackager {
    fn package(&self, settings: &EnvironmentSettings) -> Result<Vec<u8>> {
        let manifest = PackageManifest::new(self.api_version.clone())
            .with_member("Security", "Settings")
            .with_member("Quote", "Settings")
            .render()?;

        let mut archive = ArchiveBuilder::new();
        archive.add_file(PACKAGE_PATH, manifest.as_bytes())?;
        archive.add_file(QUOTE_SETTINGS_PATH, render_quote_settings()?.as_bytes())?;
        archive.add_file(SECURITY_SETTINGS_PATH, render_security_settings(settings)?.as_bytes())?;

        let bytes = archive.finish()?;
        debug!(
            bytes = bytes.len(),
            ip_ranges = settings.ip_ranges.len(),
            "Packaged environment settings"
        );
        Ok(bytes)
    }
}
