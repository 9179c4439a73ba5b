//! Query and anonymous-script templates
//!
//! Every query and script sent to the remote side is rendered through
//! [`ScriptTemplate`]. Bound values are escaped for single-quoted string
//! literals, so a name containing `'` cannot end the literal early.

use std::collections::HashMap;

use scratchforce_domain::constants::{
    DEFAULT_LANGUAGE, ENVIRONMENT_OBJECT, TEARDOWN_BATCH_LIMIT, UNIQUE_LOOKUP_LIMIT,
};
use scratchforce_domain::{CreateEnvironmentParams, ForceError, Result};

/// Fields selected by every environment lookup
pub const ENVIRONMENT_FIELDS: &str = "Id, OrgName, Status, Namespace, LoginUrl, SignupUsername, \
                                      AuthCode, Features, ExpirationDate, ErrorCode";

/// Escape `value` for use inside a single-quoted literal.
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Template with `{{name}}` placeholders
#[derive(Debug, Clone)]
pub struct ScriptTemplate {
    source: String,
    bindings: HashMap<String, String>,
}

impl ScriptTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into(), bindings: HashMap::new() }
    }

    /// Bind a string value. It is escaped, the template supplies the quotes.
    pub fn bind(mut self, name: &str, value: impl AsRef<str>) -> Self {
        self.bindings.insert(name.to_string(), escape_literal(value.as_ref()));
        self
    }

    /// Bind a number, rendered as-is.
    pub fn bind_number(mut self, name: &str, value: u64) -> Self {
        self.bindings.insert(name.to_string(), value.to_string());
        self
    }

    /// Bind a list as comma-separated quoted literals, e.g. `'a', 'b'`.
    pub fn bind_list<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rendered = values
            .into_iter()
            .map(|value| format!("'{}'", escape_literal(value.as_ref())))
            .collect::<Vec<_>>()
            .join(", ");
        self.bindings.insert(name.to_string(), rendered);
        self
    }

    /// Substitute all placeholders.
    ///
    /// # Errors
    /// `ForceError::InvalidInput` for an unbound or unterminated placeholder.
    pub fn render(&self) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source.as_str();

        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after_open = &rest[open + 2..];
            let close = after_open.find("}}").ok_or_else(|| {
                ForceError::InvalidInput("unterminated placeholder in template".into())
            })?;
            let key = after_open[..close].trim();
            let value = self.bindings.get(key).ok_or_else(|| {
                ForceError::InvalidInput(format!("unbound placeholder '{key}' in template"))
            })?;
            out.push_str(value);
            rest = &after_open[close + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

const INSERT_ENVIRONMENT_HEAD: &str = "ScratchOrgInfo newEnvironment = new ScratchOrgInfo(
    OrgName = '{{name}}',
    Edition = '{{edition}}',
    Username = '{{username}}',
    AdminEmail = '{{admin_email}}',
    ConnectedAppConsumerKey = '{{client_id}}',
    ConnectedAppCallbackUrl = '{{redirect_uri}}',
    DurationDays = {{duration}},
    Features = '{{features}}',
    Description = '{{description}}',
";
const INSERT_ENVIRONMENT_NAMESPACE: &str = "    Namespace = '{{namespace}}',\n";
const INSERT_ENVIRONMENT_RELEASE: &str = "    Release = '{{release}}',\n";
const INSERT_ENVIRONMENT_TAIL: &str = "    Language = '{{language}}',
    Country = '{{country_code}}'
);
insert newEnvironment;";

const SET_PASSWORD: &str = "System.setPassword(UserInfo.getUserId(), '{{password}}');";

const UPDATE_USER_DETAILS: &str = "String userId = UserInfo.getUserId();
User u = [SELECT Id, Country, MobilePhone, LanguageLocaleKey FROM User WHERE Id = :userId LIMIT 1];
u.Country = '{{country_name}}';
u.MobilePhone = '{{phone}}';
u.LanguageLocaleKey = '{{language}}';
update u;";

const DELETE_ENVIRONMENTS: &str =
    "delete [SELECT Id FROM {{object}} WHERE Id IN ({{ids}})];";

/// Script inserting the environment request row
pub fn insert_environment_script(
    params: &CreateEnvironmentParams,
    client_id: &str,
    redirect_uri: &str,
) -> Result<String> {
    let mut source = String::from(INSERT_ENVIRONMENT_HEAD);
    if params.namespace.is_some() {
        source.push_str(INSERT_ENVIRONMENT_NAMESPACE);
    }
    if params.release.is_some() {
        source.push_str(INSERT_ENVIRONMENT_RELEASE);
    }
    source.push_str(INSERT_ENVIRONMENT_TAIL);

    let mut template = ScriptTemplate::new(source)
        .bind("name", &params.name)
        .bind("edition", params.edition.to_string())
        .bind("username", &params.username)
        .bind("admin_email", &params.admin_email)
        .bind("client_id", client_id)
        .bind("redirect_uri", redirect_uri)
        .bind_number("duration", u64::from(params.duration_days))
        .bind("features", params.features_joined())
        .bind("description", &params.description)
        .bind("language", DEFAULT_LANGUAGE)
        .bind("country_code", &params.country_code);
    if let Some(namespace) = &params.namespace {
        template = template.bind("namespace", namespace);
    }
    if let Some(release) = params.release {
        template = template.bind("release", release.to_string());
    }
    template.render()
}

/// Script setting the running user's password
pub fn set_password_script(password: &str) -> Result<String> {
    ScriptTemplate::new(SET_PASSWORD).bind("password", password).render()
}

/// Script updating the running user's locale, phone and country
pub fn update_user_details_script(params: &CreateEnvironmentParams) -> Result<String> {
    ScriptTemplate::new(UPDATE_USER_DETAILS)
        .bind("country_name", &params.country_name)
        .bind("phone", &params.phone)
        .bind("language", DEFAULT_LANGUAGE)
        .render()
}

/// Script deleting environment rows by id
pub fn delete_environments_script(ids: &[String]) -> Result<String> {
    if ids.is_empty() {
        return Err(ForceError::InvalidInput("no environment ids to delete".into()));
    }
    ScriptTemplate::new(DELETE_ENVIRONMENTS)
        .bind("object", ENVIRONMENT_OBJECT)
        .bind_list("ids", ids)
        .render()
}

/// Non-deleted rows for a name and signup username, used while provisioning.
pub fn environment_by_owner_query(name: &str, username: &str) -> Result<String> {
    ScriptTemplate::new(
        "SELECT {{fields}} FROM {{object}} WHERE OrgName = '{{name}}' \
         AND SignupUsername = '{{username}}' AND Status != 'Deleted' LIMIT {{limit}}",
    )
    .bind("fields", ENVIRONMENT_FIELDS)
    .bind("object", ENVIRONMENT_OBJECT)
    .bind("name", name)
    .bind("username", username)
    .bind_number("limit", u64::from(UNIQUE_LOOKUP_LIMIT))
    .render()
}

/// Active rows for a name, limited so duplicates are visible
pub fn active_environment_query(name: &str) -> Result<String> {
    ScriptTemplate::new(
        "SELECT {{fields}} FROM {{object}} WHERE OrgName = '{{name}}' \
         AND Status = 'Active' LIMIT {{limit}}",
    )
    .bind("fields", ENVIRONMENT_FIELDS)
    .bind("object", ENVIRONMENT_OBJECT)
    .bind("name", name)
    .bind_number("limit", u64::from(UNIQUE_LOOKUP_LIMIT))
    .render()
}

/// Ids of active rows for a name, capped at one teardown batch
pub fn active_environment_ids_query(name: &str) -> Result<String> {
    ScriptTemplate::new(
        "SELECT Id FROM {{object}} WHERE OrgName = '{{name}}' AND Status = 'Active' LIMIT {{limit}}",
    )
    .bind("object", ENVIRONMENT_OBJECT)
    .bind("name", name)
    .bind_number("limit", u64::from(TEARDOWN_BATCH_LIMIT))
    .render()
}

/// Every active environment, oldest first
pub fn active_environments_query() -> Result<String> {
    ScriptTemplate::new(
        "SELECT {{fields}} FROM {{object}} WHERE Status = 'Active' ORDER BY CreatedDate",
    )
    .bind("fields", ENVIRONMENT_FIELDS)
    .bind("object", ENVIRONMENT_OBJECT)
    .render()
}
