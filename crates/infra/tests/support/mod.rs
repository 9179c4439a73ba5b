//! Shared fixtures for infra integration tests
#![allow(dead_code)]

use scratchforce_domain::ForceConfig;
use serde_json::{json, Value};

pub const API_VERSION: &str = "53.0";
pub const QUERY_PATH: &str = "/services/data/v53.0/query";
pub const EXECUTE_PATH: &str = "/services/data/v53.0/tooling/executeAnonymous/";
pub const DEPLOY_PATH: &str = "/services/data/v53.0/metadata/deployRequest";
pub const TOKEN_PATH: &str = "/services/oauth2/token";

/// Config with short HTTP timeouts and millisecond deploy polling.
pub fn test_config() -> ForceConfig {
    let mut config = ForceConfig { http_timeout_secs: 5, ..ForceConfig::default() };
    config.api_version = API_VERSION.to_string();
    config.deploy.poll_interval_ms = 1;
    config.deploy.max_attempts = 5;
    config
}

pub fn script_success() -> Value {
    json!({
        "line": -1,
        "column": -1,
        "compiled": true,
        "success": true,
        "compileProblem": null,
        "exceptionStackTrace": null,
        "exceptionMessage": null
    })
}

pub fn script_exception(message: &str) -> Value {
    json!({
        "line": 3,
        "column": 1,
        "compiled": true,
        "success": false,
        "compileProblem": null,
        "exceptionStackTrace": "AnonymousBlock: line 3, column 1",
        "exceptionMessage": message
    })
}

pub fn query_page(records: Vec<Value>, next: Option<&str>) -> Value {
    json!({
        "totalSize": records.len(),
        "done": next.is_none(),
        "nextRecordsUrl": next,
        "records": records
    })
}

pub fn environment_row(name: &str, status: &str, login_url: &str) -> Value {
    json!({
        "attributes": {"type": "ScratchOrgInfo"},
        "Id": format!("2SR{name}"),
        "OrgName": name,
        "Status": status,
        "Namespace": null,
        "LoginUrl": login_url,
        "SignupUsername": format!("admin@{name}.example.com"),
        "AuthCode": "aPrxAuthCode",
        "Features": "API;AuthorApex",
        "ExpirationDate": "2026-11-18",
        "ErrorCode": null
    })
}

pub fn deploy_response(id: &str, done: bool, success: bool) -> Value {
    json!({
        "id": id,
        "deployResult": {
            "id": id,
            "done": done,
            "success": success,
            "status": if done { "Succeeded" } else { "InProgress" },
            "errorStatusCode": null,
            "errorMessage": null,
            "details": {"allComponentMessages": []}
        }
    })
}

pub fn token_response(instance_url: &str) -> Value {
    json!({
        "access_token": "00Dnew!token",
        "instance_url": instance_url,
        "id": "https://login.example.com/id/00D/005",
        "token_type": "Bearer"
    })
}
