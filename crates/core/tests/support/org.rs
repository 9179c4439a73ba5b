//! Mock port implementations for testing
//!
//! `MockOrg` replays scripted responses in order and records every call, so
//! tests can assert both outcomes and how many remote round trips happened.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scratchforce_core::ports::{EnvironmentConnector, OrgApi, SettingsPackager};
use scratchforce_domain::{
    DeployOptions, EnvironmentSettings, ForceError, JobId, JobStatus, ProvisionedEnvironment,
    QueryResult, Record, Result as DomainResult, ScriptResult,
};
use serde_json::json;

#[derive(Default)]
struct MockState {
    query_responses: VecDeque<DomainResult<QueryResult>>,
    script_responses: VecDeque<DomainResult<ScriptResult>>,
    submit_response: Option<DomainResult<JobStatus>>,
    status_responses: VecDeque<DomainResult<JobStatus>>,
    queries: Vec<String>,
    scripts: Vec<String>,
    submits: Vec<DeployOptions>,
    status_fetches: usize,
}

/// In-memory mock for `OrgApi`.
///
/// Clones share state. When a response queue runs dry the mock answers with
/// a neutral default: no records, a successful script, a finished
/// successful deploy, and a pending status.
#[derive(Clone)]
pub struct MockOrg {
    authenticated: bool,
    state: Arc<Mutex<MockState>>,
}

impl MockOrg {
    pub fn authenticated() -> Self {
        Self { authenticated: true, state: Arc::new(Mutex::new(MockState::default())) }
    }

    pub fn unauthenticated() -> Self {
        Self { authenticated: false, ..Self::authenticated() }
    }

    pub fn with_records(self, records: Vec<Record>) -> Self {
        self.push(|s| s.query_responses.push_back(Ok(QueryResult::from_records(records))));
        self
    }

    pub fn with_query_error(self, error: ForceError) -> Self {
        self.push(|s| s.query_responses.push_back(Err(error)));
        self
    }

    pub fn with_script(self, result: ScriptResult) -> Self {
        self.push(|s| s.script_responses.push_back(Ok(result)));
        self
    }

    pub fn with_script_error(self, error: ForceError) -> Self {
        self.push(|s| s.script_responses.push_back(Err(error)));
        self
    }

    pub fn with_submit(self, status: DomainResult<JobStatus>) -> Self {
        self.push(|s| s.submit_response = Some(status));
        self
    }

    pub fn with_status(self, status: DomainResult<JobStatus>) -> Self {
        self.push(|s| s.status_responses.push_back(status));
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.state.lock().unwrap().scripts.clone()
    }

    pub fn submits(&self) -> Vec<DeployOptions> {
        self.state.lock().unwrap().submits.clone()
    }

    pub fn status_fetches(&self) -> usize {
        self.state.lock().unwrap().status_fetches
    }

    pub fn total_calls(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.queries.len() + state.scripts.len() + state.submits.len() + state.status_fetches
    }

    fn push(&self, f: impl FnOnce(&mut MockState)) {
        f(&mut self.state.lock().unwrap());
    }
}

#[async_trait]
impl OrgApi for MockOrg {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    async fn query(&self, soql: &str) -> DomainResult<QueryResult> {
        let mut state = self.state.lock().unwrap();
        state.queries.push(soql.to_string());
        state.query_responses.pop_front().unwrap_or_else(|| Ok(QueryResult::default()))
    }

    async fn execute_anonymous(&self, body: &str) -> DomainResult<ScriptResult> {
        let mut state = self.state.lock().unwrap();
        state.scripts.push(body.to_string());
        state.script_responses.pop_front().unwrap_or_else(|| Ok(ScriptResult::succeeded()))
    }

    async fn submit_deploy(
        &self,
        _archive: Vec<u8>,
        options: &DeployOptions,
    ) -> DomainResult<JobStatus> {
        let mut state = self.state.lock().unwrap();
        state.submits.push(options.clone());
        state.submit_response.take().unwrap_or_else(|| Ok(finished_job(true)))
    }

    async fn deploy_status(&self, job: &JobId) -> DomainResult<JobStatus> {
        let mut state = self.state.lock().unwrap();
        state.status_fetches += 1;
        state.status_responses.pop_front().unwrap_or_else(|| Ok(pending_job(job.as_str())))
    }
}

pub fn pending_job(id: &str) -> JobStatus {
    JobStatus { id: id.to_string(), status: Some("InProgress".into()), ..JobStatus::default() }
}

pub fn finished_job(success: bool) -> JobStatus {
    JobStatus { id: "0Af000000000001".into(), done: true, success, ..JobStatus::default() }
}

/// Environment row as the remote query returns it
pub fn environment_row(name: &str, status: &str) -> Record {
    Record::from(json!({
        "attributes": {"type": "ScratchOrgInfo"},
        "Id": format!("2SR-{name}-{status}"),
        "OrgName": name,
        "Status": status,
        "Namespace": null,
        "LoginUrl": format!("https://{name}.my.example.com"),
        "SignupUsername": format!("admin@{name}.example.com"),
        "AuthCode": "aPrx.one-time-code",
        "Features": "MultiCurrency;Communities",
        "ExpirationDate": "2026-11-18",
        "ErrorCode": if status == "Error" { json!("C-9999") } else { json!(null) }
    }))
}

/// Connector handing out a shared `MockOrg`, or failing
#[derive(Clone)]
pub struct MockConnector {
    session: MockOrg,
    failure: Option<ForceError>,
    connects: Arc<AtomicUsize>,
}

impl MockConnector {
    pub fn new(session: MockOrg) -> Self {
        Self { session, failure: None, connects: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn failing(error: ForceError) -> Self {
        Self { failure: Some(error), ..Self::new(MockOrg::authenticated()) }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EnvironmentConnector for MockConnector {
    type Session = MockOrg;

    async fn connect(&self, _environment: &ProvisionedEnvironment) -> DomainResult<MockOrg> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(self.session.clone()),
        }
    }
}

/// Packager returning a fixed archive
#[derive(Default)]
pub struct MockPackager {
    failure: Option<ForceError>,
}

impl MockPackager {
    pub fn failing(error: ForceError) -> Self {
        Self { failure: Some(error) }
    }
}

impl SettingsPackager for MockPackager {
    fn package(&self, _settings: &EnvironmentSettings) -> DomainResult<Vec<u8>> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(b"PK\x05\x06".to_vec()),
        }
    }
}
