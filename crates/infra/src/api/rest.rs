//! REST adapter implementing the core [`OrgApi`] port

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use scratchforce_core::OrgApi;
use scratchforce_domain::constants::DEPLOY_ARCHIVE_FILENAME;
use scratchforce_domain::{
    DeployOptions, DeployResponse, ForceError, JobId, JobStatus, QueryResult, Result, ScriptResult,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use super::session::Session;
use crate::errors::InfraError;

impl Session {
    fn url_with_params(&self, base: &str, params: &[(&str, &str)]) -> Result<String> {
        Url::parse_with_params(base, params)
            .map(String::from)
            .map_err(|e| ForceError::InvalidInput(format!("invalid request URL {base}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.authenticated_request(Method::GET, url, None).await?;
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| ForceError::from(InfraError::from(e)))
}

#[async_trait]
impl OrgApi for Session {
    fn is_authenticated(&self) -> bool {
        Session::is_authenticated(self)
    }

    /// Runs the query and follows `nextRecordsUrl` until the last page.
    #[instrument(skip(self, soql))]
    async fn query(&self, soql: &str) -> Result<QueryResult> {
        self.ensure_authenticated()?;
        let first_url = self.url_with_params(&self.data_url("/query"), &[("q", soql)])?;
        let mut page: QueryResult = self.get_json(&first_url).await?;

        let total_size = page.total_size;
        let mut records = std::mem::take(&mut page.records);
        let mut pages = 1;

        while !page.done {
            let Some(next) = page.next_records_url.take() else {
                break;
            };
            page = self.get_json(&self.instance_path(&next)).await?;
            records.append(&mut page.records);
            pages += 1;
        }

        debug!(pages, records = records.len(), "Query complete");
        Ok(QueryResult { total_size, done: true, next_records_url: None, records })
    }

    #[instrument(skip(self, body))]
    async fn execute_anonymous(&self, body: &str) -> Result<ScriptResult> {
        self.ensure_authenticated()?;
        let url = self.url_with_params(
            &self.data_url("/tooling/executeAnonymous/"),
            &[("anonymousBody", body)],
        )?;
        let result: ScriptResult = self.get_json(&url).await?;
        debug!(compiled = result.compiled, success = result.success, "Anonymous script executed");
        Ok(result)
    }

    #[instrument(skip(self, archive, options), fields(bytes = archive.len()))]
    async fn submit_deploy(&self, archive: Vec<u8>, options: &DeployOptions) -> Result<JobStatus> {
        self.ensure_authenticated()?;
        let descriptor = serde_json::to_string(&options.descriptor())
            .map_err(|e| ForceError::from(InfraError::from(e)))?;

        let json_part = Part::text(descriptor)
            .mime_str("application/json")
            .map_err(|e| ForceError::from(InfraError::from(e)))?;
        let file_part = Part::bytes(archive)
            .file_name(DEPLOY_ARCHIVE_FILENAME)
            .mime_str("application/zip")
            .map_err(|e| ForceError::from(InfraError::from(e)))?;
        let form = Form::new().part("json", json_part).part("file", file_part);

        let body =
            self.authenticated_multipart(&self.data_url("/metadata/deployRequest"), form).await?;
        let status = decode::<DeployResponse>(&body)?.into_status();

        info!(job_id = %status.id, done = status.done, "Deployment submitted");
        Ok(status)
    }

    #[instrument(skip(self, job), fields(job_id = %job))]
    async fn deploy_status(&self, job: &JobId) -> Result<JobStatus> {
        self.ensure_authenticated()?;
        let base = self.data_url(&format!("/metadata/deployRequest/{}", job.as_str()));
        let url = self.url_with_params(&base, &[("includeDetails", "true")])?;
        let status = self.get_json::<DeployResponse>(&url).await?.into_status();

        debug!(done = status.done, status = ?status.status, "Deployment status fetched");
        Ok(status)
    }
}
