use reqwest::Client;

use crate::contract::ContactRequest;
use crate::contract::ContactResponse;
use crate::contract::SubmissionResult;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// Connection failure, or a body that isn't JSON
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// HTTP client for `POST /api/contact`.
///
/// `reqwest::Client` keeps a connection pool, so one `ContactClient` should be
/// kept and reused rather than built per submission.
#[derive(Clone, Debug)]
pub struct ContactClient {
    http_client: Client,
    endpoint: String,
}

impl ContactClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            endpoint: format!("{}/api/contact", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str { &self.endpoint }

    /// One attempt; there is no retry. The status code only refines the
    /// error category, `success` in the body decides the outcome.
    #[tracing::instrument(name = "Submitting contact form", skip(self, request))]
    pub async fn submit(
        &self,
        request: &ContactRequest,
    ) -> Result<SubmissionResult, ClientError> {
        let resp = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body: ContactResponse = resp.json().await?;
        Ok(body.into_result(status))
    }
}
