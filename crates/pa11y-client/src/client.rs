//! HTTP client for the pa11y-webservice API.
//!
//! Every call goes through [`WebserviceClient::execute`], which turns
//! non-success statuses into [`ClientError::Status`] and transport failures
//! into classified [`ClientError::Transport`] values.

use pa11y_types::{NewTask, ResultId, Task, TaskEdits, TaskId, TaskResult};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ClientError;
use crate::query::{ResultQuery, TaskQuery};

/// Shape of the service's error bodies.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client for a single webservice instance.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct WebserviceClient {
    http: reqwest::Client,
    base: Url,
}

impl WebserviceClient {
    /// Create a client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the URL does not parse or
    /// cannot carry a path.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    /// Create a client that reuses an existing `reqwest` client.
    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Result<Self, ClientError> {
        let base = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: base_url.to_owned(),
                reason: "URL cannot carry a path".to_owned(),
            });
        }
        Ok(Self { http, base })
    }

    /// The service's base URL.
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Calls on the task collection.
    pub const fn tasks(&self) -> TasksEndpoint<'_> {
        TasksEndpoint { client: self }
    }

    /// Calls on a single task.
    pub const fn task<'a>(&'a self, id: &'a TaskId) -> TaskEndpoint<'a> {
        TaskEndpoint { client: self, id }
    }

    /// Build the URL for a path below the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl {
                url: self.base.to_string(),
                reason: "URL cannot carry a path".to_owned(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "webservice request");
        Ok(self.http.request(method, url))
    }

    /// Send a request and reject non-success statuses.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| format!("Error {}", status.as_u16()));
        debug!(status = status.as_u16(), %message, "webservice rejected request");

        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Send a request and decode the JSON body.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        self.execute(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ClientError::from_reqwest(&e))
    }
}

/// Calls on `/tasks`.
#[derive(Debug, Clone, Copy)]
pub struct TasksEndpoint<'a> {
    client: &'a WebserviceClient,
}

impl TasksEndpoint<'_> {
    /// List tasks matching `query`.
    pub async fn get(&self, query: &TaskQuery) -> Result<Vec<Task>, ClientError> {
        let request = self.client.request(Method::GET, &["tasks"])?.query(query);
        self.client.fetch(request).await
    }

    /// Create a task and return it as stored by the service.
    pub async fn create(&self, task: &NewTask) -> Result<Task, ClientError> {
        let request = self.client.request(Method::POST, &["tasks"])?.json(task);
        self.client.fetch(request).await
    }

    /// List results across all tasks.
    pub async fn results(&self, query: &ResultQuery) -> Result<Vec<TaskResult>, ClientError> {
        let request = self
            .client
            .request(Method::GET, &["tasks", "results"])?
            .query(query);
        self.client.fetch(request).await
    }
}

/// Calls on `/tasks/{id}`.
#[derive(Debug, Clone, Copy)]
pub struct TaskEndpoint<'a> {
    client: &'a WebserviceClient,
    id: &'a TaskId,
}

impl<'a> TaskEndpoint<'a> {
    /// Fetch the task.
    pub async fn get(&self, query: &TaskQuery) -> Result<Task, ClientError> {
        let request = self
            .client
            .request(Method::GET, &["tasks", self.id.as_str()])?
            .query(query);
        self.client.fetch(request).await
    }

    /// Apply a partial update.
    pub async fn edit(&self, edits: &TaskEdits) -> Result<(), ClientError> {
        let request = self
            .client
            .request(Method::PATCH, &["tasks", self.id.as_str()])?
            .json(edits);
        self.client.execute(request).await.map(drop)
    }

    /// Delete the task and its results.
    pub async fn remove(&self) -> Result<(), ClientError> {
        let request = self
            .client
            .request(Method::DELETE, &["tasks", self.id.as_str()])?;
        self.client.execute(request).await.map(drop)
    }

    /// Queue a run of the task.
    pub async fn run(&self) -> Result<(), ClientError> {
        let request = self
            .client
            .request(Method::POST, &["tasks", self.id.as_str(), "run"])?;
        self.client.execute(request).await.map(drop)
    }

    /// List this task's results.
    pub async fn results(&self, query: &ResultQuery) -> Result<Vec<TaskResult>, ClientError> {
        let request = self
            .client
            .request(Method::GET, &["tasks", self.id.as_str(), "results"])?
            .query(query);
        self.client.fetch(request).await
    }

    /// Calls on one of this task's results.
    pub const fn result(&self, id: &'a ResultId) -> ResultEndpoint<'a> {
        ResultEndpoint {
            client: self.client,
            task: self.id,
            id,
        }
    }
}

/// Calls on `/tasks/{id}/results/{rid}`.
#[derive(Debug, Clone, Copy)]
pub struct ResultEndpoint<'a> {
    client: &'a WebserviceClient,
    task: &'a TaskId,
    id: &'a ResultId,
}

impl ResultEndpoint<'_> {
    /// Fetch the result.
    pub async fn get(&self, query: &ResultQuery) -> Result<TaskResult, ClientError> {
        let request = self
            .client
            .request(
                Method::GET,
                &["tasks", self.task.as_str(), "results", self.id.as_str()],
            )?
            .query(query);
        self.client.fetch(request).await
    }
}
