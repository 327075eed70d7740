use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::config::get_variable;
use crate::errors::BackendError;
use crate::record::Id;
use crate::store::{BatchResponse, Query, RecordOutcome, RecordStore};
use crate::urls::Urls;

const PROJECT_ID_HEADER: &str = "x-project-id";
const PUBLIC_KEY_HEADER: &str = "x-public-key";

/// A store backed by the remote record API.
pub struct HttpStore {
    client: reqwest::Client,
    urls: Urls,
    project_id: String,
    public_key: String,
}

impl HttpStore {
    /// Creates a new instance.
    pub fn new(client: reqwest::Client, urls: Urls, project_id: String, public_key: String) -> Self {
        Self {
            client,
            urls,
            project_id,
            public_key,
        }
    }

    pub fn from_env() -> Self {
        let urls = Urls::new(get_variable("FACULTY_STORE_BASE_URL"));

        HttpStore::new(
            reqwest::Client::new(),
            urls,
            get_variable("FACULTY_STORE_PROJECT_ID"),
            get_variable("FACULTY_STORE_PUBLIC_KEY"),
        )
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header(PROJECT_ID_HEADER, self.project_id.as_str())
            .header(PUBLIC_KEY_HEADER, self.public_key.as_str())
    }

    fn write(&self, method: Method, url: Url, body: Value) -> BoxFuture<Result<BatchResponse, BackendError>> {
        async move {
            let response = self
                .request(method, url)
                .json(&body)
                .send()
                .await
                .map_err(map_request_error)?;

            let envelope: WriteEnvelope = decode(response).await?;

            if !envelope.success {
                return Err(rejection(envelope.message));
            }

            Ok(BatchResponse {
                results: envelope.results.unwrap_or_default(),
            })
        }
        .boxed()
    }
}

// these can be simplified once async functions in traits are stabilized
impl RecordStore for HttpStore {
    fn fetch_records(
        &self,
        table: &str,
        query: Query,
    ) -> BoxFuture<Result<Vec<Value>, BackendError>> {
        let url = self.urls.query(table);

        async move {
            let response = self
                .request(Method::POST, url)
                .json(&query)
                .send()
                .await
                .map_err(map_request_error)?;

            let envelope: FetchEnvelope = decode(response).await?;

            if !envelope.success {
                return Err(rejection(envelope.message));
            }

            Ok(envelope.data.unwrap_or_default())
        }
        .boxed()
    }

    fn record_by_id(
        &self,
        table: &str,
        id: Id,
        fields: Vec<String>,
    ) -> BoxFuture<Result<Option<Value>, BackendError>> {
        let url = self.urls.record(table, id);

        async move {
            let response = self
                .request(Method::GET, url)
                .query(&[("fields", fields.join(","))])
                .send()
                .await
                .map_err(map_request_error)?;

            if response.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }

            let envelope: RecordEnvelope = decode(response).await?;

            if !envelope.success {
                return Err(rejection(envelope.message));
            }

            Ok(envelope.data.filter(|data| !data.is_null()))
        }
        .boxed()
    }

    fn create_records(
        &self,
        table: &str,
        records: Vec<Value>,
    ) -> BoxFuture<Result<BatchResponse, BackendError>> {
        let url = self.urls.records(table);

        self.write(Method::POST, url, json!({ "records": records }))
    }

    fn update_records(
        &self,
        table: &str,
        records: Vec<Value>,
    ) -> BoxFuture<Result<BatchResponse, BackendError>> {
        let url = self.urls.records(table);

        self.write(Method::PATCH, url, json!({ "records": records }))
    }

    fn delete_records(
        &self,
        table: &str,
        ids: Vec<Id>,
    ) -> BoxFuture<Result<BatchResponse, BackendError>> {
        let url = self.urls.records(table);

        self.write(Method::DELETE, url, json!({ "RecordIds": ids }))
    }
}

#[derive(Debug, Deserialize)]
struct FetchEnvelope {
    success: bool,

    #[serde(default)]
    data: Option<Vec<Value>>,

    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordEnvelope {
    success: bool,

    #[serde(default)]
    data: Option<Value>,

    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WriteEnvelope {
    success: bool,

    #[serde(default)]
    results: Option<Vec<RecordOutcome>>,

    #[serde(default)]
    message: Option<String>,
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, BackendError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(map_request_error)?;

    if !status.is_success() {
        return Err(BackendError::StoreRejected {
            message: format!("{}: {}", status, String::from_utf8_lossy(&bytes)),
        });
    }

    serde_json::from_slice(&bytes).map_err(|source| BackendError::MalformedStoreResponse { source })
}

fn rejection(message: Option<String>) -> BackendError {
    BackendError::StoreRejected {
        message: message.unwrap_or_else(|| "no failure message provided".to_owned()),
    }
}

fn map_request_error(error: reqwest::Error) -> BackendError {
    if error.is_connect() || error.is_timeout() {
        BackendError::StoreUnreachable {
            message: error.to_string(),
        }
    } else {
        BackendError::Transport { source: error }
    }
}
