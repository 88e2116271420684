//! Hosted store backend speaking PostgREST conventions.

use crate::store::{Filter, ListQuery, RemoteStore};
use ::async_trait::async_trait;
use kennel_core::{Collection, KennelError, KennelResult, Row, StorageError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;

const REST_PREFIX: &str = "/rest/v1";

/// Connection settings for [`RestStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct RestStoreConfig {
    pub base_url: String,
    pub api_key: String,
    pub schema: Option<String>,
    pub request_timeout: Duration,
}

/// [`RemoteStore`] over a hosted PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestStore {
    pub fn new(config: &RestStoreConfig) -> KennelResult<Self> {
        let headers = build_headers(config)?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                KennelError::from(kennel_core::ConfigError::InvalidValue {
                    field: "store".to_string(),
                    reason: e.to_string(),
                })
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}{}/{}", self.base_url, REST_PREFIX, collection)
    }

    fn request(&self, method: Method, collection: Collection) -> RequestBuilder {
        self.client.request(method, self.collection_url(collection))
    }

    async fn send(&self, collection: Collection, request: RequestBuilder) -> KennelResult<Response> {
        let response = request.send().await.map_err(|e| StorageError::Transport {
            collection,
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StorageError::Backend {
            collection,
            status: Some(status.as_u16()),
            message,
        }
        .into())
    }

    async fn rows(&self, collection: Collection, response: Response) -> KennelResult<Vec<Row>> {
        let body: Value = response.json().await.map_err(|e| StorageError::Transport {
            collection,
            reason: format!("invalid response body: {e}"),
        })?;
        match body {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(row) => Some(row),
                    _ => None,
                })
                .collect()),
            Value::Object(row) => Ok(vec![row]),
            other => Err(StorageError::Transport {
                collection,
                reason: format!("expected rows, got {other}"),
            }
            .into()),
        }
    }

    async fn single_row(
        &self,
        collection: Collection,
        id: &str,
        response: Response,
    ) -> KennelResult<Row> {
        self.rows(collection, response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                StorageError::NotFound {
                    collection,
                    id: id.to_string(),
                }
                .into()
            })
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    fn backend(&self) -> &'static str {
        "rest"
    }

    async fn list(&self, collection: Collection, query: &ListQuery) -> KennelResult<Vec<Row>> {
        let params = list_params(query);
        let request = self.request(Method::GET, collection).query(&params);
        let response = self.send(collection, request).await?;
        self.rows(collection, response).await
    }

    async fn get(&self, collection: Collection, id: &str) -> KennelResult<Row> {
        let request = self
            .request(Method::GET, collection)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))]);
        let response = self.send(collection, request).await?;
        self.single_row(collection, id, response).await
    }

    async fn insert(&self, collection: Collection, row: Row) -> KennelResult<Row> {
        let request = self
            .request(Method::POST, collection)
            .header("Prefer", "return=representation")
            .json(&row);
        let response = self.send(collection, request).await?;
        self.single_row(collection, "<new>", response).await
    }

    async fn update(&self, collection: Collection, id: &str, row: Row) -> KennelResult<Row> {
        let request = self
            .request(Method::PATCH, collection)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&row);
        let response = self.send(collection, request).await?;
        self.single_row(collection, id, response).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> KennelResult<()> {
        let request = self
            .request(Method::DELETE, collection)
            .query(&[("id", format!("eq.{id}"))]);
        self.send(collection, request).await?;
        Ok(())
    }
}

fn build_headers(config: &RestStoreConfig) -> KennelResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, HeaderName::from_static("apikey"), &config.api_key)?;
    insert_header(
        &mut headers,
        AUTHORIZATION,
        &format!("Bearer {}", config.api_key),
    )?;
    if let Some(schema) = &config.schema {
        insert_header(&mut headers, HeaderName::from_static("accept-profile"), schema)?;
        insert_header(&mut headers, HeaderName::from_static("content-profile"), schema)?;
    }
    Ok(headers)
}

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) -> KennelResult<()> {
    let value = HeaderValue::from_str(value).map_err(|e| kennel_core::ConfigError::InvalidValue {
        field: name.as_str().to_string(),
        reason: e.to_string(),
    })?;
    headers.insert(name, value);
    Ok(())
}

/// Query-string pairs for a list request.
pub(crate) fn list_params(query: &ListQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    for filter in &query.filters {
        match filter {
            Filter::Eq { column, value } => {
                params.push((column.clone(), filter_operand(value)));
            }
        }
    }
    if let Some(order) = query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push((
            "order".to_string(),
            format!("{}.{direction}.nullslast", order.column),
        ));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn filter_operand(value: &Value) -> String {
    match value {
        Value::Null => "is.null".to_string(),
        Value::String(s) => format!("eq.{s}"),
        other => format!("eq.{other}"),
    }
}
