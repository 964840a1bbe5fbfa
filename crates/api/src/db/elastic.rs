//! Elasticsearch connection over the REST API.
//!
//! Only the handful of endpoints the repositories need are wrapped:
//! `_bulk`, `_search`, `_doc`, `_delete_by_query` and index creation.
//! Writes use `refresh=wait_for` so a subsequent search sees them.

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::instrument;
use url::Url;

use super::RepositoryError;
use crate::config::ElasticConfig;

/// Largest page Elasticsearch returns by default (`index.max_result_window`).
pub const MAX_SEARCH_SIZE: usize = 10_000;

/// Handle to an Elasticsearch cluster.
#[derive(Clone)]
pub struct ElasticSearchDatabase {
    client: reqwest::Client,
    base_url: Url,
    username: Option<String>,
    password: Option<SecretString>,
}

impl std::fmt::Debug for ElasticSearchDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticSearchDatabase")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl ElasticSearchDatabase {
    /// Create a handle using the shared HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &ElasticConfig) -> Self {
        Self {
            client,
            base_url: config.url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    /// Base URL of the cluster.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Verify the cluster answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the cluster is not healthy.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        let response = self.request(Method::GET, "")?.send().await?;
        check_status(response).await?;
        Ok(())
    }

    /// Create `index` if it does not exist yet.
    ///
    /// Returns `true` when the index was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the existence check or creation fails.
    #[instrument(skip(self))]
    pub async fn ensure_index(&self, index: &str) -> Result<bool, RepositoryError> {
        let response = self.request(Method::HEAD, index)?.send().await?;
        if response.status().is_success() {
            return Ok(false);
        }
        if response.status() != StatusCode::NOT_FOUND {
            check_status(response).await?;
            return Ok(false);
        }

        let response = self.request(Method::PUT, index)?.send().await?;
        check_status(response).await?;
        tracing::info!(index, "Elasticsearch index created");
        Ok(true)
    }

    /// Index (create or overwrite) documents keyed by ID in one bulk request.
    ///
    /// Returns the number of documents indexed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Elastic` if any item in the bulk request fails.
    #[instrument(skip(self, docs), fields(count = docs.len()))]
    pub async fn bulk_index<T: Serialize + Sync>(
        &self,
        index: &str,
        docs: &[(String, T)],
    ) -> Result<u64, RepositoryError> {
        if docs.is_empty() {
            return Ok(0);
        }

        let body = bulk_body(index, docs)?;
        let response = self
            .request(Method::POST, "_bulk?refresh=wait_for")?
            .header("Content-Type", "application/x-ndjson")
            .body(body)
            .send()
            .await?;

        let result: Value = check_status(response).await?.json().await?;
        if result["errors"].as_bool().unwrap_or(false) {
            return Err(RepositoryError::Elastic {
                status: 400,
                message: first_bulk_error(&result),
            });
        }

        Ok(docs.len() as u64)
    }

    /// Run `query` against `index`, returning at most `size` sources.
    ///
    /// A missing index yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails or a hit cannot be deserialized.
    #[instrument(skip(self, query))]
    pub async fn search<T: DeserializeOwned>(
        &self,
        index: &str,
        query: Value,
        size: usize,
    ) -> Result<Vec<T>, RepositoryError> {
        let response = self
            .request(Method::POST, &format!("{index}/_search"))?
            .json(&json!({ "query": query, "size": size.min(MAX_SEARCH_SIZE) }))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        let result: Value = check_status(response).await?.json().await?;
        extract_sources(result)
    }

    /// Fetch a single document by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the source cannot be deserialized.
    pub async fn get<T: DeserializeOwned>(
        &self,
        index: &str,
        id: &str,
    ) -> Result<Option<T>, RepositoryError> {
        let response = self
            .authorized(Method::GET, self.doc_url(index, id, false)?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let mut result: Value = check_status(response).await?.json().await?;
        let source = result
            .get_mut("_source")
            .map(Value::take)
            .ok_or_else(|| RepositoryError::DataCorruption("document has no _source".to_owned()))?;

        Ok(Some(serde_json::from_value(source)?))
    }

    /// Delete a single document by ID. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete(&self, index: &str, id: &str) -> Result<bool, RepositoryError> {
        let response = self
            .authorized(Method::DELETE, self.doc_url(index, id, true)?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        check_status(response).await?;
        Ok(true)
    }

    /// Delete every document in `index` matching `query`.
    ///
    /// Returns the number of deleted documents; a missing index deletes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, query))]
    pub async fn delete_by_query(&self, index: &str, query: Value) -> Result<u64, RepositoryError> {
        let response = self
            .request(Method::POST, &format!("{index}/_delete_by_query?refresh=true"))?
            .json(&json!({ "query": query }))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(0);
        }

        let result: Value = check_status(response).await?.json().await?;
        Ok(result["deleted"].as_u64().unwrap_or(0))
    }

    /// Build a request for `path` relative to the base URL.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, RepositoryError> {
        let url = self.base_url.join(path)?;
        Ok(self.authorized(method, url))
    }

    /// Build a request for an absolute URL, with basic auth if configured.
    fn authorized(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);

        match &self.username {
            Some(username) => builder.basic_auth(
                username,
                self.password.as_ref().map(|p| p.expose_secret().to_owned()),
            ),
            None => builder,
        }
    }

    /// URL of a single document, with the ID percent-encoded as one path segment.
    fn doc_url(&self, index: &str, id: &str, refresh: bool) -> Result<Url, RepositoryError> {
        let mut url = self.base_url.join(&format!("{index}/_doc/"))?;
        url.path_segments_mut()
            .map_err(|()| {
                RepositoryError::DataCorruption("elasticsearch url cannot be a base".to_owned())
            })?
            .pop_if_empty()
            .push(id);

        if refresh {
            url.set_query(Some("refresh=wait_for"));
        }
        Ok(url)
    }
}

/// Turn a non-success response into `RepositoryError::Elastic`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RepositoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    Err(RepositoryError::Elastic {
        status: status.as_u16(),
        message,
    })
}

/// Serialize documents into an NDJSON `_bulk` body of `index` actions.
fn bulk_body<T: Serialize>(index: &str, docs: &[(String, T)]) -> Result<String, RepositoryError> {
    let mut body = String::new();
    for (id, doc) in docs {
        body.push_str(&serde_json::to_string(
            &json!({ "index": { "_index": index, "_id": id } }),
        )?);
        body.push('\n');
        body.push_str(&serde_json::to_string(doc)?);
        body.push('\n');
    }
    Ok(body)
}

/// Pull the first failure reason out of a `_bulk` response.
fn first_bulk_error(result: &Value) -> String {
    result["items"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|item| item["index"]["error"]["reason"].as_str())
        .next()
        .unwrap_or("bulk request reported errors")
        .to_owned()
}

/// Deserialize `hits.hits[]._source` from a search response.
fn extract_sources<T: DeserializeOwned>(mut result: Value) -> Result<Vec<T>, RepositoryError> {
    let Some(hits) = result["hits"]["hits"].as_array_mut() else {
        return Err(RepositoryError::DataCorruption(
            "search response has no hits".to_owned(),
        ));
    };

    hits.iter_mut()
        .map(|hit| {
            let source = hit.get_mut("_source").map(Value::take).ok_or_else(|| {
                RepositoryError::DataCorruption("search hit has no _source".to_owned())
            })?;
            Ok(serde_json::from_value(source)?)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Doc {
        name: String,
    }

    #[test]
    fn test_bulk_body_is_ndjson() {
        let docs = vec![
            ("1".to_owned(), Doc { name: "a".to_owned() }),
            ("2".to_owned(), Doc { name: "b".to_owned() }),
        ];

        let body = bulk_body("twitch_games", &docs).unwrap();
        let lines: Vec<&str> = body.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(body.ends_with('\n'));

        let action: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(action["index"]["_index"], "twitch_games");
        assert_eq!(action["index"]["_id"], "1");
        assert_eq!(lines[1], r#"{"name":"a"}"#);
    }

    #[test]
    fn test_first_bulk_error() {
        let result = json!({
            "errors": true,
            "items": [
                { "index": { "status": 201 } },
                { "index": { "status": 400, "error": { "reason": "mapper_parsing_exception" } } }
            ]
        });
        assert_eq!(first_bulk_error(&result), "mapper_parsing_exception");
        assert_eq!(
            first_bulk_error(&json!({ "errors": true })),
            "bulk request reported errors"
        );
    }

    #[test]
    fn test_extract_sources() {
        let result = json!({
            "hits": {
                "total": { "value": 2 },
                "hits": [
                    { "_id": "1", "_source": { "name": "a" } },
                    { "_id": "2", "_source": { "name": "b" } }
                ]
            }
        });

        let docs: Vec<Doc> = extract_sources(result).unwrap();
        assert_eq!(
            docs,
            vec![Doc { name: "a".to_owned() }, Doc { name: "b".to_owned() }]
        );
    }

    #[test]
    fn test_extract_sources_rejects_malformed_response() {
        let err = extract_sources::<Doc>(json!({ "took": 1 })).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    fn database() -> ElasticSearchDatabase {
        let config = ElasticConfig {
            url: Url::parse("http://localhost:9200").unwrap(),
            username: Some("elastic".to_owned()),
            password: Some(SecretString::from("pw")),
        };
        ElasticSearchDatabase::new(reqwest::Client::new(), &config)
    }

    #[test]
    fn test_doc_url_encodes_id() {
        let db = database();

        let url = db.doc_url("twitch_users", "a/b c", false).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9200/twitch_users/_doc/a%2Fb%20c");

        let url = db.doc_url("twitch_users", "shroud", true).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9200/twitch_users/_doc/shroud?refresh=wait_for"
        );
    }

    #[test]
    fn test_request_joins_base_url() {
        let db = database();

        let request = db
            .request(Method::POST, "lamoda_products/_search")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "http://localhost:9200/lamoda_products/_search"
        );
        assert!(request.headers().contains_key("authorization"));
    }
}
