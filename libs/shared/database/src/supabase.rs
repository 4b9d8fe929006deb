use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, RequestBuilder,
};
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{Collection, Document, Fields, StoreError};

use crate::gateway::{Predicate, Query, StoreGateway};

/// Store gateway backed by a Supabase (PostgREST) project.
///
/// Every collection maps to a table under `/rest/v1/`; documents are rows with
/// a text `id` column.
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    anon_key: String,
    service_token: Option<String>,
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
            service_token: config.supabase_service_token.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&self.anon_key)
            .map_err(|e| StoreError::Permission(format!("invalid api key: {}", e)))?;
        headers.insert("apikey", api_key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let token = self.service_token.as_deref().unwrap_or(&self.anon_key);
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| StoreError::Permission(format!("invalid bearer token: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);

        Ok(headers)
    }

    fn table_url(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection.as_str())
    }

    fn request(&self, method: Method, collection: Collection) -> Result<RequestBuilder, StoreError> {
        let url = self.table_url(collection);
        debug!("Making {} request to {}", method, url);
        Ok(self.client.request(method, &url).headers(self.get_headers()?))
    }

    /// Sends the request and decodes the row array PostgREST answers with.
    async fn send(
        &self,
        req: RequestBuilder,
        collection: Collection,
        id: Option<&str>,
    ) -> Result<Vec<Value>, StoreError> {
        let response = req
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => StoreError::Permission(error_text),
                404 => StoreError::not_found(collection.as_str(), id.unwrap_or_default()),
                code => StoreError::Backend {
                    status: code,
                    message: error_text,
                },
            });
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::mapping(format!("unexpected response body: {}", e)))
    }
}

fn filter_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn predicate_param(predicate: &Predicate) -> (String, String) {
    (
        predicate.field().to_string(),
        format!("{}.{}", predicate.operator(), filter_value(predicate.value())),
    )
}

/// Renders a query into PostgREST query-string pairs.
pub fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = query.predicates.iter().map(predicate_param).collect();

    if !query.order_by.is_empty() {
        let order = query
            .order_by
            .iter()
            .map(|key| format!("{}.{}", key.field, if key.descending { "desc" } else { "asc" }))
            .collect::<Vec<_>>()
            .join(",");
        params.push(("order".to_string(), order));
    }

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

fn row_to_document(row: Value) -> Result<Document, StoreError> {
    let mut fields = match row {
        Value::Object(map) => map,
        other => return Err(StoreError::mapping(format!("row is not an object: {}", other))),
    };

    let id = match fields.remove("id") {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(StoreError::mapping("row has no id column")),
    };

    Ok(Document::new(id, fields))
}

#[async_trait]
impl StoreGateway for SupabaseStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let req = self
            .request(Method::GET, collection)?
            .query(&[("id", format!("eq.{}", id)), ("limit", "1".to_string())]);

        let rows = self.send(req, collection, Some(id)).await?;
        rows.into_iter().next().map(row_to_document).transpose()
    }

    async fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Document>, StoreError> {
        let req = self
            .request(Method::GET, collection)?
            .query(&query_params(query));

        let rows = self.send(req, collection, None).await?;
        rows.into_iter().map(row_to_document).collect()
    }

    async fn create(&self, collection: Collection, fields: Fields) -> Result<String, StoreError> {
        let generated_id = Uuid::new_v4().to_string();
        let mut body = fields;
        body.insert("id".to_string(), Value::String(generated_id.clone()));

        let req = self
            .request(Method::POST, collection)?
            .json(&Value::Object(body));

        let rows = self.send(req, collection, None).await?;
        match rows.into_iter().next() {
            Some(row) => Ok(row_to_document(row)?.id),
            None => {
                debug!("Insert into {} returned no representation", collection);
                Ok(generated_id)
            }
        }
    }

    async fn update(&self, collection: Collection, id: &str, delta: Fields) -> Result<(), StoreError> {
        let req = self
            .request(Method::PATCH, collection)?
            .query(&[("id", format!("eq.{}", id))])
            .json(&Value::Object(delta));

        let rows = self.send(req, collection, Some(id)).await?;
        if rows.is_empty() {
            return Err(StoreError::not_found(collection.as_str(), id));
        }
        Ok(())
    }

    async fn update_if(
        &self,
        collection: Collection,
        id: &str,
        condition: &Predicate,
        delta: Fields,
    ) -> Result<bool, StoreError> {
        let req = self
            .request(Method::PATCH, collection)?
            .query(&[("id".to_string(), format!("eq.{}", id)), predicate_param(condition)])
            .json(&Value::Object(delta));

        let rows = self.send(req, collection, Some(id)).await?;
        if !rows.is_empty() {
            return Ok(true);
        }

        // No row matched: either the condition failed or the row is gone.
        match self.get(collection, id).await? {
            Some(_) => Ok(false),
            None => Err(StoreError::not_found(collection.as_str(), id)),
        }
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let req = self
            .request(Method::DELETE, collection)?
            .query(&[("id", format!("eq.{}", id))]);

        let rows = self.send(req, collection, Some(id)).await?;
        if rows.is_empty() {
            return Err(StoreError::not_found(collection.as_str(), id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_params_rendering() {
        let query = Query::new()
            .filter_eq("doctorId", "d1")
            .filter_eq("isBooked", false)
            .filter_lt("date", "2025-01-01")
            .order_by("date")
            .order_by_desc("time")
            .limit(10);

        let params = query_params(&query);
        assert_eq!(
            params,
            vec![
                ("doctorId".to_string(), "eq.d1".to_string()),
                ("isBooked".to_string(), "eq.false".to_string()),
                ("date".to_string(), "lt.2025-01-01".to_string()),
                ("order".to_string(), "date.asc,time.desc".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_row_to_document() {
        let doc = row_to_document(json!({ "id": "s1", "isBooked": true })).unwrap();
        assert_eq!(doc.id, "s1");
        assert!(doc.fields.get("id").is_none());

        let numeric = row_to_document(json!({ "id": 7 })).unwrap();
        assert_eq!(numeric.id, "7");

        assert!(row_to_document(json!({ "name": "x" })).is_err());
        assert!(row_to_document(json!([1, 2])).is_err());
    }
}
