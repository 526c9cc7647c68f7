use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::repository::{ApplicationRow, ApplicationStore, StoreError, StoreProbe};
use crate::config::SupabaseConfig;

const UNDEFINED_TABLE_CODE: &str = "42P01";

/// PostgREST client for the hosted `applications` table.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    table: String,
}

impl SupabaseStore {
    pub fn new(config: &SupabaseConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(config.api_key.expose())?);
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", config.api_key.expose()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| StoreError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            table: config.table.clone(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    async fn rejection(&self, response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed: Option<Value> = serde_json::from_str(&body).ok();

        let code = parsed
            .as_ref()
            .and_then(|value| value.get("code"))
            .and_then(Value::as_str);
        if code == Some(UNDEFINED_TABLE_CODE) || status == StatusCode::NOT_FOUND {
            return StoreError::MissingTable(self.table.clone());
        }

        let message = parsed
            .as_ref()
            .and_then(|value| value.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(body);

        StoreError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl ApplicationStore for SupabaseStore {
    async fn insert(&self, row: &ApplicationRow) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=minimal")
            .json(&[row])
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.rejection(response).await)
        }
    }

    async fn probe(&self) -> Result<StoreProbe, StoreError> {
        let response = self
            .client
            .get(self.table_url())
            .query(&[("select", "*"), ("limit", "1")])
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(self.rejection(response).await);
        }

        let row_count = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_total);

        Ok(StoreProbe {
            table: self.table.clone(),
            row_count,
        })
    }

    fn backend(&self) -> &'static str {
        "supabase"
    }
}

fn header_value(raw: &str) -> Result<HeaderValue, StoreError> {
    HeaderValue::from_str(raw)
        .map_err(|_| StoreError::Transport("store credentials are not valid header values".to_string()))
}

/// `0-0/42` or `*/0` -> total after the slash.
fn parse_total(content_range: &str) -> Option<u64> {
    content_range
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
}
