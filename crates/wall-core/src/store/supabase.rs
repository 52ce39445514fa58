//! Supabase (PostgREST) note store.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::NoteStore;
use crate::config::BoardConfig;
use crate::models::{NewNote, Note, NoteId};
use crate::util::compact_text;
use crate::{Error, Result};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Notes table accessed through the project's REST endpoint.
#[derive(Clone)]
pub struct SupabaseNoteStore {
    table_url: String,
    anon_key: String,
    client: Client,
}

impl SupabaseNoteStore {
    pub fn new(config: &BoardConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            table_url: config.rest_table_url(),
            anon_key: config.supabase_anon_key.clone(),
            client,
        })
    }

    fn public_request(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .header("Accept", "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.public_request(request).send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(Error::Api(parse_api_error(status, &body)))
    }
}

impl NoteStore for SupabaseNoteStore {
    async fn list(&self) -> Result<Vec<Note>> {
        let request = self
            .client
            .get(&self.table_url)
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let notes = self.send(request).await?.json::<Vec<Note>>().await?;
        tracing::debug!("Fetched {} notes", notes.len());
        Ok(notes)
    }

    async fn insert(&self, note: &NewNote) -> Result<Note> {
        let request = self
            .client
            .post(&self.table_url)
            .header("Prefer", "return=representation")
            .json(&[note]);
        let mut rows = self.send(request).await?.json::<Vec<Note>>().await?;
        if rows.is_empty() {
            return Err(Error::Api(
                "Insert response did not include the created row".to_string(),
            ));
        }
        let created = rows.swap_remove(0);
        tracing::debug!("Created note {}", created.id);
        Ok(created)
    }

    async fn delete(&self, id: &NoteId) -> Result<()> {
        let filter = format!("eq.{id}");
        let request = self
            .client
            .delete(&self.table_url)
            .query(&[("id", filter.as_str())]);
        self.send(request).await?;
        tracing::debug!("Deleted note {}", id);
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorResponse {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
    error: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<PostgrestErrorResponse>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            let extra = payload.details.or(payload.hint).filter(|s| !s.trim().is_empty());
            return match extra {
                Some(extra) => format!(
                    "{}: {} ({})",
                    message.trim(),
                    extra.trim(),
                    status.as_u16()
                ),
                None => format!("{} ({})", message.trim(), status.as_u16()),
            };
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", compact_text(trimmed), status.as_u16())
    }
}
