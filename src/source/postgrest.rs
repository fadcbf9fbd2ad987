//! PostgREST (Supabase) data source.
//!
//! Tables: `sets`, `card_stats`, `archetype_stats`, `format_balance`.
//! Results are paged with `Range` headers until a short page comes back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RANGE, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use super::{DataSource, SetInfo, SourceError};
use crate::calculate::balance::SetBalance;
use crate::config::{ConfigError, SourceConfig};
use crate::models::{Format, RawCardRow, RawDeckRow};

/// PostgREST `in` filter over quoted values.
fn in_filter(values: &[String]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|v| format!("\"{}\"", v.replace('"', "")))
        .collect();
    format!("in.({})", quoted.join(","))
}

fn eq(value: &str) -> String {
    format!("eq.{}", value.trim())
}

/// HTTP client for the hosted statistics tables.
pub struct PostgrestSource {
    client: Client,
    base_url: Url,
    page_size: u32,
}

impl PostgrestSource {
    pub fn new(
        base_url: Url,
        api_key: Option<&str>,
        timeout: Duration,
        page_size: u32,
    ) -> Result<Self, SourceError> {
        if base_url.cannot_be_a_base() {
            return Err(SourceError::InvalidUrl(base_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("limitless-meta/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(key) = api_key {
            let invalid = || {
                ConfigError::ValidationError(
                    "API key contains invalid header characters".to_string(),
                )
            };
            let apikey = HeaderValue::from_str(key).map_err(|_| invalid())?;
            let bearer = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|_| invalid())?;
            headers.insert("apikey", apikey);
            headers.insert(AUTHORIZATION, bearer);
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            page_size: page_size.max(1),
        })
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self, SourceError> {
        Self::new(
            config.url()?,
            config.resolve_api_key().as_deref(),
            config.timeout()?,
            config.page_size,
        )
    }

    /// `<base>/<table>?<filters>`
    fn table_url(&self, table: &str, filters: &[(&str, String)]) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(table);
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in filters {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// GET every page of a query.
    async fn get_all<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, SourceError> {
        let page = u64::from(self.page_size);
        let mut rows = Vec::new();
        let mut offset: u64 = 0;

        loop {
            let range = format!("{}-{}", offset, offset + page - 1);
            debug!("GET {} (rows {})", url, range);

            let response = self
                .client
                .get(url.clone())
                .header("Range-Unit", "items")
                .header(RANGE, range)
                .send()
                .await?;

            let status = response.status();
            // Asking past the last row of an exact multiple of the page size
            if status == StatusCode::RANGE_NOT_SATISFIABLE && offset > 0 {
                break;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = if body.is_empty() {
                    status.canonical_reason().unwrap_or("Unknown").to_string()
                } else {
                    body
                };
                return Err(SourceError::HttpStatus {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let batch: Vec<T> = serde_json::from_str(&body)?;
            let fetched = batch.len() as u64;
            rows.extend(batch);

            if fetched < page {
                break;
            }
            offset += page;
        }

        Ok(rows)
    }
}

#[async_trait]
impl DataSource for PostgrestSource {
    fn name(&self) -> &'static str {
        "postgrest"
    }

    async fn sets(&self) -> Result<Vec<SetInfo>, SourceError> {
        let url = self.table_url(
            "sets",
            &[
                ("select", "code,name,active,start_date".to_string()),
                ("active", "eq.true".to_string()),
                ("order", "start_date.desc".to_string()),
            ],
        )?;
        self.get_all(url).await
    }

    async fn card_rows(
        &self,
        set_code: &str,
        format: &Format,
        contexts: &[String],
    ) -> Result<Vec<RawCardRow>, SourceError> {
        let url = self.table_url(
            "card_stats",
            &[
                ("select", "*".to_string()),
                ("set_code", eq(set_code)),
                ("format", eq(format.as_str())),
                ("filter_context", in_filter(contexts)),
            ],
        )?;
        let rows: Vec<RawCardRow> = self.get_all(url).await?;
        info!(
            "Fetched {} card rows for {}/{} {:?}",
            rows.len(),
            set_code,
            format,
            contexts
        );
        Ok(rows)
    }

    async fn card_contexts(
        &self,
        set_code: &str,
        format: &Format,
        card_name: &str,
    ) -> Result<Vec<RawCardRow>, SourceError> {
        let url = self.table_url(
            "card_stats",
            &[
                ("select", "*".to_string()),
                ("set_code", eq(set_code)),
                ("format", eq(format.as_str())),
                ("card_name", eq(card_name)),
            ],
        )?;
        self.get_all(url).await
    }

    async fn deck_rows(
        &self,
        set_code: &str,
        format: &Format,
    ) -> Result<Vec<RawDeckRow>, SourceError> {
        let url = self.table_url(
            "archetype_stats",
            &[
                ("select", "*".to_string()),
                ("set_code", eq(set_code)),
                ("format", eq(format.as_str())),
                ("order", "win_rate.desc".to_string()),
            ],
        )?;
        let rows: Vec<RawDeckRow> = self.get_all(url).await?;
        info!("Fetched {} archetype rows for {}/{}", rows.len(), set_code, format);
        Ok(rows)
    }

    async fn format_balance(&self, format: &Format) -> Result<Vec<SetBalance>, SourceError> {
        let url = self.table_url(
            "format_balance",
            &[("select", "*".to_string()), ("format", eq(format.as_str()))],
        )?;
        self.get_all(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn source(base: &str, page_size: u32) -> PostgrestSource {
        PostgrestSource::new(
            Url::parse(base).unwrap(),
            Some("anon-key"),
            Duration::from_secs(5),
            page_size,
        )
        .unwrap()
    }

    /// Serve canned responses, one per connection, returning the raw requests.
    async fn serve(responses: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/rest/v1", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !String::from_utf8_lossy(&buf).contains("\r\n\r\n") {
                    let n = socket.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
                requests.push(String::from_utf8_lossy(&buf).to_string());

                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
            requests
        });

        (base, handle)
    }

    #[test]
    fn test_in_filter() {
        assert_eq!(
            in_filter(&["WU".to_string(), "UW".to_string()]),
            "in.(\"WU\",\"UW\")"
        );
    }

    #[test]
    fn test_table_url() {
        let source = source("https://example.supabase.co/rest/v1/", 1000);
        let url = source
            .table_url(
                "card_stats",
                &[("set_code", eq("TLA")), ("format", eq(" PremierDraft "))],
            )
            .unwrap();

        assert_eq!(url.path(), "/rest/v1/card_stats");
        assert_eq!(url.query(), Some("set_code=eq.TLA&format=eq.PremierDraft"));
    }

    #[test]
    fn test_from_config_rejects_bad_timeout() {
        let config = SourceConfig {
            timeout: "never".to_string(),
            ..SourceConfig::default()
        };
        assert!(matches!(
            PostgrestSource::from_config(&config),
            Err(SourceError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_deck_rows_sends_auth_and_filters() {
        let body = r#"[{"archetype_name":"All Decks","win_rate":"55.2","games_count":9000},
                       {"archetype_name":"Azorius (WU)","colors":"WU","win_rate":57.1,"games_count":"1200"}]"#;
        let (base, server) = serve(vec![(200, body.to_string())]).await;

        let rows = source(&base, 1000)
            .deck_rows("TLA", &Format::PremierDraft)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].win_rate, Some(55.2));
        assert_eq!(rows[1].games_count, Some(1200));

        let requests = server.await.unwrap();
        let request = requests[0].to_lowercase();
        assert!(request.starts_with("get /rest/v1/archetype_stats?"));
        assert!(request.contains("set_code=eq.tla"));
        assert!(request.contains("apikey: anon-key"));
        assert!(request.contains("authorization: bearer anon-key"));
        assert!(request.contains("range: 0-999"));
    }

    #[tokio::test]
    async fn test_pages_until_short_page() {
        let full = r#"[{"card_name":"A"},{"card_name":"B"}]"#.to_string();
        let short = r#"[{"card_name":"C"}]"#.to_string();
        let (base, server) = serve(vec![(200, full), (200, short)]).await;

        let rows = source(&base, 2)
            .card_rows("TLA", &Format::PremierDraft, &["Global".to_string()])
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);

        let requests = server.await.unwrap();
        assert!(requests[1].to_lowercase().contains("range: 2-3"));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let (base, _server) =
            serve(vec![(401, r#"{"message":"Invalid API key"}"#.to_string())]).await;

        let err = source(&base, 1000)
            .sets()
            .await
            .unwrap_err();
        match err {
            SourceError::HttpStatus { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("Invalid API key"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
