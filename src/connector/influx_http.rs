//! InfluxDB v2 HTTP transport
//!
//! Speaks the v2 REST API with token authentication:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | health | `GET /health` |
//! | query | `POST /api/v2/query?org=` (annotated CSV response) |
//! | find organization | `GET /api/v2/orgs?org=` |
//! | find bucket | `GET /api/v2/buckets?name=` |
//! | create bucket | `POST /api/v2/buckets` |
//! | write | `POST /api/v2/write?org=&bucket=&precision=` |
//!
//! Non-2xx responses become [`ConnectorError::Backend`] with the status and
//! body verbatim. Nothing is retried.

use super::annotated_csv::parse_annotated_csv;
use super::error::{ConnectorError, ConnectorResult};
use super::transport::TimeSeriesTransport;
use crate::config::InfluxConfig;
use crate::flux::{Bucket, FluxTable, Organization, WritePrecision};
use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// HTTP transport for an InfluxDB v2 server
pub struct InfluxHttp {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct OrgsResponse {
    #[serde(default)]
    orgs: Vec<Organization>,
}

#[derive(Debug, Deserialize)]
struct BucketsResponse {
    #[serde(default)]
    buckets: Vec<Bucket>,
}

impl InfluxHttp {
    /// Create a transport without probing the server
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> ConnectorResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Create a transport from connection settings
    pub fn from_config(config: &InfluxConfig) -> ConnectorResult<Self> {
        Self::new(
            config.url(),
            config.token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Create a transport and check that the server answers
    pub async fn connect(config: &InfluxConfig) -> ConnectorResult<Self> {
        let http = Self::from_config(config)?;
        http.health_check().await?;
        tracing::info!(url = %http.base_url, "Connected to time-series backend");
        Ok(http)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe `/health`; any failure is a connection error
    pub async fn health_check(&self) -> ConnectorResult<()> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| ConnectorError::Connection(format!("{}: {}", self.base_url, e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ConnectorError::Connection(format!(
                "{}: health check returned {}",
                self.base_url,
                response.status()
            )))
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(header::AUTHORIZATION, format!("Token {}", self.token))
    }

    async fn send(&self, builder: RequestBuilder) -> ConnectorResult<Response> {
        let response = self.authorized(builder).send().await?;
        check_status(response).await
    }

    /// Like `send`, but a 404 means "no such resource"
    async fn send_optional(&self, builder: RequestBuilder) -> ConnectorResult<Option<Response>> {
        let response = self.authorized(builder).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        check_status(response).await.map(Some)
    }
}

async fn check_status(response: Response) -> ConnectorResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ConnectorError::Backend(format!("{}: {}", status, body)))
}

#[async_trait]
impl TimeSeriesTransport for InfluxHttp {
    async fn query(&self, flux: &str, organization: &str) -> ConnectorResult<Vec<FluxTable>> {
        let url = self.url(&format!(
            "/api/v2/query?org={}",
            urlencoding::encode(organization)
        ));
        let body = serde_json::json!({
            "query": flux,
            "type": "flux",
            "dialect": {
                "header": true,
                "annotations": ["datatype", "group", "default"],
            },
        });

        let response = self
            .send(
                self.client
                    .post(url)
                    .header(header::ACCEPT, "application/csv")
                    .json(&body),
            )
            .await?;

        parse_annotated_csv(&response.text().await?)
    }

    async fn find_organization(&self, name: &str) -> ConnectorResult<Option<Organization>> {
        let url = self.url(&format!("/api/v2/orgs?org={}", urlencoding::encode(name)));
        let response = match self.send_optional(self.client.get(url)).await? {
            Some(response) => response,
            None => return Ok(None),
        };

        let orgs: OrgsResponse = serde_json::from_str(&response.text().await?)?;
        Ok(orgs.orgs.into_iter().find(|org| org.name == name))
    }

    async fn find_bucket(&self, name: &str) -> ConnectorResult<Option<Bucket>> {
        let url = self.url(&format!("/api/v2/buckets?name={}", urlencoding::encode(name)));
        let response = match self.send_optional(self.client.get(url)).await? {
            Some(response) => response,
            None => return Ok(None),
        };

        let buckets: BucketsResponse = serde_json::from_str(&response.text().await?)?;
        Ok(buckets.buckets.into_iter().find(|bucket| bucket.name == name))
    }

    async fn create_bucket(&self, name: &str, org_id: Option<&str>) -> ConnectorResult<Bucket> {
        let mut body = serde_json::json!({
            "name": name,
            "retentionRules": [],
        });
        if let Some(org_id) = org_id {
            body["orgID"] = serde_json::Value::String(org_id.to_string());
        }

        let response = self
            .send(self.client.post(self.url("/api/v2/buckets")).json(&body))
            .await?;

        Ok(serde_json::from_str(&response.text().await?)?)
    }

    async fn write(
        &self,
        lines: &[String],
        bucket: &str,
        organization: &str,
        precision: WritePrecision,
    ) -> ConnectorResult<()> {
        let url = self.url(&format!(
            "/api/v2/write?org={}&bucket={}&precision={}",
            urlencoding::encode(organization),
            urlencoding::encode(bucket),
            precision
        ));

        self.send(
            self.client
                .post(url)
                .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(lines.join("\n")),
        )
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response and hand back the raw request
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).to_string()
        });

        (url, handle)
    }

    fn transport(url: &str) -> InfluxHttp {
        InfluxHttp::new(url, "secret", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_health_check_ok() {
        let (url, server) = serve_once("200 OK", r#"{"status":"pass"}"#).await;
        transport(&url).health_check().await.unwrap();
        assert!(server.await.unwrap().starts_with("GET /health "));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = transport(&url).health_check().await.unwrap_err();
        assert!(matches!(err, ConnectorError::Connection(_)));
    }

    #[tokio::test]
    async fn test_query_sends_token_and_parses_csv() {
        let csv = "#datatype,string,long,dateTime:RFC3339,double,string\n\
                   #default,_result,,,,\n\
                   ,result,table,_time,_value,_field\n\
                   ,,0,2024-01-01T00:00:00Z,1.5,usage\n";
        let (url, server) = serve_once("200 OK", csv).await;

        let tables = transport(&url)
            .query("from(bucket: \"m\")", "my org")
            .await
            .unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].records[0].field, "usage");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/v2/query?org=my%20org "));
        assert!(request.to_lowercase().contains("authorization: token secret"));
        assert!(request.contains("from(bucket: \\\"m\\\")"));
    }

    #[tokio::test]
    async fn test_missing_bucket_is_none() {
        let (url, server) = serve_once("404 Not Found", r#"{"code":"not found"}"#).await;
        assert!(transport(&url).find_bucket("metrics").await.unwrap().is_none());
        assert!(server.await.unwrap().starts_with("GET /api/v2/buckets?name=metrics "));
    }

    #[tokio::test]
    async fn test_find_organization() {
        let (url, _server) =
            serve_once("200 OK", r#"{"orgs":[{"id":"0a1","name":"acme"}]}"#).await;
        let org = transport(&url).find_organization("acme").await.unwrap();
        assert_eq!(org, Some(Organization::new("0a1", "acme")));
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let (url, _server) = serve_once("401 Unauthorized", "token invalid").await;
        let err = transport(&url)
            .write(&["point value=1 1".to_string()], "m", "acme", WritePrecision::S)
            .await
            .unwrap_err();

        match err {
            ConnectorError::Backend(message) => {
                assert_eq!(message, "401 Unauthorized: token invalid")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_write_targets_bucket_with_precision() {
        let (url, server) = serve_once("200 OK", "").await;
        transport(&url)
            .write(
                &["point,host=a value=42 1700000000".to_string()],
                "metrics",
                "acme",
                WritePrecision::S,
            )
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/v2/write?org=acme&bucket=metrics&precision=s "));
        assert!(request.ends_with("point,host=a value=42 1700000000"));
    }
}
