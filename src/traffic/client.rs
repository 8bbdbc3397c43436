use super::{CallTiming, HttpCallResponse, HttpCaller};
use crate::common::error::TransportError;
use crate::config::HttpClientConfig;
use crate::replay::model::OutgoingRequest;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// `HttpCaller` backed by a shared reqwest client
pub struct ReqwestCaller {
    client: reqwest::Client,
}

impl ReqwestCaller {
    pub fn new(config: &HttpClientConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.ssl_insecure)
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .deflate(true);

        let upstream = &config.upstream_proxy;
        if upstream.enabled && !upstream.url.is_empty() {
            log::info!("Replaying through upstream proxy: {}", upstream.url);
            let proxy = reqwest::Proxy::all(&upstream.url)
                .map_err(|e| TransportError::new(format!("Invalid proxy URL: {}", e)))?
                .no_proxy(reqwest::NoProxy::from_string(&upstream.bypass_domains));
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::new(format!("Failed to build client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpCaller for ReqwestCaller {
    async fn call(&self, request: &OutgoingRequest) -> Result<HttpCallResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| TransportError::new(format!("Invalid HTTP method: {}", request.method)))?;

        let mut request_builder = self.client.request(method, &request.url);

        for (key, value) in &request.headers {
            // Recomputed by the client from the actual body
            if key.eq_ignore_ascii_case("content-length") {
                continue;
            }
            request_builder = request_builder.header(key, value);
        }

        if let Some(body) = &request.body {
            request_builder = request_builder.body(body.clone());
        }

        let started = Instant::now();
        let response = request_builder.send().await?;
        let headers_elapsed = started.elapsed();

        let status = response.status();
        let mut headers = HashMap::new();
        let mut cookies = Vec::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                if *key == reqwest::header::SET_COOKIE {
                    cookies.push(v.to_string());
                }
                headers.insert(key.to_string(), v.to_string());
            }
        }

        let body = response.text().await?;
        let total = started.elapsed();

        log::debug!(
            "{} {} -> {} in {}ms",
            request.method,
            request.url,
            status.as_u16(),
            total.as_millis()
        );

        Ok(HttpCallResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
            timing: CallTiming {
                total: total.as_secs_f64() * 1000.0,
                first_byte: Some(headers_elapsed.as_secs_f64() * 1000.0),
                download: Some((total - headers_elapsed).as_secs_f64() * 1000.0),
                ..Default::default()
            },
            cookies,
        })
    }
}
