//! Outgoing HTTP calls.
//!
//! Replay never opens connections itself; it hands each `OutgoingRequest` to
//! an injected `HttpCaller`. `ReqwestCaller` is the stock implementation.

use crate::common::error::TransportError;
use crate::common::models::{ResponseSnapshot, ResponseTiming};
use crate::common::utils::now_millis;
use crate::replay::model::OutgoingRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod client;

pub use client::ReqwestCaller;

/// Timing reported by an `HttpCaller`, in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTiming {
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_byte: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpCallResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub timing: CallTiming,
    /// Raw `Set-Cookie` values
    #[serde(default)]
    pub cookies: Vec<String>,
}

impl HttpCallResponse {
    /// Freeze the response into a snapshot stamped with the current time
    pub fn into_snapshot(self) -> ResponseSnapshot {
        ResponseSnapshot {
            status: self.status,
            status_text: self.status_text,
            headers: self.headers,
            body: self.body,
            timing: ResponseTiming {
                total: self.timing.total,
                dns: self.timing.dns,
                connect: self.timing.connect,
                tls: self.timing.tls,
                ttfb: self.timing.first_byte,
                download: self.timing.download,
            },
            timestamp: now_millis(),
        }
    }
}

/// Performs one HTTP exchange.
///
/// Implementations must eventually resolve; replay does not impose its own
/// timeout or cancel an in-flight call.
#[async_trait]
pub trait HttpCaller: Send + Sync {
    async fn call(&self, request: &OutgoingRequest) -> Result<HttpCallResponse, TransportError>;
}
