// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decision oracle: the remote endpoint that judges whether a window is
//! aligned with the declared focus purpose.
//!
//! The wire contract is deliberately thin: one request, one text response,
//! scanned case-insensitively for `BLOCK`. Failure semantics (fail open,
//! no caching) live in the enforcer.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Serialize;

/// Deadline for a single oracle call.
pub const ORACLE_DEADLINE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Block,
}

pub type DecideFuture<'a> =
    Pin<Box<dyn Future<Output = anyhow::Result<Verdict>> + Send + 'a>>;

pub trait DecisionOracle: Send + Sync + 'static {
    fn decide<'a>(&'a self, purpose: &'a str, app_class: &'a str, title: &'a str)
        -> DecideFuture<'a>;
}

/// Parse the oracle's answer: any occurrence of `block`, case-insensitive,
/// blocks; everything else allows.
pub fn parse_verdict(text: &str) -> Verdict {
    if text.to_lowercase().contains("block") {
        Verdict::Block
    } else {
        Verdict::Allow
    }
}

#[derive(Debug, Serialize)]
struct DecideRequest<'a> {
    purpose: &'a str,
    app_class: &'a str,
    title: &'a str,
}

/// Network-backed oracle.
pub struct HttpOracle {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpOracle {
    pub fn new(url: impl Into<String>, token: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(ORACLE_DEADLINE).build()?;
        Ok(Self { client, url: url.into(), token })
    }
}

impl DecisionOracle for HttpOracle {
    fn decide<'a>(
        &'a self,
        purpose: &'a str,
        app_class: &'a str,
        title: &'a str,
    ) -> DecideFuture<'a> {
        Box::pin(async move {
            let mut req = self
                .client
                .post(&self.url)
                .json(&DecideRequest { purpose, app_class, title });
            if let Some(token) = &self.token {
                req = req.bearer_auth(token);
            }
            let resp = req.send().await?;
            if !resp.status().is_success() {
                anyhow::bail!("oracle returned {}", resp.status());
            }
            let text = resp.text().await?;
            Ok(parse_verdict(&text))
        })
    }
}

/// Oracle used when no endpoint is configured: everything is aligned.
pub struct NullOracle;

impl DecisionOracle for NullOracle {
    fn decide<'a>(
        &'a self,
        _purpose: &'a str,
        _app_class: &'a str,
        _title: &'a str,
    ) -> DecideFuture<'a> {
        Box::pin(async { Ok(Verdict::Allow) })
    }
}

#[cfg(test)]
#[path = "oracle_tests.rs"]
mod tests;
