use std::{net::IpAddr, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CaptchaConfig;

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// True only when the provider positively confirmed the token.
    async fn verify(&self, token: &str, remote_ip: Option<IpAddr>) -> bool;
}

#[derive(Debug, Serialize)]
struct SiteVerifyRequest<'a> {
    secret: &'a str,
    response: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    remoteip: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Cloudflare Turnstile siteverify client. Fails closed.
pub struct TurnstileVerifier {
    client: reqwest::Client,
    secret: String,
    verify_url: String,
}

impl TurnstileVerifier {
    pub fn new(cfg: &CaptchaConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build captcha http client")?;
        Ok(Self {
            client,
            secret: cfg.secret.clone(),
            verify_url: cfg.verify_url.clone(),
        })
    }

    async fn site_verify(
        &self,
        token: &str,
        remote_ip: Option<IpAddr>,
    ) -> anyhow::Result<SiteVerifyResponse> {
        let body = SiteVerifyRequest {
            secret: &self.secret,
            response: token,
            remoteip: remote_ip.map(|ip| ip.to_string()),
        };
        let resp = self
            .client
            .post(&self.verify_url)
            .json(&body)
            .send()
            .await
            .context("siteverify request")?
            .error_for_status()
            .context("siteverify status")?;
        resp.json::<SiteVerifyResponse>()
            .await
            .context("siteverify decode")
    }
}

#[async_trait]
impl CaptchaVerifier for TurnstileVerifier {
    async fn verify(&self, token: &str, remote_ip: Option<IpAddr>) -> bool {
        if token.trim().is_empty() {
            debug!("empty captcha token");
            return false;
        }
        match self.site_verify(token, remote_ip).await {
            Ok(res) if res.success => true,
            Ok(res) => {
                warn!(error_codes = ?res.error_codes, "captcha rejected");
                false
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "captcha verification failed");
                false
            }
        }
    }
}

/// Fixed answer; stands in for the provider in tests.
#[cfg(test)]
pub struct StaticCaptcha(pub bool);

#[cfg(test)]
#[async_trait]
impl CaptchaVerifier for StaticCaptcha {
    async fn verify(&self, token: &str, _remote_ip: Option<IpAddr>) -> bool {
        self.0 && !token.is_empty()
    }
}
