use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use reqwest::redirect::Policy;
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use crate::core::constants::{http_status, network};
use crate::core::error::Result;
use crate::reporting::logging;

static DOMAIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-z0-9_](?:[a-z0-9_-]{0,61}[a-z0-9])?\.)+(?:[a-z]{2,63}|xn--[a-z0-9-]{1,59})$")
        .expect("domain pattern is valid")
});

/// Outcome of checking one reference URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlOutcome {
    /// The token is not a well-formed http(s) URL; no request was sent.
    InvalidSyntax,
    /// The request timed out or failed at the transport level.
    Unreachable(String),
    /// The server answered with this status code.
    Checked(u16),
}

impl UrlOutcome {
    /// Whether this outcome marks the reference as broken.
    ///
    /// Only statuses strictly above 400 count, and 401 is treated as a live
    /// page behind a login.
    pub fn is_flagged(&self) -> bool {
        match self {
            UrlOutcome::InvalidSyntax | UrlOutcome::Unreachable(_) => true,
            UrlOutcome::Checked(status) => {
                *status > http_status::FLAG_ABOVE && *status != http_status::UNAUTHORIZED
            }
        }
    }
}

impl fmt::Display for UrlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UrlOutcome::InvalidSyntax => write!(f, "malformed URL"),
            UrlOutcome::Unreachable(reason) => write!(f, "unreachable ({reason})"),
            UrlOutcome::Checked(status) => write!(f, "{status}"),
        }
    }
}

/// Parse `token` as an absolute http(s) URL with a plausible host.
///
/// Hosts must be an IP address, `localhost`, or a dotted domain name ending
/// in an alphabetic (or punycode) top-level label.
pub fn parse_reference_url(token: &str) -> Option<Url> {
    let url = Url::parse(token).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let host = url.host_str()?;
    let plausible = host.starts_with('[')
        || host.parse::<Ipv4Addr>().is_ok()
        || host == "localhost"
        || DOMAIN_PATTERN.is_match(host);

    plausible.then_some(url)
}

/// Transport used to fetch the status of a reference URL.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    /// Issue one request and return the response status, or a description
    /// of the transport failure.
    async fn fetch_status(&self, url: &Url, timeout: Duration) -> std::result::Result<u16, String>;
}

/// [`HttpProbe`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestProbe {
    client: reqwest::Client,
}

impl ReqwestProbe {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::limited(network::MAX_REDIRECTS))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn fetch_status(&self, url: &Url, timeout: Duration) -> std::result::Result<u16, String> {
        match self.client.get(url.clone()).timeout(timeout).send().await {
            Ok(response) => Ok(response.status().as_u16()),
            Err(err) => Err(std::error::Error::source(&err)
                .map(|e| e.to_string())
                .unwrap_or_else(|| err.to_string())),
        }
    }
}

/// Checks reference URLs one at a time under a per-URL time budget.
#[derive(Clone)]
pub struct UrlChecker {
    probe: Arc<dyn HttpProbe>,
    url_timeout: Duration,
}

impl UrlChecker {
    pub fn new(probe: Arc<dyn HttpProbe>, url_timeout: Duration) -> Self {
        Self { probe, url_timeout }
    }

    pub async fn check(&self, token: &str) -> UrlOutcome {
        let Some(url) = parse_reference_url(token) else {
            return UrlOutcome::InvalidSyntax;
        };

        let request = self.probe.fetch_status(&url, self.url_timeout);
        match tokio::time::timeout(self.url_timeout, request).await {
            Ok(Ok(status)) => UrlOutcome::Checked(status),
            Ok(Err(reason)) => UrlOutcome::Unreachable(reason),
            Err(_) => UrlOutcome::Unreachable("operation timed out".to_string()),
        }
    }

    /// Check `tokens` in order and report whether any of them is broken.
    ///
    /// A malformed or unreachable URL settles the answer immediately; status
    /// codes are accumulated over every token.
    pub async fn any_flagged<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        let mut flagged = false;
        for token in tokens {
            let token = token.as_ref();
            let outcome = self.check(token).await;
            logging::log_url_result(token, &outcome);

            match outcome {
                UrlOutcome::InvalidSyntax | UrlOutcome::Unreachable(_) => return true,
                checked => flagged = flagged || checked.is_flagged(),
            }
        }
        flagged
    }
}

impl fmt::Debug for UrlChecker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("UrlChecker")
            .field("url_timeout", &self.url_timeout)
            .finish_non_exhaustive()
    }
}
