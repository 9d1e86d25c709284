use std::time::Duration;

use reqwest::Url;
use serde_json::Value;

use crate::api::response::PolicyResponse;
use crate::config::Config;
use crate::core::constants::{api, timeouts};
use crate::core::{CpdbError, Dataset, Result};

/// Query against the Climate Policy Database API.
///
/// Setters replace earlier values; list setters join their items with commas
/// when the request is marshalled.
#[derive(Debug, Clone)]
pub struct PolicyRequest {
    api_url: String,
    user: String,
    password: String,
    country: Option<String>,
    decision_dates: Vec<String>,
    status: Option<String>,
    sectors: Vec<String>,
    policy_instruments: Vec<String>,
    mitigation_areas: Vec<String>,
    raw_query: Option<String>,
}

impl Default for PolicyRequest {
    fn default() -> Self {
        Self::new(api::DEFAULT_API_URL)
    }
}

impl PolicyRequest {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            user: String::new(),
            password: String::new(),
            country: None,
            decision_dates: Vec::new(),
            status: None,
            sectors: Vec::new(),
            policy_instruments: Vec::new(),
            mitigation_areas: Vec::new(),
            raw_query: None,
        }
    }

    /// Request pre-filled from the `[api]` section of the configuration.
    pub fn from_config(config: &Config) -> Self {
        let settings = &config.api;
        let mut request = Self::new(config.api_url());

        if let Some(ref user) = settings.user {
            request.set_api_user(user);
        }
        if let Some(ref password) = settings.password {
            request.set_api_password(password);
        }
        if let Some(ref country) = settings.country {
            request.set_country(country);
        }
        if let Some(ref dates) = settings.decision_dates {
            request.set_decision_dates(dates);
        }
        if let Some(ref status) = settings.status {
            request.set_status(status);
        }
        if let Some(ref sectors) = settings.sectors {
            request.add_sectors(sectors);
        }
        if let Some(ref instruments) = settings.policy_instruments {
            request.add_policy_instruments(instruments);
        }
        if let Some(ref areas) = settings.mitigation_areas {
            request.add_mitigation_areas(areas);
        }

        request
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn set_api_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.api_url = url.into();
        self
    }

    pub fn set_api_user(&mut self, user: impl Into<String>) -> &mut Self {
        self.user = user.into();
        self
    }

    pub fn set_api_password(&mut self, password: impl Into<String>) -> &mut Self {
        self.password = password.into();
        self
    }

    /// ISO country code, e.g. `DEU`.
    pub fn set_country(&mut self, country: impl Into<String>) -> &mut Self {
        self.country = Some(country.into());
        self
    }

    /// Single decision year.
    pub fn set_decision_date(&mut self, year: impl ToString) -> &mut Self {
        self.decision_dates = vec![year.to_string()];
        self
    }

    pub fn set_decision_dates<S: ToString>(&mut self, years: impl IntoIterator<Item = S>) -> &mut Self {
        self.decision_dates = years.into_iter().map(|year| year.to_string()).collect();
        self
    }

    /// One of `draft`, `ended`, `in force`, `planned`, `superseded`,
    /// `under review`, `unknown`. Stored lower-cased.
    pub fn set_status(&mut self, status: &str) -> &mut Self {
        self.status = Some(status.to_lowercase());
        self
    }

    pub fn add_sectors<S: AsRef<str>>(&mut self, sectors: impl IntoIterator<Item = S>) -> &mut Self {
        self.sectors = collect_strings(sectors);
        self
    }

    /// Grouped instruments are expanded server-side.
    pub fn add_policy_instruments<S: AsRef<str>>(
        &mut self,
        instruments: impl IntoIterator<Item = S>,
    ) -> &mut Self {
        self.policy_instruments = collect_strings(instruments);
        self
    }

    pub fn add_mitigation_areas<S: AsRef<str>>(&mut self, areas: impl IntoIterator<Item = S>) -> &mut Self {
        self.mitigation_areas = collect_strings(areas);
        self
    }

    /// Send `query` verbatim instead of the marshalled filters.
    pub fn set_raw_query(&mut self, query: impl Into<String>) -> &mut Self {
        self.raw_query = Some(query.into());
        self
    }

    pub fn raw_query(&self) -> Option<&str> {
        self.raw_query.as_deref()
    }

    /// Query parameters in API order. Unset filters are omitted, and nothing
    /// is produced while a raw query is set.
    pub fn marshal(&self) -> Vec<(&'static str, String)> {
        if self.raw_query.is_some() {
            return Vec::new();
        }

        let mut params = Vec::new();
        let mut push = |key: &'static str, value: String| {
            if !value.is_empty() {
                params.push((key, value));
            }
        };

        push("country_iso", self.country.clone().unwrap_or_default());
        push("decision_date", self.decision_dates.join(","));
        push("status", self.status.clone().unwrap_or_default());
        push("sectors", self.sectors.join(","));
        push("policy_instruments", self.policy_instruments.join(","));
        push("mitigation_areas", self.mitigation_areas.join(","));

        params
    }

    /// Full request URL including the query string.
    pub fn url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.api_url).map_err(|e| {
            CpdbError::Config(format!("API URL '{}' is not a valid URL: {e}", self.api_url))
        })?;

        match self.raw_query {
            Some(ref query) => url.set_query(Some(query.trim_start_matches('?'))),
            None => {
                let params = self.marshal();
                if !params.is_empty() {
                    url.query_pairs_mut().extend_pairs(params);
                }
            }
        }

        Ok(url)
    }

    /// Send the request with basic authentication and decode the policies.
    pub async fn issue(&self) -> Result<PolicyResponse> {
        let url = self.url()?;
        log::info!("Requesting policies from {}", self.api_url);
        log::debug!("Policy query: {}", url.query().unwrap_or_default());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts::API_TIMEOUT_SECONDS))
            .build()?;

        let raw: Value = client
            .get(url)
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let dataset = Dataset::from_json_records(&raw)?;
        Ok(PolicyResponse::new(raw, dataset))
    }
}

fn collect_strings<S: AsRef<str>>(items: impl IntoIterator<Item = S>) -> Vec<String> {
    items.into_iter().map(|item| item.as_ref().to_string()).collect()
}
