//! Analytics backend REST client.
//!
//! Fetches time-ranged conversion and revenue metrics and tracks a single
//! loading/error state per client instance.
//!
//! # Example
//!
//! ```rust,ignore
//! use analytics_client::AnalyticsClient;
//!
//! let client = AnalyticsClient::from_env()?;
//!
//! let data = client
//!     .get_data_with_validation(Some("2024-01-01"), Some("2024-01-31"))
//!     .await?;
//! println!("{}", data.revenue_data);
//!
//! // Status is observable independently of any single call
//! let mut status = client.subscribe();
//! status.changed().await?;
//! println!("loading: {}", status.borrow().loading());
//! ```

pub mod error;
pub mod state;
pub mod testing;
pub mod transport;
pub mod types;

pub use error::{AnalyticsError, Result};
pub use state::FetchState;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use types::AllData;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, error};
use url::Url;

use state::{record_error, LoadingGuard};
use types::{CONVERSIONS_BY_LOCATION, CONVERSIONS_BY_SOURCE, REVENUE_BY_LOCATION};

/// Client for the analytics backend.
pub struct AnalyticsClient<T = ReqwestTransport> {
    transport: T,
    base_url: String,
    state: watch::Sender<FetchState>,
}

impl AnalyticsClient<ReqwestTransport> {
    /// Create from environment variable `ANALYTICS_API_BASE`.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("ANALYTICS_API_BASE")
            .map_err(|_| AnalyticsError::Config("ANALYTICS_API_BASE not set".into()))?;
        Ok(Self::new(ReqwestTransport::new(), base_url))
    }
}

impl<T: HttpTransport> AnalyticsClient<T> {
    /// Create a client issuing requests through `transport` against `base_url`.
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            transport,
            base_url: base_url.into(),
            state,
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Snapshot of the shared fetch state.
    pub fn state(&self) -> FetchState {
        self.state.borrow().clone()
    }

    /// Watch the shared fetch state as it changes.
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state.subscribe()
    }

    /// GET `endpoint` with the given query parameters and parse the JSON body.
    ///
    /// `None` parameters are left out of the query string.
    pub async fn fetch(&self, endpoint: &str, params: &[(&str, Option<&str>)]) -> Result<Value> {
        let guard = LoadingGuard::begin(&self.state);

        match self.request(endpoint, params).await {
            Ok(value) => Ok(value),
            Err(e) => {
                error!(endpoint, error = %e, "Failed to fetch");
                guard.fail(e.to_string());
                Err(e)
            }
        }
    }

    async fn request(&self, endpoint: &str, params: &[(&str, Option<&str>)]) -> Result<Value> {
        let url = build_url(&self.base_url, endpoint, params)?;
        debug!(%url, "Fetching analytics data");

        let resp = self.transport.get(&url).await?;
        if !resp.is_success() {
            return Err(AnalyticsError::Http {
                status: resp.status,
            });
        }

        Ok(serde_json::from_str(&resp.body)?)
    }

    /// Conversion data by location.
    pub async fn get_conversions_by_location(&self, start_date: &str, end_date: &str) -> Result<Value> {
        self.fetch(CONVERSIONS_BY_LOCATION, &date_params(start_date, end_date))
            .await
    }

    /// Revenue data by location.
    pub async fn get_revenue_by_location(&self, start_date: &str, end_date: &str) -> Result<Value> {
        self.fetch(REVENUE_BY_LOCATION, &date_params(start_date, end_date))
            .await
    }

    /// Conversion data by source/medium.
    pub async fn get_conversions_by_source(&self, start_date: &str, end_date: &str) -> Result<Value> {
        self.fetch(CONVERSIONS_BY_SOURCE, &date_params(start_date, end_date))
            .await
    }

    /// Fetch all three datasets concurrently.
    ///
    /// Fails fast: the first error wins and the remaining requests are
    /// dropped without their outcome being observed.
    pub async fn get_all_data(&self, start_date: &str, end_date: &str) -> Result<AllData> {
        let guard = LoadingGuard::begin(&self.state);

        let result = tokio::try_join!(
            self.get_conversions_by_location(start_date, end_date),
            self.get_revenue_by_location(start_date, end_date),
            self.get_conversions_by_source(start_date, end_date),
        );

        match result {
            Ok((session_data, revenue_data, source_data)) => Ok(AllData {
                session_data,
                revenue_data,
                source_data,
            }),
            Err(e) => {
                guard.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Like [`get_all_data`](Self::get_all_data), but rejects a missing or
    /// empty date before touching the network.
    pub async fn get_data_with_validation(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<AllData> {
        let (Some(start_date), Some(end_date)) = (present(start_date), present(end_date)) else {
            let err = AnalyticsError::missing_dates();
            record_error(&self.state, err.to_string());
            return Err(err);
        };

        self.get_all_data(start_date, end_date).await
    }
}

/// A date counts as supplied only when it is non-empty.
fn present(date: Option<&str>) -> Option<&str> {
    date.filter(|d| !d.is_empty())
}

fn date_params<'a>(start_date: &'a str, end_date: &'a str) -> [(&'static str, Option<&'a str>); 2] {
    [("startDate", Some(start_date)), ("endDate", Some(end_date))]
}

/// Join `base` and `endpoint` and append every present query parameter.
pub fn build_url(base: &str, endpoint: &str, params: &[(&str, Option<&str>)]) -> Result<Url> {
    let mut url = Url::parse(&format!("{}{}", base, endpoint))
        .map_err(|e| AnalyticsError::Config(format!("invalid URL {}{}: {}", base, endpoint, e)))?;

    let present: Vec<(&str, &str)> = params
        .iter()
        .filter_map(|(key, value)| value.map(|v| (*key, v)))
        .collect();

    // An empty pair list would still leave a trailing `?`
    if !present.is_empty() {
        url.query_pairs_mut().extend_pairs(present);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_rejects_missing_and_empty_dates() {
        assert_eq!(present(Some("2024-01-01")), Some("2024-01-01"));
        assert_eq!(present(Some("")), None);
        assert_eq!(present(None), None);
    }

    #[test]
    fn test_build_url_omits_missing_params() {
        let url = build_url(
            "https://api.example.com",
            "/analytics/revenue-by-location",
            &[("startDate", Some("2024-01-01")), ("endDate", None), ("region", None)],
        )
        .unwrap();

        let query = url.query().unwrap();
        assert_eq!(query, "startDate=2024-01-01");
        assert!(!query.contains("endDate"));
        assert!(!query.contains("null"));
        assert!(!query.contains("undefined"));
    }

    #[test]
    fn test_build_url_without_params_has_no_query() {
        let url = build_url("https://api.example.com", "/analytics/x", &[("a", None)]).unwrap();

        assert_eq!(url.query(), None);
        assert_eq!(url.as_str(), "https://api.example.com/analytics/x");
    }

    #[test]
    fn test_build_url_keeps_base_path_and_encodes_values() {
        let url = build_url(
            "https://api.example.com/v1",
            "/analytics/x",
            &[("q", Some("a b&c"))],
        )
        .unwrap();

        assert_eq!(url.path(), "/v1/analytics/x");
        assert_eq!(url.query(), Some("q=a+b%26c"));
    }

    #[test]
    fn test_build_url_rejects_relative_base() {
        let err = build_url("", "/analytics/x", &[]).unwrap_err();
        assert!(matches!(err, AnalyticsError::Config(_)));
    }
}
