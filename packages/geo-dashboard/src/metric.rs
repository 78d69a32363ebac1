//! Metric-to-visual mapping for city markers.
//!
//! Every function here is pure: a city collection and a metric key go in,
//! colours, radii and labels come out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::format::ValueFormatter;

/// Ratio above which a value is drawn in the high tier.
pub const HIGH_TIER_RATIO: f64 = 0.66;

/// Ratio above which a value is drawn in the mid tier.
pub const MID_TIER_RATIO: f64 = 0.33;

/// Smallest marker radius, used for a value of zero.
pub const BASE_RADIUS: f64 = 8.0;

/// Radius added at the collection maximum.
pub const RADIUS_SPREAD: f64 = 12.0;

/// A city with its metrics for the selected date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub transactions: f64,
    #[serde(default)]
    pub sessions: f64,
    /// Conversion rate on a 0–100 scale
    #[serde(default)]
    pub conversion_rate: f64,
}

impl City {
    /// Create a city with all metrics at zero.
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
            revenue: 0.0,
            transactions: 0.0,
            sessions: 0.0,
            conversion_rate: 0.0,
        }
    }

    pub fn with_revenue(mut self, revenue: f64) -> Self {
        self.revenue = revenue;
        self
    }

    pub fn with_transactions(mut self, transactions: f64) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn with_sessions(mut self, sessions: f64) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_conversion_rate(mut self, conversion_rate: f64) -> Self {
        self.conversion_rate = conversion_rate;
        self
    }
}

/// Which city field drives the map visuals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKey {
    #[default]
    Revenue,
    Transactions,
    Sessions,
    ConversionRate,
}

impl MetricKey {
    pub const ALL: [MetricKey; 4] = [
        MetricKey::Revenue,
        MetricKey::Transactions,
        MetricKey::Sessions,
        MetricKey::ConversionRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::Revenue => "revenue",
            MetricKey::Transactions => "transactions",
            MetricKey::Sessions => "sessions",
            MetricKey::ConversionRate => "conversionRate",
        }
    }

    /// Parse a key, falling back to revenue for anything unrecognised.
    pub fn parse_or_default(key: &str) -> Self {
        key.parse().unwrap_or_default()
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known metric.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric: {0}")]
pub struct UnknownMetric(pub String);

impl FromStr for MetricKey {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

/// Colour tier of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Mid,
    High,
}

impl Tier {
    /// Fill colour used on the map.
    pub fn color(&self) -> &'static str {
        match self {
            Tier::High => "#ef4444",
            Tier::Mid => "#f59e0b",
            Tier::Low => "#10b981",
        }
    }
}

pub fn value_of(city: &City, metric: MetricKey) -> f64 {
    match metric {
        MetricKey::Revenue => city.revenue,
        MetricKey::Transactions => city.transactions,
        MetricKey::Sessions => city.sessions,
        MetricKey::ConversionRate => city.conversion_rate,
    }
}

/// Largest metric value in the collection, never below 1.
pub fn max_of(cities: &[City], metric: MetricKey) -> f64 {
    cities
        .iter()
        .map(|city| value_of(city, metric))
        .fold(1.0, f64::max)
}

/// Tier for `value` relative to `max_value`. Ties go to the lower tier.
pub fn tier_for(value: f64, max_value: f64) -> Tier {
    let normalized = value / max_value.max(1.0);

    if normalized > HIGH_TIER_RATIO {
        Tier::High
    } else if normalized > MID_TIER_RATIO {
        Tier::Mid
    } else {
        Tier::Low
    }
}

pub fn color_for(value: f64, max_value: f64) -> &'static str {
    tier_for(value, max_value).color()
}

/// Marker radius in `[BASE_RADIUS, BASE_RADIUS + RADIUS_SPREAD]`.
pub fn radius_for(value: f64, max_value: f64) -> f64 {
    if max_value <= 0.0 {
        return BASE_RADIUS;
    }
    BASE_RADIUS + RADIUS_SPREAD * (value / max_value)
}

/// Formatted value of the selected metric.
pub fn label_for(city: &City, metric: MetricKey, formatter: &dyn ValueFormatter) -> String {
    let value = value_of(city, metric);
    match metric {
        MetricKey::Revenue => formatter.currency(value),
        MetricKey::Transactions | MetricKey::Sessions => formatter.number(value),
        MetricKey::ConversionRate => formatter.percent(value),
    }
}

/// Mapper bound to one collection and metric selection.
///
/// The maximum is computed once on construction.
pub struct MetricMapper<'a> {
    cities: &'a [City],
    metric: MetricKey,
    max_value: f64,
}

impl<'a> MetricMapper<'a> {
    pub fn new(cities: &'a [City], metric: MetricKey) -> Self {
        Self {
            cities,
            metric,
            max_value: max_of(cities, metric),
        }
    }

    pub fn metric(&self) -> MetricKey {
        self.metric
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn cities(&self) -> &'a [City] {
        self.cities
    }

    pub fn value_of(&self, city: &City) -> f64 {
        value_of(city, self.metric)
    }

    pub fn tier_of(&self, city: &City) -> Tier {
        tier_for(self.value_of(city), self.max_value)
    }

    pub fn color_of(&self, city: &City) -> &'static str {
        self.tier_of(city).color()
    }

    pub fn radius_of(&self, city: &City) -> f64 {
        radius_for(self.value_of(city), self.max_value)
    }

    pub fn label_of(&self, city: &City, formatter: &dyn ValueFormatter) -> String {
        label_for(city, self.metric, formatter)
    }
}
