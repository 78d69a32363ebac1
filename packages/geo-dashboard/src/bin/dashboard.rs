//! Dashboard data fetcher
//!
//! Fetches all analytics datasets for a date range and prints them as JSON.
//! When the revenue dataset is a list of cities, each city's map tier and
//! label for the selected metric are logged.

use analytics_client::{AnalyticsClient, ReqwestTransport};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use geo_dashboard::charts::{bar_chart, ChartConfig};
use geo_dashboard::{City, DashboardConfig, MetricKey, MetricMapper, UsdFormatter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "dashboard", about = "Fetch analytics data for a date range")]
struct Args {
    /// Start of the range (YYYY-MM-DD), defaults to 30 days ago
    #[arg(long)]
    start_date: Option<String>,

    /// End of the range (YYYY-MM-DD), defaults to today
    #[arg(long)]
    end_date: Option<String>,

    /// Metric driving the city summary, falls back to MAP_DEFAULT_METRIC
    #[arg(long)]
    metric: Option<String>,

    /// Print bar chart options for the city summary
    #[arg(long)]
    chart: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,analytics_client=debug,geo_dashboard=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let args = Args::parse();
    let config = DashboardConfig::from_env().context("Failed to load configuration")?;

    let today = Utc::now().date_naive();
    let start_date = args
        .start_date
        .unwrap_or_else(|| (today - Duration::days(30)).format("%Y-%m-%d").to_string());
    let end_date = args
        .end_date
        .unwrap_or_else(|| today.format("%Y-%m-%d").to_string());
    let metric = args
        .metric
        .map(|key| MetricKey::parse_or_default(&key))
        .unwrap_or(config.default_metric);

    tracing::info!(api_base = %config.api_base, %start_date, %end_date, "Fetching analytics data");

    let client = AnalyticsClient::new(ReqwestTransport::new(), config.api_base.clone());
    let data = client
        .get_data_with_validation(Some(&start_date), Some(&end_date))
        .await
        .context("Failed to fetch analytics data")?;

    println!("{}", serde_json::to_string_pretty(&data)?);

    match serde_json::from_value::<Vec<City>>(data.revenue_data.clone()) {
        Ok(cities) => {
            let mapper = MetricMapper::new(&cities, metric);
            for city in &cities {
                tracing::info!(
                    city = %city.name,
                    %metric,
                    tier = ?mapper.tier_of(city),
                    value = %mapper.label_of(city, &UsdFormatter),
                    "City summary"
                );
            }

            if args.chart {
                println!("{}", bar_chart(&ChartConfig::for_metric(&cities, metric)));
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "Revenue data is not a city list, skipping summary");
        }
    }

    Ok(())
}
