//! Bar and line chart construction for the dashboard.
//!
//! Options are built as ECharts configurations with `charming` and handed to
//! a [`ChartRenderer`] as JSON. The renderer owns the live chart instances.

use charming::{
    component::{Axis, Legend},
    element::{AxisType, LineStyle, SplitLine},
    series::{bar, Line},
    Chart,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::metric::{value_of, City, MetricKey};

/// One named series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

/// Category labels plus one or more series over them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartConfig {
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels,
            datasets: Vec::new(),
        }
    }

    pub fn with_dataset(mut self, label: impl Into<String>, data: Vec<f64>) -> Self {
        self.datasets.push(Dataset {
            label: label.into(),
            data,
        });
        self
    }

    /// One bar per city for the selected metric.
    pub fn for_metric(cities: &[City], metric: MetricKey) -> Self {
        let labels = cities.iter().map(|city| city.name.clone()).collect();
        let data = cities.iter().map(|city| value_of(city, metric)).collect();

        Self::new(labels).with_dataset(metric.as_str(), data)
    }
}

/// Opaque handle to a mounted chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartHandle(pub u64);

/// Mounts chart options into a surface and disposes of them.
pub trait ChartRenderer {
    fn mount(&mut self, surface: &str, options: &str) -> ChartHandle;

    fn dispose(&mut self, handle: ChartHandle);
}

pub fn bar_chart(config: &ChartConfig) -> Chart {
    let mut chart = Chart::new()
        .legend(Legend::new().show(false))
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(config.labels.clone())
                .split_line(SplitLine::new().show(false)),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .split_line(SplitLine::new().line_style(LineStyle::new().color("#e5e7eb"))),
        );

    for dataset in &config.datasets {
        chart = chart.series(
            bar::Bar::new()
                .name(dataset.label.clone())
                .data(dataset.data.clone()),
        );
    }

    chart
}

pub fn line_chart(config: &ChartConfig) -> Chart {
    let mut chart = Chart::new()
        .legend(Legend::new().show(false))
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(config.labels.clone()),
        )
        .y_axis(Axis::new().type_(AxisType::Value));

    for dataset in &config.datasets {
        chart = chart.series(
            Line::new()
                .name(dataset.label.clone())
                .data(dataset.data.clone()),
        );
    }

    chart
}

/// Creates and destroys dashboard charts through a renderer.
pub struct ChartFactory<R: ChartRenderer> {
    renderer: R,
}

impl<R: ChartRenderer> ChartFactory<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn create_bar_chart(&mut self, surface: &str, config: &ChartConfig) -> ChartHandle {
        debug!(surface, series = config.datasets.len(), "Creating bar chart");
        self.renderer
            .mount(surface, &bar_chart(config).to_string())
    }

    pub fn create_line_chart(&mut self, surface: &str, config: &ChartConfig) -> ChartHandle {
        debug!(surface, series = config.datasets.len(), "Creating line chart");
        self.renderer
            .mount(surface, &line_chart(config).to_string())
    }

    /// Dispose of `handle`; `None` is ignored.
    pub fn destroy_chart(&mut self, handle: Option<ChartHandle>) {
        if let Some(handle) = handle {
            self.renderer.dispose(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingChartRenderer;
    use serde_json::Value;

    /// Single-element lists may serialize as a bare object.
    fn first(value: &Value) -> &Value {
        if value.is_array() {
            &value[0]
        } else {
            value
        }
    }

    fn config() -> ChartConfig {
        ChartConfig::new(vec!["google / cpc".into(), "direct / none".into()])
            .with_dataset("Conversions", vec![42.0, 17.0])
    }

    #[test]
    fn test_bar_chart_options() {
        let options: Value = serde_json::from_str(&bar_chart(&config()).to_string()).unwrap();

        let series = first(&options["series"]);
        assert_eq!(series["type"], "bar");
        assert_eq!(series["name"], "Conversions");
        assert_eq!(first(&options["xAxis"])["data"][1], "direct / none");
    }

    #[test]
    fn test_line_chart_options() {
        let options: Value = serde_json::from_str(&line_chart(&config()).to_string()).unwrap();

        let series = first(&options["series"]);
        assert_eq!(series["type"], "line");
        assert_eq!(series["data"][0], 42.0);
    }

    #[test]
    fn test_factory_mounts_and_destroys() {
        let mut factory = ChartFactory::new(RecordingChartRenderer::new());

        let bar = factory.create_bar_chart("sources-chart", &config());
        let line = factory.create_line_chart("trend-chart", &config());
        assert_ne!(bar, line);
        assert_eq!(factory.renderer().mounted().len(), 2);

        factory.destroy_chart(Some(bar));
        factory.destroy_chart(None);

        let mounted = factory.renderer().mounted();
        assert_eq!(mounted.len(), 1);
        assert_eq!(mounted[0].surface, "trend-chart");
    }

    #[test]
    fn test_config_for_metric() {
        let cities = vec![
            City::new("Pretoria", -25.7479, 28.2293).with_transactions(12.0),
            City::new("Bloemfontein", -29.0852, 26.1596).with_transactions(5.0),
        ];

        let config = ChartConfig::for_metric(&cities, MetricKey::Transactions);

        assert_eq!(config.labels, vec!["Pretoria", "Bloemfontein"]);
        assert_eq!(config.datasets[0].label, "transactions");
        assert_eq!(config.datasets[0].data, vec![12.0, 5.0]);
    }
}
