//! Chart draw instructions for the analytics pane.
//!
//! Charts are rebuilt from scratch on every analytics refresh: each spec
//! starts with an implicit destroy of the previous instance, so the view
//! never accumulates stale series.

use crate::types::AnalyticsData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartSlot {
    RevenueOverTime,
    VehicleDistribution,
    PaymentDistribution,
    TopDrivers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Doughnut,
    Bar,
}

/// One chart to draw, replacing whatever occupied the slot before.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub slot: ChartSlot,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

/// Build the full chart set for one analytics payload.
pub fn chart_specs(analytics: &AnalyticsData) -> Vec<ChartSpec> {
    let charts = &analytics.charts;

    let mut specs = vec![ChartSpec {
        slot: ChartSlot::RevenueOverTime,
        kind: ChartKind::Line,
        labels: charts.revenue_over_time.labels.clone(),
        data: charts.revenue_over_time.data.clone(),
    }];

    specs.push(ChartSpec {
        slot: ChartSlot::VehicleDistribution,
        kind: ChartKind::Doughnut,
        labels: charts.vehicle_distribution.keys().cloned().collect(),
        data: charts
            .vehicle_distribution
            .values()
            .map(|&v| v as f64)
            .collect(),
    });

    specs.push(ChartSpec {
        slot: ChartSlot::PaymentDistribution,
        kind: ChartKind::Doughnut,
        labels: charts.payment_method_distribution.keys().cloned().collect(),
        data: charts
            .payment_method_distribution
            .values()
            .map(|&v| v as f64)
            .collect(),
    });

    specs.push(ChartSpec {
        slot: ChartSlot::TopDrivers,
        kind: ChartKind::Bar,
        labels: analytics
            .performance
            .top_drivers
            .iter()
            .map(|d| d.name.clone())
            .collect(),
        data: analytics
            .performance
            .top_drivers
            .iter()
            .map(|d| d.completed_rides as f64)
            .collect(),
    });

    specs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalyticsCharts, AnalyticsPerformance, TimeSeries, TopDriver};

    #[test]
    fn test_chart_specs_cover_all_slots() {
        let analytics = AnalyticsData {
            charts: AnalyticsCharts {
                revenue_over_time: TimeSeries {
                    labels: vec!["Mon".into(), "Tue".into()],
                    data: vec![120.0, 80.5],
                },
                vehicle_distribution: [("Bajaj".to_string(), 7u64), ("Car".to_string(), 3u64)]
                    .into_iter()
                    .collect(),
                payment_method_distribution: [("Cash".to_string(), 10u64)].into_iter().collect(),
            },
            performance: AnalyticsPerformance {
                top_drivers: vec![TopDriver {
                    id: 1,
                    name: "Abel".into(),
                    avg_rating: 4.7,
                    completed_rides: 31,
                }],
            },
            ..Default::default()
        };

        let specs = chart_specs(&analytics);
        assert_eq!(specs.len(), 4);
        assert_eq!(specs[0].slot, ChartSlot::RevenueOverTime);
        assert_eq!(specs[0].data, vec![120.0, 80.5]);
        // BTreeMap keys arrive sorted.
        assert_eq!(specs[1].labels, vec!["Bajaj", "Car"]);
        assert_eq!(specs[3].labels, vec!["Abel"]);
        assert_eq!(specs[3].data, vec![31.0]);
    }

    #[test]
    fn test_empty_analytics_still_yields_specs() {
        let specs = chart_specs(&AnalyticsData::default());
        assert_eq!(specs.len(), 4);
        assert!(specs.iter().all(|s| s.labels.is_empty()));
    }
}
