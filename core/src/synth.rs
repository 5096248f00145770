//! Synthetic customer engagement data.
//!
//! Every customer carries a latent engagement factor drawn from N(0, 1).
//! Each metric is a linear response to that factor plus its own Gaussian
//! noise, clipped to the metric's plausible range. Lifetime value is
//! additionally driven by the customer's (clipped) purchase frequency
//! and average order value, which couples it to those columns beyond
//! the shared factor.

use crate::{
    error::{ChartError, ChartResult},
    metrics::Metric,
    rng::{MetricRng, RngBank, StreamSlot},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_CUSTOMERS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
    pub seed: u64,
    pub customers: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            customers: DEFAULT_CUSTOMERS,
        }
    }
}

/// Linear response of one metric to the engagement factor.
#[derive(Debug, Clone, Copy)]
pub struct ResponseModel {
    pub metric: Metric,
    pub base: f64,
    pub engagement_loading: f64,
    pub noise_std: f64,
    pub min: f64,
    pub max: f64,
}

impl ResponseModel {
    fn respond(&self, engagement: f64, noise: f64) -> f64 {
        (self.base + self.engagement_loading * engagement + noise).clamp(self.min, self.max)
    }
}

#[rustfmt::skip]
pub const RESPONSE_MODELS: [ResponseModel; 8] = [
    ResponseModel { metric: Metric::VisitsPerMonth,     base: 4.0,  engagement_loading: 2.0,  noise_std: 1.5,  min: 0.0,    max: f64::INFINITY },
    ResponseModel { metric: Metric::AvgSessionDuration, base: 5.0,  engagement_loading: 3.0,  noise_std: 2.0,  min: 1.0,    max: f64::INFINITY },
    ResponseModel { metric: Metric::PagesPerSession,    base: 3.0,  engagement_loading: 1.5,  noise_std: 1.0,  min: 1.0,    max: f64::INFINITY },
    ResponseModel { metric: Metric::EmailOpenRate,      base: 0.15, engagement_loading: 0.1,  noise_std: 0.05, min: 0.0,    max: 1.0 },
    ResponseModel { metric: Metric::EmailCtr,           base: 0.03, engagement_loading: 0.07, noise_std: 0.03, min: 0.0,    max: 1.0 },
    ResponseModel { metric: Metric::PurchaseFrequency,  base: 0.5,  engagement_loading: 0.6,  noise_std: 0.3,  min: 0.0,    max: f64::INFINITY },
    ResponseModel { metric: Metric::AverageOrderValue,  base: 40.0, engagement_loading: 8.0,  noise_std: 10.0, min: 5.0,    max: f64::INFINITY },
    ResponseModel { metric: Metric::NpsScore,           base: 20.0, engagement_loading: 15.0, noise_std: 10.0, min: -100.0, max: 100.0 },
];

pub const LTV_BASE: f64 = 200.0;
pub const LTV_ENGAGEMENT_LOADING: f64 = 80.0;
pub const LTV_PURCHASE_FREQUENCY_WEIGHT: f64 = 10.0;
pub const LTV_ORDER_VALUE_WEIGHT: f64 = 0.5;
pub const LTV_NOISE_STD: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricColumn {
    pub metric: Metric,
    pub values: Vec<f64>,
}

/// Column-major table: one column per metric, in `Metric::ALL` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTable {
    seed: u64,
    rows: usize,
    columns: Vec<MetricColumn>,
}

impl MetricTable {
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[MetricColumn] {
        &self.columns
    }

    pub fn column(&self, metric: Metric) -> &[f64] {
        &self.columns[metric.index()].values
    }

    pub fn value(&self, row: usize, metric: Metric) -> Option<f64> {
        self.column(metric).get(row).copied()
    }

    pub fn to_json(&self) -> ChartResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Generate the synthetic metric table. Same config, same bits.
pub fn generate(config: &SynthConfig) -> ChartResult<MetricTable> {
    let n = config.customers;
    if n == 0 {
        return Err(ChartError::EmptyPopulation);
    }

    let bank = RngBank::new(config.seed);
    let mut engagement_rng = bank.for_stream(StreamSlot::Engagement);
    let mut noise: Vec<MetricRng> = Metric::ALL
        .iter()
        .map(|&metric| bank.for_metric_noise(metric))
        .collect();
    let mut columns: Vec<MetricColumn> = Metric::ALL
        .iter()
        .map(|&metric| MetricColumn {
            metric,
            values: Vec::with_capacity(n),
        })
        .collect();

    // One customer per pass; every stream draws exactly once per customer.
    for row in 0..n {
        let e = engagement_rng.standard_normal();
        for model in RESPONSE_MODELS.iter() {
            let i = model.metric.index();
            let value = model.respond(e, noise[i].normal(0.0, model.noise_std));
            columns[i].values.push(value);
        }

        let pf = columns[Metric::PurchaseFrequency.index()].values[row];
        let aov = columns[Metric::AverageOrderValue.index()].values[row];
        let ltv_index = Metric::CustomerLifetimeValue.index();
        let ltv = LTV_BASE
            + LTV_ENGAGEMENT_LOADING * e
            + LTV_PURCHASE_FREQUENCY_WEIGHT * pf
            + LTV_ORDER_VALUE_WEIGHT * aov
            + noise[ltv_index].normal(0.0, LTV_NOISE_STD);
        columns[ltv_index].values.push(ltv.max(0.0));
    }

    log::debug!(
        "synthesized {} customers x {} metrics (seed {})",
        n,
        columns.len(),
        config.seed
    );

    Ok(MetricTable {
        seed: config.seed,
        rows: n,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_models_cover_every_metric_but_lifetime_value() {
        for metric in Metric::ALL {
            let covered = RESPONSE_MODELS.iter().any(|m| m.metric == metric);
            assert_eq!(
                covered,
                metric != Metric::CustomerLifetimeValue,
                "{:?} coverage is wrong",
                metric
            );
        }
    }

    #[test]
    fn response_is_clipped() {
        let model = RESPONSE_MODELS[3]; // email open rate
        assert_eq!(model.respond(50.0, 0.0), 1.0);
        assert_eq!(model.respond(-50.0, 0.0), 0.0);
    }

    #[test]
    fn columns_follow_metric_order() {
        let table = generate(&SynthConfig { seed: 1, customers: 10 }).unwrap();
        let order: Vec<Metric> = table.columns().iter().map(|c| c.metric).collect();
        assert_eq!(order, Metric::ALL.to_vec());
        assert!(table.columns().iter().all(|c| c.values.len() == 10));
    }

    #[test]
    fn lifetime_value_is_derived_from_the_same_row() {
        let config = SynthConfig { seed: 11, customers: 4 };
        let table = generate(&config).unwrap();

        let bank = RngBank::new(config.seed);
        let mut engagement = bank.for_stream(StreamSlot::Engagement);
        let mut noise = bank.for_metric_noise(Metric::CustomerLifetimeValue);
        for row in 0..config.customers {
            let e = engagement.standard_normal();
            let pf = table.value(row, Metric::PurchaseFrequency).unwrap();
            let aov = table.value(row, Metric::AverageOrderValue).unwrap();
            let expected = (LTV_BASE
                + LTV_ENGAGEMENT_LOADING * e
                + LTV_PURCHASE_FREQUENCY_WEIGHT * pf
                + LTV_ORDER_VALUE_WEIGHT * aov
                + noise.normal(0.0, LTV_NOISE_STD))
            .max(0.0);
            assert_eq!(
                table.value(row, Metric::CustomerLifetimeValue),
                Some(expected),
                "row {row}"
            );
        }
    }

    #[test]
    fn value_out_of_range_is_none() {
        let table = generate(&SynthConfig { seed: 1, customers: 3 }).unwrap();
        assert!(table.value(2, Metric::NpsScore).is_some());
        assert!(table.value(3, Metric::NpsScore).is_none());
    }
}
