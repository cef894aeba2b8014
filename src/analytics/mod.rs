//! Dashboard aggregation.
//!
//! Every metric is an independent reduction over full snapshots. Company
//! and contact counters stored on `Company` records are display-only and are
//! never recomputed from deals or contacts here.

mod stats;
mod variance;

use std::sync::Arc;

use chrono::Datelike;
use serde::Serialize;
use tracing::debug;

use crate::clock::{system_clock, Clock};
use crate::config::AnalyticsConfig;
use crate::model::{Company, Contact, Deal, DealStage, Task};

pub use stats::{contact_stats, deal_stats, task_stats, ContactStats, DealStats, TaskStats};
pub use variance::{FixedVariance, RandomVariance, SeededVariance, VarianceSource};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Deals in one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageCount {
    pub stage: DealStage,
    pub count: usize,
}

/// One bucket of the simulated revenue series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub month: &'static str,
    pub revenue: f64,
}

/// Headline dashboard metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Sum of `value` over every deal, open pipeline included.
    pub total_revenue: f64,
    /// Percentage of deals that are Closed Won, one decimal place.
    pub conversion_rate: f64,
    pub active_deals: usize,
    pub total_contacts: usize,
    /// Stages in the order they are first seen in the deal snapshot.
    pub pipeline_distribution: Vec<StageCount>,
    pub revenue_by_month: Vec<MonthlyRevenue>,
}

/// Metrics plus the per-collection summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub metrics: Metrics,
    pub deals: DealStats,
    pub contacts: ContactStats,
    pub tasks: TaskStats,
}

/// Computes dashboard metrics from snapshots.
#[derive(Debug, Clone)]
pub struct AggregationEngine {
    variance: Arc<dyn VarianceSource>,
    clock: Arc<dyn Clock>,
    months: u32,
    variance_min: f64,
    variance_max: f64,
}

impl Default for AggregationEngine {
    fn default() -> Self {
        Self::new(&AnalyticsConfig::default(), system_clock())
    }
}

impl AggregationEngine {
    /// A seeded config gets reproducible variance, otherwise draws are random.
    #[must_use]
    pub fn new(config: &AnalyticsConfig, clock: Arc<dyn Clock>) -> Self {
        let variance: Arc<dyn VarianceSource> = match config.seed {
            Some(seed) => Arc::new(SeededVariance::new(seed)),
            None => Arc::new(RandomVariance),
        };
        Self {
            variance,
            clock,
            months: config.months,
            variance_min: config.variance_min,
            variance_max: config.variance_max,
        }
    }

    #[must_use]
    pub fn with_variance(mut self, variance: Arc<dyn VarianceSource>) -> Self {
        self.variance = variance;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Reduce the four snapshots to [`Metrics`].
    ///
    /// Companies and tasks do not contribute to any headline metric; they
    /// are taken so every dashboard caller passes the same snapshot set.
    #[must_use]
    pub fn compute_metrics(
        &self,
        deals: &[Deal],
        contacts: &[Contact],
        _companies: &[Company],
        _tasks: &[Task],
    ) -> Metrics {
        let total_revenue: f64 = deals.iter().map(|d| d.value).sum();
        let won = deals.iter().filter(|d| d.stage == DealStage::ClosedWon).count();
        let active_deals = deals.iter().filter(|d| !d.is_closed()).count();

        let metrics = Metrics {
            total_revenue,
            conversion_rate: conversion_rate(won, deals.len()),
            active_deals,
            total_contacts: contacts.len(),
            pipeline_distribution: pipeline_distribution(deals),
            revenue_by_month: self.revenue_by_month(deals),
        };

        debug!(
            component = "analytics",
            op = "compute_metrics",
            deals = deals.len(),
            contacts = contacts.len(),
            total_revenue = metrics.total_revenue,
            conversion_rate = metrics.conversion_rate,
            "metrics computed"
        );
        metrics
    }

    /// [`Metrics`] together with deal, contact and task summaries.
    #[must_use]
    pub fn compute_dashboard(
        &self,
        deals: &[Deal],
        contacts: &[Contact],
        companies: &[Company],
        tasks: &[Task],
    ) -> Dashboard {
        let now = self.clock.now();
        Dashboard {
            metrics: self.compute_metrics(deals, contacts, companies, tasks),
            deals: deal_stats(deals),
            contacts: contact_stats(contacts, now),
            tasks: task_stats(tasks, now.date_naive()),
        }
    }

    /// Simulated monthly series: closed-won value spread evenly across the
    /// window, each bucket scaled by its own variance factor and floored.
    fn revenue_by_month(&self, deals: &[Deal]) -> Vec<MonthlyRevenue> {
        let closed_won: f64 = deals
            .iter()
            .filter(|d| d.stage == DealStage::ClosedWon)
            .map(|d| d.value)
            .sum();
        let base = closed_won / f64::from(self.months.max(1));

        month_labels(self.clock.now().month0(), self.months)
            .into_iter()
            .map(|month| MonthlyRevenue {
                month,
                revenue: (base * self.variance.factor(self.variance_min, self.variance_max)).floor(),
            })
            .collect()
    }
}

#[allow(clippy::cast_precision_loss)]
fn conversion_rate(won: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (won as f64 / total as f64 * 1000.0).round() / 10.0
}

fn pipeline_distribution(deals: &[Deal]) -> Vec<StageCount> {
    let mut out: Vec<StageCount> = Vec::new();
    for deal in deals {
        match out.iter_mut().find(|s| s.stage == deal.stage) {
            Some(entry) => entry.count += 1,
            None => out.push(StageCount {
                stage: deal.stage,
                count: 1,
            }),
        }
    }
    out
}

/// `count` consecutive month abbreviations ending at `current_month0`.
fn month_labels(current_month0: u32, count: u32) -> Vec<&'static str> {
    (0..count)
        .rev()
        .map(|back| {
            let index = (current_month0 + 12 - back % 12) % 12;
            MONTH_ABBREVIATIONS[index as usize]
        })
        .collect()
}
