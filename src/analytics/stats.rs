//! Per-collection summary figures shown beside the entity lists.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::model::{Contact, Deal, DealStage, Task, TaskStatus};

/// Deal totals for the pipeline header.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealStats {
    pub total_value: f64,
    pub won_value: f64,
    pub won_count: usize,
    pub lost_count: usize,
    pub active_deal_count: usize,
    pub total_count: usize,
}

/// Contact totals for the contacts header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactStats {
    pub total: usize,
    /// Distinct non-empty company names.
    pub companies: usize,
    /// Created in the same calendar month as `now`.
    pub new_this_month: usize,
}

/// Task totals for the task board header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: usize,
}

#[must_use]
pub fn deal_stats(deals: &[Deal]) -> DealStats {
    deals.iter().fold(
        DealStats {
            total_count: deals.len(),
            ..DealStats::default()
        },
        |mut acc, deal| {
            acc.total_value += deal.value;
            match deal.stage {
                DealStage::ClosedWon => {
                    acc.won_value += deal.value;
                    acc.won_count += 1;
                }
                DealStage::ClosedLost => acc.lost_count += 1,
                _ => acc.active_deal_count += 1,
            }
            acc
        },
    )
}

#[must_use]
pub fn contact_stats(contacts: &[Contact], now: DateTime<Utc>) -> ContactStats {
    let companies: HashSet<&str> = contacts
        .iter()
        .filter_map(|c| c.company.as_deref())
        .filter(|name| !name.is_empty())
        .collect();
    let new_this_month = contacts
        .iter()
        .filter(|c| c.created_at.year() == now.year() && c.created_at.month() == now.month())
        .count();

    ContactStats {
        total: contacts.len(),
        companies: companies.len(),
        new_this_month,
    }
}

#[must_use]
pub fn task_stats(tasks: &[Task], today: NaiveDate) -> TaskStats {
    let mut stats = TaskStats {
        total: tasks.len(),
        ..TaskStats::default()
    };
    for task in tasks {
        match task.status {
            TaskStatus::Pending => stats.pending += 1,
            TaskStatus::InProgress => stats.in_progress += 1,
            TaskStatus::Completed => stats.completed += 1,
        }
        if task.is_overdue(today) {
            stats.overdue += 1;
        }
    }
    stats
}
