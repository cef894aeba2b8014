use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{double_option, require_text, Record};
use crate::entity::{EntityId, EntityKind};
use crate::error::ValidationError;
use crate::value::FieldValue;

/// Progress of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Urgency of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A follow-up item.
///
/// `completed` mirrors `status == Completed` and is recomputed on every
/// create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Past due and not completed.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Completed && self.due_date < today
    }
}

/// Fields supplied when creating a task.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

impl TaskDraft {
    /// Pending, medium-priority draft.
    #[must_use]
    pub fn new(title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date,
            contact_name: None,
            company: None,
        }
    }

    #[must_use]
    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }
}

/// Partial task update. `id` is accepted and ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskPatch {
    pub id: Option<EntityId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    pub contact_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub company: Option<Option<String>>,
}

impl Record for Task {
    type Draft = TaskDraft;
    type Patch = TaskPatch;

    const KIND: EntityKind = EntityKind::Task;
    const FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "status",
        "priority",
        "dueDate",
        "contactName",
        "company",
        "completed",
        "createdAt",
    ];
    const SEARCHABLE_FIELDS: &'static [&'static str] = &["title", "description", "contactName", "company"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_draft(id: EntityId, draft: TaskDraft, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let task = Self {
            id,
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            due_date: draft.due_date,
            contact_name: draft.contact_name,
            company: draft.company,
            completed: draft.status == TaskStatus::Completed,
            created_at: now,
        };
        task.validate()?;
        Ok(task)
    }

    // Tasks carry no last-modified stamp.
    fn merged(&self, patch: TaskPatch, _now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let status = patch.status.unwrap_or(self.status);
        let next = Self {
            id: self.id,
            title: patch.title.unwrap_or_else(|| self.title.clone()),
            description: patch.description.unwrap_or_else(|| self.description.clone()),
            status,
            priority: patch.priority.unwrap_or(self.priority),
            due_date: patch.due_date.unwrap_or(self.due_date),
            contact_name: patch.contact_name.unwrap_or_else(|| self.contact_name.clone()),
            company: patch.company.unwrap_or_else(|| self.company.clone()),
            completed: status == TaskStatus::Completed,
            created_at: self.created_at,
        };
        next.validate()?;
        Ok(next)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)
    }

    fn normalized(self) -> Self {
        Self {
            completed: self.status == TaskStatus::Completed,
            ..self
        }
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => self.id.into(),
            "title" => FieldValue::text(&self.title),
            "description" => FieldValue::text(&self.description),
            "status" => FieldValue::text(self.status.label()),
            "priority" => FieldValue::text(self.priority.label()),
            "dueDate" => FieldValue::date(self.due_date),
            "contactName" => FieldValue::optional_text(self.contact_name.as_deref()),
            "company" => FieldValue::optional_text(self.company.as_deref()),
            "completed" => self.completed.into(),
            "createdAt" => self.created_at.into(),
            _ => return None,
        })
    }
}
