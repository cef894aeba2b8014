use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{require_text, Record};
use crate::entity::{EntityId, EntityKind};
use crate::error::ValidationError;
use crate::value::FieldValue;

/// Pipeline phase of a deal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DealStage {
    #[default]
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    #[serde(rename = "Closed Won")]
    ClosedWon,
    #[serde(rename = "Closed Lost")]
    ClosedLost,
}

impl DealStage {
    /// Stages in pipeline order.
    pub const ALL: [Self; 6] = [
        Self::Lead,
        Self::Qualified,
        Self::Proposal,
        Self::Negotiation,
        Self::ClosedWon,
        Self::ClosedLost,
    ];

    /// Display label, identical to the serialized form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lead => "Lead",
            Self::Qualified => "Qualified",
            Self::Proposal => "Proposal",
            Self::Negotiation => "Negotiation",
            Self::ClosedWon => "Closed Won",
            Self::ClosedLost => "Closed Lost",
        }
    }

    /// Closed Won or Closed Lost.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::ClosedWon | Self::ClosedLost)
    }
}

impl fmt::Display for DealStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<&str> for DealStage {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.label() == value.trim())
            .ok_or_else(|| format!("unknown deal stage: {value}"))
    }
}

fn default_probability() -> u8 {
    50
}

/// A sales opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: EntityId,
    pub name: String,
    pub company: String,
    pub contact_name: String,
    pub value: f64,
    pub stage: DealStage,
    pub expected_close_date: NaiveDate,
    pub probability: u8,
    #[serde(default)]
    pub description: String,
    pub last_updated: DateTime<Utc>,
}

impl Deal {
    /// Closed Won or Closed Lost.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.stage.is_closed()
    }

    /// Past its expected close date while still open.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_closed() && self.expected_close_date < today
    }
}

/// Fields supplied when creating a deal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DealDraft {
    pub name: String,
    pub company: String,
    pub contact_name: String,
    pub value: f64,
    #[serde(default)]
    pub stage: DealStage,
    pub expected_close_date: NaiveDate,
    #[serde(default = "default_probability")]
    pub probability: u8,
    #[serde(default)]
    pub description: String,
}

impl DealDraft {
    /// Lead-stage draft at the default 50% probability.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        company: impl Into<String>,
        contact_name: impl Into<String>,
        value: f64,
        expected_close_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            company: company.into(),
            contact_name: contact_name.into(),
            value,
            stage: DealStage::default(),
            expected_close_date,
            probability: default_probability(),
            description: String::new(),
        }
    }

    #[must_use]
    pub fn stage(mut self, stage: DealStage) -> Self {
        self.stage = stage;
        self
    }

    #[must_use]
    pub fn probability(mut self, probability: u8) -> Self {
        self.probability = probability;
        self
    }
}

/// Partial deal update. `id` is accepted and ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DealPatch {
    pub id: Option<EntityId>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub contact_name: Option<String>,
    pub value: Option<f64>,
    pub stage: Option<DealStage>,
    pub expected_close_date: Option<NaiveDate>,
    pub probability: Option<u8>,
    pub description: Option<String>,
}

impl Record for Deal {
    type Draft = DealDraft;
    type Patch = DealPatch;

    const KIND: EntityKind = EntityKind::Deal;
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "company",
        "contactName",
        "value",
        "stage",
        "expectedCloseDate",
        "probability",
        "description",
        "lastUpdated",
    ];
    const SEARCHABLE_FIELDS: &'static [&'static str] = &["name", "company", "contactName"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_draft(id: EntityId, draft: DealDraft, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let deal = Self {
            id,
            name: draft.name,
            company: draft.company,
            contact_name: draft.contact_name,
            value: draft.value,
            stage: draft.stage,
            expected_close_date: draft.expected_close_date,
            probability: draft.probability,
            description: draft.description,
            last_updated: now,
        };
        deal.validate()?;
        Ok(deal)
    }

    fn merged(&self, patch: DealPatch, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let next = Self {
            id: self.id,
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            company: patch.company.unwrap_or_else(|| self.company.clone()),
            contact_name: patch.contact_name.unwrap_or_else(|| self.contact_name.clone()),
            value: patch.value.unwrap_or(self.value),
            stage: patch.stage.unwrap_or(self.stage),
            expected_close_date: patch.expected_close_date.unwrap_or(self.expected_close_date),
            probability: patch.probability.unwrap_or(self.probability),
            description: patch.description.unwrap_or_else(|| self.description.clone()),
            last_updated: now,
        };
        next.validate()?;
        Ok(next)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("company", &self.company)?;
        require_text("contactName", &self.contact_name)?;
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "value",
                value: self.value,
                min: 0.0,
                max: f64::MAX,
            });
        }
        if self.probability > 100 {
            return Err(ValidationError::OutOfRange {
                field: "probability",
                value: f64::from(self.probability),
                min: 0.0,
                max: 100.0,
            });
        }
        Ok(())
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => self.id.into(),
            "name" => FieldValue::text(&self.name),
            "company" => FieldValue::text(&self.company),
            "contactName" => FieldValue::text(&self.contact_name),
            "value" => self.value.into(),
            "stage" => FieldValue::text(self.stage.label()),
            "expectedCloseDate" => FieldValue::date(self.expected_close_date),
            "probability" => u32::from(self.probability).into(),
            "description" => FieldValue::text(&self.description),
            "lastUpdated" => self.last_updated.into(),
            _ => return None,
        })
    }
}
