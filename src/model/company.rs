use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_text, Record};
use crate::entity::{EntityId, EntityKind};
use crate::error::ValidationError;
use crate::value::FieldValue;

/// An organisation.
///
/// `contact_count` and `deal_count` are display values carried on the
/// record; nothing recomputes them from the other collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub contact_count: u32,
    #[serde(default)]
    pub deal_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a company.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyDraft {
    pub name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub notes: String,
}

impl CompanyDraft {
    #[must_use]
    pub fn new(name: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            industry: industry.into(),
            ..Self::default()
        }
    }
}

/// Partial company update. `id` is accepted and ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyPatch {
    pub id: Option<EntityId>,
    pub name: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub contact_count: Option<u32>,
    pub deal_count: Option<u32>,
}

impl Record for Company {
    type Draft = CompanyDraft;
    type Patch = CompanyPatch;

    const KIND: EntityKind = EntityKind::Company;
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "industry",
        "website",
        "phone",
        "email",
        "address",
        "notes",
        "contactCount",
        "dealCount",
        "createdAt",
    ];
    const SEARCHABLE_FIELDS: &'static [&'static str] = &["name", "industry"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_draft(id: EntityId, draft: CompanyDraft, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let company = Self {
            id,
            name: draft.name,
            industry: draft.industry,
            website: draft.website,
            phone: draft.phone,
            email: draft.email,
            address: draft.address,
            notes: draft.notes,
            contact_count: 0,
            deal_count: 0,
            created_at: now,
        };
        company.validate()?;
        Ok(company)
    }

    // Companies carry no last-modified stamp.
    fn merged(&self, patch: CompanyPatch, _now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let next = Self {
            id: self.id,
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            industry: patch.industry.unwrap_or_else(|| self.industry.clone()),
            website: patch.website.unwrap_or_else(|| self.website.clone()),
            phone: patch.phone.unwrap_or_else(|| self.phone.clone()),
            email: patch.email.unwrap_or_else(|| self.email.clone()),
            address: patch.address.unwrap_or_else(|| self.address.clone()),
            notes: patch.notes.unwrap_or_else(|| self.notes.clone()),
            contact_count: patch.contact_count.unwrap_or(self.contact_count),
            deal_count: patch.deal_count.unwrap_or(self.deal_count),
            created_at: self.created_at,
        };
        next.validate()?;
        Ok(next)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => self.id.into(),
            "name" => FieldValue::text(&self.name),
            "industry" => FieldValue::text(&self.industry),
            "website" => FieldValue::text(&self.website),
            "phone" => FieldValue::text(&self.phone),
            "email" => FieldValue::text(&self.email),
            "address" => FieldValue::text(&self.address),
            "notes" => FieldValue::text(&self.notes),
            "contactCount" => self.contact_count.into(),
            "dealCount" => self.deal_count.into(),
            "createdAt" => self.created_at.into(),
            _ => return None,
        })
    }
}
