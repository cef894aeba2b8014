use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{double_option, require_email, require_phone, require_text, Record};
use crate::entity::{EntityId, EntityKind};
use crate::error::ValidationError;
use crate::value::FieldValue;

/// A person in the address book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub last_contact_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a contact.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub company: Option<String>,
}

impl ContactDraft {
    /// Draft with no company.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            company: None,
        }
    }

    #[must_use]
    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }
}

/// Partial contact update. `id` is accepted and ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContactPatch {
    pub id: Option<EntityId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub company: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_contact_date: Option<Option<DateTime<Utc>>>,
}

impl Record for Contact {
    type Draft = ContactDraft;
    type Patch = ContactPatch;

    const KIND: EntityKind = EntityKind::Contact;
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "email",
        "phone",
        "company",
        "lastContactDate",
        "createdAt",
        "updatedAt",
    ];
    const SEARCHABLE_FIELDS: &'static [&'static str] = &["name", "email", "company", "phone"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_draft(id: EntityId, draft: ContactDraft, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let contact = Self {
            id,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            company: draft.company,
            last_contact_date: None,
            created_at: now,
            updated_at: now,
        };
        contact.validate()?;
        Ok(contact)
    }

    fn merged(&self, patch: ContactPatch, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let next = Self {
            id: self.id,
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            email: patch.email.unwrap_or_else(|| self.email.clone()),
            phone: patch.phone.unwrap_or_else(|| self.phone.clone()),
            company: patch.company.unwrap_or_else(|| self.company.clone()),
            last_contact_date: patch.last_contact_date.unwrap_or(self.last_contact_date),
            created_at: self.created_at,
            updated_at: now,
        };
        next.validate()?;
        Ok(next)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_email("email", &self.email)?;
        require_phone("phone", &self.phone)
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => self.id.into(),
            "name" => FieldValue::text(&self.name),
            "email" => FieldValue::text(&self.email),
            "phone" => FieldValue::text(&self.phone),
            "company" => FieldValue::optional_text(self.company.as_deref()),
            "lastContactDate" => self.last_contact_date.into(),
            "createdAt" => self.created_at.into(),
            "updatedAt" => self.updated_at.into(),
            _ => return None,
        })
    }
}
