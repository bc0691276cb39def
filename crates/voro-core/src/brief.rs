//! Intake brief model.
//!
//! One canonical schema covers every intake form variant: the resolved email
//! plus a fixed set of optional free-form fields. The brief only lives for
//! the duration of a request and is forwarded to the owner by email.

use std::str::FromStr;

use serde::Serialize;

use crate::error::BriefError;

/// Maximum length for single-line fields.
pub const MAX_FIELD_LEN: usize = 500;

/// Maximum length for the free-text fields (`goals`, `details`).
pub const MAX_TEXT_LEN: usize = 5000;

/// A project brief submitted through the intake form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeBrief {
    /// Submitter email, recovered from the intake token or supplied literally.
    pub email: String,
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub project_type: Option<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub goals: Option<String>,
    pub details: Option<String>,
    /// `User-Agent` of the submitting browser.
    pub user_agent: Option<String>,
}

impl IntakeBrief {
    /// Start a brief for `email` with every optional field empty.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    /// Field name and value pairs, in display order.
    ///
    /// Absent fields are yielded as `None` so renderers can decide whether to
    /// show an empty cell.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, Option<&str>); 10] {
        [
            ("email", Some(self.email.as_str())),
            ("fullName", self.full_name.as_deref()),
            ("company", self.company.as_deref()),
            ("website", self.website.as_deref()),
            ("projectType", self.project_type.as_deref()),
            ("budget", self.budget.as_deref()),
            ("timeline", self.timeline.as_deref()),
            ("goals", self.goals.as_deref()),
            ("details", self.details.as_deref()),
            ("userAgent", self.user_agent.as_deref()),
        ]
    }

    /// Subject line for the owner digest: company, else email, else a
    /// placeholder.
    #[must_use]
    pub fn subject(&self) -> String {
        let label = non_blank(self.company.as_deref())
            .or_else(|| non_blank(Some(self.email.as_str())))
            .unwrap_or("Incoming");
        format!("New brief — {label}")
    }

    /// Check field lengths against the schema limits.
    ///
    /// # Errors
    ///
    /// Returns [`BriefError::TooLong`] naming the first oversized field.
    pub fn validate(&self) -> Result<(), BriefError> {
        for (name, value) in self.fields() {
            let max = match name {
                "goals" | "details" => MAX_TEXT_LEN,
                _ => MAX_FIELD_LEN,
            };
            if value.is_some_and(|v| v.chars().count() > max) {
                return Err(BriefError::TooLong { field: name, max });
            }
        }
        Ok(())
    }
}

/// Validate and normalize an email address.
///
/// Surrounding whitespace is ignored. The domain must contain a dot, which
/// rules out bare hostnames that would never receive the auto-reply.
///
/// # Errors
///
/// Returns [`BriefError::InvalidEmail`] if the address does not parse.
pub fn normalize_email(candidate: &str) -> Result<String, BriefError> {
    let trimmed = candidate.trim();
    let address = lettre::Address::from_str(trimmed).map_err(|_| BriefError::InvalidEmail)?;

    let domain = address.domain();
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(BriefError::InvalidEmail);
    }

    Ok(trimmed.to_owned())
}

/// `Some(value)` unless the value is absent or only whitespace.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
