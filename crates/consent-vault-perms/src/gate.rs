//! The access-control gate.
//!
//! Every write or disclosure of a record passes through [`AccessGate::check`]
//! first. The gate has no policy of its own beyond consent: a provider may
//! touch a patient's records exactly while the patient's latest consent entry
//! for that provider is a grant.

use std::sync::Arc;

use consent_vault_core::{PatientId, ProviderId};

use crate::error::{PermsError, Result};
use crate::state::ConsentRegistry;

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny,
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

/// Policy checkpoint consulted before any record write or read.
#[derive(Debug, Clone)]
pub struct AccessGate {
    registry: Arc<ConsentRegistry>,
}

impl AccessGate {
    pub fn new(registry: Arc<ConsentRegistry>) -> Self {
        Self { registry }
    }

    /// Decide whether `provider_id` may act on `patient_id`'s records now.
    pub fn check(&self, patient_id: &PatientId, provider_id: &ProviderId) -> AccessDecision {
        if self.registry.is_active(patient_id, provider_id) {
            AccessDecision::Allow
        } else {
            AccessDecision::Deny
        }
    }

    /// Like [`check`](Self::check), but a deny becomes
    /// [`PermsError::AccessDenied`].
    pub fn require(&self, patient_id: &PatientId, provider_id: &ProviderId) -> Result<()> {
        match self.check(patient_id, provider_id) {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Deny => {
                tracing::warn!(
                    patient = %patient_id,
                    provider = %provider_id,
                    "access denied: no active consent"
                );
                Err(PermsError::AccessDenied {
                    patient_id: patient_id.clone(),
                    provider_id: provider_id.clone(),
                })
            }
        }
    }
}
