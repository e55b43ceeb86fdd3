//! Known patients and providers.
//!
//! The directory is provisioned at bootstrap. Consent operations do not
//! consult it: any non-empty id can be granted or revoked whether or not it
//! is listed here.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use consent_vault_core::{Patient, PatientId, Provider, ProviderId};

#[derive(Debug, Default)]
pub struct Directory {
    patients: RwLock<BTreeMap<PatientId, Patient>>,
    providers: RwLock<BTreeMap<ProviderId, Provider>>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a patient. Entries are immutable once created: returns `false`
    /// and leaves the existing entry alone if the id is taken.
    pub fn register_patient(&self, patient: Patient) -> bool {
        let mut patients = self.patients.write().unwrap_or_else(PoisonError::into_inner);
        if patients.contains_key(&patient.id) {
            return false;
        }
        patients.insert(patient.id.clone(), patient);
        true
    }

    /// Add a provider. Same rules as [`register_patient`](Self::register_patient).
    pub fn register_provider(&self, provider: Provider) -> bool {
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        if providers.contains_key(&provider.id) {
            return false;
        }
        providers.insert(provider.id.clone(), provider);
        true
    }

    /// All patients, ordered by id.
    pub fn patients(&self) -> Vec<Patient> {
        self.patients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// All providers, ordered by id.
    pub fn providers(&self) -> Vec<Provider> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}
