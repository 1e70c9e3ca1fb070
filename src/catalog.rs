//! Disease and medicine catalogs — static JSON reference data.
//!
//! Both catalogs are loaded once at startup and never mutated afterwards.
//! A missing or malformed file is a fatal startup error naming the resource;
//! there is no partial-load fallback.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;

/// One disease with its symptom phrases, in catalog order.
#[derive(Debug, Clone, Deserialize)]
pub struct DiseaseRecord {
    pub name: String,
    pub symptoms: Vec<String>,
}

/// Recommended medication for one disease.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MedicineRecord {
    pub medication: String,
    pub dosage: String,
}

/// Ordered, read-only disease list.
///
/// Order matters: the matcher's tie-break favors the earliest record, so the
/// catalog preserves file order exactly.
#[derive(Debug, Clone)]
pub struct DiseaseCatalog {
    records: Vec<DiseaseRecord>,
}

impl DiseaseCatalog {
    /// Load from a JSON array of `{ "name": ..., "symptoms": [...] }`.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let data = fs::read_to_string(path)
            .map_err(|e| AppError::Catalog(format!("cannot read {}: {e}", path.display())))?;
        let records: Vec<DiseaseRecord> = serde_json::from_str(&data)
            .map_err(|e| AppError::Catalog(format!("malformed {}: {e}", path.display())))?;
        Ok(Self { records })
    }

    pub fn from_records(records: Vec<DiseaseRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[DiseaseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read-only disease name → medication mapping.
#[derive(Debug, Clone)]
pub struct MedicineCatalog {
    entries: HashMap<String, MedicineRecord>,
}

impl MedicineCatalog {
    /// Load from a JSON object keyed by disease name.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let data = fs::read_to_string(path)
            .map_err(|e| AppError::Catalog(format!("cannot read {}: {e}", path.display())))?;
        let entries: HashMap<String, MedicineRecord> = serde_json::from_str(&data)
            .map_err(|e| AppError::Catalog(format!("malformed {}: {e}", path.display())))?;
        Ok(Self { entries })
    }

    pub fn from_entries(entries: HashMap<String, MedicineRecord>) -> Self {
        Self { entries }
    }

    /// Look up the medication for a disease. A missing key is an ordinary
    /// absent result, never an error.
    pub fn lookup(&self, disease: &str) -> Option<&MedicineRecord> {
        self.entries.get(disease)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
