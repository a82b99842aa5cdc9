//! A reporting workbook: the inputs for every tracked resource.

use crate::config::EngineConfig;
use crate::engine::{Derived, ResourceEngine, ResourceInputs};
use crate::error::{EnvallocError, EnvallocResult};
use crate::validation::ValidationError;
use anyhow::{Context, Result};
use envalloc_types::ResourceKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workbook {
    #[serde(default)]
    pub resources: Vec<ResourceInputs>,
}

/// A validation problem and the resource it was found in.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceIssue {
    pub resource: ResourceKind,
    pub error: ValidationError,
}

impl Workbook {
    pub fn from_json_str(json: &str) -> EnvallocResult<Self> {
        serde_json::from_str(json).map_err(|e| EnvallocError::serialization("workbook", e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read workbook '{}'", path.display()))?;
        let workbook = Self::from_json_str(&json)
            .with_context(|| format!("failed to parse workbook '{}'", path.display()))?;
        info!(path = %path.display(), resources = workbook.resources.len(), "Loaded workbook");
        Ok(workbook)
    }

    /// All validation problems across resources.
    pub fn issues(&self) -> Vec<ResourceIssue> {
        self.resources
            .iter()
            .flat_map(|inputs| {
                crate::validation::validate_inputs(inputs)
                    .into_iter()
                    .map(|error| ResourceIssue { resource: inputs.resource.clone(), error })
            })
            .collect()
    }

    /// Fails on the first validation problem.
    pub fn ensure_valid(&self) -> EnvallocResult<()> {
        match self.issues().into_iter().next() {
            Some(issue) => {
                warn!(resource = %issue.resource, error = %issue.error, "Workbook rejected");
                Err(issue.error.into())
            }
            None => Ok(()),
        }
    }

    /// Runs the pipeline for every resource, in workbook order.
    #[instrument(skip_all, fields(resources = self.resources.len()))]
    pub fn derive_all(&self, config: &EngineConfig) -> Vec<Derived> {
        self.resources
            .iter()
            .map(|inputs| {
                ResourceEngine::from_inputs(inputs.clone(), config.clone()).derived().clone()
            })
            .collect()
    }
}
