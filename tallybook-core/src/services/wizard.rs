//! Import wizard - the state machine sequencing the pipeline stages
//!
//! Upload -> Mapping -> Preview -> Importing -> Complete, with reset back
//! to Upload from anywhere. The wizard owns all cross-stage state (parsed
//! file, mapping set, row partition, commit outcome); every other stage is
//! a pure function it calls in order.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{
    HeaderMatcher, ImportSpec, MappingSet, SubstringMatcher, TargetField,
};
use crate::ports::Datastore;
use crate::services::executor::{ImportExecutor, ImportOutcome};
use crate::services::parse::{parse_file, ParsedFile};
use crate::services::transform::apply_mappings;
use crate::services::validate::{validate_rows, RowPartition};

/// Wizard steps, in the only order they can advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WizardStep {
    Upload,
    Mapping,
    Preview,
    Importing,
    Complete,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::Upload => "Upload",
            WizardStep::Mapping => "Mapping",
            WizardStep::Preview => "Preview",
            WizardStep::Importing => "Importing",
            WizardStep::Complete => "Complete",
        };
        write!(f, "{}", name)
    }
}

/// One import session
///
/// Operations called out of step order return a `Wizard` error and leave
/// all state untouched. Everything the session derives is discarded by
/// `reset`, so the wizard can always be retried after any failure.
pub struct ImportWizard {
    spec: ImportSpec,
    matcher: Box<dyn HeaderMatcher + Send + Sync>,
    step: WizardStep,
    file: Option<ParsedFile>,
    mappings: MappingSet,
    partition: Option<RowPartition>,
    outcome: Option<ImportOutcome>,
}

impl ImportWizard {
    /// Start a session for the given registry, using the default matcher
    pub fn new(spec: ImportSpec) -> Self {
        Self::with_matcher(spec, Box::new(SubstringMatcher))
    }

    /// Start a session with a custom header matcher
    pub fn with_matcher(spec: ImportSpec, matcher: Box<dyn HeaderMatcher + Send + Sync>) -> Self {
        Self {
            spec,
            matcher,
            step: WizardStep::Upload,
            file: None,
            mappings: MappingSet::new(),
            partition: None,
            outcome: None,
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Upload -> Mapping: parse the file and seed the mapping editor
    ///
    /// On any parse failure the wizard stays in Upload with nothing stored.
    pub async fn load_file(&mut self, path: &Path) -> Result<()> {
        self.require_step(WizardStep::Upload, "load a file")?;

        let owned_path = path.to_path_buf();
        let parsed = tokio::task::spawn_blocking(move || parse_file(&owned_path))
            .await
            .map_err(|e| Error::wizard(format!("file parsing was interrupted: {}", e)))??;

        let proposals = self.matcher.propose(&parsed.headers, &self.spec);
        info!(
            collection = self.spec.collection,
            rows = parsed.rows.len(),
            mapped = proposals.len(),
            columns = parsed.headers.len(),
            "file loaded"
        );

        self.mappings = MappingSet::seed(proposals);
        self.file = Some(parsed);
        self.step = WizardStep::Mapping;
        Ok(())
    }

    /// Point a target field at a source column, or clear it with `None`.
    /// Only valid while in Mapping.
    pub fn set_mapping(&mut self, target: &str, source: Option<&str>) -> Result<()> {
        self.require_step(WizardStep::Mapping, "edit mappings")?;

        if self.spec.field(target).is_none() {
            return Err(Error::validation(format!("Unknown target field: {}", target)));
        }

        if let Some(source) = source {
            if !self.headers().iter().any(|h| h == source) {
                return Err(Error::validation(format!(
                    "Unknown source column: {}",
                    source
                )));
            }
        }

        self.mappings.set(target, source.map(str::to_string));
        Ok(())
    }

    /// Mapping -> Preview: transform and validate every row
    ///
    /// Guarded by every required field having a source column; the guard
    /// failing leaves the wizard in Mapping.
    pub fn confirm_mapping(&mut self) -> Result<()> {
        self.require_step(WizardStep::Mapping, "confirm mappings")?;

        if !self.mappings.all_required_mapped(&self.spec) {
            let labels: Vec<&str> = self
                .mappings
                .missing_required(&self.spec)
                .iter()
                .map(|f| f.label)
                .collect();
            return Err(Error::validation(format!(
                "Missing required fields: {}",
                labels.join(", ")
            )));
        }

        let file = self
            .file
            .as_ref()
            .ok_or_else(|| Error::wizard("no file loaded"))?;

        let transformed = apply_mappings(&file.rows, &self.mappings, &self.spec);
        let partition = validate_rows(&transformed, &self.spec);
        info!(
            collection = self.spec.collection,
            valid = partition.valid.len(),
            rejected = partition.errors.len(),
            "rows validated"
        );

        self.partition = Some(partition);
        self.step = WizardStep::Preview;
        Ok(())
    }

    /// Preview -> Importing -> Complete: commit the valid rows
    ///
    /// The executor runs on its own task; if it violates its contract and
    /// panics instead of resolving, the wizard falls back to Preview with
    /// no outcome recorded, so a retry starts from clean counts.
    pub async fn execute(&mut self, datastore: Arc<dyn Datastore>) -> Result<&ImportOutcome> {
        self.require_step(WizardStep::Preview, "start importing")?;

        let valid = match &self.partition {
            Some(partition) if !partition.valid.is_empty() => partition.valid.clone(),
            _ => return Err(Error::validation("No valid rows to import")),
        };

        self.step = WizardStep::Importing;

        let collection = self.spec.collection;
        let executor = ImportExecutor::new(datastore);
        let handle =
            tokio::spawn(async move { executor.commit(collection, &valid).await });

        match handle.await {
            Ok(outcome) => {
                self.step = WizardStep::Complete;
                Ok(self.outcome.insert(outcome))
            }
            Err(e) => {
                warn!(collection, error = %e, "import run did not resolve; returning to preview");
                self.outcome = None;
                self.step = WizardStep::Preview;
                Err(Error::ImportInterrupted(e.to_string()))
            }
        }
    }

    /// Back to Upload from any state, discarding all derived state
    pub fn reset(&mut self) {
        self.step = WizardStep::Upload;
        self.file = None;
        self.mappings = MappingSet::new();
        self.partition = None;
        self.outcome = None;
    }

    // =========================================================================
    // Read accessors for the presentation layer
    // =========================================================================

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn spec(&self) -> &ImportSpec {
        &self.spec
    }

    /// Headers of the loaded file, empty before Upload completes
    pub fn headers(&self) -> &[String] {
        self.file.as_ref().map(|f| f.headers.as_slice()).unwrap_or(&[])
    }

    pub fn row_count(&self) -> usize {
        self.file.as_ref().map(|f| f.row_count()).unwrap_or(0)
    }

    pub fn mappings(&self) -> &MappingSet {
        &self.mappings
    }

    pub fn missing_required(&self) -> Vec<&'static TargetField> {
        self.mappings.missing_required(&self.spec)
    }

    pub fn partition(&self) -> Option<&RowPartition> {
        self.partition.as_ref()
    }

    pub fn outcome(&self) -> Option<&ImportOutcome> {
        self.outcome.as_ref()
    }

    fn require_step(&self, expected: WizardStep, action: &str) -> Result<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(Error::wizard(format!(
                "cannot {} from the {} step",
                action, self.step
            )))
        }
    }
}
