//! # Project Data Structures
//!
//! A [`DesignProject`] bundles the engineering limits used for a job with any
//! number of labelled design cases. Projects serialize to `.bdp` files as
//! human-readable JSON (see [`crate::file_io`] for atomic saves).
//!
//! ## Structure
//!
//! ```text
//! DesignProject
//! ├── meta: ProjectMetadata (version, engineer, job info, timestamps)
//! ├── settings: DesignSettings (limits per stage, locale, catalog override)
//! └── cases: HashMap<Uuid, DesignCase> (labelled pipeline inputs)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use burner_core::pipeline::PipelineInput;
//! use burner_core::project::{DesignCase, DesignProject};
//!
//! let mut project = DesignProject::new("Jane Engineer", "25-042", "ACME Boilers");
//! let id = project.add_case(DesignCase::new("B-1", PipelineInput::new("methane", 100_000.0, 3000.0)));
//!
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! assert!(json.contains("B-1"));
//! assert!(project.get_case(&id).is_some());
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::burner::BurnerLimits;
use crate::chamber::ChamberLimits;
use crate::flow_network::FlowNetworkSettings;
use crate::messages::Locale;
use crate::pipeline::PipelineInput;
use crate::radiation::RadiationSettings;

/// Current schema version for project files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Project file extension
pub const PROJECT_EXTENSION: &str = "bdp";

/// Root project container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignProject {
    pub meta: ProjectMetadata,

    #[serde(default)]
    pub settings: DesignSettings,

    /// Design cases keyed by UUID
    #[serde(default)]
    pub cases: HashMap<Uuid, DesignCase>,
}

impl DesignProject {
    /// Create an empty project with default settings.
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>, client: impl Into<String>) -> Self {
        let now = Utc::now();
        DesignProject {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: DesignSettings::default(),
            cases: HashMap::new(),
        }
    }

    /// Add a case and return its new UUID.
    pub fn add_case(&mut self, case: DesignCase) -> Uuid {
        let id = Uuid::new_v4();
        self.cases.insert(id, case);
        self.touch();
        id
    }

    pub fn remove_case(&mut self, id: &Uuid) -> Option<DesignCase> {
        let case = self.cases.remove(id);
        if case.is_some() {
            self.touch();
        }
        case
    }

    pub fn get_case(&self, id: &Uuid) -> Option<&DesignCase> {
        self.cases.get(id)
    }

    /// Mutable access; marks the project as modified when the case exists.
    pub fn get_case_mut(&mut self, id: &Uuid) -> Option<&mut DesignCase> {
        if self.cases.contains_key(id) {
            self.meta.modified = Utc::now();
            self.cases.get_mut(id)
        } else {
            None
        }
    }

    /// Cases sorted by label, for stable listings.
    pub fn cases_by_label(&self) -> Vec<(Uuid, &DesignCase)> {
        let mut cases: Vec<_> = self.cases.iter().map(|(id, case)| (*id, case)).collect();
        cases.sort_by(|a, b| a.1.label.cmp(&b.1.label).then(a.0.cmp(&b.0)));
        cases
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn case_count(&self) -> usize {
        self.cases.len()
    }
}

impl Default for DesignProject {
    fn default() -> Self {
        DesignProject::new("", "", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    pub engineer: String,

    /// Job/project number
    pub job_id: String,

    pub client: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

/// Limits and options shared by every case in a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignSettings {
    pub burner: BurnerLimits,
    pub chamber: ChamberLimits,
    pub radiation: RadiationSettings,
    pub flow: FlowNetworkSettings,

    /// Language for rendered messages
    pub locale: Locale,

    /// Fuel catalog to use instead of the built-in one
    pub catalog_path: Option<PathBuf>,
}

/// One labelled set of design inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignCase {
    pub label: String,
    #[serde(default)]
    pub notes: String,
    pub input: PipelineInput,
}

impl DesignCase {
    pub fn new(label: impl Into<String>, input: PipelineInput) -> Self {
        DesignCase {
            label: label.into(),
            notes: String::new(),
            input,
        }
    }
}
