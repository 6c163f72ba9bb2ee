//! # File I/O Module
//!
//! Project and catalog files on disk:
//! - **Atomic saves**: write to `.tmp`, fsync, rename over the target
//! - **Version validation**: reject project files from an incompatible schema
//! - **Catalog overrides**: load a user fuel catalog in place of the built-in one
//!
//! ## Example
//!
//! ```rust,no_run
//! use burner_core::file_io::{load_project, save_project};
//! use burner_core::project::DesignProject;
//! use std::path::Path;
//!
//! let project = DesignProject::new("Engineer", "25-001", "Client");
//! let path = Path::new("boiler.bdp");
//!
//! save_project(&project, path)?;
//! let loaded = load_project(path)?;
//! assert_eq!(loaded.meta.job_id, "25-001");
//! # Ok::<(), burner_core::errors::DesignError>(())
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::FuelCatalog;
use crate::errors::{CalcResult, DesignError};
use crate::project::{DesignProject, SCHEMA_VERSION};

/// Serialize a value as pretty JSON and write it atomically.
///
/// 1. serialize
/// 2. write to `<path>.tmp`
/// 3. fsync
/// 4. rename over `path`
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| DesignError::SerializationError {
        reason: e.to_string(),
    })?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    let mut tmp_file = File::create(tmp_path).map_err(|e| {
        DesignError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    let written = tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| DesignError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))
        .and_then(|_| {
            tmp_file.sync_all().map_err(|e| {
                DesignError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
            })
        });
    if let Err(e) = written {
        let _ = fs::remove_file(tmp_path);
        return Err(e);
    }
    drop(tmp_file);

    fs::rename(tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(tmp_path);
        DesignError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!("Wrote {} bytes to {}", json.len(), path.display());
    Ok(())
}

/// Save a project with atomic write semantics.
pub fn save_project(project: &DesignProject, path: &Path) -> CalcResult<()> {
    save_json(project, path)?;
    info!("Saved project {} ({} cases) to {}", project.meta.job_id, project.case_count(), path.display());
    Ok(())
}

fn read_to_string(path: &Path) -> CalcResult<String> {
    fs::read_to_string(path).map_err(|e| DesignError::file_error("read", path.display().to_string(), e.to_string()))
}

/// Load a project from a file.
///
/// # Errors
///
/// * `VersionMismatch` - file schema is incompatible
/// * `SerializationError` - invalid JSON
/// * `FileError` - I/O error
pub fn load_project(path: &Path) -> CalcResult<DesignProject> {
    let contents = read_to_string(path)?;

    let project: DesignProject = serde_json::from_str(&contents).map_err(|e| DesignError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })?;

    validate_version(&project.meta.version)?;

    info!("Loaded project {} ({} cases)", project.meta.job_id, project.case_count());
    Ok(project)
}

/// Load a fuel catalog file.
pub fn load_catalog(path: &Path) -> CalcResult<FuelCatalog> {
    let contents = read_to_string(path)?;
    let catalog = FuelCatalog::from_json_str(&contents)?;
    info!("Loaded fuel catalog from {} ({} fuels)", path.display(), catalog.fuel_ids().count());
    Ok(catalog)
}

/// The project's catalog override when set, otherwise the built-in catalog.
pub fn catalog_for_project(project: &DesignProject) -> CalcResult<FuelCatalog> {
    match &project.settings.catalog_path {
        Some(path) => load_catalog(path),
        None => FuelCatalog::builtin(),
    }
}

/// Check that a file version is compatible with the current schema.
///
/// Major versions must match. While the schema is 0.x, a file with a newer
/// minor version is rejected too.
pub fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || DesignError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let parse = |v: &str| -> Option<Vec<u32>> { v.split('.').map(|p| p.parse().ok()).collect() };

    let file_parts = parse(file_version).ok_or_else(mismatch)?;
    let current_parts = parse(SCHEMA_VERSION).ok_or_else(mismatch)?;

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, rest @ ..], [current_major, current_rest @ ..]) => {
            if file_major != current_major {
                return Err(mismatch());
            }
            if *current_major == 0 {
                if let (Some(file_minor), Some(current_minor)) = (rest.first(), current_rest.first()) {
                    if file_minor > current_minor {
                        return Err(mismatch());
                    }
                }
            }
            Ok(())
        }
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineInput;
    use crate::project::DesignCase;
    use std::env::temp_dir;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        temp_dir().join(format!("burner_test_{}_{}.bdp", std::process::id(), name))
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_path("roundtrip");

        let mut project = DesignProject::new("Test Engineer", "TEST-001", "Test Client");
        project.add_case(DesignCase::new("B-1", PipelineInput::new("methane", 100_000.0, 3000.0)));
        save_project(&project, &path).unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.meta.engineer, "Test Engineer");
        assert_eq!(loaded.meta.job_id, "TEST-001");
        assert_eq!(loaded.cases, project.cases);
        assert_eq!(loaded.settings, project.settings);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let path = temp_path("atomic");
        let tmp_path = PathBuf::from(format!("{}.tmp", path.display()));

        save_project(&DesignProject::default(), &path).unwrap();

        assert!(!tmp_path.exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let path = temp_dir().join("burner_no_such_dir_xyz").join("p.bdp");
        let err = save_project(&DesignProject::default(), &path).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_invalid_json() {
        let path = temp_path("invalid");
        fs::write(&path, "{ not json").unwrap();
        let err = load_project(&path).unwrap_err();
        assert!(matches!(err, DesignError::SerializationError { .. }));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_newer_schema_rejected() {
        let path = temp_path("newer");
        let mut project = DesignProject::default();
        project.meta.version = "0.9.0".to_string();
        save_project(&project, &path).unwrap();
        assert!(matches!(load_project(&path), Err(DesignError::VersionMismatch { .. })));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_project(&temp_path("does_not_exist")).unwrap_err();
        assert!(matches!(err, DesignError::FileError { .. }));
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.0").is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("0.0.9").is_ok());

        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("").is_err());
        assert!(validate_version("zero.one").is_err());
    }

    #[test]
    fn test_load_catalog_override() {
        let path = temp_dir().join(format!("burner_test_{}_catalog.json", std::process::id()));
        let json = r#"{
            "fuels": {
                "biogas": {
                    "name": "Biogas",
                    "family": "generic",
                    "properties": {
                        "lower_heating_value_mass": 2.0e7,
                        "air_fuel_ratio_mass": 6.0,
                        "molecular_weight": 26.0,
                        "density": 1.15
                    }
                }
            },
            "constants": {
                "universal_gas_constant": 8.314,
                "standard_pressure": 101325.0,
                "standard_temperature": 273.15,
                "stefan_boltzmann_constant": 5.67e-8,
                "air_molecular_weight": 28.97
            }
        }"#;
        fs::write(&path, json).unwrap();

        let catalog = load_catalog(&path).unwrap();
        assert!(catalog.fuel("biogas").is_ok());
        assert!(catalog.fuel("methane").is_err());

        let mut project = DesignProject::default();
        project.settings.catalog_path = Some(path.clone());
        let from_project = catalog_for_project(&project).unwrap();
        assert_eq!(from_project.fuel_ids().collect::<Vec<_>>(), vec!["biogas"]);

        let _ = fs::remove_file(&path);
    }
}
