//! Project packaging
//!
//! Bundles the generated artifacts with an instruction document. A package is
//! written out as a plain directory named after the project, not as an
//! archive. The package builder trusts its caller to have validated the
//! snapshot; it only refuses to run when handed findings that still contain
//! errors.

use log::{info, warn};
use std::fmt::Write as _;
use std::path::{Component, Path, PathBuf};

use crate::codegen::{self, GeneratedArtifacts, NETWORK_FILE};
use crate::scenario::{self, EntityStore, Finding, ValidationReport};

/// File name of the instruction document inside the package
pub const INSTRUCTIONS_FILE: &str = "README.txt";

/// Errors raised while packaging or writing a project
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Packaging was requested although validation reported errors.
    #[error("export blocked: {error_count} validation errors outstanding")]
    ExportBlocked { error_count: usize },

    /// The snapshot failed validation; nothing was generated.
    #[error("scenario has {} validation errors", .report.error_count())]
    ValidationFailed { report: ValidationReport },

    /// The project name cannot be used as a single directory name.
    #[error("invalid project name '{name}': must be a single directory name")]
    InvalidProjectName { name: String },

    /// Writing a package file failed.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Rejects project names that would place the package outside its parent
/// directory, such as `..`, `a/b` or absolute paths
pub fn check_project_name(name: &str) -> Result<(), ExportError> {
    let mut components = Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    );
    if !single || name.contains(['/', '\\', ':']) {
        return Err(ExportError::InvalidProjectName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// One file of a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    pub name: String,
    pub contents: String,
}

/// Everything a user needs to build and run the scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPackage {
    pub project_name: String,
    pub files: Vec<PackageFile>,
}

impl ProjectPackage {
    pub fn file(&self, name: &str) -> Option<&PackageFile> {
        self.files.iter().find(|file| file.name == name)
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.files.iter().map(|file| file.name.as_str()).collect()
    }

    pub fn instructions(&self) -> Option<&str> {
        self.file(INSTRUCTIONS_FILE).map(|file| file.contents.as_str())
    }

    /// Writes every file into `dir`, creating it if needed
    ///
    /// Existing files with the same names are overwritten.
    pub fn write_to_dir(&self, dir: &Path) -> Result<(), ExportError> {
        std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        for file in &self.files {
            let path = dir.join(&file.name);
            std::fs::write(&path, &file.contents).map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;
        }

        info!(
            "Wrote {} files for project '{}' to {}",
            self.files.len(),
            self.project_name,
            dir.display()
        );
        Ok(())
    }
}

/// Renders the instruction document shipped with every package
pub fn render_instructions(
    project_name: &str,
    build_command: &str,
    warnings: &[&Finding],
) -> String {
    let mut doc = String::new();
    let _ = writeln!(doc, "# SUMO scenario: {}", project_name);
    doc.push('\n');

    doc.push_str("## Files\n");
    for kind in codegen::ArtifactKind::ALL {
        let _ = writeln!(doc, "- {}", kind.file_name());
    }
    doc.push('\n');

    let _ = writeln!(doc, "## 1) Build the network ({})", NETWORK_FILE);
    let _ = writeln!(doc, "{}", build_command);
    doc.push('\n');

    doc.push_str("## 2) Run the simulation\n");
    let _ = writeln!(doc, "{}", codegen::run_command());
    doc.push('\n');

    doc.push_str("## Warnings\n");
    if warnings.is_empty() {
        doc.push_str("None.\n");
    } else {
        for finding in warnings {
            let _ = writeln!(doc, "- {} '{}': {}", finding.kind, finding.id, finding.message);
        }
    }
    doc.push('\n');

    doc.push_str("## Notes\n");
    let _ = writeln!(
        doc,
        "- Left-hand traffic requires {} when building the network.",
        codegen::LEFTHAND_FLAG
    );
    doc.push_str("- This project is a plain directory; archive it yourself to share it.\n");
    doc.push_str(
        "- Detector lanes are named <edge>_<index>, counting from 0 on the rightmost lane.\n",
    );
    doc
}

/// Assembles the package from already generated artifacts
///
/// Fails with [`ExportError::ExportBlocked`] if `findings` contains any
/// error; warnings are listed in the instruction document.
pub fn build_package(
    project_name: &str,
    artifacts: GeneratedArtifacts,
    build_command: &str,
    findings: &[Finding],
) -> Result<ProjectPackage, ExportError> {
    check_project_name(project_name)?;

    let error_count = findings.iter().filter(|finding| finding.is_error()).count();
    if error_count > 0 {
        return Err(ExportError::ExportBlocked { error_count });
    }

    let warnings: Vec<&Finding> = findings.iter().collect();
    let instructions = render_instructions(project_name, build_command, &warnings);

    let mut files: Vec<PackageFile> = artifacts
        .iter()
        .map(|artifact| PackageFile {
            name: artifact.file_name().to_string(),
            contents: artifact.contents.clone(),
        })
        .collect();
    files.push(PackageFile {
        name: INSTRUCTIONS_FILE.to_string(),
        contents: instructions,
    });

    Ok(ProjectPackage {
        project_name: project_name.to_string(),
        files,
    })
}

/// Result of a successful export
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub package: ProjectPackage,
    /// Findings of the validation pass; warnings only
    pub report: ValidationReport,
}

/// Snapshots the store, validates, generates and packages in one go
///
/// Nothing is generated when validation reports errors.
pub fn export_project(
    store: &EntityStore,
    project_name: &str,
) -> Result<ExportOutcome, ExportError> {
    check_project_name(project_name)?;

    let snapshot = store.snapshot();
    let report = scenario::validate(&snapshot);

    for finding in report.warnings() {
        warn!("{}", finding);
    }
    if report.has_errors() {
        info!(
            "Export of '{}' refused: {} errors",
            project_name,
            report.error_count()
        );
        return Err(ExportError::ValidationFailed { report });
    }

    let artifacts = codegen::generate_all(&snapshot);
    let command = codegen::build_command(&snapshot.settings);
    let package = build_package(project_name, artifacts, &command, &report.findings)?;

    info!(
        "Exported '{}': {} files, {} warnings",
        project_name,
        package.files.len(),
        report.warning_count()
    );
    Ok(ExportOutcome { package, report })
}
