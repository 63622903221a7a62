//! The data model shared by every stage of the pipeline.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// File extensions (and extensionless basenames) the pipeline will generate.
/// Anything else is rejected by [`FileSpec::new`].
const ALLOWED_EXTENSIONS: &[&str] = &[
    "html", "htm", "xml", "md", "json", "env", "sh", "bat", "gitignore", "js", "ts", "jsx", "tsx",
    "mjs", "cjs", "css", "scss", "sass", "less", "py", "txt", "c", "cpp", "h", "hpp", "go", "rs",
    "java", "cs", "yml", "yaml",
];

/// Extensionless basenames that are nonetheless recognized project files.
const ALLOWED_EXTENSIONLESS: &[&str] = &["Dockerfile", ".gitignore", ".env.example"];

/// A single file the project spec asks the pipeline to produce.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileSpec {
    /// POSIX-style, project-relative path. Never contains `..` components.
    pub path: String,
    /// A free-text language tag (e.g. `"javascript"`, `"python"`).
    pub language: String,
    /// What this file is for.
    pub description: String,
    /// Free-text constraints the generated file must satisfy.
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Verbatim content. When present, short-circuits LLM generation for
    /// auto-generated files and is offered as a strong starting point to
    /// workers otherwise.
    #[serde(default)]
    pub template: Option<String>,
    /// When `true`, `template` is emitted as-is with no LLM call at all.
    #[serde(default)]
    pub is_auto_generated: bool,
}

impl FileSpec {
    /// Construct a `FileSpec`, validating `path`:
    /// POSIX-style, project-relative, no `..` components, allow-listed extension.
    pub fn new(
        path: impl Into<String>,
        language: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self> {
        let path = path.into();
        validate_path(&path)?;
        Ok(Self {
            path,
            language: language.into(),
            description: description.into(),
            requirements: Vec::new(),
            template: None,
            is_auto_generated: false,
        })
    }

    /// Builder: attach free-text requirements.
    #[must_use]
    pub fn with_requirements(mut self, requirements: Vec<String>) -> Self {
        self.requirements = requirements;
        self
    }

    /// Builder: attach verbatim template content.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Builder: mark this file as auto-generated (template emitted verbatim).
    #[must_use]
    pub fn auto_generated(mut self) -> Self {
        self.is_auto_generated = true;
        self
    }

    /// The file's extension, lowercased, without the leading dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        basename_and_extension(&self.path).1
    }

    /// The file's basename (last path component).
    #[must_use]
    pub fn basename(&self) -> &str {
        basename_and_extension(&self.path).0
    }
}

fn basename_and_extension(path: &str) -> (&str, &str) {
    let basename = path.rsplit('/').next().unwrap_or(path);
    match basename.rsplit_once('.') {
        Some((_, ext)) if basename != ext => (basename, ext),
        _ => (basename, ""),
    }
}

fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::InvalidFileSpec(path.to_string(), "path is empty".into()));
    }
    if path.starts_with('/') {
        return Err(Error::InvalidFileSpec(
            path.to_string(),
            "path must be project-relative, not absolute".into(),
        ));
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(Error::InvalidFileSpec(
            path.to_string(),
            "path must not contain .. components".into(),
        ));
    }

    let (basename, ext) = basename_and_extension(path);
    let recognized = ALLOWED_EXTENSIONLESS.contains(&basename)
        || (!ext.is_empty() && ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()));
    if !recognized {
        return Err(Error::InvalidFileSpec(
            path.to_string(),
            format!("unrecognized extension {ext:?}"),
        ));
    }
    Ok(())
}

/// Ecosystem dependency declarations under `setup.dependencies`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Dependencies {
    /// `name@version` entries, e.g. `"express@4.18.0"`.
    #[serde(default)]
    pub npm: Vec<String>,
    /// One requirement-file line per entry.
    #[serde(default)]
    pub python: Vec<String>,
    /// Maven coordinates (deterministic `pom.xml` emission).
    #[serde(default)]
    pub maven: Vec<String>,
    /// Go module requirements.
    #[serde(default)]
    pub go: Vec<String>,
}

/// `setup` section of a `ProjectSpec`: deterministic ConfigGenerator input.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Setup {
    /// Declared ecosystem dependencies.
    #[serde(default)]
    pub dependencies: Dependencies,
    /// Named start commands, e.g. `{"backend": "node server.js"}`.
    #[serde(default)]
    pub start_commands: HashMap<String, String>,
    /// Environment variables to template into `.env.example`.
    #[serde(default)]
    pub environment_variables: HashMap<String, String>,
    /// Declared Java version for Maven projects.
    #[serde(default)]
    pub java_version: Option<String>,
}

/// Deployment parameters (ports, API base URLs) forwarded to workers as
/// context but never interpreted by the core pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectConfig {
    /// Free-form key/value deployment parameters.
    #[serde(default)]
    pub values: HashMap<String, serde_json::Value>,
}

/// The input to the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSpec {
    /// Free-text requirement, e.g. "A calculator with +,-,*,/ and clear".
    pub summary: String,
    /// Ordered list of files to generate.
    pub files: Vec<FileSpec>,
    /// Initial contracts, folded in before Phase 1. May be empty.
    #[serde(default)]
    pub contracts: crate::contracts::Contracts,
    /// Deployment parameters.
    #[serde(default)]
    pub project_config: ProjectConfig,
    /// Deterministic setup/config generation input.
    #[serde(default)]
    pub setup: Setup,
}

/// `path → skeleton text` map produced by Phase 1. Order-independent.
pub type Skeletons = HashMap<String, String>;

/// Why a [`GeneratedFile`]'s content is what it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationMethod {
    /// `FileSpec.template` emitted verbatim, no LLM call.
    Template,
    /// `is_auto_generated` short-circuit, no LLM call.
    AutoGenerated,
    /// Primary path: a `WorkerGenerator` produced the body.
    WorkerLlm,
    /// A secondary/cloud provider answered after the primary provider failed.
    CloudLlmFallback,
    /// The mock client answered (test/`--mock` runs).
    MockFallback,
    /// The worker failed; skeleton text was substituted as content.
    SkeletonFallback,
}

/// Per-file generation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Tokens consumed generating this file (0 for deterministic methods).
    pub tokens_used: u32,
    /// Which path produced this file's content.
    pub method: GenerationMethod,
}

/// One file in the assembled project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Project-relative path.
    pub path: String,
    /// File content. Always non-empty.
    pub content: String,
    /// Free-text language tag, copied from the originating `FileSpec` when
    /// there is one.
    pub language: String,
    /// Populated when generation failed for this file; `content` is then
    /// the file's skeleton text.
    pub error: Option<String>,
    /// The dependency layer this file was produced in.
    pub layer: u32,
    /// Generation provenance.
    pub metadata: FileMetadata,
}

/// Aggregate counts surfaced on a [`GenerationResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Total number of files in the result (generated + setup).
    pub total_files: usize,
    /// Number of files whose `.error` is set.
    pub failed_files: usize,
    /// Sum of every file's `tokens_used`.
    pub total_tokens: u32,
    /// This crate's version, for reproducibility/debugging.
    pub pipeline_version: String,
}

/// The pipeline's sole output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    /// A generator-chosen unique identifier for this run.
    pub request_id: Uuid,
    /// When the run started, as an ISO-8601 timestamp.
    pub received_at: DateTime<Utc>,
    /// Every produced file, including deterministic setup files.
    pub files: Vec<GeneratedFile>,
    /// Human-readable log lines summarizing success/failure counts.
    pub notes: Vec<String>,
    /// Aggregate run metadata.
    pub metadata: RunMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_well_formed_relative_path() {
        let spec = FileSpec::new("public/index.html", "html", "the page").unwrap();
        assert_eq!(spec.extension(), "html");
        assert_eq!(spec.basename(), "index.html");
    }

    #[test]
    fn rejects_parent_traversal() {
        let err = FileSpec::new("../outside.js", "javascript", "x").unwrap_err();
        assert!(matches!(err, Error::InvalidFileSpec(_, _)));
    }

    #[test]
    fn rejects_absolute_paths() {
        let err = FileSpec::new("/etc/passwd", "text", "x").unwrap_err();
        assert!(matches!(err, Error::InvalidFileSpec(_, _)));
    }

    #[test]
    fn rejects_unrecognized_extensions() {
        let err = FileSpec::new("app.exe", "binary", "x").unwrap_err();
        assert!(matches!(err, Error::InvalidFileSpec(_, _)));
    }

    #[test]
    fn recognizes_extensionless_dockerfile() {
        let spec = FileSpec::new("Dockerfile", "docker", "container image").unwrap();
        assert_eq!(spec.extension(), "");
    }

    #[test]
    fn recognizes_dotfiles_without_further_extension() {
        let spec = FileSpec::new(".gitignore", "text", "ignore rules").unwrap();
        assert_eq!(spec.basename(), ".gitignore");
    }

    #[test]
    fn nested_path_extension_is_from_the_basename_only() {
        let spec = FileSpec::new("src/components/App.tsx", "typescript", "root component").unwrap();
        assert_eq!(spec.extension(), "tsx");
        assert_eq!(spec.basename(), "App.tsx");
    }

    #[test]
    fn project_spec_round_trips_through_json() {
        let spec = ProjectSpec {
            summary: "A calculator".into(),
            files: vec![FileSpec::new("public/index.html", "html", "page").unwrap()],
            contracts: crate::contracts::Contracts::default(),
            project_config: ProjectConfig::default(),
            setup: Setup::default(),
        };
        let json = serde_json::to_string(&spec).unwrap();
        let back: ProjectSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back.summary, "A calculator");
        assert_eq!(back.files.len(), 1);
    }
}
