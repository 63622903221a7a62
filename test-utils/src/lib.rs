//! Fixture `ProjectSpec`s and re-exported LLM test doubles, shared by every
//! crate's test suite so integration-style tests don't each hand-roll the
//! same small project.

pub use codeforge_llm::MockLLMClient;

use codeforge_core::model::{FileSpec, ProjectConfig, ProjectSpec, Setup};
use codeforge_core::contracts::Contracts;

/// A single-file project: one JavaScript entry point, no dependencies.
#[must_use]
pub fn single_file_project(path: &str, language: &str, description: &str) -> ProjectSpec {
    ProjectSpec {
        summary: description.to_string(),
        files: vec![FileSpec::new(path, language, description).unwrap()],
        contracts: Contracts::default(),
        project_config: ProjectConfig::default(),
        setup: Setup::default(),
    }
}

/// A small calculator web app: an HTML page, its stylesheet, and its
/// script, wired together the way a DOM-id/selector-based app commonly is.
#[must_use]
pub fn calculator_project() -> ProjectSpec {
    let files = vec![
        FileSpec::new(
            "public/index.html",
            "html",
            "The calculator's single page: a display and a button grid",
        )
        .unwrap()
        .with_requirements(vec!["buttons for 0-9, +, -, *, /, =, C".to_string()]),
        FileSpec::new("public/style.css", "css", "Calculator layout and button styling").unwrap(),
        FileSpec::new(
            "public/app.js",
            "javascript",
            "Wires up button clicks and evaluates the expression",
        )
        .unwrap(),
    ];
    ProjectSpec {
        summary: "A calculator web app with +, -, *, /, and clear".to_string(),
        files,
        contracts: Contracts::default(),
        project_config: ProjectConfig::default(),
        setup: Setup::default(),
    }
}

/// A small Flask-style API project: one server file exposing a couple of
/// routes, plus a requirements file declaration in `setup`.
#[must_use]
pub fn flask_api_project() -> ProjectSpec {
    let files = vec![FileSpec::new(
        "server.py",
        "python",
        "A Flask app exposing /api/items as GET and POST",
    )
    .unwrap()];
    let mut setup = Setup::default();
    setup.dependencies.python = vec!["flask".to_string()];
    setup
        .start_commands
        .insert("backend".to_string(), "python server.py".to_string());
    ProjectSpec {
        summary: "A small item-tracking API".to_string(),
        files,
        contracts: Contracts::default(),
        project_config: ProjectConfig::default(),
        setup,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculator_project_has_three_files() {
        let spec = calculator_project();
        assert_eq!(spec.files.len(), 3);
    }

    #[test]
    fn flask_api_project_declares_a_python_dependency() {
        let spec = flask_api_project();
        assert_eq!(spec.setup.dependencies.python, vec!["flask".to_string()]);
    }

    #[test]
    fn single_file_project_has_exactly_one_file() {
        let spec = single_file_project("main.go", "go", "entry point");
        assert_eq!(spec.files.len(), 1);
        assert_eq!(spec.files[0].path, "main.go");
    }
}
