//! Deterministic setup/config file emission. No LLM call: every file
//! here is produced by templating [`Setup`] fields, so output is byte-for-byte
//! reproducible for the same input.

use crate::model::{FileMetadata, GeneratedFile, GenerationMethod, Setup};
use std::collections::BTreeMap;

/// Layer marker for files produced after detail generation rather than
/// during it — there's no dependency-layer concept for config files.
pub const POST_PROCESS_LAYER: u32 = u32::MAX;

/// Produce every deterministic setup/config file implied by `setup`.
/// A `README.md` is always produced; the rest are conditional on `setup`
/// declaring the relevant section.
#[must_use]
pub fn generate(summary: &str, setup: &Setup) -> Vec<GeneratedFile> {
    let mut files = Vec::new();

    if !setup.dependencies.npm.is_empty() {
        files.push(file(
            "package.json",
            "json",
            package_json(&setup.dependencies.npm, &setup.start_commands),
        ));
    }
    if !setup.dependencies.python.is_empty() {
        files.push(file(
            "requirements.txt",
            "text",
            requirements_txt(&setup.dependencies.python),
        ));
    }
    if !setup.dependencies.maven.is_empty() {
        files.push(file(
            "pom.xml",
            "xml",
            pom_xml(&setup.dependencies.maven, setup.java_version.as_deref()),
        ));
    }
    if !setup.dependencies.go.is_empty() {
        files.push(file("go.mod", "text", go_mod(&setup.dependencies.go)));
    }
    if !setup.environment_variables.is_empty() {
        files.push(file(
            ".env.example",
            "text",
            env_example(&setup.environment_variables),
        ));
    }
    if !setup.start_commands.is_empty() {
        files.push(file("start.sh", "shellscript", start_sh(&setup.start_commands)));
        files.push(file("start.bat", "batch", start_bat(&setup.start_commands)));
    }

    files.push(file("README.md", "markdown", readme(summary, setup)));
    files
}

fn file(path: &str, language: &str, content: String) -> GeneratedFile {
    GeneratedFile {
        path: path.to_string(),
        content,
        language: language.to_string(),
        error: None,
        layer: POST_PROCESS_LAYER,
        metadata: FileMetadata {
            tokens_used: 0,
            method: GenerationMethod::AutoGenerated,
        },
    }
}

fn package_json(npm: &[String], start_commands: &std::collections::HashMap<String, String>) -> String {
    let mut deps = BTreeMap::new();
    for entry in npm {
        let (name, version) = entry.rsplit_once('@').unwrap_or((entry.as_str(), "latest"));
        deps.insert(name.to_string(), version.to_string());
    }
    let mut body = String::from("{\n  \"name\": \"generated-project\",\n  \"version\": \"0.1.0\",\n");

    let start = start_commands.get("start");
    let server = start_commands.get("server");
    if start.is_some() || server.is_some() {
        body.push_str("  \"scripts\": {\n");
        let entries: Vec<(&str, &String)> = [("start", start), ("server", server)]
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect();
        let count = entries.len();
        for (i, (key, command)) in entries.iter().enumerate() {
            let comma = if i + 1 < count { "," } else { "" };
            body.push_str(&format!("    \"{key}\": \"{command}\"{comma}\n"));
        }
        body.push_str("  },\n");
    }

    body.push_str("  \"dependencies\": {\n");
    let count = deps.len();
    for (i, (name, version)) in deps.iter().enumerate() {
        let comma = if i + 1 < count { "," } else { "" };
        body.push_str(&format!("    \"{name}\": \"{version}\"{comma}\n"));
    }
    body.push_str("  }\n}\n");
    body
}

fn requirements_txt(python: &[String]) -> String {
    let mut sorted = python.to_vec();
    sorted.sort();
    let mut body = sorted.join("\n");
    body.push('\n');
    body
}

fn pom_xml(maven: &[String], java_version: Option<&str>) -> String {
    let java_version = java_version.unwrap_or("17");
    let mut body = String::from(
        "<project xmlns=\"http://maven.apache.org/POM/4.0.0\">\n  <modelVersion>4.0.0</modelVersion>\n  <groupId>com.generated</groupId>\n  <artifactId>generated-project</artifactId>\n  <version>0.1.0</version>\n",
    );
    body.push_str(&format!(
        "  <properties>\n    <maven.compiler.source>{java_version}</maven.compiler.source>\n    <maven.compiler.target>{java_version}</maven.compiler.target>\n  </properties>\n"
    ));
    body.push_str("  <dependencies>\n");
    let mut sorted = maven.to_vec();
    sorted.sort();
    for coordinate in sorted {
        let mut parts = coordinate.splitn(3, ':');
        let group_id = parts.next().unwrap_or_default();
        let artifact_id = parts.next().unwrap_or_default();
        let version = parts.next().unwrap_or("LATEST");
        body.push_str(&format!(
            "    <dependency>\n      <groupId>{group_id}</groupId>\n      <artifactId>{artifact_id}</artifactId>\n      <version>{version}</version>\n    </dependency>\n"
        ));
    }
    body.push_str("  </dependencies>\n</project>\n");
    body
}

fn go_mod(go: &[String]) -> String {
    let mut sorted = go.to_vec();
    sorted.sort();
    let mut body = String::from("module generated-project\n\ngo 1.21\n\nrequire (\n");
    for requirement in sorted {
        body.push_str(&format!("\t{requirement}\n"));
    }
    body.push_str(")\n");
    body
}

fn env_example(vars: &std::collections::HashMap<String, String>) -> String {
    let sorted: BTreeMap<&String, &String> = vars.iter().collect();
    let mut body = String::new();
    for (key, value) in sorted {
        body.push_str(&format!("{key}={value}\n"));
    }
    body
}

fn start_sh(commands: &std::collections::HashMap<String, String>) -> String {
    let sorted: BTreeMap<&String, &String> = commands.iter().collect();
    let mut body = String::from("#!/usr/bin/env bash\nset -e\n\n");
    for (name, command) in sorted {
        body.push_str(&format!("# {name}\n{command}\n"));
    }
    body
}

fn start_bat(commands: &std::collections::HashMap<String, String>) -> String {
    let sorted: BTreeMap<&String, &String> = commands.iter().collect();
    let mut body = String::from("@echo off\n\n");
    for (name, command) in sorted {
        body.push_str(&format!("rem {name}\n{command}\n"));
    }
    body
}

fn readme(summary: &str, setup: &Setup) -> String {
    let mut body = format!("# Generated project\n\n{summary}\n");
    if !setup.start_commands.is_empty() {
        body.push_str("\n## Running\n\n```\n");
        let sorted: BTreeMap<&String, &String> = setup.start_commands.iter().collect();
        for (name, command) in sorted {
            body.push_str(&format!("{name}: {command}\n"));
        }
        body.push_str("```\n");
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dependencies;

    fn find<'a>(files: &'a [GeneratedFile], path: &str) -> &'a GeneratedFile {
        files.iter().find(|f| f.path == path).unwrap_or_else(|| panic!("{path} not generated"))
    }

    #[test]
    fn readme_is_always_generated() {
        let files = generate("A calculator", &Setup::default());
        assert!(files.iter().any(|f| f.path == "README.md"));
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn npm_dependencies_produce_package_json_with_parsed_versions() {
        let setup = Setup {
            dependencies: Dependencies {
                npm: vec!["express@4.18.0".to_string(), "left-pad".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        let files = generate("An API", &setup);
        let package_json = &find(&files, "package.json").content;
        assert!(package_json.contains("\"express\": \"4.18.0\""));
        assert!(package_json.contains("\"left-pad\": \"latest\""));
    }

    #[test]
    fn npm_start_commands_produce_package_json_scripts() {
        let mut setup = Setup {
            dependencies: Dependencies {
                npm: vec!["express@4.18.0".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        setup.start_commands.insert("start".to_string(), "node index.js".to_string());
        setup.start_commands.insert("server".to_string(), "node server.js".to_string());
        let files = generate("An API", &setup);
        let package_json = &find(&files, "package.json").content;
        assert!(package_json.contains("\"start\": \"node index.js\""));
        assert!(package_json.contains("\"server\": \"node server.js\""));
    }

    #[test]
    fn python_dependencies_produce_sorted_requirements_txt() {
        let setup = Setup {
            dependencies: Dependencies {
                python: vec!["flask".to_string(), "click".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        let files = generate("A service", &setup);
        assert_eq!(find(&files, "requirements.txt").content, "click\nflask\n");
    }

    #[test]
    fn environment_variables_produce_sorted_env_example() {
        let mut setup = Setup::default();
        setup.environment_variables.insert("PORT".to_string(), "3000".to_string());
        setup.environment_variables.insert("API_KEY".to_string(), "changeme".to_string());
        let files = generate("A service", &setup);
        assert_eq!(
            find(&files, ".env.example").content,
            "API_KEY=changeme\nPORT=3000\n"
        );
    }

    #[test]
    fn start_commands_produce_both_shell_and_batch_scripts() {
        let mut setup = Setup::default();
        setup.start_commands.insert("backend".to_string(), "node server.js".to_string());
        let files = generate("An app", &setup);
        assert!(find(&files, "start.sh").content.contains("node server.js"));
        assert!(find(&files, "start.bat").content.contains("node server.js"));
    }

    #[test]
    fn config_generation_is_deterministic_across_calls() {
        let mut setup = Setup::default();
        setup.dependencies.go = vec!["github.com/gin-gonic/gin v1.9.0".to_string()];
        let first = generate("x", &setup);
        let second = generate("x", &setup);
        assert_eq!(
            find(&first, "go.mod").content,
            find(&second, "go.mod").content
        );
    }
}
