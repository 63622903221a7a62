//! Read-only cross-file contract checking. Never mutates
//! [`Contracts`]; produces a [`ValidationResult`] the coordinator hands to
//! [`super::autofix`] and, for what remains, [`super::repair`].

use super::{ContractEntry, ContractKind, Contracts, ParamStyle, Schema, Shape};
use crate::model::GeneratedFile;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn regex_cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static validator regex is valid"))
}

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {{
        static CELL: OnceLock<Regex> = OnceLock::new();
        regex_cached(&CELL, $pattern)
    }};
}

/// `true` when `path` looks like a markup file this validator should scan
/// for `<option>`/`<script>` tags.
#[must_use]
pub(crate) fn is_html(path: &str) -> bool {
    let ext = path.rsplit('.').next().unwrap_or_default().to_lowercase();
    ext == "html" || ext == "htm"
}

/// `true` when `path` looks like a script file this validator (and
/// [`super::autofix`]) should scan for string literals / export syntax.
#[must_use]
pub(crate) fn is_script(path: &str) -> bool {
    matches!(
        path.rsplit('.').next().unwrap_or_default().to_lowercase().as_str(),
        "js" | "ts" | "jsx" | "tsx" | "mjs" | "cjs"
    )
}

/// One validator-found problem with a single contract entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Which table the offending entry lives in.
    pub kind: ContractKind,
    /// The contract key the issue is about.
    pub key: String,
    /// The issue taxonomy tag.
    pub category: IssueCategory,
    /// Human-readable detail for logs/repair prompts.
    pub detail: String,
}

/// The fixed issue taxonomy. `missing-consumer` and `schema-mismatch`
/// are flagged here but declared unfixable by [`super::autofix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueCategory {
    /// A consumer references a key with no registered producer.
    MissingProducer,
    /// A producer registers a key nothing ever consumes.
    MissingConsumer,
    /// Two files appear to mean the same thing but spell the key differently.
    NameMismatch,
    /// The key's casing convention differs from its sibling keys.
    NamingStyleMismatch,
    /// Producer and consumer disagree about positional vs. object parameters.
    ParameterShapeMismatch,
    /// A `<select>` option value and the code checking against it differ only
    /// in case.
    SelectOptionCaseMismatch,
    /// A module import specifier resolves to a path with no producer.
    PathReferenceError,
    /// An export/import syntax pairing is malformed (e.g. default vs. named).
    ExportSyntaxError,
    /// Two producers registered genuinely incompatible schemas for one key.
    SchemaMismatch,
}

impl IssueCategory {
    /// Short label used in logs and repair prompts.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            IssueCategory::MissingProducer => "missing-producer",
            IssueCategory::MissingConsumer => "missing-consumer",
            IssueCategory::NameMismatch => "name-mismatch",
            IssueCategory::NamingStyleMismatch => "naming-style-mismatch",
            IssueCategory::ParameterShapeMismatch => "parameter-shape-mismatch",
            IssueCategory::SelectOptionCaseMismatch => "select-option-case-mismatch",
            IssueCategory::PathReferenceError => "path-reference-error",
            IssueCategory::ExportSyntaxError => "export-syntax-error",
            IssueCategory::SchemaMismatch => "schema-mismatch",
        }
    }

    /// Whether [`super::autofix::ContractAutoFixer`] can resolve this
    /// category deterministically. `MissingConsumer` and `SchemaMismatch`
    /// are not: the former may be intentional (a public API with no caller
    /// yet), the latter requires judgment [`super::repair`] supplies.
    #[must_use]
    pub fn is_autofixable(self) -> bool {
        !matches!(
            self,
            IssueCategory::MissingConsumer | IssueCategory::SchemaMismatch
        )
    }
}

/// The full output of one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Every issue found, in table order then key order (deterministic).
    pub issues: Vec<Issue>,
}

impl ValidationResult {
    /// `true` when nothing was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Run every check against `contracts` and `files` and return the combined
/// result. `files` is the assembled project output (generated files plus
/// deterministic config files); the text-level checks scan it directly
/// rather than going through the `Contracts` bookkeeping.
#[must_use]
pub fn validate(contracts: &Contracts, files: &[GeneratedFile]) -> ValidationResult {
    let mut issues = Vec::new();
    for kind in ContractKind::ALL {
        let table = contracts.table(kind);
        for (key, entry) in table {
            check_producer_consumer_balance(kind, key, entry, &mut issues);
            check_schema_conflict(kind, key, entry, &mut issues);
            check_parameter_shape(kind, key, entry, &mut issues);
        }
        check_naming_style(kind, table, &mut issues);
        check_name_mismatches(kind, table, &mut issues);
    }
    check_select_option_case_mismatches(files, &mut issues);
    check_export_syntax_errors(files, &mut issues);
    ValidationResult { issues }
}

fn check_producer_consumer_balance(
    kind: ContractKind,
    key: &str,
    entry: &ContractEntry,
    issues: &mut Vec<Issue>,
) {
    if entry.producers.is_empty() && !entry.consumers.is_empty() {
        let category = if kind == ContractKind::Module {
            IssueCategory::PathReferenceError
        } else {
            IssueCategory::MissingProducer
        };
        issues.push(Issue {
            kind,
            key: key.to_string(),
            category,
            detail: format!(
                "{} is referenced by {:?} but nothing produces it",
                key, entry.consumers
            ),
        });
    }
    if entry.consumers.is_empty() && !entry.producers.is_empty() {
        issues.push(Issue {
            kind,
            key: key.to_string(),
            category: IssueCategory::MissingConsumer,
            detail: format!("{key} is produced by {:?} but never consumed", entry.producers),
        });
    }
}

fn check_schema_conflict(kind: ContractKind, key: &str, entry: &ContractEntry, issues: &mut Vec<Issue>) {
    if !entry.conflicting_schemas.is_empty() {
        issues.push(Issue {
            kind,
            key: key.to_string(),
            category: IssueCategory::SchemaMismatch,
            detail: format!(
                "{key} has {} conflicting schema observation(s)",
                entry.conflicting_schemas.len()
            ),
        });
    }
}

fn shape_kind_label(shape: &Shape) -> Option<&'static str> {
    match shape {
        Shape::Unknown => None,
        Shape::Positional(_) => Some("positional"),
        Shape::Object(_) => Some("object"),
    }
}

fn check_parameter_shape(kind: ContractKind, key: &str, entry: &ContractEntry, issues: &mut Vec<Issue>) {
    let (request, _param_style): (&Shape, ParamStyle) = match &entry.schema {
        Schema::Api {
            request_shape,
            param_style,
            ..
        } => (request_shape, *param_style),
        _ => return,
    };
    for conflicting in &entry.conflicting_schemas {
        if let Schema::Api {
            request_shape: other_request,
            ..
        } = conflicting
        {
            if let (Some(a), Some(b)) = (shape_kind_label(request), shape_kind_label(other_request)) {
                if a != b {
                    issues.push(Issue {
                        kind,
                        key: key.to_string(),
                        category: IssueCategory::ParameterShapeMismatch,
                        detail: format!(
                            "{key} is called with {a} arguments in one place and {b} in another"
                        ),
                    });
                }
            }
        }
    }
}

fn naming_style(key: &str) -> &'static str {
    if key.contains('-') {
        "kebab-case"
    } else if key.contains('_') {
        "snake_case"
    } else if key.chars().next().is_some_and(|c| c.is_uppercase()) {
        "PascalCase"
    } else if key.chars().any(|c| c.is_uppercase()) {
        "camelCase"
    } else {
        "lowercase"
    }
}

/// Flags `naming-style-mismatch`: when the majority of keys in a table
/// agree on a casing convention, flag the minority that doesn't.
fn check_naming_style(
    kind: ContractKind,
    table: &std::collections::BTreeMap<String, ContractEntry>,
    issues: &mut Vec<Issue>,
) {
    if table.len() < 3 {
        return;
    }
    let mut counts: std::collections::HashMap<&'static str, usize> = std::collections::HashMap::new();
    let styles: Vec<(&String, &'static str)> = table
        .keys()
        .map(|key| (key, naming_style(key)))
        .collect();
    for (_, style) in &styles {
        *counts.entry(style).or_insert(0) += 1;
    }
    let Some((&dominant, &dominant_count)) = counts.iter().max_by_key(|(_, count)| **count) else {
        return;
    };
    if dominant_count * 2 < table.len() {
        // No clear majority convention; nothing to flag against.
        return;
    }
    for (key, style) in styles {
        if style != dominant {
            issues.push(Issue {
                kind,
                key: key.clone(),
                category: IssueCategory::NamingStyleMismatch,
                detail: format!("{key} is {style} but most {} keys are {dominant}", kind.label()),
            });
        }
    }
}

/// Flags `name-mismatch`: two keys that normalize (case/separator
/// insensitive) to the same identifier but are spelled differently, where
/// one side has no producer — a likely typo rather than two real features.
fn check_name_mismatches(
    kind: ContractKind,
    table: &std::collections::BTreeMap<String, ContractEntry>,
    issues: &mut Vec<Issue>,
) {
    let normalize = |s: &str| s.to_lowercase().replace(['-', '_'], "");
    let keys: Vec<&String> = table.keys().collect();
    for i in 0..keys.len() {
        for j in (i + 1)..keys.len() {
            let (a, b) = (keys[i], keys[j]);
            if a == b {
                continue;
            }
            if normalize(a) == normalize(b) {
                let entry_a = &table[a];
                let entry_b = &table[b];
                if entry_a.producers.is_empty() != entry_b.producers.is_empty() {
                    let orphan = if entry_a.producers.is_empty() { a } else { b };
                    issues.push(Issue {
                        kind,
                        key: orphan.clone(),
                        category: IssueCategory::NameMismatch,
                        detail: format!("{a} and {b} look like the same identifier, spelled differently"),
                    });
                }
            }
        }
    }
}

/// Flags `select-option-case-mismatch`: a `<option value="X">` in a markup
/// file compared, in a sibling script, against a string literal that
/// differs from `X` only in case — the comparison will silently never
/// match at runtime.
fn check_select_option_case_mismatches(files: &[GeneratedFile], issues: &mut Vec<Issue>) {
    let option_re = cached_regex!(OPTION_VALUE, r#"<option\b[^>]*\bvalue\s*=\s*["']([^"']*)["']"#);
    let literal_re = cached_regex!(STRING_LITERAL, r#"['"]([A-Za-z][\w-]*)['"]"#);
    for html in files.iter().filter(|f| is_html(&f.path)) {
        for caps in option_re.captures_iter(&html.content) {
            let Some(value) = caps.get(1).map(|m| m.as_str()) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            for script in files.iter().filter(|f| is_script(&f.path)) {
                for lit in literal_re.captures_iter(&script.content) {
                    let Some(candidate) = lit.get(1).map(|m| m.as_str()) else {
                        continue;
                    };
                    if candidate != value && candidate.eq_ignore_ascii_case(value) {
                        issues.push(Issue {
                            kind: ContractKind::Dom,
                            key: value.to_string(),
                            category: IssueCategory::SelectOptionCaseMismatch,
                            detail: format!(
                                "<option value=\"{value}\"> in {} differs only in case from the literal {candidate:?} compared against it in {}",
                                html.path, script.path
                            ),
                        });
                    }
                }
            }
        }
    }
}

/// Flags `export-syntax-error`: a `<script src="X">` tag with no
/// `type="module"` whose target file uses ES module export syntax — the
/// browser will refuse to run it as a classic script.
fn check_export_syntax_errors(files: &[GeneratedFile], issues: &mut Vec<Issue>) {
    let script_tag = cached_regex!(
        SCRIPT_TAG,
        r#"<script\b([^>]*)\bsrc\s*=\s*["']([^"']+)["']([^>]*)>"#
    );
    for html in files.iter().filter(|f| is_html(&f.path)) {
        for caps in script_tag.captures_iter(&html.content) {
            let before = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let target = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            let after = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
            if before.contains("type=\"module\"") || after.contains("type=\"module\"") {
                continue;
            }
            let Some(script) = files
                .iter()
                .filter(|f| is_script(&f.path))
                .find(|f| f.path.ends_with(target.trim_start_matches("./")))
            else {
                continue;
            };
            if uses_export_syntax(&script.content) {
                issues.push(Issue {
                    kind: ContractKind::Module,
                    key: script.path.clone(),
                    category: IssueCategory::ExportSyntaxError,
                    detail: format!(
                        "{} is loaded from {} without type=\"module\" but uses export syntax",
                        script.path, html.path
                    ),
                });
            }
        }
    }
}

fn uses_export_syntax(content: &str) -> bool {
    content.contains("export default") || content.contains("export {") || content.contains("export const")
        || content.contains("export function")
        || content.contains("export class")
        || content.contains("export let")
        || content.contains("export var")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn producer_only(key: &str, producer: &str) -> ContractEntry {
        let mut e = ContractEntry::new(key);
        e.producers.insert(producer.to_string());
        e
    }

    fn consumer_only(key: &str, consumer: &str) -> ContractEntry {
        let mut e = ContractEntry::new(key);
        e.consumers.insert(consumer.to_string());
        e
    }

    fn generated(path: &str, content: &str) -> GeneratedFile {
        GeneratedFile {
            path: path.to_string(),
            content: content.to_string(),
            language: "text".to_string(),
            error: None,
            layer: 0,
            metadata: crate::model::FileMetadata {
                tokens_used: 0,
                method: crate::model::GenerationMethod::Template,
            },
        }
    }

    #[test]
    fn flags_missing_producer_for_dom_consumer_with_no_producer() {
        let mut contracts = Contracts::default();
        contracts.upsert(ContractKind::Dom, consumer_only("save-btn", "index.js"));
        let result = validate(&contracts, &[]);
        assert!(result
            .issues
            .iter()
            .any(|i| i.category == IssueCategory::MissingProducer && i.key == "save-btn"));
    }

    #[test]
    fn flags_missing_consumer_for_produced_but_unused_key() {
        let mut contracts = Contracts::default();
        contracts.upsert(ContractKind::Dom, producer_only("save-btn", "index.html"));
        let result = validate(&contracts, &[]);
        assert!(result
            .issues
            .iter()
            .any(|i| i.category == IssueCategory::MissingConsumer));
    }

    #[test]
    fn missing_consumer_is_not_autofixable() {
        assert!(!IssueCategory::MissingConsumer.is_autofixable());
        assert!(!IssueCategory::SchemaMismatch.is_autofixable());
        assert!(IssueCategory::MissingProducer.is_autofixable());
    }

    #[test]
    fn flags_schema_mismatch_when_conflicting_schemas_recorded() {
        let mut entry = ContractEntry::new("saveNote");
        entry.producers.insert("preload.js".to_string());
        entry.consumers.insert("renderer.js".to_string());
        entry.conflicting_schemas.push(Schema::Module {
            exports: vec!["other".into()],
        });
        let mut contracts = Contracts::default();
        contracts.upsert(ContractKind::Module, entry);

        let result = validate(&contracts, &[]);
        assert!(result
            .issues
            .iter()
            .any(|i| i.category == IssueCategory::SchemaMismatch));
    }

    #[test]
    fn flags_naming_style_outlier_against_majority_convention() {
        let mut contracts = Contracts::default();
        for key in ["save-note", "load-note", "delete-note", "clearAll"] {
            let mut e = ContractEntry::new(key);
            e.producers.insert("main.js".into());
            e.consumers.insert("renderer.js".into());
            contracts.upsert(ContractKind::Api, e);
        }
        let result = validate(&contracts, &[]);
        assert!(result.issues.iter().any(
            |i| i.category == IssueCategory::NamingStyleMismatch && i.key == "clearAll"
        ));
    }

    #[test]
    fn flags_name_mismatch_between_near_identical_orphan_keys() {
        let mut contracts = Contracts::default();
        contracts.upsert(ContractKind::Event, producer_only("note-saved", "main.js"));
        contracts.upsert(ContractKind::Event, consumer_only("noteSaved", "renderer.js"));
        let result = validate(&contracts, &[]);
        assert!(result
            .issues
            .iter()
            .any(|i| i.category == IssueCategory::NameMismatch));
    }

    #[test]
    fn clean_contracts_produce_no_issues() {
        let mut contracts = Contracts::default();
        let mut entry = ContractEntry::new("theme");
        entry.producers.insert("a.js".into());
        entry.consumers.insert("b.js".into());
        contracts.upsert(ContractKind::Storage, entry);
        let result = validate(&contracts, &[]);
        assert!(result.is_clean());
    }

    #[test]
    fn flags_select_option_case_mismatch_against_sibling_script() {
        let html = generated("index.html", r#"<select id="color"><option value="Red">Red</option></select>"#);
        let script = generated("app.js", r#"if (value === 'red') { apply(); }"#);
        let result = validate(&Contracts::default(), &[html, script]);
        assert!(result
            .issues
            .iter()
            .any(|i| i.category == IssueCategory::SelectOptionCaseMismatch && i.key == "Red"));
    }

    #[test]
    fn exact_case_match_is_not_flagged() {
        let html = generated("index.html", r#"<option value="red">Red</option>"#);
        let script = generated("app.js", r#"if (value === 'red') { apply(); }"#);
        let result = validate(&Contracts::default(), &[html, script]);
        assert!(!result
            .issues
            .iter()
            .any(|i| i.category == IssueCategory::SelectOptionCaseMismatch));
    }

    #[test]
    fn flags_export_syntax_error_for_non_module_script_tag() {
        let html = generated("index.html", r#"<script src="app.js"></script>"#);
        let script = generated("app.js", "export function run() {}\n");
        let result = validate(&Contracts::default(), &[html, script]);
        assert!(result
            .issues
            .iter()
            .any(|i| i.category == IssueCategory::ExportSyntaxError && i.key == "app.js"));
    }

    #[test]
    fn module_type_script_tag_is_not_flagged() {
        let html = generated("index.html", r#"<script type="module" src="app.js"></script>"#);
        let script = generated("app.js", "export function run() {}\n");
        let result = validate(&Contracts::default(), &[html, script]);
        assert!(!result
            .issues
            .iter()
            .any(|i| i.category == IssueCategory::ExportSyntaxError));
    }
}
