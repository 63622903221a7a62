//! Deterministic, idempotent repair of the issue categories flagged by
//! [`super::validator`] that don't require judgment.
//! `missing-consumer` and `schema-mismatch` are not handled here; they fall
//! through to [`super::repair`].

use super::validator::{is_html, is_script, Issue, IssueCategory, ValidationResult};
use super::{ContractEntry, ContractKind, Contracts, Schema, Shape};
use crate::model::GeneratedFile;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;
use tracing::info;

fn regex_cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static autofix regex is valid"))
}

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {{
        static CELL: OnceLock<Regex> = OnceLock::new();
        regex_cached(&CELL, $pattern)
    }};
}

/// One change `ContractAutoFixer` made, kept for logging and for the
/// repair-agent prompt (so it doesn't redo work already fixed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fix {
    /// The issue this fix addresses.
    pub issue: Issue,
    /// What changed, in human-readable form.
    pub description: String,
}

/// What came out of one autofix pass: fixes applied and issues left for
/// [`super::repair`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoFixOutcome {
    /// Fixes applied, in the order they were made.
    pub fixes: Vec<Fix>,
    /// Issues autofix declined to touch (unfixable categories, or fixable
    /// categories it couldn't resolve with the information on hand).
    pub remaining: Vec<Issue>,
}

/// Apply every deterministic fix this pass can make to `contracts` and
/// `files` in place, returning what happened. Calling this again on the
/// result is a no-op (idempotent): a key renamed into alignment has no
/// remaining `name-mismatch` issue to refix.
pub fn autofix(contracts: &mut Contracts, files: &mut [GeneratedFile], result: &ValidationResult) -> AutoFixOutcome {
    let mut outcome = AutoFixOutcome::default();
    for issue in &result.issues {
        if !issue.category.is_autofixable() {
            outcome.remaining.push(issue.clone());
            continue;
        }
        match issue.category {
            IssueCategory::NameMismatch => fix_name_mismatch(contracts, files, issue, &mut outcome),
            IssueCategory::NamingStyleMismatch => {
                fix_naming_style_mismatch(contracts, files, issue, &mut outcome)
            }
            IssueCategory::SelectOptionCaseMismatch => fix_select_option_case(files, issue, &mut outcome),
            IssueCategory::MissingProducer => fix_missing_producer(contracts, files, issue, &mut outcome),
            IssueCategory::ParameterShapeMismatch => {
                fix_parameter_shape_mismatch(contracts, files, issue, &mut outcome)
            }
            IssueCategory::PathReferenceError => fix_path_reference_error(contracts, files, issue, &mut outcome),
            IssueCategory::ExportSyntaxError => fix_export_syntax_error(files, issue, &mut outcome),
            _ => outcome.remaining.push(issue.clone()),
        }
    }
    outcome
}

/// Every file currently registered as a producer or consumer of `key`,
/// before a rename removes that bookkeeping.
pub(crate) fn affected_paths(contracts: &Contracts, kind: ContractKind, key: &str) -> BTreeSet<String> {
    contracts
        .table(kind)
        .get(key)
        .map(|e| e.producers.union(&e.consumers).cloned().collect())
        .unwrap_or_default()
}

/// Rewrite quoted occurrences of `from` to `to` in every file in `paths`.
/// Returns whether any file actually changed.
pub(crate) fn rename_in_files(files: &mut [GeneratedFile], paths: &BTreeSet<String>, from: &str, to: &str) -> bool {
    let mut changed = false;
    for file in files.iter_mut() {
        if !paths.contains(&file.path) {
            continue;
        }
        let patched = file
            .content
            .replace(&format!("'{from}'"), &format!("'{to}'"))
            .replace(&format!("\"{from}\""), &format!("\"{to}\""));
        if patched != file.content {
            file.content = patched;
            changed = true;
        }
    }
    changed
}

fn rename_key(contracts: &mut Contracts, kind: ContractKind, from: &str, to: &str) -> bool {
    let table = contracts.table_mut(kind);
    let Some(mut entry) = table.remove(from) else {
        return false;
    };
    entry.key = to.to_string();
    match table.remove(to) {
        Some(mut canonical) => {
            canonical.producers.extend(entry.producers);
            canonical.consumers.extend(entry.consumers);
            table.insert(to.to_string(), canonical);
        }
        None => {
            table.insert(to.to_string(), entry);
        }
    }
    true
}

fn mark_producer(contracts: &mut Contracts, kind: ContractKind, key: &str, path: &str) {
    let table = contracts.table_mut(kind);
    match table.get_mut(key) {
        Some(entry) => {
            entry.producers.insert(path.to_string());
        }
        None => {
            let mut entry = ContractEntry::new(key);
            entry.producers.insert(path.to_string());
            table.insert(key.to_string(), entry);
        }
    }
}

/// Normalize the orphan spelling flagged by the validator into the
/// dominant spelling already present, so it picks up the existing
/// producer or consumer, and rewrite the matching string literal in every
/// file that referenced the orphan spelling.
fn fix_name_mismatch(
    contracts: &mut Contracts,
    files: &mut [GeneratedFile],
    issue: &Issue,
    outcome: &mut AutoFixOutcome,
) {
    let table = contracts.table(issue.kind);
    let canonical = table
        .keys()
        .find(|k| {
            *k != &issue.key
                && k.to_lowercase().replace(['-', '_'], "")
                    == issue.key.to_lowercase().replace(['-', '_'], "")
        })
        .cloned();
    let Some(canonical) = canonical else {
        outcome.remaining.push(issue.clone());
        return;
    };
    let affected = affected_paths(contracts, issue.kind, &issue.key);
    if rename_key(contracts, issue.kind, &issue.key, &canonical) {
        rename_in_files(files, &affected, &issue.key, &canonical);
        let description = format!("renamed {} to {canonical}", issue.key);
        info!(kind = issue.kind.label(), from = %issue.key, to = %canonical, "autofixed name-mismatch");
        outcome.fixes.push(Fix {
            issue: issue.clone(),
            description,
        });
    } else {
        outcome.remaining.push(issue.clone());
    }
}

fn to_kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if ch == '_' {
            out.push('-');
        } else if ch.is_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Rewrite an outlier key into kebab-case, the convention the validator
/// compares everything else against in practice (DOM ids and event names
/// in this corpus are overwhelmingly kebab-case).
fn fix_naming_style_mismatch(
    contracts: &mut Contracts,
    files: &mut [GeneratedFile],
    issue: &Issue,
    outcome: &mut AutoFixOutcome,
) {
    let normalized = to_kebab_case(&issue.key);
    if normalized == issue.key {
        outcome.remaining.push(issue.clone());
        return;
    }
    let affected = affected_paths(contracts, issue.kind, &issue.key);
    if rename_key(contracts, issue.kind, &issue.key, &normalized) {
        rename_in_files(files, &affected, &issue.key, &normalized);
        info!(kind = issue.kind.label(), from = %issue.key, to = %normalized, "autofixed naming-style-mismatch");
        outcome.fixes.push(Fix {
            issue: issue.clone(),
            description: format!("renamed {} to {normalized}", issue.key),
        });
    } else {
        outcome.remaining.push(issue.clone());
    }
}

/// A `<select>` option value and the code comparing against it differ only
/// in case. Rewrites the HTML attribute to match the case used by the
/// comparison in the sibling script, since the comparison is almost always
/// the fixed end (a literal check) and the markup is the generated one.
fn fix_select_option_case(files: &mut [GeneratedFile], issue: &Issue, outcome: &mut AutoFixOutcome) {
    let option_re = cached_regex!(OPTION_VALUE, r#"<option\b[^>]*\bvalue\s*=\s*["']([^"']*)["']"#);
    let literal_re = cached_regex!(STRING_LITERAL, r#"['"]([A-Za-z][\w-]*)['"]"#);

    let canonical = files
        .iter()
        .filter(|f| is_script(&f.path))
        .flat_map(|f| literal_re.captures_iter(&f.content).filter_map(|c| c.get(1).map(|m| m.as_str().to_string())).collect::<Vec<_>>())
        .find(|candidate| candidate.eq_ignore_ascii_case(&issue.key) && *candidate != issue.key);

    let Some(canonical) = canonical else {
        outcome.remaining.push(issue.clone());
        return;
    };

    let mut changed = false;
    for file in files.iter_mut().filter(|f| is_html(&f.path)) {
        if !option_re.is_match(&file.content) {
            continue;
        }
        let patched = file
            .content
            .replace(&format!("value=\"{}\"", issue.key), &format!("value=\"{canonical}\""))
            .replace(&format!("value='{}'", issue.key), &format!("value='{canonical}'"));
        if patched != file.content {
            file.content = patched;
            changed = true;
        }
    }

    if changed {
        info!(from = %issue.key, to = %canonical, "autofixed select-option-case-mismatch");
        outcome.fixes.push(Fix {
            issue: issue.clone(),
            description: format!("aligned <option value> case of {} with {canonical}", issue.key),
        });
    } else {
        outcome.remaining.push(issue.clone());
    }
}

/// A route key like `GET /api/items` or a bare IPC channel name with
/// consumers but no producer: inject a minimal handler stub into the most
/// plausible existing server/main file.
fn fix_missing_producer(
    contracts: &mut Contracts,
    files: &mut [GeneratedFile],
    issue: &Issue,
    outcome: &mut AutoFixOutcome,
) {
    match issue.kind {
        ContractKind::Api => fix_missing_api_producer(contracts, files, issue, outcome),
        ContractKind::Event => fix_missing_event_producer(contracts, files, issue, outcome),
        _ => outcome.remaining.push(issue.clone()),
    }
}

fn fix_missing_api_producer(
    contracts: &mut Contracts,
    files: &mut [GeneratedFile],
    issue: &Issue,
    outcome: &mut AutoFixOutcome,
) {
    if let Some((method, route)) = issue.key.split_once(' ') {
        let target = files
            .iter_mut()
            .find(|f| f.content.contains("@app.route") || f.path.ends_with("server.py"));
        if let Some(target) = target {
            let flask_method = method.to_uppercase();
            target.content.push_str(&format!(
                "\n\n@app.route('{route}', methods=['{flask_method}'])\ndef {}():\n    return {{}}\n",
                route.trim_matches('/').replace(['/', '-'], "_").replace(':', "")
            ));
            mark_producer(contracts, ContractKind::Api, &issue.key, &target.path);
            outcome.fixes.push(Fix {
                issue: issue.clone(),
                description: format!("injected a stub Flask route for {}", issue.key),
            });
            return;
        }
    }

    let target = files.iter_mut().find(|f| f.path.ends_with("main.js") || f.content.contains("ipcMain"));
    if let Some(target) = target {
        target.content.push_str(&format!(
            "\nipcMain.handle('{}', async (event) => {{\n  return null;\n}});\n",
            issue.key
        ));
        mark_producer(contracts, ContractKind::Api, &issue.key, &target.path);
        outcome.fixes.push(Fix {
            issue: issue.clone(),
            description: format!("injected a stub IPC handler for {}", issue.key),
        });
        return;
    }

    outcome.remaining.push(issue.clone());
}

fn fix_missing_event_producer(
    contracts: &mut Contracts,
    files: &mut [GeneratedFile],
    issue: &Issue,
    outcome: &mut AutoFixOutcome,
) {
    let target = files
        .iter_mut()
        .find(|f| is_script(&f.path) && f.content.contains(&format!("addEventListener('{}'", issue.key)));
    if let Some(target) = target {
        target.content.push_str(&format!(
            "\ndocument.dispatchEvent(new CustomEvent('{}'));\n",
            issue.key
        ));
        mark_producer(contracts, ContractKind::Event, &issue.key, &target.path);
        outcome.fixes.push(Fix {
            issue: issue.clone(),
            description: format!("injected a stub dispatch for event {}", issue.key),
        });
    } else {
        outcome.remaining.push(issue.clone());
    }
}

fn object_fields_of(schema: &Schema) -> Option<Vec<String>> {
    match schema {
        Schema::Api {
            request_shape: Shape::Object(fields),
            ..
        } => Some(fields.clone()),
        _ => None,
    }
}

/// An `ipcRenderer.invoke('key', positionalArg)` call site where the
/// handler declares an object shape: rewrite the call to pass a
/// destructured object using the handler's declared field names.
fn fix_parameter_shape_mismatch(
    contracts: &mut Contracts,
    files: &mut [GeneratedFile],
    issue: &Issue,
    outcome: &mut AutoFixOutcome,
) {
    let entry = contracts.table(issue.kind).get(&issue.key);
    let fields = entry
        .and_then(|e| object_fields_of(&e.schema).or_else(|| e.conflicting_schemas.iter().find_map(object_fields_of)));
    let Some(fields) = fields else {
        outcome.remaining.push(issue.clone());
        return;
    };
    let Some(field) = fields.first() else {
        outcome.remaining.push(issue.clone());
        return;
    };

    let escaped_key = regex::escape(&issue.key);
    let Ok(invoke_re) = Regex::new(&format!(
        r#"ipcRenderer\.invoke\(\s*['"]{escaped_key}['"]\s*,\s*([A-Za-z_$][\w$]*)\s*\)"#
    )) else {
        outcome.remaining.push(issue.clone());
        return;
    };

    let mut changed = false;
    for file in files.iter_mut().filter(|f| is_script(&f.path)) {
        if !invoke_re.is_match(&file.content) {
            continue;
        }
        let replaced = invoke_re
            .replace_all(&file.content, |caps: &regex::Captures| {
                format!("ipcRenderer.invoke('{}', {{{field}: {}}})", issue.key, &caps[1])
            })
            .into_owned();
        if replaced != file.content {
            file.content = replaced;
            changed = true;
        }
    }

    if changed {
        outcome.fixes.push(Fix {
            issue: issue.clone(),
            description: format!("rewrote positional call site(s) of {} to pass {{{field}: ...}}", issue.key),
        });
    } else {
        outcome.remaining.push(issue.clone());
    }
}

/// A module reference under a `public/` prefix that never resolves: strip
/// the prefix and rewrite consumer references, provided a file exists at
/// the unprefixed path.
fn fix_path_reference_error(
    contracts: &mut Contracts,
    files: &mut [GeneratedFile],
    issue: &Issue,
    outcome: &mut AutoFixOutcome,
) {
    let Some(stripped) = issue.key.strip_prefix("public/") else {
        outcome.remaining.push(issue.clone());
        return;
    };
    let exists = files.iter().any(|f| f.path == stripped || f.path.ends_with(&format!("/{stripped}")));
    if !exists {
        outcome.remaining.push(issue.clone());
        return;
    }

    let affected = affected_paths(contracts, issue.kind, &issue.key);
    let mut changed = rename_in_files(files, &affected, &issue.key, stripped);
    // rename_in_files only matches quoted occurrences; module references are
    // frequently unquoted import specifiers, so also cover that form.
    for file in files.iter_mut().filter(|f| affected.contains(&f.path)) {
        let patched = file.content.replace(&issue.key, stripped);
        if patched != file.content {
            file.content = patched;
            changed = true;
        }
    }

    if changed {
        contracts.table_mut(issue.kind).remove(&issue.key);
        outcome.fixes.push(Fix {
            issue: issue.clone(),
            description: format!("rewrote references from {} to {stripped}", issue.key),
        });
    } else {
        outcome.remaining.push(issue.clone());
    }
}

/// A `<script src="X">` tag missing `type="module"` where `X` uses export
/// syntax: add the attribute.
fn fix_export_syntax_error(files: &mut [GeneratedFile], issue: &Issue, outcome: &mut AutoFixOutcome) {
    let script_tag = cached_regex!(AUTOFIX_SCRIPT_TAG, r#"<script\b([^>]*)\bsrc\s*=\s*["']([^"']+)["']([^>]*)>"#);
    let target = issue.key.clone();

    let mut changed = false;
    for file in files.iter_mut().filter(|f| is_html(&f.path)) {
        if let Some(patched) = rewrite_script_tag_as_module(script_tag, &file.content, &target) {
            file.content = patched;
            changed = true;
        }
    }

    if changed {
        outcome.fixes.push(Fix {
            issue: issue.clone(),
            description: format!("added type=\"module\" to the <script> tag loading {target}"),
        });
    } else {
        outcome.remaining.push(issue.clone());
    }
}

fn rewrite_script_tag_as_module(script_tag: &Regex, content: &str, target: &str) -> Option<String> {
    let mut result = String::with_capacity(content.len());
    let mut last_end = 0;
    let mut any = false;
    for caps in script_tag.captures_iter(content) {
        let whole = caps.get(0).unwrap();
        let before = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let src = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let after = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
        if !src.ends_with(target) || before.contains("type=\"module\"") || after.contains("type=\"module\"") {
            continue;
        }
        result.push_str(&content[last_end..whole.start()]);
        result.push_str(&format!("<script type=\"module\"{before} src=\"{src}\"{after}>"));
        last_end = whole.end();
        any = true;
    }
    if !any {
        return None;
    }
    result.push_str(&content[last_end..]);
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{ContractEntry, ContractKind, ParamStyle};

    fn with_producer(key: &str, producer: &str) -> ContractEntry {
        let mut e = ContractEntry::new(key);
        e.producers.insert(producer.to_string());
        e
    }

    fn with_consumer(key: &str, consumer: &str) -> ContractEntry {
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
    fn fixes_name_mismatch_by_renaming_orphan_to_canonical() {
        let mut contracts = Contracts::default();
        contracts.upsert(ContractKind::Event, with_producer("note-saved", "main.js"));
        contracts.upsert(ContractKind::Event, with_consumer("noteSaved", "renderer.js"));
        let mut files: Vec<GeneratedFile> = vec![generated("renderer.js", "addEventListener('noteSaved', cb);")];

        let result = super::super::validator::validate(&contracts, &files);
        let outcome = autofix(&mut contracts, &mut files, &result);

        assert_eq!(outcome.fixes.len(), 1);
        assert!(!contracts.event.contains_key("noteSaved"));
        let merged = &contracts.event["note-saved"];
        assert!(merged.producers.contains("main.js"));
        assert!(merged.consumers.contains("renderer.js"));
        assert!(files[0].content.contains("note-saved"));
    }

    #[test]
    fn fix_is_idempotent() {
        let mut contracts = Contracts::default();
        contracts.upsert(ContractKind::Event, with_producer("note-saved", "main.js"));
        contracts.upsert(ContractKind::Event, with_consumer("noteSaved", "renderer.js"));
        let mut files: Vec<GeneratedFile> = vec![generated("renderer.js", "addEventListener('noteSaved', cb);")];

        let result = super::super::validator::validate(&contracts, &files);
        autofix(&mut contracts, &mut files, &result);

        let second_result = super::super::validator::validate(&contracts, &files);
        let second_outcome = autofix(&mut contracts, &mut files, &second_result);
        assert!(second_outcome
            .fixes
            .iter()
            .all(|f| f.issue.category != IssueCategory::NameMismatch));
    }

    #[test]
    fn missing_consumer_and_schema_mismatch_are_left_for_repair() {
        let mut contracts = Contracts::default();
        contracts.upsert(ContractKind::Storage, with_producer("theme", "a.js"));
        let mut files: Vec<GeneratedFile> = vec![];

        let result = super::super::validator::validate(&contracts, &files);
        let outcome = autofix(&mut contracts, &mut files, &result);
        assert!(outcome.fixes.is_empty());
        assert_eq!(outcome.remaining.len(), 1);
        assert_eq!(
            outcome.remaining[0].category,
            IssueCategory::MissingConsumer
        );
    }

    #[test]
    fn kebab_case_conversion_handles_camel_case() {
        assert_eq!(to_kebab_case("clearAll"), "clear-all");
        assert_eq!(to_kebab_case("save_note"), "save-note");
        assert_eq!(to_kebab_case("already-kebab"), "already-kebab");
    }

    #[test]
    fn select_option_case_mismatch_rewrites_html_to_match_script_literal() {
        let issue = Issue {
            kind: ContractKind::Dom,
            key: "Red".to_string(),
            category: IssueCategory::SelectOptionCaseMismatch,
            detail: "test".into(),
        };
        let mut files = vec![
            generated("index.html", r#"<option value="Red">Red</option>"#),
            generated("app.js", "if (v === 'red') {}"),
        ];
        let mut outcome = AutoFixOutcome::default();
        fix_select_option_case(&mut files, &issue, &mut outcome);
        assert_eq!(outcome.fixes.len(), 1);
        assert!(files[0].content.contains(r#"value="red""#));
    }

    #[test]
    fn missing_api_producer_injects_flask_route_stub() {
        let mut contracts = Contracts::default();
        contracts.upsert(ContractKind::Api, with_consumer("GET /api/items", "app.js"));
        let mut files = vec![generated("server.py", "from flask import Flask\napp = Flask(__name__)\n")];

        let result = super::super::validator::validate(&contracts, &files);
        let outcome = autofix(&mut contracts, &mut files, &result);
        assert!(outcome.fixes.iter().any(|f| f.issue.key == "GET /api/items"));
        assert!(files[0].content.contains("@app.route('/api/items'"));
    }

    #[test]
    fn parameter_shape_mismatch_rewrites_positional_invoke_to_object() {
        let mut contracts = Contracts::default();
        let mut entry = ContractEntry::new("load");
        entry.producers.insert("main.js".into());
        entry.consumers.insert("preload.js".into());
        entry.schema = Schema::Api {
            request_shape: Shape::Object(vec!["name".to_string()]),
            response_shape: Shape::Unknown,
            param_style: ParamStyle::Unknown,
        };
        entry.conflicting_schemas.push(Schema::Api {
            request_shape: Shape::Positional(vec!["filename".to_string()]),
            response_shape: Shape::Unknown,
            param_style: ParamStyle::Unknown,
        });
        contracts.upsert(ContractKind::Api, entry);
        let mut files = vec![generated("preload.js", "ipcRenderer.invoke('load', filename)")];

        let issue = Issue {
            kind: ContractKind::Api,
            key: "load".to_string(),
            category: IssueCategory::ParameterShapeMismatch,
            detail: "test".into(),
        };
        let mut outcome = AutoFixOutcome::default();
        fix_parameter_shape_mismatch(&mut contracts, &mut files, &issue, &mut outcome);
        assert_eq!(outcome.fixes.len(), 1);
        assert!(files[0].content.contains("ipcRenderer.invoke('load', {name: filename})"));
    }

    #[test]
    fn path_reference_error_strips_public_prefix_when_target_exists() {
        let mut contracts = Contracts::default();
        contracts.upsert(ContractKind::Module, with_consumer("public/utils", "app.js"));
        let mut files = vec![
            generated("utils.js", "export function helper() {}"),
            generated("app.js", "import { helper } from 'public/utils';"),
        ];
        let issue = Issue {
            kind: ContractKind::Module,
            key: "public/utils".to_string(),
            category: IssueCategory::PathReferenceError,
            detail: "test".into(),
        };
        let mut outcome = AutoFixOutcome::default();
        fix_path_reference_error(&mut contracts, &mut files, &issue, &mut outcome);
        assert_eq!(outcome.fixes.len(), 1);
        assert!(files[1].content.contains("'utils'"));
        assert!(!contracts.module.contains_key("public/utils"));
    }

    #[test]
    fn export_syntax_error_adds_type_module_to_script_tag() {
        let mut files = vec![
            generated("index.html", r#"<script src="app.js"></script>"#),
            generated("app.js", "export function run() {}"),
        ];
        let issue = Issue {
            kind: ContractKind::Module,
            key: "app.js".to_string(),
            category: IssueCategory::ExportSyntaxError,
            detail: "test".into(),
        };
        let mut outcome = AutoFixOutcome::default();
        fix_export_syntax_error(&mut files, &issue, &mut outcome);
        assert_eq!(outcome.fixes.len(), 1);
        assert!(files[0].content.contains(r#"type="module""#));
    }
}
