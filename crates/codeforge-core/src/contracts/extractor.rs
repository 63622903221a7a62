//! Regex/heuristic extraction of cross-file identifiers from generated
//! source text. This is the only module that constructs [`ContractEntry`]
//! values from raw strings — everything downstream matches on the typed
//! [`Schema`] variant instead.

use super::{ContractEntry, ContractKind, Contracts, ParamStyle, Schema, Shape, StorageBacking};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// A file as seen by the extractor: just enough to dispatch by extension
/// and scan the body.
pub struct ExtractableFile<'a> {
    /// Project-relative path (used as the producer/consumer identity).
    pub path: &'a str,
    /// File content to scan.
    pub content: &'a str,
}

fn regex_cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static extractor regex is valid"))
}

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {{
        static CELL: OnceLock<Regex> = OnceLock::new();
        regex_cached(&CELL, $pattern)
    }};
}

/// Extract contracts from a batch of just-written files, invoked again
/// after each detail-generation layer completes.
#[must_use]
pub fn extract(files: &[ExtractableFile<'_>]) -> Contracts {
    let mut contracts = Contracts::default();
    for file in files {
        let ext = file
            .path
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        let found = match ext.as_str() {
            "html" | "htm" => extract_html(file.path, file.content),
            "js" | "ts" | "jsx" | "tsx" | "mjs" | "cjs" => extract_js(file.path, file.content),
            "py" => extract_python(file.path, file.content),
            _ => Vec::new(),
        };
        for (kind, entry) in found {
            contracts.upsert(kind, entry);
        }
    }
    contracts
}

/// Merge a freshly extracted batch into an existing `Contracts` record.
pub fn merge(existing: &mut Contracts, extracted: Contracts) {
    existing.merge(extracted);
}

fn parse_attrs(attrs: &str) -> Vec<(String, String)> {
    let re = cached_regex!(ATTRS, r#"([\w-]+)\s*=\s*"([^"]*)"|([\w-]+)\s*=\s*'([^']*)'"#);
    re.captures_iter(attrs)
        .map(|c| {
            if let (Some(name), Some(value)) = (c.get(1), c.get(2)) {
                (name.as_str().to_string(), value.as_str().to_string())
            } else {
                (
                    c.get(3).map(|m| m.as_str()).unwrap_or_default().to_string(),
                    c.get(4).map(|m| m.as_str()).unwrap_or_default().to_string(),
                )
            }
        })
        .collect()
}

fn extract_html(path: &str, content: &str) -> Vec<(ContractKind, ContractEntry)> {
    let mut out = Vec::new();
    let tag_re = cached_regex!(
        HTML_TAG,
        r#"<([a-zA-Z][\w-]*)\s+([^>]*?)/?>"#
    );
    for caps in tag_re.captures_iter(content) {
        let tag = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let attrs_text = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let attrs = parse_attrs(attrs_text);
        let id = attrs.iter().find(|(k, _)| k == "id").map(|(_, v)| v.clone());
        let Some(id) = id else { continue };
        let mut entry = ContractEntry::new(id);
        entry.producers.insert(path.to_string());
        let attr_names: Vec<String> = attrs.iter().map(|(k, _)| k.clone()).collect();
        entry.schema = Schema::Dom {
            tag: Some(tag.to_string()),
            attributes: attr_names,
        };
        out.push((ContractKind::Dom, entry));
    }
    out
}

fn naive_param_shape(args_text: &str) -> Shape {
    let args_text = args_text.trim();
    if args_text.is_empty() {
        return Shape::Unknown;
    }
    if args_text.starts_with('{') && args_text.ends_with('}') {
        let inner = &args_text[1..args_text.len() - 1];
        let fields = inner
            .split(',')
            .map(|s| s.split(':').next().unwrap_or("").trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Shape::Object(fields)
    } else {
        let fields = args_text
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Shape::Positional(fields)
    }
}

fn extract_js(path: &str, content: &str) -> Vec<(ContractKind, ContractEntry)> {
    let mut out = Vec::new();

    let dom_consumer = cached_regex!(
        JS_DOM_CONSUMER,
        r#"(?:getElementById|querySelector(?:All)?)\(\s*['"]#?([^'"]+)['"]\s*\)"#
    );
    for caps in dom_consumer.captures_iter(content) {
        let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let mut entry = ContractEntry::new(key.trim_start_matches('.'));
        entry.consumers.insert(path.to_string());
        out.push((ContractKind::Dom, entry));
    }

    let ipc_handle = cached_regex!(
        IPC_HANDLE,
        r#"ipcMain\.handle\(\s*['"]([^'"]+)['"]\s*,\s*(?:async\s*)?\(([^)]*)\)"#
    );
    for caps in ipc_handle.captures_iter(content) {
        let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let args = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        // First handler parameter is the IPC event; the request shape is
        // whatever follows it.
        let request_args = args.splitn(2, ',').nth(1).unwrap_or("").trim();
        let mut entry = ContractEntry::new(key);
        entry.producers.insert(path.to_string());
        entry.schema = Schema::Api {
            request_shape: naive_param_shape(request_args),
            response_shape: Shape::Unknown,
            param_style: ParamStyle::Unknown,
        };
        out.push((ContractKind::Api, entry));
    }

    let ipc_invoke = cached_regex!(
        IPC_INVOKE,
        r#"ipcRenderer\.invoke\(\s*['"]([^'"]+)['"]\s*(?:,\s*([^)]*))?\)"#
    );
    for caps in ipc_invoke.captures_iter(content) {
        let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let args = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let mut entry = ContractEntry::new(key);
        entry.consumers.insert(path.to_string());
        entry.schema = Schema::Api {
            request_shape: naive_param_shape(args),
            response_shape: Shape::Unknown,
            param_style: ParamStyle::Unknown,
        };
        out.push((ContractKind::Api, entry));
    }

    let fetch_re = cached_regex!(FETCH, r#"fetch\(\s*['"](/api/[^'"]+)['"]"#);
    for caps in fetch_re.captures_iter(content) {
        let endpoint = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let key = format!("GET {endpoint}");
        let mut entry = ContractEntry::new(key);
        entry.consumers.insert(path.to_string());
        out.push((ContractKind::Api, entry));
    }

    let storage_set = cached_regex!(
        STORAGE_SET,
        r#"(local|session)Storage\.setItem\(\s*['"]([^'"]+)['"]"#
    );
    for caps in storage_set.captures_iter(content) {
        let backing = if caps.get(1).map(|m| m.as_str()) == Some("session") {
            StorageBacking::Session
        } else {
            StorageBacking::Persistent
        };
        let key = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let mut entry = ContractEntry::new(key);
        entry.producers.insert(path.to_string());
        entry.schema = Schema::Storage {
            backing,
            value_shape: Shape::Unknown,
        };
        out.push((ContractKind::Storage, entry));
    }

    let storage_get = cached_regex!(
        STORAGE_GET,
        r#"(local|session)Storage\.getItem\(\s*['"]([^'"]+)['"]"#
    );
    for caps in storage_get.captures_iter(content) {
        let key = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let mut entry = ContractEntry::new(key);
        entry.consumers.insert(path.to_string());
        out.push((ContractKind::Storage, entry));
    }

    let event_producer = cached_regex!(
        EVENT_NEW,
        r#"new\s+CustomEvent\(\s*['"]([^'"]+)['"]"#
    );
    for caps in event_producer.captures_iter(content) {
        let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let mut entry = ContractEntry::new(key);
        entry.producers.insert(path.to_string());
        out.push((ContractKind::Event, entry));
    }

    let event_consumer = cached_regex!(
        EVENT_LISTEN,
        r#"addEventListener\(\s*['"]([^'"]+)['"]"#
    );
    for caps in event_consumer.captures_iter(content) {
        let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let mut entry = ContractEntry::new(key);
        entry.consumers.insert(path.to_string());
        out.push((ContractKind::Event, entry));
    }

    let export_named = cached_regex!(
        EXPORT_NAMED,
        r#"export\s+(?:function|class|const|let|var)\s+(\w+)"#
    );
    let mut exports: Vec<String> = export_named
        .captures_iter(content)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect();

    let export_list = cached_regex!(EXPORT_LIST, r#"export\s*\{\s*([^}]+)\s*\}"#);
    for caps in export_list.captures_iter(content) {
        if let Some(list) = caps.get(1) {
            exports.extend(
                list.as_str()
                    .split(',')
                    .map(|s| s.split(" as ").next().unwrap_or("").trim().to_string())
                    .filter(|s| !s.is_empty()),
            );
        }
    }

    let module_exports_re = cached_regex!(
        MODULE_EXPORTS,
        r#"module\.exports(?:\.(\w+))?\s*="#
    );
    for caps in module_exports_re.captures_iter(content) {
        if let Some(name) = caps.get(1) {
            exports.push(name.as_str().to_string());
        }
    }

    if !exports.is_empty() || content.contains("module.exports") || content.contains("export ") {
        let mut entry = ContractEntry::new(module_key(path));
        entry.producers.insert(path.to_string());
        entry.schema = Schema::Module { exports };
        out.push((ContractKind::Module, entry));
    }

    let import_re = cached_regex!(
        IMPORT_SPEC,
        r#"(?:import[^'"]*from\s*|require\()\s*['"](\./[^'"]+|\.\./[^'"]+)['"]"#
    );
    for caps in import_re.captures_iter(content) {
        let specifier = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let resolved = resolve_relative(path, specifier);
        let mut entry = ContractEntry::new(resolved);
        entry.consumers.insert(path.to_string());
        out.push((ContractKind::Module, entry));
    }

    out
}

fn extract_python(path: &str, content: &str) -> Vec<(ContractKind, ContractEntry)> {
    let mut out = Vec::new();
    let route_re = cached_regex!(
        PY_ROUTE,
        r#"@app\.route\(\s*['"]([^'"]+)['"](?:\s*,\s*methods\s*=\s*\[([^\]]*)\])?"#
    );
    // (byte offset of the route decorator, contract key) in source order, so
    // a query-param access below can be attributed to the nearest preceding
    // route it belongs to.
    let mut routes: Vec<(usize, String)> = Vec::new();
    for caps in route_re.captures_iter(content) {
        let route = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let methods = caps.get(2).map(|m| m.as_str()).unwrap_or("'GET'");
        let method = methods
            .split(',')
            .next()
            .unwrap_or("'GET'")
            .trim()
            .trim_matches(|c| c == '\'' || c == '"')
            .to_string();
        let key = format!("{method} {route}");
        let offset = caps.get(0).map(|m| m.start()).unwrap_or(0);
        routes.push((offset, key.clone()));
        let mut entry = ContractEntry::new(key);
        entry.producers.insert(path.to_string());
        out.push((ContractKind::Api, entry));
    }

    let query_re = cached_regex!(PY_QUERY_PARAM, r#"request\.args\.get\(\s*['"]([^'"]+)['"]"#);
    let mut params_by_route: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for caps in query_re.captures_iter(content) {
        let Some(param) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        let offset = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let Some((_, route_key)) = routes.iter().filter(|(o, _)| *o <= offset).max_by_key(|(o, _)| *o)
        else {
            continue;
        };
        let params = params_by_route.entry(route_key.clone()).or_default();
        if !params.iter().any(|p| p == param) {
            params.push(param.to_string());
        }
    }
    for (route_key, params) in params_by_route {
        let mut entry = ContractEntry::new(route_key);
        entry.producers.insert(path.to_string());
        entry.schema = Schema::Api {
            request_shape: Shape::Object(params),
            response_shape: Shape::Unknown,
            param_style: ParamStyle::Query,
        };
        out.push((ContractKind::Api, entry));
    }

    out
}

/// The module key a JS/TS file registers itself under: its own path with
/// the extension stripped, so `components/App.tsx` and an import specifier
/// `./components/App` both normalize to `components/App`.
fn module_key(path: &str) -> String {
    strip_known_extension(path).to_string()
}

fn strip_known_extension(path: &str) -> &str {
    for ext in [".mjs", ".cjs", ".tsx", ".jsx", ".ts", ".js"] {
        if let Some(stripped) = path.strip_suffix(ext) {
            return stripped;
        }
    }
    path
}

/// Resolve a relative import specifier against the importing file's
/// directory, the way a bundler would, then strip the extension so it can
/// be compared against a producer's [`module_key`].
fn resolve_relative(from_path: &str, specifier: &str) -> String {
    let dir = match from_path.rfind('/') {
        Some(idx) => &from_path[..idx],
        None => "",
    };
    let mut segments: Vec<&str> = if dir.is_empty() {
        Vec::new()
    } else {
        dir.split('/').collect()
    };
    for part in specifier.split('/') {
        match part {
            "." | "" => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    strip_known_extension(&joined).to_string()
}
