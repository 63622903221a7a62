//! A single bounded LLM-assisted repair round for issues
//! [`super::autofix`] declined to touch. Never retried: an unparsable
//! reply is recorded as a failed repair, the same per-file-isolation
//! posture used everywhere else in the pipeline.

use super::validator::Issue;
use super::{Contracts, Schema};
use crate::model::GeneratedFile;
use codeforge_llm::{LLMClient, ModelTier};
use std::sync::Arc;
use tracing::warn;

const SYSTEM_PROMPT: &str = "You repair cross-file naming contracts in a generated software project. \
You are given one unresolved issue and the schema observations behind it. \
Reply with exactly one line: either `KEEP` to leave the contract as-is, or \
`RENAME <old> -> <new>` naming the canonical spelling to adopt. No other text.";

/// One attempted repair and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairAttempt {
    /// The issue the repair agent was asked about.
    pub issue: Issue,
    /// What happened.
    pub outcome: RepairOutcome,
}

/// The result of asking the repair agent about a single issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    /// The agent chose to keep the contract unchanged.
    Kept,
    /// The agent renamed `from` to `to` and the rename was applied.
    Renamed {
        /// Key before the rename.
        from: String,
        /// Key after the rename.
        to: String,
    },
    /// The agent's reply didn't parse as `KEEP` or `RENAME a -> b`; no
    /// change was made and no retry was attempted.
    Unparsable(String),
    /// The LLM call itself failed.
    Failed(String),
}

/// Ask the repair agent about every issue in `issues`, applying any
/// resulting renames to `contracts` and `files` in place. One call per
/// issue, no retries.
pub async fn repair(
    contracts: &mut Contracts,
    files: &mut [GeneratedFile],
    issues: &[Issue],
    client: &Arc<dyn LLMClient>,
) -> Vec<RepairAttempt> {
    let mut attempts = Vec::with_capacity(issues.len());
    for issue in issues {
        let outcome = repair_one(contracts, files, issue, client).await;
        attempts.push(RepairAttempt {
            issue: issue.clone(),
            outcome,
        });
    }
    attempts
}

async fn repair_one(
    contracts: &mut Contracts,
    files: &mut [GeneratedFile],
    issue: &Issue,
    client: &Arc<dyn LLMClient>,
) -> RepairOutcome {
    let table = contracts.table(issue.kind);
    let Some(entry) = table.get(&issue.key) else {
        return RepairOutcome::Kept;
    };
    let prompt = format!(
        "Issue: {} on key {:?} (kind: {})\nDetail: {}\nSchema: {:?}\nConflicting schemas: {:?}\nProducers: {:?}\nConsumers: {:?}",
        issue.category.label(),
        issue.key,
        issue.kind.label(),
        issue.detail,
        entry.schema,
        entry.conflicting_schemas,
        entry.producers,
        entry.consumers,
    );

    let response = match client
        .generate(SYSTEM_PROMPT, &prompt, 128, ModelTier::Fast)
        .await
    {
        Ok(response) => response,
        Err(err) => {
            warn!(key = %issue.key, error = %err, "contract repair call failed");
            return RepairOutcome::Failed(err.to_string());
        }
    };

    match parse_reply(&response.content) {
        ReplyKind::Keep => RepairOutcome::Kept,
        ReplyKind::Rename { from, to } => {
            if from != issue.key {
                return RepairOutcome::Unparsable(response.content);
            }
            let affected = super::autofix::affected_paths(contracts, issue.kind, &from);
            if apply_rename(contracts, issue.kind, &from, &to) {
                super::autofix::rename_in_files(files, &affected, &from, &to);
                RepairOutcome::Renamed { from, to }
            } else {
                RepairOutcome::Unparsable(response.content)
            }
        }
        ReplyKind::Unparsable => RepairOutcome::Unparsable(response.content),
    }
}

enum ReplyKind {
    Keep,
    Rename { from: String, to: String },
    Unparsable,
}

fn parse_reply(content: &str) -> ReplyKind {
    let line = content.trim();
    if line.eq_ignore_ascii_case("KEEP") {
        return ReplyKind::Keep;
    }
    let Some(rest) = line
        .strip_prefix("RENAME ")
        .or_else(|| line.strip_prefix("rename "))
    else {
        return ReplyKind::Unparsable;
    };
    match rest.split_once("->") {
        Some((from, to)) => ReplyKind::Rename {
            from: from.trim().to_string(),
            to: to.trim().to_string(),
        },
        None => ReplyKind::Unparsable,
    }
}

fn apply_rename(contracts: &mut Contracts, kind: super::ContractKind, from: &str, to: &str) -> bool {
    let table = contracts.table_mut(kind);
    let Some(mut entry) = table.remove(from) else {
        return false;
    };
    entry.key = to.to_string();
    match table.remove(to) {
        Some(mut canonical) => {
            canonical.producers.extend(entry.producers);
            canonical.consumers.extend(entry.consumers);
            canonical.conflicting_schemas.extend(entry.conflicting_schemas);
            if matches!(canonical.schema, Schema::Unknown) {
                canonical.schema = entry.schema;
            }
            table.insert(to.to_string(), canonical);
        }
        None => {
            table.insert(to.to_string(), entry);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::validator::IssueCategory;
    use crate::contracts::{ContractEntry, ContractKind};
    use codeforge_llm::MockLLMClient;

    fn issue(key: &str, category: IssueCategory) -> Issue {
        Issue {
            kind: ContractKind::Storage,
            key: key.to_string(),
            category,
            detail: "test".into(),
        }
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

    #[tokio::test]
    async fn keep_reply_leaves_contracts_unchanged() {
        let mut contracts = Contracts::default();
        contracts.upsert(ContractKind::Storage, ContractEntry::new("theme"));
        let client: Arc<dyn LLMClient> = Arc::new(MockLLMClient::canned("KEEP"));
        let mut files: Vec<GeneratedFile> = Vec::new();

        let attempts = repair(
            &mut contracts,
            &mut files,
            &[issue("theme", IssueCategory::MissingConsumer)],
            &client,
        )
        .await;

        assert_eq!(attempts[0].outcome, RepairOutcome::Kept);
        assert!(contracts.storage.contains_key("theme"));
    }

    #[tokio::test]
    async fn rename_reply_applies_and_merges_entries() {
        let mut contracts = Contracts::default();
        let mut old = ContractEntry::new("themeValue");
        old.producers.insert("a.js".into());
        contracts.upsert(ContractKind::Storage, old);
        let mut canonical = ContractEntry::new("theme");
        canonical.consumers.insert("b.js".into());
        contracts.upsert(ContractKind::Storage, canonical);

        let client: Arc<dyn LLMClient> =
            Arc::new(MockLLMClient::canned("RENAME themeValue -> theme"));
        let mut files = vec![generated("a.js", "localStorage.setItem('themeValue', v);")];

        let attempts = repair(
            &mut contracts,
            &mut files,
            &[issue("themeValue", IssueCategory::SchemaMismatch)],
            &client,
        )
        .await;

        assert!(matches!(attempts[0].outcome, RepairOutcome::Renamed { .. }));
        assert!(!contracts.storage.contains_key("themeValue"));
        let merged = &contracts.storage["theme"];
        assert!(merged.producers.contains("a.js"));
        assert!(merged.consumers.contains("b.js"));
        assert!(files[0].content.contains("'theme'"));
    }

    #[tokio::test]
    async fn unparsable_reply_leaves_contracts_unchanged_and_is_not_retried() {
        let mut contracts = Contracts::default();
        contracts.upsert(ContractKind::Storage, ContractEntry::new("theme"));
        let mock = Arc::new(MockLLMClient::canned("I am not sure what to do here"));
        let client: Arc<dyn LLMClient> = mock.clone();
        let mut files: Vec<GeneratedFile> = Vec::new();

        let attempts = repair(
            &mut contracts,
            &mut files,
            &[issue("theme", IssueCategory::SchemaMismatch)],
            &client,
        )
        .await;

        assert!(matches!(attempts[0].outcome, RepairOutcome::Unparsable(_)));
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn llm_failure_is_recorded_without_panicking() {
        let mut contracts = Contracts::default();
        contracts.upsert(ContractKind::Storage, ContractEntry::new("theme"));
        let client: Arc<dyn LLMClient> =
            Arc::new(MockLLMClient::failing(codeforge_llm::Error::Transport("down".into())));
        let mut files: Vec<GeneratedFile> = Vec::new();

        let attempts = repair(
            &mut contracts,
            &mut files,
            &[issue("theme", IssueCategory::SchemaMismatch)],
            &client,
        )
        .await;

        assert!(matches!(attempts[0].outcome, RepairOutcome::Failed(_)));
    }
}
