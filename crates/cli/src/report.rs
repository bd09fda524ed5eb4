//! Rendering a [`DiffResult`] for humans and machines.

use clap::ValueEnum;
use serde_json::Value;
use tokendiff_engine::{Bucket, Change, ChangeKind, DiffResult};

/// Output format for `tokendiff report`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Markdown,
    Json,
    Summary,
}

const NO_CHANGES: &str = "no token changes";

/// Render `result` in the requested format. The output ends with a newline.
pub fn render(result: &DiffResult, format: ReportFormat) -> String {
    let mut out = match format {
        ReportFormat::Text => to_text(result),
        ReportFormat::Markdown => to_markdown(result),
        ReportFormat::Json => to_json(result),
        ReportFormat::Summary => to_summary(result),
    };
    out.push('\n');
    out
}

fn to_text(result: &DiffResult) -> String {
    if result.is_empty() {
        return NO_CHANGES.to_string();
    }

    let mut lines = vec![format!("{} token change(s)", result.summary().total)];
    for bucket in Bucket::ALL {
        let count = result.count(bucket);
        if count == 0 {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{} ({}):", bucket, count));
        match bucket {
            Bucket::Renamed => {
                for (new_name, rename) in &result.renamed {
                    lines.push(format!("  \"{}\" (was \"{}\")", new_name, rename.old_name));
                }
            }
            Bucket::Deprecated => {
                for (name, entry) in &result.deprecated {
                    match deprecation_comment(entry) {
                        Some(comment) => lines.push(format!("  {}: {}", name, comment)),
                        None => lines.push(format!("  {}", name)),
                    }
                }
            }
            Bucket::Reverted => lines.extend(result.reverted.keys().map(|n| format!("  {}", n))),
            Bucket::Added => lines.extend(result.added.keys().map(|n| format!("  {}", n))),
            Bucket::Deleted => lines.extend(result.deleted.keys().map(|n| format!("  {}", n))),
            Bucket::Updated => {
                for (name, changes) in &result.updated {
                    lines.push(format!("  {}", name));
                    for change in changes {
                        lines.push(format!("    {}", describe_change(change)));
                    }
                }
            }
        }
    }

    lines.join("\n")
}

fn to_markdown(result: &DiffResult) -> String {
    let mut lines = vec!["## Token changes".to_string(), String::new()];
    if result.is_empty() {
        lines.push(format!("{}.", capitalize(NO_CHANGES)));
        return lines.join("\n");
    }

    let summary = result.summary();
    lines.push("| Change | Count |".to_string());
    lines.push("| --- | --- |".to_string());
    for bucket in Bucket::ALL {
        lines.push(format!("| {} | {} |", capitalize(bucket.as_str()), result.count(bucket)));
    }
    lines.push(format!("| **Total** | **{}** |", summary.total));

    for bucket in Bucket::ALL {
        if result.count(bucket) == 0 {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("### {}", capitalize(bucket.as_str())));
        lines.push(String::new());
        match bucket {
            Bucket::Renamed => {
                for (new_name, rename) in &result.renamed {
                    lines.push(format!("- `{}` (was `{}`)", new_name, rename.old_name));
                }
            }
            Bucket::Deprecated => {
                for (name, entry) in &result.deprecated {
                    match deprecation_comment(entry) {
                        Some(comment) => lines.push(format!("- `{}`: {}", name, comment)),
                        None => lines.push(format!("- `{}`", name)),
                    }
                }
            }
            Bucket::Reverted => lines.extend(result.reverted.keys().map(|n| format!("- `{}`", n))),
            Bucket::Added => lines.extend(result.added.keys().map(|n| format!("- `{}`", n))),
            Bucket::Deleted => lines.extend(result.deleted.keys().map(|n| format!("- `{}`", n))),
            Bucket::Updated => {
                for (name, changes) in &result.updated {
                    lines.push(format!("- `{}`", name));
                    for change in changes {
                        lines.push(format!("  - {}", describe_change_markdown(change)));
                    }
                }
            }
        }
    }

    lines.join("\n")
}

fn to_json(result: &DiffResult) -> String {
    let mut value = match serde_json::to_value(result) {
        Ok(v) => v,
        Err(e) => return json_error(&format!("serialization error: {}", e)),
    };
    if let (Value::Object(map), Ok(summary)) = (&mut value, serde_json::to_value(result.summary())) {
        map.insert("summary".to_string(), summary);
    }
    serde_json::to_string_pretty(&value)
        .unwrap_or_else(|e| json_error(&format!("serialization error: {}", e)))
}

/// `{"error": msg}` with `msg` escaped.
pub(crate) fn json_error(msg: &str) -> String {
    serde_json::json!({ "error": msg }).to_string()
}

fn to_summary(result: &DiffResult) -> String {
    if result.is_empty() {
        return NO_CHANGES.to_string();
    }
    let mut lines: Vec<String> = Bucket::ALL
        .iter()
        .map(|bucket| format!("{}: {}", bucket, result.count(*bucket)))
        .collect();
    lines.push(format!("total: {}", result.summary().total));
    lines.join("\n")
}

fn deprecation_comment(entry: &Value) -> Option<&str> {
    entry
        .get(tokendiff_engine::dictionary::DEPRECATED_COMMENT_FIELD)
        .and_then(Value::as_str)
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "(entry)"
    } else {
        path
    }
}

fn compact(value: Option<&Value>) -> String {
    value
        .map(|v| serde_json::to_string(v).unwrap_or_default())
        .unwrap_or_default()
}

fn describe_change(change: &Change) -> String {
    let path = display_path(&change.path);
    match change.kind {
        ChangeKind::Updated => format!(
            "{}: {} -> {}",
            path,
            compact(change.original_value.as_ref()),
            compact(change.new_value.as_ref())
        ),
        ChangeKind::Added => format!("+ {}: {}", path, compact(change.new_value.as_ref())),
        ChangeKind::Deleted => format!("- {}: {}", path, compact(change.original_value.as_ref())),
    }
}

fn describe_change_markdown(change: &Change) -> String {
    let path = display_path(&change.path);
    match change.kind {
        ChangeKind::Updated => format!(
            "`{}`: `{}` -> `{}`",
            path,
            compact(change.original_value.as_ref()),
            compact(change.new_value.as_ref())
        ),
        ChangeKind::Added => format!("`{}` added: `{}`", path, compact(change.new_value.as_ref())),
        ChangeKind::Deleted => format!(
            "`{}` removed (was `{}`)",
            path,
            compact(change.original_value.as_ref())
        ),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
