//! In-place renaming of entries in an `environments.yaml` document.
//!
//! The document is parsed only to validate the rename. The file itself is
//! edited textually so comments, ordering and scalar styles survive; only
//! the key token of the renamed entry changes.

use std::ops::Range;
use std::path::Path;

use buildcloud_common::constants::ENVIRONMENTS_KEY;
use buildcloud_common::error::{BuildcloudError, Result};
use buildcloud_common::types::EnvironmentIdentity;
use serde_yaml::Value;

/// Renames environment `name` to `<prefix><name>` inside the document at
/// `path`, leaving every other byte of the file untouched.
///
/// Block-style documents are edited in place. Anything the textual edit
/// cannot reproduce exactly (flow-style mappings, unusual quoting) falls back
/// to re-serializing the parsed document.
///
/// # Errors
///
/// Returns [`BuildcloudError::EnvironmentNotFound`] if the document has no
/// `environments` mapping or no entry called `name`, and
/// [`BuildcloudError::Config`] if the prefixed name is already taken.
pub fn rename_env(name: &str, prefix: &str, path: &Path) -> Result<EnvironmentIdentity> {
    let content = std::fs::read_to_string(path).map_err(|e| BuildcloudError::io(path, e))?;
    let mut document: Value = serde_yaml::from_str(&content)?;
    let identity = rename_in_document(&mut document, name, prefix).map_err(|e| match e {
        RenameError::Missing => BuildcloudError::EnvironmentNotFound {
            name: name.to_string(),
            path: path.to_path_buf(),
        },
        RenameError::Taken(renamed) => BuildcloudError::Config {
            message: format!("environment '{renamed}' already exists in {}", path.display()),
        },
    })?;

    let rendered = match rename_key_in_text(&content, name, identity.renamed()) {
        Some(edited) if serde_yaml::from_str::<Value>(&edited).is_ok_and(|v| v == document) => {
            edited
        }
        _ => {
            tracing::debug!(path = %path.display(), "environments document is not block style; re-serializing");
            serde_yaml::to_string(&document)?
        }
    };
    std::fs::write(path, rendered).map_err(|e| BuildcloudError::io(path, e))?;
    tracing::info!(from = name, to = identity.renamed(), "renamed environment");
    Ok(identity)
}

enum RenameError {
    Missing,
    Taken(String),
}

fn rename_in_document(
    document: &mut Value,
    name: &str,
    prefix: &str,
) -> std::result::Result<EnvironmentIdentity, RenameError> {
    let environments = document
        .get_mut(ENVIRONMENTS_KEY)
        .and_then(Value::as_mapping_mut)
        .ok_or(RenameError::Missing)?;

    let identity = EnvironmentIdentity::new(name, prefix);
    let renamed_key = Value::String(identity.renamed().to_string());
    if environments.contains_key(&renamed_key) {
        return Err(RenameError::Taken(identity.renamed().to_string()));
    }
    let entry = environments
        .remove(&Value::String(name.to_string()))
        .ok_or(RenameError::Missing)?;
    let _ = environments.insert(renamed_key, entry);
    Ok(identity)
}

/// Rewrites the key of the `name` entry directly under the top-level
/// `environments:` block.
fn rename_key_in_text(content: &str, name: &str, renamed: &str) -> Option<String> {
    let mut offset = 0;
    let mut in_block = false;
    let mut child_indent = None;
    for line in content.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        let body = line.trim_end_matches(['\n', '\r']);
        let trimmed = body.trim_start_matches(' ');
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = body.len() - trimmed.len();
        if indent == 0 {
            if in_block {
                return None;
            }
            in_block = key_token(trimmed).is_some_and(|(key, _, rest)| {
                let rest = rest.trim();
                key == ENVIRONMENTS_KEY && (rest.is_empty() || rest.starts_with('#'))
            });
            continue;
        }
        if !in_block || *child_indent.get_or_insert(indent) != indent {
            continue;
        }
        if let Some((_, range, _)) = key_token(trimmed).filter(|(key, _, _)| *key == name) {
            let at = start + indent;
            let mut edited = String::with_capacity(content.len() + renamed.len());
            edited.push_str(&content[..at + range.start]);
            edited.push_str(renamed);
            edited.push_str(&content[at + range.end..]);
            return Some(edited);
        }
    }
    None
}

/// Splits `key: rest` into the key text, its byte range within `line`
/// (inside the quotes for quoted keys) and whatever follows the colon.
fn key_token(line: &str) -> Option<(&str, Range<usize>, &str)> {
    let (range, colon) = match line.chars().next()? {
        quote @ ('"' | '\'') => {
            let close = line[1..].find(quote)? + 1;
            let after = &line[close + 1..];
            (1..close, line.len() - after.trim_start().len())
        }
        _ => {
            let colon = line
                .match_indices(':')
                .map(|(i, _)| i)
                .find(|&i| line[i + 1..].chars().next().is_none_or(|c| c == ' ' || c == '\t'))?;
            (0..line[..colon].trim_end().len(), colon)
        }
    };
    let rest = line[colon..].strip_prefix(':')?;
    Some((&line[range.clone()], range, rest))
}
