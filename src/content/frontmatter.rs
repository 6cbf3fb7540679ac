//! YAML frontmatter at the head of a document.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("invalid frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("frontmatter cannot be represented as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frontmatter must be a mapping")]
    NotAMapping,
}

/// Split `text` into its frontmatter source (without delimiters) and body.
///
/// Frontmatter opens with a `---` first line and closes at the next `---`
/// or `...` line. Without a closing line there is no frontmatter.
pub fn split(text: &str) -> (Option<&str>, &str) {
    let Some(rest) = strip_delimiter_line(text, "---") else {
        return (None, text);
    };

    let mut offset = 0;
    while offset <= rest.len() {
        let line_end = rest[offset..]
            .find('\n')
            .map_or(rest.len(), |i| offset + i);
        let line = rest[offset..line_end].trim_end();
        if line == "---" || line == "..." {
            let body_start = (line_end + 1).min(rest.len());
            return (Some(&rest[..offset]), &rest[body_start..]);
        }
        if line_end == rest.len() {
            break;
        }
        offset = line_end + 1;
    }

    (None, text)
}

fn strip_delimiter_line<'a>(text: &'a str, delimiter: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(delimiter)?;
    let line_end = rest.find('\n')?;
    rest[..line_end]
        .trim()
        .is_empty()
        .then(|| &rest[line_end + 1..])
}

/// Parse frontmatter YAML into a JSON object. Empty frontmatter is `{}`.
pub fn parse(source: &str) -> Result<Map<String, Value>, FrontmatterError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(source)?;
    if yaml.is_null() {
        return Ok(Map::new());
    }
    match serde_json::to_value(yaml)? {
        Value::Object(map) => Ok(map),
        _ => Err(FrontmatterError::NotAMapping),
    }
}
