//! YAML frontmatter extraction.
//!
//! A frontmatter block is a leading `---` line, YAML content, and a closing
//! `---` (or `...`) line. Malformed YAML is swallowed — metadata degrades to
//! an empty mapping rather than failing the parse.

use std::collections::BTreeMap;

/// Extract frontmatter as a string→string mapping.
///
/// Returns an empty map when there is no frontmatter block or the YAML is
/// malformed.
pub fn extract_metadata(input: &str) -> BTreeMap<String, String> {
    match split(input) {
        Some((yaml, _)) => parse_yaml_map(yaml).unwrap_or_default(),
        None => BTreeMap::new(),
    }
}

/// Split off a leading frontmatter block.
///
/// Returns `Some((yaml_body, consumed_lines))` where `consumed_lines` counts
/// both `---` delimiter lines, or `None` when the input has no block.
pub fn split(input: &str) -> Option<(&str, usize)> {
    let mut rest = input.strip_prefix('\u{feff}').unwrap_or(input);
    let first_line_end = rest.find('\n')?;
    if rest[..first_line_end].trim_end() != "---" {
        return None;
    }
    rest = &rest[first_line_end + 1..];

    let mut consumed = 1;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        consumed += 1;
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            return Some((&rest[..offset], consumed));
        }
        offset += line.len();
    }
    // Unterminated block: not frontmatter.
    None
}

fn parse_yaml_map(yaml: &str) -> Option<BTreeMap<String, String>> {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml).ok()?;
    let mapping = value.as_mapping()?;
    let mut out = BTreeMap::new();
    for (key, val) in mapping {
        let key = key.as_str()?.to_string();
        out.insert(key, scalar_to_string(val));
    }
    Some(out)
}

/// Flatten a YAML value to a string. Document metadata is specified as
/// string→string, so lists and nested maps are re-serialized as YAML text.
fn scalar_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_metadata() {
        let input = "---\ntitle: User Auth\npriority: high\n---\n# Heading\n";
        let meta = extract_metadata(input);
        assert_eq!(meta["title"], "User Auth");
        assert_eq!(meta["priority"], "high");
    }

    #[test]
    fn no_frontmatter_is_empty() {
        assert!(extract_metadata("# Heading\nbody\n").is_empty());
    }

    #[test]
    fn malformed_yaml_is_swallowed() {
        let input = "---\n: [unbalanced\n---\n# H\n";
        assert!(extract_metadata(input).is_empty());
    }

    #[test]
    fn unterminated_block_is_not_frontmatter() {
        assert!(extract_metadata("---\ntitle: x\n# H\n").is_empty());
    }

    #[test]
    fn split_counts_delimiter_lines() {
        let input = "---\na: 1\nb: 2\n---\nbody";
        let (yaml, consumed) = split(input).unwrap();
        assert_eq!(yaml, "a: 1\nb: 2\n");
        assert_eq!(consumed, 4);
    }

    #[test]
    fn non_string_scalars_are_stringified() {
        let input = "---\ncount: 3\ndone: true\n---\n";
        let meta = extract_metadata(input);
        assert_eq!(meta["count"], "3");
        assert_eq!(meta["done"], "true");
    }

    #[test]
    fn bom_is_tolerated() {
        let input = "\u{feff}---\ntitle: x\n---\n";
        assert_eq!(extract_metadata(input)["title"], "x");
    }
}
