//! Key-path helpers over a parsed configuration tree
//!
//! Keys are matched case-insensitively. An exact match is preferred when a
//! mapping holds several keys that differ only by case.

use serde_json::{Map, Value};

/// Get a value from the tree using a dot-separated path.
///
/// # Arguments
///
/// * `tree` - The parsed configuration tree
/// * `path` - A dot-separated path (e.g., "server.tls.cert"); the empty path
///   addresses the whole tree
///
/// # Returns
///
/// The value at the path, or None if not found.
pub fn lookup<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(tree);
    }

    let mut current = tree;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = get_ignore_case(map, part)?;
            }
            Value::Array(arr) => {
                let index: usize = part.parse().ok()?;
                current = arr.get(index)?;
            }
            _ => return None,
        }
    }

    Some(current)
}

/// Find `key` in `map`, falling back to a case-insensitive match.
pub fn get_ignore_case<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).or_else(|| {
        map.iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    })
}

/// Every fully-qualified leaf key in the tree, lowercased and sorted.
///
/// Nested mappings are flattened with `.`; sequences and scalars are leaves.
pub fn leaf_keys(tree: &Value) -> Vec<String> {
    let mut keys = Vec::new();
    if let Value::Object(map) = tree {
        collect_leaf_keys(map, "", &mut keys);
    }
    keys.sort();
    keys.dedup();
    keys
}

fn collect_leaf_keys(map: &Map<String, Value>, prefix: &str, keys: &mut Vec<String>) {
    for (key, value) in map {
        let full_key = if prefix.is_empty() {
            key.to_lowercase()
        } else {
            format!("{prefix}.{}", key.to_lowercase())
        };

        match value {
            Value::Object(nested) => collect_leaf_keys(nested, &full_key, keys),
            _ => keys.push(full_key),
        }
    }
}

/// Top-level keys that hold nested keys, sorted and unique.
///
/// A top-level scalar (`name: app`) is not a section; a top-level mapping with
/// at least one leaf (`server: {port: 80}`) is.
pub fn section_keys(tree: &Value) -> Vec<String> {
    let mut sections: Vec<String> = leaf_keys(tree)
        .into_iter()
        .filter_map(|key| key.split_once('.').map(|(section, _)| section.to_string()))
        .collect();
    sections.sort();
    sections.dedup();
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested() {
        let tree = json!({"server": {"tls": {"cert": "a.pem"}}});
        assert_eq!(lookup(&tree, "server.tls.cert"), Some(&json!("a.pem")));
        assert_eq!(lookup(&tree, "server.tls.key"), None);
        assert_eq!(lookup(&tree, "server.tls.cert.extra"), None);
    }

    #[test]
    fn test_lookup_empty_path_is_root() {
        let tree = json!({"a": 1});
        assert_eq!(lookup(&tree, ""), Some(&tree));
    }

    #[test]
    fn test_lookup_ignores_case() {
        let tree = json!({"Server": {"Port": 80}});
        assert_eq!(lookup(&tree, "server.port"), Some(&json!(80)));
        assert_eq!(lookup(&tree, "SERVER.PORT"), Some(&json!(80)));
    }

    #[test]
    fn test_lookup_prefers_exact_case() {
        let tree = json!({"key": 1, "KEY": 2});
        assert_eq!(lookup(&tree, "KEY"), Some(&json!(2)));
        assert_eq!(lookup(&tree, "key"), Some(&json!(1)));
    }

    #[test]
    fn test_lookup_sequence_index() {
        let tree = json!({"servers": [{"host": "a"}, {"host": "b"}]});
        assert_eq!(lookup(&tree, "servers.1.host"), Some(&json!("b")));
        assert_eq!(lookup(&tree, "servers.2.host"), None);
        assert_eq!(lookup(&tree, "servers.x"), None);
    }

    #[test]
    fn test_leaf_keys() {
        let tree = json!({
            "Name": "app",
            "server": {"port": 80, "tls": {"enabled": true}},
            "tags": ["a", "b"],
            "empty": {}
        });
        assert_eq!(
            leaf_keys(&tree),
            vec!["name", "server.port", "server.tls.enabled", "tags"]
        );
    }

    #[test]
    fn test_section_keys() {
        let tree = json!({
            "name": "app",
            "server": {"port": 80, "tls": {"enabled": true}},
            "database": {"url": "postgres://"},
            "empty": {}
        });
        assert_eq!(section_keys(&tree), vec!["database", "server"]);
    }

    #[test]
    fn test_section_keys_sorted_when_names_share_a_prefix() {
        let tree = json!({"a": {"b": 1}, "a-b": {"c": 1}, "a_c": {"d": 1}});
        assert_eq!(section_keys(&tree), vec!["a", "a-b", "a_c"]);
    }
}
