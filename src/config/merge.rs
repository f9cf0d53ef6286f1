//! Last-wins merging of configuration mappings.
//!
//! Merging is shallow: a top-level key from the overlay replaces the base
//! value wholesale, nested mappings included. Nothing is merged recursively.

use super::types::ConfigTree;

/// Merge `overlay` into `base`, with `overlay` taking precedence.
///
/// # Example
/// ```
/// use serde_json::json;
/// use confstack::config::merge_into;
///
/// let mut base = json!({"server": {"port": 8080, "host": "localhost"}, "debug": true})
///     .as_object().cloned().unwrap();
/// let overlay = json!({"server": {"port": 9000}}).as_object().cloned().unwrap();
/// merge_into(&mut base, overlay);
/// assert_eq!(base["server"], json!({"port": 9000}));
/// assert_eq!(base["debug"], json!(true));
/// ```
pub fn merge_into(base: &mut ConfigTree, overlay: ConfigTree) {
    for (key, value) in overlay {
        base.insert(key, value);
    }
}

/// Merge mappings in order, later mappings taking precedence.
pub fn merge_all(trees: impl IntoIterator<Item = ConfigTree>) -> ConfigTree {
    trees.into_iter().fold(ConfigTree::new(), |mut acc, tree| {
        merge_into(&mut acc, tree);
        acc
    })
}
