//! Serialized form of the filesystem tree.
//!
//! ```json
//! {"/": {"type": "dir", "children": {"a.txt": {"type": "file", "content": "hi"}}}}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use devterm_types::error::{DevtermError, Result};

/// Key under which the root node is stored in the top-level map.
pub const ROOT_KEY: &str = "/";

/// One node of the persisted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DocNode {
    #[serde(rename = "dir")]
    Dir {
        #[serde(default)]
        children: BTreeMap<String, DocNode>,
    },
    #[serde(rename = "file")]
    File {
        #[serde(default)]
        content: String,
    },
}

impl DocNode {
    pub fn empty_dir() -> Self {
        Self::Dir {
            children: BTreeMap::new(),
        }
    }

    pub fn file(content: impl Into<String>) -> Self {
        Self::File {
            content: content.into(),
        }
    }
}

/// Parse document text into its root node.
///
/// Fails when the text is not JSON of the expected shape, when the `/` key is
/// missing, or when the root is a file.
pub fn parse(text: &str) -> Result<DocNode> {
    let mut top: BTreeMap<String, DocNode> = serde_json::from_str(text)?;
    match top.remove(ROOT_KEY) {
        Some(root @ DocNode::Dir { .. }) => Ok(root),
        Some(DocNode::File { .. }) => Err(DevtermError::Store(
            "filesystem document root is a file".to_string(),
        )),
        None => Err(DevtermError::Store(
            "filesystem document has no root".to_string(),
        )),
    }
}

/// Render a root node as document text.
pub fn render(root: &DocNode) -> Result<String> {
    let mut top = BTreeMap::new();
    top.insert(ROOT_KEY, root);
    Ok(serde_json::to_string(&top)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_layout() {
        let root = parse(
            r#"{"/": {"type": "dir", "children": {
                "home": {"type": "dir", "children": {}},
                "a.txt": {"type": "file", "content": "hi"}}}}"#,
        )
        .unwrap();
        let DocNode::Dir { children } = root else {
            panic!("root should be a dir");
        };
        assert_eq!(children["a.txt"], DocNode::file("hi"));
        assert_eq!(children["home"], DocNode::empty_dir());
    }

    #[test]
    fn missing_content_is_empty() {
        let root = parse(r#"{"/": {"type": "dir", "children": {"x": {"type": "file"}}}}"#)
            .unwrap();
        let DocNode::Dir { children } = root else {
            panic!("root should be a dir");
        };
        assert_eq!(children["x"], DocNode::file(""));
    }

    #[test]
    fn missing_children_is_empty_dir() {
        let root = parse(r#"{"/": {"type": "dir"}}"#).unwrap();
        assert_eq!(root, DocNode::empty_dir());
    }

    #[test]
    fn rejects_missing_root() {
        assert!(parse(r#"{"home": {"type": "dir"}}"#).is_err());
    }

    #[test]
    fn rejects_file_root() {
        assert!(parse(r#"{"/": {"type": "file", "content": ""}}"#).is_err());
    }

    #[test]
    fn rejects_unknown_type_and_garbage() {
        assert!(parse(r#"{"/": {"type": "link"}}"#).is_err());
        assert!(parse("not json").is_err());
    }

    #[test]
    fn render_uses_original_tags() {
        let text = render(&DocNode::Dir {
            children: BTreeMap::from([("a".to_string(), DocNode::file("x"))]),
        })
        .unwrap();
        assert_eq!(
            text,
            r#"{"/":{"type":"dir","children":{"a":{"type":"file","content":"x"}}}}"#
        );
    }
}
