//! Virtual filesystem: path resolution, the node tree, and its persisted
//! document form.

pub mod document;
pub mod path;
pub mod tree;

pub use document::DocNode;
pub use path::{AbsolutePath, resolve, validate_name};
pub use tree::{DirEntry, FilesystemTree, WalkEntry};
