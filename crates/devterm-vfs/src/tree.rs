//! Arena-backed filesystem tree.
//!
//! Nodes live in a [`Slab`]; directories map child names to node ids. Ids
//! never leave this module: callers address nodes by [`AbsolutePath`] or by
//! a name relative to their current directory.

use std::collections::BTreeMap;

use slab::Slab;

use devterm_platform::{Persistence, keys};
use devterm_types::error::FsError;

use crate::document::{self, DocNode};
use crate::path::{AbsolutePath, resolve, validate_name};

/// Contents of `/home/user/welcome.txt` in a fresh tree.
pub const WELCOME_TEXT: &str = "Welcome to Dev Terminal System!\nType \"help\" to get started.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

#[derive(Debug)]
enum Node {
    Directory(BTreeMap<String, NodeId>),
    File(String),
}

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_directory: bool,
}

/// One row of a depth-first walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub name: String,
    /// 0 for direct children of the walked directory.
    pub depth: usize,
    pub is_directory: bool,
    /// Last child of its parent (in name order).
    pub is_last: bool,
}

/// The virtual filesystem.
pub struct FilesystemTree {
    nodes: Slab<Node>,
    root: NodeId,
    store: Option<Persistence>,
}

impl std::fmt::Debug for FilesystemTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilesystemTree")
            .field("nodes", &self.nodes.len())
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

impl Default for FilesystemTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FilesystemTree {
    /// A tree holding only the root directory.
    pub fn new() -> Self {
        let mut nodes = Slab::new();
        let root = NodeId(nodes.insert(Node::Directory(BTreeMap::new())));
        Self {
            nodes,
            root,
            store: None,
        }
    }

    /// The layout a first session starts with.
    pub fn with_default_layout() -> Self {
        let user = DocNode::Dir {
            children: BTreeMap::from([
                ("documents".to_string(), DocNode::empty_dir()),
                ("downloads".to_string(), DocNode::empty_dir()),
                ("projects".to_string(), DocNode::empty_dir()),
                ("welcome.txt".to_string(), DocNode::file(WELCOME_TEXT)),
            ]),
        };
        let root = DocNode::Dir {
            children: BTreeMap::from([
                ("etc".to_string(), DocNode::empty_dir()),
                (
                    "home".to_string(),
                    DocNode::Dir {
                        children: BTreeMap::from([("user".to_string(), user)]),
                    },
                ),
                ("var".to_string(), DocNode::empty_dir()),
            ]),
        };
        Self::from_document(&root)
    }

    /// Restore the tree saved under the `fs` key, or seed the default layout
    /// when it is absent or unreadable. The store stays attached.
    pub fn load(store: Persistence) -> Self {
        let restored = match store.get(keys::FS) {
            Some(text) => match document::parse(&text) {
                Ok(root) => Some(Self::from_document(&root)),
                Err(e) => {
                    log::warn!("Stored filesystem is unreadable ({e}), seeding defaults");
                    None
                },
            },
            None => None,
        };
        let seeded = restored.is_none();
        let mut tree = restored.unwrap_or_else(Self::with_default_layout);
        tree.store = Some(store);
        if seeded {
            log::info!("Seeded default filesystem layout");
            tree.persist();
        } else {
            log::info!("Restored filesystem ({} nodes)", tree.node_count());
        }
        tree
    }

    /// Attach a store; subsequent mutations are persisted to it.
    pub fn attach_store(&mut self, store: Persistence) {
        self.store = Some(store);
    }

    /// Build a tree from a document node. A file root yields an empty tree;
    /// children with invalid names are skipped.
    pub fn from_document(root: &DocNode) -> Self {
        let mut tree = Self::new();
        if let DocNode::Dir { children } = root {
            let root_id = tree.root;
            tree.graft(root_id, children);
        }
        tree
    }

    fn graft(&mut self, dir: NodeId, children: &BTreeMap<String, DocNode>) {
        for (name, child) in children {
            if let Err(e) = validate_name(name) {
                log::warn!("Skipping stored entry: {e}");
                continue;
            }
            let node = match child {
                DocNode::Dir { .. } => Node::Directory(BTreeMap::new()),
                DocNode::File { content } => Node::File(content.clone()),
            };
            let Ok(id) = self.insert_child(dir, name, node) else {
                continue;
            };
            if let DocNode::Dir { children } = child {
                self.graft(id, children);
            }
        }
    }

    /// Serialize the whole tree.
    pub fn to_document(&self) -> DocNode {
        self.doc_of(self.root)
    }

    fn doc_of(&self, id: NodeId) -> DocNode {
        match self.node(id) {
            Node::File(content) => DocNode::file(content.clone()),
            Node::Directory(children) => DocNode::Dir {
                children: children
                    .iter()
                    .map(|(name, &child)| (name.clone(), self.doc_of(child)))
                    .collect(),
            },
        }
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // -- queries ------------------------------------------------------------

    pub fn exists(&self, path: &AbsolutePath) -> bool {
        self.lookup(path).is_ok()
    }

    pub fn is_directory(&self, path: &AbsolutePath) -> bool {
        self.lookup(path)
            .is_ok_and(|id| matches!(self.node(id), Node::Directory(_)))
    }

    /// Entries of the directory at `path`, sorted by name.
    pub fn list(&self, path: &AbsolutePath) -> Result<Vec<DirEntry>, FsError> {
        let id = self.directory_id(path)?;
        Ok(self
            .children(id)
            .iter()
            .map(|(name, &child)| DirEntry {
                name: name.clone(),
                is_directory: matches!(self.node(child), Node::Directory(_)),
            })
            .collect())
    }

    /// Contents of the file at `path`.
    pub fn read_file(&self, path: &AbsolutePath) -> Result<&str, FsError> {
        match self.node(self.lookup(path)?) {
            Node::File(content) => Ok(content),
            Node::Directory(_) => Err(FsError::NotAFile(path.to_string())),
        }
    }

    /// Depth-first listing below the directory at `path`.
    pub fn walk(&self, path: &AbsolutePath) -> Result<Vec<WalkEntry>, FsError> {
        let start = self.directory_id(path)?;
        let mut out = Vec::new();
        let mut stack: Vec<(String, NodeId, usize, bool)> = Vec::new();
        self.push_children(&mut stack, start, 0);
        while let Some((name, id, depth, is_last)) = stack.pop() {
            let is_directory = matches!(self.node(id), Node::Directory(_));
            out.push(WalkEntry {
                name,
                depth,
                is_directory,
                is_last,
            });
            if is_directory {
                self.push_children(&mut stack, id, depth + 1);
            }
        }
        Ok(out)
    }

    fn push_children(
        &self,
        stack: &mut Vec<(String, NodeId, usize, bool)>,
        dir: NodeId,
        depth: usize,
    ) {
        let children = self.children(dir);
        let last = children.len().saturating_sub(1);
        for (i, (name, &id)) in children.iter().enumerate().rev() {
            stack.push((name.clone(), id, depth, i == last));
        }
    }

    // -- mutations ----------------------------------------------------------

    /// Resolve `input` against `cwd` and move there if it is a directory.
    pub fn change_directory(&self, cwd: &mut AbsolutePath, input: &str) -> Result<(), FsError> {
        let target = resolve(input, cwd);
        self.directory_id(&target)?;
        *cwd = target;
        Ok(())
    }

    pub fn make_directory(&mut self, cwd: &AbsolutePath, name: &str) -> Result<(), FsError> {
        validate_name(name)?;
        let dir = self.directory_id(cwd)?;
        self.insert_child(dir, name, Node::Directory(BTreeMap::new()))?;
        self.persist();
        Ok(())
    }

    pub fn create_file(&mut self, cwd: &AbsolutePath, name: &str) -> Result<(), FsError> {
        validate_name(name)?;
        let dir = self.directory_id(cwd)?;
        self.insert_child(dir, name, Node::File(String::new()))?;
        self.persist();
        Ok(())
    }

    /// Create or overwrite the file `name` in `cwd`.
    pub fn write_file(&mut self, cwd: &AbsolutePath, name: &str, content: &str) -> Result<(), FsError> {
        validate_name(name)?;
        let dir = self.directory_id(cwd)?;
        match self.children(dir).get(name).copied() {
            Some(id) => match &mut self.nodes[id.0] {
                Node::File(existing) => *existing = content.to_string(),
                Node::Directory(_) => return Err(FsError::NotAFile(name.to_string())),
            },
            None => {
                self.insert_child(dir, name, Node::File(content.to_string()))?;
            },
        }
        self.persist();
        Ok(())
    }

    /// Detach `name` from `cwd` and free its whole subtree.
    pub fn remove(&mut self, cwd: &AbsolutePath, name: &str) -> Result<(), FsError> {
        validate_name(name)?;
        let dir = self.directory_id(cwd)?;
        let removed = match &mut self.nodes[dir.0] {
            Node::Directory(children) => children.remove(name),
            Node::File(_) => None,
        };
        let Some(id) = removed else {
            return Err(FsError::NotFound(name.to_string()));
        };
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if let Node::Directory(children) = self.nodes.remove(id.0) {
                pending.extend(children.into_values());
            }
        }
        self.persist();
        Ok(())
    }

    // -- internals ----------------------------------------------------------

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn children(&self, dir: NodeId) -> &BTreeMap<String, NodeId> {
        static EMPTY: BTreeMap<String, NodeId> = BTreeMap::new();
        match self.node(dir) {
            Node::Directory(children) => children,
            Node::File(_) => &EMPTY,
        }
    }

    fn lookup(&self, path: &AbsolutePath) -> Result<NodeId, FsError> {
        let mut current = self.root;
        for seg in path.segments() {
            match self.node(current) {
                Node::Directory(children) => match children.get(seg) {
                    Some(&next) => current = next,
                    None => return Err(FsError::NotFound(path.to_string())),
                },
                Node::File(_) => return Err(FsError::NotADirectory(path.to_string())),
            }
        }
        Ok(current)
    }

    fn directory_id(&self, path: &AbsolutePath) -> Result<NodeId, FsError> {
        let id = self.lookup(path)?;
        match self.node(id) {
            Node::Directory(_) => Ok(id),
            Node::File(_) => Err(FsError::NotADirectory(path.to_string())),
        }
    }

    fn insert_child(&mut self, dir: NodeId, name: &str, node: Node) -> Result<NodeId, FsError> {
        match self.node(dir) {
            Node::Directory(children) if children.contains_key(name) => {
                return Err(FsError::AlreadyExists(name.to_string()));
            },
            Node::Directory(_) => {},
            Node::File(_) => return Err(FsError::NotADirectory(name.to_string())),
        }
        let id = NodeId(self.nodes.insert(node));
        if let Node::Directory(children) = &mut self.nodes[dir.0] {
            children.insert(name.to_string(), id);
        }
        Ok(id)
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        match document::render(&self.to_document()) {
            Ok(text) => store.set(keys::FS, &text),
            Err(e) => log::warn!("Cannot serialize filesystem: {e}"),
        }
    }
}
