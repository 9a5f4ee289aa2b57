//! Hierarchical package namespace holding every registered message type.
//!
//! Packages form a tree rooted at the unnamed global package. Nodes live in an
//! arena owned by [`Namespace`]; a node's children and parent are stored as
//! [`PackageId`]s, so the parent link is only ever used to walk upward.

use std::collections::BTreeMap;

use prost_types::DescriptorProto;

/// Index of a package node inside a [`Namespace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackageId(usize);

#[derive(Debug)]
pub(crate) struct PackageNode<'a> {
    pub(crate) path: String,
    pub(crate) parent: Option<PackageId>,
    pub(crate) children: BTreeMap<String, PackageId>,
    pub(crate) types: BTreeMap<String, &'a DescriptorProto>,
}

impl PackageNode<'_> {
    fn new(path: String, parent: Option<PackageId>) -> Self {
        Self {
            path,
            parent,
            children: BTreeMap::new(),
            types: BTreeMap::new(),
        }
    }
}

/// Package tree of message descriptors borrowed from the input batch.
#[derive(Debug)]
pub struct Namespace<'a> {
    nodes: Vec<PackageNode<'a>>,
}

impl<'a> Namespace<'a> {
    /// The global (unnamed) package.
    pub const ROOT: PackageId = PackageId(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![PackageNode::new(String::new(), None)],
        }
    }

    /// Register `message` under `package`, creating missing intermediate
    /// packages. A later message with the same simple name in the same
    /// package replaces the earlier one.
    pub fn register(&mut self, package: &str, message: &'a DescriptorProto) -> PackageId {
        let id = self.ensure_package(package);
        self.nodes[id.0]
            .types
            .insert(message.name().to_string(), message);
        id
    }

    /// Walk `package` from the root, creating any node that does not exist.
    pub fn ensure_package(&mut self, package: &str) -> PackageId {
        let mut current = Self::ROOT;
        for segment in segments(package) {
            current = match self.nodes[current.0].children.get(segment) {
                Some(&child) => child,
                None => self.add_child(current, segment),
            };
        }
        current
    }

    /// Find an existing package by its dotted path.
    pub fn lookup_package(&self, package: &str) -> Option<PackageId> {
        let mut current = Self::ROOT;
        for segment in segments(package) {
            current = *self.nodes[current.0].children.get(segment)?;
        }
        Some(current)
    }

    /// Dotted path of a package; empty for the root.
    pub fn path(&self, id: PackageId) -> &str {
        &self.nodes[id.0].path
    }

    pub fn parent(&self, id: PackageId) -> Option<PackageId> {
        self.nodes[id.0].parent
    }

    /// Message declared directly in `id` under the given simple name.
    pub fn get_type(&self, id: PackageId, name: &str) -> Option<&'a DescriptorProto> {
        self.nodes[id.0].types.get(name).copied()
    }

    pub(crate) fn node(&self, id: PackageId) -> &PackageNode<'a> {
        &self.nodes[id.0]
    }

    fn add_child(&mut self, parent: PackageId, segment: &str) -> PackageId {
        let parent_path = &self.nodes[parent.0].path;
        let path = qualify(parent_path, segment);
        let id = PackageId(self.nodes.len());
        self.nodes.push(PackageNode::new(path, Some(parent)));
        self.nodes[parent.0]
            .children
            .insert(segment.to_string(), id);
        id
    }
}

impl Default for Namespace<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Join a scope and a name with `.`, leaving the name bare in the root scope.
pub(crate) fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

/// Package path segments with leading empty components skipped.
fn segments(package: &str) -> impl Iterator<Item = &str> {
    package.split('.').skip_while(|segment| segment.is_empty())
}
