//! Type reference resolution against a populated [`Namespace`].
//!
//! References follow protobuf scoping:
//!
//! 1. A leading `.` makes the reference absolute; only the root is searched.
//! 2. Otherwise the current package is searched, then each enclosing package
//!    up to the root, and the nearest match wins.
//! 3. Inside one package, `A.B` is first tried as child package `A`
//!    containing `B`, then as message `A` with nested message `B`.

use prost_types::DescriptorProto;
use tracing::trace;

use crate::{Namespace, PackageId, namespace::qualify};

/// A message found by [`Namespace::resolve`].
#[derive(Debug, Clone)]
pub struct ResolvedType<'a> {
    pub message: &'a DescriptorProto,
    /// Package the message (or its outermost enclosing message) is declared in.
    pub package: PackageId,
    /// Fully-qualified name without a leading dot, e.g. `shop.Order.Line`.
    pub full_name: String,
}

impl<'a> Namespace<'a> {
    /// Resolve `reference` as seen from package `current`.
    ///
    /// Returns `None` when no scope contains the referenced message.
    pub fn resolve(&self, current: PackageId, reference: &str) -> Option<ResolvedType<'a>> {
        if let Some(absolute) = reference.strip_prefix('.') {
            return self.resolve_in(Self::ROOT, absolute);
        }

        let mut scope = Some(current);
        while let Some(id) = scope {
            if let Some(found) = self.resolve_in(id, reference) {
                return Some(found);
            }
            scope = self.parent(id);
        }
        None
    }

    fn resolve_in(&self, id: PackageId, name: &str) -> Option<ResolvedType<'a>> {
        let node = self.node(id);
        let Some((head, rest)) = name.split_once('.') else {
            let message = *node.types.get(name)?;
            return Some(ResolvedType {
                message,
                package: id,
                full_name: qualify(&node.path, name),
            });
        };

        trace!(head, rest, package = %node.path, "looking up dotted reference");
        if let Some(&child) = node.children.get(head)
            && let Some(found) = self.resolve_in(child, rest)
        {
            return Some(found);
        }

        let outer = *node.types.get(head)?;
        let message = lookup_nested(outer, rest)?;
        Some(ResolvedType {
            message,
            package: id,
            full_name: qualify(&node.path, name),
        })
    }
}

/// Follow `path` one segment at a time through nested message declarations.
fn lookup_nested<'a>(mut message: &'a DescriptorProto, path: &str) -> Option<&'a DescriptorProto> {
    for segment in path.split('.') {
        let Some(nested) = message.nested_type.iter().find(|n| n.name() == segment) else {
            trace!(segment, message = message.name(), "no such nested message");
            return None;
        };
        message = nested;
    }
    Some(message)
}
