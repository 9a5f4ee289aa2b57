//! First pass: populate a [`Namespace`] from every input file.

use prost_types::FileDescriptorProto;
use tracing::debug;

use crate::Namespace;

/// Register the top-level messages of all `files` in their declared packages.
///
/// Every file's package node is created even if the file declares no
/// messages, so later package lookups for requested files succeed. Nested
/// messages stay reachable through their enclosing message.
pub fn register_files<'a>(files: impl IntoIterator<Item = &'a FileDescriptorProto>) -> Namespace<'a> {
    let mut namespace = Namespace::new();
    for file in files {
        let package = file.package();
        namespace.ensure_package(package);
        for message in &file.message_type {
            debug!(
                message = message.name(),
                package, "loading message type"
            );
            namespace.register(package, message);
        }
    }
    namespace
}
