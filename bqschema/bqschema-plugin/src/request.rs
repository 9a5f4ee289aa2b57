//! Decoding of the serialized `CodeGeneratorRequest` sent by protoc.

use prost::Message;
use prost_reflect::DescriptorPool;
use prost_types::compiler::CodeGeneratorRequest;

use tracing::warn;

use crate::PluginError;

/// The request's `proto_file` entries kept as undecoded bytes.
///
/// `prost_types` drops unknown fields, which is where custom options live, so
/// the descriptor pool is built from these raw bytes instead.
#[derive(Clone, PartialEq, Message)]
struct RawProtoFiles {
    #[prost(bytes = "vec", repeated, tag = "15")]
    proto_file: Vec<Vec<u8>>,
}

/// Wire-compatible `google.protobuf.FileDescriptorSet` over raw file bytes.
#[derive(Clone, PartialEq, Message)]
struct RawFileDescriptorSet {
    #[prost(bytes = "vec", repeated, tag = "1")]
    file: Vec<Vec<u8>>,
}

/// A decoded code generation request.
#[derive(Debug, Clone)]
pub struct PluginRequest {
    request: CodeGeneratorRequest,
    raw_files: Vec<Vec<u8>>,
}

impl PluginRequest {
    pub fn decode(bytes: &[u8]) -> Result<Self, PluginError> {
        let request = CodeGeneratorRequest::decode(bytes)?;
        let raw = RawProtoFiles::decode(bytes)?;
        Ok(Self {
            request,
            raw_files: raw.proto_file,
        })
    }

    pub fn request(&self) -> &CodeGeneratorRequest {
        &self.request
    }

    pub fn parameter(&self) -> &str {
        self.request.parameter()
    }

    /// Build a descriptor pool over the request's files, custom options
    /// included.
    ///
    /// If the files do not load as one set (e.g. two files define the same
    /// message), they are added one at a time and every file the pool rejects
    /// is left out, along with its annotations.
    pub fn descriptor_pool(&self) -> DescriptorPool {
        let set = RawFileDescriptorSet {
            file: self.raw_files.clone(),
        }
        .encode_to_vec();
        match DescriptorPool::decode(set.as_slice()) {
            Ok(pool) => return pool,
            Err(err) => warn!("request files do not form a valid descriptor set: {err}"),
        }

        let mut pool = DescriptorPool::new();
        for (raw, file) in self.raw_files.iter().zip(&self.request.proto_file) {
            if let Err(err) = pool.decode_file_descriptor_proto(raw.as_slice()) {
                warn!(file = file.name(), "skipping annotations of file: {err}");
            }
        }
        pool
    }
}
