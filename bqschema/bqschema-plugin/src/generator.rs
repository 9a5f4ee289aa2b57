//! Request handling: register every file, then convert the requested ones.

use std::collections::HashSet;

use bqschema_core::{generate_file, register_files};
use prost_types::compiler::{
    CodeGeneratorResponse,
    code_generator_response::{Feature, File},
};
use tracing::{debug, error};

use crate::{PluginConfig, PluginError, PluginRequest, extract_annotations};

/// Generate schema files for every requested file in `request`.
///
/// Files are visited in the request's `proto_file` order. The first failing
/// file aborts the whole batch.
pub fn generate(request: &PluginRequest) -> Result<Vec<File>, PluginError> {
    let config = PluginConfig::from_parameter(request.parameter())?;
    let pool = request.descriptor_pool();
    let annotations = extract_annotations(&pool, &config);

    let proto_files = &request.request().proto_file;
    let namespace = register_files(proto_files);

    let file_to_generate = &request.request().file_to_generate;
    if let Some(missing) = file_to_generate
        .iter()
        .find(|target| !proto_files.iter().any(|file| file.name() == target.as_str()))
    {
        return Err(PluginError::FileNotFound {
            file: missing.clone(),
        });
    }
    let targets: HashSet<&str> = file_to_generate.iter().map(String::as_str).collect();

    let mut files = Vec::new();
    for file in proto_files.iter().filter(|f| targets.contains(f.name())) {
        debug!(file = file.name(), "converting");
        let generated =
            generate_file(&namespace, &annotations, file).map_err(|source| PluginError::Convert {
                file: file.name().to_string(),
                source,
            })?;
        files.extend(generated.into_iter().map(|schema| File {
            name: Some(schema.path),
            content: Some(schema.content),
            ..Default::default()
        }));
    }
    Ok(files)
}

/// Decode `bytes` and produce the response protoc expects.
///
/// Only an undecodable request is returned as `Err`; every later failure is
/// reported through the response's `error` field.
pub fn generate_from_bytes(bytes: &[u8]) -> Result<CodeGeneratorResponse, PluginError> {
    let request = PluginRequest::decode(bytes)?;
    let response = match generate(&request) {
        Ok(file) => CodeGeneratorResponse {
            supported_features: Some(Feature::Proto3Optional as u64),
            file,
            ..Default::default()
        },
        Err(err) => {
            error!("{err}");
            error_response(&err)
        }
    };
    Ok(response)
}

/// A response carrying no files and `err` as its error message.
pub fn error_response(err: &PluginError) -> CodeGeneratorResponse {
    CodeGeneratorResponse {
        error: Some(err.to_string()),
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    }
}
