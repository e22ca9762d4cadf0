//! WASM entry points for browser use.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::error::CollectError;
use crate::ir::types::{Artifacts, FormTree, SyncScript};
use crate::pipeline::CollectRequest;

/// Validate a service catalog JSON: parse + structural validation.
/// Returns a JSON array of CollectError objects.
#[wasm_bindgen]
pub fn validate_catalog(json: &str) -> JsValue {
    let result = validate_catalog_inner(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

pub(crate) fn validate_catalog_inner(json: &str) -> Vec<ErrorDto> {
    let (catalog, graph) = match crate::parse::parse_and_build(json) {
        Ok(parsed) => parsed,
        Err(errors) => return errors.into_iter().map(ErrorDto::from).collect(),
    };
    crate::validate::validate_catalog(&catalog, &graph)
        .into_iter()
        .map(ErrorDto::from)
        .collect()
}

/// Full pipeline for one collection request.
/// Returns a JSON object with either the artifacts (success) or the error (failure).
#[wasm_bindgen]
pub fn collect_additional_info(json: &str) -> JsValue {
    let result = collect_inner(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

pub(crate) fn collect_inner(json: &str) -> CollectResult {
    let outcome = CollectRequest::from_json(json)
        .and_then(|request| request.run())
        .and_then(ArtifactsDto::try_from);
    match outcome {
        Ok(artifacts) => CollectResult::Success { artifacts },
        Err(e) => CollectResult::Errors {
            errors: vec![ErrorDto::from(e)],
        },
    }
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorDto {
    pub code: String,
    pub phase: String,
    pub message: String,
    pub component_id: Option<String>,
}

impl From<CollectError> for ErrorDto {
    fn from(e: CollectError) -> Self {
        ErrorDto {
            code: e.code,
            phase: e.phase.to_string(),
            message: e.message,
            component_id: e.component_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ArtifactsDto {
    pub form: FormTree,
    pub needs_input: bool,
    /// Value document as XML text.
    pub values: String,
    pub sync_scripts: Vec<SyncScript>,
    pub sync_source: Option<String>,
}

impl TryFrom<Artifacts> for ArtifactsDto {
    type Error = CollectError;

    fn try_from(artifacts: Artifacts) -> Result<Self, Self::Error> {
        let values = artifacts
            .values
            .root
            .to_xml()
            .map_err(|e| CollectError::assemble("A002", e.to_string(), None))?;
        Ok(ArtifactsDto {
            needs_input: artifacts.form.needs_input(),
            sync_source: artifacts.sync_source(),
            form: artifacts.form,
            values,
            sync_scripts: artifacts.sync_scripts,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub(crate) enum CollectResult {
    Success { artifacts: ArtifactsDto },
    Errors { errors: Vec<ErrorDto> },
}
