use std::path::Path;

use liquid::model::Value as LiquidValue;
use liquid::{Object, ParserBuilder};
use serde::Serialize;
use tracing::info;

use crate::summary::Summary;

/// Colors shared by every chart, in assignment order.
pub const PALETTE: &[&str] = &[
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ac",
];

const SCRIPT_TEMPLATE: &str = "// Generated by tracker-stats. Do not edit.
var palette = {{ palette }};
var issues_by_status = {{ issues_by_status }};
var issues_by_type = {{ issues_by_type }};
var issues_by_module = {{ issues_by_module }};
var oldest_unreviewed = {{ oldest_unreviewed }};
";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] liquid::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("writing script: {0}")]
    Persist(#[from] common::AppError),
}

/// Renders the aggregates as a small JS file declaring one variable per
/// aggregate plus the palette. Output depends only on `summary`.
pub fn render_script(summary: &Summary) -> Result<String, RenderError> {
    let parser = ParserBuilder::with_stdlib().build()?;
    let template = parser.parse(SCRIPT_TEMPLATE)?;

    let mut object = Object::new();
    insert_json(&mut object, "palette", &PALETTE)?;
    insert_json(&mut object, "issues_by_status", &summary.issues_by_status)?;
    insert_json(&mut object, "issues_by_type", &summary.issues_by_type)?;
    insert_json(&mut object, "issues_by_module", &summary.issues_by_module)?;
    insert_json(&mut object, "oldest_unreviewed", &summary.oldest_unreviewed)?;

    Ok(template.render(&object)?)
}

pub fn write_script(path: &Path, summary: &Summary) -> Result<(), RenderError> {
    let script = render_script(summary)?;
    common::fs::write_atomic(path, script.as_bytes())?;
    info!(
        path = %path.display(),
        statuses = summary.issues_by_status.len(),
        types = summary.issues_by_type.len(),
        modules = summary.issues_by_module.len(),
        unreviewed = summary.oldest_unreviewed.len(),
        "wrote summary script"
    );
    Ok(())
}

fn insert_json<T: Serialize + ?Sized>(
    object: &mut Object,
    name: &'static str,
    value: &T,
) -> Result<(), RenderError> {
    let json = serde_json::to_string(value)?;
    object.insert(name.into(), LiquidValue::scalar(json));
    Ok(())
}
