//! WASM-compatible wrapper for narrative bloc segmentation.
//!
//! This crate exposes segmentation and inline style parsing to JavaScript
//! for use in Cloudflare Workers.

use serde::{Deserialize, Serialize};
use slidefill_core::{parse_inline_styles, BlocSegmenter, LayoutLimits};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Result of segmenting a narrative.
#[derive(Debug, Serialize, Deserialize)]
pub struct SegmentResult {
    /// Blocs in narrative order, one per slide.
    pub blocs: Vec<String>,
    /// Number of blocs.
    pub bloc_count: usize,
    /// Limits that were applied.
    pub limits: LayoutLimits,
}

/// Cut a narrative into slide-sized blocs.
///
/// # Arguments
/// * `text` - The raw narrative
/// * `limits` - Layout limits object, or `undefined` for the defaults
///
/// # Returns
/// A JavaScript object with the segmentation result, or throws on invalid limits.
#[wasm_bindgen]
pub fn segment_narrative(text: &str, limits: JsValue) -> Result<JsValue, JsValue> {
    let limits = if limits.is_undefined() || limits.is_null() {
        None
    } else {
        Some(
            serde_wasm_bindgen::from_value::<LayoutLimits>(limits)
                .map_err(|e| JsValue::from_str(&format!("Invalid limits object: {}", e)))?,
        )
    };

    let result = segment_narrative_impl(text, limits).map_err(|e| JsValue::from_str(&e))?;

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn segment_narrative_impl(text: &str, limits: Option<LayoutLimits>) -> Result<SegmentResult, String> {
    let limits = limits.unwrap_or_default();
    let segmenter = BlocSegmenter::new(limits).map_err(|e| e.to_string())?;
    let blocs = segmenter.segment(text);

    Ok(SegmentResult {
        bloc_count: blocs.len(),
        blocs,
        limits,
    })
}

/// Strip emphasis markers from a bloc and return its bold ranges.
///
/// # Returns
/// A JavaScript object `{ text, bold: [{ start, end }] }`.
#[wasm_bindgen]
pub fn parse_styles(text: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&parse_inline_styles(text))
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
