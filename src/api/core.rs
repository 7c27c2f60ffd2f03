//! Transcription API exported to JavaScript

use wasm_bindgen::prelude::*;
use serde::Serialize;

use crate::api::helpers::{deserialize_or_default, js_error, serialize, to_uint8_array};
use crate::models::{InstrumentCatalog, InstrumentModel};
use crate::renderers::StripLayout;
use crate::transcription::{transcribe, TranscribeSettings, TranscriptionReport};
use crate::{wasm_info, wasm_log};

/// Transcription result without the MIDI bytes, which travel as a `Uint8Array`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptionView<'a> {
    report: &'a TranscriptionReport,
    layout: &'a StripLayout,
    svg: Option<&'a str>,
}

/// Transcribe a Standard MIDI File for a music box strip
///
/// # Parameters
/// - `bytes`: SMF file contents
/// - `settings`: partial `TranscribeSettings` object, or `undefined` for defaults
///
/// # Returns
/// `{ report, layout, svg, midi }` where `midi` is a `Uint8Array` or `undefined`
#[wasm_bindgen(js_name = transcribeSmf)]
pub fn transcribe_smf(bytes: &[u8], settings: JsValue) -> Result<JsValue, JsValue> {
    let settings: TranscribeSettings = deserialize_or_default(settings, "Invalid settings")?;
    wasm_info!("transcribeSmf called: {} bytes, model {}", bytes.len(), settings.model);

    let transcription = transcribe(bytes, &settings).map_err(|e| js_error("Transcription failed", e))?;
    wasm_log!(
        "  {} holes on {} pages, mindelta {}",
        transcription.report.holes,
        transcription.report.pages,
        transcription.report.mindelta
    );

    let view = TranscriptionView {
        report: &transcription.report,
        layout: &transcription.layout,
        svg: transcription.svg.as_deref(),
    };
    let result = serialize(&view, "Failed to serialize transcription")?;

    if let Some(midi) = &transcription.midi {
        js_sys::Reflect::set(&result, &JsValue::from_str("midi"), &to_uint8_array(midi))?;
    }

    wasm_info!("transcribeSmf completed successfully");
    Ok(result)
}

/// List the built-in comb models
#[wasm_bindgen(js_name = listInstrumentModels)]
pub fn list_instrument_models() -> Result<JsValue, JsValue> {
    let models: &[InstrumentModel] = InstrumentCatalog::builtin().models();
    serialize(&models, "Failed to serialize instrument models")
}
