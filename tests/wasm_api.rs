//! WASM API tests
//!
//! Run in a browser with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use musicbox_wasm::api::{list_instrument_models, transcribe_smf};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn single_note_file() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"MThd");
    bytes.extend_from_slice(&[0, 0, 0, 6, 0, 0, 0, 1, 0x01, 0xE0]);
    let body = [0x00, 0x90, 0x48, 0x64, 0x83, 0x60, 0x80, 0x48, 0x40, 0x00, 0xFF, 0x2F, 0x00];
    bytes.extend_from_slice(b"MTrk");
    bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&body);
    bytes
}

#[wasm_bindgen_test]
fn test_list_instrument_models() {
    let models = list_instrument_models().unwrap();
    let array = js_sys::Array::from(&models);
    assert_eq!(array.length(), 4);
}

#[wasm_bindgen_test]
fn test_transcribe_with_default_settings() {
    let result = transcribe_smf(&single_note_file(), JsValue::UNDEFINED).unwrap();

    let midi = js_sys::Reflect::get(&result, &JsValue::from_str("midi")).unwrap();
    let midi = js_sys::Uint8Array::new(&midi);
    // Header, program change, note on, note off, end of track
    assert_eq!(midi.length(), 38);

    let report = js_sys::Reflect::get(&result, &JsValue::from_str("report")).unwrap();
    let holes = js_sys::Reflect::get(&report, &JsValue::from_str("holes")).unwrap();
    assert_eq!(holes.as_f64(), Some(1.0));
}

#[wasm_bindgen_test]
fn test_transcribe_rejects_garbage() {
    assert!(transcribe_smf(b"not midi", JsValue::UNDEFINED).is_err());
}

#[wasm_bindgen_test]
fn test_errors_carry_context() {
    let err = transcribe_smf(b"not midi", JsValue::UNDEFINED).unwrap_err();
    assert!(err.as_string().unwrap().starts_with("Transcription failed: "));

    let err = transcribe_smf(&single_note_file(), JsValue::from_str("sankyo20")).unwrap_err();
    assert!(err.as_string().unwrap().starts_with("Invalid settings: "));
}
