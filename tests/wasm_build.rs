//! WASM build test
//!
//! Exercises the JavaScript-facing `PromptEditor` class in a browser.

#![cfg(target_arch = "wasm32")]

use prompt_editor_wasm::api::WasmPromptEditor;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_editor_creation() {
    let editor = WasmPromptEditor::new(JsValue::UNDEFINED);
    assert!(editor.is_ok());
}

#[wasm_bindgen_test]
fn test_disable_excludes_from_value() {
    let mut editor = WasmPromptEditor::new(JsValue::UNDEFINED).unwrap();
    editor.set_value("Hello world, keep this safe.");

    let id = editor.disable(6, 11);
    assert_eq!(id, Some(1.0));
    assert_eq!(editor.get_value(), "Hello , keep this safe.");
    assert!(editor.render_markup().contains(r#"data-fragment-id="1""#));
}

#[wasm_bindgen_test]
fn test_rejected_operations_do_not_throw() {
    let mut editor = WasmPromptEditor::new(JsValue::UNDEFINED).unwrap();
    editor.set_value("abc");

    assert!(!editor.enable(42.0));
    assert_eq!(editor.hide(1, 1), None);
    assert!(!editor.delete_hidden(7.0));
}

#[wasm_bindgen_test]
fn test_full_value_round_trip() {
    let mut editor = WasmPromptEditor::new(JsValue::UNDEFINED).unwrap();
    editor.set_value("keep secret safe");
    editor.hide(5, 11);

    let saved = editor.get_full_value().unwrap();
    let mut restored = WasmPromptEditor::new(JsValue::UNDEFINED).unwrap();
    restored.set_full_value(saved);

    assert_eq!(restored.get_text(), "keep  safe");
    assert_eq!(restored.get_full_value_json(), editor.get_full_value_json());
}

#[wasm_bindgen_test]
fn test_dom_offsets_are_utf16() {
    let mut editor = WasmPromptEditor::new(JsValue::UNDEFINED).unwrap();
    editor.set_value("😀 ab cd");

    // "ab" sits at UTF-16 offsets 3..5
    assert_eq!(editor.disable(3, 5), Some(1.0));
    assert_eq!(editor.get_value(), "😀  cd");

    editor.set_selection(8, 8);
    let selection = editor.get_selection().unwrap();
    let head = js_sys::Reflect::get(&selection, &JsValue::from_str("head")).unwrap();
    assert_eq!(head.as_f64(), Some(8.0));
}

#[wasm_bindgen_test]
fn test_invalid_config_is_reported_as_error() {
    let result = WasmPromptEditor::new(JsValue::from_str("not a config"));
    assert!(result.is_err());
}
