/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! Browser tests for the module loader's settlement races.
//!
//! Test scripts are fabricated as blob URLs so each test controls exactly
//! when and how the fake "engine" signals runtime readiness.

#![cfg(target_arch = "wasm32")]

use js_sys::{Object, Reflect};
use miniaudio_web_bridge::{ensure_namespaces, is_runtime_ready, load_url};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn global() -> Object {
    js_sys::global().unchecked_into()
}

fn script_url(body: &str) -> String {
    let parts = js_sys::Array::new();
    parts.push(&JsValue::from_str(body));
    let opts = web_sys::BlobPropertyBag::new();
    opts.set_type("application/javascript");
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &opts).unwrap();
    web_sys::Url::create_object_url_with_blob(&blob).unwrap()
}

/// Tests share one page; reset the readiness flag and any callback left
/// assigned by a previous load before each scenario.
fn reset_runtime_state() {
    let global = global();
    Reflect::set(&global, &"runtimeInitialized".into(), &false.into()).unwrap();
    ensure_namespaces(&global).unwrap();
    let module: Object = Reflect::get(&global, &"Module".into())
        .unwrap()
        .unchecked_into();
    let _ = Reflect::delete_property(&module, &"onRuntimeInitialized".into());
}

#[wasm_bindgen_test]
async fn load_settles_immediately_when_flag_already_set() {
    reset_runtime_state();

    // The script finishes its runtime setup synchronously, before its own
    // load event fires.
    let url = script_url("globalThis.runtimeInitialized = true;");
    load_url(&url).await.unwrap();

    assert!(is_runtime_ready(&global()));

    // No callback should have been assigned on this branch.
    let module: Object = Reflect::get(&global(), &"Module".into())
        .unwrap()
        .unchecked_into();
    let callback = Reflect::get(&module, &"onRuntimeInitialized".into()).unwrap();
    assert!(callback.is_undefined());
}

#[wasm_bindgen_test]
async fn load_waits_for_ready_callback_and_settles_once() {
    reset_runtime_state();

    // The runtime finishes asynchronously and invokes the assigned
    // callback twice; the extra invocation must be absorbed.
    let url = script_url(
        "var poll = setInterval(function () {\
             if (Module.onRuntimeInitialized) {\
                 clearInterval(poll);\
                 Module.onRuntimeInitialized();\
                 Module.onRuntimeInitialized();\
             }\
         }, 1);",
    );
    load_url(&url).await.unwrap();
}

#[wasm_bindgen_test]
async fn load_fails_on_script_error_without_installing_callback() {
    reset_runtime_state();

    let result = load_url("/definitely-not-a-real-script-path.js").await;
    assert!(result.is_err());

    let module: Object = Reflect::get(&global(), &"Module".into())
        .unwrap()
        .unchecked_into();
    let callback = Reflect::get(&module, &"onRuntimeInitialized".into()).unwrap();
    assert!(callback.is_undefined());
    assert!(!is_runtime_ready(&global()));
}

#[wasm_bindgen_test]
async fn load_ensures_unlock_hook_before_injection() {
    reset_runtime_state();

    let url = script_url(
        "globalThis.__hook_seen_by_script = typeof miniaudio.unlock === 'function';\
         globalThis.runtimeInitialized = true;",
    );
    load_url(&url).await.unwrap();

    let seen = Reflect::get(&global(), &"__hook_seen_by_script".into()).unwrap();
    assert_eq!(seen.as_bool(), Some(true));
}
