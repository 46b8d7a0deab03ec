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
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Bridge namespace initialization.
//!
//! The engine's glue code expects two globals to exist before it runs: a
//! `miniaudio` object (playback registry plus the unlock hook) and the
//! Emscripten `Module` object (processor options plus a back-reference to
//! the bridge). Both the glue and the host page mutate these objects, so
//! every field here is created only if currently absent; re-running an
//! initializer must never discard state the engine has already written.

use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::constants::{
    BRIDGE_GLOBAL, MODULE_GLOBAL, PLAYBACK_FIELD, PROCESSOR_OPTIONS_FIELD, UNLOCK_FIELD,
};
use crate::unlock;

/// Ensure the bridge and module namespaces exist and are cross-linked.
///
/// Idempotent: each object and field is created only if missing, so this is
/// safe to call any number of times, before or after the engine script has
/// evaluated. Returns the bridge object.
pub fn ensure_namespaces(global: &Object) -> Result<Object, JsValue> {
    let bridge = ensure_object(global, BRIDGE_GLOBAL)?;
    ensure_object(&bridge, PLAYBACK_FIELD)?;

    let module = ensure_object(global, MODULE_GLOBAL)?;
    ensure_object(&module, PROCESSOR_OPTIONS_FIELD)?;

    // Module.miniaudio must resolve to the same object as the global
    // bridge, but only if the glue has not already linked one itself.
    if !has_field(&module, BRIDGE_GLOBAL)? {
        Reflect::set(&module, &JsValue::from_str(BRIDGE_GLOBAL), &bridge)?;
    }

    Ok(bridge)
}

/// Install the `miniaudio.unlock` hook if it is not already present.
///
/// The installed function takes no arguments and returns a Promise that
/// always resolves. It is invoked opportunistically from the engine's audio
/// callback, so it must never throw or reject.
pub fn install_unlock_hook(global: &Object) -> Result<(), JsValue> {
    let bridge = ensure_namespaces(global)?;
    if has_field(&bridge, UNLOCK_FIELD)? {
        return Ok(());
    }

    let hook = Closure::wrap(Box::new(|| {
        wasm_bindgen_futures::future_to_promise(async {
            let outcome = unlock::unlock().await;
            log::debug!("unlock hook completed: {outcome:?}");
            Ok(JsValue::UNDEFINED)
        })
    }) as Box<dyn FnMut() -> js_sys::Promise>);

    // The hook lives for the rest of the page; leak it into JS.
    Reflect::set(
        &bridge,
        &JsValue::from_str(UNLOCK_FIELD),
        &hook.into_js_value(),
    )?;
    Ok(())
}

/// One-call initializer: namespaces plus the unlock hook.
pub fn init(global: &Object) -> Result<(), JsValue> {
    ensure_namespaces(global)?;
    install_unlock_hook(global)
}

/// Write one entry into `Module.miniaudioProcessorOptions`.
///
/// The engine reads this map once at startup, so options set after the
/// runtime has initialized have no effect.
pub fn set_processor_option(global: &Object, key: &str, value: &JsValue) -> Result<(), JsValue> {
    ensure_namespaces(global)?;
    let module = ensure_object(global, MODULE_GLOBAL)?;
    let options = ensure_object(&module, PROCESSOR_OPTIONS_FIELD)?;
    Reflect::set(&options, &JsValue::from_str(key), value)?;
    Ok(())
}

/// Get `target[field]`, creating an empty object if the field is absent.
///
/// Presence means any non-undefined, non-null value: the glue may bind a
/// function here (Emscripten's modularized factory shape), and an existing
/// binding is never replaced whatever its type.
fn ensure_object(target: &Object, field: &str) -> Result<Object, JsValue> {
    let key = JsValue::from_str(field);
    let existing = Reflect::get(target, &key)?;
    if !existing.is_undefined() && !existing.is_null() {
        return Ok(existing.unchecked_into());
    }
    let created = Object::new();
    Reflect::set(target, &key, &created)?;
    Ok(created)
}

fn has_field(target: &Object, field: &str) -> Result<bool, JsValue> {
    let value = Reflect::get(target, &JsValue::from_str(field))?;
    Ok(!value.is_undefined() && !value.is_null())
}
