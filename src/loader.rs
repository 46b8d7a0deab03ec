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

//! Engine module loading.
//!
//! Injects the engine's entry script into the page and settles once the
//! engine runtime is ready. Script evaluation and runtime initialization
//! are independent events that can complete in either order: by the time
//! the script's load event fires, the runtime may already have signalled
//! readiness (a global flag), or it may do so later (an assignable
//! callback). Both paths funnel into a take-once settlement slot, so each
//! `load` call settles exactly once no matter which branch wins or how
//! many times the callback fires.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

use crate::constants::{
    ENTRY_SCRIPT_PATH, MODULE_GLOBAL, RUNTIME_READY_CALLBACK, RUNTIME_READY_FLAG,
};
use crate::namespace;

type SettleSlot = Rc<RefCell<Option<oneshot::Sender<Result<(), JsValue>>>>>;

/// Load the engine from its well-known asset path and wait until its
/// runtime is ready.
///
/// There is no retry, timeout, or cancellation at this layer; a script that
/// never fires load or error leaves the future pending. Calling this twice
/// injects the script twice; deduplication is the caller's responsibility.
pub async fn load() -> Result<(), JsValue> {
    load_url(ENTRY_SCRIPT_PATH).await
}

/// Same as [`load`], with an explicit script URL for hosts whose asset
/// layout differs from the packaged default.
pub async fn load_url(src: &str) -> Result<(), JsValue> {
    let global: Object = js_sys::global().unchecked_into();

    // The unlock hook must exist before the engine's audio callback can
    // want it; the initializer is idempotent so running it here costs
    // nothing when the host already did.
    namespace::init(&global)?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window exists"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document exists"))?;

    let (sender, receiver) = oneshot::channel::<Result<(), JsValue>>();
    let slot: SettleSlot = Rc::new(RefCell::new(Some(sender)));

    let script: HtmlScriptElement = document.create_element("script")?.unchecked_into();
    script.set_src(src);

    let on_error = {
        let slot = slot.clone();
        let src = src.to_string();
        Closure::wrap(Box::new(move |_event: JsValue| {
            log::error!("engine script failed to load: {src}");
            settle(&slot, Err(JsValue::from_str("engine script failed to load")));
        }) as Box<dyn FnMut(JsValue)>)
    };

    let on_load = {
        let slot = slot.clone();
        let global = global.clone();
        Closure::wrap(Box::new(move || {
            // The flag check must happen before the callback assignment;
            // the branches are exclusive so no initialization event can
            // slip between them.
            if is_runtime_ready(&global) {
                settle(&slot, Ok(()));
            } else if let Err(e) = install_ready_callback(&global, &slot) {
                settle(&slot, Err(e));
            }
        }) as Box<dyn FnMut()>)
    };

    // Handlers live until the page unloads; leak them into JS.
    let on_error = on_error.into_js_value();
    let on_load = on_load.into_js_value();
    script.set_onerror(Some(on_error.unchecked_ref()));
    script.set_onload(Some(on_load.unchecked_ref()));

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("no head element"))?;
    head.append_child(&script)?;

    log::info!("engine script injected: {src}");

    receiver
        .await
        .unwrap_or_else(|_| Err(JsValue::from_str("runtime-ready signal dropped")))
}

/// Whether the engine runtime has already signalled readiness.
pub fn is_runtime_ready(global: &Object) -> bool {
    Reflect::get(global, &JsValue::from_str(RUNTIME_READY_FLAG))
        .map(|flag| flag.is_truthy())
        .unwrap_or(false)
}

fn install_ready_callback(global: &Object, slot: &SettleSlot) -> Result<(), JsValue> {
    let module = Reflect::get(global, &JsValue::from_str(MODULE_GLOBAL))?;
    if !module.is_object() {
        return Err(JsValue::from_str(
            "engine script did not establish its module namespace",
        ));
    }

    let callback = {
        let slot = slot.clone();
        Closure::wrap(Box::new(move || {
            log::info!("engine runtime initialized");
            settle(&slot, Ok(()));
        }) as Box<dyn FnMut()>)
    };
    Reflect::set(
        &module,
        &JsValue::from_str(RUNTIME_READY_CALLBACK),
        &callback.into_js_value(),
    )?;
    Ok(())
}

fn settle(slot: &SettleSlot, outcome: Result<(), JsValue>) {
    if let Some(sender) = slot.borrow_mut().take() {
        let _ = sender.send(outcome);
    }
}
