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

//! Audio-context unlock.
//!
//! Browsers suspend audio output until a user gesture; the engine's audio
//! callback calls the unlock hook opportunistically to resume a suspended
//! context. There is no actionable receiver for a failure inside the audio
//! callback, so this operation is best-effort: it reports an outcome the
//! caller may log but never an error it must handle.

use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AudioContext, AudioContextState};

use crate::constants::{MODULE_GLOBAL, SDL_AUDIO_CONTEXT_FIELD, SDL_FIELD};

/// Result of one unlock attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// A suspended context was found and its resume request resolved.
    Resumed,
    /// A context was found but it was not suspended; nothing to do.
    AlreadyRunning,
    /// No framework context exists and the browser has no `AudioContext`.
    NoContext,
    /// The resume request was issued but rejected (e.g. a genuine user
    /// gesture is still required).
    ResumeFailed,
}

/// Resume the page's audio output context if one exists and is suspended.
///
/// Context lookup order: the context owned by the embedded SDL layer if the
/// engine created one, otherwise a freshly constructed `AudioContext`
/// (inert until a gesture occurs, so constructing one while probing is
/// harmless). Never panics and never propagates a JS error.
pub async fn unlock() -> UnlockOutcome {
    let Some(ctx) = locate_context() else {
        return UnlockOutcome::NoContext;
    };

    if ctx.state() != AudioContextState::Suspended {
        return UnlockOutcome::AlreadyRunning;
    }

    let promise = match ctx.resume() {
        Ok(p) => p,
        Err(e) => {
            log::warn!("AudioContext resume request failed: {e:?}");
            return UnlockOutcome::ResumeFailed;
        }
    };
    match JsFuture::from(promise).await {
        Ok(_) => UnlockOutcome::Resumed,
        Err(e) => {
            log::warn!("AudioContext resume rejected: {e:?}");
            UnlockOutcome::ResumeFailed
        }
    }
}

/// Find an audio context to operate on, preferring the SDL-owned one.
///
/// The SDL slot is used duck-typed, the same way the engine glue uses it;
/// web-sys bindings are structural so any object with `state`/`resume`
/// works here.
fn locate_context() -> Option<AudioContext> {
    let global = js_sys::global();

    if let Some(ctx) = framework_context(&global) {
        return Some(ctx);
    }

    if !Reflect::has(&global, &JsValue::from_str("AudioContext")).unwrap_or(false) {
        return None;
    }
    match AudioContext::new() {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            log::warn!("AudioContext construction failed: {e:?}");
            None
        }
    }
}

fn framework_context(global: &Object) -> Option<AudioContext> {
    // Module may be a plain object or the glue's factory function; either
    // way fields are read off it, never type-checked.
    let module = Reflect::get(global, &JsValue::from_str(MODULE_GLOBAL)).ok()?;
    if module.is_undefined() || module.is_null() {
        return None;
    }
    let sdl = Reflect::get(&module, &JsValue::from_str(SDL_FIELD)).ok()?;
    if sdl.is_undefined() || sdl.is_null() {
        return None;
    }
    let ctx = Reflect::get(&sdl, &JsValue::from_str(SDL_AUDIO_CONTEXT_FIELD)).ok()?;
    if ctx.is_undefined() || ctx.is_null() {
        return None;
    }
    Some(ctx.unchecked_into())
}
