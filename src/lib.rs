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

//! Browser-side bridge for the miniaudio engine compiled to WebAssembly.
//!
//! This crate does two things and nothing else: it loads the engine's
//! entry script and tells the caller when the engine runtime is ready, and
//! it reconciles the engine's audio device lifecycle with the browser's
//! autoplay policy (a suspended `AudioContext` stays silent until a user
//! gesture unlocks it). The engine itself (mixing, decoding, playback)
//! is opaque to this layer; the two sides rendezvous through a pair of
//! well-known global objects the engine's glue code reads by name.
//!
//! # Outline of usage
//!
//! ```ignore
//! // Optional: set engine startup options and install the unlock hook
//! // before loading. `load()` runs the initializer itself, so this is
//! // only needed when options must be in place first.
//! let global = js_sys::global().unchecked_into();
//! set_processor_option(&global, "channels", &2.into())?;
//!
//! // Fetch and initialize the engine; resolves once its runtime is ready.
//! load().await?;
//!
//! // From a gesture handler, or opportunistically:
//! let outcome = unlock().await;
//! ```
//!
//! The crate emits records through the `log` facade and leaves logger
//! installation to the host application.

#![cfg(target_arch = "wasm32")]

use log::info;
use wasm_bindgen::prelude::*;

mod constants;
mod loader;
mod namespace;
mod unlock;

pub use constants::ENTRY_SCRIPT_PATH;
pub use loader::{is_runtime_ready, load, load_url};
pub use namespace::{ensure_namespaces, init, install_unlock_hook, set_processor_option};
pub use unlock::{unlock, UnlockOutcome};

#[wasm_bindgen(start)]
pub fn start() {
    info!("miniaudio-web-bridge loaded");
}
