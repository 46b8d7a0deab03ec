// Well-known names shared with the engine's Emscripten glue. These are a
// wire contract: the glue reads them by name, so they must match exactly.

pub static BRIDGE_GLOBAL: &str = "miniaudio";
pub static MODULE_GLOBAL: &str = "Module";

pub static PLAYBACK_FIELD: &str = "playback";
pub static UNLOCK_FIELD: &str = "unlock";
pub static PROCESSOR_OPTIONS_FIELD: &str = "miniaudioProcessorOptions";

pub static SDL_FIELD: &str = "SDL";
pub static SDL_AUDIO_CONTEXT_FIELD: &str = "audioContext";

pub static RUNTIME_READY_FLAG: &str = "runtimeInitialized";
pub static RUNTIME_READY_CALLBACK: &str = "onRuntimeInitialized";

pub static ENTRY_SCRIPT_PATH: &str =
    "assets/packages/miniaudio_dart_web/build/miniaudio_dart_web.js";
