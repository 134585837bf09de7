//! CoDa host runtime: session coordination between a chat UI surface, the
//! per-workspace conversation log, and the hosted Gemini model.
//!
//! ## Provider bootstrap
//!
//! - `CODA_PROVIDER=gemini` (default) for Gemini API transport
//! - `CODA_PROVIDER=mock` for deterministic local runs and tests
//!
//! `CODA_CONFIG_PATH` may point to a readable UTF-8 JSON file with this
//! shape:
//!
//! ```json
//! {
//!   "models": ["gemini-2.5-flash", "gemini-2.5-pro"],
//!   "model": "gemini-2.5-flash",
//!   "timeout_sec": 120
//! }
//! ```
//!
//! Contract notes:
//! - `models` overrides the advertised model inventory.
//! - `model` is the startup selection; `setModel` changes it at runtime.
//! - `timeout_sec` is optional and must be > 0 when provided.
//! - Unknown JSON fields are rejected.
//!
//! The API key is never part of the config file: it lives in the workspace
//! credential slot (`/key set`, `/key clear`) or is supplied interactively
//! for a single turn.
//!
//! Conversation memory contract: the coordinator owns the persisted
//! per-workspace history and replays it on every turn unless the UI sends
//! its own transcript snapshot; failed turns are never persisted.

pub mod commands;
pub mod credentials;
pub mod fix;
pub mod providers;
pub mod session;
pub mod sidebar;
