//! `nli-core`: foundational types for the `nli` fungal-infection simulator.
//!
//! This crate is a dependency of every other `nli-*` crate.  It has no
//! `nli-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`ids`]       | `AgentId`, `VoxelId`, `ModuleId`                        |
//! | [`point`]     | `Point3`: continuous physical position                 |
//! | [`time`]      | `Tick`, `SimClock`                                      |
//! | [`rng`]       | `AgentRng` (per-agent), `SimRng` (per-module / global)  |
//! | [`tissue`]    | `TissueType` enum (AIR, BLOOD, EPITHELIUM, …)           |
//! | [`error`]     | `CoreError`, `CoreResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod point;
pub mod rng;
pub mod time;
pub mod tissue;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::{AgentId, ModuleId, VoxelId};
pub use point::Point3;
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, Tick, TIME_EPSILON};
pub use tissue::TissueType;
