//! `osdtree`: online service with delay on a hierarchically separated tree.
//!
//! Requests appear at points in the plane. The point set is approximated by
//! an HST whose edges fill up with the penalty each waiting request accrues;
//! once the longest edge between the server and a request is full, the
//! server is sent down a servicing path that clears the saturated region.
//!
//! # What lives here
//!
//! | Module            | Contents                                            |
//! |-------------------|-----------------------------------------------------|
//! | [`approximation`] | greedy ball clustering, HST builder                 |
//! | [`tree`]          | node/edge arena, identities, paths, major edge      |
//! | [`simulation`]    | penalties and their parser, engine, session         |
//! | [`service`]       | saturation check, key edges, time forwarding        |
//! | [`state`]         | requests, edge state, server trail, snapshots       |
//! | [`scenario`]      | canned request sets                                 |
//! | [`config`]        | `SessionConfig`, `ForwardingConfig`                 |
//! | [`error`]         | `OsdError`, `OsdResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to points, requests and     |
//! |         | penalties.                                                 |

pub mod approximation;
pub mod config;
pub mod error;
pub mod scenario;
pub mod service;
pub mod simulation;
pub mod state;
pub mod tree;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use approximation::builder::{ApproximationOptions, build};
pub use config::{ForwardingConfig, SessionConfig};
pub use error::{OsdError, OsdResult};
pub use service::resolver::{ServiceResolver, ServicingPath, check_saturation};
pub use simulation::engine::SaturationEngine;
pub use simulation::penalty::{Penalty, Term};
pub use simulation::session::Session;
pub use state::request::{Point, Request, RequestId};
pub use tree::tree::Tree;
