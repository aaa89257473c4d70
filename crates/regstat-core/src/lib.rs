//! # regstat Core
//!
//! Core types for regstat, the container registry audit service.
//!
//! This crate provides the foundational data structures shared by the other
//! regstat crates:
//!
//! - [`Envelope`] / [`Event`] - the registry's notification wire format
//! - [`TargetKind`] - explicit blob/manifest classification of an event target
//! - [`Blob`], [`Manifest`], [`Tag`] - audit entities built from events
//!
//! ## Example
//!
//! ```rust
//! use regstat_core::{Action, Envelope, TargetKind};
//!
//! let body = br#"{"events":[{
//!     "action": "push",
//!     "timestamp": "2024-05-01T10:00:00Z",
//!     "target": {"mediaType": "application/octet-stream", "digest": "sha256:abc"}
//! }]}"#;
//!
//! let envelope = Envelope::from_slice(body)?;
//! let event = &envelope.events[0];
//! assert_eq!(event.action, Action::Push);
//! assert_eq!(event.kind(), TargetKind::Blob);
//! # Ok::<(), regstat_core::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod event;
pub mod model;


// Re-export main types at crate root
pub use error::{Error, Result};
pub use event::{media_type, Action, Actor, Envelope, Event, Request, Source, Target, TargetKind};
pub use model::{Blob, Manifest, Tag};
