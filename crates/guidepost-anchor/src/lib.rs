#![forbid(unsafe_code)]

//! Guidepost Anchor
//!
//! Mounted UI locations that participate in guides. An anchor registers its
//! target with the store while mounted, follows state broadcasts, and asks
//! the host to scroll it into view when its step becomes active.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use guidepost_anchor::{GuideAnchor, RecordingScroller};
//! use guidepost_core::{GuideDefinition, GuideStore};
//!
//! let store = GuideStore::new();
//! let scroller = Rc::new(RecordingScroller::new());
//! let anchor = GuideAnchor::mount(&store, "issues", scroller.clone());
//!
//! store.start_guide(GuideDefinition::new("intro").step_at("issues"));
//! assert!(anchor.is_active());
//! assert_eq!(scroller.len(), 1);
//! ```

pub mod anchor;
pub mod scroll;
pub mod view;

pub use anchor::{AnchorKind, AnchorOptions, AnchorPhase, GuideAnchor};
pub use scroll::{NoopScroller, RecordingScroller, ScrollBehavior, ScrollIntoView, ScrollRequest};
pub use view::AnchorView;
