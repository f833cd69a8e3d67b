#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Headless core of the case map client.
//!
//! * [`MapSession`] is the per-map context: interaction state machine, element cache,
//!   staged imports, hitboxes and notifications.
//! * [`RenderSurface`] is the seam to the rendering backend; [`HeadlessSurface`] records
//!   calls instead of drawing.
//! * Persistence goes through [`casemap_gateway::Gateway`]; completions come back on the
//!   message bus in [`msg`].

pub mod cache;
pub mod config;
pub mod element;
pub mod fsm;
pub mod import;
pub mod msg;
pub mod notifications;
pub mod render;
mod session;

pub use cache::{CacheError, CacheKey, ElementCache};
pub use config::{ConfigError, HitboxConfig, MapConfig};
pub use element::{ElementSnapshot, MapElement, Seed};
pub use fsm::{DrawnShape, EditTarget, EventKind, MapEvent, MapState, export_to_dot};
pub use import::{Hitbox, HitboxRegistry, ImportBucket, ImportError, ImportReport};
pub use msg::{CommitAction, Dirty, MapMsg};
pub use notifications::{AutoDismiss, Level, Notification, NotificationCenter};
pub use render::{Capabilities, DrawTool, EditMode, HeadlessSurface, RenderContext, RenderHandle, RenderSurface, ShapeKind, ShapeUpdate};
pub use session::{DropError, MapSession};
