//! Auto-bridging for binary stencil masks.
//!
//! A pass labels the ink regions of a [`BinaryMask`], finds every floating
//! island large enough to matter and draws a bridge from it to other ink, or
//! to the nearest canvas edge when no ray reaches anything.
//!
//! [`BinaryMask`]: stencil_fast_types::BinaryMask

pub mod config;
pub mod engine;
pub mod fallback;
pub mod finder;
pub mod labeling;
pub mod limits;
pub mod render;
pub mod report;

pub use config::BridgeSettings;
pub use engine::{apply_auto_bridges, BridgeEngine, BridgeOutcome, BridgeRun};
pub use fallback::{route_to_nearest_edge, CanvasEdge, EdgeRoute};
pub use finder::{find_bridge, max_ray_len, BridgeCandidate, RayDirection, RaySearch, BRIDGE_DIRECTIONS};
pub use labeling::{label, label_components, BridgeWorkspace, ComponentMap, Labeling, Region};
pub use render::{disk_radius, draw_bridge, paint_disk};
pub use report::{BridgeKind, BridgeRecord, BridgeReport};
