//! Latest-value coordinate frame transform graph for robot visualization
//! clients.
//!
//! Transform records arrive over a protocol bridge as (parent, child, rigid
//! transform) edges and are folded into a forest of named frames; rendering
//! layers resolve source-to-target transforms through the lowest common
//! ancestor every rendered frame. Only the latest transform per edge is kept,
//! no history or interpolation, matching what a render loop polling every
//! frame expects.
//!
//! # Example
//! ```
//! use frame_graph::{FrameGraph, QuatRecord, TransformRecord, Vec3Record};
//! use glam::DVec3;
//!
//! let mut graph = FrameGraph::new();
//! graph.apply(&[TransformRecord {
//!     parent_frame_id: "map".to_string(),
//!     child_frame_id: "base_link".to_string(),
//!     translation: Vec3Record { x: 10.0, y: 20.0, z: 0.0 },
//!     rotation: QuatRecord { x: 0.0, y: 0.0, z: 0.0, w: 1.0 },
//! }]);
//!
//! let map_from_base = graph.resolve("map", "base_link").unwrap();
//! assert_eq!(
//!     map_from_base.transform_point(DVec3::new(1.0, 2.0, 0.0)),
//!     DVec3::new(11.0, 22.0, 0.0),
//! );
//! ```

pub mod error;
pub mod ingest;
pub mod notifier;
pub mod registry;
pub mod resolver;
pub mod transform;

use arrayvec::ArrayString;

/// Frame identifier strings
pub type FrameIdString = ArrayString<64>;

pub use error::{TransformError, TransformResult};
pub use ingest::{FrameGraph, QuatRecord, TransformRecord, Vec3Record};
pub use notifier::{ChangeNotifier, Subscription};
pub use registry::{FrameRegistry, FrameView};
pub use transform::RigidTransform;
