//! Inbound transform records and the per-session graph facade.
//!
//! The protocol client hands over batches of decoded transform records, one
//! batch per message. "Static" one-shot transforms and continuously updated
//! dynamic ones arrive on separate streams but share this fold path; the
//! registry keeps no distinction after ingestion.

use crate::error::TransformResult;
use crate::notifier::{ChangeNotifier, Subscription};
use crate::registry::{FrameRegistry, FrameView};
use crate::transform::RigidTransform;
use glam::{DQuat, DVec3};
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3Record {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuatRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

/// One decoded transform as published by the bridge: child pose expressed in
/// the parent frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRecord {
    pub parent_frame_id: String,
    pub child_frame_id: String,
    pub translation: Vec3Record,
    pub rotation: QuatRecord,
}

impl TransformRecord {
    /// The rigid transform carried by this record, numerics taken as-is.
    pub fn transform(&self) -> RigidTransform {
        RigidTransform::new(
            DVec3::new(self.translation.x, self.translation.y, self.translation.z),
            DQuat::from_xyzw(
                self.rotation.x,
                self.rotation.y,
                self.rotation.z,
                self.rotation.w,
            ),
        )
    }
}

/// One session's transform graph: a frame registry plus the change notifier
/// its consumers subscribe to.
///
/// Owned by whoever drives the connection and passed to the components that
/// need it; there is one shared graph per session and no global state.
#[derive(Default)]
pub struct FrameGraph {
    registry: FrameRegistry,
    notifier: ChangeNotifier,
}

impl FrameGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a batch of records into the registry, then fire a single
    /// notification if anything was applied.
    ///
    /// Records the registry rejects (cycles, unusable frame names) are
    /// dropped with a warning; the rest of the batch still lands. Returns the
    /// number of edges applied.
    pub fn apply(&mut self, records: &[TransformRecord]) -> usize {
        let mut applied = 0;
        for record in records {
            match self.registry.upsert_edge(
                &record.child_frame_id,
                &record.parent_frame_id,
                record.transform(),
            ) {
                Ok(()) => applied += 1,
                Err(err) => warn!(
                    "dropping transform record '{}' -> '{}': {err}",
                    record.child_frame_id, record.parent_frame_id
                ),
            }
        }
        if applied > 0 {
            self.notifier.notify();
        }
        applied
    }

    pub fn resolve(&self, target: &str, source: &str) -> TransformResult<RigidTransform> {
        self.registry.resolve(target, source)
    }

    pub fn has_frame(&self, id: &str) -> bool {
        self.registry.has_frame(id)
    }

    pub fn frame(&self, id: &str) -> Option<FrameView<'_>> {
        self.registry.frame(id)
    }

    pub fn frame_ids(&self) -> impl Iterator<Item = &str> {
        self.registry.frame_ids()
    }

    pub fn registry(&self) -> &FrameRegistry {
        &self.registry
    }

    pub fn subscribe(&self, callback: impl FnMut() + Send + 'static) -> Subscription {
        self.notifier.subscribe(callback)
    }

    /// Wipe the graph on disconnect, so the next session starts empty, and
    /// notify so subscribed layers refresh their frame lists.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.notifier.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn record(child: &str, parent: &str, x: f64, y: f64, z: f64) -> TransformRecord {
        TransformRecord {
            parent_frame_id: parent.to_string(),
            child_frame_id: child.to_string(),
            translation: Vec3Record { x, y, z },
            rotation: QuatRecord {
                x: 0.0,
                y: 0.0,
                z: 0.0,
                w: 1.0,
            },
        }
    }

    #[test]
    fn test_wire_shape() {
        let json = r#"{
            "parentFrameId": "map",
            "childFrameId": "base_link",
            "translation": { "x": 1.0, "y": 2.0, "z": 0.0 },
            "rotation": { "x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0 }
        }"#;

        let parsed: TransformRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, record("base_link", "map", 1.0, 2.0, 0.0));

        let round_trip: TransformRecord =
            serde_json::from_str(&serde_json::to_string(&parsed).unwrap()).unwrap();
        assert_eq!(round_trip, parsed);
    }

    #[test]
    fn test_batch_fires_one_notification() {
        let mut graph = FrameGraph::new();
        let notifications = Arc::new(Mutex::new(0u32));
        let count = notifications.clone();
        let _sub = graph.subscribe(move || *count.lock().unwrap() += 1);

        let applied = graph.apply(&[
            record("odom", "map", 1.0, 0.0, 0.0),
            record("base_link", "odom", 2.0, 0.0, 0.0),
            record("laser", "base_link", 0.1, 0.0, 0.3),
        ]);

        assert_eq!(applied, 3);
        assert_eq!(*notifications.lock().unwrap(), 1);
    }

    #[test]
    fn test_empty_batch_does_not_notify() {
        let mut graph = FrameGraph::new();
        let notifications = Arc::new(Mutex::new(0u32));
        let count = notifications.clone();
        let _sub = graph.subscribe(move || *count.lock().unwrap() += 1);

        assert_eq!(graph.apply(&[]), 0);
        assert_eq!(*notifications.lock().unwrap(), 0);
    }

    #[test]
    fn test_rejected_record_skipped_rest_of_batch_lands() {
        let mut graph = FrameGraph::new();
        graph.apply(&[
            record("robot", "world", 0.0, 0.0, 0.0),
            record("sensor", "robot", 0.0, 0.0, 0.0),
        ]);

        let applied = graph.apply(&[
            // Would close a cycle: dropped.
            record("world", "sensor", 0.0, 0.0, 0.0),
            record("camera", "robot", 1.0, 0.0, 0.0),
        ]);

        assert_eq!(applied, 1);
        assert!(graph.has_frame("camera"));
        assert!(graph.frame("world").unwrap().parent.is_none());
    }

    #[test]
    fn test_static_and_dynamic_records_fold_identically() {
        let mut graph = FrameGraph::new();
        // A one-shot mounting offset, then a stream of odometry updates on
        // the same fold path.
        graph.apply(&[record("laser", "base_link", 0.2, 0.0, 0.1)]);
        graph.apply(&[record("base_link", "odom", 1.0, 0.0, 0.0)]);
        graph.apply(&[record("base_link", "odom", 2.0, 0.0, 0.0)]);

        let t = graph.resolve("odom", "laser").unwrap();
        approx::assert_relative_eq!(t.translation.x, 2.2, epsilon = 1e-12);
    }

    #[test]
    fn test_clear_notifies_and_empties() {
        let mut graph = FrameGraph::new();
        graph.apply(&[record("odom", "map", 1.0, 0.0, 0.0)]);

        let notifications = Arc::new(Mutex::new(0u32));
        let count = notifications.clone();
        let _sub = graph.subscribe(move || *count.lock().unwrap() += 1);

        graph.clear();
        assert_eq!(*notifications.lock().unwrap(), 1);
        assert!(!graph.has_frame("map"));
        assert_eq!(graph.frame_ids().count(), 0);
    }
}
