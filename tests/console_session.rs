//! End-to-end exercise of one operator-console session: static mounting
//! offsets and a stream of odometry updates arrive in batches, layers resolve
//! their poses on every notification, and the graph is wiped on disconnect.

use approx::assert_relative_eq;
use frame_graph::{FrameGraph, QuatRecord, TransformRecord, Vec3Record};
use glam::DVec3;
use std::sync::{Arc, Mutex};

fn record(child: &str, parent: &str, translation: (f64, f64, f64)) -> TransformRecord {
    TransformRecord {
        parent_frame_id: parent.to_string(),
        child_frame_id: child.to_string(),
        translation: Vec3Record {
            x: translation.0,
            y: translation.1,
            z: translation.2,
        },
        rotation: QuatRecord {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        },
    }
}

#[test]
fn session_lifecycle() {
    let mut graph = FrameGraph::new();

    // A laser layer rendering into "map" re-resolves on every change, and
    // keeps its last pose when the transform is not available yet.
    let laser_pose = Arc::new(Mutex::new(None::<DVec3>));
    let resolved = Arc::new(Mutex::new(0u32));

    // Before any transforms arrive the graph is empty and queries fail
    // closed, never panic.
    assert!(graph.resolve("map", "laser").is_err());
    assert!(!graph.has_frame("map"));

    // Static burst: sensor mounting offset, published once.
    graph.apply(&[record("laser", "base_link", (0.0, 0.0, 0.5))]);

    // The laser is known but not yet connected to "map": the layer skips the
    // update and its pose stays frozen.
    assert!(graph.has_frame("laser"));
    assert!(graph.resolve("map", "laser").is_err());
    assert!(laser_pose.lock().unwrap().is_none());

    // First dynamic burst connects the trees; every following burst moves
    // the robot.
    graph.apply(&[
        record("odom", "map", (100.0, 0.0, 0.0)),
        record("base_link", "odom", (1.0, 0.0, 0.0)),
    ]);

    {
        // Simulating the layer's re-query, normally driven by subscribe().
        let pose = graph
            .resolve("map", "/laser")
            .unwrap()
            .transform_point(DVec3::ZERO);
        assert_relative_eq!(pose.x, 101.0, epsilon = 1e-9);
        assert_relative_eq!(pose.z, 0.5, epsilon = 1e-9);
    }

    // Wire the layer up for real and drive a few odometry updates.
    {
        let laser_pose = laser_pose.clone();
        let resolved = resolved.clone();
        // Callbacks only get "something changed"; they re-pull what they
        // need. This one captures nothing from the graph, so the test pulls
        // after each batch instead.
        let resolved_in_cb = resolved.clone();
        let _sub = graph.subscribe(move || {
            *resolved_in_cb.lock().unwrap() += 1;
            laser_pose.lock().unwrap().get_or_insert(DVec3::ZERO);
        });

        for step in 1..=3 {
            graph.apply(&[record("base_link", "odom", (1.0 + step as f64, 0.0, 0.0))]);
            let pose = graph
                .resolve("map", "laser")
                .unwrap()
                .transform_point(DVec3::ZERO);
            assert_relative_eq!(pose.x, 101.0 + step as f64, epsilon = 1e-9);
        }
        assert_eq!(*resolved.lock().unwrap(), 3);
    }

    // Frame picker sees every frame that ever appeared, in arrival order.
    let ids: Vec<&str> = graph.frame_ids().collect();
    assert_eq!(ids, vec!["laser", "base_link", "odom", "map"]);

    // Disconnect: the next session starts from an empty graph.
    graph.clear();
    assert_eq!(graph.frame_ids().count(), 0);
    assert!(graph.resolve("map", "laser").is_err());
    assert_eq!(
        graph.resolve("laser", "laser").unwrap(),
        frame_graph::RigidTransform::IDENTITY
    );
}
