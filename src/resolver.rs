//! Source-to-target transform resolution over the frame forest.
//!
//! Each stored edge is "child pose expressed in parent", so a source-to-target
//! transform is composed by walking both frames root-ward to their lowest
//! common ancestor: source-side edges multiply in directly, target-side edges
//! come back down inverted. All composition goes through homogeneous
//! matrices, then the result is decomposed once at the end.

use crate::error::{TransformError, TransformResult};
use crate::registry::{FrameIndex, FrameRegistry, normalize_frame_id};
use crate::transform::RigidTransform;
use glam::DMat4;
use std::collections::HashMap;

impl FrameRegistry {
    /// The rigid transform mapping a point expressed in `source` into
    /// `target` coordinates.
    ///
    /// Same-frame queries short-circuit to the identity without touching the
    /// registry, registered or not; layers whose source frame equals the
    /// render target hit this every frame. Unknown frames and disconnected
    /// trees are routine "no data yet" outcomes during startup, returned as
    /// errors for the caller to skip that update cycle on.
    pub fn resolve(&self, target: &str, source: &str) -> TransformResult<RigidTransform> {
        let target_id = normalize_frame_id(target)?;
        let source_id = normalize_frame_id(source)?;

        if target_id == source_id {
            return Ok(RigidTransform::IDENTITY);
        }

        let source_idx = self
            .index_of(&source_id)
            .ok_or_else(|| TransformError::FrameNotFound(source_id.to_string()))?;
        let target_idx = self
            .index_of(&target_id)
            .ok_or_else(|| TransformError::FrameNotFound(target_id.to_string()))?;

        let source_chain = self.ancestor_chain(source_idx)?;
        let target_chain = self.ancestor_chain(target_idx)?;

        // Position of every target-chain member, keyed by arena index, so the
        // common-ancestor scan is linear in chain depth.
        let target_positions: HashMap<FrameIndex, usize> = target_chain
            .iter()
            .enumerate()
            .map(|(pos, &idx)| (idx, pos))
            .collect();

        // First source-chain frame also present in the target chain is the
        // lowest common ancestor, since both chains run leaf to root.
        let (source_leg_len, lca) = source_chain
            .iter()
            .enumerate()
            .find(|(_, idx)| target_positions.contains_key(idx))
            .map(|(pos, &idx)| (pos, idx))
            .ok_or_else(|| TransformError::TransformNotFound {
                from: source_id.to_string(),
                to: target_id.to_string(),
            })?;

        let mut acc = DMat4::IDENTITY;

        // Source up to the LCA: each hop's matrix forms the outer composition
        // with what is already accumulated.
        for &idx in &source_chain[..source_leg_len] {
            acc = self.edge_matrix(idx)? * acc;
        }

        // LCA down to the target: stored edges point child-to-parent, so this
        // leg applies them inverted, outermost (closest to the LCA) first.
        let target_leg_len = target_positions[&lca];
        for &idx in target_chain[..target_leg_len].iter().rev() {
            acc = self.inverse_edge_matrix(idx)? * acc;
        }

        Ok(RigidTransform::from_mat4(&acc))
    }

    fn edge_to_parent(&self, idx: FrameIndex) -> TransformResult<RigidTransform> {
        let frame = self.frame_at(idx);
        frame
            .edge_to_parent
            .ok_or_else(|| TransformError::TransformNotFound {
                from: frame.id.to_string(),
                to: frame
                    .parent
                    .map(|p| self.frame_at(p).id.to_string())
                    .unwrap_or_default(),
            })
    }

    fn edge_matrix(&self, idx: FrameIndex) -> TransformResult<DMat4> {
        Ok(self.edge_to_parent(idx)?.to_mat4())
    }

    fn inverse_edge_matrix(&self, idx: FrameIndex) -> TransformResult<DMat4> {
        Ok(self.edge_to_parent(idx)?.inverse().to_mat4())
    }
}
