//! Frame registry: an arena of named frames forming a forest of rooted trees.
//!
//! Frames are created lazily the first time a name shows up on either end of
//! an edge and are addressed internally by arena index, so re-parenting is an
//! index rewrite and ancestor walks never chase live references. The registry
//! only grows during a session; `clear` is the sole way frames go away.

use crate::FrameIdString;
use crate::error::{TransformError, TransformResult};
use crate::transform::RigidTransform;
use log::debug;
use std::collections::HashMap;

pub(crate) type FrameIndex = usize;

#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) id: FrameIdString,
    /// Arena index of the parent, if this frame is not a root.
    pub(crate) parent: Option<FrameIndex>,
    /// Back-references to frames naming this one as parent.
    pub(crate) children: Vec<FrameIndex>,
    /// This frame's pose expressed in the parent frame, latest value only.
    /// Set and cleared together with `parent`.
    pub(crate) edge_to_parent: Option<RigidTransform>,
}

/// Borrowed view of a single frame, for diagnostics and UI frame pickers.
#[derive(Debug)]
pub struct FrameView<'a> {
    pub id: &'a str,
    pub parent: Option<&'a str>,
    pub children: Vec<&'a str>,
    pub edge_to_parent: Option<RigidTransform>,
}

/// The shared transform graph for one session.
///
/// One instance per connection, owned by whoever drives the session and
/// handed to the components that need it. Everything is synchronous; a
/// lookup always reflects the most recently applied edges.
#[derive(Debug, Default)]
pub struct FrameRegistry {
    frames: Vec<Frame>,
    index: HashMap<FrameIdString, FrameIndex>,
}

/// Strip the single leading path separator some publishers prefix frame
/// names with, so "/map" and "map" resolve to the same frame.
pub(crate) fn normalize_frame_id(raw: &str) -> TransformResult<FrameIdString> {
    let name = raw.strip_prefix('/').unwrap_or(raw);
    FrameIdString::from(name).map_err(|_| TransformError::InvalidFrameId(raw.to_string()))
}

impl FrameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_frame(&mut self, id: FrameIdString) -> FrameIndex {
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }
        let idx = self.frames.len();
        self.frames.push(Frame {
            id,
            parent: None,
            children: Vec::new(),
            edge_to_parent: None,
        });
        self.index.insert(id, idx);
        idx
    }

    /// Register or replace the rigid transform from `child` to `parent`.
    ///
    /// Either frame is created if absent. If `child` already had a different
    /// parent the old link is removed first, so a frame never holds more than
    /// one parent edge. An edge whose parent chain already contains `child`
    /// is rejected, since it would corrupt every later ancestor walk.
    ///
    /// Numeric content is taken as-is; callers validate upstream.
    pub fn upsert_edge(
        &mut self,
        child: &str,
        parent: &str,
        transform: RigidTransform,
    ) -> TransformResult<()> {
        let child_id = normalize_frame_id(child)?;
        let parent_id = normalize_frame_id(parent)?;

        if child_id == parent_id {
            return Err(TransformError::CyclicFrameGraph {
                child: child_id.to_string(),
                parent: parent_id.to_string(),
            });
        }

        let child_idx = self.ensure_frame(child_id);
        let parent_idx = self.ensure_frame(parent_id);

        if self.would_create_cycle(child_idx, parent_idx)? {
            return Err(TransformError::CyclicFrameGraph {
                child: child_id.to_string(),
                parent: parent_id.to_string(),
            });
        }

        let old_parent = self.frames[child_idx].parent;
        if let Some(old_idx) = old_parent {
            if old_idx != parent_idx {
                self.frames[old_idx].children.retain(|&c| c != child_idx);
            }
        }

        if old_parent != Some(parent_idx) {
            self.frames[parent_idx].children.push(child_idx);
        }

        let frame = &mut self.frames[child_idx];
        frame.parent = Some(parent_idx);
        frame.edge_to_parent = Some(transform);
        Ok(())
    }

    /// True if attaching `child` under `parent` would make `child` its own
    /// transitive ancestor. `child`'s current edge is about to be replaced,
    /// but that cannot remove `child` from `parent`'s ancestor chain, so
    /// walking the current chain is exact.
    fn would_create_cycle(
        &self,
        child_idx: FrameIndex,
        parent_idx: FrameIndex,
    ) -> TransformResult<bool> {
        Ok(self.ancestor_chain(parent_idx)?.contains(&child_idx))
    }

    /// The chain of arena indices from `start` up to its root, inclusive.
    ///
    /// Capped at the current frame count: the registry is acyclic by
    /// construction, but a malformed graph must fail instead of hanging the
    /// render loop.
    pub(crate) fn ancestor_chain(&self, start: FrameIndex) -> TransformResult<Vec<FrameIndex>> {
        let cap = self.frames.len();
        let mut chain = Vec::new();
        let mut current = Some(start);
        while let Some(idx) = current {
            if chain.len() >= cap {
                return Err(TransformError::DepthLimitExceeded(cap));
            }
            chain.push(idx);
            current = self.frames[idx].parent;
        }
        Ok(chain)
    }

    pub(crate) fn index_of(&self, id: &FrameIdString) -> Option<FrameIndex> {
        self.index.get(id).copied()
    }

    pub(crate) fn frame_at(&self, idx: FrameIndex) -> &Frame {
        &self.frames[idx]
    }

    pub fn has_frame(&self, id: &str) -> bool {
        normalize_frame_id(id)
            .map(|id| self.index.contains_key(&id))
            .unwrap_or(false)
    }

    pub fn frame(&self, id: &str) -> Option<FrameView<'_>> {
        let id = normalize_frame_id(id).ok()?;
        let frame = &self.frames[self.index_of(&id)?];
        Some(FrameView {
            id: frame.id.as_str(),
            parent: frame.parent.map(|p| self.frames[p].id.as_str()),
            children: frame
                .children
                .iter()
                .map(|&c| self.frames[c].id.as_str())
                .collect(),
            edge_to_parent: frame.edge_to_parent,
        })
    }

    /// All known frame ids, in registration order.
    pub fn frame_ids(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().map(|f| f.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop every frame. The next session starts from an empty graph.
    pub fn clear(&mut self) {
        debug!("clearing frame registry ({} frames)", self.frames.len());
        self.frames.clear();
        self.index.clear();
    }
}
