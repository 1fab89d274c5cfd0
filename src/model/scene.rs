use crate::animation::tween::{Property, TweenSpec, TweenTrack};
use crate::foundation::core::{Affine, Transform2D, Vec2};
use crate::foundation::error::{ClipgridError, ClipgridResult};

/// Index of a node in a [`SceneTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

#[derive(Clone, Debug)]
struct SceneNode {
    parent: Option<NodeId>,
    base: Transform2D,
    track: TweenTrack,
}

/// Transform nodes used for compositing offsets.
#[derive(Clone, Debug, Default)]
pub struct SceneTree {
    nodes: Vec<SceneNode>,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parentless node.
    pub fn add_root(&mut self, base: Transform2D) -> NodeId {
        self.push(None, base)
    }

    /// Add a node under an existing `parent`.
    pub fn add_child(&mut self, parent: NodeId, base: Transform2D) -> ClipgridResult<NodeId> {
        self.node(parent)?;
        Ok(self.push(Some(parent), base))
    }

    fn push(&mut self, parent: Option<NodeId>, base: Transform2D) -> NodeId {
        self.nodes.push(SceneNode {
            parent,
            base,
            track: TweenTrack::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    fn node(&self, id: NodeId) -> ClipgridResult<&SceneNode> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| ClipgridError::validation(format!("unknown scene node {}", id.0)))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> ClipgridResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Queue tweens on a node's transform properties.
    pub fn queue_tween<I>(
        &mut self,
        id: NodeId,
        start_ms: u64,
        dur_ms: u64,
        specs: I,
    ) -> ClipgridResult<()>
    where
        I: IntoIterator<Item = TweenSpec>,
    {
        let node = self
            .nodes
            .get_mut(id.0)
            .ok_or_else(|| ClipgridError::validation(format!("unknown scene node {}", id.0)))?;
        node.track.queue(start_ms, dur_ms, specs)
    }

    pub fn track(&self, id: NodeId) -> ClipgridResult<&TweenTrack> {
        Ok(&self.node(id)?.track)
    }

    /// Local transform of `id` at `t_ms`.
    pub fn local_transform(&self, id: NodeId, t_ms: f64) -> ClipgridResult<Transform2D> {
        let node = self.node(id)?;
        Ok(animated_transform(node.base, &node.track, t_ms))
    }

    /// World transform of `id` at `t_ms`, composed from the root down.
    pub fn world_affine(&self, id: NodeId, t_ms: f64) -> ClipgridResult<Affine> {
        let mut out = Affine::IDENTITY;
        let mut cursor = Some(id);
        while let Some(cur) = cursor {
            let node = self.node(cur)?;
            out = animated_transform(node.base, &node.track, t_ms).to_affine() * out;
            cursor = node.parent;
        }
        Ok(out)
    }
}

/// Apply the transform tweens of `track` on top of `base`.
///
/// Translations add to the base translation; scales multiply the base scale.
pub(crate) fn animated_transform(base: Transform2D, track: &TweenTrack, t_ms: f64) -> Transform2D {
    let scale = track.evaluate(&Property::Scale, t_ms);
    Transform2D {
        translate: base.translate
            + Vec2::new(
                track.evaluate(&Property::TranslateX, t_ms),
                track.evaluate(&Property::TranslateY, t_ms),
            ),
        scale: Vec2::new(
            base.scale.x * scale * track.evaluate(&Property::ScaleX, t_ms),
            base.scale.y * scale * track.evaluate(&Property::ScaleY, t_ms),
        ),
        anchor: base.anchor,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/scene.rs"]
mod tests;
