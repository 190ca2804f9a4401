//! Curve Source Adapters
//!
//! [`CurveSource`] normalizes the three curve representations a binder can
//! bake from into one parametric domain `[0, domain_extent]`:
//!
//! | Adapter               | Domain          | Auxiliary channel |
//! |-----------------------|-----------------|-------------------|
//! | [`SplineSource`]      | `[0, 1]`        | `1.0`             |
//! | [`SplineChainSource`] | `[0, N]`        | segment index     |
//! | [`PathSource`]        | `[0, length]`   | `1.0`             |
//!
//! Adapters observe collaborator-owned curves. They hold the
//! [`Subscription`]s that feed the binder's dirty flag, and replace them
//! whenever the resolved curve reference changes.

use smallvec::SmallVec;

use crate::curve::{
    ContainerChange, CurveId, CurvePoint, DirtyFlag, EndOfPath, PathCreator, PathUpdated, Spline,
    SplineContainer, SplineModification, Subscription, VertexPath,
};
use crate::scene::NodeHandle;

/// Identity of whatever an adapter is currently bound to.
pub type SourceIdentity = SmallVec<[CurveId; 4]>;

/// A curve the sampler can walk.
pub trait CurveSource {
    /// Short human-readable variant name.
    fn kind(&self) -> &'static str;

    /// Re-resolves the current curve reference.
    ///
    /// When the reference changed, drops the previous subscriptions,
    /// subscribes `dirty` to the new curve and returns `true`.
    fn refresh(&mut self, dirty: &DirtyFlag) -> bool;

    /// Identity of the resolved reference (empty when unbound).
    fn identity(&self) -> &SourceIdentity;

    /// The node whose local space the curve is expressed in.
    fn owner(&self) -> Option<NodeHandle>;

    /// Number of segments the domain is split into (0 when absent).
    fn segment_count(&self) -> usize;

    /// Upper end of the parameter domain.
    fn domain_extent(&self) -> f32;

    /// Position, tangent and up at parameter `t` in `[0, domain_extent]`.
    fn evaluate(&self, t: f32) -> CurvePoint;

    /// Fourth channel of the position texel at `t`.
    fn auxiliary(&self, _t: f32) -> f32 {
        1.0
    }

    /// Changes whenever the curve's content changes.
    fn content_version(&self) -> u64;

    /// A source with no curve, zero segments or zero length is absent.
    fn is_present(&self) -> bool {
        self.segment_count() > 0 && self.domain_extent() > 0.0
    }
}

/// Subscriptions plus the identity they were made for.
#[derive(Debug, Default)]
struct SourceLink {
    identity: SourceIdentity,
    subscriptions: SmallVec<[Subscription; 4]>,
}

impl SourceLink {
    fn is_bound_to(&self, ids: impl IntoIterator<Item = CurveId>) -> bool {
        self.identity.iter().copied().eq(ids)
    }

    /// Replaces the link if `identity` differs; returns whether it did.
    fn rebind(
        &mut self,
        identity: SourceIdentity,
        subscribe: impl FnOnce(&mut SmallVec<[Subscription; 4]>),
    ) -> bool {
        if identity == self.identity {
            return false;
        }
        // Detach from the old curve before listening to the new one.
        self.subscriptions.clear();
        subscribe(&mut self.subscriptions);
        self.identity = identity;
        true
    }
}

// ============================================================================
// Single spline
// ============================================================================

/// The first spline of a [`SplineContainer`].
#[derive(Debug, Default)]
pub struct SplineSource {
    container: Option<SplineContainer>,
    spline: Option<Spline>,
    link: SourceLink,
}

impl SplineSource {
    #[must_use]
    pub fn new(container: Option<SplineContainer>) -> Self {
        Self {
            container,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn container(&self) -> Option<&SplineContainer> {
        self.container.as_ref()
    }

    /// Points the adapter at another container; picked up on the next refresh.
    pub fn set_container(&mut self, container: Option<SplineContainer>) {
        self.container = container;
    }

    /// The spline resolved by the last refresh.
    #[must_use]
    pub fn spline(&self) -> Option<&Spline> {
        self.spline.as_ref()
    }
}

impl CurveSource for SplineSource {
    fn kind(&self) -> &'static str {
        "Spline"
    }

    fn refresh(&mut self, dirty: &DirtyFlag) -> bool {
        let spline = self.container.as_ref().and_then(SplineContainer::spline);

        let mut identity = SourceIdentity::new();
        identity.extend(self.container.as_ref().map(SplineContainer::id));
        identity.extend(spline.as_ref().map(Spline::id));

        let container = self.container.as_ref();
        let changed = self.link.rebind(identity, |subscriptions| {
            if let Some(container) = container {
                subscriptions.push(container.subscribe(dirty.listener::<ContainerChange>()));
            }
            if let Some(spline) = &spline {
                subscriptions.push(spline.subscribe(dirty.listener::<SplineModification>()));
            }
        });
        if changed {
            self.spline = spline;
        }
        changed
    }

    fn identity(&self) -> &SourceIdentity {
        &self.link.identity
    }

    fn owner(&self) -> Option<NodeHandle> {
        self.container.as_ref().map(SplineContainer::owner)
    }

    fn segment_count(&self) -> usize {
        match &self.spline {
            Some(spline) if spline.curve_count() > 0 && spline.length() > 0.0 => 1,
            _ => 0,
        }
    }

    fn domain_extent(&self) -> f32 {
        1.0
    }

    fn evaluate(&self, t: f32) -> CurvePoint {
        self.spline
            .as_ref()
            .map_or(CurvePoint::ORIGIN, |spline| spline.evaluate(t))
    }

    fn content_version(&self) -> u64 {
        self.spline.as_ref().map_or(0, Spline::version)
    }
}

// ============================================================================
// Spline chain
// ============================================================================

/// Every spline of a [`SplineContainer`], walked in order as one chain.
///
/// Global parameter `t` in `[0, N]` selects spline `min(floor(t), N - 1)`
/// at local parameter `t - index`. Splines get equal shares of the domain
/// regardless of their length.
#[derive(Debug, Default)]
pub struct SplineChainSource {
    container: Option<SplineContainer>,
    splines: Vec<Spline>,
    link: SourceLink,
}

impl SplineChainSource {
    #[must_use]
    pub fn new(container: Option<SplineContainer>) -> Self {
        Self {
            container,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn container(&self) -> Option<&SplineContainer> {
        self.container.as_ref()
    }

    pub fn set_container(&mut self, container: Option<SplineContainer>) {
        self.container = container;
    }

    #[must_use]
    pub fn splines(&self) -> &[Spline] {
        &self.splines
    }

    /// `(segment index, local t)` for a global chain parameter.
    #[must_use]
    pub fn locate(&self, t: f32) -> (usize, f32) {
        let count = self.splines.len();
        if count == 0 {
            return (0, 0.0);
        }
        let t = t.clamp(0.0, count as f32);
        let segment = (t.floor() as usize).min(count - 1);
        (segment, t - segment as f32)
    }
}

impl CurveSource for SplineChainSource {
    fn kind(&self) -> &'static str {
        "Spline Chain"
    }

    fn refresh(&mut self, dirty: &DirtyFlag) -> bool {
        // Compare in place first; a clean tick must not clone the list.
        let link = &self.link;
        let unchanged = match &self.container {
            Some(container) => container.read_splines(|splines| {
                let ids = splines.iter().map(Spline::id);
                link.is_bound_to(std::iter::once(container.id()).chain(ids))
            }),
            None => link.identity.is_empty(),
        };
        if unchanged {
            return false;
        }

        let splines = self
            .container
            .as_ref()
            .map(SplineContainer::splines)
            .unwrap_or_default();

        let mut identity = SourceIdentity::new();
        identity.extend(self.container.as_ref().map(SplineContainer::id));
        identity.extend(splines.iter().map(Spline::id));

        let container = self.container.as_ref();
        let changed = self.link.rebind(identity, |subscriptions| {
            if let Some(container) = container {
                subscriptions.push(container.subscribe(dirty.listener::<ContainerChange>()));
            }
            for spline in &splines {
                subscriptions.push(spline.subscribe(dirty.listener::<SplineModification>()));
            }
        });
        if changed {
            self.splines = splines;
        }
        changed
    }

    fn identity(&self) -> &SourceIdentity {
        &self.link.identity
    }

    fn owner(&self) -> Option<NodeHandle> {
        self.container.as_ref().map(SplineContainer::owner)
    }

    fn segment_count(&self) -> usize {
        let total: f32 = self.splines.iter().map(Spline::length).sum();
        if total > 0.0 { self.splines.len() } else { 0 }
    }

    fn domain_extent(&self) -> f32 {
        self.splines.len() as f32
    }

    fn evaluate(&self, t: f32) -> CurvePoint {
        let (segment, local) = self.locate(t);
        self.splines
            .get(segment)
            .map_or(CurvePoint::ORIGIN, |spline| spline.evaluate(local))
    }

    fn auxiliary(&self, t: f32) -> f32 {
        self.locate(t).0 as f32
    }

    fn content_version(&self) -> u64 {
        self.splines
            .iter()
            .fold(0u64, |acc, spline| acc.rotate_left(7) ^ spline.version())
    }
}

// ============================================================================
// Vertex path
// ============================================================================

/// The current path of a [`PathCreator`], parameterized by distance.
#[derive(Debug, Default)]
pub struct PathSource {
    creator: Option<PathCreator>,
    path: Option<VertexPath>,
    end: EndOfPath,
    link: SourceLink,
}

impl PathSource {
    #[must_use]
    pub fn new(creator: Option<PathCreator>) -> Self {
        Self {
            creator,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn creator(&self) -> Option<&PathCreator> {
        self.creator.as_ref()
    }

    pub fn set_creator(&mut self, creator: Option<PathCreator>) {
        self.creator = creator;
    }

    #[must_use]
    pub fn path(&self) -> Option<&VertexPath> {
        self.path.as_ref()
    }
}

impl CurveSource for PathSource {
    fn kind(&self) -> &'static str {
        "Vertex Path"
    }

    fn refresh(&mut self, dirty: &DirtyFlag) -> bool {
        let path = self.creator.as_ref().and_then(PathCreator::path);

        let mut identity = SourceIdentity::new();
        identity.extend(self.creator.as_ref().map(PathCreator::id));
        identity.extend(path.as_ref().map(VertexPath::id));

        let creator = self.creator.as_ref();
        let changed = self.link.rebind(identity, |subscriptions| {
            if let Some(creator) = creator {
                subscriptions.push(creator.subscribe(dirty.listener::<PathUpdated>()));
            }
        });
        if changed {
            self.path = path;
        }
        changed
    }

    fn identity(&self) -> &SourceIdentity {
        &self.link.identity
    }

    fn owner(&self) -> Option<NodeHandle> {
        self.creator.as_ref().map(PathCreator::owner)
    }

    fn segment_count(&self) -> usize {
        match &self.path {
            Some(path) if path.vertex_count() > 1 && path.length() > 0.0 => 1,
            _ => 0,
        }
    }

    fn domain_extent(&self) -> f32 {
        self.path.as_ref().map_or(0.0, VertexPath::length)
    }

    fn evaluate(&self, t: f32) -> CurvePoint {
        self.path
            .as_ref()
            .map_or(CurvePoint::ORIGIN, |path| path.evaluate_at_distance(t, self.end))
    }

    fn content_version(&self) -> u64 {
        // Paths are immutable; a regenerated path is a new identity.
        self.path.as_ref().map_or(0, |path| path.id().raw())
    }
}
