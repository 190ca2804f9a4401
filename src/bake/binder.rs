//! Path Binder
//!
//! [`PathBinder`] ties one curve source to one effect host. Per tick:
//!
//! 1. **Sync**: re-resolve the source reference, compare point count, binding
//!    names, content version and the source → effect transform against the
//!    last baked state ([`ChangeTracker`]).
//! 2. **Validate**: point count, required host bindings, source presence.
//! 3. **Bake** (only when dirty): sample, build frames, accumulate bounds and
//!    write both texel maps. An absent source writes the sentinel instead.
//! 4. **Publish** (only after a bake): hand the maps and bounds to the host.
//!    A bake run through [`PathBinder::bake`] is published on the next
//!    [`PathBinder::update_binding`].
//!
//! A clean binder does no sampling, allocation or publishing.

use std::fmt;

use crate::bake::bounds::{Bounds, BoundsAccumulator};
use crate::bake::frame::RelativeFrame;
use crate::bake::sampler::{Sample, Sampler};
use crate::bake::source::{CurveSource, PathSource, SplineChainSource, SplineSource};
use crate::bake::texels::{PathBuffers, Texel};
use crate::bake::tracker::{ChangeTracker, DirtyReasons};
use crate::errors::{BakeError, Result};
use crate::host::{EffectHost, PropertyKind};
use crate::scene::{Hierarchy, NodeHandle};
use crate::settings::BinderSettings;

pub type SplinePathBinder = PathBinder<SplineSource>;
pub type SplineChainPathBinder = PathBinder<SplineChainSource>;
pub type VertexPathBinder = PathBinder<PathSource>;

/// What [`PathBinder::update_binding`] did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// A bake the host had not received yet was published.
    Published,
    /// Nothing changed since the last bake.
    Unchanged,
}

#[derive(Debug)]
pub struct PathBinder<S: CurveSource> {
    node: NodeHandle,
    source: S,
    settings: BinderSettings,

    tracker: ChangeTracker,
    sampler: Sampler,
    frame: RelativeFrame,

    buffers: PathBuffers,
    bounds: Bounds,
    bake_count: u64,
    publish_pending: bool,
}

impl<S: CurveSource> PathBinder<S> {
    /// A binder for the effect living on `node`.
    pub fn new(node: NodeHandle, source: S, settings: BinderSettings) -> Self {
        Self {
            node,
            source,
            settings,
            tracker: ChangeTracker::new(),
            sampler: Sampler::new(),
            frame: RelativeFrame::IDENTITY,
            buffers: PathBuffers::new(),
            bounds: Bounds::EMPTY,
            bake_count: 0,
            publish_pending: false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn node(&self) -> NodeHandle {
        self.node
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable source access, e.g. to point it at another curve. Changes are
    /// picked up on the next tick.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    #[must_use]
    pub fn settings(&self) -> &BinderSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut BinderSettings {
        &mut self.settings
    }

    #[must_use]
    pub fn buffers(&self) -> &PathBuffers {
        &self.buffers
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Samples of the last bake; empty if the last bake had an absent source.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        self.sampler.samples()
    }

    /// Number of bakes performed so far.
    #[must_use]
    pub fn bake_count(&self) -> u64 {
        self.bake_count
    }

    /// Whether the last bake has not reached a host yet.
    #[must_use]
    pub fn is_publish_pending(&self) -> bool {
        self.publish_pending
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    #[must_use]
    pub fn dirty_reasons(&self) -> DirtyReasons {
        self.tracker.reasons()
    }

    /// Forces a re-bake on the next tick.
    pub fn invalidate(&mut self) {
        self.tracker.mark(DirtyReasons::SOURCE_CONTENT);
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Checks settings, host declarations and source presence.
    pub fn validate(&self, host: &(impl EffectHost + ?Sized)) -> Result<()> {
        self.settings.validate()?;

        let names = &self.settings.names;
        for (kind, name) in [
            (PropertyKind::Int, &names.point_count),
            (PropertyKind::Texture, &names.position_map),
        ] {
            if !host.has_property(kind, name) {
                return Err(BakeError::MissingBinding {
                    kind,
                    name: name.clone(),
                });
            }
        }

        if !self.source.is_present() {
            return Err(BakeError::SourceUnavailable {
                source_kind: self.source.kind(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn is_valid(&self, host: &(impl EffectHost + ?Sized)) -> bool {
        self.validate(host).is_ok()
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Brings the change tracker up to date with the source, settings and
    /// scene.
    pub fn sync(&mut self, hierarchy: &Hierarchy) {
        let reference_changed = self.source.refresh(self.tracker.content_flag());
        self.tracker.observe_reference(reference_changed);
        self.tracker
            .observe_content_version(self.source.content_version());
        self.tracker.observe_point_count(self.settings.point_count);
        self.tracker.observe_names(&self.settings.names);

        let relative = self
            .source
            .owner()
            .filter(|&owner| owner != self.node)
            .map(|owner| hierarchy.relative_matrix(owner, self.node));
        if self.tracker.observe_frame(relative) {
            log::warn!(
                "{self}: the curve lives on node '{}' but the effect is on '{}'; \
                 samples are mapped through the relative transform",
                node_name(hierarchy, self.source.owner()),
                node_name(hierarchy, Some(self.node)),
            );
        }
        self.frame = relative.map_or(RelativeFrame::IDENTITY, RelativeFrame::from_matrix);
    }

    /// Syncs and re-bakes if anything changed. Returns whether a bake ran.
    ///
    /// A point count below 2 never bakes; the binder stays dirty.
    pub fn bake(&mut self, hierarchy: &Hierarchy) -> bool {
        self.sync(hierarchy);
        self.bake_if_dirty()
    }

    /// Syncs, validates against `host`, re-bakes if dirty and publishes
    /// any bake the host has not received yet.
    ///
    /// An error means the binder is not valid this tick; nothing is baked
    /// or published, and the next tick checks again.
    pub fn update_binding(
        &mut self,
        host: &mut (impl EffectHost + ?Sized),
        hierarchy: &Hierarchy,
    ) -> Result<BindOutcome> {
        self.sync(hierarchy);
        self.validate(&*host)?;

        self.bake_if_dirty();
        if !self.publish_pending {
            return Ok(BindOutcome::Unchanged);
        }
        self.publish(host);
        self.publish_pending = false;
        Ok(BindOutcome::Published)
    }

    fn bake_if_dirty(&mut self) -> bool {
        if !self.tracker.is_dirty() {
            return false;
        }
        let point_count = self.settings.point_count;
        if point_count < 2 {
            return false;
        }

        let reasons = self.tracker.reasons();
        self.buffers.ensure(point_count);

        if self.source.is_present() {
            self.fill_from_source(point_count);
        } else {
            self.sampler.clear();
            self.buffers.fill_sentinel();
            self.bounds = Bounds::EMPTY;
        }

        self.tracker.mark_clean();
        self.bake_count += 1;
        self.publish_pending = true;
        log::debug!("{self}: baked {point_count} points ({reasons:?})");
        true
    }

    fn fill_from_source(&mut self, point_count: usize) {
        let samples = self.sampler.sample(&self.source, point_count, &self.frame);

        let mut bounds = BoundsAccumulator::new();
        bounds.extend(samples.iter().map(|s| s.position));
        self.bounds = bounds.finish();

        if let Some((position_map, rotation_map)) = self.buffers.maps_mut() {
            position_map.write(
                samples
                    .iter()
                    .map(|s| Texel::from_position(s.position, s.auxiliary)),
            );
            rotation_map.write(samples.iter().map(|s| Texel::from_rotation(s.rotation)));
        }
    }

    fn publish(&self, host: &mut (impl EffectHost + ?Sized)) {
        let names = &self.settings.names;

        host.set_int(
            &names.point_count,
            i32::try_from(self.settings.point_count).unwrap_or(i32::MAX),
        );
        if let Some(position_map) = self.buffers.position_map() {
            host.set_texture(&names.position_map, position_map);
        }
        if host.has_texture(&names.rotation_map)
            && let Some(rotation_map) = self.buffers.rotation_map()
        {
            host.set_texture(&names.rotation_map, rotation_map);
        }
        if host.has_vector3(&names.bounds_center) {
            host.set_vector3(&names.bounds_center, self.bounds.center);
        }
        if host.has_vector3(&names.bounds_size) {
            host.set_vector3(&names.bounds_size, self.bounds.size);
        }
    }
}

fn node_name(hierarchy: &Hierarchy, node: Option<NodeHandle>) -> &str {
    node.and_then(|handle| hierarchy.get(handle))
        .map_or("<missing>", |n| n.name.as_str())
}

impl<S: CurveSource> fmt::Display for PathBinder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VFX Path: {} -> {} {}",
            self.source.kind(),
            self.settings.names.position_map,
            self.settings.names.rotation_map
        )
    }
}
