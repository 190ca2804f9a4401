//! Change Tracker
//!
//! Decides whether a binder needs to re-bake. Each tick the binder reports
//! what it observes; anything that differs from the last baked state marks
//! the tracker dirty. Only [`ChangeTracker::mark_clean`], called right after a
//! successful bake, returns it to clean.

use bitflags::bitflags;
use glam::Affine3A;

use crate::curve::DirtyFlag;
use crate::settings::BindingNames;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DirtyReasons: u8 {
        const SOURCE_REFERENCE = 1 << 0;
        const SOURCE_CONTENT   = 1 << 1;
        const POINT_COUNT      = 1 << 2;
        const BINDING_NAMES    = 1 << 3;
        const TRANSFORM        = 1 << 4;
    }
}

#[derive(Debug)]
pub struct ChangeTracker {
    // Raised by curve change notifications
    content: DirtyFlag,
    reasons: DirtyReasons,

    point_count: Option<usize>,
    names: Option<BindingNames>,
    content_version: Option<u64>,
    relative: Option<Affine3A>,
    mismatch: bool,
}

impl Default for ChangeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeTracker {
    /// A tracker that starts dirty: nothing has been baked yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            content: DirtyFlag::new(),
            reasons: DirtyReasons::SOURCE_REFERENCE,
            point_count: None,
            names: None,
            content_version: None,
            relative: None,
            mismatch: false,
        }
    }

    /// Flag that curve subscriptions raise.
    #[must_use]
    pub fn content_flag(&self) -> &DirtyFlag {
        &self.content
    }

    pub fn mark(&mut self, reasons: DirtyReasons) {
        self.reasons |= reasons;
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.reasons.is_empty() || self.content.is_raised()
    }

    /// Pending reasons, including raised content notifications.
    #[must_use]
    pub fn reasons(&self) -> DirtyReasons {
        let mut reasons = self.reasons;
        if self.content.is_raised() {
            reasons |= DirtyReasons::SOURCE_CONTENT;
        }
        reasons
    }

    /// Returns to clean. Call only after a successful bake.
    pub fn mark_clean(&mut self) {
        self.reasons = DirtyReasons::empty();
        self.content.take();
    }

    // ========================================================================
    // Observations
    // ========================================================================

    /// Records whether the curve reference changed this tick.
    ///
    /// A changed reference also re-arms the frame-mismatch detection.
    pub fn observe_reference(&mut self, changed: bool) {
        if changed {
            self.reasons |= DirtyReasons::SOURCE_REFERENCE;
            self.mismatch = false;
            self.relative = None;
        }
    }

    pub fn observe_content_version(&mut self, version: u64) {
        if self.content_version.replace(version) != Some(version) {
            self.reasons |= DirtyReasons::SOURCE_CONTENT;
        }
    }

    pub fn observe_point_count(&mut self, point_count: usize) {
        if self.point_count.replace(point_count) != Some(point_count) {
            self.reasons |= DirtyReasons::POINT_COUNT;
        }
    }

    pub fn observe_names(&mut self, names: &BindingNames) {
        if self.names.as_ref() != Some(names) {
            self.names = Some(names.clone());
            self.reasons |= DirtyReasons::BINDING_NAMES;
        }
    }

    /// Records the source → destination relationship.
    ///
    /// `relative` is `None` when source and destination are the same node.
    /// Returns `true` when a mismatch is newly detected.
    pub fn observe_frame(&mut self, relative: Option<Affine3A>) -> bool {
        let mismatch = relative.is_some();
        let newly_detected = mismatch && !self.mismatch;
        self.mismatch = mismatch;

        if self.relative != relative {
            self.relative = relative;
            self.reasons |= DirtyReasons::TRANSFORM;
        }
        if newly_detected {
            self.reasons |= DirtyReasons::TRANSFORM;
        }
        newly_detected
    }

    #[must_use]
    pub fn has_frame_mismatch(&self) -> bool {
        self.mismatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_dirty_and_cleans_after_bake() {
        let mut tracker = ChangeTracker::new();
        assert!(tracker.is_dirty());
        tracker.mark_clean();
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn unchanged_observations_stay_clean() {
        let mut tracker = ChangeTracker::new();
        let names = BindingNames::default();
        tracker.observe_point_count(8);
        tracker.observe_names(&names);
        tracker.observe_content_version(3);
        tracker.mark_clean();

        tracker.observe_point_count(8);
        tracker.observe_names(&names);
        tracker.observe_content_version(3);
        tracker.observe_reference(false);
        assert!(!tracker.is_dirty());

        tracker.observe_point_count(9);
        assert_eq!(tracker.reasons(), DirtyReasons::POINT_COUNT);
    }

    #[test]
    fn notification_marks_content_dirty() {
        let mut tracker = ChangeTracker::new();
        tracker.mark_clean();
        tracker.content_flag().raise();
        assert!(tracker.reasons().contains(DirtyReasons::SOURCE_CONTENT));
        tracker.mark_clean();
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn mismatch_reported_once_per_reference() {
        let mut tracker = ChangeTracker::new();
        let offset = Affine3A::from_translation(glam::Vec3::X);
        assert!(!tracker.has_frame_mismatch());
        assert!(tracker.observe_frame(Some(offset)));
        assert!(tracker.has_frame_mismatch());
        assert!(!tracker.observe_frame(Some(offset)));
        tracker.observe_reference(true);
        assert!(tracker.observe_frame(Some(offset)));

        assert!(!tracker.observe_frame(None));
        assert!(!tracker.has_frame_mismatch());
    }
}
