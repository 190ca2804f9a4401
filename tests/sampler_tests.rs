//! Sampler and frame tests
//!
//! Tests for:
//! - Inclusive parameter spacing for every source kind
//! - Degenerate tangent repair (signed secants, interior cusps, fully collapsed curves)
//! - Look rotation convention and relative frames

use glam::{Affine3A, Quat, Vec3};
use std::f32::consts::FRAC_PI_2;
use vfx_path::bake::{
    CurveSource, RelativeFrame, Sampler, SplineChainSource, SplineSource, look_rotation,
    parameter_at,
};
use vfx_path::curve::{BezierKnot, DirtyFlag, Spline, SplineContainer};
use vfx_path::scene::Hierarchy;

// ============================================================================
// Helpers
// ============================================================================

const EPSILON: f32 = 1e-4;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

fn spline_source(spline: Spline) -> SplineSource {
    let mut hierarchy = Hierarchy::new();
    let owner = hierarchy.create_node("curve");
    let mut source = SplineSource::new(Some(SplineContainer::with_splines(owner, vec![spline])));
    assert!(source.refresh(&DirtyFlag::new()));
    source
}

fn forward(rotation: Quat) -> Vec3 {
    rotation * Vec3::Z
}

// ============================================================================
// Spacing
// ============================================================================

#[test]
fn produces_exactly_point_count_samples() {
    let source = spline_source(Spline::linear(&[Vec3::ZERO, Vec3::X], false));
    let mut sampler = Sampler::new();
    for point_count in [2, 3, 7, 64] {
        let samples = sampler.sample(&source, point_count, &RelativeFrame::IDENTITY);
        assert_eq!(samples.len(), point_count);
        assert_eq!(samples[0].t, 0.0);
        assert_eq!(samples[point_count - 1].t, 1.0);
    }
}

#[test]
fn parameters_are_evenly_spaced() {
    let extent = 3.0;
    let point_count = 7;
    let step = extent / (point_count - 1) as f32;
    for i in 1..point_count {
        let delta = parameter_at(i, point_count, extent) - parameter_at(i - 1, point_count, extent);
        assert!((delta - step).abs() < EPSILON);
    }
}

#[test]
fn chain_domain_spans_all_segments() {
    let mut hierarchy = Hierarchy::new();
    let owner = hierarchy.create_node("curve");
    let container = SplineContainer::with_splines(
        owner,
        vec![
            Spline::linear(&[Vec3::ZERO, Vec3::X], false),
            Spline::linear(&[Vec3::X, Vec3::new(2.0, 0.0, 0.0)], false),
            Spline::linear(&[Vec3::new(2.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0)], false),
        ],
    );
    let mut source = SplineChainSource::new(Some(container));
    source.refresh(&DirtyFlag::new());

    assert_eq!(source.segment_count(), 3);
    assert_eq!(source.domain_extent(), 3.0);
    assert_eq!(source.locate(3.0), (2, 1.0));
    assert_eq!(source.locate(1.0), (1, 0.0));

    let mut sampler = Sampler::new();
    let samples = sampler.sample(&source, 7, &RelativeFrame::IDENTITY);
    for (i, sample) in samples.iter().enumerate() {
        assert!(vec3_approx(sample.position, Vec3::new(i as f32 * 0.5, 0.0, 0.0)));
    }
    assert_eq!(samples[6].auxiliary, 2.0);
}

// ============================================================================
// Degenerate tangents
// ============================================================================

#[test]
fn zero_end_tangents_use_signed_secant() {
    // Collapsed handles give zero derivatives at both knots
    let spline = Spline::new(
        vec![
            BezierKnot::new(Vec3::ZERO),
            BezierKnot::new(Vec3::new(-2.0, 0.0, 0.0)),
        ],
        false,
    );
    assert_eq!(spline.evaluate(0.0).tangent, Vec3::ZERO);
    let source = spline_source(spline);

    let mut sampler = Sampler::new();
    let samples = sampler.sample(&source, 3, &RelativeFrame::IDENTITY);

    let first_secant = (samples[1].position - samples[0].position).normalize();
    let last_secant = (samples[2].position - samples[1].position).normalize();
    assert!(vec3_approx(first_secant, Vec3::NEG_X));
    assert!(vec3_approx(forward(samples[0].rotation), first_secant));
    assert!(vec3_approx(forward(samples[2].rotation), last_secant));
    for sample in samples {
        assert!(sample.rotation.is_normalized());
    }
}

#[test]
fn interior_cusp_uses_forward_secant() {
    // Collapsed handles put a zero tangent on the middle knot
    let corner = Vec3::new(2.0, 0.0, 0.0);
    let spline = Spline::new(
        vec![
            BezierKnot::new(Vec3::ZERO),
            BezierKnot::new(corner),
            BezierKnot::new(Vec3::new(2.0, 0.0, 2.0)),
        ],
        false,
    );
    assert_eq!(spline.evaluate(0.5).tangent, Vec3::ZERO);
    let source = spline_source(spline);

    let mut sampler = Sampler::new();
    let samples = sampler.sample(&source, 5, &RelativeFrame::IDENTITY);

    assert!(vec3_approx(samples[2].position, corner));
    assert!(vec3_approx(samples[3].position, Vec3::new(2.0, 0.0, 1.0)));
    // Towards the next sample, not back along the incoming segment
    assert!(vec3_approx(forward(samples[2].rotation), Vec3::Z));
    assert!(vec3_approx(forward(samples[1].rotation), Vec3::X));
    assert!(samples[2].rotation.is_normalized());
}

#[test]
fn collapsed_curve_never_builds_from_zero() {
    // Two coincident knots: zero tangent and zero secant everywhere
    let spline = Spline::new(
        vec![BezierKnot::new(Vec3::ONE), BezierKnot::new(Vec3::ONE)],
        false,
    );
    let flag = DirtyFlag::new();
    let mut hierarchy = Hierarchy::new();
    let owner = hierarchy.create_node("curve");
    let mut source = SplineSource::new(Some(SplineContainer::with_splines(owner, vec![spline])));
    source.refresh(&flag);
    assert!(!source.is_present());

    let mut sampler = Sampler::new();
    let samples = sampler.sample(&source, 4, &RelativeFrame::IDENTITY);
    for sample in samples {
        assert!(sample.rotation.is_finite());
        assert!(vec3_approx(forward(sample.rotation), Vec3::Z));
    }
}

// ============================================================================
// Frames
// ============================================================================

#[test]
fn look_rotation_keeps_up_when_possible() {
    let q = look_rotation(Vec3::new(1.0, 0.0, 1.0), Vec3::Y);
    assert!(vec3_approx(forward(q), Vec3::new(1.0, 0.0, 1.0).normalize()));
    assert!(vec3_approx(q * Vec3::Y, Vec3::Y));
}

#[test]
fn relative_frame_rotates_after_look() {
    let relative = Affine3A::from_rotation_translation(
        Quat::from_rotation_y(FRAC_PI_2),
        Vec3::new(0.0, 1.0, 0.0),
    );
    let frame = RelativeFrame::from_matrix(relative);
    assert!(!frame.is_identity());

    let look = look_rotation(Vec3::X, Vec3::Y);
    let (position, rotation) = frame.apply(Vec3::X, look);
    assert!(vec3_approx(position, Vec3::new(0.0, 1.0, -1.0)));
    assert!(rotation.angle_between(Quat::from_rotation_y(FRAC_PI_2) * look) < 1e-4);
}

#[test]
fn identical_nodes_skip_the_relative_step() {
    let mut hierarchy = Hierarchy::new();
    let node = hierarchy.create_node("effect");
    hierarchy.get_mut(node).unwrap().transform.position = Vec3::splat(5.0);
    hierarchy.update_world_matrices();

    let frame = RelativeFrame::between(&hierarchy, node, node);
    assert!(frame.is_identity());
    let (position, rotation) = frame.apply(Vec3::X, Quat::IDENTITY);
    assert_eq!(position, Vec3::X);
    assert_eq!(rotation, Quat::IDENTITY);
}
