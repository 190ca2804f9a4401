//! Curve data source tests
//!
//! Tests for:
//! - Spline evaluation, editing and versioning
//! - Spline and container change notifications
//! - Subscription lifetime (detach on drop)
//! - Vertex paths and path creators
//! - Hierarchy relative matrices

use glam::{Quat, Vec3};
use std::cell::RefCell;
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;
use vfx_path::curve::{
    BezierKnot, ChangeNotifier, ContainerChange, DirtyFlag, EndOfPath, PathCreator, PathUpdated, Spline,
    SplineContainer, SplineModification, VertexPath,
};
use vfx_path::scene::Hierarchy;

// ============================================================================
// Helpers
// ============================================================================

const EPSILON: f32 = 1e-4;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

// ============================================================================
// Spline
// ============================================================================

#[test]
fn spline_endpoints_match_knots() {
    let spline = Spline::linear(
        &[Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 2.0)],
        false,
    );
    assert_eq!(spline.curve_count(), 2);
    assert!(vec3_approx(spline.evaluate_position(0.0), Vec3::ZERO));
    assert!(vec3_approx(spline.evaluate_position(1.0), Vec3::new(2.0, 0.0, 2.0)));
    assert!(vec3_approx(spline.evaluate_position(0.5), Vec3::new(2.0, 0.0, 0.0)));
    assert!((spline.length() - 4.0).abs() < 1e-3);
}

#[test]
fn closed_spline_returns_to_start() {
    let spline = Spline::linear(
        &[Vec3::ZERO, Vec3::X, Vec3::new(1.0, 0.0, 1.0)],
        true,
    );
    assert_eq!(spline.curve_count(), 3);
    assert!(vec3_approx(spline.evaluate_position(1.0), Vec3::ZERO));
}

#[test]
fn knot_rotation_drives_up_vector() {
    let rolled = Quat::from_rotation_z(FRAC_PI_2);
    let spline = Spline::new(
        vec![
            BezierKnot::with_tangents(Vec3::ZERO, Vec3::ZERO, Vec3::Z).with_rotation(rolled),
            BezierKnot::with_tangents(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z, Vec3::ZERO)
                .with_rotation(rolled),
        ],
        false,
    );
    let point = spline.evaluate(0.5);
    assert!(vec3_approx(point.up, Vec3::NEG_X));
    assert!(point.tangent.z > 0.0);
}

#[test]
fn degenerate_splines_evaluate_safely() {
    let empty = Spline::new(Vec::new(), false);
    assert_eq!(empty.curve_count(), 0);
    assert_eq!(empty.evaluate(0.5).position, Vec3::ZERO);

    let single = Spline::new(vec![BezierKnot::new(Vec3::ONE)], false);
    assert_eq!(single.evaluate(0.3).position, Vec3::ONE);
    assert_eq!(single.evaluate(0.3).tangent, Vec3::ZERO);
    assert_eq!(single.length(), 0.0);
}

#[test]
fn edits_bump_version_and_notify() {
    let spline = Spline::linear(&[Vec3::ZERO, Vec3::X], false);
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    let _subscription = spline.subscribe(move |m: &SplineModification| sink.borrow_mut().push(*m));

    let version = spline.version();
    spline.push_knot(BezierKnot::new(Vec3::Y));
    spline.set_knot(0, BezierKnot::new(Vec3::Z));
    spline.remove_knot(1);
    spline.set_closed(true);
    spline.set_closed(true);
    spline.set_knot(10, BezierKnot::new(Vec3::Z));

    assert_eq!(spline.version(), version + 4);
    assert_eq!(
        *events.borrow(),
        vec![
            SplineModification::KnotInserted(2),
            SplineModification::KnotModified(0),
            SplineModification::KnotRemoved(1),
            SplineModification::ClosedModified,
        ]
    );
}

#[test]
fn listener_may_read_spline_during_notification() {
    let spline = Spline::linear(&[Vec3::ZERO, Vec3::X], false);
    let seen = Rc::new(RefCell::new(0usize));
    let sink = seen.clone();
    let reader = spline.clone();
    let _subscription = spline.subscribe(move |_: &SplineModification| {
        *sink.borrow_mut() = reader.knot_count();
    });

    spline.push_knot(BezierKnot::new(Vec3::Y));
    assert_eq!(*seen.borrow(), 3);
}

// ============================================================================
// Notifications
// ============================================================================

#[test]
fn dropping_subscription_detaches() {
    let notifier: ChangeNotifier<u32> = ChangeNotifier::new();
    let flag = DirtyFlag::new();

    let subscription = notifier.subscribe(flag.listener::<u32>());
    assert_eq!(notifier.listener_count(), 1);
    assert!(subscription.is_attached());

    notifier.notify(&1);
    assert!(flag.take());
    assert!(!flag.is_raised());

    drop(subscription);
    assert_eq!(notifier.listener_count(), 0);
    notifier.notify(&2);
    assert!(!flag.is_raised());
}

#[test]
fn subscription_outliving_notifier_is_harmless() {
    let subscription = {
        let notifier: ChangeNotifier<()> = ChangeNotifier::new();
        notifier.subscribe(|_: &()| {})
    };
    assert!(!subscription.is_attached());
    drop(subscription);
}

#[test]
fn container_reports_structure_changes() {
    let mut hierarchy = Hierarchy::new();
    let owner = hierarchy.create_node("curve");
    let container = SplineContainer::new(owner);
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    let _subscription = container.subscribe(move |c: &ContainerChange| sink.borrow_mut().push(*c));

    let a = container.add_spline(Spline::linear(&[Vec3::ZERO, Vec3::X], false));
    let b = container.add_spline(Spline::linear(&[Vec3::ZERO, Vec3::Y], false));
    container.replace_spline(a, Spline::linear(&[Vec3::ZERO, Vec3::Z], false));
    container.remove_spline(b);
    assert!(container.remove_spline(5).is_none());

    assert_eq!(container.owner(), owner);
    assert_eq!(container.spline_count(), 1);
    assert_eq!(
        *events.borrow(),
        vec![
            ContainerChange::SplineAdded(0),
            ContainerChange::SplineAdded(1),
            ContainerChange::SplineReplaced(0),
            ContainerChange::SplineRemoved(1),
        ]
    );
}

#[test]
fn handles_compare_by_identity() {
    let a = Spline::linear(&[Vec3::ZERO, Vec3::X], false);
    let b = Spline::linear(&[Vec3::ZERO, Vec3::X], false);
    assert_eq!(a, a.clone());
    assert_ne!(a, b);
    assert_ne!(a.id(), b.id());
}

// ============================================================================
// Vertex path
// ============================================================================

#[test]
fn vertex_path_direction_follows_segments() {
    let path = VertexPath::from_points(&[Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0)], false);
    assert!(vec3_approx(path.direction_at_distance(1.0, EndOfPath::Stop), Vec3::Z));
    let rotation = path.rotation_at_distance(1.0, EndOfPath::Stop);
    assert!(rotation.angle_between(Quat::IDENTITY) < 1e-4);
}

#[test]
fn vertex_path_interpolates_up_vectors() {
    let path = VertexPath::with_up_vectors(
        &[Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0)],
        &[Vec3::Y, Vec3::X],
        false,
    );
    let up = path.evaluate_at_distance(1.0, EndOfPath::Stop).up;
    assert!(vec3_approx(up, Vec3::new(0.5, 0.5, 0.0)));
}

#[test]
fn path_creator_announces_new_paths() {
    let mut hierarchy = Hierarchy::new();
    let owner = hierarchy.create_node("path");
    let creator = PathCreator::new(owner);
    let flag = DirtyFlag::new();
    let _subscription = creator.subscribe(flag.listener::<PathUpdated>());

    assert!(creator.path().is_none());
    let path = VertexPath::from_points(&[Vec3::ZERO, Vec3::X], false);
    creator.set_path(Some(path.clone()));
    assert!(flag.take());
    assert_eq!(creator.path(), Some(path));
    assert_eq!(creator.owner(), owner);
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn relative_matrix_maps_between_siblings() {
    let mut hierarchy = Hierarchy::new();
    let a = hierarchy.create_node("a");
    let b = hierarchy.create_node("b");
    hierarchy.get_mut(a).unwrap().transform.position = Vec3::new(1.0, 0.0, 0.0);
    hierarchy.get_mut(b).unwrap().transform.position = Vec3::new(0.0, 2.0, 0.0);
    hierarchy.update_world_matrices();

    let a_to_b = hierarchy.relative_matrix(a, b);
    assert!(vec3_approx(a_to_b.transform_point3(Vec3::ZERO), Vec3::new(1.0, -2.0, 0.0)));

    let same = hierarchy.relative_matrix(a, a);
    assert!(vec3_approx(same.transform_point3(Vec3::ONE), Vec3::ONE));
}
