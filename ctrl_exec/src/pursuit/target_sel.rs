//! # Target selection
//!
//! Picks the cone the vehicle should drive towards this cycle. Cones are expressed in the vehicle
//! frame (forward = +X, left = +Y) and split into those to the left and those to the right of the
//! vehicle. Targets alternate between the two sides, and on each side the controller only moves
//! to a cone which is genuinely further forward than the last one it chose. This makes the
//! vehicle weave through pairs of cones instead of chasing the nearest one.
//!
//! When there is nothing suitable on the preferred side the best cones from both sides are
//! pooled, and if no cone is ahead of the vehicle at all the nearest cone is used so that the
//! vehicle always has something to recover towards.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Rotation2, Vector2};
use serde::Serialize;
use std::cmp::Ordering;

// Internal
use super::Params;
use comms_if::sim::{Cone, ConeSet, VehicleState};
use util::maths::angle_diff;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Distances are never smaller than this, so a cone sitting on the vehicle is still usable.
///
/// Units: meters
pub const MIN_DIST_M: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Which side of the vehicle a cone is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Left,
    Right,
}

/// How the target was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectionSource {
    /// Preferred side, and the target makes progress over the last one
    PreferredProgress,

    /// Preferred side, but nothing made progress so the most forward cone was taken
    PreferredMostForward,

    /// Best of both sides, and the target makes progress over the last one
    PooledProgress,

    /// Best of both sides, most forward cone
    PooledMostForward,

    /// Nothing in front of the vehicle, the nearest cone was taken
    Nearest,
}

/// Short-term memory of the last chosen target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ControllerMemory {
    pub last_target_side: Option<Side>,

    /// Forward progress of the last target, measured when it was chosen.
    ///
    /// Units: meters
    pub last_target_progress_m: Option<f64>,
}

/// A cone as seen from the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    pub cone: Cone,

    /// Units: meters
    pub dist_m: f64,

    /// Angle between the vehicle heading and the cone, in (-pi, pi].
    ///
    /// Units: radians
    pub head_error_rad: f64,

    /// Position along the vehicle's forward axis.
    ///
    /// Units: meters
    pub progress_m: f64,

    /// Position along the vehicle's left axis, negative to the right.
    ///
    /// Units: meters
    pub lateral_m: f64,
}

/// A chosen target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Selection {
    pub target: Candidate,
    pub source: SelectionSource,
}

/// Candidates split by side, each sorted most forward first.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    pub left: Vec<Candidate>,
    pub right: Vec<Candidate>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// The side a lateral offset lies on. Zero counts as left.
    pub fn of(lateral_m: f64) -> Self {
        if lateral_m < 0.0 {
            Side::Right
        } else {
            Side::Left
        }
    }
}

impl ControllerMemory {
    /// Remember the given selection.
    pub fn record(&mut self, selection: &Selection) {
        self.last_target_side = Some(selection.target.side());
        self.last_target_progress_m = Some(selection.target.progress_m);
    }
}

impl Candidate {
    /// Express the cone in the frame of the vehicle.
    pub fn new(state: &VehicleState, cone: &Cone) -> Self {
        let rel_m = Vector2::new(cone.x - state.x, cone.y - state.y);

        // Rotating world offsets by -yaw gives the vehicle frame
        let rel_vf_m = Rotation2::new(-state.yaw) * rel_m;

        Self {
            cone: *cone,
            dist_m: rel_m.norm().max(MIN_DIST_M),
            head_error_rad: angle_diff(rel_m[1].atan2(rel_m[0]), state.yaw),
            progress_m: rel_vf_m[0],
            lateral_m: rel_vf_m[1],
        }
    }

    pub fn side(&self) -> Side {
        Side::of(self.lateral_m)
    }
}

impl Candidates {
    /// Find all cones in front of the vehicle which are not too close to it.
    pub fn find(state: &VehicleState, cones: &ConeSet, params: &Params) -> Self {
        let mut candidates = Self::default();

        for cone in cones.cones.iter() {
            let c = Candidate::new(state, cone);

            if c.head_error_rad.abs() < params.frontal_half_angle_rad
                && c.dist_m > params.min_cone_dist_m
            {
                match c.side() {
                    Side::Left => candidates.left.push(c),
                    Side::Right => candidates.right.push(c),
                }
            }
        }

        sort_most_forward_first(&mut candidates.left);
        sort_most_forward_first(&mut candidates.right);

        candidates
    }

    pub fn side(&self, side: Side) -> &[Candidate] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    /// The most forward candidate from each side, most forward first.
    pub fn pooled(&self) -> Vec<Candidate> {
        let mut pool: Vec<Candidate> = self
            .left
            .first()
            .into_iter()
            .chain(self.right.first())
            .copied()
            .collect();

        sort_most_forward_first(&mut pool);

        pool
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Choose the target for this cycle. Returns `None` only if there are no cones at all.
///
/// The memory is not modified, use [`ControllerMemory::record`] once the selection is acted on.
pub fn select_target(
    state: &VehicleState,
    cones: &ConeSet,
    memory: &ControllerMemory,
    params: &Params,
) -> Option<Selection> {
    let candidates = Candidates::find(state, cones, params);

    if candidates.is_empty() {
        return nearest(state, cones).map(|target| Selection {
            target,
            source: SelectionSource::Nearest,
        });
    }

    let min_progress_m = memory
        .last_target_progress_m
        .map(|p| p + params.min_progress_m);

    // Alternate sides
    if let Some(preferred) = memory.last_target_side.map(Side::opposite) {
        let on_side = candidates.side(preferred);

        if let Some(target) = first_progressing(on_side, min_progress_m) {
            return Some(Selection {
                target,
                source: SelectionSource::PreferredProgress,
            });
        }
        if let Some(target) = on_side.first() {
            return Some(Selection {
                target: *target,
                source: SelectionSource::PreferredMostForward,
            });
        }
    }

    let pool = candidates.pooled();

    if let Some(target) = first_progressing(&pool, min_progress_m) {
        return Some(Selection {
            target,
            source: SelectionSource::PooledProgress,
        });
    }

    pool.first().map(|target| Selection {
        target: *target,
        source: SelectionSource::PooledMostForward,
    })
}

/// The first candidate further forward than `min_progress_m`. With no minimum the first candidate
/// qualifies.
fn first_progressing(candidates: &[Candidate], min_progress_m: Option<f64>) -> Option<Candidate> {
    candidates
        .iter()
        .find(|c| match min_progress_m {
            Some(min) => c.progress_m > min,
            None => true,
        })
        .copied()
}

/// The nearest cone to the vehicle, in any direction. Ties go to the earliest cone in the set.
fn nearest(state: &VehicleState, cones: &ConeSet) -> Option<Candidate> {
    cones
        .cones
        .iter()
        .map(|cone| Candidate::new(state, cone))
        .min_by(|a, b| a.dist_m.partial_cmp(&b.dist_m).unwrap_or(Ordering::Equal))
}

/// Stable sort by descending progress, so equal progress keeps cone set order.
fn sort_most_forward_first(candidates: &mut Vec<Candidate>) {
    candidates.sort_by(|a, b| {
        b.progress_m
            .partial_cmp(&a.progress_m)
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn at(x: f64, y: f64, yaw: f64) -> VehicleState {
        VehicleState {
            x,
            y,
            yaw,
            speed: 0.0,
            timestamp: 0.0,
        }
    }

    fn cone_set(points: &[(f64, f64)]) -> ConeSet {
        points
            .iter()
            .map(|&(x, y)| Cone::new(x, y))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_vehicle_frame() {
        // Facing +Y, so a cone at +X is on the right
        let c = Candidate::new(&at(1.0, 1.0, FRAC_PI_2), &Cone::new(3.0, 1.0));

        assert!((c.progress_m).abs() < 1e-12);
        assert!((c.lateral_m + 2.0).abs() < 1e-12);
        assert!((c.dist_m - 2.0).abs() < 1e-12);
        assert!((c.head_error_rad + FRAC_PI_2).abs() < 1e-12);
        assert_eq!(c.side(), Side::Right);

        // Facing -X, a cone at -X, +Y is ahead and to the right
        let c = Candidate::new(&at(0.0, 0.0, PI), &Cone::new(-4.0, 1.0));
        assert!((c.progress_m - 4.0).abs() < 1e-9);
        assert!((c.lateral_m + 1.0).abs() < 1e-9);
        assert_eq!(c.side(), Side::Right);
    }

    #[test]
    fn test_candidate_filter() {
        let params = Params::default();
        let cones = cone_set(&[
            // Ahead on the left and right
            (5.0, 1.0),
            (8.0, -1.0),
            // Too close
            (0.3, 0.1),
            // Behind
            (-5.0, 0.5),
            // 110 degrees off, still a candidate
            (-1.0, 2.75),
        ]);

        let c = Candidates::find(&at(0.0, 0.0, 0.0), &cones, &params);

        assert_eq!(c.right.len(), 1);
        assert_eq!(c.right[0].cone, Cone::new(8.0, -1.0));
        assert_eq!(c.left.len(), 2);
        assert_eq!(c.left[0].cone, Cone::new(5.0, 1.0));
        assert_eq!(c.left[1].cone, Cone::new(-1.0, 2.75));
    }

    #[test]
    fn test_first_selection_is_most_forward() {
        let params = Params::default();
        let cones = cone_set(&[(3.0, 2.0), (13.5, -2.0), (15.0, 2.0)]);

        let sel = select_target(
            &at(0.0, 0.0, 0.0),
            &cones,
            &ControllerMemory::default(),
            &params,
        )
        .unwrap();

        assert_eq!(sel.target.cone, Cone::new(15.0, 2.0));
        assert_eq!(sel.source, SelectionSource::PooledProgress);
    }

    #[test]
    fn test_alternation() {
        let params = Params::default();

        // Two rows of cones either side of the X axis, offset from each other
        let mut points = Vec::new();
        for i in 0..5 {
            points.push((3.0 + 3.0 * i as f64, 2.0));
        }
        for i in 0..4 {
            points.push((4.5 + 3.0 * i as f64, -2.0));
        }
        let cones = cone_set(&points);

        let mut memory = ControllerMemory::default();
        let mut sides = Vec::new();

        for i in 0..6 {
            let state = at(i as f64, 0.0, 0.0);
            let sel = select_target(&state, &cones, &memory, &params).unwrap();
            memory.record(&sel);
            sides.push(memory.last_target_side.unwrap());
        }

        for pair in sides.windows(2) {
            assert_ne!(pair[0], pair[1], "sides did not alternate: {:?}", sides);
        }
    }

    #[test]
    fn test_progress_on_preferred_side() {
        let params = Params::default();
        let cones = cone_set(&[(3.0, -2.0), (5.5, -2.0), (6.5, -2.0), (9.0, -2.0), (20.0, 2.0)]);
        let memory = ControllerMemory {
            last_target_side: Some(Side::Left),
            last_target_progress_m: Some(5.0),
        };

        let sel = select_target(&at(0.0, 0.0, 0.0), &cones, &memory, &params).unwrap();

        assert_eq!(sel.target.side(), Side::Right);
        assert_eq!(sel.source, SelectionSource::PreferredProgress);
        assert!(sel.target.progress_m >= 5.0 + params.min_progress_m);
    }

    #[test]
    fn test_preferred_side_fallback() {
        let params = Params::default();
        let cones = cone_set(&[(3.0, -2.0), (9.0, -2.0), (40.0, 2.0)]);
        let memory = ControllerMemory {
            last_target_side: Some(Side::Left),
            last_target_progress_m: Some(20.0),
        };

        let sel = select_target(&at(0.0, 0.0, 0.0), &cones, &memory, &params).unwrap();

        // Nothing on the right makes progress, so take the most forward right cone rather than
        // staying on the left
        assert_eq!(sel.target.cone, Cone::new(9.0, -2.0));
        assert_eq!(sel.source, SelectionSource::PreferredMostForward);
    }

    #[test]
    fn test_pooled_fallback() {
        let params = Params::default();
        let cones = cone_set(&[(8.0, 2.0), (4.0, 1.0)]);

        // Nothing on the preferred right side
        let memory = ControllerMemory {
            last_target_side: Some(Side::Left),
            last_target_progress_m: Some(3.0),
        };
        let sel = select_target(&at(0.0, 0.0, 0.0), &cones, &memory, &params).unwrap();
        assert_eq!(sel.target.cone, Cone::new(8.0, 2.0));
        assert_eq!(sel.source, SelectionSource::PooledProgress);

        // And nothing makes progress either
        let memory = ControllerMemory {
            last_target_side: Some(Side::Left),
            last_target_progress_m: Some(50.0),
        };
        let sel = select_target(&at(0.0, 0.0, 0.0), &cones, &memory, &params).unwrap();
        assert_eq!(sel.target.cone, Cone::new(8.0, 2.0));
        assert_eq!(sel.source, SelectionSource::PooledMostForward);
    }

    #[test]
    fn test_nearest_fallback() {
        let params = Params::default();
        let cones = cone_set(&[(-5.0, 0.1), (-3.0, -0.2), (-10.0, 0.0)]);

        let sel = select_target(
            &at(0.0, 0.0, 0.0),
            &cones,
            &ControllerMemory::default(),
            &params,
        )
        .unwrap();

        assert_eq!(sel.target.cone, Cone::new(-3.0, -0.2));
        assert_eq!(sel.target.side(), Side::Right);
        assert_eq!(sel.source, SelectionSource::Nearest);

        // A cone too close to be a candidate is still used for recovery
        let cones = cone_set(&[(0.0, 0.0)]);
        let sel = select_target(
            &at(0.0, 0.0, 0.0),
            &cones,
            &ControllerMemory::default(),
            &params,
        )
        .unwrap();
        assert_eq!(sel.target.dist_m, MIN_DIST_M);
    }

    #[test]
    fn test_no_cones() {
        let sel = select_target(
            &at(0.0, 0.0, 0.0),
            &ConeSet::default(),
            &ControllerMemory::default(),
            &Params::default(),
        );

        assert!(sel.is_none());
    }

    #[test]
    fn test_ties_keep_cone_order() {
        let params = Params::default();
        let cones = cone_set(&[(5.0, 1.0), (5.0, 3.0), (5.0, 2.0)]);

        let c = Candidates::find(&at(0.0, 0.0, 0.0), &cones, &params);
        let order: Vec<f64> = c.left.iter().map(|c| c.cone.y).collect();

        assert_eq!(order, vec![1.0, 3.0, 2.0]);
    }
}
