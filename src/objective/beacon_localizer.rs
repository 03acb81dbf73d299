use super::beacon_task::RangeSample;
use crate::util::Vec2D;

/// Trilaterates a beacon from range samples on the toroidal map.
///
/// The estimate minimizes the sum of squared differences between each sample's range and the
/// toroidal distance from the candidate point, using Levenberg-Marquardt seeded at the midpoint
/// of the samples' bounding box.
pub struct BeaconLocalizer;

impl BeaconLocalizer {
    /// Minimum number of distinct vehicle positions needed for an estimate.
    pub const MIN_DISTINCT_POSITIONS: usize = 2;
    const MAX_ITERATIONS: usize = 500;
    const INITIAL_DAMPING: f64 = 1e-3;
    const MAX_DAMPING: f64 = 1e12;
    const STEP_TOLERANCE: f64 = 1e-6;

    /// Returns the estimated beacon position, or `None` with fewer than two distinct positions.
    pub fn localize(samples: &[RangeSample]) -> Option<Vec2D<f64>> {
        let mut positions: Vec<Vec2D<i64>> = samples
            .iter()
            .map(|s| {
                let c = s.pos().to_cell();
                Vec2D::new(i64::from(c.x()), i64::from(c.y()))
            })
            .collect();
        positions.sort_unstable_by_key(|p| (p.x(), p.y()));
        positions.dedup();
        if positions.len() < Self::MIN_DISTINCT_POSITIONS {
            return None;
        }

        let mut est = Self::seed(samples);
        let mut cost = Self::cost(samples, est);
        let mut damping = Self::INITIAL_DAMPING;
        for _ in 0..Self::MAX_ITERATIONS {
            let (jtj, jtr) = Self::normal_equations(samples, est);
            let Some(step) = Self::solve_damped(jtj, jtr, damping) else {
                damping *= 10.0;
                if damping > Self::MAX_DAMPING {
                    break;
                }
                continue;
            };
            let candidate = (est + step).wrap_around_map();
            let candidate_cost = Self::cost(samples, candidate);
            if candidate_cost < cost {
                est = candidate;
                cost = candidate_cost;
                damping = (damping / 10.0).max(1e-12);
                if step.abs() < Self::STEP_TOLERANCE {
                    break;
                }
            } else {
                damping *= 10.0;
                if damping > Self::MAX_DAMPING {
                    break;
                }
            }
        }
        Some(est)
    }

    /// Midpoint of the bounding box of all sample positions, unwrapped around the first one.
    fn seed(samples: &[RangeSample]) -> Vec2D<f64> {
        let anchor = samples[0].pos();
        let (mut min, mut max) = (anchor, anchor);
        for s in &samples[1..] {
            let p = anchor + anchor.to_wrapped(&s.pos());
            min = Vec2D::new(min.x().min(p.x()), min.y().min(p.y()));
            max = Vec2D::new(max.x().max(p.x()), max.y().max(p.y()));
        }
        ((min + max) * 0.5).wrap_around_map()
    }

    /// Sum of squared range residuals at `point`.
    pub fn cost(samples: &[RangeSample], point: Vec2D<f64>) -> f64 {
        samples.iter().map(|s| (s.pos().toroidal_distance(&point) - s.range()).powi(2)).sum()
    }

    /// Accumulates `JᵀJ` (as `[a, b, d]` of the symmetric 2x2 matrix) and `Jᵀr`.
    fn normal_equations(samples: &[RangeSample], point: Vec2D<f64>) -> ([f64; 3], Vec2D<f64>) {
        let mut jtj = [0.0; 3];
        let mut jtr = Vec2D::zero();
        for s in samples {
            let delta = s.pos().to_wrapped(&point);
            let dist = delta.abs();
            if dist < f64::EPSILON {
                continue;
            }
            let grad = delta * (1.0 / dist);
            let residual = dist - s.range();
            jtj[0] += grad.x() * grad.x();
            jtj[1] += grad.x() * grad.y();
            jtj[2] += grad.y() * grad.y();
            jtr = jtr + grad * residual;
        }
        (jtj, jtr)
    }

    /// Solves `(JᵀJ + λ·diag(JᵀJ)) · step = -Jᵀr`.
    fn solve_damped(jtj: [f64; 3], jtr: Vec2D<f64>, damping: f64) -> Option<Vec2D<f64>> {
        let a = jtj[0] + damping * jtj[0].max(1e-9);
        let b = jtj[1];
        let d = jtj[2] + damping * jtj[2].max(1e-9);
        let det = a * d - b * b;
        if det.abs() < 1e-12 {
            return None;
        }
        let sx = (-jtr.x() * d + jtr.y() * b) / det;
        let sy = (-jtr.y() * a + jtr.x() * b) / det;
        Some(Vec2D::new(sx, sy))
    }
}
