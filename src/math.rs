// src/math.rs
// Equations of motion for the two simulated systems.
// Both are autonomous ODEs, so the vector field only sees the current state (no time argument).
// State layouts: double pendulum [θ1, ω1, θ2, ω2] (radians, rad/s); Lorenz [x, y, z].

use serde::{Deserialize, Serialize};

/// A time-independent vector field `ds/dt = f(s)` over a fixed-size state.
pub trait VectorField<const N: usize> {
    /// Evaluates `f(s)`.
    fn derivative(&self, state: &[f64; N]) -> [f64; N];
}

/// Index of θ1 in a double-pendulum state.
pub const THETA1: usize = 0;
/// Index of ω1.
pub const OMEGA1: usize = 1;
/// Index of θ2.
pub const THETA2: usize = 2;
/// Index of ω2.
pub const OMEGA2: usize = 3;

/// Planar double pendulum with point masses on massless rods.
/// Angles are measured from the downward vertical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoublePendulum {
    pub l1: f64, // Upper rod length (m).
    pub l2: f64, // Lower rod length (m).
    pub m1: f64, // Upper bob mass (kg).
    pub m2: f64, // Lower bob mass (kg).
    pub g: f64,  // Gravitational acceleration (m/s²).
}

impl Default for DoublePendulum {
    fn default() -> Self {
        Self {
            l1: 1.0,
            l2: 1.0,
            m1: 1.0,
            m2: 1.0,
            g: 9.81,
        }
    }
}

impl DoublePendulum {
    /// Angular accelerations (α1, α2) at the given state.
    pub fn accelerations(&self, state: &[f64; 4]) -> (f64, f64) {
        let Self { l1, l2, m1, m2, g } = *self;
        let (theta1, omega1) = (state[THETA1], state[OMEGA1]);
        let (theta2, omega2) = (state[THETA2], state[OMEGA2]);

        let delta = theta2 - theta1;
        let (sin_d, cos_d) = delta.sin_cos();
        let total = m1 + m2;

        // Shared denominators of the coupled equations.
        let den1 = total * l1 - m2 * l1 * cos_d * cos_d;
        let den2 = (l2 / l1) * den1;

        let alpha1 = (m2 * l1 * omega1 * omega1 * sin_d * cos_d
            + m2 * g * theta2.sin() * cos_d
            + m2 * l2 * omega2 * omega2 * sin_d
            - total * g * theta1.sin())
            / den1;

        let alpha2 = (-m2 * l2 * omega2 * omega2 * sin_d * cos_d
            + total * g * theta1.sin() * cos_d
            - total * l1 * omega1 * omega1 * sin_d
            - total * g * theta2.sin())
            / den2;

        (alpha1, alpha2)
    }

    /// Cartesian bob positions relative to the pivot, y pointing up.
    pub fn positions(&self, state: &[f64; 4]) -> ((f64, f64), (f64, f64)) {
        let x1 = self.l1 * state[THETA1].sin();
        let y1 = -self.l1 * state[THETA1].cos();
        let x2 = x1 + self.l2 * state[THETA2].sin();
        let y2 = y1 - self.l2 * state[THETA2].cos();
        ((x1, y1), (x2, y2))
    }

    /// Total reach of the chain, used to size the view.
    pub fn reach(&self) -> f64 {
        self.l1 + self.l2
    }

    /// Total mechanical energy (J). Handy for checking integrator drift.
    pub fn energy(&self, state: &[f64; 4]) -> f64 {
        let Self { l1, l2, m1, m2, g } = *self;
        let (theta1, omega1) = (state[THETA1], state[OMEGA1]);
        let (theta2, omega2) = (state[THETA2], state[OMEGA2]);
        let ((_, y1), (_, y2)) = self.positions(state);

        let kinetic = 0.5 * m1 * (l1 * omega1).powi(2)
            + 0.5
                * m2
                * ((l1 * omega1).powi(2)
                    + (l2 * omega2).powi(2)
                    + 2.0 * l1 * l2 * omega1 * omega2 * (theta1 - theta2).cos());
        let potential = m1 * g * y1 + m2 * g * y2;
        kinetic + potential
    }
}

impl VectorField<4> for DoublePendulum {
    fn derivative(&self, state: &[f64; 4]) -> [f64; 4] {
        let (alpha1, alpha2) = self.accelerations(state);
        [state[OMEGA1], alpha1, state[OMEGA2], alpha2]
    }
}

/// The Lorenz system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lorenz {
    pub sigma: f64,
    pub rho: f64,
    pub beta: f64,
}

impl Default for Lorenz {
    /// The classic chaotic parameters σ = 10, ρ = 28, β = 8/3.
    fn default() -> Self {
        Self {
            sigma: 10.0,
            rho: 28.0,
            beta: 8.0 / 3.0,
        }
    }
}

impl VectorField<3> for Lorenz {
    fn derivative(&self, state: &[f64; 3]) -> [f64; 3] {
        let [x, y, z] = *state;
        [
            self.sigma * (y - x),
            x * (self.rho - z) - y,
            x * y - self.beta * z,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pendulum_at_rest_hanging_down_has_no_acceleration() {
        let p = DoublePendulum::default();
        let d = p.derivative(&[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(d, [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn pendulum_falls_back_toward_vertical() {
        let p = DoublePendulum::default();
        // Both links tilted right by the same angle: the upper link swings back,
        // the lower one stays aligned with it for the first instant.
        let (a1, a2) = p.accelerations(&[0.1, 0.0, 0.1, 0.0]);
        assert!((a1 + 9.81 * 0.1f64.sin()).abs() < 1e-12);
        assert!(a2.abs() < 1e-12);
    }

    #[test]
    fn positions_follow_the_chain() {
        let p = DoublePendulum::default();
        let ((x1, y1), (x2, y2)) = p.positions(&[0.0, 0.0, std::f64::consts::FRAC_PI_2, 0.0]);
        assert!(x1.abs() < 1e-12);
        assert!((y1 + 1.0).abs() < 1e-12);
        assert!((x2 - 1.0).abs() < 1e-12);
        assert!((y2 + 1.0).abs() < 1e-12);
    }

    #[test]
    fn lorenz_origin_is_a_fixed_point() {
        assert_eq!(Lorenz::default().derivative(&[0.0, 0.0, 0.0]), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn lorenz_matches_hand_evaluation() {
        let l = Lorenz::default();
        let d = l.derivative(&[1.0, 2.0, 3.0]);
        assert_eq!(d[0], 10.0);
        assert_eq!(d[1], 1.0 * (28.0 - 3.0) - 2.0);
        assert!((d[2] - (2.0 - 8.0)).abs() < 1e-12);
    }
}
