//! Animation phases supplied to renderers.

/// Reveal progress on each axis, both in `0.0..=1.0`.
///
/// `phase_y` scales entry values toward zero; `phase_x` shrinks the visible
/// entry range from the left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animator {
    phase_x: f64,
    phase_y: f64,
}

impl Animator {
    /// Fully revealed phases.
    pub fn new() -> Self {
        Self {
            phase_x: 1.0,
            phase_y: 1.0,
        }
    }

    /// Current X phase.
    pub fn phase_x(&self) -> f64 {
        self.phase_x
    }

    /// Current Y phase.
    pub fn phase_y(&self) -> f64 {
        self.phase_y
    }

    /// Set the X phase, clamped into range.
    pub fn set_phase_x(&mut self, phase: f64) {
        self.phase_x = clamp_phase(phase);
    }

    /// Set the Y phase, clamped into range.
    pub fn set_phase_y(&mut self, phase: f64) {
        self.phase_y = clamp_phase(phase);
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_phase(phase: f64) -> f64 {
    if phase.is_nan() {
        return 1.0;
    }
    phase.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_clamped() {
        let mut animator = Animator::new();
        animator.set_phase_x(1.7);
        animator.set_phase_y(-0.2);
        assert_eq!(animator.phase_x(), 1.0);
        assert_eq!(animator.phase_y(), 0.0);
        animator.set_phase_y(f64::NAN);
        assert_eq!(animator.phase_y(), 1.0);
    }
}
