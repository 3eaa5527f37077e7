/// Rotation of the quad, advanced by a fixed step per frame.
///
/// The angle stays in `[0, 360)`: a step that reaches 360 resets it to 0.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnimationState {
    rotation_degrees: f32,
    step: f32,
}

impl AnimationState {
    pub const DEFAULT_STEP: f32 = 0.1;

    pub fn new(step: f32) -> Self {
        debug_assert!(step.is_finite() && step >= 0.0 && step < 360.0);
        Self {
            rotation_degrees: 0.0,
            step,
        }
    }

    #[inline]
    pub fn rotation_degrees(&self) -> f32 {
        self.rotation_degrees
    }

    /// Advances one frame and returns the new angle.
    pub fn advance(&mut self) -> f32 {
        self.rotation_degrees += self.step;
        if self.rotation_degrees >= 360.0 {
            self.rotation_degrees = 0.0;
        }
        self.rotation_degrees
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_from_zero() {
        let mut anim = AnimationState::default();
        assert_eq!(anim.advance(), 0.1);
    }

    #[test]
    fn tracks_step_times_frames_before_wrap() {
        let mut anim = AnimationState::default();
        for n in 1..=3000u32 {
            let got = anim.advance();
            let expected = (0.1 * n as f64) % 360.0;
            assert!(
                (got as f64 - expected).abs() < 0.05,
                "frame {n}: {got} vs {expected}"
            );
        }
    }

    #[test]
    fn wraps_back_to_zero_every_3600_frames() {
        let mut anim = AnimationState::default();
        let mut wraps = 0;
        let mut prev = anim.rotation_degrees();

        for _ in 0..36_000 {
            let next = anim.advance();
            assert!((0.0..360.0).contains(&next));
            if next < prev {
                wraps += 1;
            }
            prev = next;
        }

        assert_eq!(wraps, 10);
        assert_eq!(anim.rotation_degrees(), 0.0);
    }

    #[test]
    fn large_step_still_wraps_into_range() {
        let mut anim = AnimationState::new(200.0);
        assert_eq!(anim.advance(), 200.0);
        assert_eq!(anim.advance(), 0.0);
    }
}
