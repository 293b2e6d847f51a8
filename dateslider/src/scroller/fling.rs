use std::time::Duration;

use crate::Px;

const FLING_DECAY_CONSTANT: f32 = 5.0;
const FLING_MIN_VELOCITY: f32 = 10.0;
const FLING_START_THRESHOLD: f32 = 50.0;
const FLING_MAX_VELOCITY: f32 = 6000.0;

/// Exponentially decaying momentum along the scroll axis.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ActiveFling {
    velocity: f32,
    // Sub-pixel travel not yet handed out as a whole-pixel delta.
    remainder: f32,
}

impl ActiveFling {
    /// Starts a fling, or `None` when the release is too slow to coast.
    pub(crate) fn start(velocity: f32) -> Option<Self> {
        if !velocity.is_finite() || velocity.abs() <= FLING_START_THRESHOLD {
            return None;
        }
        Some(Self {
            velocity: velocity.clamp(-FLING_MAX_VELOCITY, FLING_MAX_VELOCITY),
            remainder: 0.0,
        })
    }

    pub(crate) fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Advances by `elapsed`, returning the whole-pixel delta to apply and
    /// whether the fling keeps running afterwards.
    pub(crate) fn advance(&mut self, elapsed: Duration) -> (Px, bool) {
        let delta_time = elapsed.as_secs_f32();
        if delta_time <= 0.0 {
            return (Px::ZERO, true);
        }

        let travel = self.velocity * delta_time + self.remainder;
        let whole = travel.trunc();
        self.remainder = travel - whole;

        let decay = (-FLING_DECAY_CONSTANT * delta_time).exp();
        self.velocity *= decay;

        let delta = Px::saturating_from_f64(f64::from(whole));
        (delta, self.velocity.abs() >= FLING_MIN_VELOCITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slow_release_does_not_start() {
        assert!(ActiveFling::start(20.0).is_none());
        assert!(ActiveFling::start(f32::NAN).is_none());
        assert!(ActiveFling::start(-400.0).is_some());
    }

    #[test]
    fn velocity_is_capped() {
        let fling = ActiveFling::start(1.0e6).unwrap();
        assert_eq!(fling.velocity(), FLING_MAX_VELOCITY);
    }

    #[test]
    fn decays_until_stopped() {
        let mut fling = ActiveFling::start(1000.0).unwrap();
        let frame = Duration::from_millis(16);
        let (first, running) = fling.advance(frame);
        assert_eq!(first, Px::new(16));
        assert!(running);

        let mut total = first.raw();
        let mut frames = 1;
        loop {
            let (delta, running) = fling.advance(frame);
            assert!(delta.raw() >= 0);
            total += delta.raw();
            frames += 1;
            if !running {
                break;
            }
            assert!(frames < 1_000);
        }
        // Closed form of the travel is v0 / k = 200px.
        assert!((150..=220).contains(&total), "{total}");
    }

    #[test]
    fn zero_elapsed_is_idle() {
        let mut fling = ActiveFling::start(-800.0).unwrap();
        assert_eq!(fling.advance(Duration::ZERO), (Px::ZERO, true));
        let (delta, _) = fling.advance(Duration::from_millis(250));
        assert_eq!(delta, Px::new(-200));
    }
}
