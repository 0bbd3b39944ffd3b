/// Overlay scale factor and the window size it implies
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleState {
    factor: f32,
    step: f32,
    min_factor: f32,
    min_dimension: u32,
}

impl ScaleState {
    pub fn new(min_factor: f32, step: f32, min_dimension: u32) -> Self {
        Self {
            factor: 1.0,
            step,
            min_factor,
            min_dimension,
        }
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn increase(&mut self) {
        self.factor = round_hundredths(self.factor + self.step);
    }

    /// Step down, never below the minimum factor
    pub fn decrease(&mut self) {
        self.factor = round_hundredths(self.factor - self.step).max(self.min_factor);
    }

    pub fn reset(&mut self) {
        self.factor = 1.0;
    }

    /// Window size for a source of `native` dimensions; each axis is floored at the minimum
    pub fn window_size(&self, native: (u32, u32)) -> (u32, u32) {
        let scale = |dim: u32| ((dim as f32 * self.factor) as u32).max(self.min_dimension);
        (scale(native.0), scale(native.1))
    }
}

impl Default for ScaleState {
    fn default() -> Self {
        Self::new(0.1, 0.1, 50)
    }
}

// Repeated 0.1 steps drift in binary floating point
fn round_hundredths(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_never_below_minimum() {
        let mut scale = ScaleState::default();
        for _ in 0..100 {
            scale.decrease();
        }
        assert!((scale.factor() - 0.1).abs() < 1e-6);
        assert_eq!(scale.window_size((1920, 1080)), (192, 108));
        assert_eq!(scale.window_size((320, 240)), (50, 50));
    }

    #[test]
    fn test_steps_do_not_drift() {
        let mut scale = ScaleState::default();
        for _ in 0..7 {
            scale.increase();
        }
        for _ in 0..7 {
            scale.decrease();
        }
        assert_eq!(scale.factor(), 1.0);
        assert_eq!(scale.window_size((640, 480)), (640, 480));
    }

    #[test]
    fn test_reset() {
        let mut scale = ScaleState::default();
        scale.increase();
        scale.increase();
        assert_eq!(scale.window_size((100, 100)), (120, 120));
        scale.reset();
        assert_eq!(scale.factor(), 1.0);
    }

    #[test]
    fn test_minimum_dimension_per_axis() {
        let scale = ScaleState::default();
        assert_eq!(scale.window_size((1000, 20)), (1000, 50));
        assert_eq!(scale.window_size((0, 0)), (50, 50));
    }
}
