use foundation::time::Time;

/// Render-loop frame metadata.
///
/// Frames carry their own elapsed time so hover checks, control damping and
/// traces can be replayed without touching a wall clock.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta since the previous frame (seconds).
    pub dt_s: f64,
    /// Accumulated time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    /// Next frame with the same delta.
    pub fn next(self) -> Self {
        self.advance(self.dt_s)
    }

    /// Next frame with a caller-measured delta. Negative deltas clamp to zero.
    pub fn advance(self, dt_s: f64) -> Self {
        let dt_s = dt_s.max(0.0);
        Self {
            index: self.index + 1,
            dt_s,
            time: Time(self.time.0 + self.dt_s),
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new(0, 1.0 / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;
    use foundation::time::Time;

    #[test]
    fn frame_time_is_deterministic() {
        let a = Frame::new(10, 1.0 / 60.0);
        let b = Frame::new(10, 1.0 / 60.0);
        assert_eq!(a, b);
        assert_eq!(a.time, Time(10.0 / 60.0));
    }

    #[test]
    fn next_advances_index_and_time() {
        let f1 = Frame::new(0, 0.5).next();
        assert_eq!(f1.index, 1);
        assert_eq!(f1.time, Time(0.5));
    }

    #[test]
    fn advance_accumulates_variable_deltas() {
        let f = Frame::new(0, 0.25).advance(0.5).advance(-1.0);
        assert_eq!(f.index, 2);
        assert_eq!(f.time, Time(0.75));
        assert_eq!(f.dt_s, 0.0);
    }
}
