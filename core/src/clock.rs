/// Elapsed playback time shared by every burst of one encode run
///
/// Bursts advance the clock one sample period at a time and never snap it
/// to a grid, so the sub-sample residual left by one burst carries into the
/// phase computation of the next. Blanks advance it in whole seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackClock {
    seconds: f64,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self { seconds: 0.0 }
    }

    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    /// Start of the current low-carrier cycle
    ///
    /// floor(t * f) / f: the nearest cycle boundary at or before now.
    pub fn carrier_origin(&self, low_carrier: u32) -> f64 {
        let freq = low_carrier as f64;
        (self.seconds * freq).floor() / freq
    }

    pub fn tick(&mut self, period: f64) {
        self.seconds += period;
    }

    /// Advance past a blank of `seconds` at `sample_rate`.
    ///
    /// Only whole seconds count: the sample count is truncated, then divided
    /// by the rate in integer arithmetic. A blank shorter than one second
    /// leaves the clock, and so the carrier grid phase, where it was.
    pub fn advance_blank(&mut self, seconds: f64, sample_rate: u32) {
        let frames = (seconds * sample_rate as f64) as i64;
        let whole = (frames / i64::from(sample_rate)).max(0);
        self.seconds += whole as f64;
    }
}
