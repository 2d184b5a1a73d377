use embassy_time::Duration;

const FAST: Duration = Duration::from_millis(100);
const SLOW: Duration = Duration::from_millis(500);
const TOGGLES_PER_PHASE: u8 = 3;

/// Pauses between LED toggles: three short, three long, repeated forever.
#[derive(Debug, Default, Clone)]
pub struct Rhythm {
    step: u8,
}

impl Rhythm {
    pub const fn new() -> Self {
        Self { step: 0 }
    }
}

impl Iterator for Rhythm {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let pause = if self.step < TOGGLES_PER_PHASE { FAST } else { SLOW };
        self.step = (self.step + 1) % (2 * TOGGLES_PER_PHASE);
        Some(pause)
    }
}
