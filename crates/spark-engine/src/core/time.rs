/// One accepted frame: the host timestamp and the time since the previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Host timestamp in ms.
    pub now: f64,
    /// Ms since the previous accepted frame; 0 on the first frame after start.
    pub delta: f64,
}

/// Turns raw host timestamps into a strictly increasing tick sequence.
///
/// The host calls [`advance`](FrameDriver::advance) from its single repeating
/// callback. Frames before [`start`](FrameDriver::start), after
/// [`stop`](FrameDriver::stop), or whose timestamp does not move forward are
/// ignored.
#[derive(Debug, Default)]
pub struct FrameDriver {
    running: bool,
    last: Option<f64>,
    frames: u64,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin accepting frames. The next frame becomes the clock baseline.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.last = None;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of frames accepted since construction.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Accept a frame at `now`, or `None` if it must be skipped.
    pub fn advance(&mut self, now: f64) -> Option<FrameTick> {
        if !self.running {
            return None;
        }
        if !now.is_finite() {
            log::warn!("ignoring frame with non-finite timestamp");
            return None;
        }
        let delta = match self.last {
            Some(last) if now <= last => {
                log::warn!("ignoring non-increasing frame timestamp {} (last {})", now, last);
                return None;
            }
            Some(last) => now - last,
            None => 0.0,
        };
        self.last = Some(now);
        self.frames += 1;
        Some(FrameTick { now, delta })
    }
}
