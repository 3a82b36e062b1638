//! Detection throttle for asynchronous pose requests
//!
//! A request is issued only while playing and once enough video time has
//! passed since the previous one. Each request carries a sequence number so
//! a result that arrives after a newer one was applied can be dropped.

/// Throttle and ordering guard for pose detections
#[derive(Clone, Debug)]
pub struct DetectionScheduler {
    /// Minimum video time between requests (ms)
    interval_ms: f64,
    /// Drop results older than the last applied one
    discard_stale: bool,
    last_request_ms: Option<f64>,
    next_seq: u64,
    /// Highest sequence number applied (or invalidated by reset)
    watermark: u64,
    /// First sequence number issued since the last reset
    epoch_start: u64,
    in_flight: u32,
}

impl DetectionScheduler {
    pub fn new(interval_ms: f64, discard_stale: bool) -> Self {
        Self {
            interval_ms,
            discard_stale,
            last_request_ms: None,
            next_seq: 1,
            watermark: 0,
            epoch_start: 1,
            in_flight: 0,
        }
    }

    /// Ask for a new detection at `video_time_ms`
    ///
    /// Returns the request's sequence number, or None when paused or still
    /// inside the throttle interval. Seeking backwards re-arms the throttle.
    pub fn poll(&mut self, video_time_ms: f64, playing: bool) -> Option<u64> {
        if !playing || !video_time_ms.is_finite() {
            return None;
        }

        if let Some(last) = self.last_request_ms {
            let since = video_time_ms - last;
            if since >= 0.0 && since < self.interval_ms {
                return None;
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.last_request_ms = Some(video_time_ms);
        self.in_flight += 1;
        if self.in_flight > 1 {
            log::debug!("Detection {} issued with {} already in flight", seq, self.in_flight - 1);
        }
        Some(seq)
    }

    /// Decide whether the result of request `seq` should be applied
    ///
    /// Tickets this scheduler never issued are rejected without touching any
    /// state. Only requests issued since the last reset count as in flight.
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq == 0 || seq >= self.next_seq {
            log::warn!("Ignoring detection with unknown ticket {} (next {})", seq, self.next_seq);
            return false;
        }
        if seq >= self.epoch_start {
            self.in_flight = self.in_flight.saturating_sub(1);
        }

        if seq <= self.watermark && self.discard_stale {
            log::debug!("Discarding stale detection {} (latest {})", seq, self.watermark);
            return false;
        }
        self.watermark = self.watermark.max(seq);
        true
    }

    /// Forget request history (restart / seek)
    ///
    /// Results of requests issued before the reset are treated as stale.
    pub fn reset(&mut self) {
        self.last_request_ms = None;
        self.watermark = self.next_seq - 1;
        self.epoch_start = self.next_seq;
        self.in_flight = 0;
    }

    pub fn set_interval_ms(&mut self, interval_ms: f64) {
        self.interval_ms = interval_ms;
    }

    pub fn set_discard_stale(&mut self, discard_stale: bool) {
        self.discard_stale = discard_stale;
    }

    pub fn in_flight(&self) -> u32 {
        self.in_flight
    }
}

impl Default for DetectionScheduler {
    fn default() -> Self {
        Self::new(100.0, true)
    }
}
