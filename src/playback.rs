use crate::error::{LifeError, Result};
use std::time::{Duration, Instant};

/// Start/stop state and tick pacing for the simulation loop.
///
/// The host calls [`Playback::tick`] from whatever drives it (a display
/// refresh, a timer). Elapsed time accumulates and one generation is due per
/// whole interval; the remainder carries into the next tick. A single tick never
/// yields more than one generation, however long the gap since the last one.
#[derive(Debug, Clone)]
pub struct Playback {
    running: bool,
    rate: u32,
    last_tick: Option<Instant>,
    accumulated: Duration,
    generation: u64,
}

impl Playback {
    pub fn new(rate: u32) -> Result<Self> {
        if rate == 0 {
            return Err(LifeError::InvalidRate(0));
        }
        Ok(Self {
            running: false,
            rate,
            last_tick: None,
            accumulated: Duration::ZERO,
            generation: 0,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn interval(&self) -> Duration {
        (Duration::from_secs(1) / self.rate).max(Duration::from_nanos(1))
    }

    pub fn start(&mut self, now: Instant) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_tick = Some(now);
        self.accumulated = Duration::ZERO;
        log::info!("playback started at {} generation(s)/s", self.rate);
    }

    /// Stop and forget any partially elapsed interval.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.last_tick = None;
        self.accumulated = Duration::ZERO;
        log::info!("playback stopped after generation {}", self.generation);
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.running {
            self.stop();
        } else {
            self.start(now);
        }
    }

    /// Change the rate; applies from the next tick. Rates below 1 are rejected
    /// and the current rate is kept.
    pub fn set_rate(&mut self, rate: i64) -> Result<()> {
        let rate = u32::try_from(rate)
            .ok()
            .filter(|&r| r >= 1)
            .ok_or(LifeError::InvalidRate(rate))?;
        if rate != self.rate {
            log::debug!("playback rate {} -> {}", self.rate, rate);
            self.rate = rate;
        }
        Ok(())
    }

    /// Account for time up to `now`. Returns `true` when one generation is due;
    /// the caller then applies it.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        let last = self.last_tick.replace(now).unwrap_or(now);
        self.accumulated += now.saturating_duration_since(last);

        let interval = self.interval();
        if self.accumulated < interval {
            return false;
        }
        // Keep only the remainder of whole intervals
        let nanos = self.accumulated.as_nanos() % interval.as_nanos();
        self.accumulated = Duration::from_nanos(nanos as u64);
        self.generation += 1;
        true
    }

    /// When the next generation falls due, if running.
    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.running {
            return None;
        }
        let last = self.last_tick?;
        Some(last + self.interval().saturating_sub(self.accumulated))
    }

    pub fn reset_generation(&mut self) {
        self.generation = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn zero_rate_is_rejected_at_construction() {
        assert!(matches!(Playback::new(0), Err(LifeError::InvalidRate(0))));
    }

    #[test]
    fn stopped_never_ticks() {
        let t0 = Instant::now();
        let mut playback = Playback::new(10).unwrap();
        assert!(!playback.tick(t0 + ms(500)));
        assert_eq!(playback.next_deadline(), None);
    }

    #[test]
    fn one_generation_per_interval() {
        let t0 = Instant::now();
        let mut playback = Playback::new(10).unwrap();
        playback.start(t0);
        assert!(!playback.tick(t0 + ms(60)));
        assert!(playback.tick(t0 + ms(100)));
        assert!(!playback.tick(t0 + ms(150)));
        assert!(playback.tick(t0 + ms(200)));
        assert_eq!(playback.generation(), 2);
    }

    #[test]
    fn remainder_carries_over() {
        let t0 = Instant::now();
        let mut playback = Playback::new(10).unwrap();
        playback.start(t0);
        // 16ms frames: 112ms elapsed on the 7th frame, 12ms carried
        let mut applied = Vec::new();
        for frame in 1..=13 {
            if playback.tick(t0 + ms(16 * frame)) {
                applied.push(frame);
            }
        }
        // Generations fall due at 112ms and at 208ms (13 * 16)
        assert_eq!(applied, vec![7, 13]);
    }

    #[test]
    fn long_gap_yields_a_single_generation() {
        let t0 = Instant::now();
        let mut playback = Playback::new(10).unwrap();
        playback.start(t0);
        assert!(playback.tick(t0 + ms(1050)));
        // 50ms carried, not 950ms
        assert!(!playback.tick(t0 + ms(1060)));
        assert!(playback.tick(t0 + ms(1100)));
        assert_eq!(playback.generation(), 2);
    }

    #[test]
    fn stop_cancels_pending_ticks() {
        let t0 = Instant::now();
        let mut playback = Playback::new(10).unwrap();
        playback.start(t0);
        assert!(!playback.tick(t0 + ms(90)));
        playback.stop();
        for n in 1..20 {
            assert!(!playback.tick(t0 + ms(100 * n)));
        }
        assert_eq!(playback.generation(), 0);

        // Restarting begins a fresh interval
        playback.start(t0 + ms(5000));
        assert!(!playback.tick(t0 + ms(5050)));
        assert!(playback.tick(t0 + ms(5100)));
    }

    #[test]
    fn bad_rate_keeps_previous() {
        let mut playback = Playback::new(10).unwrap();
        assert!(matches!(playback.set_rate(0), Err(LifeError::InvalidRate(0))));
        assert!(matches!(playback.set_rate(-4), Err(LifeError::InvalidRate(-4))));
        assert!(playback.set_rate(i64::MAX).is_err());
        assert_eq!(playback.rate(), 10);
        playback.set_rate(25).unwrap();
        assert_eq!(playback.rate(), 25);
        assert_eq!(playback.interval(), ms(40));
    }

    #[test]
    fn rate_change_applies_on_next_tick() {
        let t0 = Instant::now();
        let mut playback = Playback::new(1).unwrap();
        playback.start(t0);
        assert!(!playback.tick(t0 + ms(300)));
        playback.set_rate(2).unwrap();
        assert!(playback.tick(t0 + ms(500)));
        assert_eq!(playback.next_deadline(), Some(t0 + ms(1000)));
    }
}
