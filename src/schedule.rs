use std::time::{Duration, Instant};

/// A single cancellable deferred call.
///
/// Scheduling replaces whatever was pending, so a burst of `schedule` calls
/// collapses into one firing `wait` after the last of them (debounce). Time is
/// passed in by the caller; nothing here sleeps or spawns.
#[derive(Debug, Clone)]
pub struct Deferred<T> {
    wait: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Deferred<T> {
    pub fn new(wait: Duration) -> Self {
        Self { wait, pending: None }
    }

    /// Cancel any pending call, then schedule `payload` to fire `wait` after `now`.
    pub fn schedule(&mut self, now: Instant, payload: T) {
        self.pending = Some((now + self.wait, payload));
    }

    /// Drop the pending call. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(due, _)| *due)
    }

    /// Take the payload if it is due. Fires at most once per `schedule`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((due, _)) if *due <= now => self.pending.take().map(|(_, payload)| payload),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_millis(200);

    #[test]
    fn fires_once_when_due() {
        let t0 = Instant::now();
        let mut deferred = Deferred::new(WAIT);
        deferred.schedule(t0, 7);
        assert_eq!(deferred.deadline(), Some(t0 + WAIT));
        assert_eq!(deferred.poll(t0 + Duration::from_millis(199)), None);
        assert_eq!(deferred.poll(t0 + WAIT), Some(7));
        assert_eq!(deferred.poll(t0 + WAIT * 2), None);
    }

    #[test]
    fn reschedule_replaces_pending() {
        let t0 = Instant::now();
        let mut deferred = Deferred::new(WAIT);
        deferred.schedule(t0, "first");
        deferred.schedule(t0 + Duration::from_millis(150), "second");
        assert_eq!(deferred.poll(t0 + WAIT), None);
        assert_eq!(deferred.poll(t0 + Duration::from_millis(350)), Some("second"));
    }

    #[test]
    fn cancel_prevents_firing() {
        let t0 = Instant::now();
        let mut deferred = Deferred::new(WAIT);
        deferred.schedule(t0, ());
        assert!(deferred.cancel());
        assert!(!deferred.cancel());
        assert_eq!(deferred.poll(t0 + WAIT * 3), None);
        assert_eq!(deferred.deadline(), None);
    }
}
