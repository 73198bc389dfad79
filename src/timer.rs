use std::time::Duration;

struct Pending<T> {
    deadline: Duration,
    payload: T,
}

/// One-shot cancellable timer carrying the context it was scheduled with.
///
/// The payload leaves the timer exactly once: through `poll` after the deadline or through
/// `cancel`. Scheduling again replaces (and drops) any earlier payload, so a superseded
/// schedule can never fire.
pub struct Timer<T> {
    pending: Option<Pending<T>>,
    scheduled: u64,
    fired: u64,
}

impl<T> Timer<T> {
    pub fn new() -> Self {
        Self { pending: None, scheduled: 0, fired: 0 }
    }

    pub fn schedule(&mut self, now: Duration, delay: Duration, payload: T) -> Option<T> {
        self.scheduled += 1;
        self.pending
            .replace(Pending { deadline: now + delay, payload })
            .map(|previous| previous.payload)
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.payload)
    }

    pub fn poll(&mut self, now: Duration) -> Option<T> {
        let due = self.pending.as_ref().map(|pending| now >= pending.deadline).unwrap_or(false);
        if !due {
            return None;
        }
        self.fired += 1;
        self.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn payload(&self) -> Option<&T> {
        self.pending.as_ref().map(|pending| &pending.payload)
    }

    pub fn payload_mut(&mut self) -> Option<&mut T> {
        self.pending.as_mut().map(|pending| &mut pending.payload)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        self.deadline().map(|deadline| deadline.saturating_sub(now))
    }

    pub fn fired_count(&self) -> u64 {
        self.fired
    }

    pub fn scheduled_count(&self) -> u64 {
        self.scheduled
    }
}

impl<T> Default for Timer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn fires_once_at_deadline() {
        let mut timer = Timer::new();
        timer.schedule(ms(0), ms(140), "hold");
        assert_eq!(timer.poll(ms(139)), None);
        assert_eq!(timer.poll(ms(140)), Some("hold"));
        assert_eq!(timer.poll(ms(500)), None);
        assert_eq!(timer.fired_count(), 1);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timer = Timer::new();
        timer.schedule(ms(10), ms(100), 7_u32);
        assert_eq!(timer.cancel(), Some(7));
        assert!(!timer.is_pending());
        assert_eq!(timer.poll(ms(1_000)), None);
        assert_eq!(timer.fired_count(), 0);
    }

    #[test]
    fn rescheduling_returns_superseded_payload() {
        let mut timer = Timer::new();
        assert_eq!(timer.schedule(ms(0), ms(650), vec![1]), None);
        let previous = timer.schedule(ms(100), ms(650), vec![2]);
        assert_eq!(previous, Some(vec![1]));
        assert_eq!(timer.poll(ms(650)), None, "deadline moved with the reschedule");
        assert_eq!(timer.remaining(ms(700)), Some(ms(50)));
        assert_eq!(timer.poll(ms(750)), Some(vec![2]));
        assert_eq!(timer.scheduled_count(), 2);
    }
}
