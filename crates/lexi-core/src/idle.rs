use std::time::Duration;

use tokio::time::Instant;

/// A pending "run when idle" request with a latest start time
///
/// The owner runs the task as soon as it has nothing else to do, or once
/// `deadline()` passes, whichever comes first.
#[derive(Debug, Clone)]
pub struct IdleTask {
    timeout: Duration,
    requested_at: Option<Instant>,
}

impl IdleTask {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            requested_at: None,
        }
    }

    /// Request a run; an earlier pending request keeps its deadline
    pub fn request(&mut self, now: Instant) {
        if self.requested_at.is_none() {
            self.requested_at = Some(now);
        }
    }

    pub fn cancel(&mut self) {
        self.requested_at = None;
    }

    pub fn is_pending(&self) -> bool {
        self.requested_at.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.requested_at.map(|at| at + self.timeout)
    }

    /// Clear the request; returns whether one was pending
    pub fn take(&mut self) -> bool {
        self.requested_at.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_requests_keep_first_deadline() {
        let start = Instant::now();
        let mut task = IdleTask::new(Duration::from_millis(1000));
        assert_eq!(task.deadline(), None);

        task.request(start);
        task.request(start + Duration::from_millis(600));
        assert_eq!(task.deadline(), Some(start + Duration::from_millis(1000)));

        assert!(task.take());
        assert!(!task.is_pending());
        assert!(!task.take());
    }

    #[test]
    fn test_cancel_clears_request() {
        let mut task = IdleTask::new(Duration::from_millis(10));
        task.request(Instant::now());
        task.cancel();
        assert_eq!(task.deadline(), None);
    }
}
