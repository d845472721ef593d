use std::time::{Duration, Instant};

/// Wall-clock timer owned by the caller.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    /// Starts a new stopwatch.
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Time since the last start.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Resets the start point and returns the time measured until now.
    pub fn restart(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.started);
        self.started = now;
        elapsed
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_elapsed_grows() {
        let watch = Stopwatch::start();
        thread::sleep(Duration::from_millis(5));
        assert!(watch.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn test_restart_resets() {
        let mut watch = Stopwatch::start();
        thread::sleep(Duration::from_millis(20));
        let first = watch.restart();
        assert!(first >= Duration::from_millis(20));
        assert!(watch.elapsed() < first);
    }
}
