use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

/// Serialises fetches and waits a fixed delay before each one
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    turn: Mutex<()>,
}

/// Held for the duration of one fetch; the next caller waits until it is dropped
pub struct ThrottleGuard<'a> {
    _turn: MutexGuard<'a, ()>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            turn: Mutex::new(()),
        }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits for the previous fetch to finish, then sleeps the full delay
    pub async fn acquire(&self) -> ThrottleGuard<'_> {
        let turn = self.turn.lock().await;
        if !self.delay.is_zero() {
            ::log::trace!("Waiting {:?} before next fetch", self.delay);
            tokio::time::sleep(self.delay).await;
        }
        ThrottleGuard { _turn: turn }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::from_millis(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_full_delay() {
        let throttle = Throttle::from_millis(1000);
        let start = Instant::now();

        drop(throttle.acquire().await);
        assert!(start.elapsed() >= Duration::from_millis(1000));

        drop(throttle.acquire().await);
        assert!(start.elapsed() >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_are_serialised() {
        let throttle = Throttle::from_millis(500);
        let start = Instant::now();

        let first = async {
            let _guard = throttle.acquire().await;
            tokio::time::sleep(Duration::from_millis(300)).await;
        };
        let second = async {
            let _guard = throttle.acquire().await;
        };
        tokio::join!(first, second);

        // 500 delay + 300 held + 500 delay
        assert!(start.elapsed() >= Duration::from_millis(1300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_does_not_sleep() {
        let throttle = Throttle::from_millis(0);
        let start = Instant::now();
        drop(throttle.acquire().await);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_default_delay() {
        assert_eq!(Throttle::default().delay(), Duration::from_secs(1));
    }
}
