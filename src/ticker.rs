use std::thread;
use std::time::Duration;

use instant::Instant;


pub trait Pacer {
    // Called when a local turn begins; the first tick fires one interval later.
    fn start(&mut self);
    // Blocks until the next tick.
    fn wait_tick(&mut self);
}

// Fixed-interval ticker. If the caller falls behind, missed ticks are dropped rather than fired in
// a burst.
pub struct Ticker {
    interval: Duration,
    next_tick: Instant,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Ticker { interval, next_tick: Instant::now() + interval }
    }

    pub fn interval(&self) -> Duration { self.interval }
}

impl Pacer for Ticker {
    fn start(&mut self) { self.next_tick = Instant::now() + self.interval; }

    fn wait_tick(&mut self) {
        let now = Instant::now();
        if let Some(remaining) = self.next_tick.checked_duration_since(now) {
            thread::sleep(remaining);
            self.next_tick += self.interval;
        } else {
            self.next_tick = now + self.interval;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_are_spaced_by_interval() {
        let interval = Duration::from_millis(20);
        let mut ticker = Ticker::new(interval);
        let t0 = Instant::now();
        ticker.start();
        for _ in 0..3 {
            ticker.wait_tick();
        }
        assert!(t0.elapsed() >= interval * 3);
    }

    #[test]
    fn late_caller_does_not_burst() {
        let interval = Duration::from_millis(20);
        let mut ticker = Ticker::new(interval);
        ticker.start();
        thread::sleep(interval * 4);
        ticker.wait_tick();
        let t0 = Instant::now();
        ticker.wait_tick();
        assert!(t0.elapsed() >= interval / 2);
    }
}
