use std::time::Duration;

/// Source of the fixed pauses between device interactions.
pub trait Delay {
    fn sleep(&mut self, duration: Duration);
}

/// Blocks the current thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleep;

impl Delay for ThreadSleep {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
