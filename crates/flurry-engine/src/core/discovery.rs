//! Polling for a host container that may mount late or be re-rendered.

use std::time::Duration;

/// First retry delay while the container is missing.
pub const INITIAL_DELAY: Duration = Duration::from_millis(500);
/// Longest retry delay, also the steady polling interval once found.
pub const MAX_DELAY: Duration = Duration::from_millis(3000);

/// Doubling delay, capped.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay to wait now; the following one doubles up to the cap.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    pub fn max(&self) -> Duration {
        self.max
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(INITIAL_DELAY, MAX_DELAY)
    }
}

/// Host capability to find the container and inject the panel into it.
pub trait ContainerLocator {
    type Container;

    /// Find the container, if mounted.
    fn locate(&mut self) -> Option<Self::Container>;

    /// Inject the panel unless one is already present.
    /// Returns true when a panel was injected by this call.
    fn inject_once(&mut self, container: &Self::Container) -> bool;
}

/// Result of one discovery poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryPoll {
    /// Container missing; retry after the delay.
    Missing(Duration),
    /// Container present. `injected` is true when the panel was (re)inserted now.
    Present { injected: bool, next: Duration },
}

impl DiscoveryPoll {
    /// Delay until the next poll.
    pub fn next_delay(&self) -> Duration {
        match *self {
            Self::Missing(d) => d,
            Self::Present { next, .. } => next,
        }
    }
}

/// Drives a [`ContainerLocator`] on a backoff schedule. Never gives up:
/// the host may re-render and drop the panel at any time.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    backoff: Backoff,
    injections: u32,
}

impl Discovery {
    pub fn new(backoff: Backoff) -> Self {
        Self {
            backoff,
            injections: 0,
        }
    }

    pub fn poll<L: ContainerLocator>(&mut self, locator: &mut L) -> DiscoveryPoll {
        match locator.locate() {
            Some(container) => {
                self.backoff.reset();
                let injected = locator.inject_once(&container);
                if injected {
                    self.injections += 1;
                    log::info!("ambient settings panel injected");
                }
                DiscoveryPoll::Present {
                    injected,
                    next: self.backoff.max(),
                }
            }
            None => DiscoveryPoll::Missing(self.backoff.next_delay()),
        }
    }

    /// How many times the panel has been injected, re-injections included.
    pub fn injections(&self) -> u32 {
        self.injections
    }
}
