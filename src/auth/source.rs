//! Entropy and time sources used while issuing tokens

use rand::Rng;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Produces the per-token salt
pub trait SaltSource: Send + Sync {
    fn next_salt(&self) -> u32;
}

/// Current time in unix seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Salt drawn from the thread-local OS-seeded generator
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSalt;

impl SaltSource for OsSalt {
    fn next_salt(&self) -> u32 {
        rand::rng().random()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Deterministic salt: returns `start`, then `start + 1`, ...
#[derive(Debug, Default)]
pub struct FixedSalt {
    next: AtomicU32,
}

impl FixedSalt {
    pub fn new(start: u32) -> Self {
        Self {
            next: AtomicU32::new(start),
        }
    }
}

impl SaltSource for FixedSalt {
    fn next_salt(&self) -> u32 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// Manually driven clock
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicU64,
}

impl FixedClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::Relaxed);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::Relaxed);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}
