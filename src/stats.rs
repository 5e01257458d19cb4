use std::fmt;

use dashmap::DashMap;

use crate::models::PlatformId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformStats {
    pub requests: usize,
    pub failures: usize,
    pub extracted: usize,
    pub accepted: usize,
}

/// Per platform counters, updated concurrently by in-flight requests.
#[derive(Debug, Default)]
pub struct RunStats {
    platforms: DashMap<PlatformId, PlatformStats>,
}

impl RunStats {
    fn update(&self, platform: PlatformId, f: impl FnOnce(&mut PlatformStats)) {
        f(&mut self.platforms.entry(platform).or_default());
    }

    pub fn record_request(&self, platform: PlatformId) {
        self.update(platform, |stats| stats.requests += 1);
    }

    pub fn record_failure(&self, platform: PlatformId) {
        self.update(platform, |stats| stats.failures += 1);
    }

    pub fn record_yield(&self, platform: PlatformId, extracted: usize, accepted: usize) {
        self.update(platform, |stats| {
            stats.extracted += extracted;
            stats.accepted += accepted;
        });
    }

    pub fn get(&self, platform: PlatformId) -> PlatformStats {
        self.platforms
            .get(&platform)
            .map(|stats| *stats)
            .unwrap_or_default()
    }

    /// Snapshot ordered by platform.
    pub fn snapshot(&self) -> Vec<(PlatformId, PlatformStats)> {
        PlatformId::ALL
            .iter()
            .filter(|id| self.platforms.contains_key(id))
            .map(|id| (*id, self.get(*id)))
            .collect()
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (platform, stats) in self.snapshot() {
            writeln!(
                f,
                "{}: {} requests, {} failed, {} extracted, {} accepted",
                platform, stats.requests, stats.failures, stats.extracted, stats.accepted
            )?;
        }
        Ok(())
    }
}
