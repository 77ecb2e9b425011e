use std::num::NonZeroUsize;
use std::time::Duration;

/// Configuration for [`FontCache`](super::FontCache).
#[derive(Clone, Debug, PartialEq)]
pub struct FontCacheConfig {
    /// Number of independent LRU shards. Text is assigned to a shard by hash.
    pub shard_count: NonZeroUsize,
    /// Upper bound on runs per shard. Inserting into a full shard evicts its
    /// least recently used run first.
    pub max_shard_size: NonZeroUsize,
    /// Minimum time between two periodic cleanups.
    pub clean_interval: Duration,
    /// How much each shard is trimmed on a periodic cleanup.
    pub clean_policy: CleanPolicy,
    /// Lets the foreground alpha take part in key ordering.
    pub soft_mode: bool,
}

impl Default for FontCacheConfig {
    fn default() -> Self {
        Self {
            shard_count: NonZeroUsize::new(256).unwrap_or(NonZeroUsize::MIN),
            max_shard_size: NonZeroUsize::new(256).unwrap_or(NonZeroUsize::MIN),
            clean_interval: Duration::from_secs(7),
            clean_policy: CleanPolicy::TrimToBudget { budget: 50 },
            soft_mode: false,
        }
    }
}

/// One step of [`CleanPolicy::Tiered`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CleanTier {
    /// Applies to shards holding more than this many runs.
    pub threshold: usize,
    /// Number of runs removed from such a shard.
    pub count: usize,
}

/// Decides how many runs a periodic cleanup removes from a shard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CleanPolicy {
    /// Shrinks every shard larger than `budget` back down to `budget`.
    TrimToBudget { budget: usize },
    /// Removes a fixed number of runs depending on the shard size.
    ///
    /// Tiers are checked in order and the first one whose threshold is
    /// exceeded wins, so they should be sorted by descending threshold.
    Tiered(Vec<CleanTier>),
}

impl CleanPolicy {
    /// Stepped trimming: more than 170 runs lose 100, more than 50 lose 20,
    /// more than 2 lose 1.
    pub fn tiered_default() -> Self {
        Self::Tiered(vec![
            CleanTier {
                threshold: 170,
                count: 100,
            },
            CleanTier {
                threshold: 50,
                count: 20,
            },
            CleanTier {
                threshold: 2,
                count: 1,
            },
        ])
    }

    /// Number of runs to remove from a shard currently holding `len` runs.
    pub fn excess(&self, len: usize) -> usize {
        match self {
            Self::TrimToBudget { budget } => len.saturating_sub(*budget),
            Self::Tiered(tiers) => tiers
                .iter()
                .find(|tier| len > tier.threshold)
                .map_or(0, |tier| tier.count.min(len)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FontCacheConfig::default();
        assert_eq!(config.shard_count.get(), 256);
        assert_eq!(config.max_shard_size.get(), 256);
        assert_eq!(config.clean_interval, Duration::from_secs(7));
        assert!(!config.soft_mode);
    }

    #[test]
    fn test_trim_to_budget() {
        let policy = CleanPolicy::TrimToBudget { budget: 10 };
        assert_eq!(policy.excess(0), 0);
        assert_eq!(policy.excess(10), 0);
        assert_eq!(policy.excess(11), 1);
        assert_eq!(policy.excess(250), 240);
    }

    #[test]
    fn test_tiered() {
        let policy = CleanPolicy::tiered_default();
        assert_eq!(policy.excess(2), 0);
        assert_eq!(policy.excess(3), 1);
        assert_eq!(policy.excess(50), 1);
        assert_eq!(policy.excess(51), 20);
        assert_eq!(policy.excess(171), 100);
    }

    #[test]
    fn test_tiered_never_exceeds_len() {
        let policy = CleanPolicy::Tiered(vec![CleanTier {
            threshold: 0,
            count: 100,
        }]);
        assert_eq!(policy.excess(3), 3);
    }
}
