use std::time::{Duration, Instant};

/// Alert severity, higher tier first when both thresholds are exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTier {
    Warning,
    OverRange,
}

/// Two-tier threshold rate limiter over the rolling deviation.
///
/// Thresholds are multiples of the rolling standard deviation. One
/// `last_ring` timestamp gates both tiers; firing either tier resets
/// it. The timer starts a startup grace in the future, so nothing can
/// fire until `grace + cooldown` after construction.
pub struct AlertPolicy {
    sigma_warn: f64,
    sigma_over: f64,
    cooldown: Duration,
    last_ring: Instant,
}

impl AlertPolicy {
    pub fn new(sigma_warn: f64, sigma_over: f64, cooldown: Duration, startup_grace: Duration) -> Self {
        Self::armed_at(sigma_warn, sigma_over, cooldown, Instant::now() + startup_grace)
    }

    /// Like `new`, with an explicit suppression anchor for tests.
    pub fn armed_at(sigma_warn: f64, sigma_over: f64, cooldown: Duration, last_ring: Instant) -> Self {
        Self {
            sigma_warn,
            sigma_over,
            cooldown,
            last_ring,
        }
    }

    /// Decide a tier for the latest deviation. Fires at most once per
    /// cooldown; a constant signal (`std == 0`) never exceeds either
    /// threshold by plain arithmetic.
    pub fn evaluate(&mut self, latest_deviation: f64, std: f64, now: Instant) -> Option<AlertTier> {
        if now.saturating_duration_since(self.last_ring) < self.cooldown {
            return None;
        }

        let tier = if latest_deviation > self.sigma_over * std {
            Some(AlertTier::OverRange)
        } else if latest_deviation > self.sigma_warn * std {
            Some(AlertTier::Warning)
        } else {
            None
        };

        if tier.is_some() {
            self.last_ring = now;
        }
        tier
    }

    /// Warning threshold for a given std, used for the plot marker line.
    pub fn warn_level(&self, std: f64) -> f64 {
        self.sigma_warn * std
    }

    /// Over-range threshold for a given std, used as the plot upper bound.
    pub fn upper_bound(&self, std: f64) -> f64 {
        self.sigma_over * std
    }
}
