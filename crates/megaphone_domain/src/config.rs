use anyhow::Result;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::schedule::PinsForAllSchedule;

const MAX_COUNT: i64 = 100_000;

/// Feature flags and thresholds that shape the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MegaphoneConfig {
    pub reactions_enabled: bool,
    pub pins_for_all_enabled: bool,
    /// Allows the PIN reminder to escalate to the full-screen flow.
    pub pins_for_all_mandatory: bool,
    pub pins_grace_hours: i64,
    pub pins_fullscreen_days: i64,
}

impl MegaphoneConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(value) = read_flag("MEGAPHONE_REACTIONS_ENABLED") {
            config.reactions_enabled = value;
        }
        if let Some(value) = read_flag("MEGAPHONE_PINS_FOR_ALL_ENABLED") {
            config.pins_for_all_enabled = value;
        }
        if let Some(value) = read_flag("MEGAPHONE_PINS_FOR_ALL_MANDATORY") {
            config.pins_for_all_mandatory = value;
        }
        if let Some(value) = read_count("MEGAPHONE_PINS_GRACE_HOURS") {
            config.pins_grace_hours = value;
        }
        if let Some(value) = read_count("MEGAPHONE_PINS_FULLSCREEN_DAYS") {
            config.pins_fullscreen_days = value;
        }
        config.validate()?;
        info!(?config, "loaded megaphone config");
        Ok(config)
    }

    pub fn pins_grace_period(&self) -> Duration {
        Duration::hours(self.pins_grace_hours)
    }

    pub fn pins_fullscreen_after(&self) -> Duration {
        Duration::days(self.pins_fullscreen_days)
    }

    pub fn pins_for_all_schedule(&self) -> PinsForAllSchedule {
        PinsForAllSchedule::new(self.pins_grace_period(), self.pins_fullscreen_after())
            .with_fullscreen(self.pins_for_all_mandatory)
    }

    /// Rejects thresholds outside `0..=100_000` and clamps the grace period.
    pub fn validate(&mut self) -> Result<()> {
        for (name, value) in [
            ("pins_grace_hours", self.pins_grace_hours),
            ("pins_fullscreen_days", self.pins_fullscreen_days),
        ] {
            if !(0..=MAX_COUNT).contains(&value) {
                anyhow::bail!("{name} must be between 0 and {MAX_COUNT}, got {value}");
            }
        }
        self.normalize();
        Ok(())
    }

    /// The grace period never outlasts the full-screen threshold.
    pub(crate) fn normalize(&mut self) {
        let ceiling = self.pins_fullscreen_days.saturating_mul(24);
        if self.pins_grace_hours > ceiling {
            warn!(
                grace_hours = self.pins_grace_hours,
                fullscreen_days = self.pins_fullscreen_days,
                "grace period exceeds full-screen threshold, clamping"
            );
            self.pins_grace_hours = ceiling;
        }
    }
}

impl Default for MegaphoneConfig {
    fn default() -> Self {
        Self {
            reactions_enabled: true,
            pins_for_all_enabled: true,
            pins_for_all_mandatory: true,
            pins_grace_hours: 2,
            pins_fullscreen_days: 8,
        }
    }
}

fn read_flag(name: &str) -> Option<bool> {
    let raw = std::env::var(name).ok()?;
    let parsed = parse_flag(&raw);
    if parsed.is_none() {
        warn!(%name, value = %raw, "ignoring unparseable flag");
    }
    parsed
}

fn read_count(name: &str) -> Option<i64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<i64>() {
        Ok(value) if (0..=MAX_COUNT).contains(&value) => Some(value),
        _ => {
            warn!(%name, value = %raw, "ignoring invalid duration");
            None
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_rollout_plan() {
        let config = MegaphoneConfig::default();
        assert!(config.reactions_enabled);
        assert!(config.pins_for_all_enabled);
        assert_eq!(config.pins_grace_period(), Duration::hours(2));
        assert_eq!(config.pins_fullscreen_after(), Duration::days(8));
    }

    #[test]
    fn parses_common_flag_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn validate_rejects_unbounded_thresholds() {
        let mut config = MegaphoneConfig {
            pins_fullscreen_days: i64::MAX / 2,
            ..MegaphoneConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pins_fullscreen_days"));

        let mut config = MegaphoneConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config, MegaphoneConfig::default());
    }

    #[test]
    fn grace_period_is_clamped_to_fullscreen_threshold() {
        let mut config = MegaphoneConfig {
            pins_grace_hours: 500,
            pins_fullscreen_days: 3,
            ..MegaphoneConfig::default()
        };
        config.normalize();
        assert_eq!(config.pins_grace_hours, 72);
    }
}
