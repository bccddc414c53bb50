use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    config::MegaphoneConfig,
    error::MegaphoneError,
    event::Event,
    history::MegaphoneRecord,
    schedule::{MegaphoneSchedule, Schedule},
};

/// Display order of every megaphone. Earlier entries win ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<(Event, Schedule)>,
}

impl Catalog {
    /// Disabled features stay in the table with `Schedule::forever(false)`.
    pub fn from_config(config: &MegaphoneConfig) -> Self {
        let pins_for_all = if config.pins_for_all_enabled {
            Schedule::PinsForAll(config.pins_for_all_schedule())
        } else {
            Schedule::forever(false)
        };

        let catalog = Self {
            entries: vec![
                (Event::Reactions, Schedule::forever(config.reactions_enabled)),
                (Event::PinsForAll, pins_for_all),
            ],
        };
        debug!(
            entries = catalog.entries.len(),
            enabled = catalog.enabled_count(),
            "built megaphone catalog"
        );
        catalog
    }

    /// Builds a catalog with a custom order. Every event must appear exactly once.
    pub fn new(entries: Vec<(Event, Schedule)>) -> Result<Self, MegaphoneError> {
        for (idx, (event, _)) in entries.iter().enumerate() {
            if entries[..idx].iter().any(|(earlier, _)| earlier == event) {
                return Err(MegaphoneError::DuplicateEntry(*event));
            }
        }
        if let Some(missing) = Event::ALL
            .into_iter()
            .find(|event| !entries.iter().any(|(listed, _)| listed == event))
        {
            return Err(MegaphoneError::Uncataloged(missing));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(Event, Schedule)] {
        &self.entries
    }

    pub fn schedule_for(&self, event: Event) -> Option<&Schedule> {
        self.entries
            .iter()
            .find(|(listed, _)| *listed == event)
            .map(|(_, schedule)| schedule)
    }

    fn enabled_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, schedule)| !matches!(schedule, Schedule::Forever(forever) if !forever.0))
            .count()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::from_config(&MegaphoneConfig::default())
    }
}

/// Finished megaphones are out regardless of what their schedule says.
pub(crate) fn is_eligible(schedule: &Schedule, record: &MegaphoneRecord, now: DateTime<Utc>) -> bool {
    !record.finished
        && schedule.should_display(record.seen_count, record.last_seen, record.first_visible, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn default_catalog_lists_every_event_once_in_order() {
        let catalog = Catalog::default();
        let events: Vec<Event> = catalog.entries().iter().map(|(event, _)| *event).collect();
        assert_eq!(events, vec![Event::Reactions, Event::PinsForAll]);
        assert!(Catalog::new(catalog.entries().to_vec()).is_ok());
    }

    #[test]
    fn disabled_features_map_to_forever_false() {
        let config = MegaphoneConfig {
            reactions_enabled: false,
            pins_for_all_enabled: false,
            ..MegaphoneConfig::default()
        };
        let catalog = Catalog::from_config(&config);
        assert_eq!(catalog.schedule_for(Event::Reactions), Some(&Schedule::forever(false)));
        assert_eq!(catalog.schedule_for(Event::PinsForAll), Some(&Schedule::forever(false)));
        assert_eq!(catalog.enabled_count(), 0);
    }

    #[test]
    fn pins_entry_carries_configured_thresholds() {
        let config = MegaphoneConfig {
            pins_for_all_mandatory: false,
            pins_fullscreen_days: 14,
            ..MegaphoneConfig::default()
        };
        let catalog = Catalog::from_config(&config);
        let Some(Schedule::PinsForAll(schedule)) = catalog.schedule_for(Event::PinsForAll) else {
            panic!("pins entry should use the windowed schedule");
        };
        assert!(!schedule.fullscreen_enabled);
        assert_eq!(schedule.fullscreen_after, chrono::Duration::days(14));
    }

    #[test]
    fn custom_catalog_must_cover_every_event_once() {
        let duplicate = Catalog::new(vec![
            (Event::Reactions, Schedule::forever(true)),
            (Event::Reactions, Schedule::forever(false)),
            (Event::PinsForAll, Schedule::forever(true)),
        ]);
        assert!(matches!(duplicate, Err(MegaphoneError::DuplicateEntry(Event::Reactions))));

        let missing = Catalog::new(vec![(Event::Reactions, Schedule::forever(true))]);
        assert!(matches!(missing, Err(MegaphoneError::Uncataloged(Event::PinsForAll))));
    }

    #[test]
    fn finished_records_are_never_eligible() {
        let now = Utc.with_ymd_and_hms(2020, 2, 1, 0, 0, 0).unwrap();
        let mut record = MegaphoneRecord::new(Event::Reactions, now);
        assert!(is_eligible(&Schedule::forever(true), &record, now));
        record.mark_finished();
        assert!(!is_eligible(&Schedule::forever(true), &record, now));
    }
}
