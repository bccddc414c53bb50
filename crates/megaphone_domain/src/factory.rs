use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    event::Event,
    history::MegaphoneRecord,
    listener::{NavigationTarget, Preconditions, ToastMessage, REQUEST_NEW_PIN},
    megaphone::{Megaphone, MegaphoneBuilder, MegaphoneImage, MegaphoneText, Style},
    schedule::{PinsForAllSchedule, Schedule},
};

/// Turns an eligible record into the megaphone the user will see.
///
/// This is the only place with per-event behaviour. The match in
/// [`MegaphoneFactory::for_record`] is exhaustive, so a new [`Event`] does not
/// compile until it gets a branch here.
#[derive(Clone)]
pub struct MegaphoneFactory {
    preconditions: Arc<dyn Preconditions>,
    /// Used when the catalog entry for PinsForAll is not the windowed schedule.
    pins_for_all: PinsForAllSchedule,
}

impl MegaphoneFactory {
    pub fn new(preconditions: Arc<dyn Preconditions>, pins_for_all: PinsForAllSchedule) -> Self {
        Self {
            preconditions,
            pins_for_all,
        }
    }

    /// `schedule` is the catalog entry that made `record` eligible.
    pub fn for_record(
        &self,
        record: &MegaphoneRecord,
        schedule: &Schedule,
        now: DateTime<Utc>,
    ) -> Megaphone {
        match record.event {
            Event::Reactions => build_reactions_megaphone(),
            Event::PinsForAll => {
                let pins = match schedule {
                    Schedule::PinsForAll(pins) => pins,
                    Schedule::Forever(_) | Schedule::Recurring(_) => &self.pins_for_all,
                };
                self.build_pins_for_all_megaphone(pins, record, now)
            }
        }
    }

    fn build_pins_for_all_megaphone(
        &self,
        pins: &PinsForAllSchedule,
        record: &MegaphoneRecord,
        now: DateTime<Utc>,
    ) -> Megaphone {
        if pins.should_display_fullscreen(record.first_visible, now) {
            debug!("pins megaphone escalated to full screen");
            let preconditions = Arc::clone(&self.preconditions);
            return Megaphone::builder(Event::PinsForAll, Style::Fullscreen)
                .mandatory(true)
                .on_visible(move |_, listener| {
                    if preconditions.is_network_available() {
                        listener.on_navigation_requested(
                            NavigationTarget::PinMigration,
                            REQUEST_NEW_PIN,
                        );
                    }
                })
                .build();
        }

        let days_remaining = pins.days_remaining(record.first_visible, now);
        let builder = Megaphone::builder(Event::PinsForAll, Style::Basic)
            .mandatory(true)
            .image(MegaphoneImage::PinMegaphone);

        if self.preconditions.user_has_pin() {
            build_pins_for_user_with_pin(
                builder.snooze_toast(ToastMessage::RemindLaterConfirmingPin { days_remaining }),
            )
        } else {
            build_pins_for_user_without_pin(
                builder.snooze_toast(ToastMessage::RemindLaterCreatingPin { days_remaining }),
            )
        }
    }
}

fn build_reactions_megaphone() -> Megaphone {
    Megaphone::builder(Event::Reactions, Style::Reactions)
        .mandatory(false)
        .build()
}

fn build_pins_for_user_with_pin(builder: MegaphoneBuilder) -> Megaphone {
    builder
        .title(MegaphoneText::IntroducingPins)
        .body(MegaphoneText::RegistrationLockIsNowPin)
        .navigation_button(
            MegaphoneText::UpdatePin,
            NavigationTarget::ChangePin,
            REQUEST_NEW_PIN,
        )
        .build()
}

fn build_pins_for_user_without_pin(builder: MegaphoneBuilder) -> Megaphone {
    builder
        .title(MegaphoneText::CreateAPin)
        .body(MegaphoneText::PinsAddSecurity)
        .navigation_button(
            MegaphoneText::CreatePin,
            NavigationTarget::CreatePin,
            REQUEST_NEW_PIN,
        )
        .build()
}
