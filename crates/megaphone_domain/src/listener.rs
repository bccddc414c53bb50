use std::fmt;

use serde::{Deserialize, Serialize};

/// Request code shared by every PIN creation and migration screen.
pub const REQUEST_NEW_PIN: i32 = 27698;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NavigationTarget {
    /// Forced migration flow shown once the PIN reminder goes full screen.
    PinMigration,
    CreatePin,
    ChangePin,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ToastMessage {
    RemindLaterConfirmingPin { days_remaining: i64 },
    RemindLaterCreatingPin { days_remaining: i64 },
}

impl fmt::Display for ToastMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToastMessage::RemindLaterConfirmingPin { days_remaining } => write!(
                f,
                "We'll remind you later. Confirming your PIN will become mandatory in {days_remaining} days."
            ),
            ToastMessage::RemindLaterCreatingPin { days_remaining } => write!(
                f,
                "We'll remind you later. Creating a PIN will become mandatory in {days_remaining} days."
            ),
        }
    }
}

/// Implemented by the surface that renders megaphones.
pub trait MegaphoneListener {
    fn on_navigation_requested(&self, target: NavigationTarget, request_code: i32);
    fn on_toast_requested(&self, message: ToastMessage);
}

/// Environment checks consulted while building or showing a megaphone.
///
/// Both are queried each time they are needed and never cached.
pub trait Preconditions: Send + Sync {
    fn is_network_available(&self) -> bool;
    fn user_has_pin(&self) -> bool;
}
