use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    event::Event,
    listener::{MegaphoneListener, NavigationTarget, ToastMessage},
};

/// Callback the rendering layer runs on visibility, button press or snooze.
pub type MegaphoneAction = Arc<dyn Fn(&Megaphone, &dyn MegaphoneListener) + Send + Sync>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Basic,
    Reactions,
    Fullscreen,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MegaphoneImage {
    PinMegaphone,
}

/// Copy keys. The rendering layer resolves them to localized strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MegaphoneText {
    IntroducingPins,
    RegistrationLockIsNowPin,
    UpdatePin,
    CreateAPin,
    PinsAddSecurity,
    CreatePin,
}

impl fmt::Display for MegaphoneText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MegaphoneText::IntroducingPins => "Introducing PINs",
            MegaphoneText::RegistrationLockIsNowPin => {
                "Your registration lock is now called a PIN, and it does more. Update it now."
            }
            MegaphoneText::UpdatePin => "Update PIN",
            MegaphoneText::CreateAPin => "Create a PIN",
            MegaphoneText::PinsAddSecurity => {
                "PINs add another layer of security to your Signal account."
            }
            MegaphoneText::CreatePin => "Create PIN",
        };
        f.write_str(text)
    }
}

/// A fully resolved announcement, ready to hand to the rendering layer.
#[derive(Clone)]
pub struct Megaphone {
    event: Event,
    style: Style,
    mandatory: bool,
    can_snooze: bool,
    snooze_action: Option<MegaphoneAction>,
    image: Option<MegaphoneImage>,
    title: Option<MegaphoneText>,
    body: Option<MegaphoneText>,
    button_text: Option<MegaphoneText>,
    button_action: Option<MegaphoneAction>,
    on_visible: Option<MegaphoneAction>,
}

impl Megaphone {
    pub fn builder(event: Event, style: Style) -> MegaphoneBuilder {
        MegaphoneBuilder::new(event, style)
    }

    pub fn event(&self) -> Event {
        self.event
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn can_snooze(&self) -> bool {
        self.can_snooze
    }

    pub fn image(&self) -> Option<MegaphoneImage> {
        self.image
    }

    pub fn title(&self) -> Option<MegaphoneText> {
        self.title
    }

    pub fn body(&self) -> Option<MegaphoneText> {
        self.body
    }

    pub fn button_text(&self) -> Option<MegaphoneText> {
        self.button_text
    }

    pub fn has_button(&self) -> bool {
        self.button_action.is_some()
    }

    pub fn has_visibility_action(&self) -> bool {
        self.on_visible.is_some()
    }

    pub fn on_visible(&self, listener: &dyn MegaphoneListener) {
        if let Some(action) = &self.on_visible {
            action(self, listener);
        }
    }

    pub fn on_button_click(&self, listener: &dyn MegaphoneListener) {
        if let Some(action) = &self.button_action {
            action(self, listener);
        }
    }

    /// Runs the snooze action. Does nothing for megaphones that cannot be snoozed.
    pub fn on_snooze(&self, listener: &dyn MegaphoneListener) {
        if !self.can_snooze {
            return;
        }
        if let Some(action) = &self.snooze_action {
            action(self, listener);
        }
    }
}

impl fmt::Debug for Megaphone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Megaphone")
            .field("event", &self.event)
            .field("style", &self.style)
            .field("mandatory", &self.mandatory)
            .field("can_snooze", &self.can_snooze)
            .field("image", &self.image)
            .field("title", &self.title)
            .field("body", &self.body)
            .field("button_text", &self.button_text)
            .field("has_button_action", &self.button_action.is_some())
            .field("has_on_visible", &self.on_visible.is_some())
            .finish()
    }
}

pub struct MegaphoneBuilder {
    event: Event,
    style: Style,
    mandatory: bool,
    can_snooze: bool,
    snooze_action: Option<MegaphoneAction>,
    image: Option<MegaphoneImage>,
    title: Option<MegaphoneText>,
    body: Option<MegaphoneText>,
    button_text: Option<MegaphoneText>,
    button_action: Option<MegaphoneAction>,
    on_visible: Option<MegaphoneAction>,
}

impl MegaphoneBuilder {
    pub fn new(event: Event, style: Style) -> Self {
        Self {
            event,
            style,
            mandatory: false,
            can_snooze: false,
            snooze_action: None,
            image: None,
            title: None,
            body: None,
            button_text: None,
            button_action: None,
            on_visible: None,
        }
    }

    pub fn mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }

    pub fn enable_snooze(
        mut self,
        action: impl Fn(&Megaphone, &dyn MegaphoneListener) + Send + Sync + 'static,
    ) -> Self {
        self.can_snooze = true;
        self.snooze_action = Some(Arc::new(action));
        self
    }

    pub fn image(mut self, image: MegaphoneImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn title(mut self, title: MegaphoneText) -> Self {
        self.title = Some(title);
        self
    }

    pub fn body(mut self, body: MegaphoneText) -> Self {
        self.body = Some(body);
        self
    }

    pub fn button(
        mut self,
        text: MegaphoneText,
        action: impl Fn(&Megaphone, &dyn MegaphoneListener) + Send + Sync + 'static,
    ) -> Self {
        self.button_text = Some(text);
        self.button_action = Some(Arc::new(action));
        self
    }

    /// Shorthand for a button that only navigates.
    pub fn navigation_button(
        self,
        text: MegaphoneText,
        target: NavigationTarget,
        request_code: i32,
    ) -> Self {
        self.button(text, move |_, listener| {
            listener.on_navigation_requested(target, request_code)
        })
    }

    pub fn snooze_toast(self, message: ToastMessage) -> Self {
        self.enable_snooze(move |_, listener| listener.on_toast_requested(message))
    }

    pub fn on_visible(
        mut self,
        action: impl Fn(&Megaphone, &dyn MegaphoneListener) + Send + Sync + 'static,
    ) -> Self {
        self.on_visible = Some(Arc::new(action));
        self
    }

    pub fn build(self) -> Megaphone {
        Megaphone {
            event: self.event,
            style: self.style,
            mandatory: self.mandatory,
            can_snooze: self.can_snooze,
            snooze_action: self.snooze_action,
            image: self.image,
            title: self.title,
            body: self.body,
            button_text: self.button_text,
            button_action: self.button_action,
            on_visible: self.on_visible,
        }
    }
}
