pub mod catalog;
pub mod config;
pub mod error;
pub mod event;
pub mod factory;
pub mod history;
pub mod listener;
pub mod megaphone;
pub mod schedule;
pub mod service;

pub use crate::error::MegaphoneError;
pub use crate::event::Event;
pub use crate::service::{Megaphones, MegaphonesBuilder};
