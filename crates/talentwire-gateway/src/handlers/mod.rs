//! HTTP handlers: provider webhooks and the notification API.

pub mod health;
pub mod messenger;
pub mod notify;
pub mod telegram;
pub mod whatsapp;
