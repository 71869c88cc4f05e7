//! Route handlers organized by resource

pub mod health;
pub mod items;
pub mod stores;
pub mod tags;
pub mod users;

use serde::Serialize;

/// Plain confirmation body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}
