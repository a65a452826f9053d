//! Adaptador Hikvision
//!
//! Convierte el webhook multipart de las cámaras Hikvision en un
//! `EventPayload` común.

pub mod alert;
pub mod multipart;

pub use alert::{parse_alert, EventNotificationAlert};
pub use multipart::extract_xml_payload;
