//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema
//! PostgreSQL (plates, anpr_events, lists, list_items) y las formas
//! de payload/response que usa la API.

pub mod anpr_event;
pub mod list;
pub mod plate;

pub use anpr_event::{AnprEvent, EventFilter, EventInfo, EventPayload, NewAnprEvent, ProcessResult, VehicleInfo};
pub use list::{List, ListHit, ListItem, ListType, DEFAULT_BLACKLIST, DEFAULT_WHITELIST};
pub use plate::{Plate, PlateInfo};
