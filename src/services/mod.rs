//! Services module
//!
//! Este módulo contiene la lógica de negocio: el pipeline de ingesta ANPR
//! y la comprobación de la cámara configurada.

pub mod anpr_service;
pub mod camera_status_service;

pub use anpr_service::{AnprService, EventQuery};
pub use camera_status_service::check_camera_status;
