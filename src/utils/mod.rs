//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación,
//! normalización de matrículas, JWT y enmascarado de credenciales.

pub mod errors;
pub mod jwt;
pub mod masking;
pub mod plate;
pub mod validation;

pub use errors::{AppError, AppResult};
pub use plate::normalize_plate;
