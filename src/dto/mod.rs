//! DTOs de la API HTTP

pub mod anpr_dto;

pub use anpr_dto::*;
