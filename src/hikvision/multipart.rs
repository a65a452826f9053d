//! Extracción del documento XML de un upload multipart de Hikvision
//!
//! Las cámaras envían el XML como parte de fichero (`*.xml` o content-type
//! con `xml`) junto a las imágenes; algunos firmwares lo mandan como campo
//! de texto cuyo nombre contiene `xml`.

use axum::extract::Multipart;
use tracing::{debug, error};

use crate::utils::errors::{bad_request_error, AppResult};

pub const INVALID_MULTIPART: &str = "invalid multipart payload";
pub const XML_NOT_FOUND: &str = "xml payload not found";

/// Parte de fichero que contiene el XML de la alerta
pub fn is_xml_part(file_name: &str, content_type: Option<&str>) -> bool {
    if file_name.to_lowercase().ends_with(".xml") {
        return true;
    }
    content_type
        .map(|ct| ct.to_lowercase().contains("xml"))
        .unwrap_or(false)
}

/// Campo de texto que puede llevar el XML
pub fn is_xml_field_name(name: &str) -> bool {
    name.to_lowercase().contains("xml")
}

/// Recorre las partes y devuelve el XML: primero la primera parte de
/// fichero XML, si no el primer campo de texto `*xml*`.
pub async fn extract_xml_payload(mut multipart: Multipart) -> AppResult<String> {
    let mut text_candidate: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "failed to parse multipart request");
                return Err(bad_request_error(INVALID_MULTIPART));
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        match file_name {
            Some(file_name) => {
                if !is_xml_part(&file_name, content_type.as_deref()) {
                    debug!(field = %name, file_name = %file_name, "skipping non-xml file part");
                    continue;
                }
                let bytes = field.bytes().await.map_err(|e| {
                    error!(error = %e, "failed to read xml file part");
                    bad_request_error(INVALID_MULTIPART)
                })?;
                return Ok(String::from_utf8_lossy(&bytes).into_owned());
            }
            None if text_candidate.is_none() && is_xml_field_name(&name) => {
                let text = field.text().await.map_err(|e| {
                    error!(error = %e, "failed to read xml text field");
                    bad_request_error(INVALID_MULTIPART)
                })?;
                text_candidate = Some(text);
            }
            None => {}
        }
    }

    text_candidate.ok_or_else(|| {
        error!("no xml part in multipart request");
        bad_request_error(XML_NOT_FOUND)
    })
}
