//! Comprobación de la cámara configurada
//!
//! Solo se prueba la interfaz HTTP; del RTSP se informa si está configurado.

use std::time::Duration;

use reqwest::Client;
use tracing::info;

use crate::config::CameraConfig;
use crate::dto::CameraStatus;
use crate::utils::masking::mask_password;

pub const STATUS_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Consulta la interfaz HTTP de la cámara y arma el estado
pub async fn check_camera_status(client: &Client, camera: &CameraConfig) -> CameraStatus {
    let mut status = CameraStatus {
        camera_model: camera.model.clone(),
        http_host: camera.http_host.clone(),
        rtsp_url: mask_password(&camera.rtsp_url),
        configured: camera.is_configured(),
        http_accessible: false,
        http_status: None,
        http_error: None,
        rtsp_configured: !camera.rtsp_url.is_empty(),
    };

    if camera.http_host.is_empty() {
        status.http_error = Some("HTTP host not configured".to_string());
    } else {
        match client.get(&camera.http_host).timeout(STATUS_CHECK_TIMEOUT).send().await {
            Ok(response) => {
                let code = response.status().as_u16();
                status.http_accessible = code < 500;
                status.http_status = Some(code);
            }
            Err(e) => {
                status.http_error = Some(e.to_string());
            }
        }
    }

    info!(
        http_host = %camera.http_host,
        http_accessible = status.http_accessible,
        "📷 camera status checked"
    );

    status
}
