//! Parser del XML `EventNotificationAlert` que envían las cámaras Hikvision
//!
//! Todos los campos se leen como texto; la conversión numérica y de fechas
//! es tolerante: un valor que no se puede interpretar queda ausente.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use yaserde::de::from_str;
use yaserde_derive::YaDeserialize;

use crate::models::{EventPayload, VehicleInfo};
use crate::utils::validation::{non_empty, parse_camera_datetime};

lazy_static! {
    // Solo el namespace por defecto; los prefijados los entiende yaserde
    static ref DEFAULT_XMLNS: Regex = Regex::new(r#"\sxmlns="[^"]*""#).expect("valid xmlns regex");
    // Primera etiqueta de apertura; `<?xml` y `<!--` no empiezan por letra
    static ref ROOT_ELEMENT: Regex =
        Regex::new(r"<(?:[A-Za-z_][\w.\-]*:)?([A-Za-z_][\w.\-]*)").expect("valid root element regex");
}

const ROOT_NAME: &str = "EventNotificationAlert";

#[derive(Debug, Default, YaDeserialize)]
#[yaserde(rename = "EventNotificationAlert")]
pub struct EventNotificationAlert {
    #[yaserde(rename = "eventType")]
    pub event_type: String,
    #[yaserde(rename = "dateTime")]
    pub date_time: String,
    #[yaserde(rename = "channelID")]
    pub channel_id: String,
    #[yaserde(rename = "deviceID")]
    pub device_id: String,
    #[yaserde(rename = "ANPR")]
    pub anpr: AnprSection,
    #[yaserde(rename = "picInfo")]
    pub pic_info: PicInfo,
}

#[derive(Debug, Default, YaDeserialize)]
#[yaserde(rename = "ANPR")]
pub struct AnprSection {
    #[yaserde(rename = "licensePlate")]
    pub license_plate: String,
    #[yaserde(rename = "confidenceLevel")]
    pub confidence_level: String,
    #[yaserde(rename = "vehicleType")]
    pub vehicle_type: String,
    pub color: String,
    pub direction: String,
    #[yaserde(rename = "laneNo")]
    pub lane_no: String,
}

#[derive(Debug, Default, YaDeserialize)]
#[yaserde(rename = "picInfo")]
pub struct PicInfo {
    #[yaserde(rename = "ftpPath")]
    pub ftp_path: String,
}

/// Parsea el documento XML de una alerta.
///
/// Devuelve el mensaje del deserializador si el XML no es válido, o un
/// error si el elemento raíz no es `EventNotificationAlert`.
pub fn parse_alert(xml: &str) -> Result<EventNotificationAlert, String> {
    let cleaned = DEFAULT_XMLNS.replace_all(xml.trim_start_matches('\u{feff}'), "");
    match root_element_name(&cleaned) {
        Some(ROOT_NAME) => from_str::<EventNotificationAlert>(&cleaned),
        Some(other) => Err(format!("unexpected root element <{}>, want <{}>", other, ROOT_NAME)),
        None => Err("missing root element".to_string()),
    }
}

fn root_element_name(xml: &str) -> Option<&str> {
    ROOT_ELEMENT
        .captures(xml)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

impl EventNotificationAlert {
    /// Mapea la alerta al payload común.
    ///
    /// `camera_model` queda vacío y `event_time` ausente si la fecha no se
    /// entiende; el handler aplica los valores por defecto de configuración.
    pub fn to_event_payload(&self, xml: &str) -> EventPayload {
        let mut raw_payload = Map::new();
        raw_payload.insert("event_type".to_string(), Value::String(self.event_type.clone()));
        raw_payload.insert("xml".to_string(), Value::String(xml.to_string()));

        EventPayload {
            camera_id: first_non_empty(&[&self.channel_id, &self.device_id]),
            camera_model: None,
            plate: self.anpr.license_plate.trim().to_string(),
            confidence: self.anpr.confidence_level.trim().parse::<f64>().ok(),
            direction: non_empty(Some(self.anpr.direction.clone())),
            lane: self.anpr.lane_no.trim().parse::<i32>().ok(),
            event_time: parse_camera_datetime(&self.date_time),
            vehicle: VehicleInfo {
                color: non_empty(Some(self.anpr.color.clone())),
                vehicle_type: non_empty(Some(self.anpr.vehicle_type.clone())),
            },
            snapshot_url: non_empty(Some(self.pic_info.ftp_path.clone())),
            raw_payload: Some(raw_payload),
        }
    }
}

fn first_non_empty(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<EventNotificationAlert version="2.0" xmlns="http://www.hikvision.com/ver20/XMLSchema">
    <ipAddress>192.168.1.64</ipAddress>
    <channelID>1</channelID>
    <dateTime>2024-03-10T08:15:30+01:00</dateTime>
    <activePostCount>1</activePostCount>
    <eventType>ANPR</eventType>
    <eventState>active</eventState>
    <deviceID>DS-2CD4A26</deviceID>
    <ANPR>
        <country>3</country>
        <licensePlate> AB 123 CD </licensePlate>
        <confidenceLevel>92</confidenceLevel>
        <direction>forward</direction>
        <laneNo>2</laneNo>
        <vehicleType>vehicle</vehicleType>
        <color>white</color>
    </ANPR>
    <picInfo>
        <ftpPath>ftp://nas/anpr/0001.jpg</ftpPath>
    </picInfo>
</EventNotificationAlert>"#;

    #[test]
    fn test_parses_namespaced_alert() {
        let alert = parse_alert(SAMPLE).unwrap();
        assert_eq!(alert.event_type, "ANPR");
        assert_eq!(alert.channel_id, "1");
        assert_eq!(alert.device_id, "DS-2CD4A26");
        assert_eq!(alert.anpr.license_plate.trim(), "AB 123 CD");
        assert_eq!(alert.pic_info.ftp_path, "ftp://nas/anpr/0001.jpg");
    }

    #[test]
    fn test_maps_alert_to_payload() {
        let alert = parse_alert(SAMPLE).unwrap();
        let payload = alert.to_event_payload(SAMPLE);

        assert_eq!(payload.camera_id, "1");
        assert_eq!(payload.plate, "AB 123 CD");
        assert_eq!(payload.confidence, Some(92.0));
        assert_eq!(payload.lane, Some(2));
        assert_eq!(payload.direction.as_deref(), Some("forward"));
        assert_eq!(payload.vehicle.color.as_deref(), Some("white"));
        assert_eq!(payload.vehicle.vehicle_type.as_deref(), Some("vehicle"));
        assert_eq!(payload.snapshot_url.as_deref(), Some("ftp://nas/anpr/0001.jpg"));
        assert_eq!(
            payload.event_time,
            Some(Utc.with_ymd_and_hms(2024, 3, 10, 7, 15, 30).unwrap())
        );

        let raw = payload.raw_payload.unwrap();
        assert_eq!(raw["event_type"], "ANPR");
        assert!(raw["xml"].as_str().unwrap().contains("EventNotificationAlert"));
    }

    #[test]
    fn test_device_id_used_when_channel_missing() {
        let xml = r#"<EventNotificationAlert>
            <deviceID> gate-north </deviceID>
            <dateTime>2024-03-10 08:15:30</dateTime>
            <ANPR><licensePlate>X1</licensePlate><laneNo>n/a</laneNo><confidenceLevel>high</confidenceLevel></ANPR>
        </EventNotificationAlert>"#;

        let payload = parse_alert(xml).unwrap().to_event_payload(xml);

        assert_eq!(payload.camera_id, "gate-north");
        assert_eq!(payload.lane, None);
        assert_eq!(payload.confidence, None);
        assert_eq!(payload.snapshot_url, None);
        assert_eq!(
            payload.event_time,
            Some(Utc.with_ymd_and_hms(2024, 3, 10, 8, 15, 30).unwrap())
        );
    }

    #[test]
    fn test_unknown_date_format_leaves_time_empty() {
        let xml = "<EventNotificationAlert><dateTime>10/03/2024</dateTime></EventNotificationAlert>";
        let payload = parse_alert(xml).unwrap().to_event_payload(xml);
        assert!(payload.event_time.is_none());
        assert!(payload.camera_id.is_empty());
    }

    #[test]
    fn test_wrong_root_is_rejected() {
        let err = parse_alert("<Foo><ANPR><licensePlate>X1</licensePlate></ANPR></Foo>").unwrap_err();
        assert!(err.contains("Foo"), "{}", err);

        let prefixed = r#"<?xml version="1.0"?><!-- alert --><hik:EventNotificationAlert xmlns:hik="urn:x"><ANPR><licensePlate>X1</licensePlate></ANPR></hik:EventNotificationAlert>"#;
        assert_eq!(root_element_name(prefixed), Some(ROOT_NAME));
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        assert!(parse_alert("<EventNotificationAlert><ANPR>").is_err());
        assert!(parse_alert("not xml at all").is_err());
    }
}
