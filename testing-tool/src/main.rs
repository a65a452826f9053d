use colored::*;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use std::io::{self, Write};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "📷 ANPR Camera Simulator".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());
    println!();

    let base_url = prompt("URL del backend (Enter = http://localhost:8080): ")?;
    let base_url = if base_url.is_empty() {
        "http://localhost:8080".to_string()
    } else {
        base_url.trim_end_matches('/').to_string()
    };
    let client = reqwest::Client::new();

    loop {
        println!();
        println!("{}", "📋 MENÚ PRINCIPAL".bright_green().bold());
        println!("{}", "==================".bright_green());
        println!("1. 🚗 Enviar evento JSON");
        println!("2. 📡 Enviar alerta Hikvision (multipart XML)");
        println!("3. 🔍 Buscar matrícula");
        println!("4. 📜 Listar eventos");
        println!("5. 📷 Estado de la cámara");
        println!("6. 📝 Añadir matrícula a whitelist");
        println!("7. 🚪 Salir");
        let choice = prompt("Selecciona una opción (1-7): ")?;

        let result = match choice.as_str() {
            "1" => send_json_event(&client, &base_url).await,
            "2" => send_hikvision_alert(&client, &base_url).await,
            "3" => search_plate(&client, &base_url).await,
            "4" => list_events(&client, &base_url).await,
            "5" => get_and_print(&client, &format!("{}/api/v1/camera/status", base_url)).await,
            "6" => sync_vehicle(&client, &base_url).await,
            "7" => {
                println!("{}", "👋 ¡Hasta luego!".bright_green());
                break;
            }
            _ => {
                println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red());
                continue;
            }
        };

        if let Err(e) = result {
            println!("{} {}", "❌ Error:".bright_red().bold(), e);
        }
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String, Box<dyn std::error::Error>> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

async fn send_json_event(client: &reqwest::Client, base_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let plate = prompt("Matrícula: ")?;
    let camera_id = prompt("camera_id (Enter = sim-cam-1): ")?;
    let camera_id = if camera_id.is_empty() { "sim-cam-1".to_string() } else { camera_id };

    let payload = json!({
        "camera_id": camera_id,
        "plate": plate,
        "confidence": 95.5,
        "direction": "forward",
        "lane": 1,
        "event_time": chrono::Utc::now().to_rfc3339(),
        "vehicle": { "color": "white", "type": "car" }
    });

    println!("{}", "📦 Payload:".bright_blue());
    println!("{}", serde_json::to_string_pretty(&payload)?);

    let response = client
        .post(format!("{}/api/v1/anpr/events", base_url))
        .json(&payload)
        .send()
        .await?;
    print_response(response).await
}

async fn send_hikvision_alert(client: &reqwest::Client, base_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let plate = prompt("Matrícula: ")?;
    let xml = hikvision_alert_xml(&plate, &chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string());

    let form = Form::new()
        .part(
            "anpr.xml",
            Part::text(xml).file_name("anpr.xml").mime_str("application/xml")?,
        )
        .part(
            "licensePlatePicture.jpg",
            Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xD9])
                .file_name("licensePlatePicture.jpg")
                .mime_str("image/jpeg")?,
        );

    let response = client
        .post(format!("{}/api/v1/anpr/hikvision", base_url))
        .multipart(form)
        .send()
        .await?;
    print_response(response).await
}

fn hikvision_alert_xml(plate: &str, date_time: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<EventNotificationAlert version="2.0" xmlns="http://www.hikvision.com/ver20/XMLSchema">
    <ipAddress>192.168.1.64</ipAddress>
    <channelID>1</channelID>
    <dateTime>{}</dateTime>
    <eventType>ANPR</eventType>
    <eventState>active</eventState>
    <deviceID>sim-hikvision</deviceID>
    <ANPR>
        <licensePlate>{}</licensePlate>
        <confidenceLevel>90</confidenceLevel>
        <direction>forward</direction>
        <laneNo>1</laneNo>
        <vehicleType>vehicle</vehicleType>
        <color>white</color>
    </ANPR>
</EventNotificationAlert>"#,
        date_time, plate
    )
}

async fn search_plate(client: &reqwest::Client, base_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let plate = prompt("Matrícula a buscar: ")?;
    let response = client
        .get(format!("{}/api/v1/plates", base_url))
        .query(&[("plate", plate)])
        .send()
        .await?;
    print_response(response).await
}

async fn list_events(client: &reqwest::Client, base_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let plate = prompt("Filtrar por matrícula (Enter = todas): ")?;
    let limit = prompt("Límite (Enter = 10): ")?;
    let limit = if limit.is_empty() { "10".to_string() } else { limit };

    let mut query = vec![("limit", limit)];
    if !plate.is_empty() {
        query.push(("plate", plate));
    }

    let response = client
        .get(format!("{}/api/v1/events", base_url))
        .query(&query)
        .send()
        .await?;
    print_response(response).await
}

async fn sync_vehicle(client: &reqwest::Client, base_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let token = prompt("Bearer token: ")?;
    let plate = prompt("Matrícula: ")?;

    let response = client
        .post(format!("{}/api/v1/anpr/sync-vehicle", base_url))
        .bearer_auth(token)
        .json(&json!({ "plate_number": plate }))
        .send()
        .await?;
    print_response(response).await
}

async fn get_and_print(client: &reqwest::Client, url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let response = client.get(url).send().await?;
    print_response(response).await
}

async fn print_response(response: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = response.status();
    let body = response.text().await?;

    let status_line = format!("📥 Status: {}", status);
    if status.is_success() {
        println!("{}", status_line.bright_green().bold());
    } else {
        println!("{}", status_line.bright_red().bold());
    }

    match serde_json::from_str::<Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", body),
    }
    Ok(())
}
