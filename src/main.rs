use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use eco_triage::error::AppError;
use eco_triage::{ClassificationPipeline, Configuration};
use std::io::Read;
use std::path::Path;
use tracing::Level;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();
}

// `-` reads base64 from stdin; a .jpg/.jpeg path is encoded as-is; any other path holds base64 text.
fn read_image(source: &str) -> Result<String, AppError> {
    if source == "-" {
        let mut encoded = String::new();
        std::io::stdin().read_to_string(&mut encoded)?;
        return Ok(encoded.trim().to_string());
    }

    let path = Path::new(source);
    let is_jpeg = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| matches!(extension.to_ascii_lowercase().as_str(), "jpg" | "jpeg"));

    if is_jpeg {
        Ok(STANDARD.encode(std::fs::read(path)?))
    } else {
        Ok(std::fs::read_to_string(path)?.trim().to_string())
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging();

    let source = std::env::args()
        .nth(1)
        .ok_or_else(|| AppError::Usage("eco-triage <image.jpg | base64-file | ->".to_string()))?;

    let configuration = Configuration::load()?;
    if !configuration.has_api_key() {
        return Err(AppError::MissingApiKey);
    }

    let image = read_image(&source)?;
    let pipeline = ClassificationPipeline::builder()
        .configuration(configuration)
        .build()?;

    let result = pipeline.process_image(image).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
