//! Discover a scale and print one reading

use scalepoll::{config::DeviceConfig, Scale};

#[tokio::main]
async fn main() -> scalepoll::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    // Change to your network's broadcast address
    let host = std::env::var("SCALE_BROADCAST").unwrap_or_else(|_| "192.168.100.255".to_string());

    println!("Discovering scale via {}...", host);

    let scale = Scale::new(&DeviceConfig {
        host,
        ..DeviceConfig::default()
    })?;

    let address = scale.locate().await?;
    println!("✓ Found scale at {}", address);

    let reading = scale.read_weight().await?;
    println!("✓ {}", reading);

    Ok(())
}
