//! Example: re-background one product photo from the terminal.
//!
//! Usage:
//!
//! ```text
//! GEMINI_API_KEY=... cargo run --example restyle_product_photo -- photo.jpg [preset_id | "custom style text"]
//! ```
//!
//! The second argument is treated as a preset id when it matches one, otherwise as free-text
//! style. The rendered view is printed after every step and the result is saved to
//! `STYLESWAP_DOWNLOAD_DIR` (default: current directory).

use std::sync::Arc;
use styleswap::clients::gemini::GeminiClient;
use styleswap::controller::GenerateOutcome;
use styleswap::credentials::EnvCredentialSelector;
use styleswap::event::LoggingEventHandler;
use styleswap::presets::{find_preset, find_preset_by_name, BACKDROP_PRESETS};
use styleswap::view::render_text;
use styleswap::{BackdropGenerator, StyleSwapConfig, StyleSwapController};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    styleswap::init_logger();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let config = StyleSwapConfig::from_env();
    let credentials = Arc::new(EnvCredentialSelector::new());
    let client = Arc::new(GeminiClient::from_config(&config, credentials.clone()));
    let controller = StyleSwapController::with_config(
        BackdropGenerator::from_config(client, &config),
        credentials,
        &config,
    )
    .with_event_handler(Arc::new(LoggingEventHandler));

    println!("=== StyleSwap ({}) ===\n", config.model);

    controller.initialize().await;
    if controller.snapshot().await.needs_credential {
        print!("{}", render_text(&controller.view().await));
        controller.select_credential().await?;
    }

    controller.load_image(&args[1]).await?;
    if let Some(style) = args.get(2) {
        if let Some(preset) = find_preset(style).or_else(|| find_preset_by_name(style)) {
            controller.select_preset(preset.id).await;
        } else {
            controller.set_custom_prompt(style.as_str()).await;
        }
    }
    print!("{}", render_text(&controller.view().await));
    println!("\nUsing style: {}\n", controller.snapshot().await.style_text());

    match controller.generate().await {
        GenerateOutcome::Completed(result) => {
            print!("{}", render_text(&controller.view().await));
            let path = controller.download().await?;
            println!(
                "\n✓ Saved {} ({} result) to {}",
                result.timestamp.to_rfc3339(),
                result.detected_format(),
                path.display()
            );
        }
        GenerateOutcome::Failed(err) => {
            print!("{}", render_text(&controller.view().await));
            if err.is_credential_error() {
                println!("\nRe-export GEMINI_API_KEY with a key from a billing-enabled project.");
            }
        }
        other => println!("Nothing generated: {:?}", other),
    }

    Ok(())
}

fn print_usage() {
    println!("restyle_product_photo <photo> [preset_id | \"custom style\"]");
    println!();
    println!("Presets:");
    for preset in BACKDROP_PRESETS {
        println!("  {:<18} {}", preset.id, preset.description);
    }
    println!();
    println!("Environment variables:");
    println!("  GEMINI_API_KEY / API_KEY   - API key for the image model");
    println!("  STYLESWAP_MODEL            - Model id (default: gemini-3-pro-image-preview)");
    println!("  STYLESWAP_DOWNLOAD_DIR     - Where results are saved (default: .)");
}
