//! Image editing example - applies an instruction to an existing image.
//!
//! Run with: `cargo run --example edit -- <input_image.png>`
//!
//! Requires `GOOGLE_API_KEY` environment variable.

use personaforge::{DataUrl, GeminiClient, ImageService};

#[tokio::main]
async fn main() -> personaforge::Result<()> {
    let input_path = std::env::args()
        .nth(1)
        .expect("Usage: edit <input_image.png>");

    let input = DataUrl::from_file(&input_path)?;

    let client = GeminiClient::builder().build()?;
    let edited = client
        .edit(&input.to_string(), "Make the colors more vibrant")
        .await?;

    edited.save("edited.png")?;
    println!("Edited image saved to edited.png ({} bytes)", edited.data().len());

    Ok(())
}
