//! Character generation example - builds a DNA and generates one image.
//!
//! Run with: `cargo run --example generate`
//!
//! Requires `GOOGLE_API_KEY` environment variable.

use personaforge::{EnvCredentialHost, GeminiClient, Studio};

#[tokio::main]
async fn main() -> personaforge::Result<()> {
    let client = GeminiClient::builder().build()?;
    let mut studio = Studio::new(client, EnvCredentialHost::default());

    studio.dna_mut().species = "A cute baby sloth".into();
    studio.dna_mut().style =
        "Chibi 2D vector art style, clean lines, flat colors with soft shading".into();
    studio.dna_mut().features = vec![
        "huge green eyes".into(),
        "wearing a green party hat".into(),
        "very happy expression".into(),
    ];

    studio.generate("neutral pose, white background").await?;

    let image = studio.gallery().latest().expect("one image after generate");
    image.save("sloth.png")?;
    println!("Saved sloth.png\nPrompt: {}", image.prompt);

    Ok(())
}
