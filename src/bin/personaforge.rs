//! CLI for PersonaForge - character-consistent AI image generation.

use clap::{Args, Parser, Subcommand, ValueEnum};
use personaforge::{
    CharacterDNA, DataUrl, EnvCredentialHost, GeminiClient, ImageService, ImageSize, Studio,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "personaforge")]
#[command(about = "Generate character-consistent images via the Gemini image API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an image of the character in a scene
    Generate(GenerateArgs),

    /// Apply a natural-language edit to an existing image
    Edit(EditArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Scene description appended to the character prompt
    #[arg(default_value = "neutral pose, white background")]
    modifier: String,

    /// Base character or species (e.g. "A robotic red panda")
    #[arg(long)]
    species: Option<String>,

    /// Visual art style description
    #[arg(long)]
    style: Option<String>,

    /// Permanent trait; repeat for multiple traits
    #[arg(long = "feature")]
    features: Vec<String>,

    /// Load the character DNA from a JSON file instead of flags
    #[arg(long, conflicts_with_all = ["species", "style", "features"])]
    dna: Option<PathBuf>,

    /// Reference image file to condition the character on
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Resolution tier
    #[arg(short, long, value_enum, default_value = "1k")]
    size: SizeArg,

    /// Output file path
    #[arg(short, long, default_value = "persona.png")]
    output: PathBuf,
}

#[derive(Args)]
struct EditArgs {
    /// Image file to edit
    input: PathBuf,

    /// Edit instruction (e.g. "make the hat red")
    instruction: String,

    /// Output file path
    #[arg(short, long, default_value = "edited.png")]
    output: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SizeArg {
    #[value(name = "1k")]
    OneK,
    #[value(name = "2k")]
    TwoK,
    #[value(name = "4k")]
    FourK,
}

impl From<SizeArg> for ImageSize {
    fn from(arg: SizeArg) -> Self {
        match arg {
            SizeArg::OneK => ImageSize::OneK,
            SizeArg::TwoK => ImageSize::TwoK,
            SizeArg::FourK => ImageSize::FourK,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate(args, cli.json).await,
        Commands::Edit(args) => edit(args, cli.json).await,
    }
}

fn load_dna(args: &GenerateArgs) -> anyhow::Result<CharacterDNA> {
    let mut dna = if let Some(path) = &args.dna {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)?
    } else {
        CharacterDNA {
            species: args.species.clone().unwrap_or_default(),
            style: args.style.clone().unwrap_or_default(),
            features: args.features.clone(),
            reference_image: None,
        }
    };
    // --reference overrides whatever the DNA file carries.
    if let Some(path) = &args.reference {
        dna.reference_image = Some(DataUrl::from_file(path)?.to_string());
    }
    Ok(dna)
}

async fn generate(args: GenerateArgs, json_output: bool) -> anyhow::Result<()> {
    let dna = load_dna(&args)?;

    let client = GeminiClient::builder().build()?;
    let mut studio = Studio::new(client, EnvCredentialHost::default());
    *studio.dna_mut() = dna;
    studio.set_size(args.size.into());

    if studio.generate(&args.modifier).await?.is_none() {
        anyhow::bail!("no API key selected; set GOOGLE_API_KEY and retry");
    }

    let image = studio.gallery().latest().expect("gallery head after generate");
    image.save(&args.output)?;

    if json_output {
        let summary = serde_json::json!({
            "success": true,
            "output": args.output.display().to_string(),
            "id": image.id,
            "size": image.size,
            "prompt": image.prompt,
            "timestamp": image.timestamp,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Generated {} ({}, {})",
            args.output.display(),
            image.size,
            image.id
        );
        println!("Prompt: {}", image.prompt);
    }

    Ok(())
}

async fn edit(args: EditArgs, json_output: bool) -> anyhow::Result<()> {
    let input = DataUrl::from_file(&args.input)?;

    let client = GeminiClient::builder().build()?;
    let edited = client.edit(&input.to_string(), &args.instruction).await?;
    edited.save(&args.output)?;

    if json_output {
        let summary = serde_json::json!({
            "success": true,
            "output": args.output.display().to_string(),
            "mime_type": edited.mime_type(),
            "size_bytes": edited.data().len(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Edited {} -> {} ({} bytes)",
            args.input.display(),
            args.output.display(),
            edited.data().len()
        );
    }

    Ok(())
}
