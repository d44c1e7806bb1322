//! the `models` subcommand - manage the model catalog

use std::path::PathBuf;

use clap::{Args, Subcommand};
use color_eyre::eyre::{Context, Result};
use selvage_db::Database;
use selvage_store::{FsObjectStore, Metadata, ObjectStore};
use selvage_types::{Model, ModelVersion, Tier};

use super::ConfigArgs;

/// manage the model catalog
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// add or update a catalog model and upload its payload
    Add(AddArgs),

    /// list catalog models
    List(ListArgs),
}

/// add or update a catalog model
#[derive(Args, Debug)]
pub struct AddArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// catalog id of the model
    #[arg(short, long)]
    id: String,

    /// human-readable name (defaults to the id)
    #[arg(short, long)]
    name: Option<String>,

    /// model version
    #[arg(long, default_value = "1.0")]
    model_version: String,

    /// minimum tier that can see the model
    #[arg(short, long, default_value = "free")]
    tier: String,

    /// short description
    #[arg(short, long, default_value = "")]
    description: String,

    /// path to the payload file to upload
    payload: PathBuf,
}

/// list catalog models
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// output format (table, json)
    #[arg(short, long, default_value = "table")]
    output: String,
}

impl ModelsCommand {
    /// run the models command
    pub async fn run(self) -> Result<()> {
        match self {
            ModelsCommand::Add(args) => add_model(args).await,
            ModelsCommand::List(args) => list_models(args).await,
        }
    }
}

async fn add_model(args: AddArgs) -> Result<()> {
    let tier: Tier = args.tier.parse().context("invalid tier")?;
    let config = super::load_config_or_default(args.config.config.as_ref())?;
    let db = super::open_database(&config).await?;
    let store = FsObjectStore::new(config.storage.root.clone());

    let bytes = std::fs::read(&args.payload)
        .with_context(|| format!("failed to read payload file: {:?}", args.payload))?;

    let mut metadata = Metadata::new();
    metadata.insert("version".to_string(), args.model_version.clone());
    store
        .put(&format!("models/{}", args.id), &bytes, &metadata)
        .await
        .context("failed to store model payload")?;

    let model = Model {
        id: args.id.clone(),
        name: args.name.unwrap_or_else(|| args.id.clone()),
        version: ModelVersion::from(args.model_version),
        tier,
        description: args.description,
        size: bytes.len() as i64,
    };
    let model = db.upsert_model(&model).await?;

    println!("Added model:");
    println!("  Id:          {}", model.id);
    println!("  Name:        {}", model.name);
    println!("  Version:     {}", model.version);
    println!("  Tier:        {}", model.tier);
    println!("  Size:        {} bytes", model.size);

    Ok(())
}

async fn list_models(args: ListArgs) -> Result<()> {
    let config = super::load_config_or_default(args.config.config.as_ref())?;
    let db = super::open_database(&config).await?;

    let mut models = db.list_models().await?;
    selvage_types::sort_catalog(&mut models);

    if args.output == "json" {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    if models.is_empty() {
        println!("No models found.");
        return Ok(());
    }

    println!(
        "{:<20} {:<20} {:<10} {:<14} {:>12}",
        "ID", "NAME", "VERSION", "TIER", "SIZE"
    );
    println!("{}", "-".repeat(80));

    for model in models {
        println!(
            "{:<20} {:<20} {:<10} {:<14} {:>12}",
            model.id,
            model.name,
            model.version.to_string(),
            model.tier.to_string(),
            model.size,
        );
    }

    Ok(())
}
