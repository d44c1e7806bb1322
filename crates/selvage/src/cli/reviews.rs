//! the `reviews` subcommand - manage review rows

use clap::{Args, Subcommand};
use color_eyre::eyre::Result;
use selvage_db::Database;
use selvage_types::Review;

use super::ConfigArgs;

/// manage reviews
#[derive(Subcommand, Debug)]
pub enum ReviewsCommand {
    /// add a review row
    Add(AddArgs),

    /// list review rows
    List(ListArgs),
}

/// add a review row
#[derive(Args, Debug)]
pub struct AddArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// review platform, e.g. amazon
    #[arg(short, long)]
    platform: String,

    /// reviewer account name on the platform
    #[arg(short, long)]
    username: String,

    /// record the review as not yet verified
    #[arg(long, default_value_t = false)]
    unverified: bool,
}

/// list review rows
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// output format (table, json)
    #[arg(short, long, default_value = "table")]
    output: String,
}

impl ReviewsCommand {
    /// run the reviews command
    pub async fn run(self) -> Result<()> {
        match self {
            ReviewsCommand::Add(args) => add_review(args).await,
            ReviewsCommand::List(args) => list_reviews(args).await,
        }
    }
}

async fn add_review(args: AddArgs) -> Result<()> {
    let config = super::load_config_or_default(args.config.config.as_ref())?;
    let db = super::open_database(&config).await?;

    let review = db
        .create_review(&Review::new(args.platform, args.username, !args.unverified))
        .await?;

    println!("Added review:");
    println!("  Platform: {}", review.platform);
    println!("  Username: {}", review.username);
    println!("  Verified: {}", if review.verified { "yes" } else { "no" });

    Ok(())
}

async fn list_reviews(args: ListArgs) -> Result<()> {
    let config = super::load_config_or_default(args.config.config.as_ref())?;
    let db = super::open_database(&config).await?;

    let reviews = db.list_reviews().await?;

    if args.output == "json" {
        println!("{}", serde_json::to_string_pretty(&reviews)?);
        return Ok(());
    }

    if reviews.is_empty() {
        println!("No reviews found.");
        return Ok(());
    }

    println!(
        "{:<6} {:<14} {:<20} {:<10} CREATED",
        "ID", "PLATFORM", "USERNAME", "VERIFIED"
    );
    println!("{}", "-".repeat(70));

    for review in reviews {
        println!(
            "{:<6} {:<14} {:<20} {:<10} {}",
            review.id,
            review.platform,
            review.username,
            if review.verified { "yes" } else { "no" },
            review.created_at.format("%Y-%m-%d %H:%M"),
        );
    }

    Ok(())
}
