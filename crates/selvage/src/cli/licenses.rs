//! the `licenses` subcommand - manage license rows

use chrono::{DateTime, Duration, Utc};
use clap::{Args, Subcommand};
use color_eyre::eyre::{Context, Result};
use selvage_db::Database;
use selvage_types::{License, LicenseStatus, Tier};

use super::ConfigArgs;

/// manage licenses
#[derive(Subcommand, Debug)]
pub enum LicensesCommand {
    /// create a new license
    Create(CreateArgs),

    /// list all licenses
    List(ListArgs),
}

/// create a new license
#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// tier the license grants (free, free-reviewer, pro, enterprise)
    #[arg(short, long, default_value = "pro")]
    tier: String,

    /// account the license belongs to
    #[arg(short, long)]
    owner: String,

    /// validity in days from now (default: no expiration)
    #[arg(long)]
    valid_days: Option<i64>,

    /// create the license already activated
    #[arg(long, default_value_t = false)]
    active: bool,
}

/// list licenses
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// output format (table, json)
    #[arg(short, long, default_value = "table")]
    output: String,
}

impl LicensesCommand {
    /// run the licenses command
    pub async fn run(self) -> Result<()> {
        match self {
            LicensesCommand::Create(args) => create_license(args).await,
            LicensesCommand::List(args) => list_licenses(args).await,
        }
    }
}

async fn create_license(args: CreateArgs) -> Result<()> {
    let tier: Tier = args.tier.parse().context("invalid tier")?;
    let config = super::load_config_or_default(args.config.config.as_ref())?;
    let db = super::open_database(&config).await?;

    let mut license = License::new(License::generate_key(), tier, args.owner);
    if let Some(days) = args.valid_days {
        license.valid_until = Some(Utc::now() + Duration::days(days));
    }
    if args.active {
        license.status = LicenseStatus::Active;
        license.activated_at = Some(Utc::now());
    }

    let license = db.create_license(&license).await?;

    println!("Created license:");
    println!("  Key:         {}", license.key);
    println!("  Tier:        {}", license.tier);
    println!("  Owner:       {}", license.owner_id);
    println!("  Status:      {}", license.status);
    println!(
        "  Valid until: {}",
        format_instant(license.valid_until.as_ref())
    );

    Ok(())
}

async fn list_licenses(args: ListArgs) -> Result<()> {
    let config = super::load_config_or_default(args.config.config.as_ref())?;
    let db = super::open_database(&config).await?;

    let licenses = db.list_licenses().await?;

    if args.output == "json" {
        println!("{}", serde_json::to_string_pretty(&licenses)?);
        return Ok(());
    }

    if licenses.is_empty() {
        println!("No licenses found.");
        return Ok(());
    }

    println!(
        "{:<6} {:<16} {:<14} {:<16} {:<10} {:<18} VALID UNTIL",
        "ID", "KEY", "TIER", "OWNER", "STATUS", "ACTIVATED"
    );
    println!("{}", "-".repeat(98));

    for license in licenses {
        println!(
            "{:<6} {:<16} {:<14} {:<16} {:<10} {:<18} {}",
            license.id,
            key_preview(&license.key),
            license.tier.to_string(),
            license.owner_id,
            license.status.to_string(),
            format_instant(license.activated_at.as_ref()),
            format_instant(license.valid_until.as_ref()),
        );
    }

    Ok(())
}

/// shorten a license key for table output.
fn key_preview(key: &str) -> String {
    if key.len() > 12 {
        format!("{}...", &key[..12])
    } else {
        key.to_string()
    }
}

/// format an optional instant for table output, "never" if absent.
fn format_instant(at: Option<&DateTime<Utc>>) -> String {
    at.map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_preview_shortens_long_keys() {
        let key = License::generate_key();
        let preview = key_preview(&key);
        assert_eq!(preview.len(), 15);
        assert!(preview.ends_with("..."));
        assert_eq!(key_preview("slv-short"), "slv-short");
    }

    #[test]
    fn test_format_instant() {
        assert_eq!(format_instant(None), "never");

        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(format_instant(Some(&at)), "2023-11-14 22:13");
    }
}
