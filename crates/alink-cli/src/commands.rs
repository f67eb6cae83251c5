use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use serde_json::{json, Value};

use alink_sdk::{
    AssetModel, EditSession, EditorConfig, InMemoryContentStore, LoadReport, SessionConfig,
    SessionParams, VersionHash, WriteStep,
};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Show(args) => cmd_show(args, format).await,
        Command::Plan(args) => cmd_plan(args, format).await,
        Command::Resave(args) => cmd_resave(args, format).await,
    }
}

async fn open(args: &ObjectArgs) -> anyhow::Result<EditSession<InMemoryContentStore>> {
    let fixture = std::fs::read_to_string(&args.fixture)
        .with_context(|| format!("reading fixture {}", args.fixture.display()))?;
    let store = InMemoryContentStore::from_fixture_json(&fixture)
        .with_context(|| format!("loading fixture {}", args.fixture.display()))?;

    let editor = match &args.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("loading editor config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    let mut config = SessionConfig::default().with_editor(editor);
    if let Some(limit) = args.max_concurrency {
        config = config.with_max_concurrency(limit);
    }

    let mut params = SessionParams::latest(&args.library, &args.object);
    if let Some(version) = &args.at_version {
        params = params.at_version(VersionHash::new(version.as_str())?);
    }
    Ok(EditSession::open(Arc::new(store), params, config).await?)
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

async fn cmd_show(args: ObjectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let session = open(&args).await?;
    let model = session.model();
    match format {
        OutputFormat::Json => {
            let out = model_json(model, session.load_report());
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => print_model(model, session.load_report()),
    }
    Ok(())
}

fn model_json(model: &AssetModel, report: &LoadReport) -> Value {
    let collections: serde_json::Map<String, Value> = model
        .collections()
        .iter()
        .map(|c| (c.config.name.clone(), json!(c.assets)))
        .collect();
    json!({
        "version_hash": model.current_version(),
        "info": model.info(),
        "fields": model.fields(),
        "credits": model.credits(),
        "images": model.images(),
        "gallery": model.gallery(),
        "playlists": model.playlists(),
        "collections": collections,
        "skipped": report.skipped,
    })
}

fn print_model(model: &AssetModel, report: &LoadReport) {
    let info = model.info();
    println!("{} {}", "Version:".bold(), model.current_version().to_string().yellow());
    println!("  Title: {}", info.title);
    println!("  Display title: {}", info.display_title);
    println!("  Slug: {}", info.slug.cyan());
    println!("  Title type: {}  Asset type: {}", info.title_type, info.asset_type);

    if !model.fields().is_empty() {
        println!("\n{}", "Fields".bold());
        for (name, value) in model.fields() {
            let shown = serde_json::to_string(value).unwrap_or_default();
            println!("  {name}: {}", shown.dimmed());
        }
    }

    for collection in model.relevant_collections() {
        println!(
            "\n{} ({})",
            collection.config.name.bold(),
            collection.assets.len()
        );
        for (index, asset) in collection.assets.iter().enumerate() {
            let marker = if asset.is_default { "*".green().bold() } else { " ".normal() };
            let update = if asset.update_available() {
                " (update available)".yellow().to_string()
            } else {
                String::new()
            };
            println!(
                "  {marker} {index:>3}  {}  {}{update}",
                asset.label(),
                asset.version_hash.short().dimmed()
            );
        }
    }

    for group in model.credits() {
        println!("\n{} {}", "Credits:".bold(), group.group);
        for credit in &group.credits {
            println!("    {} {}", credit.talent_first_name, credit.talent_last_name);
        }
    }

    for playlist in model.playlists() {
        println!(
            "\n{} {} ({} clips)",
            "Playlist:".bold(),
            playlist.slug,
            playlist.clips.len()
        );
    }

    if !report.is_clean() {
        println!("\n{} {} unresolvable entries", "!".yellow().bold(), report.skipped.len());
        for skipped in &report.skipped {
            println!(
                "  {} {}: {}",
                skipped.collection,
                skipped.failure.link_path,
                skipped.failure.reason.red()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// plan
// ---------------------------------------------------------------------------

async fn cmd_plan(args: ObjectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let session = open(&args).await?;
    let steps = session.plan();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&steps)?),
        OutputFormat::Text => print_steps(&steps),
    }
    Ok(())
}

fn print_steps(steps: &[WriteStep]) {
    for (index, step) in steps.iter().enumerate() {
        println!(
            "{:>2}. {:<8} {}  {}",
            index + 1,
            step.mode.to_string().cyan(),
            step.subtree,
            step.label.dimmed()
        );
    }
}

// ---------------------------------------------------------------------------
// resave
// ---------------------------------------------------------------------------

async fn cmd_resave(args: ObjectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut session = open(&args).await?;
    let skipped = session.load_report().skipped.len();
    let report = session.save().await.context("save failed")?;
    match format {
        OutputFormat::Json => {
            let out = json!({
                "object_id": report.commit.object_id,
                "version_hash": report.commit.version_hash,
                "steps": report.steps.iter().map(|s| s.label.as_str()).collect::<Vec<_>>(),
                "skipped": skipped,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!(
                "{} Saved {} as {}",
                "✓".green().bold(),
                report.commit.object_id.bold(),
                report.commit.version_hash.to_string().yellow()
            );
            println!("  {} writes in {:?}", report.steps.len(), report.elapsed);
            if skipped > 0 {
                println!(
                    "  {} {skipped} unresolvable entries were dropped",
                    "!".yellow().bold()
                );
            }
        }
    }
    Ok(())
}
