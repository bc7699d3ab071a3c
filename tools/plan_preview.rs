/// Plan Preview — render a plan for a brief from the command line.
///
/// Usage: plan_preview --topic <text> [--length 30] [--platform YouTube] [--seed 42] [--remix 3]
///
/// Set RUST_LOG=debug to see generation logs.
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use shorts_planner::schema::request::FormLength;
use shorts_planner::{script_text, PlanExport, PlanForm, Planner};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Beat-by-beat script with the summary and idea lists.
    Text,
    /// The `{ request, plan }` export document.
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "plan_preview", about = "Generate a short-video plan from a brief")]
struct Args {
    #[arg(long, default_value = "")]
    topic: String,
    #[arg(long, default_value = "")]
    audience: String,
    #[arg(long, default_value = "")]
    tone: String,
    #[arg(long, default_value = "")]
    goal: String,
    #[arg(long, default_value = "")]
    product: String,
    #[arg(long = "cta", default_value = "")]
    call_to_action: String,
    /// Comma-separated keywords.
    #[arg(long, default_value = "")]
    keywords: String,
    /// 15, 30, 45 or 60.
    #[arg(long, default_value = "30")]
    length: String,
    /// YouTube, Instagram or TikTok.
    #[arg(long, default_value = "YouTube")]
    platform: String,
    #[arg(long, default_value_t = 42, allow_hyphen_values = true)]
    seed: i64,
    /// Also print this many remixes (seed + 1, seed + 2, ...).
    #[arg(long, default_value_t = 0)]
    remix: usize,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Bank files merged over the built-in bank.
    #[arg(long = "bank")]
    banks: Vec<PathBuf>,
    /// RON file with list targets.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let form = PlanForm {
        topic: args.topic,
        audience: args.audience,
        tone: args.tone,
        goal: args.goal,
        product: args.product,
        call_to_action: args.call_to_action,
        keywords: args.keywords,
        length: FormLength::Text(args.length),
        platform: args.platform,
        seed: args.seed,
    };
    let request = form.normalize().context("Invalid brief")?;

    let mut builder = Planner::builder();
    for bank in args.banks {
        builder = builder.bank_file(bank);
    }
    if let Some(config) = args.config {
        builder = builder.config_file(config);
    }
    let planner = builder.build().context("Failed to build planner")?;

    let plans = planner
        .generate_variants(&request, args.remix + 1)
        .context("Plan generation failed")?;
    info!("Generated {} plan(s) from seed {}", plans.len(), request.seed);

    let mut current = request;
    for (i, plan) in plans.into_iter().enumerate() {
        if i > 0 {
            println!();
            current = current.remixed();
        }
        match args.format {
            Format::Json => {
                let export = PlanExport::new(current.clone(), plan);
                println!("{}", export.to_json()?);
            }
            Format::Text => {
                println!("=== Seed {} ({}, {}) ===\n", current.seed, current.length, current.platform);
                println!("Hook: {}", plan.hook);
                println!("Promise: {}", plan.promise);
                println!("CTA: {}", plan.call_to_action);
                println!("Music: {}\n", plan.music_cue);
                print!("{}", script_text(&plan));
                print_list("B-roll", &plan.broll_ideas);
                print_list("Transitions", &plan.transitions);
                print_list("Captions", &plan.captions);
                println!("\nHashtags: {}", plan.hashtags.join(" "));
                print_list("Posting notes", &plan.posting_notes);
            }
        }
    }

    Ok(())
}

fn print_list(title: &str, items: &[String]) {
    println!("\n{}:", title);
    for item in items {
        println!("  - {}", item);
    }
}
