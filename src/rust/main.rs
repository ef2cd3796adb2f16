use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use spendwise::{Categorizer, CategorizerConfig, Expense, ModelStore, SpendingSummary};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path of the saved model (defaults to $SPENDWISE_MODEL_PATH or the user cache dir)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Delete any saved model before running
    #[arg(short, long)]
    fresh: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Retrain the model from the built-in corpus and save it
    Train,
    /// Categorize an expense description
    Predict {
        text: String,
        /// Print per-category confidence instead of a single label
        #[arg(short, long)]
        confidence: bool,
    },
    /// List the available categories
    Categories,
    /// Summarize an expense file with lines `amount,description[,category]`
    Summarize { file: PathBuf },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let model_path = args.model.unwrap_or_else(ModelStore::default_model_path);
    if args.fresh {
        info!("Fresh run requested - removing any saved model...");
        ModelStore::new(&model_path).remove()?;
    }

    let categorizer = Categorizer::new(CategorizerConfig::with_model_path(&model_path))
        .with_context(|| format!("failed to open model at {}", model_path.display()))?;

    match args.command {
        Command::Train => {
            let start = Instant::now();
            categorizer.train().context("training failed")?;
            let info = categorizer.ensure_trained()?.info();
            println!(
                "Trained on {} classes, {} features in {:.2?}; saved to {}",
                info.num_classes,
                info.vocabulary_size,
                start.elapsed(),
                model_path.display()
            );
        }
        Command::Predict { text, confidence: false } => {
            let prediction = categorizer.predict(&text);
            println!("{}", prediction.label());
            if let spendwise::Prediction::Degraded { reason, .. } = prediction {
                eprintln!("(fallback: {:?})", reason);
            }
        }
        Command::Predict { text, confidence: true } => {
            let scores = categorizer.predict_with_confidence(&text)?;
            let mut scores: Vec<_> = scores.iter().collect();
            scores.sort_by(|a, b| b.1.total_cmp(&a.1));
            for (category, score) in scores {
                println!("{:<14} {:>6.2}%", category, score);
            }
        }
        Command::Categories => {
            for category in categorizer.categories() {
                println!("{}", category);
            }
        }
        Command::Summarize { file } => {
            let contents = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let expenses = parse_expenses(&categorizer, &contents)?;
            print_summary(&SpendingSummary::from_expenses(&expenses));
        }
    }

    Ok(())
}

fn parse_expenses(categorizer: &Categorizer, contents: &str) -> Result<Vec<Expense>> {
    let mut expenses = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.splitn(3, ',');
        let (Some(amount), Some(description)) = (fields.next(), fields.next()) else {
            bail!("line {}: expected `amount,description[,category]`", lineno + 1);
        };
        let expense = Expense::record(categorizer, description, amount, fields.next())
            .with_context(|| format!("line {}", lineno + 1))?;
        expenses.push(expense);
    }
    Ok(expenses)
}

fn print_summary(summary: &SpendingSummary) {
    println!("Total spent: {:.2}", summary.total_spent);
    for row in &summary.by_category {
        println!("  {:<14} {:>10.2} ({} expenses)", row.category, row.total, row.count);
    }
}
