//! CLI entry point. One subcommand per workflow; each invocation builds a
//! live session, runs exactly one orchestrator, and reports the outcome.

use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use akpilot::config::Config;
use akpilot::diag::DiagnosticSink;
use akpilot::input::ActionExecutor;
use akpilot::session::LiveSession;
use akpilot::task::combat::{CombatPlan, CycleCount, auto_combat};
use akpilot::task::recruit::{self, SlotOutcome, TagCatalog};
use akpilot::task::{base, rewards};
use vision::{Detector, Ocr, TemplateStore};

#[derive(Parser)]
#[command(name = "akpilot", about = "Screen-driven game automation", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run auto-combat cycles sized off the sanity counter.
    Combat {
        /// Number of cycles to run.
        #[arg(long, default_value_t = 1)]
        cycles: u32,
        /// Run as many cycles as remaining sanity affords.
        #[arg(long, conflicts_with = "cycles")]
        max: bool,
        /// Start from the operation screen, skipping navigation.
        #[arg(long)]
        only: bool,
        /// Template match threshold override.
        #[arg(long)]
        threshold: Option<f32>,
    },
    /// Collect base notifications and return home.
    Base,
    /// Claim daily and weekly task rewards.
    Rewards,
    /// Fill recruitment slots.
    Recruit {
        /// Single slot to process (1-4); all slots when omitted.
        #[arg(long)]
        slot: Option<u8>,
        /// Target tags, in order of preference.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
}

fn build_session(config: &Config) -> anyhow::Result<LiveSession> {
    let store = TemplateStore::new(&config.template_dir).context("open template directory")?;
    let ocr = Ocr::try_new(&config.ocr_detection_model, &config.ocr_recognition_model)
        .context("load OCR models")?;
    let executor = ActionExecutor::new(Duration::from_secs_f32(config.settle_delay_s))
        .context("initialize input backend")?;
    Ok(LiveSession::new(Detector::new(store), ocr, executor))
}

fn main() -> anyhow::Result<()> {
    // Structured logging. Use `RUST_LOG=info` etc.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = Config::load_or_default();
    config.validate().context("validate configuration")?;

    let mut session = build_session(&config)?;
    let diag = if config.save_frames {
        DiagnosticSink::with_frames(&config.frame_dir)
    } else {
        DiagnosticSink::disabled()
    };

    match cli.command {
        Command::Combat {
            cycles,
            max,
            only,
            threshold,
        } => {
            let plan = CombatPlan {
                cycles: if max { CycleCount::Max } else { CycleCount::Exact(cycles) },
                threshold: threshold.unwrap_or(config.match_threshold),
                sanity_cost_per_cycle: config.sanity_cost_per_cycle,
                combat_only: only,
            };
            let ran = auto_combat(&mut session, &diag, &plan).context("auto combat")?;
            println!("completed {ran} combat cycle(s)");
        }
        Command::Base => {
            base::run_base_routine(&mut session, &diag, config.match_threshold)
                .context("base routine")?;
            println!("base notifications collected");
        }
        Command::Rewards => {
            rewards::claim_all_rewards(&mut session, &diag, akpilot::task::LENIENT_THRESHOLD)
                .context("claim rewards")?;
            println!("task rewards claimed");
        }
        Command::Recruit { slot, tags } => {
            let targets = if tags.is_empty() {
                recruit::DEFAULT_TARGET_TAGS
                    .iter()
                    .map(|t| t.to_string())
                    .collect()
            } else {
                tags
            };
            recruit::navigate_to_recruit(&mut session, &diag, akpilot::task::RECRUIT_THRESHOLD)
                .context("open recruitment")?;
            let outcomes = recruit::run_recruit_slots(
                &mut session,
                &diag,
                &TagCatalog::standard(),
                slot,
                &targets,
                akpilot::task::RECRUIT_THRESHOLD,
            )
            .context("recruitment slots")?;

            for (index, outcome) in &outcomes {
                match outcome {
                    SlotOutcome::Locked => println!("slot {index}: locked or absent"),
                    SlotOutcome::Confirmed { tag } => println!("slot {index}: confirmed with {tag}"),
                    SlotOutcome::Fallback { tag: Some(tag) } => {
                        println!("slot {index}: no target tag, took {tag}")
                    }
                    SlotOutcome::Fallback { tag: None } => {
                        println!("slot {index}: no tags recognized, confirmed as-is")
                    }
                    SlotOutcome::NeedsHuman { tag } => {
                        println!("slot {index}: senior tag {tag} present, needs a human")
                    }
                }
            }
        }
    }
    Ok(())
}
