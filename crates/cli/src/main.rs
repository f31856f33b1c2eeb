use std::process;

use clap::Parser;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use sercop_cli::{
    analysis_options, load_schedules, render_report, summary, App, BatchArgs, CheckArgs, Command,
};
use sercop_core::{analyze, Operation, Schedule};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let app = App::parse();
    match &app.command {
        Command::Check(args) => check(args),
        Command::Batch(args) => batch(args),
        Command::Schema => schema(),
    }
}

fn check(args: &CheckArgs) {
    let input = args.schedule.join(" ");
    let schedule = sercop_parser::parse_schedule(&input).unwrap_or_else(|e| {
        eprintln!("Failed to parse schedule: {e}");
        process::exit(1);
    });

    let options = analysis_options(&args.classes, args.limit, args.orders);
    let report = analyze(&schedule, &options).unwrap_or_else(|e| {
        eprintln!("Malformed schedule: {e}");
        process::exit(1);
    });

    if args.json {
        let result = serde_json::json!({
            "schedule": schedule,
            "report": report,
        });
        println!("{result}");
    } else {
        print!("{}", render_report(&report, args.orders, args.verbose));
    }
}

/// One schedule to analyse, labelled `<file>#<n>` (1-based).
struct Job {
    label: String,
    schedule: Schedule<String>,
}

fn batch(args: &BatchArgs) {
    let mut any_failed = false;
    let mut jobs = Vec::new();

    for path in &args.paths {
        match load_schedules(path) {
            Ok(schedules) => {
                let name = path.display().to_string();
                jobs.extend(schedules.into_iter().enumerate().map(|(i, schedule)| Job {
                    label: format!("{name}#{}", i + 1),
                    schedule,
                }));
            }
            Err(e) => {
                any_failed = true;
                eprintln!("Failed to load {}: {e}", path.display());
            }
        }
    }

    tracing::debug!(schedules = jobs.len(), "analysing batch");
    let options = analysis_options(&args.classes, args.limit, false);
    let results: Vec<_> = jobs
        .into_par_iter()
        .map(|job| {
            let result = analyze(&job.schedule, &options);
            (job.label, result)
        })
        .collect();

    for (label, result) in results {
        match result {
            Ok(report) => {
                if args.json {
                    let result = serde_json::json!({
                        "schedule": label,
                        "ok": true,
                        "report": report,
                    });
                    println!("{result}");
                } else {
                    println!("{label}: {}", summary(&report));
                }
            }
            Err(e) => {
                any_failed = true;
                if args.json {
                    let result = serde_json::json!({
                        "schedule": label,
                        "ok": false,
                        "error": e,
                    });
                    println!("{result}");
                } else {
                    println!("{label}: MALFORMED ({e})");
                }
            }
        }
    }

    if any_failed {
        process::exit(1);
    }
}

fn schema() {
    let schema = schemars::schema_for!(Vec<Operation<String>>);
    match serde_json::to_string_pretty(&schema) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Failed to serialize schema: {e}");
            process::exit(1);
        }
    }
}
