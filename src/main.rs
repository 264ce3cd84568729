//! fieldquery demo - filters and groups generated people by fields chosen on
//! the command line and reports per-group completeness.

use anyhow::{bail, Context, Result};
use clap::Parser as ClapParser;
use fieldquery::people::{PeopleGenerator, Person};
use fieldquery::{FilterSpec, Group, QueryConfig, QueryEngine};
use std::time::{Duration, Instant};

/// Filter and group synthetic people by fields chosen at run time
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of people to generate
    #[arg(short = 'n', long, default_value = "100000")]
    count: usize,

    /// Seed for the people generator (random when omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Fields to group by, in key order
    #[arg(
        short,
        long = "group-by",
        value_delimiter = ',',
        default_values = ["Country", "Age"]
    )]
    group_by: Vec<String>,

    /// Filter as FIELD=VALUE[,VALUE...]; repeat for more fields
    #[arg(
        short,
        long = "filter",
        value_parser = parse_filter,
        default_values = ["Country=USA,Canada", "Age=20,21,22,23"]
    )]
    filters: Vec<(String, Vec<String>)>,

    /// Skip filtering and group every person
    #[arg(long, conflicts_with = "filters")]
    no_filter: bool,

    /// Run the query this many times and report timings
    #[arg(short, long, default_value = "1")]
    iterations: usize,

    /// Partitions used to apply evaluators in parallel
    #[arg(short, long)]
    workers: Option<usize>,

    /// Number of groups to print
    #[arg(long, default_value = "10")]
    show: usize,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn parse_filter(raw: &str) -> Result<(String, Vec<String>)> {
    let Some((field, values)) = raw.split_once('=') else {
        bail!("expected FIELD=VALUE[,VALUE...], got '{}'", raw);
    };
    let field = field.trim();
    if field.is_empty() {
        bail!("missing field name in '{}'", raw);
    }

    let values = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    Ok((field.to_string(), values))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut generator = match args.seed {
        Some(seed) => PeopleGenerator::with_seed(seed),
        None => PeopleGenerator::new(),
    };
    let people = generator.generate(args.count);
    log::info!("generated {} people", people.len());

    let spec: FilterSpec = if args.no_filter {
        FilterSpec::new()
    } else {
        args.filters.iter().cloned().collect()
    };

    let mut config = QueryConfig::default();
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }
    let engine = QueryEngine::new().with_config(config);

    let iterations = args.iterations.max(1);
    let mut timings = Vec::with_capacity(iterations);
    let mut groups = Vec::new();
    for _ in 0..iterations {
        let started = Instant::now();
        groups = engine
            .filter_then_group(&people, &spec, args.group_by.as_slice())
            .context("Failed to run query")?;
        timings.push(started.elapsed());
    }

    let matched: usize = groups.iter().map(Group::len).sum();
    println!(
        "{} of {} people matched, {} groups by ({})",
        matched,
        people.len(),
        groups.len(),
        args.group_by.join(", ")
    );

    groups.sort_by(|a, b| a.key.cmp(&b.key));
    for group in groups.iter().take(args.show) {
        println!(
            "  {:<24} members={:<6} completeness={:.4}",
            group.key.to_string(),
            group.len(),
            completeness(group)
        );
    }
    if groups.len() > args.show {
        println!("  ... {} more", groups.len() - args.show);
    }

    report_timings(&timings);

    let stats = engine.cache().stats();
    println!(
        "cache: entries={} builds={} hits={} misses={}",
        stats.entries, stats.builds, stats.hits, stats.misses
    );

    Ok(())
}

/// Share of expected data points that are missing across a group
fn completeness(group: &Group<'_, Person>) -> f32 {
    let missing: i64 = group.members.iter().map(|p| i64::from(p.missing)).sum();
    let expected: i64 = group.members.iter().map(|p| i64::from(p.expected)).sum();
    if expected == 0 {
        0.0
    } else {
        missing as f32 / expected as f32
    }
}

fn report_timings(timings: &[Duration]) {
    let Some((first, rest)) = timings.split_first() else {
        return;
    };

    println!("first run (builds evaluators): {:?}", first);
    if !rest.is_empty() {
        let total: Duration = rest.iter().sum();
        let fastest = rest.iter().min().copied().unwrap_or_default();
        println!(
            "cached runs: {} avg={:?} min={:?}",
            rest.len(),
            total / rest.len() as u32,
            fastest
        );
    }
}
