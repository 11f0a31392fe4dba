//! Smart Traffic CLI
//!
//! One-shot access to the navigator without starting the web server:
//!
//!   smart_traffic route --from 1 --to 4 --transport motor
//!   smart_traffic route --from 1 --to 4 --json --at 2026-10-19T08:00
//!   smart_traffic locations
//!   smart_traffic congestion --at 2026-10-17T10:00

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use smart_traffic::core::congestion;
use smart_traffic::models::types::{Route, RoutePlan};
use smart_traffic::{Clock, Navigator, TrafficConfig};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const AT_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Parser)]
#[command(name = "smart_traffic")]
#[command(about = "Congestion-aware routing between Bengkulu landmarks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan a route between two registry locations
    Route {
        /// Start location id
        #[arg(long)]
        from: String,
        /// Destination location id
        #[arg(long)]
        to: String,
        /// motor, mobil or jalan_kaki
        #[arg(long, default_value = "mobil")]
        transport: String,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
        /// Evaluate congestion at this local time (YYYY-MM-DDTHH:MM)
        #[arg(long)]
        at: Option<String>,
    },
    /// List registry locations with their current congestion
    Locations,
    /// Congestion snapshot of every location
    Congestion {
        /// Local time to evaluate (YYYY-MM-DDTHH:MM), defaults to now
        #[arg(long)]
        at: Option<String>,
    },
}

fn parse_at(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), AT_FORMAT)
        .wrap_err_with(|| format!("--at must look like 2026-10-19T08:00, got '{}'", raw))
}

fn clock_for(config: &TrafficConfig, at: Option<&str>) -> Result<Clock> {
    match at {
        Some(raw) => Ok(Clock::Fixed(parse_at(raw)?)),
        None => Ok(config.clock),
    }
}

fn print_route(route: &Route) {
    println!(
        "{} route ({}): {} / {}",
        route.kind_label(),
        route.transport,
        route.distance_label(),
        route.time_label()
    );
    for (name, est) in &route.congestion_levels {
        println!("  {}: {} ({})", name, est.level, est.reason);
    }
    if !route.avoided_congestion.is_empty() {
        println!("  avoids: {}", route.avoided_congestion.join(", "));
    }
    for (i, step) in route.steps.iter().enumerate() {
        println!(
            "  {:>2}. {} [{}, {}] {}",
            i + 1,
            step.instruction,
            step.distance_label(),
            step.time_label(),
            step.condition
        );
    }
}

fn print_plan(plan: &RoutePlan) {
    print_route(&plan.primary);
    if let (true, Some(alt)) = (plan.has_congestion, &plan.alternative) {
        println!();
        print_route(alt);
    }
}

fn print_snapshot(config: &TrafficConfig, now: NaiveDateTime) {
    println!("Congestion at {}", now.format("%A %Y-%m-%d %H:%M"));
    for (loc, est) in congestion::snapshot(&config.registry, now) {
        println!(
            "{:>3}  {:<36} {:<7} {:.1}  {}",
            loc.id, loc.name, est.level, est.factor, est.reason
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = TrafficConfig::from_env()?;

    match cli.command {
        Command::Route {
            from,
            to,
            transport,
            json,
            at,
        } => {
            let clock = clock_for(&config, at.as_deref())?;
            let navigator = Navigator::new(Arc::new(config.with_clock(clock)))?;

            let plan = navigator
                .find_routes(&from, &to, &transport, navigator.now())
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_plan(&plan);
            }
        }
        Command::Locations => {
            let now = config.clock.now();
            for (loc, est) in congestion::snapshot(&config.registry, now) {
                println!(
                    "{:>3}  {:<36} {:>11.7}, {:>12.7}  critical={:<5} weekend={:<5} {}",
                    loc.id,
                    loc.name,
                    loc.lat,
                    loc.lng,
                    loc.critical,
                    loc.weekend_congestion,
                    est.level
                );
            }
        }
        Command::Congestion { at } => {
            let now = clock_for(&config, at.as_deref())?.now();
            print_snapshot(&config, now);
        }
    }

    Ok(())
}
