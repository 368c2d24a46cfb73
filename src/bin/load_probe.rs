//! Loads one day of availability through the same path the booking form uses
//! (`bootstrap_state` + `fetch_day`) at increasing request rates and reports
//! latency and how many loads degraded.
//!
//! Reads the usual `Config` environment plus `PROBE_MANAGER_ID`,
//! `PROBE_VENUE_ID` and `PROBE_STAGE_SECS`.

use std::num::NonZeroU32;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Days, NaiveDate};
use colored::*;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use tokio::task::JoinSet;
use tracing::{info, warn};
use venue_booking::config::Config;
use venue_booking::domain::models::booking::VenueRef;
use venue_booking::infra::factory::bootstrap_state;
use venue_booking::init_logging;
use venue_booking::session::{fetch_day, local_today, LoadTicket};
use venue_booking::state::AppState;

const RATES: [u32; 4] = [5, 20, 100, 400];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    latency: Duration,
    applied: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct StageReport {
    rate: u32,
    loads: usize,
    degraded: usize,
    mean_ms: f64,
    p99_ms: f64,
}

impl StageReport {
    fn from_samples(rate: u32, samples: &[Sample]) -> Option<Self> {
        let mut histogram = Histogram::<u64>::new(3).ok()?;
        for sample in samples {
            histogram.saturating_record(sample.latency.as_micros() as u64);
        }
        Some(Self {
            rate,
            loads: samples.len(),
            degraded: samples.iter().filter(|s| !s.applied).count(),
            mean_ms: histogram.mean() / 1000.0,
            p99_ms: histogram.value_at_quantile(0.99) as f64 / 1000.0,
        })
    }

    fn applied_pct(&self) -> f64 {
        if self.loads == 0 {
            return 0.0;
        }
        (self.loads - self.degraded) as f64 * 100.0 / self.loads as f64
    }

    fn row(&self) -> String {
        let pct = format!("{:.1}%", self.applied_pct());
        let pct = match self.applied_pct() {
            p if p >= 99.0 => pct.green(),
            p if p >= 90.0 => pct.yellow(),
            _ => pct.red(),
        };
        format!(
            "{:>6} | {:>7} | {:>10.2} | {:>10.2} | {}",
            self.rate, self.loads, self.mean_ms, self.p99_ms, pct
        )
    }
}

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

async fn run_stage(state: &Arc<AppState>, venue: &VenueRef, date: NaiveDate, rate: u32, length: Duration) -> Vec<Sample> {
    let Some(per_second) = NonZeroU32::new(rate) else { return Vec::new() };
    let limiter = RateLimiter::direct(Quota::per_second(per_second));
    let started = Instant::now();
    let mut tasks = JoinSet::new();
    let mut generation = 0u64;

    while started.elapsed() < length {
        limiter.until_ready().await;
        generation += 1;
        let state = state.clone();
        let venue = venue.clone();
        let ticket = LoadTicket { generation, date };
        tasks.spawn(async move {
            let begun = Instant::now();
            let load = fetch_day(&state, &venue, ticket).await;
            Sample { latency: begun.elapsed(), applied: load.result.is_ok() }
        });
    }

    let mut samples = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(sample) => samples.push(sample),
            Err(e) => warn!("Probe task failed: {}", e),
        }
    }
    samples
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::from_env();
    let _guard = init_logging(&config);

    let state = match bootstrap_state(&config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            eprintln!("{}", format!("Invalid configuration: {}", e).red().bold());
            return ExitCode::FAILURE;
        }
    };
    let manager_id = env_or("PROBE_MANAGER_ID", "1");
    let venue = VenueRef {
        venue_id: env_or("PROBE_VENUE_ID", &manager_id),
        venue_name: "load probe".to_string(),
        manager_id,
    };
    let stage_length = Duration::from_secs(env_or("PROBE_STAGE_SECS", "10").parse().unwrap_or(10));
    let date = local_today().checked_add_days(Days::new(7)).unwrap_or_else(local_today);

    let warmup = fetch_day(&state, &venue, LoadTicket { generation: 0, date }).await;
    if let Err(e) = warmup.result {
        eprintln!("{}", format!("Venue directory not usable at {}: {}", config.venue_directory_url, e).red().bold());
        return ExitCode::FAILURE;
    }

    println!("{}", format!("Loading {} for manager {}", date, venue.manager_id).bold());
    println!("{:>6} | {:>7} | {:>10} | {:>10} | applied", "rps", "loads", "mean ms", "p99 ms");
    for rate in RATES {
        let samples = run_stage(&state, &venue, date, rate, stage_length).await;
        match StageReport::from_samples(rate, &samples) {
            Some(report) => {
                info!(rate, loads = report.loads, degraded = report.degraded, "Probe stage finished");
                println!("{}", report.row());
            }
            None => warn!("Could not build a latency histogram for {} rps", rate),
        }
    }
    ExitCode::SUCCESS
}
