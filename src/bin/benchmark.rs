use chrono::{Duration as ChronoDuration, Utc};
use colored::*;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::env;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const DURATION_SECS: u64 = 20;
const RACE_REQUESTS: usize = 50;

struct Target {
    name: &'static str,
    url: String,
}

#[tokio::main]
async fn main() {
    let base_url = env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let venue_id = match env::var("BENCH_VENUE_ID") {
        Ok(id) => id,
        Err(_) => {
            eprintln!("{}", "❌ BENCH_VENUE_ID must point at an existing active venue.".red().bold());
            return;
        }
    };

    println!("{}", "🚀 Starting Benchmark Suite".bold().green());
    println!("Target URL: {}", base_url);

    let client = Client::builder()
        .pool_max_idle_per_host(1000)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    if client.get(format!("{}/health", base_url)).send().await.is_err() {
        eprintln!("{}", format!("❌ Server is NOT reachable at {}. Please start it first.", base_url).red().bold());
        return;
    }

    let venue = fetch_venue_day(&client, &base_url, &venue_id).await;
    println!("{}", "✅ Venue reachable.".green());
    println!("   Venue ID: {}", venue_id);
    println!("   Timezone: {}", venue["timezone"].as_str().unwrap_or("UTC"));

    // Far enough ahead that repeated runs rarely collide on the same day.
    let days_ahead = rand::thread_rng().gen_range(30..365);
    let race_date = (Utc::now() + ChronoDuration::days(days_ahead)).format("%Y-%m-%d").to_string();

    race_single_slot(&client, &base_url, &venue_id, &race_date).await;

    let today = Utc::now().format("%Y-%m-%d").to_string();
    let targets = vec![
        Target {
            name: "Health Check",
            url: format!("{}/health", base_url),
        },
        Target {
            name: "Venue Availability (1h slots)",
            url: format!("{}/api/v1/venues/{}/availability?date={}&duration=1", base_url, venue_id, today),
        },
        Target {
            name: "Venue Availability (2h slots, booked day)",
            url: format!("{}/api/v1/venues/{}/availability?date={}&duration=2", base_url, venue_id, race_date),
        },
        Target {
            name: "Venue Timeline",
            url: format!("{}/api/v1/venues/{}/timeline?date={}", base_url, venue_id, race_date),
        },
    ];

    let rps_stages = vec![10, 50, 200, 1000];

    for target in targets {
        println!("\n{}", "=".repeat(60));
        println!("Benchmarking Endpoint: {}", target.name.cyan().bold());
        println!("URL: {}", target.url);
        println!("{}", "=".repeat(60));

        println!("{:<10} | {:<15} | {:<15} | {:<15}", "RPS", "Mean (ms)", "P99 (ms)", "Success Rate");
        println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<15}", "", "", "", "");

        for &rps in &rps_stages {
            run_stage(&client, &target, rps).await;
        }
    }
}

async fn fetch_venue_day(client: &Client, base_url: &str, venue_id: &str) -> Value {
    let today = Utc::now().format("%Y-%m-%d").to_string();
    let res = client.get(format!("{}/api/v1/venues/{}/availability?date={}", base_url, venue_id, today))
        .send()
        .await
        .expect("Failed to query venue availability");

    if !res.status().is_success() {
        let status = res.status();
        let txt = res.text().await.unwrap_or_default();
        panic!("Venue lookup failed. Status: {}. Body: {}", status, txt);
    }

    res.json().await.expect("Failed to parse availability response")
}

/// Fires many identical booking requests at once. Exactly one must win.
async fn race_single_slot(client: &Client, base_url: &str, venue_id: &str, date: &str) {
    println!("\n{}", "=".repeat(60));
    println!("Race: {} concurrent bookings for {} 10:00", RACE_REQUESTS, date.cyan().bold());
    println!("{}", "=".repeat(60));

    let url = format!("{}/api/v1/venues/{}/bookings", base_url, venue_id);
    let body = json!({
        "date": date,
        "start_time": "10:00",
        "duration": 1,
        "customer_name": "Benchmark Bot",
    });

    let mut handles = Vec::with_capacity(RACE_REQUESTS);
    for _ in 0..RACE_REQUESTS {
        let client = client.clone();
        let url = url.clone();
        let body = body.clone();
        handles.push(tokio::spawn(async move {
            client.post(&url).json(&body).send().await.map(|r| r.status()).ok()
        }));
    }

    let mut created = 0;
    let mut rejected = 0;
    let mut other = 0;
    for handle in handles {
        match handle.await.ok().flatten() {
            Some(StatusCode::OK) => created += 1,
            Some(StatusCode::CONFLICT) => rejected += 1,
            _ => other += 1,
        }
    }

    println!("created: {}  conflict: {}  other: {}", created, rejected, other);
    if created == 1 {
        println!("{}", "✅ Exactly one booking won the slot.".green());
    } else if created == 0 {
        println!("{}", "⚠️  No booking succeeded (venue closed at 10:00 or slot already taken?).".yellow());
    } else {
        println!("{}", format!("❌ {} bookings were accepted for the same slot!", created).red().bold());
    }
}

async fn run_stage(client: &Client, target: &Target, rps: u32) {
    let limiter = Arc::new(RateLimiter::direct(
        Quota::per_second(NonZeroU32::new(rps).unwrap())
    ));

    let (tx, mut rx) = mpsc::channel(50000);
    let start_time = Instant::now();
    let duration = Duration::from_secs(DURATION_SECS);

    loop {
        if start_time.elapsed() > duration {
            break;
        }

        if limiter.check().is_ok() {
            let client = client.clone();
            let url = target.url.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let req_start = Instant::now();
                let res = client.get(&url).send().await;
                let latency = req_start.elapsed();

                let success = match res {
                    Ok(r) => r.status().is_success(),
                    Err(_) => false,
                };

                let _ = tx.send((latency, success)).await;
            });
        } else {
            tokio::task::yield_now().await;
        }
    }

    drop(tx);

    let mut histogram = Histogram::<u64>::new(3).unwrap();
    let mut successes = 0;
    let mut total = 0;

    while let Some((latency, success)) = rx.recv().await {
        total += 1;
        if success { successes += 1; }
        histogram.record(latency.as_micros() as u64).unwrap();
    }

    let mean_ms = histogram.mean() / 1000.0;
    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;
    let success_rate = if total > 0 { (successes as f64 / total as f64) * 100.0 } else { 0.0 };

    println!(
        "{:<10} | {:<15.2} | {:<15.2} | {:<14.1}%",
        rps,
        mean_ms,
        p99_ms,
        success_rate
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
}
