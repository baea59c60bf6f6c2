// src/main.rs - DMP demo: imitate, replay, retarget and adapt a synthetic demonstration
use std::process::ExitCode;

use clap::Parser;
use dmp_rs::{AdaptOptions, DmpConfig, DmpError, DynamicMovementPrimitive, load_config, min_jerk};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "dmp-demo", about = "Learn and adapt a Dynamic Movement Primitive from a minimum-jerk demonstration")]
struct Args {
    /// TOML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Start position of the demonstration
    #[arg(long, default_value_t = 0.0)]
    start: f64,

    /// Goal position of the demonstration
    #[arg(long, default_value_t = 1.0)]
    demo_goal: f64,

    /// New goal used for retargeting and adaptation
    #[arg(short, long, default_value_t = 2.0)]
    goal: f64,

    /// Number of time samples over one second
    #[arg(long, default_value_t = 100)]
    time_samples: usize,

    /// Seed for the exploration noise (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report {
    time: Vec<f64>,
    demonstration: Vec<f64>,
    reproduction: Vec<f64>,
    retargeted: Vec<f64>,
    adapted: Option<Vec<f64>>,
    weights: Vec<f64>,
    adapted_weights: Option<Vec<f64>>,
    reward_trace: Vec<f64>,
    iterations: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            load_config(path)?
        }
        None => DmpConfig::default(),
    };
    if args.time_samples < 2 {
        return Err("need at least 2 time samples".into());
    }

    let dmp = DynamicMovementPrimitive::from_config(&config.model)?;
    tracing::info!(
        "Model: a = {}, ng = {}, stabilization {}",
        dmp.a(),
        dmp.basis_count(),
        if dmp.stabilize() { "on" } else { "off" }
    );

    let last = (args.time_samples - 1) as f64;
    let time: Vec<f64> = (0..args.time_samples).map(|i| i as f64 / last).collect();
    let s = dmp.phase(&time)?;
    let basis = dmp.distributions(&s, config.model.bandwidth)?;

    let demo = min_jerk(&[args.start], &[args.demo_goal], &time)?;
    let learned = dmp.imitate(&demo, &time, &s, &basis)?;
    let reproduction = dmp.generate(&learned.weights, &[args.start], &[args.demo_goal], &time, &s, &basis, &[])?;
    let retargeted = dmp.generate(&learned.weights, &[args.start], &[args.goal], &time, &s, &basis, &[])?;
    tracing::info!(
        "Reproduction ends at {:.4} (goal {}), retarget ends at {:.4} (goal {})",
        reproduction.goal()[0],
        args.demo_goal,
        retargeted.goal()[0],
        args.goal
    );

    let options = AdaptOptions::from_config(&config);
    let mut rng = match args.seed.or(config.adapt.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let (adapted, adapted_weights, reward_trace, iterations) =
        match dmp.adapt(&learned.weights, &[args.start], &[args.goal], &time, &s, &basis, &options, &mut rng) {
            Ok(adaptation) => {
                tracing::info!(
                    "Adapted rollout ends at {:.4} after {} iterations",
                    adaptation.trajectory.goal()[0],
                    adaptation.iterations
                );
                (
                    Some(adaptation.trajectory.column(0)),
                    Some(adaptation.weights.column(0)),
                    adaptation.reward_trace,
                    adaptation.iterations,
                )
            }
            Err(DmpError::NonConvergence {
                iterations,
                best_distance,
                reward_trace,
            }) => {
                tracing::warn!("No convergence in {} iterations (best distance {:.5})", iterations, best_distance);
                (None, None, reward_trace, iterations)
            }
            Err(e) => return Err(e.into()),
        };

    if args.json {
        let report = Report {
            demonstration: demo.column(0),
            reproduction: reproduction.column(0),
            retargeted: retargeted.column(0),
            adapted,
            weights: learned.weights.column(0),
            adapted_weights,
            reward_trace,
            iterations,
            time,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("weights:        {:?}", learned.weights.column(0));
        println!("reproduction:   {:.5}", reproduction.goal()[0]);
        println!("retargeted:     {:.5}", retargeted.goal()[0]);
        match &adapted {
            Some(x) => println!("adapted:        {:.5} ({} iterations)", x[x.len() - 1], iterations),
            None => println!("adapted:        did not converge in {} iterations", iterations),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_samples_flag() {
        let args = Args::try_parse_from(["dmp-demo", "--time-samples", "50", "--seed", "4"]).unwrap();
        assert_eq!(args.time_samples, 50);
        assert_eq!(args.seed, Some(4));
        assert!(Args::try_parse_from(["dmp-demo", "--samples", "50"]).is_err());
    }

    #[test]
    fn test_too_few_time_samples() {
        let args = Args::try_parse_from(["dmp-demo", "--time-samples", "1"]).unwrap();
        assert!(run(&args).is_err());
    }
}
