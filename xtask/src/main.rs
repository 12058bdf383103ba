use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the twinfleet scene workspace",
    long_about = "A unified CLI for generating scenes locally, publishing them\n\
                  to S3, and running CI checks in the twinfleet scene workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the fleet and inspection scenes into a local directory
    Scenes {
        /// Number of vehicles in the fleet
        #[arg(long, default_value_t = 3)]
        vehicle_count: u32,
        /// Number of the first vehicle
        #[arg(long, default_value_t = 100)]
        vehicle_base: u32,
        /// Bucket URI written into asset and content locations
        #[arg(long, env = "TWINFLEET_BUCKET_URI", default_value = "s3://twinfleet-local")]
        bucket_uri: String,
        /// Output directory
        #[arg(long, default_value = "target/scenes")]
        output_dir: String,
    },
    /// Publish the scenes to an S3 bucket using ambient AWS credentials
    Publish {
        /// Destination bucket name
        #[arg(long, env = "TWINFLEET_S3_BUCKET")]
        s3_bucket: String,
        /// Number of vehicles in the fleet
        #[arg(long, default_value_t = 3)]
        vehicle_count: u32,
        /// Number of the first vehicle
        #[arg(long, default_value_t = 100)]
        vehicle_base: u32,
    },
    /// Run CI checks (fmt, clippy, tests, scene smoke run)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Generate scenes into target/ as a smoke test
    Scenes,
    /// Run check + scenes
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_publisher(extra: &[&str]) {
    let mut args = vec![
        "run",
        "--release",
        "-p",
        "twin_scene_deploy",
        "--bin",
        "publish_scenes",
        "--",
    ];
    args.extend_from_slice(extra);
    run_cargo(&args);
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test twin_scene_core");
    run_cargo(&["test", "-p", "twin_scene_core"]);

    step("Test twin_scene_deploy");
    run_cargo(&["test", "-p", "twin_scene_deploy"]);
}

fn ci_scenes() {
    step("Generate scenes (12 vehicles)");
    run_publisher(&[
        "--vehicle-count",
        "12",
        "--bucket-uri",
        "s3://twinfleet-ci",
        "--output-dir",
        "target/ci-scenes",
    ]);
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scenes {
            vehicle_count,
            vehicle_base,
            bucket_uri,
            output_dir,
        } => {
            let count = vehicle_count.to_string();
            let base = vehicle_base.to_string();
            run_publisher(&[
                "--vehicle-count",
                &count,
                "--vehicle-base",
                &base,
                "--bucket-uri",
                &bucket_uri,
                "--output-dir",
                &output_dir,
            ]);
        }
        Commands::Publish {
            s3_bucket,
            vehicle_count,
            vehicle_base,
        } => {
            let count = vehicle_count.to_string();
            let base = vehicle_base.to_string();
            let bucket_uri = format!("s3://{s3_bucket}");
            run_publisher(&[
                "--vehicle-count",
                &count,
                "--vehicle-base",
                &base,
                "--bucket-uri",
                &bucket_uri,
                "--s3-bucket",
                &s3_bucket,
            ]);
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Scenes => ci_scenes(),
                CiJob::All => {
                    ci_check();
                    ci_scenes();
                }
            }
            eprintln!("\nCI job passed.");
        }
    }
}
