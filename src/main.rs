// Copyright 2024-2026 vision-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! vision-bridge command-line entry point.
//!
//! Runs the same load / classify / close sequence a host application would,
//! which makes it handy for checking a model and label file before shipping.
//!
//! ## CLI Subcommands
//!
//! - `vision-bridge-cli classify MODEL LABELS IMAGE` - Classify one image
//! - `vision-bridge-cli config show` - Print effective configuration
//! - `vision-bridge-cli version` - Print version

use std::path::PathBuf;
use std::process::ExitCode;

use vision_bridge::bridge::{self, Reply};
use vision_bridge::config::{self as vb_config, EffectiveConfig, EnvConfig};
use vision_bridge::engine::Recognition;
use vision_bridge::telemetry::{init_logging, LogFormat};
use vision_bridge::Runtime;

const DEFAULT_TOP: i32 = 3;
const DEFAULT_THRESHOLD: f32 = 0.1;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match command {
        "classify" => match ClassifyArgs::parse(&args[2..]) {
            Ok(parsed) => run_classify(parsed),
            Err(msg) => {
                eprintln!("Error: {}", msg);
                print_command_help("classify");
                ExitCode::from(2u8)
            }
        },
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    let json_output = args.iter().skip(3).any(|a| a == "--json");
                    run_config_show(json_output)
                }
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_command_help("config");
                    ExitCode::FAILURE
                }
            }
        }
        "help" | "--help" | "-h" => {
            if let Some(subcommand) = args.get(2) {
                print_command_help(subcommand);
            } else {
                print_usage();
            }
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("vision-bridge {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

/// Parsed arguments for `classify`.
#[derive(Debug)]
struct ClassifyArgs {
    model: String,
    labels: String,
    image: String,
    top: i32,
    threshold: f32,
    json: bool,
    assets: Option<PathBuf>,
    threads: Option<usize>,
}

impl ClassifyArgs {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut positional = Vec::new();
        let mut top = DEFAULT_TOP;
        let mut threshold = DEFAULT_THRESHOLD;
        let mut json = false;
        let mut assets = None;
        let mut threads = None;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--top" => {
                    top = flag_value(&mut iter, "--top")?
                        .parse()
                        .map_err(|_| "--top expects an integer".to_string())?;
                }
                "--threshold" => {
                    threshold = flag_value(&mut iter, "--threshold")?
                        .parse()
                        .map_err(|_| "--threshold expects a number".to_string())?;
                }
                "--assets" => {
                    assets = Some(PathBuf::from(flag_value(&mut iter, "--assets")?));
                }
                "--threads" => {
                    let n: usize = flag_value(&mut iter, "--threads")?
                        .parse()
                        .map_err(|_| "--threads expects a positive integer".to_string())?;
                    threads = Some(n);
                }
                "--json" => json = true,
                flag if flag.starts_with("--") => {
                    return Err(format!("unknown option {}", flag));
                }
                value => positional.push(value.to_string()),
            }
        }

        let [model, labels, image]: [String; 3] = positional
            .try_into()
            .map_err(|_| "expected MODEL LABELS IMAGE".to_string())?;

        Ok(Self {
            model,
            labels,
            image,
            top,
            threshold,
            json,
            assets,
            threads,
        })
    }
}

fn flag_value<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<&'a str, String> {
    iter.next()
        .map(|s| s.as_str())
        .ok_or_else(|| format!("{} requires a value", flag))
}

fn load_config() -> Result<EnvConfig, ExitCode> {
    vb_config::load().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        ExitCode::from(2u8)
    })
}

fn run_classify(args: ClassifyArgs) -> ExitCode {
    let mut env = match load_config() {
        Ok(env) => env,
        Err(code) => return code,
    };
    if let Some(root) = args.assets {
        env.assets_root = root;
    }
    if let Some(n) = args.threads {
        env.num_threads = n;
    }

    // Interactive use: human-readable logs, warnings only unless overridden.
    if std::env::var(vb_config::ENV_LOG_FORMAT).is_err() {
        env.log.format = LogFormat::Pretty;
    }
    if std::env::var(vb_config::ENV_LOG_LEVEL).is_err() {
        env.log.level = "warn".to_string();
    }
    if let Err(e) = init_logging(&env.log) {
        eprintln!("Logging disabled: {}", e);
    }

    let runtime = Runtime::new(env.runtime_config());

    let loaded = bridge::load_model(&runtime, &args.model, &args.labels);
    let model_id = match (&loaded.error, &loaded.result) {
        (None, Some(id)) => id.clone(),
        _ => return report_failure(&loaded, args.json),
    };

    let reply = bridge::run_model_on_image(
        &runtime,
        &model_id,
        &args.image,
        args.top,
        args.threshold,
    );
    bridge::close(&runtime, &model_id);

    if args.json {
        println!("{}", reply.to_json());
        return if reply.is_ok() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    match (&reply.error, &reply.result) {
        (None, Some(results)) => {
            print_recognitions(results);
            ExitCode::SUCCESS
        }
        _ => report_failure(&reply, false),
    }
}

fn report_failure<T: serde::Serialize>(reply: &Reply<T>, json: bool) -> ExitCode {
    if json {
        println!("{}", reply.to_json());
    } else {
        eprintln!(
            "Error: {}",
            reply.error.as_deref().unwrap_or(bridge::DEFAULT_RUN_ERROR)
        );
    }
    ExitCode::FAILURE
}

fn print_recognitions(results: &[Recognition]) {
    if results.is_empty() {
        println!("No label above threshold.");
        return;
    }
    let width = results.iter().map(|r| r.label.len()).max().unwrap_or(0);
    for r in results {
        println!("{:<width$}  {:.4}", r.label, r.confidence, width = width);
    }
}

fn run_config_show(json_output: bool) -> ExitCode {
    let env = match load_config() {
        Ok(env) => env,
        Err(code) => return code,
    };
    let cfg = env.effective_config();
    if json_output {
        match serde_json::to_string_pretty(&cfg) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Failed to encode config: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_config(&cfg);
    }
    ExitCode::SUCCESS
}

fn print_config(cfg: &EffectiveConfig) {
    println!("{}={}", vb_config::ENV_ASSETS, cfg.assets_root);
    println!("{}={}", vb_config::ENV_NUM_THREADS, cfg.num_threads);
    println!("{}={}", vb_config::ENV_RESIZE_FILTER, cfg.resize_filter);
    println!("{}={}", vb_config::ENV_LOG_LEVEL, cfg.log_level);
    println!("{}={}", vb_config::ENV_LOG_FORMAT, cfg.log_format);
    println!(
        "{}={}",
        vb_config::ENV_CONFIG_FILE,
        cfg.config_file.as_deref().unwrap_or("")
    );
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "vision-bridge - On-device image classification v{}

USAGE:
    vision-bridge-cli [COMMAND] [OPTIONS]

COMMANDS:
    classify     Classify an image with a model and label file
    config       Show effective configuration
    version      Show version information
    help         Show this help message

EXAMPLES:
    vision-bridge-cli classify mobilenet.tflite labels.txt cat.jpg
    vision-bridge-cli classify m.tflite l.txt file:///tmp/cat.jpg --top 5 --json
    vision-bridge-cli config show --json

ENVIRONMENT:
    VISION_BRIDGE_ASSETS         Asset root directory (default: .)
    VISION_BRIDGE_NUM_THREADS    Engine threads per model (default: 1)
    VISION_BRIDGE_RESIZE_FILTER  triangle or nearest (default: triangle)
    VISION_BRIDGE_LOG_LEVEL      Tracing filter directive
    VISION_BRIDGE_LOG_FORMAT     json or pretty
    VISION_BRIDGE_CONFIG         TOML file applied over the environment

EXIT CODES:
    0  Success
    1  Load or inference failure
    2  Usage or configuration error
",
        version
    );
}

const CLASSIFY_HELP: &str = "vision-bridge-cli classify - Classify one image

USAGE:
    vision-bridge-cli classify MODEL LABELS IMAGE [OPTIONS]

ARGUMENTS:
    MODEL   Model file, relative to the asset root
    LABELS  Label file (one label per line), relative to the asset root
    IMAGE   Image path; a file:// prefix is accepted

OPTIONS:
    --top N          Maximum number of results (default: 3)
    --threshold T    Keep results with confidence above T (default: 0.1)
    --assets DIR     Override the asset root
    --threads N      Engine threads
    --json           Print the {error, result} reply as JSON

BACKEND:
    Classifying needs the TensorFlow Lite engine, which is an optional
    build feature. Build with `cargo build --features tflite`; otherwise
    every load fails with \"not compiled in\".

EXAMPLES:
    vision-bridge-cli classify mobilenet.tflite labels.txt cat.jpg
    vision-bridge-cli classify mobilenet.tflite labels.txt cat.jpg --threshold 0.5
";

/// Print detailed help for a specific command.
fn print_command_help(command: &str) {
    match command {
        "classify" => eprintln!("{}", CLASSIFY_HELP),
        "config" => {
            eprintln!(
                "vision-bridge-cli config - Show configuration

USAGE:
    vision-bridge-cli config show [--json]

DESCRIPTION:
    Prints the configuration after environment variables and the optional
    VISION_BRIDGE_CONFIG file have been applied.
"
            );
        }
        _ => {
            eprintln!("No detailed help for '{}'", command);
            print_usage();
        }
    }
}
