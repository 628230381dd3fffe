//! Command-line interface for textpress
//! This binary runs text cleanup pipelines from the shell.
//!
//! Usage:
//!   textpress run <text> --ops <name>[,<name>...] [--args <json>]  - Run a custom pipeline
//!   textpress default <text>                                       - Run the preset cleanup pipeline
//!   textpress request <path>                                       - Run a JSON request file
//!   textpress list-ops                                             - List all available operations

use clap::{Arg, Command};
use textpress::{ArgsByName, OperationRegistry, PipelineRequest, PipelineRunner};

fn main() {
    let matches = Command::new("textpress")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for cleaning and normalizing text through operation pipelines")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Run a custom operation pipeline over the given text")
                .arg(
                    Arg::new("text")
                        .help("The text to process")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("ops")
                        .long("ops")
                        .short('o')
                        .help("Comma-separated operation names, applied in order")
                        .required(true),
                )
                .arg(
                    Arg::new("args")
                        .long("args")
                        .short('a')
                        .help("Per-operation arguments as a JSON object keyed by operation name"),
                ),
        )
        .subcommand(
            Command::new("default")
                .about("Run the preset cleanup pipeline over the given text")
                .arg(
                    Arg::new("text")
                        .help("The text to process")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("request")
                .about("Run a pipeline described by a JSON request file")
                .arg(
                    Arg::new("path")
                        .help("Path to a JSON file with text, operations, and optional args")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(Command::new("list-ops").about("List available operations by capability group"))
        .get_matches();

    // Handle subcommands
    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let text = run_matches.get_one::<String>("text").unwrap();
            let ops = run_matches.get_one::<String>("ops").unwrap();
            let args = run_matches.get_one::<String>("args").map(String::as_str);
            handle_run_command(text, ops, args);
        }
        Some(("default", default_matches)) => {
            let text = default_matches.get_one::<String>("text").unwrap();
            handle_default_command(text);
        }
        Some(("request", request_matches)) => {
            let path = request_matches.get_one::<String>("path").unwrap();
            handle_request_command(path);
        }
        Some(("list-ops", _)) => {
            handle_list_ops_command();
        }
        _ => unreachable!(),
    }
}

/// Handle the run command
fn handle_run_command(text: &str, ops: &str, args: Option<&str>) {
    let operations: Vec<&str> = ops
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    if operations.is_empty() {
        eprintln!("Error: no operations given");
        std::process::exit(1);
    }

    let args: ArgsByName = match args {
        Some(json) => serde_json::from_str(json).unwrap_or_else(|e| {
            eprintln!("Error parsing --args: {}", e);
            std::process::exit(1);
        }),
        None => ArgsByName::new(),
    };

    let runner = PipelineRunner::new();
    let output = runner.run(text, &operations, &args).unwrap_or_else(|e| {
        eprintln!("Pipeline error: {}", e);
        std::process::exit(1);
    });

    println!("{}", output);
}

/// Handle the default command
fn handle_default_command(text: &str) {
    let runner = PipelineRunner::new();
    let output = runner.run_default(text).unwrap_or_else(|e| {
        eprintln!("Pipeline error: {}", e);
        std::process::exit(1);
    });

    println!("{}", output);
}

/// Handle the request command
fn handle_request_command(path: &str) {
    let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    });

    let request: PipelineRequest = serde_json::from_str(&source).unwrap_or_else(|e| {
        eprintln!("Error parsing request: {}", e);
        std::process::exit(1);
    });
    if let Err(e) = request.validate() {
        eprintln!("Invalid request: {}", e);
        std::process::exit(1);
    }

    let runner = PipelineRunner::new();
    let output = runner
        .run(&request.text, &request.operations, &request.args)
        .unwrap_or_else(|e| {
            eprintln!("Pipeline error: {}", e);
            std::process::exit(1);
        });

    println!("{}", output);
}

/// Handle the list-ops command
fn handle_list_ops_command() {
    let registry = OperationRegistry::with_defaults();
    println!("Available operations:\n");
    for group in registry.groups() {
        println!("  {}", group.name());
        for operation in group.operations() {
            println!("    {:<32} {}", operation.name(), operation.description());
        }
        println!();
    }
}
