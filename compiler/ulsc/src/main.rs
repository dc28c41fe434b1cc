//! ULS lexer CLI
//!
//! Dumps the tokens of a file, records them as a token stream and replays
//! recorded streams.

mod commands;

use std::sync::Once;

use commands::{dump_tokens, record_file, replay_file};

static TRACING_INIT: Once = Once::new();

/// Enable with `RUST_LOG=uls_lexer=debug` or `RUST_LOG=uls=warn`.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Split `--preset NAME` / `--preset=NAME` out of the arguments.
fn take_preset(args: &[String]) -> (String, Vec<&str>) {
    let mut preset = "plain".to_owned();
    let mut rest = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(name) = arg.strip_prefix("--preset=") {
            name.clone_into(&mut preset);
        } else if arg == "--preset" {
            if let Some(name) = iter.next() {
                preset.clone_from(name);
            }
        } else {
            rest.push(arg.as_str());
        }
    }
    (preset, rest)
}

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];
    let (preset, rest) = take_preset(&args[2..]);

    match command.as_str() {
        "tokens" => {
            let [path] = rest[..] else {
                eprintln!("Usage: uls tokens [--preset NAME] <file>");
                std::process::exit(1);
            };
            dump_tokens(path, &preset);
        }
        "record" => {
            let [path, output] = rest[..] else {
                eprintln!("Usage: uls record [--preset NAME] <file> <out>");
                std::process::exit(1);
            };
            record_file(path, output, &preset);
        }
        "replay" => {
            let [path] = rest[..] else {
                eprintln!("Usage: uls replay <stream>");
                std::process::exit(1);
            };
            replay_file(path);
        }
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" | "-V" => println!("uls {}", env!("CARGO_PKG_VERSION")),
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("ULS lexer");
    println!();
    println!("Usage: uls <command> [options]");
    println!();
    println!("Commands:");
    println!("  tokens <file>          Tokenize a file and print its tokens");
    println!("  record <file> <out>    Record the tokens of a file as a token stream");
    println!("  replay <stream>        Print the tokens of a recorded stream");
    println!("  help                   Show this help message");
    println!("  version                Show version information");
    println!();
    println!("Options:");
    println!("  --preset <name>        Specification to use: {}", commands::PRESETS.join(", "));
    println!();
    println!("Examples:");
    println!("  uls tokens --preset css3 style.css");
    println!("  uls record main.c main.tok");
    println!("  uls replay main.tok");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=uls_lexer=debug) for diagnostics.");
}
