#![allow(non_snake_case)]
use RustedBVP::Examples::bvp_examples::bvp_examples;
use RustedBVP::Utils::config::BVPConfig;
use log::error;
use std::path::Path;

/// Runs the worked examples.
/// Usage: `RustedBVP [config.toml] [plot_dir]`
fn main() {
    let args: Vec<String> = std::env::args().collect();
    let config = match args.get(1) {
        Some(path) => match BVPConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("cannot load configuration {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => BVPConfig::default(),
    };
    if let Err(e) = config.logging.init() {
        eprintln!("cannot initialise logging: {}", e);
        std::process::exit(1);
    }
    let plot_dir = args.get(2).map(Path::new);
    for example in 0..4 {
        if let Err(e) = bvp_examples(example, &config, plot_dir) {
            error!("example {} failed: {}", example, e);
            std::process::exit(1);
        }
    }
}
