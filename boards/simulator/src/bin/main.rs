#[macro_use]
extern crate log;

use std::io::{BufRead, BufReader, Read};

use env_logger::Env;
use jeepney_compass::config::{Config, Platform};
use simulator::{Event, Simulator};

fn load_config(matches: &clap::ArgMatches) -> Result<Config, String> {
    let mut config = match matches.value_of("config") {
        Some(path) => {
            let mut file = std::fs::File::open(path)
                .map_err(|e| format!("Read config file {} failed: {}", path, e))?;
            let mut buffer = String::new();
            file.read_to_string(&mut buffer).map_err(|_| "Unable to read config-file")?;
            serde_json::from_str(&buffer).map_err(|e| format!("Malformed config: {}", e))?
        }
        None => Config::default(),
    };
    config.validate().map_err(|e| format!("Invalid config: {}", e))?;
    if let Some(platform) = matches.value_of("platform") {
        config.platform =
            platform.parse::<Platform>().map_err(|_| format!("Unknown platform {}", platform))?;
    }
    Ok(config)
}

fn replay(simulator: &mut Simulator, input: impl BufRead) -> Result<(), String> {
    for (number, line) in input.lines().enumerate() {
        let line = line.map_err(|e| format!("Read input failed: {}", e))?;
        if line.trim().is_empty() {
            continue;
        }
        let event: Event = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                error!("Line {}: {}", number + 1, e);
                continue;
            }
        };
        match simulator.update(event) {
            Ok(estimate) => {
                if !estimate.is_directional() {
                    debug!("Line {}: no heading available", number + 1);
                }
                match serde_json::to_string(&estimate) {
                    Ok(json) => println!("{}", json),
                    Err(e) => error!("Line {}: {}", number + 1, e),
                }
            }
            Err(e) => error!("Line {}: {}", number + 1, e),
        }
    }
    Ok(())
}

fn run(matches: &clap::ArgMatches) -> Result<(), String> {
    let config = load_config(matches)?;
    info!("Replay with platform {:?}", config.platform);
    let mut simulator = Simulator::new(config, matches.is_present("sticky"));
    match matches.value_of("INPUT") {
        Some(path) => {
            let file = std::fs::File::open(path)
                .map_err(|e| format!("Open input {} failed: {}", path, e))?;
            replay(&mut simulator, BufReader::new(file))
        }
        None => replay(&mut simulator, std::io::stdin().lock()),
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let matches = clap::App::new("simulator")
        .version("0.1")
        .author("qiuchengxuan")
        .about("Replays recorded sensor events through the heading estimator")
        .arg(clap::Arg::with_name("config").long("config").help("Config file").takes_value(true))
        .arg(
            clap::Arg::with_name("platform")
                .long("platform")
                .help("android or ios")
                .takes_value(true),
        )
        .arg(
            clap::Arg::with_name("sticky")
                .long("sticky")
                .help("Keep delivering samples to released subscriptions"),
        )
        .arg(clap::Arg::with_name("INPUT").help("JSON lines event file, stdin if absent"))
        .get_matches();
    if let Err(error) = run(&matches) {
        error!("{}", error);
        std::process::exit(1);
    }
}
