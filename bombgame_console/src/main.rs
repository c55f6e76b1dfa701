// Legend for various fix-this comments:
//   * "TODO" - bug or missing crucial feature.
//   * "Improvement potential" - missing nice-to-have feature or an opportunity
//       to make code better or faster.

#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

mod keyboard;
mod menu;
mod session_main;
mod tui;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use bombgame::role::Role;
use bombgame::session::{SessionConfig, SessionPreset};
use clap::{Command, arg};


fn init_logging(log_file: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Cannot open log file {}", log_file.display()))?;
    // The terminal belongs to the game, so logs go to the file only.
    env_logger::Builder::new()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    Ok(())
}

fn read_config_file(filename: &Path) -> anyhow::Result<SessionConfig> {
    let contents = std::fs::read_to_string(filename)
        .with_context(|| format!("Reading config file {}", filename.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Parsing config file {}", filename.display()))
}

fn main() -> anyhow::Result<ExitCode> {
    let matches = Command::new("Bombgame")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .about("Pass the bomb before it explodes: a two-player game over TCP")
        .arg(
            arg!(--"config" <config_file> "Configuration file: yaml-serialized SessionConfig.")
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"log-file" <log_file> "Where to append logs.")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("bombgame.log"),
        )
        .arg(
            arg!(--"name" <player_name> "Player name. Asked interactively if omitted.")
                .required(false),
        )
        .arg(
            arg!(--"tick" <duration> "Hold loop period and countdown drained per hold, e.g. 100ms")
                .required(false)
                .value_parser(humantime::parse_duration),
        )
        .arg(
            arg!(--"input-timeout" <duration> "Keyboard silence that counts as a release, e.g. 750ms")
                .required(false)
                .value_parser(humantime::parse_duration),
        )
        .subcommand(Command::new("host").about("Host a new game"))
        .subcommand(
            Command::new("join")
                .about("Join a hosted game")
                .arg(arg!(<address> "Host address as IP:PORT")),
        )
        .get_matches();

    init_logging(matches.get_one::<PathBuf>("log-file").unwrap())?;

    let mut session = match matches.get_one::<PathBuf>("config") {
        Some(config_file) => read_config_file(config_file)?,
        None => SessionConfig::default(),
    };
    if let Some(&tick) = matches.get_one::<Duration>("tick") {
        session.tick = tick;
    }
    if let Some(&input_timeout) = matches.get_one::<Duration>("input-timeout") {
        session.input_timeout = input_timeout;
    }
    session.validate().map_err(|err| anyhow::anyhow!("Invalid configuration: {err}"))?;

    let mut preset = SessionPreset {
        player_name: matches.get_one::<String>("name").cloned(),
        ..SessionPreset::default()
    };
    match matches.subcommand() {
        Some(("host", _)) => {
            preset.role = Some(Role::Initiator);
        }
        Some(("join", sub_matches)) => {
            preset.role = Some(Role::Joiner);
            preset.peer_address = sub_matches.get_one::<String>("address").cloned();
        }
        None => {}
        _ => unreachable!("Exhausted list of subcommands"),
    }

    Ok(session_main::run(session_main::SessionMainConfig { preset, session }))
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn partial_yaml_config_keeps_defaults() {
        let config: SessionConfig = serde_yaml::from_str(
            "tick: 50ms\ncountdown_range:\n  start: 5\n  end: 10\n",
        )
        .unwrap();
        assert_eq!(config, SessionConfig {
            tick: Duration::from_millis(50),
            countdown_range: 5..10,
            ..SessionConfig::default()
        });
        assert_eq!(config.validate(), Ok(()));
    }
}
