// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Global runtime-selection flags plus the inspection and run subcommands.

use act_container::runtime::RuntimeType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "act-container")]
#[command(about = "Container runtime resolution for local workflow runs on Docker and Podman")]
#[command(version)]
pub struct Cli {
    /// Container runtime to use: auto, docker or podman
    #[arg(long = "container-runtime", global = true, value_name = "RUNTIME")]
    pub container_runtime: Option<RuntimeType>,

    /// Socket to use instead of the detected one
    #[arg(long = "container-socket", global = true, value_name = "PATH")]
    pub container_socket: Option<String>,

    /// Configuration file (default: act-container.yml in the current directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit JSON instead of text
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub json: bool,

    /// Print only results
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show which runtime would be used and why
    Detect,

    /// List every runtime that is currently usable
    Runtimes,

    /// Report detection status for each runtime
    Doctor,

    /// Print the connection URI for a runtime
    Socket {
        /// docker or podman
        runtime: RuntimeType,
    },

    /// Run a command in a fresh container on the selected runtime
    Run {
        /// Image to run
        image: String,

        /// Pull even if the image exists locally
        #[arg(long)]
        pull: bool,

        /// Add a Linux capability
        #[arg(long = "cap-add", value_name = "CAP")]
        cap_add: Vec<String>,

        /// Drop a Linux capability
        #[arg(long = "cap-drop", value_name = "CAP")]
        cap_drop: Vec<String>,

        /// Environment variable for the command
        #[arg(short = 'e', long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
        env: Vec<(String, String)>,

        /// Working directory inside the container
        #[arg(long, value_name = "DIR")]
        workdir: Option<String>,

        /// Container name (default: derived from the process id)
        #[arg(long)]
        name: Option<String>,

        /// Command to run
        #[arg(last = true, required = true, value_name = "CMD")]
        cmd: Vec<String>,
    },
}

fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_pairs_split_on_first_equals() {
        assert_eq!(
            parse_env_pair("A=b=c"),
            Ok(("A".to_string(), "b=c".to_string()))
        );
        assert!(parse_env_pair("novalue").is_err());
        assert!(parse_env_pair("=x").is_err());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "act-container",
            "detect",
            "--container-runtime",
            "Podman",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.container_runtime, Some(RuntimeType::Podman));
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Detect));
    }

    #[test]
    fn run_takes_trailing_command() {
        let cli = Cli::try_parse_from([
            "act-container",
            "run",
            "alpine:3",
            "-e",
            "FOO=bar",
            "--cap-add",
            "SYS_PTRACE",
            "--",
            "echo",
            "hi",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                image,
                env,
                cap_add,
                cmd,
                ..
            } => {
                assert_eq!(image, "alpine:3");
                assert_eq!(env, vec![("FOO".to_string(), "bar".to_string())]);
                assert_eq!(cap_add, vec!["SYS_PTRACE".to_string()]);
                assert_eq!(cmd, vec!["echo".to_string(), "hi".to_string()]);
            }
            _ => panic!("expected run"),
        }
    }
}
