// ABOUTME: Entry point for the act-container CLI application.
// ABOUTME: Builds the detector from config and flags, then dispatches subcommands.

mod cli;
mod output;

use act_container::config::Config;
use act_container::error::{Error, Result};
use act_container::runtime::{
    ContainerFactory, ContainerOps, ExecOps, ImageOps, NewContainerInput, Resolution,
    RuntimeDetector, RuntimeType,
};
use clap::Parser;
use cli::{Cli, Commands};
use output::{Output, OutputMode};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let out = Output::new(OutputMode::from_flags(cli.json, cli.quiet));

    match run(cli, &out).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            out.error(&e.to_string());
            std::process::exit(1);
        }
    }
}

fn build_factory(cli: &Cli) -> Result<ContainerFactory> {
    let cwd = std::env::current_dir()?;
    let config = Config::resolve(cli.config.as_deref(), &cwd)?
        .with_overrides(cli.container_runtime, cli.container_socket.clone());
    tracing::debug!(config = ?config, "effective configuration");

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let detector = RuntimeDetector::new()
        .with_probe_settings(config.probe_settings())
        .with_config(config.detector_config())
        .with_cancellation(cancel);
    Ok(ContainerFactory::new(Arc::new(detector)))
}

/// Returns `false` when the command ran but the answer is "nothing usable".
async fn run(cli: Cli, out: &Output) -> Result<bool> {
    let factory = build_factory(&cli)?;

    match cli.command {
        Commands::Detect => detect(&factory, out).await,
        Commands::Runtimes => {
            let runtimes = factory.available_runtimes().await;
            let text = runtimes
                .iter()
                .map(RuntimeType::as_str)
                .collect::<Vec<_>>()
                .join("\n");
            out.result(&text, &runtimes);
            Ok(!runtimes.is_empty())
        }
        Commands::Doctor => doctor(&factory, out).await,
        Commands::Socket { runtime } => {
            let uri = factory
                .detector()
                .socket_for_runtime(runtime)
                .await
                .ok_or_else(|| Error::NoSocket(runtime.to_string()))?;
            out.result(&uri, &SocketReport { runtime, socket: &uri });
            Ok(true)
        }
        Commands::Run {
            image,
            pull,
            cap_add,
            cap_drop,
            env,
            workdir,
            name,
            cmd,
        } => {
            let mut input = NewContainerInput::new(
                image,
                name.unwrap_or_else(|| format!("act-container-{}", std::process::id())),
            );
            input.entrypoint = vec!["tail".into(), "-f".into(), "/dev/null".into()];
            input.working_dir = workdir.clone().unwrap_or_default();
            input.auto_remove = false;

            let run = RunRequest {
                pull,
                cap_add,
                cap_drop,
                env: env.into_iter().collect(),
                workdir: workdir.unwrap_or_default(),
                cmd,
            };
            run_container(&factory, input, run, out).await?;
            Ok(true)
        }
    }
}

#[derive(Serialize)]
struct SocketReport<'a> {
    runtime: RuntimeType,
    socket: &'a str,
}

async fn detect(factory: &ContainerFactory, out: &Output) -> Result<bool> {
    let resolution: Resolution = factory.resolution().await;
    if !resolution.runtime.is_known() {
        let report = factory.detection_error().await;
        match out.mode() {
            OutputMode::Json => out.result("", &resolution),
            _ => eprintln!("{report}"),
        }
        return Ok(false);
    }

    let text = match out.mode() {
        OutputMode::Quiet => resolution.runtime.to_string(),
        _ => format!("{} ({})", resolution.runtime, resolution.source),
    };
    out.result(&text, &resolution);
    Ok(true)
}

#[derive(Serialize)]
struct DoctorReport {
    #[serde(flatten)]
    status: act_container::runtime::DetectionStatus,
    selected: Resolution,
}

async fn doctor(factory: &ContainerFactory, out: &Output) -> Result<bool> {
    let detector = factory.detector();
    let (status, selected) = tokio::join!(detector.detection_status(), factory.resolution());
    let usable = status.docker_available || status.podman_available;

    let text = if usable {
        let mark = |ok: bool| if ok { "✓" } else { "✗" };
        let docker = match &status.docker_socket {
            Some(socket) => format!("{} Docker (socket: {})", mark(status.docker_available), socket),
            None => "✗ Docker daemon not running (no socket found)".to_string(),
        };
        format!(
            "{}\n{} Podman\nSelected: {}",
            docker,
            mark(status.podman_available),
            selected.runtime
        )
    } else {
        status.to_string()
    };

    out.result(&text, &DoctorReport { status, selected });
    Ok(usable)
}

struct RunRequest {
    pull: bool,
    cap_add: Vec<String>,
    cap_drop: Vec<String>,
    env: HashMap<String, String>,
    workdir: String,
    cmd: Vec<String>,
}

async fn run_container(
    factory: &ContainerFactory,
    input: NewContainerInput,
    req: RunRequest,
    out: &Output,
) -> Result<()> {
    let container = factory.new_container(input).await;
    out.progress(&format!("Using {}", container.runtime()));

    out.progress(&format!("Pulling {}", container.input().image));
    container.pull(req.pull).await?;

    let result = async {
        container.create(&req.cap_add, &req.cap_drop).await?;
        container.start(false).await?;
        container.exec(&req.cmd, &req.env, "", &req.workdir).await
    }
    .await;

    if let Err(e) = container.remove().await {
        tracing::warn!("failed to remove container: {}", e);
    }
    if let Err(e) = container.close().await {
        tracing::debug!("failed to close connection: {}", e);
    }

    result.map_err(Error::from)
}
