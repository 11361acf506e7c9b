// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use chartboard_app::{BoardState, ChartName};
use chartboard_remote::Client;
use chartboard_testkit::MockStore;
use chartboard_tui::BoardOptions;
use config::Config;
use runtime::RemoteRuntime;
use std::env;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

const DEMO_ADDR: &str = "127.0.0.1:0";

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `chartboard --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let log_path = config.log_path()?;
    logging::init(&log_path, config.log_level()).with_context(|| {
        format!(
            "start logging to {} -- set [log].path to a writable file",
            log_path.display()
        )
    })?;

    // The demo store must outlive the board; dropping it stops the server.
    let demo_store = if options.demo {
        let store = MockStore::start_demo(DEMO_ADDR, demo_seed())
            .context("start demo chart store")?;
        tracing::info!(endpoint = store.endpoint(), "demo store listening");
        Some(store)
    } else {
        None
    };

    let endpoint = match (&demo_store, &options.endpoint) {
        (Some(store), _) => store.endpoint().to_owned(),
        (None, Some(endpoint)) => endpoint.clone(),
        (None, None) => config.endpoint(),
    };
    let client = Client::new(&endpoint, config.timeout()?).with_context(|| {
        format!(
            "invalid endpoint {endpoint:?}; fix [remote].endpoint in {} or pass --endpoint",
            options.config_path.display()
        )
    })?;

    let chart = match &options.chart {
        Some(raw) => Some(ChartName::new(raw).context("invalid --chart value")?),
        None => config.chart()?,
    };

    if options.check_only {
        tracing::info!(endpoint = %client.endpoint(), "configuration check passed");
        return Ok(());
    }

    tracing::info!(
        endpoint = %client.endpoint(),
        chart = chart.as_ref().map(ChartName::as_str),
        "starting board"
    );
    let mut state = BoardState::default();
    let mut runtime = RemoteRuntime::new(client);
    let result = chartboard_tui::run_app(&mut state, &mut runtime, BoardOptions { chart });
    drop(demo_store);
    result
}

fn demo_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() / 86_400)
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    chart: Option<String>,
    endpoint: Option<String>,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        chart: None,
        endpoint: None,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--chart" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--chart requires a chart name"))?;
                options.chart = Some(value.as_ref().to_owned());
            }
            "--endpoint" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--endpoint requires a URL"))?;
                options.endpoint = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("chartboard");
    println!("  --config <path>          Use a specific config path");
    println!("  --chart <name>           Open this chart instead of the store default");
    println!("  --endpoint <url>         Talk to this chart store endpoint");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Launch against a local store with sticker charts");
    println!("  --check                  Validate config, endpoint and logging, then exit");
    println!("  --help                   Show this help");
}
