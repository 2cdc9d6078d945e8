use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, Command};
use loadshape_control::{ConfigSynchronizer, HttpConfigService};
use loadshape_schema::{codec, StagePlan};

const STAGES_PARAM: &str = "STAGES_JSON";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Command::new("loadshapectl")
        .version(loadshape_control::VERSION)
        .about("Load shape configuration control")
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .default_value("http://localhost:8080")
                .help("Base URL of the load generator controller API"),
        )
        .subcommand_required(true)
        .subcommand(Command::new("status").about("Show the shape catalog and current configuration"))
        .subcommand(
            Command::new("apply")
                .about("Apply configuration and restart the load generator")
                .arg(
                    Arg::new("shape")
                        .long("shape")
                        .help("Shape key to activate (parameters reset to its defaults)"),
                )
                .arg(
                    Arg::new("set")
                        .long("set")
                        .action(ArgAction::Append)
                        .value_name("NAME=VALUE")
                        .help("Override one parameter of the active shape"),
                )
                .arg(
                    Arg::new("noise")
                        .long("noise")
                        .value_parser(value_parser!(f64))
                        .help("Noise percentage applied to user counts (0-100)"),
                )
                .arg(
                    Arg::new("add-stage")
                        .long("add-stage")
                        .action(ArgAction::Count)
                        .help("Append a stage to the active shape's stage list (repeatable)"),
                ),
        )
        .subcommand(
            Command::new("restart")
                .about("Restart the load generator without changing configuration"),
        );

    let matches = cli.get_matches();
    let base_url = matches.get_one::<String>("base-url").unwrap().clone();
    let sync = ConfigSynchronizer::new(HttpConfigService::new(base_url)?);

    match matches.subcommand() {
        Some(("status", _)) => {
            sync.load().await?;
            print_status(&sync).await;
        }
        Some(("apply", args)) => {
            sync.load().await?;

            if let Some(shape) = args.get_one::<String>("shape") {
                sync.select_shape(shape).await?;
            }
            if let Some(noise) = args.get_one::<f64>("noise") {
                sync.set_noise_percent(*noise).await?;
            }
            if let Some(overrides) = args.get_many::<String>("set") {
                apply_overrides(&sync, overrides).await?;
            }
            let added = args.get_count("add-stage");
            if added > 0 {
                add_stages(&sync, added).await?;
            }

            sync.apply().await?;
            println!("Configuration applied. Load generator is restarting.");
        }
        Some(("restart", _)) => {
            sync.restart_only().await?;
            println!("Load generator is restarting.");
        }
        _ => {}
    }

    Ok(())
}

async fn apply_overrides(
    sync: &ConfigSynchronizer,
    overrides: clap::parser::ValuesRef<'_, String>,
) -> anyhow::Result<()> {
    let catalog = sync.catalog().await.context("no catalog loaded")?;
    let draft = sync.draft().await.context("no configuration loaded")?;
    let shape = catalog.require(draft.active_shape())?;

    for entry in overrides {
        let Some((name, raw)) = entry.split_once('=') else {
            bail!("--set expects NAME=VALUE, got '{entry}'");
        };
        let Some(def) = shape.parameter(name) else {
            bail!("shape '{}' has no parameter '{name}'", shape.key);
        };
        let value = codec::decode_raw(raw, def)?;
        sync.set_parameter(name, value).await?;
    }
    Ok(())
}

async fn add_stages(sync: &ConfigSynchronizer, count: u8) -> anyhow::Result<()> {
    let draft = sync.draft().await.context("no configuration loaded")?;
    let value = draft
        .value(STAGES_PARAM)
        .with_context(|| format!("shape '{}' has no stage list", draft.active_shape()))?;

    let mut plan = StagePlan::from_value(value)?;
    for _ in 0..count {
        plan = plan.push_stage();
    }
    sync.set_parameter(STAGES_PARAM, plan.to_value()).await?;
    Ok(())
}

async fn print_status(sync: &ConfigSynchronizer) {
    let Some(catalog) = sync.catalog().await else {
        return;
    };
    let Some(draft) = sync.draft().await else {
        return;
    };

    println!("Available shapes:");
    for (key, shape) in catalog.iter() {
        let marker = if key == draft.active_shape() { "*" } else { " " };
        println!("  {marker} {key:<12} {}", shape.name);
    }
    println!();
    println!("Active shape: {}", draft.active_shape());
    println!("Noise percent: {}", draft.noise_percent());
    println!("Parameters:");
    for (name, value) in draft.values() {
        println!("  {name} = {}", value.encode());
    }

    if let Some(snapshot) = sync.snapshot().await {
        if let (Some(deployment), Some(namespace)) =
            (snapshot.deployment_name, snapshot.namespace)
        {
            println!();
            println!("Deployment: {deployment} (namespace {namespace})");
        }
    }
}
