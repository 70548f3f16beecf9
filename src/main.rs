use clap::Parser;

use vex::cli::{Cli, Command, PluginCommand};
use vex::config::{self, Config};
use vex::logging;
use vex::{Plugin, Vagrant};

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let config = config::resolve_config(cli.config.as_deref())?;
    logging::init(cli.verbose, config.log_file());

    let vagrant = build_vagrant(&config);

    match cli.command {
        Command::Up => vagrant.up().await?,
        Command::Halt => vagrant.halt().await?,
        Command::Destroy => vagrant.destroy().await?,
        Command::Status => {
            let statuses = vagrant.status().await?;
            if cli.json {
                let rows: Vec<StatusJson> = statuses
                    .into_iter()
                    .map(|s| StatusJson {
                        name: s.name,
                        provider: s.provider,
                        state: s.state.to_string(),
                    })
                    .collect();
                println!(
                    "{}",
                    facet_json::to_string(&rows).expect("JSON serialization")
                );
            } else if statuses.is_empty() {
                println!("No machines found.");
            } else {
                let width = statuses.iter().map(|s| s.name.len()).max().unwrap_or(0);
                for s in &statuses {
                    println!("{:<width$}  {:<14} ({})", s.name, s.state, s.provider);
                }
            }
        }
        Command::Version => {
            let version = vagrant.version().await?;
            if cli.json {
                println!(
                    "{}",
                    facet_json::to_string(&VersionJson { version }).expect("JSON serialization")
                );
            } else {
                println!("{version}");
            }
        }
        Command::Ssh { command } => {
            let out = vagrant.ssh(&command).await?;
            print!("{out}");
        }
        Command::Plugin { action } => match action {
            PluginCommand::List => {
                let plugins = vagrant.plugin_list().await?;
                if cli.json {
                    let rows: Vec<PluginJson> = plugins
                        .into_iter()
                        .map(|p| PluginJson {
                            name: p.name,
                            version: p.version,
                            location: p.location,
                        })
                        .collect();
                    println!(
                        "{}",
                        facet_json::to_string(&rows).expect("JSON serialization")
                    );
                } else if plugins.is_empty() {
                    println!("No plugins installed.");
                } else {
                    for p in &plugins {
                        println!("{} {} ({})", p.name, p.version, p.location);
                    }
                }
            }
            PluginCommand::Install {
                name,
                plugin_version,
                local,
            } => {
                let plugin = Plugin {
                    name,
                    version: plugin_version.unwrap_or_default(),
                    location: if local { "local".into() } else { String::new() },
                };
                vagrant.plugin_install(&plugin).await?;
            }
        },
    }

    Ok(())
}

fn build_vagrant(config: &Config) -> Vagrant {
    Vagrant::with_runner(config.vagrant.binary.clone(), config.runner())
        .with_escapes(config.escapes())
}

// ── JSON output structs ─────────────────────────────────────────────

#[derive(facet::Facet)]
struct StatusJson {
    name: String,
    provider: String,
    state: String,
}

#[derive(facet::Facet)]
struct PluginJson {
    name: String,
    version: String,
    location: String,
}

#[derive(facet::Facet)]
struct VersionJson {
    version: String,
}
