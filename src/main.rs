// src/main.rs
//! MLPerf efficiency analysis CLI
//! Renders the paper figures from the cleaned results tables

use clap::{Arg, ArgMatches, Command};
use mlperf_efficiency::figures;
use mlperf_efficiency::pipeline::PipelineSpec;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();
    let data_dir = dir_arg(&matches, "data-dir", "data");
    let out_dir = dir_arg(&matches, "out-dir", "figures");

    match matches.subcommand() {
        Some(("all", _)) => {
            figures::render_all(&data_dir, &out_dir)?;
            log::info!("all {} figures written to {}", figures::FIGURES.len(), out_dir.display());
        }
        Some(("pipeline-gen", sub_matches)) => {
            cmd_pipeline_gen(sub_matches)?;
        }
        Some((name, _)) => {
            let job = figures::by_name(name)
                .ok_or_else(|| anyhow::anyhow!("unknown figure `{name}`"))?;
            (job.render)(&data_dir, &out_dir)?;
        }
        None => {
            println!("mlperf-efficiency v0.1");
            println!("Use --help for available commands");
        }
    }

    Ok(())
}

fn dir_arg(matches: &ArgMatches, name: &str, default: &str) -> PathBuf {
    matches
        .get_one::<String>(name)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

fn cli() -> Command {
    let mut command = Command::new("mlperf-efficiency")
        .version("0.1.0")
        .about("Energy efficiency analysis of published MLPerf results")
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Directory holding the cleaned results tables")
                .default_value("data"),
        )
        .arg(
            Arg::new("out-dir")
                .long("out-dir")
                .value_name("DIR")
                .help("Directory the rendered figures are written to")
                .default_value("figures"),
        )
        .subcommand(Command::new("all").about("Render every figure"))
        .subcommand(
            Command::new("pipeline-gen")
                .about("Write the built-in pipeline configurations as TOML")
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("DIR")
                        .help("Output directory")
                        .default_value("config")),
        );
    for job in figures::FIGURES {
        command = command.subcommand(Command::new(job.name).about(job.about));
    }
    command
}

fn cmd_pipeline_gen(matches: &ArgMatches) -> anyhow::Result<()> {
    let output = dir_arg(matches, "output", "config");
    std::fs::create_dir_all(&output)?;
    for spec in [
        PipelineSpec::datacenter_inference(),
        PipelineSpec::edge_inference(),
        PipelineSpec::tiny(),
        PipelineSpec::training(),
    ] {
        let path = output.join(format!("{}.toml", spec.name));
        spec.save_to_file(&path)?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}
