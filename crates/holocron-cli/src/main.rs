use anyhow::{anyhow, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use holocron_cli::{
    cross_tab_report, load_answers, load_config, load_snapshot, load_template, pages_report,
    summary_report, MetricsReport,
};
use holocron_core::init_tracing;
use serde::Serialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};

fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

fn cli() -> Command {
    Command::new("holocron")
        .version(holocron_cli::VERSION)
        .about("Inspect ceremony templates and response snapshots")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Output as JSON"),
        )
        .subcommand(
            Command::new("pages")
                .about("Show a template's page layout")
                .arg(path_arg("template", "Template JSON file"))
                .arg(
                    Arg::new("answers")
                        .long("answers")
                        .value_parser(value_parser!(PathBuf))
                        .help("Answers JSON file; prints the pages visited"),
                ),
        )
        .subcommand(
            Command::new("health")
                .about("Compute team health metrics")
                .arg(path_arg("snapshot", "Snapshot JSON file (team_size, templates, responses)")),
        )
        .subcommand(
            Command::new("crosstab")
                .about("Cross-tabulate two questions")
                .arg(path_arg("snapshot", "Snapshot JSON file"))
                .arg(
                    Arg::new("group")
                        .long("group")
                        .required(true)
                        .help("Question id to group by"),
                )
                .arg(
                    Arg::new("target")
                        .long("target")
                        .required(true)
                        .help("Question id to tally"),
                ),
        )
        .subcommand(
            Command::new("summary")
                .about("Summarize one template's responses per question")
                .arg(path_arg("snapshot", "Snapshot JSON file"))
                .arg(
                    Arg::new("template-id")
                        .long("template-id")
                        .required(true)
                        .help("Template to summarize"),
                ),
        )
}

fn emit<T: Serialize + Display>(report: &T, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

fn path<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a Path> {
    args.get_one::<PathBuf>(name)
        .map(PathBuf::as_path)
        .with_context(|| format!("--{name} is required"))
}

fn text<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("--{name} is required"))
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let config = load_config(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    init_tracing(&config.logging);
    let json = matches.get_flag("json");

    match matches.subcommand() {
        Some(("pages", args)) => {
            let template = load_template(path(args, "template")?)?;
            let answers = args
                .get_one::<PathBuf>("answers")
                .map(|p| load_answers(p))
                .transpose()?;
            tracing::debug!(template_id = %template.id(), "laying out template");
            emit(&pages_report(&template, answers.as_ref()), json)
        }
        Some(("health", args)) => {
            let snapshot = load_snapshot(path(args, "snapshot")?)?;
            let metrics = holocron_analytics::team_health(&snapshot, chrono::Utc::now());
            emit(&MetricsReport(metrics), json)
        }
        Some(("crosstab", args)) => {
            let snapshot = load_snapshot(path(args, "snapshot")?)?;
            let report = cross_tab_report(&snapshot, text(args, "group")?, text(args, "target")?);
            emit(&report, json)
        }
        Some(("summary", args)) => {
            let snapshot = load_snapshot(path(args, "snapshot")?)?;
            let template_id = text(args, "template-id")?;
            let report = summary_report(&snapshot, template_id)
                .ok_or_else(|| anyhow!("template {template_id} is not in the snapshot"))?;
            emit(&report, json)
        }
        Some((other, _)) => Err(anyhow!("unknown command {other}")),
        None => Err(anyhow!("no command given")),
    }
}
