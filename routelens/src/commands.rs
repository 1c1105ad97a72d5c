use crate::CLAP_STYLING;
use clap::{arg, command};
use std::path::PathBuf;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("routelens")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("routelens")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Log pipeline decisions (dropped hops, stale results) to stderr")
                .required(false),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Writes a default routelens config file")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Directory to store the routelens config in")
                        .default_value("~/.config/routelens/"),
                )
                .arg(
                    arg!(-f --"force")
                        .help("Overwrite an existing config file at the specified location.")
                        .required(false),
                ),
        )
        .subcommand(
            command!("render")
                .about(
                    "Builds the route map and summary for one target from retrieved trace and \
                history files, and prints it as a report.",
                )
                .arg(
                    arg!(-t --"trace" <PATH>)
                        .required(false)
                        .help("Path to a trace document (JSON object with a hops array)")
                        .value_parser(clap::value_parser!(PathBuf))
                        .conflicts_with("mtr"),
                )
                .arg(
                    arg!(-m --"mtr" <PATH>)
                        .required(false)
                        .help("Path to an `mtr --json` report to use as the trace")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-H --"history" <PATH>)
                        .required(false)
                        .help("Path to a JSON array of metric samples, oldest first")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-T --"target" <NAME>)
                        .required(false)
                        .help("Target name shown in the report (defaults to the trace's target)"),
                )
                .arg(
                    arg!(-l --"lang" <LANG>)
                        .required(false)
                        .help("Place name language for labels")
                        .value_parser(["primary", "fallback"]),
                )
                .arg(
                    arg!(-F --"format" <FORMAT>)
                        .required(false)
                        .help("Report format")
                        .value_parser(["text", "json", "markdown", "md"]),
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("Config file to read (defaults to ~/.config/routelens/config.json)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Write the report to a file instead of stdout")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}
