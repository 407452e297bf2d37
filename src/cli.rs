use clap::{Arg, ArgMatches, Command};

use crate::config::AppConfig;
use crate::db::ConnectionManager;
use crate::errors::ServiceError;
use crate::setup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Serve,
    Probe { uri: Option<String> },
    Init { uri: Option<String> },
}

fn uri_arg() -> Arg {
    Arg::new("uri")
        .long("uri")
        .help("Connection string (defaults to MONGODB_URI)")
        .value_name("URI")
}

pub fn cli() -> Command {
    Command::new("docbroker")
        .about("Document database status and first-run setup service")
        .subcommand(Command::new("serve").about("Run the HTTP server (default)"))
        .subcommand(
            Command::new("probe")
                .about("Check connectivity and print server diagnostics")
                .arg(uri_arg()),
        )
        .subcommand(
            Command::new("init")
                .about("Create the required collections and the seed admin record")
                .arg(uri_arg()),
        )
}

fn invocation_from(matches: &ArgMatches) -> Invocation {
    let uri = |sub: &ArgMatches| sub.get_one::<String>("uri").cloned();

    match matches.subcommand() {
        Some(("probe", sub_matches)) => Invocation::Probe {
            uri: uri(sub_matches),
        },
        Some(("init", sub_matches)) => Invocation::Init {
            uri: uri(sub_matches),
        },
        _ => Invocation::Serve,
    }
}

pub fn parse() -> Invocation {
    invocation_from(&cli().get_matches())
}

pub fn try_parse_from<I, T>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Ok(invocation_from(&cli().try_get_matches_from(args)?))
}

/// Runs a one-shot command and prints its outcome. `Serve` is a no-op here.
pub async fn run(
    invocation: &Invocation,
    config: &AppConfig,
    connections: &ConnectionManager,
) -> Result<(), ServiceError> {
    match invocation {
        Invocation::Serve => {}
        Invocation::Probe { uri } => {
            let target = config.resolve_target(uri.as_deref())?;
            let report = connections.probe(&target).await?;

            println!("Connected to {}", target);
            println!("Client: {}", report.client_type);
            println!("Version: {}", report.db_version);
            println!("Database: {}", report.db_name);
        }
        Invocation::Init { uri } => {
            let report = setup::initialize_target(config, connections, uri.as_deref()).await?;

            if report.created.is_empty() {
                println!("All required collections already present");
            } else {
                println!("Created collections: {}", report.created.join(", "));
            }
            if report.seeded {
                println!("Seed admin record inserted");
            }
            println!("Collections: {}", report.collections.join(", "));
        }
    }

    Ok(())
}
