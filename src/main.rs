use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use gallerist::config::Config;
use gallerist::filter::sort_options;
use gallerist::{db, logging, ListingService, SqliteDb};

enum Command {
    Init,
    List(String),
    Artists,
    Image(i64),
    SortOptions,
}

struct Args {
    config_path: Option<PathBuf>,
    command: Command,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path = None;
    let mut positional = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("gallerist {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            arg => positional.push(arg.to_string()),
        }
        i += 1;
    }

    let command = match positional.first().map(String::as_str) {
        Some("init") => Command::Init,
        Some("list") | None => Command::List(positional.get(1).cloned().unwrap_or_default()),
        Some("artists") => Command::Artists,
        Some("sort-options") => Command::SortOptions,
        Some("image") => match positional.get(1).and_then(|id| id.parse().ok()) {
            Some(id) => Command::Image(id),
            None => {
                eprintln!("Error: image requires a numeric id");
                std::process::exit(1);
            }
        },
        Some(other) => {
            eprintln!("Unknown command: {other}");
            print_help();
            std::process::exit(1);
        }
    };

    Args {
        config_path,
        command,
    }
}

fn print_help() {
    println!(
        r#"gallerist - metric-aware image gallery listings

USAGE:
    gallerist [OPTIONS] [COMMAND]

COMMANDS:
    list [QUERY]        List images for a URL query string (default)
                        e.g. 'artist=ansel&h_min=350&h_max=10&page=2'
    artists             List distinct artists
    image ID            Show one image with all metrics
    sort-options        List valid sortKey values
    init                Create the database schema

OPTIONS:
    --config, -c PATH   Path to config file
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    GALLERIST_CONFIG    Path to config file (overrides default location)
    GALLERIST_LOG       Log filter (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/gallerist/config.toml"#
    );
}

fn open_service(config: &Config) -> Result<ListingService<SqliteDb>> {
    let store = db::open(config)?;
    Ok(ListingService::new(store, config.listing.clone()))
}

fn main() -> Result<()> {
    let args = parse_args();

    let _ = logging::init(None);

    let config = match &args.config_path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load()?,
    };

    match args.command {
        Command::Init => {
            db::open(&config)?;
            println!("Database ready at {}", config.db_path.display());
        }
        Command::List(query) => match open_service(&config)?.list_query(&query) {
            Ok(page) => println!("{}", serde_json::to_string_pretty(&page)?),
            Err(e) => bail!("{}", e.user_message()),
        },
        Command::Artists => match open_service(&config)?.artists() {
            Ok(artists) => println!("{}", serde_json::to_string_pretty(&artists)?),
            Err(_) => bail!("Failed to fetch artists."),
        },
        Command::Image(id) => match open_service(&config)?.image(id) {
            Ok(Some(image)) => println!("{}", serde_json::to_string_pretty(&image)?),
            Ok(None) => bail!("No image with id {id}"),
            Err(e) => bail!("{}", e.user_message()),
        },
        Command::SortOptions => {
            for option in sort_options() {
                println!("{:<12} {:<40} {}", option.group, option.label, option.key);
            }
        }
    }

    Ok(())
}
