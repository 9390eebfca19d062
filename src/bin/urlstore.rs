//! The urlstore executable works directly on a record log file and supports the following
//! command line arguments:
//!
//! `urlstore [--file PATH] [--strict] [--sync] add <URL>`
//!
//!     Register a url and print its short key.
//!     --strict fails the command, instead of only logging a warning, if the record could not be
//!     written to the log. --sync syncs the log to disk after the record is written.
//!
//! `urlstore [--file PATH] get <KEY>`
//!
//!     Print the url registered under the given key, or "Key not found".
//!
//! `urlstore [--file PATH] count`
//!
//!     Print the number of keys in the store.
//!
//! If --file is not specified then the "urls.log" file in the current directory is used.
//! Print an error and return a non-zero exit code if the record log can not be opened.

use std::path::PathBuf;
use std::process::exit;

use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use urlstore::{
    Durability, Result, StoreConfig, UrlEngine, UrlStore, UrlStoreError, DEFAULT_LOG_FILE,
};

/// the operations that can be requested from the command line
#[derive(Debug)]
enum Request {
    Add { url: String },
    Get { key: String },
    Count,
}

/// ['Opt'] holds parsed options from the command line
#[derive(Debug)]
struct Opt {
    config: StoreConfig,
    req: Request,
}

fn main() {
    let matches = App::new("urlstore")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("a persistent url shortening store")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommands(vec![
            SubCommand::with_name("add")
                .about("Register a url and print its short key")
                .arg(Arg::with_name("URL").required(true).index(1)),
            SubCommand::with_name("get")
                .about("Print the url registered under a short key")
                .arg(Arg::with_name("KEY").required(true).index(1)),
            SubCommand::with_name("count").about("Print the number of registered urls"),
        ])
        .arg(Arg::with_name("file")
            .long("file")
            .value_name("PATH")
            .help("sets the record log file to use")
            .default_value(DEFAULT_LOG_FILE))
        .arg(Arg::with_name("strict")
            .long("strict")
            .help("fail if a new record can not be written to the log"))
        .arg(Arg::with_name("sync")
            .long("sync")
            .help("sync the log to disk after every write"))
        .arg(Arg::with_name("verbose")
            .short("v")
            .long("verbose")
            .help("log debug output to stderr"))
        .get_matches();

    // set up a tracing subscriber to log to STDERR
    subscriber_config(matches.is_present("verbose"));

    let opt = match parse_options(&matches) {
        Ok(opt) => opt,
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    };

    if let Err(e) = run(opt) {
        eprintln!("{}", e);
        exit(1);
    }
}

/// opens the store and runs the requested operation against it
fn run(opt: Opt) -> Result<()> {
    let store = UrlStore::with_config(opt.config)?;
    match opt.req {
        Request::Add { url } => {
            println!("{}", store.register(url)?);
        }
        Request::Get { key } => {
            if let Some(url) = store.resolve(&key)? {
                println!("{}", url);
            } else {
                println!("Key not found");
            }
        }
        Request::Count => println!("{}", store.size()?),
    }
    Ok(())
}

/// parses the matches from the command line into an [`Opt`] struct
fn parse_options(matches: &ArgMatches) -> Result<Opt> {
    let path = matches
        .value_of("file")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    let durability = if matches.is_present("strict") {
        Durability::Strict
    } else {
        Durability::BestEffort
    };
    let config = StoreConfig::new(path)
        .durability(durability)
        .sync_on_append(matches.is_present("sync"));

    let req = match matches.subcommand() {
        ("add", Some(args)) => Request::Add {
            url: value(args, "URL")?,
        },
        ("get", Some(args)) => Request::Get {
            key: value(args, "KEY")?,
        },
        ("count", Some(_)) => Request::Count,
        (other, _) => {
            return Err(UrlStoreError::Parsing(format!(
                "unknown command: '{}', see --help",
                other
            )))
        }
    };

    Ok(Opt { config, req })
}

/// returns the value of the required argument `name`
fn value(args: &ArgMatches, name: &str) -> Result<String> {
    args.value_of(name)
        .map(String::from)
        .ok_or_else(|| UrlStoreError::Parsing(format!("missing argument {}", name)))
}

/// configures a tracing subscriber that will log to STDERR
fn subscriber_config(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        // all spans/events at `level` or more severe will be written out
        .with_max_level(level)
        // log to stderr instead of stdout, stdout is for results
        .with_writer(std::io::stderr)
        // completes the builder.
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting tracing default subscriber failed");
}
