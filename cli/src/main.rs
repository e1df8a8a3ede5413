use std::env;
use std::process::ExitCode;
use std::time::Duration;

use bookworm_core::{
    AssumeOnline, Book, BookSearchService, Connectivity, EndpointReachable, QueryEncoding,
    ScreenState, SearchConfig, SearchScreen,
};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: bookworm [--json] [--encode] <query>...";

/// Upper bound on the reachability check run before each search.
const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(3);

struct Args {
    query: String,
    json: bool,
    encode: bool,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut words = Vec::new();
    let mut json = false;
    let mut encode = false;
    for arg in args {
        match arg.as_str() {
            "--json" => json = true,
            "--encode" => encode = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}\n{USAGE}")),
            _ => words.push(arg),
        }
    }
    Ok(Args {
        query: words.join(" "),
        json,
        encode,
    })
}

fn print_books(books: &[Book]) {
    for (idx, book) in books.iter().enumerate() {
        println!("{:>3}. {}", idx + 1, book.title());
        if !book.subtitle().is_empty() {
            println!("     {}", book.subtitle());
        }
        if !book.author().is_empty() {
            println!("     by {}", book.author());
        }
    }
}

/// Check the search endpoint; a base URL that cannot be checked is left for
/// the search itself to report.
fn connectivity(config: &SearchConfig) -> Box<dyn Connectivity> {
    let timeout = CONNECTIVITY_TIMEOUT.min(config.connect_timeout);
    match EndpointReachable::for_url(&config.base_url, timeout) {
        Ok(endpoint) => Box::new(endpoint),
        Err(err) => {
            warn!(error = %err, "cannot check connectivity, assuming online");
            Box::new(AssumeOnline)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::from(2);
        }
    };

    let mut config = match SearchConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    if args.encode {
        config.query_encoding = QueryEncoding::Percent;
    }
    let service = BookSearchService::new(&config);

    let mut screen = SearchScreen::new();
    if let Some(query) = screen.submit(&args.query, &*connectivity(&config)) {
        screen.finish(service.search(&query));
    }

    match screen.state() {
        ScreenState::Results(books) if args.json => match serde_json::to_string_pretty(books) {
            Ok(out) => println!("{out}"),
            Err(err) => {
                error!(error = %err, "could not serialize results");
                return ExitCode::FAILURE;
            }
        },
        ScreenState::Results(books) => print_books(books),
        ScreenState::Empty(empty) if args.json => {
            eprintln!("{}", empty.message());
            println!("[]");
        }
        ScreenState::Empty(empty) => println!("{}", empty.message()),
        ScreenState::Loading => {}
    }
    ExitCode::SUCCESS
}
