//! Endpoint catalog CLI
//!
//! Command-line interface for building, parsing and validating endpoint URIs
//! against a catalog of component schemas.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use endpoint_catalog::{
    lint, parse_time_pattern, Catalog, CatalogError, DirectorySchemaSource, FileStatus,
    LevenshteinSuggestions, LintResult, Severity, ValidateOptions,
};
use indexmap::IndexMap;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "endpoint-catalog")]
#[command(about = "Build, parse and validate endpoint URIs from component schemas")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Catalog directory containing components/, models/, dataformats/ and languages/
    #[arg(long, global = true, default_value = "catalog")]
    catalog: PathBuf,

    /// Catalog base URL (http:// or https://), takes precedence over --catalog
    #[cfg(feature = "remote")]
    #[arg(long, global = true)]
    catalog_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an endpoint URI from a scheme and options
    Uri {
        /// Component scheme (e.g., timer, ftp)
        scheme: String,

        /// Options as KEY=VALUE pairs, in query order
        #[arg(value_parser = parse_key_val)]
        options: Vec<(String, String)>,

        /// Use &amp; between query parameters (for XML)
        #[arg(long)]
        xml: bool,

        /// Percent-encode option values
        #[arg(long)]
        encode: bool,
    },

    /// Parse an endpoint URI into its options
    Parse {
        /// Endpoint URI
        uri: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate an endpoint URI against its component schema
    Validate {
        /// Endpoint URI
        uri: String,

        /// Validate lenient components strictly
        #[arg(long)]
        ignore_lenient: bool,

        /// Validate as a consumer endpoint
        #[arg(long, conflicts_with = "producer_only")]
        consumer_only: bool,

        /// Validate as a producer endpoint
        #[arg(long, conflicts_with = "consumer_only")]
        producer_only: bool,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Check a time pattern (e.g., 500, 5s, 1h30m) and print its milliseconds
    TimePattern {
        /// Time pattern text
        text: String,
    },

    /// Print the raw schema of a catalog entry
    Schema {
        /// Kind of catalog entry
        #[arg(value_enum)]
        kind: SchemaKindArg,

        /// Scheme or name
        name: String,
    },

    /// Lint catalog schema files (syntax, document contract, syntax segments)
    Lint {
        /// File or directory to lint
        path: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaKindArg {
    Component,
    Model,
    Dataformat,
    Language,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got \"{s}\""))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Uri {
            scheme,
            options,
            xml,
            encode,
        } => open_catalog(&cli.source)
            .and_then(|catalog| run_uri(&catalog, &scheme, options, xml, encode)),

        Commands::Parse { uri, pretty } => {
            open_catalog(&cli.source).and_then(|catalog| run_parse(&catalog, &uri, pretty))
        }

        Commands::Validate {
            uri,
            ignore_lenient,
            consumer_only,
            producer_only,
            json,
        } => {
            let options = ValidateOptions::new()
                .ignore_lenient(ignore_lenient)
                .consumer_only(consumer_only)
                .producer_only(producer_only);
            open_catalog(&cli.source)
                .and_then(|catalog| run_validate(&catalog, &uri, &options, json))
        }

        Commands::TimePattern { text } => run_time_pattern(&text),

        Commands::Schema { kind, name } => {
            open_catalog(&cli.source).and_then(|catalog| run_schema(&catalog, kind, &name))
        }

        Commands::Lint {
            path,
            format,
            strict,
            quiet,
        } => run_lint(&path, &format, strict, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn open_catalog(args: &SourceArgs) -> Result<Catalog, u8> {
    let suggestions = Arc::new(LevenshteinSuggestions::new());

    #[cfg(feature = "remote")]
    if let Some(url) = &args.catalog_url {
        let source = endpoint_catalog::RemoteSchemaSource::new(url).map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?;
        return Ok(Catalog::new(source).with_suggestion_strategy(suggestions));
    }

    if !args.catalog.is_dir() {
        eprintln!("Error: catalog directory not found: {}", args.catalog.display());
        return Err(2);
    }
    Ok(Catalog::new(DirectorySchemaSource::new(&args.catalog)).with_suggestion_strategy(suggestions))
}

fn fail(e: CatalogError) -> u8 {
    eprintln!("Error: {}", e);
    e.exit_code() as u8
}

fn run_uri(
    catalog: &Catalog,
    scheme: &str,
    options: Vec<(String, String)>,
    xml: bool,
    encode: bool,
) -> Result<(), u8> {
    let properties: IndexMap<String, String> = options.into_iter().collect();
    let uri = if xml {
        catalog.as_endpoint_uri_xml(scheme, &properties, encode)
    } else {
        catalog.as_endpoint_uri(scheme, &properties, encode)
    }
    .map_err(fail)?;

    println!("{}", uri);
    Ok(())
}

fn run_parse(catalog: &Catalog, uri: &str, pretty: bool) -> Result<(), u8> {
    let properties = catalog.endpoint_properties(uri).map_err(fail)?;

    let output = if pretty {
        serde_json::to_string_pretty(&properties)
    } else {
        serde_json::to_string(&properties)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    println!("{}", output);
    Ok(())
}

fn run_validate(
    catalog: &Catalog,
    uri: &str,
    options: &ValidateOptions,
    json_output: bool,
) -> Result<(), u8> {
    let result = catalog
        .validate_endpoint_properties(uri, options)
        .map_err(|e| {
            report_error(json_output, &e.to_string());
            e.exit_code() as u8
        })?;

    if json_output {
        let output = serde_json::json!({
            "valid": result.is_success(),
            "errors": result.number_of_errors(),
            "result": result,
        });
        println!("{}", output);
    } else if let Some(summary) = result.summary_error_message(true) {
        eprintln!("{}", summary);
    } else {
        println!("Valid");
    }

    if result.is_success() {
        Ok(())
    } else {
        Err(1)
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}

fn run_time_pattern(text: &str) -> Result<(), u8> {
    match parse_time_pattern(text) {
        Some(duration) => {
            println!("{}", duration.as_millis());
            Ok(())
        }
        None => {
            eprintln!("Invalid time pattern: {}", text);
            Err(1)
        }
    }
}

fn run_schema(catalog: &Catalog, kind: SchemaKindArg, name: &str) -> Result<(), u8> {
    let text = match kind {
        SchemaKindArg::Component => catalog.component_json_schema(name),
        SchemaKindArg::Model => catalog.model_json_schema(name),
        SchemaKindArg::Dataformat => catalog.data_format_json_schema(name),
        SchemaKindArg::Language => catalog.language_json_schema(name),
    }
    .map_err(fail)?;

    println!("{}", text.trim_end());
    Ok(())
}

fn run_lint(path: &Path, format: &str, strict: bool, quiet: bool) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(2);
    }

    let result = lint(path, strict);

    if format == "json" {
        let output = serde_json::to_string_pretty(&result).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", output);
    } else {
        print_lint_report(&result, strict, quiet);
    }

    if result.passes(strict) {
        Ok(())
    } else {
        Err(1)
    }
}

/// Quiet mode keeps failing files and error lines only.
fn print_lint_report(result: &LintResult, strict: bool, quiet: bool) {
    if !quiet {
        println!("Linting {} ...\n", result.path.display());
    }
    for file in &result.results {
        if !quiet || file.status != FileStatus::Ok {
            println!("  {} {}", file.status.icon(), file.file.display());
        }
        file.diagnostics
            .iter()
            .filter(|diag| !quiet || diag.severity == Severity::Error)
            .for_each(|diag| println!("    {}", diag.render()));
    }
    println!("\n{}", result.summary(strict));
}
