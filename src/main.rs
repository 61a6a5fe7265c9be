//! Gridmark - sort, format and lay out a JSON row snapshot from the command line

mod config;
mod error;
mod logger;
mod render;
mod snapshot;

use anyhow::Context;
use gridmark_core::{ColumnSet, GridSession};
use gridmark_engine::engine::{CellKey, SortDirection, SortType};
use std::env;
use std::path::PathBuf;

use crate::error::AppError;

fn print_usage() {
    eprintln!("Usage: gridmark [OPTIONS] <ROWS.json>");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <ROWS.json>                 Row snapshot: array of rows, or {{\"rows\": [...], \"token\": ...}}");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --formatting <FILE>         Cell formatting map ({{\"rowId:field\": {{...}}}})");
    eprintln!("  --schema <FILE>             Column schema (array of {{columnName, aliasName, dataType}})");
    eprintln!("  --sort <field[:type][:dir]> Add a sort level (can be repeated)");
    eprintln!("  --wrap <rowId:field>        Enable wrapping for a cell (can be repeated)");
    eprintln!("  --autofit <field>           Auto-fit a column to its content (can be repeated)");
    eprintln!("  --config <FILE>             Load settings from TOML file");
    eprintln!("  -v, --verbose               Log more to stderr (can be repeated)");
    eprintln!("  -h, --help                  Print help");
}

/// One `--sort` argument.
#[derive(Debug, PartialEq)]
struct SortArg {
    field: String,
    sort_type: Option<SortType>,
    direction: SortDirection,
}

impl SortArg {
    fn parse(arg: &str) -> Result<SortArg, AppError> {
        let mut parts = arg.split(':');
        let field = parts.next().unwrap_or("").trim();
        if field.is_empty() {
            return Err(AppError::Argument(format!("--sort '{}' has no field", arg)));
        }
        let mut sort = SortArg {
            field: field.to_string(),
            sort_type: None,
            direction: SortDirection::Asc,
        };
        for part in parts {
            match SortDirection::parse(part) {
                Some(direction) => sort.direction = direction,
                None => sort.sort_type = Some(SortType::parse(part)),
            }
        }
        Ok(sort)
    }
}

#[derive(Default)]
struct Options {
    rows_path: Option<PathBuf>,
    formatting_path: Option<PathBuf>,
    schema_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    sorts: Vec<SortArg>,
    wraps: Vec<CellKey>,
    autofit: Vec<String>,
    verbosity: u8,
}

fn require_value<'a>(args: &'a [String], i: usize, flag: &str, what: &str) -> &'a str {
    match args.get(i) {
        Some(value) => value,
        None => {
            eprintln!("Error: {} requires {}", flag, what);
            std::process::exit(1);
        }
    }
}

fn exit_with(err: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", err);
    std::process::exit(1);
}

fn parse_args(args: &[String]) -> Options {
    let mut opts = Options::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "-v" | "--verbose" => {
                opts.verbosity = opts.verbosity.saturating_add(1);
            }
            "--formatting" => {
                i += 1;
                opts.formatting_path = Some(PathBuf::from(require_value(args, i, "--formatting", "a file path")));
            }
            "--schema" => {
                i += 1;
                opts.schema_path = Some(PathBuf::from(require_value(args, i, "--schema", "a file path")));
            }
            "--config" => {
                i += 1;
                opts.config_path = Some(PathBuf::from(require_value(args, i, "--config", "a file path")));
            }
            "--sort" => {
                i += 1;
                let value = require_value(args, i, "--sort", "a value");
                match SortArg::parse(value) {
                    Ok(sort) => opts.sorts.push(sort),
                    Err(e) => exit_with(e),
                }
            }
            "--wrap" => {
                i += 1;
                let value = require_value(args, i, "--wrap", "a rowId:field value");
                match CellKey::parse(value) {
                    Some(key) => opts.wraps.push(key),
                    None => exit_with(format!("--wrap expects rowId:field, got '{}'", value)),
                }
            }
            "--autofit" => {
                i += 1;
                opts.autofit.push(require_value(args, i, "--autofit", "a field").to_string());
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
            _ => {
                if opts.rows_path.is_none() {
                    opts.rows_path = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: Unexpected argument: {}", args[i]);
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }
    opts
}

fn run(opts: Options) -> anyhow::Result<String> {
    let Some(rows_path) = opts.rows_path else {
        print_usage();
        std::process::exit(1);
    };

    let (config, warnings) = config::load_config(opts.config_path.as_ref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    let mut source = snapshot::FileSource::new(rows_path.clone());
    let schema = match &opts.schema_path {
        Some(path) => {
            let value = snapshot::read_json(path)
                .with_context(|| format!("reading schema {}", path.display()))?;
            let schema = snapshot::schema_from_json(&value)
                .with_context(|| format!("decoding schema {}", path.display()))?;
            Some(schema)
        }
        None => None,
    };

    let mut session = GridSession::new(config, ColumnSet::new(schema.clone().unwrap_or_default()));
    session
        .refresh(&mut source)
        .with_context(|| format!("loading rows from {}", rows_path.display()))?;
    if schema.is_none() {
        let inferred = snapshot::infer_schema(session.rows());
        session.set_columns(ColumnSet::new(inferred));
    }

    if let Some(path) = &opts.formatting_path {
        let value = snapshot::read_json(path)
            .with_context(|| format!("reading formatting {}", path.display()))?;
        let store = snapshot::formatting_from_json(&value)
            .with_context(|| format!("decoding formatting {}", path.display()))?;
        session.merge_formatting(&store);
    }

    for sort in &opts.sorts {
        match (sort.sort_type, sort.direction) {
            (None, SortDirection::Asc) => session.sort_ascending(&sort.field),
            (None, SortDirection::Desc) => session.sort_descending(&sort.field),
            (Some(sort_type), SortDirection::Asc) => {
                let model = session.sort_model().sort_ascending(&sort.field, sort_type);
                session.set_sort_model(model);
            }
            (Some(sort_type), SortDirection::Desc) => {
                let model = session.sort_model().sort_descending(&sort.field, sort_type);
                session.set_sort_model(model);
            }
        }
    }

    for key in &opts.wraps {
        session.set_wrap(&key.row_id, &key.field, true);
    }
    for field in &opts.autofit {
        session.auto_fit_column(field, None);
    }

    Ok(render::render_table(&session))
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let opts = parse_args(&args);
    logger::init(opts.verbosity);

    match run(opts) {
        Ok(table) => print!("{}", table),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
