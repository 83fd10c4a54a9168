use clap::{Parser, Subcommand};
use colored::Colorize;
use datefix::cli::{self, CellEdit};
use datefix::config::{FixerConfig, DEFAULT_EXPORT_SUFFIX, DEFAULT_PREVIEW_LIMIT};
use datefix::core::DEFAULT_MAX_SCAN;
use datefix::error::FixerResult;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "datefix")]
#[command(about = "Excel date fixer: detect headers, normalize date columns, re-export as DD-MM-YYYY.")]
#[command(long_about = "datefix - Excel date fixer and statement editor

Finds the real header row of every sheet, converts columns of mixed-format
dates (20230115, 15012023, 3/4/21, ...) into calendar dates, and writes the
workbook back out with date columns formatted DD-MM-YYYY.

COMMANDS:
  fix          - Load workbooks and export fixed copies
  inspect      - Show sheets, header rows, and detected date columns
  show         - Print a sheet as a grid (with optional search)
  flag         - Add a Long/Short term Flag column next to Asset Type
  edit         - Edit cells (single edit or YAML batch) and export
  copy-column  - Print every value of one column
  paste        - Paste tab-separated rows and export

EXAMPLES:
  datefix fix statement.xlsx                   # writes statement_fixed.xlsx
  datefix fix a.xlsx b.xls -o fixed/           # several files at once
  datefix show statement.xlsx --search infy
  datefix flag statement.xlsx -o flagged.xlsx")]
#[command(version)]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Leading rows searched for the header row
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_SCAN)]
    max_scan: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Load one or more workbooks and export a fixed copy of each.

Each file is loaded independently: a file that cannot be read is reported
and skipped, the others are still exported. Output files are named
<stem><suffix>.xlsx and written next to the input unless --output-dir is given.

EXAMPLE:
  datefix fix statement.xlsx --suffix _clean")]
    /// Load workbooks and export fixed copies
    Fix {
        /// Excel files (.xlsx, .xls, .xlsb, .ods)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory for exported files (default: next to each input)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Suffix appended to each exported file name
        #[arg(long, default_value = DEFAULT_EXPORT_SUFFIX)]
        suffix: String,
    },

    /// Show sheets, header rows, and detected date columns
    Inspect {
        /// Excel file
        file: PathBuf,
    },

    /// Print a sheet as a grid
    Show {
        /// Excel file
        file: PathBuf,

        /// Sheet to show (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Only rows containing this text (case-insensitive, any column)
        #[arg(long)]
        search: Option<String>,

        /// Maximum rows rendered
        #[arg(short, long, default_value_t = DEFAULT_PREVIEW_LIMIT)]
        limit: usize,

        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a Long/Short term Flag column next to Asset Type
    Flag {
        /// Excel file
        file: PathBuf,

        /// Output Excel file path (.xlsx)
        #[arg(short, long)]
        output: PathBuf,

        /// Sheet to flag (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,
    },

    #[command(long_about = "Edit cells and export the workbook.

Either give one edit with --row/--column/--value, or a YAML file of edits:

  edits:
    - sheet: Holdings
      row: 0
      column: Buy Date
      value: \"15-01-2023\"

Rows are 0-based data rows (the header is not counted). Values typed into a
date column are parsed like the loader does and shown as DD-MM-YYYY.")]
    /// Edit cells and export
    Edit {
        /// Excel file
        file: PathBuf,

        /// Output Excel file path (.xlsx)
        #[arg(short, long)]
        output: PathBuf,

        /// YAML file with a list of edits
        #[arg(long, conflicts_with_all = ["row", "column", "value"])]
        edits: Option<PathBuf>,

        /// Sheet for a single edit (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Data row (0-based) for a single edit
        #[arg(long, requires = "column")]
        row: Option<usize>,

        /// Column name for a single edit
        #[arg(long, requires = "row")]
        column: Option<String>,

        /// New value for a single edit (empty clears the cell)
        #[arg(long, default_value = "")]
        value: String,
    },

    /// Print every value of one column
    CopyColumn {
        /// Excel file
        file: PathBuf,

        /// Column name
        #[arg(short, long)]
        column: String,

        /// Sheet (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,
    },

    /// Paste tab-separated rows (file or stdin) and export
    Paste {
        /// Excel file
        file: PathBuf,

        /// Output Excel file path (.xlsx)
        #[arg(short, long)]
        output: PathBuf,

        /// First data row (0-based) to overwrite
        #[arg(long)]
        start_row: usize,

        /// Sheet (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Tab-separated input file (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "datefix=debug" } else { "datefix=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> FixerResult<()> {
    let verbose = cli.verbose;
    let config = FixerConfig::default().with_max_scan_rows(cli.max_scan);

    match cli.command {
        Commands::Fix {
            files,
            output_dir,
            suffix,
        } => cli::fix(
            files,
            output_dir,
            config.with_export_suffix(suffix),
            verbose,
        ),

        Commands::Inspect { file } => cli::inspect(file, config),

        Commands::Show {
            file,
            sheet,
            search,
            limit,
            json,
        } => cli::show(file, sheet, search, json, config.with_preview_limit(limit)),

        Commands::Flag {
            file,
            output,
            sheet,
        } => cli::flag(file, output, sheet, config, verbose),

        Commands::Edit {
            file,
            output,
            edits,
            sheet,
            row,
            column,
            value,
        } => {
            let edits = match (edits, row, column) {
                (Some(path), _, _) => cli::parse_edits(&path)?.edits,
                (None, Some(row), Some(column)) => vec![CellEdit {
                    sheet,
                    row,
                    column,
                    value: serde_yaml::Value::String(value),
                }],
                _ => Vec::new(),
            };
            cli::edit(file, output, edits, config, verbose)
        }

        Commands::CopyColumn {
            file,
            column,
            sheet,
        } => cli::copy_column(file, column, sheet, config),

        Commands::Paste {
            file,
            output,
            start_row,
            sheet,
            input,
        } => cli::paste(file, output, start_row, sheet, input, config, verbose),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "❌ Error:".red().bold(), e);
        std::process::exit(1);
    }
}
