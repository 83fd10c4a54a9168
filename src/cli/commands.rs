use crate::config::FixerConfig;
use crate::error::{FixerError, FixerResult};
use crate::excel::ExcelImporter;
use crate::session::{Session, Workbook};
use crate::types::{Progress, SheetView};
use colored::Colorize;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Widest a grid column is rendered before truncation
const MAX_CELL_WIDTH: usize = 24;

/// One cell edit from a batch edits file
#[derive(Debug, Clone, Deserialize)]
pub struct CellEdit {
    /// Sheet to edit; the active (first) sheet when omitted
    #[serde(default)]
    pub sheet: Option<String>,
    pub row: usize,
    pub column: String,
    #[serde(default)]
    pub value: serde_yaml::Value,
}

impl CellEdit {
    /// Value as the text a user would have typed
    fn value_text(&self) -> String {
        match &self.value {
            serde_yaml::Value::Null => String::new(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::String(s) => s.clone(),
            other => serde_yaml::to_string(other)
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Batch edits file
#[derive(Debug, Clone, Deserialize)]
pub struct EditsFile {
    pub edits: Vec<CellEdit>,
}

/// Parse a YAML edits file
pub fn parse_edits(path: &Path) -> FixerResult<EditsFile> {
    let content = fs::read_to_string(path)?;
    let edits: EditsFile = serde_yaml::from_str(&content)?;
    Ok(edits)
}

fn print_progress(progress: &Progress) {
    println!(
        "   {} ({}%)",
        progress.label.cyan(),
        progress.percent()
    );
}

/// `<dir>/<stem><suffix>.xlsx`, defaulting `dir` to the input's directory
pub fn export_path(input: &Path, output_dir: Option<&Path>, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook".to_string());
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{}{}.xlsx", stem, suffix))
}

fn load_one(file: &Path, config: &FixerConfig, verbose: bool) -> FixerResult<Workbook> {
    if verbose {
        Workbook::load(file, config, print_progress)
    } else {
        Workbook::load(file, config, |_| {})
    }
}

fn select(workbook: &mut Workbook, sheet: Option<&str>) -> FixerResult<()> {
    if let Some(name) = sheet {
        workbook.select_sheet(name)?;
    }
    Ok(())
}

fn save(workbook: &Workbook, output: &Path, verbose: bool) -> FixerResult<()> {
    if verbose {
        workbook.export(output, print_progress)?;
    } else {
        workbook.export(output, |_| {})?;
    }
    println!("{}", "✅ Export successful!".bold().green());
    println!("   Excel file: {}\n", output.display());
    Ok(())
}

/// Execute the fix command: load each file, export a fixed copy
pub fn fix(
    files: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    config: FixerConfig,
    verbose: bool,
) -> FixerResult<()> {
    println!("{}", "📊 datefix - Fixing date columns".bold().green());
    println!("   Files: {}\n", files.len());

    let mut session = Session::new(config);
    let report = session.load_files(&files, |p| {
        if verbose {
            print_progress(p);
        }
    });

    for failure in &report.failures {
        println!(
            "{} {}\n   {}",
            "❌ Load error:".red().bold(),
            failure.path.display(),
            failure.error
        );
    }

    let suffix = session.config().export_suffix.clone();
    let mut exported = 0;
    let mut targets: HashSet<PathBuf> = HashSet::new();
    for workbook in session.workbooks() {
        let output = export_path(&workbook.path, output_dir.as_deref(), &suffix);
        if !targets.insert(output.clone()) {
            println!(
                "{} {}\n   {} is already written by an earlier input",
                "❌ Skipped:".red().bold(),
                workbook.path.display(),
                output.display()
            );
            continue;
        }
        let date_columns: usize = workbook.sheets.iter().map(|s| s.date_columns().len()).sum();
        println!(
            "   📄 {}: {} sheet(s), {} date column(s)",
            workbook.file_name.bright_blue().bold(),
            workbook.sheets.len(),
            date_columns
        );

        let result = if verbose {
            workbook.export(&output, print_progress)
        } else {
            workbook.export(&output, |_| {})
        };
        match result {
            Ok(()) => {
                println!("      → {}", output.display());
                exported += 1;
            }
            Err(e) => println!("{} {}", "❌ Export failed:".red().bold(), e),
        }
    }
    println!();

    if exported == 0 {
        return Err(FixerError::Validation("No files exported.".to_string()));
    }

    println!(
        "{}",
        format!("✔ Exported {} of {} file(s).", exported, files.len())
            .bold()
            .green()
    );
    Ok(())
}

/// Execute the inspect command
pub fn inspect(file: PathBuf, config: FixerConfig) -> FixerResult<()> {
    let imported = ExcelImporter::new(&file)
        .with_max_scan(config.max_scan_rows)
        .import()?;

    println!("{}", "📊 datefix - Inspect".bold().green());
    println!("   File: {}\n", file.display());

    for entry in &imported {
        let sheet = &entry.sheet;
        println!("   📋 Sheet: {}", sheet.name.bright_blue().bold());
        println!(
            "      header row {}, {} columns, {} rows",
            entry.header_row,
            sheet.columns.len(),
            sheet.row_count()
        );
        if entry.duplicate_header_dropped {
            println!("      {}", "repeated header row dropped".yellow());
        }
        for outcome in &entry.outcomes {
            if outcome.committed {
                println!(
                    "      {} {}",
                    outcome.column.cyan(),
                    format!("(date, {}/{} parsed)", outcome.parsed, outcome.total).yellow()
                );
            } else if outcome.parsed > 0 {
                println!(
                    "      {} (kept, {}/{} parsed, needs {})",
                    outcome.column.cyan(),
                    outcome.parsed,
                    outcome.total,
                    outcome.threshold
                );
            } else {
                println!("      {}", outcome.column.cyan());
            }
        }
    }
    println!();
    Ok(())
}

/// Execute the show command
pub fn show(
    file: PathBuf,
    sheet: Option<String>,
    search: Option<String>,
    json: bool,
    config: FixerConfig,
) -> FixerResult<()> {
    let mut workbook = load_one(&file, &config, false)?;
    select(&mut workbook, sheet.as_deref())?;

    let view = workbook.search(search.as_deref().unwrap_or(""))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!(
        "📋 {} → {}",
        workbook.file_name.bright_blue().bold(),
        view.sheet.bold()
    );
    println!("   Sheets: {}\n", workbook.sheet_names().join(", "));
    print!("{}", render_grid(&view, config.preview_limit));
    Ok(())
}

fn clip(text: &str) -> String {
    if text.chars().count() > MAX_CELL_WIDTH {
        let cut: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
        format!("{}…", cut)
    } else {
        text.to_string()
    }
}

/// Render up to `limit` rows of a view as an aligned text grid
pub fn render_grid(view: &SheetView, limit: usize) -> String {
    let shown = &view.rows[..view.rows.len().min(limit)];
    let widths: Vec<usize> = view
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            shown
                .iter()
                .filter_map(|row| row.get(idx))
                .map(|cell| clip(cell).chars().count())
                .chain(std::iter::once(clip(name).chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", clip(cell), width = *width))
            .collect::<Vec<_>>()
            .join(" │ ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(&view.columns));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─"),
    );
    out.push('\n');
    for row in shown {
        out.push_str(&line(row));
        out.push('\n');
    }
    if view.rows.len() > shown.len() {
        out.push_str(&format!("… {} more row(s)\n", view.rows.len() - shown.len()));
    }
    out.push_str(&format!("{} row(s)\n", view.rows.len()));
    out
}

/// Execute the flag command
pub fn flag(
    file: PathBuf,
    output: PathBuf,
    sheet: Option<String>,
    config: FixerConfig,
    verbose: bool,
) -> FixerResult<()> {
    println!("{}", "📊 datefix - Long/Short term flags".bold().green());
    let mut workbook = load_one(&file, &config, verbose)?;
    select(&mut workbook, sheet.as_deref())?;

    if workbook.add_flags()? {
        println!("{}", "✅ Flags added next to Asset Type.".green());
    } else {
        println!("{}", "ℹ️  Flag column already present.".yellow());
    }
    save(&workbook, &output, verbose)
}

/// Execute the edit command with either a batch file or a single edit
pub fn edit(
    file: PathBuf,
    output: PathBuf,
    edits: Vec<CellEdit>,
    config: FixerConfig,
    verbose: bool,
) -> FixerResult<()> {
    println!("{}", "📊 datefix - Edit cells".bold().green());
    if edits.is_empty() {
        return Err(FixerError::Validation("No edits given".to_string()));
    }

    let mut workbook = load_one(&file, &config, verbose)?;
    let default_sheet = workbook.active_sheet()?.name.clone();

    for cell_edit in &edits {
        let sheet = cell_edit.sheet.as_deref().unwrap_or(&default_sheet);
        workbook.select_sheet(sheet)?;
        workbook.edit_cell(cell_edit.row, &cell_edit.column, &cell_edit.value_text())?;
        if verbose {
            println!(
                "   {}[{}].{} = {:?}",
                sheet.cyan(),
                cell_edit.row,
                cell_edit.column,
                cell_edit.value_text()
            );
        }
    }
    println!("   Applied {} edit(s)", edits.len());
    save(&workbook, &output, verbose)
}

/// Execute the copy-column command
pub fn copy_column(
    file: PathBuf,
    column: String,
    sheet: Option<String>,
    config: FixerConfig,
) -> FixerResult<()> {
    let mut workbook = load_one(&file, &config, false)?;
    select(&mut workbook, sheet.as_deref())?;
    println!("{}", workbook.copy_column(&column)?);
    Ok(())
}

/// Execute the paste command: tab-separated rows from a file or stdin
pub fn paste(
    file: PathBuf,
    output: PathBuf,
    start_row: usize,
    sheet: Option<String>,
    input: Option<PathBuf>,
    config: FixerConfig,
    verbose: bool,
) -> FixerResult<()> {
    let text = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    println!("{}", "📊 datefix - Paste rows".bold().green());
    let mut workbook = load_one(&file, &config, verbose)?;
    select(&mut workbook, sheet.as_deref())?;

    let written = workbook.paste_rows(start_row, &text)?;
    println!("{}", format!("✅ Pasted into {} row(s).", written).green());
    save(&workbook, &output, verbose)
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
