//! CLI tool for formgrid - builds section grids and applies row operations
//! to section snapshots stored as JSON
//!
//! Usage:
//!   formgrid_cli grid <snapshot.json> [--mode view|editable|admin]
//!   formgrid_cli insert-before <snapshot.json> <row> [-o out.json]
//!   formgrid_cli insert-after <snapshot.json> <row> [-o out.json]
//!   formgrid_cli delete-row <snapshot.json> <row> [-o out.json]
//!   formgrid_cli columns <snapshot.json> <row> <count> [-o out.json]
//!   formgrid_cli init <snapshot.json> [-o out.json]
//!   formgrid_cli move <snapshot.json> param|text <id> <row> <column> [span] [-o out.json]
//!
//! Every command accepts `--config <file.json>` holding a `GridConfig`.
//! Set `RUST_LOG=debug` to see each persistence step.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};

use formgrid::editor::RowOperation;
use formgrid::types::{Cell, CellId, Placement, PresentationMode, SectionSnapshot};
use formgrid::{build_grid, FormGridError, GridConfig, MemoryStore, SectionEditor};
use futures_lite::future::block_on;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: formgrid_cli <grid|insert-before|insert-after|delete-row|columns|init|move> <snapshot.json> [args] [--mode m] [--config file.json] [-o out.json]";

struct Options {
    positional: Vec<String>,
    mode: Option<PresentationMode>,
    config: Option<String>,
    output: Option<String>,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn parse_options(args: Vec<String>) -> Options {
    let mut options = Options {
        positional: Vec::new(),
        mode: None,
        config: None,
        output: None,
    };
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mode" => {
                let value = args.next().unwrap_or_else(|| fail(USAGE));
                options.mode = Some(value.parse().unwrap_or_else(|e: String| fail(e)));
            }
            "--config" => options.config = Some(args.next().unwrap_or_else(|| fail(USAGE))),
            "-o" => options.output = Some(args.next().unwrap_or_else(|| fail(USAGE))),
            _ => options.positional.push(arg),
        }
    }
    options
}

fn number<T: std::str::FromStr>(args: &[String], idx: usize, what: &str) -> T {
    let Some(raw) = args.get(idx) else {
        fail(format!("missing {what}\n{USAGE}"));
    };
    raw.parse()
        .unwrap_or_else(|_| fail(format!("invalid {what}: {raw}")))
}

fn load_snapshot(path: &str) -> SectionSnapshot {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => fail(format!("Error reading {path}: {e}")),
    };
    match serde_json::from_str(&text) {
        Ok(s) => s,
        Err(e) => fail(format!("Error parsing {path}: {e}")),
    }
}

fn write_json<T: serde::Serialize>(value: &T, output: Option<&str>) {
    let json = match serde_json::to_string_pretty(value) {
        Ok(j) => j,
        Err(e) => fail(format!("Error serializing JSON: {e}")),
    };
    match output {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                fail(format!("Error writing {path}: {e}"));
            }
            eprintln!("Written: {path}");
        }
        None => {
            io::stdout().write_all(json.as_bytes()).unwrap();
            println!();
        }
    }
}

/// Run one mutating command against an in-memory copy of the snapshot.
fn mutate(
    snapshot: SectionSnapshot,
    config: GridConfig,
    command: &str,
    args: &[String],
) -> Result<SectionSnapshot, FormGridError> {
    let section_id = snapshot.section.id;
    let mut editor = SectionEditor::new(MemoryStore::with_section(snapshot), section_id, config);

    block_on(async {
        match command {
            "insert-before" => {
                editor.apply(RowOperation::InsertBefore { row: number(args, 2, "row") }).await?;
            }
            "insert-after" => {
                editor.apply(RowOperation::InsertAfter { row: number(args, 2, "row") }).await?;
            }
            "delete-row" => {
                editor.apply(RowOperation::Delete { row: number(args, 2, "row") }).await?;
            }
            "columns" => {
                let row = number(args, 2, "row");
                let columns = number(args, 3, "column count");
                editor.apply(RowOperation::SetColumns { row, columns }).await?;
            }
            "init" => {
                editor.apply(RowOperation::InitializeFirstRow).await?;
            }
            "move" => {
                let id: u64 = number(args, 3, "cell id");
                let cell_id = match args.get(2).map(String::as_str) {
                    Some("param") => CellId::Parameter(id),
                    Some("text") => CellId::Text(id),
                    _ => fail(USAGE),
                };
                let current = editor
                    .snapshot()
                    .await?
                    .cells()
                    .into_iter()
                    .find(|cell| cell.id() == cell_id)
                    .ok_or(FormGridError::CellNotFound(cell_id))?;
                let span = if args.len() > 6 {
                    number(args, 6, "span")
                } else {
                    current.placement().span
                };
                let to = Placement::new(number(args, 4, "row"), number(args, 5, "column"), span);
                match current {
                    Cell::Parameter(p) => editor.move_parameter(p.id, to).await?,
                    Cell::Text(t) => {
                        editor
                            .move_or_edit_text_cell(t.id, to, t.content, t.style)
                            .await?;
                    }
                }
            }
            _ => fail(USAGE),
        }
        for call in editor.store().writes() {
            tracing::info!(?call, "applied");
        }
        Ok::<(), FormGridError>(())
    })?;

    editor
        .into_store()
        .section(section_id)
        .cloned()
        .ok_or_else(|| FormGridError::Other(format!("section {section_id} vanished")))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let options = parse_options(env::args().skip(1).collect());
    let args = &options.positional;
    if args.len() < 2 {
        fail(USAGE);
    }

    let mut config = match &options.config {
        Some(path) => GridConfig::from_json_file(path)
            .unwrap_or_else(|e| fail(format!("Error loading {path}: {e}"))),
        None => GridConfig::default(),
    };
    if let Some(mode) = options.mode {
        config.mode = mode;
    }

    let command = args[0].as_str();
    let snapshot = load_snapshot(&args[1]);

    if command == "grid" {
        write_json(&build_grid(&snapshot, config.mode), options.output.as_deref());
        return;
    }

    match mutate(snapshot, config, command, args) {
        Ok(updated) => write_json(&updated, options.output.as_deref()),
        Err(e) => fail(format!("Error: {e}")),
    }
}
