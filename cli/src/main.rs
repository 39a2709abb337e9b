use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use rsidx_core::index::DeclarationDetail;
use rsidx_core::matching::MatchTypeId;
use rsidx_core::rename::{RenamePlan, plan_rename};
use rsidx_core::{FileId, IndexSession, Location};
use serde::Serialize;
use serde_json::json;


const DEFAULT_TRACE_FILTER: &str = "rsidx_core=info,rsidx_cli=info";

#[derive(Debug, Parser)]
#[command(
    name = "rsidx",
    author,
    version,
    about = "Symbol index for RuneScript-style projects",
    long_about = None,
    after_help = "Positions are written FILE:LINE:COL, one-based, with FILE relative to the project root."
)]
struct CliArgs {
    /// Project root to index
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Index the project and print what was found.
    Scan,
    /// Write the identifier index as JSON.
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Show where NAME is declared and referenced.
    Lookup {
        name: String,
        /// Entity kind such as `proc`, `obj` or `varp`
        #[arg(short, long, value_parser = parse_kind)]
        kind: MatchTypeId,
    },
    /// List names of KIND starting with PREFIX.
    Complete {
        #[arg(value_parser = parse_kind)]
        kind: MatchTypeId,
        #[arg(default_value = "")]
        prefix: String,
    },
    /// Describe the symbol at a position.
    At {
        #[arg(value_parser = parse_position)]
        position: Position,
    },
    /// Report references to undeclared entities and malformed map lines.
    Check,
    /// Plan renaming the symbol at a position, and optionally apply it.
    Rename {
        #[arg(value_parser = parse_position)]
        position: Position,
        new_name: String,
        /// Rewrite the files on disk
        #[arg(long)]
        apply: bool,
    },
}

/// Zero-based position parsed from a one-based `FILE:LINE:COL`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Position {
    file: String,
    line: u32,
    column: u32,
}

#[derive(Debug, Serialize)]
struct Problem {
    file: String,
    line: u32,
    column: u32,
    message: String,
}

fn parse_kind(raw: &str) -> Result<MatchTypeId, String> {
    MatchTypeId::from_name(raw)
        .or_else(|| MatchTypeId::from_type_keyword(raw))
        .filter(|kind| !kind.is_sentinel())
        .ok_or_else(|| format!("unknown entity kind `{raw}`"))
}

fn parse_position(raw: &str) -> Result<Position, String> {
    let mut parts = raw.rsplitn(3, ':');
    let (Some(col), Some(line), Some(file)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected FILE:LINE:COL, got `{raw}`"));
    };
    let number = |s: &str, what: &str| match s.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("{what} must be a positive number, got `{s}`")),
    };
    Ok(Position {
        file: file.to_string(),
        line: number(line, "line")?,
        column: number(col, "column")?,
    })
}

fn show(loc: &Location) -> String {
    format!("{}:{}:{}", loc.file, loc.line + 1, loc.column + 1)
}

fn describe(detail: &DeclarationDetail) -> Option<String> {
    match detail {
        DeclarationDetail::None => None,
        DeclarationDetail::Signature(sig) => Some(sig.to_string()),
        DeclarationDetail::ValueType(ty) => Some(format!("type={ty}")),
        DeclarationDetail::EnumTypes { input, output } => Some(format!(
            "{} -> {}",
            input.as_deref().unwrap_or("?"),
            output.as_deref().unwrap_or("?")
        )),
        DeclarationDetail::ConstantValue(value) => Some(format!("= {value}")),
        DeclarationDetail::ColumnTypes(types) => Some(types.join(", ")),
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let builder = fmt().with_writer(std::io::stderr);
    let builder = match std::env::var("RUST_LOG").ok().and_then(|expr| EnvFilter::try_new(expr).ok()) {
        Some(filter) => builder.with_env_filter(filter),
        None => builder.with_env_filter(DEFAULT_TRACE_FILTER),
    };
    let _ = builder.try_init();
}

fn resolve_file(session: &IndexSession, raw: &str) -> anyhow::Result<FileId> {
    let path = Path::new(raw);
    let file = match session.root() {
        Some(root) if path.is_absolute() => FileId::from_path(path.strip_prefix(root).unwrap_or(path)),
        _ => FileId::new(raw),
    };
    if session.document(&file).is_none() && session.map_file(&file).is_none() {
        bail!("{file} is not part of the indexed project");
    }
    Ok(file)
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn collect_problems(session: &IndexSession) -> Vec<Problem> {
    let mut problems = Vec::new();
    for file in session.files() {
        for unknown in session.unknown_references(&file) {
            problems.push(Problem {
                file: file.to_string(),
                line: unknown.position.line + 1,
                column: unknown.position.column + 1,
                message: unknown.message(),
            });
        }
        for diagnostic in session.map_diagnostics(&file) {
            problems.push(Problem {
                file: file.to_string(),
                line: diagnostic.line + 1,
                column: diagnostic.range.start + 1,
                message: diagnostic.message.clone(),
            });
        }
    }
    problems
}

fn apply_plan(session: &mut IndexSession, plan: &RenamePlan) -> anyhow::Result<()> {
    let root = session.root().context("no project root")?.to_path_buf();
    let files: Vec<FileId> = plan.files().into_iter().cloned().collect();
    for file in &files {
        session.apply_edits(file, &plan.text_edits(file))?;
        let doc = session.document(file).context("edited file vanished")?;
        let path = root.join(file.as_str());
        fs::write(&path, doc.text().to_string()).with_context(|| format!("cannot write {}", path.display()))?;
        tracing::debug!(%file, "rewrote file");
    }
    for moved in &plan.moves {
        let (from, to) = (root.join(moved.from.as_str()), root.join(moved.to.as_str()));
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&from, &to).with_context(|| format!("cannot move {} to {}", from.display(), to.display()))?;
        tracing::debug!(from = %moved.from, to = %moved.to, "moved file");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let CliArgs { root, json, command } = CliArgs::parse();
    let mut session = IndexSession::default();
    let stats = session.scan_project(&root)?;

    match command {
        Commands::Scan => {
            if json {
                print_json(&stats)?;
            } else {
                println!(
                    "indexed {} files and {} maps: {} identifiers, {} declarations, {} references",
                    stats.files, stats.maps, stats.identifiers, stats.declarations, stats.references
                );
            }
        }
        Commands::Export { out } => {
            let exported = session.export_json()?;
            match out {
                Some(path) => {
                    fs::write(&path, exported).with_context(|| format!("cannot write {}", path.display()))?;
                    tracing::info!(path = %path.display(), "exported index");
                }
                None => println!("{exported}"),
            }
        }
        Commands::Lookup { name, kind } => {
            let Some(ident) = session.identifiers().get(&name, kind) else {
                bail!("no {} named `{name}`", kind.display_name());
            };
            let declaration = ident.declaration.as_ref().map(show);
            let references: Vec<String> = ident.reference_locations().iter().map(show).collect();
            if json {
                print_json(&json!({
                    "name": name,
                    "kind": kind,
                    "declaration": declaration,
                    "detail": describe(&ident.detail),
                    "references": references,
                }))?;
            } else {
                println!("{} {name}", kind.display_name());
                println!("  declared at {}", declaration.as_deref().unwrap_or("(nowhere)"));
                for reference in &references {
                    println!("  referenced at {reference}");
                }
            }
        }
        Commands::Complete { kind, prefix } => {
            let names = session.completions(kind, &prefix);
            if json {
                print_json(&names)?;
            } else {
                for name in names {
                    println!("{name}");
                }
            }
        }
        Commands::At { position } => {
            let file = resolve_file(&session, &position.file)?;
            let Some(info) = session.symbol_info(&file, position.line, position.column) else {
                bail!("nothing indexed at {}:{}:{}", file, position.line + 1, position.column + 1);
            };
            let declaration = info.declaration.as_ref().map(show);
            if json {
                print_json(&json!({
                    "kind": info.span.kind,
                    "name": info.span.name.as_ref(),
                    "declaration": declaration,
                    "detail": describe(&info.detail),
                    "doc": info.doc,
                    "pack_id": info.pack_id,
                    "references": info.reference_count,
                }))?;
            } else {
                println!("{}", info.title());
                if let Some(detail) = describe(&info.detail) {
                    println!("  {detail}");
                }
                if let Some(doc) = &info.doc {
                    println!("  {doc}");
                }
                println!("  declared at {}", declaration.as_deref().unwrap_or("(nowhere)"));
                println!("  {} references", info.reference_count);
            }
        }
        Commands::Check => {
            let problems = collect_problems(&session);
            if json {
                print_json(&problems)?;
            } else {
                for p in &problems {
                    println!("{}:{}:{}: {}", p.file, p.line, p.column, p.message);
                }
            }
            if !problems.is_empty() {
                bail!("{} problem(s) found", problems.len());
            }
        }
        Commands::Rename {
            position,
            new_name,
            apply,
        } => {
            let file = resolve_file(&session, &position.file)?;
            let plan = plan_rename(&mut session, &file, position.line, position.column, &new_name)?;
            if json {
                print_json(&plan)?;
            } else {
                for edit in &plan.edits {
                    println!(
                        "{}:{}:{}-{}: {} -> {}",
                        edit.file,
                        edit.line + 1,
                        edit.start + 1,
                        edit.end + 1,
                        plan.old_name,
                        plan.new_name
                    );
                }
                for moved in &plan.moves {
                    println!("move {} -> {}", moved.from, moved.to);
                }
            }
            if apply {
                apply_plan(&mut session, &plan)?;
                tracing::info!(edits = plan.edits.len(), moves = plan.moves.len(), "applied rename");
            }
        }
    }
    Ok(())
}
