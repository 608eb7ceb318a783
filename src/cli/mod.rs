//! CLI subcommands — convert, merge, validate, solve.

use crate::core::{emit, ir::IrDocument, merge, recipe};
use crate::solver::{CommandSolver, Solver};
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile recipe fragments into one IR document
    Convert {
        /// Recipe files (JSON); several files merge into one recipe
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Recipe name (default: meta.name, else the first file's stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Indent the output
        #[arg(long)]
        pretty: bool,

        /// Write the IR here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge pre-built IR fragments into one document
    Merge {
        /// IR files (JSON)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Indent the output
        #[arg(long)]
        pretty: bool,

        /// Write the merged IR here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile recipes and report structural diagnostics
    Validate {
        /// Recipe files (JSON)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Recipe name (default: meta.name, else the first file's stem)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Compile recipes and run an external solver on the IR
    Solve {
        /// Recipe files (JSON)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Solver program to invoke (IR on stdin, response on stdout)
        #[arg(short, long)]
        solver: PathBuf,

        /// Extra argument for the solver (repeatable)
        #[arg(long = "solver-arg")]
        solver_args: Vec<String>,

        /// Indent the printed response
        #[arg(long)]
        pretty: bool,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Convert {
            files,
            name,
            pretty,
            output,
        } => cmd_convert(&files, name.as_deref(), pretty, output.as_deref()),
        Commands::Merge {
            files,
            pretty,
            output,
        } => cmd_merge(&files, pretty, output.as_deref()),
        Commands::Validate { files, name } => cmd_validate(&files, name.as_deref()),
        Commands::Solve {
            files,
            solver,
            solver_args,
            pretty,
        } => cmd_solve(&files, solver, solver_args, pretty),
    }
}

/// Load each file as a recipe fragment and merge into one recipe, returning
/// the recipe and the name to compile it under.
fn load_merged_recipe(
    files: &[PathBuf],
    name: Option<&str>,
) -> Result<(String, recipe::Recipe), String> {
    let mut fragments = Vec::with_capacity(files.len());
    for file in files {
        fragments.push(recipe::load_recipe(file).map_err(|e| e.to_string())?);
    }
    let merged = merge::merge_recipes(fragments).map_err(|e| e.to_string())?;

    let name = name
        .map(str::to_string)
        .or_else(|| merged.meta["name"].as_str().map(str::to_string))
        .or_else(|| {
            files
                .first()
                .and_then(|f| f.file_stem())
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "recipe".to_string());

    Ok((name, merged))
}

fn emit_output(text: &str, output: Option<&Path>) -> Result<(), String> {
    match output {
        Some(path) => std::fs::write(path, text)
            .map_err(|e| format!("cannot write {}: {}", path.display(), e)),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}

fn render(doc: &IrDocument, pretty: bool) -> String {
    if pretty {
        doc.to_json_pretty()
    } else {
        doc.to_json()
    }
}

fn cmd_convert(
    files: &[PathBuf],
    name: Option<&str>,
    pretty: bool,
    output: Option<&Path>,
) -> Result<(), String> {
    let (name, recipe) = load_merged_recipe(files, name)?;
    let doc = emit::recipe_to_ir(&name, &recipe);
    emit_output(&render(&doc, pretty), output)
}

fn cmd_merge(files: &[PathBuf], pretty: bool, output: Option<&Path>) -> Result<(), String> {
    let mut fragments = Vec::with_capacity(files.len());
    for file in files {
        let content = std::fs::read_to_string(file)
            .map_err(|e| format!("cannot read {}: {}", file.display(), e))?;
        fragments.push(IrDocument::from_json(&content).map_err(|e| e.to_string())?);
    }
    let merged = merge::merge_ir_documents(fragments).map_err(|e| e.to_string())?;
    emit_output(&render(&merged, pretty), output)
}

fn cmd_validate(files: &[PathBuf], name: Option<&str>) -> Result<(), String> {
    let (name, recipe) = load_merged_recipe(files, name)?;
    let doc = emit::recipe_to_ir(&name, &recipe);

    let findings = doc.validate();
    if findings.is_empty() {
        println!(
            "ok: {} nodes, {} edges, {} claims, {} checks",
            doc.nodes.len(),
            doc.edges.len(),
            doc.claims.len(),
            doc.checks.len()
        );
        return Ok(());
    }
    for finding in &findings {
        eprintln!("warning: {}", finding);
    }
    Err(format!("{} finding(s)", findings.len()))
}

fn cmd_solve(
    files: &[PathBuf],
    solver: PathBuf,
    solver_args: Vec<String>,
    pretty: bool,
) -> Result<(), String> {
    let (name, recipe) = load_merged_recipe(files, None)?;
    let doc = emit::recipe_to_ir(&name, &recipe);

    let response = CommandSolver::new(solver).with_args(solver_args).solve(&doc)?;

    let rendered = if pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    }
    .map_err(|e| format!("cannot render response: {}", e))?;
    println!("{}", rendered);

    if response.is_valid() {
        Ok(())
    } else {
        Err("solver reported type errors".to_string())
    }
}
