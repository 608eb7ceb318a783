//! Solver boundary — hands a finished IR document to the external
//! capability/information-flow solver and parses what comes back.
//!
//! The solver is opaque to this crate: one blocking request carrying the IR
//! JSON, one response, no retries, no partial results. Anything smarter
//! (timeouts, batching, isolation of per-recipe failures) belongs to the
//! caller.

use crate::core::ir::IrDocument;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Parsed solver response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverResponse {
    /// One entry per solved recipe. Non-empty `type_errors` anywhere means
    /// a failed check.
    #[serde(default)]
    pub recipes: Vec<SolvedRecipe>,

    /// DOT-format rendering of the solution graph, when requested.
    #[serde(default)]
    pub dot_output: Option<String>,

    /// Node/link structure for layout rendering, when requested.
    #[serde(default)]
    pub d3_output: Option<D3Graph>,
}

impl SolverResponse {
    /// True when no solved recipe reported a type error.
    pub fn is_valid(&self) -> bool {
        self.recipes.iter().all(|r| r.type_errors.is_empty())
    }
}

/// One solved recipe. Solver-specific fields beyond `type_errors` are
/// carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolvedRecipe {
    #[serde(default)]
    pub type_errors: Vec<Value>,

    #[serde(flatten)]
    pub rest: indexmap::IndexMap<String, Value>,
}

/// Graph layout structure some solvers return alongside the solutions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct D3Graph {
    #[serde(default)]
    pub nodes: Vec<Value>,

    #[serde(default)]
    pub links: Vec<Value>,
}

/// Parse a solver response from its JSON string.
pub fn parse_response(json: &str) -> Result<SolverResponse, String> {
    serde_json::from_str(json).map_err(|e| format!("bad solver response: {}", e))
}

/// The solver seam: IR in, response out.
pub trait Solver {
    fn solve(&self, ir: &IrDocument) -> Result<SolverResponse, String>;
}

/// Invokes an external solver program, writing the IR JSON to its stdin and
/// parsing its stdout.
#[derive(Debug, Clone)]
pub struct CommandSolver {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandSolver {
    pub fn new(program: PathBuf) -> Self {
        CommandSolver {
            program,
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

impl Solver for CommandSolver {
    fn solve(&self, ir: &IrDocument) -> Result<SolverResponse, String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to spawn solver {}: {}", self.program.display(), e))?;

        if let Some(ref mut stdin) = child.stdin {
            stdin
                .write_all(ir.to_json().as_bytes())
                .map_err(|e| format!("stdin write error: {}", e))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| format!("wait error: {}", e))?;

        if !output.status.success() {
            return Err(format!(
                "solver exited with {}: {}",
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        parse_response(&String::from_utf8_lossy(&output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clean_response() {
        let json = r#"
{
  "recipes": [
    { "type_errors": [], "solutions": 3 }
  ],
  "dot_output": "digraph solution { }"
}
"#;
        let response = parse_response(json).unwrap();
        assert!(response.is_valid());
        assert_eq!(response.recipes.len(), 1);
        assert_eq!(response.recipes[0].rest["solutions"], 3);
        assert_eq!(
            response.dot_output.as_deref(),
            Some("digraph solution { }")
        );
        assert!(response.d3_output.is_none());
    }

    #[test]
    fn test_parse_failed_check() {
        let json = r#"
{
  "recipes": [
    { "type_errors": ["node a claims private but flows to public b"] }
  ]
}
"#;
        let response = parse_response(json).unwrap();
        assert!(!response.is_valid());
    }

    #[test]
    fn test_parse_d3_output() {
        let json = r#"
{
  "recipes": [],
  "d3_output": {
    "nodes": [{ "id": "a" }],
    "links": [{ "source": "a", "target": "b" }]
  }
}
"#;
        let response = parse_response(json).unwrap();
        let d3 = response.d3_output.unwrap();
        assert_eq!(d3.nodes.len(), 1);
        assert_eq!(d3.links.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_solver_pipe() {
        use std::os::unix::fs::PermissionsExt;

        // A stand-in solver: drain stdin, answer with one clean recipe.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake-solver.sh");
        std::fs::write(
            &path,
            "#!/bin/sh\ncat > /dev/null\necho '{\"recipes\":[{\"type_errors\":[]}]}'\n",
        )
        .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let response = CommandSolver::new(path)
            .solve(&IrDocument::with_prelude())
            .unwrap();
        assert!(response.is_valid());
    }

    #[test]
    fn test_command_solver_missing_program() {
        let solver = CommandSolver::new(PathBuf::from("/nonexistent/solver"));
        let err = solver.solve(&IrDocument::with_prelude()).unwrap_err();
        assert!(err.contains("failed to spawn"));
    }

    #[test]
    fn test_command_solver_nonzero_exit() {
        let solver = CommandSolver::new(PathBuf::from("false"));
        let err = solver.solve(&IrDocument::with_prelude()).unwrap_err();
        assert!(err.contains("exited"));
    }
}
