//! External command execution utilities.
//!
//! Provides a Builder-based API for running the LaTeX binary (or any other
//! command) inside a working directory, capturing its output.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! let output = Cmd::new("pdflatex")
//!     .args(["-interaction=nonstopmode", "letter.tex"])
//!     .cwd(workspace)
//!     .output()?;
//! ```

use anyhow::{Context, Result};
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Debug, Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if !arg.is_empty() {
                self.args.push(arg.to_owned());
            }
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set environment variables for the subprocess.
    pub fn envs<K, V, I>(mut self, vars: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in vars {
            self.envs.push((k.as_ref().to_owned(), v.as_ref().to_owned()));
        }
        self
    }

    /// Get the program name for error messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Execute the command and return its output, whatever the exit status.
    ///
    /// Stdin is closed so that an interactive prompt of the child process
    /// can never block the caller.
    pub fn output(self) -> Result<Output> {
        let name = self.program_name();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.envs.iter().cloned())
            .stdin(Stdio::null());

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        cmd.output()
            .with_context(|| format!("Failed to execute `{name}`"))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("pdflatex")
            .args(["-ini", "-jobname=preamble", "preamble.tex"])
            .cwd("/tmp");

        assert_eq!(cmd.program, OsString::from("pdflatex"));
        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_empty_args_filtered() {
        let cmd = Cmd::new("echo").args(["", "a", "", "b"]);
        assert_eq!(cmd.args.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_env_and_cwd_reach_child() {
        let dir = tempfile::tempdir().unwrap();
        let output = Cmd::new("sh")
            .args(["-c", "printf '%s ' \"$max_print_line\"; pwd"])
            .envs([("max_print_line", "10000")])
            .cwd(dir.path())
            .output()
            .unwrap();
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.starts_with("10000 "));
        let name = dir.path().file_name().unwrap().to_string_lossy();
        assert!(stdout.trim_end().ends_with(name.as_ref()));
    }

    #[cfg(unix)]
    #[test]
    fn test_output_keeps_failure() {
        let output = Cmd::new("sh").args(["-c", "exit 1"]).output().unwrap();
        assert!(!output.status.success());
    }

    #[test]
    fn test_missing_program() {
        let err = Cmd::new("hurtigbrief-no-such-binary").output().unwrap_err();
        assert!(format!("{err}").contains("hurtigbrief-no-such-binary"));
    }
}
