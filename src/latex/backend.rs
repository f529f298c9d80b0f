//! LaTeX compiler backend.
//!
//! Compilation happens in two steps:
//!
//! 1. `initialize` runs the compiler in `-ini` mode over the preamble and
//!    dumps the loaded state into a format file (`preamble-<hash>.fmt`).
//! 2. `compile` runs the compiler over the body with `-fmt` pointing at that
//!    format, skipping the expensive package loading.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

use crate::config::LatexConfig;
use crate::pipeline::CompileError;
use crate::utils::exec::Cmd;
use crate::utils::hash::Fingerprint;

const PREAMBLE_PREFIX: &str = "preamble-";
const LETTER_JOB: &str = "letter";

/// Lines kept from the end of the compiler output when no `!` error line exists.
const TAIL_LINES: usize = 15;

/// Opaque handle to an initialized compiler state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerState(PathBuf);

impl CompilerState {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// External document compiler.
pub trait CompilerBackend: Send {
    /// Build reusable compiler state from the preamble.
    fn initialize(&self, preamble: &str, workspace: &Path) -> Result<CompilerState, CompileError>;

    /// Compile the body against `state`, returning the produced artifact.
    fn compile(
        &self,
        body: &str,
        state: &CompilerState,
        workspace: &Path,
    ) -> Result<PathBuf, CompileError>;
}

/// Backend driving a `pdflatex`-compatible binary.
#[derive(Debug, Clone)]
pub struct LatexBackend {
    command: String,
}

impl LatexBackend {
    pub fn new(config: &LatexConfig) -> Self {
        Self {
            command: config.command.clone(),
        }
    }

    /// Base format to load in `-ini` mode: the binary's name without
    /// directory or extension (`/opt/texlive/bin/pdflatex` → `pdflatex`).
    fn base_format(&self) -> String {
        Path::new(&self.command)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.command.clone())
    }

    fn cmd(&self, workspace: &Path) -> Cmd {
        // Keep TeX from hard-wrapping error lines at 79 columns.
        Cmd::new(&self.command)
            .cwd(workspace)
            .envs([("max_print_line", "10000")])
    }
}

impl CompilerBackend for LatexBackend {
    fn initialize(&self, preamble: &str, workspace: &Path) -> Result<CompilerState, CompileError> {
        let jobname = format!("{PREAMBLE_PREFIX}{}", Fingerprint::of(preamble));
        let source = workspace.join(format!("{jobname}.tex"));
        fs::write(&source, preamble).map_err(|err| CompileError::Io(source.clone(), err))?;

        let output = self
            .cmd(workspace)
            .args([
                "-ini",
                "-interaction=nonstopmode",
                "-halt-on-error",
                &format!("-jobname={jobname}"),
                &format!("&{} {jobname}.tex\\dump", self.base_format()),
            ])
            .output()
            .map_err(|err| CompileError::Initialization {
                diagnostic: format!("{err:#}"),
            })?;

        let format = workspace.join(format!("{jobname}.fmt"));
        if !output.status.success() || !format.exists() {
            return Err(CompileError::Initialization {
                diagnostic: extract_diagnostics(&combined_output(&output)),
            });
        }

        remove_stale_formats(workspace, &jobname);
        Ok(CompilerState::new(workspace.join(jobname)))
    }

    fn compile(
        &self,
        body: &str,
        state: &CompilerState,
        workspace: &Path,
    ) -> Result<PathBuf, CompileError> {
        let source = workspace.join(format!("{LETTER_JOB}.tex"));
        fs::write(&source, body).map_err(|err| CompileError::Io(source.clone(), err))?;

        let pdf = workspace.join(format!("{LETTER_JOB}.pdf"));
        // A failed run must not leave the previous PDF looking fresh.
        if let Err(err) = fs::remove_file(&pdf)
            && err.kind() != std::io::ErrorKind::NotFound
        {
            return Err(CompileError::Io(pdf, err));
        }

        let output = self
            .cmd(workspace)
            .args([
                "-interaction=nonstopmode",
                "-halt-on-error",
                &format!("-jobname={LETTER_JOB}"),
                &format!("-fmt={}", state.path().display()),
                &format!("{LETTER_JOB}.tex"),
            ])
            .output()
            .map_err(|err| CompileError::Compilation {
                diagnostic: format!("{err:#}"),
            })?;

        if !output.status.success() {
            return Err(CompileError::Compilation {
                diagnostic: extract_diagnostics(&combined_output(&output)),
            });
        }
        if !pdf.exists() {
            return Err(CompileError::Compilation {
                diagnostic: "compiler finished without producing a PDF".into(),
            });
        }
        Ok(pdf)
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        text.push('\n');
        text.push_str(&stderr);
    }
    text
}

/// Delete format files of previous preambles, keeping `current`.
fn remove_stale_formats(workspace: &Path, current: &str) {
    let Ok(entries) = fs::read_dir(workspace) else {
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(PREAMBLE_PREFIX) && !name.starts_with(current) {
            let _ = fs::remove_file(entry.path());
        }
    }
}

/// Pull the interesting part out of TeX terminal output.
///
/// Collects every `! ...` error line together with the `l.<n>` context line
/// that follows it. Falls back to the tail of the output.
pub fn extract_diagnostics(output: &str) -> String {
    let lines: Vec<&str> = output.lines().collect();
    let mut picked = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        if lines[i].starts_with('!') {
            picked.push(lines[i]);
            if let Some(offset) = lines[i + 1..]
                .iter()
                .take(6)
                .position(|line| line.starts_with("l."))
            {
                picked.push(lines[i + 1 + offset]);
                i += offset + 1;
            }
        }
        i += 1;
    }

    if picked.is_empty() {
        let tail: Vec<&str> = lines
            .iter()
            .rev()
            .filter(|line| !line.trim().is_empty())
            .take(TAIL_LINES)
            .copied()
            .collect();
        return tail.into_iter().rev().collect::<Vec<_>>().join("\n");
    }
    picked.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNDEFINED: &str = "\
This is pdfTeX, Version 3.141592653-2.6-1.40.25
(./letter.tex
! Undefined control sequence.
l.12 \\foo
          bar
?
! Emergency stop.
l.12 \\foo
No pages of output.
";

    #[test]
    fn test_extract_error_lines() {
        let diagnostic = extract_diagnostics(UNDEFINED);
        assert_eq!(
            diagnostic,
            "! Undefined control sequence.\nl.12 \\foo\n! Emergency stop.\nl.12 \\foo"
        );
    }

    #[test]
    fn test_extract_missing_package() {
        let output = "\
(/usr/share/texlive/texmf-dist/tex/latex/koma-script/scrletter.sty
! LaTeX Error: File `nosuchfont.sty' not found.

Type X to quit or <RETURN> to proceed,
or enter new name. (Default extension: sty)

l.3 \\usepackage
                {nosuchfont}^^M
";
        let diagnostic = extract_diagnostics(output);
        assert!(diagnostic.starts_with("! LaTeX Error: File `nosuchfont.sty' not found."));
        assert!(diagnostic.ends_with("l.3 \\usepackage"));
    }

    #[test]
    fn test_extract_falls_back_to_tail() {
        let output: String = (1..=40).map(|n| format!("line {n}\n")).collect();
        let diagnostic = extract_diagnostics(&output);
        assert_eq!(diagnostic.lines().count(), TAIL_LINES);
        assert!(diagnostic.starts_with("line 26"));
        assert!(diagnostic.ends_with("line 40"));
    }

    #[test]
    fn test_extract_empty() {
        assert_eq!(extract_diagnostics(""), "");
    }

    #[test]
    fn test_remove_stale_formats() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("preamble-aaaa.fmt"), "").unwrap();
        fs::write(dir.path().join("preamble-aaaa.log"), "").unwrap();
        fs::write(dir.path().join("preamble-bbbb.fmt"), "").unwrap();
        fs::write(dir.path().join("letter.pdf"), "").unwrap();

        remove_stale_formats(dir.path(), "preamble-bbbb");

        assert!(!dir.path().join("preamble-aaaa.fmt").exists());
        assert!(!dir.path().join("preamble-aaaa.log").exists());
        assert!(dir.path().join("preamble-bbbb.fmt").exists());
        assert!(dir.path().join("letter.pdf").exists());
    }

    #[test]
    fn test_base_format_strips_directory() {
        let backend = LatexBackend {
            command: "/usr/local/texlive/2024/bin/x86_64-linux/pdflatex".into(),
        };
        assert_eq!(backend.base_format(), "pdflatex");

        let backend = LatexBackend {
            command: "lualatex".into(),
        };
        assert_eq!(backend.base_format(), "lualatex");
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_command_loads_named_format() {
        use std::os::unix::fs::PermissionsExt;

        let bin = tempfile::tempdir().unwrap();
        let compiler = bin.path().join("pdflatex");
        fs::write(
            &compiler,
            "#!/bin/sh\nfor a in \"$@\"; do echo \"ARG:$a\"; done > args.txt\n",
        )
        .unwrap();
        fs::set_permissions(&compiler, fs::Permissions::from_mode(0o755)).unwrap();

        let workspace = tempfile::tempdir().unwrap();
        let backend = LatexBackend {
            command: compiler.to_string_lossy().into_owned(),
        };
        // The fake compiler writes no format file.
        let err = backend.initialize("\\documentclass{scrletter}", workspace.path());
        assert!(matches!(err, Err(CompileError::Initialization { .. })));

        let args = fs::read_to_string(workspace.path().join("args.txt")).unwrap();
        let format_arg = args
            .lines()
            .find(|line| line.starts_with("ARG:&"))
            .unwrap();
        assert!(format_arg.starts_with("ARG:&pdflatex preamble-"), "{format_arg}");
        assert!(format_arg.ends_with(".tex\\dump"), "{format_arg}");
    }

    #[test]
    fn test_missing_compiler_reports_initialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LatexBackend {
            command: "hurtigbrief-no-such-latex".into(),
        };
        let err = backend
            .initialize("\\documentclass{scrletter}", dir.path())
            .unwrap_err();
        match err {
            CompileError::Initialization { diagnostic } => {
                assert!(diagnostic.contains("hurtigbrief-no-such-latex"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(dir.path().read_dir().unwrap().flatten().any(|entry| {
            entry.file_name().to_string_lossy().ends_with(".tex")
        }));
    }
}
