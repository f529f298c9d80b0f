//! `watch`: recompile a letter every time it is saved.
//!
//! File events feed the [`TaskManager`]; a reporter thread renders compile
//! results as a single status block that each result replaces.

use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use crossbeam::channel::{self, Receiver};
use notify::event::ModifyKind;
use notify::{EventKind, RecursiveMode, Watcher};

use super::{build_worker, resolve_output};
use crate::config::BriefConfig;
use crate::letter::LetterFile;
use crate::logger::{is_verbose, status_detach, status_error, status_success};
use crate::pipeline::{CompileEvent, CompileOutcome, CompileRequest, CompileResult, TaskManager};
use crate::utils::path::normalize_path;
use crate::{debug, log};

pub fn watch_letter(letter: &Path, output: Option<&Path>, config: &BriefConfig) -> Result<()> {
    let letter = normalize_path(letter);
    let dir = letter
        .parent()
        .ok_or_else(|| anyhow!("{} has no parent directory", letter.display()))?
        .to_path_buf();

    let dest = resolve_output(&letter, output, config);
    let manager = TaskManager::start(&config.scheduler, build_worker(config, dest)?)?;
    let reporter = spawn_reporter(manager.events())?;

    let (shutdown_tx, shutdown_rx) = channel::bounded(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })
    .context("failed to install Ctrl+C handler")?;

    let (notify_tx, notify_rx) = channel::unbounded();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let _ = notify_tx.send(res);
    })?;
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", dir.display()))?;

    log!("watch"; "watching {} (Ctrl+C to stop)", letter.display());

    let mut session = Session::new(letter, config);
    session.reload(&manager);

    loop {
        channel::select! {
            recv(shutdown_rx) -> _ => break,
            recv(notify_rx) -> event => {
                match event {
                    Ok(Ok(event)) => {
                        if session.is_affected_by(&event) {
                            session.reload(&manager);
                        }
                    }
                    Ok(Err(err)) => {
                        log!("watch"; "watcher error: {}", err);
                        status_detach();
                    }
                    Err(_) => break,
                }
            }
        }
    }

    log!("watch"; "stopping");
    drop(watcher);
    manager.shutdown();
    let _ = reporter.join();
    Ok(())
}

/// State of one watched letter.
struct Session<'a> {
    letter: PathBuf,
    config: &'a BriefConfig,
    /// Last snapshot handed to the pipeline.
    last: Option<CompileRequest>,
}

impl<'a> Session<'a> {
    fn new(letter: PathBuf, config: &'a BriefConfig) -> Self {
        Self {
            letter,
            config,
            last: None,
        }
    }

    /// Whether `event` means the letter's content may have changed.
    fn is_affected_by(&self, event: &notify::Event) -> bool {
        let relevant = match event.kind {
            EventKind::Create(_) => true,
            // Metadata-only changes (mtime/atime/chmod) carry no new content
            EventKind::Modify(ModifyKind::Metadata(_)) => false,
            EventKind::Modify(_) => true,
            _ => false,
        };
        relevant && event.paths.iter().any(|path| path == &self.letter)
    }

    /// Read the letter and submit it if its content changed.
    ///
    /// Editors often emit several events per save. Identical snapshots are
    /// dropped so they do not skew the typing statistics.
    fn reload(&mut self, manager: &TaskManager) {
        let request = match load_request(&self.letter, self.config) {
            Ok(request) => request,
            Err(err) => {
                status_error(
                    &format!("{} is invalid", display_name(&self.letter)),
                    &format!("{err:#}"),
                );
                return;
            }
        };

        if self.last.as_ref() == Some(&request) {
            debug!("watch"; "content unchanged, skipping");
            return;
        }
        self.last = Some(request.clone());
        manager.submit(request);
    }
}

fn load_request(letter: &Path, config: &BriefConfig) -> Result<CompileRequest> {
    Ok(LetterFile::load(letter)?.into_request(&config.letter)?)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn spawn_reporter(events: Receiver<CompileEvent>) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("hurtigbrief-report".into())
        .spawn(move || {
            for event in events {
                match event {
                    CompileEvent::CompileTime { job, elapsed } => {
                        debug!("compile"; "job {} took {:.2}s", job, elapsed.as_secs_f64());
                    }
                    CompileEvent::Finished(result) => report(&result),
                }
            }
        })
        .context("failed to spawn result reporter")
}

fn report(result: &CompileResult) {
    // Verbose logs were printed since the last block; keep them visible.
    if is_verbose() {
        status_detach();
    }
    match &result.outcome {
        CompileOutcome::Success(pdf) => status_success(&format!(
            "{} ({:.2}s)",
            pdf.display(),
            result.elapsed.as_secs_f64()
        )),
        CompileOutcome::Failed(err) => {
            status_error(&format!("job {}: {}", result.job, err), &err.detail());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind};

    fn event(kind: EventKind, path: &str) -> notify::Event {
        notify::Event {
            kind,
            paths: vec![PathBuf::from(path)],
            attrs: Default::default(),
        }
    }

    fn session(config: &BriefConfig) -> Session<'_> {
        Session::new(PathBuf::from("/briefe/amt.toml"), config)
    }

    fn data_change() -> EventKind {
        EventKind::Modify(ModifyKind::Data(DataChange::Any))
    }

    #[test]
    fn test_content_events_affect_letter() {
        let config = BriefConfig::default();
        let session = session(&config);

        assert!(session.is_affected_by(&event(data_change(), "/briefe/amt.toml")));

        let create = EventKind::Create(CreateKind::File);
        assert!(session.is_affected_by(&event(create, "/briefe/amt.toml")));
    }

    #[test]
    fn test_metadata_and_other_files_ignored() {
        let config = BriefConfig::default();
        let session = session(&config);

        let metadata = EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime));
        assert!(!session.is_affected_by(&event(metadata, "/briefe/amt.toml")));

        assert!(!session.is_affected_by(&event(data_change(), "/briefe/amt.pdf")));
        assert!(!session.is_affected_by(&event(data_change(), "/briefe/.amt.toml.swp")));
    }

    #[test]
    fn test_invalid_letter_not_submitted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amt.toml");
        std::fs::write(&path, "subject = [unclosed").unwrap();

        let config = BriefConfig::default();
        assert!(load_request(&path, &config).is_err());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/briefe/amt.toml")), "amt.toml");
    }
}
