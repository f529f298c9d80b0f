//! Compile worker: turns one job into a PDF.
//!
//! ```text
//! Job ──render──► preamble + body
//!        preamble ──PreambleCache──► CompilerState   (initialize on miss)
//!        body + state ──compile──► workspace/letter.pdf ──deliver──► output
//! ```

use std::fs;
use std::path::PathBuf;

use super::messages::{CompileError, Job};
use crate::debug;
use crate::latex::{CompilerBackend, PreambleCache, Workspace};
use crate::template::Renderer;

/// Stage a job is in, for verbose tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Queued,
    Rendering,
    CacheHit,
    Initializing,
    Compiling,
    Delivering,
    Completed,
}

impl JobStage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Queued => "left the queue",
            Self::Rendering => "rendering",
            Self::CacheHit => "preamble cached",
            Self::Initializing => "initializing preamble",
            Self::Compiling => "compiling",
            Self::Delivering => "delivering",
            Self::Completed => "completed",
        }
    }
}

pub struct CompileWorker {
    renderer: Box<dyn Renderer>,
    backend: Box<dyn CompilerBackend>,
    cache: PreambleCache,
    workspace: Workspace,
    output: Option<PathBuf>,
}

impl CompileWorker {
    pub fn new(
        renderer: impl Renderer + 'static,
        backend: impl CompilerBackend + 'static,
        workspace: Workspace,
    ) -> Self {
        Self {
            renderer: Box::new(renderer),
            backend: Box::new(backend),
            cache: PreambleCache::new(),
            workspace,
            output: None,
        }
    }

    /// Copy each produced PDF to `output` instead of handing out the
    /// workspace path.
    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    /// Run one job to completion.
    pub fn run(&mut self, job: &Job) -> Result<PathBuf, CompileError> {
        trace(job, JobStage::Rendering);
        let rendered = self.renderer.render(&job.request)?;

        if self.cache.is_cached(&rendered.preamble) {
            trace(job, JobStage::CacheHit);
        } else {
            trace(job, JobStage::Initializing);
        }
        let state =
            self.cache
                .lookup(&rendered.preamble, self.backend.as_ref(), self.workspace.path())?;
        debug!(
            "cache";
            "preamble formats: {} reused, {} built",
            self.cache.hits(),
            self.cache.misses()
        );

        trace(job, JobStage::Compiling);
        let artifact = self
            .backend
            .compile(&rendered.body, &state, self.workspace.path())?;

        self.deliver(job, artifact)
    }

    fn deliver(&self, job: &Job, artifact: PathBuf) -> Result<PathBuf, CompileError> {
        let Some(dest) = &self.output else {
            return Ok(artifact);
        };
        trace(job, JobStage::Delivering);

        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|err| CompileError::Delivery(dest.clone(), err))?;
        }
        fs::copy(&artifact, dest).map_err(|err| CompileError::Delivery(dest.clone(), err))?;
        Ok(dest.clone())
    }

    pub fn cache(&self) -> &PreambleCache {
        &self.cache
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }
}

pub(super) fn trace(job: &Job, stage: JobStage) {
    debug!("compile"; "job {}: {}", job.id, stage.label());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::messages::JobId;
    use crate::pipeline::testing::{MockBackend, test_request};
    use crate::template::{RenderError, Rendered, TemplateRenderer};
    use std::sync::atomic::Ordering;

    fn job(id: u64, body: &str) -> Job {
        Job {
            id: JobId(id),
            request: test_request(body),
        }
    }

    fn worker(backend: MockBackend) -> CompileWorker {
        CompileWorker::new(TemplateRenderer, backend, Workspace::temporary().unwrap())
    }

    #[test]
    fn test_run_produces_pdf_in_workspace() {
        let backend = MockBackend::default();
        let mut worker = worker(backend.clone());

        let pdf = worker.run(&job(1, "Hallo Welt")).unwrap();
        assert!(pdf.starts_with(worker.workspace().path()));
        assert!(fs::read_to_string(&pdf).unwrap().contains("Hallo Welt"));
        assert_eq!(backend.compiled_bodies().len(), 1);
    }

    #[test]
    fn test_body_edits_reuse_preamble() {
        let backend = MockBackend::default();
        let mut worker = worker(backend.clone());

        worker.run(&job(1, "erste Fassung")).unwrap();
        worker.run(&job(2, "zweite Fassung")).unwrap();
        worker.run(&job(3, "dritte Fassung")).unwrap();

        assert_eq!(backend.inits.load(Ordering::SeqCst), 1);
        assert_eq!(worker.cache().hits(), 2);
        assert_eq!(worker.cache().misses(), 1);
        assert_eq!(backend.compiled_bodies().len(), 3);
    }

    #[test]
    fn test_design_change_reinitializes() {
        let backend = MockBackend::default();
        let mut worker = worker(backend.clone());

        worker.run(&job(1, "Text")).unwrap();
        let mut restyled = job(2, "Text");
        restyled.request.design.font = "libertine".into();
        worker.run(&restyled).unwrap();

        assert_eq!(backend.inits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_compile_failure_is_reported() {
        let mut worker = worker(MockBackend::default());
        let err = worker.run(&job(1, "\\fail")).unwrap_err();
        assert!(matches!(err, CompileError::Compilation { .. }));

        // The worker stays usable.
        assert!(worker.run(&job(2, "repariert")).is_ok());
    }

    #[test]
    fn test_render_failure_skips_compiler() {
        let backend = MockBackend::default();
        let renderer = |_: &crate::pipeline::CompileRequest| -> Result<Rendered, RenderError> {
            Err(RenderError::UnknownToken("BOGUS".into()))
        };
        let mut worker =
            CompileWorker::new(renderer, backend.clone(), Workspace::temporary().unwrap());

        let err = worker.run(&job(1, "Text")).unwrap_err();
        assert!(matches!(err, CompileError::Render(_)));
        assert_eq!(backend.inits.load(Ordering::SeqCst), 0);
        assert!(backend.compiled_bodies().is_empty());
    }

    #[test]
    fn test_delivers_to_output() {
        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("briefe/letter.pdf");
        let mut worker = worker(MockBackend::default()).with_output(Some(dest.clone()));

        let delivered = worker.run(&job(1, "Ausgabe")).unwrap();
        assert_eq!(delivered, dest);
        assert!(fs::read_to_string(&dest).unwrap().contains("Ausgabe"));
    }

    #[test]
    fn test_delivery_failure() {
        let out = tempfile::tempdir().unwrap();
        let blocker = out.path().join("file");
        fs::write(&blocker, "").unwrap();
        let dest = blocker.join("letter.pdf");
        let mut worker = worker(MockBackend::default()).with_output(Some(dest));

        let err = worker.run(&job(1, "Ausgabe")).unwrap_err();
        assert!(matches!(err, CompileError::Delivery(..)));
    }
}
