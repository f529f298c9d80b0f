//! `render`: compile a letter once.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use super::{build_worker, resolve_output};
use crate::config::BriefConfig;
use crate::letter::LetterFile;
use crate::log;
use crate::pipeline::{Job, JobId};

pub fn render_letter(letter: &Path, output: Option<&Path>, config: &BriefConfig) -> Result<()> {
    let request = LetterFile::load(letter)?.into_request(&config.letter)?;
    let dest = resolve_output(letter, output, config);
    let mut worker = build_worker(config, dest)?;

    let start = Instant::now();
    let job = Job {
        id: JobId(1),
        request,
    };
    match worker.run(&job) {
        Ok(pdf) => {
            log!("compile"; "wrote {} in {:.2}s", pdf.display(), start.elapsed().as_secs_f64());
            Ok(())
        }
        Err(err) => {
            let detail = err.detail();
            if !detail.is_empty() {
                eprintln!("{detail}");
            }
            Err(err.into())
        }
    }
}
