use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use stencil_fast_bridge::{BridgeOutcome, BridgeReport};
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info};

use crate::error::StencilError;
use crate::export::{write_png, write_preview, write_report};
use crate::layout::PaperCanvas;
use crate::progress;
use crate::settings::EffectiveSettings;
use crate::stencil::{render_stencil, StencilJob};

const FALLBACK_STEM: &str = "stencil";

pub struct ExecutionPlan {
    pub jobs: Vec<StencilJob>,
    pub pretty_reports: bool,
    /// Upper bound on jobs rendering at the same time.
    pub concurrency: usize,
}

#[derive(Debug, Clone)]
pub struct JobSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub preview: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    pub outcome: Option<BridgeOutcome>,
    pub hint: String,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub completed: Vec<JobSummary>,
    pub failed: Vec<(PathBuf, StencilError)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

type JobResult = Result<(JobSummary, Option<BridgeReport>), StencilError>;

/// Expands the settings into one job per input.
pub fn build_plan(inputs: &[PathBuf], settings: &EffectiveSettings) -> ExecutionPlan {
    let canvas = PaperCanvas::new(
        settings.paper.format,
        settings.paper.orientation,
        settings.paper.dpi,
    );
    debug!(
        paper = settings.paper.format.as_str(),
        orientation = ?settings.paper.orientation,
        width = canvas.width,
        height = canvas.height,
        dpi = canvas.dpi,
        "planned canvas"
    );
    let output = &settings.output;
    let single_file = output.file.as_ref().filter(|_| inputs.len() == 1);

    let jobs = inputs
        .iter()
        .map(|input| {
            let stem = input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| FALLBACK_STEM.to_string());
            let (dir, output_path) = match single_file {
                Some(file) => (sibling_dir(file), file.clone()),
                None => (
                    output.dir.clone(),
                    output.dir.join(format!("{stem}-stencil.png")),
                ),
            };
            StencilJob {
                input: input.clone(),
                output: output_path,
                preview: output
                    .preview
                    .then(|| dir.join(format!("{stem}-preview.png"))),
                report: output
                    .report
                    .then(|| dir.join(format!("{stem}-bridges.json"))),
                canvas,
                threshold: settings.threshold,
                bridges: settings.bridges,
                tone: settings.tone,
            }
        })
        .collect();

    ExecutionPlan {
        jobs,
        pretty_reports: output.pretty,
        concurrency: std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1),
    }
}

fn sibling_dir(file: &Path) -> PathBuf {
    file.parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Renders every job on the blocking pool, at most `concurrency` at a time,
/// and reports results in input order.
pub async fn run(plan: ExecutionPlan) -> RunSummary {
    let bar = progress::job_bar(plan.jobs.len() as u64);
    let limit = plan.concurrency.max(1);
    let pretty = plan.pretty_reports;
    let mut in_flight: VecDeque<(PathBuf, JoinHandle<JobResult>)> = VecDeque::with_capacity(limit);
    let mut summary = RunSummary::default();

    for job in plan.jobs {
        if in_flight.len() >= limit {
            if let Some((input, handle)) = in_flight.pop_front() {
                let result = finish_job(handle, pretty).await;
                record(&bar, &mut summary, input, result);
            }
        }
        debug!(input = %job.input.display(), "queued stencil job");
        let input = job.input.clone();
        in_flight.push_back((input, task::spawn_blocking(move || process_job(job))));
    }

    while let Some((input, handle)) = in_flight.pop_front() {
        let result = finish_job(handle, pretty).await;
        record(&bar, &mut summary, input, result);
    }

    bar.finish_with_message(format!(
        "{} written, {} failed",
        summary.completed.len(),
        summary.failed.len()
    ));
    summary
}

fn process_job(job: StencilJob) -> JobResult {
    let image = image::open(&job.input).map_err(|source| StencilError::Decode {
        path: job.input.clone(),
        source,
    })?;
    let output = render_stencil(&image, &job)?;
    write_png(&job.output, &output.image)?;
    if let Some(path) = &job.preview {
        write_preview(path, &output.image)?;
    }

    let hint = output.hint();
    let outcome = output.outcome();
    let report = job
        .report
        .is_some()
        .then_some(output.bridge_run)
        .flatten()
        .map(|run| run.report);
    let (width, height) = output.image.dimensions();

    let summary = JobSummary {
        report: job.report.filter(|_| report.is_some()),
        input: job.input,
        output: job.output,
        preview: job.preview,
        width,
        height,
        outcome,
        hint,
    };
    Ok((summary, report))
}

async fn finish_job(
    handle: JoinHandle<JobResult>,
    pretty: bool,
) -> Result<JobSummary, StencilError> {
    let (summary, report) = handle.await??;
    if let (Some(path), Some(report)) = (&summary.report, &report) {
        write_report(path, report, pretty).await?;
    }
    Ok(summary)
}

fn record(
    bar: &ProgressBar,
    summary: &mut RunSummary,
    input: PathBuf,
    result: Result<JobSummary, StencilError>,
) {
    match result {
        Ok(job) => {
            bar.println(format!("{}: {}", job.input.display(), job.hint));
            info!(
                input = %job.input.display(),
                output = %job.output.display(),
                outcome = ?job.outcome,
                "stencil written"
            );
            summary.completed.push(job);
        }
        Err(err) => {
            bar.println(format!("{}: {err}", input.display()));
            error!(input = %input.display(), "stencil failed: {err}");
            summary.failed.push((input, err));
        }
    }
    bar.inc(1);
}
