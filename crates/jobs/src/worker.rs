//! Background worker: runs one analysis job end to end.
//!
//! One worker task exists per job id. The worker is the only writer for
//! its job record; polling readers go through the registry.
//!
//! Cancellation is cooperative and single-checkpoint: the flag is
//! consulted exactly once, after the source download and before the
//! frame loop. A cancel request arriving mid-loop is recorded on the
//! job but does not interrupt the loop or external calls already
//! issued. (Checking the flag once per N loop iterations would bound
//! wasted work; that stricter behaviour is intentionally not adopted
//! here.)
//!
//! Locally staged files are removed on every exit path -- success,
//! failure, or pre-start cancellation.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;
use uuid::Uuid;

use matchlens_core::config::AnalysisConfig;
use matchlens_core::commentary::CommentarySample;
use matchlens_core::detector::MatchEvent;
use matchlens_narrator::Narrator;
use matchlens_pipeline::analyzer::{analyze_frames, STAGE_EVENT_LOOP};
use matchlens_pipeline::assign::PossessionAssigner;
use matchlens_pipeline::engine::{RenderPlan, Renderer, TrackingEngine};
use matchlens_pipeline::media::MediaStore;
use matchlens_pipeline::progress::{LiveSink, ProgressSink};

use crate::coaching;
use crate::error::JobError;
use crate::record::AnalysisResult;
use crate::registry::JobRegistry;
use crate::status::JobStatus;

/// Collaborators and configuration shared by all workers.
pub struct WorkerContext {
    pub config: AnalysisConfig,
    pub store: Arc<dyn MediaStore>,
    pub tracker: Arc<dyn TrackingEngine>,
    pub renderer: Arc<dyn Renderer>,
    pub assigner: Arc<dyn PossessionAssigner>,
    pub narrator: Arc<dyn Narrator>,
}

/// Spawn the background worker for a queued job.
pub fn spawn(registry: Arc<JobRegistry>, ctx: Arc<WorkerContext>, job_id: Uuid) -> JoinHandle<()> {
    tokio::spawn(async move {
        run_job(registry, ctx, job_id).await;
    })
}

/// How the job execution body ended, before terminal bookkeeping.
enum Outcome {
    Completed(Box<AnalysisResult>),
    Cancelled,
}

/// Run one job to a terminal state. Cleanup of staged artifacts happens
/// here, outside `execute`, so it covers every outcome identically.
pub async fn run_job(registry: Arc<JobRegistry>, ctx: Arc<WorkerContext>, job_id: Uuid) {
    let staging = Staging::new(job_id);
    let outcome = execute(&registry, &ctx, job_id, &staging).await;
    staging.cleanup().await;

    match outcome {
        Ok(Outcome::Completed(result)) => registry.complete(job_id, *result),
        Ok(Outcome::Cancelled) => registry.mark_cancelled(job_id),
        Err(err) => registry.fail(job_id, err.to_string()),
    }
}

/// The fallible job body. Any error returned here becomes the job's
/// error message verbatim; narration failures never propagate this far.
async fn execute(
    registry: &JobRegistry,
    ctx: &WorkerContext,
    job_id: Uuid,
    staging: &Staging,
) -> Result<Outcome, JobError> {
    let source_key = registry
        .get(job_id)
        .map(|record| record.source_key)
        .ok_or(JobError::UnknownJob(job_id))?;

    registry.set_status(job_id, JobStatus::Downloading);
    registry.set_stage(job_id, "downloading source media");
    ctx.store.fetch(&source_key, &staging.input).await?;
    registry.set_progress(job_id, 5);

    // The single cancellation checkpoint: before the frame loop starts.
    if registry.cancel_requested(job_id) {
        tracing::info!(job_id = %job_id, "Cancellation honoured before analysis started");
        return Ok(Outcome::Cancelled);
    }

    registry.set_status(job_id, JobStatus::Analyzing);
    registry.set_stage(job_id, "tracking objects");
    registry.set_progress(job_id, 10);
    let frames = ctx.tracker.track(&staging.input).await?;
    tracing::info!(job_id = %job_id, frames = frames.len(), "Tracking complete");

    registry.set_stage(job_id, STAGE_EVENT_LOOP);
    registry.set_progress(job_id, ctx.config.frame_loop_progress_start);
    let sink = RegistrySink { registry, job_id };
    let analysis = analyze_frames(
        &frames,
        &ctx.config,
        ctx.assigner.as_ref(),
        ctx.narrator.as_ref(),
        &sink,
        &sink,
    )
    .await;

    registry.set_stage(job_id, "generating coaching report");
    registry.set_progress(job_id, 92);
    let coaching = coaching::generate(
        analysis.possession,
        &analysis.subtitles,
        &analysis.events,
        None,
        ctx.narrator.as_ref(),
    )
    .await;

    registry.set_stage(job_id, "rendering output");
    let plan = RenderPlan {
        events: &analysis.events,
        subtitles: &analysis.subtitles,
        frame_notes: &analysis.frame_notes,
        possessors: &analysis.possessors,
    };
    ctx.renderer.render(&staging.input, &plan, &staging.output).await?;

    registry.set_status(job_id, JobStatus::Uploading);
    registry.set_stage(job_id, "uploading output");
    registry.set_progress(job_id, 95);
    let output_key = format!("outputs/analysis_{job_id}.json");
    let output_url = ctx.store.store(&staging.output, &output_key).await?;

    Ok(Outcome::Completed(Box::new(AnalysisResult {
        events: analysis.events,
        possession: analysis.possession,
        subtitles: analysis.subtitles,
        coaching,
        output_url,
    })))
}

/// Adapter exposing the registry as the frame loop's sinks.
struct RegistrySink<'a> {
    registry: &'a JobRegistry,
    job_id: Uuid,
}

impl ProgressSink for RegistrySink<'_> {
    fn update(&self, stage: &str, percent: u8) {
        self.registry.set_stage(self.job_id, stage);
        self.registry.set_progress(self.job_id, percent);
    }
}

impl LiveSink for RegistrySink<'_> {
    fn push_event(&self, event: &MatchEvent) {
        self.registry.push_event(self.job_id, event);
    }

    fn push_subtitle(&self, sample: &CommentarySample) {
        self.registry.push_subtitle(self.job_id, sample);
    }
}

/// Per-job local staging paths, scoped to the job's lifetime.
struct Staging {
    input: PathBuf,
    output: PathBuf,
}

impl Staging {
    fn new(job_id: Uuid) -> Self {
        let dir = std::env::temp_dir();
        Self {
            input: dir.join(format!("matchlens_input_{job_id}.json")),
            output: dir.join(format!("matchlens_output_{job_id}.json")),
        }
    }

    /// Remove staged files. Missing files are fine; other failures are
    /// logged and otherwise ignored -- cleanup must never fail a job.
    async fn cleanup(&self) {
        for path in [&self.input, &self.output] {
            if let Err(err) = tokio::fs::remove_file(path).await {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %err, "Failed to remove staged file");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::Path;
    use std::sync::Mutex;

    use matchlens_core::track::{BallTrack, BoundingBox, PlayerTrack, Team, TrackedFrame};
    use matchlens_narrator::StaticNarrator;
    use matchlens_pipeline::assign::NearestPlayerAssigner;
    use matchlens_pipeline::engine::{AnnotationWriter, JsonTrackSource};
    use matchlens_pipeline::media::{FsMediaStore, TransferError};

    use super::*;

    /// Three-frame fixture: player 1 (team A) holds the ball near the
    /// origin; player 2 (team B) takes it on frame 1; the ball flies on
    /// frame 2.
    fn fixture_frames() -> Vec<TrackedFrame> {
        let player = |x: f64, team: Team| PlayerTrack {
            bbox: BoundingBox::new(x, 0.0, x + 10.0, 20.0),
            speed: 0.0,
            team,
        };
        let ball_near = |x: f64| BallTrack {
            bbox: BoundingBox::new(x, 18.0, x + 4.0, 22.0),
            speed: 0.0,
        };
        (0..3)
            .map(|i| {
                let mut players = BTreeMap::new();
                players.insert(1, player(0.0, Team::A));
                players.insert(2, player(300.0, Team::B));
                let ball = match i {
                    0 => ball_near(3.0),
                    1 => ball_near(303.0),
                    _ => BallTrack {
                        bbox: BoundingBox::new(303.0, 18.0, 307.0, 22.0),
                        speed: 9.0,
                    },
                };
                TrackedFrame {
                    frame_index: i,
                    players,
                    ball,
                }
            })
            .collect()
    }

    async fn test_setup(name: &str) -> (Arc<JobRegistry>, Arc<WorkerContext>, String) {
        let root = std::env::temp_dir().join(format!("matchlens-worker-test-{name}"));
        tokio::fs::create_dir_all(&root).await.unwrap();
        let source_key = "uploads/match.json".to_string();
        let frames = serde_json::to_vec(&fixture_frames()).unwrap();
        tokio::fs::create_dir_all(root.join("uploads")).await.unwrap();
        tokio::fs::write(root.join(&source_key), frames).await.unwrap();

        let ctx = Arc::new(WorkerContext {
            config: AnalysisConfig::default(),
            store: Arc::new(FsMediaStore::new(&root)),
            tracker: Arc::new(JsonTrackSource),
            renderer: Arc::new(AnnotationWriter),
            assigner: Arc::new(NearestPlayerAssigner::new(70.0)),
            narrator: Arc::new(StaticNarrator::new("a fine passage of play")),
        });
        (Arc::new(JobRegistry::new()), ctx, source_key)
    }

    #[tokio::test]
    async fn successful_job_reaches_done_with_full_result() {
        let (registry, ctx, source_key) = test_setup("done").await;
        let job_id = registry.create(source_key);

        run_job(Arc::clone(&registry), ctx, job_id).await;

        let record = registry.get(job_id).unwrap();
        assert_eq!(record.status, JobStatus::Done);
        assert_eq!(record.progress, 100);
        let result = record.result.expect("done job must carry a result");
        // Pass + tackle at frame 1, shot at frame 2.
        assert_eq!(result.events.len(), 3);
        assert_eq!(result.coaching, "a fine passage of play");
        assert!(result.output_url.starts_with("file://"));
        // Possession: frame 0 team A, frames 1-2 team B.
        assert!(result.possession.team_b_pct > result.possession.team_a_pct);
    }

    #[tokio::test]
    async fn staged_files_are_removed_after_success() {
        let (registry, ctx, source_key) = test_setup("cleanup").await;
        let job_id = registry.create(source_key);
        run_job(Arc::clone(&registry), ctx, job_id).await;

        let staging = Staging::new(job_id);
        assert!(!staging.input.exists());
        assert!(!staging.output.exists());
    }

    #[tokio::test]
    async fn cancel_before_start_prevents_the_frame_loop() {
        let (registry, ctx, source_key) = test_setup("cancel").await;
        let job_id = registry.create(source_key);

        // Cancel while the job is still queued; the worker's checkpoint
        // runs after download and must honour it.
        registry.request_cancel(job_id);
        run_job(Arc::clone(&registry), ctx, job_id).await;

        let record = registry.get(job_id).unwrap();
        assert_eq!(record.status, JobStatus::Cancelled);
        assert!(record.result.is_none());
        assert!(record.live_events.is_empty(), "frame loop must not have run");

        // Cancelling again is a no-op returning the terminal status.
        assert_eq!(registry.request_cancel(job_id), Some(JobStatus::Cancelled));

        let staging = Staging::new(job_id);
        assert!(!staging.input.exists());
    }

    /// Store that files a cancellation request while the fetch is still
    /// in flight, recording the job status it observed at that moment.
    struct CancelDuringFetch {
        inner: FsMediaStore,
        registry: Arc<JobRegistry>,
        job_id: Uuid,
        status_at_cancel: Mutex<Option<JobStatus>>,
    }

    #[async_trait::async_trait]
    impl MediaStore for CancelDuringFetch {
        async fn fetch(&self, key: &str, dest: &Path) -> Result<(), TransferError> {
            self.inner.fetch(key, dest).await?;
            let observed = self.registry.request_cancel(self.job_id);
            *self.status_at_cancel.lock().unwrap() = observed;
            Ok(())
        }

        async fn store(&self, src: &Path, key: &str) -> Result<String, TransferError> {
            self.inner.store(src, key).await
        }
    }

    #[tokio::test]
    async fn cancel_during_download_is_honoured_at_the_checkpoint() {
        let (registry, _, source_key) = test_setup("mid-download").await;
        let job_id = registry.create(source_key);

        let root = std::env::temp_dir().join("matchlens-worker-test-mid-download");
        let store = Arc::new(CancelDuringFetch {
            inner: FsMediaStore::new(root),
            registry: Arc::clone(&registry),
            job_id,
            status_at_cancel: Mutex::new(None),
        });
        let ctx = Arc::new(WorkerContext {
            config: AnalysisConfig::default(),
            store: Arc::clone(&store) as Arc<dyn MediaStore>,
            tracker: Arc::new(JsonTrackSource),
            renderer: Arc::new(AnnotationWriter),
            assigner: Arc::new(NearestPlayerAssigner::new(70.0)),
            narrator: Arc::new(StaticNarrator::new("a fine passage of play")),
        });

        run_job(Arc::clone(&registry), ctx, job_id).await;

        // The request landed while the download stage was running.
        assert_eq!(
            *store.status_at_cancel.lock().unwrap(),
            Some(JobStatus::Downloading)
        );

        let record = registry.get(job_id).unwrap();
        assert_eq!(record.status, JobStatus::Cancelled);
        assert!(record.result.is_none());
        assert!(record.live_events.is_empty(), "frame loop must not have run");

        let staging = Staging::new(job_id);
        assert!(!staging.input.exists());
    }

    #[tokio::test]
    async fn missing_source_marks_the_job_failed() {
        let (registry, ctx, _) = test_setup("fail").await;
        let job_id = registry.create("uploads/no-such-object.json".to_string());

        run_job(Arc::clone(&registry), ctx, job_id).await;

        let record = registry.get(job_id).unwrap();
        assert_eq!(record.status, JobStatus::Error);
        assert!(record.result.is_none());
        let message = record.error.expect("failed job must carry a message");
        assert!(message.contains("no-such-object"), "got: {message}");
    }

    #[tokio::test]
    async fn corrupt_frames_payload_is_an_analysis_failure() {
        let (registry, ctx, _) = test_setup("corrupt").await;
        let root = std::env::temp_dir().join("matchlens-worker-test-corrupt");
        tokio::fs::write(root.join("uploads/match.json"), b"not json")
            .await
            .unwrap();
        let job_id = registry.create("uploads/match.json".to_string());

        run_job(Arc::clone(&registry), ctx, job_id).await;

        let record = registry.get(job_id).unwrap();
        assert_eq!(record.status, JobStatus::Error);
        assert!(record
            .error
            .unwrap()
            .contains("Failed to decode tracked frames"));
    }

    #[tokio::test]
    async fn live_buffers_match_final_result() {
        let (registry, ctx, source_key) = test_setup("live").await;
        let job_id = registry.create(source_key);
        run_job(Arc::clone(&registry), ctx, job_id).await;

        let record = registry.get(job_id).unwrap();
        let result = record.result.unwrap();
        assert_eq!(record.live_events.len(), result.events.len());
        assert_eq!(record.live_subtitles.len(), result.subtitles.len());
    }
}
