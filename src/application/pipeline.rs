use crate::auth::VideoId;
use crate::config::{AudioConfig, Config};
use crate::domain::layout::WorkspaceLayout;
use crate::domain::outcome::{sort_by_bitrate, PipelineOutcome, RenditionResult, Stage};
use crate::domain::planner::{plan, QualityTier, RenditionPlan};
use crate::error::PipelineError;
use crate::ports::media::{
    AudioEncode, EncodeEngine, ManifestBuilder, MediaProbe, RenditionEncode, ThumbnailExtractor,
};
use crate::ports::notifier::CatalogNotifier;
use crate::ports::storage::Publisher;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const VIDEO_CODEC: &str = "h264";

/// The external media tools a run drives.
#[derive(Clone)]
pub struct MediaTools {
    pub probe: Arc<dyn MediaProbe>,
    pub encoder: Arc<dyn EncodeEngine>,
    pub packager: Arc<dyn ManifestBuilder>,
    pub thumbnailer: Arc<dyn ThumbnailExtractor>,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub tiers: Vec<QualityTier>,
    pub video_codec: String,
    pub audio: AudioConfig,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tiers: config.qualities.clone(),
            video_codec: VIDEO_CODEC.to_string(),
            audio: config.audio.clone(),
        }
    }
}

/// Result of one run: the stages it went through and how it ended.
#[derive(Debug)]
pub struct PipelineRun {
    pub stages: Vec<Stage>,
    pub outcome: Result<PipelineOutcome, PipelineError>,
}

struct Trail<'a> {
    video_id: &'a VideoId,
    stages: Vec<Stage>,
}

impl Trail<'_> {
    fn enter(&mut self, stage: Stage) {
        info!(video_id = %self.video_id, "{}", stage);
        self.stages.push(stage);
    }
}

/// Turns one finished upload into a published DASH package.
pub struct PipelineService<P, N> {
    tools: MediaTools,
    publisher: P,
    notifier: N,
    layout: WorkspaceLayout,
    settings: PipelineSettings,
}

impl<P, N> PipelineService<P, N>
where
    P: Publisher,
    N: CatalogNotifier,
{
    pub fn new(
        tools: MediaTools,
        publisher: P,
        notifier: N,
        layout: WorkspaceLayout,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            tools,
            publisher,
            notifier,
            layout,
            settings,
        }
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    /// Runs the whole pipeline for the upload stored at `upload`. The catalog
    /// is always told the outcome and the workspace is always removed.
    pub async fn process(&self, upload_id: &str, upload: &Path, video_id: &VideoId) -> PipelineRun {
        let mut trail = Trail {
            video_id,
            stages: Vec::new(),
        };

        let outcome = self.produce(upload, video_id, &mut trail).await;

        match &outcome {
            Ok(result) => {
                trail.enter(Stage::Notifying);
                let report = result.ready_report(Utc::now());
                if let Err(e) = self.notifier.report_ready(video_id, &report).await {
                    warn!(%video_id, "catalog ready notification failed: {}", e);
                }
            }
            Err(e) => {
                error!(%video_id, %upload_id, "pipeline failed: {}", e);
                trail.enter(Stage::Failed);
                trail.enter(Stage::Notifying);
                if let Err(e) = self.notifier.report_failed(video_id).await {
                    warn!(%video_id, "catalog failure notification failed: {}", e);
                }
            }
        }

        trail.enter(Stage::CleaningUp);
        self.cleanup(upload_id, upload, video_id).await;

        if outcome.is_ok() {
            trail.enter(Stage::Done);
        }

        PipelineRun {
            stages: trail.stages,
            outcome,
        }
    }

    async fn produce(
        &self,
        upload: &Path,
        video_id: &VideoId,
        trail: &mut Trail<'_>,
    ) -> Result<PipelineOutcome, PipelineError> {
        trail.enter(Stage::Probing);
        let source = self.tools.probe.probe(upload).await?;
        info!(
            %video_id,
            "source {}x{} @ {:.2} fps, {} bit/s, {:.1}s ({})",
            source.width,
            source.height,
            source.frame_rate,
            source.bitrate,
            source.duration,
            source.codec
        );

        trail.enter(Stage::Planning);
        let plans = plan(&source, &self.settings.tiers);

        self.prepare_workspace(video_id)
            .await
            .map_err(PipelineError::Workspace)?;

        let total = plans.len();
        let mut renditions = Vec::with_capacity(total);
        for (index, rendition) in plans.iter().enumerate() {
            trail.enter(Stage::Encoding { index, total });
            renditions.push(self.encode_rendition(upload, video_id, rendition).await?);
        }
        let tracks: Vec<PathBuf> = renditions.iter().map(|r| r.path.clone()).collect();
        sort_by_bitrate(&mut renditions);

        trail.enter(Stage::EncodingAudio);
        let audio = self.layout.audio_path(video_id);
        let audio_job = AudioEncode {
            src: upload.to_path_buf(),
            dst: audio.clone(),
            codec: self.settings.audio.codec.clone(),
            channels: self.settings.audio.channels,
            bitrate: self.settings.audio.bitrate,
        };
        self.tools
            .encoder
            .encode_audio(&audio_job)
            .await
            .map_err(PipelineError::EncodeAudio)?;

        trail.enter(Stage::Packaging);
        let manifest = self.layout.manifest_path(video_id);
        self.tools
            .packager
            .build_manifest(&manifest, &audio, &tracks)
            .await
            .map_err(PipelineError::Manifest)?;

        trail.enter(Stage::Thumbnailing);
        let thumbnail = self.layout.thumbnail_path(video_id);
        self.tools
            .thumbnailer
            .extract(&upload, &thumbnail, source.duration / 2.0)
            .await?;

        trail.enter(Stage::Publishing);
        self.publisher
            .publish(&self.layout.dash_dir(video_id), video_id.as_str())
            .await?;

        Ok(PipelineOutcome {
            source,
            renditions,
            audio,
            manifest,
            thumbnail,
        })
    }

    async fn prepare_workspace(&self, video_id: &VideoId) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.layout.encode_dir(video_id)).await?;
        tokio::fs::create_dir_all(self.layout.dash_dir(video_id)).await
    }

    async fn encode_rendition(
        &self,
        upload: &Path,
        video_id: &VideoId,
        rendition: &RenditionPlan,
    ) -> Result<RenditionResult, PipelineError> {
        let src = self.encode_source(upload, video_id, rendition).await;
        let dst = self.layout.rendition_path(video_id, &rendition.name);
        debug!(%video_id, "encoding {} from {}", rendition.name, src.display());

        let job = RenditionEncode {
            src,
            dst: dst.clone(),
            width: rendition.width,
            height: rendition.height,
            codec: self.settings.video_codec.clone(),
            frame_rate: rendition.frame_rate,
            bitrate: rendition.bitrate,
        };
        self.tools
            .encoder
            .encode_video(&job)
            .await
            .map_err(|source| PipelineError::Encode {
                rendition: rendition.name.clone(),
                source,
            })?;

        let info = self
            .tools
            .probe
            .probe(&dst)
            .await
            .map_err(|source| PipelineError::ProbeRendition {
                rendition: rendition.name.clone(),
                source,
            })?;

        Ok(RenditionResult {
            name: rendition.name.clone(),
            path: dst,
            info,
        })
    }

    /// First already-encoded `prior_src` output, else the upload itself.
    async fn encode_source(
        &self,
        upload: &Path,
        video_id: &VideoId,
        rendition: &RenditionPlan,
    ) -> PathBuf {
        for candidate in rendition.candidate_sources(&self.layout.encode_dir(video_id)) {
            if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                return candidate;
            }
        }
        upload.to_path_buf()
    }

    /// Reports a run that never finished as failed, then cleans up after it.
    pub async fn abandon(&self, upload_id: &str, upload: &Path, video_id: &VideoId) {
        if let Err(e) = self.notifier.report_failed(video_id).await {
            warn!(%video_id, "catalog failure notification failed: {}", e);
        }
        self.cleanup(upload_id, upload, video_id).await;
    }

    /// Removes the working directory, the raw upload and its sidecar. Safe
    /// to repeat.
    pub async fn cleanup(&self, upload_id: &str, upload: &Path, video_id: &VideoId) {
        let _ = tokio::fs::remove_dir_all(self.layout.video_dir(video_id)).await;
        let _ = tokio::fs::remove_file(upload).await;
        let _ = tokio::fs::remove_file(self.layout.upload_info_path(upload_id)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::media::SourceMediaInfo;
    use crate::error::{NotifyError, ProbeError, PublishError, ThumbnailError, ToolError};
    use crate::ports::notifier::MockCatalogNotifier;
    use crate::ports::storage::MockPublisher;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::{tempdir, TempDir};

    fn source(width: u32, height: u32) -> SourceMediaInfo {
        SourceMediaInfo {
            width,
            height,
            duration: 20.0,
            frame_rate: 30.0,
            bitrate: 10_000_000,
            codec: "h264".to_string(),
        }
    }

    fn tier(name: &str, width: u32, height: u32, bitrate: u32, prior_src: &[&str]) -> QualityTier {
        QualityTier {
            name: name.to_string(),
            width,
            height,
            frame_rate: 30.0,
            bitrate,
            fps_filter: 0.0,
            prior_src: prior_src.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn launch_error() -> ToolError {
        ToolError::Launch {
            program: "ffmpeg".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        }
    }

    /// Reports the source for the upload and reads back the bitrate the
    /// fake encoder wrote into each rendition.
    struct FakeProbe {
        source: Option<SourceMediaInfo>,
    }

    #[async_trait]
    impl MediaProbe for FakeProbe {
        async fn probe(&self, path: &Path) -> Result<SourceMediaInfo, ProbeError> {
            let source = self
                .source
                .clone()
                .ok_or_else(|| ProbeError::NoVideoStream(path.to_path_buf()))?;
            if path.extension().is_some_and(|e| e == "mp4") {
                let kbps: u64 = std::fs::read_to_string(path)
                    .map_err(|e| ProbeError::Parse(e.to_string()))?
                    .parse()
                    .map_err(|_| ProbeError::Parse("bitrate".to_string()))?;
                return Ok(SourceMediaInfo {
                    bitrate: kbps * 1000,
                    ..source
                });
            }
            Ok(source)
        }
    }

    #[derive(Default)]
    struct FakeEncoder {
        videos: Mutex<Vec<RenditionEncode>>,
        audio: Mutex<Vec<AudioEncode>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl EncodeEngine for FakeEncoder {
        async fn encode_video(&self, job: &RenditionEncode) -> Result<(), ToolError> {
            self.videos.lock().unwrap().push(job.clone());
            if self.fail_on.as_deref() == job.dst.file_stem().and_then(|s| s.to_str()) {
                return Err(launch_error());
            }
            std::fs::write(&job.dst, job.bitrate.to_string()).map_err(|source| ToolError::Launch {
                program: "ffmpeg".to_string(),
                source,
            })
        }

        async fn encode_audio(&self, job: &AudioEncode) -> Result<(), ToolError> {
            self.audio.lock().unwrap().push(job.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakePackager {
        calls: Mutex<Vec<(PathBuf, PathBuf, Vec<PathBuf>)>>,
    }

    #[async_trait]
    impl ManifestBuilder for FakePackager {
        async fn build_manifest(
            &self,
            dst: &Path,
            audio: &Path,
            videos: &[PathBuf],
        ) -> Result<(), ToolError> {
            self.calls
                .lock()
                .unwrap()
                .push((dst.to_path_buf(), audio.to_path_buf(), videos.to_vec()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeThumbnailer {
        positions: Mutex<Vec<f64>>,
    }

    #[async_trait]
    impl ThumbnailExtractor for FakeThumbnailer {
        async fn extract(
            &self,
            _src: &Path,
            _dst: &Path,
            position: f64,
        ) -> Result<(), ThumbnailError> {
            self.positions.lock().unwrap().push(position);
            Ok(())
        }
    }

    struct Harness {
        dir: TempDir,
        encoder: Arc<FakeEncoder>,
        packager: Arc<FakePackager>,
        thumbnailer: Arc<FakeThumbnailer>,
        video_id: VideoId,
    }

    impl Harness {
        fn new(encoder: FakeEncoder) -> Self {
            let dir = tempdir().unwrap();
            std::fs::write(dir.path().join("u1"), b"raw upload").unwrap();
            std::fs::write(dir.path().join("u1.info"), b"{}").unwrap();
            Self {
                dir,
                encoder: Arc::new(encoder),
                packager: Arc::new(FakePackager::default()),
                thumbnailer: Arc::new(FakeThumbnailer::default()),
                video_id: VideoId::parse("v1").unwrap(),
            }
        }

        fn layout(&self) -> WorkspaceLayout {
            WorkspaceLayout::new(self.dir.path())
        }

        fn upload(&self) -> PathBuf {
            self.layout().upload_path("u1")
        }

        fn service(
            &self,
            source: Option<SourceMediaInfo>,
            tiers: Vec<QualityTier>,
            publisher: MockPublisher,
            notifier: MockCatalogNotifier,
        ) -> PipelineService<MockPublisher, MockCatalogNotifier> {
            let tools = MediaTools {
                probe: Arc::new(FakeProbe { source }),
                encoder: self.encoder.clone(),
                packager: self.packager.clone(),
                thumbnailer: self.thumbnailer.clone(),
            };
            let settings = PipelineSettings {
                tiers,
                video_codec: "h264".to_string(),
                audio: AudioConfig::default(),
            };
            PipelineService::new(tools, publisher, notifier, self.layout(), settings)
        }

        fn assert_cleaned(&self) {
            let layout = self.layout();
            assert!(!layout.video_dir(&self.video_id).exists());
            assert!(!layout.upload_path("u1").exists());
            assert!(!layout.upload_info_path("u1").exists());
        }
    }

    fn publisher_ok(layout: WorkspaceLayout) -> MockPublisher {
        let mut publisher = MockPublisher::new();
        publisher
            .expect_publish()
            .withf(move |dir, dst| {
                dir == layout.dash_dir(&VideoId::parse("v1").unwrap()) && dst == "v1"
            })
            .times(1)
            .returning(|_, _| Ok(()));
        publisher
    }

    fn ladder() -> Vec<QualityTier> {
        vec![
            tier("1080p", 1920, 1080, 4500, &[]),
            tier("720p", 1280, 720, 2500, &["1080p"]),
            tier("480p", 854, 480, 1200, &["720p", "1080p"]),
        ]
    }

    #[tokio::test]
    async fn test_successful_run_visits_every_stage() {
        let h = Harness::new(FakeEncoder::default());

        let mut notifier = MockCatalogNotifier::new();
        notifier
            .expect_report_ready()
            .withf(|id, report| {
                id.as_str() == "v1" && report.width == 1920 && report.status == "ACTIVE"
            })
            .times(1)
            .returning(|_, _| Ok(()));
        notifier.expect_report_failed().times(0);

        let service = h.service(
            Some(source(1920, 1080)),
            ladder(),
            publisher_ok(h.layout()),
            notifier,
        );
        let run = service.process("u1", &h.upload(), &h.video_id).await;

        assert_eq!(
            run.stages,
            vec![
                Stage::Probing,
                Stage::Planning,
                Stage::Encoding { index: 0, total: 3 },
                Stage::Encoding { index: 1, total: 3 },
                Stage::Encoding { index: 2, total: 3 },
                Stage::EncodingAudio,
                Stage::Packaging,
                Stage::Thumbnailing,
                Stage::Publishing,
                Stage::Notifying,
                Stage::CleaningUp,
                Stage::Done,
            ]
        );

        let outcome = run.outcome.unwrap();
        let names: Vec<&str> = outcome.renditions.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["1080p", "720p", "480p"]);

        let layout = h.layout();
        let audio = h.encoder.audio.lock().unwrap();
        assert_eq!(audio.len(), 1);
        assert_eq!(audio[0].src, layout.upload_path("u1"));
        assert_eq!(audio[0].codec, "aac");
        assert_eq!(audio[0].bitrate, 128);

        let calls = h.packager.calls.lock().unwrap();
        assert_eq!(calls[0].0, layout.manifest_path(&h.video_id));
        assert_eq!(calls[0].1, layout.audio_path(&h.video_id));
        assert_eq!(calls[0].2.len(), 3);

        assert_eq!(*h.thumbnailer.positions.lock().unwrap(), vec![10.0]);
        h.assert_cleaned();
    }

    #[tokio::test]
    async fn test_prior_sources_feed_later_renditions() {
        let h = Harness::new(FakeEncoder::default());

        let mut notifier = MockCatalogNotifier::new();
        notifier.expect_report_ready().returning(|_, _| Ok(()));

        let service = h.service(
            Some(source(1920, 1080)),
            ladder(),
            publisher_ok(h.layout()),
            notifier,
        );
        service.process("u1", &h.upload(), &h.video_id).await.outcome.unwrap();

        let layout = h.layout();
        let videos = h.encoder.videos.lock().unwrap();
        assert_eq!(videos[0].src, layout.upload_path("u1"));
        assert_eq!(videos[1].src, layout.rendition_path(&h.video_id, "1080p"));
        assert_eq!(videos[2].src, layout.rendition_path(&h.video_id, "720p"));
        assert!(videos.iter().all(|v| v.codec == "h264" && v.height == -1));
    }

    #[tokio::test]
    async fn test_source_is_read_from_the_stored_upload_path() {
        let h = Harness::new(FakeEncoder::default());
        let stored = h.dir.path().join("incoming.bin");
        std::fs::write(&stored, b"raw upload").unwrap();

        let mut notifier = MockCatalogNotifier::new();
        notifier.expect_report_ready().returning(|_, _| Ok(()));

        let service = h.service(
            Some(source(1280, 720)),
            vec![tier("720p", 1280, 720, 2500, &[])],
            publisher_ok(h.layout()),
            notifier,
        );
        service.process("u1", &stored, &h.video_id).await.outcome.unwrap();

        assert_eq!(h.encoder.videos.lock().unwrap()[0].src, stored);
        assert_eq!(h.encoder.audio.lock().unwrap()[0].src, stored);
        assert!(!stored.exists());
        assert!(!h.layout().upload_info_path("u1").exists());
    }

    #[tokio::test]
    async fn test_results_sorted_by_bitrate_tracks_in_plan_order() {
        let h = Harness::new(FakeEncoder::default());
        let tiers = vec![
            tier("480p", 854, 480, 1200, &[]),
            tier("1080p", 1920, 1080, 4500, &[]),
            tier("720p", 1280, 720, 2500, &[]),
        ];

        let mut notifier = MockCatalogNotifier::new();
        notifier.expect_report_ready().returning(|_, _| Ok(()));

        let service = h.service(
            Some(source(1920, 1080)),
            tiers,
            publisher_ok(h.layout()),
            notifier,
        );
        let outcome = service.process("u1", &h.upload(), &h.video_id).await.outcome.unwrap();

        let bitrates: Vec<u64> = outcome.renditions.iter().map(|r| r.info.bitrate).collect();
        assert_eq!(bitrates, vec![4_500_000, 2_500_000, 1_200_000]);

        let layout = h.layout();
        let calls = h.packager.calls.lock().unwrap();
        assert_eq!(
            calls[0].2,
            vec![
                layout.rendition_path(&h.video_id, "480p"),
                layout.rendition_path(&h.video_id, "1080p"),
                layout.rendition_path(&h.video_id, "720p"),
            ]
        );
    }

    #[tokio::test]
    async fn test_encode_failure_reports_and_cleans_up() {
        let h = Harness::new(FakeEncoder {
            fail_on: Some("720p".to_string()),
            ..FakeEncoder::default()
        });

        let mut publisher = MockPublisher::new();
        publisher.expect_publish().times(0);
        let mut notifier = MockCatalogNotifier::new();
        notifier.expect_report_ready().times(0);
        notifier
            .expect_report_failed()
            .withf(|id| id.as_str() == "v1")
            .times(1)
            .returning(|_| Ok(()));

        let service = h.service(Some(source(1920, 1080)), ladder(), publisher, notifier);
        let run = service.process("u1", &h.upload(), &h.video_id).await;

        assert_eq!(
            run.stages,
            vec![
                Stage::Probing,
                Stage::Planning,
                Stage::Encoding { index: 0, total: 3 },
                Stage::Encoding { index: 1, total: 3 },
                Stage::Failed,
                Stage::Notifying,
                Stage::CleaningUp,
            ]
        );
        match run.outcome {
            Err(PipelineError::Encode { rendition, .. }) => assert_eq!(rendition, "720p"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(h.packager.calls.lock().unwrap().is_empty());
        h.assert_cleaned();
    }

    #[tokio::test]
    async fn test_probe_failure_stops_before_planning() {
        let h = Harness::new(FakeEncoder::default());

        let mut publisher = MockPublisher::new();
        publisher.expect_publish().times(0);
        let mut notifier = MockCatalogNotifier::new();
        notifier.expect_report_failed().times(1).returning(|_| Ok(()));

        let service = h.service(None, ladder(), publisher, notifier);
        let run = service.process("u1", &h.upload(), &h.video_id).await;

        assert_eq!(
            run.stages,
            vec![Stage::Probing, Stage::Failed, Stage::Notifying, Stage::CleaningUp]
        );
        assert!(matches!(run.outcome, Err(PipelineError::Probe(_))));
        assert!(h.encoder.videos.lock().unwrap().is_empty());
        h.assert_cleaned();
    }

    #[tokio::test]
    async fn test_publish_failure_is_terminal() {
        let h = Harness::new(FakeEncoder::default());

        let mut publisher = MockPublisher::new();
        publisher
            .expect_publish()
            .times(1)
            .returning(|_, _| Err(PublishError::Config("no bucket".to_string())));
        let mut notifier = MockCatalogNotifier::new();
        notifier.expect_report_ready().times(0);
        notifier.expect_report_failed().times(1).returning(|_| Ok(()));

        let service = h.service(Some(source(1920, 1080)), ladder(), publisher, notifier);
        let run = service.process("u1", &h.upload(), &h.video_id).await;

        assert!(matches!(run.outcome, Err(PipelineError::Publish(_))));
        assert_eq!(run.stages.last(), Some(&Stage::CleaningUp));
        assert!(run.stages.contains(&Stage::Failed));
        h.assert_cleaned();
    }

    #[tokio::test]
    async fn test_zero_renditions_still_package_audio() {
        let h = Harness::new(FakeEncoder::default());

        let mut notifier = MockCatalogNotifier::new();
        notifier
            .expect_report_ready()
            .withf(|_, report| {
                report.width == 320 && report.height == 240 && report.frame_rate == 30
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let service = h.service(
            Some(source(320, 240)),
            ladder(),
            publisher_ok(h.layout()),
            notifier,
        );
        let run = service.process("u1", &h.upload(), &h.video_id).await;

        assert!(run.outcome.unwrap().renditions.is_empty());
        assert!(!run.stages.iter().any(|s| matches!(s, Stage::Encoding { .. })));
        assert_eq!(run.stages.last(), Some(&Stage::Done));

        assert!(h.encoder.videos.lock().unwrap().is_empty());
        assert_eq!(h.encoder.audio.lock().unwrap().len(), 1);
        let calls = h.packager.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].2.is_empty());
    }

    #[tokio::test]
    async fn test_notification_failure_keeps_success() {
        let h = Harness::new(FakeEncoder::default());

        let mut notifier = MockCatalogNotifier::new();
        notifier.expect_report_ready().times(1).returning(|_, _| {
            Err(NotifyError::Status {
                url: "http://api/videos/v1".to_string(),
                status: reqwest::StatusCode::BAD_GATEWAY,
            })
        });
        notifier.expect_report_failed().times(0);

        let service = h.service(
            Some(source(1920, 1080)),
            ladder(),
            publisher_ok(h.layout()),
            notifier,
        );
        let run = service.process("u1", &h.upload(), &h.video_id).await;

        assert!(run.outcome.is_ok());
        assert_eq!(run.stages.last(), Some(&Stage::Done));
        h.assert_cleaned();
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let h = Harness::new(FakeEncoder::default());
        let service = h.service(None, vec![], MockPublisher::new(), MockCatalogNotifier::new());

        std::fs::create_dir_all(h.layout().encode_dir(&h.video_id)).unwrap();
        service.cleanup("u1", &h.upload(), &h.video_id).await;
        h.assert_cleaned();
        service.cleanup("u1", &h.upload(), &h.video_id).await;
        h.assert_cleaned();
    }
}
