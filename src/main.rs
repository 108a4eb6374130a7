use mystream_encoder::adapters::catalog::HttpCatalogNotifier;
use mystream_encoder::adapters::ffmpeg::{
    EncodeBackend, FfmpegEncoder, FfmpegThumbnailer, FfprobeProbe,
};
use mystream_encoder::adapters::http::{self, AppState};
use mystream_encoder::adapters::packager::ShakaPackager;
use mystream_encoder::adapters::process::TokioCommandRunner;
use mystream_encoder::adapters::storage;
use mystream_encoder::application::listener;
use mystream_encoder::application::pipeline::{MediaTools, PipelineService, PipelineSettings};
use mystream_encoder::domain::layout::WorkspaceLayout;
use mystream_encoder::ports::command::CommandRunner;
use mystream_encoder::{Config, TokenCodec};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const QUEUE_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;
    tokio::fs::create_dir_all(&config.videos_dir).await?;

    let codec = TokenCodec::new(config.upload_sign_key.as_bytes());
    let layout = WorkspaceLayout::new(&config.videos_dir);
    let runner: Arc<dyn CommandRunner> = Arc::new(TokioCommandRunner);

    let tools = MediaTools {
        probe: Arc::new(FfprobeProbe::new(runner.clone(), &config.tools.ffprobe)),
        encoder: Arc::new(FfmpegEncoder::new(
            runner.clone(),
            &config.tools.ffmpeg,
            EncodeBackend::from_config(&config.hwaccel),
            config.gop_size,
            &config.preset,
        )),
        packager: Arc::new(ShakaPackager::new(runner.clone(), &config.tools.packager)),
        thumbnailer: Arc::new(FfmpegThumbnailer::new(
            runner.clone(),
            &config.tools.ffmpeg,
            config.thumbnail.clone(),
        )),
    };
    let publisher = storage::from_config(&config.store, runner.clone()).await?;
    let notifier = HttpCatalogNotifier::new(&config.api_url, codec.clone())?;

    let pipeline = Arc::new(PipelineService::new(
        tools,
        publisher,
        notifier,
        layout.clone(),
        PipelineSettings::from_config(&config),
    ));

    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
    tokio::spawn(listener::run(rx, codec.clone(), pipeline));

    let state = AppState {
        codec,
        layout,
        events: tx,
    };
    let app = http::router(state, config.max_upload_bytes);

    let tcp = tokio::net::TcpListener::bind(&config.listen).await?;
    info!("Listening at {}", config.listen);
    axum::serve(tcp, app).await?;

    Ok(())
}
