use std::{path::PathBuf, time::Duration};

use anyhow::bail;
use castgate::{
    status::LogStatus, HeadlessPlayer, HeaderSet, HttpClient, LoadRequest, ResumePolicy,
    SessionContext, StreamType,
};
use clap::Parser;
use fake_user_agent::get_chrome_rua;
use reqwest::ClientBuilder;

mod config;

use config::Config;

#[derive(Parser, Debug, Clone)]
#[clap(name = "castgate", version, about)]
pub struct ReceiverArgs {
    /// LOAD payload as a JSON file, as a sender would deliver it
    #[clap(long, conflicts_with = "url")]
    load: Option<PathBuf>,

    /// Authentication header for this session. eg. "Authorization: Bearer xxx"
    #[clap(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Declare the stream as live
    #[clap(long)]
    live: bool,

    /// Declared content type
    #[clap(long)]
    content_type: Option<String>,

    /// Config file path
    #[clap(short, long, env = "CASTGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Number of segments to fetch before stopping
    #[clap(long)]
    segments: Option<usize>,

    /// HTTP timeout, in seconds
    #[clap(short, long)]
    timeout: Option<u64>,

    /// Debug output
    #[clap(long, alias = "debug")]
    verbose: bool,

    /// Media URL
    #[clap(required_unless_present = "load")]
    url: Option<String>,
}

impl ReceiverArgs {
    fn load_request(&self) -> anyhow::Result<LoadRequest> {
        if let Some(file) = &self.load {
            let data = std::fs::read_to_string(file)?;
            return Ok(LoadRequest::from_json(&data)?);
        }

        let Some(url) = &self.url else {
            bail!("Either a media URL or --load must be given");
        };
        let mut request = LoadRequest::new(url);
        if let Some(content_type) = &self.content_type {
            request = request.with_content_type(content_type);
        }
        if self.live {
            request = request.with_stream_type(StreamType::Live);
        }
        if !self.headers.is_empty() {
            let mut headers = HeaderSet::new();
            for header in &self.headers {
                let Some((key, value)) = header.split_once(':') else {
                    bail!("Invalid header: {header}");
                };
                headers.insert(key.trim(), value.trim());
            }
            request = request.with_headers(&headers)?;
        }
        Ok(request)
    }

    fn client(&self, config: &Config) -> castgate::ReceiverResult<HttpClient> {
        let timeout = self.timeout.unwrap_or(config.http.timeout_secs);
        let user_agent = config
            .http
            .user_agent
            .clone()
            .unwrap_or_else(|| get_chrome_rua().to_string());

        HttpClient::new(
            ClientBuilder::new()
                .user_agent(user_agent)
                .timeout(Duration::from_secs(timeout)),
        )
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = ReceiverArgs::parse();

    let default_level = if args.verbose {
        tracing_subscriber::filter::LevelFilter::DEBUG
    } else {
        tracing_subscriber::filter::LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load config: {e}");
            return Err(e);
        }
    };
    let client = match args.client(&config) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Receiver can not start: {e}");
            return Err(e.into());
        }
    };

    let session = SessionContext::with_policy(LogStatus, ResumePolicy::from(&config.resume));
    let mut player = HeadlessPlayer::new(client, session)
        .with_segment_limit(args.segments.unwrap_or(config.player.segment_limit));

    let report = player.load(args.load_request()?).await?;
    log::info!(
        "Session finished: {} ({}), {} segment(s), {} license(s), {} bytes, {} resume(s)",
        report.playlist_url,
        if report.live { "live" } else { "on-demand" },
        report.segments,
        report.licenses,
        report.bytes,
        report.resumes
    );

    Ok(())
}
