use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info, warn};

use sekai_sync::services::{materialize, pipeline};
use sekai_sync::{
    init_logging, run_job, CancelToken, ComponentSource, FsEnumerator, FsNodeStore,
    RawDumpMode, ResourceParser, RunContext, SyncConfig, TransifexClient, TranslationCache,
};

type BoxError = Box<dyn Error + Send + Sync>;

const INTERRUPTED_EXIT: i32 = 130;

#[derive(Debug, Parser)]
#[command(name = "sekai-sync", version, about = "Sync translated content from Transifex")]
struct Cli {
    /// trace|debug|info|warn|error (RUST_LOG overrides)
    #[arg(long, global = true, default_value = sekai_sync::default_log_level())]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download the latest translations and write the translated tree
    Download(DownloadArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DumpArg {
    Separate,
    Shared,
    Off,
}

impl From<DumpArg> for RawDumpMode {
    fn from(value: DumpArg) -> Self {
        match value {
            DumpArg::Separate => RawDumpMode::Separate,
            DumpArg::Shared => RawDumpMode::SharedWithCache,
            DumpArg::Off => RawDumpMode::Off,
        }
    }
}

#[derive(Debug, Args)]
struct DownloadArgs {
    /// JSON config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    root: Option<PathBuf>,

    #[arg(long)]
    cache_dir: Option<PathBuf>,

    #[arg(long)]
    source: Option<String>,

    #[arg(long)]
    target: Option<String>,

    #[arg(long, env = "TRANSIFEX_PROJECT")]
    project: Option<String>,

    #[arg(long, env = "TRANSIFEX_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "TRANSIFEX_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[arg(long, value_enum)]
    raw_dump: Option<DumpArg>,
}

impl DownloadArgs {
    fn into_config(self) -> Result<SyncConfig, BoxError> {
        let mut cfg = match &self.config {
            Some(path) => SyncConfig::load(path)?,
            None => SyncConfig::default(),
        };

        if let Some(root) = self.root {
            cfg.content_root = root;
        }
        if let Some(dir) = self.cache_dir {
            cfg.cache_dir = Some(dir);
        }
        if let Some(lang) = self.source {
            cfg.source_language = lang;
        }
        if let Some(lang) = self.target {
            cfg.target_language = lang;
        }
        if let Some(project) = self.project {
            cfg.transifex.project = project;
        }
        if let Some(username) = self.username {
            cfg.transifex.username = username;
        }
        if let Some(password) = self.password {
            cfg.transifex.password = password;
        }
        if let Some(mode) = self.raw_dump {
            cfg.raw_dump = mode.into();
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Command::Download(args) => download(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "download failed");
            ExitCode::FAILURE
        }
    }
}

async fn download(args: DownloadArgs) -> Result<(), BoxError> {
    let cfg = args.into_config()?;

    let components = FsEnumerator::new(&cfg.content_root).list_components(&cfg.source_language)?;
    info!(
        count = components.len(),
        source = %cfg.source_language,
        target = %cfg.target_language,
        "components listed"
    );

    let ctx = RunContext::from_config(&cfg);
    let cache = TranslationCache::new(cfg.cache_dir());
    let worker_cfg = cfg.clone();

    let completion = run_job(
        move |cancel: CancelToken| -> Result<_, BoxError> {
            // Built on the worker thread: the blocking client must not live
            // inside the async runtime.
            let mut client = TransifexClient::from_config(&worker_cfg)?;
            let mut parser = ResourceParser::new();
            let report =
                pipeline::run(&ctx, &components, &mut client, &cache, &mut parser, &cancel);
            Ok((parser, report))
        },
        CancelToken::new(),
        interrupted(),
    )
    .await?;

    let (parser, report) = completion.value?;

    info!(
        processed = report.processed,
        cache_hits = report.cache_hits,
        fetched = report.fetched,
        translated = report.translated,
        not_translated = report.not_translated,
        failed = report.failed,
        interrupted = completion.interrupted,
        "***** Saving {} files *****",
        report.processed
    );

    let mut store = FsNodeStore::new(&cfg.content_root);
    let saved = materialize::materialize(parser.tree(), &mut store);

    info!(
        written = saved.written,
        unchanged = saved.unchanged,
        failed = saved.failed,
        "materialization finished"
    );
    if saved.failed > 0 {
        warn!(failed = saved.failed, "some nodes could not be written");
    }

    Ok(())
}

/// Resolves on the first Ctrl-C. From then on a second Ctrl-C quits at once,
/// since the installed handler replaces the default SIGINT exit.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for interrupt; sync runs to completion");
        std::future::pending::<()>().await;
    }

    warn!("press Ctrl-C again to quit without saving");
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            error!("second interrupt, quitting without saving");
            std::process::exit(INTERRUPTED_EXIT);
        }
    });
}
