use anyhow::Result;
use clap::Parser;

use addlatex::config::{Args, Config};
use addlatex::pipeline::Pipeline;
use addlatex::texdist;
use addlatex::watcher::SaveWatcher;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_level.clone()),
    )
    .init();

    let config = Config::from_args(&args);
    texdist::report_toolchain(config.japanese_engine);

    let mut pipeline = Pipeline::new(config.clone())?;

    // One-shot mode: run the pipeline for a single file and exit.
    if let Some(file) = &args.once {
        match pipeline.on_save(file).await? {
            Some(outcome) => log::info!(
                "{}: language {}, preamble {}, build {:?}",
                file.display(),
                outcome.language,
                if outcome.rewritten { "rewritten" } else { "unchanged" },
                outcome.build
            ),
            None => log::info!("{}: nothing to do", file.display()),
        }
        return Ok(());
    }

    let mut watcher = SaveWatcher::new(&config.workspace)?;
    log::info!(
        "Watching {} for saved .tex files",
        config.workspace.display()
    );

    while let Some(path) = watcher.next_save().await {
        match pipeline.on_save(&path).await {
            Ok(Some(outcome)) => log::info!(
                "{}: language {}, preamble {}, build {:?}",
                path.display(),
                outcome.language,
                if outcome.rewritten { "rewritten" } else { "unchanged" },
                outcome.build
            ),
            Ok(None) => {}
            Err(e) => log::warn!("Pipeline failed for {}: {:#}", path.display(), e),
        }
    }

    Ok(())
}
