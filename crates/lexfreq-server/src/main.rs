use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use lexfreq_core::Collapser;
use lexfreq_ngram::NgramClient;
use lexfreq_wordnet::WordNetLexicon;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use lexfreq_server::{AppState, ServerConfig, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServerConfig::load().context("invalid configuration")?;
    let addr = config.listen_addr()?;
    info!(
        "using wordnet at {} (mode: {:?})",
        config.wordnet_path.display(),
        config.wordnet_mode
    );
    info!(
        endpoint = %config.ngram.endpoint,
        corpus = %config.ngram.corpus,
        smoothing = config.ngram.smoothing,
        timeout_secs = config.ngram.timeout_secs,
        "ngram source configured"
    );

    let wn_start = Instant::now();
    let lexicon = WordNetLexicon::load_with_mode(&config.wordnet_path, config.wordnet_mode)?;
    info!("wordnet loaded in {} ms", wn_start.elapsed().as_millis());

    // reqwest's blocking client panics if built inside an async context.
    let ngram = config.ngram.clone();
    let frequency = tokio::task::spawn_blocking(move || NgramClient::new(ngram))
        .await
        .context("ngram client setup panicked")??;

    let collapser = Collapser::new(Arc::new(lexicon), Arc::new(frequency))
        .with_parallelism(config.parallelism);
    let state = AppState {
        collapser: Arc::new(collapser),
        max_words: config.max_words,
    };
    let app = router(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;
    info!(
        "listening on {addr} (parallelism {}, max {} words per request)",
        config.parallelism, config.max_words
    );
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
