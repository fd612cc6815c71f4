use tracing::Level;
use tracing::subscriber::SetGlobalDefaultError;

/// Install a plain `fmt` subscriber that lets through `level` and above.
pub fn setup_logging(level: Level) -> Result<(), SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}
