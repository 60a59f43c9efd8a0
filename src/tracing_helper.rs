use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber honoring `RUST_LOG`.
///
/// Hosts embedding this crate usually bring their own subscriber; this is
/// the fallback for demos and manual testing. Calling it more than once is
/// harmless.
pub fn setup_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
