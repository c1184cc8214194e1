//! Tracing setup, following the teacher's once-guarded `init_tracing` (same
//! env-precedence rule: `RUST_LOG` wins if set, then `--verbose`, else quiet).

use std::sync::Once;

static INIT: Once = Once::new();

pub fn setup_tracing(verbose: bool) {
    INIT.call_once(|| {
        let env_filter = if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::EnvFilter::from_default_env()
        } else if verbose {
            tracing_subscriber::EnvFilter::new("dnvm=debug,info")
        } else {
            tracing_subscriber::EnvFilter::new("dnvm=info,warn,error")
        };

        tracing_subscriber::fmt().with_env_filter(env_filter).with_target(verbose).try_init().ok();
    });
}
