// src/logging.rs
#![cfg(feature = "logging")]

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install a global fmt subscriber filtered by verbosity
/// (0 = warn, 1 = info, 2 = debug, 3+ = trace).
///
/// `RUST_LOG`, when set, takes precedence over the verbosity level.
pub fn init(verbosity: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn second_init_fails() {
        let _ = super::init(2);
        assert!(super::init(2).is_err());
    }
}
