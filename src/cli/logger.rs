//! Stderr subscriber for the `tracing` events emitted by the library
//!
//! Quiet runs show warnings and errors only. `--verbose` adds botaniq's
//! debug events. `RUST_LOG` overrides both with any `EnvFilter` directive.

use tracing::Subscriber;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::EnvFilter;

/// Filter directive used when `RUST_LOG` is unset
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "warn,botaniq=debug"
    } else {
        "warn"
    }
}

fn subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .without_time()
            .with_target(true),
    )
}

/// Installs the global subscriber; fails if one is already installed
pub fn init(verbose: bool) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    subscriber(filter, std::io::stderr).try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Writer collecting formatted events in memory
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn emit(verbose: bool) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = subscriber(EnvFilter::new(default_directive(verbose)), move || {
            writer.clone()
        });

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("Loaded 6 plants");
            tracing::info!(plant_id = "p-1", "Health of Fern changed");
            tracing::warn!("Failed to save plant snapshot: disk full");
        });
        captured.text()
    }

    #[test]
    fn quiet_logging_shows_only_warnings_and_errors() {
        let text = emit(false);

        assert!(text.contains("WARN"));
        assert!(text.contains("disk full"));
        assert!(!text.contains("Loaded 6 plants"));
        assert!(!text.contains("Health of Fern"));
    }

    #[test]
    fn verbose_logging_shows_debug_with_fields_and_target() {
        let text = emit(true);

        assert!(text.contains("Loaded 6 plants"));
        assert!(text.contains("plant_id=\"p-1\""));
        assert!(text.contains("botaniq::cli::logger::tests"));
        assert!(text.contains("disk full"));
    }

    #[test]
    fn default_filters_cap_the_level() {
        let filter = EnvFilter::new(default_directive(true));
        assert_eq!(
            filter.max_level_hint(),
            Some(tracing::level_filters::LevelFilter::DEBUG)
        );
        assert_eq!(
            EnvFilter::new(default_directive(false)).max_level_hint(),
            Some(tracing::level_filters::LevelFilter::WARN)
        );
    }
}
