use tracing::Level;
use tracing::Metadata;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::Filter;
use tracing_subscriber::registry::LookupSpan;

// Only events from this crate reach our outputs
const CRATE_TARGET: &str = "fundtrace";

fn from_crate(meta: &Metadata<'_>) -> bool {
    meta.target().starts_with(CRATE_TARGET)
}

// Custom filter for exact debug level matching
pub struct DebugOnlyFilter;

impl<S> Filter<S> for DebugOnlyFilter
where
    S: tracing::Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn enabled(
        &self,
        meta: &Metadata<'_>,
        _ctx: &Context<'_, S>,
    ) -> bool {
        meta.level() == &Level::DEBUG && from_crate(meta)
    }
}

// Custom filter for error and warn levels
pub struct ErrorWarnFilter;

impl<S> Filter<S> for ErrorWarnFilter
where
    S: tracing::Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn enabled(
        &self,
        meta: &Metadata<'_>,
        _ctx: &Context<'_, S>,
    ) -> bool {
        (meta.level() == &Level::ERROR || meta.level() == &Level::WARN) && from_crate(meta)
    }
}

// Info and above, used for the dev terminal
pub struct InfoAndAboveFilter;

impl<S> Filter<S> for InfoAndAboveFilter
where
    S: tracing::Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn enabled(
        &self,
        meta: &Metadata<'_>,
        _ctx: &Context<'_, S>,
    ) -> bool {
        meta.level() <= &Level::INFO && from_crate(meta)
    }
}

// Custom filter for error levels
pub struct ErrorOnlyFilter;

impl<S> Filter<S> for ErrorOnlyFilter
where
    S: tracing::Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn enabled(
        &self,
        meta: &Metadata<'_>,
        _ctx: &Context<'_, S>,
    ) -> bool {
        meta.level() == &Level::ERROR && from_crate(meta)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;
    use std::sync::Mutex;

    use tracing_subscriber::Layer;
    use tracing_subscriber::fmt::MakeWriter;
    use tracing_subscriber::prelude::*;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn error_warn_filter_drops_other_levels_and_foreign_targets() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::Layer::default()
                .with_ansi(false)
                .with_writer(captured.clone())
                .with_filter(ErrorWarnFilter),
        );

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("kept_warn");
            tracing::error!("kept_error");
            tracing::info!("dropped_info");
            tracing::error!(target: "hyper::client", "dropped_foreign");
        });

        let text = captured.text();
        assert!(text.contains("kept_warn"));
        assert!(text.contains("kept_error"));
        assert!(!text.contains("dropped_info"));
        assert!(!text.contains("dropped_foreign"));
    }

    #[test]
    fn debug_filter_is_exact() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::Layer::default()
                .with_ansi(false)
                .with_writer(captured.clone())
                .with_filter(DebugOnlyFilter),
        );

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("kept_debug");
            tracing::trace!("dropped_trace");
            tracing::error!("dropped_error");
        });

        let text = captured.text();
        assert!(text.contains("kept_debug"));
        assert!(!text.contains("dropped_trace"));
        assert!(!text.contains("dropped_error"));
    }
}
