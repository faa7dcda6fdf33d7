use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use ffmpeg_native::LogLevel;

/**
    Install the global subscriber and route FFmpeg's own log into it.

    `RUST_LOG` is honored unless `verbose` asks for everything at debug.
*/
pub fn init(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(verbose).with_writer(std::io::stderr))
        .with(filter(verbose, rust_log.as_deref()))
        .init();

    ffmpeg_native::log::install(LogLevel::Verbose);
}

fn filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_replaces_the_default() {
        assert_eq!(filter(false, Some("debug")).to_string(), "debug");
        assert_eq!(filter(false, Some("ffmpeg=trace")).to_string(), "ffmpeg=trace");
    }

    #[test]
    fn falls_back_to_info() {
        assert_eq!(filter(false, None).to_string(), "info");
        assert_eq!(filter(false, Some("  ")).to_string(), "info");
        assert_eq!(filter(false, Some("ffmpeg=loud")).to_string(), "info");
    }

    #[test]
    fn verbose_wins() {
        assert_eq!(filter(true, Some("warn")).to_string(), "debug");
    }
}
