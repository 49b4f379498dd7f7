// tests/logging.rs

use tracing::level_filters::LevelFilter;

use lesswatch::cli::LogLevel;
use lesswatch::logging::build_filter;

#[test]
fn cli_level_wins_over_environment() {
    let filter = build_filter(Some(LogLevel::Warn), Some("trace")).unwrap();
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
}

#[test]
fn environment_accepts_directives() {
    let filter = build_filter(None, Some("info,lesswatch::watch=debug")).unwrap();
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
}

#[test]
fn defaults_to_info() {
    for env in [None, Some(""), Some("   ")] {
        let filter = build_filter(None, env).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }
}

#[test]
fn invalid_directive_is_an_error() {
    let err = build_filter(None, Some("lesswatch=loud")).unwrap_err();
    assert!(err.to_string().contains("LESSWATCH_LOG"));
}
