use clap::Parser;

use super::test_support::base_args;
use super::{BenchArgs, DEFAULT_BODY, HttpMethod};
use crate::error::{AppError, AppResult, ValidationError};

fn parse(argv: &[&str]) -> AppResult<BenchArgs> {
    BenchArgs::try_parse_from(argv).map_err(AppError::from)
}

#[test]
fn defaults_match_documented_values() -> AppResult<()> {
    let args = parse(&["barrage", "--url", "http://localhost"])?;

    if args.connections.get() != 10 {
        return Err(AppError::validation(format!(
            "Expected 10 default connections, got {}",
            args.connections.get()
        )));
    }
    if args.pipelining.get() != 1 {
        return Err(AppError::validation(format!(
            "Expected default pipelining 1, got {}",
            args.pipelining.get()
        )));
    }
    if args.duration.get() != 10 || args.timeout.get() != 10 {
        return Err(AppError::validation("Expected 10s duration and timeout."));
    }
    if args.method != HttpMethod::Post || args.data != DEFAULT_BODY {
        return Err(AppError::validation("Expected POST with default body."));
    }
    if args.verify_tls || args.debug {
        return Err(AppError::validation(
            "Expected verify_tls and debug off by default.",
        ));
    }
    Ok(())
}

#[test]
fn short_flags_parse() -> AppResult<()> {
    let args = parse(&[
        "barrage", "-u", "http://x", "-c", "2", "-p", "4", "-d", "3", "-t", "5",
    ])?;

    if args.connections.get() != 2 || args.pipelining.get() != 4 {
        return Err(AppError::validation("Expected -c 2 and -p 4."));
    }
    if args.duration.get() != 3 || args.timeout.get() != 5 {
        return Err(AppError::validation("Expected -d 3 and -t 5."));
    }
    Ok(())
}

#[test]
fn zero_connections_is_rejected() -> AppResult<()> {
    if parse(&["barrage", "-u", "http://x", "-c", "0"]).is_ok() {
        return Err(AppError::validation("Expected -c 0 to be rejected."));
    }
    Ok(())
}

#[test]
fn headers_parse_as_pairs() -> AppResult<()> {
    let args = parse(&["barrage", "-u", "http://x", "-H", "X-Token: abc"])?;

    if args.headers != vec![("X-Token".to_owned(), "abc".to_owned())] {
        return Err(AppError::validation(format!(
            "Unexpected headers: {:?}",
            args.headers
        )));
    }
    if parse(&["barrage", "-u", "http://x", "-H", "no-separator"]).is_ok() {
        return Err(AppError::validation(
            "Expected a header without ':' to be rejected.",
        ));
    }
    Ok(())
}

#[test]
fn missing_url_is_a_validation_error() -> AppResult<()> {
    let args = parse(&["barrage"])?;

    if matches!(
        args.target_url(),
        Err(AppError::Validation(ValidationError::MissingUrl))
    ) {
        Ok(())
    } else {
        Err(AppError::validation("Expected MissingUrl."))
    }
}

#[test]
fn non_http_scheme_is_rejected() -> AppResult<()> {
    let mut args = base_args()?;
    args.url = Some("ftp://example.com".to_owned());

    if matches!(
        args.target_url(),
        Err(AppError::Validation(ValidationError::UnsupportedScheme { .. }))
    ) {
        Ok(())
    } else {
        Err(AppError::validation("Expected UnsupportedScheme."))
    }
}

#[test]
fn relative_url_is_rejected() -> AppResult<()> {
    let mut args = base_args()?;
    args.url = Some("example.com/path".to_owned());

    if args.target_url().is_err() {
        Ok(())
    } else {
        Err(AppError::validation("Expected a relative URL to fail."))
    }
}

#[test]
fn valid_https_url_passes() -> AppResult<()> {
    let mut args = base_args()?;
    args.url = Some("https://example.com:8443/path?q=1".to_owned());

    let url = args.target_url()?;
    if url.scheme() == "https" && url.host_str() == Some("example.com") {
        Ok(())
    } else {
        Err(AppError::validation(format!("Unexpected URL: {}", url)))
    }
}

#[test]
fn worker_count_multiplies_pipelining() -> AppResult<()> {
    let mut args = base_args()?;
    args.connections = super::test_support::positive_usize(3)?;
    args.pipelining = super::test_support::positive_usize(4)?;

    if args.worker_count() == 12 {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Expected 12 workers, got {}",
            args.worker_count()
        )))
    }
}
