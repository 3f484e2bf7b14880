//! Optional TOML run configuration, merged under explicit CLI flags.
use std::path::Path;

use clap::ArgMatches;
use clap::parser::ValueSource;
use serde::Deserialize;

use crate::args::{BenchArgs, HttpMethod, PositiveU64, PositiveUsize, parse_header};
use crate::error::{AppError, AppResult, ConfigError};

/// File-backed run configuration. Every field is optional; a value applies
/// only where the matching flag was not given on the command line.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub connections: Option<usize>,
    pub pipelining: Option<usize>,
    pub duration: Option<u64>,
    pub timeout: Option<u64>,
    pub method: Option<HttpMethod>,
    pub data: Option<String>,
    pub headers: Option<Vec<String>>,
    pub verify_tls: Option<bool>,
    pub debug: Option<bool>,
    pub output: Option<String>,
    pub no_color: Option<bool>,
}

/// Loads a TOML configuration file.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn load_config_file(path: &Path) -> AppResult<FileConfig> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        AppError::config(ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    toml::from_str(&content).map_err(|err| {
        AppError::config(ConfigError::ParseToml {
            path: path.to_path_buf(),
            source: err,
        })
    })
}

/// Applies file values to the parsed arguments where the CLI left defaults.
///
/// # Errors
///
/// Returns an error when a file value fails validation.
pub fn apply_config(
    args: &mut BenchArgs,
    matches: &ArgMatches,
    config: &FileConfig,
) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "connections")
        && let Some(value) = config.connections
    {
        args.connections = ensure_positive_usize(value, "connections")?;
    }

    if !is_cli(matches, "pipelining")
        && let Some(value) = config.pipelining
    {
        args.pipelining = ensure_positive_usize(value, "pipelining")?;
    }

    if !is_cli(matches, "duration")
        && let Some(value) = config.duration
    {
        args.duration = ensure_positive_u64(value, "duration")?;
    }

    if !is_cli(matches, "timeout")
        && let Some(value) = config.timeout
    {
        args.timeout = ensure_positive_u64(value, "timeout")?;
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_cli(matches, "data")
        && let Some(data) = config.data.clone()
    {
        args.data = data;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        args.headers = parse_headers(headers)?;
    }

    if !is_cli(matches, "verify_tls")
        && let Some(value) = config.verify_tls
    {
        args.verify_tls = value;
    }

    if !is_cli(matches, "debug")
        && let Some(value) = config.debug
    {
        args.debug = value;
    }

    if !is_cli(matches, "output")
        && let Some(path) = config.output.clone()
    {
        args.output = Some(path);
    }

    if !is_cli(matches, "no_color")
        && let Some(value) = config.no_color
    {
        args.no_color = value;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u64(value: u64, field: &str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn ensure_positive_usize(value: usize, field: &str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn parse_headers(headers: &[String]) -> AppResult<Vec<(String, String)>> {
    let mut parsed = Vec::with_capacity(headers.len());
    for header in headers {
        parsed.push(
            parse_header(header)
                .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))?,
        );
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::{CommandFactory, FromArgMatches};

    use super::*;

    fn parse_with_matches(argv: &[&str]) -> AppResult<(BenchArgs, ArgMatches)> {
        let matches = BenchArgs::command()
            .try_get_matches_from(argv)
            .map_err(AppError::from)?;
        let args = BenchArgs::from_arg_matches(&matches).map_err(AppError::from)?;
        Ok((args, matches))
    }

    fn write_config(content: &str) -> AppResult<(tempfile::TempDir, std::path::PathBuf)> {
        let dir = tempfile::tempdir()
            .map_err(|err| AppError::config(format!("tempdir failed: {}", err)))?;
        let path = dir.path().join("barrage.toml");
        let mut file = std::fs::File::create(&path)
            .map_err(|err| AppError::config(format!("create failed: {}", err)))?;
        file.write_all(content.as_bytes())
            .map_err(|err| AppError::config(format!("write failed: {}", err)))?;
        Ok((dir, path))
    }

    #[test]
    fn file_values_fill_unset_flags() -> AppResult<()> {
        let (_dir, path) = write_config(
            "url = \"http://from-file\"\nconnections = 3\nduration = 7\nheaders = [\"X-A: 1\"]\n",
        )?;
        let config = load_config_file(&path)?;
        let (mut args, matches) = parse_with_matches(&["barrage"])?;

        apply_config(&mut args, &matches, &config)?;

        if args.url.as_deref() != Some("http://from-file") {
            return Err(AppError::config("Expected URL from file."));
        }
        if args.connections.get() != 3 || args.duration.get() != 7 {
            return Err(AppError::config("Expected connections/duration from file."));
        }
        if args.headers != vec![("X-A".to_owned(), "1".to_owned())] {
            return Err(AppError::config("Expected headers from file."));
        }
        Ok(())
    }

    #[test]
    fn explicit_flags_beat_file_values() -> AppResult<()> {
        let (_dir, path) = write_config("url = \"http://from-file\"\nconnections = 3\n")?;
        let config = load_config_file(&path)?;
        let (mut args, matches) =
            parse_with_matches(&["barrage", "--url", "http://from-cli", "-c", "5"])?;

        apply_config(&mut args, &matches, &config)?;

        if args.url.as_deref() != Some("http://from-cli") {
            return Err(AppError::config("Expected CLI URL to win."));
        }
        if args.connections.get() != 5 {
            return Err(AppError::config("Expected CLI connections to win."));
        }
        Ok(())
    }

    #[test]
    fn zero_values_in_file_are_rejected() -> AppResult<()> {
        let (_dir, path) = write_config("connections = 0\n")?;
        let config = load_config_file(&path)?;
        let (mut args, matches) = parse_with_matches(&["barrage"])?;

        if matches!(
            apply_config(&mut args, &matches, &config),
            Err(AppError::Config(ConfigError::FieldMustBePositive { .. }))
        ) {
            Ok(())
        } else {
            Err(AppError::config("Expected FieldMustBePositive."))
        }
    }

    #[test]
    fn unknown_fields_fail_to_parse() -> AppResult<()> {
        let (_dir, path) = write_config("not_a_field = true\n")?;

        if matches!(
            load_config_file(&path),
            Err(AppError::Config(ConfigError::ParseToml { .. }))
        ) {
            Ok(())
        } else {
            Err(AppError::config("Expected ParseToml for unknown field."))
        }
    }

    #[test]
    fn missing_file_fails_to_read() -> AppResult<()> {
        if matches!(
            load_config_file(Path::new("/nonexistent/barrage.toml")),
            Err(AppError::Config(ConfigError::ReadConfig { .. }))
        ) {
            Ok(())
        } else {
            Err(AppError::config("Expected ReadConfig for missing file."))
        }
    }
}
