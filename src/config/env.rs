use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

pub enum EnvKey {
    Listen,
    TempDir,
    RenderCommand,
    JobTtlSecs,
    SweepIntervalSecs,
    MaxBodyBytes,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::Listen => "PORT",
            EnvKey::TempDir => "RENDER_TEMP_DIR",
            EnvKey::RenderCommand => "RENDER_COMMAND",
            EnvKey::JobTtlSecs => "JOB_TTL_SECS",
            EnvKey::SweepIntervalSecs => "SWEEP_INTERVAL_SECS",
            EnvKey::MaxBodyBytes => "MAX_BODY_BYTES",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

/// Unset keys take the default silently; unparsable ones take it with a warning.
pub fn get_parsed<T>(key: EnvKey, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    let name = key.as_str();
    parse_or(name, get(key).ok().as_deref(), default)
}

fn parse_or<T>(name: &str, raw: Option<&str>, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(e) => {
            warn!("Ignoring {}={:?} ({}), using the default", name, raw, e);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn parses_trimmed_values() {
        assert_eq!(parse_or("JOB_TTL_SECS", Some(" 42 "), 5u64), 42);
        assert_eq!(parse_or("JOB_TTL_SECS", None, 5u64), 5);
    }

    #[test]
    fn bad_value_falls_back_with_a_warning() {
        let logs = Captured::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let value = tracing::subscriber::with_default(subscriber, || {
            parse_or("MAX_BODY_BYTES", Some("100MB"), 7usize)
        });

        assert_eq!(value, 7);
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("MAX_BODY_BYTES=\"100MB\""), "{output}");
    }
}
