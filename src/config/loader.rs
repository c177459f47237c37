use std::{env, str::FromStr, time::Duration};

use url::Url;

use super::env::{
    AppConfig, ConfigError, CourseConfig, DirectoryConfig, LoggingConfig, TwilioConfig,
    WindowPolicy, DEFAULT_CHECK_INTERVAL_SECS, DEFAULT_TWILIO_API_BASE, DEFAULT_WINDOW_AFTER,
    DEFAULT_WINDOW_BEFORE,
};

const REQUIRED_VARS: [&str; 6] = [
    "TWILIO_ACCOUNT_SID",
    "TWILIO_AUTH_TOKEN",
    "MESSAGING_SERVICE_SID",
    "MY_NUMBER",
    "COURSE_URL",
    "COURSE_CODE",
];

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_lookup(|key| env::var(key).ok())
}

impl AppConfig {
    /// Builds the configuration from a variable lookup. Every required
    /// variable is checked before anything is parsed so the error names all
    /// of the missing ones at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let missing: Vec<&'static str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| value(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let required = |key: &'static str| value(key).ok_or(ConfigError::Missing(vec![key]));

        let url = parse_url(&required("COURSE_URL")?)?;
        let check_interval = parse_or(
            "CHECK_INTERVAL",
            value("CHECK_INTERVAL"),
            DEFAULT_CHECK_INTERVAL_SECS,
        )?;
        if check_interval == 0 {
            return Err(ConfigError::Invalid {
                key: "CHECK_INTERVAL",
                reason: "must be a positive number of seconds".to_string(),
            });
        }

        let window = WindowPolicy {
            before: parse_or("WINDOW_BEFORE", value("WINDOW_BEFORE"), DEFAULT_WINDOW_BEFORE)?,
            after: parse_or("WINDOW_AFTER", value("WINDOW_AFTER"), DEFAULT_WINDOW_AFTER)?,
        };

        let course = CourseConfig {
            url,
            code: required("COURSE_CODE")?,
            check_interval: Duration::from_secs(check_interval),
            window,
        };

        let twilio = TwilioConfig {
            account_sid: required("TWILIO_ACCOUNT_SID")?,
            auth_token: required("TWILIO_AUTH_TOKEN")?,
            messaging_service_sid: required("MESSAGING_SERVICE_SID")?,
            to_number: required("MY_NUMBER")?,
            api_base: value("TWILIO_API_BASE")
                .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string()),
        };

        let directories = DirectoryConfig {
            logs_dir: value("LOGS_DIR").unwrap_or_else(|| "logs".to_string()),
        };

        let logging = LoggingConfig {
            level: value("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        Ok(Self {
            course,
            twilio,
            directories,
            logging,
        })
    }
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "COURSE_URL",
        reason,
    };
    let url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    Ok(url)
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|err| ConfigError::Invalid {
            key,
            reason: format!("`{raw}`: {err}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "secret"),
            ("MESSAGING_SERVICE_SID", "MG456"),
            ("MY_NUMBER", "+15551234567"),
            ("COURSE_URL", "https://registrar.example.edu/schedule"),
            ("COURSE_CODE", "CS101"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn loads_required_values_and_defaults() {
        let config = load(&base_vars()).unwrap();
        assert_eq!(config.course.code, "CS101");
        assert_eq!(config.course.url.as_str(), "https://registrar.example.edu/schedule");
        assert_eq!(config.course.check_interval, Duration::from_secs(600));
        assert_eq!(config.course.window, WindowPolicy::default());
        assert_eq!(config.twilio.to_number, "+15551234567");
        assert_eq!(config.twilio.api_base, "https://api.twilio.com/2010-04-01");
        assert_eq!(config.directories.logs_dir, "logs");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn reports_every_missing_variable() {
        let mut vars = base_vars();
        vars.remove("TWILIO_AUTH_TOKEN");
        vars.remove("COURSE_CODE");
        match load(&vars) {
            Err(ConfigError::Missing(keys)) => {
                assert_eq!(keys, vec!["TWILIO_AUTH_TOKEN", "COURSE_CODE"]);
            }
            other => panic!("expected missing error, got {other:?}"),
        }
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut vars = base_vars();
        vars.insert("MY_NUMBER", "   ");
        let err = load(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref keys) if keys == &vec!["MY_NUMBER"]));
        assert!(err.to_string().contains("MY_NUMBER"));
    }

    #[test]
    fn empty_environment_lists_all_required_variables() {
        let err = AppConfig::from_lookup(|_| None).unwrap_err();
        match err {
            ConfigError::Missing(keys) => assert_eq!(keys, REQUIRED_VARS.to_vec()),
            other => panic!("expected missing error, got {other:?}"),
        }
    }

    #[test]
    fn custom_interval_and_window() {
        let mut vars = base_vars();
        vars.insert("CHECK_INTERVAL", "30");
        vars.insert("WINDOW_BEFORE", "10");
        vars.insert("WINDOW_AFTER", "50");
        let config = load(&vars).unwrap();
        assert_eq!(config.course.check_interval, Duration::from_secs(30));
        assert_eq!(config.course.window, WindowPolicy { before: 10, after: 50 });
    }

    #[test]
    fn rejects_zero_or_garbage_interval() {
        for bad in ["0", "ten", "-5"] {
            let mut vars = base_vars();
            vars.insert("CHECK_INTERVAL", bad);
            let err = load(&vars).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: "CHECK_INTERVAL", .. }),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_non_http_url() {
        let mut vars = base_vars();
        vars.insert("COURSE_URL", "ftp://registrar.example.edu/schedule");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { key: "COURSE_URL", .. })
        ));

        vars.insert("COURSE_URL", "not a url");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { key: "COURSE_URL", .. })
        ));
    }

    #[test]
    fn twilio_api_base_can_be_overridden() {
        let mut vars = base_vars();
        vars.insert("TWILIO_API_BASE", "http://127.0.0.1:8080");
        assert_eq!(load(&vars).unwrap().twilio.api_base, "http://127.0.0.1:8080");
    }

    #[test]
    fn course_code_is_trimmed() {
        let mut vars = base_vars();
        vars.insert("COURSE_CODE", "  MATH200 ");
        assert_eq!(load(&vars).unwrap().course.code, "MATH200");
    }

    #[test]
    fn debug_output_hides_auth_token() {
        let config = load(&base_vars()).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
