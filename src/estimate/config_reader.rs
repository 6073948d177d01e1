use crate::estimate::*;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// The content of a configuration file. All the fields are optional.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub api_url: Option<String>,
    pub method: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub chart_scale: Option<AxisScale>,
    pub chart_width: Option<usize>,
    pub color: Option<bool>,
}

pub fn read_config(path: &str) -> CliResult<ClientConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: ClientConfig =
        serde_json::from_str(&contents).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// The settings of a run, after merging the command line and the configuration file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub method: String,
    pub timeout: Duration,
    pub options: DisplayOptions,
}

impl Settings {
    pub fn resolve(args: &Args) -> CliResult<Settings> {
        let config = match &args.config {
            Some(p) => read_config(p)?,
            None => ClientConfig::default(),
        };
        Settings::merge(args, &config)
    }

    /// The command line takes precedence over the configuration file.
    pub fn merge(args: &Args, config: &ClientConfig) -> CliResult<Settings> {
        let scale = match &args.scale {
            Some(s) => match AxisScale::parse(s) {
                Some(x) => x,
                None => whatever!("Unknown scale {:?}: expected linear or log", s),
            },
            None => config
                .chart_scale
                .unwrap_or(DisplayOptions::DEFAULT_OPTIONS.scale),
        };
        let chart_width = args
            .chart_width
            .or(config.chart_width)
            .unwrap_or(DisplayOptions::DEFAULT_OPTIONS.chart_width);
        if chart_width == 0 {
            whatever!("The width of the chart must be positive");
        }
        let colored = !args.no_color && config.color.unwrap_or(true);

        let api_url = args
            .api_url
            .clone()
            .or_else(|| config.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let method = match args.method.clone().or_else(|| config.method.clone()) {
            Some(m) if !m.trim().is_empty() => m,
            _ => DEFAULT_METHOD.to_string(),
        };
        let timeout_seconds = args
            .timeout
            .or(config.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        Ok(Settings {
            api_url: api_url.trim_end_matches('/').to_string(),
            method,
            timeout: Duration::from_secs(timeout_seconds),
            options: DisplayOptions {
                scale,
                chart_width,
                colored,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["effortview", "--text", "x"]);
        let s = Settings::merge(&args, &ClientConfig::default()).unwrap();
        assert_eq!(s.api_url, DEFAULT_API_URL);
        assert_eq!(s.method, "weighted_average");
        assert_eq!(s.timeout, Duration::from_secs(60));
        assert_eq!(s.options.scale, AxisScale::Logarithmic);
        assert_eq!(s.options.chart_width, 40);
        assert!(s.options.colored);
    }

    #[test]
    fn command_line_overrides_file() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"apiUrl": "http://estimator:8000/", "method": "median",
                "timeoutSeconds": 5, "chartScale": "log", "chartWidth": 20, "color": false}"#,
        )
        .unwrap();
        let args = Args::parse_from(["effortview", "--method", "mean", "--scale", "linear"]);
        let s = Settings::merge(&args, &config).unwrap();
        assert_eq!(s.api_url, "http://estimator:8000");
        assert_eq!(s.method, "mean");
        assert_eq!(s.timeout, Duration::from_secs(5));
        assert_eq!(s.options.scale, AxisScale::Linear);
        assert_eq!(s.options.chart_width, 20);
        assert!(!s.options.colored);
    }

    #[test]
    fn bad_values() {
        let args = Args::parse_from(["effortview", "--scale", "cubic"]);
        assert!(Settings::merge(&args, &ClientConfig::default()).is_err());
        let args = Args::parse_from(["effortview", "--chart-width", "0"]);
        assert!(Settings::merge(&args, &ClientConfig::default()).is_err());
    }
}
