use std::env;

use crate::telemetry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl OutputConfig {
    pub fn from_env() -> Self {
        let format = if telemetry::config::json_mode() { OutputFormat::Json } else { OutputFormat::Text };
        OutputConfig { format, pretty: parse_flag(env::var("CRAWL_OUTPUT_PRETTY").ok().as_deref()) }
    }
}

fn parse_flag(v: Option<&str>) -> bool {
    matches!(v, Some(v) if v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_flag_values() {
        assert!(parse_flag(Some("TRUE")));
        assert!(parse_flag(Some("1")));
        assert!(!parse_flag(Some("no")));
        assert!(!parse_flag(None));
    }
}
