//! CLI argument parsing for callable-timer

use crate::config::CallSiteMode;
use crate::report::ReportFormat;
use clap::Parser;
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "callable-timer")]
#[command(version)]
#[command(about = "Time a built-in function and report its benchmark records", long_about = None)]
pub struct Cli {
    /// Function to call (`lowercase`, `Text::uppercase`, ...)
    #[arg(value_name = "FUNCTION")]
    pub function: Option<String>,

    /// Arguments, parsed as JSON when possible, otherwise taken as strings
    #[arg(value_name = "ARGS", allow_negative_numbers = true)]
    pub args: Vec<String>,

    /// Label to record the calls under (default: derived from FUNCTION)
    #[arg(short, long, value_name = "LABEL")]
    pub label: Option<String>,

    /// Number of times to invoke the function
    #[arg(short = 'n', long, value_name = "N", default_value = "1")]
    pub repeat: usize,

    /// Output format for the report
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: ReportFormat,

    /// Call-site capture (overrides CALLABLE_TIMER_CALL_SITE)
    #[arg(long = "call-site", value_enum, value_name = "MODE")]
    pub call_site: Option<CallSiteMode>,

    /// List the built-in functions and exit
    #[arg(long)]
    pub list: bool,

    /// Enable debug tracing output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Label to use: explicit, or FUNCTION with `::` replaced by `_`
    pub fn effective_label(&self) -> Option<String> {
        self.label
            .clone()
            .or_else(|| self.function.as_ref().map(|f| f.replace("::", "_")))
    }

    /// Arguments as JSON values
    pub fn parsed_args(&self) -> Vec<Value> {
        self.args.iter().map(|raw| parse_arg(raw)).collect()
    }
}

/// Parse a raw argument as JSON, falling back to a plain string
pub fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cli_parses_function_and_args() {
        let cli = Cli::parse_from(["callable-timer", "lowercase", "BOO"]);
        assert_eq!(cli.function.as_deref(), Some("lowercase"));
        assert_eq!(cli.parsed_args(), vec![json!("BOO")]);
        assert_eq!(cli.repeat, 1);
        assert_eq!(cli.format, ReportFormat::Text);
        assert!(cli.call_site.is_none());
    }

    #[test]
    fn test_cli_json_args() {
        let cli = Cli::parse_from(["callable-timer", "sum", "1", "2.5", "-3"]);
        assert_eq!(cli.parsed_args(), vec![json!(1), json!(2.5), json!(-3)]);
    }

    #[test]
    fn test_cli_default_label() {
        let cli = Cli::parse_from(["callable-timer", "Text::uppercase", "boo"]);
        assert_eq!(cli.effective_label().as_deref(), Some("Text_uppercase"));

        let cli = Cli::parse_from(["callable-timer", "--label", "up", "Text::uppercase"]);
        assert_eq!(cli.effective_label().as_deref(), Some("up"));
    }

    #[test]
    fn test_cli_format_and_repeat() {
        let cli = Cli::parse_from(["callable-timer", "--format", "csv", "-n", "3", "reverse", "abc"]);
        assert_eq!(cli.format, ReportFormat::Csv);
        assert_eq!(cli.repeat, 3);
    }

    #[test]
    fn test_cli_call_site_mode() {
        let cli = Cli::parse_from(["callable-timer", "--call-site", "off", "reverse", "x"]);
        assert_eq!(cli.call_site, Some(CallSiteMode::Off));

        let cli = Cli::parse_from(["callable-timer", "--call-site", "backtrace", "reverse", "x"]);
        assert_eq!(cli.call_site, Some(CallSiteMode::Backtrace));

        assert!(Cli::try_parse_from(["callable-timer", "--call-site", "never", "reverse"]).is_err());
    }

    #[test]
    fn test_cli_list_without_function() {
        let cli = Cli::parse_from(["callable-timer", "--list"]);
        assert!(cli.list);
        assert!(cli.function.is_none());
        assert!(cli.effective_label().is_none());
    }

    #[test]
    fn test_parse_arg_fallback() {
        assert_eq!(parse_arg("hello world"), json!("hello world"));
        assert_eq!(parse_arg("\"quoted\""), json!("quoted"));
        assert_eq!(parse_arg("[1,2]"), json!([1, 2]));
        assert_eq!(parse_arg("true"), json!(true));
    }
}
