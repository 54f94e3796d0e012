//! TOML configuration loading and validation
//!
//! The config file carries the tracker connection, the issue filter, the
//! spreadsheet appearance and the gantt date interval:
//!
//! ```toml
//! [redmine]
//! url = "https://tracker.example.com"
//! project_name = "rollout"
//!
//! [redmine.account]
//! need_login = true
//! username = "reporter"
//!
//! [redmine.filter]
//! status_id = "*"
//! sort = "start_date"
//!
//! [spreadsheet]
//! font_name = "Meiryo UI"
//! tab_title = "Rollout 2024"
//!
//! [spreadsheet.gantt]
//! start_date = "2024/01/29"
//! end_date = "2024/03/31"
//!
//! holidays = ["2024/02/12", "2024/02/23"]
//! ```

use std::io::{BufRead, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use redgantt_core::{FilterCriteria, GanttRange, HolidayCalendar};
use redgantt_resolver::ResolveStrategy;

const DATE_FORMAT: &str = "%Y/%m/%d";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file '{0}' not found")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing mandatory field '{0}'")]
    MissingField(&'static str),

    #[error("invalid date '{0}' (expected YYYY/MM/DD)")]
    BadDate(String),

    #[error("gantt start {start} is after end {end}")]
    ReversedInterval { start: NaiveDate, end: NaiveDate },

    #[error("unknown resolve strategy '{0}' (expected \"lazy\" or \"eager\")")]
    BadStrategy(String),
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    redmine: Option<RawRedmine>,
    spreadsheet: Option<RawSpreadsheet>,
    #[serde(default)]
    holidays: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRedmine {
    url: Option<String>,
    project_name: Option<String>,
    account: Option<RawAccount>,
    filter: Option<RawFilter>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAccount {
    #[serde(default)]
    need_login: bool,
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFilter {
    sort: Option<String>,
    issue_id: Option<String>,
    query_id: Option<u64>,
    parent_id: Option<u64>,
    tracker_id: Option<u64>,
    status_id: Option<String>,
    author_id: Option<u64>,
    assigned_to_id: Option<String>,
    fixed_version_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSpreadsheet {
    font_name: Option<String>,
    tab_title: Option<String>,
    indent_step: Option<u16>,
    gantt: Option<RawGantt>,
}

#[derive(Debug, Default, Deserialize)]
struct RawGantt {
    start_date: Option<String>,
    end_date: Option<String>,
    include_parents: Option<bool>,
    strategy: Option<String>,
}

/// Validated run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub link_url: String,
    pub project_name: String,
    pub need_login: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub filter: FilterCriteria,
    pub font_name: Option<String>,
    pub tab_title: String,
    pub indent_step: u16,
    pub range: GanttRange,
    pub include_parents: bool,
    pub strategy: ResolveStrategy,
    pub calendar: HolidayCalendar,
}

impl Config {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Parse and validate config text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;

        let redmine = raw.redmine.unwrap_or_default();
        let account = redmine.account.unwrap_or_default();
        let filter = redmine.filter.unwrap_or_default();
        let spreadsheet = raw.spreadsheet.unwrap_or_default();
        let gantt = spreadsheet.gantt.unwrap_or_default();

        let url = redmine
            .url
            .ok_or(ConfigError::MissingField("redmine.url"))?
            .trim_end_matches('/')
            .to_string();
        let project_name = redmine
            .project_name
            .ok_or(ConfigError::MissingField("redmine.project_name"))?;

        let start = parse_date(
            gantt
                .start_date
                .as_deref()
                .ok_or(ConfigError::MissingField("spreadsheet.gantt.start_date"))?,
        )?;
        let end = parse_date(
            gantt
                .end_date
                .as_deref()
                .ok_or(ConfigError::MissingField("spreadsheet.gantt.end_date"))?,
        )?;
        let range =
            GanttRange::new(start, end).map_err(|e| ConfigError::ReversedInterval {
                start: e.start,
                end: e.end,
            })?;

        let strategy = match gantt.strategy.as_deref() {
            None | Some("lazy") => ResolveStrategy::Lazy,
            Some("eager") => ResolveStrategy::Eager,
            Some(other) => return Err(ConfigError::BadStrategy(other.to_string())),
        };

        let holidays = raw
            .holidays
            .iter()
            .map(|s| parse_date(s))
            .collect::<Result<Vec<_>, _>>()?;

        let criteria = FilterCriteria {
            project_id: Some(project_name.clone()),
            sort: filter.sort,
            issue_id: filter.issue_id.map(|ids| ids.replace(' ', "")),
            query_id: filter.query_id,
            parent_id: filter.parent_id,
            tracker_id: filter.tracker_id,
            status_id: filter.status_id,
            author_id: filter.author_id,
            assigned_to_id: filter.assigned_to_id,
            fixed_version_id: filter.fixed_version_id,
        };

        Ok(Self {
            link_url: format!("{url}/issues/"),
            url,
            need_login: account.need_login,
            username: account.username,
            password: account.password,
            filter: criteria,
            font_name: spreadsheet.font_name,
            tab_title: spreadsheet.tab_title.unwrap_or_else(|| project_name.clone()),
            indent_step: spreadsheet.indent_step.unwrap_or(1),
            project_name,
            range,
            include_parents: gantt.include_parents.unwrap_or(true),
            strategy,
            calendar: HolidayCalendar::new(holidays),
        })
    }

    /// Prompt for any credentials the config requires but does not carry.
    pub fn prompt_credentials(
        &mut self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> std::io::Result<()> {
        if !self.need_login {
            self.username = None;
            self.password = None;
            return Ok(());
        }
        if self.username.is_none() {
            self.username = Some(read_line(input, output, "Username: ")?);
        }
        if self.password.is_none() {
            self.password = Some(read_line(input, output, "Password: ")?);
        }
        Ok(())
    }
}

fn parse_date(text: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|_| ConfigError::BadDate(text.to_string()))
}

fn read_line(
    input: &mut impl BufRead,
    output: &mut impl Write,
    prompt: &str,
) -> std::io::Result<String> {
    write!(output, "{prompt}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = r#"
[redmine]
url = "https://tracker.example.com/"
project_name = "rollout"

[spreadsheet.gantt]
start_date = "2024/01/29"
end_date = "2024/03/31"
"#;

    #[test]
    fn minimal_config_fills_defaults() {
        let config = Config::from_toml(MINIMAL).unwrap();
        assert_eq!(config.url, "https://tracker.example.com");
        assert_eq!(config.link_url, "https://tracker.example.com/issues/");
        assert_eq!(config.project_name, "rollout");
        assert_eq!(config.tab_title, "rollout");
        assert_eq!(config.indent_step, 1);
        assert!(config.include_parents);
        assert_eq!(config.strategy, ResolveStrategy::Lazy);
        assert!(!config.need_login);
        assert_eq!(config.filter.project_id.as_deref(), Some("rollout"));
    }

    #[test]
    fn full_config_round_trips() {
        let text = r#"
[redmine]
url = "https://tracker.example.com"
project_name = "rollout"

[redmine.account]
need_login = true
username = "reporter"

[redmine.filter]
sort = "start_date"
issue_id = "10, 11, 12"
status_id = "*"
tracker_id = 4

[spreadsheet]
font_name = "Meiryo UI"
tab_title = "Rollout 2024"
indent_step = 2

[spreadsheet.gantt]
start_date = "2024/01/29"
end_date = "2024/03/31"
include_parents = false
strategy = "eager"

holidays = ["2024/02/12", "2024/02/23"]
"#;
        let config = Config::from_toml(text).unwrap();
        assert_eq!(config.tab_title, "Rollout 2024");
        assert_eq!(config.font_name.as_deref(), Some("Meiryo UI"));
        assert_eq!(config.indent_step, 2);
        assert!(!config.include_parents);
        assert_eq!(config.strategy, ResolveStrategy::Eager);
        assert!(config.need_login);
        assert_eq!(config.username.as_deref(), Some("reporter"));
        assert_eq!(config.password, None);
        // whitespace stripped from the id list
        assert_eq!(config.filter.issue_id.as_deref(), Some("10,11,12"));
        assert_eq!(config.filter.tracker_id, Some(4));
        assert!(config
            .calendar
            .is_holiday(NaiveDate::from_ymd_opt(2024, 2, 12).unwrap()));
    }

    #[test]
    fn missing_url_is_an_error() {
        let text = r#"
[redmine]
project_name = "rollout"

[spreadsheet.gantt]
start_date = "2024/01/29"
end_date = "2024/03/31"
"#;
        let err = Config::from_toml(text).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("redmine.url")));
    }

    #[test]
    fn missing_dates_are_errors() {
        let text = r#"
[redmine]
url = "https://tracker.example.com"
project_name = "rollout"
"#;
        let err = Config::from_toml(text).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField("spreadsheet.gantt.start_date")
        ));
    }

    #[test]
    fn bad_date_format_is_an_error() {
        let text = MINIMAL.replace("2024/01/29", "2024-01-29");
        let err = Config::from_toml(&text).unwrap_err();
        assert!(matches!(err, ConfigError::BadDate(_)));
    }

    #[test]
    fn reversed_interval_is_an_error() {
        let text = MINIMAL.replace("2024/03/31", "2024/01/01");
        let err = Config::from_toml(&text).unwrap_err();
        assert!(matches!(err, ConfigError::ReversedInterval { .. }));
    }

    #[test]
    fn unknown_strategy_is_an_error() {
        let text = r#"
[redmine]
url = "https://tracker.example.com"
project_name = "rollout"

[spreadsheet.gantt]
start_date = "2024/01/29"
end_date = "2024/03/31"
strategy = "parallel"
"#;
        let err = Config::from_toml(text).unwrap_err();
        assert!(matches!(err, ConfigError::BadStrategy(s) if s == "parallel"));
    }

    #[test]
    fn prompts_fill_missing_credentials() {
        let mut config = Config::from_toml(MINIMAL).unwrap();
        config.need_login = true;

        let mut input = std::io::Cursor::new(b"reporter\nhunter2\n".to_vec());
        let mut output = Vec::new();
        config.prompt_credentials(&mut input, &mut output).unwrap();

        assert_eq!(config.username.as_deref(), Some("reporter"));
        assert_eq!(config.password.as_deref(), Some("hunter2"));
        let prompts = String::from_utf8(output).unwrap();
        assert!(prompts.contains("Username: "));
        assert!(prompts.contains("Password: "));
    }

    #[test]
    fn no_login_clears_credentials() {
        let mut config = Config::from_toml(MINIMAL).unwrap();
        config.username = Some("stale".into());
        config.password = Some("stale".into());

        let mut input = std::io::Cursor::new(Vec::new());
        let mut output = Vec::new();
        config.prompt_credentials(&mut input, &mut output).unwrap();

        assert_eq!(config.username, None);
        assert_eq!(config.password, None);
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, MINIMAL).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.project_name, "rollout");

        let missing = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::NotFound(_)));
    }
}
