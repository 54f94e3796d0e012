//! End-to-end report run
//!
//! Fetch → resolve → layout → grid → workbook → save. Everything is
//! blocking and sequential; a tracker failure anywhere aborts the run
//! before a file is produced.

use std::io::{BufRead, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{error, info};

use redgantt_core::IssueRepository;
use redgantt_render::{map_date_grid, ReportWriter};
use redgantt_resolver::{layout_rows, resolve, LayoutConfig, ResolverConfig, RunContext};

use crate::config::Config;
use crate::redmine::RedmineClient;

/// Execute one report run against the configured tracker.
///
/// `output` skips the interactive save prompt; save errors are then fatal.
pub fn run(config: &Config, output: Option<&str>) -> Result<()> {
    let client = RedmineClient::new(
        &config.url,
        config.username.as_deref(),
        config.password.as_deref(),
    );
    let bytes = build_report(config, client)?;

    let Some(bytes) = bytes else {
        return Ok(());
    };

    match output {
        Some(name) => {
            let path = xlsx_path(name);
            std::fs::write(&path, &bytes).with_context(|| format!("can't save to '{path}'"))?;
            info!("Saved '{path}'");
        }
        None => {
            let stdin = std::io::stdin();
            save_interactively(&bytes, &mut stdin.lock(), &mut std::io::stdout())?;
        }
    }
    Ok(())
}

/// Run the pipeline up to workbook bytes. `None` means the filter matched
/// nothing and no file should be written.
fn build_report<R: IssueRepository>(config: &Config, repo: R) -> Result<Option<Vec<u8>>> {
    let mut cx = RunContext::new(repo);

    let targets = cx
        .repo
        .filter(&config.filter)
        .context("fetching issues failed")?;
    if targets.is_empty() {
        info!("No issues found with the specified filter.");
        return Ok(None);
    }
    info!("Total found issues : {}", targets.len());
    cx.adopt_targets(targets);

    let started = Instant::now();

    let resolver_config = ResolverConfig {
        include_parents: config.include_parents,
        strategy: config.strategy,
    };
    let forest = resolve(&mut cx, &resolver_config).context("resolving issue hierarchy failed")?;

    let layout_config = LayoutConfig {
        indent_step: config.indent_step,
        ..LayoutConfig::default()
    };
    let rows = layout_rows(&mut cx, &forest, &layout_config).context("row layout failed")?;

    let grid = map_date_grid(&config.range, &config.calendar);

    let mut writer = ReportWriter::new(&config.link_url).tab_title(&config.tab_title);
    if let Some(font) = &config.font_name {
        writer = writer.font_name(font);
    }
    let bytes = writer
        .render_to_bytes(&rows, &grid)
        .context("workbook generation failed")?;

    info!("Total process time : {:.3?}", started.elapsed());
    Ok(Some(bytes))
}

fn xlsx_path(name: &str) -> String {
    if name.ends_with(".xlsx") {
        name.to_string()
    } else {
        format!("{name}.xlsx")
    }
}

/// Prompt for an output name until the file saves or the user gives up.
fn save_interactively(
    bytes: &[u8],
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<()> {
    loop {
        write!(output, " Input file name (the '.xlsx' extension is added) : ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            error!("No file name entered; nothing saved.");
            return Ok(());
        }
        let name = line.trim();
        if name.is_empty() {
            continue;
        }

        let path = xlsx_path(name);
        match std::fs::write(&path, bytes) {
            Ok(()) => {
                info!("Saved '{path}'");
                return Ok(());
            }
            Err(e) => {
                error!("Can't save to '{path}': {e}");
                write!(output, " Do you want to try again? [y/n] : ")?;
                output.flush()?;
                let mut answer = String::new();
                input.read_line(&mut answer)?;
                if answer.trim().eq_ignore_ascii_case("n") {
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use redgantt_core::{FilterCriteria, Issue, IssueId, TrackerError};

    struct FakeRepo {
        issues: Vec<Issue>,
    }

    impl IssueRepository for FakeRepo {
        fn get(&mut self, id: IssueId) -> Result<Issue, TrackerError> {
            self.issues
                .iter()
                .find(|i| i.id == id)
                .cloned()
                .ok_or(TrackerError::NotFound(id))
        }

        fn filter(&mut self, _criteria: &FilterCriteria) -> Result<Vec<Issue>, TrackerError> {
            Ok(self.issues.iter().filter(|i| i.has_parent()).cloned().collect())
        }

        fn children(&mut self, id: IssueId) -> Result<Vec<Issue>, TrackerError> {
            Ok(self
                .issues
                .iter()
                .filter(|i| i.parent_id == Some(id))
                .cloned()
                .collect())
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn test_config() -> Config {
        Config::from_toml(
            r#"
[redmine]
url = "https://tracker.example.com"
project_name = "rollout"

[spreadsheet.gantt]
start_date = "2024/01/29"
end_date = "2024/02/25"
"#,
        )
        .unwrap()
    }

    #[test]
    fn pipeline_produces_workbook_bytes() {
        let repo = FakeRepo {
            issues: vec![
                Issue::new(100, "Rollout").start(date(2024, 2, 1)).due(date(2024, 2, 20)),
                Issue::new(101, "Site preparation")
                    .parent(100)
                    .start(date(2024, 2, 1))
                    .due(date(2024, 2, 5)),
                Issue::new(102, "Installation")
                    .parent(100)
                    .start(date(2024, 2, 6))
                    .due(date(2024, 2, 20)),
            ],
        };

        let bytes = build_report(&test_config(), repo).unwrap();
        let bytes = bytes.expect("filter matched issues");
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn empty_filter_result_produces_no_file() {
        let repo = FakeRepo { issues: Vec::new() };
        let bytes = build_report(&test_config(), repo).unwrap();
        assert!(bytes.is_none());
    }

    #[test]
    fn xlsx_extension_is_appended_once() {
        assert_eq!(xlsx_path("report"), "report.xlsx");
        assert_eq!(xlsx_path("report.xlsx"), "report.xlsx");
    }

    #[test]
    fn interactive_save_writes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("report");
        let name = format!("{}\n", target.display());

        let mut input = std::io::Cursor::new(name.into_bytes());
        let mut prompts = Vec::new();
        save_interactively(b"data", &mut input, &mut prompts).unwrap();

        let written = std::fs::read(dir.path().join("report.xlsx")).unwrap();
        assert_eq!(written, b"data");
    }

    #[test]
    fn interactive_save_retries_then_gives_up() {
        let dir = tempfile::tempdir().unwrap();
        // Missing parent directory forces the retry branch
        let bad = dir.path().join("missing/report").display().to_string();
        let script = format!("{bad}\ny\n{bad}\nn\n");

        let mut input = std::io::Cursor::new(script.into_bytes());
        let mut prompts = Vec::new();
        save_interactively(b"data", &mut input, &mut prompts).unwrap();

        let text = String::from_utf8(prompts).unwrap();
        assert_eq!(text.matches("try again?").count(), 2);
    }
}
