//! Plain-text views and JSON report shapes for the CLI subcommands.

use owo_colors::OwoColorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use v2vtrace_types::{ErrorLevel, ExitStatus, GuestInfo, LineCategory, ParseOutput, ToolRun};

/// Applies ANSI styling only when color output is enabled.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    fn header(&self, text: &str) -> String {
        if self.color {
            text.cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn status(&self, status: ExitStatus) -> String {
        let text = status.to_string();
        if !self.color {
            return text;
        }
        match status {
            ExitStatus::Success => text.green().bold().to_string(),
            ExitStatus::Error => text.red().bold().to_string(),
            ExitStatus::InProgress => text.yellow().to_string(),
            ExitStatus::Unknown => text.dimmed().to_string(),
        }
    }

    fn level(&self, level: ErrorLevel) -> String {
        let text = format!("{:<7}", level.to_string());
        if !self.color {
            return text;
        }
        match level {
            ErrorLevel::Error => text.red().to_string(),
            ErrorLevel::Warning => text.yellow().to_string(),
        }
    }
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

fn guest_line(guest: &GuestInfo) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(os) = &guest.os_type {
        parts.push(os.clone());
    }
    if let Some(distro) = &guest.distro
        && guest.os_type.as_ref() != Some(distro)
    {
        parts.push(distro.clone());
    }
    if let Some(version) = guest.version_string() {
        parts.push(version);
    }
    if let Some(arch) = &guest.arch {
        parts.push(arch.clone());
    }
    if let Some(host) = &guest.hostname {
        parts.push(format!("host {}", host));
    }
    if let Some(root) = &guest.root_device {
        parts.push(format!("root {}", root));
    }
    if parts.is_empty() {
        "unidentified".to_string()
    } else {
        parts.join(" ")
    }
}

fn run_title(index: usize, run: &ToolRun, palette: Palette) -> String {
    let implicit = if run.is_implicit() { " (implicit)" } else { "" };
    format!(
        "run {}: {}  {}  lines {}-{}{}",
        index + 1,
        run.tool,
        palette.status(run.exit_status),
        run.start_line,
        run.end_line,
        implicit
    )
}

fn file_header(label: &str, output: &ParseOutput, palette: Palette) -> String {
    palette.header(&format!("== {} ({} lines) ==", label, output.total_lines))
}

pub fn render_summary(label: &str, output: &ParseOutput, palette: Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", file_header(label, output, palette));

    for (index, run) in output.tool_runs.iter().enumerate() {
        let _ = writeln!(out, "{}", run_title(index, run, palette));
        if !run.args.is_empty() {
            let _ = writeln!(out, "  args: {}", run.args);
        }
        if let (Some(start), Some(end)) = (run.started_at, run.finished_at) {
            let _ = writeln!(out, "  time: {} .. {}", start.to_rfc3339(), end.to_rfc3339());
        }
        if !run.stages.is_empty() {
            let _ = writeln!(out, "  stages:");
            for stage in &run.stages {
                let _ = writeln!(
                    out,
                    "    {} {}",
                    palette.dim(&format!("[{:>6.1}]", stage.elapsed_secs)),
                    stage.name
                );
            }
        }
        if !run.components.is_empty() {
            let components: Vec<String> = run
                .components
                .iter()
                .map(|c| format!("{} {}", c.component, c.version))
                .collect();
            let _ = writeln!(out, "  components: {}", components.join(", "));
        }
        if let Some(guest) = &run.guest {
            let _ = writeln!(out, "  guest: {}", guest_line(guest));
        }
        for disk in &run.disks {
            let target = disk
                .backing_file
                .as_deref()
                .or(disk.socket.as_deref())
                .unwrap_or(disk.connection_id.as_str());
            let mut details: Vec<String> = Vec::new();
            if let Some(plugin) = &disk.plugin {
                details.push(plugin.clone());
            }
            if let Some(transport) = &disk.transport {
                details.push(transport.clone());
            }
            if let Some(size) = disk.size {
                details.push(human_size(size));
            }
            if details.is_empty() {
                let _ = writeln!(out, "  disk {}: {}", disk.index, target);
            } else {
                let _ = writeln!(out, "  disk {}: {} ({})", disk.index, target, details.join(", "));
            }
        }
        let writes = run
            .hivex_accesses
            .iter()
            .filter(|a| a.mode == v2vtrace_types::HivexMode::Write)
            .count();
        let _ = writeln!(
            out,
            "  activity: {} api calls, {} hive accesses ({} writes), {} file copies",
            run.api_calls.len(),
            run.hivex_accesses.len(),
            writes,
            run.file_copies.len()
        );
        let _ = writeln!(
            out,
            "  diagnostics: {} errors, {} warnings",
            run.error_count(),
            run.warning_count()
        );
    }

    out
}

pub fn render_errors(label: &str, output: &ParseOutput, errors_only: bool, palette: Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", file_header(label, output, palette));

    let mut any = false;
    for (index, run) in output.tool_runs.iter().enumerate() {
        let diagnostics: Vec<_> = run
            .errors
            .iter()
            .filter(|e| !errors_only || e.is_error())
            .collect();
        if diagnostics.is_empty() {
            continue;
        }
        any = true;
        let _ = writeln!(out, "{}", run_title(index, run, palette));
        for diagnostic in diagnostics {
            let _ = writeln!(
                out,
                "  {:>6}  {}  {}: {}",
                diagnostic.line,
                palette.level(diagnostic.level),
                diagnostic.source,
                diagnostic.message
            );
        }
    }

    if !any {
        let _ = writeln!(out, "{}", palette.dim("  no errors or warnings"));
    }
    out
}

pub fn render_categories(label: &str, output: &ParseOutput, palette: Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", file_header(label, output, palette));

    for (index, run) in output.tool_runs.iter().enumerate() {
        let _ = writeln!(out, "{}", run_title(index, run, palette));
        for (category, count) in run.category_counts() {
            let _ = writeln!(out, "  {:<16}{:>6}", category.as_str(), count);
        }
    }
    out
}

/// `parse` output for one file: the parse result with its source path
#[derive(Debug, Serialize)]
pub struct ParseReport<'a> {
    pub path: String,
    #[serde(flatten)]
    pub output: &'a ParseOutput,
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub tool: String,
    pub exit_status: ExitStatus,
    pub start_line: usize,
    pub end_line: usize,
    pub implicit: bool,
    pub stages: Vec<String>,
    pub elapsed_secs: Option<f64>,
    pub errors: usize,
    pub warnings: usize,
    pub guest: Option<String>,
    pub disks: usize,
    pub hive_accesses: usize,
    pub file_copies: usize,
}

impl From<&ToolRun> for RunSummary {
    fn from(run: &ToolRun) -> Self {
        Self {
            tool: run.tool.to_string(),
            exit_status: run.exit_status,
            start_line: run.start_line,
            end_line: run.end_line,
            implicit: run.is_implicit(),
            stages: run.stages.iter().map(|s| s.name.clone()).collect(),
            elapsed_secs: run.last_elapsed_secs(),
            errors: run.error_count(),
            warnings: run.warning_count(),
            guest: run.guest.as_ref().map(guest_line),
            disks: run.disks.len(),
            hive_accesses: run.hivex_accesses.len(),
            file_copies: run.file_copies.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub path: String,
    pub total_lines: usize,
    pub runs: Vec<RunSummary>,
}

impl SummaryReport {
    pub fn new(path: String, output: &ParseOutput) -> Self {
        Self {
            path,
            total_lines: output.total_lines,
            runs: output.tool_runs.iter().map(RunSummary::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Diagnostic {
    pub run: usize,
    pub tool: String,
    pub level: ErrorLevel,
    pub source: String,
    pub message: String,
    pub line: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorsReport {
    pub path: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl ErrorsReport {
    pub fn new(path: String, output: &ParseOutput, errors_only: bool) -> Self {
        let diagnostics = output
            .tool_runs
            .iter()
            .enumerate()
            .flat_map(|(index, run)| {
                run.errors
                    .iter()
                    .filter(move |e| !errors_only || e.is_error())
                    .map(move |e| Diagnostic {
                        run: index + 1,
                        tool: run.tool.to_string(),
                        level: e.level,
                        source: e.source.clone(),
                        message: e.message.clone(),
                        line: e.line,
                    })
            })
            .collect();
        Self { path, diagnostics }
    }
}

#[derive(Debug, Serialize)]
pub struct RunCategories {
    pub tool: String,
    pub lines: usize,
    pub counts: BTreeMap<LineCategory, usize>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesReport {
    pub path: String,
    pub runs: Vec<RunCategories>,
}

impl CategoriesReport {
    pub fn new(path: String, output: &ParseOutput) -> Self {
        Self {
            path,
            runs: output
                .tool_runs
                .iter()
                .map(|run| RunCategories {
                    tool: run.tool.to_string(),
                    lines: run.line_count(),
                    counts: run.category_counts(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use v2vtrace_engine::parse_log;
    use v2vtrace_testing::fixtures::{FAILED_CONVERSION, three_tool_sequence};

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(42949672960), "40.0 GiB");
        assert_eq!(human_size(1536), "1.5 KiB");
    }

    #[test]
    fn test_summary_of_failed_conversion() {
        let output = parse_log(FAILED_CONVERSION);
        let text = render_summary("failed.log", &output, Palette::plain());

        insta::assert_snapshot!(text, @r"
        == failed.log (10 lines) ==
        run 1: virt-v2v  error  lines 0-9
          args: -v -x -i vmx /data/vm/vm.vmx -o local -os /var/tmp
          stages:
            [   0.0] Setting up the source: -i vmx /data/vm/vm.vmx
            [   1.1] Opening the source
            [  12.9] Inspecting the source
          components: virt-v2v 2.4.0, libvirt 9.0.0
          activity: 1 api calls, 0 hive accesses (0 writes), 0 file copies
          diagnostics: 1 errors, 0 warnings
        ");
    }

    #[test]
    fn test_errors_view() {
        let output = parse_log(FAILED_CONVERSION);
        let text = render_errors("failed.log", &output, false, Palette::plain());

        insta::assert_snapshot!(text, @r"
        == failed.log (10 lines) ==
        run 1: virt-v2v  error  lines 0-9
               8  error    virt-v2v: inspection could not detect the source guest (or physical machine).
        ");
    }

    #[test]
    fn test_errors_view_without_findings() {
        let output = parse_log(&three_tool_sequence());
        let text = render_errors("seq.log", &output, false, Palette::plain());

        assert!(text.ends_with("  no errors or warnings\n"));
    }

    #[test]
    fn test_categories_cover_every_line() {
        let output = parse_log(&three_tool_sequence());
        let report = CategoriesReport::new("seq.log".to_string(), &output);

        for run in &report.runs {
            assert_eq!(run.counts.values().sum::<usize>(), run.lines);
            assert_eq!(run.counts.get(&LineCategory::Command), Some(&1));
        }
    }

    #[test]
    fn test_parse_report_flattens_output() {
        let output = parse_log("");
        let json = serde_json::to_value(ParseReport {
            path: "empty.log".to_string(),
            output: &output,
        })
        .unwrap();

        assert_eq!(json["path"], "empty.log");
        assert_eq!(json["total_lines"], 1);
        assert_eq!(json["tool_runs"][0]["tool"], "virt-v2v");
    }

    #[test]
    fn test_colored_status_is_styled() {
        let output = parse_log(FAILED_CONVERSION);
        let colored = render_summary("f", &output, Palette::new(true));

        assert!(colored.contains("\u{1b}["));
        assert!(!render_summary("f", &output, Palette::plain()).contains("\u{1b}["));
    }
}
