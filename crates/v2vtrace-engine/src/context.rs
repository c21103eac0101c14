use crate::classify::classify;
use crate::preprocess::LogLine;
use crate::segment::Section;
use crate::trace::parse_trace;
use crate::trackers::calls::CallTracker;
use crate::trackers::components::ComponentTracker;
use crate::trackers::errors::ErrorTracker;
use crate::trackers::file_copy::FileCopyTracker;
use crate::trackers::guest::GuestTracker;
use crate::trackers::hivex::HivexTracker;
use crate::trackers::nbdkit::ConnectionTracker;
use crate::trackers::stages::StageTracker;
use crate::trackers::{LineView, Tracker};
use chrono::{DateTime, FixedOffset};
use v2vtrace_types::{DiskSummary, LineCategory, ParseOptions, ToolRun};

/// Mutable state of one section's forward scan.
pub struct ParseContext {
    stages: StageTracker,
    calls: CallTracker,
    hivex: HivexTracker,
    connections: ConnectionTracker,
    guest: GuestTracker,
    file_copies: FileCopyTracker,
    errors: ErrorTracker,
    components: ComponentTracker,
    categories: Vec<LineCategory>,
    started_at: Option<DateTime<FixedOffset>>,
    finished_at: Option<DateTime<FixedOffset>>,
    last_line: usize,
}

impl ParseContext {
    pub fn new(options: &ParseOptions) -> Self {
        Self {
            stages: StageTracker::new(),
            calls: CallTracker::new(options.max_stdout_lines),
            hivex: HivexTracker::new(),
            connections: ConnectionTracker::new(options.max_connection_lines),
            guest: GuestTracker::new(),
            file_copies: FileCopyTracker::new(options.decode_file_content),
            errors: ErrorTracker::new(),
            components: ComponentTracker::new(),
            categories: Vec::new(),
            started_at: None,
            finished_at: None,
            last_line: 0,
        }
    }

    pub fn observe(&mut self, number: usize, line: &LogLine) {
        let category = classify(&line.text);
        let trace = match category {
            LineCategory::Libguestfs => parse_trace(line.text.trim()),
            _ => None,
        };
        let view = LineView::new(number, &line.text, category, trace.as_ref());

        let trackers: [&mut dyn Tracker; 8] = [
            &mut self.stages,
            &mut self.errors,
            &mut self.calls,
            &mut self.hivex,
            &mut self.connections,
            &mut self.guest,
            &mut self.file_copies,
            &mut self.components,
        ];
        for tracker in trackers {
            tracker.observe(&view);
        }

        self.categories.push(category);
        self.last_line = number;
        if let Some(ts) = line.timestamp {
            self.started_at.get_or_insert(ts);
            self.finished_at = Some(ts);
        }
    }

    /// Flush every tracker and assemble the run.
    pub fn finish(self, section: &Section) -> ToolRun {
        let exit_status = self.stages.exit_status(self.errors.has_error());
        let calls = self.calls.finish();
        let connections = self.connections.finish();
        let disks = connections
            .iter()
            .enumerate()
            .map(DiskSummary::from)
            .collect();

        ToolRun {
            tool: section.tool,
            args: section.args.clone(),
            exit_status,
            start_line: section.start,
            end_line: section.end,
            invocation_line: section.invocation_line,
            started_at: self.started_at,
            finished_at: self.finished_at,
            stages: self.stages.into_stages(),
            api_calls: calls.calls,
            orphan_commands: calls.orphans,
            hivex_accesses: self.hivex.finish(self.last_line),
            connections,
            disks,
            guest: self.guest.finish(),
            file_copies: self.file_copies.finish(),
            errors: self.errors.finish(),
            components: self.components.finish(),
            line_categories: self.categories,
        }
    }
}
