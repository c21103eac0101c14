use v2vtrace_engine::{parse_log, parse_log_with};
use v2vtrace_testing::LogBuilder;
use v2vtrace_testing::fixtures::{
    AMAZON_LINUX_INSPECTION, FAILED_CONVERSION, WINDOWS_IN_PLACE, three_tool_sequence,
};
use v2vtrace_types::{
    CopyOrigin, ErrorLevel, ExitStatus, HivexMode, LineCategory, ParseOptions, ToolKind,
};

#[test]
fn test_empty_input_is_one_implicit_run() {
    let output = parse_log("");

    assert_eq!(output.total_lines, 1);
    assert_eq!(output.tool_runs.len(), 1);
    let run = &output.tool_runs[0];
    assert!(run.is_implicit());
    assert_eq!(run.tool, ToolKind::VirtV2v);
    assert!(run.stages.is_empty());
    assert_eq!(run.exit_status, ExitStatus::Unknown);
    assert_eq!(run.line_categories, vec![LineCategory::Other]);
}

#[test]
fn test_three_tool_sequence() {
    let output = parse_log(&three_tool_sequence());

    let tools: Vec<_> = output.tool_runs.iter().map(|r| r.tool).collect();
    assert_eq!(
        tools,
        vec![ToolKind::InPlace, ToolKind::Inspector, ToolKind::Customize]
    );
    assert_eq!(output.tool_runs[2].tool.as_str(), "virt-v2v-customize");

    for run in &output.tool_runs {
        assert_eq!(run.exit_status, ExitStatus::Success);
        assert_eq!(run.line_categories.len(), run.end_line - run.start_line + 1);
        assert_eq!(run.invocation_line, Some(run.start_line));
    }

    let ranges: Vec<_> = output
        .tool_runs
        .iter()
        .map(|r| (r.start_line, r.end_line))
        .collect();
    assert_eq!(ranges, vec![(0, 3), (4, 6), (7, 9)]);
}

#[test]
fn test_preamble_belongs_to_first_run() {
    let log = LogBuilder::new()
        .line("wrapper: starting conversion job 42")
        .invocation("virt-v2v", "-v")
        .stage(1.0, "Opening the source")
        .build();
    let output = parse_log(&log);

    assert_eq!(output.tool_runs.len(), 1);
    let run = &output.tool_runs[0];
    assert_eq!(run.start_line, 0);
    assert_eq!(run.invocation_line, Some(1));
    assert_eq!(run.args, "-v");
    assert_eq!(run.exit_status, ExitStatus::InProgress);
}

#[test]
fn test_failed_conversion() {
    let output = parse_log(FAILED_CONVERSION);
    let run = &output.tool_runs[0];

    assert_eq!(run.exit_status, ExitStatus::Error);
    assert_eq!(run.error_count(), 1);
    assert_eq!(run.errors[0].source, "virt-v2v");
    assert_eq!(
        run.errors[0].message,
        "inspection could not detect the source guest (or physical machine)."
    );

    let backend = run
        .api_calls
        .iter()
        .find(|c| c.name == "get_backend_setting")
        .unwrap();
    assert!(backend.is_error());
    assert_eq!(run.line_categories[backend.result_line.unwrap()], LineCategory::Libguestfs);

    let components: Vec<_> = run
        .components
        .iter()
        .map(|c| format!("{} {}", c.component, c.version))
        .collect();
    assert_eq!(components, vec!["virt-v2v 2.4.0", "libvirt 9.0.0"]);
}

#[test]
fn test_finishing_off_beats_fatal_error() {
    let log = LogBuilder::new()
        .invocation("virt-v2v", "")
        .line("virt-v2v: error: libguestfs error: could not create appliance")
        .stage(30.0, "Finishing off")
        .build();
    let run = &parse_log(&log).tool_runs[0];

    assert_eq!(run.error_count(), 1);
    assert_eq!(run.exit_status, ExitStatus::Success);
}

#[test]
fn test_windows_in_place_conversion() {
    let output = parse_log(WINDOWS_IN_PLACE);
    assert_eq!(output.tool_runs.len(), 1);
    let run = &output.tool_runs[0];

    assert_eq!(run.tool, ToolKind::InPlace);
    assert_eq!(run.exit_status, ExitStatus::Success);
    assert_eq!(run.stages.len(), 8);
    assert_eq!(run.line_categories.len(), run.line_count());
    assert_eq!(
        run.started_at.map(|t| t.to_rfc3339()).as_deref(),
        Some("2024-05-02T09:14:01.120+00:00")
    );

    // nbdkit
    assert_eq!(run.connections.len(), 1);
    let conn = &run.connections[0];
    assert_eq!(conn.id, "/tmp/v2v.Qa1/in0");
    assert_eq!(conn.plugin.as_deref(), Some("file"));
    assert_eq!(conn.filters, vec!["cacheextents", "retry"]);
    assert_eq!(conn.size, Some(42949672960));
    assert_eq!(run.disks.len(), 1);
    assert_eq!(run.disks[0].backing_file.as_deref(), Some("/var/lib/images/win.img"));

    // guest
    let guest = run.guest.as_ref().unwrap();
    assert!(guest.is_windows());
    assert_eq!(guest.root_device.as_deref(), Some("/dev/sda2"));
    assert_eq!(guest.version_string().as_deref(), Some("10.0"));
    let windows = guest.windows.as_ref().unwrap();
    assert_eq!(windows.current_control_set.as_deref(), Some("ControlSet001"));
    assert_eq!(windows.drive_mappings[0].device, "/dev/sda2");

    // hives
    assert_eq!(run.hivex_accesses.len(), 2);
    let software = &run.hivex_accesses[0];
    assert_eq!(software.key_path, "Microsoft.Windows NT");
    assert_eq!(software.mode, HivexMode::Read);
    assert_eq!(software.values[0].value, "Windows Server 2019 Standard");
    let system = &run.hivex_accesses[1];
    assert_eq!(system.key_path, "ControlSet001.Services.viostor");
    assert_eq!(system.mode, HivexMode::Write);
    assert_eq!(run.line_categories[system.line], LineCategory::Libguestfs);

    // daemon scope
    let mount = run.api_calls.iter().find(|c| c.name == "mount_ro").unwrap();
    assert_eq!(mount.guest_commands[0].command, "mount -o ro /dev/sda2 /sysroot/");
    assert_eq!(mount.duration_secs, Some(0.04));

    // firstboot script
    assert_eq!(run.file_copies.len(), 1);
    let script = &run.file_copies[0];
    assert_eq!(script.origin, CopyOrigin::Generated);
    assert!(script.content.as_deref().unwrap().contains("msiexec.exe"));

    // diagnostics
    assert_eq!(run.warning_count(), 1);
    assert_eq!(run.errors[0].level, ErrorLevel::Warning);
    assert_eq!(run.error_count(), 0);

    let components: Vec<_> = run
        .components
        .iter()
        .map(|c| format!("{} {}", c.component, c.version))
        .collect();
    insta::assert_snapshot!(components.join("\n"), @r"
    virt-v2v-in-place 2.4.0
    nbdkit 1.36.1
    libguestfs 1.50.1
    ");
}

#[test]
fn test_amazon_linux_cpe_version() {
    let run = &parse_log(AMAZON_LINUX_INSPECTION).tool_runs[0];
    let guest = run.guest.as_ref().unwrap();

    assert_eq!(run.tool, ToolKind::Inspector);
    assert_eq!((guest.major_version, guest.minor_version), (Some(2023), Some(0)));
    assert_eq!(guest.applications.len(), 2);
    assert_eq!(guest.block_devices.len(), 2);
    let linux = guest.linux.as_ref().unwrap();
    assert_eq!(linux.fstab[0].device, "/dev/nvme0n1p1");
    assert_eq!(linux.fstab[0].mountpoint, "/");
}

#[test]
fn test_hive_session_shapes() {
    let log = LogBuilder::new()
        .invocation("virt-v2v", "")
        // open, root, close: nothing to report
        .hive_open("/tmp/SAM", false)
        .hive_root(1)
        .hive_close()
        // two descents from the root
        .hive_open("/tmp/SYSTEM", true)
        .hive_root(4096)
        .hive_child(4096, "Select", 5000)
        .hive_child(4096, "ControlSet001", 6000)
        .hive_close()
        // a write after navigation
        .hive_open("/tmp/SYSTEM", true)
        .hive_root(4096)
        .hive_child(4096, "ControlSet001", 6000)
        .hive_set_dword(6000, "Start", 3)
        .hive_close()
        .build();
    let run = &parse_log(&log).tool_runs[0];

    let accesses: Vec<_> = run
        .hivex_accesses
        .iter()
        .map(|a| format!("{} {} {}", a.hive_path, a.mode, a.key_path))
        .collect();
    insta::assert_snapshot!(accesses.join("\n"), @r"
    /tmp/SYSTEM read Select
    /tmp/SYSTEM read ControlSet001
    /tmp/SYSTEM write ControlSet001
    ");

    let write = &run.hivex_accesses[2];
    assert_eq!(write.values[0].value, "3");
    assert_eq!(write.line, write.values[0].line);
}

#[test]
fn test_hive_write_carries_across_descents() {
    let log = LogBuilder::new()
        .invocation("virt-v2v", "")
        .hive_open("/tmp/SYSTEM", true)
        .hive_root(4096)
        .hive_child(4096, "ControlSet001", 5000)
        .hive_set_dword(5000, "Start", 3)
        .hive_child(4096, "Select", 6000)
        .hive_string(6000, "Current", "1")
        .hive_close()
        .build();
    let run = &parse_log(&log).tool_runs[0];

    assert_eq!(run.hivex_accesses.len(), 2);
    let (control, select) = (&run.hivex_accesses[0], &run.hivex_accesses[1]);
    assert_eq!(control.key_path, "ControlSet001");
    assert_eq!(control.mode, HivexMode::Write);
    assert_eq!(control.line, 6);
    assert_eq!(select.key_path, "Select");
    assert_eq!(select.mode, HivexMode::Write);
    assert_eq!(select.line, 6);
    assert_eq!(select.values[0].name, "Current");
    assert_eq!(select.values[0].value, "1");
    assert_eq!(select.values[0].line, 12);
}

#[test]
fn test_daemon_scope_and_banner() {
    let log = LogBuilder::new()
        .invocation("virt-v2v", "-v")
        .banner("virt-v2v", "2.4.0")
        .call("mount_ro", "\"/dev/sda1\" \"/\"")
        .daemon_request(
            "mount_ro",
            0x49,
            &["commandrvf: mount -o ro /dev/sda1 /sysroot/"],
            0.02,
        )
        .ret("mount_ro", "0")
        .build();
    let run = &parse_log(&log).tool_runs[0];

    assert_eq!(run.components[0].component, "virt-v2v");
    assert_eq!(run.components[0].version, "2.4.0");
    assert_eq!(run.line_categories[1], LineCategory::Info);

    let call = &run.api_calls[0];
    assert_eq!(call.name, "mount_ro");
    assert_eq!(call.result.as_deref(), Some("0"));
    assert_eq!(call.duration_secs, Some(0.02));
    assert_eq!(call.guest_commands[0].command, "mount -o ro /dev/sda1 /sysroot/");
    assert_eq!(call.guest_commands[0].line, 4);
    assert!(run.orphan_commands.is_empty());
}

#[test]
fn test_corrupted_lines_are_repaired() {
    let log = "Building command: virt-v2v [-v]Building command: virt-customize [-a x]\n\
               libguestfs: trace: v2v: is_dir \"/a\"libguestfs: trace: v2v: is_dir = 1";
    let output = parse_log(log);

    assert_eq!(output.total_lines, 4);
    assert_eq!(output.tool_runs.len(), 2);
    let customize = &output.tool_runs[1];
    assert_eq!(customize.tool, ToolKind::Customize);
    assert_eq!(customize.api_calls.len(), 1);
    assert_eq!(customize.api_calls[0].result.as_deref(), Some("1"));
}

#[test]
fn test_options_are_honoured() {
    let log = LogBuilder::new()
        .lines(std::iter::repeat_n("noise", 3))
        .line("/usr/bin/virt-v2v-inspector -i disk x.img")
        .build();

    let shallow = ParseOptions {
        implicit_probe_lines: 2,
        ..ParseOptions::default()
    };
    assert_eq!(parse_log_with(&log, &shallow).tool_runs[0].tool, ToolKind::VirtV2v);
    assert_eq!(parse_log(&log).tool_runs[0].tool, ToolKind::Inspector);
}

#[test]
fn test_output_serializes_snake_case() {
    let json = serde_json::to_value(parse_log(FAILED_CONVERSION)).unwrap();
    let run = &json["tool_runs"][0];

    assert_eq!(run["tool"], "virt-v2v");
    assert_eq!(run["exit_status"], "error");
    assert_eq!(run["line_categories"][0], "command");
    assert_eq!(run["errors"][0]["level"], "error");
}
