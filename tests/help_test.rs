use assert_cmd::cargo::cargo_bin_cmd;

fn help_stdout(args: &[&str]) -> String {
    let mut cmd = cargo_bin_cmd!("ssdiff");
    cmd.args(args);
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("utf8 help output")
}

#[test]
fn help_shows_core_commands_only() {
    let stdout = help_stdout(&["--help"]);
    for name in ["status", "columns", "checksum", "compare", "init", "config"] {
        assert!(stdout.contains(name), "missing core command: {}", name);
    }
    for name in ["script-procs", "completions"] {
        assert!(!stdout.contains(name), "advanced command leaked: {}", name);
    }
}

#[test]
fn help_all_shows_advanced_commands() {
    let stdout = help_stdout(&["help", "--all"]);
    for name in ["script-procs", "completions"] {
        assert!(stdout.contains(name), "missing advanced command: {}", name);
    }
}

#[test]
fn help_for_single_command_mentions_its_flags() {
    let stdout = help_stdout(&["help", "compare"]);
    for flag in ["--target", "--details", "--csv"] {
        assert!(stdout.contains(flag), "compare help missing {}", flag);
    }
}
