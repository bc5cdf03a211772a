use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use std::fs;
use std::io::Write;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

// Each shell gets its own process group so that `exit` and interrupts
// never reach the test harness.
fn spawn(dir: &Path) -> Child {
    Command::new(env!("CARGO_BIN_EXE_smallsh"))
        .current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join("config"))
        .env_remove("SMALLSH_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .spawn()
        .unwrap()
}

fn run(dir: &Path, input: &str) -> Output {
    let mut child = spawn(dir);
    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn interrupt(child: &Child) {
    killpg(Pid::from_raw(child.id() as i32), Signal::SIGINT).unwrap();
}

fn background_pids(text: &str) -> Vec<i32> {
    text.lines()
        .filter_map(|line| line.split("background pid is ").nth(1))
        .map(|pid| pid.trim().parse().unwrap())
        .collect()
}

fn is_gone(pid: i32) -> bool {
    match fs::read_to_string(format!("/proc/{}/stat", pid)) {
        // Field 3 is the state; a zombie has already been terminated
        Ok(stat) => stat
            .rsplit(')')
            .next()
            .map(|rest| rest.trim_start().starts_with('Z'))
            .unwrap_or(false),
        Err(_) => true,
    }
}

#[test]
fn prompt_precedes_every_read() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), "\n# nothing to see\n");

    assert_eq!(": : : ", stdout(&output));
    assert_eq!("", stderr(&output));
    assert_eq!(Some(0), output.status.code());
}

#[test]
fn status_before_any_command_is_null() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), "status\nstatus\ncd no-such-dir\nstatus\n");

    assert_eq!(
        ": NULL\n: exit value 0\n: : exit value 1\n: ",
        stdout(&output)
    );
}

#[test]
fn status_reflects_exit_code() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "exit3.sh", "exit 3\n");

    let output = run(dir.path(), &format!("sh {}\nstatus\n", script.display()));

    assert!(stdout(&output).contains("exit value 3\n"));
}

#[test]
fn status_resets_after_reading() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), "false\nstatus\nstatus\n");

    assert!(stdout(&output).contains("exit value 1\n: exit value 0\n"));
}

#[test]
fn redirect_round_trip() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), "echo hello > out.txt\ncat out.txt\n");

    assert_eq!("hello\n", fs::read_to_string(dir.path().join("out.txt")).unwrap());
    assert!(stdout(&output).contains(": hello\n"));
}

#[test]
fn input_redirect_feeds_program() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("words.txt"), "pear\napple\n").unwrap();

    let output = run(dir.path(), "sort < words.txt\n");

    assert!(stdout(&output).contains("apple\npear\n"));
}

#[test]
fn unreadable_input_fails_child_only() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), "cat < missing.txt\nstatus\necho still here\n");

    assert!(stderr(&output).contains("cannot open missing.txt for input"));
    assert!(stdout(&output).contains("exit value 1\n"));
    assert!(stdout(&output).contains("still here\n"));
}

#[test]
fn unwritable_output_fails_child_only() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), "echo x > no-such-dir/out.txt\nstatus\necho still here\n");

    assert!(stderr(&output).contains("cannot open no-such-dir/out.txt for output"));
    assert!(stdout(&output).contains("exit value 1\n"));
    assert!(!stdout(&output).contains(": x\n"));
    assert!(stdout(&output).contains("still here\n"));
}

#[test]
fn background_input_without_path_reads_null_device() {
    let dir = TempDir::new().unwrap();
    let started = Instant::now();

    let output = run(dir.path(), "cat < &\nsleep 1\nexit\n");

    assert!(started.elapsed() < Duration::from_secs(5));
    let pid = background_pids(&stdout(&output))[0];
    assert!(stdout(&output).contains(&format!("background pid {} is done: exit value 0\n", pid)));
    assert_eq!("", stderr(&output));
}

#[test]
fn unknown_program_fails_child_only() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), "smallsh-no-such-program arg\nstatus\n");

    assert!(stderr(&output).contains("smallsh-no-such-program: no such file or directory"));
    assert!(stdout(&output).contains("exit value 1\n"));
    assert_eq!(Some(0), output.status.code());
}

#[test]
fn missing_redirect_target_is_a_syntax_error() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), "ls >\nstatus\necho next\n");

    assert!(stderr(&output).contains("syntax error near `>`"));
    // A rejected line leaves the record untouched
    assert!(stdout(&output).contains(": NULL\n"));
    assert!(stdout(&output).contains("next\n"));
}

#[test]
fn overlong_line_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &format!("echo {}\necho next\n", "x".repeat(3000)));

    assert!(stderr(&output).contains("line too long"));
    assert!(!stdout(&output).contains("xxx"));
    assert!(stdout(&output).contains("next\n"));
}

#[test]
fn cd_changes_directory() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    let sub = dir.path().join("sub").canonicalize().unwrap();

    let output = run(dir.path(), "cd sub\nstatus\npwd\n");

    assert!(stdout(&output).contains("exit value 0\n"));
    assert!(stdout(&output).contains(&format!("{}\n", sub.display())));
}

#[test]
fn cd_without_argument_goes_home() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    let home = dir.path().canonicalize().unwrap();

    let output = run(dir.path(), "cd sub\ncd\npwd\n");

    assert!(stdout(&output).contains(&format!(": {}\n", home.display())));
}

#[test]
fn cd_failure_is_reported_and_recorded() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), "cd no-such-dir\nstatus\necho next\n");

    assert!(stderr(&output).contains("no such file or directory"));
    assert!(stdout(&output).contains("exit value 1\n"));
    assert!(stdout(&output).contains("next\n"));
}

#[test]
fn background_does_not_block_prompt() {
    let dir = TempDir::new().unwrap();
    let started = Instant::now();

    let output = run(dir.path(), "sleep 5 &\necho next\nexit\n");

    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(1, background_pids(&stdout(&output)).len());
    assert!(stdout(&output).contains("next\n"));
}

#[test]
fn finished_background_job_is_reported() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), "true &\nsleep 1\nexit\n");

    let pid = background_pids(&stdout(&output))[0];
    assert!(stdout(&output).contains(&format!("background pid {} is done: exit value 0\n", pid)));
}

#[test]
fn background_redirect_without_path_uses_null_device() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), "echo hidden > &\nsleep 1\nexit\n");

    assert!(stdout(&output).contains("is done: exit value 0"));
    assert!(!stdout(&output).contains("hidden"));
    assert!(!stderr(&output).contains("hidden"));
}

#[test]
fn interrupt_terminates_foreground_child() {
    let dir = TempDir::new().unwrap();
    let mut child = spawn(dir.path());
    let mut stdin = child.stdin.take().unwrap();

    stdin.write_all(b"sleep 10\n").unwrap();
    thread::sleep(Duration::from_millis(500));
    interrupt(&child);

    stdin.write_all(b"status\necho alive\nexit\n").unwrap();
    drop(stdin);
    let output = child.wait_with_output().unwrap();

    // Once when the child dies, once more from `status`
    assert_eq!(2, stdout(&output).matches("terminated by signal 2\n").count());
    assert!(stdout(&output).contains("alive\n"));
    assert_eq!(Some(0), output.status.code());
}

#[test]
fn interrupt_at_prompt_is_ignored() {
    let dir = TempDir::new().unwrap();
    let mut child = spawn(dir.path());
    let mut stdin = child.stdin.take().unwrap();

    thread::sleep(Duration::from_millis(300));
    interrupt(&child);

    stdin.write_all(b"echo alive\nexit\n").unwrap();
    drop(stdin);
    let output = child.wait_with_output().unwrap();

    assert!(stdout(&output).contains("alive\n"));
    assert_eq!(Some(0), output.status.code());
}

#[test]
fn interrupt_does_not_reach_background_jobs() {
    let dir = TempDir::new().unwrap();
    let mut child = spawn(dir.path());
    let mut stdin = child.stdin.take().unwrap();

    stdin.write_all(b"sleep 1 &\n").unwrap();
    thread::sleep(Duration::from_millis(300));
    interrupt(&child);

    stdin.write_all(b"sleep 2\nexit\n").unwrap();
    drop(stdin);
    let output = child.wait_with_output().unwrap();

    let pid = background_pids(&stdout(&output))[0];
    assert!(stdout(&output).contains(&format!("background pid {} is done: exit value 0\n", pid)));
}

#[test]
fn exit_terminates_background_jobs() {
    let dir = TempDir::new().unwrap();
    let started = Instant::now();

    let output = run(dir.path(), "sleep 30 &\nsleep 30 &\nexit\n");

    // The jobs share our stdout, so reaching EOF already means they are gone
    assert!(started.elapsed() < Duration::from_secs(20));
    assert_eq!(Some(0), output.status.code());

    let pids = background_pids(&stdout(&output));
    assert_eq!(2, pids.len());

    let deadline = Instant::now() + Duration::from_secs(5);
    while !pids.iter().all(|&pid| is_gone(pid)) && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(50));
    }
    assert!(pids.iter().all(|&pid| is_gone(pid)));
}

#[test]
fn end_of_input_exits_cleanly() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), "sleep 30 &\n");

    assert_eq!(Some(0), output.status.code());
}

#[test]
fn init_script_runs_before_prompt() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config").join("smallsh");
    fs::create_dir_all(&config).unwrap();
    fs::write(config.join("init"), "# start-up\necho from-init\n").unwrap();

    let output = run(dir.path(), "echo from-tty\n");

    assert_eq!("from-init\n: from-tty\n: ", stdout(&output));
}

#[test]
fn broken_init_script_is_abandoned() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config").join("smallsh");
    fs::create_dir_all(&config).unwrap();
    fs::write(config.join("init"), "cat <\necho never\n").unwrap();

    let output = run(dir.path(), "echo from-tty\n");

    assert!(stderr(&output).contains("syntax error near `<`"));
    assert!(stderr(&output).contains("line 1: cat <"));
    assert!(!stdout(&output).contains("never"));
    assert!(stdout(&output).contains("from-tty\n"));
}
