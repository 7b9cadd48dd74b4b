//! Launching the game and tracking whether it runs.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use platswap_engine::{InstanceGuard, LaunchError, ProcessLauncher};
use sysinfo::{ProcessesToUpdate, System};
use tracing::{info, warn};

/// Executable names the game runs under.
pub const GAME_PROCESS_NAMES: &[&str] = &["Game.exe", "Diablo II.exe"];

/// Launches the game and answers "is it running?".
///
/// Processes started through [`ProcessLauncher::launch`] are counted while
/// they run. The process table is scanned as well, so a game started by an
/// earlier invocation, or outside platswap, is detected too.
#[derive(Debug, Clone)]
pub struct ProcessManager {
    launched: Arc<AtomicUsize>,
    game_names: Vec<String>,
}

impl Default for ProcessManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessManager {
    pub fn new() -> Self {
        Self::with_game_names(GAME_PROCESS_NAMES.iter().copied())
    }

    /// Uses a custom set of executable names for the process table scan.
    pub fn with_game_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            launched: Arc::new(AtomicUsize::new(0)),
            game_names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of launched processes that have not exited yet.
    pub fn launched_count(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    fn game_in_process_table(&self) -> bool {
        if self.game_names.is_empty() {
            return false;
        }
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::All, true);
        sys.processes()
            .values()
            .any(|p| self.is_game_name(p.name()))
    }

    fn is_game_name(&self, name: &OsStr) -> bool {
        let name = name.to_string_lossy();
        self.game_names
            .iter()
            .any(|g| g.eq_ignore_ascii_case(&name))
    }
}

impl InstanceGuard for ProcessManager {
    fn is_running(&self) -> bool {
        self.launched_count() > 0 || self.game_in_process_table()
    }
}

impl ProcessLauncher for ProcessManager {
    fn launch(&self, program: &Path, flags: &str, elevate: bool) -> Result<(), LaunchError> {
        let _running = RunningGuard::enter(&self.launched);

        if elevate {
            // The child inherits the elevated token of this process.
            info!("launching with the current elevated token");
        }

        let mut child = build_command(program, flags)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                path: program.to_path_buf(),
                source,
            })?;
        info!(pid = child.id(), program = %program.display(), "game started");

        let status = child.wait().map_err(|source| LaunchError::Wait {
            path: program.to_path_buf(),
            source,
        })?;
        if status.success() {
            info!(program = %program.display(), "game exited");
        } else {
            warn!(program = %program.display(), %status, "game exited with failure");
        }
        Ok(())
    }
}

/// Builds the launch command, running from the launcher's directory.
///
/// On Windows the flags are passed through verbatim; elsewhere they are
/// split on whitespace.
fn build_command(program: &Path, flags: &str) -> Command {
    let mut cmd = Command::new(program);
    if let Some(dir) = program.parent().filter(|d| !d.as_os_str().is_empty()) {
        cmd.current_dir(dir);
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        if !flags.trim().is_empty() {
            cmd.raw_arg(flags);
        }
    }
    #[cfg(not(windows))]
    cmd.args(flags.split_whitespace());

    cmd
}

/// Counts a launched process for as long as it is alive.
struct RunningGuard<'a>(&'a AtomicUsize);

impl<'a> RunningGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn manager() -> ProcessManager {
        // No names: only launched processes count.
        ProcessManager::with_game_names(Vec::<String>::new())
    }

    #[test]
    fn idle_manager_is_not_running() {
        let pm = manager();
        assert_eq!(pm.launched_count(), 0);
        assert!(!pm.is_running());
    }

    #[test]
    fn missing_program_fails_and_releases_counter() {
        let tmp = tempfile::tempdir().unwrap();
        let pm = manager();
        let err = pm
            .launch(&tmp.path().join("NoSuch.exe"), "-w", false)
            .unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
        assert_eq!(pm.launched_count(), 0);
    }

    #[test]
    fn game_names_match_case_insensitively() {
        let pm = ProcessManager::new();
        assert!(pm.is_game_name(OsStr::new("game.EXE")));
        assert!(pm.is_game_name(OsStr::new("Diablo II.exe")));
        assert!(!pm.is_game_name(OsStr::new("Game")));
    }

    #[cfg(unix)]
    #[test]
    fn passes_flags_as_arguments() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out.txt");
        let script = tmp.path().join("launcher.sh");
        std::fs::write(&script, format!("#!/bin/sh\necho \"$@\" > {}\n", out.display())).unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        manager().launch(&script, "-w  -direct", false).unwrap();
        assert_eq!(std::fs::read_to_string(out).unwrap().trim(), "-w -direct");
    }

    #[cfg(unix)]
    #[test]
    fn counts_process_while_it_runs() {
        let pm = manager();
        let worker = {
            let pm = pm.clone();
            std::thread::spawn(move || pm.launch(Path::new("/bin/sleep"), "1", false))
        };

        let deadline = Instant::now() + Duration::from_secs(5);
        while !pm.is_running() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(pm.is_running());

        worker.join().unwrap().unwrap();
        assert!(!pm.is_running());
    }
}
