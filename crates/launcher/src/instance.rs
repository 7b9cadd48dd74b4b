//! Single-instance check for platswap itself.

use sysinfo::{ProcessesToUpdate, System};

/// Returns true if another process with this executable's name is running.
///
/// Name-based only: an unrelated program with the same name counts too.
pub fn is_another_instance_running() -> bool {
    let Ok(me) = sysinfo::get_current_pid() else {
        return false;
    };
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::All, true);

    let Some(name) = sys.process(me).map(|p| p.name().to_os_string()) else {
        return false;
    };
    sys.processes()
        .values()
        .any(|p| p.pid() != me && p.name() == name.as_os_str())
}
