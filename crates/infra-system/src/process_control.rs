// Process control helpers (kill tree, liveness)
// reason: nix for signals on unix, taskkill/tasklist on windows

/// SIGKILL every process in the group led by `pid`
///
/// Capturing children are spawned as group leaders, so this also reaches
/// anything they forked. A group that is already gone is not an error.
#[cfg(unix)]
pub fn kill_process_group(pid: u32) -> std::io::Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(std::io::Error::from(e)),
    }
}

/// Force-kill `pid` and its descendants
#[cfg(windows)]
pub fn kill_process_group(pid: u32) -> std::io::Result<()> {
    use std::process::Command;

    let output = Command::new("taskkill")
        .args(["/F", "/T", "/PID", &pid.to_string()])
        .output()?;

    if !output.status.success() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!(
                "taskkill failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ),
        ));
    }

    Ok(())
}

/// Check if a process is still alive
///
/// On linux a zombie (exited, not yet reaped) counts as dead.
pub fn is_alive(pid: u32) -> bool {
    #[cfg(unix)]
    {
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        // Signal 0 checks if process exists without actually sending a signal
        kill(Pid::from_raw(pid as i32), None).is_ok() && !is_zombie(pid)
    }

    #[cfg(windows)]
    {
        use std::process::Command;

        let output = Command::new("tasklist")
            .args(["/FI", &format!("PID eq {}", pid), "/NH"])
            .output();

        if let Ok(output) = output {
            let output_str = String::from_utf8_lossy(&output.stdout);
            output_str.contains(&pid.to_string())
        } else {
            false
        }
    }
}

#[cfg(target_os = "linux")]
fn is_zombie(pid: u32) -> bool {
    // Field 3 of /proc/<pid>/stat, after the parenthesized command name
    std::fs::read_to_string(format!("/proc/{}/stat", pid))
        .ok()
        .and_then(|stat| {
            let (_, rest) = stat.rsplit_once(')')?;
            rest.split_whitespace().next().map(|state| state == "Z")
        })
        .unwrap_or(false)
}

#[cfg(all(unix, not(target_os = "linux")))]
fn is_zombie(_pid: u32) -> bool {
    false
}
