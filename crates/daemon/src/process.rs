// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process primitives — §4.9. Platform-specific process-alive checks
//! live in `codes_storage::AgentStateRepo::is_alive`; this module covers
//! the two primitives that repository doesn't need: executable-path
//! discovery (so the supervisor can re-exec itself) and the
//! process-group/new-console attribute applied when spawning a daemon
//! subprocess, so a `Ctrl-C` sent to the supervisor's terminal doesn't
//! also reach the child before the supervisor has a chance to drain it.

use std::io;
use std::path::PathBuf;
use tokio::process::Command;

/// Path to the currently running executable, used by the supervisor to
/// re-invoke itself as `<exe> agent run <team> <member>` (§6 "Daemon
/// subprocess contract").
pub fn current_executable() -> io::Result<PathBuf> {
    std::env::current_exe()
}

/// Detach `cmd` into its own process group (POSIX) or process group /
/// new console (Windows) so signals delivered to the supervisor's
/// controlling terminal are not also delivered to the child; the
/// supervisor propagates shutdown explicitly instead.
pub fn detach_from_controlling_terminal(cmd: &mut Command) {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
