use procfs::process::{all_processes, Process};
use procfs::ProcError;

use super::{ProcessStats, ThreadStats};

/// Thread count of the current process, from `/proc/self/stat`.
pub struct ProcfsThreadStats;

impl ThreadStats for ProcfsThreadStats {
    fn count(&self) -> Result<u64, String> {
        let stat = Process::myself()
            .and_then(|p| p.stat())
            .map_err(|e| format!("cannot read /proc/self/stat: {}", e))?;
        Ok(stat.num_threads.max(0) as u64)
    }
}

/// Children of the current process, found by scanning `/proc`.
pub struct ProcfsProcessStats;

impl ProcfsProcessStats {
    /// States of every direct child, skipping processes that vanish mid-scan.
    fn child_states(&self) -> Result<Vec<char>, String> {
        let me = Process::myself().map_err(|e| format!("cannot read /proc/self: {}", e))?;
        let mut states = Vec::new();
        for p in all_processes().map_err(|e| format!("cannot read /proc: {}", e))? {
            let stat = match p.and_then(|process| process.stat()) {
                Ok(stat) => stat,
                Err(ProcError::NotFound(_)) => continue,
                Err(e) => return Err(format!("cannot read process stat: {}", e)),
            };
            if stat.ppid == me.pid {
                states.push(stat.state);
            }
        }
        Ok(states)
    }
}

impl ProcessStats for ProcfsProcessStats {
    fn total(&self) -> Result<u64, String> {
        Ok(self.child_states()?.len() as u64)
    }

    fn active_count(&self) -> Result<u64, String> {
        let active = self
            .child_states()?
            .into_iter()
            .filter(|state| !matches!(state, 'Z' | 'X' | 'x'))
            .count();
        Ok(active as u64)
    }
}
