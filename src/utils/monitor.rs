#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

/// 單執行緒的資源監控：CLI 流程逐階段呼叫，不跨執行緒共享
#[cfg(feature = "cli")]
pub struct ResourceMonitor {
    system: System,
    pid: Pid,
    start_time: Instant,
    peak_memory_mb: u64,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl ResourceMonitor {
    pub fn new(enabled: bool) -> Self {
        let mut system = System::new_with_specifics(RefreshKind::everything());
        system.refresh_all();

        Self {
            system,
            pid: sysinfo::get_current_pid().expect("Failed to get current PID"),
            start_time: Instant::now(),
            peak_memory_mb: 0,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 記錄目前階段的 CPU / 記憶體用量
    pub fn log_phase(&mut self, phase: &str) {
        if !self.enabled {
            return;
        }

        self.system.refresh_all();
        let Some(process) = self.system.process(self.pid) else {
            return;
        };

        let memory_mb = process.memory() / 1024 / 1024;
        if memory_mb > self.peak_memory_mb {
            self.peak_memory_mb = memory_mb;
        }

        tracing::info!(
            "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Elapsed: {:?}",
            phase,
            process.cpu_usage(),
            memory_mb,
            self.peak_memory_mb,
            self.start_time.elapsed()
        );
    }

    pub fn log_summary(&mut self) {
        if !self.enabled {
            return;
        }
        self.log_phase("Summary");
        tracing::info!(
            "📊 Total time: {:?}, Peak memory: {}MB",
            self.start_time.elapsed(),
            self.peak_memory_mb
        );
    }
}

// 非 CLI 環境的空實現
#[cfg(not(feature = "cli"))]
pub struct ResourceMonitor;

#[cfg(not(feature = "cli"))]
impl ResourceMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    pub fn log_phase(&mut self, _phase: &str) {}

    pub fn log_summary(&mut self) {}
}
