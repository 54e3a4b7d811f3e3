//! Startup requirement validation for mem-tracker.
//!
//! Problems found here are reported but not fatal when starting the sampler:
//! the readers degrade on their own. The `check` command turns them into a
//! non-zero exit code.

use mem_tracker::kernel::KernelMemoryReader;
use mem_tracker::process::collect_proc_entries;
use nix::unistd::geteuid;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Why a requirement check failed.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("kernel memory source {}: {reason}", .path.display())]
    KernelSource { path: PathBuf, reason: String },

    #[error("process root {}: {reason}", .path.display())]
    ProcRoot { path: PathBuf, reason: String },
}

/// Validate all runtime requirements
pub fn validate_requirements(kernel_source: &Path, proc_root: &Path) -> Result<(), ValidationError> {
    info!("🔍 Validating runtime requirements...");

    check_user_privileges();
    check_kernel_source(kernel_source)?;
    check_proc_root(proc_root)?;

    info!("✅ All runtime requirements validated");
    Ok(())
}

/// Processes hidden by a `hidepid=` mount are invisible to non-root users.
fn check_user_privileges() {
    if !geteuid().is_root() {
        warn!("⚠️  Not running as root - processes hidden by hidepid= will be missing");
    } else {
        info!("✅ Running as root (uid=0)");
    }
}

/// The summary file only exists while the kernel module is loaded.
pub fn check_kernel_source(path: &Path) -> Result<(), ValidationError> {
    match KernelMemoryReader::new(path).try_read() {
        Ok(sample) => {
            info!(
                "✅ Kernel memory source readable: used={} KB total={} KB",
                sample.used, sample.total
            );
            Ok(())
        }
        Err(e) => {
            error!("❌ Cannot read kernel memory source {}: {}", path.display(), e);
            error!("   Is the mem_tracker kernel module loaded? (sudo insmod mem_tracker.ko)");
            error!("   Kernel usage will be reported as 0% until the source is available");
            Err(ValidationError::KernelSource {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    }
}

pub fn check_proc_root(path: &Path) -> Result<(), ValidationError> {
    if !path.is_dir() {
        error!("❌ Process root {} is not a directory", path.display());
        return Err(ValidationError::ProcRoot {
            path: path.to_path_buf(),
            reason: "not a directory".into(),
        });
    }

    let count = collect_proc_entries(path).len();
    if count == 0 {
        error!("❌ No process entries found under {}", path.display());
        return Err(ValidationError::ProcRoot {
            path: path.to_path_buf(),
            reason: "no numeric process entries".into(),
        });
    }

    info!("✅ Process root readable: {} process entries", count);
    Ok(())
}
