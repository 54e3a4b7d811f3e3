//! Check command implementation.
//!
//! Validates data sources and configuration.

use crate::config::{validate_effective_config, Config};
use crate::startup_checks::{check_kernel_source, check_proc_root};

/// Validates data sources and configuration. Exits with code 1 if any
/// check fails.
pub fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 mem-tracker - System Check");
    println!("=============================");

    let mut all_ok = true;

    let kernel_source = config.kernel_source();
    println!("\n💾 Checking kernel memory source...");
    match check_kernel_source(&kernel_source) {
        Ok(_) => println!("   ✅ {} readable", kernel_source.display()),
        Err(e) => {
            println!("   ❌ {}", e);
            println!("   Is the mem_tracker kernel module loaded?");
            all_ok = false;
        }
    }

    let proc_root = config.proc_root();
    println!("\n📁 Checking process root...");
    match check_proc_root(&proc_root) {
        Ok(_) => println!("   ✅ {} readable", proc_root.display()),
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}
