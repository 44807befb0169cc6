use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuInfo {
    pub name: String,
    pub driver_version: String,
    pub memory_mb: u64,
}

/// Accelerator and toolchain report for the training machine.
#[derive(Debug, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub os_name: String,
    pub os_version: String,
    pub arch: String,
    pub cpu_cores: usize,
    pub memory_mb: u64,
    pub opencv_version: String,
    pub opencl_available: bool,
    pub opencv_cuda_devices: i32,
    pub nvidia_gpus: Vec<GpuInfo>,
    pub cuda_available: bool,
}

impl EnvironmentInfo {
    pub fn detect() -> Result<Self> {
        let opencv_version = opencv::core::get_version_string()?;
        let opencl_available = opencv::core::have_opencl().unwrap_or(false);
        // Builds without CUDA report 0 or error out; both mean "none".
        let opencv_cuda_devices = opencv::core::get_cuda_enabled_device_count().unwrap_or(0).max(0);
        let nvidia_gpus = Self::detect_nvidia_gpus();

        Ok(Self {
            os_name: std::env::consts::OS.to_string(),
            os_version: Self::detect_os_version(),
            arch: std::env::consts::ARCH.to_string(),
            cpu_cores: num_cpus::get(),
            memory_mb: Self::detect_memory(),
            opencv_version,
            opencl_available,
            opencv_cuda_devices,
            cuda_available: !nvidia_gpus.is_empty() || opencv_cuda_devices > 0,
            nvidia_gpus,
        })
    }

    fn detect_os_version() -> String {
        if let Ok(output) = Command::new("uname").arg("-r").output() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            "Unknown".to_string()
        }
    }

    fn detect_nvidia_gpus() -> Vec<GpuInfo> {
        match Command::new("nvidia-smi")
            .args(["--query-gpu=name,driver_version,memory.total", "--format=csv,noheader,nounits"])
            .output()
        {
            Ok(output) if output.status.success() => {
                parse_nvidia_smi(&String::from_utf8_lossy(&output.stdout))
            }
            _ => Vec::new(),
        }
    }

    fn detect_memory() -> u64 {
        if cfg!(target_os = "macos") {
            if let Ok(output) = Command::new("sysctl").arg("-n").arg("hw.memsize").output() {
                let s = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if let Ok(bytes) = s.parse::<u64>() {
                    return bytes / (1024 * 1024);
                }
            }
        }
        if let Ok(meminfo) = std::fs::read_to_string("/proc/meminfo") {
            return parse_meminfo_total_mb(&meminfo).unwrap_or(0);
        }
        0
    }
}

/// Parses `name, driver, memory` CSV lines from nvidia-smi.
fn parse_nvidia_smi(output: &str) -> Vec<GpuInfo> {
    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(',').map(|s| s.trim()).collect();
            if parts.len() != 3 || parts[0].is_empty() {
                return None;
            }
            Some(GpuInfo {
                name: parts[0].to_string(),
                driver_version: parts[1].to_string(),
                memory_mb: parts[2].parse().unwrap_or(0),
            })
        })
        .collect()
}

fn parse_meminfo_total_mb(meminfo: &str) -> Option<u64> {
    let line = meminfo.lines().find(|l| l.starts_with("MemTotal:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb / 1024)
}
