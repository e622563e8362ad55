//! `system://` resources backed by `sysinfo`.
//!
//! Fields the platform cannot supply are reported as `null`.

use std::cmp::Ordering;
use std::path::Path;

use chrono::Utc;
use serde_json::{json, Value};
use sysinfo::{Disks, Networks, System, MINIMUM_CPU_UPDATE_INTERVAL};

use capability_hub::{CapabilityDescriptor, CapabilityResult, Payload};

/// How many processes `system://processes` lists.
const TOP_PROCESSES: usize = 10;

/// `part` as a percentage of `total`, one decimal place; `null` when
/// `total` is zero.
fn percentage(part: u64, total: u64) -> Value {
    if total == 0 {
        Value::Null
    } else {
        json!(((part as f64 / total as f64) * 1000.0).round() / 10.0)
    }
}

fn round1(value: f32) -> f64 {
    (f64::from(value) * 10.0).round() / 10.0
}

fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

fn system_info() -> Value {
    let load = System::load_average();
    json!({
        "platform": format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
        "system": std::env::consts::OS,
        "family": std::env::consts::FAMILY,
        "machine": std::env::consts::ARCH,
        "os_name": System::name(),
        "os_version": System::os_version(),
        "kernel_version": System::kernel_version(),
        "hostname": System::host_name(),
        "boot_time": System::boot_time(),
        "uptime_seconds": System::uptime(),
        "load_average": [load.one, load.five, load.fifteen],
        "server_version": env!("CARGO_PKG_VERSION"),
        "timestamp": timestamp(),
    })
}

fn cpu_info() -> Value {
    let mut sys = System::new();
    // Usage is a delta between two samples.
    sys.refresh_cpu();
    std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
    sys.refresh_cpu();

    let cpus = sys.cpus();
    let frequencies: Vec<u64> = cpus
        .iter()
        .map(|cpu| cpu.frequency())
        .filter(|&mhz| mhz > 0)
        .collect();
    let cpu_freq = if frequencies.is_empty() {
        json!({ "current": null, "min": null, "max": null })
    } else {
        let current = frequencies.iter().sum::<u64>() as f64 / frequencies.len() as f64;
        json!({
            "current": current,
            "min": frequencies.iter().min(),
            "max": frequencies.iter().max(),
        })
    };
    let load = System::load_average();

    json!({
        "cpu_count": sys.physical_core_count(),
        "cpu_count_logical": (!cpus.is_empty()).then_some(cpus.len()),
        "cpu_percent": round1(sys.global_cpu_info().cpu_usage()),
        "per_cpu_percent": cpus.iter().map(|cpu| round1(cpu.cpu_usage())).collect::<Vec<_>>(),
        "cpu_freq": cpu_freq,
        "brand": cpus.first().map(|cpu| cpu.brand().trim().to_string()),
        "load_average": [load.one, load.five, load.fifteen],
        "timestamp": timestamp(),
    })
}

fn memory_info() -> Value {
    let mut sys = System::new();
    sys.refresh_memory();

    let total = sys.total_memory();
    let available = sys.available_memory();
    let used = total.saturating_sub(available);
    let swap_total = sys.total_swap();
    let swap_used = sys.used_swap();

    json!({
        "virtual_memory": {
            "total": total,
            "available": available,
            "used": used,
            "free": sys.free_memory(),
            "percentage": percentage(used, total),
        },
        "swap_memory": {
            "total": swap_total,
            "used": swap_used,
            "free": sys.free_swap(),
            "percentage": percentage(swap_used, swap_total),
        },
        "timestamp": timestamp(),
    })
}

fn disk_info() -> Value {
    let disks = Disks::new_with_refreshed_list();

    let entries: Vec<Value> = disks
        .list()
        .iter()
        .map(|disk| {
            let total = disk.total_space();
            let free = disk.available_space();
            let used = total.saturating_sub(free);
            json!({
                "name": disk.name().to_string_lossy(),
                "mount_point": disk.mount_point().display().to_string(),
                "file_system": disk.file_system().to_string_lossy(),
                "removable": disk.is_removable(),
                "total": total,
                "used": used,
                "free": free,
                "percentage": percentage(used, total),
            })
        })
        .collect();

    // Root filesystem first, else whichever disk was listed first.
    let root = disks
        .list()
        .iter()
        .find(|disk| disk.mount_point() == Path::new("/"))
        .or_else(|| disks.list().first());
    let disk_usage = match root {
        Some(disk) => {
            let total = disk.total_space();
            let free = disk.available_space();
            let used = total.saturating_sub(free);
            json!({
                "total": total,
                "used": used,
                "free": free,
                "percentage": percentage(used, total),
            })
        }
        None => json!({ "total": null, "used": null, "free": null, "percentage": null }),
    };

    json!({
        "disk_usage": disk_usage,
        "disks": entries,
        "timestamp": timestamp(),
    })
}

fn process_info() -> Value {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.refresh_processes();
    std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
    sys.refresh_processes();

    let total_memory = sys.total_memory();
    let mut processes: Vec<_> = sys.processes().values().collect();
    processes.sort_by(|a, b| {
        b.cpu_usage()
            .partial_cmp(&a.cpu_usage())
            .unwrap_or(Ordering::Equal)
    });

    let top: Vec<Value> = processes
        .iter()
        .take(TOP_PROCESSES)
        .map(|process| {
            json!({
                "pid": process.pid().as_u32(),
                "name": process.name(),
                "cpu_percent": round1(process.cpu_usage()),
                "memory_bytes": process.memory(),
                "memory_percent": percentage(process.memory(), total_memory),
            })
        })
        .collect();

    json!({
        "total_processes": processes.len(),
        "top_processes": top,
        "timestamp": timestamp(),
    })
}

fn network_info() -> Value {
    let networks = Networks::new_with_refreshed_list();

    let mut interfaces = serde_json::Map::new();
    let (mut bytes_sent, mut bytes_recv) = (0u64, 0u64);
    let (mut packets_sent, mut packets_recv) = (0u64, 0u64);
    for (name, data) in &networks {
        bytes_sent += data.total_transmitted();
        bytes_recv += data.total_received();
        packets_sent += data.total_packets_transmitted();
        packets_recv += data.total_packets_received();
        interfaces.insert(
            name.clone(),
            json!({
                "mac_address": data.mac_address().to_string(),
                "bytes_sent": data.total_transmitted(),
                "bytes_recv": data.total_received(),
                "errors_in": data.total_errors_on_received(),
                "errors_out": data.total_errors_on_transmitted(),
            }),
        );
    }

    json!({
        "interfaces": interfaces,
        "io_counters": {
            "bytes_sent": bytes_sent,
            "bytes_recv": bytes_recv,
            "packets_sent": packets_sent,
            "packets_recv": packets_recv,
        },
        "timestamp": timestamp(),
    })
}

pub fn system_resources() -> CapabilityResult<Vec<CapabilityDescriptor>> {
    Ok(vec![
        CapabilityDescriptor::resource("system://info", |_, _| Ok(Payload::Json(system_info())))
            .title("System Information")
            .description("Get basic system information")
            .mime_type("application/json")
            .build()?,
        CapabilityDescriptor::resource("system://cpu", |_, _| Ok(Payload::Json(cpu_info())))
            .title("CPU Information")
            .description("Get CPU counts, usage, frequency and load average")
            .mime_type("application/json")
            .build()?,
        CapabilityDescriptor::resource("system://memory", |_, _| {
            Ok(Payload::Json(memory_info()))
        })
        .title("Memory Usage")
        .description("Get current memory usage information")
        .mime_type("application/json")
        .build()?,
        CapabilityDescriptor::resource("system://disk", |_, _| Ok(Payload::Json(disk_info())))
            .title("Disk Usage")
            .description("Get disk usage information")
            .mime_type("application/json")
            .build()?,
        CapabilityDescriptor::resource("system://processes", |_, _| {
            Ok(Payload::Json(process_info()))
        })
        .title("Running Processes")
        .description("Get information about running processes")
        .mime_type("application/json")
        .build()?,
        CapabilityDescriptor::resource("system://network", |_, _| {
            Ok(Payload::Json(network_info()))
        })
        .title("Network Information")
        .description("Get network interface information")
        .mime_type("application/json")
        .build()?,
    ])
}
