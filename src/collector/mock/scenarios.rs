//! Pre-built mock host scenarios for testing.

use super::filesystem::MockFs;

impl MockFs {
    /// Creates a typical Raspberry Pi style host.
    ///
    /// Includes: a thermal zone at 45.0℃, `/proc/uptime` of a little over
    /// three days, `/proc/loadavg` and a kernel hostname of `pi-node`.
    pub fn typical_host() -> Self {
        let fs = Self::new();
        fs.add_file("/sys/class/thermal/thermal_zone0/temp", "45000\n");
        // 3 days, 2 hours, 3 minutes, 4.56 seconds
        fs.add_file("/proc/uptime", "266584.56 1060000.12\n");
        fs.add_file("/proc/loadavg", "0.15 0.10 0.05 1/150 1234\n");
        fs.add_file("/proc/sys/kernel/hostname", "pi-node\n");
        fs
    }

    /// Creates a host without a thermal zone (VMs, most containers).
    pub fn host_without_sensor() -> Self {
        let fs = Self::typical_host();
        fs.remove_file("/sys/class/thermal/thermal_zone0/temp");
        fs
    }
}
