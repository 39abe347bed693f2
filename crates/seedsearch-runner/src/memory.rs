//! Post-hoc peak memory of terminated child processes
//!
//! The kernel keeps the largest resident set size among all waited-for
//! descendants. Sampling it after a solver or worker run gives the peak of
//! that run (or of an earlier, larger one: the figure is monotone).

/// Peak resident set size of waited-for children, in gigabytes rounded to 3 decimals.
///
/// Returns `None` on platforms without `getrusage`.
#[must_use]
pub fn peak_children_memory_gb() -> Option<f64> {
    #[cfg(unix)]
    {
        let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::getrusage(libc::RUSAGE_CHILDREN, &raw mut usage) };
        if rc != 0 {
            return None;
        }
        Some(max_rss_to_gb(usage.ru_maxrss as f64))
    }

    #[cfg(not(unix))]
    {
        None
    }
}

/// `ru_maxrss` is reported in bytes on macOS and in kilobytes elsewhere.
#[cfg(unix)]
fn max_rss_to_gb(max_rss: f64) -> f64 {
    #[cfg(target_os = "macos")]
    let gb = max_rss / (1024.0 * 1024.0 * 1024.0);
    #[cfg(not(target_os = "macos"))]
    let gb = max_rss / (1024.0 * 1024.0);
    round3(gb)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round3() {
        assert_eq!(round3(1.23456), 1.235);
        assert_eq!(round3(0.0004), 0.0);
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn test_kilobytes_to_gigabytes() {
        assert_eq!(max_rss_to_gb(2.0 * 1024.0 * 1024.0), 2.0);
        assert_eq!(max_rss_to_gb(524_288.0), 0.5);
    }

    #[cfg(unix)]
    #[test]
    fn test_peak_after_child_is_available() {
        let _ = std::process::Command::new("true").status();
        let peak = peak_children_memory_gb().unwrap();
        assert!(peak >= 0.0);
    }
}
