// ABOUTME: Utility functions shared across the migrator
// ABOUTME: Provides identifier quoting, retry logic, formatting, and tool checks

use anyhow::{bail, Result};
use std::time::Duration;
use which::which;

/// Quote a MySQL identifier with backticks.
///
/// Embedded backticks are doubled, so the result is safe to splice into
/// statements that cannot take bind parameters (DDL, `FLUSH TABLES`).
///
/// # Examples
///
/// ```
/// # use innodb_tablespace_migrator::utils::quote_identifier;
/// assert_eq!(quote_identifier("orders"), "`orders`");
/// assert_eq!(quote_identifier("weird`name"), "`weird``name`");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Check that the OpenSSH client tools used for file transfer are installed
///
/// # Errors
///
/// Returns an error with installation instructions if `scp` or `ssh` is
/// missing from PATH.
pub fn check_required_tools() -> Result<()> {
    let tools = ["scp", "ssh"];
    let mut missing = Vec::new();

    for tool in &tools {
        if which(tool).is_err() {
            missing.push(*tool);
        }
    }

    if !missing.is_empty() {
        bail!(
            "Missing required OpenSSH client tools: {}\n\
             \n\
             Please install an OpenSSH client:\n\
             - Ubuntu/Debian: sudo apt-get install openssh-client\n\
             - macOS: included with the system\n\
             - RHEL/CentOS: sudo yum install openssh-clients",
            missing.join(", ")
        );
    }

    Ok(())
}

/// Retry an async operation with exponential backoff
///
/// Each retry doubles the delay. Returns the successful result or the last
/// error once all retries are exhausted.
pub async fn retry_with_backoff<F, Fut, T>(
    mut operation: F,
    max_retries: u32,
    initial_delay: Duration,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut delay = initial_delay;
    let mut last_error = None;

    for attempt in 0..=max_retries {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                last_error = Some(e);

                if attempt < max_retries {
                    tracing::warn!(
                        "Operation failed (attempt {}/{}), retrying in {:?}...",
                        attempt + 1,
                        max_retries + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Operation failed after retries")))
}

/// Render a byte count as a human-readable size (e.g. "15.3 GB")
pub fn format_bytes(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut value = bytes.max(0) as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes.max(0), UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Render a duration as a compact human-readable string (e.g. "2h 15m")
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs >= 3600 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("orders"), "`orders`");
        assert_eq!(quote_identifier("order_items"), "`order_items`");
        assert_eq!(quote_identifier("bad`table"), "`bad``table`");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
        assert_eq!(format_bytes(-1), "0 B");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(45)), "45s");
        assert_eq!(format_duration(Duration::from_secs(200)), "3m 20s");
        assert_eq!(format_duration(Duration::from_secs(8100)), "2h 15m");
    }

    #[tokio::test]
    async fn test_retry_with_backoff_recovers() {
        let mut attempts = 0;
        let result = retry_with_backoff(
            || {
                attempts += 1;
                async move {
                    if attempts < 3 {
                        anyhow::bail!("Temporary failure")
                    } else {
                        Ok("Success")
                    }
                }
            },
            5,
            Duration::from_millis(10),
        )
        .await;

        assert_eq!(result.unwrap(), "Success");
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn test_retry_with_backoff_exhausts() {
        let mut attempts = 0;
        let result: Result<&str> = retry_with_backoff(
            || {
                attempts += 1;
                async move { anyhow::bail!("Permanent failure") }
            },
            2,
            Duration::from_millis(10),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts, 3); // Initial + 2 retries
    }
}
