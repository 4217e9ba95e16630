// ABOUTME: Migration configuration resolution
// ABOUTME: Merges CLI flags over an optional TOML file and applies defaults

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_DIR: &str = "/var/lib/mysql";
pub const DEFAULT_IDENTITY_FILE: &str = "/var/lib/mysql/.ssh/id_rsa";
pub const DEFAULT_SCP_USER: &str = "mysql";
pub const DEFAULT_MYSQL_PORT: u16 = 3306;
pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_TRANSFER_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 1;

/// Partially specified settings, as they arrive from CLI flags or a TOML
/// file. Keys mirror the flag names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialSettings {
    pub src_host: Option<String>,
    pub src_port: Option<u16>,
    pub src_db: Option<String>,
    pub dst_host: Option<String>,
    pub dst_port: Option<u16>,
    pub dst_db: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub scp_user: Option<String>,
    pub identity_file: Option<PathBuf>,
    pub src_base_dir: Option<PathBuf>,
    pub dst_base_dir: Option<PathBuf>,
    pub workers: Option<usize>,
    pub transfer_retries: Option<u32>,
    pub retry_delay: Option<u64>,
}

impl PartialSettings {
    /// Overlay `self` (the higher-precedence source, i.e. CLI flags) on top
    /// of `fallback` (the config file).
    pub fn merged_over(self, fallback: PartialSettings) -> PartialSettings {
        PartialSettings {
            src_host: self.src_host.or(fallback.src_host),
            src_port: self.src_port.or(fallback.src_port),
            src_db: self.src_db.or(fallback.src_db),
            dst_host: self.dst_host.or(fallback.dst_host),
            dst_port: self.dst_port.or(fallback.dst_port),
            dst_db: self.dst_db.or(fallback.dst_db),
            user: self.user.or(fallback.user),
            password: self.password.or(fallback.password),
            scp_user: self.scp_user.or(fallback.scp_user),
            identity_file: self.identity_file.or(fallback.identity_file),
            src_base_dir: self.src_base_dir.or(fallback.src_base_dir),
            dst_base_dir: self.dst_base_dir.or(fallback.dst_base_dir),
            workers: self.workers.or(fallback.workers),
            transfer_retries: self.transfer_retries.or(fallback.transfer_retries),
            retry_delay: self.retry_delay.or(fallback.retry_delay),
        }
    }
}

/// Load partial settings from a TOML file.
pub fn load_settings_file(path: &str) -> Result<PartialSettings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config file: {}", path))
}

/// Fully resolved migration settings.
#[derive(Debug, Clone)]
pub struct MigrationSettings {
    pub source_host: String,
    pub source_port: u16,
    pub source_db: String,
    pub dest_host: String,
    pub dest_port: u16,
    pub dest_db: String,
    pub admin_user: String,
    pub admin_password: String,
    pub scp_user: String,
    pub identity_file: PathBuf,
    pub source_base_dir: PathBuf,
    pub dest_base_dir: PathBuf,
    pub workers: usize,
    pub transfer_retries: u32,
    pub retry_delay: Duration,
}

impl MigrationSettings {
    /// Apply defaults and validate required values.
    ///
    /// The destination database defaults to the source database name, and
    /// the destination base directory to the source base directory, so the
    /// common same-layout migration needs only `--dst-host` and `--src-db`.
    pub fn resolve(partial: PartialSettings) -> Result<MigrationSettings> {
        let Some(dest_host) = partial.dst_host else {
            bail!("Missing destination host (--dst-host)");
        };
        let Some(source_db) = partial.src_db else {
            bail!("Missing source database (--src-db)");
        };

        if dest_host.trim().is_empty() {
            bail!("Destination host cannot be empty");
        }
        if source_db.trim().is_empty() {
            bail!("Source database cannot be empty");
        }

        let source_base_dir = partial
            .src_base_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_DIR));

        Ok(MigrationSettings {
            source_host: partial.src_host.unwrap_or_else(|| "127.0.0.1".to_string()),
            source_port: partial.src_port.unwrap_or(DEFAULT_MYSQL_PORT),
            dest_host,
            dest_port: partial.dst_port.unwrap_or(DEFAULT_MYSQL_PORT),
            dest_db: partial.dst_db.unwrap_or_else(|| source_db.clone()),
            source_db,
            admin_user: partial.user.unwrap_or_else(|| "root".to_string()),
            admin_password: partial.password.unwrap_or_default(),
            scp_user: partial.scp_user.unwrap_or_else(|| DEFAULT_SCP_USER.to_string()),
            identity_file: partial
                .identity_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IDENTITY_FILE)),
            dest_base_dir: partial
                .dst_base_dir
                .unwrap_or_else(|| source_base_dir.clone()),
            source_base_dir,
            workers: partial.workers.unwrap_or(DEFAULT_WORKERS).max(1),
            transfer_retries: partial.transfer_retries.unwrap_or(DEFAULT_TRANSFER_RETRIES),
            retry_delay: Duration::from_secs(
                partial.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY_SECS),
            ),
        })
    }

    /// Directory holding the source database's tablespace files.
    pub fn source_data_dir(&self) -> PathBuf {
        self.source_base_dir.join(&self.source_db)
    }

    /// Directory on the destination host receiving the copied files.
    pub fn dest_data_dir(&self) -> PathBuf {
        self.dest_base_dir.join(&self.dest_db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> PartialSettings {
        PartialSettings {
            dst_host: Some("db2.internal".to_string()),
            src_db: Some("shop".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_applies_defaults() {
        let settings = MigrationSettings::resolve(minimal()).unwrap();

        assert_eq!(settings.source_host, "127.0.0.1");
        assert_eq!(settings.source_port, 3306);
        assert_eq!(settings.dest_db, "shop"); // falls back to the source name
        assert_eq!(settings.scp_user, "mysql");
        assert_eq!(settings.workers, 4);
        assert_eq!(settings.transfer_retries, 2);
        assert_eq!(settings.retry_delay, Duration::from_secs(1));
        assert_eq!(
            settings.source_data_dir(),
            PathBuf::from("/var/lib/mysql/shop")
        );
        assert_eq!(
            settings.dest_data_dir(),
            PathBuf::from("/var/lib/mysql/shop")
        );
    }

    #[test]
    fn test_dest_base_dir_follows_source_base_dir() {
        let mut partial = minimal();
        partial.src_base_dir = Some(PathBuf::from("/srv/mysql"));
        let settings = MigrationSettings::resolve(partial).unwrap();

        assert_eq!(settings.dest_data_dir(), PathBuf::from("/srv/mysql/shop"));
    }

    #[test]
    fn test_resolve_requires_dst_host_and_src_db() {
        let missing_host = PartialSettings {
            src_db: Some("shop".to_string()),
            ..Default::default()
        };
        assert!(MigrationSettings::resolve(missing_host).is_err());

        let missing_db = PartialSettings {
            dst_host: Some("db2".to_string()),
            ..Default::default()
        };
        assert!(MigrationSettings::resolve(missing_db).is_err());
    }

    #[test]
    fn test_workers_floor_is_one() {
        let mut partial = minimal();
        partial.workers = Some(0);
        let settings = MigrationSettings::resolve(partial).unwrap();

        assert_eq!(settings.workers, 1);
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let file: PartialSettings = toml::from_str(
            r#"
            dst_host = "from-file"
            src_db = "shop"
            workers = 8
            scp_user = "copyuser"
            "#,
        )
        .unwrap();

        let cli = PartialSettings {
            dst_host: Some("from-cli".to_string()),
            workers: Some(2),
            ..Default::default()
        };

        let settings = MigrationSettings::resolve(cli.merged_over(file)).unwrap();

        assert_eq!(settings.dest_host, "from-cli");
        assert_eq!(settings.workers, 2);
        assert_eq!(settings.scp_user, "copyuser"); // file value survives
    }

    #[test]
    fn test_load_settings_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("migration.toml");
        std::fs::write(&path, "dst_host = \"db2\"\nsrc_db = \"shop\"\nworkers = 6\n").unwrap();

        let partial = load_settings_file(path.to_str().unwrap()).unwrap();
        let settings = MigrationSettings::resolve(partial).unwrap();

        assert_eq!(settings.dest_host, "db2");
        assert_eq!(settings.workers, 6);
        assert!(load_settings_file("/nonexistent/migration.toml").is_err());
    }

    #[test]
    fn test_unknown_config_key_is_rejected() {
        let parsed: Result<PartialSettings, _> = toml::from_str("dst_hsot = \"typo\"");
        assert!(parsed.is_err());
    }
}
