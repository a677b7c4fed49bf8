//! Логи CLI в stderr, чтобы не смешиваться с выводом команд.

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

const TRACKER_TARGETS: [&str; 2] = ["tracker_client", "tracker_cli"];

/// Директива фильтра: базовый уровень плюс подробность для своих крейтов.
///
/// `-v` включает `debug` для клиента и CLI (видны запросы к API),
/// `-vv` и больше включает `trace`. Чужие крейты остаются на `base`.
pub fn filter_directive(base: &str, verbose: u8) -> String {
    let base = match base.trim() {
        "" => "warn",
        level => level,
    };
    let tracker_level = match verbose {
        0 => return base.to_string(),
        1 => "debug",
        _ => "trace",
    };

    let mut directive = base.to_string();
    for target in TRACKER_TARGETS {
        directive.push_str(&format!(",{target}={tracker_level}"));
    }
    directive
}

pub fn init_logging(base_level: &str, verbose: u8) -> Result<()> {
    // явный RUST_LOG важнее флагов
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().ok(),
        _ => None,
    }
    .map_or_else(
        || EnvFilter::try_new(filter_directive(base_level, verbose)),
        Ok,
    )
    .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(verbose > 0)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}
