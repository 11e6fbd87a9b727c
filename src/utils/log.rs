use colog::format::CologStyle;
use env_logger::Builder;
use log::{Level, LevelFilter};

const CRATE_TARGET: &str = "kb_chatbot";

/// HTTP and provider internals that only matter when something is broken.
const QUIET_TARGETS: [&str; 5] = ["rig", "reqwest", "hyper", "axum", "tower"];

struct ShortLevels;

impl CologStyle for ShortLevels {
    fn level_token(&self, level: &Level) -> &str {
        match *level {
            Level::Error => "ERR",
            Level::Warn => "WRN",
            Level::Info => "INF",
            Level::Debug => "DBG",
            Level::Trace => "TRC",
        }
    }
}

pub struct Logger;

impl Logger {
    /// Installs the global logger. `RUST_LOG` directives are applied on top of
    /// the configured level.
    pub fn init(level: Option<LevelFilter>) -> anyhow::Result<()> {
        let overrides = std::env::var("RUST_LOG").ok();

        builder(level, overrides.as_deref()).try_init()?;

        Ok(())
    }
}

fn builder(level: Option<LevelFilter>, overrides: Option<&str>) -> Builder {
    let mut builder = Builder::new();

    builder.filter(Some(CRATE_TARGET), level.unwrap_or(LevelFilter::Info));
    for target in QUIET_TARGETS {
        builder.filter(Some(target), LevelFilter::Warn);
    }

    if let Some(directives) = overrides {
        builder.parse_filters(directives);
    }

    builder
        .target(env_logger::Target::Stdout)
        .format(colog::formatter(ShortLevels))
        .write_style(env_logger::WriteStyle::Always);

    builder
}
