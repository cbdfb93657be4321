use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pageruler_core::{DefaultUnit, FormatterCache, Length, LengthUnit, SignDisplay, ALL_UNITS};
use pageruler_storage::{Settings, Storage};
use pageruler_ui::{
    ClientRect, GestureState, PercentRect, TargetId, Viewer, ViewerConfig, ViewerContext,
    ViewerEvent,
};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_DIR_ENV: &str = "PAGERULER_SETTINGS_DIR";

#[derive(Debug, Parser)]
#[command(name = "pageruler")]
#[command(about = "Physical length measurement for page images")]
pub struct Cli {
    /// Directory holding settings.json (defaults to the platform data directory).
    #[arg(long, global = true, value_name = "DIR")]
    settings_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List supported length units.
    Units,
    /// Convert a length between units.
    Convert {
        #[arg(value_name = "VALUE", allow_negative_numbers = true)]
        value: f64,
        #[arg(long, value_parser = parse_unit)]
        from: LengthUnit,
        #[arg(long, value_parser = parse_unit)]
        to: LengthUnit,
        /// Always show the sign unless the result is zero.
        #[arg(long)]
        sign: bool,
    },
    /// Show or change the default display unit.
    DefaultUnit {
        #[arg(long, value_name = "UNIT", value_parser = parse_unit)]
        set: Option<LengthUnit>,
    },
    /// Run a recorded pointer event script through a headless viewer.
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        #[arg(long)]
        width_pt: f64,
        #[arg(long)]
        height_pt: f64,
        /// Page image size in pixels, e.g. `800x600`. Defaults to one pixel per point.
        #[arg(long, value_name = "WxH", value_parser = parse_bounds)]
        bounds: Option<ClientRect>,
        #[arg(long, value_parser = parse_unit)]
        unit: Option<LengthUnit>,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct ReplayOutput {
    state: GestureState,
    rect_pct: Option<PercentRect>,
    text: Option<String>,
    activations: Vec<TargetId>,
    swallowed_clicks: Vec<TargetId>,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let settings_dir = cli.settings_dir.as_deref();

    match cli.command {
        Commands::Units => {
            for unit in ALL_UNITS {
                println!("{}\t{}", unit.name(), unit.points_per_unit());
            }
            Ok(())
        }
        Commands::Convert { value, from, to, sign } => {
            let sign = if sign { SignDisplay::ExceptZero } else { SignDisplay::Auto };
            let converted = Length::new(value, from).to_unit(to);

            println!("{} {}", FormatterCache::new().rule(to, sign).format(converted), to);
            Ok(())
        }
        Commands::DefaultUnit { set } => run_default_unit(settings_dir, set),
        Commands::Replay { script, width_pt, height_pt, bounds, unit } => {
            let bounds = bounds.unwrap_or(ClientRect::new(0.0, 0.0, width_pt, height_pt));
            let unit = match unit {
                Some(unit) => unit,
                None => DefaultUnit::new(open_settings(settings_dir)?).get(),
            };

            run_replay(&script, ViewerConfig::new(width_pt, height_pt, bounds), unit)
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_default_unit(settings_dir: Option<&Path>, set: Option<LengthUnit>) -> Result<()> {
    let default_unit = DefaultUnit::new(open_settings(settings_dir)?);

    if let Some(unit) = set {
        default_unit.set(unit);
    }

    println!("{}", default_unit.get());
    Ok(())
}

fn run_replay(script: &Path, config: ViewerConfig, unit: LengthUnit) -> Result<()> {
    let raw = fs::read_to_string(script)
        .with_context(|| format!("failed to read replay script {}", script.display()))?;
    let events: Vec<ViewerEvent> =
        serde_json::from_str(&raw).context("replay script is not a valid event list")?;

    let ctx = ViewerContext::in_memory();
    ctx.default_unit.set(unit);

    let mut viewer = Viewer::new(&ctx, config);
    for event in events {
        log::debug!("replaying {event:?}");
        viewer.dispatch(event);
        viewer.run_pending();
    }

    let rect_pct = viewer.frame();
    let payload = ReplayOutput {
        state: viewer.state(),
        rect_pct,
        text: rect_pct.and_then(|_| viewer.tool().info().text()),
        activations: viewer.take_activations(),
        swallowed_clicks: viewer.take_swallowed_clicks(),
    };

    let json = serde_json::to_string_pretty(&payload)?;
    println!("{json}");

    Ok(())
}

fn open_settings(dir: Option<&Path>) -> Result<Settings> {
    let storage = match dir {
        Some(dir) => Storage::with_root(dir),
        None => match std::env::var_os(SETTINGS_DIR_ENV) {
            Some(dir) => Storage::with_root(dir),
            None => Storage::from_default_project()
                .context("failed to resolve settings directory")?,
        },
    };

    log::debug!("settings file {}", storage.settings_path().display());
    Ok(Settings::new(storage))
}

fn parse_unit(name: &str) -> Result<LengthUnit, String> {
    LengthUnit::from_name(name).map_err(|err| err.to_string())
}

fn parse_bounds(value: &str) -> Result<ClientRect, String> {
    let parse = |part: &str| -> Result<f64, String> {
        match part.trim().parse::<f64>() {
            Ok(px) if px > 0.0 && px.is_finite() => Ok(px),
            _ => Err(format!("invalid size {part:?}, expected a positive number of pixels")),
        }
    };

    let (width, height) = value
        .split_once(|c: char| c == 'x' || c == 'X')
        .ok_or_else(|| format!("expected WxH, got {value:?}"))?;

    Ok(ClientRect::new(0.0, 0.0, parse(width)?, parse(height)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bounds() {
        assert_eq!(parse_bounds("800x600"), Ok(ClientRect::new(0.0, 0.0, 800.0, 600.0)));
        assert_eq!(parse_bounds("12.5X10"), Ok(ClientRect::new(0.0, 0.0, 12.5, 10.0)));
        assert!(parse_bounds("800").is_err());
        assert!(parse_bounds("0x600").is_err());
        assert!(parse_bounds("axb").is_err());
    }

    #[test]
    fn unit_parser_lists_supported_units() {
        let err = parse_unit("yd").unwrap_err();
        assert!(err.contains("supported: pt, in, cm, mm"), "{err}");
        assert_eq!(parse_unit("mm"), Ok(pageruler_core::MILLIMETER));
    }
}
