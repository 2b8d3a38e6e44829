//! Session settings read from `ricochet.toml`.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use ricochet_core::RobotColor;
use ricochet_system_spawning::RobotSpec;
use serde::Deserialize;

const DEFAULT_FPS: u32 = 30;
const DEFAULT_BOB_AMPLITUDE: f64 = 0.1;

/// Settings controlling one play session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Settings {
    /// Seed for quadrant shuffling and robot placement. Drawn from entropy
    /// when absent.
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Animation ticks per second.
    #[serde(default = "default_fps")]
    pub(crate) fps: u32,
    /// Height of the idle bob in world units.
    #[serde(default = "default_bob_amplitude")]
    pub(crate) bob_amplitude: f64,
    /// Robots placed on the board, in cycling order.
    #[serde(default = "default_robots")]
    pub(crate) robots: Vec<RobotEntry>,
}

/// One `[[robots]]` table.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RobotEntry {
    pub(crate) name: String,
    /// Colour written as `#rrggbb`.
    pub(crate) color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            fps: DEFAULT_FPS,
            bob_amplitude: DEFAULT_BOB_AMPLITUDE,
            robots: default_robots(),
        }
    }
}

impl Settings {
    /// Reads settings from `path`, or returns the defaults when absent.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid settings in {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(contents).context("failed to parse settings toml contents")?;
        if settings.robots.is_empty() {
            bail!("settings must list at least one robot");
        }
        Ok(settings)
    }

    /// Converts the `[[robots]]` tables into a spawn roster.
    pub(crate) fn roster(&self) -> Result<Vec<RobotSpec>> {
        self.robots
            .iter()
            .map(|entry| {
                let color = parse_hex_color(&entry.color)
                    .with_context(|| format!("robot `{}` has an invalid color", entry.name))?;
                Ok(RobotSpec::new(entry.name.clone(), color))
            })
            .collect()
    }
}

fn parse_hex_color(value: &str) -> Result<RobotColor> {
    let Some(hex) = value.strip_prefix('#') else {
        bail!("color `{value}` must start with `#`");
    };
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("color `{value}` must have exactly six hex digits");
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .with_context(|| format!("color `{value}` has an invalid channel"))
    };
    let red = channel(0..2)?;
    let green = channel(2..4)?;
    let blue = channel(4..6)?;
    Ok(RobotColor::from_rgb(red, green, blue))
}

const fn default_fps() -> u32 {
    DEFAULT_FPS
}

const fn default_bob_amplitude() -> f64 {
    DEFAULT_BOB_AMPLITUDE
}

fn default_robots() -> Vec<RobotEntry> {
    [
        ("red", "#c82a36"),
        ("green", "#2f9532"),
        ("blue", "#5847ff"),
        ("yellow", "#ffc107"),
    ]
    .into_iter()
    .map(|(name, color)| RobotEntry {
        name: name.to_owned(),
        color: color.to_owned(),
    })
    .collect()
}
