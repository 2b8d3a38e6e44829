//! Level files: four quadrant tiles shuffled into a board at start-up.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use rand::Rng;
use ricochet_world::{LevelGeometry, QuadrantTile};
use serde::Deserialize;

const CLASSIC_LEVEL: &str = include_str!("../assets/levels/classic.json");

#[derive(Debug, Deserialize)]
struct LevelFile {
    quadrants: [QuadrantTile; 4],
}

/// Loads the level at `path`, or the built-in classic board when absent.
pub(crate) fn load<R>(path: Option<&Path>, rng: &mut R) -> Result<LevelGeometry>
where
    R: Rng + ?Sized,
{
    let (contents, origin) = match path {
        Some(path) => (
            fs::read_to_string(path)
                .with_context(|| format!("failed to read level at {}", path.display()))?,
            path.display().to_string(),
        ),
        None => (
            CLASSIC_LEVEL.to_owned(),
            "built-in classic level".to_owned(),
        ),
    };
    parse(&contents, rng).with_context(|| format!("invalid level in {origin}"))
}

fn parse<R>(contents: &str, rng: &mut R) -> Result<LevelGeometry>
where
    R: Rng + ?Sized,
{
    let file: LevelFile =
        serde_json::from_str(contents).context("failed to parse level json contents")?;
    Ok(LevelGeometry::from_quadrants(file.quadrants, rng)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use ricochet_world::{query, World};

    #[test]
    fn classic_level_builds_a_full_board() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let level = load(None, &mut rng).expect("classic level parses");
        let world = World::new(&level).expect("classic level is valid");

        assert_eq!(query::geometry(&world).width(), 16);
        assert_eq!(query::targets(&world).len(), 16);
        assert_eq!(query::walls(&world).len(), 40);
        assert_eq!(query::placement_pool(&world).len(), 256 - 16 - 4);
    }

    #[test]
    fn levels_need_exactly_four_quadrants() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert!(parse(r#"{ "quadrants": [] }"#, &mut rng).is_err());
    }
}
