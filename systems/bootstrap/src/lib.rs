#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Ricochet Robots experience.

use ricochet_core::{BoardGeometry, LatticePoint};
use ricochet_world::{query, Target, World};

/// Produces the static data adapters need before the first frame.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Exposes the board dimensions required for rendering.
    #[must_use]
    pub fn geometry(&self, world: &World) -> BoardGeometry {
        query::geometry(world)
    }

    /// Exposes the blocking walls for presentation purposes.
    #[must_use]
    pub fn walls<'world>(&self, world: &'world World) -> &'world [LatticePoint] {
        query::walls(world)
    }

    /// Exposes the target markers for presentation purposes.
    #[must_use]
    pub fn targets<'world>(&self, world: &'world World) -> &'world [Target] {
        query::targets(world)
    }
}
