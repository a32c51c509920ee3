#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the level briefing.

use robotrain_core::Specialization;
use robotrain_world::{query, World};

/// Information shown to the player before the first click.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Briefing {
    /// Title of the level.
    pub title: String,
    /// Description of the level.
    pub description: String,
    /// Number of generic cars deployed ahead of the caboose.
    pub cars: u32,
    /// Specializations the player may pick.
    pub specializations: Vec<Specialization>,
    /// Specializations this level introduces.
    pub introduced: Vec<Specialization>,
}

/// Produces data required to greet the player.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Summarises the level the world was seeded with.
    #[must_use]
    pub fn briefing(&self, world: &World) -> Briefing {
        let info = query::level_info(world);
        Briefing {
            title: info.title.clone(),
            description: info.description.clone(),
            cars: info.bot_count,
            specializations: query::catalog(world),
            introduced: Specialization::newly_introduced(info.earned_bots, info.new_bots),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robotrain_core::BotKind;

    fn world(text: &str) -> World {
        World::new(robotrain_level::parse(text).expect("level parses"))
    }

    #[test]
    fn banner_comes_from_the_world() {
        let world = world("Hello\n0\n0\n0\n\ns.f\n");
        assert_eq!(
            Bootstrap.welcome_banner(&world),
            robotrain_core::WELCOME_BANNER
        );
    }

    #[test]
    fn briefing_lists_unlocked_and_new_specializations() {
        let world = world("Into the drink\n3\n3\n1\nBridges keep you dry.\ns.5.f\n");

        let briefing = Bootstrap.briefing(&world);

        assert_eq!(briefing.title, "Into the drink");
        assert_eq!(briefing.description, "Bridges keep you dry.");
        assert_eq!(briefing.cars, 3);
        assert_eq!(briefing.specializations.len(), 4);
        assert_eq!(
            briefing.introduced,
            vec![Specialization::new(BotKind::Bridge)]
        );
    }
}
