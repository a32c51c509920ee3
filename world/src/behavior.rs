//! Per-kind advance and collision rules for bots and blocks.

use log::{debug, trace};
use robotrain_core::{
    BotKind, DeathCause, Event, GateColor, MovableKind, Position, SwitchWeight, Tile, TileKind,
};

use crate::{movable::SOLID, World};

impl World {
    /// Runs the advance phase for every movable, in collection order.
    pub(crate) fn advance_all(&mut self, out_events: &mut Vec<Event>) {
        for index in 0..self.movables.len() {
            self.advance_movable(index, out_events);
        }
    }

    fn advance_movable(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let movable = &self.movables[index];
        if movable.retired || movable.dying || movable.halted {
            return;
        }
        let MovableKind::Bot(kind) = movable.kind else {
            return;
        };

        match kind {
            BotKind::Arrow => self.convert_to_arrow(index, out_events),
            BotKind::Turn { handedness } => {
                self.step_forward(index, out_events);
                let movable = &mut self.movables[index];
                let ahead = movable.position.step(movable.direction);
                let blocked = self
                    .board
                    .cell_at(ahead)
                    .map_or(false, |cell| cell.contains_any(&SOLID));
                if blocked {
                    movable.direction = movable.direction.turned(handedness);
                    trace!("turn bot {} now faces {}", movable.id.get(), movable.direction);
                }
            }
            BotKind::Push => {
                self.step_forward(index, out_events);
                self.push_blocks(index, out_events);
            }
            _ => self.step_forward(index, out_events),
        }
    }

    fn step_forward(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let movable = &mut self.movables[index];
        let from = movable.position;
        movable.position = from.step(movable.direction);
        trace!("movable {} advanced {} -> {}", movable.id.get(), from, movable.position);
        out_events.push(Event::MovableAdvanced {
            movable: movable.id,
            from,
            to: movable.position,
        });
    }

    fn push_blocks(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let (position, direction) = {
            let pusher = &self.movables[index];
            (pusher.position, pusher.direction)
        };
        let destination = position.step(direction);
        let open = self
            .board
            .cell_at(destination)
            .map_or(false, |cell| !cell.contains_any(&SOLID));

        for block in &mut self.movables {
            if !block.is_block() || block.retired || block.position != position {
                continue;
            }
            if !open {
                debug!("block {} cannot be pushed into {}", block.id.get(), destination);
                continue;
            }
            block.position = destination;
            block.direction = direction;
            out_events.push(Event::BlockPushed {
                block: block.id,
                from: position,
                to: destination,
            });
        }
    }

    /// Replaces the arrow bot with an arrow tile in its cell and hands its
    /// target to the train head, even when it carries none.
    fn convert_to_arrow(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let (id, position, direction, target) = {
            let bot = &self.movables[index];
            (bot.id, bot.position, bot.direction, bot.advance_target)
        };

        if let Some(head) = self.train.head() {
            self.set_target(head, target);
            if let Some(target) = target {
                out_events.push(Event::TargetHandedOff {
                    from: id,
                    to: head,
                    target,
                });
            }
        }

        let tile = Tile::Arrow { direction };
        if let Some(cell) = self.board.cell_at_mut(position) {
            let _ = cell.remove_kind(TileKind::Arrow);
        }
        self.board.place_tile(tile, position);
        self.retire(index, tile, out_events);
    }

    fn convert_to_bridge(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let (id, position, direction, target) = {
            let bot = &self.movables[index];
            (bot.id, bot.position, bot.direction, bot.advance_target)
        };

        if let (Some(head), Some(target)) = (self.train.head(), target) {
            if self.target_of(head).is_none() {
                self.set_target(head, Some(target));
                out_events.push(Event::TargetHandedOff {
                    from: id,
                    to: head,
                    target,
                });
            }
        }

        let tile = Tile::Bridge { direction };
        self.board.place_tile(tile, position);
        self.retire(index, tile, out_events);
    }

    fn retire(&mut self, index: usize, tile: Tile, out_events: &mut Vec<Event>) {
        let bot = &mut self.movables[index];
        bot.retired = true;
        debug!("movable {} turned into {:?} at {}", bot.id.get(), tile.kind(), bot.position);
        out_events.push(Event::CarConverted {
            car: bot.id,
            tile,
            position: bot.position,
        });
    }

    /// Runs the collision phase for every movable, in collection order.
    pub(crate) fn check_all_collisions(&mut self, out_events: &mut Vec<Event>) {
        for index in 0..self.movables.len() {
            if !self.movables[index].retired {
                self.check_collisions(index, out_events);
            }
        }
    }

    fn check_collisions(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let (kind, position) = {
            let movable = &self.movables[index];
            (movable.kind, movable.position)
        };
        let MovableKind::Bot(bot) = kind else {
            self.trigger_switches_under_block(position, out_events);
            return;
        };
        if self.board.cell_at(position).is_none() {
            self.kill(index, DeathCause::OffBoard, out_events);
            return;
        }

        match bot {
            BotKind::Bridge => {
                let hazard = self
                    .board
                    .cell_at(position)
                    .map_or(false, |cell| cell.has_open_hazard());
                if hazard {
                    self.convert_to_bridge(index, out_events);
                    return;
                }
                self.base_tile_collisions(index, bot, out_events);
            }
            BotKind::Drill => {
                let drilled = self
                    .board
                    .cell_at_mut(position)
                    .map_or(false, |cell| cell.remove_kind(TileKind::Drillable));
                if drilled {
                    out_events.push(Event::TilesDestroyed {
                        kind: TileKind::Drillable,
                        positions: vec![position],
                    });
                }
                self.base_tile_collisions(index, bot, out_events);
            }
            BotKind::Bomb => {
                self.base_tile_collisions(index, bot, out_events);
                let positions = self.board.destroy_connected(position, TileKind::Bombable);
                if !positions.is_empty() {
                    debug!("bomb at {position} cleared {} tiles", positions.len());
                    out_events.push(Event::TilesDestroyed {
                        kind: TileKind::Bombable,
                        positions,
                    });
                }
            }
            BotKind::Caboose => {
                self.base_tile_collisions(index, bot, out_events);
                let finished = self
                    .board
                    .cell_at(position)
                    .map_or(false, |cell| cell.contains(TileKind::Finish));
                let caboose = &mut self.movables[index];
                if finished && !caboose.dying {
                    caboose.halted = true;
                    self.won = true;
                }
            }
            _ => self.base_tile_collisions(index, bot, out_events),
        }

        self.check_movable_collisions(index, out_events);
    }

    /// Walks the cell's tiles in placement order, applying arrow redirects,
    /// lethal tiles and normal-weight switches as they come.
    fn base_tile_collisions(&mut self, index: usize, bot: BotKind, out_events: &mut Vec<Event>) {
        let position = self.movables[index].position;
        let Some(cell) = self.board.cell_at(position) else {
            return;
        };
        let bridged = cell.contains(TileKind::Bridge);
        let tiles = cell.tiles().to_vec();

        for tile in tiles {
            if let Tile::Arrow { direction } = tile {
                self.movables[index].direction = direction;
            }
            if dies_versus_tile(bot, tile.kind(), bridged) {
                self.kill(index, DeathCause::Tile(tile.kind()), out_events);
            }
            if let Tile::GateSwitch {
                color,
                weight: SwitchWeight::Normal,
                ..
            } = tile
            {
                self.open_gates(color, out_events);
            }
        }
    }

    fn check_movable_collisions(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let position = self.movables[index].position;
        let crushed = self.movables.iter().enumerate().any(|(other, movable)| {
            other != index && !movable.retired && movable.is_block() && movable.position == position
        });
        if crushed {
            self.kill(index, DeathCause::Block, out_events);
        }
    }

    /// Blocks press every switch under them, whatever its weight.
    fn trigger_switches_under_block(&mut self, position: Position, out_events: &mut Vec<Event>) {
        let colors: Vec<GateColor> = self
            .board
            .cell_at(position)
            .map(|cell| {
                cell.tiles()
                    .iter()
                    .filter_map(|tile| match tile {
                        Tile::GateSwitch { color, .. } => Some(*color),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        for color in colors {
            self.open_gates(color, out_events);
        }
    }

    fn open_gates(&mut self, color: GateColor, out_events: &mut Vec<Event>) {
        if self.board.open_gates(color) > 0 {
            debug!("{color:?} gates opened");
            out_events.push(Event::GatesOpened { color });
        }
    }

    /// Marks the bot as dying and passes its stopping point on.
    ///
    /// The car behind a dying head inherits the target; any other dying car
    /// hands it to the head only when the head has none.
    pub(crate) fn kill(&mut self, index: usize, cause: DeathCause, out_events: &mut Vec<Event>) {
        let bot = &mut self.movables[index];
        if bot.dying {
            return;
        }
        bot.dying = true;
        let (id, kind, target) = (bot.id, bot.kind, bot.advance_target);
        debug!("movable {} is dying after hitting {cause}", id.get());
        out_events.push(Event::CarDied { car: id, cause });

        if kind == MovableKind::Bot(BotKind::Caboose) {
            self.lost = true;
        }

        let Some(target) = target else {
            return;
        };
        let head = self.train.head();
        let recipient = if head == Some(id) {
            self.train.behind(id)
        } else {
            head.filter(|head| self.target_of(*head).is_none())
        };
        if let Some(to) = recipient {
            self.set_target(to, Some(target));
            out_events.push(Event::TargetHandedOff {
                from: id,
                to,
                target,
            });
        }
    }
}

fn dies_versus_tile(bot: BotKind, tile: TileKind, bridged: bool) -> bool {
    match tile {
        TileKind::Water => !bridged && bot != BotKind::Swim,
        TileKind::Lava => !bridged,
        TileKind::Wall | TileKind::Bombable | TileKind::Drillable | TileKind::Gate => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movable::Movable;
    use robotrain_core::{Direction, Handedness, Level, LevelInfo, MovableId};

    /// A world whose only movable stands on a single cell stacked with `stack`.
    fn standing_on(stack: &[Tile], bot: BotKind) -> World {
        let cell = Position::new(0, 1);
        let mut tiles = vec![(Position::new(0, 0), Tile::Floor)];
        tiles.push((Position::new(0, 0), Tile::Start));
        tiles.extend(stack.iter().map(|tile| (cell, *tile)));
        let mut world = World::new(Level {
            info: LevelInfo {
                title: "Stacked".to_owned(),
                bot_count: 0,
                earned_bots: 0,
                new_bots: 0,
                description: String::new(),
                start: Position::new(0, 0),
            },
            tiles,
            blocks: Vec::new(),
        });
        world.movables.push(Movable::new(
            MovableId::new(40),
            MovableKind::Bot(bot),
            cell,
            Direction::Right,
        ));
        world
    }

    const DOWN: Tile = Tile::Arrow {
        direction: Direction::Down,
    };

    #[test]
    fn arrow_then_lava_turns_and_kills() {
        let mut world = standing_on(&[Tile::Floor, DOWN, Tile::Lava], BotKind::Generic);
        let mut events = Vec::new();

        world.check_all_collisions(&mut events);

        assert!(world.movables[0].dying);
        assert_eq!(world.movables[0].direction, Direction::Down);
        assert_eq!(
            events,
            vec![Event::CarDied {
                car: MovableId::new(40),
                cause: DeathCause::Tile(TileKind::Lava),
            }]
        );
    }

    #[test]
    fn lava_then_arrow_kills_and_still_turns() {
        let mut world = standing_on(&[Tile::Floor, Tile::Lava, DOWN], BotKind::Caboose);
        let mut events = Vec::new();

        world.check_all_collisions(&mut events);

        assert!(world.movables[0].dying);
        assert!(world.lost);
        assert_eq!(world.movables[0].direction, Direction::Down);
        assert_eq!(
            events,
            vec![Event::CarDied {
                car: MovableId::new(40),
                cause: DeathCause::Tile(TileKind::Lava),
            }]
        );
    }

    #[test]
    fn swimmer_survives_an_arrow_in_water() {
        let mut world = standing_on(&[Tile::Water, DOWN], BotKind::Swim);
        let mut events = Vec::new();

        world.check_all_collisions(&mut events);

        assert!(!world.movables[0].dying);
        assert_eq!(world.movables[0].direction, Direction::Down);
        assert!(events.is_empty());
    }

    #[test]
    fn bridges_make_water_and_lava_safe() {
        assert!(dies_versus_tile(BotKind::Generic, TileKind::Water, false));
        assert!(!dies_versus_tile(BotKind::Generic, TileKind::Water, true));
        assert!(dies_versus_tile(BotKind::Caboose, TileKind::Lava, false));
        assert!(!dies_versus_tile(BotKind::Caboose, TileKind::Lava, true));
    }

    #[test]
    fn swimmers_only_survive_water() {
        assert!(!dies_versus_tile(BotKind::Swim, TileKind::Water, false));
        assert!(dies_versus_tile(BotKind::Swim, TileKind::Lava, false));
        assert!(dies_versus_tile(BotKind::Swim, TileKind::Wall, false));
    }

    #[test]
    fn solid_tiles_and_gates_are_lethal_to_every_bot() {
        let turn = BotKind::Turn {
            handedness: Handedness::Clockwise,
        };
        for tile in [
            TileKind::Wall,
            TileKind::Bombable,
            TileKind::Drillable,
            TileKind::Gate,
        ] {
            assert!(dies_versus_tile(turn, tile, true));
        }
        for tile in [
            TileKind::Floor,
            TileKind::Arrow,
            TileKind::Start,
            TileKind::Finish,
            TileKind::GateSwitch,
            TileKind::Bridge,
        ] {
            assert!(!dies_versus_tile(BotKind::Generic, tile, false));
        }
    }
}
