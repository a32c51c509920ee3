//! Coupling order of the deployed cars and the deployment countdown.

use std::collections::VecDeque;

use robotrain_core::{Direction, MovableId, Position};

/// Countdown of cars still waiting to roll out of the start tile.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Deployment {
    direction: Direction,
    remaining: Option<u32>,
}

impl Deployment {
    /// Queues `cars` generic cars followed by the caboose.
    pub(crate) const fn new(direction: Direction, cars: u32) -> Self {
        Self {
            direction,
            remaining: Some(cars),
        }
    }

    /// Pops the next car to spawn, yielding its direction and the count left
    /// before it. A count of zero designates the caboose.
    pub(crate) fn next_car(&mut self) -> Option<(Direction, u32)> {
        let remaining = self.remaining?;
        self.remaining = remaining.checked_sub(1);
        Some((self.direction, remaining))
    }

    /// Reports whether cars are still waiting to spawn.
    pub(crate) const fn is_spawning(&self) -> bool {
        self.remaining.is_some()
    }
}

/// Ordered sequence of coupled cars, head first.
///
/// Launched cars leave the sequence; the car behind a departed or dead head
/// takes its place.
#[derive(Clone, Debug, Default)]
pub(crate) struct Train {
    cars: VecDeque<MovableId>,
    caboose: Option<MovableId>,
    deferred_target: Option<Position>,
}

impl Train {
    pub(crate) fn head(&self) -> Option<MovableId> {
        self.cars.front().copied()
    }

    /// Car coupled directly behind `car`.
    pub(crate) fn behind(&self, car: MovableId) -> Option<MovableId> {
        let index = self.cars.iter().position(|coupled| *coupled == car)?;
        self.cars.get(index + 1).copied()
    }

    pub(crate) fn cars(&self) -> impl Iterator<Item = MovableId> + '_ {
        self.cars.iter().copied()
    }

    /// Couples `car` at the back, reporting whether it became the head.
    pub(crate) fn couple(&mut self, car: MovableId) -> bool {
        self.cars.push_back(car);
        self.cars.len() == 1
    }

    pub(crate) fn detach_head(&mut self) -> Option<MovableId> {
        self.cars.pop_front()
    }

    /// Removes `car` wherever it sits in the sequence.
    pub(crate) fn uncouple(&mut self, car: MovableId) -> bool {
        match self.cars.iter().position(|coupled| *coupled == car) {
            Some(index) => self.cars.remove(index).is_some(),
            None => false,
        }
    }

    /// Records the caboose. The first caboose is never replaced.
    pub(crate) fn mark_caboose(&mut self, car: MovableId) {
        if self.caboose.is_none() {
            self.caboose = Some(car);
        }
    }

    pub(crate) fn caboose(&self) -> Option<MovableId> {
        self.caboose
    }

    pub(crate) fn is_caboose(&self, car: MovableId) -> bool {
        self.caboose == Some(car)
    }

    /// Stores the stopping point handed to the first car that spawns.
    pub(crate) fn defer_target(&mut self, target: Position) {
        self.deferred_target = Some(target);
    }

    pub(crate) fn take_deferred_target(&mut self) -> Option<Position> {
        self.deferred_target.take()
    }
}
