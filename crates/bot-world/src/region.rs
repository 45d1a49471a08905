use crate::block::BlockstateId;
use crate::position::Position;
use crate::world::World;

/// A copy of every cell in an inclusive box, taken under one lock so the
/// caller can compute on it after releasing the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSnapshot {
    min: Position,
    max: Position,
    cells: Vec<Option<BlockstateId>>,
}

impl RegionSnapshot {
    pub fn capture(world: &World, min: Position, max: Position) -> Self {
        let mut cells = Vec::with_capacity(Self::volume(min, max));
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    cells.push(world.get_block(Position::new(x, y, z)));
                }
            }
        }
        Self { min, max, cells }
    }

    fn volume(min: Position, max: Position) -> usize {
        let span = |a: i32, b: i32| if b < a { 0 } else { (b - a + 1) as usize };
        span(min.x, max.x) * span(min.y, max.y) * span(min.z, max.z)
    }

    pub fn min(&self) -> Position {
        self.min
    }

    pub fn max(&self) -> Position {
        self.max
    }

    /// `None` when the cell was unknown at capture time or lies outside the box.
    pub fn get(&self, pos: Position) -> Option<BlockstateId> {
        if !pos.within(self.min, self.max) {
            return None;
        }
        let d = pos - self.min;
        let sy = (self.max.y - self.min.y + 1) as usize;
        let sz = (self.max.z - self.min.z + 1) as usize;
        let index = (d.x as usize * sy + d.y as usize) * sz + d.z as usize;
        self.cells.get(index).copied().flatten()
    }

    pub fn known_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}
