//! Target structure: a dense grid of palette ids anchored at a world position.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use bot_core::{Blackboard, ContractViolation};
use bot_world::{Position, NEIGHBOURS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keys;

/// Palette id meaning "this cell must be air".
pub const AIR: i16 = -1;
pub const AIR_NAME: &str = "minecraft:air";

pub type Palette = BTreeMap<i16, String>;

#[derive(Debug, Error)]
pub enum StructureError {
    #[error("structure has no blocks")]
    Empty,

    #[error("ragged grid: expected {expected} cells along {axis}, found {found}")]
    Ragged {
        axis: char,
        expected: usize,
        found: usize,
    },

    #[error("palette has no entry for id {0}")]
    UnknownPaletteId(i16),

    #[error("failed to read structure {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse structure: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Dense x/y/z grid of palette ids in volume-local coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetGrid {
    size: Position,
    cells: Vec<i16>,
}

impl TargetGrid {
    pub fn new(size: Position, fill: i16) -> Self {
        let len = (size.x.max(0) * size.y.max(0) * size.z.max(0)) as usize;
        Self {
            size,
            cells: vec![fill; len],
        }
    }

    /// `nested[x][y][z]`, every row the same length.
    pub fn from_nested(nested: &[Vec<Vec<i16>>]) -> Result<Self, StructureError> {
        let sx = nested.len();
        let sy = nested.first().map_or(0, Vec::len);
        let sz = nested.first().and_then(|p| p.first()).map_or(0, Vec::len);
        if sx == 0 || sy == 0 || sz == 0 {
            return Err(StructureError::Empty);
        }
        let mut cells = Vec::with_capacity(sx * sy * sz);
        for plane in nested {
            if plane.len() != sy {
                return Err(StructureError::Ragged {
                    axis: 'y',
                    expected: sy,
                    found: plane.len(),
                });
            }
            for row in plane {
                if row.len() != sz {
                    return Err(StructureError::Ragged {
                        axis: 'z',
                        expected: sz,
                        found: row.len(),
                    });
                }
                cells.extend_from_slice(row);
            }
        }
        Ok(Self {
            size: Position::new(sx as i32, sy as i32, sz as i32),
            cells,
        })
    }

    pub fn size(&self) -> Position {
        self.size
    }

    fn index(&self, local: Position) -> Option<usize> {
        let max = self.size - Position::new(1, 1, 1);
        local
            .within(Position::default(), max)
            .then(|| ((local.x * self.size.y + local.y) * self.size.z + local.z) as usize)
    }

    pub fn get(&self, local: Position) -> Option<i16> {
        self.index(local).map(|i| self.cells[i])
    }

    pub fn set(&mut self, local: Position, id: i16) -> bool {
        match self.index(local) {
            Some(i) => {
                self.cells[i] = id;
                true
            }
            None => false,
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = i16> + '_ {
        self.cells.iter().copied()
    }

    fn layer(&self, y: i32) -> impl Iterator<Item = i16> + '_ {
        (0..self.size.x).flat_map(move |x| {
            (0..self.size.z).filter_map(move |z| self.get(Position::new(x, y, z)))
        })
    }

    fn drop_bottom_layer(&mut self) {
        let old = self.clone();
        self.size.y -= 1;
        self.cells = vec![AIR; (self.size.x * self.size.y * self.size.z) as usize];
        for x in 0..self.size.x {
            for y in 0..self.size.y {
                for z in 0..self.size.z {
                    let id = old.get(Position::new(x, y + 1, z)).unwrap_or(AIR);
                    self.set(Position::new(x, y, z), id);
                }
            }
        }
    }
}

/// Structure description as produced by an external loader: a palette of
/// block names and the non-air blocks with their positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureFile {
    pub palette: Vec<String>,
    pub blocks: Vec<StructureBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureBlock {
    pub pos: [i32; 3],
    pub state: i16,
}

impl StructureFile {
    pub fn from_yaml(content: &str) -> Result<Self, StructureError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, StructureError> {
        let content = std::fs::read_to_string(path).map_err(|source| StructureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }
}

/// A target grid placed in the world between `start` and `end` (inclusive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureTarget {
    start: Position,
    end: Position,
    grid: TargetGrid,
    palette: Palette,
}

impl StructureTarget {
    pub fn new(start: Position, grid: TargetGrid, mut palette: Palette) -> Result<Self, StructureError> {
        palette.insert(AIR, AIR_NAME.to_string());
        if let Some(id) = grid.ids().find(|id| !palette.contains_key(id)) {
            return Err(StructureError::UnknownPaletteId(id));
        }
        let end = start + grid.size() - Position::new(1, 1, 1);
        Ok(Self {
            start,
            end,
            grid,
            palette,
        })
    }

    /// Bounding box of the listed blocks, anchored with its minimum corner at `offset`.
    pub fn from_file(file: &StructureFile, offset: Position) -> Result<Self, StructureError> {
        let mut positions = file.blocks.iter().map(|b| Position::new(b.pos[0], b.pos[1], b.pos[2]));
        let first = positions.next().ok_or(StructureError::Empty)?;
        let (min, max) = positions.fold((first, first), |(lo, hi), p| {
            (
                Position::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                Position::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
            )
        });

        let mut grid = TargetGrid::new(max - min + Position::new(1, 1, 1), AIR);
        for block in &file.blocks {
            let p = Position::new(block.pos[0], block.pos[1], block.pos[2]);
            grid.set(p - min, block.state);
        }
        let palette = file
            .palette
            .iter()
            .enumerate()
            .map(|(i, name)| (i as i16, name.clone()))
            .collect();
        Self::new(offset, grid, palette)
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn size(&self) -> Position {
        self.grid.size()
    }

    pub fn grid(&self) -> &TargetGrid {
        &self.grid
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn target_at(&self, world: Position) -> Option<i16> {
        self.grid.get(world - self.start)
    }

    /// Remove bottom layers made only of air and `temp_block` (scaffolding
    /// under the real build). Keeps at least one layer. Returns how many were removed.
    pub fn trim_temp_layers(&mut self, temp_block: &str) -> usize {
        let Some(temp_id) = self
            .palette
            .iter()
            .find(|(_, name)| name.as_str() == temp_block)
            .map(|(id, _)| *id)
        else {
            tracing::warn!(temp_block, "temp block not in the structure palette");
            return 0;
        };

        let mut removed = 0;
        while self.grid.size().y > 1 && self.grid.layer(0).all(|id| id == AIR || id == temp_id) {
            self.grid.drop_bottom_layer();
            self.end.y -= 1;
            removed += 1;
        }
        if removed > 0 {
            tracing::info!(removed, temp_block, "trimmed bottom layers");
        }
        removed
    }

    /// Number of cells per non-air block name.
    pub fn block_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for id in self.grid.ids().filter(|id| *id != AIR) {
            if let Some(name) = self.palette.get(&id) {
                *counts.entry(name.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Non-air blocks above the bottom layer with no non-air neighbour in the
    /// target. Nothing could anchor them during construction.
    pub fn floating_blocks(&self) -> Vec<(Position, String)> {
        let size = self.grid.size();
        let mut out = Vec::new();
        for x in 0..size.x {
            for y in 1..size.y {
                for z in 0..size.z {
                    let local = Position::new(x, y, z);
                    let Some(id) = self.grid.get(local).filter(|id| *id != AIR) else {
                        continue;
                    };
                    let anchored = NEIGHBOURS
                        .iter()
                        .any(|(offset, _)| self.grid.get(local + *offset).is_some_and(|n| n != AIR));
                    if !anchored {
                        let name = self.palette.get(&id).cloned().unwrap_or_default();
                        out.push((self.start + local, name));
                    }
                }
            }
        }
        out
    }

    /// Publish the target under the `Structure.*` keys.
    pub fn store(&self, blackboard: &mut Blackboard) {
        keys::STRUCTURE_START.set(blackboard, self.start);
        keys::STRUCTURE_END.set(blackboard, self.end);
        keys::STRUCTURE_TARGET.set(blackboard, Arc::new(self.grid.clone()));
        keys::STRUCTURE_PALETTE.set(blackboard, Arc::new(self.palette.clone()));
        keys::STRUCTURE_LOADED.set(blackboard, true);
    }
}

/// Cheap read-only view of the `Structure.*` keys.
#[derive(Debug, Clone)]
pub struct StructureView {
    pub start: Position,
    pub end: Position,
    pub grid: Arc<TargetGrid>,
    pub palette: Arc<Palette>,
}

impl StructureView {
    /// Corners stored in either order are normalised so `start <= end` on
    /// every axis.
    pub fn read(blackboard: &Blackboard) -> Result<Self, ContractViolation> {
        let (start, end) = Position::corners(
            *keys::STRUCTURE_START.get(blackboard)?,
            *keys::STRUCTURE_END.get(blackboard)?,
        );
        Ok(Self {
            start,
            end,
            grid: Arc::clone(keys::STRUCTURE_TARGET.get(blackboard)?),
            palette: Arc::clone(keys::STRUCTURE_PALETTE.get(blackboard)?),
        })
    }

    pub fn target_at(&self, world: Position) -> Option<i16> {
        self.grid.get(world - self.start)
    }

    pub fn name_of(&self, id: i16) -> Option<&str> {
        self.palette.get(&id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette(names: &[&str]) -> Palette {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| (i as i16, n.to_string()))
            .collect()
    }

    #[test]
    fn ragged_grid_is_rejected() {
        let err = TargetGrid::from_nested(&[vec![vec![0, 0]], vec![vec![0]]]).unwrap_err();
        assert!(matches!(err, StructureError::Ragged { axis: 'z', .. }));
    }

    #[test]
    fn unknown_palette_id_is_rejected() {
        let grid = TargetGrid::from_nested(&[vec![vec![3]]]).unwrap();
        let err = StructureTarget::new(Position::default(), grid, palette(&["minecraft:stone"]))
            .unwrap_err();
        assert!(matches!(err, StructureError::UnknownPaletteId(3)));
    }

    #[test]
    fn bottom_scaffold_layers_are_trimmed() {
        // x=0..2, y=0..3, z=0: two scaffold layers under a stone layer.
        let grid = TargetGrid::from_nested(&[
            vec![vec![1], vec![AIR], vec![0]],
            vec![vec![AIR], vec![1], vec![0]],
        ])
        .unwrap();
        let mut target = StructureTarget::new(
            Position::new(10, 60, 10),
            grid,
            palette(&["minecraft:stone", "minecraft:scaffolding"]),
        )
        .unwrap();
        assert_eq!(target.end(), Position::new(11, 62, 10));

        assert_eq!(target.trim_temp_layers("minecraft:scaffolding"), 2);
        assert_eq!(target.size(), Position::new(2, 1, 1));
        assert_eq!(target.end(), Position::new(11, 60, 10));
        assert_eq!(target.target_at(Position::new(11, 60, 10)), Some(0));
        assert_eq!(target.block_counts().get("minecraft:scaffolding"), None);
    }

    #[test]
    fn unknown_temp_block_trims_nothing() {
        let grid = TargetGrid::from_nested(&[vec![vec![AIR], vec![0]]]).unwrap();
        let mut target =
            StructureTarget::new(Position::default(), grid, palette(&["minecraft:stone"])).unwrap();
        assert_eq!(target.trim_temp_layers("minecraft:scaffolding"), 0);
    }

    #[test]
    fn floating_blocks_ignore_the_floor() {
        let file = StructureFile {
            palette: vec!["minecraft:stone".into()],
            blocks: vec![
                StructureBlock { pos: [0, 0, 0], state: 0 },
                StructureBlock { pos: [0, 1, 0], state: 0 },
                StructureBlock { pos: [2, 0, 0], state: 0 },
                StructureBlock { pos: [2, 2, 0], state: 0 },
            ],
        };
        let target = StructureTarget::from_file(&file, Position::new(0, 64, 0)).unwrap();
        assert_eq!(target.size(), Position::new(3, 3, 1));
        assert_eq!(
            target.floating_blocks(),
            vec![(Position::new(2, 66, 0), "minecraft:stone".to_string())]
        );
        assert_eq!(target.block_counts().get("minecraft:stone"), Some(&4));
    }
}
