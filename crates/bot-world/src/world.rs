use std::collections::HashMap;

use crate::block::BlockstateId;
use crate::chunk::{Chunk, ChunkCoord, CHUNK_WIDTH};
use crate::position::Position;

/// Loaded chunks keyed by column coordinate.
///
/// A position in an unloaded chunk, or above/below the build height, is
/// unknown: [`World::get_block`] returns `None` and callers must not read that
/// as air.
#[derive(Debug, Clone, Default)]
pub struct World {
    chunks: HashMap<ChunkCoord, Chunk>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk_coord(pos: Position) -> ChunkCoord {
        (pos.x.div_euclid(CHUNK_WIDTH), pos.z.div_euclid(CHUNK_WIDTH))
    }

    pub fn load_chunk(&mut self, coord: ChunkCoord, chunk: Chunk) {
        tracing::trace!(?coord, "chunk loaded");
        self.chunks.insert(coord, chunk);
    }

    pub fn is_loaded(&self, pos: Position) -> bool {
        self.chunks.contains_key(&Self::chunk_coord(pos))
    }

    pub fn get_block(&self, pos: Position) -> Option<BlockstateId> {
        let chunk = self.chunks.get(&Self::chunk_coord(pos))?;
        chunk.get(
            pos.x.rem_euclid(CHUNK_WIDTH),
            pos.y,
            pos.z.rem_euclid(CHUNK_WIDTH),
        )
    }

    /// Returns false when the position is not in a loaded chunk.
    pub fn set_block(&mut self, pos: Position, id: BlockstateId) -> bool {
        match self.chunks.get_mut(&Self::chunk_coord(pos)) {
            Some(chunk) => chunk.set(
                pos.x.rem_euclid(CHUNK_WIDTH),
                pos.y,
                pos.z.rem_euclid(CHUNK_WIDTH),
                id,
            ),
            None => false,
        }
    }

    pub fn chunks(&self) -> impl Iterator<Item = (&ChunkCoord, &Chunk)> {
        self.chunks.iter()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// World positions of every loaded cell holding `id`, sorted.
    pub fn find_blocks(&self, id: BlockstateId) -> Vec<Position> {
        let mut out: Vec<Position> = self
            .chunks
            .iter()
            .flat_map(|(&(cx, cz), chunk)| {
                chunk.positions_of(id).map(move |(x, y, z)| {
                    Position::new(cx * CHUNK_WIDTH + x, y, cz * CHUNK_WIDTH + z)
                })
            })
            .collect();
        out.sort();
        out
    }
}
