use crate::block::BlockstateId;

pub const CHUNK_WIDTH: i32 = 16;
pub const CHUNK_HEIGHT: i32 = 256;

/// Chunk column coordinate `(x, z)`.
pub type ChunkCoord = (i32, i32);

/// A 16 x 256 x 16 column of blockstate ids, indexed in chunk-local coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    blocks: Vec<BlockstateId>,
}

impl Chunk {
    /// A chunk filled with one blockstate (usually air).
    pub fn filled(id: BlockstateId) -> Self {
        Self {
            blocks: vec![id; (CHUNK_WIDTH * CHUNK_HEIGHT * CHUNK_WIDTH) as usize],
        }
    }

    fn index(x: i32, y: i32, z: i32) -> Option<usize> {
        let in_range = (0..CHUNK_WIDTH).contains(&x)
            && (0..CHUNK_HEIGHT).contains(&y)
            && (0..CHUNK_WIDTH).contains(&z);
        in_range.then(|| ((y * CHUNK_WIDTH + z) * CHUNK_WIDTH + x) as usize)
    }

    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<BlockstateId> {
        Self::index(x, y, z).map(|i| self.blocks[i])
    }

    /// Returns false when the local coordinate is outside the chunk.
    pub fn set(&mut self, x: i32, y: i32, z: i32, id: BlockstateId) -> bool {
        match Self::index(x, y, z) {
            Some(i) => {
                self.blocks[i] = id;
                true
            }
            None => false,
        }
    }

    /// Local coordinates of every cell holding `id`.
    pub fn positions_of(&self, id: BlockstateId) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .filter(move |(_, b)| **b == id)
            .map(|(i, _)| {
                let i = i as i32;
                let x = i % CHUNK_WIDTH;
                let z = (i / CHUNK_WIDTH) % CHUNK_WIDTH;
                let y = i / (CHUNK_WIDTH * CHUNK_WIDTH);
                (x, y, z)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_cells_are_rejected() {
        let mut chunk = Chunk::filled(0);
        assert!(chunk.set(15, 255, 15, 3));
        assert_eq!(chunk.get(15, 255, 15), Some(3));
        assert!(!chunk.set(16, 0, 0, 3));
        assert_eq!(chunk.get(0, -1, 0), None);
    }

    #[test]
    fn positions_of_decodes_local_coordinates() {
        let mut chunk = Chunk::filled(0);
        chunk.set(2, 70, 9, 5);
        chunk.set(0, 1, 0, 5);
        let mut found: Vec<_> = chunk.positions_of(5).collect();
        found.sort();
        assert_eq!(found, vec![(0, 1, 0), (2, 70, 9)]);
    }
}
