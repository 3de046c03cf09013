//! Structure hashes used as cache keys for rendered cell images.

use crate::model::{CellIndex, Table};

/// 53-bit cyrb53 string hash over UTF-16 code units.
pub fn cyrb53(input: &str, seed: u32) -> u64 {
    let mut h1: u32 = 0xdead_beef ^ seed;
    let mut h2: u32 = 0x41c6_ce57 ^ seed;
    for unit in input.encode_utf16() {
        let ch = u32::from(unit);
        h1 = (h1 ^ ch).wrapping_mul(2_654_435_761);
        h2 = (h2 ^ ch).wrapping_mul(1_597_334_677);
    }
    h1 = (h1 ^ (h1 >> 16)).wrapping_mul(2_246_822_507)
        ^ (h2 ^ (h2 >> 13)).wrapping_mul(3_266_489_909);
    h2 = (h2 ^ (h2 >> 16)).wrapping_mul(2_246_822_507)
        ^ (h1 ^ (h1 >> 13)).wrapping_mul(3_266_489_909);
    (u64::from(h2 & 0x1f_ffff) << 32) + u64::from(h1)
}

/// Hash of a table's structure only.
///
/// Cell texts, the lock flag and column types are stripped before hashing,
/// so the hash changes exactly when the geometry does.
pub fn table_hash(table: &Table) -> Result<u64, serde_json::Error> {
    let stripped = Table {
        cells: table
            .cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.without_text()).collect())
            .collect(),
        structure_locked: false,
        column_types: Vec::new(),
        ..table.clone()
    };
    let json = serde_json::to_string(&stripped)?;
    Ok(cyrb53(&json, 0))
}

/// Collaborator path of the image snippet of one cell.
pub fn cell_image_path(table_index: usize, cell: CellIndex, hash: u64) -> String {
    format!(
        "cell_image/{}/{}/{}/{}",
        table_index, cell.row, cell.column, hash
    )
}
