use crate::game::game_state::Tile;

/// Returns every subset of `tiles` whose sum is exactly `roll`.
///
/// `tiles` must be sorted ascending. Subsets come out ordered by size, then
/// lexicographically, and each subset is itself ascending.
pub fn get_valid_combinations(tiles: &[Tile], roll: u8) -> Vec<Vec<Tile>> {
    let mut combinations = Vec::new();
    let mut current = Vec::with_capacity(tiles.len());

    for size in 1..=tiles.len() {
        collect_of_size(tiles, size, u32::from(roll), &mut current, &mut combinations);
    }

    combinations
}

fn collect_of_size(
    tiles: &[Tile],
    size: usize,
    remaining: u32,
    current: &mut Vec<Tile>,
    out: &mut Vec<Vec<Tile>>,
) {
    if current.len() == size {
        if remaining == 0 {
            out.push(current.clone());
        }
        return;
    }

    for (i, &tile) in tiles.iter().enumerate() {
        // sorted input: every later tile is larger too
        if u32::from(tile) > remaining {
            break;
        }
        if tiles.len() - i < size - current.len() {
            break;
        }
        current.push(tile);
        collect_of_size(&tiles[i + 1..], size, remaining - u32::from(tile), current, out);
        current.pop();
    }
}
