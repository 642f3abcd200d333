use crate::catalog::{SpawnCatalog, SpawnDefinition};
use rand::Rng;

/// Pick the definitions that spawn in a chunk at `distance` from the origin.
///
/// Definitions are visited in catalog order and each surviving one gets a single
/// draw in `[0, 1)`, passing when the draw is below its chance. The first passing
/// space-priority definition discards earlier results, after which only priority
/// definitions are considered. A priority result is reduced to one element chosen
/// uniformly, so a chunk never holds more than one priority definition and never
/// mixes priority with non-priority content.
pub fn choose<'c, R: Rng + ?Sized>(
    catalog: &'c SpawnCatalog,
    distance: f32,
    exclude_priority: bool,
    rng: &mut R,
) -> Vec<&'c SpawnDefinition> {
    let mut chosen = Vec::new();
    let mut priority_mode = false;

    for definition in catalog.iter() {
        if definition.ignore
            || (exclude_priority && definition.space_priority)
            || (priority_mode && !definition.space_priority)
        {
            continue;
        }

        let roll: f32 = rng.gen();
        if roll >= definition.chance_at(distance) {
            continue;
        }

        if definition.space_priority && !priority_mode {
            chosen.clear();
            priority_mode = true;
        }
        chosen.push(definition);
    }

    if priority_mode && chosen.len() > 1 {
        let keep = rng.gen_range(0..chosen.len());
        let pick = chosen.swap_remove(keep);
        chosen.clear();
        chosen.push(pick);
    }
    chosen
}
