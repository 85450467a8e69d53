//! Deterministic slot ordering for ranking comparisons.

/// Device type of a slot name: the part before the first `.`.
///
/// `cuda.shares` and `cuda.device` both belong to `cuda`; `cpu` is its own type.
pub fn slot_device_type(slot: &str) -> &str {
    slot.split_once('.').map_or(slot, |(device, _)| device)
}

/// Orders slot names by a priority list.
///
/// A name ranks at the position of the first priority entry equal to it or to
/// its device type. Names not covered by the list come after every covered
/// name. Ties are broken alphabetically and duplicates are removed.
pub fn order_slots_by_priority<'a, I, S>(names: I, priority: &[S]) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
    S: AsRef<str>,
{
    let rank = |name: &str| {
        priority
            .iter()
            .position(|entry| {
                let entry = entry.as_ref();
                entry == name || entry == slot_device_type(name)
            })
            .unwrap_or(priority.len())
    };

    let mut ranked: Vec<(usize, &str)> = names.into_iter().map(|n| (rank(n), n)).collect();
    ranked.sort_unstable();
    ranked.dedup();
    ranked.into_iter().map(|(_, n)| n.to_string()).collect()
}
