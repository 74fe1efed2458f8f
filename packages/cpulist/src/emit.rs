use itertools::Itertools;

use crate::Item;

/// Emits a [cpulist][crate] string from a sequence of items.
///
/// The items are sorted and deduplicated first, with consecutive runs collapsed into ranges.
/// An empty input produces an empty string.
///
/// ```
/// assert_eq!(cpulist::emit([0, 1, 2, 3, 7, 9, 10]), "0-3,7,9-10");
/// ```
pub fn emit<I>(items: I) -> String
where
    I: IntoIterator<Item = Item>,
{
    let mut ranges: Vec<(Item, Item)> = Vec::new();

    for item in items.into_iter().sorted_unstable().dedup() {
        match ranges.last_mut() {
            Some((_, end)) if end.checked_add(1) == Some(item) => *end = item,
            _ => ranges.push((item, item)),
        }
    }

    ranges
        .into_iter()
        .map(|(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{start}-{end}")
            }
        })
        .join(",")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn emit_smoke_test() {
        assert_eq!(emit([]), "");
        assert_eq!(emit([555]), "555");
        assert_eq!(emit([0, 1, 2, 3]), "0-3");
        assert_eq!(emit([3, 1, 2]), "1-3");
        assert_eq!(emit([0, 2, 4]), "0,2,4");
        assert_eq!(emit([0, 1, 1, 5, 6, 9]), "0-1,5-6,9");
    }

    #[test]
    fn emit_handles_max_item() {
        assert_eq!(emit([Item::MAX - 1, Item::MAX]), format!("{}-{}", Item::MAX - 1, Item::MAX));
    }
}
