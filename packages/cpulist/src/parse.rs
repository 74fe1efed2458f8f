use crate::Item;

/// Parses a [cpulist][crate] and returns the numeric items in input order.
///
/// Ranges are expanded in ascending order. Duplicates are preserved, so `"1,0-1"` yields
/// `[1, 0, 1]`. Items that cannot be parsed (non-numeric values, incomplete or reversed ranges,
/// ranges with more than two parts) are skipped without affecting their siblings.
///
/// An empty or whitespace-only string returns an empty result.
///
/// See [package-level documentation][crate] for details.
#[must_use]
pub fn parse(cpulist: &str) -> Vec<Item> {
    cpulist
        .split(',')
        .filter_map(|part| parse_part(part).ok())
        .flatten()
        .collect()
}

/// Parses a [cpulist][crate] like [`parse()`], dropping every item that is not below `limit`.
///
/// Ranges are clamped before they are expanded, so a hostile or corrupted input such as
/// `0-4294967295` costs no more than `limit` items of memory.
///
/// ```
/// assert_eq!(cpulist::parse_below("0-2,6,1-4294967295", 4), vec![0, 1, 2, 1, 2, 3]);
/// ```
#[must_use]
pub fn parse_below(cpulist: &str, limit: Item) -> Vec<Item> {
    cpulist
        .split(',')
        .filter_map(|part| parse_bounds(part).ok().flatten())
        .flat_map(|(start, end_inc)| start..end_inc.saturating_add(1).min(limit))
        .collect()
}

/// Parses a single item of a [cpulist][crate] (the text between two commas).
///
/// Returns an empty list for an item that is empty or only whitespace.
///
/// # Errors
///
/// Returns [`Error::InvalidSyntax`][crate::Error::InvalidSyntax] if the item is neither a
/// non-negative integer nor an inclusive `start-end` range with `start <= end`.
pub fn parse_part(part: &str) -> crate::Result<Vec<Item>> {
    Ok(parse_bounds(part)?
        .map(|(start, end_inc)| (start..=end_inc).collect())
        .unwrap_or_default())
}

/// The inclusive bounds of one item, or `None` if the item is blank.
fn parse_bounds(part: &str) -> crate::Result<Option<(Item, Item)>> {
    let part = part.trim();

    if part.is_empty() {
        return Ok(None);
    }

    let mut bounds = part.split('-');

    match (bounds.next(), bounds.next(), bounds.next()) {
        (Some(single), None, None) => parse_single(single).map(|item| Some((item, item))),
        (Some(start), Some(end), None) => parse_range(start, end).map(Some),
        _ => Err(crate::Error::invalid(
            part,
            "range must consist of exactly two parts",
        )),
    }
}

fn parse_range(range_start: &str, range_end_inc: &str) -> crate::Result<(Item, Item)> {
    let range_start = parse_bound(range_start, "range start")?;
    let range_end_inc = parse_bound(range_end_inc, "range end")?;

    if range_start > range_end_inc {
        return Err(crate::Error::invalid(
            format!("{range_start}-{range_end_inc}"),
            "range start must be <= end",
        ));
    }

    Ok((range_start, range_end_inc))
}

fn parse_bound(bound: &str, what: &str) -> crate::Result<Item> {
    let bound = bound.trim();

    bound.parse::<Item>().map_err(|inner| {
        crate::Error::invalid(
            bound,
            format!("{what} could not be parsed as an integer: {inner}"),
        )
    })
}

fn parse_single(single_item_part: &str) -> crate::Result<Item> {
    single_item_part.parse::<Item>().map_err(|inner| {
        crate::Error::invalid(
            single_item_part,
            format!("part was not a range but could not be parsed as an integer either: {inner}"),
        )
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn parse_smoke_test() {
        assert_eq!(parse(""), Vec::<Item>::new());

        assert_eq!(parse("555"), vec![555]);

        assert_eq!(parse("0,1,2,3"), vec![0, 1, 2, 3]);

        assert_eq!(parse("0-3,7,9-11"), vec![0, 1, 2, 3, 7, 9, 10, 11]);

        assert_eq!(parse("0-0,1-1,3-3"), vec![0, 1, 3]);
    }

    #[test]
    fn range_is_inclusive_and_ascending() {
        assert_eq!(parse("4-8"), vec![4, 5, 6, 7, 8]);
    }

    #[test]
    fn mixed_items_keep_input_order() {
        assert_eq!(parse("9,2-4"), vec![9, 2, 3, 4]);
        assert_eq!(parse("2,3,1"), vec![2, 3, 1]);
    }

    #[test]
    fn duplicates_are_preserved() {
        assert_eq!(parse("1,0-1"), vec![1, 0, 1]);
    }

    #[test]
    fn whitespace_and_trailing_newline_are_ignored() {
        assert_eq!(parse("0-1,4\n"), vec![0, 1, 4]);
        assert_eq!(parse(" 2 , 5 - 6 "), vec![2, 5, 6]);
        assert_eq!(parse("\n"), Vec::<Item>::new());
        assert_eq!(parse("3,"), vec![3]);
    }

    #[test]
    fn malformed_items_are_skipped() {
        assert_eq!(parse("1,foo,3-4"), vec![1, 3, 4]);
        assert_eq!(parse("3-"), Vec::<Item>::new());
        assert_eq!(parse("-5"), Vec::<Item>::new());
        assert_eq!(parse("a-b-c"), Vec::<Item>::new());
        assert_eq!(parse("1-2-3,6"), vec![6]);
        assert_eq!(parse("5-3,0"), vec![0]);
    }

    #[test]
    fn parse_part_reports_problems() {
        parse_part("foo").unwrap_err();
        parse_part("123-foo").unwrap_err();
        parse_part("foo-123").unwrap_err();
        parse_part("2-1").unwrap_err();
        parse_part("1-2-3").unwrap_err();
        parse_part("-1").unwrap_err();

        assert_eq!(parse_part("  ").unwrap(), Vec::<Item>::new());
        assert_eq!(parse_part("7").unwrap(), vec![7]);
    }

    #[test]
    fn parse_below_drops_items_at_or_above_limit() {
        assert_eq!(parse_below("0-3,7,9-11", 8), vec![0, 1, 2, 3, 7]);
        assert_eq!(parse_below("5,1", 2), vec![1]);
        assert_eq!(parse_below("0-3", 0), Vec::<Item>::new());
    }

    #[test]
    fn parse_below_clamps_huge_range_without_expanding_it() {
        assert_eq!(parse_below("0-4294967295", 4), vec![0, 1, 2, 3]);
        assert_eq!(parse_below("4294967295", Item::MAX), Vec::<Item>::new());
        assert_eq!(
            parse_below("4294967290-4294967295", Item::MAX),
            vec![4_294_967_290, 4_294_967_291, 4_294_967_292, 4_294_967_293, 4_294_967_294]
        );
    }

    #[test]
    fn parse_below_skips_invalid_items() {
        assert_eq!(parse_below("0,foo,3-1,2", 8), vec![0, 2]);
    }
}
