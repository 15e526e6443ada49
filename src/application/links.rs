//! Page-link strips and "Viewing X - Y of Z" summaries.
//!
//! Both are pure functions of the page number, page size and item total.
//! Building URLs is left to whoever renders the links.

use serde::Serialize;

/// Pages always shown at each end of the strip.
const END_SIZE: u64 = 1;
/// Pages shown on each side of the current page.
const MID_SIZE: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PageLink {
    Previous { page: u64 },
    Number { page: u64, current: bool },
    Gap,
    Next { page: u64 },
}

/// Link strip for `current` out of `total_pages`; empty when there is at most one page.
pub fn page_links(current: u64, total_pages: u64) -> Vec<PageLink> {
    if total_pages < 2 {
        return Vec::new();
    }

    let mut links = Vec::new();
    if current > 1 {
        links.push(PageLink::Previous {
            page: (current - 1).min(total_pages),
        });
    }

    let mut gap_allowed = false;
    for page in 1..=total_pages {
        let near_current =
            page >= current.saturating_sub(MID_SIZE) && page <= current.saturating_add(MID_SIZE);
        if page == current {
            links.push(PageLink::Number {
                page,
                current: true,
            });
            gap_allowed = true;
        } else if page <= END_SIZE || near_current || page > total_pages - END_SIZE {
            links.push(PageLink::Number {
                page,
                current: false,
            });
            gap_allowed = true;
        } else if gap_allowed {
            links.push(PageLink::Gap);
            gap_allowed = false;
        }
    }

    if current < total_pages {
        links.push(PageLink::Next { page: current + 1 });
    }

    links
}

/// 1-indexed inclusive range of positions a page covers, or `None` past the end.
pub fn item_range(page: u64, per_page: u64, total_items: u64) -> Option<(u64, u64)> {
    let from = page
        .saturating_sub(1)
        .saturating_mul(per_page)
        .saturating_add(1);
    if from > total_items {
        return None;
    }
    let to = from
        .saturating_add(per_page.saturating_sub(1))
        .min(total_items);
    Some((from, to))
}

/// Human summary such as `Viewing 21 - 40 of 1,204 topics`.
pub fn viewing_summary(page: u64, per_page: u64, total_items: u64, tag: Option<&str>) -> String {
    let suffix = tag
        .map(|tag| format!(" matching tag \"{tag}\""))
        .unwrap_or_default();

    match (total_items, item_range(page, per_page, total_items)) {
        (0, _) => format!("Viewing 0 topics{suffix}"),
        (1, Some(_)) => format!("Viewing 1 topic{suffix}"),
        (total, Some((from, to))) => format!(
            "Viewing {} - {} of {} topics{suffix}",
            format_count(from),
            format_count(to),
            format_count(total)
        ),
        (total, None) => format!("Viewing 0 of {} topics{suffix}", format_count(total)),
    }
}

/// Group digits in threes: `1234567` becomes `1,234,567`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(current: u64, total_pages: u64) -> String {
        page_links(current, total_pages)
            .iter()
            .map(|link| match link {
                PageLink::Previous { .. } => "<".to_string(),
                PageLink::Number {
                    page,
                    current: true,
                } => format!("[{page}]"),
                PageLink::Number { page, .. } => page.to_string(),
                PageLink::Gap => "..".to_string(),
                PageLink::Next { .. } => ">".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn single_page_has_no_links() {
        assert!(page_links(1, 0).is_empty());
        assert!(page_links(1, 1).is_empty());
    }

    #[test]
    fn strips_collapse_distant_pages() {
        insta::assert_snapshot!(strip(1, 2), @"[1] 2 >");
        insta::assert_snapshot!(strip(1, 9), @"[1] 2 .. 9 >");
        insta::assert_snapshot!(strip(5, 9), @"< 1 .. 4 [5] 6 .. 9 >");
        insta::assert_snapshot!(strip(3, 9), @"< 1 2 [3] 4 .. 9 >");
        insta::assert_snapshot!(strip(9, 9), @"< 1 .. 8 [9]");
    }

    #[test]
    fn previous_link_points_inside_the_range_when_page_is_past_the_end() {
        assert_eq!(
            page_links(7, 3).first(),
            Some(&PageLink::Previous { page: 3 })
        );
        assert!(!page_links(7, 3).contains(&PageLink::Next { page: 8 }));
    }

    #[test]
    fn summaries_follow_topic_counts() {
        assert_eq!(viewing_summary(1, 20, 0, None), "Viewing 0 topics");
        assert_eq!(viewing_summary(1, 20, 1, None), "Viewing 1 topic");
        assert_eq!(viewing_summary(1, 20, 23, None), "Viewing 1 - 20 of 23 topics");
        assert_eq!(viewing_summary(2, 20, 23, None), "Viewing 21 - 23 of 23 topics");
        assert_eq!(viewing_summary(5, 20, 23, None), "Viewing 0 of 23 topics");
        assert_eq!(
            viewing_summary(51, 20, 1204, Some("rust")),
            "Viewing 1,001 - 1,020 of 1,204 topics matching tag \"rust\""
        );
    }

    #[test]
    fn counts_are_grouped_in_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }
}
