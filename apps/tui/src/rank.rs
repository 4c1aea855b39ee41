use std::cmp::Ordering;

use crate::data::ShopRecord;
use crate::domain::CategoryFilter;

/// A shop as seen by one render: the record plus whether it made the top N
/// of the current category.
#[derive(Debug, Clone, Copy)]
pub struct RankedShop<'a> {
    pub shop: &'a ShopRecord,
    pub is_top: bool,
}

/// Filters by category, sorts by GMV descending (stable, so equal GMVs keep
/// their input order) and flags the first `top_n` rows.
pub fn rank_shops<'a>(
    shops: &'a [ShopRecord],
    category: &CategoryFilter,
    top_n: usize,
) -> Vec<RankedShop<'a>> {
    let mut filtered: Vec<&ShopRecord> = shops
        .iter()
        .filter(|shop| category.matches(&shop.category))
        .collect();

    filtered.sort_by(|a, b| gmv_descending(a.total_gmv, b.total_gmv));

    filtered
        .into_iter()
        .enumerate()
        .map(|(index, shop)| RankedShop {
            shop,
            is_top: index < top_n,
        })
        .collect()
}

// NaN sorts after every real value.
fn gmv_descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::data::ShopRecord;

    pub fn shop(name: &str, category: &str, gmv: f64) -> ShopRecord {
        ShopRecord {
            category: category.to_string(),
            unit_price: 10.0,
            total_gmv: gmv,
            related_creators: 1.0,
            related_videos: 1.0,
            selling_products: 1.0,
            shop_name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::shop;
    use super::*;

    fn names(ranked: &[RankedShop<'_>]) -> Vec<String> {
        ranked.iter().map(|r| r.shop.shop_name.clone()).collect()
    }

    #[test]
    fn top_two_of_three() {
        let shops = vec![
            shop("a", "Beauty", 500.0),
            shop("b", "Beauty", 300.0),
            shop("c", "Beauty", 100.0),
        ];
        let ranked = rank_shops(&shops, &CategoryFilter::All, 2);
        let flags: Vec<bool> = ranked.iter().map(|r| r.is_top).collect();
        assert_eq!(flags, vec![true, true, false]);
        assert_eq!(names(&ranked), vec!["a", "b", "c"]);
    }

    #[test]
    fn category_filter_keeps_only_matching_rows() {
        let shops = vec![
            shop("a", "Beauty", 10.0),
            shop("b", "Toys", 20.0),
            shop("c", "Beauty", 30.0),
        ];
        let ranked = rank_shops(&shops, &CategoryFilter::Only("Beauty".into()), 10);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|r| r.shop.category == "Beauty"));
        assert_eq!(names(&ranked), vec!["c", "a"]);
    }

    #[test]
    fn all_keeps_every_record() {
        let shops = vec![shop("a", "Beauty", 1.0), shop("b", "Toys", 2.0)];
        let ranked = rank_shops(&shops, &CategoryFilter::All, 0);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|r| !r.is_top));
    }

    #[test]
    fn ties_keep_input_order() {
        let shops = vec![
            shop("first", "Toys", 50.0),
            shop("second", "Toys", 50.0),
            shop("third", "Toys", 50.0),
        ];
        let ranked = rank_shops(&shops, &CategoryFilter::All, 2);
        assert_eq!(names(&ranked), vec!["first", "second", "third"]);
        assert!(ranked[0].is_top && ranked[1].is_top && !ranked[2].is_top);
    }

    #[test]
    fn top_flag_follows_the_filtered_set() {
        let shops = vec![
            shop("big-toy", "Toys", 900.0),
            shop("beauty-1", "Beauty", 200.0),
            shop("beauty-2", "Beauty", 100.0),
        ];
        let global = rank_shops(&shops, &CategoryFilter::All, 1);
        assert!(!global.iter().any(|r| r.shop.shop_name == "beauty-1" && r.is_top));

        let beauty = rank_shops(&shops, &CategoryFilter::Only("Beauty".into()), 1);
        assert!(beauty[0].is_top);
        assert_eq!(beauty[0].shop.shop_name, "beauty-1");
    }

    #[test]
    fn nan_gmv_sorts_last() {
        let shops = vec![shop("unknown", "Toys", f64::NAN), shop("known", "Toys", 1.0)];
        let ranked = rank_shops(&shops, &CategoryFilter::All, 1);
        assert_eq!(names(&ranked), vec!["known", "unknown"]);
    }

    #[test]
    fn empty_after_filtering_is_valid() {
        let shops = vec![shop("a", "Toys", 1.0)];
        let ranked = rank_shops(&shops, &CategoryFilter::Only("Garden".into()), 5);
        assert!(ranked.is_empty());
    }
}
