use crate::contest::model::Platform;
use itertools::Itertools;
use std::collections::BTreeSet;

pub trait ToQueryParameter {
    fn to_query(&self) -> Vec<(String, String)>;
}

/// Query parameters of the upcoming/past contest list endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery<'a> {
    platforms: &'a BTreeSet<Platform>,
}

impl<'a> ListQuery<'a> {
    pub fn new(platforms: &'a BTreeSet<Platform>) -> Self {
        Self { platforms }
    }
}

impl ToQueryParameter for ListQuery<'_> {
    /// An empty platform set sends no `platforms` parameter at all.
    fn to_query(&self) -> Vec<(String, String)> {
        if self.platforms.is_empty() {
            return Vec::new();
        }

        vec![(
            String::from("platforms"),
            self.platforms.iter().map(Platform::as_str).join(","),
        )]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_with_no_platforms() {
        let platforms = BTreeSet::new();
        assert!(ListQuery::new(&platforms).to_query().is_empty());
    }

    #[test]
    fn test_platforms_in_canonical_order() {
        let platforms = BTreeSet::from([Platform::Leetcode, Platform::Codeforces]);
        assert_eq!(
            ListQuery::new(&platforms).to_query(),
            vec![(
                String::from("platforms"),
                String::from("codeforces,leetcode")
            )]
        );
    }

    #[test]
    fn test_all_platforms() {
        let platforms = BTreeSet::from(Platform::ALL);
        assert_eq!(
            ListQuery::new(&platforms).to_query(),
            vec![(
                String::from("platforms"),
                String::from("codeforces,codechef,leetcode")
            )]
        );
    }
}
