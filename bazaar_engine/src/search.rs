//! Multi-token, case-insensitive name matching for the admin directory lookups.
use crate::db_types::{Customer, Merchant};

/// Anything with a display name that the directory search can match against.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Customer {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Merchant {
    fn name(&self) -> &str {
        &self.owner_name
    }
}

impl Named for &str {
    fn name(&self) -> &str {
        self
    }
}

/// Yields the candidates whose name contains every whitespace-separated token of `query`, ignoring case.
/// The candidates' order is preserved. An empty query matches everything.
pub fn match_by_name<'a, T, I>(query: &str, candidates: I) -> impl Iterator<Item = T> + 'a
where
    T: Named + 'a,
    I: IntoIterator<Item = T>,
    I::IntoIter: 'a,
{
    let tokens = query.split_whitespace().map(str::to_lowercase).collect::<Vec<String>>();
    candidates.into_iter().filter(move |c| {
        let name = c.name().to_lowercase();
        tokens.iter().all(|t| name.contains(t.as_str()))
    })
}
