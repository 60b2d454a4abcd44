use tourney_common::data::{LeaderboardEntry, Registration};

/// Rows that can be narrowed by the free-text search box.
pub(crate) trait Searchable {
    fn search_fields(&self) -> [&str; 3];
}

impl Searchable for LeaderboardEntry {
    fn search_fields(&self) -> [&str; 3] {
        [&self.registration_id, &self.team_name, &self.leader_name]
    }
}

impl Searchable for Registration {
    fn search_fields(&self) -> [&str; 3] {
        [&self.registration_id, &self.team_name, &self.leader_name]
    }
}

/// Case-insensitive substring match; an empty term matches everything.
pub(crate) fn matches_search<T: Searchable>(item: &T, term: &str) -> bool {
    let term = term.to_lowercase();
    item.search_fields().iter().any(|field| field.to_lowercase().contains(&term))
}

pub(crate) fn filter_by_search<T: Searchable + Clone>(items: &[T], term: &str) -> Vec<T> {
    items.iter().filter(|item| matches_search(*item, term)).cloned().collect()
}
