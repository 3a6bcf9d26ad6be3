//! Concert catalog
//!
//! Concerts by id. Purchase paths look concerts up through
//! [`ConcertCatalog::find_published`], which treats drafts as nonexistent.

use crate::types::{Concert, ConcertId, TicketingError};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct ConcertCatalog {
    concerts: BTreeMap<ConcertId, Concert>,
}

impl ConcertCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a concert, returning the previous entry
    pub fn insert(&mut self, concert: Concert) -> Option<Concert> {
        self.concerts.insert(concert.id, concert)
    }

    pub fn get(&self, id: ConcertId) -> Option<&Concert> {
        self.concerts.get(&id)
    }

    pub fn get_mut(&mut self, id: ConcertId) -> Option<&mut Concert> {
        self.concerts.get_mut(&id)
    }

    /// Look up a concert that is open for sale
    ///
    /// # Errors
    ///
    /// Returns `ConcertNotFound` whether the concert is missing or unpublished.
    pub fn find_published(&self, id: ConcertId) -> Result<&Concert, TicketingError> {
        self.concerts
            .get(&id)
            .filter(|concert| concert.is_published())
            .ok_or_else(|| TicketingError::concert_not_found(id))
    }

    /// Concerts in id order
    pub fn iter(&self) -> impl Iterator<Item = &Concert> {
        self.concerts.values()
    }

    pub fn len(&self) -> usize {
        self.concerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concerts.is_empty()
    }
}

impl FromIterator<Concert> for ConcertCatalog {
    fn from_iter<I: IntoIterator<Item = Concert>>(iter: I) -> Self {
        let mut catalog = ConcertCatalog::new();
        for concert in iter {
            catalog.insert(concert);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn concert(id: ConcertId, published: bool) -> Concert {
        let date = NaiveDate::from_ymd_opt(2026, 12, 1)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();
        let mut concert = Concert::new(id, "The Red Chord", date, 3250, 10);
        if published {
            concert.published_at = Some(Utc::now());
        }
        concert
    }

    #[test]
    fn test_published_concerts_are_found() {
        let catalog: ConcertCatalog = vec![concert(1, true)].into_iter().collect();

        let found = catalog.find_published(1).unwrap();

        assert_eq!(found.title, "The Red Chord");
    }

    #[test]
    fn test_unpublished_concerts_are_not_found() {
        let catalog: ConcertCatalog = vec![concert(1, false)].into_iter().collect();

        assert_eq!(
            catalog.find_published(1),
            Err(TicketingError::concert_not_found(1))
        );
        assert!(catalog.get(1).is_some());
    }

    #[test]
    fn test_missing_concerts_are_not_found() {
        let catalog = ConcertCatalog::new();

        assert_eq!(
            catalog.find_published(9),
            Err(TicketingError::concert_not_found(9))
        );
    }

    #[test]
    fn test_iteration_is_in_id_order() {
        let catalog: ConcertCatalog = vec![concert(3, true), concert(1, false), concert(2, true)]
            .into_iter()
            .collect();

        let ids: Vec<ConcertId> = catalog.iter().map(|concert| concert.id).collect();

        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(catalog.len(), 3);
    }
}
