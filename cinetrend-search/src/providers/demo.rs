//! Demo provider implementation for offline development.

use async_trait::async_trait;

use super::CatalogProvider;
use crate::errors::CatalogError;
use crate::types::{CastMember, CatalogItem, Extra, Genre, MovieDetails, Video};

/// Demo provider for development without network access.
///
/// Serves a small fixed catalog. Search is a case-insensitive title match,
/// popular returns everything in catalog order.
#[derive(Debug)]
pub struct DemoCatalog {
    movies: Vec<MovieDetails>,
}

impl Default for DemoCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoCatalog {
    /// Creates the catalog with its built-in movies.
    pub fn new() -> Self {
        Self {
            movies: vec![
                demo_movie(
                    603,
                    "The Matrix",
                    "1999-03-30",
                    8.2,
                    136,
                    "Welcome to the Real World.",
                    &[(2, "Keanu Reeves", "Neo"), (3, "Carrie-Anne Moss", "Trinity")],
                ),
                demo_movie(
                    604,
                    "The Matrix Reloaded",
                    "2003-05-15",
                    7.1,
                    138,
                    "Free your mind.",
                    &[(2, "Keanu Reeves", "Neo")],
                ),
                demo_movie(
                    550,
                    "Fight Club",
                    "1999-10-15",
                    8.4,
                    139,
                    "Mischief. Mayhem. Soap.",
                    &[(819, "Edward Norton", "Narrator"), (287, "Brad Pitt", "Tyler Durden")],
                ),
                demo_movie(
                    155,
                    "The Dark Knight",
                    "2008-07-16",
                    8.5,
                    152,
                    "Why So Serious?",
                    &[(3894, "Christian Bale", "Bruce Wayne"), (1810, "Heath Ledger", "Joker")],
                ),
                demo_movie(
                    13,
                    "Forrest Gump",
                    "1994-06-23",
                    8.5,
                    142,
                    "The world will never be the same once you've seen it through the eyes of Forrest Gump.",
                    &[(31, "Tom Hanks", "Forrest Gump")],
                ),
            ],
        }
    }
}

fn demo_movie(
    id: u64,
    title: &str,
    release_date: &str,
    vote_average: f32,
    runtime: u32,
    tagline: &str,
    cast: &[(u64, &str, &str)],
) -> MovieDetails {
    MovieDetails {
        item: CatalogItem {
            id,
            title: title.to_string(),
            poster_path: Some(format!("/demo-{id}.jpg")),
            vote_average: Some(vote_average),
            release_date: Some(release_date.to_string()),
            original_language: "en".to_string(),
        },
        backdrop_path: None,
        tagline: Some(tagline.to_string()),
        overview: Some(format!("Demo overview for {title}.")),
        runtime: Some(runtime),
        status: Some("Released".to_string()),
        genres: vec![Genre {
            id: 28,
            name: "Action".to_string(),
        }],
        budget: None,
        revenue: None,
        homepage: None,
        production_companies: Vec::new(),
        production_countries: Vec::new(),
        cast: Some(
            cast.iter()
                .map(|(id, name, character)| CastMember {
                    id: *id,
                    name: name.to_string(),
                    character: Some(character.to_string()),
                    profile_path: None,
                })
                .collect(),
        ),
        videos: Some(vec![Video {
            key: format!("demo{id}"),
            name: format!("{title} Trailer"),
            site: "YouTube".to_string(),
            kind: "Trailer".to_string(),
        }]),
    }
}

#[async_trait]
impl CatalogProvider for DemoCatalog {
    async fn search(&self, term: &str) -> Result<Vec<CatalogItem>, CatalogError> {
        let needle = term.trim().to_lowercase();
        Ok(self
            .movies
            .iter()
            .filter(|movie| movie.item.title.to_lowercase().contains(&needle))
            .map(|movie| movie.item.clone())
            .collect())
    }

    async fn browse_popular(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        Ok(self.movies.iter().map(|movie| movie.item.clone()).collect())
    }

    async fn fetch_by_id(&self, id: u64, extras: &[Extra]) -> Result<MovieDetails, CatalogError> {
        let mut details = self
            .movies
            .iter()
            .find(|movie| movie.item.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound { id })?;

        if !extras.contains(&Extra::Cast) {
            details.cast = None;
        }
        if !extras.contains(&Extra::Media) {
            details.videos = None;
        }
        Ok(details)
    }
}
