//! Data types for catalog records.

use serde::{Deserialize, Serialize};

/// Movie record as returned by a catalog list endpoint.
///
/// Snapshot of upstream data; never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Catalog identifier
    pub id: u64,
    /// Display title
    pub title: String,
    /// Poster image path, relative to the image CDN
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Average rating out of ten
    #[serde(default)]
    pub vote_average: Option<f32>,
    /// Release date as `YYYY-MM-DD`
    #[serde(default)]
    pub release_date: Option<String>,
    /// ISO 639-1 code of the original language
    #[serde(default)]
    pub original_language: String,
}

impl CatalogItem {
    /// Year part of the release date, if the catalog supplied one.
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|date| date.split('-').next())
            .filter(|year| !year.is_empty())
    }

    /// Rating rounded to one decimal, or "N/A".
    pub fn rating_label(&self) -> String {
        match self.vote_average {
            Some(rating) => format!("{rating:.1}"),
            None => "N/A".to_string(),
        }
    }
}

/// Optional sections requested alongside a detail fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extra {
    /// Cast list
    Cast,
    /// Trailers and other videos
    Media,
}

impl Extra {
    /// Name of the section in the upstream `append_to_response` parameter.
    pub fn upstream_name(self) -> &'static str {
        match self {
            Extra::Cast => "credits",
            Extra::Media => "videos",
        }
    }
}

/// Full detail record for one movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    /// Listing fields shared with search results
    #[serde(flatten)]
    pub item: CatalogItem,
    /// Backdrop image path
    pub backdrop_path: Option<String>,
    /// Marketing tagline
    pub tagline: Option<String>,
    /// Plot summary
    pub overview: Option<String>,
    /// Running time in minutes
    pub runtime: Option<u32>,
    /// Release status, e.g. "Released"
    pub status: Option<String>,
    /// Genres in catalog order
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Budget in US dollars
    pub budget: Option<u64>,
    /// Box office revenue in US dollars
    pub revenue: Option<u64>,
    /// Official site
    pub homepage: Option<String>,
    /// Producing companies
    #[serde(default)]
    pub production_companies: Vec<Company>,
    /// Producing countries
    #[serde(default)]
    pub production_countries: Vec<Country>,
    /// Present only when `Extra::Cast` was requested
    pub cast: Option<Vec<CastMember>>,
    /// Present only when `Extra::Media` was requested
    pub videos: Option<Vec<Video>>,
}

impl MovieDetails {
    /// First `limit` cast members in billing order.
    pub fn top_cast(&self, limit: usize) -> &[CastMember] {
        match &self.cast {
            Some(cast) => &cast[..cast.len().min(limit)],
            None => &[],
        }
    }

    /// First YouTube trailer, if any.
    pub fn trailer(&self) -> Option<&Video> {
        self.videos
            .as_deref()?
            .iter()
            .find(|video| video.kind == "Trailer" && video.site == "YouTube")
    }

    /// Comma separated production countries, or "N/A".
    pub fn countries_label(&self) -> String {
        if self.production_countries.is_empty() {
            return "N/A".to_string();
        }
        self.production_countries
            .iter()
            .map(|country| country.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Catalog genre tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Genre identifier
    pub id: u64,
    /// Genre name
    pub name: String,
}

/// Production company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Company identifier
    pub id: u64,
    /// Company name
    pub name: String,
    /// Logo image path
    #[serde(default)]
    pub logo_path: Option<String>,
}

/// Production country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// ISO 3166-1 alpha-2 code
    #[serde(default)]
    pub iso_3166_1: String,
    /// Country name
    pub name: String,
}

/// One billed cast member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    /// Person identifier
    pub id: u64,
    /// Actor name
    pub name: String,
    /// Character played
    #[serde(default)]
    pub character: Option<String>,
    /// Profile photo path
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// Video attached to a movie, such as a trailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Host-specific video key
    pub key: String,
    /// Video title
    pub name: String,
    /// Hosting site, e.g. "YouTube"
    pub site: String,
    /// Video type, e.g. "Trailer"
    #[serde(rename = "type")]
    pub kind: String,
}

impl Video {
    /// Watch URL for videos hosted on YouTube.
    pub fn watch_url(&self) -> Option<String> {
        (self.site == "YouTube").then(|| format!("https://www.youtube.com/watch?v={}", self.key))
    }
}

/// Formats a whole-dollar amount as `$1,234,567`, or "N/A" for zero/unknown.
pub fn format_money(amount: Option<u64>) -> String {
    let amount = match amount {
        Some(amount) if amount > 0 => amount,
        _ => return "N/A".to_string(),
    };

    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("${grouped}")
}
