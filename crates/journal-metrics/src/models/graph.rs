//! Scholarly graph (OpenAlex) record.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::de;
use super::identifiers::normalize_doi;

/// Citation-graph metadata of one work from the scholarly graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphWork {
    /// Graph work URL, e.g. `https://openalex.org/W2741809807`.
    #[serde(default)]
    pub id: Option<String>,

    /// DOI in URL form.
    #[serde(default)]
    pub doi: Option<String>,

    /// Work title.
    #[serde(default)]
    pub title: Option<String>,

    /// Display name (usually the title).
    #[serde(default)]
    pub display_name: Option<String>,

    /// Publication year.
    #[serde(default, deserialize_with = "de::lenient_year")]
    pub publication_year: Option<i32>,

    /// Publication date (`YYYY-MM-DD`).
    #[serde(default)]
    pub publication_date: Option<String>,

    /// Number of works citing this one.
    #[serde(default, deserialize_with = "de::lenient_count")]
    pub cited_by_count: u64,

    /// Legacy host venue block.
    #[serde(default)]
    pub host_venue: Option<Venue>,

    /// Primary location (current schema).
    #[serde(default)]
    pub primary_location: Option<Location>,

    /// Thematic concepts with relevance scores.
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub concepts: Vec<Concept>,

    /// Open access status.
    #[serde(default)]
    pub open_access: Option<OpenAccess>,

    /// Authors with institutions.
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub authorships: Vec<Authorship>,

    /// Work type (article, review, ...).
    #[serde(rename = "type", default)]
    pub work_type: Option<String>,
}

impl GraphWork {
    /// Short graph id (last path segment of `id`).
    #[must_use]
    pub fn work_id(&self) -> Option<&str> {
        self.id.as_deref()?.rsplit('/').next().filter(|s| !s.is_empty())
    }

    /// DOI normalized to `10.…` form.
    #[must_use]
    pub fn normalized_doi(&self) -> Option<String> {
        normalize_doi(self.doi.as_deref()?)
    }

    /// Title, falling back to the display name.
    #[must_use]
    pub fn title_text(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or(self.display_name.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    /// Citation count.
    #[must_use]
    pub const fn citations(&self) -> u64 {
        self.cited_by_count
    }

    /// Whether the work is open access; unknown counts as closed.
    #[must_use]
    pub fn is_oa(&self) -> bool {
        self.open_access.as_ref().and_then(|oa| oa.is_oa).unwrap_or(false)
    }

    /// Venue of the work: the host venue, else the primary location's source.
    #[must_use]
    pub fn venue(&self) -> Option<&Venue> {
        self.host_venue
            .as_ref()
            .filter(|v| !v.is_empty())
            .or_else(|| self.primary_location.as_ref()?.source.as_ref())
    }

    /// All ISSNs of the venue (including the linking ISSN).
    #[must_use]
    pub fn venue_issns(&self) -> Vec<&str> {
        self.venue().map(Venue::all_issns).unwrap_or_default()
    }

    /// Author display names in byline order; missing names become `Unknown`.
    #[must_use]
    pub fn author_names(&self) -> Vec<&str> {
        self.authorships.iter().map(Authorship::author_name).collect()
    }

    /// Author ids, skipping authorships without one.
    #[must_use]
    pub fn author_ids(&self) -> Vec<&str> {
        self.authorships
            .iter()
            .filter_map(|a| a.author.as_ref()?.id.as_deref())
            .filter(|id| !id.is_empty())
            .collect()
    }

    /// Distinct institution names across all authorships.
    #[must_use]
    pub fn affiliations(&self) -> BTreeSet<&str> {
        self.authorships
            .iter()
            .flat_map(|a| a.institutions.iter())
            .filter_map(|i| i.display_name.as_deref())
            .filter(|n| !n.is_empty())
            .collect()
    }

    /// Distinct upper-cased country codes across all authorships.
    #[must_use]
    pub fn countries(&self) -> BTreeSet<String> {
        self.authorships
            .iter()
            .flat_map(|a| a.institutions.iter())
            .filter_map(|i| i.country_code.as_deref())
            .filter(|c| !c.is_empty())
            .map(str::to_uppercase)
            .collect()
    }

    /// Concepts sorted by descending score.
    #[must_use]
    pub fn concepts_by_score(&self) -> Vec<&Concept> {
        let mut concepts: Vec<&Concept> = self.concepts.iter().collect();
        concepts.sort_by(|a, b| b.score_value().total_cmp(&a.score_value()));
        concepts
    }
}

/// Venue description shared by `host_venue` and `primary_location.source`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Venue {
    /// Venue name.
    #[serde(default)]
    pub display_name: Option<String>,

    /// ISSNs (a bare string is accepted).
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub issn: Vec<String>,

    /// Linking ISSN.
    #[serde(default)]
    pub issn_l: Option<String>,

    /// Publisher (legacy host venue).
    #[serde(default)]
    pub publisher: Option<String>,

    /// Publisher (current source schema).
    #[serde(default)]
    pub host_organization_name: Option<String>,
}

impl Venue {
    fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.issn.is_empty() && self.issn_l.is_none()
    }

    /// Every ISSN, linking ISSN last, without duplicates.
    #[must_use]
    pub fn all_issns(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.issn.iter().map(String::as_str).collect();
        if let Some(l) = self.issn_l.as_deref() {
            if !out.contains(&l) {
                out.push(l);
            }
        }
        out.retain(|s| !s.is_empty());
        out
    }

    /// Venue name, if non-empty.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.display_name.as_deref().filter(|n| !n.is_empty())
    }

    /// Publisher name from either schema.
    #[must_use]
    pub fn publisher_name(&self) -> Option<&str> {
        self.publisher
            .as_deref()
            .or(self.host_organization_name.as_deref())
            .filter(|p| !p.is_empty())
    }
}

/// Location block; only the source is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    /// Hosting source.
    #[serde(default)]
    pub source: Option<Venue>,
}

/// A concept tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Concept {
    /// Concept label.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Relevance score in [0, 1].
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub score: Option<f64>,
}

impl Concept {
    /// Score or 0.
    #[must_use]
    pub fn score_value(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }

    /// Non-empty label.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.display_name.as_deref().filter(|n| !n.is_empty())
    }
}

/// Open access block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAccess {
    /// Whether a free copy exists.
    #[serde(default, deserialize_with = "de::lenient_bool")]
    pub is_oa: Option<bool>,
}

/// One author of a graph work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Authorship {
    /// Author identity.
    #[serde(default)]
    pub author: Option<AuthorInfo>,

    /// Affiliated institutions.
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub institutions: Vec<Institution>,
}

impl Authorship {
    /// Display name or `Unknown`.
    #[must_use]
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .and_then(|a| a.display_name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown")
    }
}

/// Author identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorInfo {
    /// Graph author id.
    #[serde(default)]
    pub id: Option<String>,

    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Institution of an authorship.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Institution {
    /// Institution name.
    #[serde(default)]
    pub display_name: Option<String>,

    /// ISO country code.
    #[serde(default)]
    pub country_code: Option<String>,
}
