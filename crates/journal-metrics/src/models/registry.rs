//! Works registry (Crossref) record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::de;

/// Bibliographic metadata of one work from the works registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryWork {
    /// DOI as registered.
    #[serde(rename = "DOI", default)]
    pub doi: Option<String>,

    /// Title variants; the first one is the display title.
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub title: Vec<String>,

    /// Authors in byline order.
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub author: Vec<RegistryAuthor>,

    /// Deposited reference list.
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub reference: Vec<Reference>,

    /// Number of references declared by the publisher.
    #[serde(default)]
    pub reference_count: Option<u32>,

    /// Journal (container) title variants.
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub container_title: Vec<String>,

    /// ISSNs of the container.
    #[serde(rename = "ISSN", default, deserialize_with = "de::one_or_many")]
    pub issn: Vec<String>,

    /// Publisher name.
    #[serde(default)]
    pub publisher: Option<String>,

    /// Earliest publication date.
    #[serde(default)]
    pub published: Option<DateParts>,

    /// Registration date.
    #[serde(default)]
    pub created: Option<DateParts>,

    /// Work type (journal-article, book-chapter, ...).
    #[serde(rename = "type", default)]
    pub work_type: Option<String>,
}

impl RegistryWork {
    /// First title, if any.
    #[must_use]
    pub fn title_text(&self) -> Option<&str> {
        self.title.first().map(String::as_str).filter(|t| !t.trim().is_empty())
    }

    /// First container title, if any.
    #[must_use]
    pub fn container_title_text(&self) -> Option<&str> {
        self.container_title.first().map(String::as_str).filter(|t| !t.trim().is_empty())
    }

    /// Publisher, if non-empty.
    #[must_use]
    pub fn publisher_text(&self) -> Option<&str> {
        self.publisher.as_deref().filter(|p| !p.trim().is_empty())
    }

    /// Publication year from `published`.
    #[must_use]
    pub fn published_year(&self) -> Option<i32> {
        self.published.as_ref().and_then(DateParts::year)
    }

    /// Publication month from `published`, when deposited.
    #[must_use]
    pub fn published_month(&self) -> Option<u32> {
        self.published.as_ref().and_then(DateParts::month)
    }

    /// Publication date from `published`; missing month/day default to 1.
    #[must_use]
    pub fn published_date(&self) -> Option<NaiveDate> {
        self.published.as_ref().and_then(DateParts::to_date)
    }

    /// Registration year from `created`.
    #[must_use]
    pub fn created_year(&self) -> Option<i32> {
        self.created.as_ref().and_then(DateParts::year)
    }

    /// Authors formatted as `Given Family`.
    #[must_use]
    pub fn author_full_names(&self) -> Vec<String> {
        self.author.iter().filter_map(RegistryAuthor::full_name).collect()
    }
}

/// One author of a registry work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryAuthor {
    /// Given name(s).
    #[serde(default)]
    pub given: Option<String>,

    /// Family name.
    #[serde(default)]
    pub family: Option<String>,

    /// Organization or unsplit name.
    #[serde(default)]
    pub name: Option<String>,
}

impl RegistryAuthor {
    /// `Given Family`, if either part is present.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        let given = self.given.as_deref().unwrap_or("").trim();
        let family = self.family.as_deref().unwrap_or("").trim();
        let joined = format!("{given} {family}");
        let joined = joined.trim();
        if joined.is_empty() {
            self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()).map(str::to_string)
        } else {
            Some(joined.to_string())
        }
    }

    /// `Family I.N.` with the family name title-cased; `Unknown` when nothing
    /// usable was deposited.
    #[must_use]
    pub fn short_name(&self) -> String {
        let family = title_case(self.family.as_deref().unwrap_or("").trim());
        let initials: String = self
            .given
            .as_deref()
            .unwrap_or("")
            .chars()
            .filter(|c| c.is_uppercase())
            .map(|c| format!("{c}."))
            .collect();

        match (family.is_empty(), initials.is_empty()) {
            (false, false) => format!("{family} {initials}"),
            (false, true) => family,
            _ => "Unknown".to_string(),
        }
    }
}

/// One deposited reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reference {
    /// DOI of the cited work.
    #[serde(rename = "DOI", default)]
    pub doi: Option<String>,

    /// Year as deposited (usually a string).
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub year: Option<String>,

    /// Free-text citation.
    #[serde(default)]
    pub unstructured: Option<String>,
}

impl Reference {
    /// Deposited year, if it parses as an integer.
    #[must_use]
    pub fn year_value(&self) -> Option<i32> {
        self.year.as_deref()?.trim().parse().ok()
    }

    /// Non-empty DOI.
    #[must_use]
    pub fn doi_text(&self) -> Option<&str> {
        self.doi.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }
}

/// Registry `{"date-parts": [[y, m, d]]}` value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateParts {
    /// Nested date parts; only the first entry is meaningful.
    #[serde(rename = "date-parts", default, deserialize_with = "de::null_as_default")]
    pub date_parts: Vec<Vec<Option<i32>>>,
}

impl DateParts {
    /// Build from explicit parts.
    #[must_use]
    pub fn from_parts(parts: &[i32]) -> Self {
        Self { date_parts: vec![parts.iter().copied().map(Some).collect()] }
    }

    fn part(&self, index: usize) -> Option<i32> {
        self.date_parts.first()?.get(index).copied().flatten()
    }

    /// Year, when present and positive.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.part(0).filter(|y| *y > 0)
    }

    /// Month (1–12), when present.
    #[must_use]
    pub fn month(&self) -> Option<u32> {
        self.part(1).and_then(|m| u32::try_from(m).ok()).filter(|m| (1..=12).contains(m))
    }

    /// Calendar date; missing month/day default to 1, invalid dates are `None`.
    #[must_use]
    pub fn to_date(&self) -> Option<NaiveDate> {
        let year = self.year()?;
        let month = self.part(1).and_then(|m| u32::try_from(m).ok()).unwrap_or(1);
        let day = self.part(2).and_then(|d| u32::try_from(d).ok()).unwrap_or(1);
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Capitalize the first letter of each alphabetic run, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_work_minimal() {
        let work: RegistryWork = serde_json::from_str(r#"{"DOI": "10.1000/abc"}"#).unwrap();
        assert_eq!(work.doi.as_deref(), Some("10.1000/abc"));
        assert!(work.title_text().is_none());
        assert!(work.published_year().is_none());
        assert!(work.reference.is_empty());
    }

    #[test]
    fn test_registry_work_full() {
        let json = r#"{
            "DOI": "10.1000/abc",
            "title": ["A Study"],
            "author": [{"given": "Ada Marie", "family": "lovelace"}],
            "reference": [{"DOI": "10.1/x", "year": "2010"}, {"unstructured": "Smith 1999", "year": 1999}],
            "container-title": ["Journal of Things"],
            "ISSN": ["1234-5678"],
            "publisher": "Acme",
            "published": {"date-parts": [[2021, 3, 15]]},
            "created": {"date-parts": [[2021, 2]]},
            "type": "journal-article",
            "reference-count": 2
        }"#;
        let work: RegistryWork = serde_json::from_str(json).unwrap();

        assert_eq!(work.title_text(), Some("A Study"));
        assert_eq!(work.container_title_text(), Some("Journal of Things"));
        assert_eq!(work.published_year(), Some(2021));
        assert_eq!(work.published_month(), Some(3));
        assert_eq!(work.published_date(), NaiveDate::from_ymd_opt(2021, 3, 15));
        assert_eq!(work.created_year(), Some(2021));
        assert_eq!(work.reference[0].year_value(), Some(2010));
        assert_eq!(work.reference[1].year_value(), Some(1999));
        assert_eq!(work.author[0].short_name(), "Lovelace A.M.");
        assert_eq!(work.author_full_names(), vec!["Ada Marie lovelace"]);
    }

    #[test]
    fn test_date_parts_defaults_and_nulls() {
        let d = DateParts::from_parts(&[2020]);
        assert_eq!(d.to_date(), NaiveDate::from_ymd_opt(2020, 1, 1));
        assert!(d.month().is_none());

        let nulls: DateParts = serde_json::from_str(r#"{"date-parts": [[null]]}"#).unwrap();
        assert!(nulls.year().is_none());
        assert!(nulls.to_date().is_none());

        let invalid = DateParts::from_parts(&[2021, 2, 30]);
        assert!(invalid.to_date().is_none());
    }

    #[test]
    fn test_short_name_fallbacks() {
        let only_family = RegistryAuthor { family: Some("o'neil".to_string()), ..Default::default() };
        assert_eq!(only_family.short_name(), "O'Neil");

        let nothing = RegistryAuthor::default();
        assert_eq!(nothing.short_name(), "Unknown");
        assert!(nothing.full_name().is_none());
    }

    #[test]
    fn test_reference_year_not_numeric() {
        let r = Reference { year: Some("2015a".to_string()), ..Default::default() };
        assert!(r.year_value().is_none());
    }
}
