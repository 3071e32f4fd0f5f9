//! Age of the references cited by analyzed works.

use serde::Serialize;

use super::{mean, median, percentile, round_to};
use crate::cache::MetadataSnapshot;
use crate::models::{MIN_YEAR, Reference, WorkRecord, normalize_doi};

/// Reference age distribution in years.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceAge {
    /// Median age, whole years.
    pub median: Option<i64>,
    /// Mean age, 1 decimal.
    pub mean: Option<f64>,
    /// 25th percentile, whole years.
    pub p25: Option<i64>,
    /// 75th percentile, whole years.
    pub p75: Option<i64>,
    /// References with a resolvable year.
    pub count: usize,
}

/// Year of a reference: the deposited year when plausible, otherwise the
/// publication year of its DOI if that record was fetched during the run.
fn reference_year(reference: &Reference, snapshot: &MetadataSnapshot, current_year: i32) -> Option<i32> {
    let plausible = MIN_YEAR..=current_year + 1;
    if let Some(year) = reference.year_value().filter(|y| plausible.contains(y)) {
        return Some(year);
    }
    let doi = normalize_doi(reference.doi_text()?)?;
    snapshot.registry_year(&doi)
}

/// Age of every dated reference of analyzed works with a publication year.
#[must_use]
pub fn reference_age(analyzed: &[WorkRecord], snapshot: &MetadataSnapshot, current_year: i32) -> ReferenceAge {
    let ages: Vec<f64> = analyzed
        .iter()
        .filter(|w| w.published_year().is_some())
        .filter_map(|w| w.registry.as_ref())
        .flat_map(|r| r.reference.iter())
        .filter_map(|reference| reference_year(reference, snapshot, current_year))
        .map(|year| f64::from(current_year - year))
        .collect();

    ReferenceAge {
        median: median(&ages).map(|m| m.trunc() as i64),
        mean: mean(&ages).map(|m| round_to(m, 1)),
        p25: percentile(&ages, 25.0).map(|p| p.trunc() as i64),
        p75: percentile(&ages, 75.0).map(|p| p.trunc() as i64),
        count: ages.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::tests_support::analyzed_work;
    use crate::models::{DateParts, RegistryWork};

    fn reference(doi: Option<&str>, year: Option<&str>) -> Reference {
        Reference { doi: doi.map(str::to_string), year: year.map(str::to_string), unstructured: None }
    }

    #[test]
    fn test_reference_age_distribution() {
        let mut work = analyzed_work("10.1/a", Some(2020));
        work.registry.as_mut().unwrap().reference = vec![
            reference(None, Some("2020")),
            reference(None, Some("2018")),
            reference(None, Some("2014")),
            reference(None, Some("2010")),
            reference(None, Some("1800")),
            reference(None, None),
        ];

        let age = reference_age(&[work], &MetadataSnapshot::default(), 2024);
        assert_eq!(age.count, 4);
        assert_eq!(age.median, Some(8));
        assert_eq!(age.mean, Some(8.5));
        assert_eq!(age.p25, Some(5));
        assert_eq!(age.p75, Some(11));
    }

    #[test]
    fn test_reference_year_from_snapshot() {
        let mut work = analyzed_work("10.1/a", Some(2020));
        work.registry.as_mut().unwrap().reference =
            vec![reference(Some("https://doi.org/10.9/REF"), Some("3000"))];

        let mut snapshot = MetadataSnapshot::default();
        snapshot.registry.insert(
            "10.9/ref".to_string(),
            RegistryWork { published: Some(DateParts::from_parts(&[2004])), ..Default::default() },
        );

        let age = reference_age(&[work], &snapshot, 2024);
        assert_eq!(age.count, 1);
        assert_eq!(age.median, Some(20));
    }

    #[test]
    fn test_works_without_year_are_ignored() {
        let mut work = analyzed_work("10.1/a", None);
        work.registry.as_mut().unwrap().reference = vec![reference(None, Some("2010"))];

        let age = reference_age(&[work], &MetadataSnapshot::default(), 2024);
        assert_eq!(age, ReferenceAge::default());
    }
}
