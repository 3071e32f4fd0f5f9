//! DOI and ISSN normalization.

/// URL and scheme prefixes stripped before a DOI is validated.
const DOI_PREFIXES: &[&str] =
    &["https://doi.org/", "http://doi.org/", "https://dx.doi.org/", "http://dx.doi.org/", "doi:"];

/// Normalize a DOI to the cache key form: trimmed, lowercase, `10.` prefix.
///
/// Resolver URLs and `doi:` schemes are stripped first. Returns `None` for
/// anything that is not a DOI after normalization.
#[must_use]
pub fn normalize_doi(raw: &str) -> Option<String> {
    let mut doi = raw.trim().to_lowercase();
    for prefix in DOI_PREFIXES {
        if let Some(rest) = doi.strip_prefix(prefix) {
            doi = rest.trim().to_string();
            break;
        }
    }
    doi.starts_with("10.").then_some(doi)
}

/// Registrant segment of a DOI (before the first `/`).
///
/// DOIs without a slash yield their first seven characters; empty and `N/A`
/// inputs yield an empty string.
#[must_use]
pub fn doi_prefix(doi: &str) -> String {
    let doi = doi.trim();
    if doi.is_empty() || doi == "N/A" {
        return String::new();
    }
    match doi.split_once('/') {
        Some((prefix, _)) => prefix.to_string(),
        None => doi.chars().take(7).collect(),
    }
}

/// ISSN comparison key: hyphens and spaces removed, upper-cased.
#[must_use]
pub fn normalize_issn(issn: &str) -> String {
    issn.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect::<String>().to_uppercase()
}
