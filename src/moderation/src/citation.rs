//! Citation validation
//!
//! A citation is either a `doi:` identifier, accepted without allow-listing,
//! or an absolute http(s) URL whose host is on the allow-list. Hosts match a
//! listed domain exactly or as a dotted suffix, after stripping a leading
//! `www.` on both sides.

use serde::{Deserialize, Serialize};
use url::Url;

/// Domain reported for DOI citations
pub const DOI_DOMAIN: &str = "doi.org";

const DEFAULT_DOMAINS: &[&str] = &[
    "pubmed.ncbi.nlm.nih.gov",
    "ncbi.nlm.nih.gov",
    "nih.gov",
    "nature.com",
    "science.org",
    "cell.com",
    "thelancet.com",
    "nejm.org",
    "jamanetwork.com",
    "bmj.com",
    "cochranelibrary.com",
    "who.int",
    "cdc.gov",
    "fda.gov",
    "arxiv.org",
    "biorxiv.org",
    "medrxiv.org",
    "plos.org",
    "springer.com",
    "wiley.com",
    "elsevier.com",
    "sciencedirect.com",
    "frontiersin.org",
    "mdpi.com",
    "examine.com",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationFormat {
    Url,
    Doi,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationValidationResult {
    pub is_valid: bool,
    pub format: Option<CitationFormat>,
    pub domain: Option<String>,
    pub reason: Option<String>,
}

impl CitationValidationResult {
    fn valid(format: CitationFormat, domain: String) -> Self {
        Self {
            is_valid: true,
            format: Some(format),
            domain: Some(domain),
            reason: None,
        }
    }

    fn invalid(format: Option<CitationFormat>, domain: Option<String>, reason: String) -> Self {
        Self {
            is_valid: false,
            format,
            domain,
            reason: Some(reason),
        }
    }
}

/// Citation settings from configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationConfig {
    /// Domains added to the built-in list
    #[serde(default)]
    pub extra_domains: Vec<String>,

    /// Use only `extra_domains`, dropping the built-in list
    #[serde(default)]
    pub replace_defaults: bool,
}

/// Normalized set of allowed citation domains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationAllowList {
    domains: Vec<String>,
}

impl Default for CitationAllowList {
    fn default() -> Self {
        Self::new(DEFAULT_DOMAINS.iter().copied())
    }
}

impl CitationAllowList {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for domain in domains {
            let domain = normalize_host(domain.as_ref().trim());
            if !domain.is_empty() && !normalized.contains(&domain) {
                normalized.push(domain);
            }
        }
        Self { domains: normalized }
    }

    pub fn from_config(config: &CitationConfig) -> Self {
        if config.replace_defaults {
            Self::new(&config.extra_domains)
        } else {
            Self::new(
                DEFAULT_DOMAINS
                    .iter()
                    .map(|d| d.to_string())
                    .chain(config.extra_domains.iter().cloned()),
            )
        }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Exact or dotted-suffix match against a normalized host
    pub fn allows(&self, host: &str) -> bool {
        let host = normalize_host(host);
        self.domains.iter().any(|domain| {
            host == *domain
                || (host.len() > domain.len()
                    && host.ends_with(domain.as_str())
                    && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
        })
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    }
}

/// Pure, total validator over an allow-list
#[derive(Debug, Clone, Default)]
pub struct CitationValidator {
    allow_list: CitationAllowList,
}

impl CitationValidator {
    pub fn new(allow_list: CitationAllowList) -> Self {
        Self { allow_list }
    }

    pub fn allow_list(&self) -> &CitationAllowList {
        &self.allow_list
    }

    pub fn validate(&self, citation: &str) -> CitationValidationResult {
        let citation = citation.trim();
        if citation.is_empty() {
            return CitationValidationResult::invalid(None, None, "empty".to_string());
        }

        if citation
            .get(..4)
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case("doi:"))
        {
            return CitationValidationResult::valid(CitationFormat::Doi, DOI_DOMAIN.to_string());
        }

        let host = match Url::parse(citation) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url.host_str().map(normalize_host),
            _ => None,
        };
        let host = match host {
            Some(host) if !host.is_empty() => host,
            _ => {
                return CitationValidationResult::invalid(
                    None,
                    None,
                    "expected an http(s) URL or a doi: identifier".to_string(),
                )
            }
        };

        if self.allow_list.allows(&host) {
            CitationValidationResult::valid(CitationFormat::Url, host)
        } else {
            let reason = format!("domain '{}' is not on the citation allow-list", host);
            CitationValidationResult::invalid(Some(CitationFormat::Url), Some(host), reason)
        }
    }

    /// Validate a batch; returns the position and result of the first
    /// invalid citation, if any
    pub fn validate_all<S: AsRef<str>>(&self, citations: &[S]) -> Option<(usize, CitationValidationResult)> {
        citations
            .iter()
            .map(|c| self.validate(c.as_ref()))
            .enumerate()
            .find(|(_, result)| !result.is_valid)
    }
}
