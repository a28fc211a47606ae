//! Optional title/location/exclusion pre-filter applied before any store
//! lookup.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::job::JobPosting;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Exclusions {
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub companies: Vec<String>,
    /// Matched against title and description.
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobCriteria {
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub exclude: Exclusions,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default = "default_min_required_skills")]
    pub min_required_skills: usize,
}

fn default_min_required_skills() -> usize {
    2
}

impl Default for JobCriteria {
    fn default() -> Self {
        Self {
            titles: Vec::new(),
            locations: Vec::new(),
            exclude: Exclusions::default(),
            required_skills: Vec::new(),
            min_required_skills: default_min_required_skills(),
        }
    }
}

impl JobCriteria {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job criteria {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid job criteria {}", path.display()))
    }

    /// `Err(detail)` names the first rule the posting fails.
    pub fn check(&self, job: &JobPosting) -> Result<(), String> {
        let title = job.title.to_lowercase();
        let company = job.company.to_lowercase();
        let location = job.location_or_empty().to_lowercase();
        let description = job.description.to_lowercase();

        if !self.titles.is_empty() && find_any(&title, &self.titles).is_none() {
            return Err(format!("title '{}' not in wanted titles", job.title));
        }
        if !self.locations.is_empty() && find_any(&location, &self.locations).is_none() {
            return Err(format!("location '{}' not in wanted locations", job.location_or_empty()));
        }
        if let Some(hit) = find_any(&title, &self.exclude.titles) {
            return Err(format!("excluded title '{hit}'"));
        }
        if let Some(hit) = find_any(&company, &self.exclude.companies) {
            return Err(format!("excluded company '{hit}'"));
        }
        if let Some(hit) = find_any(&title, &self.exclude.keywords)
            .or_else(|| find_any(&description, &self.exclude.keywords))
        {
            return Err(format!("excluded keyword '{hit}'"));
        }

        if !self.required_skills.is_empty() {
            let needed = self.min_required_skills.min(self.required_skills.len());
            let found = self
                .required_skills
                .iter()
                .filter(|skill| description.contains(&skill.to_lowercase()))
                .count();
            if found < needed {
                return Err(format!("only {found} of {needed} required skills mentioned"));
            }
        }

        Ok(())
    }
}

fn find_any<'a>(haystack: &str, needles: &'a [String]) -> Option<&'a str> {
    needles
        .iter()
        .map(String::as_str)
        .find(|n| !n.trim().is_empty() && haystack.contains(&n.to_lowercase()))
}
