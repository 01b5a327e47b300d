//! Value suggestions for the search box
//!
//! A [`Catalog`] is built by the caller from whatever the token API returned
//! for networks, protocols and projects, and passed to whoever needs
//! suggestions. Matching is case-insensitive substring containment in catalog
//! order.

use crate::vocab::{FilterKey, key_suggestions};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logos_uri: Vec<String>,
    #[serde(default)]
    pub project: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Text inserted after `key:` when the suggestion is picked
    pub value: String,
    pub display_text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

const TOKEN_TYPES: [(&str, &str, &str); 2] = [
    ("defi", "DeFi Token", "Tokens from decentralized finance protocols"),
    ("base", "Base Token", "Basic underlying tokens"),
];

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Lookup data behind value suggestions
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    networks: Vec<Network>,
    protocols: Vec<Protocol>,
    projects: Vec<Project>,
}

impl Catalog {
    pub fn new(networks: Vec<Network>, protocols: Vec<Protocol>, projects: Vec<Project>) -> Self {
        Self {
            networks,
            protocols,
            projects,
        }
    }

    /// Replace the sources that are `Some`, keeping the rest.
    pub fn update_sources(
        &mut self,
        networks: Option<Vec<Network>>,
        protocols: Option<Vec<Protocol>>,
        projects: Option<Vec<Project>>,
    ) {
        if let Some(networks) = networks {
            self.networks = networks;
        }
        if let Some(protocols) = protocols {
            self.protocols = protocols;
        }
        if let Some(projects) = projects {
            self.projects = projects;
        }
    }

    /// Suggested values for `key` matching `search`. Keys without a value
    /// source (addresses, ranges) get none.
    pub fn suggestions_for_key(&self, key: FilterKey, search: &str) -> Vec<Suggestion> {
        let needle = search.to_lowercase();
        match key {
            FilterKey::ProtocolSlug => self
                .protocols
                .iter()
                .filter(|p| {
                    contains(&p.slug, &needle)
                        || p.name.as_deref().is_some_and(|n| contains(n, &needle))
                        || p.description.as_deref().is_some_and(|d| contains(d, &needle))
                })
                .map(|p| Suggestion {
                    value: p.slug.clone(),
                    display_text: p.name.clone().unwrap_or_else(|| p.slug.clone()),
                    description: p.description.clone().unwrap_or_default(),
                    logo: p.logos_uri.first().cloned(),
                })
                .collect(),
            FilterKey::Project => self
                .projects
                .iter()
                .filter(|project| contains(&project.id, &needle))
                .map(|project| {
                    let protocol = self.protocol_for_project(&project.id);
                    Suggestion {
                        value: project.id.clone(),
                        display_text: protocol
                            .and_then(|p| p.name.clone())
                            .unwrap_or_else(|| project.id.clone()),
                        description: protocol
                            .and_then(|p| p.description.clone())
                            .unwrap_or_default(),
                        logo: protocol.and_then(|p| p.logos_uri.first().cloned()),
                    }
                })
                .collect(),
            FilterKey::ChainId => self
                .networks
                .iter()
                .filter(|n| contains(&n.name, &needle) || n.id.to_string().contains(&needle))
                .map(|n| Suggestion {
                    value: n.id.to_string(),
                    display_text: format!("{} ({})", n.name, n.id),
                    description: String::new(),
                    logo: None,
                })
                .collect(),
            FilterKey::Type => TOKEN_TYPES
                .iter()
                .filter(|(value, display, _)| {
                    value.contains(needle.as_str()) || contains(display, &needle)
                })
                .map(|&(value, display, description)| Suggestion {
                    value: value.to_string(),
                    display_text: display.to_string(),
                    description: description.to_string(),
                    logo: None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Protocol describing a project: the one whose slug is the project id,
    /// else the first that declares the project.
    fn protocol_for_project(&self, id: &str) -> Option<&Protocol> {
        self.protocols
            .iter()
            .find(|p| p.slug == id)
            .or_else(|| self.protocols.iter().find(|p| p.project.as_deref() == Some(id)))
    }

    /// Filter keys as suggestions, for the key-typing stage.
    pub fn key_suggestions(&self, search: &str) -> Vec<Suggestion> {
        key_suggestions(search)
            .into_iter()
            .map(|key| Suggestion {
                value: key.name().to_string(),
                display_text: key.name().to_string(),
                description: key.description().to_string(),
                logo: None,
            })
            .collect()
    }
}
