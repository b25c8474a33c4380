use serde::{Deserialize, Serialize};

use crate::error::DirectoryError;

/// Built-in (local, canonical) pairs, in display order.
const KOREAN_CITIES: &[(&str, &str)] = &[
    ("서울", "Seoul"),
    ("부산", "Busan"),
    ("인천", "Incheon"),
    ("대구", "Daegu"),
    ("대전", "Daejeon"),
    ("광주", "Gwangju"),
    ("울산", "Ulsan"),
    ("수원", "Suwon"),
    ("제주", "Jeju"),
    ("전주", "Jeonju"),
    ("청주", "Cheongju"),
    ("천안", "Cheonan"),
    ("원주", "Wonju"),
    ("춘천", "Chuncheon"),
    ("강릉", "Gangneung"),
    ("창원", "Changwon"),
];

/// A city known under a local (displayed) name and a canonical (queried) name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityAlias {
    pub local: String,
    pub canonical: String,
}

impl CityAlias {
    pub fn new(local: impl Into<String>, canonical: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            canonical: canonical.into(),
        }
    }

    /// Alias for a name outside the known set: both forms are the input itself.
    pub fn passthrough(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            local: name.clone(),
            canonical: name,
        }
    }

    pub fn is_passthrough(&self) -> bool {
        self.local == self.canonical
    }

    /// Human-readable list label, e.g. `대구 (Daegu)`.
    pub fn label(&self) -> String {
        if self.is_passthrough() {
            self.local.clone()
        } else {
            format!("{} ({})", self.local, self.canonical)
        }
    }
}

/// Result of resolving user input against the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Name sent to the weather provider.
    pub canonical: String,
    /// Name shown to the user.
    pub display: String,
}

/// The set of known cities and the bijection between their two names.
///
/// Local names match exactly. Canonical names match ignoring ASCII case,
/// both here and in search.
#[derive(Debug, Clone)]
pub struct CityDirectory {
    aliases: Vec<CityAlias>,
}

impl CityDirectory {
    /// Directory with the built-in Korean cities.
    pub fn korean() -> Self {
        let aliases = KOREAN_CITIES
            .iter()
            .map(|(local, canonical)| CityAlias::new(*local, *canonical))
            .collect();
        Self { aliases }
    }

    /// Built-in cities plus `extra`, rejecting anything that would break the bijection.
    pub fn with_aliases<I>(extra: I) -> Result<Self, DirectoryError>
    where
        I: IntoIterator<Item = CityAlias>,
    {
        let mut directory = Self::korean();
        for alias in extra {
            directory.insert(alias)?;
        }
        Ok(directory)
    }

    /// Every name of `alias` must be new to the directory, under either role,
    /// or `resolve` would map it to two cities.
    fn insert(&mut self, alias: CityAlias) -> Result<(), DirectoryError> {
        if self.find_local(&alias.local).is_some() || self.find_canonical(&alias.local).is_some() {
            return Err(DirectoryError::Duplicate(alias.local));
        }
        if self.find_canonical(&alias.canonical).is_some()
            || self.find_local(&alias.canonical).is_some()
        {
            return Err(DirectoryError::Duplicate(alias.canonical));
        }
        self.aliases.push(alias);
        Ok(())
    }

    pub fn aliases(&self) -> &[CityAlias] {
        &self.aliases
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    fn find_local(&self, local: &str) -> Option<&CityAlias> {
        self.aliases.iter().find(|a| a.local == local)
    }

    fn find_canonical(&self, canonical: &str) -> Option<&CityAlias> {
        self.aliases
            .iter()
            .find(|a| a.canonical.eq_ignore_ascii_case(canonical))
    }

    /// Map user input to the provider's name and the name to show.
    pub fn resolve(&self, input: &str) -> Resolved {
        if let Some(alias) = self.find_local(input) {
            return Resolved {
                canonical: alias.canonical.clone(),
                display: input.to_string(),
            };
        }

        if let Some(alias) = self.find_canonical(input) {
            return Resolved {
                canonical: alias.canonical.clone(),
                display: alias.local.clone(),
            };
        }

        Resolved {
            canonical: input.to_string(),
            display: input.to_string(),
        }
    }

    /// Reverse lookup: local name for a canonical (provider-returned) name.
    pub fn local_for(&self, canonical: &str) -> Option<&str> {
        self.find_canonical(canonical).map(|a| a.local.as_str())
    }

    /// Known cities whose local name contains `query`, or whose canonical
    /// name contains it ignoring ASCII case.
    pub fn matching(&self, query: &str) -> Vec<CityAlias> {
        let query_lower = query.to_ascii_lowercase();
        self.aliases
            .iter()
            .filter(|a| {
                a.local.contains(query) || a.canonical.to_ascii_lowercase().contains(&query_lower)
            })
            .cloned()
            .collect()
    }
}

impl Default for CityDirectory {
    fn default() -> Self {
        Self::korean()
    }
}
