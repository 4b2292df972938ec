/// One trusted fact-check provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedSource {
    pub name: String,
    pub endpoint: String,
}

impl TrustedSource {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// Fixed mapping of trusted fact-check sources. Enumerable, and extensible
/// via `register` without touching pipeline logic.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<TrustedSource>,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self {
            sources: vec![
                TrustedSource::new("snopes", "https://snopes.com/api/claims"),
                TrustedSource::new("factcheck", "https://www.factcheck.org/api"),
                TrustedSource::new("fullfact", "https://fullfact.org/api"),
                TrustedSource::new("politifact", "https://www.politifact.com/api"),
            ],
        }
    }
}

impl SourceRegistry {
    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn register(&mut self, source: TrustedSource) {
        self.sources.push(source);
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrustedSource> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_known_sources() {
        let registry = SourceRegistry::default();
        let names: Vec<&str> = registry.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["snopes", "factcheck", "fullfact", "politifact"]);
    }

    #[test]
    fn register_extends_without_replacing() {
        let mut registry = SourceRegistry::default();
        registry.register(TrustedSource::new("afp", "https://factcheck.afp.com/api"));
        assert_eq!(registry.len(), 5);
    }
}
