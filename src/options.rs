use serde::Serialize;
use std::collections::HashMap;

/// Query options for the registry's company filing feed.
///
/// The browse endpoint takes flat query parameters; `output=atom` is always
/// set since the locator only consumes the ATOM form of the feed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedOptions {
    #[serde(flatten)]
    params: HashMap<String, String>,
}

impl FeedOptions {
    fn base() -> Self {
        let mut options = FeedOptions {
            params: HashMap::new(),
        };
        options
            .params
            .insert("output".to_string(), "atom".to_string());
        options
    }

    pub fn new(params: Option<FeedOptions>) -> Self {
        match params {
            Some(options) => Self::base().merge(options),
            None => Self::base(),
        }
    }

    pub fn merge(mut self, other: FeedOptions) -> Self {
        self.params.extend(other.params);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_output_is_always_set() {
        let opts = FeedOptions::new(None);
        assert_eq!(opts.params().get("output"), Some(&"atom".to_string()));
    }

    #[test]
    fn with_param_overrides() {
        let opts = FeedOptions::new(None).with_param("count", "100");
        assert_eq!(opts.params().get("count"), Some(&"100".to_string()));
    }
}
