use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllowListError {
    #[error("Invalid allow-list entry {token:?}: {source}")]
    InvalidToken {
        token: String,
        #[source]
        source: regex::Error,
    },
}

/// Compiled allow-list of variable name patterns.
///
/// An empty list allows every name. Otherwise a name is allowed when it
/// fully matches at least one entry; `*` in an entry matches any run of
/// characters and everything else is literal and case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    tokens: Vec<String>,
    patterns: Vec<Regex>,
}

impl AllowList {
    /// Parse the comma-separated `--vars` value. Blank tokens are dropped.
    pub fn parse(list: &str) -> Result<Self, AllowListError> {
        Self::from_tokens(list.split(','))
    }

    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, AllowListError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();

        for token in tokens {
            let token = token.as_ref().trim();
            if token.is_empty() {
                continue;
            }

            let pattern = compile_wildcard(token).map_err(|source| AllowListError::InvalidToken {
                token: token.to_string(),
                source,
            })?;

            list.tokens.push(token.to_string());
            list.patterns.push(pattern);
        }

        Ok(list)
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Entries as written in the configuration.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.is_empty() || self.patterns.iter().any(|p| p.is_match(name))
    }
}

/// Translate a wildcard token into an anchored regex, expanding every `*`.
fn compile_wildcard(token: &str) -> Result<Regex, regex::Error> {
    let body = token
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{}$", body))
}
