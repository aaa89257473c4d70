//! `Www-Authenticate` bearer challenge parsing.

use url::Url;

use crate::error::RegistryError;

/// A parsed `Www-Authenticate: Bearer ...` challenge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BearerChallenge {
    /// Token endpoint.
    pub realm: String,

    /// Service the token is requested for.
    pub service: String,

    /// Requested access scope, e.g. `repository:app:pull`.
    pub scope: String,
}

impl BearerChallenge {
    /// Parses the value of a `Www-Authenticate` header.
    ///
    /// Parameters are comma separated `key=value` pairs whose values may be
    /// double quoted. Commas inside quotes do not split parameters. Missing
    /// `service` or `scope` parameters parse as empty strings.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AuthChallenge`] if the scheme is not `Bearer`
    /// or the challenge has no `realm`.
    ///
    /// # Examples
    ///
    /// ```
    /// use regstat_registry::BearerChallenge;
    ///
    /// let challenge = BearerChallenge::parse(
    ///     r#"Bearer realm="https://auth.example.com/token",service="registry.example.com",scope="repository:app:pull,push""#,
    /// )?;
    /// assert_eq!(challenge.realm, "https://auth.example.com/token");
    /// assert_eq!(challenge.scope, "repository:app:pull,push");
    /// # Ok::<(), regstat_registry::RegistryError>(())
    /// ```
    pub fn parse(header: &str) -> Result<Self, RegistryError> {
        let header = header.trim();
        let params = match header.split_once(char::is_whitespace) {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest,
            _ => {
                return Err(RegistryError::AuthChallenge {
                    message: format!("not a bearer challenge: {header}"),
                })
            }
        };

        let mut challenge = Self::default();
        for (key, value) in split_params(params) {
            match key.to_ascii_lowercase().as_str() {
                "realm" => challenge.realm = value,
                "service" => challenge.service = value,
                "scope" => challenge.scope = value,
                _ => {}
            }
        }

        if challenge.realm.is_empty() {
            return Err(RegistryError::AuthChallenge {
                message: "bearer challenge has no realm".to_string(),
            });
        }
        Ok(challenge)
    }

    /// Builds the token request URL: the realm with `service` and `scope`
    /// appended as query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidUrl`] if the realm is not a valid URL.
    pub fn token_url(&self) -> Result<Url, RegistryError> {
        let mut url = Url::parse(&self.realm).map_err(|_| RegistryError::InvalidUrl {
            url: self.realm.clone(),
        })?;
        url.query_pairs_mut()
            .append_pair("service", &self.service)
            .append_pair("scope", &self.scope);
        Ok(url)
    }
}

/// Splits `k1="v,1",k2=v2` into trimmed, unquoted pairs.
fn split_params(params: &str) -> Vec<(String, String)> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in params.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);

    parts
        .iter()
        .filter_map(|part| {
            let part = part.trim();
            if part.is_empty() {
                return None;
            }
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            Some((
                key.trim().to_string(),
                value.trim().trim_matches('"').to_string(),
            ))
        })
        .collect()
}
