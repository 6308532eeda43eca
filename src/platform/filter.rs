//! Dependency token to package name translation.

use std::collections::BTreeSet;

use crate::error::{Error, Result};

use super::OsFamily;

const REDHAT_PACKAGES: &[(&str, &str)] = &[
    ("gcc", "gcc"),
    ("make", "make"),
    ("pcre-dev", "pcre-devel"),
    ("ssl-dev", "openssl-devel"),
    ("zlib-dev", "zlib-devel"),
];

const DEBIAN_PACKAGES: &[(&str, &str)] = &[
    ("gcc", "gcc"),
    ("make", "make"),
    ("pcre-dev", "libpcre3-dev"),
    ("ssl-dev", "libssl-dev"),
    ("zlib-dev", "zlib1g-dev"),
];

/// A static token → package table for one OS family.
#[derive(Debug, Clone)]
pub struct PackageFilter {
    family: OsFamily,
    table: &'static [(&'static str, &'static str)],
}

impl PackageFilter {
    pub fn for_family(family: OsFamily) -> Self {
        let table = match family {
            OsFamily::RedHat => REDHAT_PACKAGES,
            OsFamily::Debian => DEBIAN_PACKAGES,
        };
        Self { family, table }
    }

    pub fn family(&self) -> OsFamily {
        self.family
    }

    /// Translate one token. Unknown tokens are an error, never a guess.
    pub fn resolve(&self, token: &str) -> Result<&'static str> {
        self.table
            .iter()
            .find(|(known, _)| *known == token)
            .map(|(_, package)| *package)
            .ok_or_else(|| Error::UnresolvedDependency {
                token: token.to_string(),
                family: self.family.to_string(),
            })
    }

    /// Translate a whole dependency set. Tokens mapping to the same package
    /// collapse into one entry.
    pub fn resolve_all<'t, I>(&self, tokens: I) -> Result<BTreeSet<String>>
    where
        I: IntoIterator<Item = &'t String>,
    {
        tokens
            .into_iter()
            .map(|token| self.resolve(token).map(str::to_string))
            .collect()
    }
}
