//! # Legal Identities
//!
//! Structured distinguished names used to identify peers.
//!
//! A legal name is a comma separated list of `KEY=VALUE` attributes, for
//! example `O=Bank A, L=London, C=GB`. Organisation, locality and country
//! are mandatory. Commas inside a value are escaped with a backslash.

use crate::errors::LegalNameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parsed distinguished name of a network participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LegalName {
    pub common_name: Option<String>,
    pub organisation_unit: Option<String>,
    pub organisation: String,
    pub locality: String,
    pub state: Option<String>,
    pub country: String,
}

impl LegalName {
    pub const MAX_ORGANISATION_LENGTH: usize = 128;
    pub const MAX_COMMON_NAME_LENGTH: usize = 128;
    pub const MAX_LOCALITY_LENGTH: usize = 64;
    pub const MAX_STATE_LENGTH: usize = 64;
    pub const MAX_ORGANISATION_UNIT_LENGTH: usize = 64;

    /// Build a name from its three mandatory attributes.
    pub fn new(
        organisation: impl Into<String>,
        locality: impl Into<String>,
        country: impl Into<String>,
    ) -> Result<Self, LegalNameError> {
        let name = Self {
            common_name: None,
            organisation_unit: None,
            organisation: organisation.into(),
            locality: locality.into(),
            state: None,
            country: country.into(),
        };
        name.validate()?;
        Ok(name)
    }

    /// Parse a distinguished name string.
    ///
    /// # Errors
    ///
    /// Any malformed attribute, unknown or duplicated key, missing mandatory
    /// attribute or over-long value is rejected.
    pub fn parse(input: &str) -> Result<Self, LegalNameError> {
        let mut common_name = None;
        let mut organisation_unit = None;
        let mut organisation = None;
        let mut locality = None;
        let mut state = None;
        let mut country = None;

        for attribute in split_attributes(input) {
            let (key, value) = attribute
                .split_once('=')
                .ok_or_else(|| LegalNameError::MalformedAttribute(attribute.clone()))?;
            let key = key.trim().to_ascii_uppercase();
            let value = value.trim().to_string();
            if value.is_empty() {
                return Err(LegalNameError::EmptyValue(key));
            }

            let slot = match key.as_str() {
                "CN" => &mut common_name,
                "OU" => &mut organisation_unit,
                "O" => &mut organisation,
                "L" => &mut locality,
                "ST" => &mut state,
                "C" => &mut country,
                _ => return Err(LegalNameError::UnknownAttribute(key)),
            };
            if slot.replace(value).is_some() {
                return Err(LegalNameError::DuplicateAttribute(key));
            }
        }

        let name = Self {
            common_name,
            organisation_unit,
            organisation: organisation.ok_or(LegalNameError::MissingAttribute("O"))?,
            locality: locality.ok_or(LegalNameError::MissingAttribute("L"))?,
            state,
            country: country.ok_or(LegalNameError::MissingAttribute("C"))?,
        };
        name.validate()?;
        Ok(name)
    }

    fn validate(&self) -> Result<(), LegalNameError> {
        check_length("O", &self.organisation, Self::MAX_ORGANISATION_LENGTH)?;
        check_length("L", &self.locality, Self::MAX_LOCALITY_LENGTH)?;
        if let Some(cn) = &self.common_name {
            check_length("CN", cn, Self::MAX_COMMON_NAME_LENGTH)?;
        }
        if let Some(ou) = &self.organisation_unit {
            check_length("OU", ou, Self::MAX_ORGANISATION_UNIT_LENGTH)?;
        }
        if let Some(st) = &self.state {
            check_length("ST", st, Self::MAX_STATE_LENGTH)?;
        }
        let country_ok =
            self.country.len() == 2 && self.country.chars().all(|c| c.is_ascii_uppercase());
        if !country_ok {
            return Err(LegalNameError::InvalidCountry(self.country.clone()));
        }
        Ok(())
    }
}

fn check_length(key: &'static str, value: &str, max: usize) -> Result<(), LegalNameError> {
    if value.chars().count() > max {
        return Err(LegalNameError::ValueTooLong { attribute: key, max });
    }
    Ok(())
}

fn escape(value: &str) -> String {
    value.replace(',', "\\,")
}

/// Split on unescaped commas, unescaping `\,` inside values.
fn split_attributes(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(',') => current.push(','),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            ',' => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

impl FromStr for LegalName {
    type Err = LegalNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LegalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut attrs = Vec::with_capacity(6);
        if let Some(cn) = &self.common_name {
            attrs.push(format!("CN={}", escape(cn)));
        }
        if let Some(ou) = &self.organisation_unit {
            attrs.push(format!("OU={}", escape(ou)));
        }
        attrs.push(format!("O={}", escape(&self.organisation)));
        attrs.push(format!("L={}", escape(&self.locality)));
        if let Some(st) = &self.state {
            attrs.push(format!("ST={}", escape(st)));
        }
        attrs.push(format!("C={}", self.country));
        write!(f, "{}", attrs.join(", "))
    }
}
