//! Parameter filters on cached layers.
//!
//! A parameter filter lists the values a request parameter may take for a
//! layer. Each allowed value, after normalization, is a separate cache
//! partition; a request without the parameter uses the default value, and
//! a value outside the list is rejected by the server.

use std::fmt;
use std::str::FromStr;

use crate::rest::ResourceMutation;
use crate::xml::{text_element, Document, Element, ElementExt, XmlError};

const PARAMETER_FILTERS: &str = "parameterFilters";
const KEY: &str = "key";

/// Case folding applied to parameter values before matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseNormalization {
    None,
    Upper,
    Lower,
}

impl CaseNormalization {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseNormalization::None => "NONE",
            CaseNormalization::Upper => "UPPER",
            CaseNormalization::Lower => "LOWER",
        }
    }
}

impl FromStr for CaseNormalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(CaseNormalization::None),
            "UPPER" => Ok(CaseNormalization::Upper),
            "LOWER" => Ok(CaseNormalization::Lower),
            other => Err(format!("unknown case normalization '{}'", other)),
        }
    }
}

impl fmt::Display for CaseNormalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case folding together with the locale whose rules apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalization {
    pub case: CaseNormalization,
    pub locale: String,
}

impl Normalization {
    pub fn new(case: CaseNormalization, locale: impl Into<String>) -> Self {
        Self {
            case,
            locale: locale.into(),
        }
    }

    /// Folds `value` the way the server does for this locale.
    ///
    /// Turkish and Azerbaijani pair dotted `İ`/`i` and dotless `I`/`ı`;
    /// every other locale uses the default Unicode mappings.
    pub fn apply(&self, value: &str) -> String {
        let dotted_i_locale = matches!(self.language(), "tr" | "az");
        match self.case {
            CaseNormalization::None => value.to_string(),
            CaseNormalization::Upper if dotted_i_locale => value
                .chars()
                .map(|c| match c {
                    'i' => "İ".to_string(),
                    'ı' => "I".to_string(),
                    c => c.to_uppercase().collect(),
                })
                .collect(),
            CaseNormalization::Lower if dotted_i_locale => value
                .chars()
                .map(|c| match c {
                    'I' => "ı".to_string(),
                    'İ' => "i".to_string(),
                    c => c.to_lowercase().collect(),
                })
                .collect(),
            CaseNormalization::Upper => value.to_uppercase(),
            CaseNormalization::Lower => value.to_lowercase(),
        }
    }

    fn language(&self) -> &str {
        self.locale
            .split(['_', '-'])
            .next()
            .unwrap_or_default()
    }
}

/// A filter restricting a parameter to a fixed list of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringParameterFilter {
    pub key: String,
    pub default_value: String,
    pub values: Vec<String>,
    pub normalize: Option<Normalization>,
}

impl StringParameterFilter {
    pub fn new<I, S>(key: impl Into<String>, default_value: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            default_value: default_value.into(),
            values: values.into_iter().map(Into::into).collect(),
            normalize: None,
        }
    }

    pub fn with_normalization(mut self, case: CaseNormalization, locale: impl Into<String>) -> Self {
        self.normalize = Some(Normalization::new(case, locale));
        self
    }

    /// The cache partition a request value falls into.
    ///
    /// `None` means the server must reject the value. A missing value maps
    /// to the default.
    pub fn partition(&self, value: Option<&str>) -> Option<String> {
        let Some(value) = value else {
            return Some(self.default_value.clone());
        };
        let fold = |v: &str| match &self.normalize {
            Some(normalization) => normalization.apply(v),
            None => v.to_string(),
        };
        let folded = fold(value);
        self.values.iter().map(|v| fold(v)).find(|v| *v == folded)
    }

    /// Builds the `<stringParameterFilter>` element.
    pub fn to_element(&self) -> Element {
        let mut filter = Element::new("stringParameterFilter");
        filter.push_child(text_element(KEY, self.key.clone()));
        filter.push_child(text_element("defaultValue", self.default_value.clone()));
        if let Some(normalization) = &self.normalize {
            let mut normalize = Element::new("normalize");
            normalize.push_child(text_element("case", normalization.case.as_str()));
            normalize.push_child(text_element("locale", normalization.locale.clone()));
            filter.push_child(normalize);
        }
        let mut values = Element::new("values");
        for value in &self.values {
            values.push_child(text_element("string", value.clone()));
        }
        filter.push_child(values);
        filter
    }
}

/// Appends a filter to a layer, creating the filter list if needed.
///
/// A layer that already has a filter for the key is left alone; use
/// [`ReplaceParameterFilter`] to change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddParameterFilter(pub StringParameterFilter);

impl ResourceMutation for AddParameterFilter {
    fn apply(self, document: &mut Document) -> Result<(), XmlError> {
        let filters = document.root_mut().ensure_child(PARAMETER_FILTERS);
        if !filters.child_elements().any(|f| has_key(f, &self.0.key)) {
            filters.push_child(self.0.to_element());
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("add parameter filter {}", self.0.key)
    }
}

/// Replaces whatever filter a layer has for the key with a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceParameterFilter(pub StringParameterFilter);

impl ResourceMutation for ReplaceParameterFilter {
    fn apply(self, document: &mut Document) -> Result<(), XmlError> {
        let filters = document.root_mut().ensure_child(PARAMETER_FILTERS);
        filters.remove_children_where(|f| has_key(f, &self.0.key));
        filters.push_child(self.0.to_element());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("replace parameter filter {}", self.0.key)
    }
}

/// Removes every parameter filter whose key is not listed in `keep`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveParameterFilters {
    pub keep: Vec<String>,
}

impl RemoveParameterFilters {
    pub fn keeping<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keep: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl ResourceMutation for RemoveParameterFilters {
    fn apply(self, document: &mut Document) -> Result<(), XmlError> {
        if let Some(filters) = document.find_mut(PARAMETER_FILTERS) {
            filters.remove_children_where(|f| !self.keep.iter().any(|k| has_key(f, k)));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("remove parameter filters except {:?}", self.keep)
    }
}

/// The filter element for `key` on a layer, of any filter type.
pub fn find_parameter_filter<'a>(document: &'a Document, key: &str) -> Option<&'a Element> {
    document
        .find(PARAMETER_FILTERS)?
        .child_elements()
        .find(|f| has_key(f, key))
}

/// The normalization configured on the filter for `key`.
///
/// Returns `None` if there is no such filter or it does not normalize.
pub fn parameter_filter_normalization(document: &Document, key: &str) -> Option<Normalization> {
    let normalize = find_parameter_filter(document, key)?.child("normalize")?;
    let case = normalize.child_text("case")?.parse().ok()?;
    let locale = normalize.child_text("locale").unwrap_or_default();
    Some(Normalization { case, locale })
}

fn has_key(filter: &Element, key: &str) -> bool {
    filter
        .child_text(KEY)
        .is_some_and(|k| k.eq_ignore_ascii_case(key))
}
