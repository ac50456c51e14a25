//! In-memory template store keyed by id and locale.

use crate::template::{Template, TemplateType};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};

/// Templates by id, then by locale, with a category index.
///
/// A lookup for a locale that has no entry falls back to the store's
/// default locale.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    templates: BTreeMap<String, BTreeMap<String, Template>>,
    categories: BTreeMap<String, BTreeSet<String>>,
    default_locale: String,
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::new(crate::config::types::default_locale())
    }
}

impl TemplateStore {
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            templates: BTreeMap::new(),
            categories: BTreeMap::new(),
            default_locale: default_locale.into(),
        }
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Insert or replace the template for its (id, locale), stamping
    /// `updated_at`.
    pub fn save(&mut self, mut template: Template) {
        template.updated_at = Utc::now();
        let category = template.category();

        tracing::debug!(
            id = %template.id,
            locale = %template.locale,
            category = %category,
            "saving template"
        );

        self.categories
            .entry(category)
            .or_default()
            .insert(template.id.clone());
        self.templates
            .entry(template.id.clone())
            .or_default()
            .insert(template.locale.clone(), template);
    }

    /// The template for `locale`, else the one in the default locale.
    pub fn get(&self, id: &str, locale: &str) -> Option<&Template> {
        let locales = self.templates.get(id)?;
        locales.get(locale).or_else(|| {
            let fallback = locales.get(&self.default_locale);
            if fallback.is_some() && locale != self.default_locale {
                tracing::debug!(
                    id,
                    requested = locale,
                    fallback = %self.default_locale,
                    "falling back to default locale"
                );
            }
            fallback
        })
    }

    /// Remove one locale of `id`, or every locale when `locale` is `None`.
    ///
    /// Returns whether anything was removed. Removing the last locale
    /// removes the id.
    pub fn delete(&mut self, id: &str, locale: Option<&str>) -> bool {
        let Some(locales) = self.templates.get_mut(id) else {
            return false;
        };

        let removed = match locale {
            Some(locale) => locales.remove(locale).is_some(),
            None => {
                locales.clear();
                true
            }
        };

        if locales.is_empty() {
            self.templates.remove(id);
            for ids in self.categories.values_mut() {
                ids.remove(id);
            }
            self.categories.retain(|_, ids| !ids.is_empty());
        }
        removed
    }

    /// Every stored template of `template_type`, in id then locale order.
    pub fn list_by_type(&self, template_type: TemplateType) -> Vec<&Template> {
        self.iter()
            .filter(|t| t.template_type == template_type)
            .collect()
    }

    /// The default-locale template of every id in `category`.
    pub fn list_by_category(&self, category: &str) -> Vec<&Template> {
        self.categories
            .get(category)
            .into_iter()
            .flatten()
            .filter_map(|id| self.get(id, &self.default_locale))
            .collect()
    }

    /// Stored ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Stored locales of `id`, sorted.
    pub fn locales(&self, id: &str) -> Vec<&str> {
        self.templates
            .get(id)
            .map(|locales| locales.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every stored template, in id then locale order.
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values().flat_map(|locales| locales.values())
    }

    pub fn len(&self) -> usize {
        self.templates.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
