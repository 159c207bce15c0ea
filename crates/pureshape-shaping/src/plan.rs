// this_file: crates/pureshape-shaping/src/plan.rs

//! Shaping plans: which lookups run for a (font, script, language, direction, features) request.

use log::{debug, error, warn};
use pureshape_core::{
    CacheStats, Direction, Features, Language, Script, ShapeError, SharedCache, Tag,
};
use pureshape_font::{FontId, FontProgram, LayoutTable};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Substitution features applied unless the caller turns them off.
pub const DEFAULT_GSUB_FEATURES: [Tag; 8] = [
    Tag::new(b"rvrn"),
    Tag::new(b"ccmp"),
    Tag::new(b"locl"),
    Tag::new(b"rlig"),
    Tag::new(b"calt"),
    Tag::new(b"clig"),
    Tag::new(b"liga"),
    Tag::new(b"rclt"),
];

/// Positioning features applied unless the caller turns them off.
pub const DEFAULT_GPOS_FEATURES: [Tag; 6] = [
    Tag::new(b"kern"),
    Tag::new(b"mark"),
    Tag::new(b"mkmk"),
    Tag::new(b"dist"),
    Tag::new(b"abvm"),
    Tag::new(b"blwm"),
];

const DFLT: Tag = Tag::new(b"DFLT");
const DFLT_LOWER: Tag = Tag::new(b"dflt");

/// A lookup scheduled by a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedLookup {
    /// Index into the table's lookup list
    pub index: u16,
    /// Feature that contributed the lookup
    pub feature: Tag,
    /// Feature value (alternate index for alternate substitutions)
    pub value: u32,
}

/// Immutable, shareable list of lookups for one request shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapingPlan {
    pub font_id: FontId,
    pub script: Script,
    pub language: Option<Language>,
    pub direction: Direction,
    /// Script record chosen in GSUB or GPOS
    pub script_tag: Option<Tag>,
    /// Language system chosen, `None` for the script default
    pub language_tag: Option<Tag>,
    pub gsub_lookups: Vec<PlannedLookup>,
    pub gpos_lookups: Vec<PlannedLookup>,
    /// Neither table knows the script: cmap + nominal advances only
    pub fallback: bool,
}

impl ShapingPlan {
    pub fn is_empty(&self) -> bool {
        self.gsub_lookups.is_empty() && self.gpos_lookups.is_empty()
    }
}

/// Cache key of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanKey {
    pub font_id: FontId,
    pub script: Script,
    pub language: Option<Language>,
    pub direction: Direction,
    pub features: Features,
}

/// Builds shaping plans from a font's layout tables.
pub struct PlanBuilder<'a> {
    font: &'a FontProgram,
    script: Script,
    language: Option<&'a Language>,
    direction: Direction,
    features: &'a Features,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(
        font: &'a FontProgram,
        script: Script,
        language: Option<&'a Language>,
        direction: Direction,
        features: &'a Features,
    ) -> Self {
        Self {
            font,
            script,
            language,
            direction,
            features,
        }
    }

    /// Select and order the lookups. Deterministic for equal inputs.
    pub fn build(&self) -> ShapingPlan {
        let mut script_tags = self.script.ot_tags();
        script_tags.extend([DFLT, DFLT_LOWER]);
        let language_tag = self.language.and_then(Language::ot_tag);

        let gsub = self.font.gsub().and_then(|table| {
            select_lookups(
                table,
                "GSUB",
                &script_tags,
                language_tag,
                &DEFAULT_GSUB_FEATURES,
                self.features,
            )
        });
        let gpos = self.font.gpos().and_then(|table| {
            select_lookups(
                table,
                "GPOS",
                &script_tags,
                language_tag,
                &DEFAULT_GPOS_FEATURES,
                self.features,
            )
        });

        let fallback = gsub.is_none() && gpos.is_none();
        let chosen = gsub.as_ref().or(gpos.as_ref());
        let plan = ShapingPlan {
            font_id: self.font.id(),
            script: self.script,
            language: self.language.cloned(),
            direction: self.direction,
            script_tag: chosen.map(|selection| selection.script_tag),
            language_tag: chosen.and_then(|selection| selection.language_tag),
            gsub_lookups: gsub.map(|selection| selection.lookups).unwrap_or_default(),
            gpos_lookups: gpos.map(|selection| selection.lookups).unwrap_or_default(),
            fallback,
        };

        if plan.fallback {
            debug!(
                target: "pureshape::plan",
                "{}: no layout data for script {}, using pass-through",
                plan.font_id,
                plan.script
            );
        } else {
            debug!(
                target: "pureshape::plan",
                "{}: script {} -> {:?}/{:?}, {} GSUB + {} GPOS lookups",
                plan.font_id,
                plan.script,
                plan.script_tag,
                plan.language_tag,
                plan.gsub_lookups.len(),
                plan.gpos_lookups.len()
            );
        }
        plan
    }
}

struct Selection {
    script_tag: Tag,
    language_tag: Option<Tag>,
    lookups: Vec<PlannedLookup>,
}

fn select_lookups<T>(
    table: &LayoutTable<T>,
    table_name: &str,
    script_tags: &[Tag],
    language_tag: Option<Tag>,
    defaults: &[Tag],
    features: &Features,
) -> Option<Selection> {
    let (script_tag, record) = table.find_script(script_tags)?;
    let mut selection = Selection {
        script_tag,
        language_tag: None,
        lookups: Vec::new(),
    };
    let Some((chosen_language, lang_sys)) = record.lang_sys(language_tag) else {
        return Some(selection);
    };
    selection.language_tag = chosen_language;

    let required = lang_sys.required_feature.map(|index| (index, true));
    let optional = lang_sys.feature_indices.iter().map(|&index| (index, false));

    // Keyed by lookup index: lookups run in lookup-list order and the first
    // feature to claim a lookup provides its value.
    let mut planned: BTreeMap<u16, PlannedLookup> = BTreeMap::new();
    for (feature_index, is_required) in required.into_iter().chain(optional) {
        let Some(feature) = table.feature(feature_index) else {
            warn!(
                target: "pureshape::plan",
                "{table_name}: feature index {feature_index} out of range"
            );
            continue;
        };
        let value = if is_required {
            features.get(feature.tag).unwrap_or(1).max(1)
        } else {
            features.value_or_default(feature.tag, defaults.contains(&feature.tag))
        };
        if value == 0 {
            continue;
        }
        for &lookup_index in &feature.lookup_indices {
            if table.lookup(lookup_index).is_none() {
                warn!(
                    target: "pureshape::plan",
                    "{table_name}: feature '{}' references missing lookup {lookup_index}",
                    feature.tag
                );
                continue;
            }
            planned.entry(lookup_index).or_insert(PlannedLookup {
                index: lookup_index,
                feature: feature.tag,
                value,
            });
        }
    }
    selection.lookups = planned.into_values().collect();
    Some(selection)
}

/// Plans kept by a [`PlanCache`] before it starts over.
pub const DEFAULT_PLAN_CACHE_CAPACITY: usize = 1024;

/// Concurrent cache of shaping plans.
pub struct PlanCache {
    plans: SharedCache<PlanKey, ShapingPlan>,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_PLAN_CACHE_CAPACITY)
    }

    /// A cache holding at most `capacity` plans.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            plans: SharedCache::bounded(capacity),
        }
    }

    /// Cached plan for the request, built on first use.
    ///
    /// A cached plan belonging to another font is reported and replaced by
    /// an uncached rebuild.
    pub fn get_or_build(
        &self,
        font: &FontProgram,
        script: Script,
        language: Option<&Language>,
        direction: Direction,
        features: &Features,
    ) -> Arc<ShapingPlan> {
        let builder = PlanBuilder::new(font, script, language, direction, features);
        let key = PlanKey {
            font_id: font.id(),
            script,
            language: language.cloned(),
            direction,
            features: features.clone(),
        };
        let cached = self
            .plans
            .get_or_try_insert_with(key, || Ok(builder.build()));
        match cached {
            Ok(plan) if plan.font_id == font.id() => plan,
            Ok(plan) => {
                let err = ShapeError::plan_cache(format!(
                    "plan for {} returned for {}",
                    plan.font_id,
                    font.id()
                ));
                error!(target: "pureshape::plan", "{err}");
                Arc::new(builder.build())
            }
            Err(err) => {
                error!(target: "pureshape::plan", "{err}");
                Arc::new(builder.build())
            }
        }
    }

    /// Drop every plan built for `font_id`.
    pub fn invalidate_font(&self, font_id: FontId) {
        self.plans.retain(|key, _| key.font_id != font_id);
    }

    pub fn clear(&self) {
        self.plans.clear();
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.plans.stats()
    }
}

impl Default for PlanCache {
    fn default() -> Self {
        Self::new()
    }
}
