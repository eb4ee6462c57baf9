//! Per-component sync loop: cache-or-fetch, select language, validate, build.
//!
//! # Invariants
//! - A cached slug is never fetched again and its entry is never rewritten.
//! - Every failure is contained to its component; the loop always advances.
//! - Cancellation is observed only before a component starts.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ComponentError, FormatError};
use crate::model::component::{Component, Resource};
use crate::model::config::{RawDumpMode, SyncConfig};
use crate::model::translation::{self, TranslationSet};
use crate::parsers::resource::ResourceParser;
use crate::services::cache::TranslationCache;
use crate::services::cancel::CancelToken;
use crate::services::transifex::TranslationSource;

/// Per-run settings threaded through the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub source_language: String,
    pub target_language: String,
    pub raw_dump: RawDumpMode,
}

impl RunContext {
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            raw_dump: RawDumpMode::default(),
        }
    }

    pub fn from_config(cfg: &SyncConfig) -> Self {
        Self {
            source_language: cfg.source_language.clone(),
            target_language: cfg.target_language.clone(),
            raw_dump: cfg.raw_dump,
        }
    }

    /// Two-letter code the tree is built under (`zh-Hant` -> `zh`).
    pub fn language_code(&self) -> &str {
        match self.target_language.char_indices().nth(2) {
            Some((idx, _)) => &self.target_language[..idx],
            None => &self.target_language,
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Fetch,
    CacheRead,
    MissingLanguage,
    Format,
    Parse,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Translated,
    NotTranslated,
    Failed(FailureStage),
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ComponentOutcome {
    pub slug: String,
    pub outcome: Outcome,
}

#[derive(Debug, Serialize, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub processed: usize,
    pub cache_hits: usize,
    pub fetched: usize,
    pub translated: usize,
    pub not_translated: usize,
    pub failed: usize,
    pub cache_write_errors: usize,
    pub interrupted: bool,
    pub outcomes: Vec<ComponentOutcome>,
}

impl RunReport {
    fn record(&mut self, slug: String, outcome: Outcome) {
        match outcome {
            Outcome::Translated => self.translated += 1,
            Outcome::NotTranslated => self.not_translated += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
        self.outcomes.push(ComponentOutcome { slug, outcome });
    }

    pub fn failures(&self) -> impl Iterator<Item = &ComponentOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Failed(_)))
    }
}

/// Runs the sync loop over `components` in order, folding every usable
/// translation into `parser`.
pub fn run<S: TranslationSource + ?Sized>(
    ctx: &RunContext,
    components: &[Component],
    source: &mut S,
    cache: &TranslationCache,
    parser: &mut ResourceParser,
    cancel: &CancelToken,
) -> RunReport {
    let mut report = RunReport::default();

    for cmp in components {
        if cancel.is_cancelled() {
            report.interrupted = true;
            info!(
                processed = report.processed,
                remaining = components.len() - report.processed,
                "sync interrupted"
            );
            break;
        }

        report.processed += 1;
        let resource = cmp.resource();
        info!(
            count = report.processed,
            total = components.len(),
            slug = %resource.slug,
            "processing component"
        );

        let result = process_component(ctx, cmp, &resource, source, cache, parser, &mut report);
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                log_failure(ctx, cmp, &err);
                Outcome::Failed(stage_of(&err))
            }
        };

        report.record(resource.slug, outcome);
    }

    report
}

fn process_component<S: TranslationSource + ?Sized>(
    ctx: &RunContext,
    cmp: &Component,
    resource: &Resource,
    source: &mut S,
    cache: &TranslationCache,
    parser: &mut ResourceParser,
    report: &mut RunReport,
) -> Result<Outcome, ComponentError> {
    let slug = resource.slug.as_str();
    let lang = ctx.target_language.as_str();

    let translations = resolve_translations(slug, source, cache, report)?;

    let target = translations
        .get(lang)
        .ok_or_else(|| ComponentError::MissingLanguage(lang.to_string()))?;

    match cache.dump_raw(slug, lang, target, ctx.raw_dump) {
        Ok(Some(path)) => debug!(slug, path = %path.display(), "raw translation dumped"),
        Ok(None) => {}
        Err(err) => warn!(slug, language = lang, error = %err, "raw dump failed"),
    }

    let records = translation::decode_records(lang, target)?;

    let translated = Resource {
        slug: resource.slug.clone(),
        records,
    };
    parser.parse(cmp, &translated, ctx.language_code())?;

    let baseline = translations.get(&ctx.source_language).unwrap_or("");
    if target != baseline {
        info!("translated {lang} - {slug}");
        Ok(Outcome::Translated)
    } else {
        info!("not translated {lang} - {slug}");
        Ok(Outcome::NotTranslated)
    }
}

/// Cached mapping if present, otherwise fetched and cached.
fn resolve_translations<S: TranslationSource + ?Sized>(
    slug: &str,
    source: &mut S,
    cache: &TranslationCache,
    report: &mut RunReport,
) -> Result<TranslationSet, ComponentError> {
    if cache.contains(slug)? {
        let set = cache.load(slug)?;
        report.cache_hits += 1;
        debug!(slug, languages = set.len(), "cache hit");
        return Ok(set);
    }

    let set = source.fetch_translations(slug)?;
    report.fetched += 1;

    if let Err(err) = cache.store(slug, &set) {
        report.cache_write_errors += 1;
        warn!(slug, error = %err, "cache write failed");
    }

    Ok(set)
}

fn stage_of(err: &ComponentError) -> FailureStage {
    match err {
        ComponentError::Remote(_) => FailureStage::Fetch,
        ComponentError::Cache(_) => FailureStage::CacheRead,
        ComponentError::MissingLanguage(_) => FailureStage::MissingLanguage,
        ComponentError::Format(_) => FailureStage::Format,
        ComponentError::Parse(_) => FailureStage::Parse,
    }
}

fn log_failure(ctx: &RunContext, cmp: &Component, err: &ComponentError) {
    let slug = cmp.slug();
    let slug = slug.as_str();
    match err {
        ComponentError::Format(FormatError {
            language,
            payload,
            source,
        }) => {
            warn!(
                slug,
                language = %language,
                error = %source,
                payload = %payload,
                "invalid translation payload"
            );
        }
        ComponentError::Parse(parse) => {
            warn!(
                slug,
                file = %cmp.source().display(),
                language = %ctx.target_language,
                error = %parse,
                "component rejected"
            );
        }
        other => warn!(slug, error = %other, "component skipped"),
    }
}
