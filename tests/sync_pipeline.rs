mod common;

use std::fs;

use common::*;
use sekai_sync::services::pipeline::FailureStage;
use sekai_sync::{
    run, CancelToken, Outcome, RawDumpMode, ResourceParser, RunContext, TranslationCache,
};

fn ctx() -> RunContext {
    RunContext::new(SOURCE, TARGET)
}

#[test]
fn language_code_is_first_two_letters() {
    assert_eq!(ctx().language_code(), "zh");
    assert_eq!(RunContext::new("en", "x").language_code(), "x");
}

#[test]
fn cached_slug_is_never_fetched_nor_rewritten() {
    let dir = tempfile::tempdir().unwrap();
    let cache = TranslationCache::new(dir.path());
    let intro = category("intro", "Hello");

    let set = translated_set(intro.records(), &titled("你好"));
    cache.store(&intro.slug(), &set).unwrap();
    let before = fs::read(cache.entry_path(&intro.slug())).unwrap();

    let mut source = FakeSource::default();
    let mut parser = ResourceParser::new();
    let report = run(
        &ctx(),
        &[intro.clone()],
        &mut source,
        &cache,
        &mut parser,
        &CancelToken::new(),
    );

    assert!(source.calls.is_empty());
    assert_eq!(report.cache_hits, 1);
    assert_eq!(report.fetched, 0);
    assert_eq!(fs::read(cache.entry_path(&intro.slug())).unwrap(), before);

    let dump = cache
        .dump_path(&intro.slug(), TARGET, RawDumpMode::Separate)
        .unwrap();
    assert_eq!(fs::read_to_string(dump).unwrap(), set.get(TARGET).unwrap());
}

#[test]
fn fetched_translations_are_cached_for_the_next_run() {
    let dir = tempfile::tempdir().unwrap();
    let cache = TranslationCache::new(dir.path());
    let components = vec![category("travel", "Travel")];

    let mut source = FakeSource::translating(&components);
    let first = run(
        &ctx(),
        &components,
        &mut source,
        &cache,
        &mut ResourceParser::new(),
        &CancelToken::new(),
    );
    assert_eq!(first.fetched, 1);
    assert!(cache.contains("category___travel").unwrap());

    let mut offline = FakeSource::default();
    let second = run(
        &ctx(),
        &components,
        &mut offline,
        &cache,
        &mut ResourceParser::new(),
        &CancelToken::new(),
    );
    assert!(offline.calls.is_empty());
    assert_eq!(second.cache_hits, 1);
    assert_eq!(second.translated, 1);
}

#[test]
fn one_remote_failure_does_not_stop_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let cache = TranslationCache::new(dir.path());
    let components = vec![
        category("a", "A"),
        category("b", "B"),
        category("c", "C"),
    ];
    let mut source = FakeSource::translating(&components).fail("category___b");
    let mut parser = ResourceParser::new();

    let report = run(
        &ctx(),
        &components,
        &mut source,
        &cache,
        &mut parser,
        &CancelToken::new(),
    );

    assert_eq!(report.processed, 3);
    assert_eq!(report.failed, 1);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].slug, "category___b");
    assert_eq!(failures[0].outcome, Outcome::Failed(FailureStage::Fetch));
    assert!(!cache.contains("category___b").unwrap());

    let ids: Vec<_> = parser
        .tree()
        .language("zh")
        .unwrap()
        .categories()
        .iter()
        .map(|c| c.id().to_string())
        .collect();
    assert_eq!(ids, ["a", "c"]);
}

#[test]
fn translated_and_untranslated_are_told_apart() {
    let dir = tempfile::tempdir().unwrap();
    let cache = TranslationCache::new(dir.path());
    let intro = category("intro", "Hello");
    let faq = category("faq", "FAQ");

    cache
        .store(&intro.slug(), &translated_set(intro.records(), &titled("你好")))
        .unwrap();
    // Untranslated fallback: the target text is the English text.
    cache
        .store(&faq.slug(), &translated_set(faq.records(), faq.records()))
        .unwrap();

    let mut parser = ResourceParser::new();
    let report = run(
        &ctx(),
        &[intro, faq],
        &mut FakeSource::default(),
        &cache,
        &mut parser,
        &CancelToken::new(),
    );

    assert_eq!(report.outcomes[0].slug, "category___intro");
    assert_eq!(report.outcomes[0].outcome, Outcome::Translated);
    assert_eq!(report.outcomes[1].slug, "category___faq");
    assert_eq!(report.outcomes[1].outcome, Outcome::NotTranslated);
    assert_eq!((report.translated, report.not_translated), (1, 1));

    // Untranslated content still lands in the tree.
    let zh = parser.tree().language("zh").unwrap();
    assert_eq!(zh.category("faq").unwrap().record()["title"], "FAQ");
}

#[test]
fn missing_language_bad_payload_and_bad_cache_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let cache = TranslationCache::new(dir.path());
    let no_lang = category("a", "A");
    let bad_payload = category("b", "B");
    let bad_cache = category("c", "C");
    let good = category("d", "D");

    let source = FakeSource::translating(&[good.clone()])
        .answer(
            &no_lang.slug(),
            [(SOURCE, "[{\"title\":\"A\"}]")].into_iter().collect(),
        )
        .answer(
            &bad_payload.slug(),
            [(SOURCE, "[{\"title\":\"B\"}]"), (TARGET, "not json at all")]
                .into_iter()
                .collect(),
        );
    fs::write(cache.entry_path(&bad_cache.slug()), "{ truncated").unwrap();

    let mut source = source;
    let mut parser = ResourceParser::new();
    let report = run(
        &ctx(),
        &[no_lang, bad_payload, bad_cache, good],
        &mut source,
        &cache,
        &mut parser,
        &CancelToken::new(),
    );

    let stages: Vec<_> = report.outcomes.iter().map(|o| o.outcome).collect();
    assert_eq!(
        stages,
        [
            Outcome::Failed(FailureStage::MissingLanguage),
            Outcome::Failed(FailureStage::Format),
            Outcome::Failed(FailureStage::CacheRead),
            Outcome::Translated,
        ]
    );
    assert_eq!(parser.tree().language("zh").unwrap().categories().len(), 1);
}

#[test]
fn children_of_a_failed_category_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cache = TranslationCache::new(dir.path());
    let components = vec![
        category("travel", "Travel"),
        subcategory("travel", "planning", "Planning"),
        item("travel", "planning", "packing", "Packing"),
    ];
    let mut source = FakeSource::translating(&components).fail("category___travel");

    let report = run(
        &ctx(),
        &components,
        &mut source,
        &cache,
        &mut ResourceParser::new(),
        &CancelToken::new(),
    );

    let stages: Vec<_> = report.outcomes.iter().map(|o| o.outcome).collect();
    assert_eq!(
        stages,
        [
            Outcome::Failed(FailureStage::Fetch),
            Outcome::Failed(FailureStage::Parse),
            Outcome::Failed(FailureStage::Parse),
        ]
    );
    // Fetched translations are still cached even though parsing failed.
    assert!(cache.contains("item___travel___planning___packing").unwrap());
}

#[test]
fn cancellation_stops_before_the_next_component() {
    let dir = tempfile::tempdir().unwrap();
    let cache = TranslationCache::new(dir.path());
    let components: Vec<_> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|id| category(id, id))
        .collect();

    let token = CancelToken::new();
    let mut source = FakeSource::translating(&components);
    source.cancel = Some((token.clone(), 2));
    let mut parser = ResourceParser::new();

    let report = run(&ctx(), &components, &mut source, &cache, &mut parser, &token);

    // The component in flight when the interrupt arrived still finished.
    assert!(report.interrupted);
    assert_eq!(report.processed, 2);
    assert_eq!(source.calls, ["category___a", "category___b"]);
    assert_eq!(report.translated, 2);
    assert_eq!(parser.tree().language("zh").unwrap().categories().len(), 2);
}

#[test]
fn shared_dump_mode_overwrites_the_cache_entry() {
    let dir = tempfile::tempdir().unwrap();
    let cache = TranslationCache::new(dir.path());
    let components = vec![category("travel", "Travel")];
    let mut ctx = ctx();
    ctx.raw_dump = RawDumpMode::SharedWithCache;

    let mut source = FakeSource::translating(&components);
    let first = run(
        &ctx,
        &components,
        &mut source,
        &cache,
        &mut ResourceParser::new(),
        &CancelToken::new(),
    );
    assert_eq!(first.translated, 1);

    // The entry now holds the bare target text, so the next run cannot use it.
    let second = run(
        &ctx,
        &components,
        &mut source,
        &cache,
        &mut ResourceParser::new(),
        &CancelToken::new(),
    );
    assert_eq!(
        second.outcomes[0].outcome,
        Outcome::Failed(FailureStage::CacheRead)
    );
    assert_eq!(source.calls.len(), 1);
}

#[test]
fn cache_write_failure_is_counted_but_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let cache = TranslationCache::new(dir.path());
    let components = vec![category("a", "A")];

    // A directory squatting on the staging file makes the write fail.
    let staging = dir
        .path()
        .join(format!(".category___a.{}.tmp", std::process::id()));
    fs::create_dir(&staging).unwrap();

    let mut source = FakeSource::translating(&components);
    let mut parser = ResourceParser::new();
    let report = run(
        &ctx(),
        &components,
        &mut source,
        &cache,
        &mut parser,
        &CancelToken::new(),
    );

    assert_eq!(report.fetched, 1);
    assert_eq!(report.cache_write_errors, 1);
    assert_eq!(report.translated, 1);
    assert_eq!(report.failed, 0);
    assert!(!cache.contains("category___a").unwrap());
    assert_eq!(
        parser.tree().language("zh").unwrap().category("a").unwrap().record()["title"],
        "譯:A"
    );
}
