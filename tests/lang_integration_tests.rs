//! Integration Tests for the Lang Services
//!
//! Runs the HTTP source and the grouped cache against an in-process locale
//! server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use locale_cache::cache::{FileStorage, MemoryCache, StorageCache};
use locale_cache::{CacheError, CachedLangService, HttpLangService, LangService, TransportError};

// == Mock Locale Server ==

#[derive(Clone, Default)]
struct LocaleServer {
    translate_hits: Arc<AtomicUsize>,
    down: Arc<AtomicBool>,
}

impl LocaleServer {
    fn hits(&self) -> usize {
        self.translate_hits.load(Ordering::SeqCst)
    }
}

fn table(lang: &str) -> HashMap<&'static str, &'static str> {
    match lang {
        "de" => HashMap::from([
            ("common.hello", "Hallo"),
            ("common.bye", "Tschüss"),
            ("nav.home", "Startseite"),
        ]),
        _ => HashMap::from([
            ("common.hello", "Hi"),
            ("common.bye", "Bye"),
            ("nav.home", "Home"),
        ]),
    }
}

async fn language_handler() -> &'static str {
    "en"
}

async fn languages_handler() -> Json<Vec<&'static str>> {
    Json(vec!["de", "en"])
}

async fn translate_handler(
    State(server): State<LocaleServer>,
    Path(path): Path<String>,
) -> Response {
    server.translate_hits.fetch_add(1, Ordering::SeqCst);
    if server.down.load(Ordering::SeqCst) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let (lang, name) = path.split_once('/').unwrap_or(("en", path.as_str()));
    let table = table(lang);

    if let Some(stem) = name.strip_suffix('*') {
        let group: HashMap<String, String> = table
            .iter()
            .filter(|(key, _)| key.starts_with(stem))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        return Json(group).into_response();
    }

    match table.get(name) {
        Some(value) => value.to_string().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// == Helper Functions ==

async fn spawn_server(server: LocaleServer) -> String {
    let app = Router::new()
        .route("/mir/rsc/locale/language", get(language_handler))
        .route("/mir/rsc/locale/languages", get(languages_handler))
        .route("/mir/rsc/locale/translate/*path", get(translate_handler))
        .with_state(server);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/mir")
}

fn common_en() -> HashMap<String, String> {
    HashMap::from([
        ("common.hello".to_string(), "Hi".to_string()),
        ("common.bye".to_string(), "Bye".to_string()),
    ])
}

// == Raw Endpoint Tests ==

#[tokio::test]
async fn test_current_language_and_languages() {
    let base = spawn_server(LocaleServer::default()).await;
    let source = HttpLangService::new(&base).unwrap();

    assert_eq!(source.current_language().await.unwrap(), "en");
    assert_eq!(source.languages().await.unwrap(), vec!["de", "en"]);
}

#[tokio::test]
async fn test_uncached_translate_hits_server_each_time() {
    let server = LocaleServer::default();
    let base = spawn_server(server.clone()).await;
    let mut service = CachedLangService::new(HttpLangService::new(&base).unwrap());

    assert_eq!(service.translate("nav.home").await.unwrap(), "Home");
    assert_eq!(service.translate("nav.home").await.unwrap(), "Home");
    assert_eq!(server.hits(), 2);
}

#[tokio::test]
async fn test_uncached_missing_key_is_not_found() {
    let base = spawn_server(LocaleServer::default()).await;
    let mut service = CachedLangService::new(HttpLangService::new(&base).unwrap());

    let result = service.translate("missing.key").await;
    assert!(matches!(
        result,
        Err(CacheError::Transport(TransportError::NotFound))
    ));
}

#[tokio::test]
async fn test_language_selects_table() {
    let base = spawn_server(LocaleServer::default()).await;
    let mut service =
        CachedLangService::new(HttpLangService::new(&base).unwrap()).lang(Some("de".to_string()));

    assert_eq!(service.translate("common.hello").await.unwrap(), "Hallo");
    let group = service.get_translations("nav.*").await.unwrap();
    assert_eq!(group.get("nav.home").map(String::as_str), Some("Startseite"));
}

// == Cached Service Tests ==

#[tokio::test]
async fn test_cached_translate_fallback_then_retry() {
    let server = LocaleServer::default();
    let base = spawn_server(server.clone()).await;
    let mut service = CachedLangService::with_cache(
        HttpLangService::new(&base).unwrap(),
        MemoryCache::<String>::new(),
    );

    assert_eq!(service.translate("missing.key").await.unwrap(), "??missing.key??");
    assert_eq!(service.translate("missing.key").await.unwrap(), "??missing.key??");
    assert_eq!(server.hits(), 2);

    assert_eq!(service.translate("nav.home").await.unwrap(), "Home");
    assert_eq!(service.translate("nav.home").await.unwrap(), "Home");
    assert_eq!(server.hits(), 3);
}

#[tokio::test]
async fn test_cached_group_fetched_once() {
    let server = LocaleServer::default();
    let base = spawn_server(server.clone()).await;
    let mut service: Box<dyn LangService> = Box::new(CachedLangService::with_cache(
        HttpLangService::new(&base).unwrap(),
        MemoryCache::<String>::new(),
    ));

    assert_eq!(service.get_translations("common.*").await.unwrap(), common_en());
    assert_eq!(service.get_translations("common.*").await.unwrap(), common_en());
    assert_eq!(service.translate("common.bye").await.unwrap(), "Bye");
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn test_cached_group_failure_propagates() {
    let server = LocaleServer::default();
    server.down.store(true, Ordering::SeqCst);
    let base = spawn_server(server.clone()).await;
    let mut service = CachedLangService::with_cache(
        HttpLangService::new(&base).unwrap(),
        MemoryCache::<String>::new(),
    );

    let result = service.get_translations("common.*").await;
    assert!(matches!(
        result,
        Err(CacheError::Transport(TransportError::Status { status: 503, .. }))
    ));

    server.down.store(false, Ordering::SeqCst);
    assert_eq!(service.get_translations("common.*").await.unwrap(), common_en());
}

#[tokio::test]
async fn test_file_cache_survives_restart() {
    let server = LocaleServer::default();
    let base = spawn_server(server.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locale-cache.json");

    {
        let store: StorageCache<String, _> = StorageCache::new(FileStorage::open(&path).unwrap());
        let mut service =
            CachedLangService::with_cache(HttpLangService::new(&base).unwrap(), store).ttl(3600);
        assert_eq!(service.get_translations("common.*").await.unwrap(), common_en());
    }

    let store: StorageCache<String, _> = StorageCache::new(FileStorage::open(&path).unwrap());
    let mut service = CachedLangService::with_cache(HttpLangService::new(&base).unwrap(), store);

    assert_eq!(service.get_translations("common.*").await.unwrap(), common_en());
    assert_eq!(service.translate("common.hello").await.unwrap(), "Hi");
    assert_eq!(server.hits(), 1);
}
