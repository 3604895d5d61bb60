//! Unit and router tests for the artwork crate

#[cfg(test)]
mod fixtures {
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::application::config::ArtworkConfig;
    use crate::application::generation::GenerationPoller;
    use crate::application::resolve_image::ImageResolver;
    use crate::domain::services::{FetchedImage, ImageFetcher, ImageGenerator, ImageStore, JobStatus};
    use crate::error::{ArtworkError, ArtworkResult};

    pub const STORE_PREFIX: &str = "https://store.test/";
    pub const PLACEHOLDER: &str = "https://api.test/imagenes/robot.jpg";

    /// Image store that keeps uploads in memory
    #[derive(Default)]
    pub struct FakeStore {
        pub uploads: Mutex<Vec<(Vec<u8>, String)>>,
    }

    impl FakeStore {
        pub fn upload_count(&self) -> usize {
            self.uploads.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ImageStore for FakeStore {
        async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> ArtworkResult<String> {
            let mut uploads = self.uploads.lock().unwrap();
            uploads.push((bytes, content_type.to_string()));
            Ok(format!("{}img{}", STORE_PREFIX, uploads.len()))
        }

        fn owns(&self, url: &str) -> bool {
            url.starts_with(STORE_PREFIX)
        }
    }

    /// Serves a fixed set of URLs
    #[derive(Default)]
    pub struct FakeFetcher {
        pub images: HashMap<String, Vec<u8>>,
    }

    impl FakeFetcher {
        pub fn with(url: &str, bytes: &[u8]) -> Self {
            let mut images = HashMap::new();
            images.insert(url.to_string(), bytes.to_vec());
            Self { images }
        }
    }

    #[async_trait]
    impl ImageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str, max_bytes: usize) -> ArtworkResult<FetchedImage> {
            let bytes = self
                .images
                .get(url)
                .ok_or_else(|| ArtworkError::ImageDownload("status 404 Not Found".into()))?;
            if bytes.len() > max_bytes {
                return Err(ArtworkError::ImageDownload("image too large".into()));
            }
            Ok(FetchedImage {
                bytes: bytes.clone(),
                content_type: "image/jpeg".into(),
            })
        }
    }

    /// Answers status checks from a script; `Err` entries are transport
    /// failures. An exhausted script keeps answering `Pending`.
    pub struct ScriptedGenerator {
        script: Mutex<VecDeque<Result<JobStatus, String>>>,
        pub submits: AtomicU32,
        pub checks: AtomicU32,
    }

    impl ScriptedGenerator {
        pub fn new(script: Vec<Result<JobStatus, String>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                submits: AtomicU32::new(0),
                checks: AtomicU32::new(0),
            }
        }

        pub fn checks(&self) -> u32 {
            self.checks.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageGenerator for ScriptedGenerator {
        async fn submit(&self, _prompt: &str) -> ArtworkResult<String> {
            let n = self.submits.fetch_add(1, Ordering::SeqCst);
            Ok(format!("job-{}", n))
        }

        async fn check(&self, _job_id: &str) -> ArtworkResult<JobStatus> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            match self.script.lock().unwrap().pop_front() {
                Some(Ok(status)) => Ok(status),
                Some(Err(reason)) => Err(ArtworkError::Upstream(reason)),
                None => Ok(JobStatus::Pending),
            }
        }
    }

    pub fn config() -> ArtworkConfig {
        ArtworkConfig {
            max_image_bytes: 16,
            poll_interval: Duration::ZERO,
            poll_max_attempts: 3,
            placeholder_image_url: PLACEHOLDER.to_string(),
        }
    }

    pub fn poller(generator: Arc<ScriptedGenerator>) -> GenerationPoller {
        let config = config();
        GenerationPoller::new(generator, config.poll_interval, config.poll_max_attempts)
    }

    pub fn resolver(
        store: Arc<FakeStore>,
        fetcher: FakeFetcher,
        generator: Option<Arc<ScriptedGenerator>>,
    ) -> ImageResolver {
        ImageResolver::new(
            store,
            Arc::new(fetcher),
            generator.map(poller),
            Arc::new(config()),
        )
    }

    pub fn resolver_with_config(
        store: Arc<dyn ImageStore>,
        fetcher: FakeFetcher,
        config: ArtworkConfig,
    ) -> ImageResolver {
        ImageResolver::new(store, Arc::new(fetcher), None, Arc::new(config))
    }
}

#[cfg(test)]
mod generation_tests {
    use std::sync::Arc;

    use super::fixtures::{ScriptedGenerator, poller};
    use crate::application::generation::GenerationState;
    use crate::domain::services::JobStatus;
    use crate::error::ArtworkError;

    fn done(url: &str) -> Result<JobStatus, String> {
        Ok(JobStatus::Done {
            image_url: url.to_string(),
        })
    }

    #[tokio::test]
    async fn test_reaches_done_after_pending_checks() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok(JobStatus::Pending),
            done("https://cdn.test/out.webp"),
        ]));
        let poller = poller(generator.clone());

        let url = poller.run("a sunset").await.unwrap();
        assert_eq!(url, "https://cdn.test/out.webp");
        assert_eq!(generator.checks(), 2);
    }

    #[tokio::test]
    async fn test_step_transitions() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok(JobStatus::Pending),
            done("u"),
        ]));
        let poller = poller(generator);

        let state = poller.start("p").await.unwrap();
        assert_eq!(state, GenerationState::Submitted { job: "job-0".into() });

        let state = poller.step(state).await.unwrap();
        assert_eq!(
            state,
            GenerationState::Polling {
                job: "job-0".into(),
                attempt: 0
            }
        );

        let state = poller.step(state).await.unwrap();
        assert_eq!(
            state,
            GenerationState::Polling {
                job: "job-0".into(),
                attempt: 1
            }
        );

        let state = poller.step(state).await.unwrap();
        assert_eq!(state, GenerationState::Done { image_url: "u".into() });
        assert!(state.is_terminal());

        // Terminal states do not move
        assert_eq!(poller.step(state.clone()).await.unwrap(), state);
    }

    #[tokio::test]
    async fn test_faulted_is_upstream_failure() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(JobStatus::Faulted {
            reason: "nsfw".into(),
        })]));

        let err = poller(generator).run("p").await.err().unwrap();
        assert!(matches!(err, ArtworkError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_exhausted_after_attempt_budget() {
        let generator = Arc::new(ScriptedGenerator::new(vec![]));
        let poller = poller(generator.clone());

        let err = poller.run("p").await.err().unwrap();
        assert!(matches!(err, ArtworkError::Upstream(_)));
        assert_eq!(generator.checks(), 3);

        let exhausted = poller
            .step(GenerationState::Polling {
                job: "j".into(),
                attempt: 3,
            })
            .await
            .unwrap();
        assert_eq!(
            exhausted,
            GenerationState::Exhausted {
                job: "j".into(),
                attempts: 3
            }
        );
    }

    #[tokio::test]
    async fn test_transport_error_stops_polling() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok(JobStatus::Pending),
            Err("connection reset".into()),
            done("never"),
        ]));

        let err = poller(generator.clone()).run("p").await.err().unwrap();
        assert!(matches!(err, ArtworkError::Upstream(_)));
        assert_eq!(generator.checks(), 2);
    }
}

#[cfg(test)]
mod resolver_tests {
    use std::sync::Arc;

    use super::fixtures::{
        FakeFetcher, FakeStore, PLACEHOLDER, STORE_PREFIX, ScriptedGenerator, config, resolver,
        resolver_with_config,
    };
    use crate::domain::services::{ImageStore, JobStatus};
    use crate::domain::value_objects::ImageSource;
    use crate::error::ArtworkError;
    use crate::infra::local_store::LocalImageStore;

    #[tokio::test]
    async fn test_inline_is_uploaded() {
        let store = Arc::new(FakeStore::default());
        let resolver = resolver(store.clone(), FakeFetcher::default(), None);

        let url = resolver
            .resolve(
                ImageSource::Inline {
                    content_type: "image/png".into(),
                    bytes: b"png".to_vec(),
                },
                "p",
            )
            .await
            .unwrap();

        assert!(url.starts_with(STORE_PREFIX));
        let uploads = store.uploads.lock().unwrap();
        assert_eq!(uploads[0], (b"png".to_vec(), "image/png".to_string()));
    }

    #[tokio::test]
    async fn test_inline_over_cap_is_rejected() {
        let store = Arc::new(FakeStore::default());
        let resolver = resolver(store.clone(), FakeFetcher::default(), None);

        let err = resolver
            .resolve(
                ImageSource::Inline {
                    content_type: "image/png".into(),
                    bytes: vec![0; 17],
                },
                "p",
            )
            .await
            .err()
            .unwrap();

        assert!(matches!(err, ArtworkError::InvalidImage(_)));
        assert_eq!(store.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_own_url_is_reused() {
        let store = Arc::new(FakeStore::default());
        let resolver = resolver(store.clone(), FakeFetcher::default(), None);
        let own = format!("{}preview", STORE_PREFIX);

        let url = resolver
            .resolve(ImageSource::Remote(own.clone()), "p")
            .await
            .unwrap();

        assert_eq!(url, own);
        assert_eq!(store.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_own_local_url_without_file_is_not_found() {
        let dir = std::env::temp_dir().join(format!("artwork-resolver-{}", uuid::Uuid::new_v4()));
        let store = Arc::new(LocalImageStore::new(&dir, "http://api.test"));
        let kept = store.upload(b"kept".to_vec(), "image/png").await.unwrap();
        let resolver = resolver_with_config(store, FakeFetcher::default(), config());

        let url = resolver.resolve(ImageSource::Remote(kept.clone()), "p").await.unwrap();
        assert_eq!(url, kept);

        let err = resolver
            .resolve(
                ImageSource::Remote("http://api.test/imagenes/borrada.png".into()),
                "p",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ArtworkError::StoredImageNotFound));

        let _ = tokio::fs::remove_dir_all(dir).await;
    }

    #[tokio::test]
    async fn test_remote_url_is_copied() {
        let store = Arc::new(FakeStore::default());
        let fetcher = FakeFetcher::with("https://example.com/a.jpg", b"jpeg");
        let resolver = resolver(store.clone(), fetcher, None);

        let url = resolver
            .resolve(ImageSource::Remote("https://example.com/a.jpg".into()), "p")
            .await
            .unwrap();

        assert!(url.starts_with(STORE_PREFIX));
        assert_eq!(store.uploads.lock().unwrap()[0].0, b"jpeg".to_vec());
    }

    #[tokio::test]
    async fn test_unreachable_url_is_bad_request() {
        let resolver = resolver(Arc::new(FakeStore::default()), FakeFetcher::default(), None);

        let err = resolver
            .resolve(ImageSource::Remote("https://example.com/404.jpg".into()), "p")
            .await
            .err()
            .unwrap();

        assert!(matches!(err, ArtworkError::ImageDownload(_)));
    }

    #[tokio::test]
    async fn test_absent_without_generator_uses_placeholder() {
        let store = Arc::new(FakeStore::default());
        let resolver = resolver(store.clone(), FakeFetcher::default(), None);

        let url = resolver.resolve(ImageSource::Absent, "p").await.unwrap();
        assert_eq!(url, PLACEHOLDER);
        assert_eq!(store.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_absent_with_generator_uploads_result() {
        let store = Arc::new(FakeStore::default());
        let fetcher = FakeFetcher::with("https://cdn.test/gen.webp", b"generated");
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(JobStatus::Done {
            image_url: "https://cdn.test/gen.webp".into(),
        })]));
        let resolver = resolver(store.clone(), fetcher, Some(generator));

        let url = resolver.resolve(ImageSource::Absent, "p").await.unwrap();
        assert!(url.starts_with(STORE_PREFIX));
        assert_eq!(store.uploads.lock().unwrap()[0].0, b"generated".to_vec());
    }

    #[tokio::test]
    async fn test_generated_image_missing_is_upstream() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(JobStatus::Done {
            image_url: "https://cdn.test/gone.webp".into(),
        })]));
        let resolver = resolver(
            Arc::new(FakeStore::default()),
            FakeFetcher::default(),
            Some(generator),
        );

        let err = resolver.resolve(ImageSource::Absent, "p").await.err().unwrap();
        assert!(matches!(err, ArtworkError::Upstream(_)));
    }
}

#[cfg(test)]
mod use_case_tests {
    use std::sync::Arc;

    use auth::domain::value_object::{display_name::DisplayName, email::Email};
    use auth::{MemoryUserRepository, User, UserRepository};
    use chrono::{Duration, Utc};
    use kernel::id::{ArtworkId, UserId};
    use tokio_test::assert_ok;

    use super::fixtures::{FakeFetcher, FakeStore, PLACEHOLDER, resolver};
    use crate::application::{
        CreateArtworkInput, CreateArtworkUseCase, DeleteArtworkUseCase, ListFeedUseCase,
        ListOwnUseCase, RateArtworkUseCase, SetVisibilityUseCase,
    };
    use crate::domain::entities::{Artwork, ArtworkDraft};
    use crate::domain::repository::ArtworkRepository;
    use crate::error::ArtworkError;
    use crate::infra::memory::MemoryArtworkRepository;

    struct World {
        repo: Arc<MemoryArtworkRepository>,
        alice: UserId,
        bob: UserId,
    }

    async fn user(users: &MemoryUserRepository, email: &str, name: &str) -> UserId {
        let user = User::new_external(Email::new(email).unwrap(), DisplayName::new(name).unwrap());
        users.create(&user).await.unwrap();
        user.user_id
    }

    async fn world() -> World {
        let users = MemoryUserRepository::new();
        let alice = user(&users, "alice@example.com", "Alice").await;
        let bob = user(&users, "bob@example.com", "Bob").await;
        World {
            repo: Arc::new(MemoryArtworkRepository::new(users)),
            alice,
            bob,
        }
    }

    fn draft(nombre: &str) -> ArtworkDraft {
        ArtworkDraft {
            nombre: nombre.into(),
            descripcion: "d".into(),
            tipo_arte: "digital".into(),
        }
    }

    async fn artwork(world: &World, owner: UserId, nombre: &str) -> ArtworkId {
        let artwork = Artwork::new(draft(nombre), "https://img.test/x.jpg".into(), owner);
        world.repo.create(&artwork).await.unwrap();
        artwork.id
    }

    fn rate(world: &World) -> RateArtworkUseCase<MemoryArtworkRepository, MemoryArtworkRepository> {
        RateArtworkUseCase::new(world.repo.clone(), world.repo.clone())
    }

    #[tokio::test]
    async fn test_create_persists_published_artwork() {
        let world = world().await;
        let use_case = CreateArtworkUseCase::new(
            world.repo.clone(),
            Arc::new(resolver(Arc::new(FakeStore::default()), FakeFetcher::default(), None)),
        );

        let output = use_case
            .execute(
                world.alice,
                CreateArtworkInput {
                    draft: draft("Sunset"),
                    prompt: "orange sky".into(),
                    imagen: None,
                    solo_generar: false,
                },
            )
            .await
            .unwrap();

        assert_eq!(output.archivo, PLACEHOLDER);
        let id = output.id.unwrap();
        let view = world.repo.find_view(&id, None).await.unwrap().unwrap();
        assert!(view.artwork.publicada);
        assert_eq!(view.autor_nombre, "Alice");
        assert_eq!(view.artwork.archivo_jpg, PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_preview_is_not_persisted() {
        let world = world().await;
        let use_case = CreateArtworkUseCase::new(
            world.repo.clone(),
            Arc::new(resolver(Arc::new(FakeStore::default()), FakeFetcher::default(), None)),
        );

        let output = use_case
            .execute(
                world.alice,
                CreateArtworkInput {
                    draft: draft("Preview"),
                    prompt: "p".into(),
                    imagen: Some("   ".into()),
                    solo_generar: true,
                },
            )
            .await
            .unwrap();

        assert!(output.id.is_none());
        assert!(world.repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_image_form() {
        let world = world().await;
        let use_case = CreateArtworkUseCase::new(
            world.repo.clone(),
            Arc::new(resolver(Arc::new(FakeStore::default()), FakeFetcher::default(), None)),
        );

        let result = use_case
            .execute(
                world.alice,
                CreateArtworkInput {
                    draft: draft("Bad"),
                    prompt: "p".into(),
                    imagen: Some("robot.jpg".into()),
                    solo_generar: false,
                },
            )
            .await;

        assert!(matches!(result, Err(ArtworkError::InvalidImage(_))));
        assert!(world.repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_score_out_of_range_persists_nothing() {
        let world = world().await;
        let id = artwork(&world, world.alice, "A").await;

        for score in [0, 6, -3] {
            let result = rate(&world).execute(&world.bob, &id, score).await;
            assert!(matches!(result, Err(ArtworkError::InvalidScore)));
        }
        assert_eq!(world.repo.rating_count().await, 0);
    }

    #[tokio::test]
    async fn test_second_rating_is_conflict_and_keeps_score() {
        let world = world().await;
        let id = artwork(&world, world.alice, "A").await;

        assert_ok!(rate(&world).execute(&world.bob, &id, 4).await);
        let second = rate(&world).execute(&world.bob, &id, 1).await;
        assert!(matches!(second, Err(ArtworkError::AlreadyRated)));

        let view = world.repo.find_view(&id, Some(&world.bob)).await.unwrap().unwrap();
        assert_eq!(view.puntuacion_usuario, Some(4));
        assert_eq!(view.cantidad_valoraciones, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_ratings_by_one_viewer_keep_one() {
        let world = world().await;
        let id = artwork(&world, world.alice, "A").await;

        let first = {
            let rate = rate(&world);
            let bob = world.bob;
            tokio::spawn(async move { rate.execute(&bob, &id, 5).await })
        };
        let second = {
            let rate = rate(&world);
            let bob = world.bob;
            tokio::spawn(async move { rate.execute(&bob, &id, 2).await })
        };
        let results = [first.await.unwrap(), second.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(ArtworkError::AlreadyRated)))
                .count(),
            1
        );
        assert_eq!(world.repo.rating_count().await, 1);
    }

    #[tokio::test]
    async fn test_rating_missing_artwork_is_not_found() {
        let world = world().await;
        let result = rate(&world).execute(&world.bob, &ArtworkId::new(), 3).await;
        assert!(matches!(result, Err(ArtworkError::ArtworkNotFound)));
    }

    #[tokio::test]
    async fn test_average_is_rounded() {
        let world = world().await;
        let id = artwork(&world, world.alice, "A").await;

        assert_ok!(rate(&world).execute(&world.alice, &id, 5).await);
        assert_ok!(rate(&world).execute(&world.bob, &id, 4).await);

        let view = world.repo.find_view(&id, None).await.unwrap().unwrap();
        assert_eq!(view.promedio_valoracion, Some(4.5));
        assert_eq!(view.cantidad_valoraciones, 2);
        assert!(!view.ya_valorada);
    }

    #[tokio::test]
    async fn test_delete_removes_artwork_and_ratings() {
        let world = world().await;
        let id = artwork(&world, world.alice, "A").await;
        let other = artwork(&world, world.alice, "B").await;
        assert_ok!(rate(&world).execute(&world.bob, &id, 5).await);
        assert_ok!(rate(&world).execute(&world.bob, &other, 2).await);

        let not_owner = DeleteArtworkUseCase::new(world.repo.clone())
            .execute(&world.bob, &id)
            .await;
        assert!(matches!(not_owner, Err(ArtworkError::ArtworkNotFound)));

        assert_ok!(
            DeleteArtworkUseCase::new(world.repo.clone())
                .execute(&world.alice, &id)
                .await
        );

        assert!(world.repo.find_view(&id, None).await.unwrap().is_none());
        assert_eq!(world.repo.rating_count().await, 1);

        let again = DeleteArtworkUseCase::new(world.repo.clone())
            .execute(&world.alice, &id)
            .await;
        assert!(matches!(again, Err(ArtworkError::ArtworkNotFound)));
    }

    #[tokio::test]
    async fn test_visibility_requires_ownership() {
        let world = world().await;
        let id = artwork(&world, world.alice, "A").await;
        let use_case = SetVisibilityUseCase::new(world.repo.clone());

        let result = use_case.execute(&world.bob, &id, false).await;
        assert!(matches!(result, Err(ArtworkError::ArtworkNotFound)));
        let view = world.repo.find_view(&id, None).await.unwrap().unwrap();
        assert!(view.artwork.publicada);

        let view = use_case.execute(&world.alice, &id, false).await.unwrap();
        assert!(!view.artwork.publicada);

        let missing = use_case.execute(&world.alice, &ArtworkId::new(), true).await;
        assert!(matches!(missing, Err(ArtworkError::ArtworkNotFound)));
    }

    #[tokio::test]
    async fn test_feed_is_published_newest_first() {
        let world = world().await;
        let now = Utc::now();

        for (nombre, age_minutes, publicada) in
            [("old", 30, true), ("hidden", 10, false), ("new", 1, true), ("mid", 20, true)]
        {
            let mut artwork = Artwork::new(draft(nombre), "u".into(), world.alice);
            artwork.fecha = now - Duration::minutes(age_minutes);
            artwork.publicada = publicada;
            world.repo.create(&artwork).await.unwrap();
        }

        let feed = ListFeedUseCase::new(world.repo.clone())
            .execute(None)
            .await
            .unwrap();
        let names: Vec<&str> = feed.iter().map(|v| v.artwork.nombre.as_str()).collect();
        assert_eq!(names, ["new", "mid", "old"]);

        let own = ListOwnUseCase::new(world.repo.clone())
            .execute(&world.alice)
            .await
            .unwrap();
        assert_eq!(own.len(), 4);
        assert!(
            ListOwnUseCase::new(world.repo.clone())
                .execute(&world.bob)
                .await
                .unwrap()
                .is_empty()
        );
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use auth::presentation::AuthAppState;
    use auth::{AuthConfig, MemoryUserRepository, auth_router};
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::fixtures::{
        FakeFetcher, FakeStore, PLACEHOLDER, STORE_PREFIX, config, resolver_with_config,
    };
    use crate::application::config::ArtworkConfig;
    use crate::infra::memory::MemoryArtworkRepository;
    use crate::presentation::{ArtworkAppState, artwork_router};

    fn app() -> Router {
        app_with(config())
    }

    fn app_with(config: ArtworkConfig) -> Router {
        let users = MemoryUserRepository::new();
        let auth_state = AuthAppState::new(
            users.clone(),
            AuthConfig {
                token_secret: "router-test-secret".into(),
                ..Default::default()
            },
            None,
        );
        let middleware = auth_state.middleware_state();

        let fetcher = FakeFetcher::with("https://example.com/sunset.jpg", b"sunset");
        let state = ArtworkAppState::new(
            MemoryArtworkRepository::new(users),
            resolver_with_config(Arc::new(FakeStore::default()), fetcher, config),
        );

        Router::new()
            .nest("/usuarios", auth_router(auth_state))
            .nest("/obras", artwork_router(state, middleware))
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn sign_up(app: &Router, email: &str, name: &str) -> String {
        let (status, _) = call(
            app,
            Method::POST,
            "/usuarios/registrar",
            None,
            Some(json!({"email": email, "userName": name, "password": "paleta-de-colores"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(
            app,
            Method::POST,
            "/usuarios/login",
            None,
            Some(json!({"email": email, "password": "paleta-de-colores"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    fn sunset() -> Value {
        json!({
            "nombre": "Sunset",
            "descripcion": "Orange sky over the sea",
            "tipoArte": "fotografia",
            "prompt": "sunset",
            "imagen": "https://example.com/sunset.jpg",
        })
    }

    #[tokio::test]
    async fn test_publish_and_rate_flow() {
        let app = app();
        let token_a = sign_up(&app, "a@example.com", "Alicia").await;
        let token_b = sign_up(&app, "b@example.com", "Bruno").await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/obras/generar",
            Some(&token_a),
            Some(sunset()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mensaje"], "Obra generada y guardada");
        assert!(body["archivo"].as_str().unwrap().starts_with(STORE_PREFIX));
        let id = body["id"].as_str().unwrap().to_string();

        let (status, own) = call(&app, Method::GET, "/obras/mis-obras", Some(&token_a), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(own[0]["id"], id.as_str());
        assert_eq!(own[0]["nombre"], "Sunset");
        assert_eq!(own[0]["tipoArte"], "fotografia");
        assert_eq!(own[0]["autor_nombre"], "Alicia");

        let (_, feed) = call(&app, Method::GET, "/obras/muro", None, None).await;
        assert_eq!(feed[0]["id"], id.as_str());
        assert_eq!(feed[0]["promedio_valoracion"], Value::Null);
        assert_eq!(feed[0]["cantidad_valoraciones"], 0);
        assert_eq!(feed[0]["ya_valorada"], false);

        let rate_uri = format!("/obras/{}/valorar", id);
        let (status, body) = call(
            &app,
            Method::POST,
            &rate_uri,
            Some(&token_b),
            Some(json!({"puntuacion": 4})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["detail"], "Valoración registrada");

        let (_, feed) = call(&app, Method::GET, "/obras/muro", Some(&token_b), None).await;
        assert_eq!(feed[0]["promedio_valoracion"], 4.0);
        assert_eq!(feed[0]["cantidad_valoraciones"], 1);
        assert_eq!(feed[0]["ya_valorada"], true);
        assert_eq!(feed[0]["puntuacion_usuario"], 4);

        let (_, anonymous) = call(&app, Method::GET, "/obras/muro", None, None).await;
        assert_eq!(anonymous[0]["ya_valorada"], false);
        assert_eq!(anonymous[0]["puntuacion_usuario"], Value::Null);

        let (status, _) = call(
            &app,
            Method::POST,
            &rate_uri,
            Some(&token_b),
            Some(json!({"puntuacion": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_preview_then_reuse() {
        let app = app();
        let token = sign_up(&app, "a@example.com", "Alicia").await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/obras/generar?solo_generar=true",
            Some(&token),
            Some(sunset()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mensaje"], "Imagen generada temporalmente");
        assert!(body.get("id").is_none());
        let preview = body["archivo"].as_str().unwrap().to_string();

        let (_, all) = call(&app, Method::GET, "/obras/obras/todas", None, None).await;
        assert_eq!(all.as_array().unwrap().len(), 0);

        let mut request = sunset();
        request["imagen"] = json!(preview.clone());
        let (_, body) = call(&app, Method::POST, "/obras/generar", Some(&token), Some(request)).await;
        assert_eq!(body["archivo"], preview.as_str());

        let (_, all) = call(&app, Method::GET, "/obras/obras/todas", None, None).await;
        assert_eq!(all[0]["archivoJPG"], preview.as_str());
        assert!(all[0].get("autor_nombre").is_none());
    }

    #[tokio::test]
    async fn test_protected_routes_need_token() {
        let app = app();

        let (status, _) = call(&app, Method::POST, "/obras/generar", None, Some(sunset())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(&app, Method::GET, "/obras/mis-obras", Some("null"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(&app, Method::GET, "/obras/muro", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_owner_operations() {
        let app = app();
        let token_a = sign_up(&app, "a@example.com", "Alicia").await;
        let token_b = sign_up(&app, "b@example.com", "Bruno").await;

        let (_, body) = call(&app, Method::POST, "/obras/generar", Some(&token_a), Some(sunset())).await;
        let id = body["id"].as_str().unwrap().to_string();
        let publish_uri = format!("/obras/{}/publicar", id);

        let (status, _) = call(
            &app,
            Method::PATCH,
            &publish_uri,
            Some(&token_b),
            Some(json!({"publicada": false})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(
            &app,
            Method::PATCH,
            &publish_uri,
            Some(&token_a),
            Some(json!({"publicada": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["publicada"], false);
        assert_eq!(body["obra"]["publicada"], false);

        let (_, feed) = call(&app, Method::GET, "/obras/muro", None, None).await;
        assert!(feed.as_array().unwrap().is_empty());

        let (status, body) = call(&app, Method::PATCH, &publish_uri, Some(&token_a), Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["publicada"], true);

        let delete_uri = format!("/obras/{}", id);
        let (status, _) = call(&app, Method::DELETE, &delete_uri, Some(&token_b), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(&app, Method::DELETE, &delete_uri, Some(&token_a), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["detail"], "Obra eliminada");

        let (status, _) = call(&app, Method::DELETE, "/obras/not-an-id", Some(&token_a), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_inputs() {
        let app = app();
        let token = sign_up(&app, "a@example.com", "Alicia").await;

        let mut bad_image = sunset();
        bad_image["imagen"] = json!("data:image/png;base64,@@@");
        let (status, _) = call(&app, Method::POST, "/obras/generar", Some(&token), Some(bad_image)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut unreachable = sunset();
        unreachable["imagen"] = json!("https://example.com/missing.jpg");
        let (status, body) =
            call(&app, Method::POST, "/obras/generar", Some(&token), Some(unreachable)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "No se pudo descargar la imagen desde la URL");

        let (_, body) = call(&app, Method::POST, "/obras/generar", Some(&token), Some(sunset())).await;
        let id = body["id"].as_str().unwrap().to_string();
        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/obras/{}/valorar", id),
            Some(&token),
            Some(json!({"puntuacion": 9})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Puntuación inválida");
    }

    fn inline_png(len: usize) -> String {
        format!("data:image/png;base64,{}", platform::crypto::to_base64(&vec![7u8; len]))
    }

    #[tokio::test]
    async fn test_inline_image_larger_than_default_json_limit() {
        let app = app_with(ArtworkConfig {
            placeholder_image_url: PLACEHOLDER.to_string(),
            ..Default::default()
        });
        let token = sign_up(&app, "a@example.com", "Alicia").await;

        let mut big = sunset();
        big["imagen"] = json!(inline_png(3 * 1024 * 1024));
        let (status, body) = call(&app, Method::POST, "/obras/generar", Some(&token), Some(big)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["archivo"].as_str().unwrap().starts_with(STORE_PREFIX));
    }

    #[tokio::test]
    async fn test_oversize_body_is_json_bad_request() {
        let app = app();
        let token = sign_up(&app, "a@example.com", "Alicia").await;

        let mut big = sunset();
        big["imagen"] = json!(inline_png(128 * 1024));
        let (status, body) = call(&app, Method::POST, "/obras/generar", Some(&token), Some(big)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "La imagen supera el tamaño máximo permitido");

        let (status, body) = call(
            &app,
            Method::POST,
            "/obras/generar",
            Some(&token),
            Some(json!({"nombre": "Sin descripción"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
    }
}

/// Run with `cargo test -- --ignored` and `DATABASE_URL` set; each test
/// gets a fresh database with the migrations applied.
#[cfg(test)]
mod pg_tests {
    use auth::domain::value_object::{display_name::DisplayName, email::Email};
    use auth::{PgUserRepository, User, UserRepository};
    use kernel::id::{ArtworkId, UserId};
    use sqlx::PgPool;

    use crate::domain::entities::{Artwork, ArtworkDraft, Rating};
    use crate::domain::repository::{ArtworkRepository, RatingRepository};
    use crate::domain::value_objects::Score;
    use crate::error::ArtworkError;
    use crate::infra::postgres::PgArtworkRepository;

    async fn user(pool: &PgPool, email: &str, name: &str) -> UserId {
        let user = User::new_external(Email::new(email).unwrap(), DisplayName::new(name).unwrap());
        PgUserRepository::new(pool.clone()).create(&user).await.unwrap();
        user.user_id
    }

    async fn sunset(repo: &PgArtworkRepository, owner: UserId) -> ArtworkId {
        let draft = ArtworkDraft {
            nombre: "Sunset".into(),
            descripcion: "Orange sky over the sea".into(),
            tipo_arte: "fotografia".into(),
        };
        let artwork = Artwork::new(draft, "https://img.test/sunset.jpg".into(), owner);
        repo.create(&artwork).await.unwrap();
        artwork.id
    }

    fn rating(id: ArtworkId, by: UserId, score: i64) -> Rating {
        Rating::new(id, by, Score::new(score).unwrap())
    }

    #[sqlx::test(migrations = "../../../database/migrations")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_sunset_aggregates_and_viewer_flags(pool: PgPool) {
        let alicia = user(&pool, "a@example.com", "Alicia").await;
        let bruno = user(&pool, "b@example.com", "Bruno").await;
        let repo = PgArtworkRepository::new(pool);
        let id = sunset(&repo, alicia).await;

        let feed = repo.list_published(None).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].autor_nombre, "Alicia");
        assert_eq!(feed[0].promedio_valoracion, None);
        assert_eq!(feed[0].cantidad_valoraciones, 0);
        assert!(!feed[0].ya_valorada);

        repo.add(&rating(id, bruno, 4)).await.unwrap();

        let seen_by_bruno = repo.find_view(&id, Some(&bruno)).await.unwrap().unwrap();
        assert_eq!(seen_by_bruno.promedio_valoracion, Some(4.0));
        assert_eq!(seen_by_bruno.cantidad_valoraciones, 1);
        assert!(seen_by_bruno.ya_valorada);
        assert_eq!(seen_by_bruno.puntuacion_usuario, Some(4));

        let seen_by_alicia = repo.list_by_author(&alicia).await.unwrap();
        assert!(!seen_by_alicia[0].ya_valorada);
        assert_eq!(seen_by_alicia[0].puntuacion_usuario, None);
    }

    #[sqlx::test(migrations = "../../../database/migrations")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_one_rating_per_viewer(pool: PgPool) {
        let alicia = user(&pool, "a@example.com", "Alicia").await;
        let bruno = user(&pool, "b@example.com", "Bruno").await;
        let repo = PgArtworkRepository::new(pool);
        let id = sunset(&repo, alicia).await;

        repo.add(&rating(id, bruno, 5)).await.unwrap();
        let second = repo.add(&rating(id, bruno, 1)).await;
        assert!(matches!(second, Err(ArtworkError::AlreadyRated)));

        let view = repo.find_view(&id, Some(&bruno)).await.unwrap().unwrap();
        assert_eq!(view.puntuacion_usuario, Some(5));
        assert_eq!(view.cantidad_valoraciones, 1);
    }

    #[sqlx::test(migrations = "../../../database/migrations")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_rating_unknown_artwork_is_not_found(pool: PgPool) {
        let bruno = user(&pool, "b@example.com", "Bruno").await;
        let repo = PgArtworkRepository::new(pool);

        let result = repo.add(&rating(ArtworkId::new(), bruno, 3)).await;
        assert!(matches!(result, Err(ArtworkError::ArtworkNotFound)));
    }

    #[sqlx::test(migrations = "../../../database/migrations")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_delete_cascades_to_ratings(pool: PgPool) {
        let alicia = user(&pool, "a@example.com", "Alicia").await;
        let bruno = user(&pool, "b@example.com", "Bruno").await;
        let repo = PgArtworkRepository::new(pool.clone());
        let id = sunset(&repo, alicia).await;
        repo.add(&rating(id, bruno, 2)).await.unwrap();

        assert!(!repo.delete_owned(&id, &bruno).await.unwrap());
        assert!(repo.delete_owned(&id, &alicia).await.unwrap());

        assert!(repo.find_view(&id, None).await.unwrap().is_none());
        let left = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM valoraciones WHERE obra_id = $1")
            .bind(id.to_string())
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(left, 0);
    }

    #[sqlx::test(migrations = "../../../database/migrations")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_visibility_is_owner_only(pool: PgPool) {
        let alicia = user(&pool, "a@example.com", "Alicia").await;
        let bruno = user(&pool, "b@example.com", "Bruno").await;
        let repo = PgArtworkRepository::new(pool);
        let id = sunset(&repo, alicia).await;

        assert!(!repo.set_published(&id, &bruno, false).await.unwrap());
        assert!(repo.set_published(&id, &alicia, false).await.unwrap());
        assert!(repo.list_published(None).await.unwrap().is_empty());
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }
}
