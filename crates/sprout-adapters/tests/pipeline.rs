//! End-to-end generation against real adapters and a local fixture
//! repository.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::TempDir;
use walkdir::WalkDir;

use sprout_adapters::{
    DiskCacheStore, FilesystemExtractor, LocalFilesystem, MemoryFilesystem, PlaceholderRenderer,
};
use sprout_core::{
    application::{
        AnswerResolver, GenerateRequest, GenerateService, RepositoryCache,
        ApplicationError,
        ports::{CacheStore, CloneOptions, Filesystem, RepositoryCloner},
    },
    domain::{AnswerMap, DefaultResolverRegistry, RepositoryRef, TemplateOrigin},
    error::{SproutError, SproutResult},
};

/// Copies a fixture tree instead of talking to a remote, counting calls.
struct FixtureCloner {
    fixture: PathBuf,
    clones: Arc<AtomicUsize>,
}

impl RepositoryCloner for FixtureCloner {
    fn clone_repository(
        &self,
        _url: &str,
        destination: &Path,
        _options: &CloneOptions,
    ) -> SproutResult<()> {
        self.clones.fetch_add(1, Ordering::SeqCst);
        for entry in WalkDir::new(&self.fixture).min_depth(1) {
            let entry = entry.unwrap();
            let target = destination.join(entry.path().strip_prefix(&self.fixture).unwrap());
            if entry.file_type().is_dir() {
                fs::create_dir_all(&target).unwrap();
            } else {
                fs::create_dir_all(target.parent().unwrap()).unwrap();
                fs::copy(entry.path(), &target).unwrap();
            }
        }
        fs::create_dir_all(destination.join(".git")).unwrap();
        fs::write(destination.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        Ok(())
    }
}

struct Harness {
    _home: TempDir,
    _scratch: TempDir,
    fixture: TempDir,
    work: TempDir,
    clones: Arc<AtomicUsize>,
    store: DiskCacheStore,
}

impl Harness {
    fn new() -> Self {
        let home = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let store = DiskCacheStore::new(home.path(), "sprout").with_scratch_root(scratch.path());
        let fixture = TempDir::new().unwrap();

        let harness = Self {
            _home: home,
            _scratch: scratch,
            fixture,
            work: TempDir::new().unwrap(),
            clones: Arc::new(AtomicUsize::new(0)),
            store,
        };
        harness.write("____name____.txt", "____name____ loves ____name____");
        harness.write(
            ".questions.json",
            r#"{"questions": [{"name": "____name____", "message": "Who?", "required": true}]}"#,
        );
        harness
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.fixture.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn service(&self, ttl: Option<Duration>) -> GenerateService {
        self.service_writing_to(ttl, Box::new(LocalFilesystem::new()))
    }

    fn service_writing_to(
        &self,
        ttl: Option<Duration>,
        filesystem: Box<dyn Filesystem>,
    ) -> GenerateService {
        let cloner = FixtureCloner {
            fixture: self.fixture.path().to_path_buf(),
            clones: Arc::clone(&self.clones),
        };
        let cache = RepositoryCache::new(Box::new(self.store.clone()), Box::new(cloner)).with_ttl(ttl);
        GenerateService::new(
            cache,
            Box::new(FilesystemExtractor::new()),
            AnswerResolver::new(DefaultResolverRegistry::new()),
            Box::new(PlaceholderRenderer::new()),
            filesystem,
        )
    }

    fn request(&self, out: &str, answers: AnswerMap) -> GenerateRequest {
        let mut request = GenerateRequest::new(
            RepositoryRef::new("acme/starter", None),
            self.work.path().join(out),
        );
        request.answers = answers;
        request
    }

    fn clone_count(&self) -> usize {
        self.clones.load(Ordering::SeqCst)
    }
}

#[test]
fn generates_and_substitutes() {
    let h = Harness::new();
    let service = h.service(None);

    let report = service
        .generate(&h.request("out", AnswerMap::new().with("name", "Alice")))
        .unwrap();

    let out = h.work.path().join("out");
    assert_eq!(
        fs::read_to_string(out.join("Alice.txt")).unwrap(),
        "Alice loves Alice"
    );
    assert!(!out.join(".questions.json").exists());
    assert!(!out.join(".git").exists());
    assert_eq!(report.origin, TemplateOrigin::Cloned);
    assert_eq!(report.files_written, 1);
}

#[test]
fn fuzzy_answer_keys_are_accepted() {
    let h = Harness::new();
    let service = h.service(None);

    service
        .generate(&h.request("out", AnswerMap::new().with("NAME", "Bob")))
        .unwrap();

    assert!(h.work.path().join("out/Bob.txt").exists());
}

#[test]
fn fresh_cache_is_reused_without_cloning() {
    let h = Harness::new();
    let service = h.service(Some(Duration::from_secs(3600)));

    service
        .generate(&h.request("first", AnswerMap::new().with("name", "A")))
        .unwrap();
    let second = service
        .generate(&h.request("second", AnswerMap::new().with("name", "B")))
        .unwrap();

    assert_eq!(h.clone_count(), 1);
    assert!(second.cache_used);
    assert_eq!(second.origin, TemplateOrigin::Cached);
    assert!(h.work.path().join("second/B.txt").exists());
}

#[test]
fn expired_cache_is_cloned_again() {
    let h = Harness::new();
    let service = h.service(Some(Duration::from_secs(3600)));
    let key = RepositoryRef::new("acme/starter", None).cache_key();

    service
        .generate(&h.request("first", AnswerMap::new().with("name", "A")))
        .unwrap();

    let meta = h.store.metadata_path(&key);
    let mut sidecar: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&meta).unwrap()).unwrap();
    sidecar["last_updated"] = "2000-01-01T00:00:00Z".into();
    fs::write(&meta, sidecar.to_string()).unwrap();

    let report = service
        .generate(&h.request("second", AnswerMap::new().with("name", "B")))
        .unwrap();

    assert_eq!(h.clone_count(), 2);
    assert_eq!(report.origin, TemplateOrigin::Cloned);
    assert!(h.store.load(&key).unwrap().is_some());
}

#[test]
fn uncached_generation_leaves_no_cache_entry() {
    let h = Harness::new();
    let service = h.service(None);
    let key = RepositoryRef::new("acme/starter", None).cache_key();

    let mut request = h.request("out", AnswerMap::new().with("name", "A"));
    request.use_cache = false;
    let report = service.generate(&request).unwrap();

    assert_eq!(report.origin, TemplateOrigin::Ephemeral);
    assert!(!report.cache_used);
    assert!(h.store.load(&key).unwrap().is_none());
    assert!(h.work.path().join("out/A.txt").exists());
}

#[test]
fn missing_required_answer_writes_nothing() {
    let h = Harness::new();
    let service = h.service(None);

    let err = service
        .generate(&h.request("out", AnswerMap::new()))
        .unwrap_err();

    assert!(err.to_string().contains("name"));
    assert!(!h.work.path().join("out").exists());
}

#[test]
fn existing_output_is_refused() {
    let h = Harness::new();
    let service = h.service(None);
    fs::create_dir_all(h.work.path().join("out")).unwrap();

    let err = service
        .generate(&h.request("out", AnswerMap::new().with("name", "A")))
        .unwrap_err();

    assert!(err.to_string().contains("already exists"));
    assert_eq!(h.clone_count(), 0);
}

#[test]
fn sub_path_selects_template_directory() {
    let h = Harness::new();
    h.write("templates/lib/src/____crate____.rs", "// ____crate____");
    let service = h.service(None);

    let source = service
        .prepare(&RepositoryRef::new("acme/starter", None), true)
        .unwrap();
    let names = service
        .list_templates(&source, Some(Path::new("templates")), &RepositoryRef::new("acme/starter", None))
        .unwrap();
    assert_eq!(names, vec!["lib"]);
    service.release(&source);

    let mut request = h.request("out", AnswerMap::new().with("crate", "engine"));
    request.sub_path = Some(PathBuf::from("templates/lib"));
    service.generate(&request).unwrap();

    assert_eq!(
        fs::read_to_string(h.work.path().join("out/src/engine.rs")).unwrap(),
        "// engine"
    );
    assert_eq!(h.clone_count(), 1);
}

#[test]
fn output_goes_through_the_filesystem_port() {
    let h = Harness::new();
    let memory = MemoryFilesystem::new();
    let service = h.service_writing_to(None, Box::new(memory.clone()));

    service
        .generate(&h.request("out", AnswerMap::new().with("name", "Alice")))
        .unwrap();

    let out = h.work.path().join("out");
    assert_eq!(
        memory.read_file(&out.join("Alice.txt")).as_deref(),
        Some("Alice loves Alice")
    );
    // Nothing touched the real disk.
    assert!(!out.exists());
}

#[test]
fn failed_write_removes_the_partial_output() {
    let h = Harness::new();
    h.write("notes/readme.md", "by ____name____");
    let memory = MemoryFilesystem::new();
    let out = h.work.path().join("out");
    memory.fail_writes_to(out.join("notes/readme.md"));
    let service = h.service_writing_to(None, Box::new(memory.clone()));

    let err = service
        .generate(&h.request("out", AnswerMap::new().with("name", "Alice")))
        .unwrap_err();

    assert!(matches!(
        err,
        SproutError::Application(ApplicationError::FilesystemError { .. })
    ));
    assert!(!memory.exists(&out));
    assert!(memory.list_files().is_empty());
}
