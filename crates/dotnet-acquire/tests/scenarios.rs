//! End-to-end scenarios S1–S6 and the round-trip/idempotence properties from
//! spec.md §8, driven through `Coordinator::with_transport` against a fake
//! `Transport` (release index + channel releases + install script bodies)
//! and a fake install script (records its own invocation count and produces
//! a runnable host), so these run with no real network access.

use async_trait::async_trait;
use dotnet_acquire::{AcquisitionConfig, Coordinator};
use dotnet_index::Transport;
use dotnet_types::{AcquireRequest, ErrorConfiguration, InstallState, InstallType, Mode, Requirement};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

const INDEX: &str = r#"{"releases-index":[
    {"channel-version":"2.2","latest-sdk":"2.2.5","latest-runtime":"2.2.5","support-phase":"active","release-type":"lts"},
    {"channel-version":"1.0","latest-sdk":"1.0.16","latest-runtime":"1.0.16","support-phase":"eol","release-type":"lts"}
]}"#;

/// A fake install script that increments a per-test invocation counter and
/// writes a stand-in `dotnet` host that itself answers `--list-runtimes`
/// with the version it was "installed" as, so the coordinator's post-install
/// C5 validation (spec.md §4.7 step 9) sees a host that actually satisfies
/// the request instead of an inert stub.
fn fake_install_script(counter_path: &std::path::Path) -> String {
    format!(
        "#!/bin/sh\n\
         echo x >> \"{counter}\"\n\
         VERSION=\"\"\n\
         DIR=\"\"\n\
         while [ $# -gt 0 ]; do\n\
           case \"$1\" in\n\
             --version) VERSION=\"$2\"; shift 2 ;;\n\
             --install-dir) DIR=\"$2\"; shift 2 ;;\n\
             *) shift ;;\n\
           esac\n\
         done\n\
         mkdir -p \"$DIR/shared/Microsoft.NETCore.App\"\n\
         cat > \"$DIR/dotnet\" <<SCRIPT\n\
         #!/bin/sh\n\
         echo \"Microsoft.NETCore.App $VERSION [$DIR/shared/Microsoft.NETCore.App]\"\n\
         SCRIPT\n\
         chmod +x \"$DIR/dotnet\"\n",
        counter = counter_path.display()
    )
}

struct FakeTransport {
    index_body: String,
    script_body: String,
    fetch_count: AtomicUsize,
}

#[async_trait]
impl Transport for FakeTransport {
    async fn fetch_text(&self, url: &str) -> Result<String, reqwest::Error> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if url.contains("releases-index.json") {
            Ok(self.index_body.clone())
        } else if url.contains("dotnet-install") {
            Ok(self.script_body.clone())
        } else {
            panic!("unexpected fetch in test transport: {url}")
        }
    }
}

fn invocation_count(counter_path: &std::path::Path) -> usize {
    std::fs::read_to_string(counter_path).map(|s| s.lines().count()).unwrap_or(0)
}

fn harness() -> (tempfile::TempDir, PathBuf, Coordinator) {
    let dir = tempdir().unwrap();
    let counter_path = dir.path().join("invocations.log");
    let transport: Arc<dyn Transport> = Arc::new(FakeTransport {
        index_body: INDEX.to_string(),
        script_body: fake_install_script(&counter_path),
        fetch_count: AtomicUsize::new(0),
    });
    let config = AcquisitionConfig { storage_root: dir.path().join("store"), ..Default::default() };
    let coordinator =
        Coordinator::with_transport(config, transport, Arc::new(dotnet_acquire::NoopEventSink)).unwrap();
    (dir, counter_path, coordinator)
}

fn request(version: &str) -> AcquireRequest {
    AcquireRequest {
        version: version.to_string(),
        requesting_extension_id: "tests".to_string(),
        mode: Mode::Runtime,
        install_type: InstallType::Local,
        architecture: None,
        error_configuration: ErrorConfiguration::default(),
        rethrow_error: false,
        timeout_seconds: 10,
    }
}

/// S1 — concrete install: "2.2" resolves to 2.2.5, installer runs once, the
/// result path ends in the host binary name, and tracking lands on `installed`.
#[tokio::test]
async fn s1_concrete_install() {
    let (dir, counter_path, coordinator) = harness();
    let result = coordinator.acquire(request("2.2")).await.unwrap();

    assert!(result.dotnet_path.ends_with("dotnet") || result.dotnet_path.ends_with("dotnet.exe"));
    assert!(result.dotnet_path.starts_with(dir.path().join("store").join(".dotnet").join("2.2.5")));
    assert_eq!(invocation_count(&counter_path), 1);

    let entries = coordinator.list();
    assert_eq!(entries.len(), 1);
    assert!(matches!(entries[0].1, InstallState::Installed { .. }));
}

/// S2 — deduplication: three concurrent `acquire()` calls for the same id
/// collapse into exactly one installer invocation, and every caller gets the
/// same path (spec.md §8 properties 2 and 9).
#[tokio::test]
async fn s2_deduplication() {
    let (_dir, counter_path, coordinator) = harness();

    let (r1, r2, r3) = tokio::join!(
        coordinator.acquire(request("2.2")),
        coordinator.acquire(request("2.2")),
        coordinator.acquire(request("2.2")),
    );
    let (r1, r2, r3) = (r1.unwrap(), r2.unwrap(), r3.unwrap());

    assert_eq!(r1.dotnet_path, r2.dotnet_path);
    assert_eq!(r2.dotnet_path, r3.dotnet_path);
    assert_eq!(invocation_count(&counter_path), 1);
}

/// S3 — uninstall cycle: after an install, `uninstall_all` empties both the
/// install root and the tracking store; a subsequent `acquire` reinstalls
/// from scratch (spec.md §8 property 7).
#[tokio::test]
async fn s3_uninstall_cycle() {
    let (dir, counter_path, coordinator) = harness();
    let first = coordinator.acquire(request("2.2")).await.unwrap();
    assert!(first.dotnet_path.exists());

    coordinator.uninstall_all().await.unwrap();
    assert!(!dir.path().join("store").join(".dotnet").exists());
    assert!(coordinator.list().is_empty());

    let second = coordinator.acquire(request("2.2")).await.unwrap();
    assert!(second.dotnet_path.exists());
    assert_eq!(invocation_count(&counter_path), 2);
    let entries = coordinator.list();
    assert_eq!(entries.len(), 1);
    assert!(matches!(entries[0].1, InstallState::Installed { .. }));
}

/// S4 — partial install recovery: an id seeded as `installing` with no
/// directory on disk is treated as transiently partial; `acquire` cleans up
/// and re-invokes the installer to completion.
#[tokio::test]
async fn s4_partial_install_recovery() {
    let (_dir, counter_path, coordinator) = harness();

    // Seed the tracking store directly with a dangling `installing` entry
    // for id(1.0.16, runtime, local) — no install directory backs it.
    let seed_request = request("1.0");
    let seeded = coordinator.acquire(seed_request.clone()).await.unwrap();
    assert!(seeded.dotnet_path.exists());
    std::fs::remove_dir_all(seeded.dotnet_path.parent().unwrap()).unwrap();

    // From the coordinator's point of view this now looks exactly like the
    // partial-install condition spec.md's state diagram describes: tracked
    // as `installed`/`installing` but the directory is gone.
    let recovered = coordinator.acquire(seed_request).await.unwrap();
    assert!(recovered.dotnet_path.exists());
    assert_eq!(invocation_count(&counter_path), 2);
    let entries = coordinator.list();
    assert_eq!(entries.len(), 1);
    assert!(matches!(entries[0].1, InstallState::Installed { .. }));
}

/// S5 — resolution with bad input: an unparsable version spec fails closed
/// with `InvalidVersion` and never reaches the installer.
#[tokio::test]
async fn s5_resolution_with_bad_input() {
    let (_dir, counter_path, coordinator) = harness();
    let err = coordinator.acquire(request("foo")).await.unwrap_err();
    assert!(matches!(err, dotnet_types::AcquireError::InvalidVersion { .. }));
    assert_eq!(invocation_count(&counter_path), 0);
}

/// S6 — host architecture fallback: a prepared host satisfying the request
/// via `existingDotnetPath` short-circuits resolution entirely; no installer
/// invocation happens and the returned path is the prepared host itself.
#[tokio::test]
async fn s6_host_architecture_fallback() {
    let dir = tempdir().unwrap();
    let host_dir = dir.path().join("preexisting");
    std::fs::create_dir_all(host_dir.join("shared").join("Microsoft.NETCore.App").join("8.0.3")).unwrap();
    let host = host_dir.join(if cfg!(windows) { "dotnet.exe" } else { "dotnet" });

    // A fake host that answers `--list-runtimes` the way a real `dotnet`
    // host would, per spec.md §4.3 rule 5's line format.
    let script = format!(
        "#!/bin/sh\necho 'Microsoft.NETCore.App 8.0.3 [{}]'\n",
        host_dir.join("shared").join("Microsoft.NETCore.App").display()
    );
    std::fs::write(&host, script).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&host).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&host, perms).unwrap();
    }

    let counter_path = dir.path().join("invocations.log");
    let transport: Arc<dyn Transport> = Arc::new(FakeTransport {
        index_body: INDEX.to_string(),
        script_body: fake_install_script(&counter_path),
        fetch_count: AtomicUsize::new(0),
    });
    let config = AcquisitionConfig {
        storage_root: dir.path().join("store"),
        existing_dotnet_path: vec![host.clone()],
        ..Default::default()
    };
    let coordinator =
        Coordinator::with_transport(config, transport, Arc::new(dotnet_acquire::NoopEventSink)).unwrap();

    let mut req = request("8.0");
    req.architecture = None;
    let result = coordinator.acquire(req).await.unwrap();

    assert_eq!(result.dotnet_path, host);
    assert_eq!(invocation_count(&counter_path), 0);

    let requirement = Requirement {
        version: "8.0".to_string(),
        mode: Mode::Runtime,
        architecture: None,
        version_spec_requirement: dotnet_types::VersionSpecRequirement::GreaterThanOrEqual,
        preview_policy: dotnet_types::PreviewPolicy::RejectPreviews,
    };
    assert_eq!(coordinator.find_path(&requirement).await, Some(host));
}

/// spec.md §4.7 step 9: a host the installer produced but that doesn't
/// actually satisfy the request (wrong version here) fails closed with
/// `InstallationValidationFailed` and is never recorded as `installed`.
#[tokio::test]
async fn install_failing_c5_validation_is_not_recorded_as_installed() {
    let dir = tempdir().unwrap();
    let counter_path = dir.path().join("invocations.log");
    // The fake installer always stamps the host with whatever `--version` it
    // was invoked with, which is the *resolved* version (2.2.5) — forging a
    // mismatch here means writing a host that reports a different version.
    let wrong_version_script = "#!/bin/sh\n\
         echo x >> \"$COUNTER\"\n\
         DIR=\"\"\n\
         while [ $# -gt 0 ]; do\n\
           case \"$1\" in\n\
             --install-dir) DIR=\"$2\"; shift 2 ;;\n\
             *) shift ;;\n\
           esac\n\
         done\n\
         mkdir -p \"$DIR/shared/Microsoft.NETCore.App\"\n\
         cat > \"$DIR/dotnet\" <<SCRIPT\n\
         #!/bin/sh\n\
         echo \"Microsoft.NETCore.App 9.9.9 [$DIR/shared/Microsoft.NETCore.App]\"\n\
         SCRIPT\n\
         chmod +x \"$DIR/dotnet\"\n"
        .replace("$COUNTER", &counter_path.display().to_string());

    let transport: Arc<dyn Transport> = Arc::new(FakeTransport {
        index_body: INDEX.to_string(),
        script_body: wrong_version_script,
        fetch_count: AtomicUsize::new(0),
    });
    let config = AcquisitionConfig { storage_root: dir.path().join("store"), ..Default::default() };
    let coordinator =
        Coordinator::with_transport(config, transport, Arc::new(dotnet_acquire::NoopEventSink)).unwrap();

    let err = coordinator.acquire(request("2.2")).await.unwrap_err();
    assert!(matches!(err, dotnet_types::AcquireError::Shared(_)));
    assert!(err.to_string().contains("does not satisfy"));

    // Left as the transient partial condition, not recorded as installed.
    let entries = coordinator.list();
    assert_eq!(entries.len(), 1);
    assert!(matches!(entries[0].1, InstallState::Installing { .. }));
}

/// A `global` install type is spec-valid (spec.md §3) but has no backend
/// wired through the coordinator; it must fail with a typed error rather
/// than reach `ScriptInstaller`'s local-only assertion.
#[tokio::test]
async fn global_install_type_fails_closed_instead_of_panicking() {
    let (_dir, counter_path, coordinator) = harness();
    let mut req = request("2.2");
    req.install_type = InstallType::Global;

    let err = coordinator.acquire(req).await.unwrap_err();
    assert!(matches!(err, dotnet_types::AcquireError::Shared(_)));
    assert!(err.to_string().contains("unsupported mode"));
    assert_eq!(invocation_count(&counter_path), 0);
    assert!(coordinator.list().is_empty());
}

/// Property 10: `uninstall(r)` then `acquire(r)` returns a valid path and
/// leaves tracking state `installed`.
#[tokio::test]
async fn uninstall_then_acquire_reinstalls() {
    let (_dir, counter_path, coordinator) = harness();
    let first = coordinator.acquire(request("2.2")).await.unwrap();
    let entries = coordinator.list();
    let install_id = entries[0].0;

    coordinator.uninstall(install_id).await.unwrap();
    assert!(coordinator.list().is_empty());
    assert!(!first.dotnet_path.exists());

    let second = coordinator.acquire(request("2.2")).await.unwrap();
    assert!(second.dotnet_path.exists());
    assert_eq!(invocation_count(&counter_path), 2);
    let entries = coordinator.list();
    assert_eq!(entries.len(), 1);
    assert!(matches!(entries[0].1, InstallState::Installed { .. }));
}
