use std::fs;

use bitforge_core::{Catalog, Freshness, PackageError, PlatformId};
use bitforge_installer::{
    HomeLayout, InstallOutcome, PackageRecord, Registry, RemoteConfigProvider, ScanReport,
    UninstallStatus,
};
use clap::Parser;
use tempfile::TempDir;

use crate::dispatch::{Cli, Commands, PackagesCommand};
use crate::flows::{
    format_install_line, format_list_lines, format_uninstall_line, resolve_install_targets,
};
use crate::provider_http::HttpManifestProvider;
use crate::render::{warning_line, OutputStyle};

const MANIFEST_JSON: &str = r#"{
  "packages": {
    "oss-cad-suite": {
      "organization": "bitforge-fpga",
      "repository": "tools-oss-cad-suite",
      "release_tag": "v${VERSION}",
      "asset_template": "oss-cad-suite-${PLATFORM}-${YYYYMMDD}.tar.gz",
      "version": "2024.07.05"
    }
  }
}"#;

fn test_layout() -> (TempDir, HomeLayout) {
    let dir = TempDir::new().expect("must create temp home");
    let layout = HomeLayout::new(dir.path());
    (dir, layout)
}

// argument parsing

#[test]
fn parse_install_with_names_and_force() {
    let cli = Cli::try_parse_from(["bitforge", "packages", "install", "oss-cad-suite", "--force"])
        .expect("must parse");
    let Commands::Packages { command } = cli.command;
    match command {
        PackagesCommand::Install { names, force } => {
            assert_eq!(names, vec!["oss-cad-suite"]);
            assert!(force);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_install_without_names() {
    let cli = Cli::try_parse_from(["bitforge", "packages", "install"]).expect("must parse");
    let Commands::Packages { command } = cli.command;
    match command {
        PackagesCommand::Install { names, force } => {
            assert!(names.is_empty());
            assert!(!force);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_list_fix_uninstall() {
    for (args, expect_list) in [
        (vec!["bitforge", "packages", "list"], true),
        (vec!["bitforge", "packages", "fix"], false),
    ] {
        let cli = Cli::try_parse_from(args).expect("must parse");
        let Commands::Packages { command } = cli.command;
        match command {
            PackagesCommand::List => assert!(expect_list),
            PackagesCommand::Fix => assert!(!expect_list),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    let cli = Cli::try_parse_from(["bitforge", "packages", "uninstall", "examples"])
        .expect("must parse");
    let Commands::Packages { command } = cli.command;
    match command {
        PackagesCommand::Uninstall { names } => assert_eq!(names, vec!["examples"]),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["bitforge", "packages", "frobnicate"]).is_err());
}

// flow helpers

#[test]
fn install_targets_default_to_whole_catalog() {
    let catalog = Catalog::from_entries([("zzz", "1.0.0"), ("aaa", "1.0.0")]);
    let targets = resolve_install_targets(&catalog, &[], PlatformId::LinuxX8664)
        .expect("must resolve");
    assert_eq!(targets, vec!["aaa", "zzz"]);
}

#[test]
fn install_targets_reject_unknown_names() {
    let catalog = Catalog::from_entries([("oss-cad-suite", "1.0.0")]);
    let err = resolve_install_targets(
        &catalog,
        &["no-such-package".to_string()],
        PlatformId::LinuxX8664,
    )
    .expect_err("must fail");
    assert!(err.to_string().contains("no-such-package"));
}

#[test]
fn install_and_uninstall_lines() {
    let (status, message) = format_install_line("suite", InstallOutcome::Installed);
    assert_eq!((status, message.as_str()), ("installed", "suite"));
    let (status, message) = format_install_line("suite", InstallOutcome::AlreadyInstalled);
    assert_eq!(status, "ok");
    assert!(message.contains("already installed"));

    let (status, _) = format_uninstall_line("suite", UninstallStatus::Uninstalled);
    assert_eq!(status, "uninstalled");
    let (status, message) = format_uninstall_line("suite", UninstallStatus::NotInstalled);
    assert_eq!(status, "ok");
    assert!(message.contains("not installed"));
}

#[test]
fn list_lines_cover_catalog_and_orphans() {
    let catalog = Catalog::from_entries([("suite", "2.0.0")]);
    let mut registry = Registry::default();
    registry.upsert(PackageRecord {
        name: "suite".to_string(),
        version: "1.0.0".to_string(),
        platform: "linux-x86-64".to_string(),
        source_url: "https://example.test/suite.tar.gz".to_string(),
    });
    let report = ScanReport {
        bad_version: vec!["suite".to_string()],
        orphan_dirs: vec!["old-tool".to_string()],
        ..ScanReport::default()
    };

    let lines = format_list_lines(&catalog, &registry, &report);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("suite"));
    assert!(lines[0].contains("bad-version"));
    assert!(lines[0].contains("installed=1.0.0"));
    assert!(lines[0].contains("target=2.0.0"));
    assert!(lines[1].contains("old-tool"));
    assert!(lines[1].contains("orphan-dir"));
}

#[test]
fn warning_lines_render_in_both_styles() {
    let plain = warning_line(OutputStyle::Plain, "Ctrl-C handling is unavailable: busy");
    assert_eq!(plain, "warning: Ctrl-C handling is unavailable: busy");

    let rich = warning_line(OutputStyle::Rich, "Ctrl-C handling is unavailable: busy");
    assert!(rich.contains("Ctrl-C handling is unavailable: busy"));
    assert!(rich.contains('\u{1b}'));
}

// manifest provider

#[test]
fn must_fetch_downloads_and_writes_cache() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/manifest.json")
        .with_status(200)
        .with_body(MANIFEST_JSON)
        .expect(1)
        .create();

    let (_dir, layout) = test_layout();
    let url = format!("{}/manifest.json", server.url());
    let provider = HttpManifestProvider::with_url(&layout, url.as_str());

    let manifest = provider.manifest(Freshness::MustFetch).expect("must fetch");
    assert!(manifest.package("oss-cad-suite").is_some());
    mock.assert();

    let cached = fs::read_to_string(layout.manifest_cache_path()).expect("must read cache");
    assert_eq!(cached, MANIFEST_JSON);
}

#[test]
fn cached_ok_prefers_disk_cache_over_network() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/manifest.json")
        .expect(0)
        .create();

    let (_dir, layout) = test_layout();
    fs::write(layout.manifest_cache_path(), MANIFEST_JSON).expect("must seed cache");

    let url = format!("{}/manifest.json", server.url());
    let provider = HttpManifestProvider::with_url(&layout, url.as_str());
    let manifest = provider.manifest(Freshness::CachedOk).expect("must load");
    assert!(manifest.package("oss-cad-suite").is_some());
    mock.assert();
}

#[test]
fn cached_ok_falls_back_to_network_when_cache_is_unreadable() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/manifest.json")
        .with_status(200)
        .with_body(MANIFEST_JSON)
        .expect(1)
        .create();

    let (_dir, layout) = test_layout();
    fs::write(layout.manifest_cache_path(), "{ not json").expect("must seed cache");

    let url = format!("{}/manifest.json", server.url());
    let provider = HttpManifestProvider::with_url(&layout, url.as_str());
    let manifest = provider.manifest(Freshness::CachedOk).expect("must fetch");
    assert!(manifest.package("oss-cad-suite").is_some());
    mock.assert();

    // fetch repaired the cache on disk
    let cached = fs::read_to_string(layout.manifest_cache_path()).expect("must read cache");
    assert_eq!(cached, MANIFEST_JSON);
}

#[test]
fn must_fetch_surfaces_http_errors_as_network() {
    let mut server = mockito::Server::new();
    server.mock("GET", "/manifest.json").with_status(500).create();

    let (_dir, layout) = test_layout();
    let url = format!("{}/manifest.json", server.url());
    let provider = HttpManifestProvider::with_url(&layout, url.as_str());

    let err = provider
        .manifest(Freshness::MustFetch)
        .expect_err("must fail");
    let kind = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<PackageError>())
        .expect("must carry a PackageError");
    assert!(matches!(kind, PackageError::Network { .. }));
}
