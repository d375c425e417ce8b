use std::path::Path;

use super::*;

fn sample_manifest_json() -> &'static str {
    r#"{
        "packages": {
            "oss-cad-suite": {
                "organization": "bitforge-fpga",
                "repository": "tools-oss-cad-suite",
                "release_tag": "v${VERSION}",
                "asset_template": "oss-cad-suite-${PLATFORM}-${YYYYMMDD}.tar.gz",
                "version": "2024.07.05"
            },
            "examples": {
                "organization": "bitforge-fpga",
                "repository": "bitforge-examples",
                "release_tag": "v${VERSION}",
                "asset_template": "examples-${VERSION}.zip",
                "version": "0.0.9"
            },
            "verible": {
                "organization": "bitforge-fpga",
                "repository": "tools-verible",
                "release_tag": "v${VERSION}",
                "asset_template": "verible-${PLATFORM}.tar.bz2",
                "version": "0.3.1",
                "platforms": ["linux-x86-64", "darwin-arm64"]
            }
        }
    }"#
}

#[test]
fn archive_type_round_trip() {
    for archive_type in [ArchiveType::Zip, ArchiveType::TarGz, ArchiveType::TarBz2] {
        assert_eq!(ArchiveType::parse(archive_type.as_str()), Some(archive_type));
    }
    assert_eq!(ArchiveType::parse("rar"), None);
}

#[test]
fn archive_type_inference() {
    assert_eq!(
        ArchiveType::infer_from_path(Path::new("/tmp/pkg-linux.ZIP")),
        Some(ArchiveType::Zip)
    );
    assert_eq!(
        ArchiveType::infer_from_path(Path::new("suite-20240705.tar.gz")),
        Some(ArchiveType::TarGz)
    );
    assert_eq!(
        ArchiveType::infer_from_path(Path::new("suite.tgz")),
        Some(ArchiveType::TarGz)
    );
    assert_eq!(
        ArchiveType::infer_from_path(Path::new("lint.tar.bz2")),
        Some(ArchiveType::TarBz2)
    );
    assert_eq!(ArchiveType::infer_from_path(Path::new("plain.tar")), None);
    assert_eq!(ArchiveType::infer_from_path(Path::new("no-extension")), None);
}

#[test]
fn platform_round_trip() {
    for platform in [
        PlatformId::LinuxX8664,
        PlatformId::LinuxAarch64,
        PlatformId::DarwinX8664,
        PlatformId::DarwinArm64,
        PlatformId::WindowsAmd64,
    ] {
        assert_eq!(PlatformId::parse(platform.as_str()), Some(platform));
    }
    assert_eq!(PlatformId::parse("freebsd-x86-64"), None);
}

#[test]
fn parse_manifest() {
    let manifest = RemoteManifest::from_json_str(sample_manifest_json()).expect("must parse");
    assert_eq!(manifest.packages.len(), 3);

    let suite = manifest.package("oss-cad-suite").expect("must exist");
    assert_eq!(suite.name, "oss-cad-suite");
    assert_eq!(suite.version, "2024.07.05");
    assert!(suite.available_on(PlatformId::WindowsAmd64));

    let verible = manifest.package("verible").expect("must exist");
    assert!(verible.available_on(PlatformId::LinuxX8664));
    assert!(!verible.available_on(PlatformId::WindowsAmd64));
}

#[test]
fn manifest_rejects_empty_required_field() {
    let input = r#"{
        "packages": {
            "broken": {
                "organization": " ",
                "repository": "repo",
                "release_tag": "v1",
                "asset_template": "a.zip",
                "version": "1.0.0"
            }
        }
    }"#;
    let err = RemoteManifest::from_json_str(input).expect_err("must fail");
    assert!(format!("{err:#}").contains("organization"));
}

#[test]
fn manifest_rejects_missing_required_field() {
    let input = r#"{"packages": {"broken": {"organization": "org"}}}"#;
    assert!(RemoteManifest::from_json_str(input).is_err());
}

#[test]
fn manifest_rejects_unknown_placeholder() {
    let input = r#"{
        "packages": {
            "broken": {
                "organization": "org",
                "repository": "repo",
                "release_tag": "v1",
                "asset_template": "a-${ARCH}.zip",
                "version": "1.0.0"
            }
        }
    }"#;
    let err = RemoteManifest::from_json_str(input).expect_err("must fail");
    assert!(format!("{err:#}").contains("${ARCH}"));
}

#[test]
fn manifest_rejects_unknown_platform() {
    let input = r#"{
        "packages": {
            "broken": {
                "organization": "org",
                "repository": "repo",
                "release_tag": "v1",
                "asset_template": "a.zip",
                "version": "1.0.0",
                "platforms": ["amiga"]
            }
        }
    }"#;
    assert!(RemoteManifest::from_json_str(input).is_err());
}

#[test]
fn release_url_expands_platform_and_date_placeholders() {
    let manifest = RemoteManifest::from_json_str(sample_manifest_json()).expect("must parse");
    let suite = manifest.package("oss-cad-suite").expect("must exist");
    let url = suite
        .release_url(PlatformId::LinuxX8664)
        .expect("must resolve");
    assert_eq!(
        url,
        "https://github.com/bitforge-fpga/tools-oss-cad-suite/releases/download/v2024.07.05/oss-cad-suite-linux-x86-64-20240705.tar.gz"
    );
}

#[test]
fn release_url_with_custom_base() {
    let manifest = RemoteManifest::from_json_str(sample_manifest_json()).expect("must parse");
    let examples = manifest.package("examples").expect("must exist");
    let url = examples
        .release_url_with_base("http://mirror.test/", PlatformId::DarwinArm64)
        .expect("must resolve");
    assert_eq!(
        url,
        "http://mirror.test/bitforge-fpga/bitforge-examples/releases/download/v0.0.9/examples-0.0.9.zip"
    );
}

#[test]
fn date_placeholder_requires_date_shaped_version() {
    let config = PackageRemoteConfig {
        name: "suite".to_string(),
        organization: "org".to_string(),
        repository: "repo".to_string(),
        release_tag: "latest".to_string(),
        asset_template: "suite-${YYYY-MM-DD}.zip".to_string(),
        version: "1.2.3".to_string(),
        platforms: Vec::new(),
    };
    let err = config
        .release_url(PlatformId::LinuxX8664)
        .expect_err("must fail");
    assert!(format!("{err:#}").contains("not date-shaped"));
}

#[test]
fn catalog_filters_by_platform() {
    let manifest = RemoteManifest::from_json_str(sample_manifest_json()).expect("must parse");

    let linux = Catalog::from_manifest(&manifest, PlatformId::LinuxX8664);
    assert_eq!(linux.len(), 3);
    assert!(linux.contains("verible"));

    let windows = Catalog::from_manifest(&manifest, PlatformId::WindowsAmd64);
    assert_eq!(windows.len(), 2);
    assert!(!windows.contains("verible"));
    assert_eq!(windows.target_version("examples"), Some("0.0.9"));
}

#[test]
fn catalog_entries_are_sorted() {
    let catalog = Catalog::from_entries([("zzz", "1"), ("aaa", "2"), ("mmm", "3")]);
    let names: Vec<&str> = catalog.names().collect();
    assert_eq!(names, vec!["aaa", "mmm", "zzz"]);
}

#[test]
fn package_error_exit_codes() {
    assert_eq!(PackageError::UserInterrupt.exit_code(), 130);
    assert_eq!(
        PackageError::Network {
            url: "https://example.test".to_string(),
            detail: "timed out".to_string(),
        }
        .exit_code(),
        1
    );
}
