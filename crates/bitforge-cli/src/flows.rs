use std::sync::atomic::AtomicBool;

use anyhow::{anyhow, Result};
use bitforge_core::{Catalog, Freshness, PlatformId};
use bitforge_installer::{
    default_user_home, read_packages_root, scan, scan_and_fix, uninstall, HomeLayout,
    InstallOutcome, Installer, Registry, RemoteConfigProvider, ScanReport, UninstallStatus,
};

use crate::provider_http::HttpManifestProvider;
use crate::render::{self, DownloadProgress, OutputStyle};

struct CommandContext {
    layout: HomeLayout,
    platform: PlatformId,
    style: OutputStyle,
}

fn command_context() -> Result<CommandContext> {
    Ok(CommandContext {
        layout: HomeLayout::new(default_user_home()?),
        platform: PlatformId::host()?,
        style: render::current_output_style(),
    })
}

pub fn run_install(names: &[String], force: bool, interrupt: &AtomicBool) -> Result<()> {
    let ctx = command_context()?;
    let provider = HttpManifestProvider::new(&ctx.layout);

    // explicit install always refreshes the manifest
    let manifest = provider.manifest(Freshness::MustFetch)?;
    let catalog = Catalog::from_manifest(&manifest, ctx.platform);
    let mut registry = Registry::load(&ctx.layout.registry_path())?;

    scan_and_fix(&ctx.layout, &catalog, ctx.platform, &mut registry)?;

    let targets = resolve_install_targets(&catalog, names, ctx.platform)?;
    let installer = Installer::new(&ctx.layout, &provider, ctx.platform, interrupt);
    for name in &targets {
        let progress = DownloadProgress::start(ctx.style, name);
        let result = installer.install(
            &mut registry,
            name,
            force,
            Freshness::CachedOk,
            &mut |done, total| progress.update(done, total),
        );
        progress.finish();
        let (status, message) = format_install_line(name, result?);
        render::print_status(ctx.style, status, &message);
    }
    Ok(())
}

pub fn run_uninstall(names: &[String]) -> Result<()> {
    let ctx = command_context()?;
    let mut registry = Registry::load(&ctx.layout.registry_path())?;

    let targets: Vec<String> = if names.is_empty() {
        let provider = HttpManifestProvider::new(&ctx.layout);
        let manifest = provider.manifest(Freshness::CachedOk)?;
        let catalog = Catalog::from_manifest(&manifest, ctx.platform);
        catalog
            .names()
            .filter(|name| registry.get(name).is_some())
            .map(str::to_string)
            .collect()
    } else {
        names.to_vec()
    };

    if targets.is_empty() {
        render::print_status(ctx.style, "ok", "no packages are installed");
        return Ok(());
    }

    for name in &targets {
        let status = uninstall(&ctx.layout, &mut registry, name)?;
        let (tag, message) = format_uninstall_line(name, status);
        render::print_status(ctx.style, tag, &message);
    }
    Ok(())
}

pub fn run_list() -> Result<()> {
    let ctx = command_context()?;
    let provider = HttpManifestProvider::new(&ctx.layout);
    let manifest = provider.manifest(Freshness::CachedOk)?;
    let catalog = Catalog::from_manifest(&manifest, ctx.platform);
    let registry = Registry::load(&ctx.layout.registry_path())?;
    let listing = read_packages_root(&ctx.layout)?;

    let report = scan(&catalog, ctx.platform, &registry, &listing);
    for line in format_list_lines(&catalog, &registry, &report) {
        println!("{line}");
    }
    if report.num_errors_to_fix() > 0 {
        render::print_status(
            ctx.style,
            "warning",
            &format!(
                "{} issue(s) found; run `bitforge packages fix`",
                report.num_errors_to_fix()
            ),
        );
    }
    Ok(())
}

pub fn run_fix() -> Result<()> {
    let ctx = command_context()?;
    let provider = HttpManifestProvider::new(&ctx.layout);
    let manifest = provider.manifest(Freshness::CachedOk)?;
    let catalog = Catalog::from_manifest(&manifest, ctx.platform);
    let mut registry = Registry::load(&ctx.layout.registry_path())?;

    let listing = read_packages_root(&ctx.layout)?;
    let before = scan(&catalog, ctx.platform, &registry, &listing);
    if before.num_errors_to_fix() == 0 {
        render::print_status(ctx.style, "ok", "nothing to fix");
        return Ok(());
    }

    let after = scan_and_fix(&ctx.layout, &catalog, ctx.platform, &mut registry)?;
    render::print_status(
        ctx.style,
        "fixed",
        &format!("{} issue(s) removed", before.num_errors_to_fix()),
    );
    if !after.uninstalled.is_empty() {
        render::print_status(
            ctx.style,
            "warning",
            &format!(
                "{} package(s) now uninstalled; run `bitforge packages install`",
                after.uninstalled.len()
            ),
        );
    }
    Ok(())
}

/// No names means every catalog package; explicit names must all exist in
/// the catalog, checked before anything is downloaded.
pub(crate) fn resolve_install_targets(
    catalog: &Catalog,
    names: &[String],
    platform: PlatformId,
) -> Result<Vec<String>> {
    if names.is_empty() {
        return Ok(catalog.names().map(str::to_string).collect());
    }
    for name in names {
        if !catalog.contains(name) {
            return Err(anyhow!(
                "package '{name}' is not available for platform {platform}"
            ));
        }
    }
    Ok(names.to_vec())
}

pub(crate) fn format_install_line(name: &str, outcome: InstallOutcome) -> (&'static str, String) {
    match outcome {
        InstallOutcome::AlreadyInstalled => ("ok", format!("{name} is already installed")),
        InstallOutcome::Installed => ("installed", name.to_string()),
    }
}

pub(crate) fn format_uninstall_line(name: &str, status: UninstallStatus) -> (&'static str, String) {
    match status {
        UninstallStatus::NotInstalled => ("ok", format!("{name} was not installed")),
        UninstallStatus::Uninstalled => ("uninstalled", name.to_string()),
    }
}

pub(crate) fn format_list_lines(
    catalog: &Catalog,
    registry: &Registry,
    report: &ScanReport,
) -> Vec<String> {
    let mut lines = Vec::new();
    for (name, target) in catalog.entries() {
        let state = report
            .state_of(name)
            .map(|state| state.as_str())
            .unwrap_or("unknown");
        let installed = registry
            .get(name)
            .map(|record| record.version.as_str())
            .unwrap_or("-");
        lines.push(format!(
            "{name:<24} {state:<12} installed={installed} target={target}"
        ));
    }
    for name in &report.orphan_registry_entries {
        lines.push(format!("{name:<24} orphan-registry-entry"));
    }
    for name in &report.orphan_dirs {
        lines.push(format!("{name:<24} orphan-dir"));
    }
    for name in &report.orphan_files {
        lines.push(format!("{name:<24} orphan-file"));
    }
    lines
}
