//! Platform adapter for turning downloaded release assets into
//! installed applications
//!
//! Covers asset-kind classification by file extension, architecture
//! matching, sha256 verification, tar.gz extraction, and the final
//! hand-off (place an AppImage, open a package with the system
//! installer).

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::Command;

use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use tar::Archive;

use crate::error::{Result, StoreError};
use crate::github::types::Asset;

/// Installable artifact kinds, classified by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    AppImage,
    Deb,
    Rpm,
    Dmg,
    Pkg,
    Msi,
    Exe,
    TarGz,
}

impl AssetKind {
    /// Classify an asset by its file name, case-insensitively.
    /// Returns `None` for asset types the store cannot install
    /// (checksums, source archives, .apk, ...).
    pub fn classify(asset_name: &str) -> Option<Self> {
        let name = asset_name.to_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(AssetKind::TarGz)
        } else if name.ends_with(".appimage") {
            Some(AssetKind::AppImage)
        } else if name.ends_with(".deb") {
            Some(AssetKind::Deb)
        } else if name.ends_with(".rpm") {
            Some(AssetKind::Rpm)
        } else if name.ends_with(".dmg") {
            Some(AssetKind::Dmg)
        } else if name.ends_with(".pkg") {
            Some(AssetKind::Pkg)
        } else if name.ends_with(".msi") {
            Some(AssetKind::Msi)
        } else if name.ends_with(".exe") {
            Some(AssetKind::Exe)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AssetKind::AppImage => "AppImage",
            AssetKind::Deb => "deb",
            AssetKind::Rpm => "rpm",
            AssetKind::Dmg => "dmg",
            AssetKind::Pkg => "pkg",
            AssetKind::Msi => "msi",
            AssetKind::Exe => "exe",
            AssetKind::TarGz => "tar.gz",
        }
    }
}

/// Desktop platforms the store can install for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Macos,
    Windows,
    /// No platform filter; any installable asset counts
    All,
}

impl Platform {
    /// The platform this process is running on
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Macos
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linux" => Some(Platform::Linux),
            "macos" | "mac" | "osx" => Some(Platform::Macos),
            "windows" | "win" => Some(Platform::Windows),
            "all" | "any" => Some(Platform::All),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Macos => "macos",
            Platform::Windows => "windows",
            Platform::All => "all",
        }
    }

    /// Whether an asset of this kind can be installed on this platform
    pub fn supports(&self, kind: AssetKind) -> bool {
        match self {
            Platform::All => true,
            Platform::Linux => matches!(
                kind,
                AssetKind::AppImage | AssetKind::Deb | AssetKind::Rpm | AssetKind::TarGz
            ),
            Platform::Macos => {
                matches!(kind, AssetKind::Dmg | AssetKind::Pkg | AssetKind::TarGz)
            }
            Platform::Windows => matches!(kind, AssetKind::Msi | AssetKind::Exe),
        }
    }

    /// Whether the named asset is installable here (kind and architecture)
    pub fn is_installable(&self, asset_name: &str) -> bool {
        AssetKind::classify(asset_name).is_some_and(|kind| {
            self.supports(kind) && architecture_compatible(asset_name)
        })
    }

    /// Extension priority when several installable assets match
    fn asset_priority(&self) -> &'static [AssetKind] {
        match self {
            Platform::Linux | Platform::All => &[
                AssetKind::AppImage,
                AssetKind::Deb,
                AssetKind::Rpm,
                AssetKind::TarGz,
            ],
            Platform::Macos => &[AssetKind::Dmg, AssetKind::Pkg, AssetKind::TarGz],
            Platform::Windows => &[AssetKind::Msi, AssetKind::Exe],
        }
    }
}

/// Whether an asset name is compatible with the running CPU architecture.
///
/// Names that mention no architecture at all pass; a universal artifact
/// is indistinguishable from an unlabeled one.
pub fn architecture_compatible(asset_name: &str) -> bool {
    let name = asset_name.to_lowercase();
    let mentions_x86_64 = name.contains("x86_64") || name.contains("x86-64") || name.contains("amd64") || name.contains("x64");
    let mentions_aarch64 = name.contains("aarch64") || name.contains("arm64");
    let mentions_arm32 = !mentions_aarch64 && (name.contains("armv7") || name.contains("armhf"));
    let mentions_i686 = name.contains("i686") || name.contains("i386");

    if !(mentions_x86_64 || mentions_aarch64 || mentions_arm32 || mentions_i686) {
        return true;
    }

    match std::env::consts::ARCH {
        "x86_64" => mentions_x86_64,
        "aarch64" => mentions_aarch64,
        "arm" => mentions_arm32,
        "x86" => mentions_i686,
        _ => false,
    }
}

fn exact_architecture_match(asset_name: &str) -> bool {
    let name = asset_name.to_lowercase();
    match std::env::consts::ARCH {
        "x86_64" => {
            name.contains("x86_64") || name.contains("x86-64") || name.contains("amd64") || name.contains("x64")
        }
        "aarch64" => name.contains("aarch64") || name.contains("arm64"),
        _ => false,
    }
}

/// Pick the best installable asset from a release.
///
/// `preferred_kinds` (from config) outranks the platform's default
/// extension priority; among equal kinds an exact architecture label
/// wins, then the larger artifact.
pub fn choose_primary_asset<'a>(
    assets: &'a [Asset],
    platform: Platform,
    preferred_kinds: &[String],
) -> Option<&'a Asset> {
    let priority = platform.asset_priority();

    let score = |asset: &Asset| -> Option<i64> {
        let kind = AssetKind::classify(&asset.name)?;
        if !platform.supports(kind) || !architecture_compatible(&asset.name) {
            return None;
        }

        let preferred_rank = preferred_kinds
            .iter()
            .position(|p| p.eq_ignore_ascii_case(kind.extension()));
        let default_rank = priority.iter().position(|k| *k == kind);

        let extension_score = match (preferred_rank, default_rank) {
            (Some(idx), _) => (100 - idx as i64) * 100_000,
            (None, Some(idx)) => (50 - idx as i64) * 10_000,
            (None, None) => 0,
        };
        let arch_score = if exact_architecture_match(&asset.name) {
            1_000
        } else {
            0
        };
        let size_score = (asset.size / 1_000_000).min(100) as i64;

        Some(extension_score + arch_score + size_score)
    };

    assets
        .iter()
        .filter_map(|a| score(a).map(|s| (a, s)))
        .max_by_key(|(_, s)| *s)
        .map(|(a, _)| a)
}

/// Compute the sha256 digest of a file as lowercase hex
pub fn calculate_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Verify a downloaded file against an expected sha256 digest
pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let actual = calculate_sha256(path)?;
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(StoreError::Install(format!(
            "Checksum mismatch for '{}': expected {}, got {}",
            path.display(),
            expected,
            actual
        )))
    }
}

/// Extract a tar.gz archive into `dest_dir`, returning the extracted
/// entry paths
pub fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dest_dir)?;

    let file = File::open(archive_path)?;
    let mut archive = Archive::new(GzDecoder::new(file));

    let mut extracted = Vec::new();
    for entry in archive.entries().map_err(|e| {
        StoreError::Install(format!(
            "Cannot read archive '{}': {}",
            archive_path.display(),
            e
        ))
    })? {
        let mut entry =
            entry.map_err(|e| StoreError::Install(format!("Corrupt archive entry: {}", e)))?;
        let path = entry
            .path()
            .map_err(|e| StoreError::Install(format!("Invalid entry path: {}", e)))?
            .into_owned();

        entry.unpack_in(dest_dir).map_err(|e| {
            StoreError::Install(format!("Failed to extract '{}': {}", path.display(), e))
        })?;
        extracted.push(dest_dir.join(path));
    }

    if extracted.is_empty() {
        return Err(StoreError::Install(format!(
            "Archive '{}' is empty",
            archive_path.display()
        )));
    }
    Ok(extracted)
}

/// Mark a file executable (no-op on non-Unix)
pub fn mark_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// What happened to the artifact during installation
#[derive(Debug, Clone)]
pub enum InstallOutcome {
    /// Placed as a standalone executable at this path
    Placed(PathBuf),
    /// Extracted into this directory
    Extracted(PathBuf),
    /// Handed to the system package installer / opener
    HandedOff(PathBuf),
}

impl InstallOutcome {
    /// Filesystem location of whatever the install produced
    pub fn path(&self) -> &Path {
        match self {
            InstallOutcome::Placed(p)
            | InstallOutcome::Extracted(p)
            | InstallOutcome::HandedOff(p) => p,
        }
    }
}

/// Install a downloaded asset.
///
/// AppImages are moved into `install_dir` and marked executable;
/// tarballs are extracted into a per-app subdirectory; native packages
/// (deb, rpm, dmg, pkg, msi, exe) are opened with the system installer,
/// which takes over from there.
pub fn install_asset(
    downloaded: &Path,
    kind: AssetKind,
    install_dir: &Path,
    app_slug: &str,
) -> Result<InstallOutcome> {
    match kind {
        AssetKind::AppImage => {
            fs::create_dir_all(install_dir)?;
            let file_name = downloaded
                .file_name()
                .ok_or_else(|| StoreError::Install("Download has no file name".into()))?;
            let dest = install_dir.join(file_name);
            move_file(downloaded, &dest)?;
            mark_executable(&dest)?;
            Ok(InstallOutcome::Placed(dest))
        }
        AssetKind::TarGz => {
            // owner/repo -> owner-repo directory
            let dest_dir = install_dir.join(app_slug.replace('/', "-"));
            let entries = extract_tar_gz(downloaded, &dest_dir)?;
            for entry in &entries {
                // Extension-less regular files in an archive are almost
                // always the binaries
                if entry.is_file() && entry.extension().is_none() {
                    mark_executable(entry)?;
                }
            }
            let _ = fs::remove_file(downloaded);
            Ok(InstallOutcome::Extracted(dest_dir))
        }
        AssetKind::Deb
        | AssetKind::Rpm
        | AssetKind::Dmg
        | AssetKind::Pkg
        | AssetKind::Msi
        | AssetKind::Exe => {
            open_with_system(downloaded)?;
            Ok(InstallOutcome::HandedOff(downloaded.to_path_buf()))
        }
    }
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    // rename fails across filesystems; fall back to copy + remove
    if fs::rename(from, to).is_err() {
        fs::copy(from, to)?;
        fs::remove_file(from)?;
    }
    Ok(())
}

/// Open a package file with the platform's default handler
fn open_with_system(path: &Path) -> Result<()> {
    let status = if cfg!(target_os = "macos") {
        Command::new("open").arg(path).status()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", ""]).arg(path).status()
    } else {
        Command::new("xdg-open").arg(path).status()
    };

    match status {
        Ok(s) if s.success() => Ok(()),
        Ok(s) => Err(StoreError::Install(format!(
            "System installer exited with status {} for '{}'",
            s,
            path.display()
        ))),
        Err(e) => Err(StoreError::Install(format!(
            "Could not launch the system installer for '{}': {}",
            path.display(),
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn asset(name: &str, size: u64) -> Asset {
        Asset {
            name: name.to_string(),
            browser_download_url: format!("https://example.com/{name}"),
            size,
            download_count: 0,
            content_type: None,
        }
    }

    #[test]
    fn classifies_known_extensions() {
        assert_eq!(AssetKind::classify("App-1.0.AppImage"), Some(AssetKind::AppImage));
        assert_eq!(AssetKind::classify("app_1.0_amd64.deb"), Some(AssetKind::Deb));
        assert_eq!(AssetKind::classify("app-1.0.x86_64.rpm"), Some(AssetKind::Rpm));
        assert_eq!(AssetKind::classify("App-1.0.dmg"), Some(AssetKind::Dmg));
        assert_eq!(AssetKind::classify("App-1.0.pkg"), Some(AssetKind::Pkg));
        assert_eq!(AssetKind::classify("app-setup.msi"), Some(AssetKind::Msi));
        assert_eq!(AssetKind::classify("app-setup.exe"), Some(AssetKind::Exe));
        assert_eq!(AssetKind::classify("app-linux.tar.gz"), Some(AssetKind::TarGz));
        assert_eq!(AssetKind::classify("app-linux.tgz"), Some(AssetKind::TarGz));
    }

    #[test]
    fn rejects_non_installable_files() {
        assert_eq!(AssetKind::classify("checksums.txt"), None);
        assert_eq!(AssetKind::classify("app.apk"), None);
        assert_eq!(AssetKind::classify("source.zip"), None);
        assert_eq!(AssetKind::classify("app.deb.sha256"), None);
    }

    #[test]
    fn platform_support_matrix() {
        assert!(Platform::Linux.supports(AssetKind::AppImage));
        assert!(Platform::Linux.supports(AssetKind::Deb));
        assert!(!Platform::Linux.supports(AssetKind::Dmg));
        assert!(Platform::Macos.supports(AssetKind::Dmg));
        assert!(!Platform::Macos.supports(AssetKind::Exe));
        assert!(Platform::Windows.supports(AssetKind::Msi));
        assert!(!Platform::Windows.supports(AssetKind::TarGz));
        assert!(Platform::All.supports(AssetKind::Exe));
    }

    #[test]
    fn unlabeled_architecture_is_compatible() {
        assert!(architecture_compatible("app-1.0.AppImage"));
    }

    #[test]
    fn foreign_architecture_is_rejected() {
        // At most one of these labels can match the build machine
        let compatible = ["app-x86_64.AppImage", "app-aarch64.AppImage"]
            .iter()
            .filter(|n| architecture_compatible(n))
            .count();
        assert!(compatible <= 1);
    }

    #[test]
    fn parses_platform_names() {
        assert_eq!(Platform::parse("linux"), Some(Platform::Linux));
        assert_eq!(Platform::parse("MacOS"), Some(Platform::Macos));
        assert_eq!(Platform::parse("win"), Some(Platform::Windows));
        assert_eq!(Platform::parse("all"), Some(Platform::All));
        assert_eq!(Platform::parse("beos"), None);
    }

    #[test]
    fn prefers_appimage_on_linux() {
        let assets = vec![
            asset("app_1.0_amd64.deb", 5_000_000),
            asset("App-1.0.AppImage", 80_000_000),
            asset("checksums.txt", 100),
        ];
        let chosen = choose_primary_asset(&assets, Platform::Linux, &[]).unwrap();
        assert_eq!(chosen.name, "App-1.0.AppImage");
    }

    #[test]
    fn config_preference_overrides_default_priority() {
        let assets = vec![
            asset("app_1.0_amd64.deb", 5_000_000),
            asset("App-1.0.AppImage", 80_000_000),
        ];
        let preferred = vec!["deb".to_string()];
        let chosen = choose_primary_asset(&assets, Platform::Linux, &preferred).unwrap();
        assert_eq!(chosen.name, "app_1.0_amd64.deb");
    }

    #[test]
    fn no_installable_asset_yields_none() {
        let assets = vec![asset("source.zip", 100), asset("notes.md", 10)];
        assert!(choose_primary_asset(&assets, Platform::Linux, &[]).is_none());
    }

    #[test]
    fn sha256_verification() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("artifact.bin");
        fs::write(&path, b"hello world").unwrap();

        // sha256 of "hello world"
        let expected = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
        verify_sha256(&path, expected).unwrap();
        verify_sha256(&path, &expected.to_uppercase()).unwrap();
        assert!(verify_sha256(&path, "deadbeef").is_err());
    }

    #[test]
    fn extracts_tar_gz_archives() {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("app.tar.gz");

        // Build a small archive containing one file
        {
            let file = File::create(&archive_path).unwrap();
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            let mut builder = tar::Builder::new(encoder);

            let content = b"#!/bin/sh\necho hi\n";
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, "app", &content[..]).unwrap();
            builder.into_inner().unwrap().finish().unwrap();
        }

        let dest = dir.path().join("out");
        let entries = extract_tar_gz(&archive_path, &dest).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(dest.join("app").is_file());
    }

    #[test]
    fn appimage_install_places_and_marks_executable() {
        let dir = tempdir().unwrap();
        let staged = dir.path().join("App-1.0.AppImage");
        let mut f = File::create(&staged).unwrap();
        f.write_all(b"fake appimage").unwrap();
        drop(f);

        let install_dir = dir.path().join("apps");
        let outcome =
            install_asset(&staged, AssetKind::AppImage, &install_dir, "dev/app").unwrap();

        let installed = outcome.path();
        assert!(installed.is_file());
        assert!(!staged.exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(installed).unwrap().permissions().mode();
            assert_ne!(mode & 0o111, 0);
        }
    }
}
