//! Directory-level operations built on the filename parser.
//!
//! Every operation lists its directories afresh and parses each archive name again;
//! nothing is cached between calls.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{Config, ConfigError, TargetVersion};
use crate::filesystem::{self, FilesystemError};
use crate::mod_parser::{ModParser, ParsedMod};
use crate::version_compare::compare_versions;
use crate::version_token::TokenMatcher;

/// Errors that abort an operation.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
    /// Console I/O while running an operation interactively.
    #[error("Console error: {0}")]
    Console(#[from] std::io::Error),
}

/// One line of the update-diff report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEntry {
    /// Present in both directories with different versions.
    Changed { name: String, old: String, new: String },
    /// Only in the update directory.
    New(ParsedMod),
    /// Present in both directories with the same version.
    Unchanged(ParsedMod),
    /// Only in the main directory.
    MainOnly(ParsedMod),
}

impl fmt::Display for UpdateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateEntry::Changed { name, old, new } => write!(f, "{name}: {old} -> {new}"),
            UpdateEntry::New(m) => write!(f, "{}: {} new", m.name, m.version),
            UpdateEntry::Unchanged(m) | UpdateEntry::MainOnly(m) => write!(f, "{m}"),
        }
    }
}

/// Result of comparing an update directory against the main directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub entries: Vec<UpdateEntry>,
    pub updated: usize,
    pub new: usize,
}

impl UpdateReport {
    /// Text written to the report file: one line per entry, a blank line, then the summary.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out.push_str(&format!("\nMods Updated: {} New Mods: {}", self.updated, self.new));
        out
    }
}

/// Files found on only one side of a client/server pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideReport {
    pub client_only: Vec<ParsedMod>,
    pub server_only: Vec<ParsedMod>,
}

impl SideReport {
    pub fn render(&self) -> String {
        let lines = |mods: &[ParsedMod]| {
            mods.iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        };
        format!(
            "Clientside only files:\n{}\n\nServerside only files:\n{}",
            lines(&self.client_only),
            lines(&self.server_only)
        )
    }
}

/// An archive deleted because a newer copy of the same mod exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedDuplicate {
    pub file: String,
    pub parsed: ParsedMod,
}

/// What the stale-version purge did to each archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeSummary {
    /// Archives naming the target version, with that version stripped.
    pub kept: Vec<ParsedMod>,
    /// Archives deleted for naming another known platform version.
    pub deleted: Vec<String>,
    /// Archives naming no recognisable platform version.
    pub untouched: Vec<String>,
}

/// What the purge should do with one archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeDecision {
    Keep,
    Delete,
    Leave,
}

/// Everything an operation needs for one target version.
#[derive(Debug, Clone)]
pub struct Session {
    config: Config,
    target: TargetVersion,
    parser: ModParser,
    historical: TokenMatcher,
}

impl Session {
    /// # Errors
    ///
    /// Returns `ConfigError` if the filename patterns in `config` cannot be built.
    pub fn new(target: TargetVersion, config: Config) -> Result<Self, ConfigError> {
        let parser = ModParser::new(&target, &config)?;
        let historical = TokenMatcher::historical(&config.historical_versions);
        Ok(Self {
            config,
            target,
            parser,
            historical,
        })
    }

    pub fn parser(&self) -> &ModParser {
        &self.parser
    }

    fn list(&self, dir: &Path) -> Result<Vec<String>, FilesystemError> {
        filesystem::list_archives(dir, &self.config.archive_extension)
    }

    /// Compares the update directory with the main directory and writes the report
    /// into the main directory.
    ///
    /// # Arguments
    ///
    /// * `main_dir` - Directory holding the mods currently in use.
    /// * `update_dir` - Directory holding the candidate updates.
    ///
    /// # Errors
    ///
    /// Returns `OperationError` if either directory cannot be listed or the report
    /// cannot be written.
    ///
    /// # Returns
    ///
    /// The report and the path it was written to.
    pub fn update_diff(&self, main_dir: &Path, update_dir: &Path) -> Result<(UpdateReport, PathBuf), OperationError> {
        let main = self.list(main_dir)?;
        let updates = self.list(update_dir)?;
        let report = diff_updates(&self.parser, &main, &updates);

        let path = main_dir.join(&self.config.update_report);
        filesystem::write_report(&path, &report.render())?;
        log::info!(
            "Update diff: {} updated, {} new, report saved to {}",
            report.updated,
            report.new,
            path.display()
        );
        Ok((report, path))
    }

    /// Deletes every archive in `dir` that has a newer copy of the same mod next to it.
    ///
    /// Mods are grouped by their exact parsed name, so `Mod` and `mod` never delete each
    /// other. On equal versions the file listed later goes.
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory to de-duplicate in place.
    ///
    /// # Errors
    ///
    /// Returns `OperationError` if the directory cannot be listed or a deletion fails.
    /// Deletions made before the failure stay made.
    ///
    /// # Returns
    ///
    /// The removed archives in the order they were deleted.
    pub fn remove_duplicates(&self, dir: &Path) -> Result<Vec<RemovedDuplicate>, OperationError> {
        let files = self.list(dir)?;
        let mut survivors: HashMap<String, (String, ParsedMod)> = HashMap::new();
        let mut removed = Vec::new();

        for file in files {
            let parsed = parse_logged(&self.parser, &file);
            let key = parsed.name.clone();

            let Some((kept_file, kept)) = survivors.get(&key) else {
                survivors.insert(key, (file, parsed));
                continue;
            };

            let loser = if compare_versions(&parsed.version, &kept.version).is_gt() {
                let loser = RemovedDuplicate {
                    file: kept_file.clone(),
                    parsed: kept.clone(),
                };
                survivors.insert(key, (file, parsed));
                loser
            } else {
                RemovedDuplicate { file, parsed }
            };

            filesystem::remove_file(dir.join(&loser.file))?;
            log::info!("Removed duplicate mod: {} {}", loser.parsed.name, loser.parsed.version);
            removed.push(loser);
        }

        log::info!("{} duplicate mods removed from {}", removed.len(), dir.display());
        Ok(removed)
    }

    /// Finds archives present on only one side and writes the report into the client
    /// directory.
    ///
    /// # Arguments
    ///
    /// * `client_dir` - Directory of the client mod set.
    /// * `server_dir` - Directory of the server mod set.
    ///
    /// # Errors
    ///
    /// Returns `OperationError` if either directory cannot be listed or the report
    /// cannot be written.
    ///
    /// # Returns
    ///
    /// The report and the path it was written to.
    pub fn side_diff(&self, client_dir: &Path, server_dir: &Path) -> Result<(SideReport, PathBuf), OperationError> {
        let client = self.list(client_dir)?;
        let server = self.list(server_dir)?;
        let report = diff_sides(&self.parser, &client, &server);

        let path = client_dir.join(&self.config.side_report);
        filesystem::write_report(&path, &report.render())?;
        log::info!(
            "{} client-only and {} server-only files, report saved to {}",
            report.client_only.len(),
            report.server_only.len(),
            path.display()
        );
        Ok((report, path))
    }

    /// Decides the fate of one archive name for the stale-version purge.
    pub fn purge_decision(&self, file: &str) -> PurgeDecision {
        let cleaned = self.parser.clean(file);
        if self.parser.target_matcher().is_match(&cleaned) {
            PurgeDecision::Keep
        } else if self.historical.is_match(&cleaned) {
            PurgeDecision::Delete
        } else {
            PurgeDecision::Leave
        }
    }

    /// Deletes archives built for a different known platform version.
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory to purge in place.
    ///
    /// # Errors
    ///
    /// Returns `OperationError` if the directory cannot be listed or a deletion fails.
    /// Deletions made before the failure stay made.
    ///
    /// # Returns
    ///
    /// What happened to each archive.
    pub fn purge_stale(&self, dir: &Path) -> Result<PurgeSummary, OperationError> {
        let mut summary = PurgeSummary::default();

        for file in self.list(dir)? {
            match self.purge_decision(&file) {
                PurgeDecision::Keep => summary.kept.push(parse_logged(&self.parser, &file)),
                PurgeDecision::Delete => {
                    filesystem::remove_file(dir.join(&file))?;
                    log::info!("Deleting {} because it's not the right version", file);
                    summary.deleted.push(file);
                }
                PurgeDecision::Leave => summary.untouched.push(file),
            }
        }

        log::info!(
            "{} mods removed for target {}",
            summary.deleted.len(),
            self.target
        );
        Ok(summary)
    }
}

/// Parses one archive name, noting names that yield no version.
fn parse_logged(parser: &ModParser, file: &str) -> ParsedMod {
    let parsed = parser.parse(file);
    if parsed.is_unknown() {
        log::debug!("No version found in {file}, using `{}`", parsed.version);
    }
    parsed
}

/// Builds the update-diff report from two archive listings.
///
/// Names match case-insensitively. Update entries come first in listing order, followed
/// by mods that only exist in the main listing.
pub fn diff_updates(parser: &ModParser, main: &[String], updates: &[String]) -> UpdateReport {
    let main_mods: BTreeMap<String, ParsedMod> = main
        .iter()
        .map(|f| {
            let parsed = parse_logged(parser, f);
            (parsed.key(), parsed)
        })
        .collect();

    let mut report = UpdateReport::default();
    let mut seen = HashSet::new();

    for file in updates {
        let parsed = parse_logged(parser, file);
        let key = parsed.key();

        let entry = match main_mods.get(&key) {
            Some(old) if old.version != parsed.version => {
                report.updated += 1;
                UpdateEntry::Changed {
                    name: parsed.name,
                    old: old.version.clone(),
                    new: parsed.version,
                }
            }
            Some(_) => UpdateEntry::Unchanged(parsed),
            None => {
                report.new += 1;
                UpdateEntry::New(parsed)
            }
        };
        report.entries.push(entry);
        seen.insert(key);
    }

    report.entries.extend(
        main_mods
            .into_iter()
            .filter(|(key, _)| !seen.contains(key))
            .map(|(_, parsed)| UpdateEntry::MainOnly(parsed)),
    );

    report
}

/// Splits two listings into files found only on the client and only on the server.
///
/// Files are matched by exact file name.
pub fn diff_sides(parser: &ModParser, client: &[String], server: &[String]) -> SideReport {
    let client_set: HashSet<&str> = client.iter().map(String::as_str).collect();
    let server_set: HashSet<&str> = server.iter().map(String::as_str).collect();

    SideReport {
        client_only: client
            .iter()
            .filter(|f| !server_set.contains(f.as_str()))
            .map(|f| parse_logged(parser, f))
            .collect(),
        server_only: server
            .iter()
            .filter(|f| !client_set.contains(f.as_str()))
            .map(|f| parse_logged(parser, f))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    fn session(target: &str) -> Session {
        let _ = env_logger::builder().is_test(true).try_init();
        Session::new(TargetVersion::parse(target).unwrap(), Config::default()).unwrap()
    }

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            File::create(dir.join(name)).unwrap();
        }
    }

    fn listing(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn update_diff_end_to_end() {
        let main = tempfile::tempdir().unwrap();
        let update = tempfile::tempdir().unwrap();
        touch(main.path(), &["modA-1.0.jar"]);
        touch(update.path(), &["modA-2.0.jar", "modB-1.0.jar"]);

        let (report, path) = session("1.21").update_diff(main.path(), update.path()).unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(report.new, 1);
        assert_eq!(path, main.path().join("processed_mods.txt"));

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("modA: 1.0 -> 2.0\n"));
        assert!(written.contains("modB: 1.0 new\n"));
        assert!(written.ends_with("Mods Updated: 1 New Mods: 1"));
    }

    #[test]
    fn update_diff_matches_names_case_insensitively() {
        let s = session("1.21");
        let report = diff_updates(
            s.parser(),
            &listing(&["ExampleMod-1.0.jar"]),
            &listing(&["examplemod-1.0.jar"]),
        );
        assert_eq!(report.new, 0);
        assert_eq!(report.updated, 0);
        assert_eq!(
            report.entries,
            vec![UpdateEntry::Unchanged(ParsedMod::new("examplemod", "1.0"))]
        );
    }

    #[test]
    fn update_diff_lists_main_only_mods_last() {
        let s = session("1.21");
        let report = diff_updates(
            s.parser(),
            &listing(&["alpha-1.0.jar", "beta-2.0.jar"]),
            &listing(&["gamma-1.0.jar"]),
        );
        assert_eq!(
            report.render(),
            "gamma: 1.0 new\nalpha: 1.0\nbeta: 2.0\n\nMods Updated: 0 New Mods: 1"
        );
    }

    #[test]
    fn update_diff_ignores_target_version_tokens() {
        let s = session("1.21");
        let report = diff_updates(
            s.parser(),
            &listing(&["jei-1.21-19.0.jar"]),
            &listing(&["jei-1.21.1-19.5.jar"]),
        );
        assert_eq!(
            report.entries,
            vec![UpdateEntry::Changed {
                name: "jei".to_string(),
                old: "19.0".to_string(),
                new: "19.5".to_string(),
            }]
        );
    }

    #[test]
    fn remove_duplicates_keeps_highest_version() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["mod-1.0.jar", "mod-2.0.jar", "other-1.0.jar"]);

        let removed = session("1.21").remove_duplicates(dir.path()).unwrap();
        assert_eq!(
            removed,
            vec![RemovedDuplicate {
                file: "mod-1.0.jar".to_string(),
                parsed: ParsedMod::new("mod", "1.0"),
            }]
        );
        assert!(!dir.path().join("mod-1.0.jar").exists());
        assert!(dir.path().join("mod-2.0.jar").exists());
        assert!(dir.path().join("other-1.0.jar").exists());

        let remaining = session("1.21").parser().parse("mod-2.0.jar");
        assert_eq!(remaining.version, "2.0");
    }

    #[test]
    fn remove_duplicates_drops_later_file_when_older_comes_second() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["mod-1.10.jar", "mod-1.9.jar"]);

        let removed = session("1.21").remove_duplicates(dir.path()).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].file, "mod-1.9.jar");
        assert!(dir.path().join("mod-1.10.jar").exists());
    }

    #[test]
    fn remove_duplicates_keeps_names_differing_in_case() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["Mod-1.10.jar", "mod-1.9.jar"]);

        let removed = session("1.21").remove_duplicates(dir.path()).unwrap();
        assert!(removed.is_empty());
        assert!(dir.path().join("Mod-1.10.jar").exists());
        assert!(dir.path().join("mod-1.9.jar").exists());
    }

    #[test]
    fn remove_duplicates_with_equal_versions_drops_one() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["mod-1.0.jar", "mod_1.0.jar"]);

        let removed = session("1.21").remove_duplicates(dir.path()).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].file, "mod_1.0.jar");
        assert!(dir.path().join("mod-1.0.jar").exists());
    }

    #[test]
    fn side_diff_reports_both_sides() {
        let client = tempfile::tempdir().unwrap();
        let server = tempfile::tempdir().unwrap();
        touch(client.path(), &["shared-1.0.jar", "minimap-2.0.jar"]);
        touch(server.path(), &["shared-1.0.jar", "backup-3.1.jar"]);

        let (report, path) = session("1.21").side_diff(client.path(), server.path()).unwrap();
        assert_eq!(report.client_only, vec![ParsedMod::new("minimap", "2.0")]);
        assert_eq!(report.server_only, vec![ParsedMod::new("backup", "3.1")]);
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "Clientside only files:\nminimap: 2.0\n\nServerside only files:\nbackup: 3.1"
        );
    }

    #[test]
    fn side_diff_matches_exact_file_names() {
        let s = session("1.21");
        let report = diff_sides(s.parser(), &listing(&["Mod-1.0.jar"]), &listing(&["mod-1.0.jar"]));
        assert_eq!(report.client_only.len(), 1);
        assert_eq!(report.server_only.len(), 1);
    }

    #[test]
    fn purge_decision_follows_platform_tokens() {
        let s = session("1.21");
        assert_eq!(s.purge_decision("sodium-fabric-0.6.0+mc1.21.1.jar"), PurgeDecision::Keep);
        assert_eq!(s.purge_decision("appleskin-1.20.1-1.21-3.0.5.jar"), PurgeDecision::Keep);
        assert_eq!(s.purge_decision("jei-1.20.1-15.2.jar"), PurgeDecision::Delete);
        assert_eq!(s.purge_decision("oldmod-1.7.10-1.0.jar"), PurgeDecision::Delete);
        assert_eq!(s.purge_decision("library-2.3.jar"), PurgeDecision::Leave);
    }

    #[test]
    fn purge_uses_configured_historical_versions() {
        let config = Config {
            historical_versions: vec!["9.9.x".to_string()],
            ..Config::default()
        };
        let s = Session::new(TargetVersion::parse("9.10").unwrap(), config).unwrap();
        assert_eq!(s.purge_decision("mod-9.9.1-1.0.jar"), PurgeDecision::Delete);
        assert_eq!(s.purge_decision("mod-1.20.1-1.0.jar"), PurgeDecision::Leave);
        assert_eq!(s.purge_decision("mod-9.10-1.0.jar"), PurgeDecision::Keep);
    }

    #[test]
    fn purge_stale_deletes_only_wrong_platform_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            &["keep-1.21.1-2.0.jar", "stale-1.20.4-2.0.jar", "plain-2.0.jar", "notes.txt"],
        );

        let summary = session("1.21").purge_stale(dir.path()).unwrap();
        assert_eq!(summary.kept, vec![ParsedMod::new("keep", "2.0")]);
        assert_eq!(summary.deleted, vec!["stale-1.20.4-2.0.jar"]);
        assert_eq!(summary.untouched, vec!["plain-2.0.jar"]);
        assert!(!dir.path().join("stale-1.20.4-2.0.jar").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn operations_fail_loudly_on_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let s = session("1.21");
        assert!(matches!(s.purge_stale(&missing), Err(OperationError::Filesystem(_))));
        assert!(s.remove_duplicates(&missing).is_err());
        assert!(s.update_diff(&missing, dir.path()).is_err());
        assert!(s.side_diff(dir.path(), &missing).is_err());
    }
}
