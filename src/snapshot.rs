//! On-disk snapshot written by `fetch` and read back by `report`.
//!
//! Layout under the snapshot root:
//!
//! ```text
//! merged_pulls.json          every merged pull request, as one JSON array
//! pr_<number>/pr.json        the pull request record
//! pr_<number>/reviews.json   its reviews (possibly `[]`)
//! pr_<number>/commit_status.json
//!                            combined status: payload, `{}` or `{"error": ...}`
//! ```
//!
//! Files are pretty-printed UTF-8 JSON. The snapshot is the reporter's only
//! input; it never contacts the API.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AuditError;
use crate::github::models::{CombinedStatus, PullRequest, Review};

/// Aggregate list of merged pull requests.
pub const MERGED_PULLS_FILE: &str = "merged_pulls.json";
/// Pull request record inside a per-record directory.
pub const PULL_REQUEST_FILE: &str = "pr.json";
/// Review list inside a per-record directory.
pub const REVIEWS_FILE: &str = "reviews.json";
/// Combined status inside a per-record directory.
pub const STATUS_FILE: &str = "commit_status.json";

const DIR_PREFIX: &str = "pr_";

/// Everything fetched for one merged pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestSnapshot {
    /// The pull request record.
    pub pull_request: PullRequest,
    /// Reviews in API order.
    pub reviews: Vec<Review>,
    /// Combined status of the merge commit.
    pub status: CombinedStatus,
}

/// Directory name holding the records of pull request `number`.
#[must_use]
pub fn pull_request_dir_name(number: u64) -> String {
    format!("{DIR_PREFIX}{number}")
}

/// Writes the aggregate file and one directory per pull request under `root`.
///
/// `root` and any missing parents are created. Existing files with the same
/// names are overwritten.
///
/// # Errors
///
/// Returns [`AuditError::Io`] when a directory or file cannot be written.
pub fn persist_snapshot(
    root: &Utf8Path,
    snapshots: &[PullRequestSnapshot],
) -> Result<(), AuditError> {
    Dir::create_ambient_dir_all(root, ambient_authority()).map_err(|error| AuditError::Io {
        message: format!("failed to create snapshot directory '{root}': {error}"),
    })?;
    let dir = open_dir(root, "snapshot")?;

    let merged: Vec<&PullRequest> = snapshots
        .iter()
        .map(|snapshot| &snapshot.pull_request)
        .collect();
    write_json(&dir, root, MERGED_PULLS_FILE, &merged)?;

    for snapshot in snapshots {
        write_record(&dir, root, snapshot)?;
    }

    tracing::info!(root = %root, records = snapshots.len(), "snapshot written");
    Ok(())
}

fn write_record(
    root_dir: &Dir,
    root: &Utf8Path,
    snapshot: &PullRequestSnapshot,
) -> Result<(), AuditError> {
    let name = pull_request_dir_name(snapshot.pull_request.number);
    let path = root.join(&name);
    root_dir
        .create_dir_all(&name)
        .map_err(|error| AuditError::Io {
            message: format!("failed to create record directory '{path}': {error}"),
        })?;
    let record_dir = root_dir.open_dir(&name).map_err(|error| AuditError::Io {
        message: format!("failed to open record directory '{path}': {error}"),
    })?;

    write_json(&record_dir, &path, PULL_REQUEST_FILE, &snapshot.pull_request)?;
    write_json(&record_dir, &path, REVIEWS_FILE, &snapshot.reviews)?;
    write_json(&record_dir, &path, STATUS_FILE, &snapshot.status)
}

fn write_json<V>(dir: &Dir, dir_path: &Utf8Path, file_name: &str, value: &V) -> Result<(), AuditError>
where
    V: Serialize + ?Sized,
{
    let path = dir_path.join(file_name);
    let mut json = serde_json::to_string_pretty(value).map_err(|error| AuditError::Io {
        message: format!("failed to serialise '{path}': {error}"),
    })?;
    json.push('\n');
    dir.write(file_name, json).map_err(|error| AuditError::Io {
        message: format!("failed to write '{path}': {error}"),
    })
}

/// Lists the per-record directories under `root`, lowest number first.
///
/// Only directories named `pr_<something>` are returned; other entries are
/// ignored.
///
/// # Errors
///
/// Returns [`AuditError::Io`] when `root` cannot be opened or listed.
pub fn discover_pull_request_dirs(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, AuditError> {
    let dir = open_dir(root, "snapshot")?;
    let entries = dir.entries().map_err(|error| AuditError::Io {
        message: format!("failed to list snapshot directory '{root}': {error}"),
    })?;

    let mut names: Vec<String> = Vec::new();
    for entry_result in entries {
        let Ok(entry) = entry_result else { continue };
        let Ok(name) = entry.file_name() else {
            continue;
        };
        if !name.starts_with(DIR_PREFIX) {
            continue;
        }
        if !entry.file_type().is_ok_and(|file_type| file_type.is_dir()) {
            continue;
        }
        names.push(name);
    }

    names.sort_by_key(|name| {
        let number = name
            .strip_prefix(DIR_PREFIX)
            .and_then(|suffix| suffix.parse::<u64>().ok());
        (number.is_none(), number, name.clone())
    });
    Ok(names.into_iter().map(|name| root.join(name)).collect())
}

/// Reads the three records of one pull request directory.
///
/// # Errors
///
/// Returns [`AuditError::MalformedRecord`] when the directory or any of its
/// files is missing or cannot be parsed.
pub fn read_snapshot(dir_path: &Utf8Path) -> Result<PullRequestSnapshot, AuditError> {
    let dir =
        Dir::open_ambient_dir(dir_path, ambient_authority()).map_err(|error| malformed(dir_path, &error))?;

    Ok(PullRequestSnapshot {
        pull_request: read_json(&dir, dir_path, PULL_REQUEST_FILE)?,
        reviews: read_json(&dir, dir_path, REVIEWS_FILE)?,
        status: read_json(&dir, dir_path, STATUS_FILE)?,
    })
}

/// Reads the aggregate list of merged pull requests under `root`.
///
/// # Errors
///
/// Returns [`AuditError::MalformedRecord`] when the file is missing or
/// cannot be parsed.
pub fn read_merged_pulls(root: &Utf8Path) -> Result<Vec<PullRequest>, AuditError> {
    let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(|error| malformed(root, &error))?;
    read_json(&dir, root, MERGED_PULLS_FILE)
}

fn read_json<V>(dir: &Dir, dir_path: &Utf8Path, file_name: &str) -> Result<V, AuditError>
where
    V: DeserializeOwned,
{
    let content = dir.read_to_string(file_name).map_err(|error| AuditError::MalformedRecord {
        path: dir_path.to_string(),
        message: format!("cannot read {file_name}: {error}"),
    })?;
    serde_json::from_str(&content).map_err(|error| AuditError::MalformedRecord {
        path: dir_path.to_string(),
        message: format!("cannot parse {file_name}: {error}"),
    })
}

fn malformed(path: &Utf8Path, error: &std::io::Error) -> AuditError {
    AuditError::MalformedRecord {
        path: path.to_string(),
        message: error.to_string(),
    }
}

/// Opens a directory using ambient authority.
fn open_dir(path: &Utf8Path, label: &str) -> Result<Dir, AuditError> {
    Dir::open_ambient_dir(path, ambient_authority()).map_err(|error| AuditError::Io {
        message: format!("failed to open {label} directory '{path}': {error}"),
    })
}
