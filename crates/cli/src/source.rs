//! Loading token snapshots from disk or from the published token repository.
//!
//! A snapshot is either a single JSON file, a directory of JSON files, or a
//! git ref (release tag or branch) on the remote content host. Multi-file
//! snapshots are merged into one [`Dictionary`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokendiff_engine::{Dictionary, DictionaryError};
use tracing::{debug, warn};

use crate::config::RemoteConfig;

/// Name of the file listing a remote package's token files.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Where a snapshot comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// A JSON file, or a directory whose `*.json` files are merged.
    Local(PathBuf),
    /// A released version; resolved to a tag with the configured prefix.
    Version(String),
    /// A branch name.
    Branch(String),
}

impl SourceSpec {
    /// Pick the single selector the user supplied for one side.
    pub fn from_selectors(
        version: Option<String>,
        branch: Option<String>,
        path: Option<PathBuf>,
    ) -> Option<Self> {
        match (version, branch, path) {
            (Some(v), None, None) => Some(SourceSpec::Version(v)),
            (None, Some(b), None) => Some(SourceSpec::Branch(b)),
            (None, None, Some(p)) => Some(SourceSpec::Local(p)),
            _ => None,
        }
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Local(path) => write!(f, "{}", path.display()),
            SourceSpec::Version(v) => write!(f, "version {v}"),
            SourceSpec::Branch(b) => write!(f, "branch {b}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("could not read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in '{origin}': {source}")]
    Json {
        origin: String,
        source: serde_json::Error,
    },
    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },
    #[error("manifest at {0} must be a JSON array of file paths")]
    InvalidManifest(String),
    #[error("'{origin}' is not a token dictionary: {source}")]
    Dictionary {
        origin: String,
        source: DictionaryError,
    },
    #[error("no .json files found in '{}'", .0.display())]
    EmptyDirectory(PathBuf),
}

/// Load the snapshot named by `spec`.
pub fn load(spec: &SourceSpec, remote: &RemoteConfig) -> Result<Dictionary, SourceError> {
    debug!(source = %spec, "loading snapshot");
    let dictionary = match spec {
        SourceSpec::Local(path) => load_local(path)?,
        SourceSpec::Version(version) => RemoteClient::new(remote).fetch(&remote.tag_for(version))?,
        SourceSpec::Branch(branch) => RemoteClient::new(remote).fetch(branch)?,
    };
    debug!(source = %spec, entries = dictionary.len(), "snapshot loaded");
    Ok(dictionary)
}

/// Load a JSON file, or every `*.json` file directly inside a directory.
pub fn load_local(path: &Path) -> Result<Dictionary, SourceError> {
    if path.is_dir() {
        load_dir(path)
    } else {
        load_file(path)
    }
}

fn load_file(path: &Path) -> Result<Dictionary, SourceError> {
    let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dictionary(&path.display().to_string(), &bytes)
}

fn load_dir(dir: &Path) -> Result<Dictionary, SourceError> {
    let io_err = |source: std::io::Error| SourceError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(SourceError::EmptyDirectory(dir.to_path_buf()));
    }
    files.sort();

    let mut parts = Vec::with_capacity(files.len());
    for file in files {
        let dictionary = load_file(&file)?;
        parts.push((file.display().to_string(), dictionary));
    }
    Ok(merge_parts(parts))
}

/// Parse one file's bytes into a dictionary. `origin` names it in errors.
pub fn parse_dictionary(origin: &str, bytes: &[u8]) -> Result<Dictionary, SourceError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|source| SourceError::Json {
        origin: origin.to_string(),
        source,
    })?;
    Dictionary::try_from(value).map_err(|source| SourceError::Dictionary {
        origin: origin.to_string(),
        source,
    })
}

/// Merge per-file dictionaries in order. On a name clash the later file wins.
pub fn merge_parts(parts: Vec<(String, Dictionary)>) -> Dictionary {
    let mut merged = Dictionary::new();
    for (origin, part) in parts {
        for name in merged.merge(part) {
            warn!(entry = %name, file = %origin, "entry defined in more than one file; keeping the later one");
        }
    }
    merged
}

// ── Remote ─────────────────────────────────────────────────────────────────

/// HTTP client for the raw content host serving published token packages.
pub struct RemoteClient {
    base_url: String,
    package_path: String,
    agent: ureq::Agent,
}

impl RemoteClient {
    pub fn new(remote: &RemoteConfig) -> Self {
        Self {
            base_url: remote.base_url.trim_end_matches('/').to_string(),
            package_path: remote.package_path.trim_matches('/').to_string(),
            agent: ureq::Agent::new_with_defaults(),
        }
    }

    /// URL of `file` inside the package at `git_ref`.
    pub fn file_url(&self, git_ref: &str, file: &str) -> String {
        let file = file.trim_start_matches("./").trim_start_matches('/');
        if self.package_path.is_empty() {
            format!("{}/{}/{}", self.base_url, git_ref, file)
        } else {
            format!("{}/{}/{}/{}", self.base_url, git_ref, self.package_path, file)
        }
    }

    /// Fetch the manifest at `git_ref`, then every file it lists, and merge.
    ///
    /// GET `<base_url>/<ref>/<package_path>/manifest.json`
    pub fn fetch(&self, git_ref: &str) -> Result<Dictionary, SourceError> {
        let manifest_url = self.file_url(git_ref, MANIFEST_FILE);
        let manifest = self.get(&manifest_url)?;
        let manifest: Value = serde_json::from_slice(&manifest).map_err(|source| SourceError::Json {
            origin: manifest_url.clone(),
            source,
        })?;
        let files = parse_manifest(&manifest_url, &manifest)?;
        debug!(git_ref, files = files.len(), "fetched manifest");

        let mut parts = Vec::with_capacity(files.len());
        for file in files {
            let url = self.file_url(git_ref, &file);
            let bytes = self.get(&url)?;
            parts.push((url.clone(), parse_dictionary(&url, &bytes)?));
        }
        Ok(merge_parts(parts))
    }

    fn get(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        debug!(url, "GET");
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| classify_http_error(url, e))?;
        response
            .into_body()
            .read_to_vec()
            .map_err(|e| SourceError::Http {
                url: url.to_string(),
                message: format!("error reading response: {e}"),
            })
    }
}

/// The file list of a package manifest.
pub fn parse_manifest(url: &str, manifest: &Value) -> Result<Vec<String>, SourceError> {
    let invalid = || SourceError::InvalidManifest(url.to_string());
    manifest
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

fn classify_http_error(url: &str, err: ureq::Error) -> SourceError {
    let message = match err {
        ureq::Error::StatusCode(404) => {
            "not found (check the version, branch and package path)".to_string()
        }
        ureq::Error::StatusCode(status @ 500..=599) => format!("server error ({status})"),
        ureq::Error::StatusCode(status) => format!("unexpected status {status}"),
        other => other.to_string(),
    };
    SourceError::Http {
        url: url.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    fn remote(base_url: &str, package_path: &str) -> RemoteConfig {
        RemoteConfig {
            base_url: base_url.to_string(),
            package_path: package_path.to_string(),
            tag_prefix: "@adobe/spectrum-tokens@".to_string(),
        }
    }

    /// Serve `routes` over plain HTTP on a loopback port and return the base URL.
    /// Unknown paths answer 404.
    fn serve(routes: &[(&str, &str)]) -> String {
        let routes: Vec<(String, String)> = routes
            .iter()
            .map(|(path, body)| (path.to_string(), body.to_string()))
            .collect();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                loop {
                    let mut header = String::new();
                    if reader.read_line(&mut header).unwrap() == 0 || header == "\r\n" {
                        break;
                    }
                }
                let path = request_line.split_whitespace().nth(1).unwrap_or("");
                let (status, body) = match routes.iter().find(|(p, _)| p == path) {
                    Some((_, body)) => ("200 OK", body.as_str()),
                    None => ("404 Not Found", "missing"),
                };
                let _ = write!(
                    stream,
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn selectors_require_exactly_one_choice() {
        assert_eq!(
            SourceSpec::from_selectors(Some("13.0.0".into()), None, None),
            Some(SourceSpec::Version("13.0.0".into()))
        );
        assert_eq!(
            SourceSpec::from_selectors(None, None, Some(PathBuf::from("a.json"))),
            Some(SourceSpec::Local(PathBuf::from("a.json")))
        );
        assert_eq!(SourceSpec::from_selectors(None, None, None), None);
        assert_eq!(
            SourceSpec::from_selectors(Some("1".into()), Some("main".into()), None),
            None
        );
    }

    #[test]
    fn version_resolves_to_prefixed_tag() {
        let config = remote("https://example.com", "packages/tokens");
        assert_eq!(config.tag_for("13.1.0"), "@adobe/spectrum-tokens@13.1.0");
        assert_eq!(SourceSpec::Version("13.1.0".into()).to_string(), "version 13.1.0");
        assert_eq!(SourceSpec::Branch("main".into()).to_string(), "branch main");
    }

    #[test]
    fn remote_urls_are_built_under_the_package() {
        let client = RemoteClient::new(&remote("https://example.com/repo/", "/packages/tokens/"));
        assert_eq!(
            client.file_url("main", MANIFEST_FILE),
            "https://example.com/repo/main/packages/tokens/manifest.json"
        );
        assert_eq!(
            client.file_url("main", "./src/color.json"),
            "https://example.com/repo/main/packages/tokens/src/color.json"
        );

        let bare = RemoteClient::new(&remote("https://example.com", ""));
        assert_eq!(bare.file_url("v1", "a.json"), "https://example.com/v1/a.json");
    }

    #[test]
    fn manifest_must_be_array_of_strings() {
        assert_eq!(
            parse_manifest("u", &json!(["src/a.json", "src/b.json"])).unwrap(),
            vec!["src/a.json".to_string(), "src/b.json".to_string()]
        );
        assert!(matches!(
            parse_manifest("u", &json!({"files": []})),
            Err(SourceError::InvalidManifest(_))
        ));
        assert!(matches!(
            parse_manifest("u", &json!(["a.json", 3])),
            Err(SourceError::InvalidManifest(_))
        ));
    }

    #[test]
    fn loads_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tokens.json");
        fs::write(&file, r#"{"a": {"value": "1px", "uuid": "u1"}}"#).unwrap();
        let dictionary = load_local(&file).unwrap();
        assert_eq!(dictionary.len(), 1);
        assert_eq!(dictionary.get("a").unwrap().identifier(), Some("u1"));
    }

    #[test]
    fn directory_files_merge_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), r#"{"shared": {"value": "from-b"}}"#).unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{"shared": {"value": "from-a"}, "only-a": {"value": 1}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let dictionary = load_local(dir.path()).unwrap();
        assert_eq!(dictionary.len(), 2);
        assert_eq!(
            dictionary.get("shared").unwrap().value(),
            &json!({"value": "from-b"})
        );
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_local(dir.path()),
            Err(SourceError::EmptyDirectory(_))
        ));
    }

    #[test]
    fn load_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        let err = load_local(&broken).unwrap_err();
        assert!(matches!(err, SourceError::Json { .. }));
        assert!(err.to_string().contains("broken.json"));

        let list = dir.path().join("list.json");
        fs::write(&list, "[1, 2]").unwrap();
        let err = load_local(&list).unwrap_err();
        assert!(matches!(err, SourceError::Dictionary { .. }));

        let missing = dir.path().join("missing.json");
        assert!(matches!(load_local(&missing), Err(SourceError::Io { .. })));
    }

    #[test]
    fn fetch_merges_manifest_files_in_listed_order() {
        let base = serve(&[
            (
                "/main/packages/tokens/manifest.json",
                r#"["src/color.json", "src/layout.json"]"#,
            ),
            (
                "/main/packages/tokens/src/color.json",
                r##"{"gray-50": {"value": "#fff", "uuid": "g50"}, "shared": {"value": "from-color"}}"##,
            ),
            (
                "/main/packages/tokens/src/layout.json",
                r#"{"spacing-100": {"value": "8px", "uuid": "s100"}, "shared": {"value": "from-layout"}}"#,
            ),
        ]);
        let config = remote(&base, "packages/tokens");

        let dictionary = RemoteClient::new(&config).fetch("main").unwrap();
        assert_eq!(dictionary.len(), 3);
        assert_eq!(dictionary.get("gray-50").unwrap().identifier(), Some("g50"));
        assert_eq!(dictionary.get("spacing-100").unwrap().identifier(), Some("s100"));
        assert_eq!(
            dictionary.get("shared").unwrap().value(),
            &json!({"value": "from-layout"})
        );

        let via_branch = load(&SourceSpec::Branch("main".into()), &config).unwrap();
        assert_eq!(via_branch, dictionary);
    }

    #[test]
    fn version_fetches_from_the_prefixed_tag() {
        let base = serve(&[
            ("/v13.1.0/tokens/manifest.json", r#"["a.json"]"#),
            ("/v13.1.0/tokens/a.json", r#"{"a": {"value": 1, "uuid": "u"}}"#),
        ]);
        let config = RemoteConfig {
            tag_prefix: "v".to_string(),
            ..remote(&base, "tokens")
        };
        let dictionary = load(&SourceSpec::Version("13.1.0".into()), &config).unwrap();
        assert_eq!(dictionary.get("a").unwrap().identifier(), Some("u"));
    }

    #[test]
    fn missing_listed_file_reports_not_found() {
        let base = serve(&[
            ("/main/tokens/manifest.json", r#"["present.json", "absent.json"]"#),
            ("/main/tokens/present.json", r#"{"a": {"value": 1}}"#),
        ]);
        let err = RemoteClient::new(&remote(&base, "tokens"))
            .fetch("main")
            .unwrap_err();
        match &err {
            SourceError::Http { url, message } => {
                assert!(url.ends_with("/main/tokens/absent.json"), "url: {url}");
                assert!(message.contains("not found"), "message: {message}");
            }
            other => panic!("expected an HTTP error, got {other:?}"),
        }
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn missing_manifest_reports_not_found() {
        let base = serve(&[]);
        let err = RemoteClient::new(&remote(&base, "tokens"))
            .fetch("no-such-branch")
            .unwrap_err();
        assert!(matches!(
            &err,
            SourceError::Http { url, message }
                if url.ends_with("/no-such-branch/tokens/manifest.json") && message.contains("not found")
        ));
    }

    #[test]
    fn malformed_remote_file_names_its_url() {
        let base = serve(&[
            ("/main/tokens/manifest.json", r#"["bad.json"]"#),
            ("/main/tokens/bad.json", "{ nope"),
        ]);
        let err = RemoteClient::new(&remote(&base, "tokens"))
            .fetch("main")
            .unwrap_err();
        assert!(matches!(err, SourceError::Json { .. }));
        assert!(err.to_string().contains("/main/tokens/bad.json"));
    }
}
