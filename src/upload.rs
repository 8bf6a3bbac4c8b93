//! Turning what the user typed into the prompt into a list of audio files.

use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::config::UploadSettings;

fn is_audio_file(path: &Path, settings: &UploadSettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Split prompt input into paths.
///
/// Whitespace separates paths. Single or double quotes group a path with
/// spaces, and a backslash escapes the next character (the form terminals
/// use when a file is dropped onto them). A leading `~/` expands to `$HOME`.
pub fn parse_paths(input: &str) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_token = true;
            }
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token && !current.is_empty() {
                    out.push(expand_home(&current));
                }
                current.clear();
                in_token = false;
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token && !current.is_empty() {
        out.push(expand_home(&current));
    }
    out
}

fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(raw)
}

fn walk(dir: &Path, settings: &UploadSettings) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_audio_file(path, settings))
        .collect();

    files.sort_by_key(|p| p.to_string_lossy().to_lowercase());
    files
}

/// Expand files and directories into the audio files to upload.
///
/// Named files are kept when their extension is an audio one, hidden or not.
/// Directories are walked according to `settings` and their files are sorted
/// case-insensitively. Missing paths are logged and skipped; duplicates keep
/// their first position.
pub fn expand(paths: &[PathBuf], settings: &UploadSettings) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for path in paths {
        let found = if path.is_dir() {
            walk(path, settings)
        } else if path.is_file() {
            if is_audio_file(path, settings) {
                vec![path.clone()]
            } else {
                warn!(path = %path.display(), "skipping non-audio file");
                Vec::new()
            }
        } else {
            warn!(path = %path.display(), "skipping missing path");
            Vec::new()
        };

        for file in found {
            if seen.insert(file.clone()) {
                out.push(file);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = UploadSettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.m4a"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn parse_paths_handles_quotes_and_escapes() {
        assert_eq!(
            parse_paths(r#"a.mp3  "My Song.flac" 'x y.wav' c\ d.ogg"#),
            vec![
                PathBuf::from("a.mp3"),
                PathBuf::from("My Song.flac"),
                PathBuf::from("x y.wav"),
                PathBuf::from("c d.ogg"),
            ]
        );
        assert!(parse_paths("   ").is_empty());
        assert!(parse_paths("'' \"\"").is_empty());
    }

    #[test]
    fn expand_walks_directories_sorted_and_filters_non_audio() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let files = expand(&[dir.path().to_path_buf()], &UploadSettings::default());
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["A.ogg".to_string(), "b.MP3".to_string()]);
    }

    #[test]
    fn expand_keeps_named_files_and_drops_missing_and_duplicates() {
        let dir = tempdir().unwrap();
        let song = dir.path().join(".hidden.mp3");
        let notes = dir.path().join("notes.txt");
        fs::write(&song, b"x").unwrap();
        fs::write(&notes, b"x").unwrap();

        let files = expand(
            &[
                song.clone(),
                notes,
                dir.path().join("missing.mp3"),
                song.clone(),
            ],
            &UploadSettings::default(),
        );
        assert_eq!(files, vec![song]);
    }

    #[test]
    fn expand_respects_include_hidden_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();
        let hidden_dir = dir.path().join(".cache");
        fs::create_dir_all(&hidden_dir).unwrap();
        fs::write(hidden_dir.join("inner.mp3"), b"not real").unwrap();

        let files = expand(&[dir.path().to_path_buf()], &UploadSettings::default());
        assert_eq!(files, vec![dir.path().join("visible.mp3")]);
    }

    #[test]
    fn expand_respects_recursive_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let settings = UploadSettings {
            recursive: false,
            ..UploadSettings::default()
        };
        let files = expand(&[dir.path().to_path_buf()], &settings);
        assert_eq!(files, vec![dir.path().join("root.mp3")]);
    }

    #[test]
    fn expand_respects_max_depth() {
        let dir = tempdir().unwrap();
        let d1 = dir.path().join("d1");
        let d2 = d1.join("d2");
        fs::create_dir_all(&d2).unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        fs::write(d1.join("one.mp3"), b"not real").unwrap();
        fs::write(d2.join("two.mp3"), b"not real").unwrap();

        // WalkDir counts the root as depth 0, so 2 reaches d1/* but not d1/d2/*.
        let settings = UploadSettings {
            max_depth: Some(2),
            ..UploadSettings::default()
        };
        let files = expand(&[dir.path().to_path_buf()], &settings);
        assert!(files.contains(&dir.path().join("root.mp3")));
        assert!(files.contains(&d1.join("one.mp3")));
        assert!(!files.contains(&d2.join("two.mp3")));
    }
}
