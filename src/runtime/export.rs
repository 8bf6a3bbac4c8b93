use std::fs;
use std::path::{Path, PathBuf};

/// Make a track name safe to use as a file name.
///
/// Path separators, characters Windows refuses and control characters become
/// `_`. An empty result falls back to `fallback`.
pub fn file_name_for(name: &str, fallback: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').trim().to_string();
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

/// First path in `dir` for `file_name` that does not exist yet, adding
/// ` (1)`, ` (2)` ... before the extension.
pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };
    (1..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Write exported audio into `dir` and return where it went.
pub fn save(dir: &Path, name: &str, id: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = unique_path(dir, &file_name_for(name, id));
    fs::write(&path, bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_name_strips_separators_and_control_chars() {
        assert_eq!(file_name_for("AC/DC: Live?.mp3", "id"), "AC_DC_ Live_.mp3");
        assert_eq!(file_name_for("a\u{1b}[2Jb.wav", "id"), "a_[2Jb.wav");
        assert_eq!(file_name_for("../../etc", "id"), "_.._etc");
        assert_eq!(file_name_for("  ", "track-7"), "track-7");
        assert_eq!(file_name_for("...", "track-7"), "track-7");
    }

    #[test]
    fn save_never_overwrites() {
        let dir = tempdir().unwrap();
        let first = save(dir.path(), "song.mp3", "a", b"one").unwrap();
        let second = save(dir.path(), "song.mp3", "a", b"two").unwrap();

        assert_eq!(first, dir.path().join("song.mp3"));
        assert_eq!(second, dir.path().join("song (1).mp3"));
        assert_eq!(fs::read(&first).unwrap(), b"one");
        assert_eq!(fs::read(&second).unwrap(), b"two");
    }

    #[test]
    fn unique_path_without_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes"), b"x").unwrap();
        assert_eq!(unique_path(dir.path(), "notes"), dir.path().join("notes (1)"));
    }

    #[test]
    fn save_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("exports").join("cd");
        let path = save(&target, "x.flac", "a", b"data").unwrap();
        assert!(path.starts_with(&target));
    }
}
