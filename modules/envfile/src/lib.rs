//! In-place rewrite of credential lines in a `KEY=value` env file.
//! Every other line survives verbatim and in order.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_PATH: &str = ".env";

#[derive(Debug, thiserror::Error)]
pub enum EnvFileError {
    #[error("env file not found at {0}")]
    NotFound(PathBuf),

    #[error("failed to access {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

/// Names of the credential keys to rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvKeys {
    pub user: String,
    pub password: String,
}

impl Default for EnvKeys {
    fn default() -> Self {
        EnvKeys { user: "NEO4J_USER".to_string(), password: "NEO4J_PASSWORD".to_string() }
    }
}

/// Which keys were replaced in place and which were appended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Update {
    pub user_replaced: bool,
    pub password_replaced: bool,
}

/// Pure rewrite. Lines beginning with `KEY=` are replaced; missing keys are
/// appended, user first. Replaced lines keep their own terminator and
/// appended lines use the file's first one (`\n` for an empty file).
pub fn rewrite(content: &str, keys: &EnvKeys, user: &str, password: &str) -> (String, Update) {
    let user_prefix = format!("{}=", keys.user);
    let pass_prefix = format!("{}=", keys.password);
    let newline = content.split_inclusive('\n').next().map(terminator).filter(|t| !t.is_empty()).unwrap_or("\n");
    let mut out = String::with_capacity(content.len() + 64);
    let mut update = Update::default();

    for line in content.split_inclusive('\n') {
        let eol = terminator(line);
        if line.starts_with(&user_prefix) {
            out.push_str(&format!("{}{}{}", user_prefix, user, eol));
            update.user_replaced = true;
        } else if line.starts_with(&pass_prefix) {
            out.push_str(&format!("{}{}{}", pass_prefix, password, eol));
            update.password_replaced = true;
        } else {
            out.push_str(line);
        }
    }
    if !out.is_empty() && !out.ends_with('\n') {
        out.push_str(newline);
    }
    if !update.user_replaced {
        out.push_str(&format!("{}{}{}", user_prefix, user, newline));
    }
    if !update.password_replaced {
        out.push_str(&format!("{}{}{}", pass_prefix, password, newline));
    }
    (out, update)
}

fn terminator(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// Rewrite the credential lines of the file at `path`. The file must exist.
pub fn update_credentials(path: &Path, keys: &EnvKeys, user: &str, password: &str) -> Result<Update, EnvFileError> {
    if !path.exists() {
        return Err(EnvFileError::NotFound(path.to_path_buf()));
    }
    let io = |source| EnvFileError::Io { path: path.to_path_buf(), source };
    let content = fs::read_to_string(path).map_err(io)?;
    let (updated, update) = rewrite(&content, keys, user, password);
    fs::write(path, updated).map_err(io)?;
    info!(path = %path.display(), "updated env file with new credentials");
    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_keys() -> EnvKeys {
        EnvKeys { user: "USERNAME".into(), password: "PASSWORD".into() }
    }

    #[test]
    fn replaces_user_and_appends_password() {
        let src = "# settings\nURI=bolt://localhost:7687\nUSERNAME=old\nDEBUG=1\n";
        let (out, update) = rewrite(src, &plain_keys(), "new", "secret");
        assert_eq!(out, "# settings\nURI=bolt://localhost:7687\nUSERNAME=new\nDEBUG=1\nPASSWORD=secret\n");
        assert!(update.user_replaced);
        assert!(!update.password_replaced);
    }

    #[test]
    fn replaces_both_in_place() {
        let src = "NEO4J_PASSWORD=x\nOTHER=y\nNEO4J_USER=a\n";
        let (out, _) = rewrite(src, &EnvKeys::default(), "neo4j", "pw");
        assert_eq!(out, "NEO4J_PASSWORD=pw\nOTHER=y\nNEO4J_USER=neo4j\n");
    }

    #[test]
    fn similar_keys_untouched() {
        let src = "NEO4J_USERNAME=keep\nMY_NEO4J_USER=keep\n";
        let (out, update) = rewrite(src, &EnvKeys::default(), "u", "p");
        assert_eq!(out, "NEO4J_USERNAME=keep\nMY_NEO4J_USER=keep\nNEO4J_USER=u\nNEO4J_PASSWORD=p\n");
        assert_eq!(update, Update::default());
    }

    #[test]
    fn crlf_endings_are_kept() {
        let (out, _) = rewrite("A=1\r\nNEO4J_USER=old\r\nB=2\r\n", &EnvKeys::default(), "new", "pw");
        assert_eq!(out, "A=1\r\nNEO4J_USER=new\r\nB=2\r\nNEO4J_PASSWORD=pw\r\n");
    }

    #[test]
    fn missing_trailing_newline() {
        let (out, _) = rewrite("A=1\r\nB=2", &plain_keys(), "u", "p");
        assert_eq!(out, "A=1\r\nB=2\r\nUSERNAME=u\r\nPASSWORD=p\r\n");
        let (out, _) = rewrite("A=1\nUSERNAME=x", &plain_keys(), "u", "p");
        assert_eq!(out, "A=1\nUSERNAME=u\nPASSWORD=p\n");
        let (out, _) = rewrite("", &plain_keys(), "u", "");
        assert_eq!(out, "USERNAME=u\nPASSWORD=\n");
    }

    #[test]
    fn file_update() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "USERNAME=old\nKEEP=me\n").unwrap();
        update_credentials(&path, &plain_keys(), "new", "secret").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "USERNAME=new\nKEEP=me\nPASSWORD=secret\n");
    }

    #[test]
    fn missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = update_credentials(&dir.path().join("nope.env"), &EnvKeys::default(), "u", "p").unwrap_err();
        assert!(matches!(err, EnvFileError::NotFound(_)));
    }
}
