use crate::config::UPLOADS_PREFIX;
use crate::error::LostFoundError;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tracing::{info, warn};

const SLUG_SEPARATOR: char = '_';
const FALLBACK_NAME: &str = "unknown";

/// The directory holding submitted images.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

/// A file created inside the upload directory.
#[derive(Debug)]
pub struct StoredUpload {
    pub name: String,
    pub path: PathBuf,
    pub file: File,
}

impl StoredUpload {
    /// Path under which the image is served, e.g. `/uploads/1700000000000-bag.jpg`.
    pub fn public_path(&self) -> String {
        format!("{UPLOADS_PREFIX}/{}", self.name)
    }
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<(), LostFoundError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(LostFoundError::FileWrite)?;
        info!(path = %self.dir.display(), "upload directory ready");
        Ok(())
    }

    /// Create a fresh, never-before-used file for `original_name`.
    ///
    /// Tries `{millis}-{slug}` first; if that name is taken, a random token is
    /// inserted. Files are opened create-new so nothing is overwritten.
    pub async fn create(&self, original_name: &str) -> Result<StoredUpload, LostFoundError> {
        let slug = slugify(original_name);
        let millis = chrono::Utc::now().timestamp_millis();

        let mut name = format!("{millis}-{slug}");
        loop {
            let path = self.dir.join(&name);
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok(StoredUpload { name, path, file }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let token = uuid::Uuid::new_v4().simple().to_string();
                    name = format!("{millis}-{}-{slug}", &token[..8]);
                }
                Err(e) => return Err(LostFoundError::FileWrite(e)),
            }
        }
    }

    /// Best-effort removal of a file that will never be referenced.
    pub async fn discard(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            warn!(path = %path.display(), error = %e, "failed to remove partial upload");
        }
    }

    /// Map an asset name to a path inside the upload directory.
    ///
    /// Only a single plain file name is accepted.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, LostFoundError> {
        if name.is_empty() || name.contains(['/', '\\', '\0']) {
            return Err(LostFoundError::NotFound(name.to_string()));
        }
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.dir.join(name)),
            _ => Err(LostFoundError::NotFound(name.to_string())),
        }
    }

    pub async fn read(&self, name: &str) -> Result<Vec<u8>, LostFoundError> {
        let path = self.resolve(name)?;
        fs::read(&path).await.map_err(|e| {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "failed to read upload");
            }
            LostFoundError::NotFound(name.to_string())
        })
    }
}

/// Filesystem-safe token for an uploaded file name.
///
/// The stem is lowercased, common Latin diacritics are folded to ASCII,
/// `[a-z0-9.-]` is kept and every other run becomes one `_`. A plain
/// alphanumeric extension survives even when the stem slugs to nothing
/// (`钱包.jpg` becomes `unknown.jpg`).
pub fn slugify(input: &str) -> String {
    let input = input.trim();
    let (stem, ext) = match input.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            (stem, Some(ext))
        }
        _ => (input, None),
    };

    let mut slug = slug_token(stem);
    if slug.is_empty() {
        slug.push_str(FALLBACK_NAME);
    }
    if let Some(ext) = ext {
        slug.push('.');
        slug.push_str(&ext.to_ascii_lowercase());
    }
    slug
}

fn slug_token(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_sep = false;
    let mut push = |c: char, out: &mut String| {
        if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
            if pending_sep && !out.is_empty() {
                out.push(SLUG_SEPARATOR);
            }
            pending_sep = false;
            out.push(c);
        } else {
            pending_sep = true;
        }
    };
    for c in input.chars().flat_map(char::to_lowercase) {
        match fold_latin(c) {
            Some(folded) => folded.chars().for_each(|f| push(f, &mut out)),
            None => push(c, &mut out),
        }
    }
    out.trim_matches(|c| c == '.' || c == '-' || c == SLUG_SEPARATOR)
        .to_string()
}

/// ASCII spelling of lowercase Latin letters with diacritics.
fn fold_latin(c: char) -> Option<&'static str> {
    Some(match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'ř' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ť' | 'ţ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        'þ' => "th",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_normalizes_names() {
        assert_eq!(slugify("My Blue Bag.JPG"), "my_blue_bag.jpg");
        assert_eq!(slugify("  keys (2)!.png "), "keys_2.png");
        assert_eq!(slugify("archive.tar.gz"), "archive.tar.gz");
        assert_eq!(slugify("../../etc/passwd"), "etc_passwd");
        assert_eq!(slugify(""), "unknown");
        assert_eq!(slugify("???"), "unknown");
    }

    #[test]
    fn slugify_folds_latin_and_keeps_extension() {
        assert_eq!(slugify("Ünïcode wallet"), "unicode_wallet");
        assert_eq!(slugify("Straße Schlüssel.JPEG"), "strasse_schlussel.jpeg");
        assert_eq!(slugify("钱包.jpg"), "unknown.jpg");
        assert_eq!(slugify("Ключи фото.png"), "unknown.png");
    }

    #[test]
    fn resolve_rejects_anything_but_a_file_name() {
        let store = UploadStore::new("/srv/uploads");
        assert_eq!(
            store.resolve("1-bag.jpg").unwrap(),
            PathBuf::from("/srv/uploads/1-bag.jpg")
        );
        for bad in ["", ".", "..", "../secret", "a/b", "..\\x", "/etc/passwd", "a\0b"] {
            assert!(
                matches!(store.resolve(bad), Err(LostFoundError::NotFound(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[tokio::test]
    async fn same_original_name_never_collides() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path());
        let a = store.create("bag.jpg").await.unwrap();
        let b = store.create("bag.jpg").await.unwrap();
        assert_ne!(a.name, b.name);
        assert!(a.name.ends_with("-bag.jpg"));
        assert!(b.name.ends_with("-bag.jpg"));
        assert!(a.public_path().starts_with("/uploads/"));
    }

    #[tokio::test]
    async fn read_missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path());
        assert!(matches!(
            store.read("nope.jpg").await,
            Err(LostFoundError::NotFound(_))
        ));
    }
}
