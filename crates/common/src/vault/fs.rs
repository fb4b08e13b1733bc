use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::provider::{KeyClass, KeyVault, PutMode, VaultError};

/// File-backed key vault
///
/// Every entry is a single file at `<root>/<class>/<label>`. Material is first written to a
///  scratch file and then moved into place: insert-only writes hard link it, so two racing
///  inserts on one label resolve to exactly one winner and one `AlreadyExists`, upserts
///  rename over the old entry.
#[derive(Debug, Clone)]
pub struct FileKeyVault {
    root: PathBuf,
}

impl FileKeyVault {
    /// Open (and create if needed) a vault rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, VaultError> {
        let root = root.into();
        for class in [KeyClass::Asymmetric, KeyClass::Symmetric] {
            fs::create_dir_all(root.join(class.to_string()))?;
        }
        tracing::debug!("opened file key vault at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, class: KeyClass, label: &str) -> Result<PathBuf, VaultError> {
        validate_label(label)?;
        Ok(self.root.join(class.to_string()).join(label))
    }
}

fn validate_label(label: &str) -> Result<(), VaultError> {
    let valid = !label.is_empty()
        && !label.starts_with('.')
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if !valid {
        return Err(VaultError::InvalidLabel(label.to_string()));
    }
    Ok(())
}

fn write_file(path: &Path, material: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(material)?;
    file.sync_all()
}

/// Write `material` to a fresh scratch file next to `path` and return its location
///
/// A failed write removes the scratch file, so an entry never appears half written.
fn write_scratch(path: &Path, label: &str, material: &[u8]) -> std::io::Result<PathBuf> {
    // labels never start with '.', so scratch files cannot collide with an entry
    let tmp = path.with_file_name(format!(".{}.{}.tmp", label, Uuid::new_v4().simple()));
    if let Err(e) = write_file(&tmp, material) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(tmp)
}

impl KeyVault for FileKeyVault {
    fn put(
        &self,
        class: KeyClass,
        label: &str,
        material: &[u8],
        mode: PutMode,
    ) -> Result<(), VaultError> {
        let path = self.entry_path(class, label)?;
        let tmp = write_scratch(&path, label, material)?;
        let placed = match mode {
            // linking fails if the label is taken, and the entry appears fully written or not at all
            PutMode::InsertOnly => fs::hard_link(&tmp, &path),
            PutMode::Upsert => fs::rename(&tmp, &path),
        };
        let _ = fs::remove_file(&tmp);
        match placed {
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(VaultError::AlreadyExists(class, label.to_string()))
            }
            other => Ok(other?),
        }
    }

    fn get(&self, class: KeyClass, label: &str) -> Result<Option<Vec<u8>>, VaultError> {
        let path = self.entry_path(class, label)?;
        match fs::read(&path) {
            Ok(material) => Ok(Some(material)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, class: KeyClass, label: &str) -> Result<(), VaultError> {
        let path = self.entry_path(class, label)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileKeyVault::open(dir.path()).unwrap();

        vault
            .put(KeyClass::Asymmetric, "friends.key.private.x", b"der", PutMode::InsertOnly)
            .unwrap();
        assert_eq!(
            vault.get(KeyClass::Asymmetric, "friends.key.private.x").unwrap(),
            Some(b"der".to_vec())
        );
        assert!(vault.get(KeyClass::Symmetric, "friends.key.private.x").unwrap().is_none());

        vault.delete(KeyClass::Asymmetric, "friends.key.private.x").unwrap();
        vault.delete(KeyClass::Asymmetric, "friends.key.private.x").unwrap();
        assert!(vault.get(KeyClass::Asymmetric, "friends.key.private.x").unwrap().is_none());
    }

    #[test]
    fn test_insert_only_and_upsert() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileKeyVault::open(dir.path()).unwrap();

        vault.put(KeyClass::Symmetric, "k", b"one", PutMode::InsertOnly).unwrap();
        assert!(matches!(
            vault.put(KeyClass::Symmetric, "k", b"two", PutMode::InsertOnly),
            Err(VaultError::AlreadyExists(_, _))
        ));
        vault.put(KeyClass::Symmetric, "k", b"three", PutMode::Upsert).unwrap();
        assert_eq!(vault.get(KeyClass::Symmetric, "k").unwrap(), Some(b"three".to_vec()));
    }

    #[test]
    fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        FileKeyVault::open(dir.path())
            .unwrap()
            .put(KeyClass::Symmetric, "k", b"v", PutMode::InsertOnly)
            .unwrap();

        let reopened = FileKeyVault::open(dir.path()).unwrap();
        assert_eq!(reopened.get(KeyClass::Symmetric, "k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn test_rejects_unsafe_labels() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileKeyVault::open(dir.path()).unwrap();

        for label in ["", "../escape", "a/b", ".hidden", "white space"] {
            assert!(matches!(
                vault.get(KeyClass::Symmetric, label),
                Err(VaultError::InvalidLabel(_))
            ));
        }
    }

    #[test]
    fn test_interrupted_write_leaves_no_entry() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileKeyVault::open(dir.path()).unwrap();
        let class_dir = dir.path().join("symmetric");

        // a crash mid-write only ever leaves a scratch file behind
        fs::write(class_dir.join(".k.0123abcd.tmp"), b"trunc").unwrap();
        assert!(vault.get(KeyClass::Symmetric, "k").unwrap().is_none());
        vault.put(KeyClass::Symmetric, "k", b"full", PutMode::InsertOnly).unwrap();
        assert_eq!(vault.get(KeyClass::Symmetric, "k").unwrap(), Some(b"full".to_vec()));

        fs::remove_file(class_dir.join(".k.0123abcd.tmp")).unwrap();
        assert!(vault.put(KeyClass::Symmetric, "k", b"again", PutMode::InsertOnly).is_err());
        vault.put(KeyClass::Symmetric, "k", b"newer", PutMode::Upsert).unwrap();

        // no scratch files survive a put, successful or not
        let names: Vec<_> = fs::read_dir(&class_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("k")]);
        assert_eq!(vault.get(KeyClass::Symmetric, "k").unwrap(), Some(b"newer".to_vec()));
    }

    #[cfg(unix)]
    #[test]
    fn test_entries_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let vault = FileKeyVault::open(dir.path()).unwrap();
        vault.put(KeyClass::Asymmetric, "k", b"v", PutMode::InsertOnly).unwrap();

        let meta = fs::metadata(dir.path().join("asymmetric").join("k")).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }
}
