//! Content digests used for change detection.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{SprigError, Result};
use crate::types::Sprite;

/// SHA-256 of a file's contents as a hex string.
pub fn file_digest(path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    hash_file_into(&mut hasher, path)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Digest covering everything that affects a sprite's composed image:
/// its name, padding, and each source's name and contents, in order.
pub fn sprite_digest(sprite: &Sprite) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(sprite.name.as_bytes());
    hasher.update([0]);
    hasher.update(sprite.padding.to_le_bytes());

    for source in &sprite.sources {
        hasher.update(source.name.as_bytes());
        hasher.update([0]);
        hasher.update(file_digest(&source.path)?.as_bytes());
    }

    Ok(hex::encode(hasher.finalize()))
}

fn hash_file_into(hasher: &mut Sha256, path: &Path) -> Result<()> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SprigError::MissingSource {
            path: path.to_path_buf(),
        },
        _ => SprigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })?;

    let mut reader = BufReader::new(file);
    let mut buffer = [0u8; 8192];
    loop {
        let read = reader.read(&mut buffer).map_err(|e| SprigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SaveTarget, Source};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_digest_known_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, "hello").unwrap();

        assert_eq!(
            file_digest(&path).unwrap(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_file_digest_missing() {
        let dir = tempdir().unwrap();
        let err = file_digest(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, SprigError::MissingSource { .. }));
    }

    #[test]
    fn test_sprite_digest_tracks_contents_order_and_padding() {
        let dir = tempdir().unwrap();
        let one = dir.path().join("one.png");
        let two = dir.path().join("two.png");
        fs::write(&one, "1").unwrap();
        fs::write(&two, "2").unwrap();

        let sprite = |paths: &[&Path], padding| {
            Sprite::new(
                "fry",
                paths.iter().map(|p| Source::new(*p)).collect(),
                SaveTarget::DataUri,
                padding,
                None,
            )
        };

        let base = sprite_digest(&sprite(&[&one, &two], 20)).unwrap();
        assert_eq!(base, sprite_digest(&sprite(&[&one, &two], 20)).unwrap());
        assert_ne!(base, sprite_digest(&sprite(&[&two, &one], 20)).unwrap());
        assert_ne!(base, sprite_digest(&sprite(&[&one, &two], 0)).unwrap());

        fs::write(&two, "changed").unwrap();
        assert_ne!(base, sprite_digest(&sprite(&[&one, &two], 20)).unwrap());
    }
}
