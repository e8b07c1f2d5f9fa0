//! On-disk private keys.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Write a private key PEM to a new file readable only by its owner.
///
/// Refuses to replace an existing file: an old key may be the only copy.
pub fn save_private_key(path: &Path, pem: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(pem.as_bytes())?;
    file.sync_all()
}
