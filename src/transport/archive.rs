//! In-memory zip packaging of local resources.

use std::io::{Cursor, Write};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;

use crate::error::{Result, TransportError};
use crate::workspace::ResourceSet;

/// Packs every resource into an uncompressed zip archive.
///
/// Entry names are the resource paths without their leading `/`.
///
/// # Errors
///
/// Returns an error if a resource cannot be read or the archive cannot be
/// written.
pub async fn build_archive(resources: &ResourceSet) -> Result<Vec<u8>> {
    let mut entries = Vec::with_capacity(resources.len());
    for resource in resources.iter() {
        entries.push((resource.relative_path().to_string(), resource.read_content().await?));
    }

    let mut buf = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buf);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

        for (name, content) in &entries {
            debug!("Adding {name} to archive");
            zip.start_file(name.as_str(), options)
                .map_err(|e| TransportError::archive(e.to_string()))?;
            zip.write_all(content)
                .map_err(|e| TransportError::archive(e.to_string()))?;
        }
        zip.finish()
            .map_err(|e| TransportError::archive(e.to_string()))?;
    }

    let archive = buf.into_inner();
    info!(
        "Archive has been created: {} entries, {} bytes",
        entries.len(),
        archive.len()
    );
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::ResourceHandle;
    use std::io::Read;

    #[tokio::test]
    async fn test_archive_contains_resources_uncompressed() {
        let resources: ResourceSet = vec![
            ResourceHandle::in_memory("/index.html", b"<html/>".to_vec()),
            ResourceHandle::in_memory("/js/main.js", b"run()".to_vec()),
        ]
        .into_iter()
        .collect();

        let bytes = build_archive(&resources).await.unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut file = archive.by_name("js/main.js").unwrap();
        assert_eq!(file.compression(), zip::CompressionMethod::Stored);
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        assert_eq!(content, "run()");
    }

    #[tokio::test]
    async fn test_empty_archive() {
        let bytes = build_archive(&ResourceSet::default()).await.unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
