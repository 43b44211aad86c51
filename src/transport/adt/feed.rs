//! Atom feed parsing for file-store folder listings.
//!
//! A listing is an `atom:feed` with one `atom:entry` per child. The entry's
//! `atom:category` term says whether the child is a folder or a file, and
//! its `atom:id` is the raw id used to address it.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::trace;

use crate::error::{DiscoveryError, Result};
use crate::transport::RemoteListing;

#[derive(Debug, Default)]
struct Entry {
    term: Option<String>,
    id: String,
}

/// Parses a folder listing.
///
/// Entries with an unknown category are ignored.
///
/// # Errors
///
/// Returns `MalformedListing` if the XML cannot be read or an entry has no
/// id.
pub fn parse_listing(xml: &str, folder: &str) -> Result<RemoteListing> {
    let malformed = |message: String| DiscoveryError::malformed(folder, message);

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut listing = RemoteListing::default();
    let mut entry: Option<Entry> = None;
    let mut in_id = false;

    loop {
        match reader.read_event().map_err(|e| malformed(e.to_string()))? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"entry" => entry = Some(Entry::default()),
                b"id" if entry.is_some() => in_id = true,
                b"category" => read_term(&e, entry.as_mut()).map_err(malformed)?,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"category" => {
                read_term(&e, entry.as_mut()).map_err(malformed)?;
            }
            Event::Text(text) if in_id => {
                let value = text.unescape().map_err(|e| malformed(e.to_string()))?;
                if let Some(current) = entry.as_mut() {
                    current.id.push_str(&value);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"id" => in_id = false,
                b"entry" => {
                    if let Some(done) = entry.take() {
                        push_entry(&mut listing, done).map_err(malformed)?;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(listing)
}

fn read_term(element: &BytesStart<'_>, entry: Option<&mut Entry>) -> std::result::Result<(), String> {
    let Some(entry) = entry else {
        return Ok(());
    };
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        if attribute.key.local_name().as_ref() == b"term" {
            let value = attribute.unescape_value().map_err(|e| e.to_string())?;
            entry.term = Some(value.into_owned());
        }
    }
    Ok(())
}

fn push_entry(listing: &mut RemoteListing, entry: Entry) -> std::result::Result<(), String> {
    let id = entry.id.trim().to_string();
    if id.is_empty() {
        return Err(String::from("entry without atom:id"));
    }

    match entry.term.as_deref() {
        Some("folder") => listing.folders.push(id),
        Some("file") => listing.files.push(id),
        other => trace!("Ignoring entry {id} with category {other:?}"),
    }
    Ok(())
}
