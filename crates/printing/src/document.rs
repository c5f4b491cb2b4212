use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object};
use thiserror::Error;

use crate::job::PaperSize;

// Guards against cyclic /Parent chains in damaged files.
const MAX_TREE_DEPTH: usize = 64;

/// Facts about a document needed to print it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub first_page: PaperSize,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("file '{}' does not exist", .0.display())]
    Missing(PathBuf),
    #[error("'{}' is a directory", .0.display())]
    Directory(PathBuf),
    #[error("failed to open PDF '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },
    #[error("PDF '{}' has no pages", .0.display())]
    NoPages(PathBuf),
    #[error("PDF '{}' has an unreadable first page: {reason}", .path.display())]
    PageGeometry { path: PathBuf, reason: String },
}

/// Checks that `path` names an existing regular file.
pub fn validate_path(path: &Path) -> Result<(), DocumentError> {
    if !path.exists() {
        return Err(DocumentError::Missing(path.to_path_buf()));
    }
    if path.is_dir() {
        return Err(DocumentError::Directory(path.to_path_buf()));
    }
    Ok(())
}

/// Loads a PDF and reads the size of its first page.
///
/// The size comes from the page's `/MediaBox`, inherited through the page
/// tree when the page itself has none, and is swapped for pages rotated by
/// 90 or 270 degrees.
pub fn inspect_pdf(path: &Path) -> Result<DocumentInfo, DocumentError> {
    let document = Document::load(path).map_err(|source| DocumentError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let pages = document.get_pages();
    let (_, first_page_id) = pages
        .iter()
        .next()
        .ok_or_else(|| DocumentError::NoPages(path.to_path_buf()))?;

    let geometry_error = |reason: String| DocumentError::PageGeometry {
        path: path.to_path_buf(),
        reason,
    };

    let page = document
        .get_dictionary(*first_page_id)
        .map_err(|err| geometry_error(err.to_string()))?;
    let media_box = inherited_attribute(&document, page, b"MediaBox")
        .ok_or_else(|| geometry_error("missing MediaBox".to_string()))?;
    let mut size = media_box_size(&document, media_box).map_err(geometry_error)?;

    if let Some(rotate) = inherited_attribute(&document, page, b"Rotate") {
        if let Some(degrees) = number(&document, rotate) {
            if (degrees as i64).rem_euclid(180) == 90 {
                size = size.rotated();
            }
        }
    }

    log::debug!(
        "{}: {} page(s), first page {}",
        path.display(),
        pages.len(),
        size
    );

    Ok(DocumentInfo {
        page_count: pages.len(),
        first_page: size,
    })
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn inherited_attribute<'a>(
    document: &'a Document,
    page: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return resolve(document, value);
        }
        let parent = node.get(b"Parent").ok()?;
        node = match resolve(document, parent)? {
            Object::Dictionary(dict) => dict,
            _ => return None,
        };
    }
    None
}

fn number(document: &Document, object: &Object) -> Option<f64> {
    match resolve(document, object)? {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

fn media_box_size(document: &Document, media_box: &Object) -> Result<PaperSize, String> {
    let values = match media_box {
        Object::Array(values) => values,
        _ => return Err("MediaBox is not an array".to_string()),
    };
    if values.len() != 4 {
        return Err(format!("MediaBox has {} elements instead of 4", values.len()));
    }

    let mut corners = [0f64; 4];
    for (index, value) in values.iter().enumerate() {
        corners[index] = number(document, value)
            .ok_or_else(|| format!("MediaBox element {index} is not a number"))?;
    }

    let size = PaperSize::new(
        (corners[2] - corners[0]).abs(),
        (corners[3] - corners[1]).abs(),
    );
    if !size.is_valid() {
        return Err(format!("MediaBox has zero area ({size})"));
    }
    Ok(size)
}
