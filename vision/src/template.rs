//! Template asset store.
//!
//! Templates are named reference images for recognizable UI elements. They
//! are addressed by filename key inside a read-only directory, loaded lazily
//! on first use, and cached for the process lifetime (the cache is read-only
//! after first load and safe to reuse across steps).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::Error;
use crate::frame::Frame;

/// A loaded reference image, kept in grayscale for matching.
pub struct Template {
    pub key: String,
    pub gray: image::GrayImage,
}

impl Template {
    pub fn width(&self) -> u32 {
        self.gray.width()
    }

    pub fn height(&self) -> u32 {
        self.gray.height()
    }
}

pub struct TemplateStore {
    dir: PathBuf,
    cache: Mutex<HashMap<String, Arc<Template>>>,
}

impl TemplateStore {
    /// Open a template directory. The directory must exist up front: a
    /// missing asset store is a configuration fault, not a runtime one.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(Error::Configuration {
                name: format!("template directory {}", dir.display()),
            });
        }
        Ok(Self {
            dir,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Fetch a template by key, loading and caching it on first use.
    pub fn get(&self, key: &str) -> Result<Arc<Template>, Error> {
        {
            let cache = self.cache.lock().expect("template cache poisoned");
            if let Some(template) = cache.get(key) {
                return Ok(template.clone());
            }
        }

        let path = self.dir.join(key);
        if !path.is_file() {
            return Err(Error::Configuration {
                name: format!("template {key}"),
            });
        }

        let bytes = std::fs::read(&path)
            .map_err(|err| Error::recognition(format!("read template {key}: {err}")))?;
        let frame = Frame::decode(&bytes)
            .map_err(|_| Error::recognition(format!("template {key} is not a valid image")))?;

        let template = Arc::new(Template {
            key: key.to_string(),
            gray: frame.to_gray_image(),
        });

        self.cache
            .lock()
            .expect("template cache poisoned")
            .insert(key.to_string(), template.clone());
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_is_configuration_error() {
        let err = TemplateStore::new("/definitely/not/here").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn missing_key_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path()).unwrap();
        let err = store.get("nope.png").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn loaded_template_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let img = image::RgbImage::from_pixel(8, 6, image::Rgb([200, 10, 10]));
        img.save(dir.path().join("button.png")).unwrap();

        let store = TemplateStore::new(dir.path()).unwrap();
        let first = store.get("button.png").unwrap();
        assert_eq!((first.width(), first.height()), (8, 6));

        // Deleting the file must not matter once cached.
        std::fs::remove_file(dir.path().join("button.png")).unwrap();
        let second = store.get("button.png").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
