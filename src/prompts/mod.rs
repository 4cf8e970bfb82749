#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::{Result, ShopError};

/// Loader and cache for named prompt template files (`<name>.txt`).
pub struct PromptStore {
    prompts_dir: PathBuf,
    cache: Mutex<HashMap<String, String>>,
}

impl PromptStore {
    #[inline]
    pub fn new<P: AsRef<Path>>(prompts_dir: P) -> Self {
        Self {
            prompts_dir: prompts_dir.as_ref().to_path_buf(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Load a template by name, reading the file on first access.
    ///
    /// A missing file is a hard error that names the file and lists the
    /// templates that do exist.
    #[inline]
    pub fn load(&self, name: &str) -> Result<String> {
        {
            let cache = self
                .cache
                .lock()
                .map_err(|_| ShopError::Prompt("Prompt cache lock poisoned".to_string()))?;
            if let Some(content) = cache.get(name) {
                return Ok(content.clone());
            }
        }

        let path = self.prompts_dir.join(format!("{name}.txt"));
        if !path.exists() {
            return Err(ShopError::Prompt(format!(
                "Prompt file not found: {}. Available prompts: {:?}",
                path.display(),
                self.list_available()
            )));
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| ShopError::Prompt(format!("Failed to read {}: {}", path.display(), e)))?;

        debug!("Loaded prompt template: {}", name);

        let mut cache = self
            .cache
            .lock()
            .map_err(|_| ShopError::Prompt("Prompt cache lock poisoned".to_string()))?;
        cache.insert(name.to_string(), content.clone());

        Ok(content)
    }

    /// List the names of all available templates.
    #[inline]
    pub fn list_available(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.prompts_dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut names: Vec<String> = entries
            .filter_map(std::result::Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().is_none_or(|ext| ext != "txt") {
                    return None;
                }
                path.file_stem().map(|s| s.to_string_lossy().into_owned())
            })
            .collect();

        names.sort();
        names
    }

    /// Reload a template from disk, bypassing the cache.
    #[inline]
    pub fn reload(&self, name: &str) -> Result<String> {
        {
            let mut cache = self
                .cache
                .lock()
                .map_err(|_| ShopError::Prompt("Prompt cache lock poisoned".to_string()))?;
            cache.remove(name);
        }
        self.load(name)
    }

    /// Drop all cached templates.
    #[inline]
    pub fn clear_cache(&self) -> Result<()> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| ShopError::Prompt("Prompt cache lock poisoned".to_string()))?;
        cache.clear();
        Ok(())
    }
}

/// Substitute `{placeholder}` markers in a template.
#[inline]
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (key, value) in values {
        rendered = rendered.replace(&format!("{{{key}}}"), value);
    }
    rendered
}
