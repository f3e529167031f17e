use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use crate::error::Error;
use crate::template::StyleTemplate;

const TEMPLATES_DIR: &str = "templates";
const INDEX_FILE: &str = "index.json";

/// Named style templates kept as JSON files under `<root>/templates`, with
/// `<root>/index.json` mapping each template name to its file.
pub struct TemplateStore {
    templates_dir: PathBuf,
    index_path: PathBuf,
    index: BTreeMap<String, String>,
}

/// Reduce a template name to something safe to use as a file stem.
fn sanitize_file_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.trim().chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_dash && !stem.is_empty() {
                stem.push('-');
            }
            pending_dash = false;
            stem.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }
    if stem.is_empty() { "template".to_string() } else { stem }
}

impl TemplateStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: &Path) -> Result<Self, Error> {
        let templates_dir = root.join(TEMPLATES_DIR);
        fs::create_dir_all(&templates_dir)?;
        let index_path = root.join(INDEX_FILE);
        let index = if index_path.exists() {
            let content = fs::read_to_string(&index_path)?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };
        Ok(TemplateStore { templates_dir, index_path, index })
    }

    fn write_index(&self) -> Result<(), Error> {
        let content = serde_json::to_string_pretty(&self.index)?;
        fs::write(&self.index_path, content)?;
        Ok(())
    }

    fn free_file_name(&self, stem: &str) -> String {
        let taken = |file: &str| {
            self.templates_dir.join(file).exists() || self.index.values().any(|f| f == file)
        };
        let mut file = format!("{stem}.json");
        let mut n = 2;
        while taken(&file) {
            file = format!("{stem}_{n}.json");
            n += 1;
        }
        file
    }

    /// Store `styles` (the `样式` table) under `name`. The content is
    /// validated as a template first; an existing name is refused.
    pub fn save(&mut self, name: &str, styles: &Value) -> Result<PathBuf, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Store("template name must not be empty".into()));
        }
        if self.index.contains_key(name) {
            return Err(Error::Store(format!("a template named '{name}' already exists")));
        }
        let content = json!({ "name": name, "样式": styles });
        StyleTemplate::from_json(&content)?;

        let file = self.free_file_name(&sanitize_file_stem(name));
        let path = self.templates_dir.join(&file);
        fs::write(&path, serde_json::to_string_pretty(&content)?)?;
        self.index.insert(name.to_string(), file);
        if let Err(e) = self.write_index() {
            let _ = fs::remove_file(&path);
            self.index.remove(name);
            return Err(e);
        }
        log::info!("saved template '{name}' to {}", path.display());
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<StyleTemplate, Error> {
        let file = self
            .index
            .get(name)
            .ok_or_else(|| Error::Store(format!("no template named '{name}'")))?;
        StyleTemplate::load(&self.templates_dir.join(file))
    }

    /// Template names, sorted case-insensitively.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.index.keys().cloned().collect();
        names.sort_by_key(|n| n.to_lowercase());
        names
    }

    pub fn delete(&mut self, name: &str) -> Result<(), Error> {
        let file = self
            .index
            .remove(name)
            .ok_or_else(|| Error::Store(format!("no template named '{name}'")))?;
        self.write_index()?;
        let path = self.templates_dir.join(&file);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("template file {} was already gone", path.display());
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}
