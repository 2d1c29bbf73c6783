/// Import path resolution and the module cache.
///
/// Relative import paths resolve against the directory of the file doing
/// the importing; the manager keeps that directory on a stack, pushed by
/// `begin_load` and popped by `finish_load`.
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use crate::value::{RuntimeError, Value};

#[derive(Debug)]
pub struct Module {
    pub path: PathBuf,
    pub exports: Rc<HashMap<String, Value>>,
    pub loaded: bool,
}

impl Module {
    pub fn export(&mut self, name: impl Into<String>, value: Value) {
        Rc::make_mut(&mut self.exports).insert(name.into(), value);
    }
}

pub type ModuleHandle = Rc<RefCell<Module>>;

/// Outcome of asking the manager for a module.
pub enum Lookup {
    /// Already executed; reuse its exports.
    Cached(Rc<HashMap<String, Value>>),
    /// Registered and marked as loading; the caller must execute it and
    /// then call [`ModuleManager::finish_load`].
    Load(ModuleHandle),
}

#[derive(Debug, Default)]
pub struct ModuleManager {
    modules: HashMap<PathBuf, ModuleHandle>,
    dir_stack: Vec<PathBuf>,
    loading: Vec<PathBuf>,
}

impl ModuleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the bottom of the directory stack (top-level imports).
    pub fn set_base_dir(&mut self, dir: impl Into<PathBuf>) {
        let dir = absolutize(&dir.into());
        match self.dir_stack.first_mut() {
            Some(base) => *base = dir,
            None => self.dir_stack.push(dir),
        }
    }

    pub fn current_dir(&self) -> PathBuf {
        match self.dir_stack.last() {
            Some(dir) => dir.clone(),
            None => absolutize(Path::new(".")),
        }
    }

    /// Normalise separators and resolve `raw` against the current directory.
    pub fn resolve_path(&self, raw: &str) -> PathBuf {
        let unified = raw.replace('\\', "/");
        let path = Path::new(&unified);
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current_dir().join(path)
        };
        let normal = normalize(&joined);
        std::fs::canonicalize(&normal).unwrap_or(normal)
    }

    pub fn get(&self, path: &Path) -> Option<ModuleHandle> {
        self.modules.get(path).cloned()
    }

    /// Export tables of every fully loaded module.
    pub fn loaded_exports(&self) -> Vec<Rc<HashMap<String, Value>>> {
        self.modules
            .values()
            .map(|m| m.borrow())
            .filter(|m| m.loaded)
            .map(|m| Rc::clone(&m.exports))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn is_loading(&self, path: &Path) -> bool {
        self.loading.iter().any(|p| p == path)
    }

    /// Return cached exports, or register `path` as loading and enter its
    /// directory. A module that is still loading is an import cycle.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn begin_load(&mut self, path: &Path) -> Result<Lookup, RuntimeError> {
        if let Some(module) = self.modules.get(path) {
            let module = module.borrow();
            if module.loaded {
                tracing::debug!("module cache hit");
                return Ok(Lookup::Cached(Rc::clone(&module.exports)));
            }
            let chain = self.cycle_display(path);
            tracing::debug!(%chain, "import cycle");
            return Err(RuntimeError::CyclicImport(chain));
        }

        let handle = Rc::new(RefCell::new(Module {
            path: path.to_path_buf(),
            exports: Rc::new(HashMap::new()),
            loaded: false,
        }));
        self.modules.insert(path.to_path_buf(), Rc::clone(&handle));
        self.loading.push(path.to_path_buf());
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.current_dir());
        self.dir_stack.push(dir);
        Ok(Lookup::Load(handle))
    }

    /// Leave the module's directory. A failed load is evicted so a later
    /// import retries it.
    pub fn finish_load(&mut self, path: &Path, success: bool) -> Option<Rc<HashMap<String, Value>>> {
        self.dir_stack.pop();
        if let Some(pos) = self.loading.iter().rposition(|p| p == path) {
            self.loading.remove(pos);
        }
        if !success {
            self.modules.remove(path);
            return None;
        }
        let module = self.modules.get(path)?;
        let mut module = module.borrow_mut();
        module.loaded = true;
        Some(Rc::clone(&module.exports))
    }

    fn cycle_display(&self, next: &Path) -> String {
        let stem = |p: &Path| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .unwrap_or_else(|| p.display().to_string())
        };
        let mut chain: Vec<String> = self.loading.iter().map(|p| stem(p)).collect();
        chain.push(stem(next));
        chain.join(" -> ")
    }

    /// Drop every cached module; breaks `Rc` cycles through exported closures.
    pub fn clear(&mut self) {
        self.modules.clear();
        self.loading.clear();
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        match std::env::current_dir() {
            Ok(cwd) => normalize(&cwd.join(path)),
            Err(_) => normalize(path),
        }
    }
}

/// Lexical `.`/`..` folding.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_to_current_dir() {
        let mut mm = ModuleManager::new();
        mm.set_base_dir("/tmp/project/src");
        let p = mm.resolve_path("lib/../util.ks");
        assert!(p.ends_with("util.ks"));
        assert!(!p.to_string_lossy().contains(".."));
    }

    #[test]
    fn backslashes_are_separators() {
        let mut mm = ModuleManager::new();
        mm.set_base_dir("/nonexistent-kscript-dir");
        let p = mm.resolve_path("lib\\math.ks");
        assert_eq!(p, PathBuf::from("/nonexistent-kscript-dir/lib/math.ks"));
    }

    #[test]
    fn reentrant_load_is_a_cycle() {
        let mut mm = ModuleManager::new();
        let a = PathBuf::from("/x/a.ks");
        let b = PathBuf::from("/x/b.ks");
        assert!(matches!(mm.begin_load(&a), Ok(Lookup::Load(_))));
        assert!(matches!(mm.begin_load(&b), Ok(Lookup::Load(_))));
        let err = mm.begin_load(&a).err().unwrap();
        assert_eq!(err, RuntimeError::CyclicImport("a -> b -> a".to_string()));
    }

    #[test]
    fn finished_module_is_cached() {
        let mut mm = ModuleManager::new();
        let a = PathBuf::from("/x/a.ks");
        let Ok(Lookup::Load(handle)) = mm.begin_load(&a) else {
            panic!("expected a fresh load");
        };
        handle.borrow_mut().export("answer", Value::Int(42));
        let exports = mm.finish_load(&a, true).unwrap();
        match mm.begin_load(&a) {
            Ok(Lookup::Cached(cached)) => {
                assert!(Rc::ptr_eq(&cached, &exports));
                assert_eq!(cached.get("answer"), Some(&Value::Int(42)));
            }
            _ => panic!("expected cached module"),
        }
    }

    #[test]
    fn failed_module_is_evicted() {
        let mut mm = ModuleManager::new();
        let a = PathBuf::from("/x/a.ks");
        assert!(mm.begin_load(&a).is_ok());
        assert!(mm.finish_load(&a, false).is_none());
        assert!(mm.get(&a).is_none());
        assert!(matches!(mm.begin_load(&a), Ok(Lookup::Load(_))));
    }
}
