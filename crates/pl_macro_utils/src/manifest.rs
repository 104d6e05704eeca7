use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

/// The `Cargo.toml` of the crate a macro expands in.
///
/// Generated code has to name our crates the way the calling crate sees
/// them. A game that depends on `pl_core` only reaches `pl_reflect` as
/// `::pl_core::reflect`.
///
/// # Example
///
/// ```rust
/// # use pl_macro_utils::Manifest;
/// let path: syn::Path = Manifest::shared(|m| m.get_crate_path("pl_reflect"));
/// ```
///
/// # Resolution rules
///
/// 1. A crate listed in `dependencies` is `::crate_name`.
/// 2. A `pl_` crate reached through `pl_core` is `::pl_core::short_name`
///    (`pl_reflect` becomes `::pl_core::reflect`).
/// 3. Same with `pl` when `pl_core` is renamed to it.
/// 4. Steps 1 to 3 again in `dev-dependencies`.
/// 5. `::crate_name` otherwise.
///
/// A crate naming itself needs `extern crate self as crate_name;` at its
/// root for rule 5 to hold in its own tests.
#[derive(Debug)]
pub struct Manifest {
    pub manifest: Document<Box<str>>,
    pub modified_time: SystemTime,
}

const ENGINE_NAME: &str = "pl_core";
const SHORT_ENGINE_NAME: &str = "pl";
const ENGINE_PREFIX: &str = "pl_";

impl Manifest {
    #[inline(never)]
    fn manifest_path() -> PathBuf {
        let dir = env::var_os("CARGO_MANIFEST_DIR")
            .unwrap_or_else(|| panic!("CARGO_MANIFEST_DIR is not set, macros must run under cargo"));
        let mut path = PathBuf::from(dir);
        path.push("Cargo.toml");
        assert!(
            path.exists(),
            "Cargo manifest does not exist at path {}",
            path.display(),
        );
        path
    }

    #[inline(never)]
    fn modified_time(path: &Path) -> SystemTime {
        std::fs::metadata(path)
            .and_then(|metadata| metadata.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }

    #[inline(never)]
    fn read_manifest(path: &Path) -> Document<Box<str>> {
        let manifest = std::fs::read_to_string(path)
            .unwrap_or_else(|_| panic!("Unable to read cargo manifest: {}", path.display()))
            .into_boxed_str();
        Document::parse(manifest)
            .unwrap_or_else(|_| panic!("Failed to parse cargo manifest: {}", path.display()))
    }

    fn parse_str<T: syn::parse::Parse>(path: &str) -> T {
        syn::parse_str(path).unwrap_or_else(|e| panic!("`{path}` is not a path: {e}"))
    }

    #[inline]
    fn crate_root(name: &str) -> syn::Path {
        Self::parse_str(&format!("::{name}"))
    }

    fn find_in_deps(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Some(Self::crate_root(name));
        }
        let module = name.strip_prefix(ENGINE_PREFIX)?;
        [ENGINE_NAME, SHORT_ENGINE_NAME]
            .into_iter()
            .find(|engine| deps.contains_key(engine))
            .map(|engine| {
                let mut path = Self::crate_root(engine);
                path.segments.push(Self::parse_str(module));
                path
            })
    }

    /// The path of the crate `name` as seen from the calling crate. See
    /// the type docs for the rules.
    #[inline(never)]
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        ["dependencies", "dev-dependencies"]
            .into_iter()
            .filter_map(|table| match self.manifest.get(table) {
                Some(Item::Table(deps)) => Self::find_in_deps(deps, name),
                _ => None,
            })
            .next()
            .unwrap_or_else(|| Self::crate_root(name))
    }

    /// Runs `func` on the manifest of the calling crate.
    ///
    /// Manifests are parsed once and cached until the file changes.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let path = Self::manifest_path();
        let modified_time = Self::modified_time(&path);

        {
            let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(manifest) = manifests.get(&path)
                && manifest.modified_time == modified_time
            {
                return func(manifest);
            }
        }

        let manifest = Manifest {
            manifest: Self::read_manifest(&path),
            modified_time,
        };
        let result = func(&manifest);

        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, manifest);

        result
    }
}
