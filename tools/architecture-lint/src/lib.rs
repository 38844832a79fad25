//! Boundary lint for the taplist backend.
//!
//! Every `.rs` file under `backend/src/{domain,inbound,outbound}` is parsed
//! with `syn` and checked against three rules:
//!
//! - **layer-import**: `domain` names neither adapter modules nor web,
//!   storage or hashing crates; `inbound` never reaches `outbound` or
//!   storage crates; `outbound` never reaches `inbound` or web crates.
//! - **driven-port**: HTTP adapters only talk to use-case services, so they
//!   must not name the store, image or password ports.
//! - **relation-write**: `push_relation` and `pull_relation` are called only
//!   by the tap, history and back-reference managers, plus the store
//!   adapters that implement them. Any other caller would bypass the
//!   duplicate and capacity checks.
//!
//! `#[cfg(test)]` modules are not scanned at all. Test-only files
//! (`tests.rs`, `*_tests.rs`, `test_utils.rs`) are exempt from the last two
//! rules.

use std::collections::BTreeSet;
use std::fmt;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use syn::visit::Visit;

/// Rule a [`Finding`] breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    LayerImport,
    DrivenPort,
    RelationWrite,
}

impl Rule {
    pub const fn name(self) -> &'static str {
        match self {
            Self::LayerImport => "layer-import",
            Self::DrivenPort => "driven-port",
            Self::RelationWrite => "relation-write",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One rule broken by one file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Finding {
    /// Path relative to `backend/src`.
    pub file: Utf8PathBuf,
    pub rule: Rule,
    pub detail: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [{}] {}", self.file, self.rule, self.detail)
    }
}

#[derive(Debug)]
pub enum LintError {
    Io(io::Error),
    NonUtf8Path(String),
    Parse { file: Utf8PathBuf, message: String },
    Findings(Vec<Finding>),
}

impl fmt::Display for LintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "reading backend sources failed: {err}"),
            Self::NonUtf8Path(name) => write!(f, "source path is not UTF-8: {name}"),
            Self::Parse { file, message } => write!(f, "{file} does not parse: {message}"),
            Self::Findings(findings) => {
                writeln!(f, "{} taplist boundary finding(s):", findings.len())?;
                for finding in findings {
                    writeln!(f, "  {finding}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for LintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for LintError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// A source file and its path relative to `backend/src`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub file: Utf8PathBuf,
    pub contents: String,
}

impl Source {
    pub fn new(file: impl Into<Utf8PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            contents: contents.into(),
        }
    }
}

/// Lint the sources of the backend crate rooted at `backend_dir`.
pub fn lint_backend(backend_dir: &Utf8Path) -> Result<(), LintError> {
    let src = Dir::open_ambient_dir(backend_dir.join("src"), ambient_authority())?;
    lint_sources(&collect_sources(&src)?)
}

/// Lint in-memory sources. Files outside the three layers are skipped.
pub fn lint_sources(sources: &[Source]) -> Result<(), LintError> {
    let mut findings = BTreeSet::new();
    for source in sources {
        let Some(layer) = Layer::of(&source.file) else {
            continue;
        };
        let parsed = syn::parse_file(&source.contents).map_err(|err| LintError::Parse {
            file: source.file.clone(),
            message: err.to_string(),
        })?;
        let mut scan = Scan::default();
        scan.visit_file(&parsed);
        findings.extend(check(&source.file, layer, &scan));
    }

    if findings.is_empty() {
        Ok(())
    } else {
        Err(LintError::Findings(findings.into_iter().collect()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Domain,
    Inbound,
    Outbound,
}

impl Layer {
    const ALL: [Self; 3] = [Self::Domain, Self::Inbound, Self::Outbound];

    const fn dir(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    fn of(file: &Utf8Path) -> Option<Self> {
        let first = file.components().next()?.as_str();
        Self::ALL.into_iter().find(|layer| layer.dir() == first)
    }

    const fn forbidden_modules(self) -> &'static [&'static str] {
        match self {
            Self::Domain => &["inbound", "outbound"],
            Self::Inbound => &["outbound"],
            Self::Outbound => &["inbound"],
        }
    }

    const fn forbidden_crates(self) -> &'static [&'static str] {
        match self {
            Self::Domain => &[
                "actix_session",
                "actix_web",
                "argon2",
                "cap_std",
                "diesel",
                "diesel_async",
                "diesel_migrations",
                "utoipa",
            ],
            Self::Inbound => &["argon2", "cap_std", "diesel", "diesel_async"],
            Self::Outbound => &["actix_session", "actix_web", "utoipa"],
        }
    }
}

/// Ports the domain drives; HTTP adapters reach them only through services.
const DRIVEN_PORTS: [&str; 4] = [
    "EntityStore",
    "ImageStore",
    "InMemoryEntityStore",
    "PasswordHasher",
];

const RELATION_WRITES: [&str; 2] = ["push_relation", "pull_relation"];

/// Files allowed to change relation lists on stored documents.
const RELATION_WRITERS: [&str; 3] = [
    "domain/beer_relationships.rs",
    "domain/history_manager.rs",
    "domain/tap_manager.rs",
];

/// Directories that define or implement the store port.
const STORE_DIRS: [&str; 2] = ["domain/ports/", "outbound/persistence/"];

fn slash_path(file: &Utf8Path) -> String {
    file.components()
        .map(|component| component.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_test_file(file: &Utf8Path) -> bool {
    file.file_name().is_some_and(|name| {
        name == "tests.rs" || name == "test_utils.rs" || name.ends_with("_tests.rs")
    })
}

fn may_write_relations(file: &Utf8Path) -> bool {
    let path = slash_path(file);
    RELATION_WRITERS.contains(&path.as_str())
        || STORE_DIRS.iter().any(|dir| path.starts_with(dir))
}

fn check(file: &Utf8Path, layer: Layer, scan: &Scan) -> BTreeSet<Finding> {
    let finding = |rule, detail: String| Finding {
        file: file.to_owned(),
        rule,
        detail,
    };
    let mut findings = BTreeSet::new();

    for path in &scan.paths {
        if let Some(module) =
            internal_root(path).filter(|module| layer.forbidden_modules().contains(module))
        {
            findings.insert(finding(
                Rule::LayerImport,
                format!("{} must not depend on crate::{module}", layer.dir()),
            ));
        }
        if let Some(krate) =
            external_root(path).filter(|krate| layer.forbidden_crates().contains(krate))
        {
            findings.insert(finding(
                Rule::LayerImport,
                format!("{} must not depend on `{krate}`", layer.dir()),
            ));
        }
    }

    if is_test_file(file) {
        return findings;
    }

    if layer == Layer::Inbound {
        for port in scan
            .paths
            .iter()
            .filter_map(|path| path.last())
            .filter(|name| DRIVEN_PORTS.contains(&name.as_str()))
        {
            findings.insert(finding(
                Rule::DrivenPort,
                format!("HTTP adapters must go through a service, not `{port}`"),
            ));
        }
    }

    if !may_write_relations(file) {
        for method in &scan.relation_writes {
            findings.insert(finding(
                Rule::RelationWrite,
                format!("`{method}` outside the relationship managers"),
            ));
        }
    }

    findings
}

fn is_relative(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super")
}

/// Backend module a path points into, if it is one of the layers.
fn internal_root(path: &[String]) -> Option<&'static str> {
    let first = path.first()?.as_str();
    let candidate = match first {
        "crate" | "self" | "super" => path.iter().find(|segment| !is_relative(segment))?,
        "taplist" => path.get(1)?,
        _ => path.first()?,
    };
    Layer::ALL
        .into_iter()
        .map(Layer::dir)
        .find(|dir| *dir == candidate.as_str())
}

fn external_root(path: &[String]) -> Option<&str> {
    let root = path.first()?.as_str();
    (!is_relative(root) && root != "taplist").then_some(root)
}

fn is_test_only(attrs: &[syn::Attribute]) -> bool {
    attrs.iter().any(|attr| {
        if !attr.path().is_ident("cfg") {
            return false;
        }
        let mut test = false;
        let _ = attr.parse_nested_meta(|meta| {
            test |= meta.path.is_ident("test");
            Ok(())
        });
        test
    })
}

/// Paths and relation-write calls found in non-test code.
#[derive(Default)]
struct Scan {
    paths: BTreeSet<Vec<String>>,
    relation_writes: BTreeSet<String>,
}

impl Scan {
    fn record_use(&mut self, tree: &syn::UseTree, mut prefix: Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.record_use(&path.tree, prefix);
            }
            syn::UseTree::Name(name) => {
                prefix.push(name.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Rename(rename) => {
                prefix.push(rename.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Glob(_) => {
                prefix.push("*".to_owned());
                self.paths.insert(prefix);
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.record_use(item, prefix.clone());
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for Scan {
    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        if !is_test_only(&node.attrs) {
            syn::visit::visit_item_mod(self, node);
        }
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.record_use(&node.tree, Vec::new());
    }

    fn visit_path(&mut self, node: &'ast syn::Path) {
        let segments: Vec<String> = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        // `EntityStore::push_relation(&store, ..)` style calls.
        match segments.as_slice() {
            [_, .., last] if RELATION_WRITES.contains(&last.as_str()) => {
                self.relation_writes.insert(last.clone());
            }
            _ => {}
        }
        if !segments.is_empty() {
            self.paths.insert(segments);
        }
        syn::visit::visit_path(self, node);
    }

    fn visit_expr_method_call(&mut self, node: &'ast syn::ExprMethodCall) {
        let method = node.method.to_string();
        if RELATION_WRITES.contains(&method.as_str()) {
            self.relation_writes.insert(method);
        }
        syn::visit::visit_expr_method_call(self, node);
    }
}

fn collect_sources(src: &Dir) -> Result<Vec<Source>, LintError> {
    let mut sources = Vec::new();
    for layer in Layer::ALL {
        if src.exists(layer.dir()) {
            collect_under(&src.open_dir(layer.dir())?, layer.dir().into(), &mut sources)?;
        }
    }
    Ok(sources)
}

fn collect_under(
    dir: &Dir,
    prefix: Utf8PathBuf,
    sources: &mut Vec<Source>,
) -> Result<(), LintError> {
    for entry in dir.entries()? {
        let entry = entry?;
        let name = entry
            .file_name()
            .into_string()
            .map_err(|name| LintError::NonUtf8Path(name.to_string_lossy().into_owned()))?;
        let relative = prefix.join(&name);
        if entry.file_type()?.is_dir() {
            collect_under(&entry.open_dir()?, relative, sources)?;
        } else if relative.extension() == Some("rs") {
            let contents = dir.read_to_string(&name)?;
            sources.push(Source::new(relative, contents));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
