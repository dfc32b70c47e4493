//! Purpose: Locate well-known per-user and system directories.
//! Exports: `SpecialDir`, `DirEnv`, `special_dir`.
//! Role: `dirs` resolves the platform locations once; lookups against the table are pure.
//! Invariants: `DirEnv::from_process` is the only place that consults the platform.
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpecialDir {
    Home,
    Documents,
    Desktop,
    Caches,
    Applications,
    Temp,
}

impl SpecialDir {
    pub const ALL: [SpecialDir; 6] = [
        SpecialDir::Home,
        SpecialDir::Documents,
        SpecialDir::Desktop,
        SpecialDir::Caches,
        SpecialDir::Applications,
        SpecialDir::Temp,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SpecialDir::Home => "home",
            SpecialDir::Documents => "documents",
            SpecialDir::Desktop => "desktop",
            SpecialDir::Caches => "caches",
            SpecialDir::Applications => "applications",
            SpecialDir::Temp => "temp",
        }
    }
}

/// Resolved special directories. Tests build one by hand.
#[derive(Clone, Debug, Default)]
pub struct DirEnv {
    pub home: Option<PathBuf>,
    pub documents: Option<PathBuf>,
    pub desktop: Option<PathBuf>,
    pub caches: Option<PathBuf>,
    pub applications: Option<PathBuf>,
    pub temp: PathBuf,
}

impl DirEnv {
    pub fn from_process() -> Self {
        Self {
            home: dirs::home_dir(),
            documents: dirs::document_dir(),
            desktop: dirs::desktop_dir(),
            caches: dirs::cache_dir(),
            applications: Some(system_applications_dir()),
            temp: std::env::temp_dir(),
        }
    }

    pub fn home_str(&self) -> Option<&str> {
        self.home.as_deref().and_then(|home| home.to_str())
    }
}

fn system_applications_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/Applications")
    } else {
        PathBuf::from("/usr/share/applications")
    }
}

pub fn special_dir(dir: SpecialDir, env: &DirEnv) -> Option<PathBuf> {
    match dir {
        SpecialDir::Home => env.home.clone(),
        SpecialDir::Documents => env.documents.clone(),
        SpecialDir::Desktop => env.desktop.clone(),
        SpecialDir::Caches => env.caches.clone(),
        SpecialDir::Applications => env.applications.clone(),
        SpecialDir::Temp => Some(env.temp.clone()),
    }
}
