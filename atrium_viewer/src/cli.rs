use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use atrium_scene::catalog::{Catalog, SectionKind, default_catalog, load_catalog};

#[derive(Parser, Debug)]
#[command(about = "3D portfolio viewer: landing ring, video/photo/contact galleries", version)]
pub struct Args {
    /// Content manifest JSON; the built-in catalog is used when omitted
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Jump straight into a section instead of the landing fly-in
    #[arg(long, value_enum)]
    pub section: Option<SectionArg>,

    /// Validate the catalog and print section sizes without a window
    #[arg(long)]
    pub headless: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum SectionArg {
    Projects,
    About,
    Contacts,
}

impl From<SectionArg> for SectionKind {
    fn from(value: SectionArg) -> Self {
        match value {
            SectionArg::Projects => SectionKind::Projects,
            SectionArg::About => SectionKind::About,
            SectionArg::Contacts => SectionKind::Contacts,
        }
    }
}

pub fn resolve_catalog(args: &Args) -> Result<Catalog> {
    match &args.catalog {
        Some(path) => load_catalog(path),
        None => Ok(default_catalog()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn default_catalog_is_used_without_a_manifest() {
        let args = Args::parse_from(["atrium_viewer"]);
        let catalog = resolve_catalog(&args).expect("catalog");
        assert!(!catalog.videos.is_empty());
    }

    #[test]
    fn section_argument_maps_onto_section_kind() {
        let args = Args::parse_from(["atrium_viewer", "--section", "about"]);
        let section: SectionKind = args.section.expect("section").into();
        assert_eq!(section, SectionKind::About);
    }

    #[test]
    fn manifest_path_is_loaded_and_validated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        fs::write(&path, "{\"videos\":[],\"photos\":[],\"contacts\":[]}").expect("write");
        let args = Args::parse_from([
            "atrium_viewer",
            "--catalog",
            path.to_str().expect("utf-8 path"),
        ]);
        assert!(resolve_catalog(&args).is_err());
    }
}
