//! Section content and gallery tuning. The catalog loads from a JSON
//! manifest so the site content can change without a rebuild; a built-in
//! default mirrors the shipped portfolio so the viewer runs with no
//! arguments.

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// The three navigable sections behind the landing hotspots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Projects,
    About,
    Contacts,
}

impl SectionKind {
    /// Stable id of the render container this section draws into.
    pub fn container_id(self) -> &'static str {
        match self {
            SectionKind::Projects => "projects-3d-container",
            SectionKind::About => "about-3d-container",
            SectionKind::Contacts => "contacts-3d-container",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Projects => "Projects",
            SectionKind::About => "About",
            SectionKind::Contacts => "Contacts",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoEntry {
    /// External video id used to build the embed URL.
    pub id: String,
    pub title: String,
}

impl VideoEntry {
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}?autoplay=1", self.id)
    }

    pub fn thumbnail_url(&self) -> String {
        format!("https://img.youtube.com/vi/{}/hqdefault.jpg", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoEntry {
    pub id: String,
    pub image: PathBuf,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactEntry {
    pub id: String,
    pub label: String,
    pub url: String,
}

/// Optional per-section tuning overrides, in the spirit of the layout
/// presets the viewer already accepts for HUD panels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GalleryPreset {
    #[serde(default)]
    pub radius: Option<f32>,
    #[serde(default)]
    pub flatten_y: Option<f32>,
    #[serde(default)]
    pub flatten_z: Option<f32>,
    #[serde(default)]
    pub camera_distance: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogTuning {
    #[serde(default)]
    pub projects: Option<GalleryPreset>,
    #[serde(default)]
    pub about: Option<GalleryPreset>,
    #[serde(default)]
    pub contacts: Option<GalleryPreset>,
}

impl CatalogTuning {
    pub fn preset(&self, section: SectionKind) -> Option<&GalleryPreset> {
        match section {
            SectionKind::Projects => self.projects.as_ref(),
            SectionKind::About => self.about.as_ref(),
            SectionKind::Contacts => self.contacts.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub videos: Vec<VideoEntry>,
    pub photos: Vec<PhotoEntry>,
    pub contacts: Vec<ContactEntry>,
    #[serde(default)]
    pub tuning: CatalogTuning,
}

impl Catalog {
    pub fn section_len(&self, section: SectionKind) -> usize {
        match section {
            SectionKind::Projects => self.videos.len(),
            SectionKind::About => self.photos.len(),
            SectionKind::Contacts => self.contacts.len(),
        }
    }

    /// Reject catalogs a gallery cannot lay out: empty sections and
    /// duplicate identities within a section.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.videos.is_empty(), "catalog lists no videos");
        ensure!(!self.photos.is_empty(), "catalog lists no photos");
        ensure!(!self.contacts.is_empty(), "catalog lists no contacts");

        let mut seen: Vec<&str> = Vec::new();
        let ids = self
            .videos
            .iter()
            .map(|v| v.id.as_str())
            .chain(self.photos.iter().map(|p| p.id.as_str()))
            .chain(self.contacts.iter().map(|c| c.id.as_str()));
        for id in ids {
            ensure!(!id.is_empty(), "catalog entry has an empty id");
            ensure!(!seen.contains(&id), "duplicate catalog id '{id}'");
            seen.push(id);
        }
        Ok(())
    }
}

pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading catalog manifest {}", path.display()))?;
    let catalog: Catalog = serde_json::from_str(&data)
        .with_context(|| format!("parsing catalog manifest {}", path.display()))?;
    catalog
        .validate()
        .with_context(|| format!("validating catalog manifest {}", path.display()))?;
    Ok(catalog)
}

/// Content shipped with the portfolio: seven animation reels, eleven
/// gallery photos, and the contact ring.
pub fn default_catalog() -> Catalog {
    let videos = [
        ("22NTSj3yMgc", "Animation 1"),
        ("i8TJAKnyy7w", "Animation 2"),
        ("LaEhIA6vprw", "Animation 3"),
        ("-HN4EBvRV3g", "Animation 4"),
        ("Wg7hCVhKBAw", "Animation 5"),
        ("_QlIdAuV-po", "Animation 6"),
        ("GyWp6Xx-djE", "Animation 7"),
    ]
    .into_iter()
    .map(|(id, title)| VideoEntry {
        id: id.to_string(),
        title: title.to_string(),
    })
    .collect();

    let captions = [
        "A creative project showcasing my 3D modeling skills.",
        "An animation experiment with dynamic lighting.",
        "A personal artwork blending 3D and web design.",
    ];
    let photos = (1..=11)
        .map(|index| PhotoEntry {
            id: format!("photo{index}"),
            image: PathBuf::from(format!("images/{index}.jpg")),
            caption: captions[(index - 1).min(captions.len() - 1)].to_string(),
        })
        .collect();

    let contacts = [
        ("github", "GitHub", "https://github.com"),
        ("linkedin", "LinkedIn", "https://www.linkedin.com"),
        ("youtube", "YouTube", "https://www.youtube.com"),
        ("email", "Email", "mailto:hello@example.com"),
        ("artstation", "ArtStation", "https://www.artstation.com"),
    ]
    .into_iter()
    .map(|(id, label, url)| ContactEntry {
        id: id.to_string(),
        label: label.to_string(),
        url: url.to_string(),
    })
    .collect();

    Catalog {
        videos,
        photos,
        contacts,
        tuning: CatalogTuning::default(),
    }
}
