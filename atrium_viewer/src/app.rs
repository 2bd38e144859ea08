//! Window-side application state. Owns the landing scene and the section
//! router, feeds pointer input into whichever is active, fulfils texture
//! loads, and turns gallery effects into panel and cursor updates the
//! render loop applies.

use std::collections::HashMap;

use atrium_scene::catalog::{Catalog, SectionKind};
use atrium_scene::error::SceneError;
use atrium_scene::gallery::{GalleryEffect, LoadSource};
use atrium_scene::interaction::CursorIcon;
use atrium_scene::registry::{Payload, VisualState};
use atrium_scene::router::{LandingScene, SectionRouter};
use atrium_scene::viewport::SurfaceDirectory;
use log::{info, warn};

use crate::mesh::{PrimitiveKind, instance};
use crate::panel::{PanelCanvas, compose_photo, compose_playback};
use crate::render::FrameDraw;
use crate::texture::{
    average_tint, generate_placeholder_texture, identity_tint, load_photo_rgba,
};

/// Pointer travel below this many pixels still counts as a click.
const CLICK_SLOP: f32 = 5.0;
const ORBIT_SENSITIVITY: f32 = 0.005;
/// Extra glow while hovered, under whatever the tweens drive.
const HOVER_EMPHASIS: f32 = 0.35;

const PLAYBACK_PANEL_WIDTH: u32 = 560;
const PLAYBACK_PANEL_HEIGHT: u32 = 96;
const PHOTO_PANEL_WIDTH: u32 = 640;
const PHOTO_PANEL_HEIGHT: u32 = 480;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeOutcome {
    /// A playback panel or photo overlay was open and is now closing.
    DismissedPanel,
    /// The active section was left for the landing view.
    LeftSection,
    /// Nothing to close; the caller decides (usually: quit).
    Unhandled,
}

pub enum PanelUpdate<'a> {
    Show(&'a PanelCanvas),
    Hide,
}

pub struct App {
    directory: SurfaceDirectory,
    landing: LandingScene,
    router: SectionRouter,
    size: (u32, u32),
    cursor: CursorIcon,
    panel: Option<PanelCanvas>,
    panel_dirty: bool,
    /// Tints resolved from finished texture loads, keyed by entity
    /// identity within the active gallery.
    tints: HashMap<String, [f32; 3]>,
    pointer: (f32, f32),
    dragging: bool,
    drag_distance: f32,
}

impl App {
    pub fn new(catalog: Catalog, width: u32, height: u32) -> Self {
        let mut directory = SurfaceDirectory::new();
        for section in [
            SectionKind::Projects,
            SectionKind::About,
            SectionKind::Contacts,
        ] {
            directory.register(section.container_id(), width, height);
        }
        Self {
            directory,
            landing: LandingScene::new(width, height),
            router: SectionRouter::new(catalog),
            size: (width, height),
            cursor: CursorIcon::Default,
            panel: None,
            panel_dirty: false,
            tints: HashMap::new(),
            pointer: (0.0, 0.0),
            dragging: false,
            drag_distance: 0.0,
        }
    }

    pub fn current_section(&self) -> Option<SectionKind> {
        self.router.current_section()
    }

    pub fn cursor(&self) -> CursorIcon {
        self.cursor
    }

    pub fn enter_section(&mut self, section: SectionKind) -> Result<(), SceneError> {
        self.router.enter_section(section, &self.directory)?;
        self.tints.clear();
        self.fulfil_loads();
        Ok(())
    }

    pub fn leave_section(&mut self) {
        if self.router.leave().is_some() {
            self.tints.clear();
            if self.panel.take().is_some() {
                self.panel_dirty = true;
            }
        }
    }

    /// Resolve every queued texture load and hand the results back.
    /// Thumbnails are synthesized; there is no network path.
    fn fulfil_loads(&mut self) {
        let Some(gallery) = self.router.active_mut() else {
            return;
        };
        for request in gallery.take_load_requests() {
            let texture = match &request.source {
                LoadSource::RemoteThumbnail(url) => generate_placeholder_texture(url),
                LoadSource::LocalImage(path) => load_photo_rgba(path).unwrap_or_else(|err| {
                    warn!("photo '{}' unavailable: {err:#}", path.display());
                    generate_placeholder_texture(&path.display().to_string())
                }),
                LoadSource::Procedural(seed) => generate_placeholder_texture(seed),
            };
            let identity = gallery
                .registry()
                .entity(request.entity)
                .map(|entity| entity.identity.clone());
            if gallery.complete_load(request.ticket, request.entity) {
                if let Some(identity) = identity {
                    self.tints.insert(identity, average_tint(&texture));
                }
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.directory.resize_all(width, height);
        self.landing.resize(width, height);
        if let Some(session) = self.router.active_mut().and_then(|g| g.session_mut()) {
            session.resize(width, height);
        }
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        let dx = x - self.pointer.0;
        let dy = y - self.pointer.1;
        self.pointer = (x, y);
        if self.dragging {
            self.drag_distance += dx.abs() + dy.abs();
            if let Some(session) = self.router.active_mut().and_then(|g| g.session_mut()) {
                if let Some(controls) = session.controls.as_mut() {
                    controls.input(dx * ORBIT_SENSITIVITY, dy * ORBIT_SENSITIVITY);
                }
            }
        }
        if let Some(gallery) = self.router.active_mut() {
            let effects = gallery.pointer_moved(x, y);
            self.apply_effects(effects);
        } else {
            self.cursor = self.landing.pointer_moved(x, y);
        }
    }

    pub fn pointer_pressed(&mut self) {
        self.dragging = true;
        self.drag_distance = 0.0;
    }

    pub fn pointer_released(&mut self) {
        let was_click = self.dragging && self.drag_distance < CLICK_SLOP;
        self.dragging = false;
        if !was_click {
            return;
        }
        let (x, y) = self.pointer;
        if self.panel_contains(x, y) {
            // The panel floats over the scene; its close affordance wins
            // over whatever the ring would hit underneath.
            if let Some(gallery) = self.router.active_mut() {
                let effects = gallery.dismiss();
                self.apply_effects(effects);
            }
            return;
        }
        if let Some(gallery) = self.router.active_mut() {
            let effects = gallery.pointer_clicked(x, y);
            self.apply_effects(effects);
        } else if let Some(section) = self.landing.pointer_clicked(x, y) {
            if let Err(err) = self.enter_section(section) {
                warn!("failed to enter section: {err}");
            }
        }
    }

    /// Whether the point lands on the active panel, which is drawn
    /// centered in the window.
    fn panel_contains(&self, x: f32, y: f32) -> bool {
        let Some(canvas) = self.panel.as_ref() else {
            return false;
        };
        let (width, height) = self.size;
        let left = (width as f32 - canvas.width as f32) * 0.5;
        let top = (height as f32 - canvas.height as f32) * 0.5;
        x >= left
            && x <= left + canvas.width as f32
            && y >= top
            && y <= top + canvas.height as f32
    }

    pub fn scroll(&mut self, delta: f32) {
        if let Some(session) = self.router.active_mut().and_then(|g| g.session_mut()) {
            let camera = &mut session.camera;
            if let Some(controls) = session.controls.as_mut() {
                controls.zoom(camera, delta);
            }
        }
    }

    pub fn escape(&mut self) -> EscapeOutcome {
        if let Some(gallery) = self.router.active_mut() {
            let effects = gallery.dismiss();
            if !effects.is_empty() {
                self.apply_effects(effects);
                return EscapeOutcome::DismissedPanel;
            }
        }
        if self.router.current_section().is_some() {
            self.leave_section();
            return EscapeOutcome::LeftSection;
        }
        EscapeOutcome::Unhandled
    }

    pub fn tick(&mut self, dt: f32) {
        if let Some(gallery) = self.router.active_mut() {
            let effects = gallery.tick(dt);
            self.apply_effects(effects);
        } else {
            self.landing.tick(dt);
        }
        for event in self.router.take_events() {
            info!("{event:?}");
        }
    }

    fn apply_effects(&mut self, effects: Vec<GalleryEffect>) {
        for effect in effects {
            match effect {
                GalleryEffect::CursorChanged(icon) => self.cursor = icon,
                GalleryEffect::OpenPlayback { embed_url, title } => {
                    let mut canvas = PanelCanvas::new(
                        PLAYBACK_PANEL_WIDTH,
                        PLAYBACK_PANEL_HEIGHT,
                        12,
                        12,
                    );
                    compose_playback(&mut canvas, &title, &embed_url);
                    self.panel = Some(canvas);
                    self.panel_dirty = true;
                }
                GalleryEffect::ShowOverlay { image, caption } => {
                    let texture = load_photo_rgba(&image).unwrap_or_else(|err| {
                        warn!("photo '{}' unavailable: {err:#}", image.display());
                        generate_placeholder_texture(&image.display().to_string())
                    });
                    let mut canvas =
                        PanelCanvas::new(PHOTO_PANEL_WIDTH, PHOTO_PANEL_HEIGHT, 16, 16);
                    compose_photo(&mut canvas, &texture, &caption);
                    self.panel = Some(canvas);
                    self.panel_dirty = true;
                }
                GalleryEffect::ClosePlayback | GalleryEffect::HideOverlay => {
                    if self.panel.take().is_some() {
                        self.panel_dirty = true;
                    }
                }
                GalleryEffect::OpenExternal { url } => {
                    // No embedded browser; surface the link instead.
                    info!("open link: {url}");
                }
            }
        }
    }

    /// The panel change since the last call, if any.
    pub fn take_panel_update(&mut self) -> Option<PanelUpdate<'_>> {
        if !self.panel_dirty {
            return None;
        }
        self.panel_dirty = false;
        Some(match self.panel.as_ref() {
            Some(canvas) => PanelUpdate::Show(canvas),
            None => PanelUpdate::Hide,
        })
    }

    /// Instance lists for the current frame.
    pub fn frame(&self) -> FrameDraw {
        let mut draw = FrameDraw::default();
        if let Some(gallery) = self.router.active() {
            let Some(snapshot) = gallery.snapshot() else {
                return draw;
            };
            draw.view_projection = snapshot.view_projection;
            for entity in &snapshot.entities {
                let kind = match entity.payload {
                    Payload::Video { .. } => PrimitiveKind::Cube,
                    Payload::Photo { .. } => PrimitiveKind::Plane,
                    Payload::Contact { .. } | Payload::Hotspot { .. } => PrimitiveKind::Sphere,
                };
                let color = self
                    .tints
                    .get(entity.identity)
                    .copied()
                    .unwrap_or_else(|| identity_tint(entity.identity));
                let emphasis = if entity.state == VisualState::Hovered {
                    entity.emphasis.max(HOVER_EMPHASIS)
                } else {
                    entity.emphasis
                };
                draw.push(kind, instance(entity.model, color, entity.opacity, emphasis));
            }
        } else {
            draw.view_projection = self.landing.camera().view_projection();
            for entity in self.landing.registry().entities() {
                if !entity.visible {
                    continue;
                }
                draw.push(
                    PrimitiveKind::Sphere,
                    instance(
                        entity.model_matrix(),
                        identity_tint(&entity.identity),
                        entity.opacity,
                        entity.emphasis,
                    ),
                );
            }
        }
        draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_scene::catalog::default_catalog;
    use glam::Mat4;

    fn app() -> App {
        App::new(default_catalog(), 1280, 720)
    }

    fn settle(app: &mut App) {
        for _ in 0..400 {
            app.tick(0.016);
        }
    }

    fn screen_position(view_projection: Mat4, position: glam::Vec3) -> (f32, f32) {
        let clip = view_projection * position.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        ((ndc.x + 1.0) * 0.5 * 1280.0, (1.0 - ndc.y) * 0.5 * 720.0)
    }

    fn click(app: &mut App, x: f32, y: f32) {
        app.pointer_moved(x, y);
        app.pointer_pressed();
        app.pointer_released();
    }

    #[test]
    fn entering_a_section_resolves_every_texture_load() {
        let mut app = app();
        app.enter_section(SectionKind::Projects).expect("enter");
        let count = app
            .router
            .active()
            .map(|gallery| gallery.registry().len())
            .unwrap_or(0);
        assert_eq!(app.tints.len(), count);
    }

    #[test]
    fn landing_frame_draws_one_sphere_per_hotspot() {
        let mut app = app();
        settle(&mut app);
        let draw = app.frame();
        assert_eq!(draw.spheres.len(), 3);
        assert!(draw.cubes.is_empty());
    }

    #[test]
    fn clicking_a_hotspot_routes_into_its_section() {
        let mut app = app();
        settle(&mut app);
        let position = app.landing.registry().entity(0).expect("hotspot").position;
        let view_projection = app.landing.camera().view_projection();
        let (x, y) = screen_position(view_projection, position);
        click(&mut app, x, y);
        assert_eq!(app.current_section(), Some(SectionKind::Projects));
        settle(&mut app);
        let draw = app.frame();
        assert_eq!(draw.cubes.len(), default_catalog().videos.len());
    }

    #[test]
    fn dragging_suppresses_the_click() {
        let mut app = app();
        settle(&mut app);
        let position = app.landing.registry().entity(0).expect("hotspot").position;
        let view_projection = app.landing.camera().view_projection();
        let (x, y) = screen_position(view_projection, position);
        app.pointer_moved(x - 40.0, y);
        app.pointer_pressed();
        app.pointer_moved(x, y);
        app.pointer_released();
        assert_eq!(app.current_section(), None);
    }

    #[test]
    fn playback_panel_shows_and_escape_walks_back_out() {
        let mut app = app();
        app.enter_section(SectionKind::Projects).expect("enter");
        settle(&mut app);
        let (view_projection, position) = {
            let gallery = app.router.active().expect("gallery");
            let session = gallery.session().expect("session");
            (
                session.camera.view_projection(),
                gallery.registry().entity(1).expect("entity").position,
            )
        };
        let (x, y) = screen_position(view_projection, position);
        click(&mut app, x, y);
        assert!(matches!(
            app.take_panel_update(),
            Some(PanelUpdate::Show(_))
        ));

        assert_eq!(app.escape(), EscapeOutcome::DismissedPanel);
        assert!(matches!(app.take_panel_update(), Some(PanelUpdate::Hide)));
        assert_eq!(app.escape(), EscapeOutcome::LeftSection);
        assert_eq!(app.current_section(), None);
        assert_eq!(app.escape(), EscapeOutcome::Unhandled);
    }

    #[test]
    fn clicking_the_open_panel_closes_it() {
        let mut app = app();
        app.enter_section(SectionKind::Projects).expect("enter");
        settle(&mut app);
        let (view_projection, position) = {
            let gallery = app.router.active().expect("gallery");
            let session = gallery.session().expect("session");
            (
                session.camera.view_projection(),
                gallery.registry().entity(1).expect("entity").position,
            )
        };
        let (x, y) = screen_position(view_projection, position);
        click(&mut app, x, y);
        assert!(matches!(
            app.take_panel_update(),
            Some(PanelUpdate::Show(_))
        ));

        // Window center lands inside the 560x96 panel rect.
        click(&mut app, 640.0, 360.0);
        assert!(matches!(app.take_panel_update(), Some(PanelUpdate::Hide)));
        let selected = app.router.active().and_then(|gallery| gallery.selected());
        assert_eq!(selected, None);
        assert_eq!(app.current_section(), Some(SectionKind::Projects));
    }

    #[test]
    fn photo_overlay_composes_a_panel() {
        let mut app = app();
        app.enter_section(SectionKind::About).expect("enter");
        settle(&mut app);
        let (view_projection, position) = {
            let gallery = app.router.active().expect("gallery");
            let session = gallery.session().expect("session");
            (
                session.camera.view_projection(),
                gallery.registry().entity(0).expect("entity").position,
            )
        };
        let (x, y) = screen_position(view_projection, position);
        click(&mut app, x, y);
        match app.take_panel_update() {
            Some(PanelUpdate::Show(canvas)) => {
                assert_eq!(canvas.width, PHOTO_PANEL_WIDTH);
            }
            _ => panic!("expected a photo panel"),
        }
    }

    #[test]
    fn leaving_a_section_hides_any_open_panel() {
        let mut app = app();
        app.enter_section(SectionKind::Projects).expect("enter");
        settle(&mut app);
        let (view_projection, position) = {
            let gallery = app.router.active().expect("gallery");
            let session = gallery.session().expect("session");
            (
                session.camera.view_projection(),
                gallery.registry().entity(0).expect("entity").position,
            )
        };
        let (x, y) = screen_position(view_projection, position);
        click(&mut app, x, y);
        app.take_panel_update();
        app.leave_section();
        assert!(matches!(app.take_panel_update(), Some(PanelUpdate::Hide)));
    }
}
