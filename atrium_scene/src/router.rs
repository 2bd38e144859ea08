//! Landing scene and section routing. The landing ring offers one
//! hotspot per section; entering a section always disposes the previous
//! gallery before the next one initializes, so at most one gallery is
//! ever live.

use glam::Vec3;
use log::info;

use crate::catalog::{Catalog, SectionKind};
use crate::error::SceneError;
use crate::gallery::{GalleryConfig, GalleryController, spawn_pulse};
use crate::interaction::{CursorIcon, HoverKind, HoverState};
use crate::layout::RingLayout;
use crate::picking::{PointerNdc, pick_nearest};
use crate::registry::{EntityRegistry, Payload};
use crate::tween::{Channel, Tween, TweenPurpose, TweenScheduler};
use crate::viewport::{CameraFlight, CameraRig};

const LANDING_RING_RADIUS: f32 = 6.0;
const HOTSPOT_SCALE: f32 = 0.5;
const HOTSPOT_HOVER_SCALE: f32 = 0.7;
const HOTSPOT_EXTENTS: f32 = 1.0;
const FLIGHT_START: Vec3 = Vec3::new(0.0, 25.0, 40.0);
const FLIGHT_END: Vec3 = Vec3::new(0.0, 0.0, 12.0);
const FLIGHT_SECONDS: f32 = 2.5;

/// The landing view: a camera fly-in over a flat ring of section
/// hotspots. Hotspots pulse and respond to hover, but clicks only route
/// once the camera has landed.
#[derive(Debug)]
pub struct LandingScene {
    camera: CameraRig,
    flight: Option<CameraFlight>,
    registry: EntityRegistry,
    scheduler: TweenScheduler,
    hover: HoverState,
    size: (u32, u32),
}

impl LandingScene {
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width.max(1), height.max(1));
        let camera = CameraRig::new(FLIGHT_START, Vec3::ZERO, size.0 as f32 / size.1 as f32);
        let mut registry = EntityRegistry::new();
        let mut scheduler = TweenScheduler::new();
        let ring = RingLayout::camera_facing(LANDING_RING_RADIUS);
        let sections = [
            SectionKind::Projects,
            SectionKind::About,
            SectionKind::Contacts,
        ];
        for (index, section) in sections.iter().enumerate() {
            let entity = registry.insert(
                &format!("hotspot:{}", section.container_id()),
                Payload::Hotspot { target: *section },
                ring.slot(index, sections.len()),
                Vec3::splat(HOTSPOT_EXTENTS),
            );
            if let Some(item) = registry.entity_mut(entity) {
                item.scale = HOTSPOT_SCALE;
            }
            spawn_pulse(&mut scheduler, entity);
        }
        Self {
            camera,
            flight: Some(CameraFlight::new(FLIGHT_START, FLIGHT_END, FLIGHT_SECONDS)),
            registry,
            scheduler,
            hover: HoverState::new(),
            size,
        }
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// True once the fly-in has finished and clicks route.
    pub fn landed(&self) -> bool {
        self.flight.is_none()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width.max(1), height.max(1));
        self.camera
            .set_aspect(self.size.0 as f32 / self.size.1 as f32);
    }

    pub fn tick(&mut self, dt: f32) {
        if let Some(flight) = self.flight.as_mut() {
            if flight.advance(dt, &mut self.camera) {
                self.flight = None;
                info!("landing fly-in complete");
            }
        }
        self.scheduler.tick(dt, &mut self.registry);
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) -> CursorIcon {
        let target = self.hotspot_under(x, y);
        let (transitions, cursor) = self.hover.pointer_target(target);
        for transition in transitions {
            let (to, purpose) = match transition.kind {
                HoverKind::Begin => (HOTSPOT_HOVER_SCALE, TweenPurpose::Hover),
                HoverKind::End => (HOTSPOT_SCALE, TweenPurpose::Hover),
            };
            let from = self
                .registry
                .entity(transition.entity)
                .map(|item| item.scale)
                .unwrap_or(HOTSPOT_SCALE);
            self.scheduler.spawn(
                Tween::new(transition.entity, Channel::Scale, from, to, 0.3).with_purpose(purpose),
            );
        }
        cursor
    }

    /// Which section a click routes to, if any. Ignored mid-flight.
    pub fn pointer_clicked(&mut self, x: f32, y: f32) -> Option<SectionKind> {
        if !self.landed() {
            return None;
        }
        let entity = self.hotspot_under(x, y)?;
        match self.registry.entity(entity)?.payload {
            Payload::Hotspot { target } => Some(target),
            _ => None,
        }
    }

    fn hotspot_under(&self, x: f32, y: f32) -> Option<usize> {
        let ndc = PointerNdc::from_screen(x, y, self.size.0 as f32, self.size.1 as f32);
        let ray = self.camera.pointer_ray(ndc)?;
        pick_nearest(ray, &self.registry).map(|hit| hit.entity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterEvent {
    SectionEntered(SectionKind),
    SectionExited(SectionKind),
}

/// Keeps at most one gallery live and owns the section lifecycle.
#[derive(Debug)]
pub struct SectionRouter {
    catalog: Catalog,
    active: Option<GalleryController>,
    events: Vec<RouterEvent>,
}

impl SectionRouter {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            active: None,
            events: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn current_section(&self) -> Option<SectionKind> {
        self.active.as_ref().map(|gallery| gallery.section())
    }

    pub fn active(&self) -> Option<&GalleryController> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut GalleryController> {
        self.active.as_mut()
    }

    pub fn take_events(&mut self) -> Vec<RouterEvent> {
        std::mem::take(&mut self.events)
    }

    /// Enter a section, disposing whatever was active first. Entering the
    /// already-active section is a no-op.
    pub fn enter_section(
        &mut self,
        section: SectionKind,
        directory: &crate::viewport::SurfaceDirectory,
    ) -> Result<(), SceneError> {
        if self.current_section() == Some(section) {
            return Ok(());
        }
        self.leave();
        let preset = self.catalog.tuning.preset(section);
        let mut gallery = GalleryController::new(GalleryConfig::for_section(section, preset));
        gallery.init(&self.catalog, directory)?;
        self.active = Some(gallery);
        self.events.push(RouterEvent::SectionEntered(section));
        Ok(())
    }

    /// Dispose the active gallery and return to the landing view.
    pub fn leave(&mut self) -> Option<SectionKind> {
        let mut gallery = self.active.take()?;
        let section = gallery.section();
        gallery.dispose();
        self.events.push(RouterEvent::SectionExited(section));
        Some(section)
    }
}
