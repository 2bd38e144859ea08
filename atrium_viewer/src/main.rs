mod app;
mod cli;
mod mesh;
mod panel;
mod render;
mod shaders;
mod texture;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use atrium_scene::catalog::{Catalog, SectionKind};
use atrium_scene::interaction::CursorIcon;
use clap::Parser;
use log::{error, warn};
use pollster::FutureExt as _;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

use crate::app::{App, EscapeOutcome, PanelUpdate};
use crate::cli::{Args, resolve_catalog};
use crate::render::RenderState;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let catalog = resolve_catalog(&args)?;
    catalog.validate()?;

    if args.headless {
        return run_headless(&args, catalog);
    }

    let event_loop = EventLoop::new().context("creating winit event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("atrium portfolio viewer")
            .with_inner_size(PhysicalSize::new(1280, 720))
            .build(&event_loop)
            .context("creating viewer window")?,
    );

    let size = window.inner_size();
    let mut state = RenderState::new(window.clone()).block_on()?;
    let mut shell = App::new(catalog, size.width, size.height);
    if let Some(section) = args.section {
        shell.enter_section(section.into())?;
    }

    let mut last_frame = Instant::now();
    let mut last_cursor = CursorIcon::Default;

    event_loop
        .run(move |event, target| {
            target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => target.exit(),
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                logical_key: Key::Named(NamedKey::Escape),
                                state: ElementState::Pressed,
                                ..
                            },
                        ..
                    } => {
                        if shell.escape() == EscapeOutcome::Unhandled {
                            target.exit();
                        }
                    }
                    WindowEvent::Resized(new_size) => {
                        state.resize(new_size);
                        shell.resize(new_size.width, new_size.height);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        shell.pointer_moved(position.x as f32, position.y as f32);
                    }
                    WindowEvent::MouseInput {
                        state: button_state,
                        button: MouseButton::Left,
                        ..
                    } => match button_state {
                        ElementState::Pressed => shell.pointer_pressed(),
                        ElementState::Released => shell.pointer_released(),
                    },
                    WindowEvent::MouseWheel { delta, .. } => {
                        let amount = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y,
                            MouseScrollDelta::PixelDelta(position) => position.y as f32 / 40.0,
                        };
                        shell.scroll(amount);
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        // Clamp so a stalled frame does not skip animations.
                        let dt = now.duration_since(last_frame).as_secs_f32().min(0.1);
                        last_frame = now;
                        shell.tick(dt);

                        let cursor = shell.cursor();
                        if cursor != last_cursor {
                            last_cursor = cursor;
                            state.window().set_cursor_icon(map_cursor(cursor));
                        }
                        match shell.take_panel_update() {
                            Some(PanelUpdate::Show(canvas)) => state.show_panel(canvas),
                            Some(PanelUpdate::Hide) => state.hide_panel(),
                            None => {}
                        }

                        let frame = shell.frame();
                        match state.render(&frame) {
                            Ok(()) => {}
                            Err(wgpu::SurfaceError::Lost) => state.resize(state.size()),
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                error!("surface out of memory, exiting");
                                target.exit();
                            }
                            Err(err) => warn!("frame dropped: {err}"),
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => state.window().request_redraw(),
                _ => {}
            }
        })
        .context("running viewer event loop")?;
    Ok(())
}

/// Validate the catalog and exercise one section without a window.
fn run_headless(args: &Args, catalog: Catalog) -> Result<()> {
    println!(
        "catalog: {} videos, {} photos, {} contacts",
        catalog.videos.len(),
        catalog.photos.len(),
        catalog.contacts.len()
    );
    let mut shell = App::new(catalog, 1280, 720);
    let section = args
        .section
        .map(SectionKind::from)
        .unwrap_or(SectionKind::Projects);
    shell.enter_section(section)?;
    // Run the entry choreography to rest.
    for _ in 0..240 {
        shell.tick(1.0 / 60.0);
    }
    let frame = shell.frame();
    println!("section '{}': {} instances", section.title(), frame.total());
    Ok(())
}

fn map_cursor(cursor: CursorIcon) -> winit::window::CursorIcon {
    match cursor {
        CursorIcon::Default => winit::window::CursorIcon::Default,
        CursorIcon::Pointer => winit::window::CursorIcon::Pointer,
    }
}
