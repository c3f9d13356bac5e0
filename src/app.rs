use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;

use crate::controller::Controller;
use crate::services::api_client::Backend;
use crate::services::preferences::PreferenceStore;
use crate::ui::hit_map::HitMap;
use crate::ui::render;
use crate::utils::config::Config;

/// Terminal front end: feeds input to the controller and draws its state.
pub struct App {
    controller: Controller,
    hits: HitMap,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        backend: Arc<dyn Backend>,
        preferences: Box<dyn PreferenceStore>,
    ) -> Self {
        let mut controller = Controller::new(config, backend, preferences);
        log::info!("Application initialized, loading initial status...");
        controller.refresh_status();
        Self {
            controller,
            hits: HitMap::new(),
            should_quit: false,
        }
    }

    /// Settle finished requests, then wait briefly for one input event.
    /// Returns true when the user asked to quit.
    pub fn handle_events(&mut self) -> Result<bool> {
        self.controller.poll();

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    if self.controller.handle_key(key) {
                        log::info!("Quit requested");
                        self.should_quit = true;
                    }
                }
                Event::Mouse(mouse) => self.handle_mouse(mouse),
                Event::Resize(_, height) => {
                    self.controller.set_table_rows(render::table_rows(height));
                }
                _ => {}
            }
        }

        Ok(self.should_quit)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(hit) = self.hits.hit_at(mouse.column, mouse.row).cloned() {
                    log::debug!("Click at {},{} -> {:?}", mouse.column, mouse.row, hit);
                    self.controller.click(&hit);
                }
            }
            MouseEventKind::ScrollDown => self.controller.scroll(true),
            MouseEventKind::ScrollUp => self.controller.scroll(false),
            _ => {}
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        self.controller.set_table_rows(render::table_rows(frame.size().height));
        render::draw(frame, &self.controller, &mut self.hits);
    }
}
