use crate::config::{save_settings_atomic, Paths, Settings};
use crate::hud::{draw_center_box, draw_status_panel, status_lines, HELP_TEXT};
use crate::input::{collect_input_nonblocking, map_event_to_command, Command, Overlay};
use crate::model::PlantState;
use crate::render::{render, RenderMode, Scene};
use crate::sim::{self, PlantAction};
use crate::stages::{stage_index, stage_name};
use crate::storage::{load_or_fresh, JsonFileStore, PlantStore};
use crate::term::{scene_size, scene_to_cells, Terminal};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Plant, settings, and persistence, without any terminal attached.
pub(crate) struct Session<S: PlantStore> {
    pub(crate) settings: Settings,
    settings_path: Option<PathBuf>,
    pub(crate) plant: PlantState,
    store: S,
}

impl<S: PlantStore> Session<S> {
    pub(crate) fn start(
        store: S,
        settings: Settings,
        settings_path: Option<PathBuf>,
        reset: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let (loaded, found) = load_or_fresh(&store, now);
        let plant = if reset {
            info!("starting over on request");
            sim::reset(now)
        } else if found {
            let away = (now - loaded.last_tick_at).max(chrono::Duration::zero());
            info!(
                growth = loaded.growth,
                away_secs = away.num_seconds(),
                "loaded plant, catching up"
            );
            // Time spent away always counts at real speed.
            sim::advance(&loaded, now, 1.0)
        } else {
            info!("no saved plant, planting a new seed");
            loaded
        };

        let mut session = Self {
            settings,
            settings_path,
            plant: plant.clone(),
            store,
        };
        session.commit(plant);
        session
    }

    fn commit(&mut self, next: PlantState) {
        let before = stage_index(self.plant.growth);
        let after = stage_index(next.growth);
        if after != before {
            info!(
                from = stage_name(before),
                to = stage_name(after),
                growth = next.growth,
                "stage changed"
            );
        }
        if let Err(err) = self.store.save(&next) {
            warn!(%err, "failed to save plant");
        }
        self.plant = next;
    }

    pub(crate) fn tick(&mut self, now: DateTime<Utc>) {
        let next = sim::advance(&self.plant, now, self.settings.time_scale());
        self.commit(next);
    }

    pub(crate) fn act(&mut self, action: PlantAction, now: DateTime<Utc>) {
        debug!(?action, "player action");
        let next = sim::dispatch(&self.plant, action, now, self.settings.time_scale());
        self.commit(next);
    }

    pub(crate) fn toggle_fast(&mut self, now: DateTime<Utc>) {
        // settle elapsed time at the speed it was spent
        self.tick(now);
        self.settings.fast_mode = !self.settings.fast_mode;
        info!(fast = self.settings.fast_mode, "time scale changed");
        self.save_settings();
    }

    pub(crate) fn toggle_text(&mut self) {
        self.settings.text_mode = !self.settings.text_mode;
        self.save_settings();
    }

    pub(crate) fn save_settings(&self) {
        if let Some(path) = &self.settings_path {
            if let Err(err) = save_settings_atomic(path, &self.settings) {
                warn!(%err, "failed to save settings");
            }
        }
    }

    pub(crate) fn scene(&self, mode: RenderMode) -> Scene {
        render(stage_index(self.plant.growth), &self.plant, mode)
    }
}

pub(crate) struct App {
    session: Session<JsonFileStore>,
    term: Terminal,
    overlay: Overlay,
    should_quit: bool,
}

impl App {
    fn init(paths: &Paths, settings: Settings, reset: bool) -> anyhow::Result<Self> {
        let store = JsonFileStore::new(&paths.save_path);
        let session = Session::start(
            store,
            settings,
            Some(paths.settings_path.clone()),
            reset,
            Utc::now(),
        );
        let term = Terminal::begin()?;
        Ok(Self {
            session,
            term,
            overlay: Overlay::None,
            should_quit: false,
        })
    }

    fn handle(&mut self, cmd: Command) {
        let now = Utc::now();
        match cmd {
            Command::Act(action) => {
                self.session.act(action, now);
                self.overlay = Overlay::None;
            }
            Command::AskReset => self.overlay = Overlay::ConfirmReset,
            Command::ToggleText => self.session.toggle_text(),
            Command::ToggleFast => self.session.toggle_fast(now),
            Command::HelpToggle => self.overlay = Overlay::Help,
            Command::Back => self.overlay = Overlay::None,
            Command::Quit => self.should_quit = true,
        }
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let result = self.run_loop();
        self.session.tick(Utc::now());
        self.session.save_settings();
        self.term.end()?;
        result
    }

    fn run_loop(&mut self) -> anyhow::Result<()> {
        let fps = self.session.settings.fps_cap.clamp(5, 120);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        let mut next_tick = Instant::now() + self.session.settings.tick_interval();

        while !self.should_quit {
            let frame_start = Instant::now();
            if self.term.resize_if_needed()? {
                debug!(cols = self.term.cols, rows = self.term.rows, "resized");
            }

            for ev in collect_input_nonblocking(frame_dt)? {
                if let Some(cmd) = map_event_to_command(self.overlay, &ev) {
                    self.handle(cmd);
                }
                if self.should_quit {
                    break;
                }
            }

            if Instant::now() >= next_tick {
                self.session.tick(Utc::now());
                next_tick = Instant::now() + self.session.settings.tick_interval();
            }

            self.render_frame()?;
            spin_sleep(frame_dt, frame_start);
        }
        Ok(())
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let now = Utc::now();
        self.term.cur.clear();

        let cols = self.term.cols;
        let rows = self.term.rows;
        let panel_w = (cols / 2).min(34);

        let scene = self.session.scene(self.session.settings.render_mode());
        let (sw, sh) = scene_size(&scene);
        let x0 = panel_w + (cols - panel_w).saturating_sub(sw) / 2;
        let y0 = rows.saturating_sub(sh) / 2;
        scene_to_cells(
            &scene,
            &mut self.term.cur,
            x0,
            y0,
            self.session.settings.enable_color,
        );

        draw_status_panel(
            &mut self.term.cur,
            &self.session.plant,
            now,
            &self.session.settings,
        );

        match self.overlay {
            Overlay::None => {}
            Overlay::Help => draw_center_box(&mut self.term.cur, "How to grow", HELP_TEXT),
            Overlay::ConfirmReset => draw_center_box(
                &mut self.term.cur,
                "Start over?",
                "This throws away your plant and plants a new seed.\n\n\
                 Y to reset, any other key to keep it.",
            ),
        }

        self.term.present(true)?;
        Ok(())
    }
}

pub(crate) fn run(paths: &Paths, settings: Settings, reset: bool) -> anyhow::Result<()> {
    let mut app = App::init(paths, settings, reset)?;
    app.run()
}

/// Advances and saves once, then prints the ASCII scene and status.
pub(crate) fn snapshot(paths: &Paths, settings: Settings, reset: bool) -> anyhow::Result<()> {
    let now = Utc::now();
    let store = JsonFileStore::new(&paths.save_path);
    let session = Session::start(
        store,
        settings,
        Some(paths.settings_path.clone()),
        reset,
        now,
    );
    session.save_settings();
    if let Scene::Text(grid) = session.scene(RenderMode::Text) {
        for line in grid.lines() {
            println!("{}", line.trim_end());
        }
    }
    for line in status_lines(&session.plant, now, &session.settings) {
        println!("{line}");
    }
    Ok(())
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, start: Instant) {
    let end = start + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
