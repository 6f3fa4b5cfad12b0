//! Desktop preview for the illumination controller
//!
//! Runs the learning controller and the daylight animation against
//! simulated LED chains, a simulated light sensor and a file-backed table
//! store. Time is synthetic, so a simulated day can be played fast.

mod sim;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant as StdInstant, SystemTime, UNIX_EPOCH};

use eframe::egui::{self};
use rlic::matrix::{COLUMNS, ROWS};
use rlic::{
    AnimationEngine, Controller, ControllerConfig, ControllerParts, DayBoundary,
    DaylightTicker, Instant, LearningConfig, Recovery,
};

use sim::{ChainState, FileStorage, SimChain, SimSensor};

/// Period of the daylight animation tick
const TICK_MS: u64 = 250;

/// Period of the learning loop
const ITERATION_MS: u64 = 500;

/// Default location of the table store
const DEFAULT_DATA_PATH: &str = "rlic.dat";

/// Log lines kept in the log panel
const LOG_CAPACITY: usize = 200;

/// Size of each LED rectangle in pixels
const LED_SIZE: f32 = 14.0;

/// Gap between LEDs
const LED_GAP: f32 = 3.0;

/// Day boundary flag shared by the tick and the learning loop
static DAY_BOUNDARY: DayBoundary = DayBoundary::new();

type SimController = Controller<'static, FileStorage, SimSensor, SimChain>;

fn main() -> eframe::Result<()> {
    let data_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DATA_PATH.to_owned());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_title("RLIC Preview"),
        ..Default::default()
    };

    eframe::run_native(
        "rlic-preview",
        options,
        Box::new(|_cc| Ok(Box::new(PreviewApp::new(data_path)))),
    )
}

/// Running controller with its simulated surroundings
struct Simulation {
    controller: SimController,
    ticker: DaylightTicker<'static, SimChain>,
    lamp: SimChain,
    daylight: SimChain,
    next_tick_ms: u64,
    next_iteration_ms: u64,
}

impl Simulation {
    fn start(
        data_path: &str,
        config: &ControllerConfig,
        ambient: &Rc<RefCell<u32>>,
        t_ms: u64,
    ) -> Result<Self, String> {
        let lamp = SimChain::default();
        let daylight = SimChain::default();
        let sensor = SimSensor::new(lamp.clone(), daylight.clone(), Rc::clone(ambient));

        let parts = ControllerParts {
            storage: FileStorage::new(data_path),
            sensor,
            learning_chain: lamp.clone(),
        };
        let mut seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|elapsed| elapsed.subsec_nanos());
        let mut controller = Controller::new(parts, &DAY_BOUNDARY, config, &mut seed);
        if let Err(error) = controller.start() {
            controller.escalate(error);
            return Err(format!("startup failed: {error}"));
        }

        let mut engine = AnimationEngine::new(daylight.clone());
        engine.init();
        DAY_BOUNDARY.raise();

        Ok(Self {
            controller,
            ticker: DaylightTicker::new(engine, &DAY_BOUNDARY),
            lamp,
            daylight,
            next_tick_ms: t_ms,
            next_iteration_ms: t_ms,
        })
    }

    /// Run every tick and iteration due up to `t_ms`, in time order
    fn advance(
        &mut self,
        t_ms: u64,
        log: &mut VecDeque<String>,
        stats: &mut Stats,
    ) -> Result<(), String> {
        loop {
            if self.next_tick_ms <= t_ms && self.next_tick_ms <= self.next_iteration_ms {
                self.ticker.on_tick();
                self.next_tick_ms += TICK_MS;
            } else if self.next_iteration_ms <= t_ms {
                let now = Instant::from_millis(self.next_iteration_ms);
                self.next_iteration_ms += ITERATION_MS;
                match self.controller.run_iteration(now) {
                    Ok(report) => {
                        stats.record(report.reward, report.explored);
                        push_log(log, report.to_string());
                    }
                    Err(error) => {
                        let recovery = self.controller.escalate(error);
                        let message = match recovery {
                            Recovery::ShutdownAndReset => format!("runtime failed: {error}, reset"),
                            Recovery::AbortStartup => format!("runtime failed: {error}"),
                        };
                        return Err(message);
                    }
                }
            } else {
                return Ok(());
            }
        }
    }
}

#[derive(Debug, Default)]
struct Stats {
    iterations: u64,
    explored: u64,
    recent_rewards: VecDeque<u8>,
}

impl Stats {
    const WINDOW: usize = 50;

    fn record(&mut self, reward: u8, explored: bool) {
        self.iterations += 1;
        if explored {
            self.explored += 1;
        }
        if self.recent_rewards.len() == Self::WINDOW {
            self.recent_rewards.pop_front();
        }
        self.recent_rewards.push_back(reward);
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean_reward(&self) -> f32 {
        if self.recent_rewards.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.recent_rewards.iter().map(|reward| u32::from(*reward)).sum();
        sum as f32 / self.recent_rewards.len() as f32
    }
}

/// Simulated clock, scaled from wall time between frames
struct SimClock {
    elapsed: Duration,
    last_frame: StdInstant,
    running: bool,
    speed: f32,
}

impl SimClock {
    /// Longest wall-time gap counted for one frame
    const MAX_FRAME_GAP: Duration = Duration::from_millis(200);

    fn new() -> Self {
        Self {
            elapsed: Duration::ZERO,
            last_frame: StdInstant::now(),
            running: true,
            speed: 1.0,
        }
    }

    /// Account for the wall time since the previous frame, return the
    /// simulated time in milliseconds
    fn tick(&mut self, advance: bool) -> u64 {
        let now = StdInstant::now();
        let gap = now.duration_since(self.last_frame).min(Self::MAX_FRAME_GAP);
        self.last_frame = now;

        if advance && self.running {
            self.elapsed += gap.mul_f32(self.speed.max(0.0));
        }
        self.millis()
    }

    fn millis(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

fn push_log(log: &mut VecDeque<String>, line: String) {
    if log.len() == LOG_CAPACITY {
        log.pop_front();
    }
    log.push_back(line);
}

struct PreviewApp {
    data_path: String,
    simulation: Option<Simulation>,
    /// Reason the simulation stopped
    halted: Option<String>,
    log: VecDeque<String>,
    stats: Stats,
    /// Room light without any LED, in lux
    ambient: Rc<RefCell<u32>>,
    target_lux: u32,
    explore_percent: u8,
    clock: SimClock,
    show_table: bool,
}

impl PreviewApp {
    fn new(data_path: String) -> Self {
        let mut app = Self {
            data_path,
            simulation: None,
            halted: None,
            log: VecDeque::with_capacity(LOG_CAPACITY),
            stats: Stats::default(),
            ambient: Rc::new(RefCell::new(300)),
            target_lux: LearningConfig::default().target_lux,
            explore_percent: 20,
            clock: SimClock::new(),
            show_table: false,
        };
        app.restart();
        app
    }

    fn config(&self) -> ControllerConfig {
        ControllerConfig {
            learning: LearningConfig {
                target_lux: self.target_lux,
                explore_percent: self.explore_percent,
                ..LearningConfig::default()
            },
            ..ControllerConfig::default()
        }
    }

    /// Close the running controller and boot a fresh one
    fn restart(&mut self) {
        if let Some(mut simulation) = self.simulation.take() {
            let _ = simulation.controller.shutdown();
        }
        self.halted = None;
        match Simulation::start(&self.data_path, &self.config(), &self.ambient, self.clock.millis()) {
            Ok(simulation) => {
                push_log(&mut self.log, format!("controller started, tables in {}", self.data_path));
                self.simulation = Some(simulation);
            }
            Err(message) => {
                push_log(&mut self.log, message.clone());
                self.halted = Some(message);
            }
        }
    }

    fn run_simulation(&mut self) {
        let running = self.simulation.is_some();
        let now_ms = self.clock.tick(running);
        let Some(simulation) = self.simulation.as_mut() else {
            return;
        };
        if let Err(message) = simulation.advance(now_ms, &mut self.log, &mut self.stats) {
            push_log(&mut self.log, message.clone());
            self.halted = Some(message);
            self.simulation = None;
        }
    }
}

fn draw_matrix(ui: &mut egui::Ui, title: &str, chain: &ChainState, lit: egui::Color32) {
    ui.vertical(|ui| {
        ui.label(format!(
            "{title}: {} lit, dimming {}",
            chain.lit_count(),
            chain.dimming
        ));

        let pitch = LED_SIZE + LED_GAP;
        #[allow(clippy::cast_precision_loss)]
        let size = egui::vec2(COLUMNS as f32 * pitch, f32::from(ROWS) * pitch);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
        let origin = response.rect.min;

        let level = f32::from(chain.dimming + 1) / 16.0;
        let on = lit.gamma_multiply(0.25 + 0.75 * level);
        let off = egui::Color32::from_gray(40);

        #[allow(clippy::cast_precision_loss)]
        for column in 0..COLUMNS {
            for row in 0..usize::from(ROWS) {
                let x = origin.x + column as f32 * pitch;
                // row 0 at the bottom
                let y = origin.y + (usize::from(ROWS) - 1 - row) as f32 * pitch;
                let rect = egui::Rect::from_min_size(egui::pos2(x, y), egui::vec2(LED_SIZE, LED_SIZE));
                let color = if chain.is_lit(column, row) { on } else { off };
                painter.rect_filled(rect, 3.0, color);
            }
        }
    });
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.run_simulation();

        ctx.request_repaint();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        if ui.button("Restart controller").clicked() {
                            self.restart();
                        }
                        let label = if self.clock.running { "Pause" } else { "Run" };
                        if ui.button(label).clicked() {
                            self.clock.running = !self.clock.running;
                        }
                    });

                    ui.add_space(4.0);
                    ui.label(format!("Simulated: {:.1} s", self.clock.elapsed.as_secs_f32()));
                    ui.add_space(4.0);

                    ui.horizontal(|ui| {
                        ui.label("Speed:");
                        ui.add(egui::Slider::new(&mut self.clock.speed, 0.1..=50.0).logarithmic(true).suffix("x"));
                    });
                });

                ui.add_space(16.0);

                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label("Room light:");
                        ui.add(egui::Slider::new(&mut *self.ambient.borrow_mut(), 0..=6000).suffix(" lx"));
                    });

                    ui.add_space(4.0);

                    ui.horizontal(|ui| {
                        ui.label("Target:");
                        ui.add(egui::DragValue::new(&mut self.target_lux).range(0..=20_000));
                        ui.label("Explore:");
                        ui.add(egui::DragValue::new(&mut self.explore_percent).range(0..=100).suffix(" %"));
                    });
                    ui.label("Target and explore rate apply on restart");
                });
            });

            ui.add_space(16.0);

            if let Some(message) = &self.halted {
                ui.colored_label(egui::Color32::LIGHT_RED, message);
                ui.add_space(8.0);
            }

            if let Some(simulation) = &self.simulation {
                ui.horizontal(|ui| {
                    draw_matrix(
                        ui,
                        "Daylight",
                        &simulation.daylight.snapshot(),
                        egui::Color32::from_rgb(255, 200, 80),
                    );
                    ui.add_space(24.0);
                    draw_matrix(
                        ui,
                        "Lamp",
                        &simulation.lamp.snapshot(),
                        egui::Color32::from_rgb(180, 220, 255),
                    );
                });

                ui.add_space(8.0);

                let sensor = simulation.controller.sensor();
                let learning = simulation.controller.learning();
                ui.label(format!(
                    "Sensor: {} lx   Phase: {:?}   Slot: {}   Iterations: {}   Explored: {}   Mean reward: {:.2}",
                    sensor.lux(),
                    simulation.ticker.engine().cycle().phase(),
                    learning
                        .loaded_slot()
                        .map_or_else(|| "-".to_owned(), |slot| slot.to_string()),
                    self.stats.iterations,
                    self.stats.explored,
                    self.stats.mean_reward(),
                ));

                ui.checkbox(&mut self.show_table, "Show table of the current slot");
                if self.show_table {
                    egui::ScrollArea::both()
                        .id_salt("table")
                        .max_height(160.0)
                        .show(ui, |ui| {
                            ui.monospace(learning.table().to_string());
                        });
                }
            }

            ui.add_space(8.0);
            ui.label("Log:");
            egui::ScrollArea::vertical()
                .id_salt("log")
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for line in &self.log {
                        ui.monospace(line);
                    }
                });
        });
    }
}
