use ::rand::rngs::StdRng;
use ::rand::SeedableRng;
use arboard::Clipboard;
use argh::FromArgs;
use macroquad::prelude::*;
use museumghosts::config::Config;
use museumghosts::{
    line_of_sight, lookup_cell, visible_region, Arena, FieldOfView, MotionHistory, Partition,
    Point, RaySweep, Segment, Triangle,
};
use simplelog::TermLogger;

/// Interactive visibility demo: the observer follows the mouse
#[derive(Debug, FromArgs)]
struct Options {
    /// verbose level: off, error, warn, info, debug, trace
    #[argh(option)]
    verbose: Option<log::LevelFilter>,
    /// path to the config file
    #[argh(option, default = "String::from(\"config.toml\")")]
    config: String,
    /// load the arena from a JSON file instead of generating one
    #[argh(option)]
    arena: Option<String>,
    /// override the maze seed
    #[argh(option)]
    seed: Option<u64>,
}

/// Everything drawn in a frame, in draw order
enum Drawable {
    Wall(Segment),
    Fan(Triangle),
    CellOutline { upper_left: Point, size: f64 },
    Ghost { at: Point, seen: bool },
    Observer(Point),
}

fn vec2_of(p: Point) -> Vec2 {
    vec2(p.x as f32, p.y as f32)
}

impl Drawable {
    fn draw(&self) {
        match self {
            Drawable::Wall(wall) => {
                let (a, b) = (vec2_of(wall.p1), vec2_of(wall.p2));
                draw_line(a.x, a.y, b.x, b.y, 2.0, Color::from_rgba(220, 220, 220, 255));
            }
            Drawable::Fan(t) => {
                draw_triangle(
                    vec2_of(t.apex),
                    vec2_of(t.b),
                    vec2_of(t.c),
                    Color::from_rgba(240, 230, 140, 90),
                );
            }
            Drawable::CellOutline { upper_left, size } => {
                let s = *size as f32;
                let p = vec2_of(*upper_left);
                draw_rectangle_lines(p.x, p.y, s, s, 1.0, Color::from_rgba(100, 140, 255, 160));
            }
            Drawable::Ghost { at, seen } => {
                let color = if *seen {
                    Color::from_rgba(120, 230, 120, 255)
                } else {
                    Color::from_rgba(90, 90, 110, 255)
                };
                let p = vec2_of(*at);
                draw_circle(p.x, p.y, 6.0, color);
            }
            Drawable::Observer(at) => {
                let p = vec2_of(*at);
                draw_circle(p.x, p.y, 5.0, BLUE);
            }
        }
    }
}

struct DemoState {
    config: Config,
    arena: Arena,
    partition: Option<Partition>,
    ghosts: Vec<Point>,
    history: MotionHistory,
    observer: Point,
}

impl DemoState {
    fn new(config: Config, arena: Arena, partition: Option<Partition>, rng: &mut StdRng) -> Self {
        // Half-unit offset keeps ghosts off the integer grid walls sit on
        let ghosts = (0..config.ghosts.count)
            .map(|_| arena.random_point(rng) + Point::new(0.5, 0.5))
            .filter(|p| arena.contains(*p))
            .collect();
        let history = MotionHistory::new(config.fov.history_seconds);
        let observer = arena.size() / 2.0;

        DemoState {
            config,
            arena,
            partition,
            ghosts,
            history,
            observer,
        }
    }

    fn update(&mut self, mouse: (f32, f32), now: f64) {
        let p = Point::new(mouse.0 as f64, mouse.1 as f64);
        if self.arena.contains(p) {
            self.observer = p;
        }
        self.history.push(now, self.observer);
    }

    /// Wall candidates for the current observer
    fn walls(&self) -> &[Segment] {
        match &self.partition {
            Some(partition) => match lookup_cell(partition, self.observer) {
                Ok(walls) => walls,
                Err(e) => {
                    log::debug!("{}, using all walls", e);
                    self.arena.walls.as_slice()
                }
            },
            None => self.arena.walls.as_slice(),
        }
    }

    fn region(&mut self, now: f64) -> Vec<Triangle> {
        let fov = &self.config.fov;
        if fov.use_sweep() {
            let speed = self.history.average_speed(now);
            let heading = self.history.heading(now);
            let view = FieldOfView::from_motion(speed, heading);
            RaySweep::new(view, fov.angular_step, fov.max_distance).triangles(self.observer, self.walls())
        } else {
            visible_region(self.observer, self.walls())
        }
    }

    fn drawables(&mut self, now: f64) -> Vec<Drawable> {
        let epsilon = self.config.fov.seam_epsilon;
        let mut out: Vec<Drawable> = self
            .region(now)
            .into_iter()
            .map(|t| Drawable::Fan(t.widened(epsilon)))
            .collect();

        out.extend(self.arena.walls.iter().map(|w| Drawable::Wall(*w)));

        if self.config.visual.show_partition {
            if let Some(partition) = &self.partition {
                let cell = partition
                    .cell_index(self.observer)
                    .ok()
                    .and_then(|index| partition.cells.get(index));
                if let Some(cell) = cell {
                    out.push(Drawable::CellOutline {
                        upper_left: cell.key.upper_left,
                        size: partition.cellsize,
                    });
                }
            }
        }

        let walls = self.walls();
        let observer = self.observer;
        out.extend(self.ghosts.iter().map(|g| Drawable::Ghost {
            at: *g,
            seen: line_of_sight(observer, *g, walls),
        }));
        out.push(Drawable::Observer(observer));
        out
    }

    fn copy_to_clipboard(&self) {
        let json = match serde_json::to_string_pretty(&self.arena) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to serialize arena: {}", e);
                return;
            }
        };
        match Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(&json) {
                    log::error!("Failed to copy to clipboard: {}", e);
                } else {
                    log::info!("Arena copied to clipboard");
                    // Keep clipboard alive for a moment so clipboard managers can capture it
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
            Err(e) => {
                log::error!("Failed to access clipboard: {}", e);
            }
        }
    }

    fn draw(&mut self, now: f64) {
        let visual = &self.config.visual;
        clear_background(Color::from_rgba(
            visual.background_r,
            visual.background_g,
            visual.background_b,
            255,
        ));

        let drawables = self.drawables(now);
        let seen = drawables
            .iter()
            .filter(|d| matches!(d, Drawable::Ghost { seen: true, .. }))
            .count();
        for drawable in &drawables {
            drawable.draw();
        }

        let info = format!(
            "Observer: ({:.0}, {:.0})  walls: {}/{}  ghosts seen: {}/{}  C: copy arena  Esc: quit",
            self.observer.x,
            self.observer.y,
            self.walls().len(),
            self.arena.walls.len(),
            seen,
            self.ghosts.len(),
        );
        draw_text(&info, 10.0, 20.0, 20.0, WHITE);
    }
}

fn window_conf() -> Conf {
    // Runs before main, so the options are parsed here as well
    let options: Options = argh::from_env();
    window_settings(&options)
}

fn window_settings(options: &Options) -> Conf {
    let config = Config::load_from(&options.config);
    Conf {
        window_title: config.visual.window_title.clone(),
        window_width: config.arena.width as i32,
        window_height: config.arena.height as i32,
        ..Default::default()
    }
}

fn load_arena(options: &Options, config: &Config, rng: &mut StdRng) -> Result<Arena, String> {
    if let Some(path) = &options.arena {
        let arena = Arena::load_from_file(path)?;
        log::info!("Loaded arena with {} walls from {}", arena.walls.len(), path);
        return Ok(arena);
    }
    let maze = &config.maze;
    let arena = Arena::generate(
        config.arena.width,
        config.arena.height,
        maze.cols,
        maze.rows,
        maze.random_walls,
        rng,
    );
    log::info!("Generated arena with {} walls", arena.walls.len());
    Ok(arena)
}

#[macroquad::main(window_conf)]
async fn main() {
    let options: Options = argh::from_env();
    let config = Config::load_from(&options.config);

    let level = options.verbose.unwrap_or_else(|| config.logging.level_filter());
    if let Err(e) = TermLogger::init(
        level,
        simplelog::ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    let mut rng = StdRng::seed_from_u64(options.seed.unwrap_or(config.maze.seed));
    let arena = match load_arena(&options, &config, &mut rng) {
        Ok(arena) => arena,
        Err(e) => {
            log::error!("{}", e);
            return;
        }
    };

    let partition = if config.partition.enabled {
        let p = &config.partition;
        match Partition::load_or_build(&p.cache_path, &arena, p.cellsize, p.nudge) {
            Ok(partition) => Some(partition),
            Err(e) => {
                log::warn!("No partition, using all walls: {}", e);
                None
            }
        }
    } else {
        None
    };

    let mut state = DemoState::new(config, arena, partition, &mut rng);

    loop {
        let now = get_time();
        state.update(mouse_position(), now);

        // Copy arena to clipboard on C key
        if is_key_pressed(KeyCode::C) {
            state.copy_to_clipboard();
        }

        // Close window on Escape
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        state.draw(now);

        next_frame().await
    }
}
