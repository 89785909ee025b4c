//! Game session: owns the state record and advances it one step at a time.

use std::time::Duration;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::high_score::HighScoreStore;
use crate::input::{Command, Enqueue};
use crate::levels::LevelTable;
use crate::state::{Cause, GameState, Phase, Snapshot};
use crate::{Direction, Point};

/// UI-agnostic result of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// Not running; nothing changed.
    Idle,
    Moved,
    Ate { level_up: bool, sped_up: bool },
    GameOver(Cause),
}

pub struct Session {
    cfg: GameConfig,
    levels: LevelTable,
    state: GameState,
    rng: ChaCha8Rng,
    high_score: u32,
    store: Box<dyn HighScoreStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("cfg", &self.cfg)
            .field("state", &self.state)
            .field("high_score", &self.high_score)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session with the built-in levels and a non-deterministic seed.
    pub fn new(cfg: GameConfig, store: Box<dyn HighScoreStore>) -> Result<Self, ConfigError> {
        let levels = LevelTable::classic(cfg.grid_size);
        Self::with_rng(cfg, levels, store, ChaCha8Rng::from_os_rng())
    }

    pub fn with_seed(
        cfg: GameConfig,
        store: Box<dyn HighScoreStore>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let levels = LevelTable::classic(cfg.grid_size);
        Self::with_rng(cfg, levels, store, ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn with_rng(
        cfg: GameConfig,
        levels: LevelTable,
        store: Box<dyn HighScoreStore>,
        mut rng: ChaCha8Rng,
    ) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let start: Vec<Point> = cfg.initial_worm().collect();
        levels.validate(cfg.grid_size, &start)?;

        let high_score = store.load();
        let state = GameState::fresh(&cfg, &levels, &mut rng);
        Ok(Self {
            cfg,
            levels,
            state,
            rng,
            high_score,
            store,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.cfg
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Current step interval.
    pub fn interval(&self) -> Duration {
        self.state.interval
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            grid_size: self.cfg.grid_size,
            worm: &self.state.worm,
            food: self.state.food,
            obstacles: &self.state.obstacles,
            score: self.state.score,
            high_score: self.high_score,
            level: self.state.level,
            phase: self.state.phase,
            cause: self.state.cause,
        }
    }

    /// Feed a raw key name. Unknown keys are ignored.
    pub fn submit_key(&mut self, key: &str) {
        if let Some(cmd) = Command::from_key(key) {
            self.submit(cmd);
        }
    }

    pub fn submit(&mut self, cmd: Command) {
        match cmd {
            Command::TogglePause => self.toggle_pause(),
            Command::Turn(dir) => self.queue_direction(dir),
        }
    }

    /// Buffer a turn for an upcoming step. Dropped after game over, and while
    /// paused unless `queue_while_paused` is set.
    pub fn queue_direction(&mut self, dir: Direction) {
        match self.state.phase {
            Phase::GameOver => return,
            Phase::Paused if !self.cfg.queue_while_paused => return,
            _ => {}
        }
        let outcome = self.state.queue.push(dir, self.state.direction);
        if outcome != Enqueue::Queued {
            debug!("dropped {dir:?}: {outcome:?}");
        }
    }

    pub fn start(&mut self) {
        if self.state.phase == Phase::Ready {
            self.state.phase = Phase::Running;
        }
    }

    pub fn toggle_pause(&mut self) {
        self.state.phase = match self.state.phase {
            Phase::Running => Phase::Paused,
            Phase::Paused => Phase::Running,
            other => other,
        };
    }

    /// Rebuild every piece of state from scratch and start running.
    pub fn restart(&mut self) {
        self.state = GameState::fresh(&self.cfg, &self.levels, &mut self.rng);
        self.state.phase = Phase::Running;
        info!("restarted");
    }

    /// Advance the simulation by one step.
    pub fn step(&mut self) -> StepResult {
        if self.state.phase != Phase::Running {
            return StepResult::Idle;
        }

        // Re-check reversal: the queue validated against its own tail, which
        // may have been stale by the time this turn is applied.
        if let Some(next) = self.state.queue.pop() {
            if !next.is_opposite(self.state.direction) {
                self.state.direction = next;
            }
        }

        let next_head = self.state.head().step(self.state.direction);

        if let Some(cause) = self.collision(next_head) {
            return self.game_over(cause);
        }

        self.state.worm.push_front(next_head);

        if next_head != self.state.food {
            self.state.worm.pop_back();
            return StepResult::Moved;
        }

        self.state.score += 1;
        self.state.level_food += 1;
        self.record_high_score();

        let level_up = self.state.level_food >= self.cfg.food_per_level;
        if level_up {
            self.state.level += 1;
            self.state.level_food = 0;
            self.state.load_level(&self.levels);
            info!("level {} reached", self.state.level);
        }

        let sped_up = self.speed_up();

        // Sampled after any level change so it avoids the new obstacles too.
        self.state.spawn_food(self.cfg.grid_size, &mut self.rng);

        StepResult::Ate { level_up, sped_up }
    }

    fn collision(&self, cell: Point) -> Option<Cause> {
        if !cell.in_grid(self.cfg.grid_size) {
            Some(Cause::Boundary)
        } else if self.state.obstacles.contains(&cell) {
            Some(Cause::Obstacle)
        } else if self.state.worm.contains(&cell) {
            Some(Cause::SelfCollision)
        } else {
            None
        }
    }

    /// Shrink the interval on every `speed_up_every`-th point, down to the floor.
    fn speed_up(&mut self) -> bool {
        if self.state.score % self.cfg.speed_up_every != 0 {
            return false;
        }
        let next = self
            .state
            .interval
            .saturating_sub(self.cfg.speed_step)
            .max(self.cfg.min_interval);
        if next == self.state.interval {
            return false;
        }
        self.state.interval = next;
        info!("step interval now {}ms", next.as_millis());
        true
    }

    fn game_over(&mut self, cause: Cause) -> StepResult {
        self.state.phase = Phase::GameOver;
        self.state.cause = Some(cause);
        info!("game over ({cause}) with score {}", self.state.score);
        StepResult::GameOver(cause)
    }

    /// Track the live score as the best once it passes it, saving each time.
    fn record_high_score(&mut self) {
        if self.state.score <= self.high_score {
            return;
        }
        self.high_score = self.state.score;
        debug!("new high score {}", self.high_score);
        if let Err(e) = self.store.save(self.high_score) {
            warn!("could not save high score: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::high_score::MemoryStore;
    use std::collections::HashSet;

    fn base_session(cfg: GameConfig) -> Session {
        let levels = LevelTable::classic(cfg.grid_size);
        let mut s = Session::with_rng(
            cfg,
            levels,
            Box::new(MemoryStore::default()),
            ChaCha8Rng::seed_from_u64(42),
        )
        .unwrap();
        s.start();
        s
    }

    fn open_session() -> Session {
        let mut s = base_session(GameConfig::default());
        // Keep food away from the worm's path unless a test places it.
        s.state.food = Point::new(0, 0);
        s
    }

    fn worm(s: &Session) -> Vec<Point> {
        s.state.worm.iter().copied().collect()
    }

    /// Put food directly ahead and step onto it.
    fn eat_ahead(s: &mut Session) -> StepResult {
        s.state.food = s.state.head().step(s.state.direction);
        s.step()
    }

    #[test]
    fn step_moves_head_and_drops_tail() {
        let mut s = open_session();
        assert_eq!(
            worm(&s),
            vec![Point::new(10, 10), Point::new(9, 10), Point::new(8, 10)]
        );
        assert_eq!(s.step(), StepResult::Moved);
        assert_eq!(
            worm(&s),
            vec![Point::new(11, 10), Point::new(10, 10), Point::new(9, 10)]
        );
    }

    #[test]
    fn queued_turn_applies_on_the_next_step_only() {
        let mut s = open_session();
        s.queue_direction(Direction::Up);
        assert_eq!(s.state.queue.len(), 1);
        s.step();
        assert_eq!(s.state.head(), Point::new(10, 9));
        s.step();
        assert_eq!(s.state.head(), Point::new(10, 8));
        assert_eq!(worm(&s), vec![Point::new(10, 8), Point::new(10, 9), Point::new(10, 10)]);
    }

    #[test]
    fn one_turn_consumed_per_step() {
        let mut s = open_session();
        s.queue_direction(Direction::Up);
        s.queue_direction(Direction::Left);
        s.step();
        assert_eq!(s.state.direction, Direction::Up);
        assert_eq!(s.state.queue.len(), 1);
        s.step();
        assert_eq!(s.state.direction, Direction::Left);
        assert_eq!(s.state.head(), Point::new(9, 9));
    }

    #[test]
    fn reversal_is_never_queued() {
        let mut s = open_session();
        s.queue_direction(Direction::Left);
        assert!(s.state.queue.is_empty());
        assert_eq!(s.step(), StepResult::Moved);
        assert_eq!(s.state.direction, Direction::Right);
    }

    #[test]
    fn stale_reversal_is_ignored_at_step_time() {
        let mut s = open_session();
        // Slip a reversal past the queue check.
        s.state.queue.push(Direction::Left, Direction::Left);
        s.step();
        assert_eq!(s.state.direction, Direction::Right);
        assert_eq!(s.state.head(), Point::new(11, 10));
    }

    #[test]
    fn eating_grows_and_scores() {
        let mut s = open_session();
        let res = eat_ahead(&mut s);
        assert_eq!(
            res,
            StepResult::Ate {
                level_up: false,
                sped_up: false
            }
        );
        assert_eq!(s.score(), 1);
        assert_eq!(s.state.worm.len(), 4);
        assert!(!s.state.worm.contains(&s.state.food));
        assert!(!s.state.obstacles.contains(&s.state.food));
    }

    #[test]
    fn wall_collision_ends_game() {
        let mut s = open_session();
        s.state.worm = [Point::new(19, 3), Point::new(18, 3), Point::new(17, 3)].into();
        assert_eq!(s.step(), StepResult::GameOver(Cause::Boundary));
        assert_eq!(s.phase(), Phase::GameOver);
        assert_eq!(s.step(), StepResult::Idle);
        assert_eq!(s.state.head(), Point::new(19, 3));
    }

    #[test]
    fn obstacle_collision_ends_game() {
        let mut s = open_session();
        s.state.obstacles.insert(Point::new(11, 10));
        assert_eq!(s.step(), StepResult::GameOver(Cause::Obstacle));
        assert_eq!(s.state.cause, Some(Cause::Obstacle));
    }

    #[test]
    fn boundary_reported_before_other_causes() {
        let mut s = open_session();
        s.state.worm = [Point::new(0, 4), Point::new(1, 4), Point::new(2, 4)].into();
        s.state.direction = Direction::Left;
        assert_eq!(s.step(), StepResult::GameOver(Cause::Boundary));
    }

    #[test]
    fn self_collision_ends_game() {
        let mut s = open_session();
        // A hook shape whose next cell (up) is its own body.
        s.state.worm = [
            Point::new(5, 5),
            Point::new(6, 5),
            Point::new(6, 4),
            Point::new(5, 4),
            Point::new(4, 4),
        ]
        .into();
        s.state.direction = Direction::Left;
        s.queue_direction(Direction::Up);
        assert_eq!(s.step(), StepResult::GameOver(Cause::SelfCollision));
        assert_eq!(s.state.worm.len(), 5);
    }

    #[test]
    fn moving_onto_the_tail_cell_collides() {
        let mut s = open_session();
        // 2x2 loop: head at (5,5), tail at (5,6) directly below.
        s.state.worm = [
            Point::new(5, 5),
            Point::new(6, 5),
            Point::new(6, 6),
            Point::new(5, 6),
        ]
        .into();
        s.state.direction = Direction::Left;
        s.queue_direction(Direction::Down);
        assert_eq!(s.step(), StepResult::GameOver(Cause::SelfCollision));
    }

    #[test]
    fn speed_up_every_five_points_until_floor() {
        let cfg = GameConfig {
            grid_size: 40,
            initial_interval: Duration::from_millis(80),
            speed_step: Duration::from_millis(15),
            min_interval: Duration::from_millis(60),
            food_per_level: 100,
            ..GameConfig::default()
        };
        let mut s = base_session(cfg);
        let mut seen = Vec::new();
        for _ in 0..15 {
            if let StepResult::Ate { sped_up, .. } = eat_ahead(&mut s) {
                seen.push((s.score(), sped_up, s.interval().as_millis()));
            }
        }
        assert_eq!(s.score(), 15);
        assert_eq!(seen[3], (4, false, 80));
        assert_eq!(seen[4], (5, true, 65));
        // 65 - 15 would undershoot: clamp to the floor.
        assert_eq!(seen[9], (10, true, 60));
        assert_eq!(seen[14], (15, false, 60));
    }

    #[test]
    fn level_advances_after_threshold() {
        let cfg = GameConfig {
            grid_size: 30,
            ..GameConfig::default()
        };
        let mut s = base_session(cfg);
        for i in 1..10 {
            let res = eat_ahead(&mut s);
            assert!(matches!(res, StepResult::Ate { level_up: false, .. }), "food {i}");
        }
        assert_eq!(s.state.level_food, 9);
        let res = eat_ahead(&mut s);
        assert!(matches!(res, StepResult::Ate { level_up: true, .. }));
        assert_eq!(s.state.level, 2);
        assert_eq!(s.state.level_food, 0);
        let expected: HashSet<Point> = s.levels.obstacles(2).iter().copied().collect();
        assert_eq!(s.state.obstacles, expected);
        assert!(!s.state.obstacles.contains(&s.state.food));
        assert!(!s.state.worm.contains(&s.state.food));
    }

    #[test]
    fn levels_beyond_the_table_keep_the_last_layout() {
        let cfg = GameConfig {
            grid_size: 30,
            food_per_level: 1,
            ..GameConfig::default()
        };
        let mut s = base_session(cfg);
        // Obstacles from later levels would sit in the worm's path; clear the
        // table down to open fields plus one distinct last layout.
        s.levels = LevelTable::new(vec![vec![], vec![Point::new(0, 29)]]);
        for _ in 0..4 {
            eat_ahead(&mut s);
        }
        assert_eq!(s.state.level, 5);
        assert_eq!(
            s.state.obstacles,
            HashSet::from([Point::new(0, 29)])
        );
    }

    #[test]
    fn pause_blocks_steps_but_keeps_queueing() {
        let mut s = open_session();
        s.submit_key("p");
        assert_eq!(s.phase(), Phase::Paused);
        assert_eq!(s.step(), StepResult::Idle);
        s.submit_key("ArrowDown");
        assert_eq!(s.state.queue.len(), 1);
        s.submit_key("p");
        assert_eq!(s.phase(), Phase::Running);
        s.step();
        assert_eq!(s.state.head(), Point::new(10, 11));
    }

    #[test]
    fn pause_can_drop_input_when_configured() {
        let mut s = base_session(GameConfig {
            queue_while_paused: false,
            ..GameConfig::default()
        });
        s.toggle_pause();
        s.submit_key("k");
        assert!(s.state.queue.is_empty());
    }

    #[test]
    fn input_after_game_over_is_ignored() {
        let mut s = open_session();
        s.state.obstacles.insert(Point::new(11, 10));
        s.step();
        s.submit_key("ArrowUp");
        s.submit_key("p");
        assert!(s.state.queue.is_empty());
        assert_eq!(s.phase(), Phase::GameOver);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut s = open_session();
        s.submit_key("F5");
        s.submit_key("x");
        assert!(s.state.queue.is_empty());
        assert_eq!(s.phase(), Phase::Running);
    }

    #[test]
    fn ready_waits_for_start() {
        let levels = LevelTable::classic(20);
        let mut s = Session::with_rng(
            GameConfig::default(),
            levels,
            Box::new(MemoryStore::default()),
            ChaCha8Rng::seed_from_u64(1),
        )
        .unwrap();
        assert_eq!(s.phase(), Phase::Ready);
        assert_eq!(s.step(), StepResult::Idle);
        s.toggle_pause();
        assert_eq!(s.phase(), Phase::Ready);
        s.start();
        assert_eq!(s.phase(), Phase::Running);
    }

    #[test]
    fn restart_resets_everything() {
        let first = HashSet::from([Point::new(0, 0), Point::new(29, 29)]);
        let levels = LevelTable::new(vec![
            first.iter().copied().collect(),
            vec![Point::new(0, 29)],
            vec![Point::new(29, 0)],
        ]);
        let mut s = Session::with_rng(
            GameConfig {
                grid_size: 30,
                food_per_level: 2,
                ..GameConfig::default()
            },
            levels,
            Box::new(MemoryStore::default()),
            ChaCha8Rng::seed_from_u64(42),
        )
        .unwrap();
        s.start();
        assert_eq!(s.state.obstacles, first);
        for _ in 0..5 {
            eat_ahead(&mut s);
        }
        assert_eq!(s.state.level, 3);
        assert_eq!(s.state.obstacles, HashSet::from([Point::new(29, 0)]));
        s.queue_direction(Direction::Up);
        s.state.obstacles.insert(s.state.head().step(Direction::Up));
        s.step();
        assert_eq!(s.phase(), Phase::GameOver);
        assert_eq!(s.high_score(), 5);

        s.restart();
        assert_eq!(s.phase(), Phase::Running);
        assert_eq!(s.score(), 0);
        assert_eq!(s.high_score(), 5);
        assert_eq!(s.state.level, 1);
        assert_eq!(s.state.level_food, 0);
        assert_eq!(s.interval(), s.cfg.initial_interval);
        assert_eq!(s.state.direction, Direction::Right);
        assert!(s.state.queue.is_empty());
        assert_eq!(s.state.obstacles, first);
        assert_eq!(s.state.cause, None);
        assert_eq!(
            worm(&s),
            vec![Point::new(15, 15), Point::new(14, 15), Point::new(13, 15)]
        );
    }

    #[test]
    fn high_score_tracks_live_score_and_is_saved_mid_game() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hs.txt");
        std::fs::write(&path, "1").unwrap();
        let mut s = Session::with_rng(
            GameConfig::default(),
            LevelTable::classic(20),
            Box::new(crate::high_score::FileStore::new(&path)),
            ChaCha8Rng::seed_from_u64(13),
        )
        .unwrap();
        s.start();

        eat_ahead(&mut s);
        assert_eq!(s.snapshot().high_score, 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1");

        eat_ahead(&mut s);
        assert_eq!(s.phase(), Phase::Running);
        assert_eq!(s.high_score(), 2);
        assert_eq!(s.snapshot().high_score, 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "2");

        // Dropping the session mid-run keeps the record.
        drop(s);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "2");
    }

    #[test]
    fn level_up_leaves_cells_under_the_worm_open() {
        let cfg = GameConfig {
            grid_size: 30,
            food_per_level: 1,
            ..GameConfig::default()
        };
        let mut s = base_session(cfg);
        // Level 2 walls cover the worm's row, including where the head lands.
        let row: Vec<Point> = (10..20).map(|x| Point::new(x, 15)).collect();
        s.levels = LevelTable::new(vec![vec![], row]);
        let res = eat_ahead(&mut s);
        assert!(matches!(res, StepResult::Ate { level_up: true, .. }));
        assert_eq!(s.state.head(), Point::new(16, 15));
        for p in &s.state.worm {
            assert!(!s.state.obstacles.contains(p), "wall under {p:?}");
        }
        let expected: HashSet<Point> = [10, 11, 12, 17, 18, 19]
            .into_iter()
            .map(|x| Point::new(x, 15))
            .collect();
        assert_eq!(s.state.obstacles, expected);
        assert_eq!(s.step(), StepResult::GameOver(Cause::Obstacle));
    }

    #[test]
    fn high_score_only_saved_when_beaten() {
        let levels = LevelTable::classic(20);
        let mut s = Session::with_rng(
            GameConfig::default(),
            levels,
            Box::new(MemoryStore { best: 3 }),
            ChaCha8Rng::seed_from_u64(9),
        )
        .unwrap();
        assert_eq!(s.high_score(), 3);
        s.start();
        s.state.food = Point::new(0, 0);
        s.state.obstacles.insert(Point::new(11, 10));
        s.step();
        assert_eq!(s.high_score(), 3);
        assert_eq!(s.snapshot().high_score, 3);
    }

    #[test]
    fn new_high_score_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hs.txt");
        let mut s = Session::with_rng(
            GameConfig::default(),
            LevelTable::classic(20),
            Box::new(crate::high_score::FileStore::new(&path)),
            ChaCha8Rng::seed_from_u64(11),
        )
        .unwrap();
        s.start();
        eat_ahead(&mut s);
        eat_ahead(&mut s);
        s.state.obstacles.insert(s.state.head().step(Direction::Right));
        assert_eq!(s.step(), StepResult::GameOver(Cause::Obstacle));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "2");
    }

    #[test]
    fn rejects_invalid_setup() {
        let err = Session::with_seed(
            GameConfig {
                grid_size: 3,
                ..GameConfig::default()
            },
            Box::new(MemoryStore::default()),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::GridTooSmall { .. }));

        let blocked = LevelTable::new(vec![vec![Point::new(9, 10)]]);
        let err = Session::with_rng(
            GameConfig::default(),
            blocked,
            Box::new(MemoryStore::default()),
            ChaCha8Rng::seed_from_u64(0),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::StartBlocked(Point::new(9, 10)));
    }
}
