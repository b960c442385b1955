//! The orchestrator: one input event, one simulation tick and one frame per
//! step, with the side effects the session asks for.

use std::io;
use std::thread;
use std::time::Instant;

use crate::audio::{AudioSink, Sound};
use crate::config::TICK;
use crate::highscore::HighScoreStore;
use crate::input::{Action, InputEvent, InputSource};
use crate::render::{Renderer, draw_session};
use crate::session::{GameEvent, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Game<R: Renderer, I: InputSource> {
    session: Session,
    renderer: R,
    input: I,
    audio: Box<dyn AudioSink>,
    scores: Box<dyn HighScoreStore>,
}

impl<R: Renderer, I: InputSource> Game<R, I> {
    pub fn new(
        session: Session,
        renderer: R,
        input: I,
        audio: Box<dyn AudioSink>,
        scores: Box<dyn HighScoreStore>,
    ) -> Self {
        Self {
            session,
            renderer,
            input,
            audio,
            scores,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn is_muted(&self) -> bool {
        self.audio.is_muted()
    }

    /// Run at the fixed tick rate until the player quits.
    pub fn run(&mut self) -> io::Result<()> {
        self.draw()?;
        loop {
            let frame_start = Instant::now();

            if self.step()? == Flow::Quit {
                return Ok(());
            }

            // Frame pacing
            let elapsed = frame_start.elapsed();
            if elapsed < TICK {
                thread::sleep(TICK - elapsed);
            }
        }
    }

    /// One tick. Blocks in the game-over screen when the run ends.
    pub fn step(&mut self) -> io::Result<Flow> {
        if let Some(event) = self.input.poll() {
            match event {
                InputEvent::Key { action, raw } => {
                    log::trace!("key {raw:?} -> {action:?}");
                    match action {
                        Action::Quit => return Ok(Flow::Quit),
                        Action::Mute => self.toggle_mute(),
                        _ => {}
                    }
                    self.session.apply(action);
                }
                InputEvent::Resize(width, height) => self.resize(width, height),
            }
        }

        self.session.tick();
        self.play_events();

        if self.session.collided {
            self.record_high_score();
            self.draw()?;
            return self.await_restart();
        }

        self.draw()?;
        Ok(Flow::Continue)
    }

    fn await_restart(&mut self) -> io::Result<Flow> {
        loop {
            match self.input.wait() {
                None
                | Some(InputEvent::Key {
                    action: Action::Quit, ..
                }) => return Ok(Flow::Quit),
                Some(InputEvent::Key {
                    action: Action::Restart,
                    ..
                }) => {
                    self.session.reset();
                    self.draw()?;
                    return Ok(Flow::Continue);
                }
                Some(InputEvent::Key {
                    action: Action::Mute, ..
                }) => {
                    self.toggle_mute();
                    self.draw()?;
                }
                Some(InputEvent::Resize(width, height)) => {
                    self.resize(width, height);
                    self.draw()?;
                }
                Some(InputEvent::Key { .. }) => {}
            }
        }
    }

    fn play_events(&mut self) {
        for event in self.session.drain_events() {
            let sound = match event {
                GameEvent::Jumped => Sound::Jump,
                GameEvent::Dropped => Sound::Drop,
                GameEvent::Collided => Sound::Collision,
                GameEvent::StageUp { .. } | GameEvent::Milestone { .. } => Sound::Score,
            };
            self.audio.play(sound);
        }
    }

    fn record_high_score(&mut self) {
        if !self.session.new_record {
            return;
        }
        if let Err(err) = self.scores.save(self.session.high_score) {
            log::warn!("failed to save high score: {err}");
        }
    }

    fn toggle_mute(&mut self) {
        let muted = !self.audio.is_muted();
        self.audio.set_muted(muted);
        log::debug!("sound {}", if muted { "muted" } else { "unmuted" });
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.renderer.resize(width, height);
        self.session.set_width(width);
    }

    fn draw(&mut self) -> io::Result<()> {
        draw_session(&mut self.renderer, &self.session, self.audio.is_muted());
        self.renderer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JumpTuning, PLAYER_X, PLAYFIELD_HEIGHT};
    use crate::obstacle::{Obstacle, ObstacleKind};
    use crate::render::Screen;
    use crate::stage::StageTable;
    use crate::input::InputQueue;
    use crossbeam_channel::{Sender, unbounded};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct RecordingAudio {
        played: Rc<RefCell<Vec<Sound>>>,
        muted: Rc<Cell<bool>>,
    }

    impl AudioSink for RecordingAudio {
        fn play(&mut self, sound: Sound) {
            self.played.borrow_mut().push(sound);
        }

        fn set_muted(&mut self, muted: bool) {
            self.muted.set(muted);
        }

        fn is_muted(&self) -> bool {
            self.muted.get()
        }
    }

    #[derive(Default, Clone)]
    struct MemoryStore {
        saved: Rc<Cell<Option<u64>>>,
    }

    impl HighScoreStore for MemoryStore {
        fn load(&self) -> u64 {
            self.saved.get().unwrap_or(0)
        }

        fn save(&self, score: u64) -> io::Result<()> {
            self.saved.set(Some(score));
            Ok(())
        }
    }

    type TestGame = Game<Screen<Vec<u8>>, InputQueue>;

    fn game() -> (TestGame, Sender<InputEvent>, RecordingAudio, MemoryStore) {
        let (sender, receiver) = unbounded();
        let audio = RecordingAudio::default();
        let store = MemoryStore::default();
        let session = Session::new(StageTable::builtin().unwrap(), JumpTuning::default(), 80, 11, 0);
        let game = Game::new(
            session,
            Screen::new(Vec::new(), 80, PLAYFIELD_HEIGHT),
            InputQueue::new(receiver),
            Box::new(audio.clone()),
            Box::new(store.clone()),
        );
        (game, sender, audio, store)
    }

    fn key(action: Action) -> InputEvent {
        InputEvent::Key { action, raw: None }
    }

    #[test]
    fn test_idle_step_renders_a_frame() {
        let (mut game, _sender, _, _) = game();
        assert_eq!(game.step().unwrap(), Flow::Continue);
        assert!(!game.renderer.output().is_empty());
        assert!(!game.session().started);
    }

    #[test]
    fn test_jump_starts_and_plays_sound() {
        let (mut game, sender, audio, _) = game();
        sender.send(key(Action::Jump)).unwrap();
        game.step().unwrap();
        assert!(game.session().started);
        assert_eq!(*audio.played.borrow(), vec![Sound::Jump]);
    }

    #[test]
    fn test_one_event_per_tick() {
        let (mut game, sender, _, _) = game();
        sender.send(key(Action::Jump)).unwrap();
        sender.send(key(Action::Quit)).unwrap();
        assert_eq!(game.step().unwrap(), Flow::Continue);
        assert_eq!(game.step().unwrap(), Flow::Quit);
    }

    #[test]
    fn test_held_duck_does_not_delay_a_jump() {
        let (mut game, sender, _, _) = game();
        game.session_mut().started = true;
        for _ in 0..120 {
            sender.send(key(Action::Duck)).unwrap();
        }
        sender.send(key(Action::Jump)).unwrap();

        game.step().unwrap();
        assert!(game.session().player.is_ducking());
        game.step().unwrap();
        assert!(game.session().player.is_airborne());
    }

    #[test]
    fn test_mute_toggles() {
        let (mut game, sender, audio, _) = game();
        sender.send(key(Action::Mute)).unwrap();
        game.step().unwrap();
        assert!(audio.muted.get());
        assert!(game.is_muted());
        sender.send(key(Action::Mute)).unwrap();
        game.step().unwrap();
        assert!(!game.is_muted());
    }

    #[test]
    fn test_resize_updates_screen_and_session() {
        let (mut game, sender, _, _) = game();
        sender.send(InputEvent::Resize(150, 40)).unwrap();
        game.step().unwrap();
        assert_eq!(game.renderer.measure(), (150, 40));
        assert_eq!(game.session().width(), 150);
        assert_eq!(game.session().effective_width(), 120);
    }

    fn crash(game: &mut TestGame, score: u64) {
        let session = game.session_mut();
        session.started = true;
        session.score = score;
        session
            .obstacles
            .insert(Obstacle::new(ObstacleKind::Single, PLAYER_X as f64 + 1.0));
    }

    #[test]
    fn test_game_over_saves_record_and_restarts() {
        let (mut game, sender, audio, store) = game();
        crash(&mut game, 50);
        // The first event is consumed by the tick, the second by the game-over wait
        sender.send(key(Action::Other)).unwrap();
        sender.send(key(Action::Restart)).unwrap();

        assert_eq!(game.step().unwrap(), Flow::Continue);
        assert_eq!(store.saved.get(), Some(50));
        assert!(audio.played.borrow().contains(&Sound::Collision));

        let session = game.session();
        assert!(!session.collided);
        assert_eq!(session.score, 0);
        assert_eq!(session.high_score, 50);
        assert!(session.started);
    }

    #[test]
    fn test_game_over_without_record_does_not_save() {
        let (mut game, sender, _, store) = game();
        game.session_mut().high_score = 500;
        crash(&mut game, 10);
        sender.send(key(Action::Other)).unwrap();
        sender.send(key(Action::Quit)).unwrap();
        assert_eq!(game.step().unwrap(), Flow::Quit);
        assert_eq!(store.saved.get(), None);
    }

    #[test]
    fn test_game_over_ends_when_input_closes() {
        let (mut game, sender, _, _) = game();
        crash(&mut game, 10);
        drop(sender);
        assert_eq!(game.step().unwrap(), Flow::Quit);
    }

    #[test]
    fn test_mute_and_resize_during_game_over() {
        let (mut game, sender, audio, _) = game();
        crash(&mut game, 10);
        sender.send(key(Action::Other)).unwrap();
        sender.send(key(Action::Mute)).unwrap();
        sender.send(InputEvent::Resize(100, 30)).unwrap();
        sender.send(key(Action::Jump)).unwrap();
        sender.send(key(Action::Restart)).unwrap();
        assert_eq!(game.step().unwrap(), Flow::Continue);
        assert!(audio.muted.get());
        assert_eq!(game.renderer.measure(), (100, 30));
        assert!(!game.session().collided);
    }
}
