use std::fmt;

use tracing::info;

use crate::{
    control::Control,
    grid::Grid,
    image::Surface,
    verboser::{Message, Verboser},
    winding::{Chord, Winding},
    Float,
};

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Completed,
    Canceled,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Completed => "completed",
            Status::Canceled => "canceled",
        })
    }
}

/// Where a driver stands between two steps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunState<S> {
    pub current: usize,
    /// Color phase of the next chord, in turns.
    pub phase: S,
    pub step: usize,
}

impl<S: Float> RunState<S> {
    pub fn new(current: usize) -> Self {
        Self {
            current,
            phase: S::ZERO,
            step: 0,
        }
    }

    /// Moves to `to`, returning the chord that was just wound.
    pub fn advance(&mut self, to: usize) -> Chord<S> {
        let chord = Chord {
            from: self.current,
            to,
            phase: self.phase,
        };
        self.phase = (self.phase + S::PHASE_STEP).fract();
        self.current = to;
        self.step += 1;
        chord
    }

    /// Moves to `to` without winding anything.
    pub fn jump(&mut self, to: usize) {
        self.current = to;
        self.step += 1;
    }
}

/// A winding strategy advanced one chord at a time by [`run`].
pub trait Driver {
    type Scalar: Float;

    /// Resets the driver for a new run on a canvas of `grid`.
    fn begin(&mut self, grid: &Grid) -> Result<(), Error>;

    /// Picks the next peg and composites the chord onto `surface`.
    fn step<C: Surface + ?Sized>(&mut self, surface: &mut C);

    fn state(&self) -> &RunState<Self::Scalar>;

    fn winding(&self) -> &Winding<Self::Scalar>;
}

/// Clears `surface` and advances `driver` up to `steps` times.
///
/// Cancellation is only observed between steps, and every committed chord is
/// followed by [`Control::suspend`]. The terminal status is sent to `verboser`
/// exactly once.
pub fn run<D: Driver, C: Surface + ?Sized>(
    driver: &mut D,
    surface: &mut C,
    steps: usize,
    control: &Control,
    verboser: &mut impl Verboser,
) -> Result<Status, Error> {
    let grid = surface.grid();
    driver.begin(&grid)?;
    surface.clear();
    info!(
        steps,
        width = grid.width,
        height = grid.height,
        "winding started"
    );

    let mut status = Status::Completed;
    if steps == 0 {
        verboser.verbose(Message::Progress(100.0));
    }
    for step in 0..steps {
        if control.is_cancelled() {
            status = Status::Canceled;
            break;
        }
        driver.step(surface);
        verboser.verbose(Message::Progress((step + 1) as f64 / steps as f64 * 100.0));
        control.suspend();
    }

    info!(%status, chords = driver.winding().len(), "winding finished");
    verboser.verbose(Message::Finished(status));
    Ok(status)
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("target image is {}x{} but the canvas is {}x{}", target.width, target.height, canvas.width, canvas.height)]
    TargetSize { target: Grid, canvas: Grid },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geometry::Point, image::RgbaBuffer, strands::Strands};
    use std::sync::Arc;

    /// Winds around a square, one side per step.
    struct Square {
        state: RunState<f64>,
        winding: Winding<f64>,
        cancel_at: Option<(usize, Arc<Control>)>,
    }

    impl Square {
        const CORNERS: [Point<f64>; 4] = [
            Point::new(2.0, 2.0),
            Point::new(17.0, 2.0),
            Point::new(17.0, 17.0),
            Point::new(2.0, 17.0),
        ];

        fn new() -> Self {
            Self {
                state: RunState::new(0),
                winding: Winding::default(),
                cancel_at: None,
            }
        }
    }

    impl Driver for Square {
        type Scalar = f64;

        fn begin(&mut self, _: &Grid) -> Result<(), Error> {
            self.state = RunState::new(0);
            self.winding.clear();
            Ok(())
        }

        fn step<C: Surface + ?Sized>(&mut self, surface: &mut C) {
            let to = (self.state.current + 1) % 4;
            let from = Self::CORNERS[self.state.current];
            Strands::pastel().draw(surface, from, Self::CORNERS[to], self.state.phase);
            let chord = self.state.advance(to);
            self.winding.push(chord);
            if let Some((step, control)) = &self.cancel_at {
                if self.state.step == *step {
                    control.cancel();
                }
            }
        }

        fn state(&self) -> &RunState<f64> {
            &self.state
        }

        fn winding(&self) -> &Winding<f64> {
            &self.winding
        }
    }

    #[test]
    fn phase_advances_by_a_tenth_and_wraps() {
        let mut state = RunState::<f64>::new(3);
        for to in 0..10 {
            state.advance(to);
        }
        assert!(state.phase.abs() < 1e-9 || (state.phase - 1.0).abs() < 1e-9);
        assert_eq!(state.step, 10);
        assert_eq!(state.current, 9);
        let chord = state.advance(4);
        assert_eq!(chord.from, 9);
        assert_eq!(chord.to, 4);
    }

    #[test]
    fn completed_run_reports_monotonic_progress() {
        let mut buffer = RgbaBuffer::black(Grid::square(20));
        let mut messages = Vec::new();
        let status = run(
            &mut Square::new(),
            &mut buffer,
            8,
            &Control::new(100),
            &mut messages,
        )
        .unwrap();
        assert_eq!(status, Status::Completed);
        assert_eq!(messages.len(), 9);
        let mut last = 0.0;
        for message in &messages[..8] {
            let Message::Progress(pct) = *message else {
                panic!("unexpected {message:?}");
            };
            assert!(pct >= last);
            last = pct;
        }
        assert_eq!(last, 100.0);
        assert_eq!(messages[8], Message::Finished(Status::Completed));
    }

    #[test]
    fn cancel_is_observed_at_the_next_step() {
        let control = Arc::new(Control::new(100));
        let mut driver = Square::new();
        driver.cancel_at = Some((3, control.clone()));
        let mut buffer = RgbaBuffer::black(Grid::square(20));
        let mut messages = Vec::new();
        let status = run(&mut driver, &mut buffer, 10, &control, &mut messages).unwrap();
        assert_eq!(status, Status::Canceled);
        assert_eq!(driver.winding().len(), 3);
        assert_eq!(messages.last(), Some(&Message::Finished(Status::Canceled)));
    }

    #[test]
    fn cancel_after_the_last_step_still_completes() {
        let control = Arc::new(Control::new(100));
        let mut driver = Square::new();
        driver.cancel_at = Some((4, control.clone()));
        let mut buffer = RgbaBuffer::black(Grid::square(20));
        let status = run(&mut driver, &mut buffer, 4, &control, &mut Vec::new()).unwrap();
        assert_eq!(status, Status::Completed);
    }

    #[test]
    fn reset_control_drives_a_second_run() {
        let control = Arc::new(Control::new(100));
        let mut driver = Square::new();
        driver.cancel_at = Some((2, control.clone()));
        let mut buffer = RgbaBuffer::black(Grid::square(20));
        let status = run(&mut driver, &mut buffer, 6, &control, &mut Vec::new()).unwrap();
        assert_eq!(status, Status::Canceled);

        control.reset();
        driver.cancel_at = None;
        let status = run(&mut driver, &mut buffer, 6, &control, &mut Vec::new()).unwrap();
        assert_eq!(status, Status::Completed);
        assert_eq!(driver.winding().len(), 6);
    }

    #[test]
    fn run_starts_from_a_black_canvas() {
        let mut buffer = RgbaBuffer::filled(image::Rgba([255, 255, 255, 255]), Grid::square(20));
        let mut messages = Vec::new();
        run(&mut Square::new(), &mut buffer, 0, &Control::default(), &mut messages).unwrap();
        assert_eq!(buffer, RgbaBuffer::black(Grid::square(20)));
        assert_eq!(
            messages,
            vec![Message::Progress(100.0), Message::Finished(Status::Completed)]
        );
    }
}
