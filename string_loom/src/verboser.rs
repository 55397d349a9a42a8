use crate::algorithm::Status;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Message {
    CreatingPegs(usize),
    /// Percentage of the requested steps done, in `[0, 100]`.
    Progress(f64),
    Finished(Status),
}

pub trait Verboser {
    fn verbose(&mut self, message: Message);
}

pub struct Silent;

impl Verboser for Silent {
    fn verbose(&mut self, _: Message) {}
}

impl Verboser for Vec<Message> {
    fn verbose(&mut self, message: Message) {
        self.push(message);
    }
}
