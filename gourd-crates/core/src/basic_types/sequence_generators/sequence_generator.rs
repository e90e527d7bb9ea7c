use std::fmt::Debug;

pub(crate) trait SequenceGenerator: Debug + Send {
    fn next(&mut self) -> i64;
}
