mod constant_sequence;
mod geometric_sequence;
mod luby_sequence;
mod sequence_generator;
mod sequence_generator_type;

pub(crate) use constant_sequence::ConstantSequence;
pub(crate) use geometric_sequence::GeometricSequence;
pub(crate) use luby_sequence::LubySequence;
pub(crate) use sequence_generator::SequenceGenerator;
pub use sequence_generator_type::SequenceGeneratorType;

/// Creates the generator of the given type; `base` is the first element and `factor` is only used
/// by the geometric sequence.
pub(crate) fn create_sequence_generator(
    generator_type: SequenceGeneratorType,
    base: i64,
    factor: f64,
) -> Box<dyn SequenceGenerator> {
    match generator_type {
        SequenceGeneratorType::Constant => Box::new(ConstantSequence::new(base)),
        SequenceGeneratorType::Geometric => Box::new(GeometricSequence::new(base, factor)),
        SequenceGeneratorType::Luby => Box::new(LubySequence::new(base)),
    }
}
