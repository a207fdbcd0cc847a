pub mod normalize;
pub mod wav;

pub use normalize::{NormalizedAudio, Normalizer};
pub use wav::{decode_file, decode_reader, WavHeader};
