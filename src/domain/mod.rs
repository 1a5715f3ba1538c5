mod embedding;
mod frame;
mod media;
mod tag;
mod video;

pub use embedding::{l2_normalize, Embedding, EMBEDDING_DIM};
pub use frame::{Frame, ImageSource, ImageSourceError};
pub use media::{MediaInfo, Rotation};
pub use tag::Tag;
pub use video::{Video, VideoId};
