mod context;
mod error;
mod params;

pub use alpha_blockdata_derive::ConsensusCodec;
pub use context::{
    SerializationContext, PROTOCOL_VERSION, SERIALIZE_BLOCK_LEGACY, SER_DISK, SER_GETHASH,
    SER_NETWORK,
};
pub use encode::{Decodable, Encodable, Error as EncodeDecodeError, VarInt, MAX_VEC_SIZE};
pub use error::{DecodeError, EncodeError};
pub use params::Params;

pub mod encode {
    pub use bitcoin::consensus::encode::{
        deserialize, serialize, Decodable, Encodable, Error, VarInt, MAX_VEC_SIZE,
    };
}
