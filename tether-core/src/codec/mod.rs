mod candidate;
mod codec_error;
mod sdp;

pub use candidate::{
    CandidateFields, CandidatePayload, IceCandidateRecord, coerce_sdp_m_line_index,
    coerce_sdp_mid,
};
pub use codec_error::CandidateError;
pub use sdp::{
    CodecPreference, H264_PAYLOAD_TYPES, H264_RTX_PAYLOAD_TYPES, PayloadGroup, prefer_codec,
    reorder_media_line,
};
