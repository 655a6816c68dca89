use std::collections::BTreeSet;

const VIDEO_MEDIA_PREFIX: &str = "m=video";
const MEDIA_METADATA_TOKENS: usize = 3;

/// H.264 payload types offered by the browser stack the server expects.
pub const H264_PAYLOAD_TYPES: [u8; 4] = [120, 121, 122, 123];

/// RTX payload types paired with the H.264 ones.
pub const H264_RTX_PAYLOAD_TYPES: [u8; 4] = [109, 111, 114, 115];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadGroup {
    pub name: String,
    pub payload_types: BTreeSet<u8>,
}

impl PayloadGroup {
    pub fn new(name: impl Into<String>, payload_types: impl IntoIterator<Item = u8>) -> Self {
        Self {
            name: name.into(),
            payload_types: payload_types.into_iter().collect(),
        }
    }

    fn contains(&self, token: &str) -> bool {
        token
            .parse::<u8>()
            .is_ok_and(|pt| self.payload_types.contains(&pt))
    }
}

/// Ordered payload-type groups; earlier groups are moved to the front of the
/// `m=video` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecPreference {
    pub groups: Vec<PayloadGroup>,
}

impl CodecPreference {
    pub fn new(groups: Vec<PayloadGroup>) -> Self {
        Self { groups }
    }

    /// H.264 first, then its retransmission streams, then everything else.
    pub fn h264() -> Self {
        Self::new(vec![
            PayloadGroup::new("H.264", H264_PAYLOAD_TYPES),
            PayloadGroup::new("retransmission", H264_RTX_PAYLOAD_TYPES),
        ])
    }

    /// Leaves every media line as it is.
    pub fn none() -> Self {
        Self::new(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn group_of(&self, token: &str) -> Option<usize> {
        self.groups.iter().position(|group| group.contains(token))
    }
}

impl Default for CodecPreference {
    fn default() -> Self {
        Self::h264()
    }
}

/// Reorders the payload types of every `m=video` line in `sdp`.
///
/// Lines are split on `\r\n` when the document contains it and on `\n`
/// otherwise, and joined back with the same terminator. Every other line is
/// copied through unchanged.
pub fn prefer_codec(sdp: &str, preference: &CodecPreference) -> String {
    let terminator = if sdp.contains("\r\n") { "\r\n" } else { "\n" };

    sdp.split(terminator)
        .map(|line| {
            if line.starts_with(VIDEO_MEDIA_PREFIX) {
                reorder_media_line(line, preference)
            } else {
                line.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(terminator)
}

/// Reorders a single media line: `<media> <port> <proto> <pt>...`.
///
/// Lines with no payload types are returned as they are.
pub fn reorder_media_line(line: &str, preference: &CodecPreference) -> String {
    let tokens: Vec<&str> = line.split(' ').collect();
    if tokens.len() <= MEDIA_METADATA_TOKENS {
        return line.to_owned();
    }

    let (metadata, payload_types) = tokens.split_at(MEDIA_METADATA_TOKENS);
    let mut buckets: Vec<Vec<&str>> = vec![Vec::new(); preference.groups.len() + 1];
    let unmatched = preference.groups.len();

    for pt in payload_types {
        let bucket = preference.group_of(pt).unwrap_or(unmatched);
        buckets[bucket].push(pt);
    }

    metadata
        .iter()
        .copied()
        .chain(buckets.into_iter().flatten())
        .collect::<Vec<_>>()
        .join(" ")
}
