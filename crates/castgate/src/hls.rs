use std::cmp::Ordering;

use m3u8_rs::{MasterPlaylist, Playlist, VariantStream};

use crate::error::{ReceiverError, ReceiverResult};

const ERROR_PREVIEW_LEN: usize = 64;

pub fn parse_playlist(data: &[u8]) -> ReceiverResult<Playlist> {
    m3u8_rs::parse_playlist_res(data).map_err(|_| {
        let preview = String::from_utf8_lossy(&data[..data.len().min(ERROR_PREVIEW_LEN)]);
        ReceiverError::M3u8ParseError(format!("{} bytes, starting with {preview:?}", data.len()))
    })
}

fn compare_variants(a: &VariantStream, b: &VariantStream) -> Ordering {
    // compare resolution first
    if let (Some(a), Some(b)) = (&a.resolution, &b.resolution) {
        if a.width != b.width {
            return b.width.cmp(&a.width);
        }
    }

    // compare framerate then
    if let (Some(a), Some(b)) = (a.frame_rate, b.frame_rate) {
        let a = a as u64;
        let b = b as u64;
        if a != b {
            return b.cmp(&a);
        }
    }

    // compare bandwidth finally
    b.bandwidth.cmp(&a.bandwidth)
}

/// Pick the best quality variant of a master playlist.
pub fn select_variant(playlist: &MasterPlaylist) -> Option<&VariantStream> {
    playlist
        .variants
        .iter()
        .filter(|v| !v.is_i_frame)
        .min_by(|a, b| compare_variants(a, b))
}
