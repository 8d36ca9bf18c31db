use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Walk the top-level ISO-BMFF box sequence of an MP4 and report whether the
/// `moov` box appears before `mdat`.
///
/// Browsers can only seek a progressively downloaded MP4 when the metadata
/// sits in front of the payload; a trailing `moov` forces them to fetch the
/// whole file first. Each box header is 4 bytes of big-endian size plus a
/// 4-byte type; `size == 1` promotes to a 64-bit size in the following
/// 8 bytes, `size == 0` extends the box to end-of-file, and a size below 8
/// (or any short read) terminates the walk.
///
/// A file where neither box is found is reported streamable, so only a
/// definite tail `moov` forces repackaging. An unopenable file is not.
pub fn has_moov_at_front<P: AsRef<Path>>(path: P) -> bool {
    let Ok(mut file) = File::open(path) else {
        return false;
    };

    let mut offset: u64 = 0;
    let mut header = [0u8; 8];

    loop {
        if file.seek(SeekFrom::Start(offset)).is_err() {
            break;
        }
        if file.read_exact(&mut header).is_err() {
            break;
        }

        let mut size = u64::from(u32::from_be_bytes([
            header[0], header[1], header[2], header[3],
        ]));
        let box_type = [header[4], header[5], header[6], header[7]];

        if size == 1 {
            let mut extended = [0u8; 8];
            if file.read_exact(&mut extended).is_err() {
                break;
            }
            size = u64::from_be_bytes(extended);
        }
        if size == 0 {
            let Ok(meta) = file.metadata() else { break };
            size = meta.len().saturating_sub(offset);
        }
        if size < 8 {
            break;
        }

        match &box_type {
            b"moov" => return true,
            b"mdat" => return false,
            _ => {}
        }

        match offset.checked_add(size) {
            Some(next) => offset = next,
            None => break,
        }
    }

    true
}
