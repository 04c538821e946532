use crate::errors::CoreError;

use super::encryption::{KdfParams, Sealed, NONCE_LEN, SALT_LEN};

/// Magic bytes of a session file.
pub const MAGIC: &[u8; 4] = b"SWSN";

pub const CURRENT_VERSION: u16 = 1;

/// magic(4) + version(2) + kdf(3×4) + salt(16) + nonce(12) + len(4) = 50
pub const HEADER_LEN: usize = 4 + 2 + 12 + SALT_LEN + NONCE_LEN + 4;

/// Serialize a sealed session.
///
/// ```text
/// [SWSN] [version u16] [memory_cost u32] [time_cost u32] [parallelism u32]
/// [salt 16B] [nonce 12B] [ciphertext_len u32] [ciphertext]
/// ```
/// All integers little-endian.
pub fn encode(sealed: &Sealed) -> Result<Vec<u8>, CoreError> {
    let len = u32::try_from(sealed.ciphertext.len())
        .map_err(|_| CoreError::Serialization("session payload too large".into()))?;

    let mut out = Vec::with_capacity(HEADER_LEN + sealed.ciphertext.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&CURRENT_VERSION.to_le_bytes());
    out.extend_from_slice(&sealed.kdf_params.memory_cost.to_le_bytes());
    out.extend_from_slice(&sealed.kdf_params.time_cost.to_le_bytes());
    out.extend_from_slice(&sealed.kdf_params.parallelism.to_le_bytes());
    out.extend_from_slice(&sealed.salt);
    out.extend_from_slice(&sealed.nonce);
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&sealed.ciphertext);
    Ok(out)
}

/// Parse and sanity-check a session file. Trailing bytes after the declared
/// ciphertext are ignored.
pub fn decode(data: &[u8]) -> Result<Sealed, CoreError> {
    let mut r = Reader { data, pos: 0 };

    if r.take::<4>()? != *MAGIC {
        return Err(CoreError::InvalidFileFormat("not a session file".into()));
    }

    let version = u16::from_le_bytes(r.take()?);
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let kdf_params = KdfParams {
        memory_cost: u32::from_le_bytes(r.take()?),
        time_cost: u32::from_le_bytes(r.take()?),
        parallelism: u32::from_le_bytes(r.take()?),
    };
    check_kdf_bounds(&kdf_params)?;

    let salt = r.take::<SALT_LEN>()?;
    let nonce = r.take::<NONCE_LEN>()?;
    let len = u32::from_le_bytes(r.take()?) as usize;
    let ciphertext = r.slice(len)?.to_vec();

    Ok(Sealed {
        kdf_params,
        salt,
        nonce,
        ciphertext,
    })
}

/// Reject cost parameters a crafted file could use to exhaust memory or CPU.
fn check_kdf_bounds(p: &KdfParams) -> Result<(), CoreError> {
    let in_range = (8..=1_048_576).contains(&p.memory_cost)
        && (1..=20).contains(&p.time_cost)
        && (1..=16).contains(&p.parallelism);
    if in_range {
        Ok(())
    } else {
        Err(CoreError::InvalidFileFormat(format!(
            "KDF parameters out of range: memory={} KiB, time={}, lanes={}",
            p.memory_cost, p.time_cost, p.parallelism
        )))
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn slice(&mut self, n: usize) -> Result<&'a [u8], CoreError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| CoreError::InvalidFileFormat("session file truncated".into()))?;
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], CoreError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.slice(N)?);
        Ok(buf)
    }
}
