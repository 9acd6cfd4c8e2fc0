//! Opaque session keys handed back on `acquire` (spec §4.4): `release` is a
//! no-op unless the caller presents the key the current holder was given.

use rand::Rng;

pub fn generate() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_unique_32_hex_char_keys() {
        let a = generate();
        let b = generate();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
